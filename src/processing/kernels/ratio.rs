// src/processing/kernels/ratio.rs
use crate::error::EngineResult;
use crate::processing::kernels::{scalar_series, IndexKernel};
use crate::stack::{ArdStack, TsOutput};
use crate::utils::fixed_point::{scale_checked, RATIO_SCALE};

/// Band ratio minus one, e.g. CIre: (b1/b2)-1, scaled by 1000.
pub struct RatioMinusOne {
    band_a: usize,
    band_b: usize,
}

impl RatioMinusOne {
    pub fn new(band_a: usize, band_b: usize) -> Self {
        Self { band_a, band_b }
    }
}

impl IndexKernel for RatioMinusOne {
    fn apply(
        &self,
        stack: &ArdStack,
        mask: Option<&[u8]>,
        out: &mut TsOutput,
        nodata: i16,
    ) -> EngineResult<()> {
        scalar_series(stack, mask, out, nodata, |frame, p| {
            let a = frame.band(self.band_a)[p] as f32;
            let b = frame.band(self.band_b)[p] as f32;
            if b == 0.0 {
                return None;
            }
            scale_checked(a / b - 1.0, RATIO_SCALE)
        });
        Ok(())
    }
}
