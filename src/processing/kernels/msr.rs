// src/processing/kernels/msr.rs
use crate::error::EngineResult;
use crate::processing::kernels::{scalar_series, IndexKernel};
use crate::stack::{ArdStack, TsOutput};
use crate::utils::fixed_point::{scale_checked, REFLECTANCE_SCALE};

/// Modified simple ratio, e.g. MSRre: ((b1/b2)-1)/sqrt((b1/b2)+1).
pub struct ModifiedSimpleRatio {
    band_a: usize,
    band_b: usize,
}

impl ModifiedSimpleRatio {
    pub fn new(band_a: usize, band_b: usize) -> Self {
        Self { band_a, band_b }
    }
}

impl IndexKernel for ModifiedSimpleRatio {
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
            let ratio = a / b;
            if ratio + 1.0 <= 0.0 {
                return None;
            }
            scale_checked((ratio - 1.0) / (ratio + 1.0).sqrt(), REFLECTANCE_SCALE)
        });
        Ok(())
    }
}
