// src/processing/kernels/normdiff.rs
use crate::error::EngineResult;
use crate::processing::kernels::{scalar_series, IndexKernel};
use crate::stack::{ArdStack, TsOutput};
use crate::utils::fixed_point::REFLECTANCE_SCALE;

/// Normalized difference of two bands, e.g. NDVI: (b1-b2)/(b1+b2).
pub struct NormalizedDifference {
    band_a: usize,
    band_b: usize,
}

impl NormalizedDifference {
    pub fn new(band_a: usize, band_b: usize) -> Self {
        Self { band_a, band_b }
    }
}

impl IndexKernel for NormalizedDifference {
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
            let sum = a + b;
            let ind = (a - b) / sum;
            if sum == 0.0 || !(-1.0..=1.0).contains(&ind) {
                None
            } else {
                Some((ind * REFLECTANCE_SCALE) as i16)
            }
        });
        Ok(())
    }
}
