// src/processing/kernels/kernelized.rs
use crate::error::EngineResult;
use crate::processing::kernels::{scalar_series, IndexKernel};
use crate::stack::{ArdStack, TsOutput};
use crate::utils::fixed_point::REFLECTANCE_SCALE;

/// Kernelized NDVI with an RBF kernel whose length scale is the band mean.
pub struct KernelizedNdvi {
    band_a: usize,
    band_b: usize,
}

impl KernelizedNdvi {
    pub fn new(band_a: usize, band_b: usize) -> Self {
        Self { band_a, band_b }
    }
}

impl IndexKernel for KernelizedNdvi {
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
            if a <= 0.0 || b <= 0.0 {
                return None;
            }
            let sigma = 0.5 * (a + b);
            let diff = a - b;
            let kernel = (-(diff * diff) / (2.0 * sigma * sigma)).exp();
            let ind = (1.0 - kernel) / (1.0 + kernel);
            Some((ind * REFLECTANCE_SCALE) as i16)
        });
        Ok(())
    }
}
