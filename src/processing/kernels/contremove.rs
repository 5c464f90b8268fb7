// src/processing/kernels/contremove.rs
use crate::error::EngineResult;
use crate::processing::kernels::{scalar_series, IndexKernel};
use crate::stack::{ArdStack, TsOutput};

/// Continuum removal: subtracts the baseline linearly interpolated at the
/// central wavelength between the two bracketing bands. Unscaled output.
pub struct ContinuumRemoval {
    band_mid: usize,
    band_left: usize,
    band_right: usize,
    w_mid: f32,
    w_left: f32,
    w_right: f32,
}

impl ContinuumRemoval {
    pub fn new(
        band_mid: usize,
        band_left: usize,
        band_right: usize,
        w_mid: f32,
        w_left: f32,
        w_right: f32,
    ) -> Self {
        Self {
            band_mid,
            band_left,
            band_right,
            w_mid,
            w_left,
            w_right,
        }
    }
}

impl IndexKernel for ContinuumRemoval {
    fn apply(
        &self,
        stack: &ArdStack,
        mask: Option<&[u8]>,
        out: &mut TsOutput,
        nodata: i16,
    ) -> EngineResult<()> {
        scalar_series(stack, mask, out, nodata, |frame, p| {
            let left = frame.band(self.band_left)[p] as f32;
            let right = frame.band(self.band_right)[p] as f32;
            let mid = frame.band(self.band_mid)[p] as f32;
            let baseline = (left * (self.w_right - self.w_mid)
                + right * (self.w_mid - self.w_left))
                / (self.w_right - self.w_left);
            Some((mid - baseline) as i16)
        });
        Ok(())
    }
}
