// src/processing/kernels/band.rs
use crate::error::EngineResult;
use crate::processing::kernels::{scalar_series, IndexKernel};
use crate::stack::{ArdStack, TsOutput};

/// Copies one band from the ARD stack into the time series, subject only
/// to the mask logic.
pub struct BandCopy {
    band: usize,
}

impl BandCopy {
    pub fn new(band: usize) -> Self {
        Self { band }
    }
}

impl IndexKernel for BandCopy {
    fn apply(
        &self,
        stack: &ArdStack,
        mask: Option<&[u8]>,
        out: &mut TsOutput,
        nodata: i16,
    ) -> EngineResult<()> {
        scalar_series(stack, mask, out, nodata, |frame, p| {
            Some(frame.band(self.band)[p])
        });
        Ok(())
    }
}
