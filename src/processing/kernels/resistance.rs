// src/processing/kernels/resistance.rs
use crate::error::EngineResult;
use crate::processing::kernels::{scalar_series, IndexKernel};
use crate::stack::{ArdStack, TsOutput};
use crate::utils::fixed_point::{scale_truncate, REFLECTANCE_SCALE};

/// Soil/atmosphere resistance family, e.g. EVI, SAVI, SARVI:
/// f1*(nir-red)/(nir + f2*red - f3*blue + f4*scale), with optional
/// red-blue correction red -= (blue - red).
pub struct ResistanceIndex {
    nir: usize,
    red: usize,
    blue: usize,
    f1: f32,
    f2: f32,
    f3: f32,
    f4: f32,
    red_blue_correction: bool,
}

impl ResistanceIndex {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        nir: usize,
        red: usize,
        blue: usize,
        f1: f32,
        f2: f32,
        f3: f32,
        f4: f32,
        red_blue_correction: bool,
    ) -> Self {
        Self {
            nir,
            red,
            blue,
            f1,
            f2,
            f3,
            f4,
            red_blue_correction,
        }
    }
}

impl IndexKernel for ResistanceIndex {
    fn apply(
        &self,
        stack: &ArdStack,
        mask: Option<&[u8]>,
        out: &mut TsOutput,
        nodata: i16,
    ) -> EngineResult<()> {
        scalar_series(stack, mask, out, nodata, |frame, p| {
            let nir = frame.band(self.nir)[p] as f32;
            let mut red = frame.band(self.red)[p] as f32;
            let blue = frame.band(self.blue)[p] as f32;
            if self.red_blue_correction {
                red -= blue - red;
            }
            let denom = nir + self.f2 * red - self.f3 * blue + self.f4 * REFLECTANCE_SCALE;
            if denom == 0.0 {
                None
            } else {
                // no [-1, 1] guard here; the encoding saturates instead
                Some(scale_truncate(
                    self.f1 * (nir - red) / denom,
                    REFLECTANCE_SCALE,
                ))
            }
        });
        Ok(())
    }
}
