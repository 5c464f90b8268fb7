// src/processing/kernels/tasseled.rs
use crate::error::EngineResult;
use crate::processing::kernels::{scalar_series, IndexKernel};
use crate::stack::{ArdStack, TsOutput};

/// Tasseled Cap coefficients for blue, green, red, nir, swir1, swir2.
const TC: [[f32; 6]; 3] = [
    [0.2043, 0.4158, 0.5524, 0.5741, 0.3124, 0.2303],
    [-0.1603, -0.2819, -0.4934, 0.7940, -0.0002, -0.1446],
    [0.0315, 0.2021, 0.3102, 0.1594, -0.6806, -0.6109],
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TasseledComponent {
    Brightness,
    Greenness,
    Wetness,
    /// Brightness minus greenness minus wetness, computed in one pass.
    Disturbance,
}

/// Tasseled Cap linear combinations over six bands, unscaled output.
pub struct TasseledCap {
    component: TasseledComponent,
    bands: [usize; 6],
}

impl TasseledCap {
    /// `bands` in the fixed order blue, green, red, nir, swir1, swir2.
    pub fn new(component: TasseledComponent, bands: [usize; 6]) -> Self {
        Self { component, bands }
    }
}

impl IndexKernel for TasseledCap {
    fn apply(
        &self,
        stack: &ArdStack,
        mask: Option<&[u8]>,
        out: &mut TsOutput,
        nodata: i16,
    ) -> EngineResult<()> {
        scalar_series(stack, mask, out, nodata, |frame, p| {
            let row = |i: usize| -> f32 {
                TC[i]
                    .iter()
                    .zip(self.bands.iter())
                    .map(|(&c, &b)| c * frame.band(b)[p] as f32)
                    .sum()
            };
            let ind = match self.component {
                TasseledComponent::Brightness => row(0),
                TasseledComponent::Greenness => row(1),
                TasseledComponent::Wetness => row(2),
                TasseledComponent::Disturbance => row(0) - row(1) - row(2),
            };
            Some(ind as i16)
        });
        Ok(())
    }
}
