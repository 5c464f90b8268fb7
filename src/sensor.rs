// src/sensor.rs
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

/// Semantic band names resolved to band indices by [`SensorBands`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BandRole {
    Blue,
    Green,
    Red,
    Nir,
    Swir0,
    Swir1,
    Swir2,
    BroadNir,
    RedEdge1,
    RedEdge2,
    RedEdge3,
    Vv,
    Vh,
}

impl fmt::Display for BandRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BandRole::Blue => "blue",
            BandRole::Green => "green",
            BandRole::Red => "red",
            BandRole::Nir => "nir",
            BandRole::Swir0 => "swir0",
            BandRole::Swir1 => "swir1",
            BandRole::Swir2 => "swir2",
            BandRole::BroadNir => "bnir",
            BandRole::RedEdge1 => "rededge1",
            BandRole::RedEdge2 => "rededge2",
            BandRole::RedEdge3 => "rededge3",
            BandRole::Vv => "vv",
            BandRole::Vh => "vh",
        };
        f.write_str(name)
    }
}

/// Band-role map of one sensor: which plane of the ARD frame carries each
/// role, plus central wavelengths (micrometers) for continuum removal.
/// Roles the sensor does not provide stay `None`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SensorBands {
    pub blue: Option<usize>,
    pub green: Option<usize>,
    pub red: Option<usize>,
    pub nir: Option<usize>,
    pub swir0: Option<usize>,
    pub swir1: Option<usize>,
    pub swir2: Option<usize>,
    pub bnir: Option<usize>,
    pub rededge1: Option<usize>,
    pub rededge2: Option<usize>,
    pub rededge3: Option<usize>,
    pub vv: Option<usize>,
    pub vh: Option<usize>,
    pub w_nir: Option<f32>,
    pub w_swir1: Option<f32>,
    pub w_swir2: Option<f32>,
}

impl SensorBands {
    /// Landsat 8/9 OLI surface reflectance layout (blue..swir2).
    pub fn landsat_oli() -> Self {
        Self {
            blue: Some(0),
            green: Some(1),
            red: Some(2),
            nir: Some(3),
            bnir: Some(3),
            swir1: Some(4),
            swir2: Some(5),
            w_nir: Some(0.865),
            w_swir1: Some(1.609),
            w_swir2: Some(2.201),
            ..Self::default()
        }
    }

    /// Sentinel-2 MSI layout with the 20 m red-edge and narrow NIR bands.
    pub fn sentinel2() -> Self {
        Self {
            blue: Some(0),
            green: Some(1),
            red: Some(2),
            rededge1: Some(3),
            rededge2: Some(4),
            rededge3: Some(5),
            bnir: Some(6),
            nir: Some(7),
            swir1: Some(8),
            swir2: Some(9),
            w_nir: Some(0.864),
            w_swir1: Some(1.610),
            w_swir2: Some(2.186),
            ..Self::default()
        }
    }

    fn get(&self, role: BandRole) -> Option<usize> {
        match role {
            BandRole::Blue => self.blue,
            BandRole::Green => self.green,
            BandRole::Red => self.red,
            BandRole::Nir => self.nir,
            BandRole::Swir0 => self.swir0,
            BandRole::Swir1 => self.swir1,
            BandRole::Swir2 => self.swir2,
            BandRole::BroadNir => self.bnir,
            BandRole::RedEdge1 => self.rededge1,
            BandRole::RedEdge2 => self.rededge2,
            BandRole::RedEdge3 => self.rededge3,
            BandRole::Vv => self.vv,
            BandRole::Vh => self.vh,
        }
    }

    /// Band index for a role, or an error naming the missing role.
    pub fn require(&self, role: BandRole) -> EngineResult<usize> {
        self.get(role).ok_or(EngineError::MissingBand(role))
    }

    /// Central wavelength for the roles continuum removal interpolates over.
    pub fn wavelength(&self, role: BandRole) -> EngineResult<f32> {
        let w = match role {
            BandRole::Nir => self.w_nir,
            BandRole::Swir1 => self.w_swir1,
            BandRole::Swir2 => self.w_swir2,
            _ => None,
        };
        w.ok_or(EngineError::MissingWavelength(role))
    }
}
