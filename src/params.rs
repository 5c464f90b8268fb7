// src/params.rs
use serde::{Deserialize, Serialize};

use crate::processing::dispatch::SpectralIndex;

/// Spectral mixture analysis parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SmaParams {
    /// Constrain fractions to be non-negative (Lawson-Hanson NNLS).
    pub positivity: bool,
    /// Augment the system with a sum-to-one row.
    pub sum_to_one: bool,
    /// Treat the last endmember as shade and renormalize the others.
    pub shade_normalize: bool,
    /// Also write the residual-RMSE plane set.
    pub emit_rms: bool,
    /// 1-based endmember whose fraction is retained in the output.
    pub endmember: usize,
}

impl Default for SmaParams {
    fn default() -> Self {
        Self {
            positivity: true,
            sum_to_one: true,
            shade_normalize: false,
            emit_rms: false,
            endmember: 1,
        }
    }
}

/// Time-series analysis job parameters: the selected indices and the
/// unmixing settings shared by all of them.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TsaParams {
    pub indices: Vec<SpectralIndex>,
    pub sma: SmaParams,
}
