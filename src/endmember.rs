// src/endmember.rs
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

/// Endmember matrix for spectral mixture analysis: one row per spectral
/// band, one column per endmember, values scaled to reflectance in [0, 1].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "Vec<Vec<f64>>", into = "Vec<Vec<f64>>")]
pub struct Endmembers {
    table: Vec<Vec<f64>>,
}

impl Endmembers {
    pub fn from_rows(table: Vec<Vec<f64>>) -> EngineResult<Self> {
        let ne = match table.first() {
            Some(row) if !row.is_empty() => row.len(),
            _ => return Err(EngineError::BadEndmemberTable),
        };
        if table.iter().any(|row| row.len() != ne) {
            return Err(EngineError::BadEndmemberTable);
        }
        Ok(Self { table })
    }

    /// Number of spectral bands (rows).
    pub fn nbands(&self) -> usize {
        self.table.len()
    }

    /// Number of endmembers (columns).
    pub fn count(&self) -> usize {
        self.table[0].len()
    }

    #[inline]
    pub fn value(&self, band: usize, endmember: usize) -> f64 {
        self.table[band][endmember]
    }

    pub fn rows(&self) -> &[Vec<f64>] {
        &self.table
    }
}

impl TryFrom<Vec<Vec<f64>>> for Endmembers {
    type Error = EngineError;

    fn try_from(table: Vec<Vec<f64>>) -> EngineResult<Self> {
        Self::from_rows(table)
    }
}

impl From<Endmembers> for Vec<Vec<f64>> {
    fn from(e: Endmembers) -> Self {
        e.table
    }
}
