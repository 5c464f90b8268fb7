// src/error.rs
use thiserror::Error;

use crate::sensor::BandRole;

/// Errors raised before a kernel is launched. Per-cell arithmetic failures
/// are encoded as the nodata sentinel and never surface here.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("stack is inconsistent: {0}")]
    Stack(String),

    #[error("output holds {out_dates} dates x {out_cells} cells, stack holds {stack_dates} x {stack_cells}")]
    OutputShape {
        out_dates: usize,
        out_cells: usize,
        stack_dates: usize,
        stack_cells: usize,
    },

    #[error("mask length {got} does not match {expected} cells")]
    MaskLength { got: usize, expected: usize },

    #[error("band role {0} is not mapped for this sensor")]
    MissingBand(BandRole),

    #[error("no central wavelength mapped for band role {0}")]
    MissingWavelength(BandRole),

    #[error("band index {band} out of range for {nbands}-band stack")]
    BandRange { band: usize, nbands: usize },

    #[error("spectral mixture analysis requires an endmember table")]
    MissingEndmembers,

    #[error("endmember table is empty or ragged")]
    BadEndmemberTable,

    #[error("endmember table has {endmember} bands but the stack has {stack}")]
    EndmemberBands { endmember: usize, stack: usize },

    #[error("selected endmember {selected} out of range 1..={count}")]
    EndmemberSelection { selected: usize, count: usize },

    #[error("residual output requested but the output carries no rms planes")]
    MissingResidualPlanes,
}

pub type EngineResult<T> = Result<T, EngineError>;
