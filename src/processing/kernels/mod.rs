// src/processing/kernels/mod.rs
use rayon::prelude::*;

use crate::error::EngineResult;
use crate::stack::{ArdFrame, ArdStack, TsOutput};

pub mod band;
pub mod contremove;
pub mod kernelized;
pub mod msr;
pub mod normdiff;
pub mod ratio;
pub mod resistance;
pub mod tasseled;
pub mod unmix;

pub use band::BandCopy;
pub use contremove::ContinuumRemoval;
pub use kernelized::KernelizedNdvi;
pub use msr::ModifiedSimpleRatio;
pub use normdiff::NormalizedDifference;
pub use ratio::RatioMinusOne;
pub use resistance::ResistanceIndex;
pub use tasseled::{TasseledCap, TasseledComponent};
pub use unmix::MixtureAnalysis;

/// A per-pixel index kernel. `apply` writes every cell of `out`.
pub trait IndexKernel: Send + Sync {
    fn apply(
        &self,
        stack: &ArdStack,
        mask: Option<&[u8]>,
        out: &mut TsOutput,
        nodata: i16,
    ) -> EngineResult<()>;
}

/// Shared pixel loop of the closed-form kernels: statically partitioned
/// over cells, mask-gated, one `eval` per valid (date, cell). `None`
/// from `eval` encodes a domain-invalid result.
pub(crate) fn scalar_series<F>(
    stack: &ArdStack,
    mask: Option<&[u8]>,
    out: &mut TsOutput,
    nodata: i16,
    eval: F,
) where
    F: Fn(&ArdFrame, usize) -> Option<i16> + Sync,
{
    let nt = stack.ndates();
    let (tss, _) = out.planes_mut();
    tss.par_chunks_mut(nt).enumerate().for_each(|(p, series)| {
        if mask.map_or(false, |m| m[p] == 0) {
            series.fill(nodata);
            return;
        }
        for (t, cell) in series.iter_mut().enumerate() {
            let frame = stack.frame(t);
            *cell = if frame.valid(p) {
                eval(frame, p).unwrap_or(nodata)
            } else {
                nodata
            };
        }
    });
}
