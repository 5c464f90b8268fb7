// src/processing/kernels/unmix.rs
//! Spectral mixture analysis: per-pixel linear unmixing against a fixed
//! endmember matrix, unconstrained or non-negativity-constrained with the
//! Lawson-Hanson active-set algorithm. One fraction is retained in the
//! time series; residual RMSE goes to the rms planes when present.

use rayon::prelude::*;

use crate::endmember::Endmembers;
use crate::error::EngineResult;
use crate::params::SmaParams;
use crate::processing::kernels::IndexKernel;
use crate::processing::linalg;
use crate::stack::{ArdStack, TsOutput};
use crate::utils::fixed_point::scale_truncate_f64;

const TOL: f64 = f32::MIN_POSITIVE as f64;
/// "Not a candidate" marker in the min-ratio search; large enough that it
/// can never win against a real ratio in [0, 1].
const RATIO_SENTINEL: f64 = i32::MAX as f64;

const FRACTION_SCALE: f64 = 10000.0;

pub struct MixtureAnalysis {
    /// Endmember matrix, row-augmented with ones when sum-to-one is set.
    z: Vec<Vec<f64>>,
    /// Precomputed normal matrix Z^T Z.
    ztz: Vec<Vec<f64>>,
    /// Spectral bands in the stack (un-augmented row count).
    nbands: usize,
    /// Effective row count of `z`.
    rows: usize,
    /// Endmember count.
    count: usize,
    params: SmaParams,
}

/// Per-worker working vectors, sized once at parallel-region entry.
struct Scratch {
    x: Vec<f64>,
    ztx: Vec<f64>,
    d: Vec<f64>,
    s: Vec<f64>,
    w: Vec<f64>,
    a: Vec<f64>,
    passive: Vec<bool>,
}

impl Scratch {
    fn new(rows: usize, count: usize, sum_to_one: bool) -> Self {
        let mut x = vec![0.0; rows];
        if sum_to_one {
            x[rows - 1] = 1.0;
        }
        Self {
            x,
            ztx: vec![0.0; count],
            d: vec![0.0; count],
            s: vec![0.0; count],
            w: vec![0.0; count],
            a: vec![0.0; count],
            passive: vec![false; count],
        }
    }
}

impl MixtureAnalysis {
    pub fn new(endmembers: &Endmembers, params: SmaParams) -> Self {
        let nbands = endmembers.nbands();
        let count = endmembers.count();
        let rows = if params.sum_to_one { nbands + 1 } else { nbands };

        let mut z: Vec<Vec<f64>> = endmembers.rows().to_vec();
        if params.sum_to_one {
            z.push(vec![1.0; count]);
        }

        let mut ztz = vec![vec![0.0; count]; count];
        for i in 0..count {
            for j in i..count {
                let v: f64 = (0..rows).map(|k| z[k][i] * z[k][j]).sum();
                ztz[i][j] = v;
                ztz[j][i] = v;
            }
        }

        Self {
            z,
            ztz,
            nbands,
            rows,
            count,
            params,
        }
    }

    /// d = (Z^T Z)^-1 Z^T x on a scratch copy of the normal matrix.
    fn solve_unconstrained(&self, sc: &mut Scratch) {
        let mut ztz = self.ztz.clone();
        match linalg::solve_ridged(&mut ztz, &sc.ztx) {
            Some(d) => sc.d.copy_from_slice(&d),
            // degenerate endmember set; fall back to an even split
            None => sc.d.fill(1.0 / self.count as f64),
        }
    }

    /// Solve the passive-set subsystem, scatter the trial solution into
    /// `s` (active positions zeroed) and return min(s) over the passive
    /// set. An empty or singular subsystem yields all zeros.
    fn solve_passive(&self, passive: &[bool], ztx: &[f64], s: &mut [f64]) -> f64 {
        let members: Vec<usize> = (0..self.count).filter(|&i| passive[i]).collect();
        let np = members.len();
        s.fill(0.0);
        if np == 0 {
            return 0.0;
        }

        let mut sub = vec![vec![0.0; np]; np];
        let mut rhs = vec![0.0; np];
        for (ik, &i) in members.iter().enumerate() {
            rhs[ik] = ztx[i];
            for (jk, &j) in members.iter().enumerate() {
                sub[ik][jk] = self.ztz[i][j];
            }
        }

        match linalg::solve_ridged(&mut sub, &rhs) {
            Some(sol) => {
                let mut s_min = f64::INFINITY;
                for (ik, &i) in members.iter().enumerate() {
                    s[i] = sol[ik];
                    s_min = s_min.min(sol[ik]);
                }
                s_min
            }
            None => 0.0,
        }
    }

    /// Lawson-Hanson NNLS. `d` holds the solution on return; the inner
    /// loop is capped at 30*M iterations per pixel, after which the
    /// current trial is accepted.
    fn solve_constrained(&self, sc: &mut Scratch) {
        let m = self.count;
        let itmax = 30 * m;
        let mut it = 0;

        sc.passive.fill(false);
        sc.d.fill(0.0);
        sc.s.fill(0.0);
        sc.a.fill(RATIO_SENTINEL);

        // w = Z^T x - Z^T Z d
        for i in 0..m {
            sc.w[i] = sc.ztx[i] - linalg::dot(&self.ztz[i], &sc.d);
        }

        loop {
            if !sc.passive.iter().any(|&p| !p) {
                break;
            }
            let (mut best, mut w_max) = (0, f64::NEG_INFINITY);
            for i in 0..m {
                if sc.w[i] > w_max {
                    w_max = sc.w[i];
                    best = i;
                }
            }
            if w_max <= TOL {
                break;
            }

            // most violating index joins the passive set
            sc.passive[best] = true;

            let mut s_min = {
                let (passive, ztx, s) = (&sc.passive, &sc.ztx, &mut sc.s);
                self.solve_passive(passive, ztx, s)
            };

            while s_min <= 0.0 && it < itmax {
                it += 1;

                // step length toward the trial solution, limited by the
                // passive coefficients that would turn negative
                for i in 0..m {
                    sc.a[i] = if sc.passive[i] && sc.s[i] <= TOL {
                        sc.d[i] / (sc.d[i] - sc.s[i])
                    } else {
                        RATIO_SENTINEL
                    };
                }
                let alpha = sc.a.iter().copied().fold(f64::INFINITY, f64::min);

                for i in 0..m {
                    sc.d[i] += alpha * (sc.s[i] - sc.d[i]);
                }

                // coefficients driven to zero go back to the active set
                for i in 0..m {
                    if sc.passive[i] && sc.d[i].abs() < TOL {
                        sc.passive[i] = false;
                    }
                }

                s_min = {
                    let (passive, ztx, s) = (&sc.passive, &sc.ztx, &mut sc.s);
                    self.solve_passive(passive, ztx, s)
                };
            }

            sc.d.copy_from_slice(&sc.s);

            // refresh the gradient; passive entries are pinned below the
            // loop threshold so only the active set is tested
            for i in 0..m {
                sc.w[i] = if sc.passive[i] {
                    -1.0
                } else {
                    sc.ztx[i] - linalg::dot(&self.ztz[i], &sc.d)
                };
            }
        }
    }

    fn residual_rmse(&self, sc: &Scratch) -> f64 {
        let mut rsum = 0.0;
        for i in 0..self.rows {
            let fit = linalg::dot(&self.z[i], &sc.d);
            let res = sc.x[i] - fit;
            rsum += res * res;
        }
        (rsum / self.rows as f64).sqrt()
    }
}

impl IndexKernel for MixtureAnalysis {
    fn apply(
        &self,
        stack: &ArdStack,
        mask: Option<&[u8]>,
        out: &mut TsOutput,
        nodata: i16,
    ) -> EngineResult<()> {
        debug_assert_eq!(stack.nbands(), self.nbands);

        let nt = stack.ndates();
        let ncells = stack.ncells();
        let (tss, rms) = out.planes_mut();
        let rms_series: Vec<Option<&mut [i16]>> = match rms {
            Some(planes) => planes.chunks_mut(nt).map(Some).collect(),
            None => (0..ncells).map(|_| None).collect(),
        };

        tss.par_chunks_mut(nt)
            .zip(rms_series)
            .enumerate()
            .for_each_init(
                || Scratch::new(self.rows, self.count, self.params.sum_to_one),
                |sc, (p, (series, mut rms_series))| {
                    if mask.map_or(false, |m| m[p] == 0) {
                        series.fill(nodata);
                        if let Some(r) = rms_series.as_mut() {
                            r.fill(nodata);
                        }
                        return;
                    }

                    for t in 0..nt {
                        let frame = stack.frame(t);
                        if !frame.valid(p) {
                            series[t] = nodata;
                            if let Some(r) = rms_series.as_mut() {
                                r[t] = nodata;
                            }
                            continue;
                        }

                        for i in 0..self.nbands {
                            sc.x[i] = frame.band(i)[p] as f64 / FRACTION_SCALE;
                        }
                        for j in 0..self.count {
                            sc.ztx[j] = (0..self.rows).map(|i| self.z[i][j] * sc.x[i]).sum();
                        }

                        if self.params.positivity {
                            self.solve_constrained(sc);
                        } else {
                            self.solve_unconstrained(sc);
                        }

                        if let Some(r) = rms_series.as_mut() {
                            r[t] = scale_truncate_f64(self.residual_rmse(sc), FRACTION_SCALE);
                        }

                        // shade is by convention the last endmember
                        if self.params.shade_normalize {
                            let f = 1.0 / (1.0 - sc.d[self.count - 1]);
                            for i in 0..self.count - 1 {
                                sc.d[i] *= f;
                            }
                            sc.d[self.count - 1] = 0.0;
                        }

                        series[t] =
                            scale_truncate_f64(sc.d[self.params.endmember - 1], FRACTION_SCALE);
                    }
                },
            );
        Ok(())
    }
}
