// ─────────────────────────────────────────────────────────────────────
// Drift Chamber Core — Banded LU
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Exact LU factorization in band storage, without pivoting.
//!
//! Generalizes the Thomas algorithm from bandwidth 1 to bandwidth `p`.
//! Without pivoting, fill-in stays inside the band, so storage is
//! `n × (2p + 1)` and factorization costs O(n·p²). Suitable for the
//! diagonally dominant drift-diffusion operator.

use crate::sparse::CsrMatrix;
use drift_types::error::{DriftError, DriftResult};

#[derive(Debug, Clone)]
pub struct BandedLu {
    n: usize,
    bandwidth: usize,
    /// Row i, column j lives at `i * (2p + 1) + (j + p - i)`.
    band: Vec<f64>,
}

impl BandedLu {
    /// Factorize `a`, which must be square with every entry within
    /// `bandwidth` of the diagonal.
    pub fn factorize(a: &CsrMatrix, bandwidth: usize) -> DriftResult<Self> {
        if !a.is_square() {
            return Err(DriftError::LinAlg(format!(
                "banded LU requires a square matrix, got {}x{}",
                a.n_rows(),
                a.n_cols()
            )));
        }
        let n = a.n_rows();
        let width = 2 * bandwidth + 1;
        let mut lu = BandedLu {
            n,
            bandwidth,
            band: vec![0.0; n * width],
        };

        for i in 0..n {
            let (cols, vals) = a.row(i);
            for (&j, &v) in cols.iter().zip(vals) {
                if i.abs_diff(j) > bandwidth {
                    return Err(DriftError::LinAlg(format!(
                        "entry ({i}, {j}) lies outside bandwidth {bandwidth}"
                    )));
                }
                let k = lu.at(i, j);
                lu.band[k] = v;
            }
        }

        for k in 0..n {
            let pivot = lu.band[lu.at(k, k)];
            if pivot == 0.0 || !pivot.is_finite() {
                return Err(DriftError::LinAlg(format!(
                    "banded LU: singular pivot {pivot} at row {k}"
                )));
            }
            let last = (k + bandwidth).min(n - 1);
            for i in k + 1..=last {
                let ik = lu.at(i, k);
                let l_ik = lu.band[ik] / pivot;
                lu.band[ik] = l_ik;
                if l_ik == 0.0 {
                    continue;
                }
                for j in k + 1..=last {
                    let u_kj = lu.band[lu.at(k, j)];
                    let ij = lu.at(i, j);
                    lu.band[ij] -= l_ik * u_kj;
                }
            }
        }

        Ok(lu)
    }

    #[inline]
    fn at(&self, i: usize, j: usize) -> usize {
        i * (2 * self.bandwidth + 1) + (j + self.bandwidth - i)
    }

    pub fn order(&self) -> usize {
        self.n
    }

    pub fn bandwidth(&self) -> usize {
        self.bandwidth
    }

    pub fn solve(&self, b: &[f64]) -> DriftResult<Vec<f64>> {
        if b.len() != self.n {
            return Err(DriftError::ShapeMismatch {
                expected: self.n,
                got: b.len(),
            });
        }
        let p = self.bandwidth;
        let mut x = b.to_vec();

        // Forward: L has a unit diagonal
        for i in 0..self.n {
            let first = i.saturating_sub(p);
            let mut acc = x[i];
            for j in first..i {
                acc -= self.band[self.at(i, j)] * x[j];
            }
            x[i] = acc;
        }

        // Backward
        for i in (0..self.n).rev() {
            let last = (i + p).min(self.n - 1);
            let mut acc = x[i];
            for j in i + 1..=last {
                acc -= self.band[self.at(i, j)] * x[j];
            }
            x[i] = acc / self.band[self.at(i, i)];
        }

        if x.iter().any(|v| !v.is_finite()) {
            return Err(DriftError::LinAlg(
                "banded LU solve produced non-finite values".into(),
            ));
        }
        Ok(x)
    }
}
