// ─────────────────────────────────────────────────────────────────────
// Drift Chamber Core — ILU
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Zero fill-in incomplete LU factorization, ILU(0).
//!
//! L (unit lower) and U share the sparsity pattern of A and are stored in a
//! single CSR value array: entries left of the diagonal hold L, the rest U.
//! For the M-matrices produced by the drift-diffusion stencil both factors
//! keep the M-matrix sign pattern, so solves with a non-negative right-hand
//! side stay non-negative.

use crate::sparse::CsrMatrix;
use drift_types::error::{DriftError, DriftResult};

#[derive(Debug, Clone)]
pub struct Ilu0 {
    n: usize,
    row_ptr: Vec<usize>,
    col_idx: Vec<usize>,
    values: Vec<f64>,
    diag_pos: Vec<usize>,
}

impl Ilu0 {
    /// Factorize a square matrix. Every row must store its diagonal.
    pub fn factorize(a: &CsrMatrix) -> DriftResult<Self> {
        if !a.is_square() {
            return Err(DriftError::LinAlg(format!(
                "ILU(0) requires a square matrix, got {}x{}",
                a.n_rows(),
                a.n_cols()
            )));
        }
        let n = a.n_rows();
        let row_ptr = a.row_ptr().to_vec();
        let col_idx = a.col_idx().to_vec();
        let mut values = a.values().to_vec();

        let mut diag_pos = Vec::with_capacity(n);
        for i in 0..n {
            let span = &col_idx[row_ptr[i]..row_ptr[i + 1]];
            match span.binary_search(&i) {
                Ok(k) => diag_pos.push(row_ptr[i] + k),
                Err(_) => {
                    return Err(DriftError::LinAlg(format!(
                        "ILU(0): row {i} has no stored diagonal"
                    )))
                }
            }
        }

        for i in 0..n {
            for kk in row_ptr[i]..diag_pos[i] {
                let k = col_idx[kk];
                let pivot = values[diag_pos[k]];
                check_pivot(pivot, k)?;
                let l_ik = values[kk] / pivot;
                values[kk] = l_ik;
                if l_ik == 0.0 {
                    continue;
                }
                // a_ij -= l_ik * u_kj for every j > k present in both rows
                let upper_k = &col_idx[diag_pos[k] + 1..row_ptr[k + 1]];
                for jj in kk + 1..row_ptr[i + 1] {
                    let j = col_idx[jj];
                    if let Ok(off) = upper_k.binary_search(&j) {
                        let u_kj = values[diag_pos[k] + 1 + off];
                        values[jj] -= l_ik * u_kj;
                    }
                }
            }
            check_pivot(values[diag_pos[i]], i)?;
        }

        Ok(Ilu0 {
            n,
            row_ptr,
            col_idx,
            values,
            diag_pos,
        })
    }

    pub fn order(&self) -> usize {
        self.n
    }

    /// Solve (L·U)·x = b by forward then backward substitution.
    pub fn solve(&self, b: &[f64]) -> DriftResult<Vec<f64>> {
        if b.len() != self.n {
            return Err(DriftError::ShapeMismatch {
                expected: self.n,
                got: b.len(),
            });
        }

        let mut x = b.to_vec();
        for i in 0..self.n {
            let mut acc = x[i];
            for kk in self.row_ptr[i]..self.diag_pos[i] {
                acc -= self.values[kk] * x[self.col_idx[kk]];
            }
            x[i] = acc;
        }
        for i in (0..self.n).rev() {
            let mut acc = x[i];
            for jj in self.diag_pos[i] + 1..self.row_ptr[i + 1] {
                acc -= self.values[jj] * x[self.col_idx[jj]];
            }
            x[i] = acc / self.values[self.diag_pos[i]];
        }

        if x.iter().any(|v| !v.is_finite()) {
            return Err(DriftError::LinAlg(
                "ILU(0) solve produced non-finite values".into(),
            ));
        }
        Ok(x)
    }
}

fn check_pivot(pivot: f64, row: usize) -> DriftResult<()> {
    if pivot == 0.0 || !pivot.is_finite() {
        return Err(DriftError::LinAlg(format!(
            "ILU(0): singular pivot {pivot} at row {row}"
        )));
    }
    Ok(())
}
