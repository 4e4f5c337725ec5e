// ─────────────────────────────────────────────────────────────────────
// Drift Chamber Core — Sparse
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Compressed sparse row (CSR) storage assembled from `(row, col, value)`
//! triplets.
//!
//! Column indices within each row are sorted and unique, which the ILU(0)
//! factorization relies on for its binary searches.

use drift_types::error::{DriftError, DriftResult};

/// Collects `(row, col, value)` triplets before compression.
#[derive(Debug, Clone)]
pub struct TripletBuilder {
    n_rows: usize,
    n_cols: usize,
    entries: Vec<(usize, usize, f64)>,
}

impl TripletBuilder {
    pub fn new(n_rows: usize, n_cols: usize) -> Self {
        TripletBuilder {
            n_rows,
            n_cols,
            entries: Vec::new(),
        }
    }

    pub fn with_capacity(n_rows: usize, n_cols: usize, capacity: usize) -> Self {
        TripletBuilder {
            n_rows,
            n_cols,
            entries: Vec::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, row: usize, col: usize, value: f64) -> DriftResult<()> {
        if row >= self.n_rows || col >= self.n_cols {
            return Err(DriftError::LinAlg(format!(
                "triplet ({row}, {col}) outside {}x{} matrix",
                self.n_rows, self.n_cols
            )));
        }
        if !value.is_finite() {
            return Err(DriftError::LinAlg(format!(
                "triplet ({row}, {col}) has non-finite value {value}"
            )));
        }
        self.entries.push((row, col, value));
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Compress into CSR. Duplicate coordinates are summed.
    pub fn build(mut self) -> CsrMatrix {
        self.entries.sort_by(|a, b| (a.0, a.1).cmp(&(b.0, b.1)));

        let mut row_ptr = vec![0usize; self.n_rows + 1];
        let mut col_idx = Vec::with_capacity(self.entries.len());
        let mut values: Vec<f64> = Vec::with_capacity(self.entries.len());
        let mut last: Option<(usize, usize)> = None;

        for (row, col, value) in self.entries {
            if last == Some((row, col)) {
                if let Some(v) = values.last_mut() {
                    *v += value;
                }
                continue;
            }
            col_idx.push(col);
            values.push(value);
            row_ptr[row + 1] += 1;
            last = Some((row, col));
        }
        for i in 0..self.n_rows {
            row_ptr[i + 1] += row_ptr[i];
        }

        CsrMatrix {
            n_rows: self.n_rows,
            n_cols: self.n_cols,
            row_ptr,
            col_idx,
            values,
        }
    }
}

/// Sparse matrix in compressed sparse row layout.
#[derive(Debug, Clone, PartialEq)]
pub struct CsrMatrix {
    n_rows: usize,
    n_cols: usize,
    row_ptr: Vec<usize>,
    col_idx: Vec<usize>,
    values: Vec<f64>,
}

impl CsrMatrix {
    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    pub fn n_cols(&self) -> usize {
        self.n_cols
    }

    pub fn is_square(&self) -> bool {
        self.n_rows == self.n_cols
    }

    /// Number of stored entries.
    pub fn nnz(&self) -> usize {
        self.values.len()
    }

    pub fn row_ptr(&self) -> &[usize] {
        &self.row_ptr
    }

    pub fn col_idx(&self) -> &[usize] {
        &self.col_idx
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Column indices and values of one row.
    pub fn row(&self, row: usize) -> (&[usize], &[f64]) {
        let span = self.row_ptr[row]..self.row_ptr[row + 1];
        (&self.col_idx[span.clone()], &self.values[span])
    }

    /// Stored value at `(row, col)`, or 0 when the entry is structurally absent.
    pub fn get(&self, row: usize, col: usize) -> f64 {
        if row >= self.n_rows {
            return 0.0;
        }
        let (cols, vals) = self.row(row);
        match cols.binary_search(&col) {
            Ok(k) => vals[k],
            Err(_) => 0.0,
        }
    }

    /// Largest |row - col| over stored entries.
    pub fn bandwidth(&self) -> usize {
        (0..self.n_rows)
            .flat_map(|i| self.row(i).0.iter().map(move |&j| i.abs_diff(j)))
            .max()
            .unwrap_or(0)
    }

    /// y = A·x
    pub fn matvec(&self, x: &[f64]) -> DriftResult<Vec<f64>> {
        if x.len() != self.n_cols {
            return Err(DriftError::ShapeMismatch {
                expected: self.n_cols,
                got: x.len(),
            });
        }
        let y = (0..self.n_rows)
            .map(|i| {
                let (cols, vals) = self.row(i);
                cols.iter().zip(vals).map(|(&j, &v)| v * x[j]).sum()
            })
            .collect();
        Ok(y)
    }
}
