// ─────────────────────────────────────────────────────────────────────
// Drift Chamber Core — Operator
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Implicit drift-diffusion operator and its cached factorization.
//!
//! Backward-Euler discretization of ∂q/∂t = D∇²q − v·∂q/∂y on the charge
//! grid gives A·q_{n+1} = q_n with, for flat index p = row·cols + col:
//!
//! ```text
//!   A[p, p]        = 1 + 4α + β
//!   A[p, p + 1]    = −α
//!   A[p, p − 1]    = −α − β
//!   A[p, p ± cols] = −α
//! ```
//!
//! α = D·τ/h², β = τ·E·k/(2h), h in metres. The ±1 couplings are applied on
//! the flat index, so the last column of one row is linked to the first
//! column of the next. The stepper damps the border band to hide the
//! resulting wraparound charge.

use drift_math::banded::BandedLu;
use drift_math::ilu::Ilu0;
use drift_math::sparse::{CsrMatrix, TripletBuilder};
use drift_types::config::FactorizationMethod;
use drift_types::constants::{CM_TO_M, DRIFT_CONSTANT};
use drift_types::error::DriftResult;
use drift_types::state::GridShape;

/// Diffusion coupling α = D·τ/h².
pub fn diffusion_coupling(diffusivity: f64, timestep_s: f64, spacing_cm: f64) -> f64 {
    let h = spacing_cm * CM_TO_M;
    diffusivity * timestep_s / (h * h)
}

/// Drift coupling β = τ·E·k/(2h).
pub fn drift_coupling(electric_field: f64, timestep_s: f64, spacing_cm: f64) -> f64 {
    let h = spacing_cm * CM_TO_M;
    timestep_s * electric_field * DRIFT_CONSTANT / (2.0 * h)
}

/// Assemble the pentadiagonal operator for `shape` from explicit triplets.
pub fn build_operator(shape: &GridShape, alpha: f64, beta: f64) -> DriftResult<CsrMatrix> {
    let n = shape.len();
    let cols = shape.cols;
    let mut triplets = TripletBuilder::with_capacity(n, n, 5 * n);

    for p in 0..n {
        triplets.push(p, p, 1.0 + 4.0 * alpha + beta)?;
        if p + 1 < n {
            triplets.push(p, p + 1, -alpha)?;
        }
        if p >= 1 {
            triplets.push(p, p - 1, -alpha - beta)?;
        }
        if p + cols < n {
            triplets.push(p, p + cols, -alpha)?;
        }
        if p >= cols {
            triplets.push(p, p - cols, -alpha)?;
        }
    }

    Ok(triplets.build())
}

/// A reusable solver for the operator.
#[derive(Debug, Clone)]
pub enum Factorization {
    Incomplete(Ilu0),
    Banded(BandedLu),
}

impl Factorization {
    pub fn new(matrix: &CsrMatrix, shape: &GridShape, method: FactorizationMethod) -> DriftResult<Self> {
        match method {
            FactorizationMethod::IncompleteLu => Ok(Factorization::Incomplete(Ilu0::factorize(matrix)?)),
            FactorizationMethod::BandedLu => {
                Ok(Factorization::Banded(BandedLu::factorize(matrix, shape.cols)?))
            }
        }
    }

    pub fn method(&self) -> FactorizationMethod {
        match self {
            Factorization::Incomplete(_) => FactorizationMethod::IncompleteLu,
            Factorization::Banded(_) => FactorizationMethod::BandedLu,
        }
    }

    pub fn order(&self) -> usize {
        match self {
            Factorization::Incomplete(f) => f.order(),
            Factorization::Banded(f) => f.order(),
        }
    }

    pub fn solve(&self, rhs: &[f64]) -> DriftResult<Vec<f64>> {
        match self {
            Factorization::Incomplete(f) => f.solve(rhs),
            Factorization::Banded(f) => f.solve(rhs),
        }
    }
}

/// Operator and factorization together with the `(α, β)` they were built for.
#[derive(Debug, Clone)]
pub struct OperatorCache {
    alpha: f64,
    beta: f64,
    matrix: CsrMatrix,
    factorization: Factorization,
}

impl OperatorCache {
    pub fn build(shape: &GridShape, alpha: f64, beta: f64, method: FactorizationMethod) -> DriftResult<Self> {
        let matrix = build_operator(shape, alpha, beta)?;
        let factorization = Factorization::new(&matrix, shape, method)?;
        Ok(OperatorCache {
            alpha,
            beta,
            matrix,
            factorization,
        })
    }

    /// Exact comparison: any parameter change must trigger a rebuild.
    pub fn is_current(&self, alpha: f64, beta: f64, method: FactorizationMethod) -> bool {
        self.alpha == alpha && self.beta == beta && self.factorization.method() == method
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    pub fn beta(&self) -> f64 {
        self.beta
    }

    pub fn matrix(&self) -> &CsrMatrix {
        &self.matrix
    }

    pub fn factorization(&self) -> &Factorization {
        &self.factorization
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_couplings_default_chamber() {
        // D = 0.1 m²/s, τ = 1 µs, h = 1 cm, E = 1e5 V/m
        let alpha = diffusion_coupling(0.1, 1e-6, 1.0);
        let beta = drift_coupling(1e5, 1e-6, 1.0);
        assert!((alpha - 1e-3).abs() < 1e-15, "alpha = {alpha}");
        assert!((beta - 0.1).abs() < 1e-12, "beta = {beta}");
    }

    #[test]
    fn test_couplings_scale_with_spacing() {
        let a1 = diffusion_coupling(0.1, 1e-6, 1.0);
        let a2 = diffusion_coupling(0.1, 1e-6, 0.5);
        assert!((a2 / a1 - 4.0).abs() < 1e-12);
        let b1 = drift_coupling(1e5, 1e-6, 1.0);
        let b2 = drift_coupling(1e5, 1e-6, 0.5);
        assert!((b2 / b1 - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_operator_diagonals() {
        let shape = GridShape::from_spacing(5.0).unwrap(); // 6 × 10
        let (alpha, beta) = (0.25, 0.5);
        let a = build_operator(&shape, alpha, beta).unwrap();
        let n = shape.len();
        assert_eq!(a.n_rows(), 60);
        assert!((a.get(0, 0) - (1.0 + 4.0 * alpha + beta)).abs() < 1e-15);
        assert!((a.get(0, 1) + alpha).abs() < 1e-15);
        assert!((a.get(1, 0) + alpha + beta).abs() < 1e-15);
        assert!((a.get(0, 10) + alpha).abs() < 1e-15);
        assert!((a.get(10, 0) + alpha).abs() < 1e-15);
        assert_eq!(a.get(0, 2), 0.0);
        // Corner rows lose the out-of-range neighbours
        assert_eq!(a.row(0).0.len(), 3);
        assert_eq!(a.row(n - 1).0.len(), 3);
        assert_eq!(a.nnz(), 5 * n - 2 - 2 * shape.cols);
        assert_eq!(a.bandwidth(), shape.cols);
    }

    #[test]
    fn test_operator_wraps_between_rows() {
        let shape = GridShape::from_spacing(5.0).unwrap();
        let a = build_operator(&shape, 0.25, 0.5).unwrap();
        // last column of row 0 couples to first column of row 1
        let end_of_row = shape.flat_index(0, shape.cols - 1);
        let start_of_next = shape.flat_index(1, 0);
        assert!((a.get(end_of_row, start_of_next) + 0.25).abs() < 1e-15);
        assert!((a.get(start_of_next, end_of_row) + 0.75).abs() < 1e-15);
    }

    #[test]
    fn test_factorizations_agree_for_weak_coupling() {
        let shape = GridShape::from_spacing(2.0).unwrap();
        let ilu = OperatorCache::build(&shape, 1e-3, 0.1, FactorizationMethod::IncompleteLu).unwrap();
        let lu = OperatorCache::build(&shape, 1e-3, 0.1, FactorizationMethod::BandedLu).unwrap();
        let rhs: Vec<f64> = (0..shape.len()).map(|i| (i % 9) as f64).collect();
        let x_ilu = ilu.factorization().solve(&rhs).unwrap();
        let x_lu = lu.factorization().solve(&rhs).unwrap();
        for (a, b) in x_ilu.iter().zip(&x_lu) {
            assert!((a - b).abs() < 1e-2, "{a} vs {b}");
        }
    }

    #[test]
    fn test_cache_currency() {
        let shape = GridShape::from_spacing(5.0).unwrap();
        let cache = OperatorCache::build(&shape, 0.1, 0.2, FactorizationMethod::IncompleteLu).unwrap();
        assert!(cache.is_current(0.1, 0.2, FactorizationMethod::IncompleteLu));
        assert!(!cache.is_current(0.1, 0.3, FactorizationMethod::IncompleteLu));
        assert!(!cache.is_current(0.11, 0.2, FactorizationMethod::IncompleteLu));
        assert!(!cache.is_current(0.1, 0.2, FactorizationMethod::BandedLu));
        assert_eq!(cache.factorization().order(), shape.len());
    }
}
