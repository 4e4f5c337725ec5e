//! Numerical primitives for the drift chamber core.
//!
//! Sparse CSR assembly, ILU(0) and exact banded LU factorizations for the
//! implicit drift-diffusion operator, plus the sampling distributions used
//! by the muon generator and ionization model.

pub mod banded;
pub mod distributions;
pub mod ilu;
pub mod sparse;
