//! Drift chamber simulation core.
//!
//! Muon generation and detector entry, ionization deposit along the track,
//! and the implicit drift-diffusion stepper for the chamber's charge grid.

pub mod chamber;
pub mod ionization;
pub mod operator;
pub mod particle;
