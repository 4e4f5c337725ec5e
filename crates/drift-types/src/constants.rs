// ─────────────────────────────────────────────────────────────────────
// Drift Chamber Core — Constants
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Detector geometry and physical constants.
//!
//! Lengths are in cm unless the name says otherwise. The detector origin
//! sits at its bottom-left corner: y runs horizontally, z vertically.

/// Vertical extent of the detector (cm).
pub const DETECTOR_HEIGHT_CM: f64 = 30.0;

/// Horizontal extent of the detector (cm).
pub const DETECTOR_WIDTH_CM: f64 = 50.0;

/// Offset applied to the sampled y coordinate to center the source plane
/// over the detector (cm).
pub const SOURCE_Y_OFFSET_CM: f64 = 25.0;

/// Border band zeroed after every diffusion step (cm).
pub const DAMPING_MARGIN_CM: f64 = 2.0;

/// Most probable ionization yield per cm of gas (electrons/cm).
pub const MOYAL_ELECTRONS_PER_CM: f64 = 94.0;

/// Drift coupling unit-conversion constant k in β = τ·E·k / (2·h).
pub const DRIFT_CONSTANT: f64 = 0.02;

/// cm → m.
pub const CM_TO_M: f64 = 1e-2;

/// Log-normal location of the muon energy distribution (ln GeV).
pub const ENERGY_LOGNORMAL_MU: f64 = 6.55;

/// Log-normal scale of the muon energy distribution.
pub const ENERGY_LOGNORMAL_SIGMA: f64 = 1.8;

/// Probability that a generated muon is positively charged (μ+/μ− excess).
pub const POSITIVE_CHARGE_PROBABILITY: f64 = 0.53;

/// Cap on zenith rejection-sampling draws. Mean acceptance is 1/2, so
/// hitting this is practically impossible with a healthy RNG.
pub const MAX_ZENITH_ATTEMPTS: usize = 10_000;

/// Default cap on generate-and-retry loops for particles that miss.
pub const DEFAULT_MAX_GENERATION_ATTEMPTS: usize = 10_000;
