// ─────────────────────────────────────────────────────────────────────
// Drift Chamber Core — Error
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
use crate::state::Particle;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DriftError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Expected outcome for a large share of generated particles; callers
    /// regenerate and retry.
    #[error("{particle} -> particle has missed detector")]
    MissedDetector { particle: Particle },

    #[error("Sampling exhausted after {attempts} attempts: {what}")]
    SamplingExhausted { what: &'static str, attempts: usize },

    #[error("Linear algebra error: {0}")]
    LinAlg(String),

    #[error("Shape mismatch: expected {expected} elements, got {got}")]
    ShapeMismatch { expected: usize, got: usize },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl DriftError {
    /// True for the recoverable "regenerate and retry" outcome.
    pub fn is_missed_detector(&self) -> bool {
        matches!(self, DriftError::MissedDetector { .. })
    }
}

pub type DriftResult<T> = Result<T, DriftError>;
