// ─────────────────────────────────────────────────────────────────────
// Drift Chamber Core — Distributions
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Sampling helpers: the Moyal energy-loss distribution and a capped,
//! generic rejection sampler.

use drift_types::error::{DriftError, DriftResult};
use rand::Rng;
use rand_distr::{Distribution, StandardNormal};

/// Euler–Mascheroni constant.
const EULER_GAMMA: f64 = 0.577_215_664_901_532_9;

/// Moyal distribution, a closed-form approximation of the Landau
/// energy-loss distribution.
///
/// If Z ~ N(0, 1) then −ln(Z²) follows the standard Moyal law, so a
/// sample is `loc − scale·ln(Z²)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Moyal {
    loc: f64,
    scale: f64,
}

impl Moyal {
    pub fn new(loc: f64, scale: f64) -> DriftResult<Self> {
        if !loc.is_finite() {
            return Err(DriftError::Configuration(format!(
                "Moyal location must be finite, got {loc}"
            )));
        }
        if !scale.is_finite() || scale <= 0.0 {
            return Err(DriftError::Configuration(format!(
                "Moyal scale must be finite and > 0, got {scale}"
            )));
        }
        Ok(Moyal { loc, scale })
    }

    pub fn loc(&self) -> f64 {
        self.loc
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// Mean: loc + scale·(γ + ln 2).
    pub fn mean(&self) -> f64 {
        self.loc + self.scale * (EULER_GAMMA + std::f64::consts::LN_2)
    }

    /// Variance: π²·scale²/2.
    pub fn variance(&self) -> f64 {
        std::f64::consts::PI.powi(2) * self.scale * self.scale / 2.0
    }

    pub fn pdf(&self, x: f64) -> f64 {
        let u = (x - self.loc) / self.scale;
        (-(u + (-u).exp()) / 2.0).exp() / ((2.0 * std::f64::consts::PI).sqrt() * self.scale)
    }
}

impl Distribution<f64> for Moyal {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        let z: f64 = rng.sample(StandardNormal);
        // Z = 0 has probability zero but would map to +inf.
        let z2 = (z * z).max(f64::MIN_POSITIVE);
        self.loc - self.scale * z2.ln()
    }
}

/// Draw from the density proportional to `acceptance` on the open interval
/// `(lower, upper)`.
///
/// `acceptance` must map the interval into [0, 1]. Each attempt draws a
/// uniform candidate and a uniform `u ∈ [0, 1)`, accepting when
/// `u < acceptance(candidate)`. Gives up after `max_attempts` draws.
pub fn rejection_sample<R, F>(
    rng: &mut R,
    lower: f64,
    upper: f64,
    acceptance: F,
    max_attempts: usize,
    label: &'static str,
) -> DriftResult<f64>
where
    R: Rng + ?Sized,
    F: Fn(f64) -> f64,
{
    if !lower.is_finite() || !upper.is_finite() || lower >= upper {
        return Err(DriftError::Configuration(format!(
            "{label}: invalid sampling interval ({lower}, {upper})"
        )));
    }
    for _ in 0..max_attempts {
        let candidate = rng.gen_range(lower..upper);
        if candidate <= lower {
            continue;
        }
        let u: f64 = rng.gen();
        if u < acceptance(candidate) {
            return Ok(candidate);
        }
    }
    Err(DriftError::SamplingExhausted {
        what: label,
        attempts: max_attempts,
    })
}
