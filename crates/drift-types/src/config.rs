// ─────────────────────────────────────────────────────────────────────
// Drift Chamber Core — Config
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
use crate::error::{DriftError, DriftResult};
use crate::state::validate_height;
use serde::{Deserialize, Serialize};

/// Top-level simulation configuration.
/// Every field is optional in JSON; missing sections fall back to defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    #[serde(default)]
    pub chamber: ChamberConfig,
    #[serde(default)]
    pub source: SourcePlane,
}

/// Physical and numerical parameters of one drift chamber.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChamberConfig {
    /// Grid spacing in cm (default: 1.0)
    #[serde(default = "default_spacing")]
    pub spacing_cm: f64,
    /// Electric field strength, V/m (default: 1e5)
    #[serde(default = "default_electric_field")]
    pub electric_field: f64,
    /// Electron diffusivity, m²/s (default: 0.1)
    #[serde(default = "default_diffusivity")]
    pub diffusivity: f64,
    /// Implicit timestep, s (default: 1e-6)
    #[serde(default = "default_timestep")]
    pub timestep_s: f64,
    /// Build the diffusion operator at construction. Disable for
    /// ionization-only studies at spacings where the operator is too large.
    #[serde(default = "default_build_operator")]
    pub build_operator: bool,
    #[serde(default)]
    pub factorization: FactorizationMethod,
}

/// How the implicit diffusion operator is factorized.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FactorizationMethod {
    /// ILU(0): no fill-in, approximate, cheap at any spacing.
    #[default]
    IncompleteLu,
    /// Exact LU in band storage; memory grows as cells × 2·cols.
    BandedLu,
}

/// Horizontal plane above the detector where muons are seeded.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SourcePlane {
    #[serde(default = "default_plane_width")]
    pub width_cm: f64,
    #[serde(default = "default_plane_length")]
    pub length_cm: f64,
    #[serde(default = "default_plane_height")]
    pub height_cm: f64,
}

fn default_spacing() -> f64 {
    1.0
}
fn default_electric_field() -> f64 {
    1e5
}
fn default_diffusivity() -> f64 {
    0.1
}
fn default_timestep() -> f64 {
    1e-6
}
fn default_build_operator() -> bool {
    true
}
fn default_plane_width() -> f64 {
    100.0
}
fn default_plane_length() -> f64 {
    80.0
}
fn default_plane_height() -> f64 {
    60.0
}

impl Default for ChamberConfig {
    fn default() -> Self {
        ChamberConfig {
            spacing_cm: default_spacing(),
            electric_field: default_electric_field(),
            diffusivity: default_diffusivity(),
            timestep_s: default_timestep(),
            build_operator: default_build_operator(),
            factorization: FactorizationMethod::default(),
        }
    }
}

impl Default for SourcePlane {
    fn default() -> Self {
        SourcePlane {
            width_cm: default_plane_width(),
            length_cm: default_plane_length(),
            height_cm: default_plane_height(),
        }
    }
}

impl ChamberConfig {
    pub fn with_spacing(spacing_cm: f64) -> Self {
        ChamberConfig {
            spacing_cm,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> DriftResult<()> {
        if !self.spacing_cm.is_finite() || self.spacing_cm <= 0.0 {
            return Err(DriftError::Configuration(format!(
                "spacing_cm must be finite and > 0, got {}",
                self.spacing_cm
            )));
        }
        validate_field(self.electric_field)?;
        validate_diffusivity(self.diffusivity)?;
        validate_timestep(self.timestep_s)?;
        Ok(())
    }
}

pub fn validate_field(electric_field: f64) -> DriftResult<()> {
    if !electric_field.is_finite() {
        return Err(DriftError::Configuration(format!(
            "electric_field must be finite, got {electric_field}"
        )));
    }
    Ok(())
}

pub fn validate_diffusivity(diffusivity: f64) -> DriftResult<()> {
    if !diffusivity.is_finite() || diffusivity < 0.0 {
        return Err(DriftError::Configuration(format!(
            "diffusivity must be finite and >= 0, got {diffusivity}"
        )));
    }
    Ok(())
}

pub fn validate_timestep(timestep_s: f64) -> DriftResult<()> {
    if !timestep_s.is_finite() || timestep_s <= 0.0 {
        return Err(DriftError::Configuration(format!(
            "timestep_s must be finite and > 0, got {timestep_s}"
        )));
    }
    Ok(())
}

impl SourcePlane {
    pub fn validate(&self) -> DriftResult<()> {
        if !self.width_cm.is_finite() || self.width_cm < 0.0 {
            return Err(DriftError::Configuration(format!(
                "source plane width must be finite and >= 0, got {}",
                self.width_cm
            )));
        }
        if !self.length_cm.is_finite() || self.length_cm < 0.0 {
            return Err(DriftError::Configuration(format!(
                "source plane length must be finite and >= 0, got {}",
                self.length_cm
            )));
        }
        validate_height(self.height_cm)
    }
}

impl SimulationConfig {
    /// Load from a JSON file and validate both sections.
    pub fn from_file(path: &str) -> DriftResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&contents)?;
        config.chamber.validate()?;
        config.source.validate()?;
        Ok(config)
    }
}
