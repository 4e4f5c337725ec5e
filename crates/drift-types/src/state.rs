// ─────────────────────────────────────────────────────────────────────
// Drift Chamber Core — State
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
use crate::constants::{DAMPING_MARGIN_CM, DETECTOR_HEIGHT_CM, DETECTOR_WIDTH_CM};
use crate::error::{DriftError, DriftResult};
use std::fmt;

/// Absorbs round-off in `extent / spacing` so 30 / 0.3 yields 100 cells, not 101.
const CELL_COUNT_EPSILON: f64 = 1e-9;

/// Number of cells needed to cover `extent_cm` at `spacing_cm`, rounded up.
pub fn cells_for(extent_cm: f64, spacing_cm: f64) -> usize {
    let ratio = extent_cm / spacing_cm - CELL_COUNT_EPSILON;
    ratio.ceil().max(0.0) as usize
}

/// Shape of the charge grid: rows run along z (height), cols along y.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridShape {
    pub rows: usize,
    pub cols: usize,
    pub spacing_cm: f64,
}

impl GridShape {
    pub fn from_spacing(spacing_cm: f64) -> DriftResult<Self> {
        if !spacing_cm.is_finite() || spacing_cm <= 0.0 {
            return Err(DriftError::Configuration(format!(
                "grid spacing must be finite and > 0, got {spacing_cm}"
            )));
        }
        Ok(GridShape {
            rows: cells_for(DETECTOR_HEIGHT_CM, spacing_cm),
            cols: cells_for(DETECTOR_WIDTH_CM, spacing_cm),
            spacing_cm,
        })
    }

    /// Total number of cells, i.e. the order of the diffusion operator.
    pub fn len(&self) -> usize {
        self.rows * self.cols
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Row-major flat index of cell `(row, col)`.
    #[inline]
    pub fn flat_index(&self, row: usize, col: usize) -> usize {
        row * self.cols + col
    }

    /// Inverse of [`GridShape::flat_index`].
    #[inline]
    pub fn cell(&self, flat: usize) -> (usize, usize) {
        (flat / self.cols, flat % self.cols)
    }

    /// Lateral extent of the detector in grid units.
    pub fn lateral_extent(&self) -> f64 {
        DETECTOR_WIDTH_CM / self.spacing_cm
    }

    /// Width of the damped border band in cells.
    pub fn damping_margin(&self) -> usize {
        cells_for(DAMPING_MARGIN_CM, self.spacing_cm)
    }
}

/// Incident cosmic-ray muon.
///
/// Positions are relative to the detector's bottom-left corner. `x_coord`
/// points into the page and plays no part in the 2D simulation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Particle {
    pub energy_gev: f64,
    pub charge: i8,
    pub zenith: f64,
    pub azimuth: f64,
    pub x_coord: f64,
    pub y_coord: f64,
    /// Height of the source plane above the detector bottom, >= 30 cm.
    pub height: f64,
}

impl Particle {
    /// Build a particle with a fixed direction, bypassing sampling.
    pub fn from_direction(zenith: f64, azimuth: f64, y_coord: f64, height: f64) -> DriftResult<Self> {
        validate_height(height)?;
        if !zenith.is_finite() || !azimuth.is_finite() || !y_coord.is_finite() {
            return Err(DriftError::Configuration(format!(
                "particle direction and position must be finite, got zenith={zenith}, azimuth={azimuth}, y={y_coord}"
            )));
        }
        Ok(Particle {
            energy_gev: 0.0,
            charge: -1,
            zenith,
            azimuth,
            x_coord: 0.0,
            y_coord,
            height,
        })
    }

    /// dy/dt along the trajectory.
    #[inline]
    pub fn lateral_direction(&self) -> f64 {
        self.zenith.sin() * self.azimuth.sin()
    }

    /// dz/dt along the trajectory; negative for downward-going particles.
    #[inline]
    pub fn vertical_direction(&self) -> f64 {
        self.zenith.cos()
    }
}

impl fmt::Display for Particle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Muon(energy: {:.0} GeV, charge: {:+}e, zenith: {:.3}, azimuth: {:.3}, x: {:.3}, y: {:.3})",
            self.energy_gev, self.charge, self.zenith, self.azimuth, self.x_coord, self.y_coord
        )
    }
}

/// The source plane must sit on or above the detector top.
pub fn validate_height(height_cm: f64) -> DriftResult<()> {
    if !height_cm.is_finite() || height_cm < DETECTOR_HEIGHT_CM {
        return Err(DriftError::Configuration(format!(
            "source plane height {height_cm} cm is below the detector top ({DETECTOR_HEIGHT_CM} cm)"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grid_shape_unit_spacing() {
        let shape = GridShape::from_spacing(1.0).unwrap();
        assert_eq!(shape.rows, 30);
        assert_eq!(shape.cols, 50);
        assert_eq!(shape.len(), 1500);
        assert_eq!(shape.damping_margin(), 2);
    }

    #[test]
    fn test_grid_shape_rounds_up_partial_cells() {
        let shape = GridShape::from_spacing(0.7).unwrap();
        assert_eq!(shape.rows, 43);
        assert_eq!(shape.cols, 72);
        assert_eq!(shape.damping_margin(), 3);
    }

    #[test]
    fn test_grid_shape_absorbs_roundoff() {
        let shape = GridShape::from_spacing(0.3).unwrap();
        assert_eq!(shape.rows, 100);
        let fine = GridShape::from_spacing(0.1).unwrap();
        assert_eq!((fine.rows, fine.cols), (300, 500));
        assert_eq!(fine.damping_margin(), 20);
    }

    #[test]
    fn test_grid_shape_rejects_bad_spacing() {
        assert!(GridShape::from_spacing(0.0).is_err());
        assert!(GridShape::from_spacing(-1.0).is_err());
        assert!(GridShape::from_spacing(f64::NAN).is_err());
    }

    #[test]
    fn test_flat_index_roundtrip() {
        let shape = GridShape::from_spacing(1.0).unwrap();
        for &(r, c) in &[(0, 0), (0, 49), (1, 0), (29, 49), (17, 3)] {
            assert_eq!(shape.cell(shape.flat_index(r, c)), (r, c));
        }
    }

    #[test]
    fn test_particle_height_validation() {
        assert!(Particle::from_direction(3.0, 1.0, 25.0, 29.9).is_err());
        assert!(Particle::from_direction(3.0, 1.0, 25.0, 30.0).is_ok());
        assert!(Particle::from_direction(f64::NAN, 1.0, 25.0, 60.0).is_err());
    }

    #[test]
    fn test_direction_cosines_straight_down() {
        let p = Particle::from_direction(std::f64::consts::PI, 0.5, 25.0, 60.0).unwrap();
        assert!((p.vertical_direction() + 1.0).abs() < 1e-12);
        assert!(p.lateral_direction().abs() < 1e-12);
    }
}
