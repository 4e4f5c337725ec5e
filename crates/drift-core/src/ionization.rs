// ─────────────────────────────────────────────────────────────────────
// Drift Chamber Core — Ionization
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Ionization deposit along a straight muon track.
//!
//! The track is walked cell by cell from its entry point (a 2D DDA in grid
//! units). Every segment draws an electron count from the energy-loss model
//! and writes it, as a density, into the cell the segment crosses.

use crate::chamber::DriftChamber;
use crate::particle::trajectory_entry;
use drift_math::distributions::Moyal;
use drift_types::constants::MOYAL_ELECTRONS_PER_CM;
use drift_types::error::DriftResult;
use drift_types::state::Particle;
use log::{trace, warn};
use rand::Rng;
use rand_distr::Distribution;

/// Track parameters (grid units) closer than this count as one crossing.
const CORNER_TOLERANCE: f64 = 1e-9;

/// Electron count liberated over a path segment.
pub trait EnergyLoss {
    fn sample<R: Rng + ?Sized>(&self, path_cm: f64, rng: &mut R) -> DriftResult<f64>;
}

/// Moyal-distributed loss with location and scale set by the mean number
/// of electrons over the segment: `Moyal(n·d, √(n·d))`.
#[derive(Debug, Clone, Copy)]
pub struct MoyalLoss {
    pub electrons_per_cm: f64,
}

impl Default for MoyalLoss {
    fn default() -> Self {
        MoyalLoss {
            electrons_per_cm: MOYAL_ELECTRONS_PER_CM,
        }
    }
}

impl EnergyLoss for MoyalLoss {
    fn sample<R: Rng + ?Sized>(&self, path_cm: f64, rng: &mut R) -> DriftResult<f64> {
        if path_cm <= 0.0 {
            return Ok(0.0);
        }
        let mean = self.electrons_per_cm * path_cm;
        Ok(Moyal::new(mean, mean.sqrt())?.sample(rng))
    }
}

/// What a deposit wrote to the grid.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TrackSummary {
    /// Segments walked inside the detector.
    pub segments: usize,
    /// Electrons deposited (sum of the floored per-segment counts).
    pub electrons: f64,
    /// Track length inside the detector in cm.
    pub path_cm: f64,
}

/// Deposit the muon's ionization with the thread-local RNG and Moyal loss.
pub fn deposit_ionization(chamber: &mut DriftChamber, particle: &Particle) -> DriftResult<TrackSummary> {
    deposit_ionization_with(chamber, particle, &mut rand::thread_rng(), &MoyalLoss::default())
}

/// Deposit the muon's ionization into `chamber`.
///
/// Each crossed cell is overwritten, not accumulated. A muon that misses
/// the detector returns `MissedDetector` and leaves the grid unchanged.
pub fn deposit_ionization_with<R, M>(
    chamber: &mut DriftChamber,
    particle: &Particle,
    rng: &mut R,
    model: &M,
) -> DriftResult<TrackSummary>
where
    R: Rng + ?Sized,
    M: EnergyLoss,
{
    let (entry_y, entry_z) = trajectory_entry(particle)?;
    let spacing = chamber.spacing();
    let (rows, cols) = chamber.dims();
    let lateral_extent = chamber.shape().lateral_extent();
    let vertical_extent = rows as f64;

    let dy = particle.lateral_direction();
    let dz = particle.vertical_direction();
    let right = dy > 0.0;

    // Grid units from here on. The division can land a hair past the last
    // row or column, so pull the start back onto the grid.
    let mut y = (entry_y / spacing).clamp(0.0, lateral_extent);
    let mut z = (entry_z / spacing).clamp(0.0, vertical_extent);
    let max_segments = 2 * (rows + cols) + 4;
    let density_scale = 1.0 / (spacing * spacing);

    let mut writes: Vec<(usize, usize, f64)> = Vec::new();
    let mut summary = TrackSummary::default();

    loop {
        let left_detector = (dy > 0.0 && y >= lateral_extent) || (dy < 0.0 && y <= 0.0);
        if z <= 0.0 || z > vertical_extent || y < 0.0 || y > lateral_extent || left_detector {
            break;
        }
        if summary.segments >= max_segments {
            warn!(
                "track walk stopped after {max_segments} segments at (y={:.3}, z={:.3}) cm",
                y * spacing,
                z * spacing
            );
            break;
        }

        let y_next = if right {
            (y.floor() + 1.0).min(lateral_extent)
        } else {
            y.ceil() - 1.0
        };
        let z_next = z.ceil() - 1.0;
        let t_y = if dy == 0.0 { f64::INFINITY } else { (y_next - y) / dy };
        let t_z = if dz < 0.0 { (z_next - z) / dz } else { f64::INFINITY };
        let t = t_y.min(t_z);
        if !t.is_finite() || t <= 0.0 {
            break;
        }

        let (mid_y, mid_z) = (y + 0.5 * t * dy, z + 0.5 * t * dz);
        // Snap crossed faces (both at a corner) so round-off cannot spawn
        // sliver segments.
        if t_z - t <= CORNER_TOLERANCE {
            z = z_next;
        } else {
            z += t * dz;
        }
        if t_y - t <= CORNER_TOLERANCE {
            y = y_next;
        } else {
            y += t * dy;
        }

        let path_cm = t * spacing;
        let electrons = model.sample(path_cm, rng)?.floor().max(0.0);
        summary.segments += 1;
        summary.path_cm += path_cm;

        let (row, col) = (mid_z.floor(), mid_y.floor());
        if row < 0.0 || col < 0.0 || row as usize >= rows || col as usize >= cols {
            continue;
        }
        trace!(
            "segment {}: cell ({row}, {col}) path={path_cm:.4}cm electrons={electrons}",
            summary.segments
        );
        summary.electrons += electrons;
        writes.push((row as usize, col as usize, electrons * density_scale));
    }

    let grid = chamber.grid_mut();
    for (row, col, density) in writes {
        grid[[row, col]] = density;
    }
    Ok(summary)
}
