// ─────────────────────────────────────────────────────────────────────
// Drift Chamber Core — Particle
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Cosmic-ray muon generator and detector entry geometry.
//!
//! Muons are seeded on a horizontal source plane above the detector with a
//! cos²-distributed zenith angle and a uniform azimuth. Only the (y, z)
//! projection of the straight track matters to the 2D chamber.

use drift_math::distributions::rejection_sample;
use drift_types::config::SourcePlane;
use drift_types::constants::{
    DEFAULT_MAX_GENERATION_ATTEMPTS, DETECTOR_HEIGHT_CM, DETECTOR_WIDTH_CM, ENERGY_LOGNORMAL_MU,
    ENERGY_LOGNORMAL_SIGMA, MAX_ZENITH_ATTEMPTS, POSITIVE_CHARGE_PROBABILITY, SOURCE_Y_OFFSET_CM,
};
use drift_types::error::{DriftError, DriftResult};
use drift_types::state::Particle;
use log::debug;
use rand::Rng;
use rand_distr::{Distribution, LogNormal};
use std::f64::consts::{FRAC_PI_2, PI, TAU};

/// Slack on the detector bounds so that a hit computed exactly on a face
/// is not lost to round-off.
const BOUNDS_TOLERANCE_CM: f64 = 1e-9;

/// Acceptance for zenith rejection sampling: cos²θ over (π/2, 3π/2),
/// i.e. cos² of the deviation from the downward vertical θ = π.
pub fn zenith_acceptance(zenith: f64) -> f64 {
    zenith.cos().powi(2)
}

/// Zenith angle strictly inside (π/2, 3π/2), density ∝ cos²θ.
pub fn sample_zenith<R: Rng + ?Sized>(rng: &mut R) -> DriftResult<f64> {
    rejection_sample(
        rng,
        FRAC_PI_2,
        PI + FRAC_PI_2,
        zenith_acceptance,
        MAX_ZENITH_ATTEMPTS,
        "zenith angle",
    )
}

/// Generate a random muon on `plane` using the thread-local RNG.
pub fn generate(plane: &SourcePlane) -> DriftResult<Particle> {
    generate_with_rng(plane, &mut rand::thread_rng())
}

/// Generate a random muon on `plane`.
pub fn generate_with_rng<R: Rng + ?Sized>(plane: &SourcePlane, rng: &mut R) -> DriftResult<Particle> {
    plane.validate()?;

    let energy = LogNormal::new(ENERGY_LOGNORMAL_MU, ENERGY_LOGNORMAL_SIGMA)
        .map_err(|e| DriftError::Configuration(format!("energy distribution: {e}")))?;
    let energy_gev = energy.sample(rng);
    let charge = if rng.gen::<f64>() < POSITIVE_CHARGE_PROBABILITY {
        1
    } else {
        -1
    };
    let zenith = sample_zenith(rng)?;
    let azimuth = rng.gen_range(0.0..TAU);
    let x_coord = plane.width_cm * rng.gen::<f64>() - 0.5 * plane.width_cm;
    let y_coord = plane.length_cm * rng.gen::<f64>() - 0.5 * plane.length_cm + SOURCE_Y_OFFSET_CM;

    Ok(Particle {
        energy_gev,
        charge,
        zenith,
        azimuth,
        x_coord,
        y_coord,
        height: plane.height_cm,
    })
}

/// Parametric distance to a plane, or `None` when the track runs parallel to it.
fn plane_distance(offset: f64, direction: f64) -> Option<f64> {
    if direction == 0.0 {
        return None;
    }
    let t = offset / direction;
    t.is_finite().then_some(t)
}

fn inside_detector(y: f64, z: f64) -> bool {
    (-BOUNDS_TOLERANCE_CM..=DETECTOR_WIDTH_CM + BOUNDS_TOLERANCE_CM).contains(&y)
        && (-BOUNDS_TOLERANCE_CM..=DETECTOR_HEIGHT_CM + BOUNDS_TOLERANCE_CM).contains(&z)
}

/// Point `(y, z)` in cm where the track enters the detector.
///
/// Candidates are the crossings with the top (z = 30), left (y = 0) and
/// right (y = 50) faces; a candidate counts when its distance is
/// non-negative and the crossing lies on the face. The nearest wins.
pub fn trajectory_entry(particle: &Particle) -> DriftResult<(f64, f64)> {
    let dy = particle.lateral_direction();
    let dz = particle.vertical_direction();
    let candidates = [
        plane_distance(DETECTOR_HEIGHT_CM - particle.height, dz),
        plane_distance(-particle.y_coord, dy),
        plane_distance(DETECTOR_WIDTH_CM - particle.y_coord, dy),
    ];

    let point_at = |t: f64| (particle.y_coord + t * dy, particle.height + t * dz);

    let entry = candidates
        .into_iter()
        .flatten()
        .filter(|&t| t >= 0.0)
        .filter(|&t| {
            let (y, z) = point_at(t);
            inside_detector(y, z)
        })
        .min_by(|a, b| a.total_cmp(b));

    match entry {
        Some(t) => {
            let (y, z) = point_at(t);
            Ok((y.clamp(0.0, DETECTOR_WIDTH_CM), z.clamp(0.0, DETECTOR_HEIGHT_CM)))
        }
        None => Err(DriftError::MissedDetector {
            particle: *particle,
        }),
    }
}

/// Regenerate until a muon hits the detector, using the thread-local RNG.
pub fn generate_hitting(plane: &SourcePlane, max_attempts: usize) -> DriftResult<(Particle, (f64, f64))> {
    generate_hitting_with_rng(plane, max_attempts, &mut rand::thread_rng())
}

/// Generate-and-retry loop: misses are expected and retried, every other
/// error is returned. Gives up after `max_attempts` misses.
pub fn generate_hitting_with_rng<R: Rng + ?Sized>(
    plane: &SourcePlane,
    max_attempts: usize,
    rng: &mut R,
) -> DriftResult<(Particle, (f64, f64))> {
    for attempt in 0..max_attempts {
        let particle = generate_with_rng(plane, rng)?;
        match trajectory_entry(&particle) {
            Ok(entry) => return Ok((particle, entry)),
            Err(err) if err.is_missed_detector() => {
                debug!("attempt {attempt}: {err}");
            }
            Err(err) => return Err(err),
        }
    }
    Err(DriftError::SamplingExhausted {
        what: "muon hitting the detector",
        attempts: max_attempts,
    })
}

/// [`generate_hitting`] with the default attempt cap.
pub fn generate_hitting_default(plane: &SourcePlane) -> DriftResult<(Particle, (f64, f64))> {
    generate_hitting(plane, DEFAULT_MAX_GENERATION_ATTEMPTS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::f64::consts::FRAC_PI_4;

    #[test]
    fn test_straight_down_enters_top_face() {
        // height 60, y = 25, pointing straight down: t = 30, entry (25, 30)
        let p = Particle::from_direction(PI, 0.0, 25.0, 60.0).unwrap();
        let (y, z) = trajectory_entry(&p).unwrap();
        assert!((y - 25.0).abs() < 1e-12, "y = {y}");
        assert!((z - 30.0).abs() < 1e-12, "z = {z}");
    }

    #[test]
    fn test_upward_track_misses() {
        // zenith 0 points away from the detector: the only crossing is behind the source
        let p = Particle::from_direction(0.0, 0.0, 25.0, 60.0).unwrap();
        let err = trajectory_entry(&p).unwrap_err();
        assert!(err.is_missed_detector());
    }

    #[test]
    fn test_enters_left_face() {
        // 45° down and to the right, starting 40 cm left of the detector
        let p = Particle::from_direction(PI - FRAC_PI_4, FRAC_PI_2, -40.0, 60.0).unwrap();
        let (y, z) = trajectory_entry(&p).unwrap();
        assert!(y.abs() < 1e-9, "y = {y}");
        assert!((z - 20.0).abs() < 1e-9, "z = {z}");
    }

    #[test]
    fn test_enters_right_face() {
        let p = Particle::from_direction(PI - FRAC_PI_4, 1.5 * PI, 90.0, 60.0).unwrap();
        let (y, z) = trajectory_entry(&p).unwrap();
        assert!((y - 50.0).abs() < 1e-9, "y = {y}");
        assert!((z - 20.0).abs() < 1e-9, "z = {z}");
    }

    #[test]
    fn test_oblique_track_enters_top_face() {
        let p = Particle::from_direction(PI - FRAC_PI_4, FRAC_PI_2, -10.0, 60.0).unwrap();
        let (y, z) = trajectory_entry(&p).unwrap();
        assert!((y - 20.0).abs() < 1e-9, "y = {y}");
        assert!((z - 30.0).abs() < 1e-9, "z = {z}");
    }

    #[test]
    fn test_vertical_track_beside_detector_misses_with_context() {
        let p = Particle::from_direction(PI, 0.0, 200.0, 60.0).unwrap();
        match trajectory_entry(&p) {
            Err(DriftError::MissedDetector { particle }) => assert_eq!(particle, p),
            other => panic!("expected MissedDetector, got {other:?}"),
        }
    }

    #[test]
    fn test_zero_lateral_direction_does_not_divide_by_zero() {
        // azimuth 0 gives sin(azimuth) = 0 exactly
        let p = Particle::from_direction(2.5, 0.0, 10.0, 45.0).unwrap();
        let (y, z) = trajectory_entry(&p).unwrap();
        assert!((y - 10.0).abs() < 1e-12);
        assert!((z - 30.0).abs() < 1e-9);
    }

    #[test]
    fn test_source_plane_at_detector_top() {
        let p = Particle::from_direction(PI, 0.0, 5.0, 30.0).unwrap();
        let (y, z) = trajectory_entry(&p).unwrap();
        assert!((y - 5.0).abs() < 1e-12);
        assert!((z - 30.0).abs() < 1e-12);
    }

    #[test]
    fn test_generated_angles_in_range() {
        let mut rng = StdRng::seed_from_u64(42);
        let plane = SourcePlane::default();
        for _ in 0..2_000 {
            let p = generate_with_rng(&plane, &mut rng).unwrap();
            assert!(p.zenith > FRAC_PI_2 && p.zenith < 1.5 * PI, "zenith {}", p.zenith);
            assert!(p.azimuth >= 0.0 && p.azimuth < TAU, "azimuth {}", p.azimuth);
            assert!(p.energy_gev > 0.0);
            assert!(p.charge == 1 || p.charge == -1);
            assert!(p.x_coord >= -50.0 && p.x_coord < 50.0);
            assert!(p.y_coord >= -15.0 && p.y_coord < 65.0);
            assert_eq!(p.height, 60.0);
        }
    }

    #[test]
    fn test_charge_ratio() {
        let mut rng = StdRng::seed_from_u64(17);
        let plane = SourcePlane::default();
        let n = 20_000;
        let positive = (0..n)
            .filter(|_| generate_with_rng(&plane, &mut rng).unwrap().charge > 0)
            .count();
        let frac = positive as f64 / n as f64;
        assert!((frac - POSITIVE_CHARGE_PROBABILITY).abs() < 0.02, "positive fraction {frac}");
    }

    #[test]
    fn test_low_plane_is_configuration_error() {
        let plane = SourcePlane {
            height_cm: 10.0,
            ..SourcePlane::default()
        };
        let mut rng = StdRng::seed_from_u64(1);
        assert!(matches!(
            generate_with_rng(&plane, &mut rng),
            Err(DriftError::Configuration(_))
        ));
        assert!(matches!(
            generate_hitting_with_rng(&plane, 10, &mut rng),
            Err(DriftError::Configuration(_))
        ));
    }

    #[test]
    fn test_generate_hitting_returns_valid_entry() {
        let mut rng = StdRng::seed_from_u64(23);
        let plane = SourcePlane::default();
        for _ in 0..200 {
            let (p, (y, z)) = generate_hitting_with_rng(&plane, 1_000, &mut rng).unwrap();
            assert!((0.0..=50.0).contains(&y) && (0.0..=30.0).contains(&z));
            assert_eq!(trajectory_entry(&p).unwrap(), (y, z));
        }
    }

    #[test]
    fn test_generate_hitting_attempt_cap() {
        // A zero-length plane at the detector top seeds every muon at
        // (y = 25, z = 30), which always hits.
        let plane = SourcePlane {
            width_cm: 1.0,
            length_cm: 0.0,
            height_cm: 30.0,
        };
        let mut rng = StdRng::seed_from_u64(2);
        assert!(generate_hitting_with_rng(&plane, 1, &mut rng).is_ok());
        assert!(matches!(
            generate_hitting_with_rng(&plane, 0, &mut rng),
            Err(DriftError::SamplingExhausted { attempts: 0, .. })
        ));
    }
}
