// ─────────────────────────────────────────────────────────────────────
// Drift Chamber Core — Muon Generation and Ionization Benchmark
// © 1998–2026 Miroslav Šotek. All rights reserved.
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────

use criterion::{criterion_group, criterion_main, Criterion};
use drift_core::chamber::DriftChamber;
use drift_core::ionization::{deposit_ionization_with, MoyalLoss};
use drift_core::particle::{generate_hitting_with_rng, generate_with_rng};
use drift_types::config::{ChamberConfig, SourcePlane};
use drift_types::constants::DEFAULT_MAX_GENERATION_ATTEMPTS;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::hint::black_box;

fn bench_generation(c: &mut Criterion) {
    let plane = SourcePlane::default();
    let mut rng = StdRng::seed_from_u64(7);

    c.bench_function("generate_muon", |b| {
        b.iter(|| black_box(generate_with_rng(&plane, &mut rng).expect("valid plane")))
    });

    c.bench_function("generate_hitting_muon", |b| {
        b.iter(|| {
            black_box(
                generate_hitting_with_rng(&plane, DEFAULT_MAX_GENERATION_ATTEMPTS, &mut rng)
                    .expect("a muon should hit"),
            )
        })
    });
}

fn bench_deposit(c: &mut Criterion) {
    let plane = SourcePlane::default();
    let mut rng = StdRng::seed_from_u64(11);
    let mut chamber = DriftChamber::new(ChamberConfig {
        build_operator: false,
        ..ChamberConfig::with_spacing(0.1)
    })
    .expect("valid chamber");

    c.bench_function("deposit_fine_grid", |b| {
        b.iter(|| {
            let (muon, _) = generate_hitting_with_rng(&plane, DEFAULT_MAX_GENERATION_ATTEMPTS, &mut rng)
                .expect("a muon should hit");
            let summary = deposit_ionization_with(&mut chamber, &muon, &mut rng, &MoyalLoss::default())
                .expect("deposit should succeed");
            black_box(summary.electrons);
        })
    });
}

criterion_group!(benches, bench_generation, bench_deposit);
criterion_main!(benches);
