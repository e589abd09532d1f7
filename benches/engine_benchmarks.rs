// benches/engine_benchmarks.rs

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use entanglement_sim::chsh::{chsh_value, violation_map, ChshSettings};
use entanglement_sim::config::linspace;
use entanglement_sim::correlation::{joint_probabilities, sample_outcomes};
use entanglement_sim::noise::{evolve_under_noise, NoiseModel};
use entanglement_sim::state::density_matrix;
use entanglement_sim::teleportation::{teleportation_batch, TeleportationCircuit};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::f64::consts::PI;

fn benchmark_correlation(c: &mut Criterion) {
    c.bench_function("joint_probabilities", |b| {
        b.iter(|| joint_probabilities(black_box(0.3), black_box(1.1)))
    });

    c.bench_function("sample_outcomes_5000", |b| {
        let mut rng = StdRng::seed_from_u64(42);
        b.iter(|| sample_outcomes(black_box(0.0), black_box(PI / 4.0), 5000, &mut rng))
    });

    c.bench_function("chsh_value_5000", |b| {
        let mut rng = StdRng::seed_from_u64(42);
        let settings = ChshSettings::tsirelson();
        b.iter(|| chsh_value(black_box(&settings), 5000, &mut rng))
    });

    c.bench_function("violation_map_64x64", |b| {
        let grid = linspace(-PI, PI, 64);
        b.iter(|| violation_map(0.0, PI / 2.0, black_box(&grid), black_box(&grid)))
    });
}

fn benchmark_teleportation(c: &mut Criterion) {
    c.bench_function("teleportation_prepare", |b| {
        b.iter(|| TeleportationCircuit::prepare(black_box(1.0), black_box(0.5)))
    });

    c.bench_function("teleportation_batch_400", |b| {
        let mut rng = StdRng::seed_from_u64(42);
        b.iter(|| teleportation_batch(black_box(1.0), black_box(0.5), 400, &mut rng))
    });
}

fn benchmark_noise(c: &mut Criterion) {
    let gammas = linspace(0.0, 1.0, 40);
    for model in NoiseModel::ALL {
        c.bench_function(&format!("evolve_{}_40", model), |b| {
            b.iter(|| evolve_under_noise(black_box(PI / 3.0), black_box(PI / 2.0), &gammas, model))
        });
    }

    c.bench_function("density_matrix_3q", |b| {
        let psi = vec![num_complex::Complex::new(1.0 / 8f64.sqrt(), 0.0); 8];
        b.iter(|| density_matrix(black_box(&psi)))
    });
}

criterion_group!(benches, benchmark_correlation, benchmark_teleportation, benchmark_noise);
criterion_main!(benches);
