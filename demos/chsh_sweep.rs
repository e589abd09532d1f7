//! CHSH value as Bob's second axis b′ sweeps a full turn, with a, a′, b
//! fixed at the Tsirelson settings.
//!
//! Outputs CSV: b_prime_deg,s_empirical,s_theoretical
//!
//! Run with:
//!   cargo run --example chsh_sweep

use entanglement_sim::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::f64::consts::PI;

fn main() -> Result<()> {
    let mut rng = StdRng::seed_from_u64(42);
    let settings = ChshSettings::tsirelson();
    let b_primes = linspace(-PI, PI, 73);

    let sweep = sweep_b_prime(&settings, &b_primes, 2000, &mut rng)?;

    println!("b_prime_deg,s_empirical,s_theoretical");
    for ((bp, e), t) in sweep.b_primes.iter().zip(&sweep.empirical).zip(&sweep.theoretical) {
        println!("{:.1},{:.4},{:.4}", bp.to_degrees(), e, t);
    }

    println!();
    let window = sweep.violating_b_primes();
    println!("# {} of {} b′ values exceed the classical bound", window.len(), b_primes.len());

    let grid = linspace(-PI, PI, 37);
    let map = violation_map(settings.a, settings.a_prime, &grid, &grid);
    if let Some((b, bp, s)) = map.strongest() {
        println!(
            "# (b, b′) grid: {} violating cells, strongest S = {:.4} at b = {:.0}°, b′ = {:.0}°",
            map.violating_cells(),
            s,
            b.to_degrees(),
            bp.to_degrees()
        );
    }
    Ok(())
}
