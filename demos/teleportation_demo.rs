//! Teleports a ring of states around the Bloch sphere and reports outcome
//! counts and fidelity for each.
//!
//! Run with:
//!   cargo run --example teleportation_demo

use entanglement_sim::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;

fn main() -> Result<()> {
    let mut rng = StdRng::seed_from_u64(42);
    let shots = 400;

    println!(
        "{:>6} {:>6}  {:>5} {:>5} {:>5} {:>5}  {:>10} {:>10}",
        "θ°", "φ°", "00", "01", "10", "11", "mean F", "min F"
    );
    for theta_deg in (0..=180).step_by(30) {
        for phi_deg in (0..360).step_by(90) {
            let (theta, phi) = (f64::from(theta_deg).to_radians(), f64::from(phi_deg).to_radians());
            let batch = teleportation_batch(theta, phi, shots, &mut rng)?;
            let counts: Vec<usize> = batch.counts.iter().map(|(_, n)| n).collect();
            println!(
                "{:>6} {:>6}  {:>5} {:>5} {:>5} {:>5}  {:>10.8} {:>10.8}",
                theta_deg, phi_deg, counts[0], counts[1], counts[2], counts[3],
                batch.average_fidelity, batch.min_fidelity
            );
        }
    }

    println!();
    let circuit = TeleportationCircuit::prepare(1.0, 2.0)?;
    println!("Bob's state after each correction, input θ = 1.0, φ = 2.0:");
    for outcome in BellOutcome::ALL {
        let shot = circuit.complete(outcome)?;
        let r = shot.bob_bloch;
        println!(
            "  {}  ({:+.4}, {:+.4}, {:+.4})  F = {:.10}",
            outcome, r.x, r.y, r.z, shot.fidelity
        );
    }
    Ok(())
}
