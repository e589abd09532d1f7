//! Coherence |ρ01| and Bloch radius against γ for every noise model.
//!
//! Outputs CSV: model,gamma,coherence,bloch_radius,rho00
//!
//! Run with:
//!   cargo run --example decoherence_sweep

use entanglement_sim::prelude::*;

fn main() -> Result<()> {
    let config = DecoherenceConfig::default();
    let gammas = config.gammas();

    println!("model,gamma,coherence,bloch_radius,rho00");
    for model in NoiseModel::ALL {
        let evo = evolve_under_noise(config.theta(), config.phi(), &gammas, model)?;
        let radii = evo.bloch_radii();
        for (k, gamma) in evo.gammas.iter().enumerate() {
            println!(
                "{},{:.4},{:.6},{:.6},{:.6}",
                model,
                gamma,
                evo.coherences[k],
                radii[k],
                evo.states[k].population(0)
            );
        }
    }

    println!();
    println!("# γ at which coherence first drops below 0.1:");
    for model in NoiseModel::ALL {
        let evo = evolve_under_noise(config.theta(), config.phi(), &gammas, model)?;
        match evo.first_below(0.1) {
            Some(k) => println!("#   {:<13} {:.3}", model.name(), evo.gammas[k]),
            None => println!("#   {:<13} never", model.name()),
        }
    }
    Ok(())
}
