//! Command-line front end: runs one experiment and prints its tables.

use std::process;

use clap::{Args, Parser, Subcommand};
use log::info;

use entanglement_sim::chsh::{chsh_value, sweep_b_prime, CLASSICAL_BOUND, TSIRELSON_BOUND};
use entanglement_sim::config::{ChshConfig, SimulationConfig};
use entanglement_sim::correlation::{joint_probabilities, sample_outcomes, sweep_correlation, Spin, OUTCOME_PAIRS};
use entanglement_sim::error::Result;
use entanglement_sim::noise::{evolve_under_noise, NoiseModel};
use entanglement_sim::teleportation::{teleportation_batch, teleportation_once};

#[derive(Parser)]
#[command(name = "entanglement-sim")]
#[command(about = "Bell correlations, CHSH, teleportation and decoherence", long_about = None)]
#[command(version)]
struct Cli {
    #[command(flatten)]
    seed: SeedArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct SeedArgs {
    /// Random seed
    #[arg(short, long, global = true, default_value = "42")]
    seed: u64,

    /// Seed from OS entropy instead of --seed
    #[arg(long, global = true)]
    entropy: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Correlated spin measurements on |Φ+⟩
    Bell {
        /// Alice's axis (degrees)
        #[arg(long, allow_negative_numbers = true)]
        theta_a: Option<f64>,

        /// Bob's axis (degrees)
        #[arg(long, allow_negative_numbers = true)]
        theta_b: Option<f64>,

        /// Measurement pairs
        #[arg(short = 'n', long)]
        trials: Option<usize>,

        /// Points in the Δ sweep over [0°, 180°]; 0 skips it
        #[arg(long)]
        sweep_points: Option<usize>,
    },

    /// CHSH statistic for four measurement settings
    Chsh {
        #[arg(long, allow_negative_numbers = true)]
        a: Option<f64>,

        #[arg(long, allow_negative_numbers = true)]
        a_prime: Option<f64>,

        #[arg(long, allow_negative_numbers = true)]
        b: Option<f64>,

        #[arg(long, allow_negative_numbers = true)]
        b_prime: Option<f64>,

        /// Samples per correlation term
        #[arg(short = 'n', long)]
        trials: Option<usize>,

        /// Use a=0°, a′=90°, b=45°, b′=−45°
        #[arg(long)]
        tsirelson: bool,

        /// Points in the b′ sweep over [0°, 180°]; 0 skips it
        #[arg(long)]
        sweep_points: Option<usize>,
    },

    /// Three-qubit teleportation
    Teleport {
        /// Polar angle of the input state (degrees)
        #[arg(long, allow_negative_numbers = true)]
        theta: Option<f64>,

        /// Azimuth of the input state (degrees)
        #[arg(long, allow_negative_numbers = true)]
        phi: Option<f64>,

        #[arg(short = 'n', long)]
        shots: Option<usize>,
    },

    /// Single-qubit decoherence as γ runs from 0 to 1
    Noise {
        /// phase, amplitude or depolarizing
        #[arg(short, long)]
        model: Option<NoiseModel>,

        #[arg(long, allow_negative_numbers = true)]
        theta: Option<f64>,

        #[arg(long, allow_negative_numbers = true)]
        phi: Option<f64>,

        /// Number of γ values
        #[arg(long)]
        steps: Option<usize>,
    },
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    let mut config = SimulationConfig::default();
    config.seed = if cli.seed.entropy { None } else { Some(cli.seed.seed) };
    info!("seed policy: {:?}", config.seed);

    if let Err(e) = run(cli.command, config) {
        eprintln!("error: {}", e);
        process::exit(1);
    }
}

fn run(command: Commands, mut config: SimulationConfig) -> Result<()> {
    match command {
        Commands::Bell {
            theta_a,
            theta_b,
            trials,
            sweep_points,
        } => {
            let bell = &mut config.bell;
            set(&mut bell.theta_a_deg, theta_a);
            set(&mut bell.theta_b_deg, theta_b);
            set(&mut bell.trials, trials);
            set(&mut bell.sweep_points, sweep_points);
            run_bell(&config)
        }
        Commands::Chsh {
            a,
            a_prime,
            b,
            b_prime,
            trials,
            tsirelson,
            sweep_points,
        } => {
            if tsirelson {
                config.chsh = ChshConfig::tsirelson();
            }
            let chsh = &mut config.chsh;
            set(&mut chsh.a_deg, a);
            set(&mut chsh.a_prime_deg, a_prime);
            set(&mut chsh.b_deg, b);
            set(&mut chsh.b_prime_deg, b_prime);
            set(&mut chsh.trials, trials);
            set(&mut chsh.sweep_points, sweep_points);
            run_chsh(&config)
        }
        Commands::Teleport { theta, phi, shots } => {
            let tele = &mut config.teleportation;
            set(&mut tele.theta_deg, theta);
            set(&mut tele.phi_deg, phi);
            set(&mut tele.shots, shots);
            run_teleport(&config)
        }
        Commands::Noise {
            model,
            theta,
            phi,
            steps,
        } => {
            let deco = &mut config.decoherence;
            set(&mut deco.model, model);
            set(&mut deco.theta_deg, theta);
            set(&mut deco.phi_deg, phi);
            set(&mut deco.steps, steps);
            run_noise(&config)
        }
    }
}

fn set<T>(field: &mut T, value: Option<T>) {
    if let Some(v) = value {
        *field = v;
    }
}

fn run_bell(config: &SimulationConfig) -> Result<()> {
    let bell = &config.bell;
    let mut rng = config.rng();
    let (a, b) = (bell.theta_a(), bell.theta_b());

    println!("━━━ Bell correlation: θA = {}°, θB = {}° ━━━", bell.theta_a_deg, bell.theta_b_deg);
    println!();
    let dist = joint_probabilities(a, b)?;
    println!("  {:>6}  {:>10}", "(r,s)", "p(r,s)");
    for (alice, bob) in OUTCOME_PAIRS {
        println!("  {:>6}  {:>10.6}", pair_label(alice, bob), dist.get(alice, bob));
    }
    println!();

    let record = sample_outcomes(a, b, bell.trials, &mut rng)?;
    let empirical = record.correlation()?;
    let theoretical = dist.correlation();
    println!("  Trials:       {}", record.len());
    println!("  E empirical:  {:+.4}", empirical);
    println!("  E theory:     {:+.4}", theoretical);
    println!("  |Δ|:          {:.4}", (empirical - theoretical).abs());
    println!();

    if bell.sweep_points > 0 {
        let sweep = sweep_correlation(a, &bell.deltas(), bell.sweep_trials, &mut rng)?;
        println!("━━━ Sweep over Δ = θB − θA ({} trials/point) ━━━", bell.sweep_trials);
        println!();
        println!("  {:>8}  {:>10}  {:>10}", "Δ (°)", "E_emp", "cos Δ");
        for ((d, e), t) in sweep.deltas.iter().zip(&sweep.empirical).zip(&sweep.theoretical) {
            println!("  {:>8.2}  {:>+10.4}  {:>+10.4}", d.to_degrees(), e, t);
        }
        println!();
        println!("  max |E_emp − cos Δ| = {:.4}", sweep.max_abs_error());
    }
    Ok(())
}

fn run_chsh(config: &SimulationConfig) -> Result<()> {
    let chsh = &config.chsh;
    let settings = chsh.settings();
    let mut rng = config.rng();

    println!(
        "━━━ CHSH: a = {}°, a′ = {}°, b = {}°, b′ = {}° ━━━",
        chsh.a_deg, chsh.a_prime_deg, chsh.b_deg, chsh.b_prime_deg
    );
    println!();
    let r = chsh_value(&settings, chsh.trials, &mut rng)?;
    let names = ["E(a,b)", "E(a,b′)", "E(a′,b)", "E(a′,b′)"];
    println!("  {:>9}  {:>10}  {:>10}", "term", "empirical", "theory");
    for ((name, e), t) in names.iter().zip(&r.empirical_terms).zip(&r.theoretical_terms) {
        println!("  {:>9}  {:>+10.4}  {:>+10.4}", name, e, t);
    }
    println!();
    println!("  S empirical:  {:+.4}", r.empirical);
    println!("  S theory:     {:+.4}", r.theoretical);
    println!(
        "  Classical bound {:.1}: {}",
        CLASSICAL_BOUND,
        if r.violates_classical_bound() { "VIOLATED" } else { "respected" }
    );
    println!("  Tsirelson bound: {:.4}", TSIRELSON_BOUND);
    println!();

    if chsh.sweep_points > 0 {
        let sweep = sweep_b_prime(&settings, &chsh.b_prime_grid(), chsh.sweep_trials, &mut rng)?;
        println!("━━━ Sweep over b′ ({} trials/term) ━━━", chsh.sweep_trials);
        println!();
        println!("  {:>8}  {:>10}  {:>10}", "b′ (°)", "S_emp", "S_th");
        for ((bp, e), t) in sweep.b_primes.iter().zip(&sweep.empirical).zip(&sweep.theoretical) {
            println!("  {:>8.2}  {:>+10.4}  {:>+10.4}", bp.to_degrees(), e, t);
        }
        println!();
        println!("  b′ values with |S_th| > 2: {}", sweep.violating_b_primes().len());
    }
    Ok(())
}

fn run_teleport(config: &SimulationConfig) -> Result<()> {
    let tele = &config.teleportation;
    let mut rng = config.rng();

    println!("━━━ Teleportation: θ = {}°, φ = {}° ━━━", tele.theta_deg, tele.phi_deg);
    println!();
    let shot = teleportation_once(tele.theta(), tele.phi(), &mut rng)?;
    let bloch = shot.bob_bloch;
    println!("  Single run:   outcome {}  F = {:.6}", shot.outcome, shot.fidelity);
    println!("  Bob's Bloch:  ({:+.4}, {:+.4}, {:+.4})", bloch.x, bloch.y, bloch.z);
    println!();

    let batch = teleportation_batch(tele.theta(), tele.phi(), tele.shots, &mut rng)?;
    println!("  {:>7}  {:>7}  {:>9}  {:>9}", "outcome", "count", "frequency", "p");
    for ((label, count), (freq, p)) in batch
        .counts
        .iter()
        .zip(batch.counts.frequencies().iter().zip(&batch.outcome_probabilities))
    {
        println!("  {:>7}  {:>7}  {:>9.4}  {:>9.4}", label, count, freq, p);
    }
    println!();
    println!("  Mean fidelity: {:.6}", batch.average_fidelity);
    println!("  Min fidelity:  {:.6}", batch.min_fidelity);
    Ok(())
}

fn run_noise(config: &SimulationConfig) -> Result<()> {
    let deco = &config.decoherence;
    let evo = evolve_under_noise(deco.theta(), deco.phi(), &deco.gammas(), deco.model)?;

    println!(
        "━━━ {} noise from θ = {}°, φ = {}° ━━━",
        deco.model, deco.theta_deg, deco.phi_deg
    );
    println!();
    println!(
        "  {:>6}  {:>8}  {:>8}  {:>8}  {:>8}  {:>8}  {:>8}",
        "γ", "ρ00", "ρ11", "|ρ01|", "x", "y", "z"
    );
    for ((gamma, (p00, p11)), (c, r)) in evo
        .gammas
        .iter()
        .zip(evo.populations())
        .zip(evo.coherences.iter().zip(&evo.bloch_vectors))
    {
        println!(
            "  {:>6.3}  {:>8.4}  {:>8.4}  {:>8.4}  {:>+8.4}  {:>+8.4}  {:>+8.4}",
            gamma, p00, p11, c, r.x, r.y, r.z
        );
    }
    println!();
    let half = evo.coherences.first().map_or(0.0, |c| c / 2.0);
    match evo.first_below(half) {
        Some(k) => println!("  Coherence halves by γ = {:.3}", evo.gammas[k]),
        None => println!("  Coherence never halves on this grid"),
    }
    Ok(())
}

fn pair_label(alice: Spin, bob: Spin) -> String {
    let sign = |s: Spin| if s.sign() > 0 { '+' } else { '−' };
    format!("({},{})", sign(alice), sign(bob))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negative_angles_parse() {
        let cli = Cli::try_parse_from(["entanglement-sim", "chsh", "--a", "-30", "--b-prime", "-45"]).unwrap();
        match cli.command {
            Commands::Chsh { a, b_prime, .. } => {
                assert_eq!(a, Some(-30.0));
                assert_eq!(b_prime, Some(-45.0));
            }
            _ => panic!("expected chsh"),
        }

        let cli = Cli::try_parse_from(["entanglement-sim", "bell", "--theta-b", "-45"]).unwrap();
        assert!(matches!(cli.command, Commands::Bell { theta_b: Some(t), .. } if t == -45.0));

        let cli = Cli::try_parse_from(["entanglement-sim", "teleport", "--phi", "-90", "--theta", "-10.5"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Teleport { theta: Some(t), phi: Some(p), .. } if t == -10.5 && p == -90.0
        ));

        let cli = Cli::try_parse_from(["entanglement-sim", "noise", "-m", "amplitude", "--theta", "-60"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Noise { model: Some(NoiseModel::Amplitude), theta: Some(t), .. } if t == -60.0
        ));
    }

    #[test]
    fn unknown_noise_model_is_rejected() {
        assert!(Cli::try_parse_from(["entanglement-sim", "noise", "--model", "bitflip"]).is_err());
    }
}
