//! Run parameters for the four experiments.
//!
//! Angles are kept in degrees, as a user types them, and converted to
//! radians only when an experiment is built from the config.

use std::f64::consts::PI;

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::chsh::ChshSettings;
use crate::noise::NoiseModel;

/// `n` evenly spaced points over `[start, end]`, both ends included.
pub fn linspace(start: f64, end: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (end - start) / (n - 1) as f64;
            (0..n)
                .map(|k| if k == n - 1 { end } else { start + step * k as f64 })
                .collect()
        }
    }
}

/// Two-observer correlation test.
#[derive(Debug, Clone)]
pub struct BellTestConfig {
    pub theta_a_deg: f64,
    pub theta_b_deg: f64,
    pub trials: usize,
    /// Points in the Δ sweep over [0, π].
    pub sweep_points: usize,
    pub sweep_trials: usize,
}

impl BellTestConfig {
    pub fn theta_a(&self) -> f64 {
        self.theta_a_deg.to_radians()
    }

    pub fn theta_b(&self) -> f64 {
        self.theta_b_deg.to_radians()
    }

    pub fn deltas(&self) -> Vec<f64> {
        linspace(0.0, PI, self.sweep_points)
    }
}

impl Default for BellTestConfig {
    fn default() -> Self {
        Self {
            theta_a_deg: 0.0,
            theta_b_deg: 45.0,
            trials: 5000,
            sweep_points: 80,
            sweep_trials: 1500,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ChshConfig {
    pub a_deg: f64,
    pub a_prime_deg: f64,
    pub b_deg: f64,
    pub b_prime_deg: f64,
    /// Samples per correlation term.
    pub trials: usize,
    /// Points in the b′ sweep over [0, π].
    pub sweep_points: usize,
    pub sweep_trials: usize,
}

impl ChshConfig {
    /// a = 0°, a′ = 90°, b = 45°, b′ = −45°: S = 2√2.
    pub fn tsirelson() -> Self {
        Self {
            a_deg: 0.0,
            a_prime_deg: 90.0,
            b_deg: 45.0,
            b_prime_deg: -45.0,
            ..Default::default()
        }
    }

    pub fn settings(&self) -> ChshSettings {
        ChshSettings::new(
            self.a_deg.to_radians(),
            self.a_prime_deg.to_radians(),
            self.b_deg.to_radians(),
            self.b_prime_deg.to_radians(),
        )
    }

    pub fn b_prime_grid(&self) -> Vec<f64> {
        linspace(0.0, PI, self.sweep_points)
    }
}

impl Default for ChshConfig {
    fn default() -> Self {
        Self {
            a_deg: 0.0,
            a_prime_deg: 45.0,
            b_deg: 22.0,
            b_prime_deg: 67.0,
            trials: 5000,
            sweep_points: 120,
            sweep_trials: 2000,
        }
    }
}

#[derive(Debug, Clone)]
pub struct TeleportationConfig {
    pub theta_deg: f64,
    pub phi_deg: f64,
    pub shots: usize,
}

impl TeleportationConfig {
    pub fn theta(&self) -> f64 {
        self.theta_deg.to_radians()
    }

    pub fn phi(&self) -> f64 {
        self.phi_deg.to_radians()
    }
}

impl Default for TeleportationConfig {
    fn default() -> Self {
        Self {
            theta_deg: 45.0,
            phi_deg: 0.0,
            shots: 400,
        }
    }
}

#[derive(Debug, Clone)]
pub struct DecoherenceConfig {
    pub model: NoiseModel,
    pub theta_deg: f64,
    pub phi_deg: f64,
    /// Number of γ values over [0, 1].
    pub steps: usize,
}

impl DecoherenceConfig {
    pub fn theta(&self) -> f64 {
        self.theta_deg.to_radians()
    }

    pub fn phi(&self) -> f64 {
        self.phi_deg.to_radians()
    }

    pub fn gammas(&self) -> Vec<f64> {
        linspace(0.0, 1.0, self.steps)
    }
}

impl Default for DecoherenceConfig {
    fn default() -> Self {
        Self {
            model: NoiseModel::Phase,
            theta_deg: 60.0,
            phi_deg: 90.0,
            steps: 40,
        }
    }
}

/// Every experiment's parameters plus the seed policy.
#[derive(Debug, Clone)]
pub struct SimulationConfig {
    /// `None` seeds from OS entropy.
    pub seed: Option<u64>,
    pub bell: BellTestConfig,
    pub chsh: ChshConfig,
    pub teleportation: TeleportationConfig,
    pub decoherence: DecoherenceConfig,
}

impl SimulationConfig {
    pub fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            seed: Some(42),
            bell: BellTestConfig::default(),
            chsh: ChshConfig::default(),
            teleportation: TeleportationConfig::default(),
            decoherence: DecoherenceConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chsh::{theoretical_chsh, TSIRELSON_BOUND};
    use rand::Rng;

    #[test]
    fn linspace_hits_both_ends() {
        let g = linspace(0.0, PI, 80);
        assert_eq!(g.len(), 80);
        assert_eq!(g[0], 0.0);
        assert_eq!(g[79], PI);
        assert!(g.windows(2).all(|w| w[1] > w[0]));
        assert!(linspace(0.0, 1.0, 0).is_empty());
        assert_eq!(linspace(0.3, 1.0, 1), vec![0.3]);
    }

    #[test]
    fn degrees_convert_at_the_edge() {
        let bell = BellTestConfig::default();
        assert_eq!(bell.theta_a(), 0.0);
        assert!((bell.theta_b() - PI / 4.0).abs() < 1e-15);
        assert_eq!(DecoherenceConfig::default().gammas().len(), 40);
    }

    #[test]
    fn tsirelson_preset_saturates_bound() {
        let s = theoretical_chsh(&ChshConfig::tsirelson().settings());
        assert!((s - TSIRELSON_BOUND).abs() < 1e-12);
        assert_eq!(ChshConfig::tsirelson().trials, ChshConfig::default().trials);
    }

    #[test]
    fn seeded_config_is_reproducible() {
        let config = SimulationConfig::default();
        let a: u64 = config.rng().gen();
        let b: u64 = config.rng().gen();
        assert_eq!(a, b);
    }
}
