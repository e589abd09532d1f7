//! CHSH statistic S = E(a,b) + E(a,b′) + E(a′,b) − E(a′,b′).
//!
//! Any local hidden-variable model keeps |S| ≤ 2. For |Φ+⟩ the quantum value
//! reaches 2√2 (Tsirelson's bound) with the right settings.

use std::f64::consts::{FRAC_PI_2, FRAC_PI_4, SQRT_2};

use log::debug;
use rand::Rng;
#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::correlation::{sample_outcomes, theoretical_correlation};
use crate::error::Result;

/// Bound on |S| for local hidden-variable models.
pub const CLASSICAL_BOUND: f64 = 2.0;

/// Bound on |S| for any quantum state.
pub const TSIRELSON_BOUND: f64 = 2.0 * SQRT_2;

/// Sign of each correlation term, in [`ChshSettings::pairs`] order.
const TERM_SIGNS: [f64; 4] = [1.0, 1.0, 1.0, -1.0];

/// Two measurement angles per observer (radians).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChshSettings {
    pub a: f64,
    pub a_prime: f64,
    pub b: f64,
    pub b_prime: f64,
}

impl ChshSettings {
    pub fn new(a: f64, a_prime: f64, b: f64, b_prime: f64) -> Self {
        Self {
            a,
            a_prime,
            b,
            b_prime,
        }
    }

    /// Settings reaching S = 2√2 for this sign convention:
    /// a = 0, a′ = π/2, b = π/4, b′ = −π/4.
    pub fn tsirelson() -> Self {
        Self::new(0.0, FRAC_PI_2, FRAC_PI_4, -FRAC_PI_4)
    }

    pub fn with_b_prime(self, b_prime: f64) -> Self {
        Self { b_prime, ..self }
    }

    /// (Alice, Bob) angle pairs: (a,b), (a,b′), (a′,b), (a′,b′).
    pub fn pairs(&self) -> [(f64, f64); 4] {
        [
            (self.a, self.b),
            (self.a, self.b_prime),
            (self.a_prime, self.b),
            (self.a_prime, self.b_prime),
        ]
    }
}

/// Closed-form S from cos(θa − θb) per term.
pub fn theoretical_chsh(settings: &ChshSettings) -> f64 {
    combine(settings.pairs().map(|(a, b)| theoretical_correlation(a, b)))
}

fn combine(terms: [f64; 4]) -> f64 {
    terms.iter().zip(TERM_SIGNS.iter()).map(|(e, s)| e * s).sum()
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChshResult {
    pub empirical: f64,
    pub theoretical: f64,
    /// Sampled E for each pair, in [`ChshSettings::pairs`] order.
    pub empirical_terms: [f64; 4],
    pub theoretical_terms: [f64; 4],
}

impl ChshResult {
    pub fn violates_classical_bound(&self) -> bool {
        self.empirical.abs() > CLASSICAL_BOUND
    }

    pub fn abs_error(&self) -> f64 {
        (self.empirical - self.theoretical).abs()
    }
}

/// Empirical and theoretical S.
///
/// Each of the four terms draws its own `trials` samples, in pair order, so no
/// sample is shared between terms.
pub fn chsh_value<R: Rng + ?Sized>(
    settings: &ChshSettings,
    trials: usize,
    rng: &mut R,
) -> Result<ChshResult> {
    let mut empirical_terms = [0.0; 4];
    for (term, (a, b)) in empirical_terms.iter_mut().zip(settings.pairs()) {
        *term = sample_outcomes(a, b, trials, rng)?.correlation()?;
    }
    let theoretical_terms = settings.pairs().map(|(a, b)| theoretical_correlation(a, b));
    let result = ChshResult {
        empirical: combine(empirical_terms),
        theoretical: combine(theoretical_terms),
        empirical_terms,
        theoretical_terms,
    };
    debug!(
        "CHSH {:?}: S_emp={:.4} S_th={:.4} ({} trials/term)",
        settings, result.empirical, result.theoretical, trials
    );
    Ok(result)
}

/// S as Bob's second angle varies with a, a′, b held fixed.
#[derive(Debug, Clone)]
pub struct ChshSweep {
    pub b_primes: Vec<f64>,
    pub empirical: Vec<f64>,
    pub theoretical: Vec<f64>,
}

impl ChshSweep {
    /// b′ values where the theoretical |S| exceeds the classical bound.
    pub fn violating_b_primes(&self) -> Vec<f64> {
        self.b_primes
            .iter()
            .zip(&self.theoretical)
            .filter(|(_, s)| s.abs() > CLASSICAL_BOUND)
            .map(|(&bp, _)| bp)
            .collect()
    }
}

pub fn sweep_b_prime<R: Rng + ?Sized>(
    settings: &ChshSettings,
    b_primes: &[f64],
    trials: usize,
    rng: &mut R,
) -> Result<ChshSweep> {
    let mut empirical = Vec::with_capacity(b_primes.len());
    let mut theoretical = Vec::with_capacity(b_primes.len());
    for &bp in b_primes {
        let r = chsh_value(&settings.with_b_prime(bp), trials, rng)?;
        empirical.push(r.empirical);
        theoretical.push(r.theoretical);
    }
    Ok(ChshSweep {
        b_primes: b_primes.to_vec(),
        empirical,
        theoretical,
    })
}

/// Theoretical S over a grid of Bob's settings, `values[i][j]` at
/// (b_values[i], b_prime_values[j]).
#[derive(Debug, Clone)]
pub struct ViolationMap {
    pub b_values: Vec<f64>,
    pub b_prime_values: Vec<f64>,
    pub values: Vec<Vec<f64>>,
}

impl ViolationMap {
    pub fn violating_cells(&self) -> usize {
        self.values
            .iter()
            .flatten()
            .filter(|s| s.abs() > CLASSICAL_BOUND)
            .count()
    }

    /// (b, b′, S) of the cell with the largest |S|.
    pub fn strongest(&self) -> Option<(f64, f64, f64)> {
        let mut best: Option<(f64, f64, f64)> = None;
        for (i, row) in self.values.iter().enumerate() {
            for (j, &s) in row.iter().enumerate() {
                if best.map_or(true, |(_, _, v)| s.abs() > v.abs()) {
                    best = Some((self.b_values[i], self.b_prime_values[j], s));
                }
            }
        }
        best
    }
}

pub fn violation_map(a: f64, a_prime: f64, b_values: &[f64], b_prime_values: &[f64]) -> ViolationMap {
    let row = |&b: &f64| -> Vec<f64> {
        b_prime_values
            .iter()
            .map(|&bp| theoretical_chsh(&ChshSettings::new(a, a_prime, b, bp)))
            .collect()
    };
    #[cfg(feature = "parallel")]
    let values = b_values.par_iter().map(row).collect();
    #[cfg(not(feature = "parallel"))]
    let values = b_values.iter().map(row).collect();

    ViolationMap {
        b_values: b_values.to_vec(),
        b_prime_values: b_prime_values.to_vec(),
        values,
    }
}
