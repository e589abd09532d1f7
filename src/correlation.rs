//! Correlated measurements on the shared pair |Φ+⟩.
//!
//! Alice and Bob each measure along an axis in the X–Z plane. The joint
//! outcome distribution comes from projector algebra on the two-qubit density
//! matrix, so sampled pairs carry the full quantum correlation
//! E(θa, θb) = cos(θa − θb) rather than two independent coin flips.

use log::debug;
use rand::distributions::{Distribution, WeightedIndex};
use rand::Rng;

use crate::error::{Result, SimError};
use crate::linalg::{normalize_probabilities, Operator, C64};
use crate::state::{bell_pair, density_matrix};

/// One observer's measurement result.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Spin {
    Up,
    Down,
}

impl Spin {
    /// +1 for `Up`, −1 for `Down`.
    pub fn sign(self) -> i8 {
        match self {
            Spin::Up => 1,
            Spin::Down => -1,
        }
    }
}

/// Joint outcomes in table order: (+,+), (+,−), (−,+), (−,−).
pub const OUTCOME_PAIRS: [(Spin, Spin); 4] = [
    (Spin::Up, Spin::Up),
    (Spin::Up, Spin::Down),
    (Spin::Down, Spin::Up),
    (Spin::Down, Spin::Down),
];

/// Projector onto the `spin` eigenvector of the axis at angle θ.
///
/// `Up` projects on (cos θ/2, sin θ/2), `Down` on (−sin θ/2, cos θ/2).
pub fn axis_projector(theta: f64, spin: Spin) -> Operator {
    let (s, c) = (theta / 2.0).sin_cos();
    let (a, b) = match spin {
        Spin::Up => (c, s),
        Spin::Down => (-s, c),
    };
    Operator::single_qubit(
        C64::new(a * a, 0.0),
        C64::new(a * b, 0.0),
        C64::new(a * b, 0.0),
        C64::new(b * b, 0.0),
    )
}

/// Exact distribution over the four joint outcomes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JointDistribution {
    probs: [f64; 4],
}

impl JointDistribution {
    pub fn get(&self, alice: Spin, bob: Spin) -> f64 {
        self.probs[Self::index(alice, bob)]
    }

    /// Probabilities in [`OUTCOME_PAIRS`] order.
    pub fn probabilities(&self) -> [f64; 4] {
        self.probs
    }

    pub fn alice_marginal(&self, spin: Spin) -> f64 {
        self.get(spin, Spin::Up) + self.get(spin, Spin::Down)
    }

    pub fn bob_marginal(&self, spin: Spin) -> f64 {
        self.get(Spin::Up, spin) + self.get(Spin::Down, spin)
    }

    /// Σ r·s·p(r, s)
    pub fn correlation(&self) -> f64 {
        OUTCOME_PAIRS
            .iter()
            .zip(self.probs.iter())
            .map(|(&(r, s), p)| f64::from(r.sign() * s.sign()) * p)
            .sum()
    }

    fn index(alice: Spin, bob: Spin) -> usize {
        match (alice, bob) {
            (Spin::Up, Spin::Up) => 0,
            (Spin::Up, Spin::Down) => 1,
            (Spin::Down, Spin::Up) => 2,
            (Spin::Down, Spin::Down) => 3,
        }
    }
}

/// p(r, s) = Re tr((P_a(r) ⊗ P_b(s)) ρ) for ρ = |Φ+⟩⟨Φ+|.
///
/// The table is normalised to sum to one with round-off negatives clamped.
pub fn joint_probabilities(theta_a: f64, theta_b: f64) -> Result<JointDistribution> {
    let rho = density_matrix(&bell_pair())?;
    let mut raw = [0.0; 4];
    for (slot, &(r, s)) in raw.iter_mut().zip(OUTCOME_PAIRS.iter()) {
        let joint = axis_projector(theta_a, r).kron(&axis_projector(theta_b, s));
        *slot = joint.matmul(rho.as_operator())?.trace().re;
    }
    let normalized = normalize_probabilities(&raw)?;
    let mut probs = [0.0; 4];
    probs.copy_from_slice(&normalized);
    Ok(JointDistribution { probs })
}

/// Paired ±1 results for Alice and Bob, one entry per trial.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutcomeRecord {
    pub alice: Vec<i8>,
    pub bob: Vec<i8>,
}

impl OutcomeRecord {
    pub fn len(&self) -> usize {
        self.alice.len()
    }

    pub fn is_empty(&self) -> bool {
        self.alice.is_empty()
    }

    pub fn correlation(&self) -> Result<f64> {
        empirical_correlation(&self.alice, &self.bob)
    }

    pub fn running_correlation(&self) -> Result<Vec<f64>> {
        running_correlation(&self.alice, &self.bob)
    }
}

/// Draw `trials` correlated outcome pairs from the exact joint distribution.
pub fn sample_outcomes<R: Rng + ?Sized>(
    theta_a: f64,
    theta_b: f64,
    trials: usize,
    rng: &mut R,
) -> Result<OutcomeRecord> {
    if trials == 0 {
        return Err(SimError::invalid("trial count must be positive"));
    }
    let dist = joint_probabilities(theta_a, theta_b)?;
    let probs = dist.probabilities();
    let weights = WeightedIndex::new(&probs).map_err(|_| SimError::NumericalDegeneracy {
        what: "joint distribution",
        total: probs.iter().sum(),
    })?;

    let mut alice = Vec::with_capacity(trials);
    let mut bob = Vec::with_capacity(trials);
    for _ in 0..trials {
        let (r, s) = OUTCOME_PAIRS[weights.sample(rng)];
        alice.push(r.sign());
        bob.push(s.sign());
    }
    debug!(
        "sampled {} pairs at θa={:.4} θb={:.4} (p={:?})",
        trials, theta_a, theta_b, probs
    );
    Ok(OutcomeRecord { alice, bob })
}

/// mean(r·s), the experimental estimate of E.
pub fn empirical_correlation(r: &[i8], s: &[i8]) -> Result<f64> {
    check_paired(r, s)?;
    let total: i64 = r.iter().zip(s).map(|(&a, &b)| i64::from(a) * i64::from(b)).sum();
    Ok(total as f64 / r.len() as f64)
}

/// Mean of r·s over the first k trials, for every k.
pub fn running_correlation(r: &[i8], s: &[i8]) -> Result<Vec<f64>> {
    check_paired(r, s)?;
    let mut acc = 0i64;
    Ok(r.iter()
        .zip(s)
        .enumerate()
        .map(|(k, (&a, &b))| {
            acc += i64::from(a) * i64::from(b);
            acc as f64 / (k + 1) as f64
        })
        .collect())
}

/// cos(θa − θb), the closed-form E for |Φ+⟩ in the X–Z plane.
pub fn theoretical_correlation(theta_a: f64, theta_b: f64) -> f64 {
    (theta_a - theta_b).cos()
}

/// Empirical against theoretical correlation as Bob's axis is swept.
#[derive(Debug, Clone)]
pub struct CorrelationSweep {
    pub deltas: Vec<f64>,
    pub empirical: Vec<f64>,
    pub theoretical: Vec<f64>,
}

impl CorrelationSweep {
    /// Largest |empirical − theoretical| over the sweep.
    pub fn max_abs_error(&self) -> f64 {
        self.empirical
            .iter()
            .zip(&self.theoretical)
            .map(|(e, t)| (e - t).abs())
            .fold(0.0, f64::max)
    }
}

/// For each Δ, sample at θb = θa + Δ and record both correlations.
pub fn sweep_correlation<R: Rng + ?Sized>(
    theta_a: f64,
    deltas: &[f64],
    trials_each: usize,
    rng: &mut R,
) -> Result<CorrelationSweep> {
    let mut empirical = Vec::with_capacity(deltas.len());
    let mut theoretical = Vec::with_capacity(deltas.len());
    for &delta in deltas {
        let theta_b = theta_a + delta;
        empirical.push(sample_outcomes(theta_a, theta_b, trials_each, rng)?.correlation()?);
        theoretical.push(theoretical_correlation(theta_a, theta_b));
    }
    Ok(CorrelationSweep {
        deltas: deltas.to_vec(),
        empirical,
        theoretical,
    })
}

fn check_paired(r: &[i8], s: &[i8]) -> Result<()> {
    if r.len() != s.len() {
        return Err(SimError::DimensionMismatch {
            expected: r.len(),
            got: s.len(),
        });
    }
    if r.is_empty() {
        return Err(SimError::invalid("no outcomes to correlate"));
    }
    if let Some(&v) = r.iter().chain(s).find(|&&v| v != 1 && v != -1) {
        return Err(SimError::invalid(format!("outcome {} is not ±1", v)));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::f64::consts::PI;

    #[test]
    fn joint_probabilities_sum_to_one_and_are_non_negative() {
        for i in 0..=18 {
            for j in 0..=18 {
                let (a, b) = (PI * i as f64 / 9.0, PI * j as f64 / 9.0 - PI / 3.0);
                let dist = joint_probabilities(a, b).unwrap();
                let p = dist.probabilities();
                assert!(p.iter().all(|&x| x >= 0.0));
                assert!((p.iter().sum::<f64>() - 1.0).abs() < 1e-12);
            }
        }
    }

    #[test]
    fn joint_distribution_matches_closed_form() {
        let (a, b) = (0.3, 1.7);
        let dist = joint_probabilities(a, b).unwrap();
        // p(+,+) = p(−,−) = cos²(Δ/2)/2
        let same = ((a - b) / 2.0).cos().powi(2) / 2.0;
        assert!((dist.get(Spin::Up, Spin::Up) - same).abs() < 1e-12);
        assert!((dist.get(Spin::Down, Spin::Down) - same).abs() < 1e-12);
        assert!((dist.correlation() - theoretical_correlation(a, b)).abs() < 1e-12);
    }

    #[test]
    fn marginals_are_unbiased() {
        let dist = joint_probabilities(0.4, 2.2).unwrap();
        for spin in [Spin::Up, Spin::Down] {
            assert!((dist.alice_marginal(spin) - 0.5).abs() < 1e-12);
            assert!((dist.bob_marginal(spin) - 0.5).abs() < 1e-12);
        }
    }

    #[test]
    fn aligned_axes_always_agree() {
        let mut rng = StdRng::seed_from_u64(7);
        let rec = sample_outcomes(0.9, 0.9, 2_000, &mut rng).unwrap();
        assert_eq!(rec.alice, rec.bob);
        assert_eq!(rec.correlation().unwrap(), 1.0);
    }

    #[test]
    fn opposite_axes_always_disagree() {
        let mut rng = StdRng::seed_from_u64(8);
        let rec = sample_outcomes(0.2, 0.2 + PI, 2_000, &mut rng).unwrap();
        assert!(rec.alice.iter().zip(&rec.bob).all(|(a, b)| a == &-b));
    }

    #[test]
    fn sampling_is_reproducible_for_same_seed() {
        let a = sample_outcomes(0.1, 1.0, 500, &mut StdRng::seed_from_u64(42)).unwrap();
        let b = sample_outcomes(0.1, 1.0, 500, &mut StdRng::seed_from_u64(42)).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.len(), 500);
    }

    #[test]
    fn empirical_tracks_theory_for_large_samples() {
        let mut rng = StdRng::seed_from_u64(2024);
        for &(a, b) in &[(0.0, PI / 4.0), (0.5, 2.0), (1.0, 1.0 + PI / 2.0), (0.0, 3.0)] {
            let e = sample_outcomes(a, b, 50_000, &mut rng).unwrap().correlation().unwrap();
            let t = theoretical_correlation(a, b);
            assert!((e - t).abs() < 0.02, "θa={} θb={} E={} cos={}", a, b, e, t);
        }
    }

    #[test]
    fn theoretical_extremes() {
        for theta in [0.0, 0.7, 2.5, -1.3] {
            assert!((theoretical_correlation(theta, theta) - 1.0).abs() < 1e-15);
            assert!((theoretical_correlation(theta, theta + PI) + 1.0).abs() < 1e-15);
        }
    }

    #[test]
    fn running_correlation_ends_at_mean() {
        let r = [1, -1, 1, 1];
        let s = [1, 1, 1, -1];
        let run = running_correlation(&r, &s).unwrap();
        assert_eq!(run, vec![1.0, 0.0, 1.0 / 3.0, 0.0]);
        assert_eq!(*run.last().unwrap(), empirical_correlation(&r, &s).unwrap());
    }

    #[test]
    fn correlation_input_errors() {
        assert!(matches!(
            empirical_correlation(&[1, 1], &[1]),
            Err(SimError::DimensionMismatch { .. })
        ));
        assert!(matches!(
            empirical_correlation(&[], &[]),
            Err(SimError::InvalidArgument(_))
        ));
        let mut rng = StdRng::seed_from_u64(1);
        assert!(sample_outcomes(0.0, 0.0, 0, &mut rng).is_err());
    }

    #[test]
    fn outcomes_outside_plus_minus_one_are_rejected() {
        assert!(matches!(
            empirical_correlation(&[100], &[2]),
            Err(SimError::InvalidArgument(_))
        ));
        assert!(matches!(
            running_correlation(&[1, -1], &[1, i8::MIN]),
            Err(SimError::InvalidArgument(_))
        ));
        assert!(matches!(
            empirical_correlation(&[0, 1], &[1, 1]),
            Err(SimError::InvalidArgument(_))
        ));
    }

    #[test]
    fn sweep_converges_with_more_trials() {
        let deltas: Vec<f64> = (0..10).map(|k| PI * k as f64 / 9.0).collect();
        let mut rng = StdRng::seed_from_u64(99);
        let sweep = sweep_correlation(0.3, &deltas, 20_000, &mut rng).unwrap();
        assert_eq!(sweep.empirical.len(), deltas.len());
        assert!((sweep.theoretical[0] - 1.0).abs() < 1e-15);
        assert!(sweep.max_abs_error() < 0.03, "max error {}", sweep.max_abs_error());
    }
}
