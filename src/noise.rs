//! Single-qubit noise channels as Kraus operator sums.
//!
//! Each model is parameterised by a damping strength γ ∈ [0, 1]:
//!
//! - **Phase damping**: E0 = diag(1, √(1−γ)), E1 = diag(0, √γ). Kills the
//!   off-diagonal coherence, leaves populations alone.
//! - **Amplitude damping**: E0 = diag(1, √(1−γ)), E1 = [[0, √γ], [0, 0]].
//!   Relaxes |1⟩ towards |0⟩.
//! - **Depolarizing**: ρ′ = (1−γ)ρ + γ·I/2, shrinking the Bloch vector by
//!   (1−γ). Its Kraus form is {√(1−3γ/4)·I, √(γ/4)·X, √(γ/4)·Y, √(γ/4)·Z}.
//!
//! γ outside [0, 1] is clamped; a non-finite γ is rejected.

use std::fmt;
use std::str::FromStr;

use log::{debug, warn};
use num_complex::Complex;
use num_traits::{One, Zero};
use smallvec::{smallvec, SmallVec};

use crate::error::{Result, SimError};
use crate::linalg::{Operator, C64};
use crate::state::{density_matrix, state_from_bloch, BlochVector, DensityMatrix};

/// Kraus operators of one channel; at most four for the models here.
pub type KrausSet = SmallVec<[Operator; 4]>;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum NoiseModel {
    Phase,
    Amplitude,
    Depolarizing,
}

impl NoiseModel {
    pub const ALL: [NoiseModel; 3] = [NoiseModel::Phase, NoiseModel::Amplitude, NoiseModel::Depolarizing];

    pub fn name(self) -> &'static str {
        match self {
            NoiseModel::Phase => "phase",
            NoiseModel::Amplitude => "amplitude",
            NoiseModel::Depolarizing => "depolarizing",
        }
    }

    /// Kraus operators at strength γ (clamped to [0, 1]).
    pub fn kraus_operators(self, gamma: f64) -> Result<KrausSet> {
        let gamma = clamp_gamma(gamma)?;
        let zero = C64::zero();
        let one = C64::one();
        let re = |x: f64| Complex::new(x, 0.0);

        Ok(match self {
            NoiseModel::Phase => smallvec![
                Operator::single_qubit(one, zero, zero, re((1.0 - gamma).sqrt())),
                Operator::single_qubit(zero, zero, zero, re(gamma.sqrt())),
            ],
            NoiseModel::Amplitude => smallvec![
                Operator::single_qubit(one, zero, zero, re((1.0 - gamma).sqrt())),
                Operator::single_qubit(zero, re(gamma.sqrt()), zero, zero),
            ],
            NoiseModel::Depolarizing => {
                let k0 = re((1.0 - 0.75 * gamma).sqrt());
                let k = (gamma / 4.0).sqrt();
                smallvec![
                    Operator::single_qubit(k0, zero, zero, k0),
                    Operator::single_qubit(zero, re(k), re(k), zero),
                    Operator::single_qubit(zero, Complex::new(0.0, -k), Complex::new(0.0, k), zero),
                    Operator::single_qubit(re(k), zero, zero, re(-k)),
                ]
            }
        })
    }
}

impl fmt::Display for NoiseModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for NoiseModel {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "phase" | "phase-damping" | "dephasing" => Ok(NoiseModel::Phase),
            "amplitude" | "amplitude-damping" => Ok(NoiseModel::Amplitude),
            "depolarizing" | "depolarising" => Ok(NoiseModel::Depolarizing),
            other => Err(SimError::invalid(format!("unknown noise model: {:?}", other))),
        }
    }
}

fn clamp_gamma(gamma: f64) -> Result<f64> {
    if !gamma.is_finite() {
        return Err(SimError::invalid(format!("damping strength must be finite, got {}", gamma)));
    }
    let clamped = gamma.clamp(0.0, 1.0);
    if clamped != gamma {
        warn!("damping strength {} clamped to {}", gamma, clamped);
    }
    Ok(clamped)
}

fn require_single_qubit(rho: &DensityMatrix) -> Result<()> {
    if rho.dim() != 2 {
        return Err(SimError::DimensionMismatch {
            expected: 2,
            got: rho.dim(),
        });
    }
    Ok(())
}

/// ρ′ = Σ Eᵢ ρ Eᵢ†
pub fn apply_kraus(rho: &DensityMatrix, ops: &[Operator]) -> Result<DensityMatrix> {
    let mut out = Operator::zeros(rho.dim());
    for e in ops {
        out = out.add(&e.sandwich(rho.as_operator())?)?;
    }
    DensityMatrix::from_operator(out)
}

/// Largest entry of |Σ Eᵢ†Eᵢ − I|; zero for a trace-preserving channel.
pub fn completeness_defect(ops: &[Operator]) -> Result<f64> {
    let dim = ops.first().map_or(2, Operator::dim);
    let mut sum = Operator::zeros(dim);
    for e in ops {
        sum = sum.add(&e.dagger().matmul(e)?)?;
    }
    let identity = Operator::identity(dim);
    Ok(sum
        .entries()
        .iter()
        .zip(identity.entries())
        .map(|(a, b)| (a - b).norm())
        .fold(0.0, f64::max))
}

/// Apply `model` at strength γ to a single-qubit density matrix.
pub fn apply_channel(rho: &DensityMatrix, model: NoiseModel, gamma: f64) -> Result<DensityMatrix> {
    require_single_qubit(rho)?;
    match model {
        NoiseModel::Phase | NoiseModel::Amplitude => apply_kraus(rho, &model.kraus_operators(gamma)?),
        NoiseModel::Depolarizing => {
            let gamma = clamp_gamma(gamma)?;
            let mixed = Operator::identity(2).scale(gamma / 2.0);
            DensityMatrix::from_operator(rho.as_operator().scale(1.0 - gamma).add(&mixed)?)
        }
    }
}

/// States along a γ sweep, each produced from the same initial pure state.
#[derive(Debug, Clone)]
pub struct NoiseEvolution {
    pub model: NoiseModel,
    pub gammas: Vec<f64>,
    pub states: Vec<DensityMatrix>,
    /// |ρ01| per γ.
    pub coherences: Vec<f64>,
    pub bloch_vectors: Vec<BlochVector>,
}

impl NoiseEvolution {
    pub fn len(&self) -> usize {
        self.gammas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.gammas.is_empty()
    }

    /// (ρ00, ρ11) per γ.
    pub fn populations(&self) -> Vec<(f64, f64)> {
        self.states
            .iter()
            .map(|rho| (rho.population(0), rho.population(1)))
            .collect()
    }

    pub fn bloch_radii(&self) -> Vec<f64> {
        self.bloch_vectors.iter().map(BlochVector::norm).collect()
    }

    /// Index of the first γ whose coherence falls below `threshold`.
    pub fn first_below(&self, threshold: f64) -> Option<usize> {
        self.coherences.iter().position(|&c| c < threshold)
    }
}

/// Apply `model` at every γ to |ψ(θ,φ)⟩⟨ψ(θ,φ)|.
///
/// Each γ is an absolute strength applied to the initial state, not an
/// increment on the previous entry.
pub fn evolve_under_noise(theta: f64, phi: f64, gammas: &[f64], model: NoiseModel) -> Result<NoiseEvolution> {
    let initial = density_matrix(&state_from_bloch(theta, phi))?;
    let mut states = Vec::with_capacity(gammas.len());
    let mut coherences = Vec::with_capacity(gammas.len());
    let mut bloch_vectors = Vec::with_capacity(gammas.len());
    for &gamma in gammas {
        let rho = apply_channel(&initial, model, gamma)?;
        coherences.push(rho.coherence());
        bloch_vectors.push(rho.bloch_vector()?);
        states.push(rho);
    }
    debug!(
        "{} noise from θ={:.4} φ={:.4} over {} strengths",
        model,
        theta,
        phi,
        gammas.len()
    );
    Ok(NoiseEvolution {
        model,
        gammas: gammas.to_vec(),
        states,
        coherences,
        bloch_vectors,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::linspace;
    use crate::state::basis_state;
    use std::f64::consts::PI;

    fn sample_state() -> DensityMatrix {
        density_matrix(&state_from_bloch(PI / 3.0, PI / 2.0)).unwrap()
    }

    #[test]
    fn kraus_completeness_for_every_model() {
        for model in NoiseModel::ALL {
            for gamma in linspace(0.0, 1.0, 11) {
                let ops = model.kraus_operators(gamma).unwrap();
                let defect = completeness_defect(&ops).unwrap();
                assert!(defect < 1e-12, "{} at γ={}: defect {}", model, gamma, defect);
            }
        }
    }

    #[test]
    fn phase_damping_endpoints() {
        let rho = sample_state();
        let same = apply_channel(&rho, NoiseModel::Phase, 0.0).unwrap();
        assert!(same.as_operator().approx_eq(rho.as_operator(), 1e-15));

        let dephased = apply_channel(&rho, NoiseModel::Phase, 1.0).unwrap();
        assert!(dephased.coherence() < 1e-15);
        assert!(dephased.get(1, 0).norm() < 1e-15);
        assert!((dephased.population(0) - rho.population(0)).abs() < 1e-15);
        assert!((dephased.population(1) - rho.population(1)).abs() < 1e-15);
    }

    #[test]
    fn phase_damping_coherence_decreases_monotonically() {
        let evo = evolve_under_noise(PI / 3.0, PI / 2.0, &linspace(0.0, 1.0, 41), NoiseModel::Phase).unwrap();
        assert!(evo.coherences.windows(2).all(|w| w[1] <= w[0] + 1e-15));
        let pops = evo.populations();
        for &(p00, p11) in &pops {
            assert!((p00 - pops[0].0).abs() < 1e-12);
            assert!((p11 - pops[0].1).abs() < 1e-12);
        }
    }

    #[test]
    fn amplitude_damping_fully_relaxes_excited_state() {
        let excited = density_matrix(&basis_state(&[1])).unwrap();
        let relaxed = apply_channel(&excited, NoiseModel::Amplitude, 1.0).unwrap();
        let ground = density_matrix(&basis_state(&[0])).unwrap();
        assert!(relaxed.as_operator().approx_eq(ground.as_operator(), 1e-15));
    }

    #[test]
    fn amplitude_damping_moves_population_to_ground() {
        let evo = evolve_under_noise(2.0, 0.3, &linspace(0.0, 1.0, 21), NoiseModel::Amplitude).unwrap();
        let pops = evo.populations();
        assert!(pops.windows(2).all(|w| w[1].0 >= w[0].0 - 1e-15));
        assert!((pops.last().unwrap().0 - 1.0).abs() < 1e-12);
        assert!(evo.coherences.last().unwrap().abs() < 1e-12);
    }

    #[test]
    fn depolarizing_shrinks_bloch_vector_isotropically() {
        let rho = sample_state();
        let r0 = rho.bloch_vector().unwrap();
        for gamma in linspace(0.0, 1.0, 11) {
            let r = apply_channel(&rho, NoiseModel::Depolarizing, gamma)
                .unwrap()
                .bloch_vector()
                .unwrap();
            assert!((r.norm() - (1.0 - gamma) * r0.norm()).abs() < 1e-12);
            assert!((r.x - (1.0 - gamma) * r0.x).abs() < 1e-12);
            assert!((r.z - (1.0 - gamma) * r0.z).abs() < 1e-12);
        }
    }

    #[test]
    fn depolarizing_kraus_form_matches_mixture() {
        let rho = sample_state();
        for gamma in [0.0, 0.2, 0.75, 1.0] {
            let direct = apply_channel(&rho, NoiseModel::Depolarizing, gamma).unwrap();
            let ops = NoiseModel::Depolarizing.kraus_operators(gamma).unwrap();
            let kraus = apply_kraus(&rho, &ops).unwrap();
            assert!(direct.as_operator().approx_eq(kraus.as_operator(), 1e-12));
        }
    }

    #[test]
    fn channels_keep_states_physical() {
        let rho = sample_state();
        for model in NoiseModel::ALL {
            for gamma in linspace(0.0, 1.0, 11) {
                let out = apply_channel(&rho, model, gamma).unwrap();
                assert!(out.is_valid(1e-12), "{} at γ={}", model, gamma);
            }
        }
    }

    #[test]
    fn evolution_is_not_cumulative() {
        let gammas = [0.5, 0.5, 0.5];
        let evo = evolve_under_noise(PI / 2.0, 0.0, &gammas, NoiseModel::Phase).unwrap();
        assert_eq!(evo.len(), 3);
        assert_eq!(evo.states[0], evo.states[2]);
        assert_eq!(evo.first_below(0.4), Some(0));
        assert_eq!(evo.first_below(0.1), None);
    }

    #[test]
    fn gamma_is_clamped_and_nan_rejected() {
        let rho = sample_state();
        let over = apply_channel(&rho, NoiseModel::Amplitude, 1.5).unwrap();
        let one = apply_channel(&rho, NoiseModel::Amplitude, 1.0).unwrap();
        assert_eq!(over, one);
        let under = apply_channel(&rho, NoiseModel::Depolarizing, -0.2).unwrap();
        assert_eq!(under, apply_channel(&rho, NoiseModel::Depolarizing, 0.0).unwrap());
        assert!(matches!(
            apply_channel(&rho, NoiseModel::Phase, f64::NAN),
            Err(SimError::InvalidArgument(_))
        ));
    }

    #[test]
    fn two_qubit_input_is_rejected() {
        let rho = density_matrix(&crate::state::bell_pair()).unwrap();
        assert!(matches!(
            apply_channel(&rho, NoiseModel::Phase, 0.3),
            Err(SimError::DimensionMismatch { expected: 2, got: 4 })
        ));
    }

    #[test]
    fn model_tags_parse() {
        assert_eq!("phase".parse::<NoiseModel>().unwrap(), NoiseModel::Phase);
        assert_eq!(" Amplitude ".parse::<NoiseModel>().unwrap(), NoiseModel::Amplitude);
        assert_eq!("depolarizing".parse::<NoiseModel>().unwrap(), NoiseModel::Depolarizing);
        assert!(matches!(
            "bitflip".parse::<NoiseModel>(),
            Err(SimError::InvalidArgument(_))
        ));
        for model in NoiseModel::ALL {
            assert_eq!(model.to_string().parse::<NoiseModel>().unwrap(), model);
        }
    }
}
