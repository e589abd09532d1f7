//! Three-qubit teleportation circuit.
//!
//! Qubit 0 holds the unknown state |ψ⟩, qubits 1 and 2 become the shared
//! pair, and qubit 2 is Bob's. The protocol runs as a fixed sequence:
//!
//! ```text
//! |ψ⟩|0⟩|0⟩ ─ H(1) ─ CNOT(1→2) ─ CNOT(0→1) ─ H(0) ─ measure q0,q1
//!           ─ collapse ─ X(2)^m1 ─ Z(2)^m0 ─ Tr_{0,1} ─ F = ⟨ψ|ρ_bob|ψ⟩
//! ```
//!
//! Everything up to the measurement is deterministic, so a
//! [`TeleportationCircuit`] is prepared once and then completed per shot from
//! a single uniform draw.

use std::fmt;

use log::{debug, trace};
use num_traits::{One, Zero};
use rand::Rng;
#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::error::{Result, SimError};
use crate::gates::{apply_cnot, apply_single, projector, GateType};
use crate::linalg::{embed, normalize, normalize_probabilities, tensor_states, Operator, C64};
use crate::state::{density_matrix, fidelity, state_from_bloch, BlochVector, DensityMatrix};

pub const QUBITS: usize = 3;
const SENDER: usize = 0;
const SENDER_HALF: usize = 1;
const RECEIVER: usize = 2;

/// Classical bits (m0, m1) from measuring qubits 0 and 1.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct BellOutcome {
    pub m0: u8,
    pub m1: u8,
}

impl BellOutcome {
    /// "00", "01", "10", "11" in index order.
    pub const ALL: [BellOutcome; 4] = [
        BellOutcome { m0: 0, m1: 0 },
        BellOutcome { m0: 0, m1: 1 },
        BellOutcome { m0: 1, m1: 0 },
        BellOutcome { m0: 1, m1: 1 },
    ];

    pub fn index(self) -> usize {
        usize::from(self.m0 * 2 + self.m1)
    }

    pub fn label(self) -> &'static str {
        ["00", "01", "10", "11"][self.index()]
    }

    /// Projector onto this outcome on qubits 0 and 1 of the register.
    fn projector(self) -> Result<Operator> {
        embed(
            &[(SENDER, &projector(self.m0)), (SENDER_HALF, &projector(self.m1))],
            QUBITS,
        )
    }
}

impl fmt::Display for BellOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Result of one run of the protocol.
#[derive(Debug, Clone)]
pub struct TeleportationShot {
    pub outcome: BellOutcome,
    pub fidelity: f64,
    pub bob_state: DensityMatrix,
    pub bob_bloch: BlochVector,
    /// Probability of each outcome, in [`BellOutcome::ALL`] order.
    pub outcome_probabilities: [f64; 4],
}

impl TeleportationShot {
    pub fn m0(&self) -> u8 {
        self.outcome.m0
    }

    pub fn m1(&self) -> u8 {
        self.outcome.m1
    }
}

/// The circuit prepared up to (not including) the measurement.
#[derive(Debug, Clone)]
pub struct TeleportationCircuit {
    input: [C64; 2],
    pre_measurement: Vec<C64>,
    probabilities: [f64; 4],
}

impl TeleportationCircuit {
    /// Prepare |ψ(θ,φ)⟩|0⟩|0⟩, entangle qubits 1–2 and rotate 0–1 into the
    /// Bell basis.
    pub fn prepare(theta: f64, phi: f64) -> Result<Self> {
        let input = state_from_bloch(theta, phi);
        let zero = [C64::one(), C64::zero()];
        let state = tensor_states(&[&input[..], &zero[..], &zero[..]])?;

        let state = apply_single(&state, GateType::Hadamard, SENDER_HALF)?;
        let state = apply_cnot(&state, SENDER_HALF, RECEIVER)?;
        let state = apply_cnot(&state, SENDER, SENDER_HALF)?;
        let state = apply_single(&state, GateType::Hadamard, SENDER)?;

        let mut raw = [0.0; 4];
        for (slot, outcome) in raw.iter_mut().zip(BellOutcome::ALL) {
            *slot = outcome.projector()?.expectation(&state)?.re;
        }
        let normalized = normalize_probabilities(&raw)?;
        let mut probabilities = [0.0; 4];
        probabilities.copy_from_slice(&normalized);

        Ok(Self {
            input,
            pre_measurement: state,
            probabilities,
        })
    }

    pub fn input_state(&self) -> &[C64; 2] {
        &self.input
    }

    pub fn outcome_probabilities(&self) -> [f64; 4] {
        self.probabilities
    }

    /// Map a uniform draw `u ∈ [0, 1)` onto an outcome by cumulative
    /// probability.
    pub fn select_outcome(&self, u: f64) -> BellOutcome {
        let mut cumulative = 0.0;
        for (outcome, &p) in BellOutcome::ALL.iter().zip(&self.probabilities) {
            cumulative += p;
            if u < cumulative {
                return *outcome;
            }
        }
        // u landed in the round-off gap above the final cumulative sum
        BellOutcome::ALL
            .iter()
            .zip(&self.probabilities)
            .rev()
            .find(|(_, &p)| p > 0.0)
            .map_or(BellOutcome::ALL[3], |(o, _)| *o)
    }

    /// Collapse onto `outcome`, apply Bob's corrections and score the result.
    pub fn complete(&self, outcome: BellOutcome) -> Result<TeleportationShot> {
        let projected = outcome.projector()?.apply(&self.pre_measurement)?;
        let mut state = normalize(&projected)?;
        if outcome.m1 == 1 {
            state = apply_single(&state, GateType::PauliX, RECEIVER)?;
        }
        if outcome.m0 == 1 {
            state = apply_single(&state, GateType::PauliZ, RECEIVER)?;
        }

        let bob_state = density_matrix(&state)?.reduce_to(RECEIVER)?;
        let fidelity = fidelity(&self.input, &bob_state)?;
        let bob_bloch = bob_state.bloch_vector()?;
        trace!("outcome {} fidelity {:.12}", outcome, fidelity);

        Ok(TeleportationShot {
            outcome,
            fidelity,
            bob_state,
            bob_bloch,
            outcome_probabilities: self.probabilities,
        })
    }

    pub fn shot(&self, u: f64) -> Result<TeleportationShot> {
        self.complete(self.select_outcome(u))
    }
}

/// Teleport |ψ(θ,φ)⟩ once, sampling the measurement with `rng`.
pub fn teleportation_once<R: Rng + ?Sized>(theta: f64, phi: f64, rng: &mut R) -> Result<TeleportationShot> {
    TeleportationCircuit::prepare(theta, phi)?.shot(rng.gen())
}

/// How often each classical outcome occurred.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OutcomeCounts {
    counts: [usize; 4],
}

impl OutcomeCounts {
    pub fn record(&mut self, outcome: BellOutcome) {
        self.counts[outcome.index()] += 1;
    }

    pub fn get(&self, outcome: BellOutcome) -> usize {
        self.counts[outcome.index()]
    }

    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }

    pub fn frequencies(&self) -> [f64; 4] {
        let total = self.total().max(1) as f64;
        self.counts.map(|c| c as f64 / total)
    }

    /// (label, count) in outcome order.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, usize)> + '_ {
        BellOutcome::ALL.iter().map(move |o| (o.label(), self.get(*o)))
    }
}

#[derive(Debug, Clone)]
pub struct TeleportationBatch {
    pub counts: OutcomeCounts,
    pub average_fidelity: f64,
    pub min_fidelity: f64,
    pub outcome_probabilities: [f64; 4],
}

/// Run `shots` independent teleportations of the same input.
///
/// One uniform per shot is drawn from `rng` up front, in shot order, so the
/// result does not depend on whether shots are evaluated in parallel.
pub fn teleportation_batch<R: Rng + ?Sized>(
    theta: f64,
    phi: f64,
    shots: usize,
    rng: &mut R,
) -> Result<TeleportationBatch> {
    if shots == 0 {
        return Err(SimError::invalid("shot count must be positive"));
    }
    let circuit = TeleportationCircuit::prepare(theta, phi)?;
    let draws: Vec<f64> = (0..shots).map(|_| rng.gen()).collect();

    let run = |&u: &f64| circuit.shot(u).map(|s| (s.outcome, s.fidelity));
    #[cfg(feature = "parallel")]
    let results: Vec<(BellOutcome, f64)> = draws.par_iter().map(run).collect::<Result<_>>()?;
    #[cfg(not(feature = "parallel"))]
    let results: Vec<(BellOutcome, f64)> = draws.iter().map(run).collect::<Result<_>>()?;

    let mut counts = OutcomeCounts::default();
    let mut sum = 0.0;
    let mut min_fidelity = f64::INFINITY;
    for (outcome, f) in results {
        counts.record(outcome);
        sum += f;
        min_fidelity = min_fidelity.min(f);
    }
    let average_fidelity = sum / shots as f64;
    debug!(
        "teleported θ={:.4} φ={:.4} {} times: counts {:?}, mean F {:.12}",
        theta, phi, shots, counts, average_fidelity
    );

    Ok(TeleportationBatch {
        counts,
        average_fidelity,
        min_fidelity,
        outcome_probabilities: circuit.outcome_probabilities(),
    })
}
