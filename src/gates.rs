//! The handful of gates the teleportation circuit needs, lifted onto an
//! n-qubit register by tensor composition.

use std::f64::consts::FRAC_1_SQRT_2;

use num_complex::Complex;
use num_traits::{One, Zero};

use crate::error::{Result, SimError};
use crate::linalg::{embed, Operator, C64};

#[derive(Clone, Debug, Copy, PartialEq, Eq)]
pub enum GateType {
    PauliX,
    PauliZ,
    Hadamard,
}

impl GateType {
    /// 2×2 matrix of the gate.
    pub fn matrix(self) -> Operator {
        let zero = C64::zero();
        let one = C64::one();
        match self {
            GateType::PauliX => Operator::single_qubit(zero, one, one, zero),
            GateType::PauliZ => Operator::single_qubit(one, zero, zero, -one),
            GateType::Hadamard => {
                let h = Complex::new(FRAC_1_SQRT_2, 0.0);
                Operator::single_qubit(h, h, h, -h)
            }
        }
    }
}

/// |0⟩⟨0| or |1⟩⟨1| on one qubit.
pub fn projector(bit: u8) -> Operator {
    if bit == 0 {
        Operator::diagonal(&[C64::one(), C64::zero()])
    } else {
        Operator::diagonal(&[C64::zero(), C64::one()])
    }
}

/// `gate` on `target`, identity elsewhere.
pub fn single(gate: GateType, target: usize, n_qubits: usize) -> Result<Operator> {
    embed(&[(target, &gate.matrix())], n_qubits)
}

/// CNOT = |0⟩⟨0|_c ⊗ I + |1⟩⟨1|_c ⊗ X_t.
pub fn controlled_x(control: usize, target: usize, n_qubits: usize) -> Result<Operator> {
    if control == target {
        return Err(SimError::invalid(format!(
            "qubit {} cannot be both control and target",
            control
        )));
    }
    let x = GateType::PauliX.matrix();
    let idle = embed(&[(control, &projector(0))], n_qubits)?;
    let flip = embed(&[(control, &projector(1)), (target, &x)], n_qubits)?;
    idle.add(&flip)
}

/// Apply `gate` on `target` to a state vector, returning the new vector.
pub fn apply_single(state: &[C64], gate: GateType, target: usize) -> Result<Vec<C64>> {
    single(gate, target, register_size(state)?)?.apply(state)
}

/// Apply CNOT(control → target) to a state vector.
pub fn apply_cnot(state: &[C64], control: usize, target: usize) -> Result<Vec<C64>> {
    controlled_x(control, target, register_size(state)?)?.apply(state)
}

fn register_size(state: &[C64]) -> Result<usize> {
    let len = state.len();
    if len < 2 || !len.is_power_of_two() {
        return Err(SimError::DimensionMismatch {
            expected: len.max(2).next_power_of_two(),
            got: len,
        });
    }
    Ok(len.trailing_zeros() as usize)
}
