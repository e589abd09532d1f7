//! Pure states, density matrices and Bloch vectors.

use std::f64::consts::FRAC_1_SQRT_2;

use num_complex::Complex;
use num_traits::{One, Zero};

use crate::error::{Result, SimError};
use crate::linalg::{self, Operator, C64};

/// Single-qubit pure state `cos(θ/2)|0⟩ + e^{iφ} sin(θ/2)|1⟩`.
///
/// Any real θ, φ is accepted. Values outside `[0, π] × [0, 2π)` are not
/// reduced; the trigonometric form is periodic, so they simply land on the
/// equivalent point of the sphere (up to a global phase for θ).
pub fn state_from_bloch(theta: f64, phi: f64) -> [C64; 2] {
    let (s, c) = (theta / 2.0).sin_cos();
    [Complex::new(c, 0.0), Complex::from_polar(s, phi)]
}

/// |Φ+⟩ = (|00⟩ + |11⟩)/√2.
pub fn bell_pair() -> [C64; 4] {
    let h = Complex::new(FRAC_1_SQRT_2, 0.0);
    [h, C64::zero(), C64::zero(), h]
}

/// Computational basis state `|bits⟩` on `bits.len()` qubits, qubit 0 first.
pub fn basis_state(bits: &[u8]) -> Vec<C64> {
    let n = bits.len();
    let index = bits
        .iter()
        .fold(0usize, |acc, &b| (acc << 1) | usize::from(b & 1));
    let mut v = vec![C64::zero(); 1 << n];
    v[index] = C64::one();
    v
}

/// ψψ†
pub fn density_matrix(psi: &[C64]) -> Result<DensityMatrix> {
    DensityMatrix::from_operator(Operator::outer(psi, psi)?)
}

/// Re⟨ψ|ρ|ψ⟩, the fidelity of ρ with respect to the pure target ψ.
pub fn fidelity(psi: &[C64], rho: &DensityMatrix) -> Result<f64> {
    Ok(rho.as_operator().expectation(psi)?.re)
}

/// Real coordinates of a single-qubit state in the unit ball.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlochVector {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl BlochVector {
    /// Surface point for polar angle θ and azimuth φ.
    pub fn from_angles(theta: f64, phi: f64) -> Self {
        let (st, ct) = theta.sin_cos();
        let (sp, cp) = phi.sin_cos();
        Self {
            x: st * cp,
            y: st * sp,
            z: ct,
        }
    }

    pub fn norm(&self) -> f64 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }

    pub fn distance(&self, other: &BlochVector) -> f64 {
        let (dx, dy, dz) = (self.x - other.x, self.y - other.y, self.z - other.z);
        (dx * dx + dy * dy + dz * dz).sqrt()
    }
}

/// Hermitian, trace-one, positive semidefinite operator on 2^n dimensions.
#[derive(Debug, Clone, PartialEq)]
pub struct DensityMatrix {
    op: Operator,
}

impl DensityMatrix {
    /// Wrap an operator on one or more qubits. Only the dimension is checked
    /// here, see [`DensityMatrix::is_valid`] for the physical constraints.
    pub fn from_operator(op: Operator) -> Result<Self> {
        if op.qubit_count()? == 0 {
            return Err(SimError::DimensionMismatch {
                expected: 2,
                got: op.dim(),
            });
        }
        Ok(Self { op })
    }

    /// I/2^n, for at least one qubit.
    pub fn maximally_mixed(n_qubits: usize) -> Self {
        let dim = 1 << n_qubits.max(1);
        Self {
            op: Operator::identity(dim).scale(1.0 / dim as f64),
        }
    }

    pub fn as_operator(&self) -> &Operator {
        &self.op
    }

    pub fn into_operator(self) -> Operator {
        self.op
    }

    pub fn dim(&self) -> usize {
        self.op.dim()
    }

    pub fn num_qubits(&self) -> usize {
        self.op.dim().trailing_zeros() as usize
    }

    #[inline]
    pub fn get(&self, i: usize, j: usize) -> C64 {
        self.op.get(i, j)
    }

    pub fn trace(&self) -> f64 {
        self.op.trace().re
    }

    /// Tr(ρ²); 1 for pure states, 1/2^n for the maximally mixed state.
    pub fn purity(&self) -> f64 {
        self.op.entries().iter().map(|v| v.norm_sqr()).sum()
    }

    /// Diagonal entry ρ_kk.
    pub fn population(&self, k: usize) -> f64 {
        self.op.get(k, k).re
    }

    /// |ρ01|
    pub fn coherence(&self) -> f64 {
        self.op.get(0, 1).norm()
    }

    /// Reduced state of one qubit.
    pub fn reduce_to(&self, keep: usize) -> Result<DensityMatrix> {
        Ok(Self {
            op: linalg::partial_trace(&self.op, keep)?,
        })
    }

    /// Bloch coordinates; defined for single-qubit states only.
    pub fn bloch_vector(&self) -> Result<BlochVector> {
        self.require_single_qubit()?;
        let rho01 = self.op.get(0, 1);
        Ok(BlochVector {
            x: 2.0 * rho01.re,
            y: -2.0 * rho01.im,
            z: (self.op.get(0, 0) - self.op.get(1, 1)).re,
        })
    }

    /// Smaller eigenvalue of a single-qubit ρ.
    pub fn min_eigenvalue(&self) -> Result<f64> {
        self.require_single_qubit()?;
        let tr = self.trace();
        let det = (self.op.get(0, 0) * self.op.get(1, 1) - self.op.get(0, 1) * self.op.get(1, 0)).re;
        let disc = (tr * tr - 4.0 * det).max(0.0).sqrt();
        Ok((tr - disc) / 2.0)
    }

    /// Hermitian, unit trace and non-negative spectrum within `tol`.
    ///
    /// The spectrum is checked exactly for one qubit; for larger states the
    /// diagonal and purity bounds are used.
    pub fn is_valid(&self, tol: f64) -> bool {
        if !self.op.is_hermitian(tol) || (self.trace() - 1.0).abs() > tol {
            return false;
        }
        if self.dim() == 2 {
            return self.min_eigenvalue().map_or(false, |l| l >= -tol);
        }
        (0..self.dim()).all(|k| self.population(k) >= -tol) && self.purity() <= 1.0 + tol
    }

    fn require_single_qubit(&self) -> Result<()> {
        if self.dim() != 2 {
            return Err(SimError::DimensionMismatch {
                expected: 2,
                got: self.dim(),
            });
        }
        Ok(())
    }
}

/// Bloch vector of a single-qubit density matrix.
pub fn bloch_vector(rho: &DensityMatrix) -> Result<BlochVector> {
    rho.bloch_vector()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    #[test]
    fn bloch_poles_and_equator() {
        let zero = state_from_bloch(0.0, 0.0);
        assert!((zero[0].re - 1.0).abs() < 1e-15 && zero[1].norm() < 1e-15);

        let one = state_from_bloch(PI, 0.0);
        assert!(one[0].norm() < 1e-15 && (one[1].norm() - 1.0).abs() < 1e-15);

        let plus_i = state_from_bloch(PI / 2.0, PI / 2.0);
        assert!((plus_i[1].im - FRAC_1_SQRT_2).abs() < 1e-15);
    }

    #[test]
    fn bell_pair_is_normalized() {
        let norm: f64 = bell_pair().iter().map(|a| a.norm_sqr()).sum();
        assert!((norm - 1.0).abs() < 1e-15);
        assert_eq!(bell_pair()[1], C64::zero());
    }

    #[test]
    fn basis_state_orders_qubit_zero_first() {
        let v = basis_state(&[1, 0, 0]);
        assert_eq!(v.len(), 8);
        assert_eq!(v[4], C64::one());
    }

    #[test]
    fn bloch_round_trip_over_grid() {
        for i in 0..=12 {
            for j in 0..24 {
                let theta = PI * i as f64 / 12.0;
                let phi = 2.0 * PI * j as f64 / 24.0;
                let rho = density_matrix(&state_from_bloch(theta, phi)).unwrap();
                let r = rho.bloch_vector().unwrap();
                let expected = BlochVector::from_angles(theta, phi);
                assert!(
                    r.distance(&expected) < 1e-12,
                    "θ={} φ={} got {:?} expected {:?}",
                    theta,
                    phi,
                    r,
                    expected
                );
                assert!((r.norm() - 1.0).abs() < 1e-12);
            }
        }
    }

    #[test]
    fn pure_state_density_matrix_is_valid() {
        let rho = density_matrix(&state_from_bloch(1.1, 4.0)).unwrap();
        assert!(rho.is_valid(1e-12));
        assert!((rho.purity() - 1.0).abs() < 1e-12);
        assert!(rho.min_eigenvalue().unwrap().abs() < 1e-12);
        assert!((fidelity(&state_from_bloch(1.1, 4.0), &rho).unwrap() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn maximally_mixed_has_zero_bloch_vector() {
        let rho = DensityMatrix::maximally_mixed(1);
        assert!(rho.bloch_vector().unwrap().norm() < 1e-15);
        assert!((rho.purity() - 0.5).abs() < 1e-15);
        assert!(DensityMatrix::maximally_mixed(3).is_valid(1e-12));
    }

    #[test]
    fn bloch_vector_requires_one_qubit() {
        let rho = density_matrix(&bell_pair()).unwrap();
        assert!(matches!(
            rho.bloch_vector(),
            Err(SimError::DimensionMismatch { expected: 2, got: 4 })
        ));
        let alice = rho.reduce_to(0).unwrap();
        assert!(alice.bloch_vector().unwrap().norm() < 1e-12);
    }

    #[test]
    fn scalar_is_not_a_density_matrix() {
        assert!(matches!(
            density_matrix(&[C64::one()]),
            Err(SimError::DimensionMismatch { expected: 2, got: 1 })
        ));
        assert!(matches!(
            DensityMatrix::from_operator(Operator::identity(1)),
            Err(SimError::DimensionMismatch { .. })
        ));
    }
}
