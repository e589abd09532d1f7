//! Dense complex linear algebra for 1–3 qubit systems.
//!
//! Operators are square matrices stored flattened row-major.
//! Qubit 0 is the leftmost (most significant) tensor factor, so for `n`
//! qubits the bit of qubit `q` in basis index `i` is `(i >> (n - 1 - q)) & 1`.
//! That indexing convention is confined to this module.

use num_complex::Complex;
use num_traits::{One, Zero};

use crate::error::{Result, SimError};

pub type C64 = Complex<f64>;

/// Norms or probability totals below this are treated as degenerate.
pub const NORM_EPSILON: f64 = 1e-12;

/// A square complex matrix.
#[derive(Debug, Clone, PartialEq)]
pub struct Operator {
    dim: usize,
    entries: Vec<C64>,
}

impl Operator {
    pub fn zeros(dim: usize) -> Self {
        Self {
            dim,
            entries: vec![C64::zero(); dim * dim],
        }
    }

    pub fn identity(dim: usize) -> Self {
        let mut op = Self::zeros(dim);
        for k in 0..dim {
            op.set(k, k, C64::one());
        }
        op
    }

    /// Build from row-major entries; `entries.len()` must equal `dim²`.
    pub fn from_entries(dim: usize, entries: Vec<C64>) -> Result<Self> {
        if entries.len() != dim * dim {
            return Err(SimError::DimensionMismatch {
                expected: dim * dim,
                got: entries.len(),
            });
        }
        Ok(Self { dim, entries })
    }

    /// 2×2 operator from its four entries `[[a, b], [c, d]]`.
    pub fn single_qubit(a: C64, b: C64, c: C64, d: C64) -> Self {
        Self {
            dim: 2,
            entries: vec![a, b, c, d],
        }
    }

    pub fn diagonal(diag: &[C64]) -> Self {
        let mut op = Self::zeros(diag.len());
        for (k, &v) in diag.iter().enumerate() {
            op.set(k, k, v);
        }
        op
    }

    /// |a⟩⟨b|
    pub fn outer(a: &[C64], b: &[C64]) -> Result<Self> {
        if a.len() != b.len() {
            return Err(SimError::DimensionMismatch {
                expected: a.len(),
                got: b.len(),
            });
        }
        let dim = a.len();
        let mut entries = Vec::with_capacity(dim * dim);
        for ai in a {
            for bj in b {
                entries.push(ai * bj.conj());
            }
        }
        Ok(Self { dim, entries })
    }

    #[inline]
    pub fn dim(&self) -> usize {
        self.dim
    }

    #[inline]
    pub fn get(&self, i: usize, j: usize) -> C64 {
        self.entries[i * self.dim + j]
    }

    #[inline]
    pub fn set(&mut self, i: usize, j: usize, value: C64) {
        self.entries[i * self.dim + j] = value;
    }

    pub fn entries(&self) -> &[C64] {
        &self.entries
    }

    /// Number of qubits this operator acts on; the dimension must be `2^n`.
    pub fn qubit_count(&self) -> Result<usize> {
        if self.dim == 0 || !self.dim.is_power_of_two() {
            return Err(SimError::DimensionMismatch {
                expected: self.dim.max(1).next_power_of_two(),
                got: self.dim,
            });
        }
        Ok(self.dim.trailing_zeros() as usize)
    }

    /// Conjugate transpose.
    pub fn dagger(&self) -> Self {
        let d = self.dim;
        let mut out = Self::zeros(d);
        for i in 0..d {
            for j in 0..d {
                out.set(j, i, self.get(i, j).conj());
            }
        }
        out
    }

    pub fn matmul(&self, other: &Operator) -> Result<Operator> {
        self.check_same_dim(other)?;
        let d = self.dim;
        let mut out = Self::zeros(d);
        for i in 0..d {
            for k in 0..d {
                let a = self.get(i, k);
                if a.is_zero() {
                    continue;
                }
                for j in 0..d {
                    out.entries[i * d + j] += a * other.get(k, j);
                }
            }
        }
        Ok(out)
    }

    pub fn add(&self, other: &Operator) -> Result<Operator> {
        self.check_same_dim(other)?;
        let entries = self
            .entries
            .iter()
            .zip(&other.entries)
            .map(|(a, b)| a + b)
            .collect();
        Ok(Self {
            dim: self.dim,
            entries,
        })
    }

    pub fn scale(&self, factor: f64) -> Operator {
        Self {
            dim: self.dim,
            entries: self.entries.iter().map(|v| v * factor).collect(),
        }
    }

    /// A·B·A†, the conjugation used by Kraus channels.
    pub fn sandwich(&self, inner: &Operator) -> Result<Operator> {
        self.matmul(inner)?.matmul(&self.dagger())
    }

    pub fn trace(&self) -> C64 {
        (0..self.dim).map(|k| self.get(k, k)).sum()
    }

    /// Matrix–vector product.
    pub fn apply(&self, v: &[C64]) -> Result<Vec<C64>> {
        if v.len() != self.dim {
            return Err(SimError::DimensionMismatch {
                expected: self.dim,
                got: v.len(),
            });
        }
        Ok((0..self.dim)
            .map(|i| (0..self.dim).map(|j| self.get(i, j) * v[j]).sum())
            .collect())
    }

    /// ⟨v|A|v⟩
    pub fn expectation(&self, v: &[C64]) -> Result<C64> {
        let av = self.apply(v)?;
        Ok(v.iter().zip(&av).map(|(a, b)| a.conj() * b).sum())
    }

    /// Kronecker product `self ⊗ other`.
    pub fn kron(&self, other: &Operator) -> Operator {
        let (da, db) = (self.dim, other.dim);
        let d = da * db;
        let mut out = Self::zeros(d);
        for i in 0..da {
            for j in 0..da {
                let a = self.get(i, j);
                if a.is_zero() {
                    continue;
                }
                for k in 0..db {
                    for l in 0..db {
                        out.set(i * db + k, j * db + l, a * other.get(k, l));
                    }
                }
            }
        }
        out
    }

    /// Largest entry-wise distance to `other` is at most `tol`.
    pub fn approx_eq(&self, other: &Operator, tol: f64) -> bool {
        self.dim == other.dim
            && self
                .entries
                .iter()
                .zip(&other.entries)
                .all(|(a, b)| (a - b).norm() <= tol)
    }

    pub fn is_hermitian(&self, tol: f64) -> bool {
        self.approx_eq(&self.dagger(), tol)
    }

    fn check_same_dim(&self, other: &Operator) -> Result<()> {
        if self.dim != other.dim {
            return Err(SimError::DimensionMismatch {
                expected: self.dim,
                got: other.dim,
            });
        }
        Ok(())
    }
}

/// Kronecker product of `ops`, left to right.
pub fn tensor_compose(ops: &[Operator]) -> Result<Operator> {
    let (first, rest) = ops
        .split_first()
        .ok_or(SimError::DimensionMismatch { expected: 1, got: 0 })?;
    Ok(rest.iter().fold(first.clone(), |acc, op| acc.kron(op)))
}

/// Kronecker product of state vectors, left to right.
pub fn tensor_states(states: &[&[C64]]) -> Result<Vec<C64>> {
    let (first, rest) = states
        .split_first()
        .ok_or(SimError::DimensionMismatch { expected: 1, got: 0 })?;
    Ok(rest.iter().fold(first.to_vec(), |acc, s| {
        acc.iter()
            .flat_map(|a| s.iter().map(move |b| a * b))
            .collect()
    }))
}

/// Lift single-qubit operators onto an `n_qubits` register.
///
/// `factors` pairs a qubit index with the 2×2 operator acting on it; every
/// other qubit gets the identity.
pub fn embed(factors: &[(usize, &Operator)], n_qubits: usize) -> Result<Operator> {
    let mut ops = vec![Operator::identity(2); n_qubits];
    for &(qubit, op) in factors {
        if qubit >= n_qubits {
            return Err(SimError::invalid(format!(
                "qubit {} out of range for {} qubits",
                qubit, n_qubits
            )));
        }
        if op.dim() != 2 {
            return Err(SimError::DimensionMismatch {
                expected: 2,
                got: op.dim(),
            });
        }
        ops[qubit] = op.clone();
    }
    tensor_compose(&ops)
}

/// Reduced density matrix of qubit `keep`, tracing out every other qubit.
pub fn partial_trace(rho: &Operator, keep: usize) -> Result<Operator> {
    let n = rho.qubit_count()?;
    if keep >= n {
        return Err(SimError::invalid(format!(
            "cannot keep qubit {} of a {}-qubit state",
            keep, n
        )));
    }
    let shift = n - 1 - keep;
    let low_mask = (1usize << shift) - 1;
    // Re-insert the kept bit into an environment index.
    let index = |env: usize, bit: usize| ((env >> shift) << (shift + 1)) | (bit << shift) | (env & low_mask);

    let mut reduced = Operator::zeros(2);
    for a in 0..2 {
        for b in 0..2 {
            let sum: C64 = (0..rho.dim() / 2)
                .map(|env| rho.get(index(env, a), index(env, b)))
                .sum();
            reduced.set(a, b, sum);
        }
    }
    Ok(reduced)
}

/// Rescale to unit Euclidean norm.
pub fn normalize(v: &[C64]) -> Result<Vec<C64>> {
    let norm = v.iter().map(|a| a.norm_sqr()).sum::<f64>().sqrt();
    if !(norm > NORM_EPSILON) {
        return Err(SimError::NumericalDegeneracy {
            what: "state vector",
            total: norm,
        });
    }
    Ok(v.iter().map(|a| a / norm).collect())
}

/// Clamp negative round-off to zero, then rescale to unit sum.
pub fn normalize_probabilities(p: &[f64]) -> Result<Vec<f64>> {
    let clamped: Vec<f64> = p.iter().map(|&x| x.max(0.0)).collect();
    let total: f64 = clamped.iter().sum();
    if !(total > NORM_EPSILON) {
        return Err(SimError::NumericalDegeneracy {
            what: "probability table",
            total,
        });
    }
    Ok(clamped.into_iter().map(|x| x / total).collect())
}
