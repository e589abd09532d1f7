//! Error type shared by every engine operation.

use thiserror::Error;

/// Failures surfaced by the simulation engine.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SimError {
    /// A parameter lies outside the domain the operation is defined on.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A normalisation step met a (near-)zero norm or probability total.
    #[error("numerical degeneracy: cannot normalise {what} with total {total:e}")]
    NumericalDegeneracy { what: &'static str, total: f64 },

    /// Operand sizes disagree with each other or with the operation.
    #[error("dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },
}

pub type Result<T> = std::result::Result<T, SimError>;

impl SimError {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        SimError::InvalidArgument(msg.into())
    }
}
