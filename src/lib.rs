//! # entanglement-sim
//!
//! A small state-vector and density-matrix engine for the textbook
//! entanglement experiments:
//!
//! - correlated spin measurements on |Φ+⟩ and the cos(θa − θb) law,
//! - the CHSH statistic and its violation of the classical bound,
//! - three-qubit teleportation with Bob's corrections,
//! - phase, amplitude and depolarizing noise on a single qubit.
//!
//! Gates and measurements are built from Kronecker products of 2×2 blocks;
//! only [`linalg::partial_trace`] works on raw basis indices.
//!
//! ## Usage
//!
//! ```no_run
//! use entanglement_sim::prelude::*;
//! use rand::SeedableRng;
//!
//! let mut rng = rand::rngs::StdRng::seed_from_u64(42);
//! let r = chsh_value(&ChshSettings::tsirelson(), 5000, &mut rng).unwrap();
//! println!("S = {:.3} (theory {:.3})", r.empirical, r.theoretical);
//!
//! let batch = teleportation_batch(1.0, 0.5, 400, &mut rng).unwrap();
//! println!("mean fidelity {:.6}", batch.average_fidelity);
//! ```

pub mod chsh;
pub mod config;
pub mod correlation;
pub mod error;
pub mod gates;
pub mod linalg;
pub mod noise;
pub mod state;
pub mod teleportation;

pub mod prelude {
    pub use crate::chsh::*;
    pub use crate::config::*;
    pub use crate::correlation::*;
    pub use crate::error::*;
    pub use crate::gates::*;
    pub use crate::linalg::*;
    pub use crate::noise::*;
    pub use crate::state::*;
    pub use crate::teleportation::*;
}
