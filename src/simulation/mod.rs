//! Monte Carlo trials over categorical outcomes.
//!
//! This module handles:
//! - Probability vector validation
//! - Seeded categorical sampling
//! - Counts, frequencies and convergence diagnostics

pub mod result;
pub mod sampler;
pub mod vector;

pub use result::SimulationResult;
pub use sampler::{seeded_rng, simulate, TrialSampler};
pub use vector::{ProbabilityVector, SUM_TOLERANCE};
