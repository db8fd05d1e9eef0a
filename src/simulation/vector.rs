//! Validated probability vectors over mutually exclusive outcomes.

use serde::{Deserialize, Serialize};

use crate::error::SimulationError;

/// Allowed distance of a vector's sum from 1.0.
pub const SUM_TOLERANCE: f64 = 1e-6;

/// Ordered, normalized probabilities over K outcome categories.
///
/// Construction validates the vector and never renormalizes it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<f64>", into = "Vec<f64>")]
pub struct ProbabilityVector(Vec<f64>);

impl ProbabilityVector {
    /// Validate and wrap a probability vector.
    pub fn new(probabilities: Vec<f64>) -> Result<Self, SimulationError> {
        if probabilities.is_empty() {
            return Err(SimulationError::InvalidProbabilityVector(
                "no categories".to_string(),
            ));
        }

        for (i, &p) in probabilities.iter().enumerate() {
            if !p.is_finite() {
                return Err(SimulationError::InvalidProbabilityVector(format!(
                    "probability[{}] is not finite: {}",
                    i, p
                )));
            }
            if p < 0.0 {
                return Err(SimulationError::InvalidProbabilityVector(format!(
                    "probability[{}] is negative: {}",
                    i, p
                )));
            }
        }

        let sum: f64 = probabilities.iter().sum();
        if (sum - 1.0).abs() > SUM_TOLERANCE {
            return Err(SimulationError::InvalidProbabilityVector(format!(
                "probabilities sum to {} (tolerance {})",
                sum, SUM_TOLERANCE
            )));
        }

        Ok(Self(probabilities))
    }

    /// Number of categories.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always false; an empty vector fails validation.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Probabilities in category order.
    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    /// Probability of one category.
    pub fn get(&self, index: usize) -> Option<f64> {
        self.0.get(index).copied()
    }

    /// Standard error of the simulated frequency of `index` after `trials`.
    pub fn standard_error(&self, index: usize, trials: u64) -> Option<f64> {
        if trials == 0 {
            return None;
        }
        let p = self.get(index)?;
        Some((p * (1.0 - p) / trials as f64).sqrt())
    }
}

impl TryFrom<Vec<f64>> for ProbabilityVector {
    type Error = SimulationError;

    fn try_from(probabilities: Vec<f64>) -> Result<Self, Self::Error> {
        Self::new(probabilities)
    }
}

impl From<ProbabilityVector> for Vec<f64> {
    fn from(vector: ProbabilityVector) -> Self {
        vector.0
    }
}
