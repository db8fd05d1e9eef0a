//! Tallied outcome of a batch of trials.

use serde::{Deserialize, Serialize};

use super::vector::ProbabilityVector;
use crate::error::SimulationError;

/// Largest accepted gap between a decoded frequency and `count / trials`.
const FREQUENCY_TOLERANCE: f64 = 1e-9;

/// Per-category counts and frequencies from N independent trials.
///
/// Built only from a finished tally, so `counts` always sums to `trials`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawSimulationResult")]
pub struct SimulationResult {
    trials: u64,
    counts: Vec<u64>,
    frequencies: Vec<f64>,
}

/// Wire form, checked before it becomes a [`SimulationResult`].
#[derive(Deserialize)]
struct RawSimulationResult {
    trials: u64,
    counts: Vec<u64>,
    frequencies: Vec<f64>,
}

impl SimulationResult {
    /// Build a result from a finished tally.
    pub fn from_counts(counts: Vec<u64>) -> Self {
        let trials: u64 = counts.iter().sum();
        let frequencies = if trials == 0 {
            vec![0.0; counts.len()]
        } else {
            counts
                .iter()
                .map(|&c| c as f64 / trials as f64)
                .collect()
        };

        Self {
            trials,
            counts,
            frequencies,
        }
    }

    /// Number of trials drawn.
    pub fn trials(&self) -> u64 {
        self.trials
    }

    /// Draws per category; sums to `trials`.
    pub fn counts(&self) -> &[u64] {
        &self.counts
    }

    /// `counts[i] / trials`; all zero when `trials == 0`.
    pub fn frequencies(&self) -> &[f64] {
        &self.frequencies
    }

    /// Number of categories.
    pub fn categories(&self) -> usize {
        self.counts.len()
    }

    /// Simulated minus analytic probability, per category.
    pub fn deviations(&self, probabilities: &ProbabilityVector) -> Vec<f64> {
        self.frequencies
            .iter()
            .zip(probabilities.as_slice())
            .map(|(f, p)| f - p)
            .collect()
    }

    /// Largest absolute deviation from the analytic probabilities.
    pub fn max_abs_deviation(&self, probabilities: &ProbabilityVector) -> f64 {
        self.deviations(probabilities)
            .into_iter()
            .map(f64::abs)
            .fold(0.0, f64::max)
    }
}

impl TryFrom<RawSimulationResult> for SimulationResult {
    type Error = SimulationError;

    fn try_from(raw: RawSimulationResult) -> Result<Self, Self::Error> {
        let result = Self::from_counts(raw.counts);

        if result.trials != raw.trials {
            return Err(SimulationError::InvalidResult(format!(
                "counts sum to {} but trials is {}",
                result.trials, raw.trials
            )));
        }

        let consistent = raw.frequencies.len() == result.frequencies.len()
            && raw
                .frequencies
                .iter()
                .zip(&result.frequencies)
                .all(|(a, b)| (a - b).abs() <= FREQUENCY_TOLERANCE);
        if !consistent {
            return Err(SimulationError::InvalidResult(
                "frequencies do not match counts".to_string(),
            ));
        }

        Ok(result)
    }
}
