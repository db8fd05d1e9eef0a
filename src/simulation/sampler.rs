//! Categorical trial sampler.
//!
//! Draws are made by inverting the cumulative distribution against a uniform
//! `[0, 1)` variate. The generator is always supplied by the caller, so a
//! fixed seed reproduces a run exactly:
//!
//! ```ignore
//! use kalshi_mc::simulation::{seeded_rng, simulate};
//!
//! let mut rng = seeded_rng(Some(42));
//! let result = simulate(&[0.7, 0.3], 100_000, &mut rng)?;
//! assert_eq!(result.counts().iter().sum::<u64>(), 100_000);
//! ```

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use super::result::SimulationResult;
use super::vector::ProbabilityVector;
use crate::error::SimulationError;

/// Build the generator for a run, from `seed` when given.
pub fn seeded_rng(seed: Option<u64>) -> ChaCha8Rng {
    match seed {
        Some(seed) => ChaCha8Rng::seed_from_u64(seed),
        None => ChaCha8Rng::from_entropy(),
    }
}

/// Validate `probabilities` and `trials`, then run the trials.
pub fn simulate<R: Rng + ?Sized>(
    probabilities: &[f64],
    trials: i64,
    rng: &mut R,
) -> Result<SimulationResult, SimulationError> {
    let trials = u64::try_from(trials).map_err(|_| SimulationError::InvalidTrialCount(trials))?;
    let probabilities = ProbabilityVector::new(probabilities.to_vec())?;

    Ok(TrialSampler::new(&probabilities).run(trials, rng))
}

/// Sampler over a validated probability vector.
#[derive(Debug, Clone)]
pub struct TrialSampler {
    /// Running sums of the probabilities.
    cumulative: Vec<f64>,
    /// Index of the last category with non-zero probability.
    last_positive: usize,
}

impl TrialSampler {
    /// Build the cumulative table for `probabilities`.
    pub fn new(probabilities: &ProbabilityVector) -> Self {
        let cumulative: Vec<f64> = probabilities
            .as_slice()
            .iter()
            .scan(0.0, |acc, &p| {
                *acc += p;
                Some(*acc)
            })
            .collect();

        let last_positive = probabilities
            .as_slice()
            .iter()
            .rposition(|&p| p > 0.0)
            .unwrap_or(0);

        Self {
            cumulative,
            last_positive,
        }
    }

    /// Number of categories.
    pub fn categories(&self) -> usize {
        self.cumulative.len()
    }

    /// Draw one category index.
    pub fn draw<R: Rng + ?Sized>(&self, rng: &mut R) -> usize {
        let total = self.cumulative.last().copied().unwrap_or(1.0);
        let u = rng.gen::<f64>() * total;

        // First category whose running sum exceeds u; empty categories never
        // satisfy this because their sum equals their predecessor's.
        let index = self.cumulative.partition_point(|&c| c <= u);
        index.min(self.last_positive)
    }

    /// Run `trials` independent draws and tally them.
    pub fn run<R: Rng + ?Sized>(&self, trials: u64, rng: &mut R) -> SimulationResult {
        let mut counts = vec![0u64; self.categories()];
        for _ in 0..trials {
            counts[self.draw(rng)] += 1;
        }
        SimulationResult::from_counts(counts)
    }
}
