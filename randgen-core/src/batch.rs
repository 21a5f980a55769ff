//! Batch sampling and goodness-of-fit tallies.
//!
//! [`tally_parallel`] splits the work into independent streams, each with its
//! own generator from [`StreamSeeds`], so the tally depends only on the seed
//! and stream layout, never on the number of worker threads.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::InvalidInput;
use crate::rng::{StreamSeeds, UniformSource};
use crate::sampler::WeightedSampler;

/// Per-index selection counts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tally {
    counts: Vec<u64>,
}

/// Pearson chi-square statistic and its degrees of freedom.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GoodnessOfFit {
    pub statistic: f64,
    pub degrees_of_freedom: usize,
}

impl Tally {
    pub fn new(len: usize) -> Self {
        Self {
            counts: vec![0; len],
        }
    }

    /// # Panics
    ///
    /// Panics if `index` is outside the tallied range.
    #[inline]
    pub fn record(&mut self, index: usize) {
        self.counts[index] += 1;
    }

    pub fn counts(&self) -> &[u64] {
        &self.counts
    }

    pub fn total(&self) -> u64 {
        self.counts.iter().sum()
    }

    /// Observed relative frequency per index. All zeros for an empty tally.
    pub fn frequencies(&self) -> Vec<f64> {
        let total = self.total();
        if total == 0 {
            return vec![0.0; self.counts.len()];
        }
        self.counts
            .iter()
            .map(|&c| c as f64 / total as f64)
            .collect()
    }

    /// Element-wise sum of two tallies over the same index range.
    ///
    /// # Panics
    ///
    /// Panics if the tallies cover different numbers of indices.
    pub fn merge(mut self, other: Tally) -> Tally {
        assert_eq!(
            self.counts.len(),
            other.counts.len(),
            "cannot merge tallies of different lengths"
        );
        for (mine, theirs) in self.counts.iter_mut().zip(other.counts) {
            *mine += theirs;
        }
        self
    }

    /// Pearson chi-square against the expected `probabilities`.
    ///
    /// Bins with zero expected count are left out of the statistic and the
    /// degrees of freedom. Any observation in such a bin is an outright
    /// mismatch and yields an infinite statistic.
    pub fn chi_square(&self, probabilities: &[f64]) -> Result<GoodnessOfFit, InvalidInput> {
        if probabilities.len() != self.counts.len() {
            return Err(InvalidInput::LengthMismatch {
                values: self.counts.len(),
                probabilities: probabilities.len(),
            });
        }
        let total = self.total() as f64;
        let mut statistic = 0.0;
        let mut bins = 0usize;
        for (&observed, &p) in self.counts.iter().zip(probabilities) {
            let expected = p * total;
            if expected > 0.0 {
                let diff = observed as f64 - expected;
                statistic += diff * diff / expected;
                bins += 1;
            } else if observed > 0 {
                statistic = f64::INFINITY;
            }
        }
        Ok(GoodnessOfFit {
            statistic,
            degrees_of_freedom: bins.saturating_sub(1),
        })
    }
}

/// Draw `draws` samples from `src` and count the selected indices.
pub fn tally_with<V, S: UniformSource + ?Sized>(
    sampler: &WeightedSampler<V>,
    src: &mut S,
    draws: usize,
) -> Tally {
    let mut tally = Tally::new(sampler.len());
    for _ in 0..draws {
        tally.record(sampler.sample_index_with(src));
    }
    tally
}

/// Draw `streams * draws_per_stream` samples in parallel.
///
/// Stream `k` uses `seeds.rng_for(k)`.
pub fn tally_parallel<V: Sync>(
    sampler: &WeightedSampler<V>,
    seeds: &StreamSeeds,
    streams: usize,
    draws_per_stream: usize,
) -> Tally {
    (0..streams as u64)
        .into_par_iter()
        .map(|stream| {
            let mut rng = seeds.rng_for(stream);
            tally_with(sampler, &mut rng, draws_per_stream)
        })
        .reduce(|| Tally::new(sampler.len()), Tally::merge)
}
