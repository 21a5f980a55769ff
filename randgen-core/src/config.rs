//! Serializable sampler configuration.
//!
//! A config is parsed from TOML text the caller has already loaded; this
//! crate performs no file or environment access.
//!
//! ```toml
//! values = [-1, 0, 1, 2, 3]
//! probabilities = [0.01, 0.3, 0.58, 0.1, 0.01]
//! seed = 42
//! ```

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, InvalidInput};
use crate::rng::StreamSeeds;
use crate::sampler::WeightedSampler;
use crate::summation::DEFAULT_SUM_TOLERANCE;

/// Everything needed to rebuild a sampler.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SamplerConfig<V> {
    pub values: Vec<V>,

    /// Omitted means uniform.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub probabilities: Option<Vec<f64>>,

    /// Absolute tolerance on `|sum(probabilities) - 1.0|`.
    #[serde(default = "default_tolerance")]
    pub tolerance: f64,

    /// Master seed for reproducible sampling streams.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

fn default_tolerance() -> f64 {
    DEFAULT_SUM_TOLERANCE
}

impl<V> SamplerConfig<V> {
    pub fn new(values: Vec<V>, probabilities: Option<Vec<f64>>) -> Self {
        Self {
            values,
            probabilities,
            tolerance: DEFAULT_SUM_TOLERANCE,
            seed: None,
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Validate and build the sampler.
    pub fn build(self) -> Result<WeightedSampler<V>, InvalidInput> {
        WeightedSampler::with_tolerance(self.values, self.probabilities, self.tolerance)
    }

    /// Per-stream generators for the configured seed, if any.
    pub fn stream_seeds(&self) -> Option<StreamSeeds> {
        self.seed.map(StreamSeeds::new)
    }
}

impl<V: DeserializeOwned> SamplerConfig<V> {
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }
}

impl<V: Clone> From<&WeightedSampler<V>> for SamplerConfig<V> {
    fn from(sampler: &WeightedSampler<V>) -> Self {
        Self {
            values: sampler.values().to_vec(),
            probabilities: Some(sampler.probabilities().to_vec()),
            tolerance: sampler.tolerance(),
            seed: None,
        }
    }
}
