//! RandGen Core: weighted discrete random-value sampling.
//!
//! Given values and a probability mass function, a [`WeightedSampler`]
//! returns values with long-run frequencies matching the probabilities:
//! - Construction-time validation (non-empty, aligned, non-negative, sums to 1)
//! - Cumulative table built with compensated summation
//! - Leftmost lower-bound selection, which keeps zero-weight values unreachable
//! - Injectable randomness and per-stream seeding for reproducible runs
//! - A lock-guarded shared handle for concurrent sampling and reconfiguration

pub mod batch;
pub mod config;
pub mod error;
pub mod rng;
pub mod sampler;
pub mod search;
pub mod shared;
pub mod summation;

pub use batch::{tally_parallel, tally_with, GoodnessOfFit, Tally};
pub use config::SamplerConfig;
pub use error::{ConfigError, InvalidInput};
pub use rng::{ScriptedSource, StreamSeeds, UniformSource};
pub use sampler::WeightedSampler;
pub use shared::SharedSampler;
pub use summation::{DEFAULT_SUM_TOLERANCE, MAX_SUM_TOLERANCE};
