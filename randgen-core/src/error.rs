//! Structured error types.
//!
//! Every rejected precondition is an [`InvalidInput`]. Validation always runs
//! before any state is committed, so an error never leaves a sampler half
//! rebuilt.

use thiserror::Error;

/// The single error kind raised by construction and reconfiguration.
///
/// Sampling never fails once a sampler exists.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InvalidInput {
    #[error("the value list must not be empty")]
    EmptyValues,

    #[error("values and probabilities must have the same length ({values} values, {probabilities} probabilities)")]
    LengthMismatch { values: usize, probabilities: usize },

    #[error("probability at index {index} is negative ({value})")]
    NegativeProbability { index: usize, value: f64 },

    #[error("probability at index {index} is not finite")]
    NonFiniteProbability { index: usize },

    #[error("probabilities sum to {sum}, expected 1.0 within {tolerance}")]
    SumNotOne { sum: f64, tolerance: f64 },

    #[error("tolerance must lie in [0, {max}], got {0}", max = crate::summation::MAX_SUM_TOLERANCE)]
    InvalidTolerance(f64),
}

/// Errors from loading a [`SamplerConfig`](crate::config::SamplerConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse sampler config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error(transparent)]
    Invalid(#[from] InvalidInput),
}
