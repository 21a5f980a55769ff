//! Thread-safe handle over a [`WeightedSampler`].
//!
//! Sampling takes the read lock, so any number of threads sample in parallel.
//! Reconfiguration takes the write lock; because the sampler builds its new
//! state before committing it, a reader observes either the complete old
//! configuration or the complete new one, never old values paired with a new
//! cumulative table.

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::error::InvalidInput;
use crate::rng::UniformSource;
use crate::sampler::WeightedSampler;

/// Cloneable, shareable sampler. Clones share the same underlying state.
#[derive(Debug)]
pub struct SharedSampler<V> {
    inner: Arc<RwLock<WeightedSampler<V>>>,
}

impl<V> Clone for SharedSampler<V> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<V> From<WeightedSampler<V>> for SharedSampler<V> {
    fn from(sampler: WeightedSampler<V>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(sampler)),
        }
    }
}

impl<V> SharedSampler<V> {
    pub fn new(values: Vec<V>, probabilities: Option<Vec<f64>>) -> Result<Self, InvalidInput> {
        WeightedSampler::new(values, probabilities).map(Self::from)
    }

    // A panic while a guard is held cannot leave a half-written sampler:
    // every mutation is a single assignment of fully built state.
    fn read(&self) -> RwLockReadGuard<'_, WeightedSampler<V>> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, WeightedSampler<V>> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn set_values(&self, values: Vec<V>) -> Result<(), InvalidInput> {
        self.write().set_values(values)
    }

    pub fn set_probabilities(&self, probabilities: Option<Vec<f64>>) -> Result<(), InvalidInput> {
        self.write().set_probabilities(probabilities)
    }

    pub fn reconfigure(
        &self,
        values: Vec<V>,
        probabilities: Option<Vec<f64>>,
    ) -> Result<(), InvalidInput> {
        self.write().reconfigure(values, probabilities)
    }

    /// Run `f` against a consistent view of the current sampler.
    ///
    /// The read lock is held while `f` runs: `f` must not reconfigure this
    /// sampler (through any clone of the handle), or it deadlocks.
    pub fn with<T>(&self, f: impl FnOnce(&WeightedSampler<V>) -> T) -> T {
        f(&self.read())
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }
}

impl<V: Clone> SharedSampler<V> {
    pub fn sample(&self) -> V {
        self.read().sample()
    }

    pub fn sample_with<S: UniformSource + ?Sized>(&self, src: &mut S) -> V {
        self.read().sample_with(src)
    }

    /// Copy of the current configuration.
    pub fn snapshot(&self) -> WeightedSampler<V> {
        self.read().clone()
    }
}
