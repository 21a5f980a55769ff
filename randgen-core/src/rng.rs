//! Randomness providers.
//!
//! The sampler never reaches for a global generator on its own: every draw
//! goes through a [`UniformSource`], so tests can inject a seeded or scripted
//! stream. [`StreamSeeds`] hands out independent per-stream generators for
//! concurrent sampling paths.

use rand::distributions::{Distribution, Standard};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// A source of uniform floats in `[0, 1)`.
pub trait UniformSource {
    fn next_uniform(&mut self) -> f64;
}

impl<R: Rng + ?Sized> UniformSource for R {
    #[inline]
    fn next_uniform(&mut self) -> f64 {
        Standard.sample(self)
    }
}

/// Replays a fixed list of draws, wrapping around at the end.
///
/// Useful for pinning the search to exact thresholds in tests.
#[derive(Debug, Clone)]
pub struct ScriptedSource {
    draws: Vec<f64>,
    pos: usize,
}

impl ScriptedSource {
    /// # Panics
    ///
    /// Panics if `draws` is empty or any draw lies outside `[0, 1)`.
    pub fn new(draws: Vec<f64>) -> Self {
        assert!(!draws.is_empty(), "ScriptedSource needs at least one draw");
        assert!(
            draws.iter().all(|u| (0.0..1.0).contains(u)),
            "scripted draws must lie in [0, 1)"
        );
        Self { draws, pos: 0 }
    }

    /// Number of draws consumed so far.
    pub fn consumed(&self) -> usize {
        self.pos
    }
}

impl UniformSource for ScriptedSource {
    fn next_uniform(&mut self) -> f64 {
        let u = self.draws[self.pos % self.draws.len()];
        self.pos += 1;
        u
    }
}

/// Deterministic per-stream seeds.
///
/// The master seed is expanded into per-stream sub-seeds using BLAKE3.
/// Derivation is hash-based, not order-dependent, so stream `k` always gets
/// the same generator regardless of how many other streams exist or which
/// thread asks first.
#[derive(Debug, Clone)]
pub struct StreamSeeds {
    master_seed: u64,
}

impl StreamSeeds {
    pub fn new(master_seed: u64) -> Self {
        Self { master_seed }
    }

    pub fn master_seed(&self) -> u64 {
        self.master_seed
    }

    /// Derive the sub-seed for `stream`.
    pub fn sub_seed(&self, stream: u64) -> u64 {
        let mut hasher = blake3::Hasher::new();
        hasher.update(b"randgen.stream");
        hasher.update(&self.master_seed.to_le_bytes());
        hasher.update(&stream.to_le_bytes());
        let hash = hasher.finalize();
        let mut bytes = [0u8; 8];
        bytes.copy_from_slice(&hash.as_bytes()[..8]);
        u64::from_le_bytes(bytes)
    }

    /// Seeded generator for `stream`.
    pub fn rng_for(&self, stream: u64) -> StdRng {
        StdRng::seed_from_u64(self.sub_seed(stream))
    }
}
