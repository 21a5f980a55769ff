//! Weighted discrete sampler.
//!
//! A [`WeightedSampler`] owns three index-aligned sequences: the values, their
//! probabilities, and the cumulative probabilities. The cumulative table is
//! always derived from the probabilities (compensated prefix sums) and is
//! never mutated on its own.
//!
//! Selection draws `u` in `[0, 1)`, scales it by the table total (1.0 up to
//! the sum tolerance) and returns the value at the smallest index whose
//! cumulative probability is `>= u * total`. A zero-weight entry has the same
//! cumulative value as its predecessor, so the leftmost tie-break never lands
//! on it. The search is further confined to the support window (first to last
//! non-zero entry), which covers the two boundary cases the tie-break alone
//! does not: `u == 0.0` against leading zero-weight entries, and a final
//! cumulative value that rounds slightly below 1.0 in front of trailing
//! zero-weight entries.
//!
//! Every constructor and setter validates and builds the complete new state
//! before committing it, so a failed call leaves the sampler untouched.

use std::ops::RangeInclusive;

use rand::distributions::Distribution;
use rand::Rng;
use tracing::debug;

use crate::error::InvalidInput;
use crate::rng::UniformSource;
use crate::search::lower_bound;
use crate::summation::{
    is_close, prefix_sums, stable_sum, DEFAULT_SUM_TOLERANCE, MAX_SUM_TOLERANCE,
};

/// Probabilities plus everything derived from them.
#[derive(Debug, Clone, PartialEq)]
struct Table {
    probabilities: Vec<f64>,
    cumulative: Vec<f64>,
    /// First and last index with non-zero probability.
    support: (usize, usize),
}

impl Table {
    fn build(
        len: usize,
        probabilities: Option<Vec<f64>>,
        tolerance: f64,
    ) -> Result<Self, InvalidInput> {
        if len == 0 {
            return Err(InvalidInput::EmptyValues);
        }
        let probabilities = match probabilities {
            None => vec![1.0 / len as f64; len],
            Some(p) => {
                validate(len, &p, tolerance)?;
                p
            }
        };

        let cumulative = prefix_sums(&probabilities);
        let support = support_window(&probabilities);
        debug!(
            len,
            total = cumulative[len - 1],
            first = support.0,
            last = support.1,
            "built cumulative table"
        );
        Ok(Self {
            probabilities,
            cumulative,
            support,
        })
    }

    #[inline]
    fn total(&self) -> f64 {
        self.cumulative[self.cumulative.len() - 1]
    }

    /// Draws are scaled by the total so an accepted sum short of (or past)
    /// 1.0 never shifts mass onto the last entry.
    #[inline]
    fn select(&self, u: f64) -> usize {
        let (first, last) = self.support;
        first + lower_bound(&self.cumulative[first..last], u * self.total())
    }
}

fn validate(len: usize, probabilities: &[f64], tolerance: f64) -> Result<(), InvalidInput> {
    if probabilities.len() != len {
        return Err(InvalidInput::LengthMismatch {
            values: len,
            probabilities: probabilities.len(),
        });
    }
    for (index, &value) in probabilities.iter().enumerate() {
        if !value.is_finite() {
            return Err(InvalidInput::NonFiniteProbability { index });
        }
        if value < 0.0 {
            return Err(InvalidInput::NegativeProbability { index, value });
        }
    }
    let sum = stable_sum(probabilities);
    if !is_close(sum, 1.0, tolerance) {
        return Err(InvalidInput::SumNotOne { sum, tolerance });
    }
    Ok(())
}

fn validate_tolerance(tolerance: f64) -> Result<(), InvalidInput> {
    if (0.0..=MAX_SUM_TOLERANCE).contains(&tolerance) {
        Ok(())
    } else {
        Err(InvalidInput::InvalidTolerance(tolerance))
    }
}

fn support_window(probabilities: &[f64]) -> (usize, usize) {
    let last_index = probabilities.len() - 1;
    let first = probabilities.iter().position(|&p| p > 0.0).unwrap_or(0);
    let last = probabilities
        .iter()
        .rposition(|&p| p > 0.0)
        .unwrap_or(last_index);
    (first, last)
}

fn rejected(err: InvalidInput) -> InvalidInput {
    debug!(reason = %err, "rejected sampler input");
    err
}

/// Returns values with long-run frequencies matching their probabilities.
#[derive(Debug, Clone, PartialEq)]
pub struct WeightedSampler<V> {
    values: Vec<V>,
    table: Table,
    tolerance: f64,
}

impl<V> WeightedSampler<V> {
    /// Build a sampler over `values`.
    ///
    /// With `probabilities == None` every value gets `1 / values.len()`.
    /// Otherwise the probabilities must match `values` in length, be finite
    /// and non-negative, and sum to 1.0 within [`DEFAULT_SUM_TOLERANCE`].
    pub fn new(values: Vec<V>, probabilities: Option<Vec<f64>>) -> Result<Self, InvalidInput> {
        Self::with_tolerance(values, probabilities, DEFAULT_SUM_TOLERANCE)
    }

    /// Uniform sampler over `values`.
    pub fn uniform(values: Vec<V>) -> Result<Self, InvalidInput> {
        Self::new(values, None)
    }

    /// Like [`new`](Self::new) with an explicit absolute tolerance on the sum.
    ///
    /// The tolerance must lie in `[0, MAX_SUM_TOLERANCE]`.
    pub fn with_tolerance(
        values: Vec<V>,
        probabilities: Option<Vec<f64>>,
        tolerance: f64,
    ) -> Result<Self, InvalidInput> {
        validate_tolerance(tolerance).map_err(rejected)?;
        let table = Table::build(values.len(), probabilities, tolerance).map_err(rejected)?;
        Ok(Self {
            values,
            table,
            tolerance,
        })
    }

    /// Replace the values and reset the probabilities to uniform.
    ///
    /// The old probabilities are never carried over to a value list they were
    /// not validated against. Use [`reconfigure`](Self::reconfigure) to set
    /// both in one step.
    pub fn set_values(&mut self, values: Vec<V>) -> Result<(), InvalidInput> {
        let table = Table::build(values.len(), None, self.tolerance).map_err(rejected)?;
        self.values = values;
        self.table = table;
        Ok(())
    }

    /// Replace the probabilities, validated against the current values.
    ///
    /// `None` resets to uniform.
    pub fn set_probabilities(
        &mut self,
        probabilities: Option<Vec<f64>>,
    ) -> Result<(), InvalidInput> {
        let table =
            Table::build(self.values.len(), probabilities, self.tolerance).map_err(rejected)?;
        self.table = table;
        Ok(())
    }

    /// Replace values and probabilities together.
    pub fn reconfigure(
        &mut self,
        values: Vec<V>,
        probabilities: Option<Vec<f64>>,
    ) -> Result<(), InvalidInput> {
        let table = Table::build(values.len(), probabilities, self.tolerance).map_err(rejected)?;
        self.values = values;
        self.table = table;
        Ok(())
    }

    pub fn values(&self) -> &[V] {
        &self.values
    }

    pub fn probabilities(&self) -> &[f64] {
        &self.table.probabilities
    }

    pub fn cumulative_probabilities(&self) -> &[f64] {
        &self.table.cumulative
    }

    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Always `false`: a sampler cannot exist without values.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Indices the search can return: first to last non-zero probability.
    pub fn support(&self) -> RangeInclusive<usize> {
        self.table.support.0..=self.table.support.1
    }

    /// Index selected by the uniform draw `u`.
    ///
    /// The smallest index inside [`support`](Self::support) whose cumulative
    /// probability is `>= u * total`, or the last index of the support if
    /// none is. `total` is the final cumulative value; it is exactly 1.0 for
    /// every table whose probabilities sum to 1.0 without rounding.
    pub fn select_index(&self, u: f64) -> usize {
        self.table.select(u)
    }

    /// Draw one index from `src`.
    pub fn sample_index_with<S: UniformSource + ?Sized>(&self, src: &mut S) -> usize {
        self.table.select(src.next_uniform())
    }

    /// Borrow one value drawn from `src`.
    pub fn sample_ref_with<S: UniformSource + ?Sized>(&self, src: &mut S) -> &V {
        &self.values[self.sample_index_with(src)]
    }
}

impl<V: Clone> WeightedSampler<V> {
    /// Draw one value from the thread-local generator.
    pub fn sample(&self) -> V {
        self.sample_with(&mut rand::thread_rng())
    }

    /// Draw one value from `src`.
    pub fn sample_with<S: UniformSource + ?Sized>(&self, src: &mut S) -> V {
        self.sample_ref_with(src).clone()
    }
}

impl<V: Clone> Distribution<V> for WeightedSampler<V> {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> V {
        self.sample_with(rng)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::ScriptedSource;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn omitted_probabilities_are_uniform() {
        let sampler = WeightedSampler::uniform(vec![1, 2, 3, 4]).unwrap();
        assert_eq!(sampler.probabilities(), &[0.25, 0.25, 0.25, 0.25]);
        assert_eq!(sampler.cumulative_probabilities(), &[0.25, 0.5, 0.75, 1.0]);
        assert_eq!(sampler.support(), 0..=3);
    }

    #[test]
    fn single_value_has_probability_one() {
        let sampler = WeightedSampler::uniform(vec![5]).unwrap();
        assert_eq!(sampler.values(), &[5]);
        assert_eq!(sampler.probabilities(), &[1.0]);
        assert_eq!(sampler.cumulative_probabilities(), &[1.0]);
    }

    #[test]
    fn explicit_probabilities_build_exact_cumulative() {
        let sampler = WeightedSampler::new(
            vec![1, 2, 3, 4, 5],
            Some(vec![0.125, 0.375, 0.25, 0.0625, 0.1875]),
        )
        .unwrap();
        assert_eq!(sampler.values(), &[1, 2, 3, 4, 5]);
        assert_eq!(sampler.probabilities(), &[0.125, 0.375, 0.25, 0.0625, 0.1875]);
        assert_eq!(
            sampler.cumulative_probabilities(),
            &[0.125, 0.5, 0.75, 0.8125, 1.0]
        );
    }

    #[test]
    fn empty_values_rejected_regardless_of_probabilities() {
        assert_eq!(
            WeightedSampler::<i32>::new(vec![], None),
            Err(InvalidInput::EmptyValues)
        );
        assert_eq!(
            WeightedSampler::<i32>::new(vec![], Some(vec![1.0])),
            Err(InvalidInput::EmptyValues)
        );
    }

    #[test]
    fn invalid_probabilities_rejected() {
        assert_eq!(
            WeightedSampler::new(vec![1, 2, 3], Some(vec![0.2, 0.8])),
            Err(InvalidInput::LengthMismatch {
                values: 3,
                probabilities: 2
            })
        );
        assert_eq!(
            WeightedSampler::new(vec![1, 2, 3], Some(vec![0.2, -0.2, 0.6])),
            Err(InvalidInput::NegativeProbability {
                index: 1,
                value: -0.2
            })
        );
        assert!(matches!(
            WeightedSampler::new(vec![1, 2, 3], Some(vec![0.2, 0.2, 0.2])),
            Err(InvalidInput::SumNotOne { .. })
        ));
        assert_eq!(
            WeightedSampler::new(vec![1, 2], Some(vec![f64::NAN, 1.0])),
            Err(InvalidInput::NonFiniteProbability { index: 0 })
        );
    }

    #[test]
    fn empty_probability_list_is_a_length_mismatch() {
        assert_eq!(
            WeightedSampler::new(vec![1, 2], Some(vec![])),
            Err(InvalidInput::LengthMismatch {
                values: 2,
                probabilities: 0
            })
        );
    }

    #[test]
    fn tolerance_is_enforced() {
        let off = Some(vec![0.5, 0.5 + 5e-7]);
        assert!(WeightedSampler::new(vec!['a', 'b'], off.clone()).is_err());
        assert!(
            WeightedSampler::with_tolerance(vec!['a', 'b'], off, MAX_SUM_TOLERANCE).is_ok()
        );

        for bad in [-1e-9, 2e-6, 0.6, 1.0, f64::NAN, f64::INFINITY] {
            assert!(matches!(
                WeightedSampler::with_tolerance(vec!['a'], None, bad),
                Err(InvalidInput::InvalidTolerance(_))
            ));
        }
    }

    #[test]
    fn tie_break_skips_zero_weight_entry() {
        let sampler = WeightedSampler::new(vec![1, 2, 3], Some(vec![0.75, 0.0, 0.25])).unwrap();
        assert_eq!(sampler.cumulative_probabilities(), &[0.75, 0.75, 1.0]);
        assert_eq!(sampler.select_index(0.75), 0);
        assert_eq!(sampler.select_index(0.7500000001), 2);
        assert_eq!(sampler.select_index(0.0), 0);
        assert_eq!(sampler.select_index(0.9999999999999999), 2);
    }

    #[test]
    fn short_total_scales_draws_instead_of_piling_onto_last_entry() {
        // Sum is 1.0 - 5e-7, within the largest accepted tolerance.
        let sampler = WeightedSampler::with_tolerance(
            vec!['a', 'b'],
            Some(vec![0.5, 0.5 - 5e-7]),
            MAX_SUM_TOLERANCE,
        )
        .unwrap();
        let total = sampler.cumulative_probabilities()[1];
        assert!(total < 1.0);
        // A raw comparison would hand (0.5, 0.5 + 5e-7] to 'b'; scaled, the
        // split sits at 0.5 / total.
        assert_eq!(sampler.select_index(0.5), 0);
        assert_eq!(sampler.select_index(0.5 + 1e-7), 0);
        assert_eq!(sampler.select_index(0.5 / total + 1e-9), 1);
        assert_eq!(sampler.select_index(0.9999999999999999), 1);
    }

    #[test]
    fn leading_zero_weight_unreachable_at_zero_draw() {
        let sampler = WeightedSampler::new(vec!['a', 'b', 'c'], Some(vec![0.0, 0.0, 1.0])).unwrap();
        assert_eq!(sampler.support(), 2..=2);
        assert_eq!(sampler.select_index(0.0), 2);
    }

    #[test]
    fn trailing_zero_weight_unreachable_past_short_total() {
        // Total lands just under 1.0 but within tolerance.
        let sampler =
            WeightedSampler::new(vec!['a', 'b', 'c'], Some(vec![0.5, 0.5 - 1e-12, 0.0])).unwrap();
        assert!(sampler.cumulative_probabilities()[2] < 1.0);
        assert_eq!(sampler.support(), 0..=1);
        assert_eq!(sampler.select_index(0.9999999999999), 1);
    }

    #[test]
    fn scripted_draws_map_to_expected_values() {
        let sampler = WeightedSampler::new(
            vec![1, 2, 3, 4, 5],
            Some(vec![0.125, 0.375, 0.25, 0.0625, 0.1875]),
        )
        .unwrap();
        let mut src = ScriptedSource::new(vec![0.0, 0.125, 0.2, 0.5, 0.6, 0.8, 0.81251, 0.99]);
        let drawn: Vec<i32> = (0..8).map(|_| sampler.sample_with(&mut src)).collect();
        assert_eq!(drawn, vec![1, 1, 2, 2, 3, 4, 5, 5]);
    }

    #[test]
    fn set_values_resets_to_uniform() {
        let mut sampler = WeightedSampler::new(vec![1, 2], Some(vec![0.9, 0.1])).unwrap();
        sampler.set_values(vec![7, 8, 9, 10]).unwrap();
        assert_eq!(sampler.values(), &[7, 8, 9, 10]);
        assert_eq!(sampler.probabilities(), &[0.25; 4]);
        assert_eq!(sampler.cumulative_probabilities(), &[0.25, 0.5, 0.75, 1.0]);
    }

    #[test]
    fn failed_reconfiguration_leaves_state_untouched() {
        let mut sampler = WeightedSampler::new(vec![1, 2], Some(vec![0.9, 0.1])).unwrap();
        let before = sampler.clone();

        assert!(sampler.set_values(vec![]).is_err());
        assert!(sampler.set_probabilities(Some(vec![0.5, 0.6])).is_err());
        assert!(sampler.set_probabilities(Some(vec![1.0])).is_err());
        assert!(sampler.reconfigure(vec![3], Some(vec![0.5])).is_err());

        assert_eq!(sampler, before);
    }

    #[test]
    fn set_probabilities_none_resets_to_uniform() {
        let mut sampler = WeightedSampler::new(vec![1, 2], Some(vec![0.9, 0.1])).unwrap();
        sampler.set_probabilities(None).unwrap();
        assert_eq!(sampler.probabilities(), &[0.5, 0.5]);
    }

    #[test]
    fn reconfigure_replaces_both() {
        let mut sampler = WeightedSampler::uniform(vec!["x"]).unwrap();
        sampler
            .reconfigure(vec!["a", "b"], Some(vec![0.25, 0.75]))
            .unwrap();
        assert_eq!(sampler.values(), &["a", "b"]);
        assert_eq!(sampler.cumulative_probabilities(), &[0.25, 1.0]);
    }

    #[test]
    fn sampling_does_not_mutate_state() {
        let sampler = WeightedSampler::new(vec![-1, 0, 1], Some(vec![0.2, 0.3, 0.5])).unwrap();
        let before = sampler.clone();
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..1_000 {
            sampler.sample_with(&mut rng);
        }
        sampler.sample();
        assert_eq!(sampler, before);
    }

    #[test]
    fn composes_with_rand_distribution() {
        let sampler = WeightedSampler::new(vec![1, 2, 3], Some(vec![0.75, 0.0, 0.25])).unwrap();
        let rng = StdRng::seed_from_u64(3);
        let drawn: Vec<i32> = rng.sample_iter(&sampler).take(500).collect();
        assert!(drawn.iter().all(|&v| v == 1 || v == 3));
    }
}
