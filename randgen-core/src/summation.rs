//! Compensated floating-point summation.
//!
//! Probabilities are summed with Neumaier's variant of Kahan summation so the
//! "sums to 1.0" check and the cumulative table do not accumulate rounding
//! error as the number of entries grows.

/// Absolute tolerance on `|sum - 1.0|` used when none is given explicitly.
///
/// At a target of 1.0 this is the same as a relative tolerance of 1e-9.
pub const DEFAULT_SUM_TOLERANCE: f64 = 1e-9;

/// Largest tolerance a sampler accepts.
pub const MAX_SUM_TOLERANCE: f64 = 1e-6;

/// Running Neumaier accumulator.
#[derive(Debug, Clone, Copy, Default)]
struct Compensated {
    sum: f64,
    compensation: f64,
}

impl Compensated {
    fn add(&mut self, x: f64) {
        let t = self.sum + x;
        if self.sum.abs() >= x.abs() {
            self.compensation += (self.sum - t) + x;
        } else {
            self.compensation += (x - t) + self.sum;
        }
        self.sum = t;
    }

    fn total(&self) -> f64 {
        self.sum + self.compensation
    }
}

/// Compensated sum of `xs`.
pub fn stable_sum(xs: &[f64]) -> f64 {
    let mut acc = Compensated::default();
    for &x in xs {
        acc.add(x);
    }
    acc.total()
}

/// Compensated prefix sums: element `i` equals `stable_sum(&xs[..=i])`.
///
/// The accumulator state after `i + 1` terms depends only on those terms, so
/// emitting it at each step gives the same bits as re-summing every prefix
/// from scratch, without the quadratic cost.
pub fn prefix_sums(xs: &[f64]) -> Vec<f64> {
    let mut acc = Compensated::default();
    xs.iter()
        .map(|&x| {
            acc.add(x);
            acc.total()
        })
        .collect()
}

/// `true` when `a` and `b` differ by at most `tolerance`.
#[inline]
pub fn is_close(a: f64, b: f64, tolerance: f64) -> bool {
    (a - b).abs() <= tolerance
}
