//! Lower-bound search over a non-decreasing table.

/// Smallest index `i` with `sorted[i] >= target`, or `sorted.len()` if no
/// element reaches `target`.
///
/// Ties resolve to the leftmost matching index. Runs of equal values (which
/// is what zero-weight entries produce in a cumulative table) therefore always
/// select their first element.
///
/// `sorted` must be non-decreasing; the result is unspecified otherwise.
#[inline]
pub fn lower_bound(sorted: &[f64], target: f64) -> usize {
    sorted.partition_point(|&c| c < target)
}
