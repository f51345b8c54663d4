//! Leibniz series kernels.
//!
//! Every kernel accumulates terms one at a time in ascending index order,
//! starting from `0.0`, so a partial sum over a range rounds exactly like the
//! corresponding stretch of a serial loop.

use std::f64::consts::PI;
use std::time::{Duration, Instant};

use tracing::debug;

use crate::aggregate;
use crate::partition::ChunkRange;

/// Largest term count whose denominators `2i + 1` still fit in a `u64`.
pub const MAX_ITERATIONS: u64 = u64::MAX / 2;

#[inline]
fn term(idx: u64) -> f64 {
    let numerator: f64 = if idx % 2 == 0 { 4.0 } else { -4.0 };
    numerator / (2 * idx + 1) as f64
}

/// Sum of `(-1)^i * 4 / (2i + 1)` over `range`.
pub fn partial_sum(range: ChunkRange) -> f64 {
    let mut sum: f64 = 0.0;
    for idx in range.start..range.end {
        sum += term(idx);
    }
    sum
}

/// Same sum as [`partial_sum`], driven by a running odd denominator.
pub fn partial_sum_odd(range: ChunkRange) -> f64 {
    let mut sum: f64 = 0.0;
    let mut k: f64 = (2 * range.start + 1) as f64;
    for idx in range.start..range.end {
        let numerator: f64 = if idx % 2 == 0 { 4.0 } else { -4.0 };
        sum += numerator / k;
        k += 2.0;
    }
    sum
}

/// Serial reference over `[0, total)`.
pub fn leibniz(total: u64) -> f64 {
    match ChunkRange::new(0, total) {
        Some(range) => partial_sum(range),
        None => 0.0,
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Checkpoint {
    pub exponent: u32,
    pub index: u64,
    pub denominator: u64,
    pub sum: f64,
    pub difference: f64,
    pub quotient: f64,
    pub relative_error: f64,
    pub elapsed: Duration,
}

impl Checkpoint {
    fn record(exponent: u32, index: u64, sum: f64, since: &Instant) -> Self {
        let checkpoint: Checkpoint = Checkpoint {
            exponent,
            index,
            denominator: 2 * index + 1,
            sum,
            difference: PI - sum,
            quotient: sum / PI,
            relative_error: aggregate::relative_error(sum),
            elapsed: since.elapsed(),
        };

        debug!(
            exponent = checkpoint.exponent,
            k = checkpoint.denominator,
            elapsed = ?checkpoint.elapsed,
            sum = checkpoint.sum,
            difference = checkpoint.difference,
            quotient = checkpoint.quotient,
            relative_error = checkpoint.relative_error,
            "leibniz checkpoint"
        );
        checkpoint
    }
}

/// Serial sum that reports intermediate accuracy each time the index reaches
/// the next power of ten (0, 10, 100, ...) and once more at the end.
///
/// The returned value is bit-identical to [`leibniz`].
pub fn leibniz_with_checkpoints<F>(total: u64, mut on_checkpoint: F) -> f64
where
    F: FnMut(&Checkpoint),
{
    let mut sum: f64 = 0.0;
    let mut exponent: u32 = 0;
    let mut next_power: Option<u64> = Some(1);
    let mut since: Instant = Instant::now();

    for idx in 0..total {
        sum += term(idx);

        if let Some(power) = next_power {
            if idx % power == 0 {
                exponent += 1;
                next_power = 10_u64.checked_pow(exponent);
                // index counts the terms summed so far
                on_checkpoint(&Checkpoint::record(exponent, idx + 1, sum, &since));
                since = Instant::now();
            }
        }
    }

    on_checkpoint(&Checkpoint::record(exponent + 1, total, sum, &since));
    sum
}

#[cfg(test)]
mod tests {
    use super::*;

    fn range(start: u64, end: u64) -> ChunkRange {
        ChunkRange::new(start, end).unwrap()
    }

    #[test]
    fn first_terms() {
        assert_eq!(partial_sum(range(0, 1)), 4.0);
        assert_eq!(partial_sum(range(0, 2)), 4.0 - 4.0 / 3.0);
        assert_eq!(partial_sum(range(1, 2)), -4.0 / 3.0);
        assert_eq!(partial_sum(range(2, 3)), 4.0 / 5.0);
    }

    #[test]
    fn odd_counter_matches_index_form() {
        for (start, end) in [(0, 1), (0, 1_000), (3, 10_007), (999_999, 1_250_000)] {
            let by_index: f64 = partial_sum(range(start, end));
            let by_odd: f64 = partial_sum_odd(range(start, end));
            assert_eq!(by_index.to_bits(), by_odd.to_bits());
        }
    }

    #[test]
    fn empty_total_is_zero() {
        assert_eq!(leibniz(0), 0.0);
    }

    #[test]
    fn error_bound_shrinks() {
        let mut previous: f64 = f64::INFINITY;
        for total in [10_u64, 100, 1_000, 10_000, 100_000] {
            let error: f64 = (PI - leibniz(total)).abs();
            assert!(error <= 4.0 / (2 * total + 1) as f64);
            assert!(error < previous);
            previous = error;
        }
    }

    #[test]
    fn checkpoints_follow_powers_of_ten() {
        let mut checkpoints: Vec<Checkpoint> = Vec::new();
        let sum: f64 = leibniz_with_checkpoints(1_500, |checkpoint| checkpoints.push(*checkpoint));

        assert_eq!(sum.to_bits(), leibniz(1_500).to_bits());

        let indices: Vec<u64> = checkpoints.iter().map(|c| c.index).collect();
        assert_eq!(indices, vec![1, 11, 101, 1_001, 1_500]);

        let exponents: Vec<u32> = checkpoints.iter().map(|c| c.exponent).collect();
        assert_eq!(exponents, vec![1, 2, 3, 4, 5]);

        let last: &Checkpoint = checkpoints.last().unwrap();
        assert_eq!(last.denominator, 3_001);
        assert_eq!(last.difference, PI - sum);
    }

    #[test]
    fn checkpoints_on_empty_total() {
        let mut count: usize = 0;
        let sum: f64 = leibniz_with_checkpoints(0, |_| count += 1);
        assert_eq!(sum, 0.0);
        assert_eq!(count, 1);
    }
}
