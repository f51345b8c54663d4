//! Combining partial sums and measuring accuracy.
//!
//! Floating-point addition is not associative, so the summation order is part
//! of the result: partials are always added in ascending range order.

use std::f64::consts::PI;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::job::Strategy;

/// Sum over one range, tagged with the range start.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PartialResult {
    pub start: u64,
    pub value: f64,
}

/// Adds `partials` in ascending range order.
pub fn sum_partials(partials: &mut [PartialResult]) -> f64 {
    partials.sort_by_key(|partial| partial.start);
    sum_ordered(partials.iter().map(|partial| partial.value))
}

/// Adds `values` in the order given.
pub fn sum_ordered<I>(values: I) -> f64
where
    I: IntoIterator<Item = f64>,
{
    let mut total: f64 = 0.0;
    for value in values {
        total += value;
    }
    total
}

pub fn absolute_error(approx: f64) -> f64 {
    PI - approx
}

/// Percentage error relative to the approximation, not to π.
pub fn relative_error(approx: f64) -> f64 {
    100.0 * (PI - approx) / approx
}

pub fn quotient(approx: f64) -> f64 {
    approx / PI
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AggregateResult {
    pub strategy: Strategy,
    pub pi_approx: f64,
    pub elapsed: Duration,
}

impl AggregateResult {
    pub fn new(strategy: Strategy, pi_approx: f64, elapsed: Duration) -> Self {
        Self {
            strategy,
            pi_approx,
            elapsed,
        }
    }

    pub fn absolute_error(&self) -> f64 {
        absolute_error(self.pi_approx)
    }

    pub fn relative_error(&self) -> f64 {
        relative_error(self.pi_approx)
    }

    pub fn quotient(&self) -> f64 {
        quotient(self.pi_approx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partials_sorted_before_summing() {
        let mut partials: Vec<PartialResult> = vec![
            PartialResult { start: 20, value: 1e-16 },
            PartialResult { start: 0, value: 1.0 },
            PartialResult { start: 10, value: 1e-16 },
        ];
        let total: f64 = sum_partials(&mut partials);

        assert_eq!(total.to_bits(), sum_ordered([1.0, 1e-16, 1e-16]).to_bits());
        let starts: Vec<u64> = partials.iter().map(|p| p.start).collect();
        assert_eq!(starts, vec![0, 10, 20]);
    }

    #[test]
    fn empty_sum_is_zero() {
        assert_eq!(sum_ordered(Vec::new()), 0.0);
        assert_eq!(sum_partials(&mut []), 0.0);
    }

    #[test]
    fn relative_error_divides_by_approximation() {
        let approx: f64 = 3.0;
        assert_eq!(absolute_error(approx), PI - 3.0);
        assert_eq!(relative_error(approx), 100.0 * (PI - 3.0) / 3.0);
        assert_eq!(relative_error(PI), 0.0);
        assert_eq!(quotient(PI), 1.0);
    }
}
