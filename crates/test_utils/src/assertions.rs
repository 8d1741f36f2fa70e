//! Custom Test Assertions
//!
//! Assertion helpers for domain types that give more meaningful failure
//! messages than a bare `assert_eq!` on floats.

use domain_customer::CustomerMetrics;

/// Default tolerance for comparing floating-point statistics
pub const METRICS_TOLERANCE: f64 = 1e-9;

/// Asserts two floats are within `tolerance` of each other
pub fn assert_approx_eq(actual: f64, expected: f64, tolerance: f64) {
    let diff = (actual - expected).abs();
    assert!(
        diff <= tolerance,
        "Values differ by more than tolerance: actual={}, expected={}, diff={}, tolerance={}",
        actual,
        expected,
        diff,
        tolerance
    );
}

/// Asserts two metric sets match: integer fields exactly, float fields
/// within [`METRICS_TOLERANCE`]
pub fn assert_metrics_approx_eq(actual: &CustomerMetrics, expected: &CustomerMetrics) {
    assert_eq!(actual.total_customers, expected.total_customers, "total_customers");
    assert_eq!(
        actual.youngest_customer_age, expected.youngest_customer_age,
        "youngest_customer_age"
    );
    assert_eq!(actual.oldest_customer_age, expected.oldest_customer_age, "oldest_customer_age");
    assert_approx_eq(actual.average_age, expected.average_age, METRICS_TOLERANCE);
    assert_approx_eq(
        actual.age_standard_deviation,
        expected.age_standard_deviation,
        METRICS_TOLERANCE,
    );
}

/// Asserts metrics describe an empty population
pub fn assert_metrics_empty(metrics: &CustomerMetrics) {
    assert_eq!(
        *metrics,
        CustomerMetrics::default(),
        "Expected all-zero metrics for an empty population"
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_approx_eq_within_tolerance() {
        assert_approx_eq(0.1 + 0.2, 0.3, METRICS_TOLERANCE);
    }

    #[test]
    #[should_panic(expected = "differ by more than tolerance")]
    fn test_approx_eq_outside_tolerance() {
        assert_approx_eq(1.0, 1.1, 0.01);
    }
}
