//! Aggregate statistics over customer ages
//!
//! The standard deviation is the sample form (`n - 1` denominator), matching
//! PostgreSQL's `STDDEV`. A single sample has no defined sample deviation
//! and is reported as `0.0`.

use crate::customer::CustomerMetrics;

/// Computes count, mean, sample standard deviation, min and max of `ages`
///
/// An empty slice yields all-zero metrics.
pub fn compute_metrics(ages: &[i32]) -> CustomerMetrics {
    let Some((youngest, oldest)) = age_bounds(ages) else {
        return CustomerMetrics::default();
    };

    let (mean, stddev) = mean_and_sample_stddev(ages);

    CustomerMetrics {
        average_age: mean,
        age_standard_deviation: stddev,
        total_customers: ages.len() as u64,
        youngest_customer_age: youngest,
        oldest_customer_age: oldest,
    }
}

/// Returns `(min, max)` of `ages`, or `None` when empty
pub fn age_bounds(ages: &[i32]) -> Option<(i32, i32)> {
    let first = *ages.first()?;
    Some(
        ages.iter()
            .fold((first, first), |(lo, hi), &age| (lo.min(age), hi.max(age))),
    )
}

/// Mean and sample standard deviation via Welford's online update
///
/// Returns `(0.0, 0.0)` for an empty slice.
pub fn mean_and_sample_stddev(ages: &[i32]) -> (f64, f64) {
    let mut mean = 0.0_f64;
    let mut m2 = 0.0_f64;

    for (index, &age) in ages.iter().enumerate() {
        let value = f64::from(age);
        let count = (index + 1) as f64;
        let delta = value - mean;
        mean += delta / count;
        m2 += delta * (value - mean);
    }

    let stddev = if ages.len() > 1 {
        (m2 / (ages.len() - 1) as f64).sqrt()
    } else {
        0.0
    };

    (mean, stddev)
}
