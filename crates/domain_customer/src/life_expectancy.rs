//! Life-expectancy estimation
//!
//! A deliberately simple model: everyone is expected to reach
//! [`AVERAGE_LIFE_EXPECTANCY`]. Customers at or past that age get one more
//! year so the estimate is always in the future.

use chrono::{Months, NaiveDate};

/// Average life expectancy in years
pub const AVERAGE_LIFE_EXPECTANCY: i32 = 80;

/// Years left before the estimated date, never less than one
pub fn remaining_years(current_age: i32) -> u32 {
    let remaining = AVERAGE_LIFE_EXPECTANCY.saturating_sub(current_age);
    if remaining <= 0 {
        1
    } else {
        remaining as u32
    }
}

/// Estimates the end-of-life date for a customer of `current_age` as of `today`
///
/// Years are added as calendar years: month and day are preserved, except
/// that Feb 29 becomes Feb 28 when the target year is not a leap year.
/// Saturates at `NaiveDate::MAX` for ages so negative the date overflows.
pub fn estimate_life_expectancy(current_age: i32, today: NaiveDate) -> NaiveDate {
    remaining_years(current_age)
        .checked_mul(12)
        .and_then(|months| today.checked_add_months(Months::new(months)))
        .unwrap_or(NaiveDate::MAX)
}
