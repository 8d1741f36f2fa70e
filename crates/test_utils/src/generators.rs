//! Property-Based Test Generators
//!
//! Proptest strategies for customer data that satisfy the validation
//! rules, plus a few that deliberately break them.

use chrono::NaiveDate;
use proptest::prelude::*;

use domain_customer::CustomerInput;

/// Ages accepted by validation
pub fn age_strategy() -> impl Strategy<Value = i32> {
    0i32..=120
}

/// Ages strictly below the average life expectancy
pub fn young_age_strategy() -> impl Strategy<Value = i32> {
    0i32..80
}

/// Ages at or above the average life expectancy
pub fn elderly_age_strategy() -> impl Strategy<Value = i32> {
    80i32..=120
}

/// Non-empty age samples
pub fn ages_strategy(max_len: usize) -> impl Strategy<Value = Vec<i32>> {
    prop::collection::vec(age_strategy(), 1..=max_len.max(1))
}

/// Calendar dates between 1900 and 2100
pub fn date_strategy() -> impl Strategy<Value = NaiveDate> {
    (1900i32..=2100, 1u32..=12, 1u32..=28)
        .prop_map(|(y, m, d)| NaiveDate::from_ymd_opt(y, m, d).unwrap())
}

/// Names of 1 to 100 characters
pub fn name_strategy() -> impl Strategy<Value = String> {
    "[A-Za-z][A-Za-z '-]{0,49}"
}

/// Complete payloads that pass validation
pub fn valid_input_strategy() -> impl Strategy<Value = CustomerInput> {
    (name_strategy(), name_strategy(), age_strategy(), date_strategy()).prop_map(
        |(first, last, age, dob)| CustomerInput {
            id: None,
            first_name: Some(first),
            last_name: Some(last),
            age: Some(age),
            date_of_birth: Some(dob),
        },
    )
}

/// Ages that validation must reject
pub fn negative_age_strategy() -> impl Strategy<Value = i32> {
    i32::MIN..0
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain_customer::validate_input;

    proptest! {
        #[test]
        fn generated_inputs_are_valid(input in valid_input_strategy()) {
            prop_assert!(validate_input(&input).is_ok());
        }
    }
}
