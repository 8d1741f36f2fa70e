//! Pre-built Test Fixtures
//!
//! Ready-to-use customers and dates. Every fixture is deterministic so
//! expected values can be written down in tests.

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use core_kernel::{CustomerId, FixedClock};
use domain_customer::{Customer, CustomerInput};

/// Fixture for calendar data
pub struct DateFixtures;

impl DateFixtures {
    /// The "today" used across the suite (Jan 1, 2024)
    pub fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
    }

    /// Creation timestamp stamped on fixture customers
    pub fn created_at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 9, 30, 0).unwrap()
    }

    /// A clock frozen on [`DateFixtures::today`]
    pub fn clock() -> FixedClock {
        FixedClock::on(Self::today())
    }

    pub fn ymd(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }
}

/// Fixture for customer records and payloads
pub struct CustomerFixtures;

impl CustomerFixtures {
    /// John Doe, 30, born 1994-01-01
    pub fn john_doe_input() -> CustomerInput {
        CustomerInput {
            id: None,
            first_name: Some("John".to_string()),
            last_name: Some("Doe".to_string()),
            age: Some(30),
            date_of_birth: Some(DateFixtures::ymd(1994, 1, 1)),
        }
    }

    /// Jane Smith, 25, born 1999-05-15
    pub fn jane_smith_input() -> CustomerInput {
        CustomerInput {
            id: None,
            first_name: Some("Jane".to_string()),
            last_name: Some("Smith".to_string()),
            age: Some(25),
            date_of_birth: Some(DateFixtures::ymd(1999, 5, 15)),
        }
    }

    /// A payload with every field missing
    pub fn empty_input() -> CustomerInput {
        CustomerInput::default()
    }

    /// John Doe persisted with the given id
    pub fn john_doe(id: i64) -> Customer {
        Customer {
            id: CustomerId::new(id),
            first_name: "John".to_string(),
            last_name: "Doe".to_string(),
            age: 30,
            date_of_birth: DateFixtures::ymd(1994, 1, 1),
            created_at: DateFixtures::created_at(),
        }
    }

    /// An 85-year-old customer, past the average life expectancy
    pub fn elderly(id: i64) -> Customer {
        Customer {
            id: CustomerId::new(id),
            first_name: "Old".to_string(),
            last_name: "Timer".to_string(),
            age: 85,
            date_of_birth: DateFixtures::ymd(1939, 1, 1),
            created_at: DateFixtures::created_at(),
        }
    }
}
