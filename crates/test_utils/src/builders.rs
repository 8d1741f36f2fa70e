//! Test Data Builders
//!
//! Builder patterns for constructing test data with sensible defaults.
//! Tests set only the fields they care about.

use chrono::{DateTime, NaiveDate, Utc};
use core_kernel::CustomerId;
use domain_customer::{Customer, CustomerInput};

use crate::fixtures::DateFixtures;

/// Builder for persisted [`Customer`] records
#[derive(Debug, Clone)]
pub struct CustomerBuilder {
    id: i64,
    first_name: String,
    last_name: String,
    age: i32,
    date_of_birth: NaiveDate,
    created_at: DateTime<Utc>,
}

impl Default for CustomerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl CustomerBuilder {
    pub fn new() -> Self {
        Self {
            id: 1,
            first_name: "Test".to_string(),
            last_name: "Customer".to_string(),
            age: 40,
            date_of_birth: DateFixtures::ymd(1984, 1, 1),
            created_at: DateFixtures::created_at(),
        }
    }

    pub fn with_id(mut self, id: i64) -> Self {
        self.id = id;
        self
    }

    pub fn with_name(mut self, first: impl Into<String>, last: impl Into<String>) -> Self {
        self.first_name = first.into();
        self.last_name = last.into();
        self
    }

    /// Sets the age; date of birth is left alone
    pub fn with_age(mut self, age: i32) -> Self {
        self.age = age;
        self
    }

    pub fn with_date_of_birth(mut self, date: NaiveDate) -> Self {
        self.date_of_birth = date;
        self
    }

    pub fn with_created_at(mut self, at: DateTime<Utc>) -> Self {
        self.created_at = at;
        self
    }

    pub fn build(self) -> Customer {
        Customer {
            id: CustomerId::new(self.id),
            first_name: self.first_name,
            last_name: self.last_name,
            age: self.age,
            date_of_birth: self.date_of_birth,
            created_at: self.created_at,
        }
    }

    /// One customer per age, with ids 1..=n
    pub fn with_ages(ages: &[i32]) -> Vec<Customer> {
        ages.iter()
            .zip(1..)
            .map(|(&age, id)| Self::new().with_id(id).with_age(age).build())
            .collect()
    }
}

/// Builder for create/update payloads
///
/// Starts from a complete, valid payload; `without_*` clears a field to
/// exercise the required-field checks.
#[derive(Debug, Clone)]
pub struct CustomerInputBuilder {
    input: CustomerInput,
}

impl Default for CustomerInputBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl CustomerInputBuilder {
    pub fn new() -> Self {
        Self {
            input: CustomerInput {
                id: None,
                first_name: Some("Test".to_string()),
                last_name: Some("Customer".to_string()),
                age: Some(40),
                date_of_birth: Some(DateFixtures::ymd(1984, 1, 1)),
            },
        }
    }

    pub fn first_name(mut self, name: impl Into<String>) -> Self {
        self.input.first_name = Some(name.into());
        self
    }

    pub fn last_name(mut self, name: impl Into<String>) -> Self {
        self.input.last_name = Some(name.into());
        self
    }

    pub fn age(mut self, age: i32) -> Self {
        self.input.age = Some(age);
        self
    }

    pub fn date_of_birth(mut self, date: NaiveDate) -> Self {
        self.input.date_of_birth = Some(date);
        self
    }

    /// Sets the client-supplied id, which storage ignores
    pub fn id(mut self, id: i64) -> Self {
        self.input.id = Some(CustomerId::new(id));
        self
    }

    pub fn without_first_name(mut self) -> Self {
        self.input.first_name = None;
        self
    }

    pub fn without_age(mut self) -> Self {
        self.input.age = None;
        self
    }

    pub fn without_date_of_birth(mut self) -> Self {
        self.input.date_of_birth = None;
        self
    }

    pub fn build(self) -> CustomerInput {
        self.input
    }
}
