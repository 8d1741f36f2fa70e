//! Customer entity and its transfer shapes
//!
//! `Customer` is the persisted record. `CustomerView` and
//! `CustomerDetailView` are what callers see; the detail view adds the
//! creation timestamp and a life-expectancy date derived on read.
//!
//! `age` is stored exactly as the caller supplied it and is never reconciled
//! against `date_of_birth`.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::CustomerId;

use crate::life_expectancy::estimate_life_expectancy;

/// A persisted customer record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    /// Storage-assigned identifier, immutable once assigned
    pub id: CustomerId,
    /// Given name
    pub first_name: String,
    /// Family name
    pub last_name: String,
    /// Age in whole years as supplied by the caller
    pub age: i32,
    /// Calendar date of birth
    pub date_of_birth: NaiveDate,
    /// Set by storage on first save, immutable
    pub created_at: DateTime<Utc>,
}

impl Customer {
    /// Overwrites the mutable fields with a validated payload
    ///
    /// `id` and `created_at` are left untouched.
    pub fn apply(&mut self, changes: NewCustomer) {
        self.first_name = changes.first_name;
        self.last_name = changes.last_name;
        self.age = changes.age;
        self.date_of_birth = changes.date_of_birth;
    }

    /// Returns "First Last"
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// Builds the read view with the life-expectancy estimate as of `today`
    pub fn detail_view(&self, today: NaiveDate) -> CustomerDetailView {
        CustomerDetailView {
            id: self.id,
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            age: self.age,
            date_of_birth: self.date_of_birth,
            created_at: self.created_at,
            estimated_life_expectancy: estimate_life_expectancy(self.age, today),
        }
    }
}

/// Validated customer fields that have not been persisted yet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCustomer {
    pub first_name: String,
    pub last_name: String,
    pub age: i32,
    pub date_of_birth: NaiveDate,
}

impl NewCustomer {
    /// Materialises the record once storage has assigned its identity
    pub fn into_customer(self, id: CustomerId, created_at: DateTime<Utc>) -> Customer {
        Customer {
            id,
            first_name: self.first_name,
            last_name: self.last_name,
            age: self.age,
            date_of_birth: self.date_of_birth,
            created_at,
        }
    }
}

/// Customer as returned from create, update, and get
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerView {
    pub id: CustomerId,
    pub first_name: String,
    pub last_name: String,
    pub age: i32,
    pub date_of_birth: NaiveDate,
}

impl From<&Customer> for CustomerView {
    fn from(customer: &Customer) -> Self {
        Self {
            id: customer.id,
            first_name: customer.first_name.clone(),
            last_name: customer.last_name.clone(),
            age: customer.age,
            date_of_birth: customer.date_of_birth,
        }
    }
}

impl From<Customer> for CustomerView {
    fn from(customer: Customer) -> Self {
        Self {
            id: customer.id,
            first_name: customer.first_name,
            last_name: customer.last_name,
            age: customer.age,
            date_of_birth: customer.date_of_birth,
        }
    }
}

/// Customer as returned from the listing, with derived fields
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerDetailView {
    pub id: CustomerId,
    pub first_name: String,
    pub last_name: String,
    pub age: i32,
    pub date_of_birth: NaiveDate,
    pub created_at: DateTime<Utc>,
    /// Derived on read, never persisted
    pub estimated_life_expectancy: NaiveDate,
}

/// Aggregate statistics over all customer ages
///
/// Every field is zero when there are no customers. That result cannot be
/// told apart from a population made entirely of newborns.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerMetrics {
    pub average_age: f64,
    /// Sample standard deviation (n - 1 denominator)
    pub age_standard_deviation: f64,
    pub total_customers: u64,
    pub youngest_customer_age: i32,
    pub oldest_customer_age: i32,
}
