//! Customer Management Domain
//!
//! This crate owns customer records and the business logic computed over
//! them:
//!
//! - **Aggregate statistics**: count, mean, sample standard deviation, min
//!   and max of customer ages ([`statistics`])
//! - **Life-expectancy estimates**: a projected date derived from a
//!   customer's age and an injected "today" ([`life_expectancy`])
//! - **Customer record service**: the create/read/update/delete/list/metrics
//!   use cases, orchestrated over the storage and notification ports
//!   ([`service`])
//!
//! # Examples
//!
//! ```rust
//! use domain_customer::statistics::compute_metrics;
//!
//! let metrics = compute_metrics(&[30, 25]);
//! assert_eq!(metrics.total_customers, 2);
//! assert_eq!(metrics.average_age, 27.5);
//! ```

pub mod customer;
pub mod error;
pub mod life_expectancy;
pub mod ports;
pub mod service;
pub mod statistics;
pub mod telemetry;
pub mod validation;

pub use customer::{Customer, CustomerDetailView, CustomerMetrics, CustomerView, NewCustomer};
pub use error::CustomerError;
pub use life_expectancy::{estimate_life_expectancy, AVERAGE_LIFE_EXPECTANCY};
pub use ports::{CustomerNotifier, CustomerStore, CustomerTransaction};
pub use service::{CustomerService, MetricsSource};
pub use statistics::compute_metrics;
pub use validation::{validate_input, CustomerInput, FieldErrors};
#[cfg(any(test, feature = "mock"))]
pub use ports::mock::{InMemoryCustomerStore, RecordingNotifier, StoreCall};
