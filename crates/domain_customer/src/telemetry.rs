//! Business metrics for customer operations
//!
//! Recorded through the `metrics` facade; the binary decides which recorder
//! (Prometheus) receives them. Without an installed recorder every call is a
//! no-op, which is what unit tests rely on.

use std::time::Instant;

pub const CUSTOMERS_CREATED: &str = "customers_created_total";
pub const CUSTOMERS_UPDATED: &str = "customers_updated_total";
pub const CUSTOMERS_DELETED: &str = "customers_deleted_total";
pub const NOTIFICATIONS_FAILED: &str = "customer_notifications_failed_total";
pub const CUSTOMER_AGE: &str = "customer_age";
pub const CUSTOMERS_ACTIVE: &str = "customers_active";
pub const PROCESSING_SECONDS: &str = "customer_processing_seconds";

pub fn customer_created(age: i32) {
    metrics::counter!(CUSTOMERS_CREATED).increment(1);
    metrics::gauge!(CUSTOMERS_ACTIVE).increment(1.0);
    metrics::histogram!(CUSTOMER_AGE).record(f64::from(age));
}

pub fn customer_updated(age: i32) {
    metrics::counter!(CUSTOMERS_UPDATED).increment(1);
    metrics::histogram!(CUSTOMER_AGE).record(f64::from(age));
}

pub fn customer_deleted() {
    metrics::counter!(CUSTOMERS_DELETED).increment(1);
    metrics::gauge!(CUSTOMERS_ACTIVE).decrement(1.0);
}

pub fn notification_failed() {
    metrics::counter!(NOTIFICATIONS_FAILED).increment(1);
}

/// Resets the active-customer gauge from a full listing
pub fn active_customers(count: usize) {
    metrics::gauge!(CUSTOMERS_ACTIVE).set(count as f64);
}

/// Records how long an operation took when dropped
///
/// Dropping on every exit path, including `?` returns, mirrors a
/// try/finally timer.
pub struct ProcessingTimer {
    operation: &'static str,
    started: Instant,
}

impl ProcessingTimer {
    pub fn start(operation: &'static str) -> Self {
        Self {
            operation,
            started: Instant::now(),
        }
    }
}

impl Drop for ProcessingTimer {
    fn drop(&mut self) {
        metrics::histogram!(PROCESSING_SECONDS, "operation" => self.operation)
            .record(self.started.elapsed().as_secs_f64());
    }
}
