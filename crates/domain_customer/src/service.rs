//! Customer record service
//!
//! Orchestrates the customer use cases over the storage and notification
//! ports. The service is stateless: every call opens its own unit of work,
//! and all collaborators are passed in at construction.
//!
//! # Transactions
//!
//! | Operation | Unit of work |
//! |-----------|--------------|
//! | `create`  | insert, commit, then publish |
//! | `update`  | find, save, commit |
//! | `delete`  | exists, delete, commit |
//! | `get`, `list` | one transaction |
//! | `compute_metrics` | one read-only snapshot |
//!
//! The creation notification is published only after the commit succeeds.
//! A failed publish is logged and counted but does not fail the request; the
//! record stays persisted and no compensating action is taken.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{error, info, instrument, warn};

use core_kernel::{Clock, CustomerId};

use crate::customer::{CustomerDetailView, CustomerMetrics, CustomerView};
use crate::error::CustomerError;
use crate::ports::{CustomerNotifier, CustomerStore, CustomerTransaction};
use crate::statistics::{age_bounds, compute_metrics};
use crate::telemetry::{self, ProcessingTimer};
use crate::validation::{validate_input, CustomerInput};

/// Where `compute_metrics` takes mean and standard deviation from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricsSource {
    /// Computed in process from the stored ages
    #[default]
    InProcess,
    /// Delegated to the storage engine's aggregate queries
    Storage,
}

/// Application service for customer records
#[derive(Clone)]
pub struct CustomerService {
    store: Arc<dyn CustomerStore>,
    notifier: Arc<dyn CustomerNotifier>,
    clock: Arc<dyn Clock>,
    metrics_source: MetricsSource,
}

impl CustomerService {
    /// Creates a service over the given collaborators
    pub fn new(
        store: Arc<dyn CustomerStore>,
        notifier: Arc<dyn CustomerNotifier>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            store,
            notifier,
            clock,
            metrics_source: MetricsSource::default(),
        }
    }

    /// Selects where aggregate statistics come from
    pub fn with_metrics_source(mut self, source: MetricsSource) -> Self {
        self.metrics_source = source;
        self
    }

    /// The storage port, for health checks and monitoring
    pub fn store(&self) -> &Arc<dyn CustomerStore> {
        &self.store
    }

    /// Creates a customer and announces it
    #[instrument(skip_all)]
    pub async fn create(&self, input: CustomerInput) -> Result<CustomerView, CustomerError> {
        let _timer = ProcessingTimer::start("create");
        info!("Creating new customer");

        let new_customer = validate_input(&input)?;

        let mut tx = self.store.begin().await?;
        let saved = tx.insert(new_customer).await?;
        tx.commit().await?;

        let view = CustomerView::from(&saved);
        if let Err(e) = self.notifier.publish_customer_created(&view).await {
            error!(customer_id = %saved.id, error = %e, "Failed to publish customer creation notification");
            telemetry::notification_failed();
        }

        telemetry::customer_created(saved.age);
        info!(customer_id = %saved.id, "Customer created successfully");
        Ok(view)
    }

    /// Fetches a single customer
    #[instrument(skip(self), fields(customer_id = %id))]
    pub async fn get_by_id(&self, id: CustomerId) -> Result<CustomerView, CustomerError> {
        let _timer = ProcessingTimer::start("get");
        info!("Fetching customer");

        let mut tx = self.store.begin().await?;
        let customer = tx
            .find_by_id(id)
            .await?
            .ok_or(CustomerError::NotFound(id))?;
        tx.commit().await?;

        Ok(customer.into())
    }

    /// Lists every customer with an estimated life-expectancy date
    ///
    /// Order follows storage iteration order.
    #[instrument(skip_all)]
    pub async fn list_all_with_life_expectancy(&self) -> Result<Vec<CustomerDetailView>, CustomerError> {
        let _timer = ProcessingTimer::start("list");
        info!("Fetching all customers with life expectancy calculation");

        let mut tx = self.store.begin().await?;
        let customers = tx.find_all().await?;
        tx.commit().await?;

        telemetry::active_customers(customers.len());

        let today = self.clock.today();
        Ok(customers.iter().map(|c| c.detail_view(today)).collect())
    }

    /// Computes aggregate age statistics; zero-valued when empty
    #[instrument(skip_all, fields(source = ?self.metrics_source))]
    pub async fn compute_metrics(&self) -> Result<CustomerMetrics, CustomerError> {
        let _timer = ProcessingTimer::start("metrics");
        info!("Calculating customer metrics");

        let mut tx = self.store.begin_snapshot().await?;
        let ages: Vec<i32> = tx.find_all().await?.iter().map(|c| c.age).collect();

        let metrics = match self.metrics_source {
            MetricsSource::InProcess => compute_metrics(&ages),
            MetricsSource::Storage => storage_metrics(tx.as_mut(), &ages).await?,
        };
        tx.commit().await?;

        Ok(metrics)
    }

    /// Replaces the mutable fields of an existing customer
    #[instrument(skip(self, input), fields(customer_id = %id))]
    pub async fn update(&self, id: CustomerId, input: CustomerInput) -> Result<CustomerView, CustomerError> {
        let _timer = ProcessingTimer::start("update");
        info!("Updating customer");

        let changes = validate_input(&input)?;

        let mut tx = self.store.begin().await?;
        let mut customer = tx
            .find_by_id(id)
            .await?
            .ok_or(CustomerError::NotFound(id))?;

        customer.apply(changes);
        let updated = tx.save(&customer).await?;
        tx.commit().await?;

        telemetry::customer_updated(updated.age);
        info!("Customer updated successfully");
        Ok(updated.into())
    }

    /// Physically removes a customer
    #[instrument(skip(self), fields(customer_id = %id))]
    pub async fn delete(&self, id: CustomerId) -> Result<(), CustomerError> {
        let _timer = ProcessingTimer::start("delete");
        info!("Deleting customer");

        let mut tx = self.store.begin().await?;
        if !tx.exists_by_id(id).await? {
            return Err(CustomerError::NotFound(id));
        }
        tx.delete_by_id(id).await?;
        tx.commit().await?;

        telemetry::customer_deleted();
        info!("Customer deleted successfully");
        Ok(())
    }
}

/// Metrics with mean and deviation from the storage aggregates
///
/// `tx` must be a snapshot, so the aggregates describe the same rows as
/// `ages`. An empty set is all zeros and the aggregates are not queried. On
/// a non-empty set a missing average is a storage failure, and a missing
/// deviation is accepted only for a single record (no sample deviation
/// exists).
async fn storage_metrics(
    tx: &mut dyn CustomerTransaction,
    ages: &[i32],
) -> Result<CustomerMetrics, CustomerError> {
    let Some((youngest, oldest)) = age_bounds(ages) else {
        return Ok(CustomerMetrics::default());
    };

    let average = tx.average_age().await?;
    let deviation = tx.age_standard_deviation().await?;

    let average_age = average.ok_or_else(|| {
        warn!(count = ages.len(), "Storage returned no average for a non-empty customer set");
        CustomerError::storage("average age unavailable for non-empty customer set")
    })?;

    let age_standard_deviation = match deviation {
        Some(value) => value,
        None if ages.len() == 1 => 0.0,
        None => {
            warn!(count = ages.len(), "Storage returned no standard deviation");
            return Err(CustomerError::storage(
                "age standard deviation unavailable for multiple customers",
            ));
        }
    };

    Ok(CustomerMetrics {
        average_age,
        age_standard_deviation,
        total_customers: ages.len() as u64,
        youngest_customer_age: youngest,
        oldest_customer_age: oldest,
    })
}
