//! PostgreSQL Customer Adapter
//!
//! Implements the `CustomerStore` port with `CustomerRepository`. Each unit
//! of work owns a `sqlx::Transaction`; dropping it without a commit lets
//! SQLx roll the transaction back. Snapshot units of work run at
//! `REPEATABLE READ`, so multi-statement reads agree with each other.

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Transaction};
use tracing::{debug, instrument, warn};

use core_kernel::{CustomerId, DomainPort, HealthCheckResult, HealthCheckable, PortError};
use domain_customer::{Customer, CustomerStore, CustomerTransaction, NewCustomer};

use crate::error::DatabaseError;
use crate::repositories::CustomerRepository;

const ADAPTER_ID: &str = "postgres-customer-store";

/// PostgreSQL-backed implementation of the CustomerStore port
///
/// Database errors are translated to `PortError`:
/// - `DatabaseError::NotFound` -> `PortError::NotFound`
/// - `DatabaseError::PoolExhausted` -> `PortError::ServiceUnavailable`
/// - connection failures -> `PortError::Connection`
/// - everything else -> `PortError::Internal`
#[derive(Debug, Clone)]
pub struct PostgresCustomerStore {
    repository: CustomerRepository,
    pool: PgPool,
}

impl PostgresCustomerStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            repository: CustomerRepository::new(pool.clone()),
            pool,
        }
    }

    /// Returns a reference to the underlying repository
    pub fn repository(&self) -> &CustomerRepository {
        &self.repository
    }
}

impl DomainPort for PostgresCustomerStore {}

#[async_trait]
impl HealthCheckable for PostgresCustomerStore {
    /// Runs `SELECT 1` against the pool
    async fn health_check(&self) -> HealthCheckResult {
        let start = std::time::Instant::now();

        let result = sqlx::query_scalar::<_, i32>("SELECT 1")
            .fetch_one(&self.pool)
            .await;

        let latency_ms = start.elapsed().as_millis() as u64;

        match result {
            Ok(_) => HealthCheckResult::healthy(ADAPTER_ID, latency_ms),
            Err(e) => {
                warn!(error = %e, "Database health check failed");
                HealthCheckResult::unhealthy(ADAPTER_ID, latency_ms, format!("Database error: {}", e))
            }
        }
    }
}

#[async_trait]
impl CustomerStore for PostgresCustomerStore {
    #[instrument(skip(self))]
    async fn begin(&self) -> Result<Box<dyn CustomerTransaction>, PortError> {
        let tx = self.repository.begin().await?;
        Ok(Box::new(PostgresCustomerTransaction { tx }))
    }

    #[instrument(skip(self))]
    async fn begin_snapshot(&self) -> Result<Box<dyn CustomerTransaction>, PortError> {
        let tx = self.repository.begin_snapshot().await?;
        Ok(Box::new(PostgresCustomerTransaction { tx }))
    }
}

/// A customer unit of work over one database transaction
pub struct PostgresCustomerTransaction {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl CustomerTransaction for PostgresCustomerTransaction {
    #[instrument(skip_all)]
    async fn insert(&mut self, customer: NewCustomer) -> Result<Customer, PortError> {
        let row = CustomerRepository::insert(&mut self.tx, &customer).await?;
        debug!(customer_id = row.id, "Inserted customer row");
        Ok(row.into())
    }

    #[instrument(skip_all, fields(customer_id = %customer.id))]
    async fn save(&mut self, customer: &Customer) -> Result<Customer, PortError> {
        let row = CustomerRepository::update(&mut self.tx, customer).await?;
        Ok(row.into())
    }

    async fn find_by_id(&mut self, id: CustomerId) -> Result<Option<Customer>, PortError> {
        let row = CustomerRepository::find_by_id(&mut self.tx, id).await?;
        Ok(row.map(Customer::from))
    }

    async fn find_all(&mut self) -> Result<Vec<Customer>, PortError> {
        let rows = CustomerRepository::find_all(&mut self.tx).await?;
        Ok(rows.into_iter().map(Customer::from).collect())
    }

    async fn exists_by_id(&mut self, id: CustomerId) -> Result<bool, PortError> {
        Ok(CustomerRepository::exists(&mut self.tx, id).await?)
    }

    #[instrument(skip(self), fields(customer_id = %id))]
    async fn delete_by_id(&mut self, id: CustomerId) -> Result<(), PortError> {
        let removed = CustomerRepository::delete(&mut self.tx, id).await?;
        debug!(removed, "Deleted customer rows");
        Ok(())
    }

    async fn average_age(&mut self) -> Result<Option<f64>, PortError> {
        Ok(CustomerRepository::average_age(&mut self.tx).await?)
    }

    async fn age_standard_deviation(&mut self) -> Result<Option<f64>, PortError> {
        Ok(CustomerRepository::age_standard_deviation(&mut self.tx).await?)
    }

    async fn commit(self: Box<Self>) -> Result<(), PortError> {
        self.tx
            .commit()
            .await
            .map_err(|e| DatabaseError::TransactionFailed(e.to_string()).into())
    }

    async fn rollback(self: Box<Self>) -> Result<(), PortError> {
        self.tx
            .rollback()
            .await
            .map_err(|e| DatabaseError::TransactionFailed(e.to_string()).into())
    }
}
