//! Customer repository implementation
//!
//! All statements run on a caller-supplied connection so that they take part
//! in whatever transaction the caller holds. Queries are built at runtime
//! with `query_as`, so no database is needed to compile the crate.

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{PgConnection, PgPool, Postgres, Transaction};

use core_kernel::CustomerId;
use domain_customer::{Customer, NewCustomer};

use crate::error::DatabaseError;

const CUSTOMER_COLUMNS: &str = "id, first_name, last_name, age, date_of_birth, created_at";

/// Repository for customer rows
#[derive(Debug, Clone)]
pub struct CustomerRepository {
    pool: PgPool,
}

impl CustomerRepository {
    /// Creates a new CustomerRepository with the given connection pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Opens a transaction on the pool
    pub async fn begin(&self) -> Result<Transaction<'static, Postgres>, DatabaseError> {
        self.pool
            .begin()
            .await
            .map_err(|e| DatabaseError::TransactionFailed(e.to_string()))
    }

    /// Opens a read-only `REPEATABLE READ` transaction
    ///
    /// Every statement in it sees the snapshot taken by its first query.
    pub async fn begin_snapshot(&self) -> Result<Transaction<'static, Postgres>, DatabaseError> {
        let mut tx = self.begin().await?;
        sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ, READ ONLY")
            .execute(&mut *tx)
            .await
            .map_err(|e| DatabaseError::TransactionFailed(e.to_string()))?;
        Ok(tx)
    }

    /// Inserts a new customer; id and created_at come from the database
    pub async fn insert(conn: &mut PgConnection, customer: &NewCustomer) -> Result<CustomerRow, DatabaseError> {
        let row = sqlx::query_as::<_, CustomerRow>(&format!(
            r#"
            INSERT INTO customers (first_name, last_name, age, date_of_birth)
            VALUES ($1, $2, $3, $4)
            RETURNING {CUSTOMER_COLUMNS}
            "#
        ))
        .bind(&customer.first_name)
        .bind(&customer.last_name)
        .bind(customer.age)
        .bind(customer.date_of_birth)
        .fetch_one(conn)
        .await?;

        Ok(row)
    }

    /// Updates the mutable fields of an existing customer
    pub async fn update(conn: &mut PgConnection, customer: &Customer) -> Result<CustomerRow, DatabaseError> {
        sqlx::query_as::<_, CustomerRow>(&format!(
            r#"
            UPDATE customers
            SET first_name = $2, last_name = $3, age = $4, date_of_birth = $5
            WHERE id = $1
            RETURNING {CUSTOMER_COLUMNS}
            "#
        ))
        .bind(customer.id.value())
        .bind(&customer.first_name)
        .bind(&customer.last_name)
        .bind(customer.age)
        .bind(customer.date_of_birth)
        .fetch_optional(conn)
        .await?
        .ok_or_else(|| DatabaseError::not_found("Customer", customer.id))
    }

    pub async fn find_by_id(conn: &mut PgConnection, id: CustomerId) -> Result<Option<CustomerRow>, DatabaseError> {
        let row = sqlx::query_as::<_, CustomerRow>(&format!(
            "SELECT {CUSTOMER_COLUMNS} FROM customers WHERE id = $1"
        ))
        .bind(id.value())
        .fetch_optional(conn)
        .await?;

        Ok(row)
    }

    /// Returns every customer in ascending id order
    pub async fn find_all(conn: &mut PgConnection) -> Result<Vec<CustomerRow>, DatabaseError> {
        let rows = sqlx::query_as::<_, CustomerRow>(&format!(
            "SELECT {CUSTOMER_COLUMNS} FROM customers ORDER BY id"
        ))
        .fetch_all(conn)
        .await?;

        Ok(rows)
    }

    pub async fn exists(conn: &mut PgConnection, id: CustomerId) -> Result<bool, DatabaseError> {
        let exists = sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM customers WHERE id = $1)")
            .bind(id.value())
            .fetch_one(conn)
            .await?;

        Ok(exists)
    }

    /// Deletes a customer, returning the number of rows removed
    pub async fn delete(conn: &mut PgConnection, id: CustomerId) -> Result<u64, DatabaseError> {
        let result = sqlx::query("DELETE FROM customers WHERE id = $1")
            .bind(id.value())
            .execute(conn)
            .await?;

        Ok(result.rows_affected())
    }

    /// `AVG(age)`, NULL on an empty table
    pub async fn average_age(conn: &mut PgConnection) -> Result<Option<f64>, DatabaseError> {
        let average = sqlx::query_scalar::<_, Option<f64>>("SELECT AVG(age)::float8 FROM customers")
            .fetch_one(conn)
            .await?;

        Ok(average)
    }

    /// `STDDEV_SAMP(age)`, NULL with fewer than two rows
    pub async fn age_standard_deviation(conn: &mut PgConnection) -> Result<Option<f64>, DatabaseError> {
        let deviation = sqlx::query_scalar::<_, Option<f64>>("SELECT STDDEV_SAMP(age)::float8 FROM customers")
            .fetch_one(conn)
            .await?;

        Ok(deviation)
    }
}

/// Database row for the customers table
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct CustomerRow {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub age: i32,
    pub date_of_birth: NaiveDate,
    pub created_at: DateTime<Utc>,
}

impl From<CustomerRow> for Customer {
    fn from(row: CustomerRow) -> Self {
        Customer {
            id: CustomerId::new(row.id),
            first_name: row.first_name,
            last_name: row.last_name,
            age: row.age,
            date_of_birth: row.date_of_birth,
            created_at: row.created_at,
        }
    }
}
