//! Infrastructure Database Layer
//!
//! This crate provides the PostgreSQL storage for customer records using
//! SQLx.
//!
//! # Architecture
//!
//! The crate follows the repository pattern. [`repositories::CustomerRepository`]
//! owns the SQL; [`adapters::PostgresCustomerStore`] implements the domain's
//! `CustomerStore` port on top of it, with every unit of work backed by a
//! database transaction.
//!
//! # Example
//!
//! ```rust,ignore
//! use infra_db::{create_pool, run_migrations, DatabaseConfig, PostgresCustomerStore};
//!
//! let pool = create_pool(DatabaseConfig::new("postgres://localhost/customers")).await?;
//! run_migrations(&pool).await?;
//! let store = PostgresCustomerStore::new(pool);
//! ```

pub mod adapters;
pub mod error;
pub mod pool;
pub mod repositories;

pub use adapters::PostgresCustomerStore;
pub use error::DatabaseError;
pub use pool::{
    create_lazy_pool, create_pool, create_pool_from_url, run_migrations, DatabaseConfig, DatabasePool,
};
