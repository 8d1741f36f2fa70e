//! Repository implementations
//!
//! Repositories encapsulate SQL and map between database rows and domain
//! types. Statements take a `&mut PgConnection` so the caller decides the
//! transaction they run in.

pub mod customer;

pub use customer::{CustomerRepository, CustomerRow};
