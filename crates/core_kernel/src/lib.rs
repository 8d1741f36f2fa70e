//! Core Kernel - Foundational types shared across the customer service
//!
//! This crate provides the building blocks used by every other crate:
//! - Strongly-typed identifiers
//! - A `Clock` abstraction so "today" is always injected
//! - Port infrastructure (errors, marker traits, health checks) for the
//!   hexagonal architecture

pub mod clock;
pub mod identifiers;
pub mod ports;

pub use clock::{Clock, FixedClock, SystemClock};
pub use identifiers::CustomerId;
pub use ports::{AdapterHealth, DomainPort, HealthCheckResult, HealthCheckable, PortError};
