//! Messaging Infrastructure
//!
//! Adapters for the domain's `CustomerNotifier` port.
//!
//! - [`InProcessBroker`]: a topic exchange bound to one bounded in-memory
//!   queue, drained by a background consumer task. The default for
//!   single-node deployments.
//! - `KafkaCustomerNotifier` (feature `kafka`): publishes JSON messages to a
//!   Kafka topic, keyed by customer id.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use infra_messaging::InProcessBroker;
//!
//! let broker = Arc::new(InProcessBroker::start(1024));
//! let service = CustomerService::new(store, broker.clone(), clock);
//! ```

pub mod broker;
pub mod error;
pub mod handler;
#[cfg(feature = "kafka")]
pub mod kafka;

pub use broker::{
    BrokerStats, Envelope, InProcessBroker, CUSTOMER_CREATED_QUEUE, CUSTOMER_CREATED_ROUTING_KEY,
    CUSTOMER_EXCHANGE,
};
pub use error::MessagingError;
pub use handler::{CustomerCreatedHandler, MessageHandler};
#[cfg(feature = "kafka")]
pub use kafka::{KafkaConfig, KafkaCustomerNotifier};
