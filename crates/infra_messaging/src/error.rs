//! Messaging error types

use thiserror::Error;

use core_kernel::PortError;

/// Errors raised while publishing or consuming customer messages
#[derive(Debug, Error)]
pub enum MessagingError {
    /// The message could not be encoded or decoded
    #[error("failed to serialize message: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The queue is at capacity
    #[error("queue '{queue}' is full")]
    QueueFull { queue: &'static str },

    /// The consumer side of the queue has shut down
    #[error("queue '{queue}' is closed")]
    Closed { queue: &'static str },

    /// A handler failed to process a message
    #[error("handler failed: {0}")]
    Handler(String),

    #[cfg(feature = "kafka")]
    #[error("failed to produce to kafka: {0}")]
    Kafka(#[from] rdkafka::error::KafkaError),
}

impl MessagingError {
    /// Returns true if a later attempt may succeed
    pub fn is_transient(&self) -> bool {
        matches!(self, MessagingError::QueueFull { .. })
    }
}

impl From<MessagingError> for PortError {
    fn from(error: MessagingError) -> Self {
        match error {
            MessagingError::QueueFull { queue } | MessagingError::Closed { queue } => {
                PortError::ServiceUnavailable {
                    service: queue.to_string(),
                }
            }
            MessagingError::Serialization(e) => PortError::Internal {
                message: e.to_string(),
                source: Some(Box::new(e)),
            },
            other => PortError::Connection {
                message: other.to_string(),
                source: Some(Box::new(other)),
            },
        }
    }
}
