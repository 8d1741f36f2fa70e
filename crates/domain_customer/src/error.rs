//! Customer domain errors
//!
//! Three kinds reach callers: bad input, a missing record, and a storage
//! failure. The service never swallows any of them.

use thiserror::Error;

use core_kernel::{CustomerId, PortError};

use crate::validation::FieldErrors;

/// Errors that can occur in the customer domain
#[derive(Debug, Error)]
pub enum CustomerError {
    /// Required fields are missing or malformed
    #[error("Validation failed: {}", describe(.errors))]
    Validation {
        /// Messages keyed by field name
        errors: FieldErrors,
    },

    /// No customer exists for the identifier
    #[error("Customer not found with ID: {0}")]
    NotFound(CustomerId),

    /// The underlying store failed; not retried here
    #[error("Storage error: {0}")]
    Storage(String),
}

impl CustomerError {
    /// Creates a Validation error for a single field
    pub fn invalid_field(field: impl Into<String>, message: impl Into<String>) -> Self {
        let mut errors = FieldErrors::new();
        errors.insert(field.into(), vec![message.into()]);
        CustomerError::Validation { errors }
    }

    /// Creates a Storage error with a message
    pub fn storage(message: impl Into<String>) -> Self {
        CustomerError::Storage(message.into())
    }

    /// Returns true for caller-side failures
    pub fn is_client_error(&self) -> bool {
        matches!(self, CustomerError::Validation { .. } | CustomerError::NotFound(_))
    }
}

impl From<PortError> for CustomerError {
    fn from(error: PortError) -> Self {
        match error {
            PortError::NotFound { ref id, .. } => match id.parse() {
                Ok(id) => CustomerError::NotFound(id),
                Err(_) => CustomerError::Storage(error.to_string()),
            },
            PortError::Validation { message, field } => {
                CustomerError::invalid_field(field.unwrap_or_else(|| "customer".to_string()), message)
            }
            other => CustomerError::Storage(other.to_string()),
        }
    }
}

fn describe(errors: &FieldErrors) -> String {
    errors
        .iter()
        .map(|(field, messages)| format!("{}: {}", field, messages.join(", ")))
        .collect::<Vec<_>>()
        .join("; ")
}
