//! Customer input validation
//!
//! Create and update requests arrive as [`CustomerInput`], where every field
//! is optional so that a missing field becomes a field-level error instead
//! of a deserialization failure. [`validate_input`] turns it into a
//! [`NewCustomer`] or a `CustomerError::Validation`.
//!
//! # Rules
//!
//! - `firstName`, `lastName`: present, non-blank, at most 100 characters
//! - `age`: present, zero or greater
//! - `dateOfBirth`: present
//!
//! Age and date of birth are not checked against each other.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError, ValidationErrors};

use core_kernel::CustomerId;

use crate::customer::NewCustomer;
use crate::error::CustomerError;

/// Field-level validation messages, keyed by wire (camelCase) field name
pub type FieldErrors = BTreeMap<String, Vec<String>>;

/// Create/update payload as received from callers
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CustomerInput {
    /// Ignored; identifiers are always assigned by storage
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<CustomerId>,

    #[validate(
        required(message = "First name is required"),
        length(min = 1, max = 100, message = "First name must be between 1 and 100 characters")
    )]
    pub first_name: Option<String>,

    #[validate(
        required(message = "Last name is required"),
        length(min = 1, max = 100, message = "Last name must be between 1 and 100 characters")
    )]
    pub last_name: Option<String>,

    #[validate(
        required(message = "Age is required"),
        range(min = 0, message = "Age must be zero or greater")
    )]
    pub age: Option<i32>,

    #[validate(required(message = "Date of birth is required"))]
    pub date_of_birth: Option<NaiveDate>,
}

impl CustomerInput {
    /// Builds a fully-populated input
    pub fn new(
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        age: i32,
        date_of_birth: NaiveDate,
    ) -> Self {
        Self {
            id: None,
            first_name: Some(first_name.into()),
            last_name: Some(last_name.into()),
            age: Some(age),
            date_of_birth: Some(date_of_birth),
        }
    }
}

/// Validates `input` and returns the fields ready for storage
///
/// Values are passed through verbatim; names are not trimmed.
pub fn validate_input(input: &CustomerInput) -> Result<NewCustomer, CustomerError> {
    let mut errors = match input.validate() {
        Ok(()) => ValidationErrors::new(),
        Err(errors) => errors,
    };

    reject_blank(&mut errors, "first_name", input.first_name.as_deref(), "First name must not be blank");
    reject_blank(&mut errors, "last_name", input.last_name.as_deref(), "Last name must not be blank");

    match (
        &input.first_name,
        &input.last_name,
        input.age,
        input.date_of_birth,
    ) {
        (Some(first_name), Some(last_name), Some(age), Some(date_of_birth)) if errors.is_empty() => {
            Ok(NewCustomer {
                first_name: first_name.clone(),
                last_name: last_name.clone(),
                age,
                date_of_birth,
            })
        }
        _ => Err(CustomerError::Validation {
            errors: to_field_errors(&errors),
        }),
    }
}

// `length(min = 1)` already reports empty strings; this only catches whitespace
fn reject_blank(
    errors: &mut ValidationErrors,
    field: &'static str,
    value: Option<&str>,
    message: &'static str,
) {
    if let Some(value) = value {
        if !value.is_empty() && value.trim().is_empty() {
            let mut error = ValidationError::new("blank");
            error.message = Some(message.into());
            errors.add(field, error);
        }
    }
}

fn to_field_errors(errors: &ValidationErrors) -> FieldErrors {
    let mut fields = FieldErrors::new();
    for (field, field_errors) in errors.field_errors() {
        let messages = fields.entry(camel_case(&field.to_string())).or_default();
        for error in field_errors.iter() {
            messages.push(
                error
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| error.code.to_string()),
            );
        }
    }
    fields
}

fn camel_case(snake: &str) -> String {
    let mut out = String::with_capacity(snake.len());
    let mut upper = false;
    for c in snake.chars() {
        if c == '_' {
            upper = true;
        } else if upper {
            out.extend(c.to_uppercase());
            upper = false;
        } else {
            out.push(c);
        }
    }
    out
}
