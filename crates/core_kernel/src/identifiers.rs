//! Strongly-typed identifiers for domain entities
//!
//! Customer identifiers are assigned by storage from a 64-bit sequence, so
//! the newtype wraps an `i64` rather than a UUID.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;

/// Identifier of a persisted customer
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CustomerId(i64);

impl CustomerId {
    /// Wraps a storage-assigned sequence value
    pub const fn new(value: i64) -> Self {
        Self(value)
    }

    /// Returns the raw sequence value
    pub const fn value(&self) -> i64 {
        self.0
    }

    /// Returns the identifier prefix used in log output
    pub fn prefix() -> &'static str {
        "CUS"
    }
}

impl fmt::Display for CustomerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for CustomerId {
    type Err = ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // Accept both "42" and "CUS-42"
        let raw = s.strip_prefix("CUS-").unwrap_or(s);
        Ok(Self(raw.parse()?))
    }
}

impl From<i64> for CustomerId {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl From<CustomerId> for i64 {
    fn from(id: CustomerId) -> i64 {
        id.0
    }
}
