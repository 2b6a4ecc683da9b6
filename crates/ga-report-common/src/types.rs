//! Common type definitions and newtype wrappers for domain modeling.

use std::fmt;

/// An analytics view (profile) identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ViewId(pub String);

impl ViewId {
    /// Returns the identifier as sent on the wire.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ViewId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ViewId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for ViewId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Name of the calendar-date dimension every time-based view keys on.
pub const DATE_COLUMN: &str = "date";
