//! Validation failure types
//!
//! A failed `validate()` call produces a `ValidationFailure` carrying one
//! detail per failing field. When the failing schema itself was configured
//! with a custom error, that error rides along and callers are expected to
//! surface it verbatim instead of the detail list.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// A schema-intrinsic custom error, passed through unmodified on failure.
pub type SchemaErrorRef = Arc<dyn std::error::Error + Send + Sync>;

/// A single field-level validation failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationDetail {
    /// Path to the violating field (e.g. "user.address.city", "tags[1]")
    pub path: String,
    /// Human-readable message, one per failing field
    pub message: String,
}

impl ValidationDetail {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationDetail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

/// Structured result of a failed validation.
#[derive(Debug, Clone)]
pub struct ValidationFailure {
    /// One entry per failing field, in document order
    pub details: Vec<ValidationDetail>,
    /// Custom error configured on the failing schema, if any
    pub custom: Option<SchemaErrorRef>,
}

impl ValidationFailure {
    pub fn new(details: Vec<ValidationDetail>) -> Self {
        Self {
            details,
            custom: None,
        }
    }

    /// All detail messages joined by comma, the aggregate form error
    /// presentation is built from.
    pub fn reasons(&self) -> String {
        self.details
            .iter()
            .map(|d| d.message.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Returns the schema-intrinsic custom error, if one was configured on
    /// the failing schema.
    pub fn custom_error(&self) -> Option<&SchemaErrorRef> {
        self.custom.as_ref()
    }
}

impl fmt::Display for ValidationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.reasons())
    }
}

impl std::error::Error for ValidationFailure {}
