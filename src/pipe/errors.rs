//! Pipe error types

use thiserror::Error;

use crate::derive::DeriveError;
use crate::schema::{SchemaErrorRef, ValidationFailure};

/// Errors produced while transforming a request argument.
#[derive(Debug, Error)]
pub enum PipeError {
    /// Payload failed validation; reported as a plain bad-request message.
    #[error("{0}")]
    BadRequest(String),

    /// Payload failed validation; the structured failure is retained for
    /// callers that inspect individual details.
    #[error("{message}")]
    Validation {
        message: String,
        #[source]
        failure: ValidationFailure,
    },

    /// A schema carried a custom error; it is passed through untouched.
    #[error(transparent)]
    Custom(SchemaErrorRef),

    /// Schema derivation itself failed.
    #[error(transparent)]
    Derive(#[from] DeriveError),
}

impl PipeError {
    /// The structured validation failure, when one is available.
    pub fn failure(&self) -> Option<&ValidationFailure> {
        match self {
            PipeError::Validation { failure, .. } => Some(failure),
            _ => None,
        }
    }
}
