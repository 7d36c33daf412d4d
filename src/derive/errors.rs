//! Derivation errors
//!
//! A derivation error is fatal for the requesting call and is never
//! cached, so a later call re-derives. The walk is bounded by chain depth
//! and property count; the only way it can fail is a cycle introduced
//! through extends overrides or nested type references.

use thiserror::Error;

/// Errors raised while deriving a schema from a type's metadata.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeriveError {
    /// The ancestor chain loops back on itself
    #[error("Cyclic ancestor chain detected while deriving schema for {type_name}")]
    CyclicChain { type_name: String },

    /// A nested type reference leads back to a type already being derived
    #[error("Cyclic nested type reference detected while deriving schema for {type_name}")]
    CyclicReference { type_name: String },
}
