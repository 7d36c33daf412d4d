//! Composable validation schemas
//!
//! The validation-library contract the derivation engine and the request
//! pipe build on: object/string/number/boolean/array/alternatives
//! combinators over `serde_json::Value`, a `validate()` call returning
//! either a coerced value or a structured failure, and a partial options
//! bag with per-key override semantics.
//!
//! # Design Principles
//!
//! - Validation is synchronous, CPU-only and deterministic
//! - Schema-level options always win over caller defaults
//! - One error detail per failing field, addressed by path
//! - Coercion (string to number/bool) only under the `convert` option

mod errors;
mod types;
mod validate;

pub use errors::{SchemaErrorRef, ValidationDetail, ValidationFailure};
pub use types::{Schema, SchemaKind, SchemaOptions};
