//! Schema derivation
//!
//! The core of the crate: walks a type's ancestor chain root-to-leaf,
//! resolves per-(property, group) declarations with DEFAULT fallback,
//! recurses into nested type references, and composes a single object
//! schema plus a merged options bag. Results are memoized per
//! (type, forced, group) tuple in [`SchemaCache`] for the process
//! lifetime.
//!
//! # Design Principles
//!
//! - Leaf declarations override root declarations, per key
//! - Group fallback is single-tier: requested group, else DEFAULT
//! - Derivation is deterministic and CPU-only, bounded by chain depth
//!   and property count
//! - At most one derivation per distinct cache tuple; errors are never
//!   cached

pub(crate) mod cache;
pub(crate) mod engine;
mod errors;

pub use cache::SchemaCache;
pub use engine::derive_schema;
pub use errors::DeriveError;
