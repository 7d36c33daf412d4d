//! schemagate - a strict, group-aware schema derivation and request validation layer
//!
//! Types register their validation declarations in a [`registry::SchemaRegistry`].
//! The derivation engine walks a type's ancestor chain, merges per-property and
//! per-class declarations across validation groups, and composes a single
//! object schema. The [`pipe::Pipe`] consumes composed schemas to validate and
//! coerce inbound request payloads before they reach application handlers.

pub mod adapter;
pub mod derive;
pub mod group;
pub mod observability;
pub mod pipe;
pub mod registry;
pub mod schema;

pub use derive::{derive_schema, DeriveError};
pub use group::ValidationGroup;
pub use pipe::{
    ArgumentKind, ArgumentMetadata, Pipe, PipeConfigError, PipeError, PipeFactory, PipeOptions,
    RequestBinding,
};
pub use registry::{DescriptorBuilder, PropertySchema, SchemaRegistry, TypeRef};
pub use schema::{Schema, SchemaOptions, ValidationDetail, ValidationFailure};
