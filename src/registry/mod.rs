//! Type registry
//!
//! The metadata store the derivation engine reads. The declaration layer
//! assembles a [`TypeDescriptor`] per type at
//! definition time via [`DescriptorBuilder`] and installs it in a
//! [`SchemaRegistry`]. Descriptors are immutable once registered; the
//! registry is populated lazily and never invalidated for the process
//! lifetime.
//!
//! # Design Principles
//!
//! - Explicit registration instead of runtime reflection
//! - Declaration misuse (redefinition) fails at declaration time
//! - The extends override is an explicit descriptor field
//! - Built-in primitive types are never registered or walked

mod builder;
mod errors;
mod store;
mod types;

pub use builder::DescriptorBuilder;
pub use errors::DeclarationError;
pub use store::{global, SchemaRegistry};
pub use types::{customizer, Customizer, PropertySchema, TypeDescriptor, TypeRef};
