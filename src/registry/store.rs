//! Schema registry
//!
//! Process-wide store of type descriptors plus the derived-schema cache.
//! Shared mutable state across all in-flight requests: reads and the
//! cache's get-or-compute are guarded so "compute at most once" holds in
//! a genuinely multi-threaded runtime, not just a cooperative one.

use std::any::TypeId;
use std::collections::HashMap;
use std::sync::RwLock;

use once_cell::sync::Lazy;

use crate::derive::cache::SchemaCache;
use crate::derive::engine::derive_composed;
use crate::derive::DeriveError;
use crate::group::ValidationGroup;
use crate::observability::Logger;
use crate::schema::Schema;

use super::errors::DeclarationError;
use super::types::{TypeDescriptor, TypeRef};

/// Store of type descriptors, keyed by type identity, with the
/// derived-schema cache attached.
#[derive(Debug)]
pub struct SchemaRegistry {
    descriptors: RwLock<HashMap<TypeId, TypeDescriptor>>,
    cache: SchemaCache,
}

impl SchemaRegistry {
    /// Creates an empty registry. Most consumers use [`global()`];
    /// isolated registries exist for embedding and tests.
    pub fn new() -> Self {
        Self {
            descriptors: RwLock::new(HashMap::new()),
            cache: SchemaCache::new(),
        }
    }

    /// Installs a descriptor. Registering a built-in type or registering
    /// the same type twice is a declaration-time error.
    pub fn register(&self, descriptor: TypeDescriptor) -> Result<(), DeclarationError> {
        let ty = descriptor.type_ref();
        if ty.is_builtin() {
            return Err(DeclarationError::BuiltinType {
                type_name: ty.name(),
            });
        }

        let mut descriptors = self
            .descriptors
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if descriptors.contains_key(&ty.id()) {
            return Err(DeclarationError::TypeRedefined {
                type_name: ty.name(),
            });
        }
        descriptors.insert(ty.id(), descriptor);
        Ok(())
    }

    /// Whether a descriptor is registered for the given type identity.
    pub fn contains(&self, ty: TypeRef) -> bool {
        self.descriptors
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .contains_key(&ty.id())
    }

    /// Whether a descriptor is registered for `T`.
    pub fn is_registered<T: 'static>(&self) -> bool {
        self.contains(TypeRef::of::<T>())
    }

    /// Clones out the descriptor for a type identity, if registered.
    /// Cloning keeps the lock out of the recursive derivation walk.
    pub(crate) fn descriptor(&self, id: TypeId) -> Option<TypeDescriptor> {
        self.descriptors
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(&id)
            .cloned()
    }

    /// Cached schema resolution for a type and group.
    ///
    /// Built-in primitive types never have a schema. In non-forced mode,
    /// a chain contributing neither properties nor class options resolves
    /// to "no schema" (so undecorated handler arguments pass through);
    /// forced mode always yields a schema, strict-empty if need be. The
    /// result is derived at most once per (type, forced, group) tuple and
    /// cached for the process lifetime; derivation errors propagate
    /// uncached.
    pub fn schema_for(
        &self,
        ty: TypeRef,
        forced: bool,
        group: &ValidationGroup,
    ) -> Result<Option<Schema>, DeriveError> {
        if ty.is_builtin() {
            return Ok(None);
        }

        let key = SchemaCache::key(forced, group);
        self.cache.get_or_compute(ty.id(), &key, || {
            let composed = derive_composed(self, ty, group)?;

            // A type that declared nothing anywhere in its chain was
            // probably never meant to be validated; any class-level
            // options declaration counts as intent to validate.
            if !forced && !composed.has_properties && !composed.has_options {
                return Ok(None);
            }

            Logger::trace(
                "schema_derived",
                &[
                    ("forced", if forced { "true" } else { "false" }),
                    ("group", group.as_str()),
                    ("type", ty.short_name()),
                ],
            );

            // A declared schema means the input value itself is expected.
            Ok(Some(composed.schema.required()))
        })
    }

    /// Number of cached derivation results, across all types and keys.
    pub fn cached_schemas(&self) -> usize {
        self.cache.len()
    }
}

impl Default for SchemaRegistry {
    fn default() -> Self {
        Self::new()
    }
}

static GLOBAL: Lazy<SchemaRegistry> = Lazy::new(SchemaRegistry::new);

/// The process-wide registry, populated lazily and never invalidated.
pub fn global() -> &'static SchemaRegistry {
    &GLOBAL
}
