//! Derived-schema cache
//!
//! Two-level lookup: outer key is the type identity, inner key is a
//! deterministic string built from the forced flag and the group. `None`
//! is a legitimate cached value meaning "this type intentionally has no
//! schema", so presence of the entry, not truthiness, decides whether a
//! derivation already ran. Populated lazily, never invalidated; type
//! declarations are assumed static for the process lifetime.

use std::any::TypeId;
use std::collections::HashMap;
use std::sync::Mutex;

use crate::group::ValidationGroup;
use crate::schema::Schema;

use super::errors::DeriveError;

/// Process-lifetime memo of derivation results.
#[derive(Debug)]
pub struct SchemaCache {
    entries: Mutex<HashMap<TypeId, HashMap<String, Option<Schema>>>>,
}

impl SchemaCache {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Deterministic inner cache key for a (forced, group) pair. Variant
    /// prefixes keep user-named groups from colliding with the
    /// predefined ones.
    pub fn key(forced: bool, group: &ValidationGroup) -> String {
        let group_part = match group {
            ValidationGroup::Default => String::new(),
            ValidationGroup::Create => "group#CREATE".to_string(),
            ValidationGroup::Update => "group#UPDATE".to_string(),
            ValidationGroup::Named(name) => format!("group@{}", name),
        };
        format!("forced{}{}", if forced { '1' } else { '0' }, group_part)
    }

    /// Returns the cached value for (type, key), computing and inserting
    /// it first if absent. Check-and-insert runs under one lock so each
    /// tuple is computed at most once even under concurrent load; a
    /// compute error propagates to the caller uncached.
    pub fn get_or_compute<F>(
        &self,
        ty: TypeId,
        key: &str,
        compute: F,
    ) -> Result<Option<Schema>, DeriveError>
    where
        F: FnOnce() -> Result<Option<Schema>, DeriveError>,
    {
        let mut entries = self
            .entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        if let Some(inner) = entries.get(&ty) {
            if let Some(cached) = inner.get(key) {
                return Ok(cached.clone());
            }
        }

        let computed = compute()?;
        entries
            .entry(ty)
            .or_default()
            .insert(key.to_string(), computed.clone());
        Ok(computed)
    }

    /// Total number of cached results across all types and keys.
    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .values()
            .map(|inner| inner.len())
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for SchemaCache {
    fn default() -> Self {
        Self::new()
    }
}
