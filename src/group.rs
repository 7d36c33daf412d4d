//! Validation groups
//!
//! A validation group names a variant of a type's schema, so the same type
//! can carry different rules for e.g. create vs update. Three groups are
//! predefined; consumers may define arbitrary additional ones. Groups are
//! opaque identities, never ordered, and resolution is always a two-tier
//! fallback (requested group, else DEFAULT) - never a merge across groups.

use std::borrow::Cow;
use std::fmt;

/// A named schema variant for a type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ValidationGroup {
    /// The fallback group every declaration belongs to unless stated otherwise.
    Default,
    /// Rules applied when a resource is created (POST).
    Create,
    /// Rules applied when a resource is updated (PUT/PATCH).
    Update,
    /// A consumer-defined group.
    Named(Cow<'static, str>),
}

impl ValidationGroup {
    /// Creates a consumer-defined group from a name.
    pub fn named(name: impl Into<Cow<'static, str>>) -> Self {
        ValidationGroup::Named(name.into())
    }

    /// Returns the group's identity as a string, used in cache keys and
    /// declaration error messages.
    pub fn as_str(&self) -> &str {
        match self {
            ValidationGroup::Default => "DEFAULT",
            ValidationGroup::Create => "CREATE",
            ValidationGroup::Update => "UPDATE",
            ValidationGroup::Named(name) => name,
        }
    }
}

impl fmt::Display for ValidationGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
