//! Argument metadata
//!
//! What the host framework tells the pipe about the handler argument
//! currently being transformed: which part of the request it came from,
//! an optional named item within that part, and the class the framework
//! resolved for the argument, if any.

use std::fmt;

use crate::registry::TypeRef;

/// The kind of request data an argument was extracted from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgumentKind {
    /// Request body
    Body,
    /// Query string
    Query,
    /// Route parameter
    Param,
    /// Anything else (framework-specific extraction)
    Custom,
}

impl ArgumentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ArgumentKind::Body => "body",
            ArgumentKind::Query => "query",
            ArgumentKind::Param => "param",
            ArgumentKind::Custom => "custom",
        }
    }
}

impl fmt::Display for ArgumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Per-argument context supplied by the host framework at transform time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArgumentMetadata {
    /// Kind of argument (body, query, param, custom)
    pub kind: ArgumentKind,
    /// Named item within the kind (e.g. a single query parameter)
    pub data: Option<String>,
    /// The type the framework resolved for this argument
    pub metatype: Option<TypeRef>,
}

impl ArgumentMetadata {
    pub fn new(kind: ArgumentKind) -> Self {
        Self {
            kind,
            data: None,
            metatype: None,
        }
    }

    pub fn body() -> Self {
        Self::new(ArgumentKind::Body)
    }

    pub fn query() -> Self {
        Self::new(ArgumentKind::Query)
    }

    pub fn param() -> Self {
        Self::new(ArgumentKind::Param)
    }

    /// Names the item within the kind.
    pub fn named(mut self, data: impl Into<String>) -> Self {
        self.data = Some(data.into());
        self
    }

    /// Attaches the framework-resolved type.
    pub fn of_type<T: 'static>(mut self) -> Self {
        self.metatype = Some(TypeRef::of::<T>());
        self
    }
}

impl Default for ArgumentMetadata {
    fn default() -> Self {
        Self::new(ArgumentKind::Custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Payload;

    #[test]
    fn test_kind_strings() {
        assert_eq!(ArgumentKind::Body.as_str(), "body");
        assert_eq!(ArgumentKind::Query.as_str(), "query");
        assert_eq!(ArgumentKind::Param.as_str(), "param");
    }

    #[test]
    fn test_builder() {
        let metadata = ArgumentMetadata::query().named("limit").of_type::<Payload>();
        assert_eq!(metadata.kind, ArgumentKind::Query);
        assert_eq!(metadata.data.as_deref(), Some("limit"));
        assert_eq!(metadata.metatype, Some(TypeRef::of::<Payload>()));
    }
}
