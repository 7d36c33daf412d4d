//! Declaration-time errors
//!
//! Misuse of the declaration layer (redefining a (property, group) schema,
//! a (class, group) options bag, or the extends override) fails
//! immediately at declaration time. These errors never occur at request
//! time; they surface to whoever is defining the type.

use thiserror::Error;

/// Errors raised while declaring or registering a type descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeclarationError {
    /// A (property, group) pair may be declared at most once
    #[error("Cannot redefine schema for group {group} on {type_name}::{property}")]
    PropertyRedefined {
        type_name: &'static str,
        property: String,
        group: String,
    },

    /// A (class, group) options bag may be declared at most once
    #[error("Cannot redefine schema options for group {group} on {type_name}")]
    OptionsRedefined {
        type_name: &'static str,
        group: String,
    },

    /// The extends override may be set at most once
    #[error("Cannot redefine parent type on {type_name}")]
    ExtendsRedefined { type_name: &'static str },

    /// The declared parent may be set at most once
    #[error("Cannot redefine declared parent on {type_name}")]
    ParentRedefined { type_name: &'static str },

    /// A type may be registered at most once
    #[error("Type {type_name} is already registered")]
    TypeRedefined { type_name: &'static str },

    /// Built-in primitive types cannot carry declarations
    #[error("Cannot register built-in type {type_name}")]
    BuiltinType { type_name: &'static str },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_redefinition_message_names_the_site() {
        let err = DeclarationError::PropertyRedefined {
            type_name: "Basic",
            property: "prop1".into(),
            group: "group1".into(),
        };
        assert_eq!(
            err.to_string(),
            "Cannot redefine schema for group group1 on Basic::prop1"
        );
    }
}
