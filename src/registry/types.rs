//! Registry type definitions
//!
//! A `TypeDescriptor` is one node in an ancestor chain: its identity, its
//! logical parent, the ordered list of declared properties and, per
//! (property, group), the registered declaration. Descriptors are built by
//! the declaration layer and read by the derivation engine.

use std::any::TypeId;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::group::ValidationGroup;
use crate::schema::{Schema, SchemaOptions};

/// A caller-supplied function that post-processes a derived nested or
/// array schema before it is installed on the parent's property map.
pub type Customizer = Arc<dyn Fn(Schema) -> Schema + Send + Sync>;

/// Wraps a closure as a [`Customizer`].
pub fn customizer<F>(f: F) -> Customizer
where
    F: Fn(Schema) -> Schema + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Identity of a registered (or referenced) type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TypeRef {
    id: TypeId,
    name: &'static str,
}

impl TypeRef {
    /// The identity of `T`.
    pub fn of<T: 'static>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }

    pub fn id(&self) -> TypeId {
        self.id
    }

    /// Full type name, used in declaration and derivation error messages.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Type name without its module path.
    pub fn short_name(&self) -> &'static str {
        self.name.rsplit("::").next().unwrap_or(self.name)
    }

    /// Built-in primitive types are never walked; they short-circuit to
    /// "no schema" during derivation.
    pub fn is_builtin(&self) -> bool {
        self.id == TypeId::of::<String>()
            || self.id == TypeId::of::<i64>()
            || self.id == TypeId::of::<u64>()
            || self.id == TypeId::of::<f64>()
            || self.id == TypeId::of::<bool>()
            || self.id == TypeId::of::<Value>()
            || self.id == TypeId::of::<Vec<Value>>()
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.short_name())
    }
}

/// A property's registered declaration: either a literal schema, or a
/// reference to a nested type (single or list) to be derived recursively.
#[derive(Clone)]
pub enum PropertySchema {
    /// A literal schema, used as-is
    Literal(Schema),
    /// A nested type reference; its derived schema may be customized
    Nested {
        target: TypeRef,
        customize: Option<Customizer>,
    },
    /// A nested type-list reference; the derived item schema is wrapped as
    /// an array, each stage optionally customized
    NestedList {
        target: TypeRef,
        customize_item: Option<Customizer>,
        customize_array: Option<Customizer>,
    },
}

impl PropertySchema {
    /// A literal schema declaration.
    pub fn literal(schema: Schema) -> Self {
        PropertySchema::Literal(schema)
    }

    /// A nested type reference.
    pub fn nested<T: 'static>() -> Self {
        PropertySchema::Nested {
            target: TypeRef::of::<T>(),
            customize: None,
        }
    }

    /// A nested type reference with an item-schema customizer.
    pub fn nested_with<T, F>(customize: F) -> Self
    where
        T: 'static,
        F: Fn(Schema) -> Schema + Send + Sync + 'static,
    {
        PropertySchema::Nested {
            target: TypeRef::of::<T>(),
            customize: Some(customizer(customize)),
        }
    }

    /// An array-of-nested-type reference.
    pub fn list<T: 'static>() -> Self {
        PropertySchema::NestedList {
            target: TypeRef::of::<T>(),
            customize_item: None,
            customize_array: None,
        }
    }

    /// An array-of-nested-type reference with an item-schema customizer.
    pub fn list_with<T, F>(customize_item: F) -> Self
    where
        T: 'static,
        F: Fn(Schema) -> Schema + Send + Sync + 'static,
    {
        PropertySchema::NestedList {
            target: TypeRef::of::<T>(),
            customize_item: Some(customizer(customize_item)),
            customize_array: None,
        }
    }

    /// An array-of-nested-type reference with explicit item and array
    /// customizers.
    pub fn list_customized<T: 'static>(
        customize_item: Option<Customizer>,
        customize_array: Option<Customizer>,
    ) -> Self {
        PropertySchema::NestedList {
            target: TypeRef::of::<T>(),
            customize_item,
            customize_array,
        }
    }
}

impl fmt::Debug for PropertySchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropertySchema::Literal(schema) => f.debug_tuple("Literal").field(schema).finish(),
            PropertySchema::Nested { target, customize } => f
                .debug_struct("Nested")
                .field("target", target)
                .field("customized", &customize.is_some())
                .finish(),
            PropertySchema::NestedList {
                target,
                customize_item,
                customize_array,
            } => f
                .debug_struct("NestedList")
                .field("target", target)
                .field("item_customized", &customize_item.is_some())
                .field("array_customized", &customize_array.is_some())
                .finish(),
        }
    }
}

/// One node in an ancestor chain: everything a type declared directly.
#[derive(Debug, Clone)]
pub struct TypeDescriptor {
    pub(crate) type_ref: TypeRef,
    /// Declared logical parent (the natural-superclass counterpart)
    pub(crate) parent: Option<TypeRef>,
    /// Explicit override of the schema-derivation parent; wins over
    /// `parent` during the chain walk but never changes it
    pub(crate) extends: Option<TypeRef>,
    /// Declared property names, in declaration order
    pub(crate) properties: Vec<String>,
    /// Per-(property, group) declarations
    pub(crate) declarations: HashMap<String, HashMap<ValidationGroup, PropertySchema>>,
    /// Per-group class-level options
    pub(crate) options: HashMap<ValidationGroup, SchemaOptions>,
}

impl TypeDescriptor {
    pub fn type_ref(&self) -> TypeRef {
        self.type_ref
    }

    /// The ancestor the chain walk moves to next: the extends override
    /// when present, otherwise the declared parent.
    pub fn next_ancestor(&self) -> Option<TypeRef> {
        self.extends.or(self.parent)
    }

    /// Declared property names, in declaration order.
    pub fn declared_properties(&self) -> &[String] {
        &self.properties
    }

    /// The declaration registered for exactly this (property, group) pair,
    /// without group fallback; fallback is the engine's job.
    pub fn declaration(&self, property: &str, group: &ValidationGroup) -> Option<&PropertySchema> {
        self.declarations.get(property)?.get(group)
    }

    /// The options bag registered for exactly this group, without fallback.
    pub fn group_options(&self, group: &ValidationGroup) -> Option<&SchemaOptions> {
        self.options.get(group)
    }

    /// Whether any class-level options were declared for any group.
    pub fn has_options(&self) -> bool {
        !self.options.is_empty()
    }
}
