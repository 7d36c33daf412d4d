//! Descriptor builder
//!
//! The declaration layer: assembles a `TypeDescriptor` at type-definition
//! time. Each declaration targets one or more validation groups (DEFAULT
//! when none are given); redeclaring a (property, group) pair, a group's
//! options bag, or a parent is rejected immediately.

use std::collections::HashMap;

use crate::group::ValidationGroup;
use crate::schema::SchemaOptions;

use super::errors::DeclarationError;
use super::types::{PropertySchema, TypeDescriptor, TypeRef};

/// Builder for a type's validation descriptor.
#[derive(Debug)]
pub struct DescriptorBuilder {
    descriptor: TypeDescriptor,
}

impl DescriptorBuilder {
    /// Starts a descriptor for `T`.
    pub fn for_type<T: 'static>() -> Self {
        Self {
            descriptor: TypeDescriptor {
                type_ref: TypeRef::of::<T>(),
                parent: None,
                extends: None,
                properties: Vec::new(),
                declarations: HashMap::new(),
                options: HashMap::new(),
            },
        }
    }

    /// Declares `P` as the natural parent: its declarations are merged in
    /// as closer-to-root during derivation.
    pub fn inherits<P: 'static>(mut self) -> Result<Self, DeclarationError> {
        if self.descriptor.parent.is_some() {
            return Err(DeclarationError::ParentRedefined {
                type_name: self.descriptor.type_ref.name(),
            });
        }
        self.descriptor.parent = Some(TypeRef::of::<P>());
        Ok(self)
    }

    /// Overrides the schema-derivation parent with `P`, leaving the
    /// declared parent untouched. Validation-parent and natural-parent can
    /// legitimately diverge; the override only changes which ancestor's
    /// declarations count as closer to root. May be set at most once.
    pub fn extends<P: 'static>(mut self) -> Result<Self, DeclarationError> {
        if self.descriptor.extends.is_some() {
            return Err(DeclarationError::ExtendsRedefined {
                type_name: self.descriptor.type_ref.name(),
            });
        }
        self.descriptor.extends = Some(TypeRef::of::<P>());
        Ok(self)
    }

    /// Declares class-level options for the DEFAULT group.
    pub fn options(self, options: SchemaOptions) -> Result<Self, DeclarationError> {
        self.options_in(&[], options)
    }

    /// Declares class-level options for the given groups (DEFAULT when the
    /// slice is empty). Each (class, group) bag may be declared once.
    pub fn options_in(
        mut self,
        groups: &[ValidationGroup],
        options: SchemaOptions,
    ) -> Result<Self, DeclarationError> {
        for group in final_groups(groups) {
            if self.descriptor.options.contains_key(&group) {
                return Err(DeclarationError::OptionsRedefined {
                    type_name: self.descriptor.type_ref.name(),
                    group: group.as_str().to_string(),
                });
            }
            self.descriptor.options.insert(group, options.clone());
        }
        Ok(self)
    }

    /// Declares a property schema for the DEFAULT group.
    pub fn property(
        self,
        name: impl Into<String>,
        declaration: PropertySchema,
    ) -> Result<Self, DeclarationError> {
        self.property_in(&[], name, declaration)
    }

    /// Declares a property schema for the given groups (DEFAULT when the
    /// slice is empty). Each (property, group) pair may be declared once.
    pub fn property_in(
        mut self,
        groups: &[ValidationGroup],
        name: impl Into<String>,
        declaration: PropertySchema,
    ) -> Result<Self, DeclarationError> {
        let name = name.into();

        let per_group = self.descriptor.declarations.entry(name.clone()).or_default();
        for group in final_groups(groups) {
            if per_group.contains_key(&group) {
                return Err(DeclarationError::PropertyRedefined {
                    type_name: self.descriptor.type_ref.name(),
                    property: name,
                    group: group.as_str().to_string(),
                });
            }
            per_group.insert(group, declaration.clone());
        }

        if !self.descriptor.properties.contains(&name) {
            self.descriptor.properties.push(name);
        }
        Ok(self)
    }

    /// Finalizes the descriptor. All misuse is rejected eagerly, so
    /// building cannot fail.
    pub fn build(self) -> TypeDescriptor {
        self.descriptor
    }
}

fn final_groups(groups: &[ValidationGroup]) -> Vec<ValidationGroup> {
    if groups.is_empty() {
        vec![ValidationGroup::Default]
    } else {
        groups.to_vec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Schema;

    struct Basic;
    struct Parent;
    struct Other;

    #[test]
    fn test_property_defaults_to_default_group() {
        let desc = DescriptorBuilder::for_type::<Basic>()
            .property("prop1", PropertySchema::literal(Schema::string()))
            .unwrap()
            .build();
        assert!(desc.declaration("prop1", &ValidationGroup::Default).is_some());
        assert!(desc.declaration("prop1", &ValidationGroup::Create).is_none());
    }

    #[test]
    fn test_property_redefinition_rejected() {
        let result = DescriptorBuilder::for_type::<Basic>()
            .property("prop1", PropertySchema::literal(Schema::string()))
            .unwrap()
            .property("prop1", PropertySchema::literal(Schema::number()));
        assert!(matches!(
            result.unwrap_err(),
            DeclarationError::PropertyRedefined { .. }
        ));
    }

    #[test]
    fn test_same_property_different_groups_allowed() {
        let desc = DescriptorBuilder::for_type::<Basic>()
            .property("prop1", PropertySchema::literal(Schema::string()))
            .unwrap()
            .property_in(
                &[ValidationGroup::named("group1")],
                "prop1",
                PropertySchema::literal(Schema::number()),
            )
            .unwrap()
            .build();
        assert_eq!(desc.declared_properties(), ["prop1"]);
        assert!(desc
            .declaration("prop1", &ValidationGroup::named("group1"))
            .is_some());
    }

    #[test]
    fn test_options_redefinition_rejected() {
        let result = DescriptorBuilder::for_type::<Basic>()
            .options(SchemaOptions::new().allow_unknown(false))
            .unwrap()
            .options(SchemaOptions::new().allow_unknown(true));
        assert!(matches!(
            result.unwrap_err(),
            DeclarationError::OptionsRedefined { .. }
        ));
    }

    #[test]
    fn test_extends_set_at_most_once() {
        let result = DescriptorBuilder::for_type::<Basic>()
            .extends::<Parent>()
            .unwrap()
            .extends::<Other>();
        assert!(matches!(
            result.unwrap_err(),
            DeclarationError::ExtendsRedefined { .. }
        ));
    }

    #[test]
    fn test_extends_wins_over_parent_for_chain_walk() {
        let desc = DescriptorBuilder::for_type::<Basic>()
            .inherits::<Parent>()
            .unwrap()
            .extends::<Other>()
            .unwrap()
            .build();
        assert_eq!(desc.next_ancestor(), Some(TypeRef::of::<Other>()));
    }

    #[test]
    fn test_declaration_order_preserved() {
        let desc = DescriptorBuilder::for_type::<Basic>()
            .property("b", PropertySchema::literal(Schema::string()))
            .unwrap()
            .property("a", PropertySchema::literal(Schema::string()))
            .unwrap()
            .build();
        assert_eq!(desc.declared_properties(), ["b", "a"]);
    }
}
