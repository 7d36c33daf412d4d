//! Schema derivation engine
//!
//! Walks a type's ancestor chain and composes its validation schema. The
//! next ancestor at each step is the extends override when one was
//! declared, otherwise the declared parent; the chain ends at the first
//! unregistered or built-in ancestor. Processing then runs root-first so
//! that declarations closer to the leaf override declarations closer to
//! the root, per property name and per options key.

use std::any::TypeId;

use crate::group::ValidationGroup;
use crate::registry::{PropertySchema, SchemaRegistry, TypeDescriptor, TypeRef};
use crate::schema::{Schema, SchemaOptions};

use super::errors::DeriveError;

/// A composed schema plus what the chain actually contributed, which the
/// cached resolution path uses to decide forced/non-forced eligibility.
pub(crate) struct Composed {
    pub schema: Schema,
    pub has_properties: bool,
    pub has_options: bool,
}

/// Derives the composed schema for a type and group.
///
/// A type with no resolvable declarations anywhere in its chain yields a
/// strict empty-object schema. Group fallback is single-tier: a property
/// or options bag declared for the requested group wins, else the DEFAULT
/// declaration applies, else the ancestor contributes nothing.
pub fn derive_schema(
    registry: &SchemaRegistry,
    ty: TypeRef,
    group: &ValidationGroup,
) -> Result<Schema, DeriveError> {
    let mut stack = Vec::new();
    Ok(derive_inner(registry, ty, group, &mut stack)?.schema)
}

/// Derivation entry point for the cached resolution path.
pub(crate) fn derive_composed(
    registry: &SchemaRegistry,
    ty: TypeRef,
    group: &ValidationGroup,
) -> Result<Composed, DeriveError> {
    let mut stack = Vec::new();
    derive_inner(registry, ty, group, &mut stack)
}

fn derive_inner(
    registry: &SchemaRegistry,
    ty: TypeRef,
    group: &ValidationGroup,
    stack: &mut Vec<TypeId>,
) -> Result<Composed, DeriveError> {
    if stack.contains(&ty.id()) {
        return Err(DeriveError::CyclicReference {
            type_name: ty.short_name().to_string(),
        });
    }
    stack.push(ty.id());
    let result = compose(registry, ty, group, stack);
    stack.pop();
    result
}

fn compose(
    registry: &SchemaRegistry,
    ty: TypeRef,
    group: &ValidationGroup,
    stack: &mut Vec<TypeId>,
) -> Result<Composed, DeriveError> {
    // Collect the chain leaf-first, following extends overrides where
    // declared. The walk must terminate even on misdeclared cycles.
    let mut chain: Vec<TypeDescriptor> = Vec::new();
    let mut seen: Vec<TypeId> = Vec::new();
    let mut current = Some(ty);
    while let Some(ancestor) = current {
        if seen.contains(&ancestor.id()) {
            return Err(DeriveError::CyclicChain {
                type_name: ty.short_name().to_string(),
            });
        }
        seen.push(ancestor.id());

        match registry.descriptor(ancestor.id()) {
            Some(descriptor) => {
                current = descriptor.next_ancestor().filter(|next| !next.is_builtin());
                chain.push(descriptor);
            }
            None => current = None,
        }
    }

    // Merge root-first: each ancestor contributes only what it declared
    // directly, and leaf entries overwrite root entries. A property keeps
    // the position of its first declaration, so composed schemas come out
    // in declaration order.
    let mut options = SchemaOptions::new();
    let mut has_options = false;
    let mut properties: Vec<(String, Schema)> = Vec::new();

    for descriptor in chain.iter().rev() {
        // Declaring options for any group marks the type as validatable,
        // even when no bag resolves for the requested group.
        if descriptor.has_options() {
            has_options = true;
        }
        let bag = descriptor
            .group_options(group)
            .or_else(|| descriptor.group_options(&ValidationGroup::Default));
        if let Some(bag) = bag {
            options.merge_from(bag);
        }

        for property in descriptor.declared_properties() {
            let declaration = match descriptor
                .declaration(property, group)
                .or_else(|| descriptor.declaration(property, &ValidationGroup::Default))
            {
                Some(declaration) => declaration,
                // Not constrained by this ancestor for this group.
                None => continue,
            };

            let schema = resolve_declaration(registry, declaration, group, stack)?;
            match properties.iter().position(|(name, _)| name == property) {
                Some(pos) => properties[pos].1 = schema,
                None => properties.push((property.clone(), schema)),
            }
        }
    }

    let has_properties = !properties.is_empty();

    // An empty property map composes to a strict empty-object schema
    // unless the declared options say otherwise.
    let mut composed_options = options;
    if !has_properties && composed_options.allow_unknown.is_none() {
        composed_options.allow_unknown = Some(false);
    }

    let schema = Schema::object().keys(properties).options(composed_options);
    Ok(Composed {
        schema,
        has_properties,
        has_options,
    })
}

/// Resolves a single property declaration into a schema: literals are
/// used as-is, nested references derive recursively with the same group,
/// list references wrap the derived item schema as an array. Customizers
/// run after derivation, item first, then array.
fn resolve_declaration(
    registry: &SchemaRegistry,
    declaration: &PropertySchema,
    group: &ValidationGroup,
    stack: &mut Vec<TypeId>,
) -> Result<Schema, DeriveError> {
    match declaration {
        PropertySchema::Literal(schema) => Ok(schema.clone()),
        PropertySchema::Nested { target, customize } => {
            let mut schema = derive_inner(registry, *target, group, stack)?.schema;
            if let Some(customize) = customize {
                schema = customize(schema);
            }
            Ok(schema)
        }
        PropertySchema::NestedList {
            target,
            customize_item,
            customize_array,
        } => {
            let mut item = derive_inner(registry, *target, group, stack)?.schema;
            if let Some(customize) = customize_item {
                item = customize(item);
            }
            let mut array = Schema::array().items(item);
            if let Some(customize) = customize_array {
                array = customize(array);
            }
            Ok(array)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::DescriptorBuilder;
    use crate::schema::Schema as S;
    use serde_json::json;

    fn collect_all() -> SchemaOptions {
        SchemaOptions::new().abort_early(false).allow_unknown(true)
    }

    #[test]
    fn test_subclass_overrides_parent_property() {
        struct Base;
        struct Derived;

        let registry = SchemaRegistry::new();
        registry
            .register(
                DescriptorBuilder::for_type::<Base>()
                    .property("p", PropertySchema::literal(S::string().valid(["base"])))
                    .unwrap()
                    .build(),
            )
            .unwrap();
        registry
            .register(
                DescriptorBuilder::for_type::<Derived>()
                    .inherits::<Base>()
                    .unwrap()
                    .property("p", PropertySchema::literal(S::string().valid(["derived"])))
                    .unwrap()
                    .build(),
            )
            .unwrap();

        let schema = derive_schema(
            &registry,
            TypeRef::of::<Derived>(),
            &ValidationGroup::Default,
        )
        .unwrap();

        assert!(schema
            .validate(&json!({ "p": "derived" }), &collect_all())
            .is_ok());
        assert!(schema
            .validate(&json!({ "p": "base" }), &collect_all())
            .is_err());
    }

    #[test]
    fn test_parent_properties_inherited() {
        struct Base;
        struct Derived;

        let registry = SchemaRegistry::new();
        registry
            .register(
                DescriptorBuilder::for_type::<Base>()
                    .property("a", PropertySchema::literal(S::string().required()))
                    .unwrap()
                    .build(),
            )
            .unwrap();
        registry
            .register(
                DescriptorBuilder::for_type::<Derived>()
                    .inherits::<Base>()
                    .unwrap()
                    .property("b", PropertySchema::literal(S::integer().required()))
                    .unwrap()
                    .build(),
            )
            .unwrap();

        let schema = derive_schema(
            &registry,
            TypeRef::of::<Derived>(),
            &ValidationGroup::Default,
        )
        .unwrap();

        let err = schema.validate(&json!({}), &collect_all()).unwrap_err();
        let paths: Vec<&str> = err.details.iter().map(|d| d.path.as_str()).collect();
        assert!(paths.contains(&"a"));
        assert!(paths.contains(&"b"));
    }

    #[test]
    fn test_composed_properties_keep_declaration_order() {
        struct Base;
        struct Derived;

        let registry = SchemaRegistry::new();
        registry
            .register(
                DescriptorBuilder::for_type::<Base>()
                    .property("z", PropertySchema::literal(S::string().required()))
                    .unwrap()
                    .property("m", PropertySchema::literal(S::string().required()))
                    .unwrap()
                    .build(),
            )
            .unwrap();
        registry
            .register(
                DescriptorBuilder::for_type::<Derived>()
                    .inherits::<Base>()
                    .unwrap()
                    .property("a", PropertySchema::literal(S::string().required()))
                    .unwrap()
                    // Redeclaring z keeps its root position.
                    .property("z", PropertySchema::literal(S::integer().required()))
                    .unwrap()
                    .build(),
            )
            .unwrap();

        let schema = derive_schema(
            &registry,
            TypeRef::of::<Derived>(),
            &ValidationGroup::Default,
        )
        .unwrap();

        let err = schema.validate(&json!({}), &collect_all()).unwrap_err();
        let paths: Vec<&str> = err.details.iter().map(|d| d.path.as_str()).collect();
        assert_eq!(paths, ["z", "m", "a"]);
    }

    #[test]
    fn test_group_fallback_to_default() {
        struct Typed;

        let registry = SchemaRegistry::new();
        registry
            .register(
                DescriptorBuilder::for_type::<Typed>()
                    .property("p", PropertySchema::literal(S::string().valid(["default"])))
                    .unwrap()
                    .property_in(
                        &[ValidationGroup::named("group1")],
                        "p",
                        PropertySchema::literal(S::string().valid(["grouped"])),
                    )
                    .unwrap()
                    .build(),
            )
            .unwrap();

        // Requested group declared: its rule applies.
        let schema = derive_schema(
            &registry,
            TypeRef::of::<Typed>(),
            &ValidationGroup::named("group1"),
        )
        .unwrap();
        assert!(schema
            .validate(&json!({ "p": "grouped" }), &collect_all())
            .is_ok());
        assert!(schema
            .validate(&json!({ "p": "default" }), &collect_all())
            .is_err());

        // Unknown group: falls back to DEFAULT.
        let schema = derive_schema(
            &registry,
            TypeRef::of::<Typed>(),
            &ValidationGroup::named("other"),
        )
        .unwrap();
        assert!(schema
            .validate(&json!({ "p": "default" }), &collect_all())
            .is_ok());
    }

    #[test]
    fn test_property_skipped_when_no_group_matches() {
        struct Typed;

        let registry = SchemaRegistry::new();
        registry
            .register(
                DescriptorBuilder::for_type::<Typed>()
                    .property_in(
                        &[ValidationGroup::Create],
                        "p",
                        PropertySchema::literal(S::string().required()),
                    )
                    .unwrap()
                    .build(),
            )
            .unwrap();

        // No CREATE entry requested and no DEFAULT entry exists: the
        // property is unconstrained.
        let schema = derive_schema(
            &registry,
            TypeRef::of::<Typed>(),
            &ValidationGroup::Update,
        )
        .unwrap();
        assert_eq!(schema.declared_keys(), 0);
    }

    #[test]
    fn test_extends_override_redirects_chain() {
        struct RuntimeParent;
        struct ValidationParent;
        struct Child;

        let registry = SchemaRegistry::new();
        registry
            .register(
                DescriptorBuilder::for_type::<RuntimeParent>()
                    .property("runtime", PropertySchema::literal(S::string().required()))
                    .unwrap()
                    .build(),
            )
            .unwrap();
        registry
            .register(
                DescriptorBuilder::for_type::<ValidationParent>()
                    .property("validated", PropertySchema::literal(S::string().required()))
                    .unwrap()
                    .build(),
            )
            .unwrap();
        registry
            .register(
                DescriptorBuilder::for_type::<Child>()
                    .inherits::<RuntimeParent>()
                    .unwrap()
                    .extends::<ValidationParent>()
                    .unwrap()
                    .build(),
            )
            .unwrap();

        let schema =
            derive_schema(&registry, TypeRef::of::<Child>(), &ValidationGroup::Default).unwrap();
        let err = schema.validate(&json!({}), &collect_all()).unwrap_err();
        assert_eq!(err.details.len(), 1);
        assert_eq!(err.details[0].path, "validated");
    }

    #[test]
    fn test_options_merge_leaf_wins() {
        struct Base;
        struct Derived;

        let registry = SchemaRegistry::new();
        registry
            .register(
                DescriptorBuilder::for_type::<Base>()
                    .options(SchemaOptions::new().allow_unknown(false).abort_early(true))
                    .unwrap()
                    .property("p", PropertySchema::literal(S::string()))
                    .unwrap()
                    .build(),
            )
            .unwrap();
        registry
            .register(
                DescriptorBuilder::for_type::<Derived>()
                    .inherits::<Base>()
                    .unwrap()
                    .options(SchemaOptions::new().allow_unknown(true))
                    .unwrap()
                    .build(),
            )
            .unwrap();

        let schema = derive_schema(
            &registry,
            TypeRef::of::<Derived>(),
            &ValidationGroup::Default,
        )
        .unwrap();
        let opts = schema.schema_options();
        assert_eq!(opts.allow_unknown, Some(true));
        assert_eq!(opts.abort_early, Some(true));
    }

    #[test]
    fn test_empty_chain_composes_strict_empty_object() {
        struct Undeclared;

        let registry = SchemaRegistry::new();
        let schema = derive_schema(
            &registry,
            TypeRef::of::<Undeclared>(),
            &ValidationGroup::Default,
        )
        .unwrap();

        assert!(schema.validate(&json!({}), &collect_all()).is_ok());
        assert!(schema
            .validate(&json!({ "anything": 1 }), &collect_all())
            .is_err());
    }

    #[test]
    fn test_nested_reference_derives_recursively() {
        struct Inner;
        struct Outer;

        let registry = SchemaRegistry::new();
        registry
            .register(
                DescriptorBuilder::for_type::<Inner>()
                    .property("x", PropertySchema::literal(S::string().required()))
                    .unwrap()
                    .build(),
            )
            .unwrap();
        registry
            .register(
                DescriptorBuilder::for_type::<Outer>()
                    .property("inner", PropertySchema::nested::<Inner>())
                    .unwrap()
                    .build(),
            )
            .unwrap();

        let schema =
            derive_schema(&registry, TypeRef::of::<Outer>(), &ValidationGroup::Default).unwrap();
        let err = schema
            .validate(&json!({ "inner": {} }), &collect_all())
            .unwrap_err();
        assert_eq!(err.details[0].path, "inner.x");
    }

    #[test]
    fn test_nested_customizer_applies() {
        struct Inner;
        struct Outer;

        let registry = SchemaRegistry::new();
        registry
            .register(
                DescriptorBuilder::for_type::<Inner>()
                    .property("x", PropertySchema::literal(S::string()))
                    .unwrap()
                    .build(),
            )
            .unwrap();
        registry
            .register(
                DescriptorBuilder::for_type::<Outer>()
                    .property("inner", PropertySchema::nested_with::<Inner, _>(|s| s.required()))
                    .unwrap()
                    .build(),
            )
            .unwrap();

        let schema =
            derive_schema(&registry, TypeRef::of::<Outer>(), &ValidationGroup::Default).unwrap();
        let err = schema.validate(&json!({}), &collect_all()).unwrap_err();
        assert_eq!(err.details[0].path, "inner");
    }

    #[test]
    fn test_list_reference_wraps_as_array() {
        struct Inner;
        struct Outer;

        let registry = SchemaRegistry::new();
        registry
            .register(
                DescriptorBuilder::for_type::<Inner>()
                    .property("x", PropertySchema::literal(S::string().required()))
                    .unwrap()
                    .build(),
            )
            .unwrap();
        registry
            .register(
                DescriptorBuilder::for_type::<Outer>()
                    .property("items", PropertySchema::list::<Inner>())
                    .unwrap()
                    .build(),
            )
            .unwrap();

        let schema =
            derive_schema(&registry, TypeRef::of::<Outer>(), &ValidationGroup::Default).unwrap();

        assert!(schema
            .validate(&json!({ "items": [{ "x": "a" }, { "x": "b" }] }), &collect_all())
            .is_ok());
        let err = schema
            .validate(&json!({ "items": [{ "x": "a" }, {}] }), &collect_all())
            .unwrap_err();
        assert_eq!(err.details[0].path, "items[1].x");
    }

    #[test]
    fn test_cyclic_extends_chain_detected() {
        struct A;
        struct B;

        let registry = SchemaRegistry::new();
        registry
            .register(
                DescriptorBuilder::for_type::<A>()
                    .extends::<B>()
                    .unwrap()
                    .build(),
            )
            .unwrap();
        registry
            .register(
                DescriptorBuilder::for_type::<B>()
                    .extends::<A>()
                    .unwrap()
                    .build(),
            )
            .unwrap();

        let err = derive_schema(&registry, TypeRef::of::<A>(), &ValidationGroup::Default)
            .unwrap_err();
        assert!(matches!(err, DeriveError::CyclicChain { .. }));
    }

    #[test]
    fn test_self_referencing_nested_type_detected() {
        struct Node;

        let registry = SchemaRegistry::new();
        registry
            .register(
                DescriptorBuilder::for_type::<Node>()
                    .property("child", PropertySchema::nested::<Node>())
                    .unwrap()
                    .build(),
            )
            .unwrap();

        let err = derive_schema(&registry, TypeRef::of::<Node>(), &ValidationGroup::Default)
            .unwrap_err();
        assert!(matches!(err, DeriveError::CyclicReference { .. }));
    }
}
