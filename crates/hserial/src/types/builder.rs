// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Fluent builder API for type descriptors.

use crate::error::Result;
use crate::types::{
    ChoiceDescriptor, ClassDescriptor, ContainerDescriptor, EnumDescriptor, EnumVariant,
    MemberDescriptor, PrimitiveKind, TypeDescriptor, TypeKind, TypeRef, TypeRegistry,
    VariantDescriptor,
};

/// Builder for class types.
#[derive(Debug)]
pub struct ClassBuilder {
    name: String,
    members: Vec<MemberDescriptor>,
}

impl ClassBuilder {
    /// Create a new builder for a class type.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            members: Vec::new(),
        }
    }

    /// Add a required member.
    pub fn member(mut self, name: impl Into<String>, type_ref: TypeRef) -> Self {
        self.members.push(MemberDescriptor::new(name, type_ref));
        self
    }

    /// Add an optional member.
    pub fn optional_member(mut self, name: impl Into<String>, type_ref: TypeRef) -> Self {
        self.members
            .push(MemberDescriptor::new(name, type_ref).optional());
        self
    }

    /// Add a required member of a built-in primitive type.
    pub fn primitive_member(
        self,
        registry: &TypeRegistry,
        name: impl Into<String>,
        kind: PrimitiveKind,
    ) -> Self {
        let type_ref = registry.primitive(kind);
        self.member(name, type_ref)
    }

    /// Build the kind only (for [`TypeRegistry::define`]).
    pub fn build_kind(self) -> TypeKind {
        TypeKind::Class(ClassDescriptor {
            members: self.members,
        })
    }

    /// Build the TypeDescriptor.
    pub fn build(self) -> TypeDescriptor {
        TypeDescriptor::class(self.name, self.members)
    }

    /// Build and register.
    pub fn register(self, registry: &mut TypeRegistry) -> Result<TypeRef> {
        registry.register(self.build())
    }
}

/// Builder for choice types.
#[derive(Debug)]
pub struct ChoiceBuilder {
    name: String,
    variants: Vec<VariantDescriptor>,
}

impl ChoiceBuilder {
    /// Create a new choice builder.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            variants: Vec::new(),
        }
    }

    /// Add a variant.
    pub fn variant(mut self, name: impl Into<String>, type_ref: TypeRef) -> Self {
        self.variants.push(VariantDescriptor::new(name, type_ref));
        self
    }

    /// Build the kind only (for [`TypeRegistry::define`]).
    pub fn build_kind(self) -> TypeKind {
        TypeKind::Choice(ChoiceDescriptor {
            variants: self.variants,
        })
    }

    /// Build the TypeDescriptor.
    pub fn build(self) -> TypeDescriptor {
        let name = self.name.clone();
        TypeDescriptor::new(name, self.build_kind())
    }

    /// Build and register.
    pub fn register(self, registry: &mut TypeRegistry) -> Result<TypeRef> {
        registry.register(self.build())
    }
}

/// Builder for enum types.
#[derive(Debug)]
pub struct EnumBuilder {
    name: String,
    variants: Vec<EnumVariant>,
    next_value: i64,
}

impl EnumBuilder {
    /// Create a new enum builder.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            variants: Vec::new(),
            next_value: 0,
        }
    }

    /// Add a variant with auto-incrementing value.
    pub fn variant(mut self, name: impl Into<String>) -> Self {
        self.variants.push(EnumVariant::new(name, self.next_value));
        self.next_value += 1;
        self
    }

    /// Add a variant with explicit value.
    pub fn variant_value(mut self, name: impl Into<String>, value: i64) -> Self {
        self.variants.push(EnumVariant::new(name, value));
        self.next_value = value + 1;
        self
    }

    /// Build the TypeDescriptor.
    pub fn build(self) -> TypeDescriptor {
        TypeDescriptor::new(self.name, TypeKind::Enum(EnumDescriptor::new(self.variants)))
    }

    /// Build and register.
    pub fn register(self, registry: &mut TypeRegistry) -> Result<TypeRef> {
        registry.register(self.build())
    }
}

/// Register a sequence of `element` under `name`.
pub fn register_sequence(
    registry: &mut TypeRegistry,
    name: impl Into<String>,
    element: TypeRef,
) -> Result<TypeRef> {
    registry.register(TypeDescriptor::sequence(name, element))
}

/// Register a set of `element` under `name`.
pub fn register_set(
    registry: &mut TypeRegistry,
    name: impl Into<String>,
    element: TypeRef,
) -> Result<TypeRef> {
    registry.register(TypeDescriptor::new(
        name,
        TypeKind::Container(ContainerDescriptor::set(element)),
    ))
}

/// Register a pointer to `target` (`None` for an untyped pointer).
pub fn register_pointer(
    registry: &mut TypeRegistry,
    name: impl Into<String>,
    target: Option<TypeRef>,
) -> Result<TypeRef> {
    registry.register(TypeDescriptor::pointer(name, target))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ContainerOrdering;

    #[test]
    fn test_class_builder() {
        let registry = TypeRegistry::new();
        let desc = ClassBuilder::new("Point3D")
            .primitive_member(&registry, "x", PrimitiveKind::F64)
            .primitive_member(&registry, "y", PrimitiveKind::F64)
            .primitive_member(&registry, "z", PrimitiveKind::F64)
            .build();

        assert_eq!(desc.name, "Point3D");
        assert!(desc.is_class());
        assert_eq!(desc.members().map(|m| m.len()), Some(3));
    }

    #[test]
    fn test_optional_members() {
        let registry = TypeRegistry::new();
        let string = registry.primitive(PrimitiveKind::String);
        let desc = ClassBuilder::new("Person")
            .member("name", string)
            .optional_member("nickname", string)
            .build();
        let members = desc.members().expect("members");
        assert!(!members[0].optional);
        assert!(members[1].optional);
    }

    #[test]
    fn test_enum_explicit_values() {
        let desc = EnumBuilder::new("HttpStatus")
            .variant_value("OK", 200)
            .variant_value("NOT_FOUND", 404)
            .variant("GONE")
            .build();

        match &desc.kind {
            TypeKind::Enum(e) => {
                assert_eq!(e.variant("NOT_FOUND").map(|v| v.value), Some(404));
                assert_eq!(e.variant("GONE").map(|v| v.value), Some(405));
            }
            _ => panic!("Expected enum"),
        }
    }

    #[test]
    fn test_choice_builder() {
        let registry = TypeRegistry::new();
        let desc = ChoiceBuilder::new("Value")
            .variant("int_val", registry.primitive(PrimitiveKind::I32))
            .variant("str_val", registry.primitive(PrimitiveKind::String))
            .build();
        assert_eq!(desc.variant_index("str_val"), Some(1));
        assert_eq!(desc.variant_index("float_val"), None);
    }

    #[test]
    fn test_container_helpers() {
        let mut registry = TypeRegistry::new();
        let u8_type = registry.primitive(PrimitiveKind::U8);
        let set = register_set(&mut registry, "ByteSet", u8_type).expect("set");
        match &registry.get(set).expect("desc").kind {
            TypeKind::Container(c) => assert_eq!(c.ordering, ContainerOrdering::Set),
            _ => panic!("Expected container"),
        }
    }
}
