// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Type descriptors for runtime type information.

use crate::types::TypeRef;

/// Primitive type kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveKind {
    Bool,
    I8,
    I16,
    I32,
    I64,
    U8,
    U16,
    U32,
    U64,
    F32,
    F64,
    Char,
    String,
    Bytes,
}

impl PrimitiveKind {
    /// All primitive kinds, in registration order.
    pub const ALL: [PrimitiveKind; 14] = [
        Self::Bool,
        Self::I8,
        Self::I16,
        Self::I32,
        Self::I64,
        Self::U8,
        Self::U16,
        Self::U32,
        Self::U64,
        Self::F32,
        Self::F64,
        Self::Char,
        Self::String,
        Self::Bytes,
    ];

    /// Get the size in bytes (None for strings and byte strings).
    pub fn size(&self) -> Option<usize> {
        match self {
            Self::Bool | Self::U8 | Self::I8 => Some(1),
            Self::U16 | Self::I16 => Some(2),
            Self::U32 | Self::I32 | Self::F32 | Self::Char => Some(4),
            Self::U64 | Self::I64 | Self::F64 => Some(8),
            Self::String | Self::Bytes => None,
        }
    }

    /// Get binary alignment requirement.
    pub fn alignment(&self) -> usize {
        match self {
            Self::Bool | Self::U8 | Self::I8 => 1,
            Self::U16 | Self::I16 => 2,
            Self::U32 | Self::I32 | Self::F32 | Self::Char | Self::String | Self::Bytes => 4,
            Self::U64 | Self::I64 | Self::F64 => 8,
        }
    }

    /// Canonical registered name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::I8 => "i8",
            Self::I16 => "i16",
            Self::I32 => "i32",
            Self::I64 => "i64",
            Self::U8 => "u8",
            Self::U16 => "u16",
            Self::U32 => "u32",
            Self::U64 => "u64",
            Self::F32 => "f32",
            Self::F64 => "f64",
            Self::Char => "char",
            Self::String => "string",
            Self::Bytes => "bytes",
        }
    }
}

/// Shape of a registered type.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeKind {
    /// Leaf value.
    Primitive(PrimitiveKind),
    /// Named integer constants (a leaf, like primitives).
    Enum(EnumDescriptor),
    /// Fixed named members.
    Class(ClassDescriptor),
    /// Tagged union: at most one variant selected.
    Choice(ChoiceDescriptor),
    /// Sequence or set of elements of one type.
    Container(ContainerDescriptor),
    /// Reference to a separately allocated object.
    Pointer(PointerDescriptor),
}

impl TypeKind {
    /// Short kind label used in diagnostics.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Primitive(_) => "primitive",
            Self::Enum(_) => "enum",
            Self::Class(_) => "class",
            Self::Choice(_) => "choice",
            Self::Container(_) => "container",
            Self::Pointer(_) => "pointer",
        }
    }
}

/// A complete type descriptor.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeDescriptor {
    /// Type name.
    pub name: String,
    /// Type kind.
    pub kind: TypeKind,
}

impl TypeDescriptor {
    /// Create a new type descriptor.
    pub fn new(name: impl Into<String>, kind: TypeKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }

    /// Create a primitive type descriptor.
    pub fn primitive(name: impl Into<String>, kind: PrimitiveKind) -> Self {
        Self::new(name, TypeKind::Primitive(kind))
    }

    /// Create a class type descriptor.
    pub fn class(name: impl Into<String>, members: Vec<MemberDescriptor>) -> Self {
        Self::new(name, TypeKind::Class(ClassDescriptor { members }))
    }

    /// Create a sequence container descriptor.
    pub fn sequence(name: impl Into<String>, element: TypeRef) -> Self {
        Self::new(
            name,
            TypeKind::Container(ContainerDescriptor::sequence(element)),
        )
    }

    /// Create a pointer descriptor.
    pub fn pointer(name: impl Into<String>, target: Option<TypeRef>) -> Self {
        Self::new(name, TypeKind::Pointer(PointerDescriptor { target }))
    }

    /// Check if this is a leaf type (primitive or enum).
    pub fn is_leaf(&self) -> bool {
        matches!(self.kind, TypeKind::Primitive(_) | TypeKind::Enum(_))
    }

    /// Check if this is a class type.
    pub fn is_class(&self) -> bool {
        matches!(self.kind, TypeKind::Class(_))
    }

    /// Get members if this is a class.
    pub fn members(&self) -> Option<&[MemberDescriptor]> {
        match &self.kind {
            TypeKind::Class(class) => Some(&class.members),
            _ => None,
        }
    }

    /// Get member index by name.
    pub fn member_index(&self, name: &str) -> Option<usize> {
        self.members()?.iter().position(|m| m.name == name)
    }

    /// Get variants if this is a choice.
    pub fn variants(&self) -> Option<&[VariantDescriptor]> {
        match &self.kind {
            TypeKind::Choice(choice) => Some(&choice.variants),
            _ => None,
        }
    }

    /// Get variant index by name.
    pub fn variant_index(&self, name: &str) -> Option<usize> {
        self.variants()?.iter().position(|v| v.name == name)
    }

    /// Storage size of one instance, when fixed.
    ///
    /// Composite types report the sum of their fixed parts; variable-length
    /// members make the whole type variable (`None`).
    pub fn fixed_size(&self, lookup: impl Fn(TypeRef) -> Option<usize> + Copy) -> Option<usize> {
        match &self.kind {
            TypeKind::Primitive(p) => p.size(),
            TypeKind::Enum(_) => Some(4),
            TypeKind::Class(class) => class
                .members
                .iter()
                .map(|m| lookup(m.type_ref))
                .sum::<Option<usize>>(),
            TypeKind::Choice(_) | TypeKind::Container(_) => None,
            TypeKind::Pointer(_) => Some(std::mem::size_of::<u32>()),
        }
    }
}

/// Member descriptor for class types.
#[derive(Debug, Clone, PartialEq)]
pub struct MemberDescriptor {
    /// Member name.
    pub name: String,
    /// Declared member type.
    pub type_ref: TypeRef,
    /// Member may stay unset.
    pub optional: bool,
}

impl MemberDescriptor {
    /// Create a required member.
    pub fn new(name: impl Into<String>, type_ref: TypeRef) -> Self {
        Self {
            name: name.into(),
            type_ref,
            optional: false,
        }
    }

    /// Mark as optional.
    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }
}

/// Class type descriptor.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ClassDescriptor {
    /// Members in declaration order.
    pub members: Vec<MemberDescriptor>,
}

/// Choice variant.
#[derive(Debug, Clone, PartialEq)]
pub struct VariantDescriptor {
    /// Variant name.
    pub name: String,
    /// Variant type.
    pub type_ref: TypeRef,
}

impl VariantDescriptor {
    /// Create a choice variant.
    pub fn new(name: impl Into<String>, type_ref: TypeRef) -> Self {
        Self {
            name: name.into(),
            type_ref,
        }
    }
}

/// Choice (tagged union) descriptor.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ChoiceDescriptor {
    /// Variants in declaration order.
    pub variants: Vec<VariantDescriptor>,
}

/// Element ordering of a container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerOrdering {
    /// Elements keep insertion order.
    Sequence,
    /// Unordered collection; stored order is still the traversal order.
    Set,
}

/// Container type descriptor.
#[derive(Debug, Clone, PartialEq)]
pub struct ContainerDescriptor {
    /// Element type.
    pub element: TypeRef,
    /// Ordering semantics.
    pub ordering: ContainerOrdering,
}

impl ContainerDescriptor {
    /// Create a sequence descriptor.
    pub fn sequence(element: TypeRef) -> Self {
        Self {
            element,
            ordering: ContainerOrdering::Sequence,
        }
    }

    /// Create a set descriptor.
    pub fn set(element: TypeRef) -> Self {
        Self {
            element,
            ordering: ContainerOrdering::Set,
        }
    }
}

/// Pointer type descriptor.
#[derive(Debug, Clone, PartialEq)]
pub struct PointerDescriptor {
    /// Declared target type; `None` accepts any object.
    pub target: Option<TypeRef>,
}

/// Enumeration type descriptor.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct EnumDescriptor {
    /// Enum variants.
    pub variants: Vec<EnumVariant>,
}

impl EnumDescriptor {
    /// Create enum descriptor.
    pub fn new(variants: Vec<EnumVariant>) -> Self {
        Self { variants }
    }

    /// Get variant by name.
    pub fn variant(&self, name: &str) -> Option<&EnumVariant> {
        self.variants.iter().find(|v| v.name == name)
    }

    /// Get variant by value.
    pub fn variant_by_value(&self, value: i64) -> Option<&EnumVariant> {
        self.variants.iter().find(|v| v.value == value)
    }

    /// Value used for a freshly created instance.
    pub fn initial_value(&self) -> i64 {
        self.variants.first().map_or(0, |v| v.value)
    }
}

/// Enum variant.
#[derive(Debug, Clone, PartialEq)]
pub struct EnumVariant {
    /// Variant name.
    pub name: String,
    /// Variant value.
    pub value: i64,
}

impl EnumVariant {
    /// Create enum variant.
    pub fn new(name: impl Into<String>, value: i64) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_primitive_size() {
        assert_eq!(PrimitiveKind::Bool.size(), Some(1));
        assert_eq!(PrimitiveKind::U32.size(), Some(4));
        assert_eq!(PrimitiveKind::F64.size(), Some(8));
        assert_eq!(PrimitiveKind::String.size(), None);
    }

    #[test]
    fn test_primitive_alignment() {
        assert_eq!(PrimitiveKind::U8.alignment(), 1);
        assert_eq!(PrimitiveKind::U16.alignment(), 2);
        assert_eq!(PrimitiveKind::U32.alignment(), 4);
        assert_eq!(PrimitiveKind::F64.alignment(), 8);
    }

    #[test]
    fn test_class_member_lookup() {
        let desc = TypeDescriptor::class(
            "Point",
            vec![
                MemberDescriptor::new("x", TypeRef::from_index(0)),
                MemberDescriptor::new("y", TypeRef::from_index(0)).optional(),
            ],
        );
        assert!(desc.is_class());
        assert_eq!(desc.member_index("y"), Some(1));
        assert_eq!(desc.member_index("z"), None);
        assert!(desc.variants().is_none());
    }

    #[test]
    fn test_enum_descriptor() {
        let enum_desc = EnumDescriptor::new(vec![
            EnumVariant::new("RED", 0),
            EnumVariant::new("GREEN", 1),
            EnumVariant::new("BLUE", 2),
        ]);

        assert_eq!(enum_desc.variant("GREEN").map(|v| v.value), Some(1));
        assert_eq!(
            enum_desc.variant_by_value(2).map(|v| &v.name as &str),
            Some("BLUE")
        );
        assert_eq!(enum_desc.initial_value(), 0);
    }

    #[test]
    fn test_fixed_size_of_class() {
        let desc = TypeDescriptor::class(
            "Pair",
            vec![
                MemberDescriptor::new("a", TypeRef::from_index(0)),
                MemberDescriptor::new("b", TypeRef::from_index(1)),
            ],
        );
        assert_eq!(desc.fixed_size(|_| Some(4)), Some(8));
        assert_eq!(
            desc.fixed_size(|r| if r.index() == 1 { None } else { Some(4) }),
            None
        );
    }
}
