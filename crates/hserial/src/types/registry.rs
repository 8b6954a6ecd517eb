// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Type registry: the single owner of every [`TypeDescriptor`].
//!
//! Descriptors are registered once at startup (usually by generated schema
//! bindings) and never change afterwards. The registry is then shared as
//! `Arc<TypeRegistry>` with every heap, iterator and stream that needs it.
//!
//! Recursive types are built in two steps:
//!
//! ```rust
//! use hserial::types::{MemberDescriptor, TypeDescriptor, TypeKind, TypeRegistry, PrimitiveKind};
//!
//! let mut registry = TypeRegistry::new();
//! let node = registry.declare("Node").unwrap();
//! let next = registry
//!     .register(TypeDescriptor::pointer("Node*", Some(node)))
//!     .unwrap();
//! let name = registry.primitive(PrimitiveKind::String);
//! registry
//!     .define(
//!         node,
//!         TypeDescriptor::class(
//!             "Node",
//!             vec![
//!                 MemberDescriptor::new("name", name),
//!                 MemberDescriptor::new("next", next),
//!             ],
//!         )
//!         .kind,
//!     )
//!     .unwrap();
//! registry.validate().unwrap();
//! ```

use crate::error::{Error, Result};
use crate::types::{MemberDescriptor, PrimitiveKind, TypeDescriptor, TypeKind, VariantDescriptor};
use std::collections::{HashMap, HashSet};
use std::fmt;

/// Handle of a registered type.
///
/// Unique per registered type within one registry; cheap to copy, compare
/// and hash.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeRef(u32);

impl TypeRef {
    /// Build a handle from a raw registry index.
    pub const fn from_index(index: u32) -> Self {
        Self(index)
    }

    /// Raw registry index.
    pub const fn index(self) -> u32 {
        self.0
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "type#{}", self.0)
    }
}

#[derive(Debug)]
struct Entry {
    name: String,
    descriptor: Option<TypeDescriptor>,
}

/// Registry of type descriptors.
#[derive(Debug)]
pub struct TypeRegistry {
    entries: Vec<Entry>,
    by_name: HashMap<String, TypeRef>,
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl TypeRegistry {
    /// Create a registry holding only the built-in primitive types.
    pub fn new() -> Self {
        let mut registry = Self {
            entries: Vec::with_capacity(PrimitiveKind::ALL.len()),
            by_name: HashMap::new(),
        };
        for kind in PrimitiveKind::ALL {
            let descriptor = TypeDescriptor::primitive(kind.name(), kind);
            registry.insert(kind.name().to_string(), Some(descriptor));
        }
        registry
    }

    fn insert(&mut self, name: String, descriptor: Option<TypeDescriptor>) -> TypeRef {
        let type_ref = TypeRef(self.entries.len() as u32);
        self.by_name.insert(name.clone(), type_ref);
        self.entries.push(Entry { name, descriptor });
        type_ref
    }

    /// Built-in type for a primitive kind.
    pub fn primitive(&self, kind: PrimitiveKind) -> TypeRef {
        TypeRef(kind as u32)
    }

    /// Register a fully defined type.
    pub fn register(&mut self, descriptor: TypeDescriptor) -> Result<TypeRef> {
        if self.by_name.contains_key(&descriptor.name) {
            return Err(Error::DuplicateType(descriptor.name));
        }
        log::debug!(
            "[TypeRegistry] register {} ({})",
            descriptor.name,
            descriptor.kind.label()
        );
        Ok(self.insert(descriptor.name.clone(), Some(descriptor)))
    }

    /// Reserve a handle for a type defined later (recursive schemas).
    pub fn declare(&mut self, name: impl Into<String>) -> Result<TypeRef> {
        let name = name.into();
        if self.by_name.contains_key(&name) {
            return Err(Error::DuplicateType(name));
        }
        log::debug!("[TypeRegistry] declare {}", name);
        Ok(self.insert(name, None))
    }

    /// Define a previously declared type. Allowed exactly once.
    pub fn define(&mut self, type_ref: TypeRef, kind: TypeKind) -> Result<()> {
        let entry = self
            .entries
            .get_mut(type_ref.0 as usize)
            .ok_or(Error::InvalidTypeRef(type_ref.0))?;
        if entry.descriptor.is_some() {
            return Err(Error::DuplicateType(entry.name.clone()));
        }
        log::debug!("[TypeRegistry] define {} ({})", entry.name, kind.label());
        entry.descriptor = Some(TypeDescriptor::new(entry.name.clone(), kind));
        Ok(())
    }

    /// Check that every type is defined and every reference resolves.
    pub fn validate(&self) -> Result<()> {
        for entry in &self.entries {
            let descriptor = entry
                .descriptor
                .as_ref()
                .ok_or_else(|| Error::UndefinedType(entry.name.clone()))?;
            for child in Self::child_types(descriptor).into_iter().flatten() {
                if child.0 as usize >= self.entries.len() {
                    return Err(Error::InvalidTypeRef(child.0));
                }
            }
        }
        Ok(())
    }

    /// Number of registered types (built-ins included).
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no types are registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Get a descriptor.
    pub fn get(&self, type_ref: TypeRef) -> Result<&TypeDescriptor> {
        let entry = self
            .entries
            .get(type_ref.0 as usize)
            .ok_or(Error::InvalidTypeRef(type_ref.0))?;
        entry
            .descriptor
            .as_ref()
            .ok_or_else(|| Error::UndefinedType(entry.name.clone()))
    }

    /// Type name for diagnostics (never fails).
    pub fn name(&self, type_ref: TypeRef) -> &str {
        self.entries
            .get(type_ref.0 as usize)
            .map_or("<invalid>", |e| e.name.as_str())
    }

    /// Find a type by name.
    pub fn lookup(&self, name: &str) -> Option<TypeRef> {
        self.by_name.get(name).copied()
    }

    /// Find a type by name, failing loudly when unknown.
    pub fn type_info(&self, name: &str) -> Result<TypeRef> {
        self.lookup(name)
            .ok_or_else(|| Error::UnknownType(name.to_string()))
    }

    /// Resolve a class member by name.
    pub fn member(&self, class: TypeRef, name: &str) -> Result<(usize, &MemberDescriptor)> {
        let descriptor = self.get(class)?;
        let members = descriptor.members().ok_or_else(|| Error::KindMismatch {
            type_name: descriptor.name.clone(),
            operation: "member",
        })?;
        members
            .iter()
            .enumerate()
            .find(|(_, m)| m.name == name)
            .ok_or_else(|| Error::UnknownMember {
                type_name: descriptor.name.clone(),
                member: name.to_string(),
            })
    }

    /// Resolve a choice variant by name.
    pub fn variant(&self, choice: TypeRef, name: &str) -> Result<(usize, &VariantDescriptor)> {
        let descriptor = self.get(choice)?;
        let variants = descriptor.variants().ok_or_else(|| Error::KindMismatch {
            type_name: descriptor.name.clone(),
            operation: "variant",
        })?;
        variants
            .iter()
            .enumerate()
            .find(|(_, v)| v.name == name)
            .ok_or_else(|| Error::UnknownVariant {
                type_name: descriptor.name.clone(),
                variant: name.to_string(),
            })
    }

    /// Fixed storage size of a type, if it has one.
    ///
    /// A class that embeds itself has no fixed size.
    pub fn size_of(&self, type_ref: TypeRef) -> Option<usize> {
        self.size_of_guarded(type_ref, &mut HashSet::new())
    }

    fn size_of_guarded(&self, type_ref: TypeRef, visiting: &mut HashSet<TypeRef>) -> Option<usize> {
        let descriptor = self.get(type_ref).ok()?;
        let TypeKind::Class(class) = &descriptor.kind else {
            return descriptor.fixed_size(|_| None);
        };
        if !visiting.insert(type_ref) {
            return None;
        }
        let size = class
            .members
            .iter()
            .map(|m| self.size_of_guarded(m.type_ref, visiting))
            .sum::<Option<usize>>();
        visiting.remove(&type_ref);
        size
    }

    /// Types directly reachable from a descriptor.
    ///
    /// An untyped pointer yields `None`: its target can be anything.
    fn child_types(descriptor: &TypeDescriptor) -> Vec<Option<TypeRef>> {
        match &descriptor.kind {
            TypeKind::Primitive(_) | TypeKind::Enum(_) => Vec::new(),
            TypeKind::Class(class) => class.members.iter().map(|m| Some(m.type_ref)).collect(),
            TypeKind::Choice(choice) => choice.variants.iter().map(|v| Some(v.type_ref)).collect(),
            TypeKind::Container(container) => vec![Some(container.element)],
            TypeKind::Pointer(pointer) => vec![pointer.target],
        }
    }

    /// Whether an object of type `outer` may hold a sub-object of type
    /// `needle` somewhere below it.
    ///
    /// This is a static check over declared types. Untyped pointers make
    /// the answer `true`, so a pruning traversal never misses a node.
    pub fn may_contain(&self, outer: TypeRef, needle: TypeRef) -> bool {
        let mut seen = HashSet::new();
        let mut pending = vec![outer];
        while let Some(current) = pending.pop() {
            let Ok(descriptor) = self.get(current) else {
                // Undefined types cannot be proven empty.
                return true;
            };
            for child in Self::child_types(descriptor) {
                match child {
                    None => return true,
                    Some(child) if child == needle => return true,
                    Some(child) => {
                        if seen.insert(child) {
                            pending.push(child);
                        }
                    }
                }
            }
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ChoiceBuilder, ClassBuilder};

    #[test]
    fn test_builtin_primitives() {
        let registry = TypeRegistry::new();
        assert_eq!(registry.len(), PrimitiveKind::ALL.len());
        let string = registry.primitive(PrimitiveKind::String);
        assert_eq!(registry.name(string), "string");
        assert_eq!(registry.lookup("i32"), Some(registry.primitive(PrimitiveKind::I32)));
        assert!(registry.get(string).expect("string").is_leaf());
    }

    #[test]
    fn test_duplicate_registration_rejected() {
        let mut registry = TypeRegistry::new();
        let i32_type = registry.primitive(PrimitiveKind::I32);
        ClassBuilder::new("Point")
            .member("x", i32_type)
            .register(&mut registry)
            .expect("first");
        let err = ClassBuilder::new("Point")
            .member("x", i32_type)
            .register(&mut registry)
            .unwrap_err();
        assert!(matches!(err, Error::DuplicateType(name) if name == "Point"));
    }

    #[test]
    fn test_declare_define_once() {
        let mut registry = TypeRegistry::new();
        let node = registry.declare("Node").expect("declare");
        assert!(matches!(registry.get(node), Err(Error::UndefinedType(_))));
        assert!(registry.validate().is_err());

        registry
            .define(node, TypeKind::Class(Default::default()))
            .expect("define");
        assert!(registry.validate().is_ok());
        assert!(registry
            .define(node, TypeKind::Class(Default::default()))
            .is_err());
    }

    #[test]
    fn test_unknown_member_fails_loudly() {
        let mut registry = TypeRegistry::new();
        let i32_type = registry.primitive(PrimitiveKind::I32);
        let point = ClassBuilder::new("Point")
            .member("x", i32_type)
            .register(&mut registry)
            .expect("point");
        assert_eq!(registry.member(point, "x").expect("x").0, 0);
        assert!(matches!(
            registry.member(point, "z"),
            Err(Error::UnknownMember { .. })
        ));
        assert!(matches!(
            registry.member(i32_type, "x"),
            Err(Error::KindMismatch { .. })
        ));
    }

    #[test]
    fn test_may_contain_reachability() {
        let mut registry = TypeRegistry::new();
        let i32_type = registry.primitive(PrimitiveKind::I32);
        let string = registry.primitive(PrimitiveKind::String);
        let leaf = ClassBuilder::new("Leaf")
            .member("value", i32_type)
            .register(&mut registry)
            .expect("leaf");
        let other = ClassBuilder::new("Other")
            .member("text", string)
            .register(&mut registry)
            .expect("other");
        let either = ChoiceBuilder::new("Either")
            .variant("leaf", leaf)
            .variant("other", other)
            .register(&mut registry)
            .expect("either");

        assert!(registry.may_contain(either, leaf));
        assert!(registry.may_contain(either, i32_type));
        assert!(!registry.may_contain(leaf, string));
        assert!(!registry.may_contain(other, leaf));
    }

    #[test]
    fn test_may_contain_recursive_and_untyped() {
        let mut registry = TypeRegistry::new();
        let i32_type = registry.primitive(PrimitiveKind::I32);
        let node = registry.declare("Node").expect("declare");
        let next = registry
            .register(TypeDescriptor::pointer("Node*", Some(node)))
            .expect("ptr");
        let any = registry
            .register(TypeDescriptor::pointer("Any*", None))
            .expect("any");
        registry
            .define(
                node,
                TypeDescriptor::class(
                    "Node",
                    vec![
                        MemberDescriptor::new("value", i32_type),
                        MemberDescriptor::new("next", next).optional(),
                    ],
                )
                .kind,
            )
            .expect("define");

        let string = registry.primitive(PrimitiveKind::String);
        assert!(registry.may_contain(node, node));
        assert!(!registry.may_contain(node, string));
        assert!(registry.may_contain(any, string));
    }

    #[test]
    fn test_size_of() {
        let mut registry = TypeRegistry::new();
        let i32_type = registry.primitive(PrimitiveKind::I32);
        let f64_type = registry.primitive(PrimitiveKind::F64);
        let string = registry.primitive(PrimitiveKind::String);
        let point = ClassBuilder::new("Point")
            .member("x", i32_type)
            .member("y", f64_type)
            .register(&mut registry)
            .expect("point");
        let label = ClassBuilder::new("Label")
            .member("text", string)
            .register(&mut registry)
            .expect("label");
        assert_eq!(registry.size_of(point), Some(12));
        assert_eq!(registry.size_of(label), None);
    }

    #[test]
    fn test_size_of_self_embedding_class() {
        let mut registry = TypeRegistry::new();
        let i32_type = registry.primitive(PrimitiveKind::I32);
        let outer = registry.declare("Outer").expect("declare");
        registry
            .define(
                outer,
                TypeDescriptor::class(
                    "Outer",
                    vec![
                        MemberDescriptor::new("value", i32_type),
                        MemberDescriptor::new("inner", outer).optional(),
                    ],
                )
                .kind,
            )
            .expect("define");
        let pair = ClassBuilder::new("Pair")
            .member("left", i32_type)
            .member("right", i32_type)
            .register(&mut registry)
            .expect("pair");
        let twice = ClassBuilder::new("Twice")
            .member("a", pair)
            .member("b", pair)
            .register(&mut registry)
            .expect("twice");

        assert!(registry.validate().is_ok());
        assert_eq!(registry.size_of(outer), None);
        assert_eq!(registry.size_of(twice), Some(16));
    }
}
