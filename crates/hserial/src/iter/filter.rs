// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Node filters deciding what a traversal yields and where it descends.

use crate::object::{Heap, ObjectHandle};
use crate::types::{TypeRef, TypeRegistry};
use std::collections::HashMap;

/// Selection and pruning predicates of a tree walk.
pub trait NodeFilter {
    /// Whether the walk stops on this node and yields it.
    fn can_select(&mut self, heap: &Heap, node: ObjectHandle) -> bool;

    /// Whether the walk descends into a node whose slot declares `declared`.
    ///
    /// Returning `false` prunes the whole subtree. Only used as an
    /// optimization: a filter must never prune a subtree holding a node it
    /// would select.
    fn can_enter(&mut self, registry: &TypeRegistry, declared: TypeRef) -> bool;
}

/// Yields every node.
#[derive(Debug, Clone, Copy, Default)]
pub struct AnyNode;

impl NodeFilter for AnyNode {
    fn can_select(&mut self, _heap: &Heap, _node: ObjectHandle) -> bool {
        true
    }

    fn can_enter(&mut self, _registry: &TypeRegistry, _declared: TypeRef) -> bool {
        true
    }
}

/// Yields nodes of exactly one runtime type.
#[derive(Debug, Clone)]
pub struct TypeFilter {
    target: TypeRef,
    reachable: HashMap<TypeRef, bool>,
}

impl TypeFilter {
    pub fn new(target: TypeRef) -> Self {
        Self {
            target,
            reachable: HashMap::new(),
        }
    }

    /// Requested type.
    pub fn target(&self) -> TypeRef {
        self.target
    }
}

impl NodeFilter for TypeFilter {
    fn can_select(&mut self, _heap: &Heap, node: ObjectHandle) -> bool {
        node.type_ref() == self.target
    }

    fn can_enter(&mut self, registry: &TypeRegistry, declared: TypeRef) -> bool {
        let target = self.target;
        *self
            .reachable
            .entry(declared)
            .or_insert_with(|| registry.may_contain(declared, target))
    }
}

/// Yields nodes whose runtime type is one of several types.
#[derive(Debug, Clone)]
pub struct TypesFilter {
    targets: Vec<TypeRef>,
    matched: Option<TypeRef>,
    reachable: HashMap<TypeRef, bool>,
}

impl TypesFilter {
    pub fn new(targets: impl IntoIterator<Item = TypeRef>) -> Self {
        Self {
            targets: targets.into_iter().collect(),
            matched: None,
            reachable: HashMap::new(),
        }
    }

    /// Requested types.
    pub fn targets(&self) -> &[TypeRef] {
        &self.targets
    }

    /// Type that matched the last selected node.
    pub fn matched_type(&self) -> Option<TypeRef> {
        self.matched
    }
}

impl NodeFilter for TypesFilter {
    fn can_select(&mut self, _heap: &Heap, node: ObjectHandle) -> bool {
        let found = self.targets.iter().copied().find(|t| *t == node.type_ref());
        if found.is_some() {
            self.matched = found;
        }
        found.is_some()
    }

    fn can_enter(&mut self, registry: &TypeRegistry, declared: TypeRef) -> bool {
        let targets = &self.targets;
        *self.reachable.entry(declared).or_insert_with(|| {
            targets
                .iter()
                .any(|target| registry.may_contain(declared, *target))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ClassBuilder, PrimitiveKind};

    #[test]
    fn test_type_filter_pruning_is_memoised() {
        let mut registry = TypeRegistry::new();
        let string = registry.primitive(PrimitiveKind::String);
        let i32_type = registry.primitive(PrimitiveKind::I32);
        let named = ClassBuilder::new("Named")
            .member("name", string)
            .register(&mut registry)
            .expect("named");

        let mut filter = TypeFilter::new(i32_type);
        assert!(!filter.can_enter(&registry, named));
        assert!(!filter.can_enter(&registry, named));
        assert_eq!(filter.reachable.len(), 1);

        let mut filter = TypeFilter::new(string);
        assert!(filter.can_enter(&registry, named));
    }

    #[test]
    fn test_types_filter_reports_match() {
        let registry = std::sync::Arc::new(TypeRegistry::new());
        let mut heap = Heap::new(registry.clone());
        let number = heap.new_primitive(5u16).expect("number");
        let text = heap.new_primitive("five").expect("text");
        let u16_type = registry.primitive(PrimitiveKind::U16);
        let string = registry.primitive(PrimitiveKind::String);

        let mut filter = TypesFilter::new([u16_type, string]);
        assert!(filter.can_select(&heap, heap.handle(text).expect("handle")));
        assert_eq!(filter.matched_type(), Some(string));
        assert!(filter.can_select(&heap, heap.handle(number).expect("handle")));
        assert_eq!(filter.matched_type(), Some(u16_type));
    }
}
