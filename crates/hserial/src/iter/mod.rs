// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Generic depth-first traversal of object graphs.
//!
//! The walk follows the type descriptors only: class members in declaration
//! order, container elements in stored order, the selected variant of a
//! choice and the target of a non-null pointer. Filters decide which nodes
//! are yielded ([`NodeFilter::can_select`]) and which subtrees are worth
//! entering ([`NodeFilter::can_enter`]).
//!
//! Traversals started with [`Heap::begin_detect_loops`](crate::object::Heap::begin_detect_loops)
//! remember every visited address and silently skip repeats, so cyclic
//! graphs terminate.
//!
//! # Example
//!
//! ```rust
//! use hserial::iter::TypeIter;
//! use hserial::object::Heap;
//! use hserial::types::{register_sequence, PrimitiveKind, TypeRegistry};
//! use std::sync::Arc;
//!
//! let mut registry = TypeRegistry::new();
//! let text = registry.primitive(PrimitiveKind::String);
//! let names = register_sequence(&mut registry, "Names", text).unwrap();
//!
//! let mut heap = Heap::new(Arc::new(registry));
//! let list = heap.create(names).unwrap();
//! for name in ["ada", "grace"] {
//!     let item = heap.new_primitive(name).unwrap();
//!     heap.push_element(list, item).unwrap();
//! }
//!
//! let found: Vec<_> = TypeIter::of_type(&heap, heap.begin(list).unwrap(), text)
//!     .unwrap()
//!     .map(|node| heap.primitive(node.unwrap().id()).unwrap().clone())
//!     .collect();
//! assert_eq!(found.len(), 2);
//! ```

mod filter;
mod tree;
mod walk;

pub use filter::{AnyNode, NodeFilter, TypeFilter, TypesFilter};
pub use tree::{TreeIter, TreeIterMut, TypeIter, TypesIter};
