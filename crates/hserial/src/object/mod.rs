// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Object graphs described by runtime type information.
//!
//! Objects live in a [`Heap`] and are addressed by [`ObjectId`]. Each one
//! stores a [`Value`] matching the [`TypeKind`](crate::types::TypeKind) of
//! its type.
//!
//! # Example
//!
//! ```rust
//! use hserial::object::Heap;
//! use hserial::types::{ClassBuilder, PrimitiveKind, TypeRegistry};
//! use std::sync::Arc;
//!
//! let mut registry = TypeRegistry::new();
//! let point = ClassBuilder::new("Point")
//!     .primitive_member(&registry, "x", PrimitiveKind::I32)
//!     .primitive_member(&registry, "y", PrimitiveKind::I32)
//!     .register(&mut registry)
//!     .unwrap();
//!
//! let mut heap = Heap::new(Arc::new(registry));
//! let p = heap.create(point).unwrap();
//! heap.set_member_value(p, "x", 10i32).unwrap();
//! assert_eq!(heap.member_value(p, "x").unwrap().as_i64(), Some(10));
//! assert_eq!(heap.member(p, "y").unwrap(), None);
//! ```

mod compare;
mod handle;
mod heap;
mod value;

pub use compare::graph_eq;
pub use handle::{BeginInfo, ObjectHandle};
pub use heap::{Child, Heap, ObjectId, Slot, MAX_OBJECTS};
pub use value::{PrimitiveValue, Value};
