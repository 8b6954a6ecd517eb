// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! # hserial - type-descriptor-driven object graph traversal and streaming
//!
//! Data structures are described at runtime by type descriptors (classes,
//! choices, containers, pointers, primitives). A single generic engine then
//! walks, filters, edits and serializes any object graph built from those
//! descriptors, without per-type code.
//!
//! ## Quick Start
//!
//! ```rust
//! use hserial::iter::TypeIter;
//! use hserial::object::Heap;
//! use hserial::stream::to_xml_string;
//! use hserial::types::{register_sequence, ClassBuilder, PrimitiveKind, TypeRegistry};
//! use std::sync::Arc;
//!
//! fn main() -> hserial::Result<()> {
//!     // Describe the schema once, at startup
//!     let mut registry = TypeRegistry::new();
//!     let reading = ClassBuilder::new("Reading")
//!         .primitive_member(&registry, "sensor", PrimitiveKind::String)
//!         .primitive_member(&registry, "celsius", PrimitiveKind::F64)
//!         .register(&mut registry)?;
//!     let batch = register_sequence(&mut registry, "Batch", reading)?;
//!     let registry = Arc::new(registry);
//!
//!     // Build an object graph
//!     let mut heap = Heap::new(registry.clone());
//!     let root = heap.create(batch)?;
//!     for (sensor, celsius) in [("north", 21.5f64), ("south", 19.0)] {
//!         let r = heap.create(reading)?;
//!         heap.set_member_value(r, "sensor", sensor)?;
//!         heap.set_member_value(r, "celsius", celsius)?;
//!         heap.push_element(root, r)?;
//!     }
//!
//!     // Visit every f64 in declaration order
//!     let f64_type = registry.primitive(PrimitiveKind::F64);
//!     let mut total = 0.0;
//!     for node in TypeIter::of_type(&heap, heap.begin(root)?, f64_type)? {
//!         total += heap.primitive(node?.id())?.as_f64().unwrap_or(0.0);
//!     }
//!     assert_eq!(total, 40.5);
//!
//!     // Stream it
//!     let xml = to_xml_string(&heap, root)?;
//!     assert!(xml.contains("<celsius>21.5</celsius>"));
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! +---------------------------------------------------------------------+
//! |                         stream                                      |
//! |   ObjectWriter -> ObjectEncoder (XML | binary) | ObjectRegistry     |
//! +---------------------------------------------------------------------+
//! |                         iter                                        |
//! |   TreeIter / TreeIterMut | NodeFilter (any, by type, by type set)  |
//! +---------------------------------------------------------------------+
//! |                         object                                      |
//! |   Heap (arena of typed objects) | ObjectHandle | BeginInfo         |
//! +---------------------------------------------------------------------+
//! |                         types                                       |
//! |   TypeRegistry | TypeDescriptor | builders                         |
//! +---------------------------------------------------------------------+
//! ```
//!
//! ## Modules Overview
//!
//! - [`types`] - Runtime type descriptors and their registry
//! - [`object`] - Object heap, values and handles
//! - [`iter`] - Depth-first traversal with filters, subtree skipping and erase
//! - [`stream`] - Serialization hooks, object registry, XML and binary formats
//! - [`config`] - Stream configuration (optionally loaded from YAML)

/// Stream configuration (indentation, verification, limits).
pub mod config;
/// Crate-wide error type.
pub mod error;
/// Generic depth-first traversal of object graphs.
pub mod iter;
/// Object heap, values and handles.
pub mod object;
/// Serialization to and from external formats.
pub mod stream;
/// Runtime type descriptors and registry.
pub mod types;

pub use config::{StreamConfig, VerifyData};
pub use error::{Error, Result};
pub use iter::{TreeIter, TreeIterMut, TypeIter, TypesIter};
pub use object::{BeginInfo, Heap, ObjectHandle, ObjectId};
pub use types::{TypeDescriptor, TypeRef, TypeRegistry};
