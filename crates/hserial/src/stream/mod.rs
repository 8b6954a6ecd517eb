// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Streaming object graphs to and from external formats.
//!
//! [`ObjectWriter`] walks a graph in declaration order and drives an
//! [`ObjectEncoder`] through a fixed vocabulary of structural hooks. Each
//! format only decides how those hooks look on the wire:
//!
//! - [`xml`]: human-readable XML, read back with `roxmltree`;
//! - [`binary`]: compact little-endian encoding.
//!
//! Objects reached through pointers are numbered by an [`ObjectRegistry`]
//! (the root is 0). The first occurrence carries the full value, later
//! occurrences only a back-reference, so shared and cyclic graphs survive a
//! round trip.
//!
//! # Example
//!
//! ```rust
//! use hserial::object::{graph_eq, Heap};
//! use hserial::stream::{from_xml_str, to_xml_string};
//! use hserial::types::{ClassBuilder, PrimitiveKind, TypeRegistry};
//! use std::sync::Arc;
//!
//! let mut registry = TypeRegistry::new();
//! let point = ClassBuilder::new("Point")
//!     .primitive_member(&registry, "x", PrimitiveKind::I32)
//!     .primitive_member(&registry, "y", PrimitiveKind::I32)
//!     .register(&mut registry)
//!     .unwrap();
//! let registry = Arc::new(registry);
//!
//! let mut heap = Heap::new(registry.clone());
//! let p = heap.create(point).unwrap();
//! heap.set_member_value(p, "x", 1i32).unwrap();
//! heap.set_member_value(p, "y", -2i32).unwrap();
//!
//! let xml = to_xml_string(&heap, p).unwrap();
//! assert!(xml.contains("<y>-2</y>"));
//!
//! let mut copy = Heap::new(registry);
//! let q = from_xml_str(&mut copy, &xml).unwrap();
//! assert!(graph_eq(&heap, p, &copy, q).unwrap());
//! ```

pub mod binary;
mod encoder;
mod registry;
mod writer;
pub mod xml;

pub use binary::{from_binary, to_binary, BinaryDecoder, BinaryEncoder};
pub use encoder::ObjectEncoder;
pub use registry::{ObjectEntry, ObjectRegistry, ReadRegistry};
pub use writer::ObjectWriter;
pub use xml::{from_xml_str, to_xml_string, write_xml, XmlEncoder, XmlReader};
