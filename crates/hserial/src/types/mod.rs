// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Runtime type information.
//!
//! Every serializable type is described by a [`TypeDescriptor`] registered
//! in a [`TypeRegistry`]. The traversal and streaming engines never look at
//! Rust types: they only follow descriptors.
//!
//! # Example
//!
//! ```rust
//! use hserial::types::{ClassBuilder, PrimitiveKind, TypeRegistry};
//!
//! let mut registry = TypeRegistry::new();
//! let reading = ClassBuilder::new("SensorReading")
//!     .primitive_member(&registry, "sensor_id", PrimitiveKind::U32)
//!     .primitive_member(&registry, "temperature", PrimitiveKind::F64)
//!     .register(&mut registry)
//!     .unwrap();
//!
//! assert_eq!(registry.get(reading).unwrap().members().unwrap().len(), 2);
//! ```

mod builder;
mod descriptor;
mod registry;

pub use builder::{
    register_pointer, register_sequence, register_set, ChoiceBuilder, ClassBuilder, EnumBuilder,
};
pub use descriptor::{
    ChoiceDescriptor, ClassDescriptor, ContainerDescriptor, ContainerOrdering, EnumDescriptor,
    EnumVariant, MemberDescriptor, PointerDescriptor, PrimitiveKind, TypeDescriptor, TypeKind,
    VariantDescriptor,
};
pub use registry::{TypeRef, TypeRegistry};
