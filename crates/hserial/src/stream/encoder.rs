// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Structural hooks implemented by every output format.

use crate::error::Result;
use crate::object::PrimitiveValue;
use crate::types::{MemberDescriptor, TypeDescriptor, VariantDescriptor};

/// Format encoder driven by [`ObjectWriter`](crate::stream::ObjectWriter).
///
/// The writer calls these hooks in a fixed order and nesting, whatever the
/// output syntax:
///
/// ```text
/// root      := begin_named_type(name, None) value end_named_type
/// value     := primitive | enum | class | choice | container | pointer
/// class     := begin_class member* end_class
/// member    := begin_class_member value end_class_member | skip_class_member
/// choice    := begin_choice_variant value end_choice_variant | write_empty_choice
/// container := begin_container (begin_container_element value end_container_element)* end_container
/// pointer   := write_null_pointer
///            | write_object_reference
///            | begin_named_type(name, Some(index)) value end_named_type
/// ```
pub trait ObjectEncoder {
    /// Open an object whose type must be spelled out: the root, or the
    /// first occurrence of a pointer target (`index` is then its stream
    /// index).
    fn begin_named_type(&mut self, type_name: &str, index: Option<u32>) -> Result<()>;
    fn end_named_type(&mut self) -> Result<()>;

    fn begin_class(&mut self, class: &TypeDescriptor) -> Result<()>;
    fn end_class(&mut self) -> Result<()>;

    fn begin_class_member(&mut self, member: &MemberDescriptor, index: usize) -> Result<()>;
    fn end_class_member(&mut self) -> Result<()>;

    /// Member left out of the output (not set).
    fn skip_class_member(&mut self, _member: &MemberDescriptor, _index: usize) -> Result<()> {
        Ok(())
    }

    fn begin_container(&mut self, container: &TypeDescriptor, len: usize) -> Result<()>;
    fn begin_container_element(&mut self, element: &TypeDescriptor) -> Result<()>;
    fn end_container_element(&mut self) -> Result<()>;
    fn end_container(&mut self) -> Result<()>;

    fn begin_choice_variant(&mut self, variant: &VariantDescriptor, index: usize) -> Result<()>;
    fn end_choice_variant(&mut self) -> Result<()>;
    fn write_empty_choice(&mut self) -> Result<()>;

    fn write_primitive(&mut self, value: &PrimitiveValue) -> Result<()>;
    /// Enumerator value with its name, if it has one.
    fn write_enum(&mut self, value: i64, name: Option<&str>) -> Result<()>;

    /// Back-reference to an object already opened with
    /// [`begin_named_type`](Self::begin_named_type).
    fn write_object_reference(&mut self, type_name: &str, index: u32) -> Result<()>;
    fn write_null_pointer(&mut self) -> Result<()>;

    /// Called once when writing stops on an error, before the error is
    /// returned. Formats that can mark the output as incomplete do it here.
    fn unwind(&mut self) {}

    /// Called once after the root was written successfully.
    fn finish(&mut self) -> Result<()>;
}
