// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Binary encoder.

use crate::error::Result;
use crate::object::PrimitiveValue;
use crate::stream::binary::{
    EMPTY_CLASS, MEMBER_ABSENT, MEMBER_PRESENT, NO_VARIANT, TAG_NEW, TAG_NULL, TAG_REF,
};
use crate::stream::ObjectEncoder;
use crate::types::{MemberDescriptor, TypeDescriptor, VariantDescriptor};

/// Little-endian, naturally aligned encoding into a byte buffer.
#[derive(Debug, Default)]
pub struct BinaryEncoder {
    buffer: Vec<u8>,
}

impl BinaryEncoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buffer
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    fn align(&mut self, alignment: usize) {
        let padding = (alignment - (self.buffer.len() % alignment)) % alignment;
        self.buffer.extend(std::iter::repeat(0).take(padding));
    }

    fn put_u32(&mut self, value: u32) {
        self.align(4);
        self.buffer.extend(&value.to_le_bytes());
    }

    fn put_bytes(&mut self, bytes: &[u8]) {
        self.put_u32(bytes.len() as u32);
        self.buffer.extend(bytes);
    }

    fn put_string(&mut self, s: &str) {
        // Length includes null terminator
        self.put_u32((s.len() + 1) as u32);
        self.buffer.extend(s.as_bytes());
        self.buffer.push(0);
    }
}

impl ObjectEncoder for BinaryEncoder {
    fn begin_named_type(&mut self, type_name: &str, index: Option<u32>) -> Result<()> {
        if index.is_some() {
            self.buffer.push(TAG_NEW);
        }
        self.put_string(type_name);
        Ok(())
    }

    fn end_named_type(&mut self) -> Result<()> {
        Ok(())
    }

    fn begin_class(&mut self, class: &TypeDescriptor) -> Result<()> {
        // Every value takes at least one byte, so element counts stay
        // bounded by the input length.
        if class.members().map_or(true, <[_]>::is_empty) {
            self.buffer.push(EMPTY_CLASS);
        }
        Ok(())
    }

    fn end_class(&mut self) -> Result<()> {
        Ok(())
    }

    fn begin_class_member(&mut self, _member: &MemberDescriptor, _index: usize) -> Result<()> {
        self.buffer.push(MEMBER_PRESENT);
        Ok(())
    }

    fn end_class_member(&mut self) -> Result<()> {
        Ok(())
    }

    fn skip_class_member(&mut self, _member: &MemberDescriptor, _index: usize) -> Result<()> {
        self.buffer.push(MEMBER_ABSENT);
        Ok(())
    }

    fn begin_container(&mut self, _container: &TypeDescriptor, len: usize) -> Result<()> {
        self.put_u32(len as u32);
        Ok(())
    }

    fn begin_container_element(&mut self, _element: &TypeDescriptor) -> Result<()> {
        Ok(())
    }

    fn end_container_element(&mut self) -> Result<()> {
        Ok(())
    }

    fn end_container(&mut self) -> Result<()> {
        Ok(())
    }

    fn begin_choice_variant(&mut self, _variant: &VariantDescriptor, index: usize) -> Result<()> {
        self.align(4);
        self.buffer.extend(&(index as i32).to_le_bytes());
        Ok(())
    }

    fn end_choice_variant(&mut self) -> Result<()> {
        Ok(())
    }

    fn write_empty_choice(&mut self) -> Result<()> {
        self.align(4);
        self.buffer.extend(&NO_VARIANT.to_le_bytes());
        Ok(())
    }

    fn write_primitive(&mut self, value: &PrimitiveValue) -> Result<()> {
        self.align(value.kind().alignment());
        match value {
            PrimitiveValue::Bool(v) => self.buffer.push(u8::from(*v)),
            PrimitiveValue::I8(v) => self.buffer.push(*v as u8),
            PrimitiveValue::I16(v) => self.buffer.extend(&v.to_le_bytes()),
            PrimitiveValue::I32(v) => self.buffer.extend(&v.to_le_bytes()),
            PrimitiveValue::I64(v) => self.buffer.extend(&v.to_le_bytes()),
            PrimitiveValue::U8(v) => self.buffer.push(*v),
            PrimitiveValue::U16(v) => self.buffer.extend(&v.to_le_bytes()),
            PrimitiveValue::U32(v) => self.buffer.extend(&v.to_le_bytes()),
            PrimitiveValue::U64(v) => self.buffer.extend(&v.to_le_bytes()),
            PrimitiveValue::F32(v) => self.buffer.extend(&v.to_le_bytes()),
            PrimitiveValue::F64(v) => self.buffer.extend(&v.to_le_bytes()),
            PrimitiveValue::Char(c) => self.buffer.extend(&u32::from(*c).to_le_bytes()),
            PrimitiveValue::String(s) => self.put_string(s),
            PrimitiveValue::Bytes(b) => self.put_bytes(b),
        }
        Ok(())
    }

    fn write_enum(&mut self, value: i64, _name: Option<&str>) -> Result<()> {
        self.align(8);
        self.buffer.extend(&value.to_le_bytes());
        Ok(())
    }

    fn write_object_reference(&mut self, _type_name: &str, index: u32) -> Result<()> {
        self.buffer.push(TAG_REF);
        self.put_u32(index);
        Ok(())
    }

    fn write_null_pointer(&mut self) -> Result<()> {
        self.buffer.push(TAG_NULL);
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        Ok(())
    }
}
