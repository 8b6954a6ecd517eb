// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! XML encoder.

use crate::config::StreamConfig;
use crate::error::Result;
use crate::object::PrimitiveValue;
use crate::stream::xml::escape::{escape, escape_attribute, is_xml_name, is_xml_text};
use crate::stream::xml::{
    ANONYMOUS_MEMBER_TAG, ANONYMOUS_TYPE_TAG, ANONYMOUS_VARIANT_TAG, TRUNCATION_MARK,
};
use crate::stream::ObjectEncoder;
use crate::types::{MemberDescriptor, TypeDescriptor, VariantDescriptor};
use base64::{engine::general_purpose, Engine as _};
use std::io::Write;

#[derive(Debug)]
struct OpenTag {
    name: String,
    has_children: bool,
}

/// Writes objects as XML to any [`Write`] sink.
///
/// Start tags stay open until their first content arrives, so empty
/// elements collapse to `<tag/>` and primitives can still add an
/// `encoding` attribute.
#[derive(Debug)]
pub struct XmlEncoder<W: Write> {
    sink: W,
    indent: usize,
    xml_declaration: bool,
    element_tag: String,
    open: Vec<OpenTag>,
    start_pending: bool,
    at_start: bool,
}

impl<W: Write> XmlEncoder<W> {
    pub fn new(sink: W, config: &StreamConfig) -> Self {
        Self {
            sink,
            indent: config.indent,
            xml_declaration: config.xml_declaration,
            element_tag: config.element_tag.clone(),
            open: Vec::new(),
            start_pending: false,
            at_start: true,
        }
    }

    pub fn into_inner(self) -> W {
        self.sink
    }

    /// Nesting depth of the element being written.
    pub fn depth(&self) -> usize {
        self.open.len()
    }

    fn close_pending(&mut self) -> std::io::Result<()> {
        if self.start_pending {
            self.start_pending = false;
            self.sink.write_all(b">")?;
        }
        Ok(())
    }

    fn newline(&mut self, depth: usize) -> std::io::Result<()> {
        if self.indent > 0 {
            write!(self.sink, "\n{:width$}", "", width = self.indent * depth)?;
        }
        Ok(())
    }

    fn start_element(&mut self, name: &str, attributes: &[(&str, &str)]) -> std::io::Result<()> {
        if self.at_start {
            self.at_start = false;
            if self.xml_declaration {
                self.sink
                    .write_all(br#"<?xml version="1.0" encoding="UTF-8"?>"#)?;
                self.newline(0)?;
            }
        } else {
            self.close_pending()?;
            self.newline(self.open.len())?;
        }
        if let Some(parent) = self.open.last_mut() {
            parent.has_children = true;
        }
        write!(self.sink, "<{}", name)?;
        for (key, value) in attributes {
            write!(self.sink, " {}=\"{}\"", key, escape_attribute(value))?;
        }
        self.start_pending = true;
        self.open.push(OpenTag {
            name: name.to_string(),
            has_children: false,
        });
        Ok(())
    }

    fn end_element(&mut self) -> std::io::Result<()> {
        let Some(tag) = self.open.pop() else {
            return Ok(());
        };
        if self.start_pending {
            self.start_pending = false;
            return self.sink.write_all(b"/>");
        }
        if tag.has_children {
            self.newline(self.open.len())?;
        }
        write!(self.sink, "</{}>", tag.name)
    }

    fn attribute(&mut self, key: &str, value: &str) -> std::io::Result<()> {
        if self.start_pending {
            write!(self.sink, " {}=\"{}\"", key, escape_attribute(value))?;
        }
        Ok(())
    }

    fn text(&mut self, text: &str) -> std::io::Result<()> {
        self.close_pending()?;
        self.sink.write_all(escape(text).as_bytes())
    }

    fn binary_text(&mut self, bytes: &[u8]) -> std::io::Result<()> {
        self.attribute("encoding", "base64")?;
        self.close_pending()?;
        self.sink
            .write_all(general_purpose::STANDARD.encode(bytes).as_bytes())
    }

    fn string_text(&mut self, text: &str) -> std::io::Result<()> {
        if is_xml_text(text) {
            self.text(text)
        } else {
            self.binary_text(text.as_bytes())
        }
    }

    /// Open the element naming a type, with `extra` attributes.
    fn start_typed(&mut self, type_name: &str, extra: Option<(&str, &str)>) -> std::io::Result<()> {
        let mut attributes = Vec::with_capacity(2);
        let tag = if is_xml_name(type_name) {
            type_name
        } else {
            attributes.push(("type", type_name));
            ANONYMOUS_TYPE_TAG
        };
        attributes.extend(extra);
        self.start_element(tag, &attributes)
    }

    fn start_named(&mut self, name: &str, fallback: &str) -> std::io::Result<()> {
        if is_xml_name(name) {
            self.start_element(name, &[])
        } else {
            self.start_element(fallback, &[("name", name)])
        }
    }
}

impl<W: Write> ObjectEncoder for XmlEncoder<W> {
    fn begin_named_type(&mut self, type_name: &str, index: Option<u32>) -> Result<()> {
        let index = index.map(|i| i.to_string());
        self.start_typed(type_name, index.as_deref().map(|i| ("id", i)))?;
        Ok(())
    }

    fn end_named_type(&mut self) -> Result<()> {
        Ok(self.end_element()?)
    }

    fn begin_class(&mut self, _class: &TypeDescriptor) -> Result<()> {
        Ok(())
    }

    fn end_class(&mut self) -> Result<()> {
        Ok(())
    }

    fn begin_class_member(&mut self, member: &MemberDescriptor, _index: usize) -> Result<()> {
        Ok(self.start_named(&member.name, ANONYMOUS_MEMBER_TAG)?)
    }

    fn end_class_member(&mut self) -> Result<()> {
        Ok(self.end_element()?)
    }

    fn begin_container(&mut self, _container: &TypeDescriptor, _len: usize) -> Result<()> {
        Ok(())
    }

    fn begin_container_element(&mut self, element: &TypeDescriptor) -> Result<()> {
        let tag = if is_xml_name(&element.name) {
            element.name.clone()
        } else {
            self.element_tag.clone()
        };
        Ok(self.start_element(&tag, &[])?)
    }

    fn end_container_element(&mut self) -> Result<()> {
        Ok(self.end_element()?)
    }

    fn end_container(&mut self) -> Result<()> {
        Ok(())
    }

    fn begin_choice_variant(&mut self, variant: &VariantDescriptor, _index: usize) -> Result<()> {
        Ok(self.start_named(&variant.name, ANONYMOUS_VARIANT_TAG)?)
    }

    fn end_choice_variant(&mut self) -> Result<()> {
        Ok(self.end_element()?)
    }

    fn write_empty_choice(&mut self) -> Result<()> {
        Ok(())
    }

    fn write_primitive(&mut self, value: &PrimitiveValue) -> Result<()> {
        match value {
            PrimitiveValue::Bool(v) => self.text(&v.to_string())?,
            PrimitiveValue::I8(v) => self.text(&v.to_string())?,
            PrimitiveValue::I16(v) => self.text(&v.to_string())?,
            PrimitiveValue::I32(v) => self.text(&v.to_string())?,
            PrimitiveValue::I64(v) => self.text(&v.to_string())?,
            PrimitiveValue::U8(v) => self.text(&v.to_string())?,
            PrimitiveValue::U16(v) => self.text(&v.to_string())?,
            PrimitiveValue::U32(v) => self.text(&v.to_string())?,
            PrimitiveValue::U64(v) => self.text(&v.to_string())?,
            PrimitiveValue::F32(v) => self.text(&v.to_string())?,
            PrimitiveValue::F64(v) => self.text(&v.to_string())?,
            PrimitiveValue::Char(c) => self.string_text(c.encode_utf8(&mut [0; 4]))?,
            PrimitiveValue::String(s) => self.string_text(s)?,
            PrimitiveValue::Bytes(b) => self.binary_text(b)?,
        }
        Ok(())
    }

    fn write_enum(&mut self, value: i64, name: Option<&str>) -> Result<()> {
        match name {
            Some(name) => self.text(name)?,
            None => self.text(&value.to_string())?,
        }
        Ok(())
    }

    fn write_object_reference(&mut self, type_name: &str, index: u32) -> Result<()> {
        let index = index.to_string();
        self.start_typed(type_name, Some(("ref", &index)))?;
        Ok(self.end_element()?)
    }

    fn write_null_pointer(&mut self) -> Result<()> {
        Ok(())
    }

    fn unwind(&mut self) {
        let result = (|| -> std::io::Result<()> {
            self.close_pending()?;
            write!(self.sink, "<!-- {} -->", TRUNCATION_MARK)?;
            while !self.open.is_empty() {
                self.end_element()?;
            }
            self.sink.flush()
        })();
        if let Err(e) = result {
            log::warn!("[XmlEncoder] could not close truncated output: {}", e);
        }
    }

    fn finish(&mut self) -> Result<()> {
        while !self.open.is_empty() {
            self.end_element()?;
        }
        if self.indent > 0 {
            self.sink.write_all(b"\n")?;
        }
        self.sink.flush()?;
        Ok(())
    }
}
