// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! XML reader rebuilding objects in a [`Heap`].

use crate::config::StreamConfig;
use crate::error::{Error, Result};
use crate::object::{Heap, ObjectId, PrimitiveValue};
use crate::stream::xml::{
    ANONYMOUS_MEMBER_TAG, ANONYMOUS_TYPE_TAG, ANONYMOUS_VARIANT_TAG, TRUNCATION_MARK,
};
use crate::stream::ReadRegistry;
use crate::types::{PrimitiveKind, TypeKind, TypeRef, TypeRegistry};
use base64::{engine::general_purpose, Engine as _};
use roxmltree::{Document, Node};
use std::fmt::Display;
use std::str::FromStr;
use std::sync::Arc;

/// Parses documents produced by [`XmlEncoder`](crate::stream::xml::XmlEncoder).
#[derive(Debug, Clone)]
pub struct XmlReader {
    max_depth: usize,
}

impl Default for XmlReader {
    fn default() -> Self {
        Self::new(&StreamConfig::default())
    }
}

impl XmlReader {
    pub fn new(config: &StreamConfig) -> Self {
        Self {
            max_depth: config.max_depth,
        }
    }

    /// Rebuild the document's root object in `heap`.
    pub fn read(&self, heap: &mut Heap, xml: &str) -> Result<ObjectId> {
        let doc = Document::parse(xml)
            .map_err(|e| Error::Parse(format!("Failed to parse XML: {}", e)))?;
        if doc
            .descendants()
            .any(|n| n.is_comment() && n.text().map(str::trim) == Some(TRUNCATION_MARK))
        {
            return Err(Error::Truncated);
        }

        let types = Arc::clone(heap.registry());
        let mut session = Session {
            heap,
            types: &types,
            objects: ReadRegistry::new(),
            max_depth: self.max_depth,
        };
        let root = doc.root_element();
        let type_ref = session.named_type(root)?;
        let id = session.heap.create(type_ref)?;
        session.objects.define(0, id)?;
        session.fill(root, id, type_ref)?;
        log::debug!(
            "[XmlReader] read {} with {} indexed object(s)",
            types.name(type_ref),
            session.objects.len()
        );
        Ok(id)
    }
}

/// One object waiting for its element to be read.
#[derive(Clone, Copy)]
struct Pending<'a, 'input> {
    node: Node<'a, 'input>,
    id: ObjectId,
    type_ref: TypeRef,
    depth: usize,
}

struct Session<'a> {
    heap: &'a mut Heap,
    types: &'a TypeRegistry,
    objects: ReadRegistry,
    max_depth: usize,
}

fn elements<'a, 'input>(node: Node<'a, 'input>) -> impl Iterator<Item = Node<'a, 'input>> {
    node.children().filter(Node::is_element)
}

/// Member or variant name carried by an element.
fn slot_name<'a>(node: Node<'a, '_>, fallback_tag: &str) -> &'a str {
    let tag = node.tag_name().name();
    if tag == fallback_tag {
        node.attribute("name").unwrap_or(tag)
    } else {
        tag
    }
}

fn parse_index(value: &str) -> Result<u32> {
    value
        .trim()
        .parse()
        .map_err(|_| Error::Parse(format!("invalid object index: {:?}", value)))
}

fn parse_number<T>(text: &str, kind: PrimitiveKind) -> Result<T>
where
    T: FromStr,
    T::Err: Display,
{
    text.trim()
        .parse()
        .map_err(|e| Error::Parse(format!("invalid {} {:?}: {}", kind.name(), text, e)))
}

fn decode_base64(text: &str) -> Result<Vec<u8>> {
    general_purpose::STANDARD
        .decode(text.trim())
        .map_err(|e| Error::Parse(format!("invalid base64: {}", e)))
}

fn parse_primitive(node: Node<'_, '_>, kind: PrimitiveKind) -> Result<PrimitiveValue> {
    let text = node.text().unwrap_or("");
    let base64 = node.attribute("encoding") == Some("base64");
    let string = || -> Result<String> {
        if base64 {
            Ok(String::from_utf8(decode_base64(text)?)?)
        } else {
            Ok(text.to_string())
        }
    };
    let value = match kind {
        PrimitiveKind::Bool => match text.trim() {
            "true" | "1" => PrimitiveValue::Bool(true),
            "false" | "0" => PrimitiveValue::Bool(false),
            other => return Err(Error::Parse(format!("invalid bool {:?}", other))),
        },
        PrimitiveKind::I8 => PrimitiveValue::I8(parse_number(text, kind)?),
        PrimitiveKind::I16 => PrimitiveValue::I16(parse_number(text, kind)?),
        PrimitiveKind::I32 => PrimitiveValue::I32(parse_number(text, kind)?),
        PrimitiveKind::I64 => PrimitiveValue::I64(parse_number(text, kind)?),
        PrimitiveKind::U8 => PrimitiveValue::U8(parse_number(text, kind)?),
        PrimitiveKind::U16 => PrimitiveValue::U16(parse_number(text, kind)?),
        PrimitiveKind::U32 => PrimitiveValue::U32(parse_number(text, kind)?),
        PrimitiveKind::U64 => PrimitiveValue::U64(parse_number(text, kind)?),
        PrimitiveKind::F32 => PrimitiveValue::F32(parse_number(text, kind)?),
        PrimitiveKind::F64 => PrimitiveValue::F64(parse_number(text, kind)?),
        PrimitiveKind::Char => {
            let s = string()?;
            let mut chars = s.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => PrimitiveValue::Char(c),
                _ => return Err(Error::Parse(format!("invalid char {:?}", s))),
            }
        }
        PrimitiveKind::String => PrimitiveValue::String(string()?),
        PrimitiveKind::Bytes => PrimitiveValue::Bytes(decode_base64(text)?),
    };
    Ok(value)
}

impl Session<'_> {
    /// Type spelled by an object element: its tag, or the `type`
    /// attribute of an anonymous element.
    fn named_type(&self, node: Node<'_, '_>) -> Result<TypeRef> {
        let tag = node.tag_name().name();
        let name = if tag == ANONYMOUS_TYPE_TAG {
            node.attribute("type").unwrap_or(tag)
        } else {
            tag
        };
        self.types.type_info(name)
    }

    /// Fill the freshly created object `id` of type `type_ref` from `node`,
    /// then every object nested below it.
    ///
    /// Nested elements are queued on an explicit stack in document order,
    /// so deep documents cost heap memory rather than call stack.
    fn fill(&mut self, node: Node<'_, '_>, id: ObjectId, type_ref: TypeRef) -> Result<()> {
        let mut pending = vec![Pending {
            node,
            id,
            type_ref,
            depth: 0,
        }];
        while let Some(item) = pending.pop() {
            let first = pending.len();
            self.fill_one(item, &mut pending)?;
            // Children were queued in document order; pop the first one next.
            pending[first..].reverse();
        }
        Ok(())
    }

    fn fill_one<'a, 'input>(
        &mut self,
        item: Pending<'a, 'input>,
        pending: &mut Vec<Pending<'a, 'input>>,
    ) -> Result<()> {
        let Pending {
            node,
            id,
            type_ref,
            depth,
        } = item;
        if depth > self.max_depth {
            return Err(Error::DepthLimit(self.max_depth));
        }
        let types = self.types;
        let descriptor = types.get(type_ref)?;
        match &descriptor.kind {
            TypeKind::Primitive(kind) => {
                let value = parse_primitive(node, *kind)?;
                self.heap.set_primitive(id, value)?;
            }
            TypeKind::Enum(e) => {
                let text = node.text().unwrap_or("").trim();
                let value = match e.variant(text) {
                    Some(variant) => variant.value,
                    None => text.parse().map_err(|_| Error::UnknownVariant {
                        type_name: descriptor.name.clone(),
                        variant: text.to_string(),
                    })?,
                };
                self.heap.set_enum_value(id, value)?;
            }
            TypeKind::Class(_) => {
                for child in elements(node) {
                    let (index, member) =
                        types.member(type_ref, slot_name(child, ANONYMOUS_MEMBER_TAG))?;
                    let value = self.heap.create(member.type_ref)?;
                    self.heap.set_member_at(id, index, value)?;
                    pending.push(Pending {
                        node: child,
                        id: value,
                        type_ref: member.type_ref,
                        depth: depth + 1,
                    });
                }
            }
            TypeKind::Choice(_) => {
                let mut children = elements(node);
                if let Some(child) = children.next() {
                    let (index, variant) =
                        types.variant(type_ref, slot_name(child, ANONYMOUS_VARIANT_TAG))?;
                    let value = self.heap.create(variant.type_ref)?;
                    self.heap.select_variant_at(id, index, value)?;
                    pending.push(Pending {
                        node: child,
                        id: value,
                        type_ref: variant.type_ref,
                        depth: depth + 1,
                    });
                }
                if let Some(extra) = children.next() {
                    return Err(Error::UnexpectedElement {
                        expected: format!("end of {}", descriptor.name),
                        found: extra.tag_name().name().to_string(),
                    });
                }
            }
            TypeKind::Container(container) => {
                for child in elements(node) {
                    let value = self.heap.create(container.element)?;
                    self.heap.push_element(id, value)?;
                    pending.push(Pending {
                        node: child,
                        id: value,
                        type_ref: container.element,
                        depth: depth + 1,
                    });
                }
            }
            TypeKind::Pointer(_) => {
                if let Some(child) = elements(node).next() {
                    if let Some(target) = self.read_pointee(child, id)? {
                        pending.push(Pending {
                            node: child,
                            id: target.0,
                            type_ref: target.1,
                            depth: depth + 1,
                        });
                    }
                }
            }
        }
        Ok(())
    }

    /// Resolve a back-reference, or create and index the pointee whose
    /// contents are still to be read.
    fn read_pointee(
        &mut self,
        node: Node<'_, '_>,
        pointer: ObjectId,
    ) -> Result<Option<(ObjectId, TypeRef)>> {
        if let Some(reference) = node.attribute("ref") {
            let target = self.objects.resolve(parse_index(reference)?)?;
            self.heap.set_pointer(pointer, Some(target))?;
            return Ok(None);
        }
        let index = node.attribute("id").ok_or_else(|| Error::UnexpectedElement {
            expected: "object with id or ref".to_string(),
            found: node.tag_name().name().to_string(),
        })?;
        let type_ref = self.named_type(node)?;
        let target = self.heap.create(type_ref)?;
        self.objects.define(parse_index(index)?, target)?;
        self.heap.set_pointer(pointer, Some(target))?;
        Ok(Some((target, type_ref)))
    }
}
