// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Binary decoder.

use crate::config::{StreamConfig, DEFAULT_MAX_DEPTH};
use crate::error::{Error, Result};
use crate::object::{Heap, ObjectId, PrimitiveValue};
use crate::stream::binary::{
    EMPTY_CLASS, MEMBER_ABSENT, MEMBER_PRESENT, NO_VARIANT, TAG_NEW, TAG_NULL, TAG_REF,
};
use crate::stream::ReadRegistry;
use crate::types::{PrimitiveKind, TypeKind, TypeRef, TypeRegistry};
use std::sync::Arc;

/// Rebuilds objects from bytes produced by
/// [`BinaryEncoder`](crate::stream::binary::BinaryEncoder).
#[derive(Debug)]
pub struct BinaryDecoder<'a> {
    buffer: &'a [u8],
    offset: usize,
    max_depth: usize,
    objects: ReadRegistry,
}

impl<'a> BinaryDecoder<'a> {
    pub fn new(buffer: &'a [u8]) -> Self {
        Self {
            buffer,
            offset: 0,
            max_depth: DEFAULT_MAX_DEPTH,
            objects: ReadRegistry::new(),
        }
    }

    pub fn with_config(buffer: &'a [u8], config: &StreamConfig) -> Self {
        Self {
            max_depth: config.max_depth,
            ..Self::new(buffer)
        }
    }

    /// Bytes consumed so far.
    pub fn position(&self) -> usize {
        self.offset
    }

    pub fn remaining(&self) -> usize {
        self.buffer.len().saturating_sub(self.offset)
    }

    /// Decode one root object into `heap`.
    pub fn decode(&mut self, heap: &mut Heap) -> Result<ObjectId> {
        let types = Arc::clone(heap.registry());
        self.objects = ReadRegistry::new();
        let name = self.read_string()?;
        let type_ref = types.type_info(&name)?;
        let id = heap.create(type_ref)?;
        self.objects.define(0, id)?;
        self.fill(heap, &types, id, type_ref)?;
        Ok(id)
    }

    fn align(&mut self, alignment: usize) {
        self.offset = (self.offset + alignment - 1) & !(alignment - 1);
    }

    fn read_bytes(&mut self, count: usize) -> Result<&'a [u8]> {
        if count > self.remaining() {
            return Err(Error::BufferTooSmall {
                need: count,
                have: self.remaining(),
            });
        }
        let slice = &self.buffer[self.offset..self.offset + count];
        self.offset += count;
        Ok(slice)
    }

    fn read_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        self.align(N.min(8));
        let mut array = [0u8; N];
        array.copy_from_slice(self.read_bytes(N)?);
        Ok(array)
    }

    fn read_u8(&mut self) -> Result<u8> {
        Ok(self.read_bytes(1)?[0])
    }

    fn read_u32(&mut self) -> Result<u32> {
        Ok(u32::from_le_bytes(self.read_array()?))
    }

    fn read_string(&mut self) -> Result<String> {
        let len = self.read_u32()? as usize;
        if len == 0 {
            return Err(Error::Parse("string without terminator".into()));
        }
        let bytes = self.read_bytes(len)?;
        // Exclude null terminator
        Ok(String::from_utf8(bytes[..len - 1].to_vec())?)
    }

    fn read_primitive(&mut self, kind: PrimitiveKind) -> Result<PrimitiveValue> {
        let value = match kind {
            PrimitiveKind::Bool => PrimitiveValue::Bool(self.read_u8()? != 0),
            PrimitiveKind::I8 => PrimitiveValue::I8(self.read_u8()? as i8),
            PrimitiveKind::I16 => PrimitiveValue::I16(i16::from_le_bytes(self.read_array()?)),
            PrimitiveKind::I32 => PrimitiveValue::I32(i32::from_le_bytes(self.read_array()?)),
            PrimitiveKind::I64 => PrimitiveValue::I64(i64::from_le_bytes(self.read_array()?)),
            PrimitiveKind::U8 => PrimitiveValue::U8(self.read_u8()?),
            PrimitiveKind::U16 => PrimitiveValue::U16(u16::from_le_bytes(self.read_array()?)),
            PrimitiveKind::U32 => PrimitiveValue::U32(self.read_u32()?),
            PrimitiveKind::U64 => PrimitiveValue::U64(u64::from_le_bytes(self.read_array()?)),
            PrimitiveKind::F32 => PrimitiveValue::F32(f32::from_le_bytes(self.read_array()?)),
            PrimitiveKind::F64 => PrimitiveValue::F64(f64::from_le_bytes(self.read_array()?)),
            PrimitiveKind::Char => {
                let code = self.read_u32()?;
                let c = char::from_u32(code)
                    .ok_or_else(|| Error::Parse(format!("invalid char code {:#x}", code)))?;
                PrimitiveValue::Char(c)
            }
            PrimitiveKind::String => PrimitiveValue::String(self.read_string()?),
            PrimitiveKind::Bytes => {
                let len = self.read_u32()? as usize;
                PrimitiveValue::Bytes(self.read_bytes(len)?.to_vec())
            }
        };
        Ok(value)
    }

    /// Read the value of every queued object, depth first.
    ///
    /// Children are attached as soon as they are created and their value
    /// is queued, so nesting costs heap memory rather than call stack.
    fn fill(
        &mut self,
        heap: &mut Heap,
        types: &TypeRegistry,
        id: ObjectId,
        type_ref: TypeRef,
    ) -> Result<()> {
        let mut tasks = vec![Task::Fill {
            id,
            type_ref,
            depth: 0,
        }];
        while let Some(task) = tasks.pop() {
            match task {
                Task::Fill {
                    id,
                    type_ref,
                    depth,
                } => self.fill_one(heap, types, id, type_ref, depth, &mut tasks)?,
                Task::Member {
                    parent,
                    class,
                    index,
                    depth,
                } => {
                    let descriptor = types.get(class)?;
                    let Some(member) = descriptor.members().and_then(|m| m.get(index)) else {
                        continue;
                    };
                    tasks.push(Task::Member {
                        parent,
                        class,
                        index: index + 1,
                        depth,
                    });
                    match self.read_u8()? {
                        MEMBER_ABSENT => {}
                        MEMBER_PRESENT => {
                            let value = heap.create(member.type_ref)?;
                            heap.set_member_at(parent, index, value)?;
                            tasks.push(Task::Fill {
                                id: value,
                                type_ref: member.type_ref,
                                depth: depth + 1,
                            });
                        }
                        flag => {
                            return Err(Error::Parse(format!(
                                "invalid presence flag {} for {}.{}",
                                flag, descriptor.name, member.name
                            )))
                        }
                    }
                }
                Task::Element {
                    parent,
                    element,
                    remaining,
                    depth,
                } => {
                    if remaining == 0 {
                        continue;
                    }
                    tasks.push(Task::Element {
                        parent,
                        element,
                        remaining: remaining - 1,
                        depth,
                    });
                    let value = heap.create(element)?;
                    heap.push_element(parent, value)?;
                    tasks.push(Task::Fill {
                        id: value,
                        type_ref: element,
                        depth: depth + 1,
                    });
                }
            }
        }
        Ok(())
    }

    fn fill_one(
        &mut self,
        heap: &mut Heap,
        types: &TypeRegistry,
        id: ObjectId,
        type_ref: TypeRef,
        depth: usize,
        tasks: &mut Vec<Task>,
    ) -> Result<()> {
        if depth > self.max_depth {
            return Err(Error::DepthLimit(self.max_depth));
        }
        let descriptor = types.get(type_ref)?;
        match &descriptor.kind {
            TypeKind::Primitive(kind) => {
                let value = self.read_primitive(*kind)?;
                heap.set_primitive(id, value)?;
            }
            TypeKind::Enum(_) => {
                let value = i64::from_le_bytes(self.read_array()?);
                heap.set_enum_value(id, value)?;
            }
            TypeKind::Class(class) if class.members.is_empty() => match self.read_u8()? {
                EMPTY_CLASS => {}
                marker => {
                    return Err(Error::Parse(format!(
                        "invalid empty class marker {} for {}",
                        marker, descriptor.name
                    )))
                }
            },
            TypeKind::Class(_) => tasks.push(Task::Member {
                parent: id,
                class: type_ref,
                index: 0,
                depth,
            }),
            TypeKind::Choice(choice) => {
                let index = i32::from_le_bytes(self.read_array()?);
                if index != NO_VARIANT {
                    let slot = usize::try_from(index).map_err(|_| {
                        Error::Parse(format!("invalid variant {} for {}", index, descriptor.name))
                    })?;
                    let variant = choice.variants.get(slot).ok_or_else(|| {
                        Error::Parse(format!("invalid variant {} for {}", index, descriptor.name))
                    })?;
                    let value = heap.create(variant.type_ref)?;
                    heap.select_variant_at(id, slot, value)?;
                    tasks.push(Task::Fill {
                        id: value,
                        type_ref: variant.type_ref,
                        depth: depth + 1,
                    });
                }
            }
            TypeKind::Container(container) => {
                let len = self.read_u32()? as usize;
                let min = min_encoded_size(types, container.element);
                if len.saturating_mul(min) > self.remaining() {
                    return Err(Error::BufferTooSmall {
                        need: len.saturating_mul(min),
                        have: self.remaining(),
                    });
                }
                tasks.push(Task::Element {
                    parent: id,
                    element: container.element,
                    remaining: len,
                    depth,
                });
            }
            TypeKind::Pointer(_) => match self.read_u8()? {
                TAG_NULL => {}
                TAG_REF => {
                    let index = self.read_u32()?;
                    let target = self.objects.resolve(index)?;
                    heap.set_pointer(id, Some(target))?;
                }
                TAG_NEW => {
                    let name = self.read_string()?;
                    let target_type = types.type_info(&name)?;
                    let target = heap.create(target_type)?;
                    self.objects.define(self.objects.next_index(), target)?;
                    heap.set_pointer(id, Some(target))?;
                    tasks.push(Task::Fill {
                        id: target,
                        type_ref: target_type,
                        depth: depth + 1,
                    });
                }
                tag => return Err(Error::Parse(format!("invalid pointer tag {}", tag))),
            },
        }
        Ok(())
    }
}

/// Pending decoding work. Later siblings are queued below the value
/// being read so the stream is consumed in order.
#[derive(Debug, Clone, Copy)]
enum Task {
    Fill {
        id: ObjectId,
        type_ref: TypeRef,
        depth: usize,
    },
    Member {
        parent: ObjectId,
        class: TypeRef,
        index: usize,
        depth: usize,
    },
    Element {
        parent: ObjectId,
        element: TypeRef,
        remaining: usize,
        depth: usize,
    },
}

/// Fewest bytes one value of `type_ref` can take, ignoring padding.
fn min_encoded_size(types: &TypeRegistry, type_ref: TypeRef) -> usize {
    let Ok(descriptor) = types.get(type_ref) else {
        return 1;
    };
    match &descriptor.kind {
        TypeKind::Primitive(kind) => kind.size().unwrap_or(4),
        TypeKind::Enum(_) => 8,
        // One presence flag per member, or the empty class marker.
        TypeKind::Class(class) => class.members.len().max(1),
        TypeKind::Choice(_) | TypeKind::Container(_) => 4,
        TypeKind::Pointer(_) => 1,
    }
}
