// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Format-independent writer driving an [`ObjectEncoder`].

use crate::config::{StreamConfig, VerifyData, DEFAULT_MAX_DEPTH};
use crate::error::{Error, Result};
use crate::object::{Heap, ObjectId, PrimitiveValue, Value};
use crate::stream::{ObjectEncoder, ObjectRegistry};
use crate::types::{MemberDescriptor, TypeDescriptor, TypeKind, TypeRef};

/// Pending work of the writer. Closing hooks are queued before the
/// children so the stack pops them last.
///
/// `depth` counts member, element, variant and pointee steps from the
/// root, the same way the readers count nesting.
#[derive(Debug, Clone, Copy)]
enum Task {
    Value { id: ObjectId, depth: usize },
    Member { parent: ObjectId, index: usize, depth: usize },
    Element { id: ObjectId, declared: TypeRef, depth: usize },
    Zero { type_ref: TypeRef, depth: usize },
    ZeroMember { class: TypeRef, index: usize, depth: usize },
    EndMember,
    EndClass,
    EndElement,
    EndContainer,
    EndVariant,
    EndNamed(u32),
}

/// Writes one object graph per [`write`](Self::write) call.
///
/// The root gets stream index 0. Objects reached through pointers get the
/// following indices in traversal order; a pointer to an object that was
/// already opened is written as a back-reference.
#[derive(Debug)]
pub struct ObjectWriter<'h, E: ObjectEncoder> {
    heap: &'h Heap,
    encoder: E,
    objects: ObjectRegistry,
    verify: VerifyData,
    max_depth: usize,
}

impl<'h, E: ObjectEncoder> ObjectWriter<'h, E> {
    pub fn new(heap: &'h Heap, encoder: E) -> Self {
        Self {
            heap,
            encoder,
            objects: ObjectRegistry::new(),
            verify: VerifyData::Yes,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    pub fn with_config(heap: &'h Heap, encoder: E, config: &StreamConfig) -> Self {
        Self {
            verify: config.verify,
            max_depth: config.max_depth,
            ..Self::new(heap, encoder)
        }
    }

    /// Write the graph rooted at `root`.
    ///
    /// On error the encoder is unwound and nothing is retried; the output
    /// written so far must be discarded by the caller.
    pub fn write(&mut self, root: ObjectId) -> Result<()> {
        self.objects = ObjectRegistry::new();
        let result = self.run(root);
        if let Err(e) = &result {
            log::warn!("[ObjectWriter] write of {} failed, unwinding: {}", root, e);
            self.encoder.unwind();
        }
        result
    }

    /// Objects registered by the last write.
    pub fn objects(&self) -> &ObjectRegistry {
        &self.objects
    }

    pub fn encoder(&self) -> &E {
        &self.encoder
    }

    pub fn into_encoder(self) -> E {
        self.encoder
    }

    fn run(&mut self, root: ObjectId) -> Result<()> {
        let heap = self.heap;
        let handle = heap.handle(root)?;
        let (index, _) = self.objects.register_object(root, handle.type_ref())?;
        self.encoder
            .begin_named_type(heap.registry().name(handle.type_ref()), None)?;

        let mut tasks = vec![Task::EndNamed(index), Task::Value { id: root, depth: 0 }];
        while let Some(task) = tasks.pop() {
            match task {
                Task::Value { id, depth } => self.write_value(id, depth, &mut tasks)?,
                Task::Member {
                    parent,
                    index,
                    depth,
                } => self.write_member(parent, index, depth, &mut tasks)?,
                Task::Element { id, declared, depth } => {
                    self.encoder
                        .begin_container_element(heap.registry().get(declared)?)?;
                    tasks.push(Task::EndElement);
                    tasks.push(Task::Value { id, depth });
                }
                Task::Zero { type_ref, depth } => self.write_zero(type_ref, depth, &mut tasks)?,
                Task::ZeroMember {
                    class,
                    index,
                    depth,
                } => {
                    let member = member_at(heap.registry().get(class)?, index)?;
                    if member.optional {
                        self.encoder.skip_class_member(member, index)?;
                    } else {
                        self.encoder.begin_class_member(member, index)?;
                        tasks.push(Task::EndMember);
                        tasks.push(Task::Zero {
                            type_ref: member.type_ref,
                            depth,
                        });
                    }
                }
                Task::EndMember => self.encoder.end_class_member()?,
                Task::EndClass => self.encoder.end_class()?,
                Task::EndElement => self.encoder.end_container_element()?,
                Task::EndContainer => self.encoder.end_container()?,
                Task::EndVariant => self.encoder.end_choice_variant()?,
                Task::EndNamed(index) => {
                    self.encoder.end_named_type()?;
                    self.objects.object_written(index)?;
                }
            }
        }

        self.objects.check_all_written()?;
        self.encoder.finish()
    }

    fn write_value(&mut self, id: ObjectId, depth: usize, tasks: &mut Vec<Task>) -> Result<()> {
        if depth > self.max_depth {
            return Err(Error::DepthLimit(self.max_depth));
        }
        let heap = self.heap;
        let descriptor = heap.descriptor(id)?;
        match heap.value(id)? {
            Value::Primitive(value) => self.encoder.write_primitive(value),
            Value::Enum(value) => self.encoder.write_enum(*value, heap.enum_name(id)?),
            Value::Class(slots) => {
                self.encoder.begin_class(descriptor)?;
                tasks.push(Task::EndClass);
                tasks.extend(
                    (0..slots.len())
                        .rev()
                        .map(|index| Task::Member {
                            parent: id,
                            index,
                            depth,
                        }),
                );
                Ok(())
            }
            Value::Choice(Some((index, child))) => {
                let variant = descriptor
                    .variants()
                    .and_then(|variants| variants.get(*index))
                    .ok_or_else(|| Error::KindMismatch {
                        type_name: descriptor.name.clone(),
                        operation: "write choice",
                    })?;
                self.encoder.begin_choice_variant(variant, *index)?;
                tasks.push(Task::EndVariant);
                tasks.push(Task::Value {
                    id: *child,
                    depth: depth + 1,
                });
                Ok(())
            }
            Value::Choice(None) => self.encoder.write_empty_choice(),
            Value::Container(elements) => {
                let TypeKind::Container(container) = &descriptor.kind else {
                    return Err(Error::KindMismatch {
                        type_name: descriptor.name.clone(),
                        operation: "write container",
                    });
                };
                self.encoder.begin_container(descriptor, elements.len())?;
                tasks.push(Task::EndContainer);
                tasks.extend(elements.iter().rev().map(|id| Task::Element {
                    id: *id,
                    declared: container.element,
                    depth: depth + 1,
                }));
                Ok(())
            }
            Value::Pointer(None) => self.encoder.write_null_pointer(),
            Value::Pointer(Some(target)) => {
                let type_ref = heap.type_of(*target)?;
                let type_name = heap.registry().name(type_ref);
                let (index, first) = self.objects.register_object(*target, type_ref)?;
                if first {
                    self.encoder.begin_named_type(type_name, Some(index))?;
                    tasks.push(Task::EndNamed(index));
                    tasks.push(Task::Value {
                        id: *target,
                        depth: depth + 1,
                    });
                    Ok(())
                } else {
                    log::trace!("[ObjectWriter] back-reference #{} for {}", index, target);
                    self.encoder.write_object_reference(type_name, index)
                }
            }
        }
    }

    fn write_member(
        &mut self,
        parent: ObjectId,
        index: usize,
        depth: usize,
        tasks: &mut Vec<Task>,
    ) -> Result<()> {
        let heap = self.heap;
        let class = heap.descriptor(parent)?;
        let member = member_at(class, index)?;
        match heap.member_at(parent, index)? {
            Some(child) => {
                self.encoder.begin_class_member(member, index)?;
                tasks.push(Task::EndMember);
                tasks.push(Task::Value {
                    id: child,
                    depth: depth + 1,
                });
            }
            None if member.optional => self.encoder.skip_class_member(member, index)?,
            None => match self.verify {
                VerifyData::Yes => {
                    return Err(Error::MemberNotSet {
                        type_name: class.name.clone(),
                        member: member.name.clone(),
                    })
                }
                VerifyData::No => self.encoder.skip_class_member(member, index)?,
                VerifyData::DefValue => {
                    self.encoder.begin_class_member(member, index)?;
                    tasks.push(Task::EndMember);
                    tasks.push(Task::Zero {
                        type_ref: member.type_ref,
                        depth: depth + 1,
                    });
                }
            },
        }
        Ok(())
    }

    /// Zero value of a type, for members written with [`VerifyData::DefValue`].
    fn write_zero(&mut self, type_ref: TypeRef, depth: usize, tasks: &mut Vec<Task>) -> Result<()> {
        if depth > self.max_depth {
            return Err(Error::DepthLimit(self.max_depth));
        }
        let descriptor = self.heap.registry().get(type_ref)?;
        match &descriptor.kind {
            TypeKind::Primitive(kind) => self.encoder.write_primitive(&PrimitiveValue::zero(*kind)),
            TypeKind::Enum(e) => {
                let value = e.initial_value();
                let name = e.variant_by_value(value).map(|v| v.name.as_str());
                self.encoder.write_enum(value, name)
            }
            TypeKind::Class(class) => {
                self.encoder.begin_class(descriptor)?;
                tasks.push(Task::EndClass);
                tasks.extend((0..class.members.len()).rev().map(|index| Task::ZeroMember {
                    class: type_ref,
                    index,
                    depth: depth + 1,
                }));
                Ok(())
            }
            TypeKind::Choice(_) => self.encoder.write_empty_choice(),
            TypeKind::Container(_) => {
                self.encoder.begin_container(descriptor, 0)?;
                self.encoder.end_container()
            }
            TypeKind::Pointer(_) => self.encoder.write_null_pointer(),
        }
    }
}

fn member_at(class: &TypeDescriptor, index: usize) -> Result<&MemberDescriptor> {
    let members = class.members().ok_or_else(|| Error::KindMismatch {
        type_name: class.name.clone(),
        operation: "member",
    })?;
    members.get(index).ok_or(Error::IndexOutOfBounds {
        index,
        length: members.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{register_pointer, ClassBuilder, PrimitiveKind, TypeRegistry};
    use std::sync::Arc;

    /// Records the hook sequence as text.
    #[derive(Default)]
    struct Trace {
        events: Vec<String>,
        unwound: bool,
    }

    impl ObjectEncoder for Trace {
        fn begin_named_type(&mut self, type_name: &str, index: Option<u32>) -> Result<()> {
            self.events.push(format!("named {} {:?}", type_name, index));
            Ok(())
        }
        fn end_named_type(&mut self) -> Result<()> {
            self.events.push("/named".into());
            Ok(())
        }
        fn begin_class(&mut self, class: &TypeDescriptor) -> Result<()> {
            self.events.push(format!("class {}", class.name));
            Ok(())
        }
        fn end_class(&mut self) -> Result<()> {
            self.events.push("/class".into());
            Ok(())
        }
        fn begin_class_member(&mut self, member: &MemberDescriptor, _index: usize) -> Result<()> {
            self.events.push(format!("member {}", member.name));
            Ok(())
        }
        fn end_class_member(&mut self) -> Result<()> {
            self.events.push("/member".into());
            Ok(())
        }
        fn skip_class_member(&mut self, member: &MemberDescriptor, _index: usize) -> Result<()> {
            self.events.push(format!("skip {}", member.name));
            Ok(())
        }
        fn begin_container(&mut self, _container: &TypeDescriptor, len: usize) -> Result<()> {
            self.events.push(format!("container {}", len));
            Ok(())
        }
        fn begin_container_element(&mut self, _element: &TypeDescriptor) -> Result<()> {
            self.events.push("element".into());
            Ok(())
        }
        fn end_container_element(&mut self) -> Result<()> {
            self.events.push("/element".into());
            Ok(())
        }
        fn end_container(&mut self) -> Result<()> {
            self.events.push("/container".into());
            Ok(())
        }
        fn begin_choice_variant(&mut self, variant: &crate::types::VariantDescriptor, _index: usize) -> Result<()> {
            self.events.push(format!("variant {}", variant.name));
            Ok(())
        }
        fn end_choice_variant(&mut self) -> Result<()> {
            self.events.push("/variant".into());
            Ok(())
        }
        fn write_empty_choice(&mut self) -> Result<()> {
            self.events.push("empty".into());
            Ok(())
        }
        fn write_primitive(&mut self, value: &PrimitiveValue) -> Result<()> {
            self.events.push(format!("{:?}", value));
            Ok(())
        }
        fn write_enum(&mut self, value: i64, _name: Option<&str>) -> Result<()> {
            self.events.push(format!("enum {}", value));
            Ok(())
        }
        fn write_object_reference(&mut self, _type_name: &str, index: u32) -> Result<()> {
            self.events.push(format!("ref {}", index));
            Ok(())
        }
        fn write_null_pointer(&mut self) -> Result<()> {
            self.events.push("null".into());
            Ok(())
        }
        fn unwind(&mut self) {
            self.unwound = true;
        }
        fn finish(&mut self) -> Result<()> {
            self.events.push("finish".into());
            Ok(())
        }
    }

    struct Fixture {
        heap: Heap,
        node: TypeRef,
    }

    /// `Node { value: i32, next: Node* (optional) }`
    fn fixture() -> Fixture {
        let mut registry = TypeRegistry::new();
        let node = registry.declare("Node").expect("declare");
        let next = register_pointer(&mut registry, "NodePtr", Some(node)).expect("ptr");
        let kind = ClassBuilder::new("Node")
            .primitive_member(&registry, "value", PrimitiveKind::I32)
            .optional_member("next", next)
            .build_kind();
        registry.define(node, kind).expect("define");
        Fixture {
            heap: Heap::new(Arc::new(registry)),
            node,
        }
    }

    #[test]
    fn test_self_reference_becomes_back_reference() {
        let mut f = fixture();
        let node = f.heap.create(f.node).expect("node");
        f.heap.set_member_value(node, "value", 7i32).expect("value");
        let ptr_type = f.heap.registry().type_info("NodePtr").expect("ptr type");
        let ptr = f.heap.new_pointer(ptr_type, Some(node)).expect("ptr");
        f.heap.set_member(node, "next", ptr).expect("next");

        let mut writer = ObjectWriter::new(&f.heap, Trace::default());
        writer.write(node).expect("write");
        assert_eq!(writer.objects().len(), 1);
        let events = writer.into_encoder().events;
        assert_eq!(
            events,
            vec![
                "named Node None",
                "class Node",
                "member value",
                "I32(7)",
                "/member",
                "member next",
                "ref 0",
                "/member",
                "/class",
                "/named",
                "finish",
            ]
        );
    }

    #[test]
    fn test_verify_modes() {
        let mut f = fixture();
        let node = f.heap.create(f.node).expect("node");

        let mut writer = ObjectWriter::new(&f.heap, Trace::default());
        assert!(matches!(writer.write(node), Err(Error::MemberNotSet { .. })));
        assert!(writer.encoder().unwound);

        let config = StreamConfig::default().with_verify(VerifyData::No);
        let mut writer = ObjectWriter::with_config(&f.heap, Trace::default(), &config);
        writer.write(node).expect("write");
        assert!(writer.encoder().events.contains(&"skip value".to_string()));

        let config = StreamConfig::default().with_verify(VerifyData::DefValue);
        let mut writer = ObjectWriter::with_config(&f.heap, Trace::default(), &config);
        writer.write(node).expect("write");
        assert!(writer.encoder().events.contains(&"I32(0)".to_string()));
        assert!(writer.encoder().events.contains(&"skip next".to_string()));
    }

    #[test]
    fn test_depth_limit_counts_pointees() {
        let mut f = fixture();
        let ptr_type = f.heap.registry().type_info("NodePtr").expect("ptr type");
        let nodes: Vec<_> = (0..3i32)
            .map(|i| {
                let node = f.heap.create(f.node).expect("node");
                f.heap.set_member_value(node, "value", i).expect("value");
                node
            })
            .collect();
        for pair in nodes.windows(2) {
            let ptr = f.heap.new_pointer(ptr_type, Some(pair[1])).expect("ptr");
            f.heap.set_member(pair[0], "next", ptr).expect("next");
        }

        // The last node's value sits at depth 5: two member/pointee steps per node.
        let config = StreamConfig::default().with_max_depth(4);
        let mut writer = ObjectWriter::with_config(&f.heap, Trace::default(), &config);
        assert!(matches!(writer.write(nodes[0]), Err(Error::DepthLimit(4))));
        assert!(writer.encoder().unwound);

        let config = StreamConfig::default().with_max_depth(5);
        let mut writer = ObjectWriter::with_config(&f.heap, Trace::default(), &config);
        writer.write(nodes[0]).expect("write");
        assert_eq!(writer.objects().len(), 3);
    }
}
