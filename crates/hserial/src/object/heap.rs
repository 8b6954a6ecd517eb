// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Object heap: arena of typed objects addressed by [`ObjectId`].
//!
//! Every object, down to a single integer member, has an address and a
//! type. Composite objects hold the addresses of their children. Two kinds
//! of edges exist:
//!
//! - **embedding** (class member, choice variant, container element): the
//!   child has exactly one owner and nothing else may point at it;
//! - **pointer**: the target is a free (unowned) object and may be shared
//!   by any number of pointers, including cyclic ones.
//!
//! The heap checks both rules and the declared slot types on every
//! mutation, so an address and its descriptor can never disagree.

use crate::error::{Error, Result};
use crate::object::{BeginInfo, ObjectHandle, PrimitiveValue, Value};
use crate::types::{TypeDescriptor, TypeKind, TypeRef, TypeRegistry};
use std::fmt;
use std::sync::Arc;

/// Address of one object in a [`Heap`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId(u32);

impl ObjectId {
    /// Raw arena index.
    pub const fn index(self) -> u32 {
        self.0
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "@{}", self.0)
    }
}

/// Position of a child inside its parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slot {
    /// Traversal root (no parent).
    Root,
    /// Class member, by declaration index.
    Member(usize),
    /// Container element, by stored index.
    Element(usize),
    /// Selected choice variant, by declaration index.
    Variant(usize),
    /// Target of a pointer.
    Pointee,
}

impl Slot {
    /// Enumeration position inside the parent.
    pub fn position(self) -> usize {
        match self {
            Self::Member(i) | Self::Element(i) => i,
            Self::Root | Self::Variant(_) | Self::Pointee => 0,
        }
    }
}

/// One child of an object, as reported to the traversal engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Child {
    /// Where the child sits in its parent.
    pub slot: Slot,
    /// Child address.
    pub id: ObjectId,
    /// Type declared by the parent's descriptor for this slot.
    pub declared: TypeRef,
}

#[derive(Debug, Clone)]
struct Node {
    type_ref: TypeRef,
    value: Value,
    owner: Option<ObjectId>,
    pointers_in: u32,
}

/// Largest number of objects a heap can address.
pub const MAX_OBJECTS: usize = u32::MAX as usize;

/// Arena of typed objects.
#[derive(Debug, Clone)]
pub struct Heap {
    registry: Arc<TypeRegistry>,
    nodes: Vec<Node>,
    limit: usize,
}

impl Heap {
    /// Create an empty heap over a registry.
    pub fn new(registry: Arc<TypeRegistry>) -> Self {
        Self {
            registry,
            nodes: Vec::new(),
            limit: MAX_OBJECTS,
        }
    }

    /// Cap the number of objects this heap may allocate.
    ///
    /// Decoding untrusted input into a capped heap bounds its memory use.
    pub fn with_object_limit(mut self, limit: usize) -> Self {
        self.limit = limit.min(MAX_OBJECTS);
        self
    }

    /// Most objects this heap may allocate.
    pub fn object_limit(&self) -> usize {
        self.limit
    }

    /// Registry describing every object of this heap.
    pub fn registry(&self) -> &Arc<TypeRegistry> {
        &self.registry
    }

    /// Number of allocated objects (detached ones included).
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns `true` if nothing was allocated.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    fn node(&self, id: ObjectId) -> Result<&Node> {
        self.nodes
            .get(id.0 as usize)
            .ok_or(Error::DanglingObject(id))
    }

    fn node_mut(&mut self, id: ObjectId) -> Result<&mut Node> {
        self.nodes
            .get_mut(id.0 as usize)
            .ok_or(Error::DanglingObject(id))
    }

    fn alloc(&mut self, type_ref: TypeRef, value: Value) -> Result<ObjectId> {
        let index = self.nodes.len();
        if index >= self.limit {
            return Err(Error::HeapFull(self.limit));
        }
        let id = ObjectId(u32::try_from(index).map_err(|_| Error::HeapFull(self.limit))?);
        self.nodes.push(Node {
            type_ref,
            value,
            owner: None,
            pointers_in: 0,
        });
        Ok(id)
    }

    fn kind_error(&self, type_ref: TypeRef, operation: &'static str) -> Error {
        Error::KindMismatch {
            type_name: self.registry.name(type_ref).to_string(),
            operation,
        }
    }

    fn type_error(&self, expected: TypeRef, found: TypeRef) -> Error {
        Error::TypeMismatch {
            expected: self.registry.name(expected).to_string(),
            found: self.registry.name(found).to_string(),
        }
    }

    // ------------------------------------------------------------------
    // Factory
    // ------------------------------------------------------------------

    /// Create a zero-initialized instance of a type.
    ///
    /// Class members start unset, choices unselected, containers empty,
    /// pointers null, primitives at zero and enums at their first
    /// enumerator.
    pub fn create(&mut self, type_ref: TypeRef) -> Result<ObjectId> {
        let value = match &self.registry.get(type_ref)?.kind {
            TypeKind::Primitive(kind) => Value::Primitive(PrimitiveValue::zero(*kind)),
            TypeKind::Enum(e) => Value::Enum(e.initial_value()),
            TypeKind::Class(class) => Value::Class(vec![None; class.members.len()]),
            TypeKind::Choice(_) => Value::Choice(None),
            TypeKind::Container(_) => Value::Container(Vec::new()),
            TypeKind::Pointer(_) => Value::Pointer(None),
        };
        self.alloc(type_ref, value)
    }

    /// Create a primitive object of a built-in type.
    pub fn new_primitive(&mut self, value: impl Into<PrimitiveValue>) -> Result<ObjectId> {
        let value = value.into();
        let type_ref = self.registry.primitive(value.kind());
        self.alloc(type_ref, Value::Primitive(value))
    }

    /// Create a primitive object of a registered primitive type.
    pub fn create_primitive(
        &mut self,
        type_ref: TypeRef,
        value: impl Into<PrimitiveValue>,
    ) -> Result<ObjectId> {
        let id = self.create(type_ref)?;
        self.set_primitive(id, value)?;
        Ok(id)
    }

    // ------------------------------------------------------------------
    // Identity
    // ------------------------------------------------------------------

    /// Type of an object.
    pub fn type_of(&self, id: ObjectId) -> Result<TypeRef> {
        Ok(self.node(id)?.type_ref)
    }

    /// Descriptor of an object's type.
    pub fn descriptor(&self, id: ObjectId) -> Result<&TypeDescriptor> {
        self.registry.get(self.node(id)?.type_ref)
    }

    /// Handle pairing an address with its stored type.
    pub fn handle(&self, id: ObjectId) -> Result<ObjectHandle> {
        Ok(ObjectHandle::new(id, self.type_of(id)?))
    }

    /// Handle for an address the caller believes to be of type `expected`.
    pub fn checked_handle(&self, id: ObjectId, expected: TypeRef) -> Result<ObjectHandle> {
        let found = self.type_of(id)?;
        if found != expected {
            return Err(self.type_error(expected, found));
        }
        Ok(ObjectHandle::new(id, found))
    }

    /// Stored value of an object.
    pub fn value(&self, id: ObjectId) -> Result<&Value> {
        Ok(&self.node(id)?.value)
    }

    /// Parent holding this object, if embedded.
    pub fn owner(&self, id: ObjectId) -> Result<Option<ObjectId>> {
        Ok(self.node(id)?.owner)
    }

    /// Number of pointers currently targeting this object.
    pub fn pointer_count(&self, id: ObjectId) -> Result<u32> {
        Ok(self.node(id)?.pointers_in)
    }

    /// Start a traversal at `id`.
    pub fn begin(&self, id: ObjectId) -> Result<BeginInfo> {
        Ok(BeginInfo::new(self.handle(id)?))
    }

    /// Start a traversal at `id` that skips already visited addresses.
    pub fn begin_detect_loops(&self, id: ObjectId) -> Result<BeginInfo> {
        Ok(BeginInfo::new(self.handle(id)?).detect_loops())
    }

    // ------------------------------------------------------------------
    // Leaves
    // ------------------------------------------------------------------

    /// Value of a primitive object.
    pub fn primitive(&self, id: ObjectId) -> Result<&PrimitiveValue> {
        let node = self.node(id)?;
        match &node.value {
            Value::Primitive(v) => Ok(v),
            _ => Err(self.kind_error(node.type_ref, "primitive")),
        }
    }

    /// Replace the value of a primitive object. The kind must match.
    pub fn set_primitive(&mut self, id: ObjectId, value: impl Into<PrimitiveValue>) -> Result<()> {
        let value = value.into();
        let type_ref = self.type_of(id)?;
        let descriptor = self.registry.get(type_ref)?;
        match descriptor.kind {
            TypeKind::Primitive(kind) if kind == value.kind() => {}
            TypeKind::Primitive(_) => {
                return Err(Error::TypeMismatch {
                    expected: descriptor.name.clone(),
                    found: value.kind().name().to_string(),
                })
            }
            _ => return Err(self.kind_error(type_ref, "set_primitive")),
        }
        self.node_mut(id)?.value = Value::Primitive(value);
        Ok(())
    }

    /// Numeric value of an enum object.
    pub fn enum_value(&self, id: ObjectId) -> Result<i64> {
        let node = self.node(id)?;
        match node.value {
            Value::Enum(v) => Ok(v),
            _ => Err(self.kind_error(node.type_ref, "enum_value")),
        }
    }

    /// Enumerator name of an enum object (`None` for an unnamed value).
    pub fn enum_name(&self, id: ObjectId) -> Result<Option<&str>> {
        let value = self.enum_value(id)?;
        match &self.descriptor(id)?.kind {
            TypeKind::Enum(e) => Ok(e.variant_by_value(value).map(|v| v.name.as_str())),
            _ => Err(self.kind_error(self.type_of(id)?, "enum_name")),
        }
    }

    /// Set an enum object by enumerator name.
    pub fn set_enum(&mut self, id: ObjectId, name: &str) -> Result<()> {
        let type_ref = self.type_of(id)?;
        let descriptor = self.registry.get(type_ref)?;
        let value = match &descriptor.kind {
            TypeKind::Enum(e) => e
                .variant(name)
                .map(|v| v.value)
                .ok_or_else(|| Error::UnknownVariant {
                    type_name: descriptor.name.clone(),
                    variant: name.to_string(),
                })?,
            _ => return Err(self.kind_error(type_ref, "set_enum")),
        };
        self.node_mut(id)?.value = Value::Enum(value);
        Ok(())
    }

    /// Set an enum object by raw value.
    pub fn set_enum_value(&mut self, id: ObjectId, value: i64) -> Result<()> {
        let type_ref = self.type_of(id)?;
        if !matches!(self.registry.get(type_ref)?.kind, TypeKind::Enum(_)) {
            return Err(self.kind_error(type_ref, "set_enum_value"));
        }
        self.node_mut(id)?.value = Value::Enum(value);
        Ok(())
    }

    // ------------------------------------------------------------------
    // Ownership
    // ------------------------------------------------------------------

    /// Make `child` an embedded part of `parent`, checking its type
    /// against the slot's declared type.
    fn adopt(&mut self, parent: ObjectId, child: ObjectId, declared: TypeRef) -> Result<()> {
        let node = self.node(child)?;
        if node.type_ref != declared {
            return Err(self.type_error(declared, node.type_ref));
        }
        if node.owner.is_some() {
            return Err(Error::AlreadyOwned(child));
        }
        if node.pointers_in > 0 {
            return Err(Error::SharedObject(child));
        }
        let mut ancestor = Some(parent);
        while let Some(current) = ancestor {
            if current == child {
                return Err(Error::EmbeddingCycle(child));
            }
            ancestor = self.node(current)?.owner;
        }
        self.node_mut(child)?.owner = Some(parent);
        Ok(())
    }

    fn release(&mut self, child: ObjectId) -> Result<()> {
        self.node_mut(child)?.owner = None;
        Ok(())
    }

    fn class_slots(&self, id: ObjectId, operation: &'static str) -> Result<&[Option<ObjectId>]> {
        let node = self.node(id)?;
        match &node.value {
            Value::Class(slots) => Ok(slots),
            _ => Err(self.kind_error(node.type_ref, operation)),
        }
    }

    // ------------------------------------------------------------------
    // Classes
    // ------------------------------------------------------------------

    /// Set a class member by declaration index.
    pub fn set_member_at(&mut self, id: ObjectId, index: usize, child: ObjectId) -> Result<()> {
        let type_ref = self.type_of(id)?;
        let declared = {
            let members = self
                .registry
                .get(type_ref)?
                .members()
                .ok_or_else(|| self.kind_error(type_ref, "set_member"))?;
            members
                .get(index)
                .ok_or(Error::IndexOutOfBounds {
                    index,
                    length: members.len(),
                })?
                .type_ref
        };
        self.adopt(id, child, declared)?;
        let previous = match &mut self.node_mut(id)?.value {
            Value::Class(slots) => slots[index].replace(child),
            _ => None,
        };
        if let Some(previous) = previous {
            self.release(previous)?;
        }
        Ok(())
    }

    /// Set a class member by name.
    pub fn set_member(&mut self, id: ObjectId, name: &str, child: ObjectId) -> Result<()> {
        let (index, _) = self.registry.member(self.type_of(id)?, name)?;
        self.set_member_at(id, index, child)
    }

    /// Set a primitive member, creating its object.
    pub fn set_member_value(
        &mut self,
        id: ObjectId,
        name: &str,
        value: impl Into<PrimitiveValue>,
    ) -> Result<ObjectId> {
        let (index, member_type) = {
            let (index, member) = self.registry.member(self.type_of(id)?, name)?;
            (index, member.type_ref)
        };
        let child = self.create_primitive(member_type, value)?;
        self.set_member_at(id, index, child)?;
        Ok(child)
    }

    /// Member object, `None` when not set.
    pub fn member(&self, id: ObjectId, name: &str) -> Result<Option<ObjectId>> {
        let (index, _) = self.registry.member(self.type_of(id)?, name)?;
        Ok(self.class_slots(id, "member")?[index])
    }

    /// Member object by declaration index.
    pub fn member_at(&self, id: ObjectId, index: usize) -> Result<Option<ObjectId>> {
        let slots = self.class_slots(id, "member")?;
        slots.get(index).copied().ok_or(Error::IndexOutOfBounds {
            index,
            length: slots.len(),
        })
    }

    /// Primitive value of a member that must be set.
    pub fn member_value(&self, id: ObjectId, name: &str) -> Result<&PrimitiveValue> {
        match self.member(id, name)? {
            Some(child) => self.primitive(child),
            None => Err(Error::MemberNotSet {
                type_name: self.descriptor(id)?.name.clone(),
                member: name.to_string(),
            }),
        }
    }

    /// Mark a member as not set, returning the detached object.
    pub fn reset_member(&mut self, id: ObjectId, name: &str) -> Result<Option<ObjectId>> {
        let (index, _) = self.registry.member(self.type_of(id)?, name)?;
        self.reset_member_at(id, index)
    }

    fn reset_member_at(&mut self, id: ObjectId, index: usize) -> Result<Option<ObjectId>> {
        let previous = match &mut self.node_mut(id)?.value {
            Value::Class(slots) if index < slots.len() => slots[index].take(),
            Value::Class(slots) => {
                return Err(Error::IndexOutOfBounds {
                    index,
                    length: slots.len(),
                })
            }
            _ => None,
        };
        if let Some(previous) = previous {
            self.release(previous)?;
        }
        Ok(previous)
    }

    // ------------------------------------------------------------------
    // Choices
    // ------------------------------------------------------------------

    /// Select a choice variant by declaration index.
    pub fn select_variant_at(&mut self, id: ObjectId, index: usize, child: ObjectId) -> Result<()> {
        let type_ref = self.type_of(id)?;
        let declared = {
            let variants = self
                .registry
                .get(type_ref)?
                .variants()
                .ok_or_else(|| self.kind_error(type_ref, "select_variant"))?;
            variants
                .get(index)
                .ok_or(Error::IndexOutOfBounds {
                    index,
                    length: variants.len(),
                })?
                .type_ref
        };
        self.adopt(id, child, declared)?;
        let previous = match &mut self.node_mut(id)?.value {
            Value::Choice(selection) => selection.replace((index, child)),
            _ => None,
        };
        if let Some((_, previous)) = previous {
            self.release(previous)?;
        }
        Ok(())
    }

    /// Select a choice variant by name.
    pub fn select_variant(&mut self, id: ObjectId, name: &str, child: ObjectId) -> Result<()> {
        let (index, _) = self.registry.variant(self.type_of(id)?, name)?;
        self.select_variant_at(id, index, child)
    }

    /// Selected variant index and object, if any.
    pub fn selected_variant(&self, id: ObjectId) -> Result<Option<(usize, ObjectId)>> {
        let node = self.node(id)?;
        match node.value {
            Value::Choice(selection) => Ok(selection),
            _ => Err(self.kind_error(node.type_ref, "selected_variant")),
        }
    }

    /// Name of the selected variant, if any.
    pub fn selected_variant_name(&self, id: ObjectId) -> Result<Option<&str>> {
        let selection = self.selected_variant(id)?;
        let variants = self.descriptor(id)?.variants().unwrap_or_default();
        Ok(selection.and_then(|(index, _)| variants.get(index).map(|v| v.name.as_str())))
    }

    /// Unselect a choice, returning the detached object.
    pub fn reset_choice(&mut self, id: ObjectId) -> Result<Option<ObjectId>> {
        let type_ref = self.type_of(id)?;
        let previous = match &mut self.node_mut(id)?.value {
            Value::Choice(selection) => selection.take(),
            _ => return Err(self.kind_error(type_ref, "reset_choice")),
        };
        if let Some((_, previous)) = previous {
            self.release(previous)?;
        }
        Ok(previous.map(|(_, child)| child))
    }

    // ------------------------------------------------------------------
    // Containers
    // ------------------------------------------------------------------

    /// Append an element to a container.
    pub fn push_element(&mut self, id: ObjectId, child: ObjectId) -> Result<()> {
        let type_ref = self.type_of(id)?;
        let declared = match &self.registry.get(type_ref)?.kind {
            TypeKind::Container(container) => container.element,
            _ => return Err(self.kind_error(type_ref, "push_element")),
        };
        self.adopt(id, child, declared)?;
        if let Value::Container(elements) = &mut self.node_mut(id)?.value {
            elements.push(child);
        }
        Ok(())
    }

    /// Elements of a container in stored order.
    pub fn elements(&self, id: ObjectId) -> Result<&[ObjectId]> {
        let node = self.node(id)?;
        match &node.value {
            Value::Container(elements) => Ok(elements),
            _ => Err(self.kind_error(node.type_ref, "elements")),
        }
    }

    /// Remove and detach a container element.
    pub fn remove_element(&mut self, id: ObjectId, index: usize) -> Result<ObjectId> {
        let type_ref = self.type_of(id)?;
        let removed = match &mut self.node_mut(id)?.value {
            Value::Container(elements) if index < elements.len() => elements.remove(index),
            Value::Container(elements) => {
                return Err(Error::IndexOutOfBounds {
                    index,
                    length: elements.len(),
                })
            }
            _ => return Err(self.kind_error(type_ref, "remove_element")),
        };
        self.release(removed)?;
        Ok(removed)
    }

    // ------------------------------------------------------------------
    // Pointers
    // ------------------------------------------------------------------

    /// Point at a free object, or reset to null.
    pub fn set_pointer(&mut self, id: ObjectId, target: Option<ObjectId>) -> Result<()> {
        let type_ref = self.type_of(id)?;
        let declared = match &self.registry.get(type_ref)?.kind {
            TypeKind::Pointer(pointer) => pointer.target,
            _ => return Err(self.kind_error(type_ref, "set_pointer")),
        };
        if let Some(target) = target {
            let node = self.node(target)?;
            if node.owner.is_some() {
                return Err(Error::InteriorPointer(target));
            }
            if let Some(declared) = declared {
                if node.type_ref != declared {
                    return Err(self.type_error(declared, node.type_ref));
                }
            }
            self.node_mut(target)?.pointers_in += 1;
        }
        let previous = match &mut self.node_mut(id)?.value {
            Value::Pointer(current) => std::mem::replace(current, target),
            _ => None,
        };
        if let Some(previous) = previous {
            let node = self.node_mut(previous)?;
            node.pointers_in = node.pointers_in.saturating_sub(1);
        }
        Ok(())
    }

    /// Pointer target, `None` when null.
    pub fn pointee(&self, id: ObjectId) -> Result<Option<ObjectId>> {
        let node = self.node(id)?;
        match node.value {
            Value::Pointer(target) => Ok(target),
            _ => Err(self.kind_error(node.type_ref, "pointee")),
        }
    }

    /// Create a pointer object of type `pointer_type` targeting `target`.
    pub fn new_pointer(&mut self, pointer_type: TypeRef, target: Option<ObjectId>) -> Result<ObjectId> {
        let id = self.create(pointer_type)?;
        self.set_pointer(id, target)?;
        Ok(id)
    }

    // ------------------------------------------------------------------
    // Children (traversal support)
    // ------------------------------------------------------------------

    /// First child of `id` at enumeration position `from` or later.
    ///
    /// Class members are enumerated in declaration order (unset members
    /// skipped), container elements in stored order; a choice yields its
    /// selected variant and a pointer its non-null target.
    pub fn next_child(&self, id: ObjectId, from: usize) -> Result<Option<Child>> {
        let node = self.node(id)?;
        let descriptor = self.registry.get(node.type_ref)?;
        let child = match (&node.value, &descriptor.kind) {
            (Value::Class(slots), TypeKind::Class(class)) => slots
                .iter()
                .enumerate()
                .skip(from)
                .find_map(|(index, slot)| slot.map(|child| (index, child)))
                .map(|(index, child)| Child {
                    slot: Slot::Member(index),
                    id: child,
                    declared: class.members[index].type_ref,
                }),
            (Value::Container(elements), TypeKind::Container(container)) => {
                elements.get(from).map(|child| Child {
                    slot: Slot::Element(from),
                    id: *child,
                    declared: container.element,
                })
            }
            (Value::Choice(Some((index, child))), TypeKind::Choice(choice)) if from == 0 => {
                Some(Child {
                    slot: Slot::Variant(*index),
                    id: *child,
                    declared: choice.variants[*index].type_ref,
                })
            }
            (Value::Pointer(Some(target)), TypeKind::Pointer(pointer)) if from == 0 => {
                let declared = match pointer.target {
                    Some(declared) => declared,
                    None => self.type_of(*target)?,
                };
                Some(Child {
                    slot: Slot::Pointee,
                    id: *target,
                    declared,
                })
            }
            _ => None,
        };
        Ok(child)
    }

    /// All children of `id` in traversal order.
    pub fn children(&self, id: ObjectId) -> Result<Vec<Child>> {
        let mut children = Vec::new();
        let mut from = 0;
        while let Some(child) = self.next_child(id, from)? {
            from = child.slot.position() + 1;
            children.push(child);
        }
        Ok(children)
    }

    /// Remove the child in `slot` of `parent`.
    ///
    /// Container elements are removed (later siblings shift down), class
    /// members become unset, a choice becomes unselected and a pointer
    /// becomes null.
    pub fn detach(&mut self, parent: ObjectId, slot: Slot) -> Result<()> {
        match slot {
            Slot::Root => return Err(Error::CannotErase("traversal root has no parent")),
            Slot::Member(index) => {
                self.reset_member_at(parent, index)?;
            }
            Slot::Element(index) => {
                self.remove_element(parent, index)?;
            }
            Slot::Variant(_) => {
                self.reset_choice(parent)?;
            }
            Slot::Pointee => self.set_pointer(parent, None)?,
        }
        Ok(())
    }
}
