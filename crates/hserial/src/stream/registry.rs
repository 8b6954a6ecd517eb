// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Object registries assigning stream indices to shared objects.
//!
//! While writing, [`ObjectRegistry`] gives every object reached through a
//! pointer (and the root) a monotonically increasing index, so a second
//! occurrence of the same address becomes a back-reference. While reading,
//! [`ReadRegistry`] maps those indices back to rebuilt objects.
//!
//! Indices follow the traversal order, so writer and reader agree on them
//! without transmitting a table.

use crate::error::{Error, Result};
use crate::object::ObjectId;
use crate::types::TypeRef;
use std::cmp::Reverse;
use std::collections::BTreeMap;

/// One registered object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ObjectEntry {
    pub id: ObjectId,
    pub type_ref: TypeRef,
    pub index: u32,
    pub written: bool,
}

/// Write-side registry for one stream session.
///
/// Only addresses are tracked; the objects themselves stay in the heap,
/// which must outlive the session.
#[derive(Debug, Default)]
pub struct ObjectRegistry {
    by_address: BTreeMap<Reverse<ObjectId>, u32>,
    entries: Vec<ObjectEntry>,
}

impl ObjectRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an object, or find it if already registered.
    ///
    /// Returns the stream index and `true` when the entry was created by
    /// this call.
    pub fn register_object(&mut self, id: ObjectId, type_ref: TypeRef) -> Result<(u32, bool)> {
        if let Some(&index) = self.by_address.get(&Reverse(id)) {
            let entry = &self.entries[index as usize];
            if entry.type_ref != type_ref {
                return Err(Error::TypeMismatch {
                    expected: entry.type_ref.to_string(),
                    found: type_ref.to_string(),
                });
            }
            return Ok((index, false));
        }
        let index = self.entries.len() as u32;
        self.entries.push(ObjectEntry {
            id,
            type_ref,
            index,
            written: false,
        });
        self.by_address.insert(Reverse(id), index);
        log::trace!("[ObjectRegistry] {} -> #{}", id, index);
        Ok((index, true))
    }

    /// Mark an entry as emitted. Allowed once per entry.
    pub fn object_written(&mut self, index: u32) -> Result<()> {
        let entry = self
            .entries
            .get_mut(index as usize)
            .ok_or(Error::NotRegistered(index))?;
        if entry.written {
            return Err(Error::AlreadyWritten(index));
        }
        entry.written = true;
        Ok(())
    }

    /// Fail if any registered entry was never written.
    pub fn check_all_written(&self) -> Result<()> {
        let mut unwritten = self.entries.iter().filter(|e| !e.written);
        match unwritten.next() {
            Some(first) => Err(Error::UnwrittenObjects {
                count: 1 + unwritten.count(),
                first: first.index,
            }),
            None => Ok(()),
        }
    }

    /// Index of a registered address.
    pub fn index_of(&self, id: ObjectId) -> Option<u32> {
        self.by_address.get(&Reverse(id)).copied()
    }

    pub fn entry(&self, index: u32) -> Option<&ObjectEntry> {
        self.entries.get(index as usize)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Read-side registry: stream index to rebuilt object.
#[derive(Debug, Default)]
pub struct ReadRegistry {
    objects: Vec<ObjectId>,
}

impl ReadRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Index the next defined object will receive.
    pub fn next_index(&self) -> u32 {
        self.objects.len() as u32
    }

    /// Record the object defined under `index`, which must be the next one.
    pub fn define(&mut self, index: u32, id: ObjectId) -> Result<()> {
        if index != self.next_index() {
            return Err(Error::BadReference(index));
        }
        self.objects.push(id);
        Ok(())
    }

    /// Object previously defined under `index`.
    pub fn resolve(&self, index: u32) -> Result<ObjectId> {
        self.objects
            .get(index as usize)
            .copied()
            .ok_or(Error::UnresolvedReference(index))
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::Heap;
    use crate::types::{PrimitiveKind, TypeRegistry};
    use std::sync::Arc;

    fn objects(count: usize) -> (Heap, Vec<ObjectId>) {
        let mut heap = Heap::new(Arc::new(TypeRegistry::new()));
        let ids = (0..count)
            .map(|i| heap.new_primitive(i as u32).expect("object"))
            .collect();
        (heap, ids)
    }

    #[test]
    fn test_register_is_idempotent() {
        let (heap, ids) = objects(2);
        let ty = heap.type_of(ids[0]).expect("type");
        let mut registry = ObjectRegistry::new();
        assert_eq!(registry.register_object(ids[0], ty).expect("a"), (0, true));
        assert_eq!(registry.register_object(ids[1], ty).expect("b"), (1, true));
        assert_eq!(registry.register_object(ids[0], ty).expect("a"), (0, false));
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.index_of(ids[1]), Some(1));
    }

    #[test]
    fn test_same_address_other_type_rejected() {
        let (heap, ids) = objects(1);
        let ty = heap.type_of(ids[0]).expect("type");
        let other = heap.registry().primitive(PrimitiveKind::String);
        let mut registry = ObjectRegistry::new();
        registry.register_object(ids[0], ty).expect("register");
        assert!(matches!(
            registry.register_object(ids[0], other),
            Err(Error::TypeMismatch { .. })
        ));
    }

    #[test]
    fn test_written_exactly_once() {
        let (heap, ids) = objects(3);
        let ty = heap.type_of(ids[0]).expect("type");
        let mut registry = ObjectRegistry::new();
        for id in &ids {
            registry.register_object(*id, ty).expect("register");
        }
        registry.object_written(0).expect("write 0");
        assert!(matches!(registry.object_written(0), Err(Error::AlreadyWritten(0))));
        assert!(matches!(registry.object_written(7), Err(Error::NotRegistered(7))));
        assert!(matches!(
            registry.check_all_written(),
            Err(Error::UnwrittenObjects { count: 2, first: 1 })
        ));
        registry.object_written(1).expect("write 1");
        registry.object_written(2).expect("write 2");
        registry.check_all_written().expect("complete");
    }

    #[test]
    fn test_read_registry_sequence() {
        let (_heap, ids) = objects(2);
        let mut registry = ReadRegistry::new();
        registry.define(0, ids[0]).expect("define");
        assert!(matches!(registry.define(5, ids[1]), Err(Error::BadReference(5))));
        assert_eq!(registry.resolve(0).expect("resolve"), ids[0]);
        assert!(matches!(registry.resolve(1), Err(Error::UnresolvedReference(1))));
    }
}
