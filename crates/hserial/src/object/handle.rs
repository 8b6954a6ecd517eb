// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Object handles and traversal entry points.

use crate::object::ObjectId;
use crate::types::TypeRef;

/// An object address paired with its type.
///
/// Handles are only built by the [`Heap`](crate::object::Heap), which reads
/// the type from the stored object, so the pair is consistent by
/// construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObjectHandle {
    id: ObjectId,
    type_ref: TypeRef,
}

impl ObjectHandle {
    pub(crate) const fn new(id: ObjectId, type_ref: TypeRef) -> Self {
        Self { id, type_ref }
    }

    /// Object address.
    pub const fn id(&self) -> ObjectId {
        self.id
    }

    /// Runtime type of the object.
    pub const fn type_ref(&self) -> TypeRef {
        self.type_ref
    }
}

/// Where and how a traversal starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BeginInfo {
    root: ObjectHandle,
    detect_loops: bool,
}

impl BeginInfo {
    pub(crate) const fn new(root: ObjectHandle) -> Self {
        Self {
            root,
            detect_loops: false,
        }
    }

    /// Skip addresses already visited during the walk.
    pub const fn detect_loops(mut self) -> Self {
        self.detect_loops = true;
        self
    }

    /// Traversal root.
    pub const fn root(&self) -> ObjectHandle {
        self.root
    }

    /// Whether loop detection is on.
    pub const fn detects_loops(&self) -> bool {
        self.detect_loops
    }
}
