// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Const and mutable tree iterators.

use crate::error::Result;
use crate::iter::walk::WalkState;
use crate::iter::{AnyNode, NodeFilter, TypeFilter, TypesFilter};
use crate::object::{BeginInfo, Heap, ObjectHandle, Slot};
use crate::types::TypeRef;

/// Depth-first iterator over a read-only object graph.
///
/// Nodes are visited parent first, class members in declaration order and
/// container elements in stored order. A fresh iterator is at the end until
/// [`begin`](Self::begin) positions it.
#[derive(Debug)]
pub struct TreeIter<'h, F: NodeFilter = AnyNode> {
    heap: &'h Heap,
    filter: F,
    state: WalkState,
}

/// Iterator yielding only nodes of one type.
pub type TypeIter<'h> = TreeIter<'h, TypeFilter>;

/// Iterator yielding nodes of any of several types.
pub type TypesIter<'h> = TreeIter<'h, TypesFilter>;

impl<'h> TreeIter<'h> {
    /// Unfiltered iterator, not yet started.
    pub fn new(heap: &'h Heap) -> Self {
        Self::with_filter(heap, AnyNode)
    }

    /// Unfiltered iterator positioned on `info.root`.
    pub fn walk(heap: &'h Heap, info: BeginInfo) -> Result<Self> {
        Self::filtered(heap, info, AnyNode)
    }
}

impl<'h> TypeIter<'h> {
    /// Iterator over the nodes of type `target` below `info.root`.
    pub fn of_type(heap: &'h Heap, info: BeginInfo, target: TypeRef) -> Result<Self> {
        Self::filtered(heap, info, TypeFilter::new(target))
    }
}

impl<'h> TypesIter<'h> {
    /// Iterator over the nodes of any type in `targets` below `info.root`.
    pub fn of_types(
        heap: &'h Heap,
        info: BeginInfo,
        targets: impl IntoIterator<Item = TypeRef>,
    ) -> Result<Self> {
        Self::filtered(heap, info, TypesFilter::new(targets))
    }

    /// Requested type matched by the current node.
    pub fn matched_type(&self) -> Option<TypeRef> {
        if self.valid() {
            self.filter.matched_type()
        } else {
            None
        }
    }
}

impl<'h, F: NodeFilter> TreeIter<'h, F> {
    /// Filtered iterator, not yet started.
    pub fn with_filter(heap: &'h Heap, filter: F) -> Self {
        Self {
            heap,
            filter,
            state: WalkState::default(),
        }
    }

    /// Filtered iterator positioned on the first selected node.
    pub fn filtered(heap: &'h Heap, info: BeginInfo, filter: F) -> Result<Self> {
        let mut iter = Self::with_filter(heap, filter);
        iter.begin(info)?;
        Ok(iter)
    }

    /// Restart the walk at `info.root`.
    pub fn begin(&mut self, info: BeginInfo) -> Result<()> {
        self.state.begin(self.heap, &mut self.filter, info)
    }

    /// Whether the iterator is positioned on a node.
    pub fn valid(&self) -> bool {
        self.state.valid()
    }

    /// Whether the walk is over.
    pub fn at_end(&self) -> bool {
        self.state.at_end()
    }

    /// Current node.
    pub fn get(&self) -> Result<ObjectHandle> {
        self.state.get()
    }

    /// Move to the next selected node.
    pub fn advance(&mut self) -> Result<()> {
        self.state.advance(self.heap, &mut self.filter)
    }

    /// Do not descend into the current node on the next [`advance`](Self::advance).
    pub fn skip_subtree(&mut self) -> Result<()> {
        self.state.skip_subtree()
    }

    /// Depth of the current node (the root is at depth 0).
    pub fn depth(&self) -> usize {
        self.state.depth()
    }

    /// Slot holding the current node in its parent.
    pub fn slot(&self) -> Option<Slot> {
        self.state.slot()
    }

    pub fn heap(&self) -> &'h Heap {
        self.heap
    }

    pub fn filter(&self) -> &F {
        &self.filter
    }
}

impl<F: NodeFilter> Iterator for TreeIter<'_, F> {
    type Item = Result<ObjectHandle>;

    fn next(&mut self) -> Option<Self::Item> {
        let handle = self.state.get().ok()?;
        match self.advance() {
            Ok(()) => Some(Ok(handle)),
            Err(e) => {
                self.state.clear();
                Some(Err(e))
            }
        }
    }
}

/// Depth-first iterator over a mutable object graph.
///
/// Same walk as [`TreeIter`], plus [`erase`](Self::erase). Children are
/// read from the heap at each step, so values may be changed through
/// [`heap_mut`](Self::heap_mut) while walking.
#[derive(Debug)]
pub struct TreeIterMut<'h, F: NodeFilter = AnyNode> {
    heap: &'h mut Heap,
    filter: F,
    state: WalkState,
}

impl<'h> TreeIterMut<'h> {
    pub fn new(heap: &'h mut Heap) -> Self {
        Self::with_filter(heap, AnyNode)
    }

    pub fn walk(heap: &'h mut Heap, info: BeginInfo) -> Result<Self> {
        Self::filtered(heap, info, AnyNode)
    }
}

impl<'h> TreeIterMut<'h, TypeFilter> {
    pub fn of_type(heap: &'h mut Heap, info: BeginInfo, target: TypeRef) -> Result<Self> {
        Self::filtered(heap, info, TypeFilter::new(target))
    }
}

impl<'h, F: NodeFilter> TreeIterMut<'h, F> {
    pub fn with_filter(heap: &'h mut Heap, filter: F) -> Self {
        Self {
            heap,
            filter,
            state: WalkState::default(),
        }
    }

    pub fn filtered(heap: &'h mut Heap, info: BeginInfo, filter: F) -> Result<Self> {
        let mut iter = Self::with_filter(heap, filter);
        iter.begin(info)?;
        Ok(iter)
    }

    pub fn begin(&mut self, info: BeginInfo) -> Result<()> {
        self.state.begin(&*self.heap, &mut self.filter, info)
    }

    pub fn valid(&self) -> bool {
        self.state.valid()
    }

    pub fn at_end(&self) -> bool {
        self.state.at_end()
    }

    pub fn get(&self) -> Result<ObjectHandle> {
        self.state.get()
    }

    pub fn advance(&mut self) -> Result<()> {
        self.state.advance(&*self.heap, &mut self.filter)
    }

    pub fn skip_subtree(&mut self) -> Result<()> {
        self.state.skip_subtree()
    }

    /// Remove the current node from its parent and move to the next node.
    ///
    /// A container element is removed, a class member becomes unset, a
    /// choice becomes unselected and a pointer becomes null. The root
    /// cannot be erased.
    pub fn erase(&mut self) -> Result<()> {
        self.state.erase(&mut *self.heap, &mut self.filter)
    }

    pub fn depth(&self) -> usize {
        self.state.depth()
    }

    pub fn slot(&self) -> Option<Slot> {
        self.state.slot()
    }

    pub fn heap(&self) -> &Heap {
        &*self.heap
    }

    pub fn heap_mut(&mut self) -> &mut Heap {
        &mut *self.heap
    }
}
