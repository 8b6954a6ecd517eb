// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Depth-first walk state shared by the const and mutable iterators.
//!
//! The walk keeps one [`Level`] per depth instead of recursing, so deep
//! graphs cannot overflow the call stack and dropping the iterator
//! unwinds everything at once.

use crate::error::{Error, Result};
use crate::iter::NodeFilter;
use crate::object::{BeginInfo, Child, Heap, ObjectHandle, ObjectId, Slot};
use std::collections::HashSet;

/// One depth of the walk: the node under consideration and its parent.
#[derive(Debug, Clone, Copy)]
struct Level {
    parent: Option<ObjectId>,
    current: Child,
}

#[derive(Debug, Default)]
pub(crate) struct WalkState {
    levels: Vec<Level>,
    visited: Option<HashSet<ObjectId>>,
    selected: Option<ObjectHandle>,
    skip_subtree: bool,
}

impl WalkState {
    /// Position on `info.root`, or on the first node after it that the
    /// filter selects.
    pub(crate) fn begin<F: NodeFilter>(
        &mut self,
        heap: &Heap,
        filter: &mut F,
        info: BeginInfo,
    ) -> Result<()> {
        let root = info.root();
        heap.checked_handle(root.id(), root.type_ref())?;
        self.clear();
        self.visited = info.detects_loops().then(HashSet::new);
        self.levels.push(Level {
            parent: None,
            current: Child {
                slot: Slot::Root,
                id: root.id(),
                declared: root.type_ref(),
            },
        });
        self.settle(heap, filter)
    }

    pub(crate) fn clear(&mut self) {
        self.levels.clear();
        self.visited = None;
        self.selected = None;
        self.skip_subtree = false;
    }

    pub(crate) fn valid(&self) -> bool {
        self.selected.is_some()
    }

    pub(crate) fn at_end(&self) -> bool {
        self.levels.is_empty()
    }

    pub(crate) fn get(&self) -> Result<ObjectHandle> {
        self.selected.ok_or(Error::InvalidIterator)
    }

    pub(crate) fn depth(&self) -> usize {
        self.levels.len().saturating_sub(1)
    }

    pub(crate) fn slot(&self) -> Option<Slot> {
        self.selected?;
        self.levels.last().map(|level| level.current.slot)
    }

    pub(crate) fn skip_subtree(&mut self) -> Result<()> {
        if !self.valid() {
            return Err(Error::InvalidIterator);
        }
        self.skip_subtree = true;
        Ok(())
    }

    /// Move to the next selectable node.
    pub(crate) fn advance<F: NodeFilter>(&mut self, heap: &Heap, filter: &mut F) -> Result<()> {
        if !self.valid() {
            return Err(Error::InvalidIterator);
        }
        self.selected = None;
        self.step(heap, filter)?;
        self.settle(heap, filter)
    }

    /// Detach the current node from its parent, then move on.
    pub(crate) fn erase<F: NodeFilter>(&mut self, heap: &mut Heap, filter: &mut F) -> Result<()> {
        if !self.valid() {
            return Err(Error::InvalidIterator);
        }
        let level = self.levels.last().copied().ok_or(Error::InvalidIterator)?;
        let parent = level
            .parent
            .ok_or(Error::CannotErase("traversal root has no parent"))?;
        heap.detach(parent, level.current.slot)?;
        self.selected = None;
        self.skip_subtree = false;

        // A removed element leaves its successor at the same index.
        let from = match level.current.slot {
            Slot::Element(index) => index,
            other => other.position() + 1,
        };
        match heap.next_child(parent, from)? {
            Some(next) => {
                if let Some(top) = self.levels.last_mut() {
                    top.current = next;
                }
            }
            None => {
                self.levels.pop();
                self.next_sibling(heap)?;
            }
        }
        self.settle(heap, filter)
    }

    /// Walk from the current candidate until a node is selected or the
    /// stack empties.
    fn settle<F: NodeFilter>(&mut self, heap: &Heap, filter: &mut F) -> Result<()> {
        debug_assert!(self.selected.is_none());
        while let Some(level) = self.levels.last().copied() {
            let id = level.current.id;
            if let Some(visited) = self.visited.as_mut() {
                if !visited.insert(id) {
                    log::trace!("[TreeIter] skip revisit of {}", id);
                    self.next_sibling(heap)?;
                    continue;
                }
            }
            let handle = heap.handle(id)?;
            if filter.can_select(heap, handle) {
                self.selected = Some(handle);
                break;
            }
            self.step(heap, filter)?;
        }
        debug_assert!(self.valid() || self.at_end());
        Ok(())
    }

    /// Descend into the current candidate, or move past it.
    fn step<F: NodeFilter>(&mut self, heap: &Heap, filter: &mut F) -> Result<()> {
        let Some(level) = self.levels.last().copied() else {
            return Ok(());
        };
        let skip = std::mem::take(&mut self.skip_subtree);
        if !skip && filter.can_enter(heap.registry(), level.current.declared) {
            if let Some(first) = heap.next_child(level.current.id, 0)? {
                self.levels.push(Level {
                    parent: Some(level.current.id),
                    current: first,
                });
                return Ok(());
            }
        }
        self.next_sibling(heap)
    }

    /// Replace the top candidate by its next sibling, popping exhausted
    /// levels.
    fn next_sibling(&mut self, heap: &Heap) -> Result<()> {
        while let Some(level) = self.levels.last_mut() {
            if let Some(parent) = level.parent {
                let from = level.current.slot.position() + 1;
                if let Some(next) = heap.next_child(parent, from)? {
                    level.current = next;
                    return Ok(());
                }
            }
            self.levels.pop();
        }
        Ok(())
    }
}
