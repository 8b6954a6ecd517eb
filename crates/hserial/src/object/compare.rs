// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Structural comparison of object graphs.

use crate::error::Result;
use crate::object::{Heap, ObjectId, Value};
use std::collections::HashMap;

/// Compare two object graphs, possibly living in different heaps.
///
/// Types are compared by name so graphs built over two registries with the
/// same schema compare equal. Pointers must share targets the same way on
/// both sides: two pointers to one object on the left must point to one
/// object on the right.
pub fn graph_eq(left: &Heap, a: ObjectId, right: &Heap, b: ObjectId) -> Result<bool> {
    // Roots are free objects, so pointers back to them must map onto each other.
    let mut forward: HashMap<ObjectId, ObjectId> = HashMap::from([(a, b)]);
    let mut backward: HashMap<ObjectId, ObjectId> = HashMap::from([(b, a)]);
    let mut pending = vec![(a, b)];

    while let Some((a, b)) = pending.pop() {
        if left.descriptor(a)?.name != right.descriptor(b)?.name {
            return Ok(false);
        }
        match (left.value(a)?, right.value(b)?) {
            (Value::Primitive(x), Value::Primitive(y)) => {
                if x != y {
                    return Ok(false);
                }
            }
            (Value::Enum(x), Value::Enum(y)) => {
                if x != y {
                    return Ok(false);
                }
            }
            (Value::Class(xs), Value::Class(ys)) => {
                if xs.len() != ys.len() {
                    return Ok(false);
                }
                for (x, y) in xs.iter().zip(ys) {
                    match (x, y) {
                        (Some(x), Some(y)) => pending.push((*x, *y)),
                        (None, None) => {}
                        _ => return Ok(false),
                    }
                }
            }
            (Value::Choice(x), Value::Choice(y)) => match (x, y) {
                (Some((i, x)), Some((j, y))) if i == j => pending.push((*x, *y)),
                (None, None) => {}
                _ => return Ok(false),
            },
            (Value::Container(xs), Value::Container(ys)) => {
                if xs.len() != ys.len() {
                    return Ok(false);
                }
                pending.extend(xs.iter().copied().zip(ys.iter().copied()));
            }
            (Value::Pointer(x), Value::Pointer(y)) => match (x, y) {
                (Some(x), Some(y)) => match (forward.get(x), backward.get(y)) {
                    (Some(mapped), _) if mapped != y => return Ok(false),
                    (_, Some(mapped)) if mapped != x => return Ok(false),
                    (Some(_), Some(_)) => {}
                    _ => {
                        forward.insert(*x, *y);
                        backward.insert(*y, *x);
                        pending.push((*x, *y));
                    }
                },
                (None, None) => {}
                _ => return Ok(false),
            },
            _ => return Ok(false),
        }
    }
    Ok(true)
}
