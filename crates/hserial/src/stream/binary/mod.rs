// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Compact binary format.
//!
//! Values are little-endian and aligned to their natural size relative to
//! the start of the buffer:
//!
//! | Kind      | Encoding                                                   |
//! |-----------|------------------------------------------------------------|
//! | root      | type name, then the value                                  |
//! | primitive | fixed-size value; `char` as u32; strings and bytes with a u32 length prefix (strings null terminated) |
//! | enum      | i64                                                        |
//! | class     | per declared member: u8 presence flag, then the value if present; a class without members is one zero byte |
//! | choice    | i32 variant index (-1 = none), then the value              |
//! | container | u32 element count, then the elements                       |
//! | pointer   | u8 tag: 0 = null, 1 = new object (type name, value), 2 = back-reference (u32 index) |

mod decoder;
mod encoder;

pub use decoder::BinaryDecoder;
pub use encoder::BinaryEncoder;

use crate::config::StreamConfig;
use crate::error::Result;
use crate::object::{Heap, ObjectId};
use crate::stream::ObjectWriter;

pub(crate) const MEMBER_ABSENT: u8 = 0;
pub(crate) const MEMBER_PRESENT: u8 = 1;
pub(crate) const EMPTY_CLASS: u8 = 0;
pub(crate) const NO_VARIANT: i32 = -1;
pub(crate) const TAG_NULL: u8 = 0;
pub(crate) const TAG_NEW: u8 = 1;
pub(crate) const TAG_REF: u8 = 2;

/// Serialize the graph rooted at `root`.
pub fn to_binary(heap: &Heap, root: ObjectId) -> Result<Vec<u8>> {
    to_binary_with(heap, root, &StreamConfig::default())
}

pub fn to_binary_with(heap: &Heap, root: ObjectId, config: &StreamConfig) -> Result<Vec<u8>> {
    let mut writer = ObjectWriter::with_config(heap, BinaryEncoder::new(), config);
    writer.write(root)?;
    Ok(writer.into_encoder().into_bytes())
}

/// Rebuild an object graph from bytes into `heap`, returning the root.
pub fn from_binary(heap: &mut Heap, bytes: &[u8]) -> Result<ObjectId> {
    BinaryDecoder::new(bytes).decode(heap)
}

pub fn from_binary_with(heap: &mut Heap, bytes: &[u8], config: &StreamConfig) -> Result<ObjectId> {
    BinaryDecoder::with_config(bytes, config).decode(heap)
}
