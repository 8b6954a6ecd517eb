// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Error type shared by every hserial module.

use crate::object::ObjectId;
use std::fmt;

/// Errors raised by the type registry, object heap, iterators and streams.
#[derive(Debug)]
pub enum Error {
    // ========================================================================
    // Schema / programming errors
    // ========================================================================
    /// No type registered under this name.
    UnknownType(String),
    /// Type reference does not belong to this registry.
    InvalidTypeRef(u32),
    /// Type name registered twice.
    DuplicateType(String),
    /// Type was declared but never defined.
    UndefinedType(String),
    /// Member name not declared by the class.
    UnknownMember { type_name: String, member: String },
    /// Variant name not declared by the choice.
    UnknownVariant { type_name: String, variant: String },
    /// Object address and type descriptor disagree.
    TypeMismatch { expected: String, found: String },
    /// Operation not valid for this kind of type.
    KindMismatch { type_name: String, operation: &'static str },
    /// Address does not refer to an object of the heap.
    DanglingObject(ObjectId),
    /// Object is already embedded in another parent slot.
    AlreadyOwned(ObjectId),
    /// Pointer target is embedded inside another object.
    InteriorPointer(ObjectId),
    /// Object is the target of a pointer and cannot be embedded.
    SharedObject(ObjectId),
    /// Embedding would make an object contain itself.
    EmbeddingCycle(ObjectId),
    /// Index out of bounds for a container.
    IndexOutOfBounds { index: usize, length: usize },
    /// Current node cannot be removed from its parent.
    CannotErase(&'static str),
    /// Iterator operation requires a valid position.
    InvalidIterator,
    /// Heap reached its object limit.
    HeapFull(usize),

    // ========================================================================
    // Object registry contract
    // ========================================================================
    /// Object marked as written twice.
    AlreadyWritten(u32),
    /// Object index never registered.
    NotRegistered(u32),
    /// Objects registered during a session but never written.
    UnwrittenObjects { count: usize, first: u32 },

    // ========================================================================
    // Verification
    // ========================================================================
    /// Required member has no value.
    MemberNotSet { type_name: String, member: String },

    // ========================================================================
    // Decoding
    // ========================================================================
    /// Malformed input.
    Parse(String),
    /// Element or tag not expected at this position.
    UnexpectedElement { expected: String, found: String },
    /// Object index out of sequence.
    BadReference(u32),
    /// Back-reference to an object that was never defined.
    UnresolvedReference(u32),
    /// Output was cut short by a failed write.
    Truncated,
    /// Input buffer ended early.
    BufferTooSmall { need: usize, have: usize },
    /// Nesting deeper than the configured limit.
    DepthLimit(usize),

    // ========================================================================
    // I/O and configuration
    // ========================================================================
    /// Underlying sink or file failed.
    Io(std::io::Error),
    /// Configuration could not be loaded.
    Config(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownType(name) => write!(f, "Unknown type: {}", name),
            Self::InvalidTypeRef(index) => write!(f, "Invalid type reference: {}", index),
            Self::DuplicateType(name) => write!(f, "Type already registered: {}", name),
            Self::UndefinedType(name) => write!(f, "Type declared but not defined: {}", name),
            Self::UnknownMember { type_name, member } => {
                write!(f, "Type {} has no member {}", type_name, member)
            }
            Self::UnknownVariant { type_name, variant } => {
                write!(f, "Choice {} has no variant {}", type_name, variant)
            }
            Self::TypeMismatch { expected, found } => {
                write!(f, "Type mismatch: expected {}, found {}", expected, found)
            }
            Self::KindMismatch {
                type_name,
                operation,
            } => write!(f, "Operation {} not valid for type {}", operation, type_name),
            Self::DanglingObject(id) => write!(f, "Dangling object address: {}", id),
            Self::AlreadyOwned(id) => write!(f, "Object {} is already embedded", id),
            Self::InteriorPointer(id) => {
                write!(f, "Pointer target {} is embedded in another object", id)
            }
            Self::SharedObject(id) => {
                write!(f, "Object {} is a pointer target and cannot be embedded", id)
            }
            Self::EmbeddingCycle(id) => write!(f, "Object {} would contain itself", id),
            Self::IndexOutOfBounds { index, length } => {
                write!(f, "Index out of bounds: {} >= {}", index, length)
            }
            Self::CannotErase(reason) => write!(f, "Cannot erase: {}", reason),
            Self::InvalidIterator => write!(f, "Iterator is not positioned on a node"),
            Self::HeapFull(limit) => write!(f, "Heap is full ({} objects)", limit),
            Self::AlreadyWritten(index) => write!(f, "Object #{} written twice", index),
            Self::NotRegistered(index) => write!(f, "Object #{} was never registered", index),
            Self::UnwrittenObjects { count, first } => write!(
                f,
                "{} registered object(s) never written (first: #{})",
                count, first
            ),
            Self::MemberNotSet { type_name, member } => {
                write!(f, "Member {}.{} is not set", type_name, member)
            }
            Self::Parse(msg) => write!(f, "Parse error: {}", msg),
            Self::UnexpectedElement { expected, found } => {
                write!(f, "Unexpected element: expected {}, found {}", expected, found)
            }
            Self::BadReference(index) => write!(f, "Object index out of sequence: #{}", index),
            Self::UnresolvedReference(index) => {
                write!(f, "Reference to undefined object #{}", index)
            }
            Self::Truncated => write!(f, "Stream was truncated"),
            Self::BufferTooSmall { need, have } => {
                write!(f, "Buffer too small: need {} bytes, have {}", need, have)
            }
            Self::DepthLimit(limit) => write!(f, "Nesting exceeds depth limit {}", limit),
            Self::Io(e) => write!(f, "I/O error: {}", e),
            Self::Config(msg) => write!(f, "Configuration error: {}", msg),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<std::string::FromUtf8Error> for Error {
    fn from(e: std::string::FromUtf8Error) -> Self {
        Self::Parse(format!("invalid UTF-8: {}", e))
    }
}

/// Result alias for hserial operations.
pub type Result<T> = std::result::Result<T, Error>;
