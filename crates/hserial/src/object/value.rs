// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Object storage values.

use crate::object::ObjectId;
use crate::types::PrimitiveKind;

/// A primitive value.
#[derive(Debug, Clone, PartialEq)]
pub enum PrimitiveValue {
    Bool(bool),
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    F32(f32),
    F64(f64),
    Char(char),
    String(String),
    Bytes(Vec<u8>),
}

impl PrimitiveValue {
    /// Zero value of a primitive kind.
    // @audit-ok: Simple pattern matching - default value dispatch table
    pub fn zero(kind: PrimitiveKind) -> Self {
        match kind {
            PrimitiveKind::Bool => Self::Bool(false),
            PrimitiveKind::I8 => Self::I8(0),
            PrimitiveKind::I16 => Self::I16(0),
            PrimitiveKind::I32 => Self::I32(0),
            PrimitiveKind::I64 => Self::I64(0),
            PrimitiveKind::U8 => Self::U8(0),
            PrimitiveKind::U16 => Self::U16(0),
            PrimitiveKind::U32 => Self::U32(0),
            PrimitiveKind::U64 => Self::U64(0),
            PrimitiveKind::F32 => Self::F32(0.0),
            PrimitiveKind::F64 => Self::F64(0.0),
            PrimitiveKind::Char => Self::Char('\0'),
            PrimitiveKind::String => Self::String(String::new()),
            PrimitiveKind::Bytes => Self::Bytes(Vec::new()),
        }
    }

    /// Kind of this value.
    pub fn kind(&self) -> PrimitiveKind {
        match self {
            Self::Bool(_) => PrimitiveKind::Bool,
            Self::I8(_) => PrimitiveKind::I8,
            Self::I16(_) => PrimitiveKind::I16,
            Self::I32(_) => PrimitiveKind::I32,
            Self::I64(_) => PrimitiveKind::I64,
            Self::U8(_) => PrimitiveKind::U8,
            Self::U16(_) => PrimitiveKind::U16,
            Self::U32(_) => PrimitiveKind::U32,
            Self::U64(_) => PrimitiveKind::U64,
            Self::F32(_) => PrimitiveKind::F32,
            Self::F64(_) => PrimitiveKind::F64,
            Self::Char(_) => PrimitiveKind::Char,
            Self::String(_) => PrimitiveKind::String,
            Self::Bytes(_) => PrimitiveKind::Bytes,
        }
    }

    /// Try to get as bool.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(v) => Some(*v),
            _ => None,
        }
    }

    /// Try to get as a signed integer (any width).
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::I8(v) => Some(i64::from(*v)),
            Self::I16(v) => Some(i64::from(*v)),
            Self::I32(v) => Some(i64::from(*v)),
            Self::I64(v) => Some(*v),
            _ => None,
        }
    }

    /// Try to get as an unsigned integer (any width).
    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Self::U8(v) => Some(u64::from(*v)),
            Self::U16(v) => Some(u64::from(*v)),
            Self::U32(v) => Some(u64::from(*v)),
            Self::U64(v) => Some(*v),
            _ => None,
        }
    }

    /// Try to get as f64.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::F32(v) => Some(f64::from(*v)),
            Self::F64(v) => Some(*v),
            _ => None,
        }
    }

    /// Try to get as string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(v) => Some(v),
            _ => None,
        }
    }

    /// Try to get as bytes.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Self::Bytes(v) => Some(v),
            _ => None,
        }
    }
}

macro_rules! impl_from_primitive {
    ($ty:ty, $variant:ident) => {
        impl From<$ty> for PrimitiveValue {
            fn from(v: $ty) -> Self {
                Self::$variant(v)
            }
        }
    };
}

impl_from_primitive!(bool, Bool);
impl_from_primitive!(i8, I8);
impl_from_primitive!(i16, I16);
impl_from_primitive!(i32, I32);
impl_from_primitive!(i64, I64);
impl_from_primitive!(u8, U8);
impl_from_primitive!(u16, U16);
impl_from_primitive!(u32, U32);
impl_from_primitive!(u64, U64);
impl_from_primitive!(f32, F32);
impl_from_primitive!(f64, F64);
impl_from_primitive!(char, Char);
impl_from_primitive!(String, String);
impl_from_primitive!(Vec<u8>, Bytes);

impl From<&str> for PrimitiveValue {
    fn from(v: &str) -> Self {
        Self::String(v.to_string())
    }
}

/// Stored value of one object.
///
/// Composite values only hold child addresses; the children live in the
/// same heap.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Leaf value.
    Primitive(PrimitiveValue),
    /// Enumerator value.
    Enum(i64),
    /// One slot per declared member; `None` means "not set".
    Class(Vec<Option<ObjectId>>),
    /// Selected variant index and its object.
    Choice(Option<(usize, ObjectId)>),
    /// Elements in stored order.
    Container(Vec<ObjectId>),
    /// Pointer target (`None` is null).
    Pointer(Option<ObjectId>),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_primitive_values() {
        let v = PrimitiveValue::from(42u32);
        assert_eq!(v.as_u64(), Some(42));
        assert_eq!(v.as_i64(), None);
        assert_eq!(v.kind(), PrimitiveKind::U32);

        let v = PrimitiveValue::from(std::f64::consts::PI);
        assert_eq!(v.as_f64(), Some(std::f64::consts::PI));

        let v = PrimitiveValue::from("hello");
        assert_eq!(v.as_str(), Some("hello"));
    }

    #[test]
    fn test_zero_matches_kind() {
        for kind in PrimitiveKind::ALL {
            assert_eq!(PrimitiveValue::zero(kind).kind(), kind);
        }
    }
}
