//! Primitive wire types and their element-level codecs
//!
//! Each [`PrimitiveType`] names one machine number (or `char`) with a
//! fixed wire width. Multi-byte widths are laid out little-endian;
//! signed integers use two's complement; floats use IEEE 754 binary32
//! and binary64. `char` occupies a single byte, so only codepoints
//! below 256 are encodable.
//!
//! This module owns the per-element encode path. Framing concerns
//! (length prefixes, fixed-array padding) live in the encode and decode
//! engines, which call down into [`PrimitiveType::write_value`] and
//! [`PrimitiveType::write_padding`] one element at a time.

use std::collections::HashMap;
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

use lazy_static::lazy_static;

use crate::error::{EncodeResult, EncodingError, StructError};
use crate::target::Target;
use crate::value::Value;

/// Width, in bytes, of the little-endian unsigned element count that
/// prefixes every variable-length array.
pub const LENGTH_PREFIX_BYTES: usize = 4;

/// Largest element count representable in a variable-length array's
/// count prefix.
pub const MAX_PREFIX_COUNT: u64 = u32::MAX as u64;

/// The set of primitive wire types a schema leaf can name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveType {
    Char,
    U8,
    U16,
    U32,
    U64,
    I8,
    I16,
    I32,
    I64,
    F32,
    F64,
}

impl PrimitiveType {
    /// Every primitive type, in width-then-signedness order.
    pub const ALL: [PrimitiveType; 11] = [
        PrimitiveType::Char,
        PrimitiveType::U8,
        PrimitiveType::U16,
        PrimitiveType::U32,
        PrimitiveType::U64,
        PrimitiveType::I8,
        PrimitiveType::I16,
        PrimitiveType::I32,
        PrimitiveType::I64,
        PrimitiveType::F32,
        PrimitiveType::F64,
    ];

    /// Width of one element in bits.
    #[must_use]
    pub const fn bit_width(self) -> usize {
        self.width() * 8
    }

    /// Serialized width of one element, in bytes.
    #[must_use]
    pub const fn width(self) -> usize {
        match self {
            PrimitiveType::Char | PrimitiveType::U8 | PrimitiveType::I8 => 1,
            PrimitiveType::U16 | PrimitiveType::I16 => 2,
            PrimitiveType::U32 | PrimitiveType::I32 | PrimitiveType::F32 => 4,
            PrimitiveType::U64 | PrimitiveType::I64 | PrimitiveType::F64 => 8,
        }
    }

    /// The schema-level spelling of this type.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            PrimitiveType::Char => "char",
            PrimitiveType::U8 => "u8",
            PrimitiveType::U16 => "u16",
            PrimitiveType::U32 => "u32",
            PrimitiveType::U64 => "u64",
            PrimitiveType::I8 => "i8",
            PrimitiveType::I16 => "i16",
            PrimitiveType::I32 => "i32",
            PrimitiveType::I64 => "i64",
            PrimitiveType::F32 => "f32",
            PrimitiveType::F64 => "f64",
        }
    }

    /// Serializes one element of this type into `buf`, returning the
    /// number of bytes written (always [`Self::width`] on success).
    ///
    /// Fails with [`EncodingError::ElementMismatch`] when `val` is not
    /// of this primitive kind, and with [`EncodingError::CharRange`]
    /// for a `char` whose codepoint exceeds a single byte.
    pub fn write_value<U: Target>(self, val: &Value, buf: &mut U) -> EncodeResult<usize> {
        match (self, val) {
            (PrimitiveType::Char, Value::Char(c)) => {
                let codepoint = u32::from(*c);
                if codepoint > 0xff {
                    return Err(EncodingError::CharRange { codepoint });
                }
                Ok(buf.push_one(codepoint as u8))
            }
            (PrimitiveType::U8, Value::U8(n)) => Ok(buf.push_one(*n)),
            (PrimitiveType::U16, Value::U16(n)) => Ok(buf.push_many(n.to_le_bytes())),
            (PrimitiveType::U32, Value::U32(n)) => Ok(buf.push_many(n.to_le_bytes())),
            (PrimitiveType::U64, Value::U64(n)) => Ok(buf.push_many(n.to_le_bytes())),
            (PrimitiveType::I8, Value::I8(n)) => Ok(buf.push_many(n.to_le_bytes())),
            (PrimitiveType::I16, Value::I16(n)) => Ok(buf.push_many(n.to_le_bytes())),
            (PrimitiveType::I32, Value::I32(n)) => Ok(buf.push_many(n.to_le_bytes())),
            (PrimitiveType::I64, Value::I64(n)) => Ok(buf.push_many(n.to_le_bytes())),
            (PrimitiveType::F32, Value::F32(x)) => Ok(buf.push_many(x.to_le_bytes())),
            (PrimitiveType::F64, Value::F64(x)) => Ok(buf.push_many(x.to_le_bytes())),
            (expected, actual) => Err(EncodingError::ElementMismatch {
                expected,
                actual: actual.kind(),
            }),
        }
    }

    /// Writes one zeroed element of this type, used to pad fixed-length
    /// arrays whose value holds fewer elements than the schema declares.
    pub fn write_padding<U: Target>(self, buf: &mut U) -> usize {
        match self.width() {
            1 => buf.push_one(0),
            2 => buf.push_many([0u8; 2]),
            4 => buf.push_many([0u8; 4]),
            _ => buf.push_many([0u8; 8]),
        }
    }

    /// Reassembles one element from its little-endian wire bytes.
    ///
    /// `raw` must be exactly [`Self::width`] bytes; the decoding engine
    /// guarantees this by sizing its reads from the same width table.
    #[must_use]
    pub fn read_value(self, raw: &[u8]) -> Value {
        debug_assert_eq!(raw.len(), self.width());
        let mut wide = [0u8; 8];
        wide[..raw.len()].copy_from_slice(raw);
        match self {
            // Latin-1 single-byte mapping; every byte is a valid codepoint.
            PrimitiveType::Char => Value::Char(char::from(raw[0])),
            PrimitiveType::U8 => Value::U8(raw[0]),
            PrimitiveType::U16 => Value::U16(u16::from_le_bytes([raw[0], raw[1]])),
            PrimitiveType::U32 => {
                Value::U32(u32::from_le_bytes([raw[0], raw[1], raw[2], raw[3]]))
            }
            PrimitiveType::U64 => Value::U64(u64::from_le_bytes(wide)),
            PrimitiveType::I8 => Value::I8(raw[0] as i8),
            PrimitiveType::I16 => Value::I16(i16::from_le_bytes([raw[0], raw[1]])),
            PrimitiveType::I32 => {
                Value::I32(i32::from_le_bytes([raw[0], raw[1], raw[2], raw[3]]))
            }
            PrimitiveType::I64 => Value::I64(i64::from_le_bytes(wide)),
            PrimitiveType::F32 => {
                Value::F32(f32::from_le_bytes([raw[0], raw[1], raw[2], raw[3]]))
            }
            PrimitiveType::F64 => Value::F64(f64::from_le_bytes(wide)),
        }
    }
}

impl Display for PrimitiveType {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.name())
    }
}

lazy_static! {
    /// Lookup table from schema spelling to primitive type. Names are
    /// case-sensitive; `U8` or `Char` are not recognized.
    static ref BY_NAME: HashMap<&'static str, PrimitiveType> = {
        let mut table = HashMap::with_capacity(PrimitiveType::ALL.len());
        for prim in PrimitiveType::ALL {
            table.insert(prim.name(), prim);
        }
        table
    };
}

impl FromStr for PrimitiveType {
    type Err = StructError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BY_NAME
            .get(s)
            .copied()
            .ok_or_else(|| StructError::UnknownPrimitive {
                input: s.to_owned(),
            })
    }
}
