//! Static size analysis of schemas
//!
//! [`size_of`] computes the serialized width of a schema without a
//! value in hand. Layouts containing a variable-length array cannot be
//! fully sized up front, so the result pairs a byte count with an
//! `is_variable` flag: for fixed layouts `value` is the exact encoded
//! width, for variable layouts it is the width of the statically-known
//! portion (element payloads of variable arrays excluded, their 4-byte
//! count prefixes included).
//!
//! The encode engine uses this to pre-reserve its output buffer when
//! the schema is fully fixed.

use crate::prim::LENGTH_PREFIX_BYTES;
use crate::schema::{Schema, Shape, SimpleStruct};

/// Result of sizing a schema: a byte count plus whether any part of the
/// layout depends on runtime element counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SizeInfo {
    /// Statically-known serialized width, in bytes.
    pub value: usize,
    /// True when the layout contains at least one variable-length array,
    /// making `value` a floor rather than the exact width.
    pub is_variable: bool,
}

impl SizeInfo {
    /// An exact, fully-static width.
    #[must_use]
    pub const fn fixed(value: usize) -> Self {
        SizeInfo {
            value,
            is_variable: false,
        }
    }

    /// Accumulates a member's contribution into an enclosing layout's
    /// running total. Saturates instead of wrapping so a pathological
    /// schema yields a pinned width, never a small bogus one.
    #[must_use]
    pub const fn and(self, member: SizeInfo) -> Self {
        SizeInfo {
            value: self.value.saturating_add(member.value),
            is_variable: self.is_variable || member.is_variable,
        }
    }
}

/// Computes the serialized width of `schema`.
///
/// Scalars contribute their element width, fixed arrays `width × N`,
/// and variable arrays their 4-byte count prefix with `is_variable`
/// set. Records and tuples sum their members. Custom nodes delegate to
/// the codec's size hook.
#[must_use]
pub fn size_of(schema: &Schema) -> SizeInfo {
    match schema {
        Schema::Simple(SimpleStruct { prim, shape }) => match shape {
            Shape::Scalar => SizeInfo::fixed(prim.width()),
            Shape::Fixed(len) => SizeInfo::fixed(prim.width().saturating_mul(*len)),
            Shape::Variable => SizeInfo {
                value: LENGTH_PREFIX_BYTES,
                is_variable: true,
            },
        },
        Schema::Object(fields) => fields
            .iter()
            .fold(SizeInfo::fixed(0), |acc, (_, field)| {
                acc.and(size_of(field))
            }),
        Schema::Tuple(items) => items
            .iter()
            .fold(SizeInfo::fixed(0), |acc, item| acc.and(size_of(item))),
        Schema::Custom(custom) => custom.codec().size(),
    }
}
