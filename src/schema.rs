//! Schema descriptions for binary struct layouts
//!
//! A [`Schema`] is a validated, owned description of a wire layout,
//! built from four node kinds:
//!
//!   * [`Schema::Simple`]: a primitive scalar or a primitive array,
//!     parsed from the textual grammar `<prim>`, `<prim>[]`, `<prim>[N]`,
//!   * [`Schema::Object`]: an ordered list of named fields, each with
//!     its own schema,
//!   * [`Schema::Tuple`]: a fixed-arity ordered sequence of schemas,
//!   * [`Schema::Custom`]: an opaque layout delegated to user-supplied
//!     [`CustomCodec`] hooks.
//!
//! All validation happens at construction: malformed simple-struct
//! strings, unknown primitive names, duplicate record fields, and
//! over-deep nesting are rejected with a [`StructError`] before the
//! schema can reach an encode or decode call. A successfully built
//! `Schema` is therefore always safe to walk.
//!
//! Field order is declaration order, and it is load-bearing: objects
//! encode their fields, and decode them back, in exactly the order the
//! schema lists them.

use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::str::FromStr;
use std::sync::Arc;

use crate::error::{DecodeResult, EncodeResult, SchemaResult, StructError};
use crate::prim::PrimitiveType;
use crate::size::SizeInfo;
use crate::value::Value;

/// Maximum allowed nesting depth of a schema tree.
///
/// Owned schema values cannot form reference cycles, so unbounded
/// recursion can only arise from a pathologically deep description;
/// exceeding this bound is classified as a recursive struct.
pub const MAX_SCHEMA_DEPTH: usize = 64;

/// Element multiplicity of a simple struct.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Shape {
    /// A single element, no framing.
    Scalar,
    /// Exactly `N` elements on the wire, no length prefix; short values
    /// are zero-padded and long values are rejected.
    Fixed(usize),
    /// As many elements as the value holds, preceded by a 4-byte
    /// little-endian element count.
    Variable,
}

/// Coarse classification of a schema node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StructKind {
    Simple,
    Object,
    Tuple,
    Custom,
}

/// A primitive leaf layout: one element type plus its multiplicity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SimpleStruct {
    pub prim: PrimitiveType,
    pub shape: Shape,
}

impl SimpleStruct {
    /// Bytes occupied by the element payload of a value with `count`
    /// elements, exclusive of any length prefix. Saturates rather than
    /// wrapping for counts parsing would have rejected.
    #[must_use]
    pub fn payload_width(&self, count: usize) -> usize {
        self.prim.width().saturating_mul(count)
    }

    /// Whether this layout carries multiple elements.
    #[must_use]
    pub const fn is_array(&self) -> bool {
        !matches!(self.shape, Shape::Scalar)
    }

    /// Declared element count of a fixed array, `None` for scalars and
    /// variable-length arrays.
    #[must_use]
    pub const fn array_length(&self) -> Option<usize> {
        match self.shape {
            Shape::Fixed(len) => Some(len),
            Shape::Scalar | Shape::Variable => None,
        }
    }
}

impl FromStr for SimpleStruct {
    type Err = StructError;

    /// Parses the simple-struct grammar: a primitive name, optionally
    /// followed by `[]` or `[N]` for a non-negative decimal `N`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err(StructError::EmptyInput);
        }
        let (base, shape) = match s.find('[') {
            None => (s, Shape::Scalar),
            Some(open) => {
                let (base, suffix) = s.split_at(open);
                let inner = suffix
                    .strip_prefix('[')
                    .and_then(|rest| rest.strip_suffix(']'))
                    .ok_or_else(|| StructError::MalformedSimple {
                        input: s.to_owned(),
                    })?;
                if inner.is_empty() {
                    (base, Shape::Variable)
                } else if inner.bytes().all(|b| b.is_ascii_digit()) {
                    let len = inner
                        .parse::<usize>()
                        .map_err(|_| StructError::BadArrayLength {
                            input: s.to_owned(),
                        })?;
                    (base, Shape::Fixed(len))
                } else {
                    return Err(StructError::BadArrayLength {
                        input: s.to_owned(),
                    });
                }
            }
        };
        let prim = base.parse::<PrimitiveType>()?;
        // A fixed length whose total byte width cannot be represented
        // describes an unencodable layout; reject it with the length.
        if let Shape::Fixed(len) = shape {
            if prim.width().checked_mul(len).is_none() {
                return Err(StructError::BadArrayLength {
                    input: s.to_owned(),
                });
            }
        }
        Ok(SimpleStruct { prim, shape })
    }
}

/// Result of a custom codec's decode hook: the reconstructed value and
/// the number of input bytes it consumed.
#[derive(Clone, Debug, PartialEq)]
pub struct Decoded {
    pub value: Value,
    /// Bytes consumed from the start of the slice handed to the hook.
    /// The decoding engine advances its cursor by exactly this amount.
    pub bytes_consumed: usize,
}

/// User-supplied codec hooks backing a [`Schema::Custom`] node.
///
/// The engines treat a custom node as an opaque span: `encode` renders
/// the value to bytes, `decode` reads bytes starting at `offset` of the
/// full input buffer and reports how many it consumed, and `size`
/// predicts the encoded width without rendering.
pub trait CustomCodec {
    /// Serializes `value` into its custom wire form.
    fn encode(&self, value: &Value) -> EncodeResult<Vec<u8>>;

    /// Reconstructs a value from `input[offset..]`. Bytes past the
    /// reported [`Decoded::bytes_consumed`] belong to later fields and
    /// must be left untouched.
    fn decode(&self, input: &[u8], offset: usize) -> DecodeResult<Decoded>;

    /// Static width estimate for this layout, folded into
    /// [`size_of`](crate::size::size_of) results for enclosing schemas.
    fn size(&self) -> SizeInfo;
}

/// An opaque schema node wrapping shared [`CustomCodec`] hooks.
///
/// Equality is identity of the underlying codec allocation, so a
/// cloned schema compares equal to its original while two independent
/// wrappers of equivalent hooks do not.
#[derive(Clone)]
pub struct CustomStruct {
    codec: Arc<dyn CustomCodec + Send + Sync>,
}

impl CustomStruct {
    pub fn new<C: CustomCodec + Send + Sync + 'static>(codec: C) -> Self {
        CustomStruct {
            codec: Arc::new(codec),
        }
    }

    #[must_use]
    pub fn codec(&self) -> &(dyn CustomCodec + Send + Sync) {
        self.codec.as_ref()
    }
}

impl Debug for CustomStruct {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("CustomStruct").finish_non_exhaustive()
    }
}

impl PartialEq for CustomStruct {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.codec, &other.codec)
    }
}

/// A validated layout description ready for encoding and decoding.
#[derive(Clone, Debug, PartialEq)]
pub enum Schema {
    /// Primitive scalar or primitive array.
    Simple(SimpleStruct),
    /// Ordered named fields; names are unique and order is significant.
    Object(Vec<(String, Schema)>),
    /// Fixed-arity positional sequence.
    Tuple(Vec<Schema>),
    /// Layout delegated to user hooks.
    Custom(CustomStruct),
}

impl Schema {
    /// Parses a simple-struct description such as `"u32"`, `"char[]"`,
    /// or `"f64[20]"`.
    pub fn simple(desc: &str) -> SchemaResult<Self> {
        desc.parse::<SimpleStruct>().map(Schema::Simple)
    }

    /// Builds an object schema from ordered named fields, rejecting
    /// duplicate names and over-deep nesting.
    ///
    /// An empty field list is a valid schema that encodes to zero bytes.
    pub fn record<S: Into<String>>(fields: Vec<(S, Schema)>) -> SchemaResult<Self> {
        let fields: Vec<(String, Schema)> = fields
            .into_iter()
            .map(|(name, schema)| (name.into(), schema))
            .collect();
        for (i, (name, _)) in fields.iter().enumerate() {
            if fields[..i].iter().any(|(seen, _)| seen == name) {
                return Err(StructError::DuplicateField { name: name.clone() });
            }
        }
        Self::check_depth(fields.iter().map(|(_, schema)| schema))?;
        Ok(Schema::Object(fields))
    }

    /// Builds a tuple schema from positional item schemas, rejecting
    /// over-deep nesting.
    pub fn tuple(items: Vec<Schema>) -> SchemaResult<Self> {
        Self::check_depth(items.iter())?;
        Ok(Schema::Tuple(items))
    }

    /// Wraps user codec hooks as an opaque schema node.
    pub fn custom<C: CustomCodec + Send + Sync + 'static>(codec: C) -> Self {
        Schema::Custom(CustomStruct::new(codec))
    }

    /// Coarse classification of this node.
    #[must_use]
    pub fn kind(&self) -> StructKind {
        match self {
            Schema::Simple(_) => StructKind::Simple,
            Schema::Object(_) => StructKind::Object,
            Schema::Tuple(_) => StructKind::Tuple,
            Schema::Custom(_) => StructKind::Custom,
        }
    }

    /// Short static name for this node's kind, used in mismatch
    /// diagnostics.
    #[must_use]
    pub fn kind_name(&self) -> &'static str {
        match self {
            Schema::Simple(SimpleStruct {
                shape: Shape::Scalar,
                ..
            }) => "scalar",
            Schema::Simple(_) => "array",
            Schema::Object(_) => "record",
            Schema::Tuple(_) => "tuple",
            Schema::Custom(_) => "custom",
        }
    }

    /// Nesting depth of this schema tree; a leaf has depth 1.
    #[must_use]
    pub fn depth(&self) -> usize {
        match self {
            Schema::Simple(_) | Schema::Custom(_) => 1,
            Schema::Object(fields) => {
                1 + fields
                    .iter()
                    .map(|(_, schema)| schema.depth())
                    .max()
                    .unwrap_or(0)
            }
            Schema::Tuple(items) => {
                1 + items.iter().map(Schema::depth).max().unwrap_or(0)
            }
        }
    }

    fn check_depth<'a, I: Iterator<Item = &'a Schema>>(children: I) -> SchemaResult<()> {
        let depth = 1 + children.map(Schema::depth).max().unwrap_or(0);
        if depth > MAX_SCHEMA_DEPTH {
            return Err(StructError::DepthExceeded {
                limit: MAX_SCHEMA_DEPTH,
                actual: depth,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DecodingError;

    #[test]
    fn parses_scalar_descriptions() {
        for prim in PrimitiveType::ALL {
            let schema = Schema::simple(prim.name()).unwrap();
            assert_eq!(
                schema,
                Schema::Simple(SimpleStruct {
                    prim,
                    shape: Shape::Scalar
                })
            );
        }
    }

    #[test]
    fn parses_array_suffixes() {
        assert_eq!(
            "u16[]".parse::<SimpleStruct>().unwrap().shape,
            Shape::Variable
        );
        assert_eq!(
            "f64[20]".parse::<SimpleStruct>().unwrap().shape,
            Shape::Fixed(20)
        );
        // Lengths are not limited to a single digit.
        assert_eq!(
            "u8[1000]".parse::<SimpleStruct>().unwrap().shape,
            Shape::Fixed(1000)
        );
        assert_eq!(
            "char[0]".parse::<SimpleStruct>().unwrap().shape,
            Shape::Fixed(0)
        );
    }

    #[test]
    fn rejects_malformed_descriptions() {
        assert_eq!("".parse::<SimpleStruct>(), Err(StructError::EmptyInput));
        for bad in ["u8[", "u8[3", "u8[3]x"] {
            assert!(
                matches!(
                    bad.parse::<SimpleStruct>(),
                    Err(StructError::MalformedSimple { .. })
                ),
                "{bad:?} should be malformed"
            );
        }
        for bad in ["u8[-1]", "u8[+3]", "u8[ 3]", "u8[3.5]", "u8[]]"] {
            assert!(
                matches!(
                    bad.parse::<SimpleStruct>(),
                    Err(StructError::BadArrayLength { .. })
                ),
                "{bad:?} should have a bad length"
            );
        }
        for bad in ["u7[4]", "u8]"] {
            assert!(
                matches!(
                    bad.parse::<SimpleStruct>(),
                    Err(StructError::UnknownPrimitive { .. })
                ),
                "{bad:?} has no recognizable primitive name"
            );
        }
    }

    #[test]
    fn rejects_fixed_lengths_with_unrepresentable_byte_width() {
        // 8 bytes x 2^62 elements overflows usize on every target.
        for bad in ["u64[4611686018427387904]", "f64[18446744073709551615]"] {
            assert!(
                matches!(
                    bad.parse::<SimpleStruct>(),
                    Err(StructError::BadArrayLength { .. })
                ),
                "{bad:?} declares an unrepresentable byte width"
            );
        }
        // Single-byte elements keep the full length range.
        assert_eq!(
            "u8[18446744073709551615]".parse::<SimpleStruct>().unwrap().shape,
            Shape::Fixed(usize::MAX)
        );
    }

    #[test]
    fn record_rejects_duplicate_fields() {
        let err = Schema::record(vec![
            ("id", Schema::simple("u32").unwrap()),
            ("id", Schema::simple("u8").unwrap()),
        ])
        .unwrap_err();
        assert_eq!(
            err,
            StructError::DuplicateField {
                name: "id".to_owned()
            }
        );
    }

    #[test]
    fn empty_record_is_valid() {
        let schema = Schema::record(Vec::<(String, Schema)>::new()).unwrap();
        assert_eq!(schema.kind(), StructKind::Object);
        assert_eq!(schema.depth(), 1);
    }

    #[test]
    fn depth_guard_flags_deep_nesting() {
        let mut schema = Schema::simple("u8").unwrap();
        for _ in 0..(MAX_SCHEMA_DEPTH - 1) {
            schema = Schema::record(vec![("inner", schema)]).unwrap();
        }
        assert_eq!(schema.depth(), MAX_SCHEMA_DEPTH);

        let err = Schema::record(vec![("inner", schema)]).unwrap_err();
        assert_eq!(err.kind(), crate::error::StructErrorKind::RecursiveStruct);
        assert_eq!(
            err,
            StructError::DepthExceeded {
                limit: MAX_SCHEMA_DEPTH,
                actual: MAX_SCHEMA_DEPTH + 1,
            }
        );
    }

    struct NoopCodec;

    impl CustomCodec for NoopCodec {
        fn encode(&self, _: &Value) -> EncodeResult<Vec<u8>> {
            Ok(Vec::new())
        }
        fn decode(&self, _: &[u8], _: usize) -> Result<Decoded, DecodingError> {
            Ok(Decoded {
                value: Value::Record(Vec::new()),
                bytes_consumed: 0,
            })
        }
        fn size(&self) -> SizeInfo {
            SizeInfo::fixed(0)
        }
    }

    #[test]
    fn custom_equality_is_codec_identity() {
        let original = Schema::custom(NoopCodec);
        let clone = original.clone();
        let unrelated = Schema::custom(NoopCodec);
        assert_eq!(original, clone);
        assert_ne!(original, unrelated);
    }
}
