//! Error taxonomy for schema construction, encoding, and decoding
//!
//! This module defines one error type per failure surface:
//!
//!   * [`StructError`] for invalid schema descriptions rejected at
//!     construction time,
//!   * [`EncodingError`] for schema/value mismatches and out-of-range
//!     values discovered while serializing,
//!   * [`DecodingError`] for reads that would overrun the input buffer or
//!     yield reserved values while deserializing.
//!
//! All three are lifted into the umbrella [`Error`] enum via `From`, so
//! callers that do not care about the phase of failure can hold a single
//! type. Every variant carries the structured context of the violation
//! (expected vs. actual keys, lengths, kinds) rather than a bare message,
//! so failures remain programmatically inspectable.
//!
//! None of these errors are recovered internally: validation, encoding,
//! and decoding fail fast on the first violation and propagate to the
//! caller.

use std::error::Error as StdError;
use std::fmt::{Display, Formatter, Result as FmtResult};

use crate::prim::PrimitiveType;
use crate::schema::Schema;

/// Reason classification for a [`StructError`], mirroring the two
/// recognized failure classes of schema construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StructErrorKind {
    /// The input does not describe any recognized schema shape.
    InvalidStruct,
    /// The schema is (or is assumed to be) self-referential.
    RecursiveStruct,
}

impl Display for StructErrorKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            StructErrorKind::InvalidStruct => f.write_str("INVALID_STRUCT"),
            StructErrorKind::RecursiveStruct => f.write_str("RECURSIVE_STRUCT"),
        }
    }
}

/// Errors raised while constructing or classifying a [`Schema`].
///
/// Schemas are validated eagerly, so every variant here is reported
/// before any encode or decode operation can observe the offending
/// input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StructError {
    /// The schema description was empty.
    EmptyInput,
    /// A simple-struct string did not match the grammar
    /// `<primitive>`, `<primitive>[]`, or `<primitive>[N]`.
    MalformedSimple { input: String },
    /// The base name of a simple-struct string is not a recognized
    /// primitive type.
    UnknownPrimitive { input: String },
    /// The bracket suffix of a simple-struct string did not contain a
    /// non-negative integer, or the declared length implies a total
    /// byte width not representable in `usize`.
    BadArrayLength { input: String },
    /// A record declared the same field name more than once.
    DuplicateField { name: String },
    /// Schema nesting exceeded [`MAX_SCHEMA_DEPTH`], which is treated
    /// as evidence of a self-referential description.
    ///
    /// [`MAX_SCHEMA_DEPTH`]: crate::schema::MAX_SCHEMA_DEPTH
    DepthExceeded { limit: usize, actual: usize },
}

impl StructError {
    /// Returns the coarse reason classification for this error.
    #[must_use]
    pub fn kind(&self) -> StructErrorKind {
        match self {
            StructError::DepthExceeded { .. } => StructErrorKind::RecursiveStruct,
            _ => StructErrorKind::InvalidStruct,
        }
    }
}

impl Display for StructError {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            StructError::EmptyInput => {
                write!(f, "invalid struct: empty schema description")
            }
            StructError::MalformedSimple { input } => {
                write!(
                    f,
                    "invalid struct: `{input}` does not match the simple-struct grammar"
                )
            }
            StructError::UnknownPrimitive { input } => {
                write!(f, "invalid struct: unknown primitive type `{input}`")
            }
            StructError::BadArrayLength { input } => {
                write!(f, "invalid struct: `{input}` is not a valid array length")
            }
            StructError::DuplicateField { name } => {
                write!(f, "invalid struct: duplicate record field `{name}`")
            }
            StructError::DepthExceeded { limit, actual } => {
                write!(
                    f,
                    "recursive struct: nesting depth {actual} exceeds limit of {limit} levels"
                )
            }
        }
    }
}

impl StdError for StructError {}

/// Type alias for `Result` with an error type of [`StructError`]
pub type SchemaResult<T> = std::result::Result<T, StructError>;

/// Errors raised during [`encode`](crate::encode::encode) when the value
/// tree does not match the schema's shape, or when a value cannot be
/// represented within the wire format.
///
/// Variants that report a structural mismatch carry the offending schema
/// fragment so callers can locate the violation inside a nested schema.
#[derive(Debug)]
pub enum EncodingError {
    /// The value's kind does not match the schema's kind at some
    /// recursion level (e.g. a record schema paired with an array value).
    ShapeMismatch {
        schema: Schema,
        expected: &'static str,
        actual: &'static str,
    },
    /// A scalar or array element was of the wrong primitive kind.
    ElementMismatch {
        expected: PrimitiveType,
        actual: &'static str,
    },
    /// A record value's key sequence differed from the schema's declared
    /// fields, either in membership or in order.
    KeyMismatch {
        schema: Schema,
        expected: Vec<String>,
        actual: Vec<String>,
    },
    /// A tuple value's length differed from the schema's declared arity.
    ArityMismatch {
        schema: Schema,
        expected: usize,
        actual: usize,
    },
    /// A fixed-length array value held more elements than its schema
    /// declares.
    OverlongSeq { limit: usize, actual: usize },
    /// A variable-length array held more elements than the 4-byte length
    /// prefix can represent.
    PrefixOverflow { limit: u64, actual: usize },
    /// A `char` value's codepoint does not fit in the single wire byte.
    CharRange { codepoint: u32 },
    /// Failure reported by a user-supplied custom codec.
    External(Box<dyn StdError + Send + Sync>),
}

impl EncodingError {
    /// Wraps a generic error raised inside a custom codec's `encode` hook.
    pub fn external<E: StdError + Send + Sync + 'static>(err: E) -> Self {
        Self::External(Box::new(err))
    }
}

impl Display for EncodingError {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            EncodingError::ShapeMismatch {
                expected, actual, ..
            } => {
                write!(
                    f,
                    "struct mismatch: schema expects {expected}, value is {actual}"
                )
            }
            EncodingError::ElementMismatch { expected, actual } => {
                write!(
                    f,
                    "struct mismatch: expected {expected} element, got {actual}"
                )
            }
            EncodingError::KeyMismatch {
                expected, actual, ..
            } => {
                write!(
                    f,
                    "struct mismatch: schema fields {expected:?} paired with value keys {actual:?}"
                )
            }
            EncodingError::ArityMismatch {
                expected, actual, ..
            } => {
                write!(
                    f,
                    "tuple length mismatch: schema arity {expected}, value length {actual}"
                )
            }
            EncodingError::OverlongSeq { limit, actual } => {
                write!(
                    f,
                    "{actual}-element value exceeded fixed array length of {limit} elements"
                )
            }
            EncodingError::PrefixOverflow { limit, actual } => {
                write!(
                    f,
                    "{actual} elements cannot be counted in a 4-byte length prefix (max {limit})"
                )
            }
            EncodingError::CharRange { codepoint } => {
                write!(
                    f,
                    "char codepoint {codepoint:#x} does not fit an 8-bit wire representation"
                )
            }
            EncodingError::External(err) => {
                write!(f, "custom codec failed to encode: {err}")
            }
        }
    }
}

impl StdError for EncodingError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            EncodingError::External(err) => Some(err.as_ref()),
            _ => None,
        }
    }
}

/// Type alias for `Result` with an error type of [`EncodingError`]
pub type EncodeResult<T> = std::result::Result<T, EncodingError>;

/// Errors raised during [`decode`](crate::decode::decode) when the byte
/// buffer cannot supply the bytes the schema demands, or when a decoded
/// element is a reserved value.
#[derive(Debug)]
pub enum DecodingError {
    /// A read would advance the cursor past the end of the buffer.
    ///
    /// A corrupt length prefix implying an out-of-range read surfaces as
    /// this same case, with `requested` reflecting the implied byte count.
    Overrun {
        offset: usize,
        requested: usize,
        limit: usize,
    },
    /// A scalar `char` decoded to the reserved NUL byte.
    ReservedChar { offset: usize },
    /// Failure reported by a user-supplied custom codec.
    External(Box<dyn StdError + Send + Sync>),
}

impl DecodingError {
    /// Wraps a generic error raised inside a custom codec's `decode` hook.
    pub fn external<E: StdError + Send + Sync + 'static>(err: E) -> Self {
        Self::External(Box::new(err))
    }
}

impl Display for DecodingError {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            DecodingError::Overrun {
                offset,
                requested,
                limit,
            } => {
                write!(
                    f,
                    "cannot consume {requested} bytes at offset {offset} of a {limit}-byte buffer"
                )
            }
            DecodingError::ReservedChar { offset } => {
                write!(
                    f,
                    "reserved NUL byte decoded as scalar char at offset {offset}"
                )
            }
            DecodingError::External(err) => {
                write!(f, "custom codec failed to decode: {err}")
            }
        }
    }
}

impl StdError for DecodingError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            DecodingError::External(err) => Some(err.as_ref()),
            _ => None,
        }
    }
}

/// Type alias for `Result` with an error type of [`DecodingError`]
pub type DecodeResult<T> = std::result::Result<T, DecodingError>;

/// Umbrella error over all three failure surfaces of the codec.
#[derive(Debug)]
pub enum Error {
    /// Error encountered while constructing or classifying a schema.
    Struct(StructError),
    /// Error encountered while encoding a value against a schema.
    Encoding(EncodingError),
    /// Error encountered while decoding bytes against a schema.
    Decoding(DecodingError),
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Error::Struct(err) => Display::fmt(err, f),
            Error::Encoding(err) => Display::fmt(err, f),
            Error::Decoding(err) => Display::fmt(err, f),
        }
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            Error::Struct(err) => Some(err),
            Error::Encoding(err) => Some(err),
            Error::Decoding(err) => Some(err),
        }
    }
}

impl From<StructError> for Error {
    fn from(err: StructError) -> Self {
        Self::Struct(err)
    }
}

impl From<EncodingError> for Error {
    fn from(err: EncodingError) -> Self {
        Self::Encoding(err)
    }
}

impl From<DecodingError> for Error {
    fn from(err: DecodingError) -> Self {
        Self::Decoding(err)
    }
}
