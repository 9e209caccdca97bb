//! Schema-driven binary struct codec
//!
//! `strukt` serializes dynamically-described record layouts to and from
//! compact little-endian byte strings. A layout is a [`Schema`] value
//! built from primitive scalars and arrays (parsed from descriptions
//! like `"u32"` or `"char[9]"`), ordered named records, fixed-arity
//! tuples, and opaque custom spans; the matching runtime data is a
//! [`Value`] tree of the same shape.
//!
//! Wire bytes carry payloads only: no field names, no type tags, no
//! padding beyond what fixed-length arrays declare. Variable-length
//! arrays are the one self-describing construct, prefixed with a 4-byte
//! little-endian element count.
//!
//! ```
//! use strukt::{decode, encode, Schema, Value};
//!
//! # fn main() -> Result<(), strukt::Error> {
//! let point = Schema::record(vec![
//!     ("x", Schema::simple("i32")?),
//!     ("y", Schema::simple("i32")?),
//! ])?;
//! let value = Value::record([("x", Value::I32(-4)), ("y", Value::I32(9))]);
//!
//! let bytes = encode(&point, &value)?;
//! assert_eq!(bytes.len(), 8);
//! assert_eq!(decode(&point, &bytes)?, value);
//! # Ok(())
//! # }
//! ```
//!
//! Schemas validate eagerly at construction and are immutable owned
//! values afterwards, freely shareable across threads. All failure
//! modes are structured: see [`error`] for the taxonomy.

pub mod decode;
pub mod encode;
pub mod error;
pub mod prim;
pub mod schema;
pub mod size;
pub mod target;
pub mod value;

pub use decode::{decode, decode_at, ByteReader};
pub use encode::{encode, encode_into};
pub use error::{
    DecodeResult, DecodingError, EncodeResult, EncodingError, Error, SchemaResult, StructError,
    StructErrorKind,
};
pub use prim::{PrimitiveType, LENGTH_PREFIX_BYTES};
pub use schema::{
    CustomCodec, CustomStruct, Decoded, Schema, Shape, SimpleStruct, StructKind, MAX_SCHEMA_DEPTH,
};
pub use size::{size_of, SizeInfo};
pub use target::{ByteCounter, Target};
pub use value::Value;
