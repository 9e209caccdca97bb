//! Schema-driven encoding engine
//!
//! [`encode`] serializes a [`Value`] tree against a [`Schema`] into a
//! fresh byte buffer; [`encode_into`] does the same against any
//! [`Target`] sink. The traversal is an explicit work-list rather than
//! recursion: composite nodes push their members onto the stack in
//! reverse so that children are serialized before later siblings and
//! bytes land in declaration order.
//!
//! Validation is interleaved with writing, so a mismatch discovered
//! mid-walk leaves partial output in the sink; [`encode`] discards the
//! buffer on error, callers of [`encode_into`] must do the same.

use crate::error::{EncodeResult, EncodingError};
use crate::prim::{LENGTH_PREFIX_BYTES, MAX_PREFIX_COUNT};
use crate::schema::{Schema, Shape, SimpleStruct};
use crate::size::size_of;
use crate::target::Target;
use crate::value::Value;

/// Serializes `value` against `schema`, returning the wire bytes.
///
/// The output buffer is pre-reserved from [`size_of`] when the schema
/// has no variable-length parts.
pub fn encode(schema: &Schema, value: &Value) -> EncodeResult<Vec<u8>> {
    let mut buf: Vec<u8> = Target::create();
    let info = size_of(schema);
    if !info.is_variable {
        buf.anticipate(info.value);
    }
    encode_into(schema, value, &mut buf)?;
    Ok(buf)
}

/// Serializes `value` against `schema` into `buf`, returning the number
/// of bytes appended.
pub fn encode_into<U: Target>(
    schema: &Schema,
    value: &Value,
    buf: &mut U,
) -> EncodeResult<usize> {
    let mut pending: Vec<(&Schema, &Value)> = vec![(schema, value)];
    let mut written = 0usize;
    while let Some((node, val)) = pending.pop() {
        match node {
            Schema::Simple(simple) => {
                written += write_simple(simple, val, buf)?;
            }
            Schema::Object(fields) => {
                let entries = match val {
                    Value::Record(entries) => entries,
                    other => return Err(shape_mismatch(node, other)),
                };
                let aligned = entries.len() == fields.len()
                    && fields
                        .iter()
                        .zip(entries)
                        .all(|((name, _), (key, _))| name == key);
                if !aligned {
                    return Err(EncodingError::KeyMismatch {
                        schema: node.clone(),
                        expected: fields.iter().map(|(name, _)| name.clone()).collect(),
                        actual: entries.iter().map(|(key, _)| key.clone()).collect(),
                    });
                }
                // Reversed so fields pop in declaration order.
                for ((_, field), (_, entry)) in fields.iter().zip(entries).rev() {
                    pending.push((field, entry));
                }
            }
            Schema::Tuple(items) => {
                let vals = match val {
                    Value::Array(vals) => vals,
                    other => return Err(shape_mismatch(node, other)),
                };
                if vals.len() != items.len() {
                    return Err(EncodingError::ArityMismatch {
                        schema: node.clone(),
                        expected: items.len(),
                        actual: vals.len(),
                    });
                }
                for pair in items.iter().zip(vals).rev() {
                    pending.push(pair);
                }
            }
            Schema::Custom(custom) => {
                let bytes = custom.codec().encode(val)?;
                written += buf.push_all(&bytes);
            }
        }
    }
    Ok(written)
}

fn shape_mismatch(schema: &Schema, value: &Value) -> EncodingError {
    EncodingError::ShapeMismatch {
        schema: schema.clone(),
        expected: schema.kind_name(),
        actual: value.kind(),
    }
}

fn write_simple<U: Target>(
    simple: &SimpleStruct,
    value: &Value,
    buf: &mut U,
) -> EncodeResult<usize> {
    match simple.shape {
        Shape::Scalar => simple.prim.write_value(value, buf),
        Shape::Variable => {
            let items = match value {
                Value::Array(items) => items,
                other => {
                    return Err(shape_mismatch(&Schema::Simple(*simple), other));
                }
            };
            if items.len() as u64 > MAX_PREFIX_COUNT {
                return Err(EncodingError::PrefixOverflow {
                    limit: MAX_PREFIX_COUNT,
                    actual: items.len(),
                });
            }
            buf.anticipate(simple.payload_width(items.len()) + LENGTH_PREFIX_BYTES);
            let mut n = buf.push_many((items.len() as u32).to_le_bytes());
            for item in items {
                n += simple.prim.write_value(item, buf)?;
            }
            Ok(n)
        }
        Shape::Fixed(len) => {
            let items = match value {
                Value::Array(items) => items,
                other => {
                    return Err(shape_mismatch(&Schema::Simple(*simple), other));
                }
            };
            if items.len() > len {
                return Err(EncodingError::OverlongSeq {
                    limit: len,
                    actual: items.len(),
                });
            }
            buf.anticipate(simple.payload_width(len));
            let mut n = 0;
            for item in items {
                n += simple.prim.write_value(item, buf)?;
            }
            // Zero-pad the undeclared tail up to the fixed length.
            for _ in items.len()..len {
                n += simple.prim.write_padding(buf);
            }
            Ok(n)
        }
    }
}
