//! Schema-driven decoding engine
//!
//! [`decode`] reconstructs a [`Value`] tree from wire bytes by walking
//! the schema recursively, threading a [`ByteReader`] cursor through
//! the traversal. Each node consumes exactly the bytes its layout
//! demands and leaves the cursor at the start of the next sibling's
//! payload; composition is by relative deltas, so no node ever needs to
//! know its absolute position except for diagnostics.
//!
//! Trailing bytes past the schema's layout are not an error; the cursor
//! simply stops before them.

use cfg_if::cfg_if;

use crate::error::{DecodeResult, DecodingError};
use crate::prim::{PrimitiveType, LENGTH_PREFIX_BYTES};
use crate::schema::{Schema, Shape, SimpleStruct};
use crate::value::Value;

/// Cursor over an immutable byte buffer with overrun-checked reads.
///
/// Every successful [`take`](ByteReader::take) advances the offset by
/// exactly the requested count; a read past the end fails without
/// moving the cursor.
#[derive(Debug, Clone, Copy)]
pub struct ByteReader<'a> {
    buf: &'a [u8],
    offset: usize,
}

impl<'a> ByteReader<'a> {
    /// Creates a cursor positioned at the start of `buf`.
    #[must_use]
    pub fn new(buf: &'a [u8]) -> Self {
        ByteReader { buf, offset: 0 }
    }

    /// Creates a cursor positioned at `offset` into `buf`. Offsets past
    /// the end are representable; the first read will report overrun.
    #[must_use]
    pub fn starting_at(buf: &'a [u8], offset: usize) -> Self {
        ByteReader { buf, offset }
    }

    /// Current absolute offset into the underlying buffer.
    #[must_use]
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Bytes remaining between the cursor and the end of the buffer.
    #[must_use]
    pub fn remainder(&self) -> usize {
        self.buf.len().saturating_sub(self.offset)
    }

    /// The full underlying buffer, independent of cursor position.
    #[must_use]
    pub fn bytes(&self) -> &'a [u8] {
        self.buf
    }

    /// Consumes and returns the next `count` bytes.
    pub fn take(&mut self, count: usize) -> DecodeResult<&'a [u8]> {
        if count > self.remainder() {
            return Err(DecodingError::Overrun {
                offset: self.offset,
                requested: count,
                limit: self.buf.len(),
            });
        }
        let span = &self.buf[self.offset..self.offset + count];
        self.offset += count;
        Ok(span)
    }

    /// Consumes the next `N` bytes into a fixed-size array.
    pub fn take_fixed<const N: usize>(&mut self) -> DecodeResult<[u8; N]> {
        let mut arr = [0u8; N];
        arr.copy_from_slice(self.take(N)?);
        Ok(arr)
    }
}

/// Reconstructs a value from the start of `input`, consuming exactly
/// the bytes the schema's layout demands.
pub fn decode(schema: &Schema, input: &[u8]) -> DecodeResult<Value> {
    decode_at(schema, input, 0)
}

/// Reconstructs a value whose serialized form begins at `offset` into
/// `input`.
pub fn decode_at(schema: &Schema, input: &[u8], offset: usize) -> DecodeResult<Value> {
    let mut reader = ByteReader::starting_at(input, offset);
    decode_node(schema, &mut reader)
}

fn decode_node(schema: &Schema, reader: &mut ByteReader<'_>) -> DecodeResult<Value> {
    match schema {
        Schema::Simple(simple) => decode_simple(simple, reader),
        Schema::Object(fields) => {
            let mut entries = Vec::with_capacity(fields.len());
            for (name, field) in fields {
                entries.push((name.clone(), decode_node(field, reader)?));
            }
            Ok(Value::Record(entries))
        }
        Schema::Tuple(items) => {
            let mut vals = Vec::with_capacity(items.len());
            for item in items {
                vals.push(decode_node(item, reader)?);
            }
            Ok(Value::Array(vals))
        }
        Schema::Custom(custom) => {
            let decoded = custom.codec().decode(reader.bytes(), reader.offset())?;
            // Bounds-check the reported consumption before advancing.
            reader.take(decoded.bytes_consumed)?;
            Ok(decoded.value)
        }
    }
}

fn decode_simple(simple: &SimpleStruct, reader: &mut ByteReader<'_>) -> DecodeResult<Value> {
    match simple.shape {
        Shape::Scalar => {
            let at = reader.offset();
            let val = read_element(simple.prim, reader)?;
            if let Value::Char('\0') = val {
                check_scalar_nul(at)?;
            }
            Ok(val)
        }
        Shape::Fixed(len) => read_elements(simple.prim, len, reader),
        Shape::Variable => {
            let raw = reader.take_fixed::<LENGTH_PREFIX_BYTES>()?;
            let count = u32::from_le_bytes(raw) as usize;
            read_elements(simple.prim, count, reader)
        }
    }
}

/// Rejects an element count whose implied byte span exceeds the
/// remaining buffer before any allocation or element read happens, so
/// a corrupt length prefix or an absurd fixed length surfaces as a
/// structured overrun. Past the check, `count` is bounded by the
/// remainder, making the capacity hint safe.
fn read_elements(
    prim: PrimitiveType,
    count: usize,
    reader: &mut ByteReader<'_>,
) -> DecodeResult<Value> {
    let implied = count as u128 * prim.width() as u128;
    if implied > reader.remainder() as u128 {
        return Err(DecodingError::Overrun {
            offset: reader.offset(),
            requested: usize::try_from(implied).unwrap_or(usize::MAX),
            limit: reader.bytes().len(),
        });
    }
    let mut items = Vec::with_capacity(count);
    for _ in 0..count {
        items.push(read_element(prim, reader)?);
    }
    Ok(Value::Array(items))
}

fn read_element(prim: PrimitiveType, reader: &mut ByteReader<'_>) -> DecodeResult<Value> {
    let raw = reader.take(prim.width())?;
    Ok(prim.read_value(raw))
}

cfg_if! {
    if #[cfg(feature = "relaxed_nul_char")] {
        fn check_scalar_nul(_offset: usize) -> DecodeResult<()> {
            Ok(())
        }
    } else {
        /// A NUL byte in scalar `char` position is reserved; array
        /// elements are exempt (zero-padding of fixed `char[N]` must
        /// survive a round trip).
        fn check_scalar_nul(offset: usize) -> DecodeResult<()> {
            Err(DecodingError::ReservedChar { offset })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encode::encode;
    use crate::error::{EncodeResult, EncodingError};
    use crate::schema::{CustomCodec, Decoded};
    use crate::size::{size_of, SizeInfo};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn schema(desc: &str) -> Schema {
        Schema::simple(desc).unwrap()
    }

    fn round_trip(schema: &Schema, value: Value) {
        let bytes = encode(schema, &value).unwrap();
        assert_eq!(decode(schema, &bytes).unwrap(), value, "schema {schema:?}");
    }

    #[test]
    fn scalar_round_trips_are_bitwise() {
        round_trip(&schema("u8"), Value::U8(0xff));
        round_trip(&schema("i8"), Value::I8(-128));
        round_trip(&schema("u16"), Value::U16(0xbeef));
        round_trip(&schema("i32"), Value::I32(i32::MIN));
        round_trip(&schema("u64"), Value::U64(u64::MAX));
        round_trip(&schema("i64"), Value::I64(i64::MIN + 1));
        round_trip(&schema("f32"), Value::F32(-0.0));
        round_trip(&schema("f64"), Value::F64(f64::MIN_POSITIVE));
        round_trip(&schema("char"), Value::Char('é'));
    }

    #[test]
    fn array_and_composite_round_trips() {
        round_trip(
            &schema("i16[]"),
            Value::Array(vec![Value::I16(-1), Value::I16(300)]),
        );
        round_trip(&schema("u8[]"), Value::Array(vec![]));
        round_trip(&schema("char[]"), Value::chars("hello"));
        round_trip(
            &Schema::tuple(vec![schema("u8"), schema("f64"), schema("char[]")]).unwrap(),
            Value::Array(vec![
                Value::U8(9),
                Value::F64(2.25),
                Value::chars("tail"),
            ]),
        );
    }

    #[test]
    fn nested_record_round_trip() {
        let person = Schema::record(vec![
            ("name", schema("char[9]")),
            ("age", schema("u8")),
            ("balance", schema("f64")),
            ("serial", schema("u64")),
        ])
        .unwrap();
        let value = Value::record([
            ("name", Value::chars("Anonymous")),
            ("age", Value::U8(33)),
            ("balance", Value::F64(99.875)),
            ("serial", Value::U64(1 << 62)),
        ]);
        let bytes = encode(&person, &value).unwrap();
        assert_eq!(bytes.len(), 26);
        assert_eq!(bytes.len(), size_of(&person).value);
        assert_eq!(decode(&person, &bytes).unwrap(), value);
    }

    #[test]
    fn decoded_record_preserves_declaration_order() {
        let pair = Schema::record(vec![("b", schema("u8")), ("a", schema("u8"))]).unwrap();
        let decoded = decode(&pair, &[1, 2]).unwrap();
        let entries = decoded.as_record().unwrap();
        assert_eq!(entries[0], ("b".to_owned(), Value::U8(1)));
        assert_eq!(entries[1], ("a".to_owned(), Value::U8(2)));
    }

    #[test]
    fn fixed_char_padding_survives_decode() {
        let bytes = encode(&schema("char[5]"), &Value::chars("ok")).unwrap();
        let decoded = decode(&schema("char[5]"), &bytes).unwrap();
        assert_eq!(decoded.as_chars().as_deref(), Some("ok\0\0\0"));
    }

    #[test]
    fn truncated_input_overruns() {
        let err = decode(&schema("u32"), &[1, 2]).unwrap_err();
        assert!(matches!(
            err,
            DecodingError::Overrun {
                offset: 0,
                requested: 4,
                limit: 2
            }
        ));
    }

    #[test]
    fn fixed_array_never_outreads_the_buffer() {
        let err = decode(&schema("u32[2]"), &[1, 2, 3]).unwrap_err();
        assert!(matches!(
            err,
            DecodingError::Overrun {
                offset: 0,
                requested: 8,
                limit: 3
            }
        ));
    }

    #[test]
    fn absurd_fixed_length_is_a_structured_overrun() {
        // Grammar-valid declared length near usize::MAX must not reach
        // the allocator; it has to surface as a plain overrun.
        let huge = schema("u8[18446744073709551615]");
        let err = decode(&huge, &[1, 2, 3]).unwrap_err();
        assert!(matches!(
            err,
            DecodingError::Overrun {
                offset: 0,
                requested: usize::MAX,
                limit: 3
            }
        ));
    }

    #[test]
    fn corrupt_length_prefix_overruns_before_element_reads() {
        // Prefix claims 1000 u32 elements with 2 payload bytes present.
        let mut input = 1000u32.to_le_bytes().to_vec();
        input.extend_from_slice(&[0xaa, 0xbb]);
        let err = decode(&schema("u32[]"), &input).unwrap_err();
        assert!(matches!(
            err,
            DecodingError::Overrun {
                offset: 4,
                requested: 4000,
                limit: 6
            }
        ));
    }

    #[cfg(not(feature = "relaxed_nul_char"))]
    #[test]
    fn scalar_nul_char_is_reserved() {
        let wrapped = Schema::record(vec![("pad", schema("u8")), ("c", schema("char"))]).unwrap();
        let err = decode(&wrapped, &[7, 0]).unwrap_err();
        assert!(matches!(err, DecodingError::ReservedChar { offset: 1 }));
    }

    #[test]
    fn trailing_bytes_are_ignored() {
        let decoded = decode(&schema("u8"), &[5, 99, 99]).unwrap();
        assert_eq!(decoded, Value::U8(5));
    }

    #[test]
    fn decode_at_starts_mid_buffer() {
        let decoded = decode_at(&schema("u16"), &[0xff, 0x01, 0x02], 1).unwrap();
        assert_eq!(decoded, Value::U16(0x0201));
    }

    #[derive(Default)]
    struct ProbeState {
        encode_calls: AtomicUsize,
        decode_calls: AtomicUsize,
        seen_offset: AtomicUsize,
    }

    /// Encodes `Value::U8(n)` as a two-byte span `[0xAB, n]` and counts
    /// hook invocations.
    struct ProbeCodec(Arc<ProbeState>);

    impl CustomCodec for ProbeCodec {
        fn encode(&self, value: &Value) -> EncodeResult<Vec<u8>> {
            self.0.encode_calls.fetch_add(1, Ordering::SeqCst);
            match value {
                Value::U8(n) => Ok(vec![0xab, *n]),
                other => Err(EncodingError::ElementMismatch {
                    expected: PrimitiveType::U8,
                    actual: other.kind(),
                }),
            }
        }

        fn decode(&self, input: &[u8], offset: usize) -> DecodeResult<Decoded> {
            self.0.decode_calls.fetch_add(1, Ordering::SeqCst);
            self.0.seen_offset.store(offset, Ordering::SeqCst);
            let mut reader = ByteReader::starting_at(input, offset);
            let raw = reader.take_fixed::<2>()?;
            assert_eq!(raw[0], 0xab);
            Ok(Decoded {
                value: Value::U8(raw[1]),
                bytes_consumed: 2,
            })
        }

        fn size(&self) -> SizeInfo {
            SizeInfo::fixed(2)
        }
    }

    #[test]
    fn custom_codec_delegation_and_offset() {
        let state = Arc::new(ProbeState::default());
        let wrapper = Schema::record(vec![
            ("head", schema("u16")),
            ("blob", Schema::custom(ProbeCodec(Arc::clone(&state)))),
            ("tail", schema("u8")),
        ])
        .unwrap();
        assert_eq!(size_of(&wrapper), SizeInfo::fixed(5));

        let value = Value::record([
            ("head", Value::U16(0x0102)),
            ("blob", Value::U8(0x5c)),
            ("tail", Value::U8(0xee)),
        ]);
        let bytes = encode(&wrapper, &value).unwrap();
        assert_eq!(bytes, vec![0x02, 0x01, 0xab, 0x5c, 0xee]);
        assert_eq!(state.encode_calls.load(Ordering::SeqCst), 1);

        let decoded = decode(&wrapper, &bytes).unwrap();
        assert_eq!(decoded, value);
        assert_eq!(state.decode_calls.load(Ordering::SeqCst), 1);
        // The decode hook sees the absolute offset of its own payload.
        assert_eq!(state.seen_offset.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn custom_codec_overconsumption_is_caught() {
        struct Greedy;
        impl CustomCodec for Greedy {
            fn encode(&self, _: &Value) -> EncodeResult<Vec<u8>> {
                Ok(vec![0])
            }
            fn decode(&self, _: &[u8], _: usize) -> DecodeResult<Decoded> {
                Ok(Decoded {
                    value: Value::U8(0),
                    bytes_consumed: 10,
                })
            }
            fn size(&self) -> SizeInfo {
                SizeInfo::fixed(1)
            }
        }
        let err = decode(&Schema::custom(Greedy), &[0]).unwrap_err();
        assert!(matches!(err, DecodingError::Overrun { requested: 10, .. }));
    }
}
