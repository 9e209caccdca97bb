//! Dynamic value trees mirroring schema shapes
//!
//! [`Value`] is the in-memory companion of [`Schema`](crate::schema::Schema):
//! every encode call pairs a schema node with a value node of the same
//! shape, and every decode call produces a fresh `Value` tree keyed and
//! ordered identically to the schema that drove it.
//!
//! The 64-bit integer variants are deliberately distinct from the
//! narrower machine-number variants: `u64`/`i64` wire fields always
//! round-trip through [`Value::U64`]/[`Value::I64`], never through a
//! lossy shared representation.
//!
//! Tuple values and primitive-array values share the [`Value::Array`]
//! variant; which interpretation applies is determined entirely by the
//! schema node the value is paired with.

/// A dynamic value that can be encoded against, or decoded from, a
/// schema of matching shape.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    /// A single character, encoded as one byte (codepoints ≥ 256 are
    /// rejected at encode time).
    Char(char),
    U8(u8),
    U16(u16),
    U32(u32),
    /// 64-bit unsigned integer, kept distinct from the narrower widths.
    U64(u64),
    I8(i8),
    I16(i16),
    I32(i32),
    /// 64-bit signed integer, kept distinct from the narrower widths.
    I64(i64),
    F32(f32),
    F64(f64),
    /// A primitive array or a tuple value, depending on the paired schema.
    Array(Vec<Value>),
    /// An ordered record; key order is significant and must match the
    /// paired object schema's declaration order.
    Record(Vec<(String, Value)>),
}

impl Value {
    /// Returns a short static name for the value's kind, used in
    /// mismatch diagnostics.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Char(_) => "char",
            Value::U8(_) => "u8",
            Value::U16(_) => "u16",
            Value::U32(_) => "u32",
            Value::U64(_) => "u64",
            Value::I8(_) => "i8",
            Value::I16(_) => "i16",
            Value::I32(_) => "i32",
            Value::I64(_) => "i64",
            Value::F32(_) => "f32",
            Value::F64(_) => "f64",
            Value::Array(_) => "array",
            Value::Record(_) => "record",
        }
    }

    /// Builds a char-array value from the characters of `s`, suitable
    /// for `char[]` and `char[N]` schemas.
    #[must_use]
    pub fn chars(s: &str) -> Self {
        Value::Array(s.chars().map(Value::Char).collect())
    }

    /// Builds a record value from an ordered sequence of entries.
    pub fn record<S, I>(entries: I) -> Self
    where
        S: Into<String>,
        I: IntoIterator<Item = (S, Value)>,
    {
        Value::Record(
            entries
                .into_iter()
                .map(|(name, val)| (name.into(), val))
                .collect(),
        )
    }

    /// Borrows the elements of an array value, or `None` for any other kind.
    #[must_use]
    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    /// Borrows the entries of a record value, or `None` for any other kind.
    #[must_use]
    pub fn as_record(&self) -> Option<&[(String, Value)]> {
        match self {
            Value::Record(entries) => Some(entries),
            _ => None,
        }
    }

    /// Reassembles a `char[]`/`char[N]` value into a `String`, or `None`
    /// if the value is not an array of chars.
    #[must_use]
    pub fn as_chars(&self) -> Option<String> {
        let items = self.as_array()?;
        let mut out = String::with_capacity(items.len());
        for item in items {
            match item {
                Value::Char(c) => out.push(*c),
                _ => return None,
            }
        }
        Some(out)
    }
}

macro_rules! value_from {
    ( $( $t:ty => $ctor:ident ),+ $(,)? ) => {
        $(
            impl From<$t> for Value {
                #[inline]
                fn from(val: $t) -> Self {
                    Value::$ctor(val)
                }
            }
        )+
    };
}

value_from! {
    char => Char,
    u8 => U8,
    u16 => U16,
    u32 => U32,
    u64 => U64,
    i8 => I8,
    i16 => I16,
    i32 => I32,
    i64 => I64,
    f32 => F32,
    f64 => F64,
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::Array(items)
    }
}

#[cfg(feature = "serde_impls")]
impl serde::Serialize for Value {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::{SerializeMap, SerializeSeq};
        match self {
            Value::Char(c) => serializer.serialize_char(*c),
            Value::U8(n) => serializer.serialize_u8(*n),
            Value::U16(n) => serializer.serialize_u16(*n),
            Value::U32(n) => serializer.serialize_u32(*n),
            Value::U64(n) => serializer.serialize_u64(*n),
            Value::I8(n) => serializer.serialize_i8(*n),
            Value::I16(n) => serializer.serialize_i16(*n),
            Value::I32(n) => serializer.serialize_i32(*n),
            Value::I64(n) => serializer.serialize_i64(*n),
            Value::F32(x) => serializer.serialize_f32(*x),
            Value::F64(x) => serializer.serialize_f64(*x),
            Value::Array(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Value::Record(entries) => {
                let mut map = serializer.serialize_map(Some(entries.len()))?;
                for (name, val) in entries {
                    map.serialize_entry(name, val)?;
                }
                map.end()
            }
        }
    }
}
