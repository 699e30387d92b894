//! Typed EXIF values.
//!
//! A [`Value`] is one of the ten EXIF 2.2 kinds holding an ordered sequence of
//! components. Values are decoded from raw entry bytes using the payload's byte
//! order and always encoded with the byte order the caller asks for.
//!
//! Rationals are stored as `(numerator, denominator)` pairs and a zero
//! denominator is kept as-is; consumers that divide must guard against it.

use std::fmt;

use serde::Serialize;

use super::parser::ByteOrder;
use super::tags::FieldType;

// =============================================================================
// Value
// =============================================================================

/// A decoded directory entry value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "components")]
pub enum Value {
    UByte(Vec<u8>),
    /// Raw ASCII bytes, including NUL terminators and separators
    Ascii(Vec<u8>),
    UShort(Vec<u16>),
    ULong(Vec<u32>),
    URational(Vec<(u32, u32)>),
    SByte(Vec<i8>),
    Undefined(Vec<u8>),
    SShort(Vec<i16>),
    SLong(Vec<i32>),
    SRational(Vec<(i32, i32)>),
}

impl Value {
    /// The field type this value is encoded as.
    pub fn field_type(&self) -> FieldType {
        match self {
            Value::UByte(_) => FieldType::UByte,
            Value::Ascii(_) => FieldType::Ascii,
            Value::UShort(_) => FieldType::UShort,
            Value::ULong(_) => FieldType::ULong,
            Value::URational(_) => FieldType::URational,
            Value::SByte(_) => FieldType::SByte,
            Value::Undefined(_) => FieldType::Undefined,
            Value::SShort(_) => FieldType::SShort,
            Value::SLong(_) => FieldType::SLong,
            Value::SRational(_) => FieldType::SRational,
        }
    }

    /// Number of components.
    pub fn len(&self) -> usize {
        match self {
            Value::UByte(v) | Value::Ascii(v) | Value::Undefined(v) => v.len(),
            Value::UShort(v) => v.len(),
            Value::ULong(v) => v.len(),
            Value::URational(v) => v.len(),
            Value::SByte(v) => v.len(),
            Value::SShort(v) => v.len(),
            Value::SLong(v) => v.len(),
            Value::SRational(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Component count as written in the entry's count field.
    ///
    /// Saturates at `u32::MAX`; the segment size limit rejects such values
    /// long before they are written.
    pub fn count(&self) -> u32 {
        u32::try_from(self.len()).unwrap_or(u32::MAX)
    }

    /// Encoded size in bytes: component count times component width.
    pub fn total_bytes(&self) -> usize {
        self.len() * self.field_type().size_in_bytes()
    }

    /// Whether the encoded value fits in the entry's 4-byte value field.
    pub fn is_inline(&self) -> bool {
        self.total_bytes() <= FieldType::INLINE_THRESHOLD
    }

    /// Bytes this value occupies outside its entry (0 when inline).
    pub fn extra_size(&self) -> usize {
        if self.is_inline() {
            0
        } else {
            self.total_bytes()
        }
    }

    // -------------------------------------------------------------------------
    // Decoding
    // -------------------------------------------------------------------------

    /// Decode a value from its raw bytes.
    ///
    /// `bytes` holds the complete encoded value; a trailing partial component
    /// is ignored. Signed kinds are sign-extended from their own width.
    pub fn decode(field_type: FieldType, bytes: &[u8], order: ByteOrder) -> Self {
        let width = field_type.size_in_bytes();
        let chunks = bytes.chunks_exact(width);

        match field_type {
            FieldType::UByte => Value::UByte(bytes.to_vec()),
            FieldType::Ascii => Value::Ascii(bytes.to_vec()),
            FieldType::Undefined => Value::Undefined(bytes.to_vec()),
            FieldType::SByte => Value::SByte(bytes.iter().map(|b| *b as i8).collect()),
            FieldType::UShort => Value::UShort(chunks.map(|c| order.read_u16(c)).collect()),
            FieldType::SShort => {
                Value::SShort(chunks.map(|c| order.read_signed(c, 2) as i16).collect())
            }
            FieldType::ULong => Value::ULong(chunks.map(|c| order.read_u32(c)).collect()),
            FieldType::SLong => Value::SLong(chunks.map(|c| order.read_signed(c, 4)).collect()),
            FieldType::URational => Value::URational(
                chunks
                    .map(|c| (order.read_u32(&c[0..4]), order.read_u32(&c[4..8])))
                    .collect(),
            ),
            FieldType::SRational => Value::SRational(
                chunks
                    .map(|c| (order.read_signed(&c[0..4], 4), order.read_signed(&c[4..8], 4)))
                    .collect(),
            ),
        }
    }

    // -------------------------------------------------------------------------
    // Encoding
    // -------------------------------------------------------------------------

    /// Append the encoded components to `out`.
    pub fn encode_into(&self, order: ByteOrder, out: &mut Vec<u8>) {
        match self {
            Value::UByte(v) | Value::Ascii(v) | Value::Undefined(v) => out.extend_from_slice(v),
            Value::SByte(v) => out.extend(v.iter().map(|b| *b as u8)),
            Value::UShort(v) => v.iter().for_each(|n| order.write_u16(out, *n)),
            Value::SShort(v) => v.iter().for_each(|n| order.write_u16(out, *n as u16)),
            Value::ULong(v) => v.iter().for_each(|n| order.write_u32(out, *n)),
            Value::SLong(v) => v.iter().for_each(|n| order.write_u32(out, *n as u32)),
            Value::URational(v) => v.iter().for_each(|(num, den)| {
                order.write_u32(out, *num);
                order.write_u32(out, *den);
            }),
            Value::SRational(v) => v.iter().for_each(|(num, den)| {
                order.write_u32(out, *num as u32);
                order.write_u32(out, *den as u32);
            }),
        }
    }

    /// Encode the components into a new buffer.
    pub fn encode(&self, order: ByteOrder) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.total_bytes());
        self.encode_into(order, &mut out);
        out
    }

    // -------------------------------------------------------------------------
    // Construction from plain numbers
    // -------------------------------------------------------------------------

    /// Build an integer-kind value, checking every component fits the kind.
    pub fn from_numbers(field_type: FieldType, numbers: &[i64]) -> Result<Self, String> {
        fn narrow<T: TryFrom<i64>>(numbers: &[i64], kind: FieldType) -> Result<Vec<T>, String> {
            numbers
                .iter()
                .map(|n| {
                    T::try_from(*n).map_err(|_| format!("{} does not fit in {}", n, kind.name()))
                })
                .collect()
        }

        match field_type {
            FieldType::UByte => narrow(numbers, field_type).map(Value::UByte),
            FieldType::SByte => narrow(numbers, field_type).map(Value::SByte),
            FieldType::UShort => narrow(numbers, field_type).map(Value::UShort),
            FieldType::SShort => narrow(numbers, field_type).map(Value::SShort),
            FieldType::ULong => narrow(numbers, field_type).map(Value::ULong),
            FieldType::SLong => narrow(numbers, field_type).map(Value::SLong),
            other => Err(format!("{} is not an integer type", other.name())),
        }
    }

    /// Build a rational-kind value, checking both halves of every pair.
    pub fn from_rationals(field_type: FieldType, pairs: &[(i64, i64)]) -> Result<Self, String> {
        match field_type {
            FieldType::URational => pairs
                .iter()
                .map(|(num, den)| match (u32::try_from(*num), u32::try_from(*den)) {
                    (Ok(num), Ok(den)) => Ok((num, den)),
                    _ => Err(format!("{}/{} does not fit in RATIONAL", num, den)),
                })
                .collect::<Result<Vec<_>, _>>()
                .map(Value::URational),
            FieldType::SRational => pairs
                .iter()
                .map(|(num, den)| match (i32::try_from(*num), i32::try_from(*den)) {
                    (Ok(num), Ok(den)) => Ok((num, den)),
                    _ => Err(format!("{}/{} does not fit in SRATIONAL", num, den)),
                })
                .collect::<Result<Vec<_>, _>>()
                .map(Value::SRational),
            other => Err(format!("{} is not a rational type", other.name())),
        }
    }

    // -------------------------------------------------------------------------
    // Typed views
    // -------------------------------------------------------------------------

    /// Components of an integer kind, widened to `i64`.
    pub fn as_numbers(&self) -> Option<Vec<i64>> {
        match self {
            Value::UByte(v) => Some(v.iter().map(|n| *n as i64).collect()),
            Value::SByte(v) => Some(v.iter().map(|n| *n as i64).collect()),
            Value::UShort(v) => Some(v.iter().map(|n| *n as i64).collect()),
            Value::SShort(v) => Some(v.iter().map(|n| *n as i64).collect()),
            Value::ULong(v) => Some(v.iter().map(|n| *n as i64).collect()),
            Value::SLong(v) => Some(v.iter().map(|n| *n as i64).collect()),
            _ => None,
        }
    }

    /// Components of a rational kind, widened to `i64` pairs.
    pub fn as_rationals(&self) -> Option<Vec<(i64, i64)>> {
        match self {
            Value::URational(v) => Some(v.iter().map(|(n, d)| (*n as i64, *d as i64)).collect()),
            Value::SRational(v) => Some(v.iter().map(|(n, d)| (*n as i64, *d as i64)).collect()),
            _ => None,
        }
    }

    /// Raw bytes of a byte-array kind (ASCII, UNDEFINED or BYTE).
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::Ascii(v) | Value::Undefined(v) | Value::UByte(v) => Some(v),
            _ => None,
        }
    }

    /// First component of an unsigned SHORT or LONG, as used by offset tags.
    pub fn as_offset(&self) -> Option<u32> {
        match self {
            Value::ULong(v) => v.first().copied(),
            Value::UShort(v) => v.first().map(|n| *n as u32),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn join<T: fmt::Display>(f: &mut fmt::Formatter<'_>, items: &[T]) -> fmt::Result {
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    f.write_str(", ")?;
                }
                write!(f, "{}", item)?;
            }
            Ok(())
        }

        match self {
            Value::Ascii(v) => {
                let text = String::from_utf8_lossy(v);
                write!(f, "{:?}", text.trim_end_matches('\0'))
            }
            Value::Undefined(v) => f.write_str(&hex::encode(v)),
            Value::UByte(v) => join(f, v),
            Value::SByte(v) => join(f, v),
            Value::UShort(v) => join(f, v),
            Value::SShort(v) => join(f, v),
            Value::ULong(v) => join(f, v),
            Value::SLong(v) => join(f, v),
            Value::URational(v) => {
                let parts: Vec<String> = v.iter().map(|(n, d)| format!("{}/{}", n, d)).collect();
                join(f, &parts)
            }
            Value::SRational(v) => {
                let parts: Vec<String> = v.iter().map(|(n, d)| format!("{}/{}", n, d)).collect();
                join(f, &parts)
            }
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
