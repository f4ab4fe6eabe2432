use std::fmt;

use ovc_types::Address;

use crate::cursor::Cursor;
use crate::error::WireResult;

/// Wire-level type of one field.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum WireType {
    /// ULEB128 length prefix + UTF-8 bytes.
    Str,
    /// Exactly 32 bytes (object ids and account addresses share this shape).
    Address,
    /// 8 bytes, little-endian unsigned.
    U64,
    /// 1 byte, nonzero means true.
    Bool,
    /// ULEB128 count prefix + that many elements.
    Vector(Box<WireType>),
}

impl WireType {
    /// Shorthand for a vector of `inner`.
    pub fn vector(inner: WireType) -> Self {
        Self::Vector(Box::new(inner))
    }
}

impl fmt::Display for WireType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Str => write!(f, "string"),
            Self::Address => write!(f, "address"),
            Self::U64 => write!(f, "u64"),
            Self::Bool => write!(f, "bool"),
            Self::Vector(inner) => write!(f, "vector<{inner}>"),
        }
    }
}

/// A decoded field value, mirroring [`WireType`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum WireValue {
    Str(String),
    Address(Address),
    U64(u64),
    Bool(bool),
    Vector(Vec<WireValue>),
}

impl WireValue {
    /// Decode one value of type `ty` from the cursor.
    ///
    /// Each element of a vector consumes only its own width; the count
    /// prefix is validated implicitly by each element read.
    pub fn decode(cursor: &mut Cursor<'_>, ty: &WireType) -> WireResult<Self> {
        Ok(match ty {
            WireType::Str => Self::Str(cursor.read_string()?),
            WireType::Address => Self::Address(cursor.read_address()?),
            WireType::U64 => Self::U64(cursor.read_u64()?),
            WireType::Bool => Self::Bool(cursor.read_bool()?),
            WireType::Vector(inner) => {
                let count = cursor.read_uleb128()?;
                let mut items = Vec::with_capacity(count.min(4096) as usize);
                for _ in 0..count {
                    items.push(Self::decode(cursor, inner)?);
                }
                Self::Vector(items)
            }
        })
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_address(&self) -> Option<Address> {
        match self {
            Self::Address(a) => Some(*a),
            _ => None,
        }
    }

    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Self::U64(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_vector(&self) -> Option<&[WireValue]> {
        match self {
            Self::Vector(items) => Some(items),
            _ => None,
        }
    }
}

/// One tuple from a read-only query simulation: raw bytes plus the type tag
/// the ledger reported for them.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReturnValue {
    pub bytes: Vec<u8>,
    pub tag: String,
}

impl ReturnValue {
    pub fn new(bytes: Vec<u8>, tag: impl Into<String>) -> Self {
        Self {
            bytes,
            tag: tag.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vector_elements_consume_own_width() {
        // vector<u64> with two elements
        let mut buf = vec![2];
        buf.extend_from_slice(&7u64.to_le_bytes());
        buf.extend_from_slice(&9u64.to_le_bytes());
        let mut c = Cursor::new(&buf);
        let v = WireValue::decode(&mut c, &WireType::vector(WireType::U64)).unwrap();
        assert_eq!(
            v,
            WireValue::Vector(vec![WireValue::U64(7), WireValue::U64(9)])
        );
        assert!(c.is_exhausted());
    }

    #[test]
    fn truncated_vector_fails() {
        // declares 3 elements, carries 1
        let mut buf = vec![3];
        buf.extend_from_slice(&1u64.to_le_bytes());
        let mut c = Cursor::new(&buf);
        assert!(WireValue::decode(&mut c, &WireType::vector(WireType::U64)).is_err());
    }

    #[test]
    fn wire_type_display() {
        assert_eq!(
            WireType::vector(WireType::Address).to_string(),
            "vector<address>"
        );
    }
}
