/// Errors from decoding ledger wire data.
///
/// Every declared length is validated against the remaining buffer before
/// any bytes are consumed; truncated input always surfaces as an error,
/// never as a partially-decoded record.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WireError {
    /// A read would run past the end of the buffer.
    #[error("unexpected end of input: needed {needed} bytes, {remaining} remain")]
    UnexpectedEof { needed: usize, remaining: usize },

    /// A ULEB128 prefix exceeded the maximum encodable width.
    #[error("overlong ULEB128 prefix")]
    OverlongUleb,

    /// String bytes were not valid UTF-8.
    #[error("invalid UTF-8 in string field: {0}")]
    InvalidUtf8(String),

    /// A return tuple carried a type tag the schema does not accept.
    #[error("unexpected type tag for {record}: expected {expected}, got {actual}")]
    UnexpectedTag {
        record: &'static str,
        expected: &'static str,
        actual: String,
    },

    /// Bytes remained after the schema's last field was consumed.
    #[error("{remaining} trailing bytes after decoding {record}")]
    TrailingBytes {
        record: &'static str,
        remaining: usize,
    },

    /// The decoded values violate a structural constraint of the record.
    #[error("invalid {record} record: {reason}")]
    InvalidRecord {
        record: &'static str,
        reason: String,
    },
}

/// Result alias for wire operations.
pub type WireResult<T> = Result<T, WireError>;
