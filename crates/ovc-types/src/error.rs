/// Errors from parsing or constructing foundation types.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TypeError {
    /// A hex string could not be decoded.
    #[error("invalid hex: {0}")]
    InvalidHex(String),

    /// A byte sequence had the wrong length for the target type.
    #[error("invalid length: expected {expected}, got {actual}")]
    InvalidLength { expected: usize, actual: usize },

    /// A path was empty or otherwise unusable as a tree key.
    #[error("invalid path: {0:?}")]
    InvalidPath(String),
}
