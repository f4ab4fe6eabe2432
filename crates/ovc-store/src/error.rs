use ovc_types::{BlobId, TypeError};

/// Errors from blob storage and tree codec operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The store could not be reached or answered with a non-success status.
    #[error("blob store unavailable: {0}")]
    Unavailable(String),

    /// The requested blob is unknown or its retention has expired.
    #[error("blob not found: {0}")]
    NotFound(BlobId),

    /// Two tree entries share the same path.
    #[error("duplicate tree path: {0:?}")]
    DuplicatePath(String),

    /// A tree could not be serialized or parsed.
    #[error("tree codec error: {0}")]
    Codec(String),

    /// A tree entry path was malformed.
    #[error(transparent)]
    InvalidEntry(#[from] TypeError),
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
