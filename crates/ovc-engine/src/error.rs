use ovc_ledger::LedgerError;
use ovc_store::StoreError;

/// Errors from engine operations.
///
/// `IndexingTimeout`, `TransactionRejected`, and decode failures arrive
/// wrapped in [`Ledger`](Self::Ledger); store unavailability and expired
/// blobs in [`Store`](Self::Store).
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// A commit, branch, tree path, or blob does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// Caller-supplied input was unusable (empty message, zero files,
    /// empty repository name).
    #[error("validation failed: {0}")]
    Validation(String),

    /// The operation lacked authorization for the target repository.
    #[error("permission denied: {0}")]
    Permission(String),

    /// Blob store failure.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Ledger failure.
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    /// Local filesystem failure during checkout materialization.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result alias for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;
