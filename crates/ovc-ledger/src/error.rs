use ovc_wire::WireError;

/// Errors from ledger operations.
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    /// The ledger refused the operation. Non-retryable.
    #[error("transaction rejected: {0}")]
    Rejected(String),

    /// The operation lacked authorization: the supplied capability does not
    /// cover the target repository. Non-retryable, kept apart from
    /// [`Rejected`](Self::Rejected) so callers can surface it as a
    /// permission failure.
    #[error("permission denied by ledger: {0}")]
    PermissionDenied(String),

    /// The operation's effects were not visible after the polling budget.
    ///
    /// Distinct from [`Rejected`](Self::Rejected): the transaction may well
    /// have executed, the indexer just has not caught up.
    #[error("transaction effects not indexed after {attempts} attempts")]
    IndexingTimeout { attempts: u32 },

    /// Transport failure reaching the ledger.
    #[error("ledger transport error: {0}")]
    Transport(String),

    /// A read result failed to decode.
    #[error(transparent)]
    Decode(#[from] WireError),

    /// The queried object does not exist on the ledger.
    #[error("not found on ledger: {0}")]
    NotFound(String),

    /// Transaction effects did not contain an expected created object.
    #[error("transaction effects missing expected object: {0}")]
    MissingEffect(String),
}

/// Result alias for ledger operations.
pub type LedgerResult<T> = Result<T, LedgerError>;
