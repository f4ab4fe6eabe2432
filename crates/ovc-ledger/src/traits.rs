use async_trait::async_trait;
use ovc_wire::ReturnValue;

use crate::call::{MutationCall, ReadQuery, TxEffects, TxHandle};
use crate::error::LedgerResult;

/// Transport boundary to the ledger.
///
/// Implementations must keep the two failure modes apart: a refused
/// execution is [`LedgerError::Rejected`](crate::LedgerError::Rejected) from
/// `submit`, while indexing lag is `Ok(None)` from `effects` — the polling
/// layer above decides when lag becomes a timeout.
#[async_trait]
pub trait LedgerTransport: Send + Sync {
    /// Submit a mutating call. Returns only the transaction handle; created
    /// object ids are not available synchronously.
    async fn submit(&self, call: MutationCall) -> LedgerResult<TxHandle>;

    /// Look up a transaction's recorded effects.
    ///
    /// `Ok(None)` means the transaction is not yet indexed.
    async fn effects(&self, handle: &TxHandle) -> LedgerResult<Option<TxEffects>>;

    /// Run a read-only query as a no-effect simulation.
    ///
    /// Never requires polling; the returned tuples reflect current state.
    async fn simulate(&self, query: ReadQuery) -> LedgerResult<Vec<ReturnValue>>;
}
