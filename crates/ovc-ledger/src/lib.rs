//! Ledger client for OVC.
//!
//! The ledger is an opaque remote service reached through a narrow
//! interface: mutating calls return only an opaque transaction handle, and
//! the ids of created objects must be recovered by polling the transaction's
//! recorded effects; read-only calls run as no-effect simulations returning
//! wire-encoded tuples decoded by `ovc-wire`.
//!
//! Two failure modes are kept strictly apart:
//!
//! - [`LedgerError::Rejected`] — the ledger refused the operation. Surfaced
//!   immediately, never retried.
//! - [`LedgerError::IndexingTimeout`] — the operation executed but its
//!   effects were still not visible after the bounded polling budget.
//!
//! Reads are not guaranteed to reflect a write from the same process until
//! that write's polling loop has confirmed indexing.

pub mod call;
pub mod client;
pub mod error;
pub mod memory;
pub mod poll;
pub mod rpc;
pub mod traits;

pub use call::{CallArg, CreatedObject, MutationCall, ReadQuery, TxEffects, TxHandle};
pub use client::{LedgerClient, CAPABILITY_TAG};
pub use error::{LedgerError, LedgerResult};
pub use memory::InMemoryTransport;
pub use poll::{poll_effects, PollOutcome, PollPolicy};
pub use rpc::RpcTransport;
pub use traits::LedgerTransport;
