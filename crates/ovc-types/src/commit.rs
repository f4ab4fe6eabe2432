use serde::{Deserialize, Serialize};

use crate::address::Address;
use crate::ids::{BlobId, CommitId};

/// An immutable version record.
///
/// A commit binds one tree snapshot (by blob id) to its parent commits,
/// author, timestamp, and message. Commits are never updated after creation;
/// every parent must already exist when the commit is written, which keeps
/// the commit graph acyclic by construction.
///
/// The model permits multiple parents, but history traversal in OVC follows
/// only [`first_parent`](Commit::first_parent).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Commit {
    /// Ledger id of this commit.
    pub id: CommitId,
    /// Blob holding the serialized tree snapshot.
    pub root_tree: BlobId,
    /// Parent commits, ordered. Empty for a root commit.
    pub parents: Vec<CommitId>,
    /// Author's ledger address.
    pub author: Address,
    /// Seconds since the Unix epoch, assigned by the ledger.
    pub timestamp_secs: u64,
    /// Commit message.
    pub message: String,
}

impl Commit {
    /// Returns `true` if this commit has no parents.
    pub fn is_root(&self) -> bool {
        self.parents.is_empty()
    }

    /// The first parent, if any. History traversal follows this link only.
    pub fn first_parent(&self) -> Option<CommitId> {
        self.parents.first().copied()
    }
}
