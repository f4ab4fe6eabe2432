//! Call and result shapes crossing the ledger boundary.

use ovc_types::{Address, CommitId, RepoId};
use serde::{Deserialize, Serialize};

/// One positionally-ordered argument to a mutating entry point.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", tag = "type", content = "value")]
pub enum CallArg {
    /// UTF-8 string argument.
    Str(String),
    /// Reference to an on-ledger object (repository, capability, commit).
    Object(Address),
    /// Vector of object ids.
    Objects(Vec<Address>),
}

/// A mutating call: named entry point plus ordered typed arguments.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MutationCall {
    pub entry: String,
    pub args: Vec<CallArg>,
}

impl MutationCall {
    pub fn new(entry: impl Into<String>, args: Vec<CallArg>) -> Self {
        Self {
            entry: entry.into(),
            args,
        }
    }
}

/// A read-only query, executed as a no-effect simulation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ReadQuery {
    /// The full repository record.
    Repository { repo: RepoId },
    /// Current head of one branch; may resolve to nothing.
    BranchHead { repo: RepoId, branch: String },
    /// One commit (version) record.
    Version { commit: CommitId },
    /// Ids of every repository created by `owner`.
    RepositoriesByOwner { owner: Address },
}

/// Opaque handle for a submitted transaction.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxHandle {
    pub digest: String,
}

impl TxHandle {
    pub fn new(digest: impl Into<String>) -> Self {
        Self {
            digest: digest.into(),
        }
    }
}

/// One object created by a transaction, as recorded in its effects.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedObject {
    pub address: Address,
    /// Ledger type tag of the created object.
    pub type_tag: String,
}

/// The recorded effects of an executed transaction.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxEffects {
    pub created: Vec<CreatedObject>,
}

impl TxEffects {
    /// First created object carrying the given type tag.
    pub fn created_with_tag(&self, tag: &str) -> Option<Address> {
        self.created
            .iter()
            .find(|c| c.type_tag == tag)
            .map(|c| c.address)
    }
}
