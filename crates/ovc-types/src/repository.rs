use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::address::Address;
use crate::ids::{CommitId, RepoId};

/// A repository record as held by the ledger.
///
/// Repositories are created once and never deleted. The branch-head map is
/// the only mutable part: every successful commit or create-branch call
/// atomically rebinds one branch name to a commit id as a ledger side effect.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Repository {
    /// Ledger id of the repository object.
    pub id: RepoId,
    /// Human-readable name chosen at creation.
    pub name: String,
    /// Address that created the repository.
    pub owner: Address,
    /// Branch name → current head commit. Heads always reference an
    /// existing commit.
    pub branch_heads: BTreeMap<String, CommitId>,
    /// Total number of commits across all branches.
    pub commit_count: u64,
}

impl Repository {
    /// Current head of `branch`, if the branch exists.
    pub fn head(&self, branch: &str) -> Option<CommitId> {
        self.branch_heads.get(branch).copied()
    }

    /// Branch names in sorted order.
    pub fn branch_names(&self) -> Vec<&str> {
        self.branch_heads.keys().map(String::as_str).collect()
    }
}
