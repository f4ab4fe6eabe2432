use ovc_types::{Address, Capability, RepoId};

/// Explicit targeting for engine operations.
///
/// Holds the repository id and the write capability proving authorization.
/// Passed by value into every call that needs a target; the engine keeps no
/// current-repository state of its own.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RepoContext {
    pub repo_id: RepoId,
    pub capability: Capability,
}

impl RepoContext {
    pub fn new(repo_id: RepoId, capability: Capability) -> Self {
        Self {
            repo_id,
            capability,
        }
    }
}

/// One file handed to `commit`: a path and its full content.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WorkingFile {
    pub path: String,
    pub data: Vec<u8>,
}

impl WorkingFile {
    pub fn new(path: impl Into<String>, data: impl Into<Vec<u8>>) -> Self {
        Self {
            path: path.into(),
            data: data.into(),
        }
    }
}

/// Projection of the current repository record for display.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RepoStatus {
    pub name: String,
    pub owner: Address,
    pub commit_count: u64,
    pub repo_id: RepoId,
}
