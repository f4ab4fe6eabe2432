//! The orchestrator: user-facing version-control operations.

use std::path::Path;

use ovc_ledger::{LedgerClient, LedgerError, LedgerTransport};
use ovc_store::{BlobStore, Tree, TreeFile};
use ovc_types::{Change, Commit, CommitId, RepoId};
use tracing::{debug, info, warn};

use crate::context::{RepoContext, RepoStatus, WorkingFile};
use crate::diff::diff_trees;
use crate::error::{EngineError, EngineResult};

/// Default blob retention requested on upload, in storage epochs.
pub const DEFAULT_RETENTION_EPOCHS: u64 = 5;

/// The versioning engine.
///
/// Stateless with respect to targeting: mutating operations take an explicit
/// [`RepoContext`], read operations take the repository or commit id they
/// need. One engine can drive any number of repositories.
pub struct VersioningEngine<S, L> {
    store: S,
    ledger: LedgerClient<L>,
    retention_epochs: u64,
}

impl<S: BlobStore, L: LedgerTransport> VersioningEngine<S, L> {
    /// Create an engine over a blob store and a ledger client.
    pub fn new(store: S, ledger: LedgerClient<L>) -> Self {
        Self {
            store,
            ledger,
            retention_epochs: DEFAULT_RETENTION_EPOCHS,
        }
    }

    /// Override the retention requested for uploaded blobs.
    pub fn with_retention_epochs(mut self, epochs: u64) -> Self {
        self.retention_epochs = epochs;
        self
    }

    /// The underlying blob store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// The underlying ledger client.
    pub fn ledger(&self) -> &LedgerClient<L> {
        &self.ledger
    }

    /// Create a repository with a root commit (empty tree, no parents) on
    /// branch `main`. Returns the targeting context and the root commit id.
    pub async fn init(&self, name: &str) -> EngineResult<(RepoContext, CommitId)> {
        if name.trim().is_empty() {
            return Err(EngineError::Validation("repository name is empty".into()));
        }
        let (repo_id, capability) = self
            .ledger
            .create_repository(name)
            .await
            .map_err(ledger_err)?;
        let ctx = RepoContext::new(repo_id, capability);

        let tree_bytes = Tree::empty().serialize()?;
        let tree_blob = self.store.put(&tree_bytes, self.retention_epochs).await?;
        let root = self
            .ledger
            .commit(ctx.repo_id, ctx.capability, "main", &tree_blob, &[], "initial commit")
            .await
            .map_err(ledger_err)?;
        info!(repo = %repo_id.short_hex(), root = %root.short_hex(), name, "initialized repository");
        Ok((ctx, root))
    }

    /// Record a new commit of `files` on `branch`.
    ///
    /// The ordering here is load-bearing: every file blob is durably stored
    /// before the tree is composed, the tree blob before the ledger write.
    /// A failure at any step aborts with nothing partial observable — the
    /// worst case is orphaned blobs that expire with their retention.
    pub async fn commit(
        &self,
        ctx: &RepoContext,
        files: &[WorkingFile],
        message: &str,
        branch: &str,
    ) -> EngineResult<CommitId> {
        if message.trim().is_empty() {
            return Err(EngineError::Validation("commit message is empty".into()));
        }
        if files.is_empty() {
            return Err(EngineError::Validation("commit has no files".into()));
        }
        // Duplicates are caller mistakes; catch them before any upload.
        let mut seen = std::collections::BTreeSet::new();
        for file in files {
            if !seen.insert(file.path.as_str()) {
                return Err(EngineError::Validation(format!(
                    "duplicate path {:?}",
                    file.path
                )));
            }
        }

        let mut uploaded = Vec::with_capacity(files.len());
        for file in files {
            let blob_id = self.store.put(&file.data, self.retention_epochs).await?;
            debug!(path = %file.path, blob = %blob_id, size = file.data.len(), "uploaded file");
            uploaded.push(TreeFile::new(file.path.clone(), blob_id, file.data.len() as u64));
        }

        let tree = Tree::build(uploaded)?;
        let tree_blob = self.store.put(&tree.serialize()?, self.retention_epochs).await?;

        // First commit on a branch is not an error; it simply has no parent.
        let parents: Vec<CommitId> = self
            .ledger
            .get_branch_head(ctx.repo_id, branch)
            .await?
            .into_iter()
            .collect();

        let id = self
            .ledger
            .commit(ctx.repo_id, ctx.capability, branch, &tree_blob, &parents, message)
            .await
            .map_err(ledger_err)?;
        Ok(id)
    }

    /// Bind a new branch name to an existing commit.
    pub async fn create_branch(
        &self,
        ctx: &RepoContext,
        name: &str,
        from: CommitId,
    ) -> EngineResult<()> {
        if name.trim().is_empty() {
            return Err(EngineError::Validation("branch name is empty".into()));
        }
        self.ledger
            .create_branch(ctx.repo_id, ctx.capability, name, from)
            .await
            .map_err(ledger_err)
    }

    /// History of `branch`, newest first, following first-parent links only.
    ///
    /// A parent that cannot be fetched truncates the listing rather than
    /// failing it; history older than the gap is simply not shown.
    pub async fn log(
        &self,
        repo: RepoId,
        branch: &str,
        limit: usize,
    ) -> EngineResult<Vec<Commit>> {
        let head = self
            .ledger
            .get_branch_head(repo, branch)
            .await?
            .ok_or_else(|| EngineError::NotFound(format!("branch {branch:?}")))?;

        let mut commits = Vec::new();
        let mut next = Some(head);
        while let Some(id) = next {
            if commits.len() >= limit {
                break;
            }
            let commit = if commits.is_empty() {
                // The head itself must resolve; only ancestors may truncate.
                self.fetch_commit(id).await?
            } else {
                match self.fetch_commit(id).await {
                    Ok(commit) => commit,
                    Err(e) => {
                        warn!(commit = %id.short_hex(), error = %e, "history truncated");
                        break;
                    }
                }
            };
            next = commit.first_parent();
            commits.push(commit);
        }
        Ok(commits)
    }

    /// Materialize the snapshot of `target` (branch name, else commit id)
    /// under `destination`.
    ///
    /// Every path in the tree ends up at `destination/path` with matching
    /// content; pre-existing unrelated files are left untouched.
    pub async fn checkout(
        &self,
        repo: RepoId,
        target: &str,
        destination: &Path,
    ) -> EngineResult<()> {
        let commit = self.resolve_target(repo, target).await?;
        let tree = self.load_tree(&commit).await?;

        for entry in tree.entries() {
            let path = destination.join(&entry.path);
            if !entry.is_file() {
                tokio::fs::create_dir_all(&path).await?;
                continue;
            }
            if let Some(parent) = path.parent() {
                tokio::fs::create_dir_all(parent).await?;
            }
            let bytes = self.store.get(&entry.blob_id).await?;
            tokio::fs::write(&path, bytes).await?;
            debug!(path = %entry.path, "materialized");
        }
        info!(commit = %commit.id.short_hex(), files = tree.len(), dest = %destination.display(), "checkout complete");
        Ok(())
    }

    /// Classify every path that differs between the snapshots of two
    /// commits. Paths with equal blob ids in both are omitted.
    pub async fn diff(&self, a: CommitId, b: CommitId) -> EngineResult<Vec<Change>> {
        let old = self.load_tree(&self.fetch_commit(a).await?).await?;
        let new = self.load_tree(&self.fetch_commit(b).await?).await?;
        Ok(diff_trees(&old, &new))
    }

    /// Content of `path` at `target` (branch name, else commit id).
    pub async fn cat(&self, repo: RepoId, path: &str, target: &str) -> EngineResult<Vec<u8>> {
        let commit = self.resolve_target(repo, target).await?;
        let tree = self.load_tree(&commit).await?;
        let entry = tree
            .get(path)
            .filter(|e| e.is_file())
            .ok_or_else(|| EngineError::NotFound(format!("no file {path:?} in {target}")))?;
        Ok(self.store.get(&entry.blob_id).await?)
    }

    /// Projection of the current repository record.
    pub async fn status(&self, repo: RepoId) -> EngineResult<RepoStatus> {
        let record = self.ledger.get_repository(repo).await.map_err(ledger_err)?;
        Ok(RepoStatus {
            name: record.name,
            owner: record.owner,
            commit_count: record.commit_count,
            repo_id: record.id,
        })
    }

    /// Resolve `target` as a branch name first; if that yields nothing,
    /// treat it literally as a commit id.
    async fn resolve_target(&self, repo: RepoId, target: &str) -> EngineResult<Commit> {
        match self.ledger.get_branch_head(repo, target).await {
            Ok(Some(head)) => return self.fetch_commit(head).await,
            Ok(None) | Err(LedgerError::NotFound(_)) => {}
            Err(e) => return Err(e.into()),
        }
        let id = CommitId::from_hex(target)
            .map_err(|_| EngineError::NotFound(format!("no branch or commit {target:?}")))?;
        self.fetch_commit(id).await
    }

    async fn fetch_commit(&self, id: CommitId) -> EngineResult<Commit> {
        self.ledger.get_version(id).await.map_err(ledger_err)
    }

    async fn load_tree(&self, commit: &Commit) -> EngineResult<Tree> {
        let bytes = self.store.get(&commit.root_tree).await?;
        Ok(Tree::parse(&bytes)?)
    }
}

/// Classify a ledger failure for the engine's taxonomy: missing objects and
/// authorization refusals get their own variants, everything else stays a
/// ledger error.
fn ledger_err(err: LedgerError) -> EngineError {
    match err {
        LedgerError::NotFound(what) => EngineError::NotFound(what),
        LedgerError::PermissionDenied(why) => EngineError::Permission(why),
        other => EngineError::Ledger(other),
    }
}
