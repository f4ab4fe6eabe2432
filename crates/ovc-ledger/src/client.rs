//! Typed operations over a [`LedgerTransport`].
//!
//! The client owns the polling policy and the decode step: mutating calls
//! submit, poll for effects, and recover created object ids by type tag;
//! read calls simulate and decode the returned tuples against the schemas
//! in `ovc-wire`.

use ovc_types::{Address, BlobId, Capability, Commit, CommitId, RepoId, Repository};
use ovc_wire::schema::{REPOSITORY_TAG, VERSION_TAG};
use ovc_wire::{
    decode_address_value, decode_address_vector, decode_commit, decode_repository, ReturnValue,
};
use tracing::info;

use crate::call::{CallArg, MutationCall, ReadQuery, TxEffects, TxHandle};
use crate::error::{LedgerError, LedgerResult};
use crate::poll::{poll_effects, PollOutcome, PollPolicy};
use crate::traits::LedgerTransport;

/// Type tag of the write-capability object created alongside a repository.
pub const CAPABILITY_TAG: &str = "vcs::repo::RepoCap";

/// Typed ledger client.
pub struct LedgerClient<T> {
    transport: T,
    author: Address,
    policy: PollPolicy,
}

impl<T: LedgerTransport> LedgerClient<T> {
    /// Create a client for `author` with the default polling policy.
    pub fn new(transport: T, author: Address) -> Self {
        Self::with_policy(transport, author, PollPolicy::default())
    }

    /// Create a client with an explicit polling policy.
    pub fn with_policy(transport: T, author: Address, policy: PollPolicy) -> Self {
        Self {
            transport,
            author,
            policy,
        }
    }

    /// The address this client writes as.
    pub fn author(&self) -> Address {
        self.author
    }

    /// Access the underlying transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    // ---- Mutating operations ----

    /// Create a repository. Returns its id and the write capability.
    pub async fn create_repository(&self, name: &str) -> LedgerResult<(RepoId, Capability)> {
        let call = MutationCall::new("create_repository", vec![CallArg::Str(name.to_string())]);
        let effects = self.execute(call).await?;
        let repo = effects
            .created_with_tag(REPOSITORY_TAG)
            .ok_or_else(|| LedgerError::MissingEffect("repository object".into()))?;
        let cap = effects
            .created_with_tag(CAPABILITY_TAG)
            .ok_or_else(|| LedgerError::MissingEffect("capability object".into()))?;
        info!(repo = %repo, name, "created repository");
        Ok((RepoId(repo), Capability(cap)))
    }

    /// Create a commit on `branch`. The ledger atomically advances the
    /// branch head as a side effect of the same transaction.
    pub async fn commit(
        &self,
        repo: RepoId,
        cap: Capability,
        branch: &str,
        root_blob: &BlobId,
        parents: &[CommitId],
        message: &str,
    ) -> LedgerResult<CommitId> {
        let call = MutationCall::new(
            "commit",
            vec![
                CallArg::Object(repo.address()),
                CallArg::Object(cap.address()),
                CallArg::Str(branch.to_string()),
                CallArg::Str(root_blob.as_str().to_string()),
                CallArg::Objects(parents.iter().map(CommitId::address).collect()),
                CallArg::Str(message.to_string()),
            ],
        );
        let effects = self.execute(call).await?;
        let id = effects
            .created_with_tag(VERSION_TAG)
            .ok_or_else(|| LedgerError::MissingEffect("version object".into()))?;
        info!(repo = %repo.short_hex(), branch, commit = %CommitId(id).short_hex(), "committed");
        Ok(CommitId(id))
    }

    /// Bind a new branch name to an existing commit.
    pub async fn create_branch(
        &self,
        repo: RepoId,
        cap: Capability,
        name: &str,
        from: CommitId,
    ) -> LedgerResult<()> {
        let call = MutationCall::new(
            "create_branch",
            vec![
                CallArg::Object(repo.address()),
                CallArg::Object(cap.address()),
                CallArg::Str(name.to_string()),
                CallArg::Object(from.address()),
            ],
        );
        self.execute(call).await?;
        Ok(())
    }

    /// Submit, then poll for effects under the bounded budget.
    async fn execute(&self, call: MutationCall) -> LedgerResult<TxEffects> {
        let handle: TxHandle = self.transport.submit(call).await?;
        match poll_effects(&self.transport, &handle, &self.policy).await? {
            PollOutcome::Ready(effects) => Ok(effects),
            PollOutcome::TimedOut { attempts } => {
                Err(LedgerError::IndexingTimeout { attempts })
            }
        }
    }

    // ---- Read operations (no polling, ever) ----

    /// Fetch and decode a repository record.
    pub async fn get_repository(&self, repo: RepoId) -> LedgerResult<Repository> {
        let results = self.transport.simulate(ReadQuery::Repository { repo }).await?;
        let value = single(results, "repository")?;
        Ok(decode_repository(&value)?)
    }

    /// Current head of a branch, or `None` if the branch does not exist.
    ///
    /// Absence is a normal answer here — the first commit on a branch asks
    /// this exact question.
    pub async fn get_branch_head(
        &self,
        repo: RepoId,
        branch: &str,
    ) -> LedgerResult<Option<CommitId>> {
        let results = self
            .transport
            .simulate(ReadQuery::BranchHead {
                repo,
                branch: branch.to_string(),
            })
            .await?;
        match results.into_iter().next() {
            None => Ok(None),
            Some(value) => Ok(Some(CommitId(decode_address_value(&value)?))),
        }
    }

    /// Fetch and decode one commit record.
    pub async fn get_version(&self, commit: CommitId) -> LedgerResult<Commit> {
        let results = self.transport.simulate(ReadQuery::Version { commit }).await?;
        let value = single(results, "version")?;
        Ok(decode_commit(&value)?)
    }

    /// Ids of every repository created by `owner`.
    pub async fn repositories_by_owner(&self, owner: Address) -> LedgerResult<Vec<RepoId>> {
        let results = self
            .transport
            .simulate(ReadQuery::RepositoriesByOwner { owner })
            .await?;
        let value = single(results, "repository list")?;
        Ok(decode_address_vector(&value)?
            .into_iter()
            .map(RepoId)
            .collect())
    }
}

fn single(mut results: Vec<ReturnValue>, what: &str) -> LedgerResult<ReturnValue> {
    match results.len() {
        1 => Ok(results.remove(0)),
        0 => Err(LedgerError::NotFound(what.to_string())),
        n => Err(LedgerError::Transport(format!(
            "expected one {what} tuple, got {n}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::InMemoryTransport;

    fn client(lag: u32) -> LedgerClient<InMemoryTransport> {
        let author = Address::from_raw([0xa1; 32]);
        let transport = InMemoryTransport::with_indexing_lag(author, lag);
        LedgerClient::with_policy(transport, author, PollPolicy::immediate(5))
    }

    #[tokio::test]
    async fn create_repository_recovers_ids_from_effects() {
        let client = client(0);
        let (repo, cap) = client.create_repository("proj").await.unwrap();
        assert_ne!(repo.address(), cap.address());

        let record = client.get_repository(repo).await.unwrap();
        assert_eq!(record.name, "proj");
        assert_eq!(record.owner, client.author());
        assert_eq!(record.commit_count, 0);
    }

    #[tokio::test]
    async fn commit_advances_branch_head() {
        let client = client(0);
        let (repo, cap) = client.create_repository("proj").await.unwrap();
        assert_eq!(client.get_branch_head(repo, "main").await.unwrap(), None);

        let id = client
            .commit(repo, cap, "main", &BlobId::new("tree-1"), &[], "root")
            .await
            .unwrap();
        assert_eq!(client.get_branch_head(repo, "main").await.unwrap(), Some(id));

        let commit = client.get_version(id).await.unwrap();
        assert!(commit.is_root());
        assert_eq!(commit.message, "root");
        assert_eq!(commit.root_tree, BlobId::new("tree-1"));
    }

    #[tokio::test]
    async fn indexing_lag_inside_budget_succeeds() {
        let client = client(3);
        let (repo, _cap) = client.create_repository("laggy").await.unwrap();
        assert!(!repo.address().is_null());
    }

    #[tokio::test]
    async fn indexing_lag_beyond_budget_times_out() {
        let client = client(50);
        let err = client.create_repository("too-slow").await.unwrap_err();
        assert!(matches!(err, LedgerError::IndexingTimeout { attempts: 5 }));
    }

    #[tokio::test]
    async fn rejection_is_immediate_with_no_polling() {
        let client = client(0);
        client.transport().reject_next("capability mismatch");
        let err = client.create_repository("nope").await.unwrap_err();
        assert!(matches!(err, LedgerError::Rejected(_)));
        assert_eq!(client.transport().effect_polls(), 0);
    }

    #[tokio::test]
    async fn commit_with_unknown_parent_is_rejected() {
        let client = client(0);
        let (repo, cap) = client.create_repository("proj").await.unwrap();
        let ghost = CommitId(Address::from_raw([0xdd; 32]));
        let err = client
            .commit(repo, cap, "main", &BlobId::new("t"), &[ghost], "bad")
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::Rejected(_)));
    }

    #[tokio::test]
    async fn capability_for_other_repo_is_permission_denied() {
        let client = client(0);
        let (repo_a, _cap_a) = client.create_repository("a").await.unwrap();
        let (_repo_b, cap_b) = client.create_repository("b").await.unwrap();
        let err = client
            .commit(repo_a, cap_b, "main", &BlobId::new("t"), &[], "cross")
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::PermissionDenied(_)));
    }

    #[tokio::test]
    async fn create_branch_from_existing_commit() {
        let client = client(0);
        let (repo, cap) = client.create_repository("proj").await.unwrap();
        let root = client
            .commit(repo, cap, "main", &BlobId::new("t0"), &[], "root")
            .await
            .unwrap();
        client.create_branch(repo, cap, "dev", root).await.unwrap();
        assert_eq!(client.get_branch_head(repo, "dev").await.unwrap(), Some(root));
    }

    #[tokio::test]
    async fn repositories_by_owner_lists_all() {
        let client = client(0);
        let (r1, _) = client.create_repository("one").await.unwrap();
        let (r2, _) = client.create_repository("two").await.unwrap();
        let repos = client.repositories_by_owner(client.author()).await.unwrap();
        assert!(repos.contains(&r1) && repos.contains(&r2));
        assert_eq!(repos.len(), 2);
    }

    #[tokio::test]
    async fn missing_repository_is_not_found() {
        let client = client(0);
        let ghost = RepoId(Address::from_raw([9; 32]));
        assert!(matches!(
            client.get_repository(ghost).await.unwrap_err(),
            LedgerError::NotFound(_)
        ));
    }
}
