//! In-memory ledger transport for tests and embedding.
//!
//! This is a working ledger double, not a stub: mutating calls execute
//! against real state with the contract's own checks (capability binding,
//! no forward parent references), effects become visible only after a
//! configurable number of polls (simulated indexing lag), and read
//! simulations answer with bytes laid out by the `ovc-wire` encoder — so
//! everything above it exercises the genuine decode path.

use std::collections::HashMap;
use std::sync::Mutex;

use ovc_types::{Address, Commit, CommitId, RepoId, Repository};
use ovc_wire::encode::{encode_address, encode_address_vector, encode_commit, encode_repository};
use ovc_wire::schema::{REPOSITORY_TAG, VERSION_TAG};
use ovc_wire::ReturnValue;

use async_trait::async_trait;

use crate::call::{CallArg, CreatedObject, MutationCall, ReadQuery, TxEffects, TxHandle};
use crate::client::CAPABILITY_TAG;
use crate::error::{LedgerError, LedgerResult};
use crate::traits::LedgerTransport;

struct Pending {
    effects: TxEffects,
    remaining_lag: u32,
}

struct State {
    repos: HashMap<Address, Repository>,
    commits: HashMap<Address, Commit>,
    /// capability object → repository it authorizes.
    caps: HashMap<Address, Address>,
    pending: HashMap<String, Pending>,
    counter: u64,
    reject_next: Option<String>,
    effect_polls: u64,
}

/// In-memory [`LedgerTransport`].
pub struct InMemoryTransport {
    author: Address,
    indexing_lag: u32,
    salt: u64,
    state: Mutex<State>,
}

impl InMemoryTransport {
    /// Transport with effects visible on the first poll.
    pub fn new(author: Address) -> Self {
        Self::with_indexing_lag(author, 0)
    }

    /// Transport whose effects stay invisible for `lag` polls.
    pub fn with_indexing_lag(author: Address, lag: u32) -> Self {
        Self {
            author,
            indexing_lag: lag,
            salt: rand::random(),
            state: Mutex::new(State {
                repos: HashMap::new(),
                commits: HashMap::new(),
                caps: HashMap::new(),
                pending: HashMap::new(),
                counter: 0,
                reject_next: None,
                effect_polls: 0,
            }),
        }
    }

    /// Arm the transport to reject the next submitted transaction.
    pub fn reject_next(&self, reason: &str) {
        self.state.lock().expect("lock poisoned").reject_next = Some(reason.to_string());
    }

    /// Total `effects` lookups served, across all transactions.
    pub fn effect_polls(&self) -> u64 {
        self.state.lock().expect("lock poisoned").effect_polls
    }

    /// Drop a commit record, making it unfetchable. Failure injection for
    /// history traversal; returns whether the commit was known.
    pub fn forget_commit(&self, commit: CommitId) -> bool {
        self.state
            .lock()
            .expect("lock poisoned")
            .commits
            .remove(&commit.address())
            .is_some()
    }

    fn next_address(&self, state: &mut State) -> Address {
        state.counter += 1;
        let mut bytes = [0u8; 32];
        bytes[..8].copy_from_slice(&self.salt.to_le_bytes());
        bytes[8..16].copy_from_slice(&state.counter.to_le_bytes());
        Address::from_raw(bytes)
    }

    fn execute(&self, state: &mut State, call: &MutationCall) -> LedgerResult<TxEffects> {
        match call.entry.as_str() {
            "create_repository" => self.exec_create_repository(state, &call.args),
            "commit" => self.exec_commit(state, &call.args),
            "create_branch" => self.exec_create_branch(state, &call.args),
            other => Err(LedgerError::Rejected(format!("unknown entry point {other}"))),
        }
    }

    fn exec_create_repository(
        &self,
        state: &mut State,
        args: &[CallArg],
    ) -> LedgerResult<TxEffects> {
        let name = arg_str(args, 0)?;
        if name.is_empty() {
            return Err(LedgerError::Rejected("empty repository name".into()));
        }
        let repo_id = self.next_address(state);
        let cap_id = self.next_address(state);
        state.repos.insert(
            repo_id,
            Repository {
                id: RepoId(repo_id),
                name,
                owner: self.author,
                branch_heads: Default::default(),
                commit_count: 0,
            },
        );
        state.caps.insert(cap_id, repo_id);
        Ok(TxEffects {
            created: vec![
                CreatedObject {
                    address: repo_id,
                    type_tag: REPOSITORY_TAG.to_string(),
                },
                CreatedObject {
                    address: cap_id,
                    type_tag: CAPABILITY_TAG.to_string(),
                },
            ],
        })
    }

    fn exec_commit(&self, state: &mut State, args: &[CallArg]) -> LedgerResult<TxEffects> {
        let repo_addr = arg_object(args, 0)?;
        let cap = arg_object(args, 1)?;
        let branch = arg_str(args, 2)?;
        let root_blob = arg_str(args, 3)?;
        let parents = arg_objects(args, 4)?;
        let message = arg_str(args, 5)?;

        self.check_capability(state, repo_addr, cap)?;
        if message.is_empty() {
            return Err(LedgerError::Rejected("empty commit message".into()));
        }
        // No forward references: every parent must already exist. This is
        // what keeps the commit graph acyclic.
        for parent in &parents {
            if !state.commits.contains_key(parent) {
                return Err(LedgerError::Rejected(format!(
                    "unknown parent commit {}",
                    parent.short_hex()
                )));
            }
        }

        let id = self.next_address(state);
        state.commits.insert(
            id,
            Commit {
                id: CommitId(id),
                root_tree: root_blob.into(),
                parents: parents.into_iter().map(CommitId).collect(),
                author: self.author,
                timestamp_secs: chrono::Utc::now().timestamp().max(0) as u64,
                message,
            },
        );
        let repo = state.repos.get_mut(&repo_addr).expect("checked above");
        repo.branch_heads.insert(branch, CommitId(id));
        repo.commit_count += 1;

        Ok(TxEffects {
            created: vec![CreatedObject {
                address: id,
                type_tag: VERSION_TAG.to_string(),
            }],
        })
    }

    fn exec_create_branch(&self, state: &mut State, args: &[CallArg]) -> LedgerResult<TxEffects> {
        let repo_addr = arg_object(args, 0)?;
        let cap = arg_object(args, 1)?;
        let name = arg_str(args, 2)?;
        let from = arg_object(args, 3)?;

        self.check_capability(state, repo_addr, cap)?;
        if !state.commits.contains_key(&from) {
            return Err(LedgerError::Rejected("branch target does not exist".into()));
        }
        let repo = state.repos.get_mut(&repo_addr).expect("checked above");
        if repo.branch_heads.contains_key(&name) {
            return Err(LedgerError::Rejected(format!("branch {name:?} already exists")));
        }
        repo.branch_heads.insert(name, CommitId(from));
        Ok(TxEffects::default())
    }

    fn check_capability(
        &self,
        state: &State,
        repo: Address,
        cap: Address,
    ) -> LedgerResult<()> {
        if !state.repos.contains_key(&repo) {
            return Err(LedgerError::Rejected("unknown repository".into()));
        }
        if state.caps.get(&cap) != Some(&repo) {
            return Err(LedgerError::PermissionDenied(
                "capability does not authorize this repository".into(),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl LedgerTransport for InMemoryTransport {
    async fn submit(&self, call: MutationCall) -> LedgerResult<TxHandle> {
        let mut state = self.state.lock().expect("lock poisoned");
        if let Some(reason) = state.reject_next.take() {
            return Err(LedgerError::Rejected(reason));
        }
        let effects = self.execute(&mut state, &call)?;
        state.counter += 1;
        let digest = format!("tx-{:016x}-{}", self.salt, state.counter);
        state.pending.insert(
            digest.clone(),
            Pending {
                effects,
                remaining_lag: self.indexing_lag,
            },
        );
        Ok(TxHandle::new(digest))
    }

    async fn effects(&self, handle: &TxHandle) -> LedgerResult<Option<TxEffects>> {
        let mut state = self.state.lock().expect("lock poisoned");
        state.effect_polls += 1;
        let pending = state
            .pending
            .get_mut(&handle.digest)
            .ok_or_else(|| LedgerError::Transport(format!("unknown digest {}", handle.digest)))?;
        if pending.remaining_lag > 0 {
            pending.remaining_lag -= 1;
            return Ok(None);
        }
        Ok(Some(pending.effects.clone()))
    }

    async fn simulate(&self, query: ReadQuery) -> LedgerResult<Vec<ReturnValue>> {
        let state = self.state.lock().expect("lock poisoned");
        match query {
            ReadQuery::Repository { repo } => {
                let record = state
                    .repos
                    .get(&repo.address())
                    .ok_or_else(|| LedgerError::NotFound(format!("repository {repo}")))?;
                Ok(vec![encode_repository(record)])
            }
            ReadQuery::BranchHead { repo, branch } => {
                let record = state
                    .repos
                    .get(&repo.address())
                    .ok_or_else(|| LedgerError::NotFound(format!("repository {repo}")))?;
                Ok(match record.head(&branch) {
                    Some(head) => vec![encode_address(&head.address())],
                    None => vec![],
                })
            }
            ReadQuery::Version { commit } => {
                let record = state
                    .commits
                    .get(&commit.address())
                    .ok_or_else(|| LedgerError::NotFound(format!("commit {commit}")))?;
                Ok(vec![encode_commit(record)])
            }
            ReadQuery::RepositoriesByOwner { owner } => {
                let mut ids: Vec<Address> = state
                    .repos
                    .values()
                    .filter(|r| r.owner == owner)
                    .map(|r| r.id.address())
                    .collect();
                ids.sort();
                Ok(vec![encode_address_vector(&ids)])
            }
        }
    }
}

fn arg_str(args: &[CallArg], index: usize) -> LedgerResult<String> {
    match args.get(index) {
        Some(CallArg::Str(s)) => Ok(s.clone()),
        _ => Err(malformed(index, "string")),
    }
}

fn arg_object(args: &[CallArg], index: usize) -> LedgerResult<Address> {
    match args.get(index) {
        Some(CallArg::Object(a)) => Ok(*a),
        _ => Err(malformed(index, "object")),
    }
}

fn arg_objects(args: &[CallArg], index: usize) -> LedgerResult<Vec<Address>> {
    match args.get(index) {
        Some(CallArg::Objects(v)) => Ok(v.clone()),
        _ => Err(malformed(index, "object vector")),
    }
}

fn malformed(index: usize, expected: &str) -> LedgerError {
    LedgerError::Rejected(format!("argument {index} is not a {expected}"))
}
