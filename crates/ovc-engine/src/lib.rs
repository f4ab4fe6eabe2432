//! The OVC versioning engine.
//!
//! Orchestrates the blob store and the ledger client into the user-facing
//! version-control operations: init, commit, log, checkout, diff, cat,
//! status, create-branch. The engine owns the ordering invariants — every
//! blob is durable before the tree referencing it is composed, and the tree
//! blob is durable before the commit referencing it is written — so a
//! failure at any step leaves nothing partial observable.
//!
//! Targeting is an explicit [`RepoContext`] value passed into each call
//! rather than engine state, so one engine can drive any number of
//! repositories and tests stay isolated.

pub mod context;
pub mod diff;
pub mod engine;
pub mod error;

pub use context::{RepoContext, RepoStatus, WorkingFile};
pub use diff::diff_trees;
pub use engine::{VersioningEngine, DEFAULT_RETENTION_EPOCHS};
pub use error::{EngineError, EngineResult};
