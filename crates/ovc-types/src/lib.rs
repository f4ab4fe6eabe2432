//! Foundation types for OVC (Onchain Version Control).
//!
//! This crate provides the identity and data-model types shared by every
//! other OVC crate: ledger addresses, repository/commit/capability ids,
//! blob references, and the commit/repository/file-entry records themselves.
//!
//! # Key Types
//!
//! - [`Address`] — 32-byte ledger object/account identifier
//! - [`RepoId`], [`CommitId`], [`Capability`] — typed wrappers over [`Address`]
//! - [`BlobId`] — opaque id assigned by the blob store on first write
//! - [`Commit`] — immutable version record (tree reference, parents, author)
//! - [`Repository`] — repository record with its branch-head map
//! - [`FileEntry`] — one path → blob binding inside a tree snapshot

pub mod address;
pub mod change;
pub mod commit;
pub mod entry;
pub mod error;
pub mod ids;
pub mod repository;

pub use address::Address;
pub use change::{Change, ChangeKind};
pub use commit::Commit;
pub use entry::{FileEntry, FileKind};
pub use error::TypeError;
pub use ids::{BlobId, Capability, CommitId, RepoId};
pub use repository::Repository;
