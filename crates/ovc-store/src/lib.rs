//! Blob storage and tree snapshots for OVC.
//!
//! File content lives in a remote content-addressed, epoch-expiring blob
//! store reached over HTTP. This crate provides the [`BlobStore`] interface,
//! the HTTP client against the store's publisher/aggregator endpoints, an
//! in-memory store for tests and embedding, and the [`Tree`] codec that
//! turns a list of path → blob bindings into one storable snapshot blob.
//!
//! # Design Rules
//!
//! 1. Blobs are opaque and immutable; ids are assigned by the store and
//!    never interpreted locally.
//! 2. Re-uploading identical bytes may return the same id or a fresh one —
//!    callers must not assume either.
//! 3. `exists` never fails; any ambiguous answer is reported as absent.
//! 4. Tree serialization is self-describing and round-trips exactly.

pub mod error;
pub mod http;
pub mod memory;
pub mod traits;
pub mod tree;

pub use error::{StoreError, StoreResult};
pub use http::HttpBlobStore;
pub use memory::InMemoryBlobStore;
pub use traits::BlobStore;
pub use tree::{Tree, TreeFile};
