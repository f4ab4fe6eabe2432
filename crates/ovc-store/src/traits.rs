use async_trait::async_trait;
use ovc_types::BlobId;

use crate::error::StoreResult;

/// Content-addressed, epoch-expiring blob storage.
///
/// All implementations must satisfy these invariants:
/// - Blobs are immutable once written; the store assigns the id.
/// - A blob id referenced by a live tree or commit resolves until its
///   retention expires; no durability is promised beyond that.
/// - Storing identical bytes twice may return the same id or a usable new
///   one; callers must not assume uniqueness across repeated uploads.
/// - `exists` never fails: any negative or ambiguous answer is `false`.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Upload `bytes`, retained for `retention_epochs` storage epochs.
    ///
    /// Fails with [`StoreError::Unavailable`](crate::StoreError::Unavailable)
    /// on transport failure or a non-success response.
    async fn put(&self, bytes: &[u8], retention_epochs: u64) -> StoreResult<BlobId>;

    /// Download a blob's bytes.
    ///
    /// Fails with [`StoreError::NotFound`](crate::StoreError::NotFound) if
    /// the id is unknown or the blob has expired.
    async fn get(&self, id: &BlobId) -> StoreResult<Vec<u8>>;

    /// Check whether a blob currently resolves.
    async fn exists(&self, id: &BlobId) -> bool;
}
