use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::RwLock;

use async_trait::async_trait;
use ovc_types::BlobId;

use crate::error::{StoreError, StoreResult};
use crate::traits::BlobStore;

/// In-memory, HashMap-based blob store.
///
/// Intended for tests and embedding. Ids are derived deterministically from
/// content, so identical bytes always map to the same id — a stricter
/// guarantee than the trait requires, which is fine for a test double.
pub struct InMemoryBlobStore {
    blobs: RwLock<HashMap<BlobId, Vec<u8>>>,
    fail_puts: AtomicBool,
}

impl InMemoryBlobStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self {
            blobs: RwLock::new(HashMap::new()),
            fail_puts: AtomicBool::new(false),
        }
    }

    /// Number of blobs currently stored.
    pub fn len(&self) -> usize {
        self.blobs.read().expect("lock poisoned").len()
    }

    /// Returns `true` if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.blobs.read().expect("lock poisoned").is_empty()
    }

    /// Remove all blobs.
    pub fn clear(&self) {
        self.blobs.write().expect("lock poisoned").clear();
    }

    /// Make every subsequent `put` fail as unavailable (or stop doing so).
    ///
    /// Used to test all-or-nothing commit behavior.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.fail_puts.store(unavailable, Ordering::SeqCst);
    }

    /// Drop one blob, simulating retention expiry.
    pub fn expire(&self, id: &BlobId) -> bool {
        self.blobs
            .write()
            .expect("lock poisoned")
            .remove(id)
            .is_some()
    }

    fn derive_id(bytes: &[u8]) -> BlobId {
        // FNV-1a over the content. Not cryptographic; collision resistance
        // wildly exceeds what a test double needs.
        let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
        for &b in bytes {
            hash ^= u64::from(b);
            hash = hash.wrapping_mul(0x0000_0100_0000_01b3);
        }
        BlobId::new(format!("mem-{hash:016x}-{}", bytes.len()))
    }
}

impl Default for InMemoryBlobStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BlobStore for InMemoryBlobStore {
    async fn put(&self, bytes: &[u8], _retention_epochs: u64) -> StoreResult<BlobId> {
        if self.fail_puts.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("store marked unavailable".into()));
        }
        let id = Self::derive_id(bytes);
        self.blobs
            .write()
            .expect("lock poisoned")
            .entry(id.clone())
            .or_insert_with(|| bytes.to_vec());
        Ok(id)
    }

    async fn get(&self, id: &BlobId) -> StoreResult<Vec<u8>> {
        self.blobs
            .read()
            .expect("lock poisoned")
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(id.clone()))
    }

    async fn exists(&self, id: &BlobId) -> bool {
        self.blobs.read().expect("lock poisoned").contains_key(id)
    }
}

impl std::fmt::Debug for InMemoryBlobStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryBlobStore")
            .field("blob_count", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn put_and_get() {
        let store = InMemoryBlobStore::new();
        let id = store.put(b"hello", 5).await.unwrap();
        assert_eq!(store.get(&id).await.unwrap(), b"hello");
        assert!(store.exists(&id).await);
    }

    #[tokio::test]
    async fn identical_bytes_share_an_id() {
        let store = InMemoryBlobStore::new();
        let id1 = store.put(b"same", 1).await.unwrap();
        let id2 = store.put(b"same", 1).await.unwrap();
        assert_eq!(id1, id2);
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn missing_blob_is_not_found() {
        let store = InMemoryBlobStore::new();
        let id = BlobId::new("never-written");
        assert!(matches!(
            store.get(&id).await.unwrap_err(),
            StoreError::NotFound(_)
        ));
        assert!(!store.exists(&id).await);
    }

    #[tokio::test]
    async fn expiry_removes_the_blob() {
        let store = InMemoryBlobStore::new();
        let id = store.put(b"short-lived", 1).await.unwrap();
        assert!(store.expire(&id));
        assert!(!store.exists(&id).await);
        assert!(matches!(
            store.get(&id).await.unwrap_err(),
            StoreError::NotFound(_)
        ));
    }

    #[tokio::test]
    async fn unavailable_store_rejects_puts() {
        let store = InMemoryBlobStore::new();
        store.set_unavailable(true);
        assert!(matches!(
            store.put(b"x", 1).await.unwrap_err(),
            StoreError::Unavailable(_)
        ));
        store.set_unavailable(false);
        assert!(store.put(b"x", 1).await.is_ok());
    }
}
