use async_trait::async_trait;
use bytes::Bytes;
use dashmap::DashMap;
use tracing::trace;

use fragments_core::{FragmentId, OwnerId};
use fragments_store::error::StoreError;
use fragments_store::key::FragmentKey;
use fragments_store::store::BlobStore;

/// In-memory [`BlobStore`] keyed by owner, then by fragment id.
///
/// [`Bytes`] is reference counted, so reads hand out cheap clones of the
/// stored buffer rather than copying it.
#[derive(Debug, Default)]
pub struct MemoryBlobStore {
    owners: DashMap<OwnerId, DashMap<FragmentId, Bytes>>,
}

impl MemoryBlobStore {
    /// Create a new, empty in-memory blob store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn write(&self, key: &FragmentKey, data: Bytes) -> Result<(), StoreError> {
        trace!(key = %key, size = data.len(), "storing blob in memory");
        self.owners
            .entry(key.owner_id.clone())
            .or_default()
            .insert(key.id.clone(), data);
        Ok(())
    }

    async fn read(&self, key: &FragmentKey) -> Result<Option<Bytes>, StoreError> {
        Ok(self
            .owners
            .get(&key.owner_id)
            .and_then(|owner| owner.get(&key.id).map(|entry| entry.clone())))
    }

    async fn delete(&self, key: &FragmentKey) -> Result<bool, StoreError> {
        let removed = self
            .owners
            .get(&key.owner_id)
            .is_some_and(|owner| owner.remove(&key.id).is_some());
        self.owners.remove_if(&key.owner_id, |_, owner| owner.is_empty());
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use fragments_store::testing::run_blob_conformance_tests;

    use super::*;

    #[tokio::test]
    async fn conformance() {
        let store = MemoryBlobStore::new();
        run_blob_conformance_tests(&store)
            .await
            .expect("conformance tests should pass");
    }

    #[tokio::test]
    async fn empty_payload_round_trips() {
        let store = MemoryBlobStore::new();
        let key = FragmentKey::new("o", "empty");
        store.write(&key, Bytes::new()).await.unwrap();
        assert_eq!(store.read(&key).await.unwrap(), Some(Bytes::new()));
    }

    #[tokio::test]
    async fn keys_sharing_an_object_key_are_distinct() {
        let store = MemoryBlobStore::new();
        store
            .write(&FragmentKey::new("alice/x", "y"), Bytes::from_static(b"alice secret"))
            .await
            .unwrap();

        assert_eq!(store.read(&FragmentKey::new("alice", "x/y")).await.unwrap(), None);
        assert!(!store.delete(&FragmentKey::new("alice", "x/y")).await.unwrap());
    }

    #[tokio::test]
    async fn delete_drops_empty_owner() {
        let store = MemoryBlobStore::new();
        let key = FragmentKey::new("o", "gone");
        store.write(&key, Bytes::from_static(b"x")).await.unwrap();
        assert!(store.delete(&key).await.unwrap());
        assert!(store.owners.is_empty());
    }
}
