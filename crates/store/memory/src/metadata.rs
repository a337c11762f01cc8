use async_trait::async_trait;
use dashmap::DashMap;

use fragments_core::{FragmentId, FragmentRecord, OwnerId};
use fragments_store::error::StoreError;
use fragments_store::key::FragmentKey;
use fragments_store::listing::FragmentListing;
use fragments_store::store::MetadataStore;

/// In-memory [`MetadataStore`] backed by a two-level [`DashMap`].
///
/// The outer map is keyed by owner, the inner one by fragment id. Records are
/// cloned on the way in and on the way out, so callers never share state with
/// the store.
#[derive(Debug, Default)]
pub struct MemoryMetadataStore {
    owners: DashMap<OwnerId, DashMap<FragmentId, FragmentRecord>>,
}

impl MemoryMetadataStore {
    /// Create a new, empty in-memory metadata store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MetadataStore for MemoryMetadataStore {
    async fn write(&self, record: &FragmentRecord) -> Result<(), StoreError> {
        self.owners
            .entry(record.owner_id.clone())
            .or_default()
            .insert(record.id.clone(), record.clone());
        Ok(())
    }

    async fn read(&self, key: &FragmentKey) -> Result<Option<FragmentRecord>, StoreError> {
        Ok(self
            .owners
            .get(&key.owner_id)
            .and_then(|owner| owner.get(&key.id).map(|record| record.clone())))
    }

    async fn list(&self, owner_id: &str, expand: bool) -> Result<FragmentListing, StoreError> {
        let Some(owner) = self.owners.get(owner_id) else {
            return Ok(FragmentListing::empty(expand));
        };

        let mut records: Vec<FragmentRecord> =
            owner.iter().map(|entry| entry.value().clone()).collect();
        drop(owner);

        // DashMap iteration order is arbitrary; keep listings stable.
        records.sort_by(|a, b| a.created.cmp(&b.created).then_with(|| a.id.cmp(&b.id)));
        Ok(FragmentListing::from_records(records, expand))
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
