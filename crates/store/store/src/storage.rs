use std::fmt;
use std::sync::Arc;

use bytes::Bytes;
use tracing::{debug, warn};

use fragments_core::FragmentRecord;

use crate::error::StoreError;
use crate::key::FragmentKey;
use crate::listing::FragmentListing;
use crate::store::{BlobStore, MetadataStore};

/// Storage facade handed to every component that touches fragments.
///
/// Pairs one [`MetadataStore`] with one [`BlobStore`]. The pair is chosen once
/// at start-up and cloned (cheaply) into each consumer; there is no global
/// backend. The two halves fail independently: no operation here spans both.
#[derive(Clone)]
pub struct Storage {
    metadata: Arc<dyn MetadataStore>,
    blobs: Arc<dyn BlobStore>,
    backend: &'static str,
}

impl Storage {
    /// Compose a storage handle from a metadata store and a blob store.
    pub fn new(
        backend: &'static str,
        metadata: Arc<dyn MetadataStore>,
        blobs: Arc<dyn BlobStore>,
    ) -> Self {
        Self {
            metadata,
            blobs,
            backend,
        }
    }

    /// Short name of the backend, for logs and the health endpoint.
    pub fn backend(&self) -> &'static str {
        self.backend
    }

    /// Upsert a metadata record. Rewriting the same id is idempotent.
    pub async fn write_metadata(&self, record: &FragmentRecord) -> Result<(), StoreError> {
        let key = FragmentKey::of(record);
        key.validate()?;
        debug!(key = %key, size = record.size, "writing fragment metadata");
        self.metadata.write(record).await
    }

    /// Read a metadata record, signalling [`StoreError::NotFound`] when absent.
    pub async fn read_metadata(
        &self,
        owner_id: &str,
        id: &str,
    ) -> Result<FragmentRecord, StoreError> {
        let key = FragmentKey::new(owner_id, id);
        key.validate()?;
        self.metadata
            .read(&key)
            .await?
            .ok_or_else(|| StoreError::NotFound(format!("no fragment metadata for {key}")))
    }

    /// List an owner's fragments as ids, or as full records when `expand` is set.
    pub async fn list_metadata(
        &self,
        owner_id: &str,
        expand: bool,
    ) -> Result<FragmentListing, StoreError> {
        self.metadata.list(owner_id, expand).await
    }

    /// Store the raw bytes of a fragment.
    pub async fn write_data(&self, owner_id: &str, id: &str, data: Bytes) -> Result<(), StoreError> {
        let key = FragmentKey::new(owner_id, id);
        key.validate()?;
        debug!(key = %key, size = data.len(), "writing fragment data");
        self.blobs.write(&key, data).await
    }

    /// Read the raw bytes of a fragment as one contiguous buffer.
    pub async fn read_data(&self, owner_id: &str, id: &str) -> Result<Bytes, StoreError> {
        let key = FragmentKey::new(owner_id, id);
        key.validate()?;
        self.blobs
            .read(&key)
            .await?
            .ok_or_else(|| StoreError::NotFound(format!("no fragment data for {key}")))
    }

    /// Best-effort removal of a fragment's bytes.
    pub async fn delete_data(&self, owner_id: &str, id: &str) -> Result<(), StoreError> {
        let key = FragmentKey::new(owner_id, id);
        key.validate()?;
        if !self.blobs.delete(&key).await? {
            warn!(key = %key, "deleted fragment had no stored data");
        }
        Ok(())
    }

    /// Best-effort removal of a fragment's metadata record.
    pub async fn delete_metadata(&self, owner_id: &str, id: &str) -> Result<(), StoreError> {
        let key = FragmentKey::new(owner_id, id);
        key.validate()?;
        if !self.metadata.delete(&key).await? {
            debug!(key = %key, "metadata already absent on delete");
        }
        Ok(())
    }
}

impl fmt::Debug for Storage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Storage")
            .field("backend", &self.backend)
            .finish_non_exhaustive()
    }
}
