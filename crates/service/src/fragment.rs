use bytes::Bytes;
use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use fragments_convert::targets_for;
use fragments_core::{FragmentRecord, MediaType, MediaTypeError};
use fragments_store::{FragmentListing, Storage, StoreError};

use crate::error::FragmentError;

/// A fragment's metadata bound to the storage it lives in.
///
/// The record is only ever mutated through [`Fragment::save`] and
/// [`Fragment::set_data`], which keep `updated` and `size` consistent with
/// what was last written.
#[derive(Debug, Clone)]
pub struct Fragment {
    record: FragmentRecord,
    storage: Storage,
}

fn validate(record: &FragmentRecord) -> Result<(), FragmentError> {
    if record.owner_id.is_empty() {
        return Err(FragmentError::InvalidInput("owner id is required".to_owned()));
    }
    if record.content_type.trim().is_empty() {
        return Err(FragmentError::InvalidInput("type is required".to_owned()));
    }
    let media = MediaType::parse(&record.content_type)?;
    if !media.is_supported() {
        return Err(MediaTypeError::Unsupported(media.essence().to_owned()).into());
    }
    Ok(())
}

/// `now`, but never earlier than `created`.
fn touch(created: DateTime<Utc>) -> DateTime<Utc> {
    Utc::now().max(created)
}

impl Fragment {
    /// Create a new, unsaved fragment with a fresh id and timestamps.
    pub fn new(storage: Storage, owner_id: &str, content_type: &str) -> Result<Self, FragmentError> {
        let now = Utc::now();
        Self::from_record(
            storage,
            FragmentRecord {
                id: FragmentRecord::generate_id(),
                owner_id: owner_id.to_owned(),
                created: now,
                updated: now,
                content_type: content_type.to_owned(),
                size: 0,
            },
        )
    }

    /// Wrap an existing record, applying the same checks as [`Fragment::new`].
    pub fn from_record(storage: Storage, record: FragmentRecord) -> Result<Self, FragmentError> {
        validate(&record)?;
        Ok(Self { record, storage })
    }

    pub fn record(&self) -> &FragmentRecord {
        &self.record
    }

    pub fn into_record(self) -> FragmentRecord {
        self.record
    }

    pub fn id(&self) -> &str {
        &self.record.id
    }

    pub fn owner_id(&self) -> &str {
        &self.record.owner_id
    }

    /// The full stored type, charset included.
    pub fn content_type(&self) -> &str {
        &self.record.content_type
    }

    pub fn size(&self) -> u64 {
        self.record.size
    }

    /// Refresh `updated` and write the metadata record. Bytes are untouched.
    pub async fn save(&mut self) -> Result<(), FragmentError> {
        self.record.updated = touch(self.record.created);
        self.storage.write_metadata(&self.record).await?;
        Ok(())
    }

    /// Replace the fragment's bytes.
    ///
    /// Metadata is written first, then the bytes. Either failure is returned
    /// as is; the earlier write is not rolled back.
    pub async fn set_data(&mut self, data: Bytes) -> Result<(), FragmentError> {
        self.record.size = data.len() as u64;
        self.save().await?;
        debug!(id = %self.record.id, size = self.record.size, "writing fragment bytes");
        self.storage
            .write_data(&self.record.owner_id, &self.record.id, data)
            .await?;
        Ok(())
    }

    /// Read the fragment's bytes.
    pub async fn data(&self) -> Result<Bytes, FragmentError> {
        match self
            .storage
            .read_data(&self.record.owner_id, &self.record.id)
            .await
        {
            Ok(data) => Ok(data),
            Err(StoreError::NotFound(what)) => {
                warn!(
                    owner_id = %self.record.owner_id,
                    id = %self.record.id,
                    "fragment metadata exists without stored bytes"
                );
                Err(FragmentError::Storage(StoreError::NotFound(what)))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// List an owner's fragments as ids, or full records when `expand` is set.
    pub async fn by_owner(
        storage: &Storage,
        owner_id: &str,
        expand: bool,
    ) -> Result<FragmentListing, FragmentError> {
        Ok(storage.list_metadata(owner_id, expand).await?)
    }

    /// Load one fragment, or [`FragmentError::NotFound`].
    pub async fn by_id(storage: &Storage, owner_id: &str, id: &str) -> Result<Self, FragmentError> {
        let record = storage
            .read_metadata(owner_id, id)
            .await
            .map_err(|e| match e {
                StoreError::NotFound(_) => FragmentError::NotFound(id.to_owned()),
                other => FragmentError::Storage(other),
            })?;
        Self::from_record(storage.clone(), record)
    }

    /// Remove a fragment's metadata and bytes.
    pub async fn delete(storage: &Storage, owner_id: &str, id: &str) -> Result<(), FragmentError> {
        storage.delete_metadata(owner_id, id).await?;
        storage.delete_data(owner_id, id).await?;
        Ok(())
    }

    /// The base media type, parameters stripped.
    pub fn mime_type(&self) -> String {
        MediaType::parse(&self.record.content_type)
            .map(|media| media.essence().to_owned())
            .unwrap_or_else(|_| self.record.content_type.clone())
    }

    pub fn is_text(&self) -> bool {
        self.mime_type().starts_with("text/")
    }

    /// Media types this fragment can be served as, its own base type first.
    pub fn formats(&self) -> Vec<String> {
        match MediaType::parse(&self.record.content_type) {
            Ok(media) => targets_for(&media),
            Err(_) => vec![self.mime_type()],
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;
    use fragments_store::{BlobStore, FragmentKey};
    use fragments_store_memory::{MemoryMetadataStore, memory_storage};

    use super::*;

    struct FailingBlobStore;

    #[async_trait]
    impl BlobStore for FailingBlobStore {
        async fn write(&self, _key: &FragmentKey, _data: Bytes) -> Result<(), StoreError> {
            Err(StoreError::Backend("disk on fire".to_owned()))
        }

        async fn read(&self, _key: &FragmentKey) -> Result<Option<Bytes>, StoreError> {
            Err(StoreError::Backend("disk on fire".to_owned()))
        }

        async fn delete(&self, _key: &FragmentKey) -> Result<bool, StoreError> {
            Ok(false)
        }
    }

    #[test]
    fn new_generates_id_and_timestamps() {
        let fragment = Fragment::new(memory_storage(), "owner", "text/plain").unwrap();
        assert!(!fragment.id().is_empty());
        assert_eq!(fragment.size(), 0);
        assert_eq!(fragment.record().created, fragment.record().updated);
    }

    #[test]
    fn new_requires_owner_and_type() {
        assert!(matches!(
            Fragment::new(memory_storage(), "", "text/plain"),
            Err(FragmentError::InvalidInput(_))
        ));
        assert!(matches!(
            Fragment::new(memory_storage(), "owner", ""),
            Err(FragmentError::InvalidInput(_))
        ));
    }

    #[test]
    fn new_rejects_unsupported_types() {
        assert!(matches!(
            Fragment::new(memory_storage(), "owner", "image/png"),
            Err(FragmentError::UnsupportedType(_))
        ));
        assert!(matches!(
            Fragment::new(memory_storage(), "owner", "application/msword"),
            Err(FragmentError::UnsupportedType(_))
        ));
    }

    #[test]
    fn type_helpers() {
        let fragment =
            Fragment::new(memory_storage(), "owner", "text/markdown; charset=utf-8").unwrap();
        assert_eq!(fragment.mime_type(), "text/markdown");
        assert!(fragment.is_text());
        assert_eq!(
            fragment.formats(),
            vec!["text/markdown", "text/plain", "text/html"]
        );

        let json = Fragment::new(memory_storage(), "owner", "application/json").unwrap();
        assert!(!json.is_text());
        assert_eq!(json.formats(), vec!["application/json", "text/plain"]);
    }

    #[tokio::test]
    async fn save_refreshes_updated_only() {
        let storage = memory_storage();
        let mut fragment = Fragment::new(storage.clone(), "owner", "text/plain").unwrap();
        let created = fragment.record().created;
        fragment.save().await.unwrap();

        assert_eq!(fragment.record().created, created);
        assert!(fragment.record().updated >= created);
        assert!(storage.read_data("owner", fragment.id()).await.is_err());
        let stored = storage.read_metadata("owner", fragment.id()).await.unwrap();
        assert_eq!(&stored, fragment.record());
    }

    #[tokio::test]
    async fn set_data_updates_size_and_bytes() {
        let storage = memory_storage();
        let mut fragment = Fragment::new(storage.clone(), "owner", "text/plain").unwrap();
        fragment.set_data(Bytes::from_static(b"hello world")).await.unwrap();
        assert_eq!(fragment.size(), 11);

        let loaded = Fragment::by_id(&storage, "owner", fragment.id()).await.unwrap();
        assert_eq!(loaded.size(), 11);
        assert_eq!(&loaded.data().await.unwrap()[..], b"hello world");

        fragment.set_data(Bytes::from_static(b"bye")).await.unwrap();
        let loaded = Fragment::by_id(&storage, "owner", fragment.id()).await.unwrap();
        assert_eq!(loaded.size(), 3);
        assert_eq!(&loaded.data().await.unwrap()[..], b"bye");
    }

    #[tokio::test]
    async fn by_id_missing_is_not_found() {
        let storage = memory_storage();
        assert!(matches!(
            Fragment::by_id(&storage, "owner", "nope").await,
            Err(FragmentError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn by_id_is_scoped_to_owner() {
        let storage = memory_storage();
        let mut fragment = Fragment::new(storage.clone(), "alice", "text/plain").unwrap();
        fragment.set_data(Bytes::from_static(b"secret")).await.unwrap();
        assert!(matches!(
            Fragment::by_id(&storage, "bob", fragment.id()).await,
            Err(FragmentError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn blob_failure_propagates_after_metadata_write() {
        let metadata = Arc::new(MemoryMetadataStore::new());
        let storage = Storage::new("test", metadata.clone(), Arc::new(FailingBlobStore));
        let mut fragment = Fragment::new(storage, "owner", "text/plain").unwrap();

        let err = fragment.set_data(Bytes::from_static(b"x")).await.unwrap_err();
        assert!(matches!(err, FragmentError::Storage(StoreError::Backend(_))));
        // The metadata write is not rolled back.
        assert_eq!(metadata.len(), 1);
    }

    #[tokio::test]
    async fn missing_bytes_are_a_storage_error() {
        let storage = memory_storage();
        let mut fragment = Fragment::new(storage.clone(), "owner", "text/plain").unwrap();
        fragment.save().await.unwrap();
        assert!(matches!(
            fragment.data().await,
            Err(FragmentError::Storage(_))
        ));
    }

    #[tokio::test]
    async fn delete_removes_both_halves() {
        let storage = memory_storage();
        let mut fragment = Fragment::new(storage.clone(), "owner", "text/plain").unwrap();
        fragment.set_data(Bytes::from_static(b"gone soon")).await.unwrap();

        Fragment::delete(&storage, "owner", fragment.id()).await.unwrap();
        assert!(storage.read_metadata("owner", fragment.id()).await.is_err());
        assert!(storage.read_data("owner", fragment.id()).await.is_err());
    }

    #[tokio::test]
    async fn by_owner_lists_ids_or_records() {
        let storage = memory_storage();
        let mut fragment = Fragment::new(storage.clone(), "owner", "text/csv").unwrap();
        fragment.set_data(Bytes::from_static(b"a,b")).await.unwrap();

        let ids = Fragment::by_owner(&storage, "owner", false).await.unwrap();
        assert_eq!(ids.ids(), vec![fragment.id()]);

        let records = Fragment::by_owner(&storage, "owner", true).await.unwrap();
        assert_eq!(records, FragmentListing::Expanded(vec![fragment.record().clone()]));

        let empty = Fragment::by_owner(&storage, "someone-else", false).await.unwrap();
        assert!(empty.is_empty());
    }
}
