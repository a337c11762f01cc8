use async_trait::async_trait;
use bytes::Bytes;

use fragments_core::FragmentRecord;

use crate::error::StoreError;
use crate::key::FragmentKey;
use crate::listing::FragmentListing;

/// Trait for persisting fragment metadata records.
///
/// Implementations must be `Send + Sync` and safe for concurrent access.
#[async_trait]
pub trait MetadataStore: Send + Sync {
    /// Insert or replace the record stored under `(owner_id, id)`.
    async fn write(&self, record: &FragmentRecord) -> Result<(), StoreError>;

    /// Get the record for a key. Returns `None` if nothing is stored.
    async fn read(&self, key: &FragmentKey) -> Result<Option<FragmentRecord>, StoreError>;

    /// List every record belonging to `owner_id`.
    ///
    /// Returns an empty listing when the owner has no fragments. Entries that
    /// cannot be materialized are dropped rather than failing the listing.
    async fn list(&self, owner_id: &str, expand: bool) -> Result<FragmentListing, StoreError>;

    /// Delete a record. Returns `true` if the record existed.
    async fn delete(&self, key: &FragmentKey) -> Result<bool, StoreError>;
}

/// Trait for persisting raw fragment bytes, independent of metadata.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Store `data` under the key, overwriting any previous payload.
    async fn write(&self, key: &FragmentKey, data: Bytes) -> Result<(), StoreError>;

    /// Read the full payload for a key. Returns `None` if nothing is stored.
    async fn read(&self, key: &FragmentKey) -> Result<Option<Bytes>, StoreError>;

    /// Delete a payload. Returns `true` if the payload existed.
    async fn delete(&self, key: &FragmentKey) -> Result<bool, StoreError>;
}
