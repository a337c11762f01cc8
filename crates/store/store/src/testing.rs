use bytes::Bytes;
use chrono::{Duration, Utc};

use fragments_core::FragmentRecord;

use crate::error::StoreError;
use crate::key::FragmentKey;
use crate::listing::FragmentListing;
use crate::storage::Storage;
use crate::store::{BlobStore, MetadataStore};

const OWNER: &str = "conformance-owner";
const OTHER_OWNER: &str = "conformance-other";

fn test_record(owner_id: &str, id: &str, offset_secs: i64) -> FragmentRecord {
    let created = Utc::now() + Duration::seconds(offset_secs);
    FragmentRecord {
        id: id.to_owned(),
        owner_id: owner_id.to_owned(),
        created,
        updated: created,
        content_type: "text/plain".to_owned(),
        size: 5,
    }
}

/// Run the full metadata store conformance test suite.
///
/// Call this from your backend's test module with a fresh store instance.
///
/// # Errors
///
/// Returns an error if the store fails an operation outright.
pub async fn run_metadata_conformance_tests(store: &dyn MetadataStore) -> Result<(), StoreError> {
    test_read_missing(store).await?;
    test_write_and_read(store).await?;
    test_rewrite_is_upsert(store).await?;
    test_list_unknown_owner(store).await?;
    test_list_shapes(store).await?;
    test_owner_isolation(store).await?;
    test_metadata_delete(store).await?;
    Ok(())
}

async fn test_read_missing(store: &dyn MetadataStore) -> Result<(), StoreError> {
    let found = store.read(&FragmentKey::new(OWNER, "missing")).await?;
    assert!(found.is_none(), "read on missing key should return None");
    Ok(())
}

async fn test_write_and_read(store: &dyn MetadataStore) -> Result<(), StoreError> {
    let record = test_record(OWNER, "write-read", 0);
    store.write(&record).await?;
    let found = store.read(&FragmentKey::of(&record)).await?;
    assert_eq!(found, Some(record));
    Ok(())
}

async fn test_rewrite_is_upsert(store: &dyn MetadataStore) -> Result<(), StoreError> {
    let mut record = test_record(OWNER, "upsert", 0);
    store.write(&record).await?;
    record.size = 42;
    record.updated = record.created + Duration::seconds(1);
    store.write(&record).await?;

    let found = store.read(&FragmentKey::of(&record)).await?;
    assert_eq!(found.map(|r| r.size), Some(42), "last write should win");
    Ok(())
}

async fn test_list_unknown_owner(store: &dyn MetadataStore) -> Result<(), StoreError> {
    let listing = store.list("nobody-owns-this", false).await?;
    assert!(listing.is_empty(), "unknown owner should list nothing");
    let listing = store.list("nobody-owns-this", true).await?;
    assert!(listing.is_empty(), "unknown owner should list nothing");
    Ok(())
}

async fn test_list_shapes(store: &dyn MetadataStore) -> Result<(), StoreError> {
    let owner = "conformance-list";
    store.write(&test_record(owner, "first", 0)).await?;
    store.write(&test_record(owner, "second", 1)).await?;

    let ids = store.list(owner, false).await?;
    let FragmentListing::Ids(mut ids) = ids else {
        panic!("expand=false should list ids");
    };
    ids.sort();
    assert_eq!(ids, vec!["first".to_owned(), "second".to_owned()]);

    let expanded = store.list(owner, true).await?;
    let FragmentListing::Expanded(records) = expanded else {
        panic!("expand=true should list records");
    };
    assert_eq!(records.len(), 2);
    assert!(records.iter().all(|r| r.owner_id == owner));
    Ok(())
}

async fn test_owner_isolation(store: &dyn MetadataStore) -> Result<(), StoreError> {
    let record = test_record(OTHER_OWNER, "isolated", 0);
    store.write(&record).await?;

    let cross = store.read(&FragmentKey::new(OWNER, "isolated")).await?;
    assert!(cross.is_none(), "records must not leak across owners");

    let listing = store.list(OWNER, false).await?;
    assert!(
        !listing.ids().contains(&"isolated"),
        "listing must not leak across owners"
    );
    Ok(())
}

async fn test_metadata_delete(store: &dyn MetadataStore) -> Result<(), StoreError> {
    let record = test_record(OWNER, "to-delete", 0);
    store.write(&record).await?;
    let key = FragmentKey::of(&record);

    assert!(store.delete(&key).await?, "delete should report existing record");
    assert!(store.read(&key).await?.is_none(), "read after delete should be None");
    assert!(
        !store.delete(&key).await?,
        "second delete should report missing record"
    );
    Ok(())
}

/// Run the full blob store conformance test suite.
///
/// # Errors
///
/// Returns an error if the store fails an operation outright.
pub async fn run_blob_conformance_tests(store: &dyn BlobStore) -> Result<(), StoreError> {
    test_blob_read_missing(store).await?;
    test_blob_write_and_read(store).await?;
    test_blob_overwrite(store).await?;
    test_blob_delete(store).await?;
    Ok(())
}

async fn test_blob_read_missing(store: &dyn BlobStore) -> Result<(), StoreError> {
    let found = store.read(&FragmentKey::new(OWNER, "no-bytes")).await?;
    assert!(found.is_none(), "read on missing blob should return None");
    Ok(())
}

async fn test_blob_write_and_read(store: &dyn BlobStore) -> Result<(), StoreError> {
    let key = FragmentKey::new(OWNER, "bytes");
    store.write(&key, Bytes::from_static(b"hello")).await?;
    let found = store.read(&key).await?;
    assert_eq!(found.as_deref(), Some(&b"hello"[..]));

    let other = store.read(&FragmentKey::new(OTHER_OWNER, "bytes")).await?;
    assert!(other.is_none(), "blobs must not leak across owners");
    Ok(())
}

async fn test_blob_overwrite(store: &dyn BlobStore) -> Result<(), StoreError> {
    let key = FragmentKey::new(OWNER, "overwrite");
    store.write(&key, Bytes::from_static(b"v1")).await?;
    store.write(&key, Bytes::from_static(b"version two")).await?;
    let found = store.read(&key).await?;
    assert_eq!(found.as_deref(), Some(&b"version two"[..]));
    Ok(())
}

async fn test_blob_delete(store: &dyn BlobStore) -> Result<(), StoreError> {
    let key = FragmentKey::new(OWNER, "blob-delete");
    store.write(&key, Bytes::from_static(b"bye")).await?;
    assert!(store.delete(&key).await?, "delete should report existing blob");
    assert!(store.read(&key).await?.is_none());
    assert!(!store.delete(&key).await?);
    Ok(())
}

/// Run the storage facade conformance suite against a composed backend.
///
/// # Errors
///
/// Returns an error if the backend fails an operation outright.
pub async fn run_storage_conformance_tests(storage: &Storage) -> Result<(), StoreError> {
    let record = test_record(OWNER, "facade", 0);

    let missing = storage.read_metadata(OWNER, "facade").await;
    assert!(
        matches!(missing, Err(ref e) if e.is_not_found()),
        "missing metadata should be NotFound"
    );
    let missing = storage.read_data(OWNER, "facade").await;
    assert!(
        matches!(missing, Err(ref e) if e.is_not_found()),
        "missing data should be NotFound"
    );

    storage.write_metadata(&record).await?;
    storage
        .write_data(OWNER, "facade", Bytes::from_static(b"12345"))
        .await?;
    assert_eq!(storage.read_metadata(OWNER, "facade").await?, record);
    assert_eq!(&storage.read_data(OWNER, "facade").await?[..], b"12345");

    let bad = test_record("", "no-owner", 0);
    assert!(
        matches!(
            storage.write_metadata(&bad).await,
            Err(StoreError::InvalidKey(_))
        ),
        "empty owner should be rejected"
    );

    storage.delete_metadata(OWNER, "facade").await?;
    storage.delete_data(OWNER, "facade").await?;
    assert!(storage.read_metadata(OWNER, "facade").await.is_err());
    assert!(storage.read_data(OWNER, "facade").await.is_err());

    // Deleting again is best-effort, not an error.
    storage.delete_metadata(OWNER, "facade").await?;
    storage.delete_data(OWNER, "facade").await?;

    test_nested_keys_stay_apart(storage).await
}

/// `("a", "x/y")` and `("a/x", "y")` render the same object key and must
/// never resolve to each other's bytes.
async fn test_nested_keys_stay_apart(storage: &Storage) -> Result<(), StoreError> {
    let owner = "conformance-nested";
    let nested_owner = format!("{owner}/x");

    storage
        .write_data(owner, "x/y", Bytes::from_static(b"owner secret"))
        .await?;
    let cross = storage.read_data(&nested_owner, "y").await;
    assert!(
        matches!(cross, Err(StoreError::InvalidKey(_))),
        "a nested owner id must not read another owner's bytes"
    );

    let write = storage
        .write_data(&nested_owner, "y", Bytes::from_static(b"overwrite"))
        .await;
    assert!(
        matches!(write, Err(StoreError::InvalidKey(_))),
        "a nested owner id must not write"
    );
    assert_eq!(&storage.read_data(owner, "x/y").await?[..], b"owner secret");

    storage.delete_data(owner, "x/y").await?;
    Ok(())
}
