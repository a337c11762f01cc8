mod blob;
mod metadata;

use std::sync::Arc;

use fragments_store::Storage;

pub use blob::MemoryBlobStore;
pub use metadata::MemoryMetadataStore;

/// Backend name reported by [`memory_storage`].
pub const BACKEND_NAME: &str = "memory";

/// Build a [`Storage`] handle backed by fresh in-memory stores.
///
/// Nothing survives a process restart.
pub fn memory_storage() -> Storage {
    Storage::new(
        BACKEND_NAME,
        Arc::new(MemoryMetadataStore::new()),
        Arc::new(MemoryBlobStore::new()),
    )
}

#[cfg(test)]
mod tests {
    use fragments_store::testing::run_storage_conformance_tests;

    use super::*;

    #[tokio::test]
    async fn storage_conformance() {
        let storage = memory_storage();
        assert_eq!(storage.backend(), "memory");
        run_storage_conformance_tests(&storage)
            .await
            .expect("conformance tests should pass");
    }

    #[tokio::test]
    async fn separate_handles_do_not_share_state() {
        let first = memory_storage();
        let second = memory_storage();
        first
            .write_data("owner", "id", bytes::Bytes::from_static(b"x"))
            .await
            .unwrap();
        assert!(second.read_data("owner", "id").await.is_err());
    }
}
