pub mod buffer;
pub mod error;
pub mod key;
pub mod listing;
pub mod storage;
pub mod store;
pub mod testing;

pub use buffer::collect_chunks;
pub use error::StoreError;
pub use key::FragmentKey;
pub use listing::FragmentListing;
pub use storage::Storage;
pub use store::{BlobStore, MetadataStore};
