pub mod error;
pub mod fragment;
pub mod media;
pub mod owner;

pub use error::MediaTypeError;
pub use fragment::{FragmentId, FragmentRecord};
pub use media::{
    APPLICATION_JSON, MediaType, SUPPORTED_TYPES, TEXT_CSV, TEXT_HTML, TEXT_MARKDOWN, TEXT_PLAIN,
    is_supported_type, normalize_content_type,
};
pub use owner::{OwnerId, hash_owner};
