use thiserror::Error;

use fragments_convert::ConvertError;
use fragments_core::MediaTypeError;
use fragments_store::StoreError;

/// Errors returned by fragment operations.
#[derive(Debug, Error)]
pub enum FragmentError {
    /// A required value (owner, type) was missing or malformed.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The fragment cannot be stored with this media type.
    #[error("unsupported type: {0}")]
    UnsupportedType(String),

    /// The fragment cannot be served in the requested representation.
    #[error("unsupported media type: {0}")]
    UnsupportedMediaType(String),

    #[error("fragment body is empty")]
    EmptyBody,

    #[error("fragment is too large: {size} bytes exceeds the {max} byte limit")]
    TooLarge { size: usize, max: usize },

    /// The body does not match its declared type (e.g. malformed JSON).
    #[error("invalid content: {0}")]
    InvalidContent(String),

    /// A replacement declared a type other than the stored one.
    #[error("content type {actual} does not match fragment type {expected}")]
    TypeMismatch { expected: String, actual: String },

    #[error("fragment not found: {0}")]
    NotFound(String),

    /// The storage backend failed.
    #[error("storage error: {0}")]
    Storage(StoreError),
}

impl From<StoreError> for FragmentError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(what) => Self::NotFound(what),
            other => Self::Storage(other),
        }
    }
}

impl From<ConvertError> for FragmentError {
    fn from(err: ConvertError) -> Self {
        Self::UnsupportedMediaType(err.to_string())
    }
}

impl From<MediaTypeError> for FragmentError {
    fn from(err: MediaTypeError) -> Self {
        Self::UnsupportedType(err.to_string())
    }
}
