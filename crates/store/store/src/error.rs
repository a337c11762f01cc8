use thiserror::Error;

/// Errors from metadata and blob store operations.
///
/// Backends translate their transport-specific failures into
/// [`StoreError::Backend`] so no SDK error type crosses the storage facade.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("invalid key: {0}")]
    InvalidKey(String),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("backend error: {0}")]
    Backend(String),
}

impl StoreError {
    /// Returns `true` for the distinct "nothing stored under this key" signal.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}
