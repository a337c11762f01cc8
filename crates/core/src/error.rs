use thiserror::Error;

/// Errors produced while parsing or validating a media type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MediaTypeError {
    /// The value could not be parsed as a media type at all.
    #[error("invalid media type: {0}")]
    Invalid(String),

    /// The value parsed, but its base type is not one fragments can hold.
    #[error("unsupported media type: {0}")]
    Unsupported(String),
}
