use thiserror::Error;

/// Errors from negotiating or performing a conversion.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConvertError {
    /// The requested representation is unknown or not one fragments serve.
    #[error("unsupported media type: {0}")]
    UnsupportedMediaType(String),

    /// Both types are known but no direct conversion connects them.
    #[error("no conversion from {from} to {to}")]
    NoConversion { from: String, to: String },

    /// The stored bytes could not be decoded or re-encoded.
    #[error("conversion from {from} to {to} failed: {reason}")]
    Failed {
        from: String,
        to: String,
        reason: String,
    },
}
