use fragments_core::{
    APPLICATION_JSON, TEXT_CSV, TEXT_HTML, TEXT_MARKDOWN, TEXT_PLAIN, is_supported_type,
};

use crate::error::ConvertError;

pub const IMAGE_PNG: &str = "image/png";
pub const IMAGE_JPEG: &str = "image/jpeg";
pub const IMAGE_WEBP: &str = "image/webp";
pub const IMAGE_GIF: &str = "image/gif";
pub const IMAGE_AVIF: &str = "image/avif";

/// Map a file extension (without the dot) to a media type.
///
/// Matching is case-insensitive. Returns `None` for extensions outside the
/// table.
pub fn extension_media_type(extension: &str) -> Option<&'static str> {
    let media = match extension.to_ascii_lowercase().as_str() {
        "txt" => TEXT_PLAIN,
        "md" | "markdown" => TEXT_MARKDOWN,
        "html" | "htm" => TEXT_HTML,
        "csv" => TEXT_CSV,
        "json" => APPLICATION_JSON,
        "png" => IMAGE_PNG,
        "jpg" | "jpeg" => IMAGE_JPEG,
        "webp" => IMAGE_WEBP,
        "gif" => IMAGE_GIF,
        "avif" => IMAGE_AVIF,
        _ => return None,
    };
    Some(media)
}

/// A fragment id as requested by a caller, optionally suffixed with
/// `.<extension>` to ask for another representation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestedId<'a> {
    /// The id the fragment is stored under.
    pub id: &'a str,

    /// The requested extension, without the leading dot.
    pub extension: Option<&'a str>,
}

impl<'a> RequestedId<'a> {
    /// Split `raw` at its last `.`.
    ///
    /// An identifier without a dot is taken as a bare id.
    pub fn parse(raw: &'a str) -> Self {
        match raw.rsplit_once('.') {
            Some((id, extension)) => Self {
                id,
                extension: Some(extension),
            },
            None => Self {
                id: raw,
                extension: None,
            },
        }
    }

    /// Resolve the requested extension to a target media type.
    ///
    /// `Ok(None)` means the native representation was requested. An unknown
    /// extension, or one whose media type fragments cannot be served as,
    /// is an [`ConvertError::UnsupportedMediaType`].
    pub fn target_type(&self) -> Result<Option<&'static str>, ConvertError> {
        let Some(extension) = self.extension else {
            return Ok(None);
        };

        let target = extension_media_type(extension).ok_or_else(|| {
            ConvertError::UnsupportedMediaType(format!("unknown extension .{extension}"))
        })?;

        if !is_supported_type(target) {
            return Err(ConvertError::UnsupportedMediaType(target.to_owned()));
        }
        Ok(Some(target))
    }
}

/// Outcome of negotiating a requested identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Negotiated<'a> {
    pub id: &'a str,
    pub target: Option<&'static str>,
}

/// Parse `raw` and resolve its target media type in one step.
pub fn negotiate(raw: &str) -> Result<Negotiated<'_>, ConvertError> {
    let requested = RequestedId::parse(raw);
    Ok(Negotiated {
        id: requested.id,
        target: requested.target_type()?,
    })
}
