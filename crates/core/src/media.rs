use std::fmt;

use mime::Mime;

use crate::error::MediaTypeError;

pub const TEXT_PLAIN: &str = "text/plain";
pub const TEXT_MARKDOWN: &str = "text/markdown";
pub const TEXT_HTML: &str = "text/html";
pub const TEXT_CSV: &str = "text/csv";
pub const APPLICATION_JSON: &str = "application/json";

/// Base types accepted regardless of the `text/*` family rule.
pub const SUPPORTED_TYPES: &[&str] = &[
    TEXT_PLAIN,
    TEXT_MARKDOWN,
    TEXT_HTML,
    TEXT_CSV,
    APPLICATION_JSON,
];

/// A parsed media type: the base type plus the optional `charset` parameter.
///
/// Every other parameter is discarded on parse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaType {
    essence: String,
    charset: Option<String>,
}

impl MediaType {
    /// Parse a `Content-Type`-style value such as `text/plain; charset=utf-8`.
    pub fn parse(value: &str) -> Result<Self, MediaTypeError> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(MediaTypeError::Invalid("empty media type".to_owned()));
        }

        let parsed: Mime = trimmed
            .parse()
            .map_err(|e: mime::FromStrError| MediaTypeError::Invalid(format!("{trimmed}: {e}")))?;

        Ok(Self {
            essence: parsed.essence_str().to_ascii_lowercase(),
            charset: raw_charset(trimmed),
        })
    }

    /// The base type with parameters stripped, e.g. `text/plain`.
    pub fn essence(&self) -> &str {
        &self.essence
    }

    /// The `charset` parameter, if one was present.
    pub fn charset(&self) -> Option<&str> {
        self.charset.as_deref()
    }

    /// Whether the base type belongs to the `text/*` family.
    pub fn is_text(&self) -> bool {
        self.essence.starts_with("text/")
    }

    /// Whether fragments may be stored with, or converted to, this type.
    pub fn is_supported(&self) -> bool {
        SUPPORTED_TYPES.contains(&self.essence.as_str()) || self.is_text()
    }
}

/// The `charset` value exactly as written. `mime` lowercases it.
fn raw_charset(value: &str) -> Option<String> {
    value.split(';').skip(1).find_map(|param| {
        let (name, value) = param.split_once('=')?;
        if !name.trim().eq_ignore_ascii_case(mime::CHARSET.as_str()) {
            return None;
        }
        let value = value.trim();
        let value = value
            .strip_prefix('"')
            .and_then(|v| v.strip_suffix('"'))
            .unwrap_or(value);
        (!value.is_empty()).then(|| value.to_owned())
    })
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.charset {
            Some(charset) => write!(f, "{}; charset={charset}", self.essence),
            None => f.write_str(&self.essence),
        }
    }
}

/// Supported-type predicate shared by fragment creation and negotiation.
///
/// Values that fail to parse are never supported.
pub fn is_supported_type(value: &str) -> bool {
    MediaType::parse(value).is_ok_and(|media| media.is_supported())
}

/// Normalize an inbound `Content-Type` header for storage.
///
/// Keeps the base type and the charset; drops every other parameter.
pub fn normalize_content_type(value: &str) -> Result<String, MediaTypeError> {
    let media = MediaType::parse(value)?;
    if !media.is_supported() {
        return Err(MediaTypeError::Unsupported(media.essence().to_owned()));
    }
    Ok(media.to_string())
}
