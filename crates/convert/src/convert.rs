use bytes::Bytes;
use fragments_core::{
    APPLICATION_JSON, MediaType, TEXT_CSV, TEXT_HTML, TEXT_MARKDOWN, TEXT_PLAIN,
};
use tracing::debug;

use crate::error::ConvertError;
use crate::raster::{ImageFormat, reencode};
use crate::negotiate::{IMAGE_AVIF, IMAGE_GIF, IMAGE_JPEG, IMAGE_PNG, IMAGE_WEBP};
use crate::text;

/// Every representation with at least one edge besides identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Format {
    Plain,
    Markdown,
    Html,
    Csv,
    Json,
    Image(ImageFormat),
}

impl Format {
    const ALL: [Self; 10] = [
        Self::Plain,
        Self::Markdown,
        Self::Html,
        Self::Csv,
        Self::Json,
        Self::Image(ImageFormat::Png),
        Self::Image(ImageFormat::Jpeg),
        Self::Image(ImageFormat::WebP),
        Self::Image(ImageFormat::Gif),
        Self::Image(ImageFormat::Avif),
    ];

    /// Classify a base media type (parameters already stripped).
    pub fn from_essence(essence: &str) -> Option<Self> {
        let format = match essence {
            TEXT_PLAIN => Self::Plain,
            TEXT_MARKDOWN => Self::Markdown,
            TEXT_HTML => Self::Html,
            TEXT_CSV => Self::Csv,
            APPLICATION_JSON => Self::Json,
            IMAGE_PNG => Self::Image(ImageFormat::Png),
            IMAGE_JPEG => Self::Image(ImageFormat::Jpeg),
            IMAGE_WEBP => Self::Image(ImageFormat::WebP),
            IMAGE_GIF => Self::Image(ImageFormat::Gif),
            IMAGE_AVIF => Self::Image(ImageFormat::Avif),
            _ => return None,
        };
        Some(format)
    }

    pub fn media_type(self) -> &'static str {
        match self {
            Self::Plain => TEXT_PLAIN,
            Self::Markdown => TEXT_MARKDOWN,
            Self::Html => TEXT_HTML,
            Self::Csv => TEXT_CSV,
            Self::Json => APPLICATION_JSON,
            Self::Image(ImageFormat::Png) => IMAGE_PNG,
            Self::Image(ImageFormat::Jpeg) => IMAGE_JPEG,
            Self::Image(ImageFormat::WebP) => IMAGE_WEBP,
            Self::Image(ImageFormat::Gif) => IMAGE_GIF,
            Self::Image(ImageFormat::Avif) => IMAGE_AVIF,
        }
    }
}

/// A single-hop transformation between two distinct formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transform {
    /// Bytes are returned as stored; only the reported type changes.
    PassThrough,
    MarkdownToHtml,
    HtmlToText,
    CsvToJson,
    JsonToText,
    Reencode(ImageFormat),
}

/// Look up the transform for a `(source, target)` pair of distinct formats.
///
/// Pairs not listed here have no conversion.
pub fn transform_for(source: Format, target: Format) -> Option<Transform> {
    use Format::{Csv, Html, Image, Json, Markdown, Plain};

    let transform = match (source, target) {
        (Markdown, Html) => Transform::MarkdownToHtml,
        (Markdown | Csv, Plain) => Transform::PassThrough,
        (Html, Plain) => Transform::HtmlToText,
        (Csv, Json) => Transform::CsvToJson,
        (Json, Plain) => Transform::JsonToText,
        (Image(from), Image(to)) if from != to => Transform::Reencode(to),
        _ => return None,
    };
    Some(transform)
}

/// Media types reachable from `source` in one hop, starting with the base
/// type of `source` itself.
pub fn targets_for(source: &MediaType) -> Vec<String> {
    let mut targets = vec![source.essence().to_owned()];
    if let Some(format) = Format::from_essence(source.essence()) {
        targets.extend(
            Format::ALL
                .into_iter()
                .filter(|target| *target != format && transform_for(format, *target).is_some())
                .map(|target| target.media_type().to_owned()),
        );
    }
    targets
}

/// The bytes and media type produced by [`convert`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Converted {
    pub data: Bytes,
    pub content_type: String,
}

/// Convert `data`, stored as `source_type`, into `target_type`.
///
/// Converting a type to itself returns the stored bytes and the stored type
/// string unchanged (charset included). Every other conversion reports the
/// bare target type.
pub fn convert(data: Bytes, source_type: &str, target_type: &str) -> Result<Converted, ConvertError> {
    let source = MediaType::parse(source_type)
        .map_err(|e| ConvertError::UnsupportedMediaType(e.to_string()))?;
    let target = MediaType::parse(target_type)
        .map_err(|e| ConvertError::UnsupportedMediaType(e.to_string()))?;

    if source.essence() == target.essence() {
        return Ok(Converted {
            data,
            content_type: source_type.to_owned(),
        });
    }

    let no_conversion = || ConvertError::NoConversion {
        from: source.essence().to_owned(),
        to: target.essence().to_owned(),
    };
    let from = Format::from_essence(source.essence()).ok_or_else(no_conversion)?;
    let to = Format::from_essence(target.essence()).ok_or_else(no_conversion)?;
    let transform = transform_for(from, to).ok_or_else(no_conversion)?;

    debug!(from = %source.essence(), to = %target.essence(), ?transform, "converting fragment");

    let failed = |reason: String| ConvertError::Failed {
        from: source.essence().to_owned(),
        to: target.essence().to_owned(),
        reason,
    };

    let output = match transform {
        Transform::PassThrough => data,
        Transform::MarkdownToHtml => text::markdown_to_html(&data).map_err(failed)?,
        Transform::HtmlToText => text::html_to_text(&data).map_err(failed)?,
        Transform::CsvToJson => text::csv_to_json(&data).map_err(failed)?,
        Transform::JsonToText => text::json_to_text(&data).map_err(failed)?,
        Transform::Reencode(format) => {
            let Format::Image(input) = from else {
                return Err(no_conversion());
            };
            reencode(&data, input, format).map_err(failed)?
        }
    };

    Ok(Converted {
        data: output,
        content_type: to.media_type().to_owned(),
    })
}
