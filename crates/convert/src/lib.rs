//! Content negotiation and conversion between fragment representations.
//!
//! [`negotiate`] turns a requested id such as `abc.html` into the stored id
//! and a target media type; [`convert`] then applies the single transform
//! registered for the `(source, target)` pair.

mod convert;
mod error;
mod negotiate;
mod raster;
mod text;

pub use convert::{Converted, Format, Transform, convert, targets_for, transform_for};
pub use error::ConvertError;
pub use negotiate::{
    IMAGE_AVIF, IMAGE_GIF, IMAGE_JPEG, IMAGE_PNG, IMAGE_WEBP, Negotiated, RequestedId,
    extension_media_type, negotiate,
};
pub use raster::ImageFormat;
