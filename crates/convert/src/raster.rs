use bytes::Bytes;
use image::codecs::avif::AvifEncoder;
use image::codecs::gif::GifEncoder;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::codecs::webp::WebPEncoder;
use image::{DynamicImage, Frame};

/// Image containers fragments can be re-encoded between.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageFormat {
    Png,
    Jpeg,
    WebP,
    Gif,
    /// Decoded through dav1d, so building needs the system `libdav1d`.
    Avif,
}

impl ImageFormat {
    fn codec(self) -> image::ImageFormat {
        match self {
            Self::Png => image::ImageFormat::Png,
            Self::Jpeg => image::ImageFormat::Jpeg,
            Self::WebP => image::ImageFormat::WebP,
            Self::Gif => image::ImageFormat::Gif,
            Self::Avif => image::ImageFormat::Avif,
        }
    }
}

fn encode(image: &DynamicImage, format: ImageFormat) -> Result<Vec<u8>, image::ImageError> {
    let mut out = Vec::new();
    match format {
        ImageFormat::Png => image.write_with_encoder(PngEncoder::new(&mut out))?,
        // JPEG has no alpha channel.
        ImageFormat::Jpeg => DynamicImage::ImageRgb8(image.to_rgb8())
            .write_with_encoder(JpegEncoder::new(&mut out))?,
        ImageFormat::WebP => DynamicImage::ImageRgba8(image.to_rgba8())
            .write_with_encoder(WebPEncoder::new_lossless(&mut out))?,
        ImageFormat::Avif => DynamicImage::ImageRgba8(image.to_rgba8())
            .write_with_encoder(AvifEncoder::new(&mut out))?,
        ImageFormat::Gif => {
            let mut encoder = GifEncoder::new(&mut out);
            encoder.encode_frame(Frame::new(image.to_rgba8()))?;
        }
    }
    Ok(out)
}

/// Decode `data` as `from` and re-encode the pixels as `to`.
///
/// Dimensions are kept; lossy targets use their encoder defaults.
pub(crate) fn reencode(data: &[u8], from: ImageFormat, to: ImageFormat) -> Result<Bytes, String> {
    let decoded = image::load_from_memory_with_format(data, from.codec())
        .map_err(|e| format!("failed to decode {from:?} image: {e}"))?;

    encode(&decoded, to)
        .map(Bytes::from)
        .map_err(|e| format!("failed to encode {to:?} image: {e}"))
}

#[cfg(test)]
mod tests {
    use image::{Rgba, RgbaImage};

    use super::*;

    fn sample_png() -> Vec<u8> {
        let pixels = RgbaImage::from_fn(8, 6, |x, y| {
            Rgba([u8::try_from(x * 30).unwrap(), u8::try_from(y * 40).unwrap(), 128, 255])
        });
        encode(&DynamicImage::ImageRgba8(pixels), ImageFormat::Png).unwrap()
    }

    fn dimensions(data: &[u8], format: ImageFormat) -> (u32, u32) {
        let decoded = image::load_from_memory_with_format(data, format.codec()).unwrap();
        (decoded.width(), decoded.height())
    }

    #[test]
    fn png_to_jpeg_keeps_dimensions() {
        let jpeg = reencode(&sample_png(), ImageFormat::Png, ImageFormat::Jpeg).unwrap();
        assert_eq!(&jpeg[..2], &[0xFF, 0xD8]);
        assert_eq!(dimensions(&jpeg, ImageFormat::Jpeg), (8, 6));
    }

    #[test]
    fn png_to_webp_and_back() {
        let webp = reencode(&sample_png(), ImageFormat::Png, ImageFormat::WebP).unwrap();
        assert_eq!(&webp[..4], b"RIFF");
        let png = reencode(&webp, ImageFormat::WebP, ImageFormat::Png).unwrap();
        assert_eq!(dimensions(&png, ImageFormat::Png), (8, 6));
    }

    #[test]
    fn png_to_gif() {
        let gif = reencode(&sample_png(), ImageFormat::Png, ImageFormat::Gif).unwrap();
        assert_eq!(&gif[..3], b"GIF");
        assert_eq!(dimensions(&gif, ImageFormat::Gif), (8, 6));
    }

    #[test]
    fn png_to_avif_produces_ftyp_box() {
        let avif = reencode(&sample_png(), ImageFormat::Png, ImageFormat::Avif).unwrap();
        assert_eq!(&avif[4..8], b"ftyp");
    }

    #[test]
    fn avif_to_png_round_trip() {
        let avif = reencode(&sample_png(), ImageFormat::Png, ImageFormat::Avif).unwrap();
        let png = reencode(&avif, ImageFormat::Avif, ImageFormat::Png).unwrap();
        assert_eq!(&png[1..4], b"PNG");
        assert_eq!(dimensions(&png, ImageFormat::Png), (8, 6));
    }

    #[test]
    fn garbage_input_fails_to_decode() {
        let err = reencode(b"not an image", ImageFormat::Png, ImageFormat::Jpeg).unwrap_err();
        assert!(err.contains("decode"));
    }
}
