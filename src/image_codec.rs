//! # Image Codec
//!
//! Thin wrapper around the `image` crate's JPEG decoder/encoder, scoped to
//! exactly the two operations the store needs: reading a JPEG's pixel
//! dimensions without fully decoding it where possible, and producing a
//! resized JPEG at a target resolution. Every failure here is reported as
//! [`ImgFsError::Imglib`], matching how `original_source/src/image_content.c`
//! collapses every libvips/libjpeg failure into a single `ERR_IMGLIB` before
//! it ever reaches the caller.

use std::io::Cursor;

use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{GenericImageView, ImageFormat, ImageReader};

use crate::error::{ImgFsError, ImgfsResult};

/// JPEG quality used when re-encoding a resized image. `original_source`
/// leaves this to libvips' default; 85 is the `image` crate's own default
/// and a reasonable match for it.
const JPEG_QUALITY: u8 = 85;

/// Returns `(width, height)` of a JPEG image given its encoded bytes.
pub fn probe(bytes: &[u8]) -> ImgfsResult<(u32, u32)> {
    let reader = ImageReader::with_format(Cursor::new(bytes), ImageFormat::Jpeg);
    let dims = reader.into_dimensions().map_err(|_| ImgFsError::Imglib)?;
    Ok(dims)
}

/// Decodes `bytes` as a JPEG, resizes it to fit within `(max_w, max_h)`
/// preserving aspect ratio, and re-encodes the result as a JPEG.
///
/// A request for a size no smaller than the source image's own dimensions
/// is still honored (`image` clamps internally); callers that want to skip
/// resizing entirely should check the source resolution themselves first,
/// the way `do_read_cmd` in `original_source` short-circuits on `ORIG_RES`.
pub fn resize(bytes: &[u8], max_w: u32, max_h: u32) -> ImgfsResult<Vec<u8>> {
    let img = image::load_from_memory_with_format(bytes, ImageFormat::Jpeg)
        .map_err(|_| ImgFsError::Imglib)?;

    let resized = img.resize(max_w, max_h, FilterType::Lanczos3);

    let mut out = Vec::new();
    let mut encoder = JpegEncoder::new_with_quality(&mut out, JPEG_QUALITY);
    encoder
        .encode(
            resized.as_bytes(),
            resized.width(),
            resized.height(),
            resized.color().into(),
        )
        .map_err(|_| ImgFsError::Imglib)?;
    Ok(out)
}

/// Validates that `bytes` decodes as a well-formed JPEG at all, independent
/// of any resize. Used by `insert` before anything is written to the store.
pub fn validate_jpeg(bytes: &[u8]) -> ImgfsResult<(u32, u32)> {
    let img = image::load_from_memory_with_format(bytes, ImageFormat::Jpeg)
        .map_err(|_| ImgFsError::Imglib)?;
    Ok(img.dimensions())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, Rgb};

    fn sample_jpeg(w: u32, h: u32) -> Vec<u8> {
        let img: ImageBuffer<Rgb<u8>, Vec<u8>> =
            ImageBuffer::from_fn(w, h, |x, y| Rgb([(x % 256) as u8, (y % 256) as u8, 128]));
        let mut buf = Vec::new();
        let mut encoder = JpegEncoder::new_with_quality(&mut buf, 90);
        encoder.encode(&img, w, h, image::ColorType::Rgb8.into()).unwrap();
        buf
    }

    #[test]
    fn probe_reports_dimensions() {
        let bytes = sample_jpeg(64, 32);
        assert_eq!(probe(&bytes).unwrap(), (64, 32));
    }

    #[test]
    fn resize_shrinks_within_bounds() {
        let bytes = sample_jpeg(200, 100);
        let resized = resize(&bytes, 64, 64).unwrap();
        let (w, h) = probe(&resized).unwrap();
        assert!(w <= 64 && h <= 64);
        assert_eq!(w * 100, h * 200);
    }

    #[test]
    fn probe_rejects_garbage() {
        assert!(matches!(probe(b"not a jpeg"), Err(ImgFsError::Imglib)));
    }

    #[test]
    fn validate_jpeg_accepts_real_image() {
        let bytes = sample_jpeg(16, 16);
        assert_eq!(validate_jpeg(&bytes).unwrap(), (16, 16));
    }
}
