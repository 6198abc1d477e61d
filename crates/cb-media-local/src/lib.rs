//! # cb-media-local
//!
//! In-process implementation of `ImageProcessor`: decodes an upload,
//! bounds its dimensions, and re-encodes as WebP so every stored blob has
//! a single, predictable format regardless of what the client sent.

use std::io::Cursor;

use async_trait::async_trait;
use bytes::Bytes;
use image::imageops::FilterType;
use image::{GenericImageView, ImageFormat};

use cb_core::error::{AppError, Result};
use cb_core::traits::{ImageProcessor, NormalizedImage};

/// Longest allowed side after normalization; larger uploads are downscaled.
const MAX_DIMENSION: u32 = 1600;

pub struct LocalImageProcessor;

#[async_trait]
impl ImageProcessor for LocalImageProcessor {
    async fn normalize(&self, data: Bytes) -> Result<NormalizedImage> {
        let decoded = image::load_from_memory(&data)
            .map_err(|err| AppError::Validation(format!("unsupported or corrupt image: {err}")))?;

        let bounded = if decoded.width() > MAX_DIMENSION || decoded.height() > MAX_DIMENSION {
            decoded.resize(MAX_DIMENSION, MAX_DIMENSION, FilterType::Lanczos3)
        } else {
            decoded
        };

        let mut encoded = Vec::new();
        bounded
            .write_to(&mut Cursor::new(&mut encoded), ImageFormat::WebP)
            .map_err(|err| AppError::Dependency(format!("webp encode failed: {err}")))?;

        Ok(NormalizedImage {
            data: Bytes::from(encoded),
            mime: "image/webp"
                .parse()
                .map_err(|_| AppError::Dependency("bad webp mime".to_string()))?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn png_fixture(width: u32, height: u32) -> Bytes {
        let img = image::DynamicImage::new_rgb8(width, height);
        let mut buf = Vec::new();
        img.write_to(&mut Cursor::new(&mut buf), ImageFormat::Png).unwrap();
        Bytes::from(buf)
    }

    #[tokio::test]
    async fn test_normalize_reencodes_as_webp() {
        let out = LocalImageProcessor
            .normalize(png_fixture(4, 4))
            .await
            .unwrap();

        assert_eq!(out.mime.essence_str(), "image/webp");
        let round = image::load_from_memory(&out.data).unwrap();
        assert_eq!((round.width(), round.height()), (4, 4));
    }

    #[tokio::test]
    async fn test_oversized_uploads_are_bounded() {
        let out = LocalImageProcessor
            .normalize(png_fixture(3200, 1600))
            .await
            .unwrap();

        let round = image::load_from_memory(&out.data).unwrap();
        assert!(round.width() <= MAX_DIMENSION && round.height() <= MAX_DIMENSION);
    }

    #[tokio::test]
    async fn test_garbage_bytes_are_a_validation_error() {
        let err = LocalImageProcessor
            .normalize(Bytes::from_static(b"not an image"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }
}
