//! Pure Rust image processing backend.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Identify | `image::ImageReader::with_guessed_format` → `into_dimensions` |
//! | Decode (PNG, JPEG, WebP, GIF) | `image::load_from_memory` |
//! | Resize | `DynamicImage::resize_exact` with `Lanczos3` |
//! | Sharpening | `image::imageops::unsharpen` |
//! | Encode → PNG / JPEG / WebP (lossless) | `image::codecs::*` |
//!
//! Output is written through [`storage::write_atomic_with`], so a failed or
//! interrupted encode never leaves a partial asset behind.

use super::backend::{BackendError, Dimensions, ImageBackend};
use super::params::{EncodeParams, Quality};
use crate::storage;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::codecs::webp::WebPEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, ImageFormat, ImageReader};
use std::io::{BufWriter, Cursor, Write};
use std::path::Path;

/// Pure Rust backend using the `image` crate ecosystem.
pub struct RustBackend;

impl RustBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RustBackend {
    fn default() -> Self {
        Self::new()
    }
}

fn processing(context: &str, err: impl std::fmt::Display) -> BackendError {
    BackendError::ProcessingFailed(format!("{context}: {err}"))
}

/// Encode and write `img` as `format`.
fn save_image(
    img: &DynamicImage,
    path: &Path,
    format: ImageFormat,
    quality: Quality,
) -> Result<(), BackendError> {
    storage::write_atomic_with(path, |file| {
        let mut writer = BufWriter::new(file);
        let result = match format {
            ImageFormat::Jpeg => DynamicImage::ImageRgb8(img.to_rgb8()).write_with_encoder(
                JpegEncoder::new_with_quality(&mut writer, quality.value() as u8),
            ),
            ImageFormat::WebP => DynamicImage::ImageRgba8(img.to_rgba8())
                .write_with_encoder(WebPEncoder::new_lossless(&mut writer)),
            ImageFormat::Png => img.write_with_encoder(PngEncoder::new(&mut writer)),
            other => img.write_to(&mut writer, other),
        };
        result.map_err(|e| processing(&format!("{format:?} encode failed"), e))?;
        writer.flush()?;
        Ok(())
    })
}

impl ImageBackend for RustBackend {
    fn identify(&self, data: &[u8]) -> Result<Dimensions, BackendError> {
        let (width, height) = ImageReader::new(Cursor::new(data))
            .with_guessed_format()?
            .into_dimensions()
            .map_err(|e| processing("Failed to read dimensions", e))?;
        Ok(Dimensions { width, height })
    }

    fn encode(&self, params: &EncodeParams<'_>) -> Result<(), BackendError> {
        let img = image::load_from_memory(params.data)
            .map_err(|e| processing("Failed to decode image", e))?;

        let img = if (img.width(), img.height()) == (params.width, params.height) {
            img
        } else {
            img.resize_exact(params.width, params.height, FilterType::Lanczos3)
        };

        let img = match params.sharpening {
            Some(s) => DynamicImage::from(image::imageops::unsharpen(&img, s.sigma, s.threshold)),
            None => img,
        };

        save_image(&img, &params.output, params.format, params.quality)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::params::Sharpening;
    use crate::test_helpers::png_bytes;
    use tempfile::TempDir;

    fn encode_params<'a>(
        data: &'a [u8],
        output: &Path,
        format: ImageFormat,
        w: u32,
        h: u32,
    ) -> EncodeParams<'a> {
        EncodeParams {
            data,
            output: output.to_path_buf(),
            format,
            width: w,
            height: h,
            quality: Quality::new(85),
            sharpening: None,
        }
    }

    #[test]
    fn identify_synthetic_png() {
        let backend = RustBackend::new();
        let dims = backend.identify(&png_bytes(200, 150)).unwrap();
        assert_eq!(dims.as_tuple(), (200, 150));
    }

    #[test]
    fn identify_garbage_errors() {
        let backend = RustBackend::new();
        assert!(matches!(
            backend.identify(b"definitely not an image"),
            Err(BackendError::ProcessingFailed(_))
        ));
    }

    #[test]
    fn encode_resizes_to_requested_dimensions() {
        let tmp = TempDir::new().unwrap();
        let output = tmp.path().join("out.png");
        let data = png_bytes(400, 300);

        let backend = RustBackend::new();
        backend
            .encode(&encode_params(&data, &output, ImageFormat::Png, 200, 150))
            .unwrap();

        assert_eq!(image::image_dimensions(&output).unwrap(), (200, 150));
    }

    #[test]
    fn encode_to_jpeg_and_webp() {
        let tmp = TempDir::new().unwrap();
        let data = png_bytes(64, 48);
        let backend = RustBackend::new();

        for (name, format) in [("a.jpg", ImageFormat::Jpeg), ("a.webp", ImageFormat::WebP)] {
            let output = tmp.path().join(name);
            backend
                .encode(&encode_params(&data, &output, format, 64, 48))
                .unwrap();
            let written = std::fs::read(&output).unwrap();
            assert_eq!(image::guess_format(&written).unwrap(), format);
        }
    }

    #[test]
    fn encode_with_sharpening() {
        let tmp = TempDir::new().unwrap();
        let output = tmp.path().join("thumb.png");
        let data = png_bytes(300, 200);
        let backend = RustBackend::new();

        let mut params = encode_params(&data, &output, ImageFormat::Png, 150, 100);
        params.sharpening = Some(Sharpening::light());
        backend.encode(&params).unwrap();

        assert_eq!(image::image_dimensions(&output).unwrap(), (150, 100));
    }

    #[test]
    fn encode_undecodable_input_writes_nothing() {
        let tmp = TempDir::new().unwrap();
        let output = tmp.path().join("out.png");
        let backend = RustBackend::new();

        let result = backend.encode(&encode_params(b"junk", &output, ImageFormat::Png, 1, 1));
        assert!(matches!(result, Err(BackendError::ProcessingFailed(_))));
        assert!(!output.exists());
    }
}
