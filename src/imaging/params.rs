//! Parameter types for image operations.
//!
//! These structs describe *what* to do, not *how* to do it. They are the
//! interface between the high-level [`operations`](super::operations) module
//! (which decides whether and where an asset is produced) and the
//! [`backend`](super::backend) (which does the pixel work), so operations can
//! be tested against a recording mock.
//!
//! - [`Quality`]: lossy encoding quality (1–100, default 90), clamped on construction.
//! - [`Sharpening`]: unsharp-mask parameters applied to downscaled thumbnails.
//! - [`OutputFormat`]: the configured asset format, resolved per image.
//! - [`EncodeParams`]: one decode → resize → encode job.

use image::ImageFormat;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Quality setting for lossy image encoding (1-100).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quality(pub u32);

impl Quality {
    pub fn new(value: u32) -> Self {
        Self(value.clamp(1, 100))
    }

    pub fn value(self) -> u32 {
        self.0
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(90)
    }
}

/// Sharpening parameters for unsharp mask.
///
/// - `sigma`: Standard deviation of the Gaussian blur (higher = more sharpening)
/// - `threshold`: Minimum brightness difference to sharpen (0 = sharpen all pixels)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sharpening {
    pub sigma: f32,
    pub threshold: i32,
}

impl Sharpening {
    /// Light sharpening suitable for thumbnails.
    pub fn light() -> Self {
        Self {
            sigma: 0.5,
            threshold: 0,
        }
    }
}

/// Asset format written to the images directory.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Keep whatever format the image was embedded (or materialized) in.
    #[default]
    Source,
    Png,
    Jpeg,
    /// Lossless WebP.
    Webp,
}

impl OutputFormat {
    /// Concrete encoder format and file extension for an image whose
    /// current format is `source_ext`.
    ///
    /// `None` when `source_ext` names no known image format.
    pub fn resolve(self, source_ext: &str) -> Option<(ImageFormat, String)> {
        match self {
            OutputFormat::Source => ImageFormat::from_extension(source_ext)
                .map(|format| (format, source_ext.to_ascii_lowercase())),
            OutputFormat::Png => Some((ImageFormat::Png, "png".into())),
            OutputFormat::Jpeg => Some((ImageFormat::Jpeg, "jpg".into())),
            OutputFormat::Webp => Some((ImageFormat::WebP, "webp".into())),
        }
    }
}

/// Decode `data`, resize to exactly `width`×`height` if that differs from
/// the source, optionally sharpen, and encode as `format` into `output`.
#[derive(Debug, Clone, PartialEq)]
pub struct EncodeParams<'a> {
    pub data: &'a [u8],
    pub output: PathBuf,
    pub format: ImageFormat,
    pub width: u32,
    pub height: u32,
    pub quality: Quality,
    pub sharpening: Option<Sharpening>,
}
