//! High-level image operations: materializing page images and thumbnails.
//!
//! These functions decide *whether* an asset must be produced and *where*,
//! then delegate pixel work to an [`ImageBackend`]. The existence check comes
//! first and short-circuits everything, including base64 decoding: an asset
//! already on disk under its deterministic name is returned untouched. This
//! is what makes re-runs over a large archive cheap.
//!
//! Source-format page images that fit within the width limit are stored
//! byte-for-byte as embedded; everything else goes through the backend.

use super::backend::{BackendError, ImageBackend};
use super::calculations::constrain_to_width;
use super::data_uri::{DataUri, DataUriError};
use super::params::{EncodeParams, OutputFormat, Quality, Sharpening};
use crate::naming;
use crate::storage::{AssetStatus, AssetStore};
use image::ImageFormat;
use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MaterializeError {
    /// The payload is not a usable image. Drops that page's image only.
    #[error("{0}")]
    Malformed(String),
    /// Reading or writing the asset directory failed. Fatal for the run.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

impl From<DataUriError> for MaterializeError {
    fn from(err: DataUriError) -> Self {
        MaterializeError::Malformed(err.to_string())
    }
}

impl From<BackendError> for MaterializeError {
    fn from(err: BackendError) -> Self {
        match err {
            BackendError::Io(e) => MaterializeError::Io(e),
            BackendError::ProcessingFailed(msg) => MaterializeError::Malformed(msg),
        }
    }
}

/// Configuration for page image materialization.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MaterializeConfig {
    pub format: OutputFormat,
    /// Maximum stored width in pixels; 0 = unlimited.
    pub max_width: u32,
    pub quality: Quality,
}

impl Default for MaterializeConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::Source,
            max_width: 1600,
            quality: Quality::default(),
        }
    }
}

/// Configuration for thumbnail generation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThumbnailConfig {
    pub width: u32,
    pub format: OutputFormat,
    pub quality: Quality,
    pub sharpening: Option<Sharpening>,
}

impl Default for ThumbnailConfig {
    fn default() -> Self {
        Self {
            width: 240,
            format: OutputFormat::Source,
            quality: Quality::default(),
            sharpening: Some(Sharpening::light()),
        }
    }
}

/// A materialized asset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Materialized {
    pub filename: String,
    pub status: AssetStatus,
}

fn resolve_format(
    format: OutputFormat,
    source_ext: &str,
) -> Result<(ImageFormat, String), MaterializeError> {
    format.resolve(source_ext).ok_or_else(|| {
        MaterializeError::Malformed(format!("unsupported image format '{source_ext}'"))
    })
}

/// Plan an encode job without executing it.
///
/// Useful for testing parameter generation.
pub fn plan_encode<'a>(
    data: &'a [u8],
    original: (u32, u32),
    max_width: u32,
    output: std::path::PathBuf,
    format: ImageFormat,
    quality: Quality,
    sharpening: Option<Sharpening>,
) -> EncodeParams<'a> {
    let (width, height) = constrain_to_width(original, max_width);
    EncodeParams {
        data,
        output,
        format,
        width,
        height,
        quality,
        sharpening,
    }
}

/// Materialize one embedded page image.
///
/// `filename_for` receives the resolved extension and returns the
/// deterministic asset filename.
pub fn materialize_image(
    backend: &impl ImageBackend,
    store: &AssetStore,
    src: &str,
    filename_for: impl FnOnce(&str) -> String,
    config: &MaterializeConfig,
) -> Result<Materialized, MaterializeError> {
    let uri = DataUri::parse(src)?;
    let (format, ext) = resolve_format(config.format, uri.format())?;
    let filename = filename_for(&ext);

    if store.contains(&filename) {
        return Ok(Materialized {
            filename,
            status: AssetStatus::Existing,
        });
    }

    let data = uri.decode()?;
    let original = backend.identify(&data)?.as_tuple();
    let params = plan_encode(
        &data,
        original,
        config.max_width,
        store.path(&filename),
        format,
        config.quality,
        None,
    );

    let unchanged = (params.width, params.height) == original;
    if config.format == OutputFormat::Source && unchanged {
        store.write(&filename, &data)?;
    } else {
        backend.encode(&params)?;
    }

    Ok(Materialized {
        filename,
        status: AssetStatus::Written,
    })
}

/// Derive a thumbnail from an already-materialized page image.
pub fn materialize_thumbnail(
    backend: &impl ImageBackend,
    store: &AssetStore,
    source_filename: &str,
    filename_for: impl FnOnce(&str) -> String,
    config: &ThumbnailConfig,
) -> Result<Materialized, MaterializeError> {
    let source_ext = naming::extension(source_filename).unwrap_or_default();
    let (format, ext) = resolve_format(config.format, source_ext)?;
    let filename = filename_for(&ext);

    if store.contains(&filename) {
        return Ok(Materialized {
            filename,
            status: AssetStatus::Existing,
        });
    }

    let data = store.read(source_filename)?;
    let original = backend.identify(&data)?.as_tuple();
    let params = plan_encode(
        &data,
        original,
        config.width,
        store.path(&filename),
        format,
        config.quality,
        config.sharpening,
    );
    backend.encode(&params)?;

    Ok(Materialized {
        filename,
        status: AssetStatus::Written,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::Dimensions;
    use crate::imaging::backend::tests::{MockBackend, RecordedOp};
    use crate::test_helpers::{png_bytes, png_data_uri};
    use tempfile::TempDir;

    fn store(tmp: &TempDir) -> AssetStore {
        AssetStore::open(tmp.path().join("images")).unwrap()
    }

    fn name(ext: &str) -> String {
        format!("1-Ann-2-Bob.{ext}")
    }

    #[test]
    fn plan_encode_constrains_width() {
        let params = plan_encode(
            b"",
            (2000, 1000),
            500,
            "/out.png".into(),
            ImageFormat::Png,
            Quality::default(),
            None,
        );
        assert_eq!((params.width, params.height), (500, 250));
    }

    #[test]
    fn source_format_within_limit_is_stored_verbatim() {
        let tmp = TempDir::new().unwrap();
        let store = store(&tmp);
        let backend = MockBackend::with_dimensions(Dimensions {
            width: 300,
            height: 200,
        });
        let src = png_data_uri(300, 200);

        let result =
            materialize_image(&backend, &store, &src, name, &MaterializeConfig::default())
                .unwrap();

        assert_eq!(result.filename, "1-Ann-2-Bob.png");
        assert_eq!(result.status, AssetStatus::Written);
        assert_eq!(store.read("1-Ann-2-Bob.png").unwrap(), png_bytes(300, 200));
        assert_eq!(backend.encode_count(), 0);
    }

    #[test]
    fn oversized_source_is_resized() {
        let tmp = TempDir::new().unwrap();
        let store = store(&tmp);
        let backend = MockBackend::with_dimensions(Dimensions {
            width: 3200,
            height: 1600,
        });
        let config = MaterializeConfig {
            max_width: 800,
            ..MaterializeConfig::default()
        };

        materialize_image(&backend, &store, &png_data_uri(4, 2), name, &config).unwrap();

        let ops = backend.get_operations();
        assert!(matches!(
            ops.last(),
            Some(RecordedOp::Encode {
                width: 800,
                height: 400,
                format: ImageFormat::Png,
                sharpened: false,
                ..
            })
        ));
    }

    #[test]
    fn transcoding_changes_extension() {
        let tmp = TempDir::new().unwrap();
        let store = store(&tmp);
        let backend = MockBackend::new();
        let config = MaterializeConfig {
            format: OutputFormat::Webp,
            ..MaterializeConfig::default()
        };

        let result =
            materialize_image(&backend, &store, &png_data_uri(4, 4), name, &config).unwrap();

        assert_eq!(result.filename, "1-Ann-2-Bob.webp");
        assert_eq!(backend.encode_count(), 1);
        assert!(store.contains("1-Ann-2-Bob.webp"));
    }

    #[test]
    fn existing_asset_skips_all_work() {
        let tmp = TempDir::new().unwrap();
        let store = store(&tmp);
        store.write("1-Ann-2-Bob.png", b"previous").unwrap();
        let backend = MockBackend::new();

        // Payload is not even valid base64: existence wins before decoding.
        let result = materialize_image(
            &backend,
            &store,
            "data:image/png;base64,!!!",
            name,
            &MaterializeConfig::default(),
        )
        .unwrap();

        assert_eq!(result.status, AssetStatus::Existing);
        assert!(backend.get_operations().is_empty());
        assert_eq!(store.read("1-Ann-2-Bob.png").unwrap(), b"previous");
    }

    #[test]
    fn remote_url_is_malformed() {
        let tmp = TempDir::new().unwrap();
        let backend = MockBackend::new();
        let result = materialize_image(
            &backend,
            &store(&tmp),
            "https://example.com/x.png",
            name,
            &MaterializeConfig::default(),
        );
        assert!(matches!(result, Err(MaterializeError::Malformed(_))));
    }

    #[test]
    fn undecodable_image_is_malformed() {
        let tmp = TempDir::new().unwrap();
        let store = store(&tmp);
        let backend = crate::imaging::RustBackend::new();
        // "hello" in base64: valid payload, not an image.
        let result = materialize_image(
            &backend,
            &store,
            "data:image/png;base64,aGVsbG8=",
            name,
            &MaterializeConfig::default(),
        );
        assert!(matches!(result, Err(MaterializeError::Malformed(_))));
        assert!(!store.contains("1-Ann-2-Bob.png"));
    }

    #[test]
    fn unknown_source_format_is_malformed() {
        let tmp = TempDir::new().unwrap();
        let backend = MockBackend::new();
        let result = materialize_image(
            &backend,
            &store(&tmp),
            "data:image/doc;base64,aGVsbG8=",
            name,
            &MaterializeConfig::default(),
        );
        assert!(matches!(result, Err(MaterializeError::Malformed(_))));
    }

    #[test]
    fn thumbnail_downscales_materialized_image() {
        let tmp = TempDir::new().unwrap();
        let store = store(&tmp);
        store.write("1-Ann-2.png", &png_bytes(480, 360)).unwrap();
        let backend = crate::imaging::RustBackend::new();

        let result = materialize_thumbnail(
            &backend,
            &store,
            "1-Ann-2.png",
            |ext| format!("1-Ann-thumbnail.{ext}"),
            &ThumbnailConfig::default(),
        )
        .unwrap();

        assert_eq!(result.filename, "1-Ann-thumbnail.png");
        assert_eq!(result.status, AssetStatus::Written);
        assert_eq!(
            image::image_dimensions(store.path("1-Ann-thumbnail.png")).unwrap(),
            (240, 180)
        );
    }

    #[test]
    fn thumbnail_existing_is_reused() {
        let tmp = TempDir::new().unwrap();
        let store = store(&tmp);
        store.write("1-Ann-thumbnail.png", b"thumb").unwrap();
        let backend = MockBackend::new();

        let result = materialize_thumbnail(
            &backend,
            &store,
            "1-Ann-2.png",
            |ext| format!("1-Ann-thumbnail.{ext}"),
            &ThumbnailConfig::default(),
        )
        .unwrap();

        assert_eq!(result.status, AssetStatus::Existing);
        assert!(backend.get_operations().is_empty());
    }

    #[test]
    fn thumbnail_of_missing_source_is_io_error() {
        let tmp = TempDir::new().unwrap();
        let backend = MockBackend::new();
        let result = materialize_thumbnail(
            &backend,
            &store(&tmp),
            "gone.png",
            |ext| format!("t.{ext}"),
            &ThumbnailConfig::default(),
        );
        assert!(matches!(result, Err(MaterializeError::Io(_))));
    }

    #[test]
    fn thumbnail_is_sharpened_and_uses_configured_format() {
        let tmp = TempDir::new().unwrap();
        let store = store(&tmp);
        store.write("1-Ann-2.png", b"any").unwrap();
        let backend = MockBackend::with_dimensions(Dimensions {
            width: 1000,
            height: 500,
        });
        let config = ThumbnailConfig {
            format: OutputFormat::Jpeg,
            ..ThumbnailConfig::default()
        };

        let result = materialize_thumbnail(
            &backend,
            &store,
            "1-Ann-2.png",
            |ext| format!("1-Ann-thumbnail.{ext}"),
            &config,
        )
        .unwrap();

        assert_eq!(result.filename, "1-Ann-thumbnail.jpg");
        assert!(matches!(
            backend.get_operations().last(),
            Some(RecordedOp::Encode {
                width: 240,
                height: 120,
                format: ImageFormat::Jpeg,
                sharpened: true,
                ..
            })
        ));
    }
}
