//! Archive configuration module.
//!
//! Handles loading, validating, and merging `config.toml`. Stock defaults are
//! overridden by an optional `config.toml` placed in the source directory next
//! to the export documents:
//!
//! ```text
//! books/
//! ├── config.toml                  # Optional, overrides stock defaults
//! ├── 1610000000000-export.html
//! └── export (3).html
//! ```
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [images]
//! format = "source"         # source | png | jpeg | webp
//! max_width = 1600          # 0 = keep full resolution
//! quality = 90              # JPEG quality (1-100)
//!
//! [thumbnails]
//! width = 240
//! format = "source"
//!
//! [timestamps]
//! utc_offset_minutes = 0    # Omit to read title dates as local time
//!
//! [processing]
//! max_processes = 4         # Omit for sequential processing
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::imaging::{MaterializeConfig, OutputFormat, Quality, Sharpening, ThumbnailConfig};
use crate::timestamp::TitleZone;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// File name of the optional config inside the source directory.
pub const CONFIG_FILE: &str = "config.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config serialization error: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Archive configuration loaded from `config.toml`.
///
/// All fields have defaults. User config files need only specify the values
/// they want to override.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ArchiveConfig {
    /// Page image materialization (format, width limit, quality).
    pub images: ImagesConfig,
    /// Book thumbnail generation.
    pub thumbnails: ThumbnailsConfig,
    /// Interpretation of dates found in document titles.
    pub timestamps: TimestampsConfig,
    /// Document worker pool.
    pub processing: ProcessingConfig,
}

impl ArchiveConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=100).contains(&self.images.quality) {
            return Err(ConfigError::Validation(
                "images.quality must be 1-100".into(),
            ));
        }
        if self.thumbnails.width == 0 {
            return Err(ConfigError::Validation(
                "thumbnails.width must be non-zero".into(),
            ));
        }
        if self.processing.max_processes == Some(0) {
            return Err(ConfigError::Validation(
                "processing.max_processes must be at least 1".into(),
            ));
        }
        let offset = self.timestamps.utc_offset_minutes.unwrap_or(0);
        if offset.unsigned_abs() >= 24 * 60 {
            return Err(ConfigError::Validation(
                "timestamps.utc_offset_minutes must be within ±1439".into(),
            ));
        }
        Ok(())
    }

    pub fn materialize(&self) -> MaterializeConfig {
        MaterializeConfig {
            format: self.images.format,
            max_width: self.images.max_width,
            quality: Quality::new(self.images.quality),
        }
    }

    pub fn thumbnail(&self) -> ThumbnailConfig {
        ThumbnailConfig {
            width: self.thumbnails.width,
            format: self.thumbnails.format,
            quality: Quality::new(self.images.quality),
            sharpening: Some(Sharpening::light()),
        }
    }

    pub fn title_zone(&self) -> TitleZone {
        TitleZone::from_offset_minutes(self.timestamps.utc_offset_minutes)
    }
}

/// Page image settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ImagesConfig {
    /// Stored format. `source` keeps the embedded format.
    pub format: OutputFormat,
    /// Maximum stored width in pixels; 0 disables the limit.
    pub max_width: u32,
    /// JPEG encoding quality (1 = worst, 100 = best).
    pub quality: u32,
}

impl Default for ImagesConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::Source,
            max_width: 1600,
            quality: 90,
        }
    }
}

/// Thumbnail generation settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ThumbnailsConfig {
    /// Thumbnail width in pixels. Smaller sources are never upscaled.
    pub width: u32,
    /// `source` reuses the page image's format.
    pub format: OutputFormat,
}

impl Default for ThumbnailsConfig {
    fn default() -> Self {
        Self {
            width: 240,
            format: OutputFormat::Source,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TimestampsConfig {
    /// Fixed UTC offset for title dates. When absent, the local zone is used.
    pub utc_offset_minutes: Option<i32>,
}

/// Document processing settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Maximum number of documents processed at once.
    /// When absent, documents are processed one at a time.
    /// Values larger than the core count are clamped down.
    pub max_processes: Option<usize>,
}

/// Resolve the effective worker count from config.
///
/// - `None` → 1 (sequential)
/// - `Some(n)` → `min(n, cores)` (user can constrain down, not up)
pub fn effective_workers(config: &ProcessingConfig) -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    config.max_processes.map(|n| n.min(cores).max(1)).unwrap_or(1)
}

/// Returns the stock default config as a `toml::Value::Table`.
///
/// This is the canonical representation of all default values, used as the
/// base layer for merging user overrides on top.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    Ok(toml::Value::try_from(ArchiveConfig::default())?)
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load `config.toml` from a directory as a raw TOML value.
///
/// Returns `Ok(None)` if no `config.toml` exists in the directory.
/// Returns `Err` if the file exists but contains invalid TOML.
pub fn load_raw_config(dir: &Path) -> Result<Option<toml::Value>, ConfigError> {
    let config_path = dir.join(CONFIG_FILE);
    if !config_path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(&config_path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<ArchiveConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: ArchiveConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from `config.toml` in the given directory.
///
/// Merges user values on top of stock defaults, rejects unknown keys,
/// and validates the result.
pub fn load_config(dir: &Path) -> Result<ArchiveConfig, ConfigError> {
    let base = stock_defaults_value()?;
    let overlay = load_raw_config(dir)?;
    resolve_config(base, overlay)
}

/// Returns a fully-commented stock `config.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# Picture Phone Archive Configuration
# ===================================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
#
# Place this file next to the export documents (default: books/config.toml).
# Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Page images
# ---------------------------------------------------------------------------
[images]
# Stored format: "source" keeps the embedded format byte-for-byte,
# "png", "jpeg" or "webp" (lossless) transcode every image.
format = "source"

# Maximum stored width in pixels. Wider drawings are downscaled,
# aspect ratio preserved. 0 keeps the full resolution.
max_width = 1600

# JPEG encoding quality (1 = worst, 100 = best).
quality = 90

# ---------------------------------------------------------------------------
# Book thumbnails
# ---------------------------------------------------------------------------
[thumbnails]
# Thumbnail width in pixels. Never upscaled.
width = 240

# "source" reuses the format of the page image the thumbnail is made from.
format = "source"

# ---------------------------------------------------------------------------
# Timestamps
# ---------------------------------------------------------------------------
[timestamps]
# Documents without a 13-digit timestamp in their file name are dated from
# the title ("1/15/2021, 3:04:05 PM"). By default that time is read in the
# local time zone; pin a fixed UTC offset for machine-independent builds.
# utc_offset_minutes = 0

# ---------------------------------------------------------------------------
# Processing
# ---------------------------------------------------------------------------
[processing]
# Documents are processed one at a time by default. Set to run up to this
# many in parallel (clamped to the number of CPU cores).
# max_processes = 4
"##
}
