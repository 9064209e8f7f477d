//! Image materialization: embedded data URIs in, files on disk out.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Parse payload** | `regex` + `base64` ([`data_uri`]) |
//! | **Identify** | `image::ImageReader::into_dimensions` |
//! | **Resize → PNG/JPEG/WebP** | Lanczos3 + `image::codecs` |
//! | **Thumbnail** | `resize_exact` + `unsharpen` |
//!
//! The module is split into:
//! - **Calculations**: Pure functions for dimension math (unit testable)
//! - **Parameters**: Data structures describing image operations
//! - **Backend**: [`ImageBackend`] trait + [`RustBackend`]
//! - **Operations**: High-level functions combining calculations + backend

pub mod backend;
mod calculations;
pub mod data_uri;
pub mod operations;
mod params;
pub mod rust_backend;

pub use backend::{BackendError, Dimensions, ImageBackend};
pub use calculations::constrain_to_width;
pub use data_uri::{DataUri, DataUriError};
pub use operations::{
    MaterializeConfig, MaterializeError, Materialized, ThumbnailConfig, materialize_image,
    materialize_thumbnail,
};
pub use params::{EncodeParams, OutputFormat, Quality, Sharpening};
pub use rust_backend::RustBackend;
