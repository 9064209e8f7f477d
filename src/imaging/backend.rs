//! Image processing backend trait and shared types.
//!
//! The [`ImageBackend`] trait defines the two operations materialization
//! needs: identify (read dimensions from encoded bytes) and encode (decode,
//! resize, encode, write). The production implementation is
//! [`RustBackend`](super::rust_backend::RustBackend), built on the `image`
//! crate; tests use the recording [`MockBackend`](tests::MockBackend).

use super::params::EncodeParams;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Processing failed: {0}")]
    ProcessingFailed(String),
}

/// Result of an identify operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    pub fn as_tuple(self) -> (u32, u32) {
        (self.width, self.height)
    }
}

/// Trait for image processing backends.
///
/// `Sync` so a single backend can serve a bounded pool of document workers.
pub trait ImageBackend: Sync {
    /// Read dimensions from encoded image bytes.
    fn identify(&self, data: &[u8]) -> Result<Dimensions, BackendError>;

    /// Execute a decode → resize → encode job, writing `params.output`.
    fn encode(&self, params: &EncodeParams<'_>) -> Result<(), BackendError>;
}
