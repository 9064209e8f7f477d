//! `data:image/<fmt>;base64,<payload>` parsing.
//!
//! Export documents embed every drawing inline. The declared format doubles
//! as the file extension when images are stored in their source format.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use regex::Regex;
use std::sync::LazyLock;
use thiserror::Error;

static DATA_URI: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^data:image/(\w+);base64,").expect("static regex"));

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DataUriError {
    #[error("expected an embedded base64 image, got '{0}'")]
    NotEmbedded(String),
    #[error("invalid base64 payload: {0}")]
    InvalidBase64(String),
}

/// A borrowed, not yet decoded, embedded image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DataUri<'a> {
    format: &'a str,
    payload: &'a str,
}

impl<'a> DataUri<'a> {
    pub fn parse(src: &'a str) -> Result<Self, DataUriError> {
        let caps = DATA_URI
            .captures(src)
            .ok_or_else(|| DataUriError::NotEmbedded(preview(src)))?;
        let (Some(format), Some(prefix)) = (caps.get(1), caps.get(0)) else {
            return Err(DataUriError::NotEmbedded(preview(src)));
        };
        Ok(Self {
            format: format.as_str(),
            payload: &src[prefix.end()..],
        })
    }

    /// Declared image format, e.g. `"png"` or `"jpeg"`.
    pub fn format(&self) -> &'a str {
        self.format
    }

    /// Decode the base64 payload. Embedded whitespace is ignored.
    pub fn decode(&self) -> Result<Vec<u8>, DataUriError> {
        let compact: String = self
            .payload
            .chars()
            .filter(|c| !c.is_ascii_whitespace())
            .collect();
        STANDARD
            .decode(compact)
            .map_err(|e| DataUriError::InvalidBase64(e.to_string()))
    }
}

/// First few characters of a source, for log lines.
fn preview(src: &str) -> String {
    const MAX: usize = 40;
    match src.char_indices().nth(MAX) {
        Some((cut, _)) => format!("{}...", &src[..cut]),
        None => src.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_format_and_decodes() {
        let uri = DataUri::parse("data:image/png;base64,aGVsbG8=").unwrap();
        assert_eq!(uri.format(), "png");
        assert_eq!(uri.decode().unwrap(), b"hello");
    }

    #[test]
    fn payload_whitespace_is_ignored() {
        let uri = DataUri::parse("data:image/jpeg;base64,aGVs\nbG8=").unwrap();
        assert_eq!(uri.format(), "jpeg");
        assert_eq!(uri.decode().unwrap(), b"hello");
    }

    #[test]
    fn remote_url_is_rejected() {
        let err = DataUri::parse("https://example.com/cat.png").unwrap_err();
        assert_eq!(
            err,
            DataUriError::NotEmbedded("https://example.com/cat.png".into())
        );
    }

    #[test]
    fn non_base64_data_uri_is_rejected() {
        assert!(DataUri::parse("data:image/svg+xml;utf8,<svg/>").is_err());
        assert!(DataUri::parse("data:text/plain;base64,aGVsbG8=").is_err());
    }

    #[test]
    fn invalid_base64_fails_on_decode() {
        let uri = DataUri::parse("data:image/png;base64,!!!").unwrap();
        assert!(matches!(uri.decode(), Err(DataUriError::InvalidBase64(_))));
    }

    #[test]
    fn long_sources_are_truncated_in_errors() {
        let src = format!("http://{}", "x".repeat(100));
        let DataUriError::NotEmbedded(shown) = DataUri::parse(&src).unwrap_err() else {
            panic!("expected NotEmbedded");
        };
        assert!(shown.ends_with("..."));
        assert_eq!(shown.len(), 43);
    }
}
