//! Shared test utilities for the picturephone-archive test suite.
//!
//! Provides synthetic images and a builder for export documents, so tests
//! can describe a game in a few lines instead of hand-writing HTML.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let html = ExportBuilder::new("Broken Picture Phone")
//!     .book("Ann's Book")
//!     .text_page(1, "Ann", "a cat on a bicycle")
//!     .image_page(2, "Bob", &png_data_uri(8, 8))
//!     .build();
//! ```

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use image::{ImageFormat, Rgb, RgbImage};
use std::io::Cursor;

// =========================================================================
// Synthetic images
// =========================================================================

/// Encode a deterministic gradient PNG of the given size.
pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x % 256) as u8, (y % 256) as u8, ((x + y) % 256) as u8])
    });
    let mut buf = Cursor::new(Vec::new());
    img.write_to(&mut buf, ImageFormat::Png).unwrap();
    buf.into_inner()
}

/// A `data:image/png;base64,...` URI wrapping [`png_bytes`].
pub fn png_data_uri(width: u32, height: u32) -> String {
    format!(
        "data:image/png;base64,{}",
        STANDARD.encode(png_bytes(width, height))
    )
}

// =========================================================================
// Export documents
// =========================================================================

/// Builds an export document in the exporter's fixed shape.
pub struct ExportBuilder {
    title: String,
    books: Vec<(String, Vec<String>)>,
}

impl ExportBuilder {
    pub fn new(title: &str) -> Self {
        Self {
            title: title.to_string(),
            books: Vec::new(),
        }
    }

    /// Start a new `<article>` with the given `<h2>` heading.
    pub fn book(mut self, heading: &str) -> Self {
        self.books.push((heading.to_string(), Vec::new()));
        self
    }

    pub fn text_page(self, number: u32, author: &str, text: &str) -> Self {
        self.section(format!(
            "<h3>Page {number}, {author}:</h3><h4>{text}</h4>"
        ))
    }

    pub fn image_page(self, number: u32, author: &str, src: &str) -> Self {
        self.section(format!(
            "<h3>Page {number}, {author}:</h3><img src=\"{src}\">"
        ))
    }

    fn section(mut self, inner: String) -> Self {
        let (_, pages) = self
            .books
            .last_mut()
            .expect("call book() before adding pages");
        pages.push(format!("<section>{inner}</section>"));
        self
    }

    pub fn build(&self) -> String {
        let mut html = format!(
            "<!DOCTYPE html><html><head><meta charset=\"utf-8\"></head><body><h1>{}</h1>",
            self.title
        );
        for (heading, pages) in &self.books {
            html.push_str(&format!("<article><h2>{heading}</h2>"));
            for page in pages {
                html.push_str(page);
            }
            html.push_str("</article>");
        }
        html.push_str("</body></html>");
        html
    }
}
