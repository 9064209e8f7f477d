//! Fixtures shared by the integration tests: a temporary archive layout and
//! an export-document writer producing real embedded PNGs.

#![allow(dead_code)]

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use image::{ImageFormat, Rgb, RgbImage};
use picturephone_archive::pipeline::BuildOptions;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// `books/`, `src/manifest.json` and `public/images/` under one temp root.
pub struct Archive {
    pub root: TempDir,
}

impl Archive {
    pub fn new() -> Self {
        let root = TempDir::new().unwrap();
        std::fs::create_dir_all(root.path().join("books")).unwrap();
        Self { root }
    }

    pub fn books(&self) -> PathBuf {
        self.root.path().join("books")
    }

    pub fn manifest(&self) -> PathBuf {
        self.root.path().join("src/manifest.json")
    }

    pub fn images(&self) -> PathBuf {
        self.root.path().join("public/images")
    }

    pub fn options(&self) -> BuildOptions {
        BuildOptions {
            source: self.books(),
            manifest: self.manifest(),
            images: self.images(),
            use_cache: true,
            strict: false,
        }
    }

    pub fn add_document(&self, filename: &str, html: &str) {
        std::fs::write(self.books().join(filename), html).unwrap();
    }

    /// An extracted PNG asset, re-embedded as a data URI for comparison
    /// with the source document.
    pub fn png_asset_as_data_uri(&self, filename: &str) -> String {
        let bytes = std::fs::read(self.images().join(filename)).unwrap();
        format!("data:image/png;base64,{}", STANDARD.encode(bytes))
    }

    /// Sorted file names in the image directory.
    pub fn image_files(&self) -> Vec<String> {
        list_files(&self.images())
    }
}

pub fn list_files(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .map(|entries| {
            entries
                .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
                .collect()
        })
        .unwrap_or_default();
    names.sort();
    names
}

pub fn png_data_uri(width: u32, height: u32, shade: u8) -> String {
    let img = RgbImage::from_fn(width, height, |x, y| {
        Rgb([shade, (x % 256) as u8, (y % 256) as u8])
    });
    let mut buf = Cursor::new(Vec::new());
    img.write_to(&mut buf, ImageFormat::Png).unwrap();
    format!("data:image/png;base64,{}", STANDARD.encode(buf.into_inner()))
}

/// A two-book alternating game; `seed` varies the prompts and drawings.
pub fn two_book_game(title: &str, seed: u8) -> String {
    format!(
        "<!DOCTYPE html><html><body><h1>{title}</h1>\
         <article><h2>Ann's Book</h2>\
           <section><h3>Page 1, Ann:</h3><h4>a cat on a bicycle {seed}</h4></section>\
           <section><h3>Page 2, Bob:</h3><img src=\"{ann}\"></section>\
         </article>\
         <article><h2>Bob's Book</h2>\
           <section><h3>Page 1, Bob:</h3><h4>a dog in a hat {seed}</h4></section>\
           <section><h3>Page 2, Ann:</h3><img src=\"{bob}\"></section>\
         </article>\
         </body></html>",
        ann = png_data_uri(32, 24, seed),
        bob = png_data_uri(24, 32, seed.wrapping_add(1)),
    )
}
