//! Deterministic identifiers and asset filenames.
//!
//! Every derived name in the archive comes from here so the manifest, the
//! asset directory, and the reuse check always agree:
//!
//! | Thing | Form |
//! |---|---|
//! | Game id | document file name without `.html` |
//! | Book id | `{gameId}/{author}` |
//! | Page asset | `{gameId}-{bookAuthor}-{pageIndex}[-{pageAuthor}].{ext}` |
//! | Thumbnail | `{gameId}-{bookAuthor}-thumbnail.{ext}` |
//!
//! An absent author renders as [`UNKNOWN_AUTHOR`]. Book ids keep the raw
//! author text.
//!
//! # Filename Components
//!
//! Game ids, authors and page authors are free text, and the asset directory
//! is flat, so each one becomes a single hyphen-free component:
//!
//! ```text
//! "Ann"         →  "Ann"
//! "a/b"         →  "a_b~c14cddc0"
//! "Mary-Jane"   →  "Mary_Jane~2787dea0"
//! ```
//!
//! Reserved characters are replaced with `_`. Whenever that changes the text,
//! `~` and the first 8 hex digits of the raw text's SHA-256 are appended. `~`
//! is itself reserved, so an untagged component is always the raw text and a
//! tagged one is keyed by it. With hyphen-free components, the field layout of
//! a filename can always be read back, and two different documents or authors
//! never share an asset path.

use crate::hash::hash_bytes;

/// Placeholder used in ids and filenames when a book has no recognizable author.
pub const UNKNOWN_AUTHOR: &str = "unknown";

/// Suffix stripped from document file names to form the game id.
const DOCUMENT_SUFFIX: &str = ".html";

/// Marks a component whose text had to be rewritten.
const TAG: char = '~';

/// Game id from the document's file name.
///
/// File names are unique within the source directory, so ids are too:
///
/// - `"1610000000000.html"` → `"1610000000000"`
/// - `"1610000000000-export.html"` → `"1610000000000_export~39baa418"`
/// - `"a.HTML"` → `"a~13b98a6d"` (only an exact `.html` suffix is dropped silently)
pub fn game_id(filename: &str) -> String {
    match filename.strip_suffix(DOCUMENT_SUFFIX) {
        Some(stem) => component(stem, filename, false),
        None => {
            let stem = filename.rsplit_once('.').map_or(filename, |(stem, _)| stem);
            component(stem, filename, true)
        }
    }
}

/// Book id: `{gameId}/{author}`.
pub fn book_id(game_id: &str, author: Option<&str>) -> String {
    format!("{}/{}", game_id, author.unwrap_or(UNKNOWN_AUTHOR))
}

/// Turn free text into one reserved-character-free filename component.
///
/// - `"Ann"` → `"Ann"`
/// - `"a/b"` → `"a_b~c14cddc0"`
/// - `"what?"` → `"what_~…"`
pub fn sanitize_component(raw: &str) -> String {
    component(raw, raw, false)
}

fn is_reserved(c: char) -> bool {
    matches!(
        c,
        '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' | '-' | TAG
    ) || c.is_control()
}

/// Replace reserved characters in `text`; tag with a hash of `key` when the
/// result no longer equals the source it came from.
fn component(text: &str, key: &str, lossy: bool) -> String {
    let mut changed = lossy;
    let mut out: String = text
        .chars()
        .map(|c| {
            if is_reserved(c) {
                changed = true;
                '_'
            } else {
                c
            }
        })
        .collect();
    if changed {
        out.push(TAG);
        out.push_str(&hash_bytes(key)[..8]);
    }
    out
}

/// Filename (without directory) for one page's image.
pub fn page_asset_filename(
    game_id: &str,
    book_author: Option<&str>,
    index: u32,
    page_author: Option<&str>,
    ext: &str,
) -> String {
    let book_author = sanitize_component(book_author.unwrap_or(UNKNOWN_AUTHOR));
    match page_author {
        Some(author) if !author.is_empty() => format!(
            "{}-{}-{}-{}.{}",
            game_id,
            book_author,
            index,
            sanitize_component(author),
            ext
        ),
        _ => format!("{}-{}-{}.{}", game_id, book_author, index, ext),
    }
}

/// Filename (without directory) for a book's thumbnail.
pub fn thumbnail_filename(game_id: &str, book_author: Option<&str>, ext: &str) -> String {
    format!(
        "{}-{}-thumbnail.{}",
        game_id,
        sanitize_component(book_author.unwrap_or(UNKNOWN_AUTHOR)),
        ext
    )
}

/// Extension of an asset filename, if it has one.
pub fn extension(filename: &str) -> Option<&str> {
    filename
        .rsplit_once('.')
        .map(|(_, ext)| ext)
        .filter(|ext| !ext.is_empty())
}
