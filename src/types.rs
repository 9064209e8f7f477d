//! The archive data model: [`Game`] → [`Book`] → [`Page`].
//!
//! These types are both the in-memory result of extraction and the persisted
//! manifest format. Field names serialize as camelCase because the browsing
//! front-end reads the manifest directly.
//!
//! ```text
//! Game     one export document (one play session)
//! └── Book one player's sequence of turns
//!     └── Page one turn: a text prompt, a drawing, or (rarely) neither
//! ```
//!
//! Nullable fields serialize as JSON `null` so every record has the same
//! shape; only `Book::thumbnail` is omitted when absent.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Structural classification of a book (and, by first-book precedence, a game).
///
/// See [`classify`](crate::classify) for the rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameType {
    /// No page carries an image.
    Text,
    /// Every page is exactly one of text/image and the two counts are balanced.
    Alternating,
    /// Anything else.
    Standard,
}

impl fmt::Display for GameType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            GameType::Text => "text",
            GameType::Alternating => "alternating",
            GameType::Standard => "standard",
        };
        f.write_str(label)
    }
}

/// One turn within a book.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    /// 1-based; the embedded `Page N` number when present, else the position.
    pub index: u32,
    /// Player who produced this turn (distinct from the book's owner).
    pub author: Option<String>,
    pub text: Option<String>,
    /// Asset filename in the images directory.
    pub image: Option<String>,
    /// Digest of the embedded image payload, independent of the written file.
    pub image_hash: Option<String>,
}

impl Page {
    pub fn has_text(&self) -> bool {
        self.text.is_some()
    }

    pub fn has_image(&self) -> bool {
        self.image.is_some()
    }
}

/// One player's contribution to a game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    /// `{gameId}/{author}`
    pub id: String,
    pub author: Option<String>,
    #[serde(rename = "type")]
    pub kind: GameType,
    pub timestamp: i64,
    pub content_hash: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
    pub pages: Vec<Page>,
}

impl Book {
    /// Every asset filename this book references (page images and thumbnail).
    pub fn asset_filenames(&self) -> impl Iterator<Item = &str> {
        self.pages
            .iter()
            .filter_map(|p| p.image.as_deref())
            .chain(self.thumbnail.as_deref())
    }
}

/// One export document: a complete play session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Game {
    pub id: String,
    /// Text of the document's top-level heading.
    pub title: String,
    /// Source document file name; the key for incremental reuse.
    pub filename: String,
    /// Epoch milliseconds.
    pub timestamp: i64,
    #[serde(rename = "type")]
    pub kind: GameType,
    pub content_hash: String,
    /// Distinct book authors, in book order.
    pub players: Vec<String>,
    pub books: Vec<Book>,
}

impl Game {
    pub fn asset_filenames(&self) -> impl Iterator<Item = &str> {
        self.books.iter().flat_map(Book::asset_filenames)
    }

    pub fn page_count(&self) -> usize {
        self.books.iter().map(|b| b.pages.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(index: u32, text: Option<&str>, image: Option<&str>) -> Page {
        Page {
            index,
            author: None,
            text: text.map(String::from),
            image: image.map(String::from),
            image_hash: None,
        }
    }

    #[test]
    fn game_type_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&GameType::Alternating).unwrap(),
            "\"alternating\""
        );
        let parsed: GameType = serde_json::from_str("\"text\"").unwrap();
        assert_eq!(parsed, GameType::Text);
    }

    #[test]
    fn page_nulls_are_serialized() {
        let json = serde_json::to_value(page(1, None, None)).unwrap();
        assert!(json["author"].is_null());
        assert!(json["text"].is_null());
        assert!(json["image"].is_null());
        assert!(json["imageHash"].is_null());
    }

    #[test]
    fn book_uses_camel_case_and_type_key() {
        let book = Book {
            id: "1/ann".into(),
            author: Some("ann".into()),
            kind: GameType::Standard,
            timestamp: 1,
            content_hash: "abc".into(),
            thumbnail: None,
            pages: vec![],
        };
        let json = serde_json::to_value(&book).unwrap();
        assert_eq!(json["type"], "standard");
        assert_eq!(json["contentHash"], "abc");
        assert!(json.get("thumbnail").is_none());
    }

    #[test]
    fn asset_filenames_include_thumbnail() {
        let book = Book {
            id: "1/ann".into(),
            author: Some("ann".into()),
            kind: GameType::Alternating,
            timestamp: 1,
            content_hash: String::new(),
            thumbnail: Some("1-ann-thumbnail.png".into()),
            pages: vec![page(1, Some("a"), None), page(2, None, Some("1-ann-2.png"))],
        };
        let names: Vec<&str> = book.asset_filenames().collect();
        assert_eq!(names, vec!["1-ann-2.png", "1-ann-thumbnail.png"]);
    }
}
