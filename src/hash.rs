//! Content hashes for pages, books, and games.
//!
//! All digests are SHA-256, rendered as lowercase hex. They are used for
//! duplicate detection and as a cheap equality test between runs, never for
//! security.
//!
//! Composition is bottom-up:
//!
//! ```text
//! imageHash   = H(embedded image payload, exactly as it appears in the document)
//! book hash   = H(join("\n", ["{len(text)}:{text}:{imageHash}" for each page]))
//! game hash   = H(join("\n", [book hash for each book]))
//! ```
//!
//! Absent fields contribute the empty string. Text is free-form and may
//! contain `:` or `\n`, so it is prefixed with its byte length; image hashes
//! and book hashes are hex and need no framing. Filenames, timestamps and
//! authors are not inputs, so the same game exported twice under
//! different names hashes identically.

use crate::types::Page;
use sha2::{Digest, Sha256};

/// Separator between components of a composed hash.
const SEPARATOR: &str = "\n";

/// SHA-256 of raw bytes, returned as a hex string.
pub fn hash_bytes(bytes: impl AsRef<[u8]>) -> String {
    let digest = Sha256::digest(bytes.as_ref());
    format!("{:x}", digest)
}

/// The `"{len(text)}:{text}:{imageHash}"` component contributed by one page.
pub fn page_component(page: &Page) -> String {
    let text = page.text.as_deref().unwrap_or("");
    format!(
        "{}:{}:{}",
        text.len(),
        text,
        page.image_hash.as_deref().unwrap_or("")
    )
}

/// Book content hash over its pages, in order.
pub fn book_hash(pages: &[Page]) -> String {
    let joined = pages
        .iter()
        .map(page_component)
        .collect::<Vec<_>>()
        .join(SEPARATOR);
    hash_bytes(joined)
}

/// Game content hash over its books' hashes, in order.
pub fn game_hash<'a>(book_hashes: impl IntoIterator<Item = &'a str>) -> String {
    let joined = book_hashes.into_iter().collect::<Vec<_>>().join(SEPARATOR);
    hash_bytes(joined)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(text: Option<&str>, image_hash: Option<&str>) -> Page {
        Page {
            index: 1,
            author: None,
            text: text.map(String::from),
            image: None,
            image_hash: image_hash.map(String::from),
        }
    }

    #[test]
    fn hash_bytes_deterministic() {
        let h1 = hash_bytes(b"hello world");
        let h2 = hash_bytes(b"hello world");
        assert_eq!(h1, h2);
        assert_eq!(h1.len(), 64);
    }

    #[test]
    fn hash_bytes_known_value() {
        assert_eq!(
            hash_bytes(""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn page_component_uses_empty_for_absent() {
        assert_eq!(page_component(&page(None, None)), "0::");
        assert_eq!(page_component(&page(Some("cat"), None)), "3:cat:");
        assert_eq!(page_component(&page(None, Some("ab12"))), "0::ab12");
    }

    #[test]
    fn text_with_separators_cannot_forge_pages() {
        let one = [page(Some("x:\n:"), None)];
        let two = [page(Some("x"), None), page(Some(":"), None)];
        assert_ne!(book_hash(&one), book_hash(&two));

        let split = [page(Some("a:b"), None)];
        let image = [page(Some("a"), Some("b"))];
        assert_ne!(book_hash(&split), book_hash(&image));
    }

    #[test]
    fn book_hash_depends_on_order() {
        let a = page(Some("a"), None);
        let b = page(Some("b"), None);
        assert_ne!(
            book_hash(&[a.clone(), b.clone()]),
            book_hash(&[b, a])
        );
    }

    #[test]
    fn book_hash_ignores_index_and_author() {
        let mut a = page(Some("a"), Some("h"));
        let h1 = book_hash(std::slice::from_ref(&a));
        a.index = 7;
        a.author = Some("Zed".into());
        a.image = Some("file.png".into());
        assert_eq!(book_hash(&[a]), h1);
    }

    #[test]
    fn game_hash_composes_book_hashes() {
        let h = game_hash(["x", "y"]);
        assert_eq!(h, hash_bytes("x\ny"));
        assert_ne!(h, game_hash(["y", "x"]));
    }
}
