//! Structural game-type classification.
//!
//! A pure function of a book's page sequence, evaluated once at extraction
//! time and stored in the manifest:
//!
//! - **text**: no page carries an image
//! - **alternating**: every page carries exactly one of text/image, and the
//!   text-only and image-only counts differ by less than 2
//! - **standard**: everything else
//!
//! A game takes its first book's type. Books that disagree are reported back
//! to the caller, which logs them; disagreement is never an error.

use crate::types::{Book, GameType, Page};

/// Classify one book's pages.
pub fn classify_pages(pages: &[Page]) -> GameType {
    if !pages.iter().any(Page::has_image) {
        return GameType::Text;
    }

    let mut text_only = 0usize;
    let mut image_only = 0usize;
    for page in pages {
        match (page.has_text(), page.has_image()) {
            (true, false) => text_only += 1,
            (false, true) => image_only += 1,
            _ => return GameType::Standard,
        }
    }

    if text_only.abs_diff(image_only) < 2 {
        GameType::Alternating
    } else {
        GameType::Standard
    }
}

/// Game type by first-book precedence.
///
/// Returns `None` for a game without books, plus the ids of books whose type
/// differs from the chosen one.
pub fn resolve_game_type(books: &[Book]) -> Option<(GameType, Vec<&str>)> {
    let first = books.first()?.kind;
    let disagreeing = books
        .iter()
        .filter(|b| b.kind != first)
        .map(|b| b.id.as_str())
        .collect();
    Some((first, disagreeing))
}
