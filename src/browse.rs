//! Read-side view of a manifest, as the browsing front-end uses it.
//!
//! The front-end treats the manifest as its only data source. Books are
//! flattened across games in manifest order (newest game first), and
//! "next"/"previous" walk that flat list: next is the entry before the
//! current one (newer), previous the entry after it (older).

use crate::types::{Book, Game};
use std::collections::HashMap;
use std::fmt;

/// Counts shown on the archive's landing page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ArchiveStats {
    pub games: usize,
    pub books: usize,
    pub pages: usize,
}

impl fmt::Display for ArchiveStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} games, {} books, {} pages",
            self.games, self.books, self.pages
        )
    }
}

/// Lookup structure over a loaded manifest.
pub struct ArchiveIndex<'a> {
    games: &'a [Game],
    books: Vec<&'a Book>,
    game_by_id: HashMap<&'a str, usize>,
    book_by_id: HashMap<&'a str, usize>,
}

impl<'a> ArchiveIndex<'a> {
    pub fn new(games: &'a [Game]) -> Self {
        let books: Vec<&Book> = games.iter().flat_map(|g| &g.books).collect();
        let game_by_id = games
            .iter()
            .enumerate()
            .map(|(i, g)| (g.id.as_str(), i))
            .collect();
        let book_by_id = books
            .iter()
            .enumerate()
            .map(|(i, b)| (b.id.as_str(), i))
            .collect();
        Self {
            games,
            books,
            game_by_id,
            book_by_id,
        }
    }

    pub fn games(&self) -> &'a [Game] {
        self.games
    }

    /// All books in manifest order.
    pub fn books(&self) -> &[&'a Book] {
        &self.books
    }

    pub fn game(&self, id: &str) -> Option<&'a Game> {
        self.game_by_id.get(id).map(|&i| &self.games[i])
    }

    pub fn book(&self, id: &str) -> Option<&'a Book> {
        self.book_by_id.get(id).map(|&i| self.books[i])
    }

    /// The newer neighbour of `id` in the flattened list.
    pub fn next_book_id(&self, id: &str) -> Option<&'a str> {
        let i = *self.book_by_id.get(id)?;
        i.checked_sub(1).map(|j| self.books[j].id.as_str())
    }

    /// The older neighbour of `id` in the flattened list.
    pub fn previous_book_id(&self, id: &str) -> Option<&'a str> {
        let i = *self.book_by_id.get(id)?;
        self.books.get(i + 1).map(|b| b.id.as_str())
    }

    /// Pick a book from a caller-supplied random number.
    pub fn random_book(&self, seed: usize) -> Option<&'a Book> {
        if self.books.is_empty() {
            return None;
        }
        Some(self.books[seed % self.books.len()])
    }

    pub fn stats(&self) -> ArchiveStats {
        ArchiveStats {
            games: self.games.len(),
            books: self.books.len(),
            pages: self.books.iter().map(|b| b.pages.len()).sum(),
        }
    }
}

/// URL of an asset as the front-end resolves it: `{base}/images/{filename}`.
pub fn image_url(base: &str, filename: &str) -> String {
    format!("{}/images/{}", base.trim_end_matches('/'), filename)
}
