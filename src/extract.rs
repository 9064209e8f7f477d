//! Export document → [`Game`].
//!
//! Runs the whole per-document chain on a schema-matched [`ExportDocument`]:
//! timestamp resolution, page extraction with image materialization, book
//! hashing and classification, thumbnail generation, and finally the game
//! record itself.
//!
//! Failures are dropped at the narrowest scope:
//!
//! | Problem | Dropped |
//! |---|---|
//! | Unusable embedded image | that page's `image` (text and index kept) |
//! | Article without `<h2>` or without sections | that book |
//! | Second book with the same author-derived id | that book |
//! | No `<h1>`, no timestamp, no usable books | the whole document |
//!
//! Filesystem errors while writing assets are not dropped; they abort the run.

use crate::classify::{classify_pages, resolve_game_type};
use crate::document::{
    BookNode, ExportDocument, PageTree, StructureError, parse_document, parse_page_heading,
};
use crate::hash::{book_hash, game_hash, hash_bytes};
use crate::imaging::{
    ImageBackend, MaterializeConfig, MaterializeError, ThumbnailConfig, materialize_image,
    materialize_thumbnail,
};
use crate::naming;
use crate::outcome::{Outcome, Skip};
use crate::storage::{AssetStats, AssetStore};
use crate::timestamp::{self, TitleZone};
use crate::types::{Book, Game, Page};
use std::collections::HashSet;
use std::io;
use tracing::{debug, warn};

/// Everything extraction needs besides the document itself.
pub struct Extractor<'a, B: ImageBackend> {
    pub backend: &'a B,
    pub store: &'a AssetStore,
    pub images: MaterializeConfig,
    pub thumbnails: ThumbnailConfig,
    pub zone: TitleZone,
}

/// Result of extracting one document.
#[derive(Debug)]
pub struct Extraction {
    pub outcome: Outcome<Game>,
    /// Assets touched while extracting, including those of books that were
    /// later dropped.
    pub assets: AssetStats,
}

impl<B: ImageBackend> Extractor<'_, B> {
    /// Extract a game from raw document HTML.
    ///
    /// `Err` only for filesystem failures in the asset directory.
    pub fn extract(&self, filename: &str, html: &str) -> io::Result<Extraction> {
        let mut assets = AssetStats::default();
        let outcome = match parse_document(html) {
            Ok(doc) => self.extract_document(filename, doc, &mut assets)?,
            Err(err) => Outcome::Skipped(err.into()),
        };
        Ok(Extraction { outcome, assets })
    }

    fn extract_document(
        &self,
        filename: &str,
        doc: ExportDocument,
        assets: &mut AssetStats,
    ) -> io::Result<Outcome<Game>> {
        let timestamp = match timestamp::resolve(filename, &doc.title, self.zone) {
            Ok(ts) => ts,
            Err(err) => return Ok(Outcome::Skipped(err.into())),
        };
        let game_id = naming::game_id(filename);

        let scope = BookScope {
            filename,
            game_id: &game_id,
            timestamp,
        };
        let mut books = Vec::new();
        let mut seen = HashSet::new();
        for node in doc.books {
            match self.extract_book(&scope, node, &mut seen, assets)? {
                Outcome::Produced(book) => books.push(book),
                Outcome::Skipped(reason) => {
                    warn!(file = filename, reason = %reason, "book skipped");
                }
            }
        }

        let Some((kind, disagreeing)) = resolve_game_type(&books) else {
            return Ok(Outcome::Skipped(StructureError::NoBooks.into()));
        };
        if !disagreeing.is_empty() {
            warn!(
                file = filename,
                game_type = %kind,
                books = ?disagreeing,
                "books disagree on game type, using the first book's"
            );
        }

        let mut players: Vec<String> = Vec::new();
        for author in books.iter().filter_map(|b| b.author.as_ref()) {
            if !players.contains(author) {
                players.push(author.clone());
            }
        }
        let content_hash = game_hash(books.iter().map(|b| b.content_hash.as_str()));

        Ok(Outcome::Produced(Game {
            id: game_id,
            title: doc.title,
            filename: filename.to_string(),
            timestamp,
            kind,
            content_hash,
            players,
            books,
        }))
    }

    /// One book, or the reason it is left out of the game.
    fn extract_book(
        &self,
        scope: &BookScope<'_>,
        node: BookNode,
        seen: &mut HashSet<String>,
        assets: &mut AssetStats,
    ) -> io::Result<Outcome<Book>> {
        let tree = match node.into_tree() {
            Ok(tree) => tree,
            Err(err) => return Ok(Outcome::Skipped(err.into())),
        };
        let author = tree.author();
        let id = naming::book_id(scope.game_id, author.as_deref());
        if !seen.insert(id.clone()) {
            let err = StructureError::DuplicateBook {
                position: tree.position,
                id,
            };
            return Ok(Outcome::Skipped(err.into()));
        }

        let book = BookRef {
            scope,
            author: author.as_deref(),
            id: &id,
        };
        let mut pages = Vec::with_capacity(tree.pages.len());
        for (position, page) in tree.pages.into_iter().enumerate() {
            pages.push(self.extract_page(&book, position as u32 + 1, page, assets)?);
        }

        let kind = classify_pages(&pages);
        let content_hash = book_hash(&pages);
        let thumbnail = self.thumbnail(&book, &pages, assets)?;
        debug!(file = scope.filename, book = %id, %kind, pages = pages.len(), "book extracted");

        Ok(Outcome::Produced(Book {
            id,
            author,
            kind,
            timestamp: scope.timestamp,
            content_hash,
            thumbnail,
            pages,
        }))
    }

    fn extract_page(
        &self,
        book: &BookRef<'_>,
        position: u32,
        tree: PageTree,
        assets: &mut AssetStats,
    ) -> io::Result<Page> {
        let (index, author) = match tree.heading.as_deref().and_then(parse_page_heading) {
            Some((number, author)) => (number, Some(author).filter(|a| !a.is_empty())),
            None => (position, None),
        };
        let text = tree.text.filter(|t| !t.is_empty());
        let image_hash = tree.image_src.as_deref().map(hash_bytes);

        let image = match tree.image_src.as_deref() {
            None => None,
            Some(src) => {
                let target = |ext: &str| {
                    naming::page_asset_filename(
                        book.scope.game_id,
                        book.author,
                        index,
                        author.as_deref(),
                        ext,
                    )
                };
                match self.page_image(src, target, assets)? {
                    Outcome::Produced(filename) => Some(filename),
                    Outcome::Skipped(reason) => {
                        warn!(
                            file = book.scope.filename,
                            book = book.id,
                            page = index,
                            reason = %reason,
                            "page image dropped"
                        );
                        None
                    }
                }
            }
        };

        Ok(Page {
            index,
            author,
            text,
            image,
            image_hash,
        })
    }

    /// Materialized filename of one embedded image.
    fn page_image(
        &self,
        src: &str,
        target: impl FnOnce(&str) -> String,
        assets: &mut AssetStats,
    ) -> io::Result<Outcome<String>> {
        match materialize_image(self.backend, self.store, src, target, &self.images) {
            Ok(done) => {
                assets.record(done.status);
                Ok(Outcome::Produced(done.filename))
            }
            Err(MaterializeError::Malformed(reason)) => {
                Ok(Outcome::Skipped(Skip::MalformedImagePayload(reason)))
            }
            Err(MaterializeError::Io(err)) => Err(err),
        }
    }

    /// Thumbnail from the first page that is a drawing without text.
    fn thumbnail(
        &self,
        book: &BookRef<'_>,
        pages: &[Page],
        assets: &mut AssetStats,
    ) -> io::Result<Option<String>> {
        let Some(source) = pages
            .iter()
            .find(|p| p.has_image() && !p.has_text())
            .and_then(|p| p.image.as_deref())
        else {
            return Ok(None);
        };
        let target = |ext: &str| naming::thumbnail_filename(book.scope.game_id, book.author, ext);
        match materialize_thumbnail(self.backend, self.store, source, target, &self.thumbnails) {
            Ok(done) => {
                assets.record(done.status);
                Ok(Some(done.filename))
            }
            Err(MaterializeError::Malformed(reason)) => {
                warn!(file = book.scope.filename, book = book.id, %reason, "thumbnail skipped");
                Ok(None)
            }
            Err(MaterializeError::Io(err)) => Err(err),
        }
    }
}

/// The game a book belongs to.
struct BookScope<'s> {
    filename: &'s str,
    game_id: &'s str,
    timestamp: i64,
}

/// Identity of the book being extracted, for asset names and log fields.
struct BookRef<'s> {
    scope: &'s BookScope<'s>,
    author: Option<&'s str>,
    id: &'s str,
}
