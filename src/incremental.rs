//! Reuse of previously extracted games across runs.
//!
//! Extraction is dominated by image decoding and encoding. When a document
//! was already turned into a game by an earlier run, and every asset that game
//! references is still on disk, the earlier record is reused verbatim and the
//! document is not even read.
//!
//! # Design
//!
//! The previous manifest is loaded once at the start of a run into a
//! read-only [`Snapshot`] keyed by the source document's file name. Nothing
//! writes to it during the run; the new manifest is assembled separately.
//!
//! A hit requires:
//! 1. A game recorded under the same `filename`
//! 2. Every `page.image` and `book.thumbnail` it references exists in the
//!    asset directory
//!
//! Reuse is all-or-nothing per game. One missing asset discards the cached
//! record ([`Skip::StaleCacheReference`]) and the document is extracted again,
//! which regenerates the missing file. Assets that are still present are
//! picked up by the materializer's existence check instead of being
//! re-encoded.
//!
//! ## Bypassing the snapshot
//!
//! Pass `--no-cache` to `build` to start from an empty snapshot. Every
//! document is reparsed; existing assets are still not rewritten.

use crate::manifest::{self, ManifestError};
use crate::outcome::Skip;
use crate::storage::AssetStore;
use crate::types::Game;
use std::collections::HashMap;
use std::io;
use std::path::Path;
use tracing::{debug, warn};

/// Read-only view of the previous run's manifest.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    by_filename: HashMap<String, Game>,
}

/// What to do with one document given the snapshot.
#[derive(Debug, PartialEq)]
pub enum CacheDecision<'a> {
    /// Reuse this game unchanged.
    Reuse(&'a Game),
    /// No usable entry; extract the document.
    Miss,
    /// An entry exists but references a missing asset; extract the document.
    Stale(Skip),
}

impl Snapshot {
    /// Empty snapshot (used for `--no-cache` or the first run).
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_games(games: impl IntoIterator<Item = Game>) -> Self {
        let by_filename = games
            .into_iter()
            .map(|g| (g.filename.clone(), g))
            .collect();
        Self { by_filename }
    }

    /// Load the manifest at `path`. A missing manifest yields an empty
    /// snapshot silently; an unreadable or corrupt one with a warning.
    pub fn load(path: &Path) -> Self {
        match manifest::load(path) {
            Ok(games) => {
                let snapshot = Self::from_games(games);
                debug!(path = %path.display(), games = snapshot.len(), "previous manifest loaded");
                snapshot
            }
            Err(ManifestError::Io(err)) if err.kind() == io::ErrorKind::NotFound => Self::empty(),
            Err(err) => {
                warn!(path = %path.display(), reason = %err, "previous manifest ignored");
                Self::empty()
            }
        }
    }

    pub fn lookup(&self, filename: &str) -> Option<&Game> {
        self.by_filename.get(filename)
    }

    pub fn len(&self) -> usize {
        self.by_filename.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_filename.is_empty()
    }

    /// Decide whether the document `filename` can skip extraction.
    pub fn decide(&self, filename: &str, store: &AssetStore) -> CacheDecision<'_> {
        match self.lookup(filename) {
            None => CacheDecision::Miss,
            Some(game) => match validate(game, store) {
                Ok(()) => CacheDecision::Reuse(game),
                Err(skip) => CacheDecision::Stale(skip),
            },
        }
    }
}

/// Check that every asset referenced by `game` still exists.
pub fn validate(game: &Game, store: &AssetStore) -> Result<(), Skip> {
    match game.asset_filenames().find(|name| !store.contains(name)) {
        Some(missing) => Err(Skip::StaleCacheReference(missing.to_string())),
        None => Ok(()),
    }
}
