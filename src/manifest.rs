//! The persisted manifest: a JSON array of [`Game`]s, newest first.
//!
//! Before writing, games are deduplicated in document enumeration order
//! (file names sorted lexicographically). That single order decides which
//! entry is "earliest" for both duplicate checks:
//!
//! 1. a second game with an already-seen `timestamp` is dropped,
//! 2. a second game with an already-seen `contentHash` is dropped.
//!
//! The output is pretty-printed with 2-space indentation and written through a
//! temporary file renamed over the target, so a crash mid-write leaves the
//! previous manifest intact.

use crate::outcome::Skip;
use crate::storage;
use crate::types::Game;
use std::collections::HashMap;
use std::io;
use std::path::Path;
use thiserror::Error;
use tracing::warn;

#[derive(Error, Debug)]
pub enum ManifestError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A game removed by deduplication.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dropped {
    pub filename: String,
    pub reason: Skip,
}

/// Games that survived deduplication, plus what was removed.
#[derive(Debug, Default)]
pub struct Deduplicated {
    pub games: Vec<Game>,
    pub dropped: Vec<Dropped>,
}

/// Drop later duplicates (by timestamp, then by content hash).
///
/// `games` must be in enumeration order; survivors keep that order.
pub fn deduplicate(games: impl IntoIterator<Item = Game>) -> Deduplicated {
    let mut by_timestamp: HashMap<i64, String> = HashMap::new();
    let mut by_hash: HashMap<String, String> = HashMap::new();
    let mut result = Deduplicated::default();

    for game in games {
        let duplicate = if let Some(kept) = by_timestamp.get(&game.timestamp) {
            Some(Skip::DuplicateTimestamp {
                timestamp: game.timestamp,
                kept: kept.clone(),
            })
        } else {
            by_hash
                .get(&game.content_hash)
                .map(|kept| Skip::DuplicateContentHash {
                    hash: game.content_hash.clone(),
                    kept: kept.clone(),
                })
        };

        match duplicate {
            Some(reason) => {
                warn!(file = %game.filename, reason = %reason, "duplicate game dropped");
                result.dropped.push(Dropped {
                    filename: game.filename,
                    reason,
                });
            }
            None => {
                by_timestamp.insert(game.timestamp, game.filename.clone());
                by_hash.insert(game.content_hash.clone(), game.filename.clone());
                result.games.push(game);
            }
        }
    }
    result
}

/// Stable sort, newest first.
pub fn sort_newest_first(games: &mut [Game]) {
    games.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
}

/// Serialize games to the manifest JSON text.
pub fn to_json(games: &[Game]) -> Result<String, ManifestError> {
    Ok(serde_json::to_string_pretty(games)?)
}

/// Write the manifest atomically, creating the parent directory if needed.
pub fn write(path: &Path, games: &[Game]) -> Result<(), ManifestError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let json = to_json(games)?;
    storage::write_atomic(path, json.as_bytes())?;
    Ok(())
}

/// Read a manifest written by [`write`].
pub fn load(path: &Path) -> Result<Vec<Game>, ManifestError> {
    let content = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}
