//! Typed absence reasons for every unit the pipeline can drop.
//!
//! Failures are contained at the smallest unit that can be dropped without
//! corrupting larger ones: a page image, a book, or a whole document. Each
//! unit's result is an [`Outcome`], either the produced value or the
//! [`Skip`] explaining why it is absent. Filesystem failures are not skips;
//! they travel as [`PipelineError`](crate::pipeline::PipelineError) and abort
//! the run.

use crate::document::StructureError;
use crate::timestamp::TimestampError;
use thiserror::Error;

/// Why a page image, book, or game is absent from the output.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Skip {
    #[error("structure mismatch: {0}")]
    StructureMismatch(#[from] StructureError),
    #[error("missing timestamp: {0}")]
    MissingTimestamp(#[from] TimestampError),
    #[error("malformed image payload: {0}")]
    MalformedImagePayload(String),
    #[error("duplicate timestamp {timestamp} (kept {kept})")]
    DuplicateTimestamp { timestamp: i64, kept: String },
    #[error("duplicate content hash {hash} (kept {kept})")]
    DuplicateContentHash { hash: String, kept: String },
    #[error("stale cache entry: asset {0} is missing")]
    StaleCacheReference(String),
}

/// Result of producing one unit (page image, book, or game).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome<T> {
    Produced(T),
    Skipped(Skip),
}
