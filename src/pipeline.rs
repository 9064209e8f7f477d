//! The archive build: source directory in, manifest and assets out.
//!
//! ```text
//! books/*.html ──► DocumentTask ──► snapshot hit? ──yes──► cached Game
//!                                        │ no / stale
//!                                        ▼
//!                                  Extractor::extract ──► Game | Skip
//!                                        │
//!              deduplicate ◄─────────────┘ (enumeration order)
//!                   │
//!            sort newest first ──► manifest.json
//! ```
//!
//! Each document is an independent [`DocumentTask`] that yields either a
//! complete game or a typed skip reason. Tasks run one at a time unless
//! `processing.max_processes` allows a bounded rayon pool; results are
//! collected in enumeration order either way, so "keep the earliest" means
//! the same thing regardless of scheduling.
//!
//! ## Progress reporting
//!
//! When a [`Sender<DocumentEvent>`] is supplied, one event is sent per
//! document as it finishes. The CLI drains the channel on a printer thread.
//!
//! ## Strict mode
//!
//! With `strict` set, a run in which any document yields no game does not
//! write the manifest; [`RunReport::manifest_written`] is `false` and the CLI
//! exits non-zero.

use crate::config::{self, ArchiveConfig, ConfigError};
use crate::extract::Extractor;
use crate::imaging::ImageBackend;
use crate::incremental::{CacheDecision, Snapshot};
use crate::manifest::{self, Dropped, ManifestError};
use crate::outcome::{Outcome, Skip};
use crate::storage::{AssetStats, AssetStore};
use crate::types::Game;
use rayon::prelude::*;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Extension of export documents.
const DOCUMENT_EXTENSION: &str = "html";

/// Environment variable that turns strict mode on.
pub const STRICT_ENV: &str = "PICTUREPHONE_STRICT";

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("Manifest error: {0}")]
    Manifest(#[from] ManifestError),
    #[error("Source directory not found: {0}")]
    SourceNotFound(PathBuf),
    #[error("Failed to start worker pool: {0}")]
    WorkerPool(String),
}

/// Where the build reads and writes.
#[derive(Debug, Clone)]
pub struct BuildOptions {
    /// Directory of export documents.
    pub source: PathBuf,
    /// Manifest file, read as the previous snapshot and then replaced.
    pub manifest: PathBuf,
    /// Flat asset directory.
    pub images: PathBuf,
    /// Reuse games from the previous manifest.
    pub use_cache: bool,
    /// Withhold the manifest when any document fails.
    pub strict: bool,
}

/// One export document scheduled for processing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentTask {
    pub filename: String,
    pub path: PathBuf,
}

/// How a document's game was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentSource {
    Cached,
    Extracted,
}

/// Result of one task.
#[derive(Debug)]
pub struct DocumentResult {
    pub filename: String,
    pub outcome: Outcome<Game>,
    pub source: DocumentSource,
    pub assets: AssetStats,
    /// Set when a cached entry existed but had to be discarded.
    pub invalidated: Option<Skip>,
}

/// Progress event, one per finished document.
#[derive(Debug, Clone, PartialEq)]
pub enum DocumentEvent {
    Reused {
        filename: String,
        game_id: String,
        books: usize,
    },
    Extracted {
        filename: String,
        game_id: String,
        books: usize,
        assets: AssetStats,
        invalidated: Option<Skip>,
    },
    Skipped {
        filename: String,
        reason: Skip,
    },
}

impl DocumentEvent {
    fn from_result(result: &DocumentResult) -> Self {
        let filename = result.filename.clone();
        match (&result.outcome, result.source) {
            (Outcome::Produced(game), DocumentSource::Cached) => DocumentEvent::Reused {
                filename,
                game_id: game.id.clone(),
                books: game.books.len(),
            },
            (Outcome::Produced(game), DocumentSource::Extracted) => DocumentEvent::Extracted {
                filename,
                game_id: game.id.clone(),
                books: game.books.len(),
                assets: result.assets,
                invalidated: result.invalidated.clone(),
            },
            (Outcome::Skipped(reason), _) => DocumentEvent::Skipped {
                filename,
                reason: reason.clone(),
            },
        }
    }
}

/// Summary of a finished run.
#[derive(Debug, Default)]
pub struct RunReport {
    pub documents: usize,
    pub reused: usize,
    pub extracted: usize,
    /// Documents that yielded no game, with the reason.
    pub failed: Vec<(String, Skip)>,
    /// Games removed by deduplication.
    pub dropped: Vec<Dropped>,
    /// Cached entries discarded because an asset was missing.
    pub invalidated: usize,
    pub assets: AssetStats,
    /// The final manifest, newest first.
    pub games: Vec<Game>,
    pub manifest_written: bool,
}

impl RunReport {
    pub fn page_count(&self) -> usize {
        self.games.iter().map(Game::page_count).sum()
    }

    pub fn book_count(&self) -> usize {
        self.games.iter().map(|g| g.books.len()).sum()
    }
}

/// Enumerate export documents in the source directory, sorted by file name.
///
/// Other regular files are skipped with a warning, except the config file.
pub fn discover(source: &Path) -> Result<Vec<DocumentTask>, PipelineError> {
    if !source.is_dir() {
        return Err(PipelineError::SourceNotFound(source.to_path_buf()));
    }
    let mut tasks = Vec::new();
    for entry in std::fs::read_dir(source)? {
        let entry = entry?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let filename = entry.file_name().to_string_lossy().into_owned();
        let is_document = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case(DOCUMENT_EXTENSION));
        if is_document {
            tasks.push(DocumentTask { filename, path });
        } else if filename != config::CONFIG_FILE {
            warn!(file = %filename, "not an export document, skipped");
        }
    }
    tasks.sort_by(|a, b| a.filename.cmp(&b.filename));
    Ok(tasks)
}

impl DocumentTask {
    /// Produce this document's game, from the snapshot when possible.
    pub fn run<B: ImageBackend>(
        &self,
        snapshot: &Snapshot,
        extractor: &Extractor<'_, B>,
    ) -> Result<DocumentResult, PipelineError> {
        let invalidated = match snapshot.decide(&self.filename, extractor.store) {
            CacheDecision::Reuse(game) => {
                debug!(file = %self.filename, "reusing cached game");
                return Ok(DocumentResult {
                    filename: self.filename.clone(),
                    outcome: Outcome::Produced(game.clone()),
                    source: DocumentSource::Cached,
                    assets: AssetStats::default(),
                    invalidated: None,
                });
            }
            CacheDecision::Miss => None,
            CacheDecision::Stale(reason) => {
                warn!(file = %self.filename, reason = %reason, "cached game invalidated");
                Some(reason)
            }
        };

        let html = std::fs::read_to_string(&self.path)?;
        let extraction = extractor.extract(&self.filename, &html)?;
        if let Outcome::Skipped(reason) = &extraction.outcome {
            warn!(file = %self.filename, reason = %reason, "document skipped");
        }
        Ok(DocumentResult {
            filename: self.filename.clone(),
            outcome: extraction.outcome,
            source: DocumentSource::Extracted,
            assets: extraction.assets,
            invalidated,
        })
    }
}

/// Run the full build.
pub fn run(
    backend: &impl ImageBackend,
    options: &BuildOptions,
    events: Option<Sender<DocumentEvent>>,
) -> Result<RunReport, PipelineError> {
    let config = config::load_config(&options.source)?;
    run_with_config(backend, options, &config, events)
}

/// Run the full build with an already-resolved config.
pub fn run_with_config(
    backend: &impl ImageBackend,
    options: &BuildOptions,
    config: &ArchiveConfig,
    events: Option<Sender<DocumentEvent>>,
) -> Result<RunReport, PipelineError> {
    let tasks = discover(&options.source)?;
    let snapshot = if options.use_cache {
        Snapshot::load(&options.manifest)
    } else {
        Snapshot::empty()
    };
    let store = AssetStore::open(&options.images)?;
    let extractor = Extractor {
        backend,
        store: &store,
        images: config.materialize(),
        thumbnails: config.thumbnail(),
        zone: config.title_zone(),
    };

    let workers = config::effective_workers(&config.processing);
    info!(documents = tasks.len(), cached = snapshot.len(), workers, "building archive");

    let execute = |task: &DocumentTask| -> Result<DocumentResult, PipelineError> {
        let result = task.run(&snapshot, &extractor)?;
        if let Some(tx) = &events {
            tx.send(DocumentEvent::from_result(&result)).ok();
        }
        Ok(result)
    };

    let results: Vec<DocumentResult> = if workers <= 1 {
        tasks.iter().map(execute).collect::<Result<_, _>>()?
    } else {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .build()
            .map_err(|e| PipelineError::WorkerPool(e.to_string()))?;
        pool.install(|| tasks.par_iter().map(execute).collect::<Result<_, _>>())?
    };

    let mut report = RunReport {
        documents: results.len(),
        ..RunReport::default()
    };
    let mut games = Vec::new();
    for result in results {
        report.assets.merge(result.assets);
        if result.invalidated.is_some() {
            report.invalidated += 1;
        }
        match result.outcome {
            Outcome::Produced(game) => {
                match result.source {
                    DocumentSource::Cached => report.reused += 1,
                    DocumentSource::Extracted => report.extracted += 1,
                }
                games.push(game);
            }
            Outcome::Skipped(reason) => report.failed.push((result.filename, reason)),
        }
    }

    let deduplicated = manifest::deduplicate(games);
    let mut games = deduplicated.games;
    manifest::sort_newest_first(&mut games);
    report.dropped = deduplicated.dropped;
    report.games = games;

    if options.strict && !report.failed.is_empty() {
        warn!(
            failed = report.failed.len(),
            "strict mode: manifest not written"
        );
        return Ok(report);
    }

    manifest::write(&options.manifest, &report.games)?;
    report.manifest_written = true;
    info!(
        games = report.games.len(),
        documents = report.documents,
        path = %options.manifest.display(),
        "manifest written"
    );
    Ok(report)
}
