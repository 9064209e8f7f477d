//! CLI output formatting for the build and stats commands.
//!
//! # Information-First Display
//!
//! The primary display for every game is its identity (id and book count),
//! with the source document shown as secondary context on an indented
//! `Source:` line. Logs (via `tracing`, on stderr) carry the detailed skip
//! reasons; stdout stays a readable inventory of what was archived.
//!
//! # Output Format
//!
//! ## Build
//!
//! ```text
//! 1620000000000 (4 books)
//!     Source: 1620000000000.html
//!     Assets: 9 written
//! 1610000000000 (3 books) reused
//!     Source: 1610000000000.html
//! skipped notes.html
//!     Reason: structure mismatch: expected <h1> as the first element of the body, found <p>
//!
//! Documents: 3 (1 reused, 1 extracted, 1 skipped)
//! Assets: 9 written
//! Manifest: 2 games → src/manifest.json
//! ```
//!
//! ## Stats
//!
//! ```text
//! Games
//! 001 1620000000000 Broken Picture Phone (4 books, alternating)
//! 002 1610000000000 Broken Picture Phone (3 books, text)
//!
//! 2 games, 7 books, 41 pages
//! ```
//!
//! # Architecture
//!
//! Each output has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format functions
//! are pure: no I/O, no side effects.

use crate::browse::ArchiveIndex;
use crate::pipeline::{DocumentEvent, RunReport};
use crate::types::Game;
use std::path::Path;

// ============================================================================
// Shared display helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

fn plural(n: usize, one: &str, many: &str) -> String {
    if n == 1 {
        format!("{n} {one}")
    } else {
        format!("{n} {many}")
    }
}

/// Game header: id and book count.
///
/// ```text
/// 1620000000000 (4 books)
/// ```
fn game_header(game_id: &str, books: usize) -> String {
    format!("{} ({})", game_id, plural(books, "book", "books"))
}

// ============================================================================
// Build
// ============================================================================

/// Lines for one finished document.
pub fn format_document_event(event: &DocumentEvent) -> Vec<String> {
    match event {
        DocumentEvent::Reused {
            filename,
            game_id,
            books,
        } => vec![
            format!("{} reused", game_header(game_id, *books)),
            format!("{}Source: {}", indent(1), filename),
        ],
        DocumentEvent::Extracted {
            filename,
            game_id,
            books,
            assets,
            invalidated,
        } => {
            let mut lines = vec![
                game_header(game_id, *books),
                format!("{}Source: {}", indent(1), filename),
                format!("{}Assets: {}", indent(1), assets),
            ];
            if let Some(reason) = invalidated {
                lines.push(format!("{}Cache: invalidated ({})", indent(1), reason));
            }
            lines
        }
        DocumentEvent::Skipped { filename, reason } => vec![
            format!("skipped {}", filename),
            format!("{}Reason: {}", indent(1), reason),
        ],
    }
}

/// Final summary after a build.
pub fn format_run_summary(report: &RunReport, manifest_path: &Path) -> Vec<String> {
    let mut lines = vec![format!(
        "Documents: {} ({} reused, {} extracted, {} skipped)",
        report.documents,
        report.reused,
        report.extracted,
        report.failed.len()
    )];

    if !report.dropped.is_empty() {
        lines.push(format!("Duplicates dropped: {}", report.dropped.len()));
        for dropped in &report.dropped {
            lines.push(format!(
                "{}{}: {}",
                indent(1),
                dropped.filename,
                dropped.reason
            ));
        }
    }
    if report.invalidated > 0 {
        lines.push(format!(
            "Cache: {} invalidated",
            plural(report.invalidated, "entry", "entries")
        ));
    }
    lines.push(format!("Assets: {}", report.assets));

    if report.manifest_written {
        lines.push(format!(
            "Manifest: {} → {}",
            plural(report.games.len(), "game", "games"),
            manifest_path.display()
        ));
    } else {
        lines.push(format!(
            "Manifest: not written (strict mode, {} failed)",
            plural(report.failed.len(), "document", "documents")
        ));
        for (filename, reason) in &report.failed {
            lines.push(format!("{}{}: {}", indent(1), filename, reason));
        }
    }
    lines
}

pub fn print_run_summary(report: &RunReport, manifest_path: &Path) {
    println!();
    for line in format_run_summary(report, manifest_path) {
        println!("{}", line);
    }
}

// ============================================================================
// Stats
// ============================================================================

/// One line per game plus archive totals.
pub fn format_stats(games: &[Game]) -> Vec<String> {
    let index = ArchiveIndex::new(games);
    let mut lines = vec!["Games".to_string()];
    for (i, game) in index.games().iter().enumerate() {
        lines.push(format!(
            "{} {} {} ({}, {})",
            format_index(i + 1),
            game.id,
            game.title,
            plural(game.books.len(), "book", "books"),
            game.kind
        ));
    }
    lines.push(String::new());
    lines.push(index.stats().to_string());
    lines
}

pub fn print_stats(games: &[Game]) {
    for line in format_stats(games) {
        println!("{}", line);
    }
}
