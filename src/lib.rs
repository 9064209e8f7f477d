//! # Picture Phone Archive
//!
//! Archives exported picture-telephone games ("Broken Picture Phone") into a
//! normalized, deduplicated JSON manifest plus extracted image files, which a
//! static browsing front-end then renders.
//!
//! Each game is saved by the players as one HTML page with every drawing
//! embedded inline as a base64 data URI. This crate turns a directory of those
//! pages into:
//!
//! ```text
//! books/*.html  ──►  src/manifest.json   (games, newest first)
//!               ──►  public/images/      (one file per drawing + book thumbnails)
//! ```
//!
//! # Architecture: One Task per Document
//!
//! Every export document is processed independently, start to finish:
//!
//! ```text
//! 1. Match     html      →  ExportDocument   (typed tree, shape checked once)
//! 2. Resolve   filename  →  timestamp         (13-digit millis, else title date)
//! 3. Extract   tree      →  Game              (images written, hashes, types)
//! ```
//!
//! A document either yields one complete [`Game`](types::Game) or a typed
//! [`Skip`](outcome::Skip) reason; nothing half-built reaches the manifest.
//! Results are then deduplicated in file-name order and sorted newest first.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`pipeline`] | Discovers documents, runs tasks (sequentially or on a bounded pool), writes the manifest |
//! | [`document`] | Schema matching of export HTML into a typed tree |
//! | [`extract`] | Typed tree → `Game`, invoking the materializer and hasher per page |
//! | [`timestamp`] | Creation time from the file name or the title heading |
//! | [`hash`] | SHA-256 content hashes for pages, books and games |
//! | [`classify`] | `text` / `alternating` / `standard` book classification |
//! | [`imaging`] | Data URI decoding, resizing, transcoding, thumbnails |
//! | [`storage`] | Write-once asset directory with atomic writes |
//! | [`incremental`] | Reuse of games from the previous manifest |
//! | [`manifest`] | Deduplication, ordering, and persistence of the manifest |
//! | [`browse`] | The front-end's read-side view: flattened books, next/previous, stats |
//! | [`outcome`] | Skip reasons and per-unit outcomes |
//! | [`types`] | The persisted data model (`Game`, `Book`, `Page`) |
//! | [`naming`] | Game/book ids and deterministic asset filenames |
//! | [`config`] | `config.toml` loading, validation, and defaults |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Existence Is Proof
//!
//! Asset filenames are a pure function of the game and page they belong to,
//! so an asset already on disk is never decoded or encoded again. Every write
//! goes through a temporary file renamed into place, which keeps that
//! assumption sound across crashes: a truncated file can never appear under
//! the final name.
//!
//! ## Whole-Game Reuse
//!
//! A game from the previous manifest is reused only when every image it
//! references still exists. Partial reuse would need per-book bookkeeping in
//! the manifest format the front-end reads; reparsing one document is cheap
//! once its surviving images are picked up by the existence check.
//!
//! ## Sequential by Default
//!
//! Image work is CPU- and disk-bound, and running every document at once has
//! been slower in practice than running them in order. `processing.max_processes`
//! opts into a bounded pool; results are still gathered in enumeration order,
//! so the output does not depend on scheduling.
//!
//! ## Pure-Rust Imaging
//!
//! Decoding and encoding use the `image` crate only. The binary has no system
//! dependencies.

pub mod browse;
pub mod classify;
pub mod config;
pub mod document;
pub mod extract;
pub mod hash;
pub mod imaging;
pub mod incremental;
pub mod manifest;
pub mod naming;
pub mod outcome;
pub mod output;
pub mod pipeline;
pub mod storage;
pub mod timestamp;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;
