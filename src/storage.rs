//! Write-once, content-addressed asset directory.
//!
//! Asset filenames are derived deterministically from the game they belong
//! to, so an existing file is treated as proof of a previous successful write
//! and is never overwritten. To make that assumption hold across crashes,
//! every write goes to a temporary file in the same directory and is renamed
//! into place; a reader can see the old state or the complete new file, never
//! a truncated one.
//!
//! Two writers racing on the same name both rename identical content over
//! the same path. The loser's work is wasted, nothing more.

use std::fmt;
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

/// Prefix of in-flight temporary files.
const PARTIAL_PREFIX: &str = ".partial-";

/// Write a file atomically: `write` fills a temporary sibling, which is then
/// renamed over `path`.
pub fn write_atomic_with<E>(
    path: &Path,
    write: impl FnOnce(&mut File) -> Result<(), E>,
) -> Result<(), E>
where
    E: From<io::Error>,
{
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut tmp = tempfile::Builder::new()
        .prefix(PARTIAL_PREFIX)
        .tempfile_in(dir)?;
    write(tmp.as_file_mut())?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(io::Error::from)?;
    Ok(())
}

/// Write bytes to `path` atomically.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> io::Result<()> {
    write_atomic_with(path, |file| io::Write::write_all(file, bytes))
}

/// Flat directory of materialized images.
#[derive(Debug, Clone)]
pub struct AssetStore {
    dir: PathBuf,
}

impl AssetStore {
    /// Open (creating if needed) the asset directory.
    pub fn open(dir: impl Into<PathBuf>) -> io::Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path(&self, filename: &str) -> PathBuf {
        self.dir.join(filename)
    }

    /// Whether an asset with this name has already been written.
    pub fn contains(&self, filename: &str) -> bool {
        self.path(filename).is_file()
    }

    pub fn write(&self, filename: &str, bytes: &[u8]) -> io::Result<()> {
        write_atomic(&self.path(filename), bytes)
    }

    pub fn read(&self, filename: &str) -> io::Result<Vec<u8>> {
        std::fs::read(self.path(filename))
    }
}

/// Whether a materialization wrote a new file or found one in place.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetStatus {
    Existing,
    Written,
}

/// Asset write counts for a run (or one document).
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct AssetStats {
    pub written: u32,
    pub existing: u32,
}

impl AssetStats {
    pub fn record(&mut self, status: AssetStatus) {
        match status {
            AssetStatus::Existing => self.existing += 1,
            AssetStatus::Written => self.written += 1,
        }
    }

    pub fn merge(&mut self, other: AssetStats) {
        self.written += other.written;
        self.existing += other.existing;
    }

    pub fn total(&self) -> u32 {
        self.written + self.existing
    }
}

impl fmt::Display for AssetStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.existing > 0 {
            write!(
                f,
                "{} written, {} already present ({} total)",
                self.written,
                self.existing,
                self.total()
            )
        } else {
            write!(f, "{} written", self.written)
        }
    }
}
