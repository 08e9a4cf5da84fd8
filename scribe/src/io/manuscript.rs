//! Outline input and manuscript output files.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::debug;

use crate::io::atomic::write_atomic;

/// Default output file for `scribe write`.
pub const DEFAULT_MANUSCRIPT_PATH: &str = "final_book.md";

/// Read the outline document (UTF-8).
pub fn read_outline(path: &Path) -> Result<String> {
    let outline =
        fs::read_to_string(path).with_context(|| format!("read outline {}", path.display()))?;
    debug!(path = %path.display(), bytes = outline.len(), "outline loaded");
    Ok(outline)
}

/// Write the finished manuscript atomically.
pub fn write_manuscript(path: &Path, manuscript: &str) -> Result<()> {
    debug!(path = %path.display(), bytes = manuscript.len(), "writing manuscript");
    write_atomic(path, manuscript).with_context(|| format!("write manuscript {}", path.display()))
}
