//! CLI command implementations.

pub mod export;
pub mod merge;
pub mod stats;
pub mod validate;

use std::path::{Path, PathBuf};

/// Use `explicit` when the flag carried a value, else the default path.
pub(crate) fn resolve_optional_path(
    explicit: Option<PathBuf>,
    default: impl FnOnce() -> PathBuf,
) -> PathBuf {
    explicit.unwrap_or_else(default)
}

/// Fail early with a readable message when an input file is missing.
pub(crate) fn require_file(path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    if !path.exists() {
        return Err(format!("File not found: {}", path.display()).into());
    }
    Ok(())
}
