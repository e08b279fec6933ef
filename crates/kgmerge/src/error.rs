//! Error types for the kgmerge library.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for kgmerge operations.
#[derive(Debug, Error)]
pub enum KgMergeError {
    /// Error reading or accessing a file.
    #[error("IO error for '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// An entity record is missing required fields or breaks the type-list invariant.
    #[error("Malformed entity '{entity_id}' in '{source_name}': {reason}")]
    MalformedEntity {
        source_name: String,
        entity_id: String,
        reason: String,
    },

    /// The requested merge strategy does not exist.
    #[error("Unknown strategy: {0}. Use: union, intersection, confidence, or type.")]
    UnknownStrategy(String),

    /// A strategy parameter is missing or out of range.
    #[error("Invalid strategy parameter: {0}")]
    InvalidParameter(String),

    /// Nothing to merge.
    #[error("Empty input: {0}")]
    EmptyInput(String),

    /// Error saving or loading a collection.
    #[error("Persistence error: {0}")]
    Persistence(String),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Error from the CSV library.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl KgMergeError {
    /// Returns true if this error was raised by strategy validation.
    pub fn is_strategy_error(&self) -> bool {
        matches!(
            self,
            KgMergeError::UnknownStrategy(_) | KgMergeError::InvalidParameter(_)
        )
    }

    pub(crate) fn malformed(
        source_name: impl Into<String>,
        entity_id: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        KgMergeError::MalformedEntity {
            source_name: source_name.into(),
            entity_id: entity_id.into(),
            reason: reason.into(),
        }
    }
}

/// Result type alias for kgmerge operations.
pub type Result<T> = std::result::Result<T, KgMergeError>;
