//! Error types for the compendium converter.
//!
//! Library crates use [`CompendiumError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

/// Top-level error type for all compendium operations.
#[derive(Debug, thiserror::Error)]
pub enum CompendiumError {
    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// JSON (de)serialization of category dumps.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// An entry reached conversion without raw content.
    #[error("{entry} ({category}) has no content")]
    MissingContent { entry: String, category: String },

    /// Sorted entry count disagrees with the category's total entry count.
    #[error("sorted entry count mismatch with total in {category}: sorted {sorted}, total {total}")]
    CountMismatch {
        category: String,
        sorted: usize,
        total: usize,
    },

    /// A background conversion task failed to complete.
    #[error("task error: {0}")]
    Task(String),
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, CompendiumError>;

impl CompendiumError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
