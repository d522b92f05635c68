//! Error taxonomy for board operations.
//!
//! None of these are fatal: each one maps to a warning in the status line and
//! leaves the task list either untouched or demo-seeded.

use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;

/// Form input rejected before any mutation.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// The title is empty after trimming.
    #[error("title is required")]
    EmptyTitle,

    /// The title exceeds the board's limit.
    #[error("title must be at most {max} characters")]
    TitleTooLong { max: usize },

    /// The due date is not a `YYYY-MM-DD` calendar date.
    #[error("invalid due date '{0}', expected YYYY-MM-DD")]
    InvalidDueDate(String),
}

/// An import document that cannot be turned into a task list.
#[derive(Debug, Error)]
pub enum FormatError {
    /// The text is not valid JSON.
    #[error("could not parse JSON: {0}")]
    Parse(#[from] serde_json::Error),

    /// The JSON top level is something other than an array.
    #[error("expected a JSON array of tasks, found {0}")]
    NotAnArray(&'static str),
}

/// The document store could not be read or written.
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    /// The store is not reachable.
    #[error("task store unavailable: {0}")]
    Unavailable(String),

    /// The store answered but the operation failed.
    #[error("task store error: {0}")]
    Backend(Arc<dyn std::error::Error + Send + Sync>),
}

impl StoreError {
    /// Wraps a backend failure.
    pub fn backend(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Backend(Arc::new(err))
    }
}

/// Configuration could not be loaded.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    ReadFile {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file: {0}")]
    ParseToml(#[from] toml::de::Error),
}
