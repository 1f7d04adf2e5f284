//! Error handling module for mkvstrip

use std::path::PathBuf;

use thiserror::Error;

use crate::domain::errors::DomainError;

/// Main error type for mkvstrip operations
#[derive(Error, Debug)]
pub enum StripError {
    /// Failure reported by the domain layer or an adapter
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// Processing of a single file failed
    #[error("Failed to process {path}: {source}")]
    File {
        path: PathBuf,
        #[source]
        source: DomainError,
    },

    /// Some files of a run failed
    #[error("{failed} of {total} file(s) failed")]
    RunFailed { failed: usize, total: usize },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON rendering error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML rendering error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl StripError {
    pub fn file(path: impl Into<PathBuf>, source: DomainError) -> Self {
        StripError::File {
            path: path.into(),
            source,
        }
    }
}

/// Result type alias for mkvstrip operations
pub type StripResult<T> = std::result::Result<T, StripError>;
