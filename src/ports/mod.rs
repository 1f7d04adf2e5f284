// Ports - Interface definitions (contracts)

use std::path::{Path, PathBuf};

use crate::domain::errors::*;
use crate::domain::model::*;
use crate::planner::EditPlan;

/// Port for reading track metadata from a container file
pub trait ProbePort: Send + Sync {
    /// Probe a file and return its complete track model
    fn probe(&self, path: &Path) -> Result<MediaFile, DomainError>;
}

/// Port for applying an edit plan with the external tools
pub trait ExecutePort: Send + Sync {
    /// Run every tool the plan needs. On failure the source file must be
    /// left as it was.
    fn run(&self, plan: &EditPlan) -> Result<(), DomainError>;

    /// Whether this executor only reports what it would do
    fn is_dry_run(&self) -> bool {
        false
    }
}

/// Options for input discovery
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DiscoveryOptions {
    /// Skip files modified less than this many hours ago
    pub min_age_hours: u64,
}

/// Port for file system operations around a run
pub trait FsPort: Send + Sync {
    /// Expand an input path (file or directory) into the files to process,
    /// in deterministic order
    fn discover(&self, path: &Path, options: &DiscoveryOptions) -> Result<Vec<PathBuf>, DomainError>;

    /// Create the temporary output directory if needed
    fn prepare_tmp_dir(&self, dir: &Path) -> Result<(), DomainError>;

    /// Replace `original` with the remuxed `temp` file under its edited name.
    /// `original` is only removed once `temp` is in place. Returns the final
    /// path.
    fn replace_original(&self, temp: &Path, original: &Path) -> Result<PathBuf, DomainError>;

    /// Rename a file edited in place to its edited name. Returns the final path.
    fn mark_processed(&self, path: &Path) -> Result<PathBuf, DomainError>;

    /// Remove a leftover temporary output, if present
    fn discard_temp(&self, temp: &Path) -> Result<(), DomainError>;
}

/// Log level enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    /// Parse log level from string
    pub fn parse(level_str: &str) -> Result<Self, DomainError> {
        match level_str.to_lowercase().as_str() {
            "trace" => Ok(LogLevel::Trace),
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" => Ok(LogLevel::Warn),
            "error" => Ok(LogLevel::Error),
            _ => Err(DomainError::ConfigError(format!(
                "Invalid log level: {}. Valid levels: trace, debug, info, warn, error",
                level_str
            ))),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl LogFormat {
    pub fn parse(format: &str) -> Result<Self, DomainError> {
        match format.to_lowercase().as_str() {
            "text" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            _ => Err(DomainError::ConfigError(format!(
                "Invalid log format: {}. Valid formats: text, json",
                format
            ))),
        }
    }
}
