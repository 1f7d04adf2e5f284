// Domain errors - Error types for the domain layer

use std::fmt;

/// Domain-specific error types
#[derive(Debug, Clone, PartialEq)]
pub enum DomainError {
    /// Malformed or unrecognized track metadata
    InvalidInput(String),
    /// Policy matched no tracks of a type; reported as a warning, never fatal
    PolicyViolation(String),
    /// An internal invariant was broken (e.g. a track selected twice)
    ConsistencyViolation(String),
    /// An external tool (mediainfo, mkvmerge, ...) failed
    ExternalToolFailure { tool: String, message: String },
    /// File system operation failed
    FsFailure(String),
    /// Configuration could not be loaded or is invalid
    ConfigError(String),
}

impl DomainError {
    pub fn tool(tool: impl Into<String>, message: impl Into<String>) -> Self {
        DomainError::ExternalToolFailure {
            tool: tool.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for DomainError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DomainError::InvalidInput(msg) => write!(f, "Invalid input: {}", msg),
            DomainError::PolicyViolation(msg) => write!(f, "Policy violation: {}", msg),
            DomainError::ConsistencyViolation(msg) => {
                write!(f, "Consistency violation: {}", msg)
            }
            DomainError::ExternalToolFailure { tool, message } => {
                write!(f, "{} failed: {}", tool, message)
            }
            DomainError::FsFailure(msg) => write!(f, "File system error: {}", msg),
            DomainError::ConfigError(msg) => write!(f, "Configuration error: {}", msg),
        }
    }
}

impl std::error::Error for DomainError {}
