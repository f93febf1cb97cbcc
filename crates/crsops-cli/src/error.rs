//! Error types and handling for the CLI
//!
//! This module provides error types and utilities for handling
//! various failure modes in the CLI application.

use std::io;
use std::path::PathBuf;

/// Result type alias for CLI operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for CLI operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// IO error (file operations, etc.)
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Error from crsops-core
    #[error("{0}")]
    Core(#[from] crsops_core::Error),

    /// File not found
    #[error("File not found: {}", path.display())]
    FileNotFound { path: PathBuf },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid argument value
    #[error("Invalid arguments: {0}")]
    InvalidArgs(String),

    /// Coordinates that could not be read
    #[error("Invalid point '{input}': {message}")]
    InvalidPoint { input: String, message: String },

    /// Some points could not be transformed
    #[error("{failed} of {total} point(s) failed to transform")]
    PointsFailed { failed: usize, total: usize },

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML serialization/deserialization error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Generic error with context
    #[error("{message}")]
    Other { message: String },
}

impl Error {
    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create an invalid arguments error
    pub fn invalid_args(message: impl Into<String>) -> Self {
        Self::InvalidArgs(message.into())
    }

    /// Create a generic error with message
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other {
            message: message.into(),
        }
    }

    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Io(_) => 1,
            Self::Core(_) => 2,
            Self::FileNotFound { .. } => 3,
            Self::Config(_) => 5,
            Self::InvalidArgs(_) => 6,
            Self::InvalidPoint { .. } => 7,
            Self::PointsFailed { .. } => 8,
            Self::Json(_) => 12,
            Self::Yaml(_) => 13,
            Self::Other { .. } => 99,
        }
    }

    /// Check if this error should display usage help
    pub fn should_show_help(&self) -> bool {
        matches!(self, Self::InvalidArgs(_) | Self::InvalidPoint { .. })
    }
}

/// Extension trait for adding context to errors
pub trait ErrorContext<T> {
    /// Add context to an error
    fn context(self, msg: &str) -> Result<T>;

    /// Add context with a closure (only evaluated on error)
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;
}

impl<T, E> ErrorContext<T> for std::result::Result<T, E>
where
    E: Into<Error>,
{
    fn context(self, msg: &str) -> Result<T> {
        self.map_err(|e| {
            let inner = e.into();
            Error::Other {
                message: format!("{}: {}", msg, inner),
            }
        })
    }

    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| {
            let inner = e.into();
            Error::Other {
                message: format!("{}: {}", f(), inner),
            }
        })
    }
}

/// Format an error for display to the user
pub fn format_error(error: &Error, use_color: bool) -> String {
    let mut message = if use_color {
        use colored::Colorize;
        format!("{} {}", "Error:".red().bold(), error)
    } else {
        format!("Error: {}", error)
    };

    // Name the failing stage when an operation could not be built
    if let Error::Core(core) = error {
        if core.kind() != core.cause_kind() {
            message.push_str(&format!("\n  stage: {}", core.cause_kind()));
        }
        if let Some(status) = core.status_code() {
            message.push_str(&format!("\n  HTTP status: {}", status));
        }
    }

    message
}

#[cfg(test)]
mod tests {
    use super::*;
    use crsops_core::Error as CoreError;

    #[test]
    fn test_exit_codes() {
        assert_eq!(Error::config("x").exit_code(), 5);
        assert_eq!(Error::PointsFailed { failed: 1, total: 2 }.exit_code(), 8);
        assert_eq!(Error::from(CoreError::unsupported("derivative")).exit_code(), 2);
        assert!(Error::invalid_args("x").should_show_help());
        assert!(!Error::other("x").should_show_help());
    }

    #[test]
    fn test_format_construction_failure() {
        let core = CoreError::construction_failed(CoreError::network("code service answered 503", Some(503)));
        let formatted = format_error(&Error::from(core), false);

        assert!(formatted.starts_with("Error: Operation construction failed: Network error"));
        assert!(formatted.contains("stage: Network"));
        assert!(formatted.contains("HTTP status: 503"));
    }

    #[test]
    fn test_context_prefixes_message() {
        let result: std::result::Result<(), io::Error> =
            Err(io::Error::new(io::ErrorKind::NotFound, "gone"));
        let err = result.context("reading source WKT").unwrap_err();
        assert_eq!(err.to_string(), "reading source WKT: IO error: gone");
    }
}
