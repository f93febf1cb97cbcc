//! Error types for the crsops core library
//!
//! Every stage of the fetch, select, compile and invoke pipeline reports
//! failures through [`Error`]. The operation factory folds stage errors into
//! [`Error::OperationConstructionFailed`] while keeping the original error as
//! its source, so callers can still tell stages apart through
//! [`Error::cause_kind`].

use std::fmt;
use thiserror::Error;
use serde::{Deserialize, Serialize};

use crate::types::FormatTag;

/// Main error type for crsops operations
#[derive(Error, Debug)]
pub enum Error {
    /// Transport failure or non-success HTTP status from the code service
    #[error("Network error: {message}")]
    Network {
        message: String,
        status_code: Option<u16>,
        #[source]
        source: Option<anyhow::Error>,
    },

    /// Format tag is not one of the recognized dialects, or its support is not compiled in
    #[error("Unsupported format: {format}")]
    UnsupportedFormat {
        format: String,
    },

    /// An interpreter session could not be started
    #[error("{dialect} interpreter unavailable: {message}")]
    SessionUnavailable {
        dialect: FormatTag,
        message: String,
    },

    /// Foreign source failed to evaluate
    #[error("{dialect} compilation failed: {message}")]
    Compilation {
        dialect: FormatTag,
        message: String,
    },

    /// The evaluated source did not provide the expected callable
    #[error("{dialect} source does not define a callable '{name}'")]
    MissingCallable {
        dialect: FormatTag,
        name: String,
    },

    /// Runtime failure or non-numeric result while invoking the operation
    #[error("{dialect} execution failed: {message}")]
    ScriptExecution {
        dialect: FormatTag,
        message: String,
    },

    /// The operation returned fewer coordinates than the target dimension
    #[error("Result has {actual} coordinates, expected at least {expected}")]
    ResultShape {
        expected: usize,
        actual: usize,
    },

    /// Input point does not match the source dimension
    #[error("Point has {actual} coordinates, expected {expected}")]
    DimensionMismatch {
        expected: usize,
        actual: usize,
    },

    /// Capability deliberately not provided (derivatives, method-based operations, ...)
    #[error("Unsupported operation: {message}")]
    UnsupportedOperation {
        message: String,
        feature: Option<String>,
    },

    /// Reference system descriptor rejected at construction
    #[error("Invalid reference system: {message}")]
    InvalidDescriptor {
        message: String,
    },

    /// Client configuration errors (base URL, TLS setup, ...)
    #[error("Configuration error: {message}")]
    Configuration {
        message: String,
        #[source]
        source: Option<anyhow::Error>,
    },

    /// Any pipeline failure surfaced by the operation factory
    #[error("Operation construction failed: {message}")]
    OperationConstructionFailed {
        message: String,
        #[source]
        source: Box<Error>,
    },
}

/// Convenience type alias for Results using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Field-less discriminant of [`Error`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    Network,
    UnsupportedFormat,
    SessionUnavailable,
    Compilation,
    MissingCallable,
    ScriptExecution,
    ResultShape,
    DimensionMismatch,
    UnsupportedOperation,
    InvalidDescriptor,
    Configuration,
    OperationConstructionFailed,
}

impl Error {
    /// Wrap a pipeline error into the single outward-facing construction error
    pub fn construction_failed(error: Error) -> Self {
        Error::OperationConstructionFailed {
            message: error.to_string(),
            source: Box::new(error),
        }
    }

    /// Create an unsupported operation error for a named capability
    pub fn unsupported(feature: &str) -> Self {
        Error::UnsupportedOperation {
            message: format!("{} is not supported", feature),
            feature: Some(feature.to_string()),
        }
    }

    /// Create a network error without an underlying transport error
    pub fn network(message: impl Into<String>, status_code: Option<u16>) -> Self {
        Error::Network {
            message: message.into(),
            status_code,
            source: None,
        }
    }

    /// Discriminant of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Network { .. } => ErrorKind::Network,
            Error::UnsupportedFormat { .. } => ErrorKind::UnsupportedFormat,
            Error::SessionUnavailable { .. } => ErrorKind::SessionUnavailable,
            Error::Compilation { .. } => ErrorKind::Compilation,
            Error::MissingCallable { .. } => ErrorKind::MissingCallable,
            Error::ScriptExecution { .. } => ErrorKind::ScriptExecution,
            Error::ResultShape { .. } => ErrorKind::ResultShape,
            Error::DimensionMismatch { .. } => ErrorKind::DimensionMismatch,
            Error::UnsupportedOperation { .. } => ErrorKind::UnsupportedOperation,
            Error::InvalidDescriptor { .. } => ErrorKind::InvalidDescriptor,
            Error::Configuration { .. } => ErrorKind::Configuration,
            Error::OperationConstructionFailed { .. } => ErrorKind::OperationConstructionFailed,
        }
    }

    /// Kind of the stage error behind a construction failure, or this error's own kind
    pub fn cause_kind(&self) -> ErrorKind {
        match self {
            Error::OperationConstructionFailed { source, .. } => source.cause_kind(),
            other => other.kind(),
        }
    }

    /// HTTP status code, when the code service answered with one
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Error::Network { status_code, .. } => *status_code,
            Error::OperationConstructionFailed { source, .. } => source.status_code(),
            _ => None,
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}
