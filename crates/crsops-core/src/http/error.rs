//! HTTP error classification
//!
//! Normalizes transport failures and non-success responses from the code
//! service into a uniform error, converted to [`crate::Error::Network`].

use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Longest body excerpt kept in an error message
const BODY_EXCERPT_LEN: usize = 200;

/// Classification of HTTP failures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorClassification {
    /// Client errors (4xx), usually an unknown reference system
    ClientError,
    /// Server errors (5xx)
    ServerError,
    /// Connection could not be established
    ConnectionError,
    /// Request or connection timed out
    Timeout,
    /// Anything else
    Unknown,
}

/// Normalized HTTP error representation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpError {
    /// HTTP status code if available
    pub status_code: Option<u16>,
    pub classification: ErrorClassification,
    /// Human-readable error message
    pub message: String,
}

impl HttpError {
    /// Create from a non-success status and the response body
    pub fn from_status(status: StatusCode, body: &str) -> Self {
        let excerpt: String = body.trim().chars().take(BODY_EXCERPT_LEN).collect();
        let reason = status.canonical_reason().unwrap_or("Unknown status");
        let message = if excerpt.is_empty() {
            format!("code service answered {} {}", status.as_u16(), reason)
        } else {
            format!("code service answered {} {}: {}", status.as_u16(), reason, excerpt)
        };

        Self {
            status_code: Some(status.as_u16()),
            classification: Self::classify_status(status),
            message,
        }
    }

    /// Create from a transport error
    pub fn from_request_error(error: &reqwest::Error) -> Self {
        let classification = if error.is_timeout() {
            ErrorClassification::Timeout
        } else if error.is_connect() {
            ErrorClassification::ConnectionError
        } else {
            ErrorClassification::Unknown
        };

        Self {
            status_code: error.status().map(|s| s.as_u16()),
            classification,
            message: error.to_string(),
        }
    }

    fn classify_status(status: StatusCode) -> ErrorClassification {
        match status.as_u16() {
            400..=499 => ErrorClassification::ClientError,
            500..=599 => ErrorClassification::ServerError,
            _ => ErrorClassification::Unknown,
        }
    }
}

impl fmt::Display for HttpError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "HTTP Error [{}]: {} (classification: {:?})",
            self.status_code
                .map(|c| c.to_string())
                .unwrap_or_else(|| "N/A".to_string()),
            self.message,
            self.classification
        )
    }
}

impl std::error::Error for HttpError {}

impl From<HttpError> for crate::Error {
    fn from(http_error: HttpError) -> Self {
        crate::Error::Network {
            message: http_error.message.clone(),
            status_code: http_error.status_code,
            source: Some(http_error.into()),
        }
    }
}
