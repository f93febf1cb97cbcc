//! HTTP access to the transform code service
//!
//! - URL construction from operation requests
//! - Blocking client with a single round trip per fetch
//! - Status and transport error classification

pub mod builder;
pub mod client;
pub mod error;

pub use builder::RequestBuilder;
pub use client::{CodeSource, HttpClientConfig, TransformCodeClient};
pub use error::{ErrorClassification, HttpError};

// Re-export commonly used types
pub use reqwest::StatusCode;
pub use url::Url;
