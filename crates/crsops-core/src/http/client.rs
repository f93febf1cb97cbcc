//! Blocking client for the transform code service
//!
//! One GET per fetch, no retry and no caching: every operation construction
//! downloads its source again.

use std::time::Duration;

use reqwest::blocking::Client as ReqwestClient;
use tracing::{debug, instrument};

use crate::error::{Error, Result};
use crate::http::{HttpError, RequestBuilder};
use crate::types::{FetchedSource, OperationRequest};

/// Anything able to produce operation source code for a request
pub trait CodeSource {
    /// Retrieve the source text for `request` in the requested dialect
    fn fetch(&self, request: &OperationRequest) -> Result<FetchedSource>;

    /// Identity of the code generator, recorded as the operation vendor
    fn vendor(&self) -> &str;
}

/// Configuration for the HTTP client
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// Whole-request timeout; `None` blocks until the service answers
    pub timeout: Option<Duration>,
    /// User-Agent header value
    pub user_agent: String,
    /// Whether to validate TLS certificates
    pub validate_tls: bool,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            timeout: None,
            user_agent: format!("crsops/{}", crate::VERSION),
            validate_tls: true,
        }
    }
}

/// HTTP client for the code service
#[derive(Debug, Clone)]
pub struct TransformCodeClient {
    client: ReqwestClient,
    request_builder: RequestBuilder,
    vendor: String,
}

impl TransformCodeClient {
    /// Create a client for the service at `base_url`
    pub fn new(base_url: &str, config: HttpClientConfig) -> Result<Self> {
        let request_builder = RequestBuilder::new(base_url)?;

        let client = ReqwestClient::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.as_str())
            .danger_accept_invalid_certs(!config.validate_tls)
            .build()
            .map_err(|e| Error::Configuration {
                message: format!("Failed to create HTTP client: {}", e),
                source: Some(e.into()),
            })?;

        Ok(Self {
            client,
            vendor: request_builder.base_url().to_string(),
            request_builder,
        })
    }

    /// Create with default configuration
    pub fn with_default_config(base_url: &str) -> Result<Self> {
        Self::new(base_url, HttpClientConfig::default())
    }

    /// Download the operation source for a request
    #[instrument(skip_all, fields(format = %request.format()))]
    pub fn fetch(&self, request: &OperationRequest) -> Result<FetchedSource> {
        let url = self.request_builder.build_url(request);
        debug!(base_url = %self.request_builder.base_url(), "Requesting operation source");

        let response = self
            .client
            .get(url)
            .send()
            .map_err(|e| Error::from(HttpError::from_request_error(&e)))?;

        let status = response.status();
        let body = response
            .text()
            .map_err(|e| Error::from(HttpError::from_request_error(&e)))?;

        if !status.is_success() {
            return Err(HttpError::from_status(status, &body).into());
        }

        debug!(status = status.as_u16(), bytes = body.len(), "Operation source received");
        Ok(FetchedSource::new(body, request.format()))
    }
}

impl CodeSource for TransformCodeClient {
    fn fetch(&self, request: &OperationRequest) -> Result<FetchedSource> {
        TransformCodeClient::fetch(self, request)
    }

    fn vendor(&self) -> &str {
        &self.vendor
    }
}
