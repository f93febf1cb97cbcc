//! Request URL builder for the code service
//!
//! Places both WKT definitions and the format tag in the query string of the
//! configured base URL.

use url::Url;

use crate::error::{Error, Result};
use crate::types::OperationRequest;

/// Builder for operation request URLs
#[derive(Debug, Clone)]
pub struct RequestBuilder {
    base_url: Url,
}

impl RequestBuilder {
    /// Create a builder for an `http` or `https` base URL
    pub fn new(base_url: &str) -> Result<Self> {
        let base_url = Url::parse(base_url).map_err(|e| Error::Configuration {
            message: format!("Invalid base URL: {}", base_url),
            source: Some(e.into()),
        })?;

        match base_url.scheme() {
            "http" | "https" => Ok(Self { base_url }),
            scheme => Err(Error::Configuration {
                message: format!("Unsupported URL scheme '{}' for code service", scheme),
                source: None,
            }),
        }
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Build the GET URL for a request
    ///
    /// Values are form-urlencoded; optional hints follow the three required
    /// parameters and are only present when set.
    pub fn build_url(&self, request: &OperationRequest) -> Url {
        let mut url = self.base_url.clone();
        {
            let mut query = url.query_pairs_mut();
            query
                .append_pair("source", request.source().wkt())
                .append_pair("target", request.target().wkt())
                .append_pair("format", request.format().mime_type());
            for (key, value) in request.hints().query_pairs() {
                query.append_pair(key, &value);
            }
        }
        url
    }
}
