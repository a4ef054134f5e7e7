//! Blocking reqwest transport.

use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};

use super::{HttpResponse, Transport, TransportError};
use crate::config::HttpConfig;
use crate::error::BedError;

/// [`Transport`] backed by a blocking reqwest client.
///
/// Every request carries the configured timeout and asks for JSON.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    /// Create a transport from HTTP configuration.
    pub fn new(config: &HttpConfig) -> Result<Self, BedError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .connect_timeout(Duration::from_secs(config.connect_timeout_seconds))
            .user_agent(config.user_agent.clone())
            .default_headers(headers)
            .gzip(true)
            .build()
            .map_err(|e| BedError::InvalidConfig {
                msg: format!("Failed to create HTTP client: {}", e),
            })?;

        Ok(Self { client })
    }
}

impl Transport for ReqwestTransport {
    fn get(&self, url: &str, query: &[(&str, &str)]) -> Result<HttpResponse, TransportError> {
        let response = self
            .client
            .get(url)
            .query(query)
            .send()
            .map_err(|e| {
                if e.is_timeout() {
                    TransportError::timeout(format!("request timed out: {}", e))
                } else {
                    TransportError::new(format!("HTTP request failed: {}", e))
                }
            })?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .map_err(|e| TransportError::new(format!("Failed to read response body: {}", e)))?;

        Ok(HttpResponse { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_from_default_config() {
        assert!(ReqwestTransport::new(&HttpConfig::default()).is_ok());
    }
}
