//! Outbound HTTP plumbing shared by every upstream client.
//!
//! All network access goes through the [`Transport`] trait so that timeout
//! and retry policy live in one place ([`RetryingTransport`]) and tests can
//! substitute a [`MockTransport`].
//!
//! # Example
//!
//! ```
//! use ferro_bed::http::{get_json, MockTransport};
//!
//! let transport = MockTransport::new();
//! transport.respond_json("https://example.org/items", &[], 200, "[1, 2, 3]");
//!
//! let items: Vec<u32> = get_json(&transport, "example", "https://example.org/items", &[]).unwrap();
//! assert_eq!(items, vec![1, 2, 3]);
//! assert_eq!(transport.request_count(), 1);
//! ```

mod client;
mod mock;
mod retry;

use std::sync::Arc;

use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::error::BedError;

pub use client::ReqwestTransport;
pub use mock::MockTransport;
pub use retry::{ClientStats, RetryPolicy, RetryingTransport};

/// Status and body of a completed request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// A request that never produced a response
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{msg}")]
pub struct TransportError {
    pub msg: String,
    /// The request hit the configured timeout
    pub timed_out: bool,
}

impl TransportError {
    pub fn new(msg: impl Into<String>) -> Self {
        Self {
            msg: msg.into(),
            timed_out: false,
        }
    }

    pub fn timeout(msg: impl Into<String>) -> Self {
        Self {
            msg: msg.into(),
            timed_out: true,
        }
    }
}

/// Blocking GET transport.
///
/// Non-success statuses are returned as responses, not errors; callers decide
/// what a 404 means for them.
pub trait Transport: Send + Sync {
    fn get(&self, url: &str, query: &[(&str, &str)]) -> Result<HttpResponse, TransportError>;
}

impl<T: Transport + ?Sized> Transport for Arc<T> {
    fn get(&self, url: &str, query: &[(&str, &str)]) -> Result<HttpResponse, TransportError> {
        (**self).get(url, query)
    }
}

impl<T: Transport + ?Sized> Transport for &T {
    fn get(&self, url: &str, query: &[(&str, &str)]) -> Result<HttpResponse, TransportError> {
        (**self).get(url, query)
    }
}

/// Shared, type-erased transport handed to every client
pub type SharedTransport = Arc<dyn Transport>;

/// GET a URL and decode a JSON body.
///
/// `service` names the upstream in error messages.
pub fn get_json<T, R>(
    transport: &R,
    service: &str,
    url: &str,
    query: &[(&str, &str)],
) -> Result<T, BedError>
where
    T: DeserializeOwned,
    R: Transport + ?Sized,
{
    let response = transport.get(url, query).map_err(|e| BedError::Http {
        service: service.to_string(),
        msg: e.msg,
        timed_out: e.timed_out,
    })?;

    if !response.is_success() {
        return Err(BedError::HttpStatus {
            service: service.to_string(),
            status: response.status,
        });
    }

    serde_json::from_str(&response.body).map_err(|e| BedError::MalformedResponse {
        service: service.to_string(),
        msg: e.to_string(),
    })
}

/// Render a URL with its query string, used for logging and mock keys.
pub fn render_url(url: &str, query: &[(&str, &str)]) -> String {
    if query.is_empty() {
        return url.to_string();
    }
    let params: Vec<String> = query.iter().map(|(k, v)| format!("{}={}", k, v)).collect();
    format!("{}?{}", url, params.join("&"))
}
