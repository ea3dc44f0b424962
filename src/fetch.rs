//! Outbound HTTP transport.
//!
//! A thin trait over the HTTP client so the metadata fetcher and asset cache
//! can be exercised in tests without touching the network. The production
//! implementation wraps a single shared `reqwest` client with a bounded
//! per-request timeout and a browser-like User-Agent.

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;
use url::Url;

use crate::config::LinkCardConfig;

// ============================================================================
// Errors
// ============================================================================

/// Transport-level fetch failures.
///
/// Every variant degrades to "less enrichment" in the caller; none of them
/// propagate past a job boundary.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request timed out")]
    Timeout,

    #[error("server returned status {0}")]
    Status(u16),

    #[error("transport error: {0}")]
    Transport(String),
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else if let Some(status) = err.status() {
            Self::Status(status.as_u16())
        } else {
            Self::Transport(err.to_string())
        }
    }
}

// ============================================================================
// Transport
// ============================================================================

/// Abstract HTTP GET transport.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Fetch a URL and decode the body as text (HTML pages).
    async fn get_text(&self, url: &Url) -> Result<String, FetchError>;

    /// Fetch a URL and return the raw body bytes (binary assets).
    async fn get_bytes(&self, url: &Url) -> Result<Vec<u8>, FetchError>;
}

/// Production transport backed by `reqwest`.
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    /// Build a transport from the transform configuration.
    pub fn new(config: &LinkCardConfig) -> Result<Self, FetchError> {
        Self::with_options(config.user_agent(), config.timeout())
    }

    /// Build a transport with an explicit User-Agent and timeout.
    pub fn with_options(user_agent: &str, timeout: Duration) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get_text(&self, url: &Url) -> Result<String, FetchError> {
        let response = self
            .client
            .get(url.as_str())
            .send()
            .await?
            .error_for_status()?;
        Ok(response.text().await?)
    }

    async fn get_bytes(&self, url: &Url) -> Result<Vec<u8>, FetchError> {
        let response = self
            .client
            .get(url.as_str())
            .send()
            .await?
            .error_for_status()?;
        Ok(response.bytes().await?.to_vec())
    }
}
