//! HTTP fetcher implementation
//!
//! This module defines the [`Fetcher`] seam the pipeline depends on and the
//! production implementation over `reqwest`, including:
//! - Building HTTP clients with the configured user agent and timeouts
//! - Error classification into [`FetchCause`]
//! - Bounded retries for transient failures

use crate::config::HttpConfig;
use async_trait::async_trait;
use reqwest::{redirect::Policy, Client};
use std::time::Duration;
use thiserror::Error;

/// Maximum redirect hops followed for a single request
const MAX_REDIRECTS: usize = 10;

/// Raw page content returned by a successful fetch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawContent {
    /// Final URL after redirects
    pub final_url: String,

    /// HTTP status code
    pub status: u16,

    /// Page body
    pub body: String,
}

impl RawContent {
    /// Builds content for a URL that was served directly with status 200
    pub fn new(url: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            final_url: url.into(),
            status: 200,
            body: body.into(),
        }
    }
}

/// Why a fetch failed
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchCause {
    #[error("HTTP status {0}")]
    Status(u16),

    #[error("request timed out")]
    Timeout,

    #[error("connection failed: {0}")]
    Connect(String),

    #[error("failed to read body: {0}")]
    Body(String),

    #[error("transport error: {0}")]
    Transport(String),
}

impl FetchCause {
    /// Returns true for failures worth another attempt
    ///
    /// | Condition | Action |
    /// |-----------|--------|
    /// | HTTP 5xx | Retry |
    /// | Timeout | Retry |
    /// | HTTP 4xx (incl. 404, 429) | Fail immediately |
    /// | Connection refused, TLS | Fail immediately |
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Status(code) => *code >= 500,
            Self::Timeout => true,
            _ => false,
        }
    }

    fn from_reqwest(error: &reqwest::Error) -> Self {
        if error.is_timeout() {
            Self::Timeout
        } else if error.is_connect() {
            Self::Connect(error.to_string())
        } else if error.is_body() || error.is_decode() {
            Self::Body(error.to_string())
        } else {
            Self::Transport(error.to_string())
        }
    }
}

/// A failed retrieval of one URL
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("failed to fetch {url}: {cause}")]
pub struct FetchFailure {
    pub url: String,
    pub cause: FetchCause,
}

impl FetchFailure {
    pub fn new(url: impl Into<String>, cause: FetchCause) -> Self {
        Self {
            url: url.into(),
            cause,
        }
    }
}

/// Retrieves the raw content of a single URL
///
/// Implementations are shared by every worker, so they must be `Send + Sync`
/// and must not rely on per-call mutable state.
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<RawContent, FetchFailure>;
}

/// Builds an HTTP client with proper configuration
///
/// # Example
///
/// ```no_run
/// use reel_bulk::config::HttpConfig;
/// use reel_bulk::crawler::build_http_client;
///
/// let client = build_http_client(&HttpConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &HttpConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent.as_str())
        .timeout(Duration::from_secs(config.timeout_secs))
        .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
        .redirect(Policy::limited(MAX_REDIRECTS))
        .gzip(true)
        .brotli(true)
        .build()
}

/// [`Fetcher`] backed by a `reqwest` client
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
    retries: u32,
    retry_delay: Duration,
}

impl HttpFetcher {
    /// Creates a fetcher from HTTP configuration
    pub fn new(config: &HttpConfig) -> Result<Self, reqwest::Error> {
        let client = build_http_client(config)?;
        Ok(Self::with_client(
            client,
            config.retries,
            Duration::from_millis(config.retry_delay_ms),
        ))
    }

    /// Creates a fetcher around an existing client
    pub fn with_client(client: Client, retries: u32, retry_delay: Duration) -> Self {
        Self {
            client,
            retries,
            retry_delay,
        }
    }

    async fn fetch_once(&self, url: &str) -> Result<RawContent, FetchCause> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| FetchCause::from_reqwest(&e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchCause::Status(status.as_u16()));
        }

        let final_url = response.url().to_string();
        let body = response
            .text()
            .await
            .map_err(|e| FetchCause::Body(e.to_string()))?;

        Ok(RawContent {
            final_url,
            status: status.as_u16(),
            body,
        })
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<RawContent, FetchFailure> {
        let mut attempt = 0;
        loop {
            match self.fetch_once(url).await {
                Ok(content) => return Ok(content),
                Err(cause) if cause.is_retryable() && attempt < self.retries => {
                    attempt += 1;
                    tracing::debug!(
                        "Retrying {} after {} (attempt {}/{})",
                        url,
                        cause,
                        attempt,
                        self.retries
                    );
                    tokio::time::sleep(self.retry_delay).await;
                }
                Err(cause) => return Err(FetchFailure::new(url, cause)),
            }
        }
    }
}
