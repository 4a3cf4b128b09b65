//! Fantasy API client.
//!
//! Thin JSON client over the public fantasy football API. Transient failures
//! (transport errors, 5xx, 429) are retried with exponential backoff; every
//! request is preceded by a fixed politeness delay.

mod types;

pub use types::*;

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, info, warn};
use url::Url;

use crate::config::FetchConfig;

/// Errors that can occur during fetching.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Rate limited by {host}, retry after {retry_after_secs}s")]
    RateLimited { host: String, retry_after_secs: u64 },

    #[error("HTTP {status}: {message}")]
    HttpStatus { status: u16, message: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<url::ParseError> for FetchError {
    fn from(e: url::ParseError) -> Self {
        FetchError::InvalidUrl(e.to_string())
    }
}

/// Retry settings for transient failures.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub initial_delay_ms: u64,
    pub backoff_multiplier: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_delay_ms: 1000,
            backoff_multiplier: 2.0,
        }
    }
}

impl RetryPolicy {
    /// Wait before retry number `attempt` (0-based).
    pub fn delay(&self, attempt: u32) -> Duration {
        let factor = self.backoff_multiplier.powi(attempt as i32);
        Duration::from_millis((self.initial_delay_ms as f64 * factor) as u64)
    }
}

/// The endpoints the sync reads.
#[async_trait]
pub trait FantasyApi: Send + Sync {
    /// One page (1-based) of classic league standings.
    async fn standings_page(&self, league_id: u64, page: u32) -> Result<Standings, FetchError>;

    async fn entry_history(&self, entry_id: u64) -> Result<EntryHistory, FetchError>;

    /// Picks for one gameweek; `None` when the API has nothing for it.
    async fn entry_picks(&self, entry_id: u64, event: u32)
        -> Result<Option<EntryPicks>, FetchError>;

    async fn bootstrap(&self) -> Result<BootstrapStatic, FetchError>;
}

/// Configuration for the API client.
#[derive(Debug, Clone)]
pub struct FplClientConfig {
    pub base_url: Url,
    pub timeout: Duration,
    pub user_agent: String,
    /// Delay before every request
    pub request_delay: Duration,
    pub retry: RetryPolicy,
}

impl FplClientConfig {
    pub fn from_config(config: &FetchConfig) -> Result<Self, FetchError> {
        // `Url::join` drops the last path segment unless it ends in a slash.
        let mut base = config.base_url.trim().to_string();
        if !base.ends_with('/') {
            base.push('/');
        }

        Ok(Self {
            base_url: Url::parse(&base)?,
            timeout: Duration::from_secs(config.timeout_seconds),
            user_agent: format!("league-dash/{}", env!("CARGO_PKG_VERSION")),
            request_delay: Duration::from_millis(config.request_delay_ms),
            retry: RetryPolicy {
                max_retries: config.max_retries,
                ..RetryPolicy::default()
            },
        })
    }
}

/// HTTP client for the fantasy API.
pub struct FplClient {
    client: Client,
    config: FplClientConfig,
}

impl FplClient {
    pub fn new(config: FplClientConfig) -> Result<Self, FetchError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&config.user_agent)
                .unwrap_or_else(|_| HeaderValue::from_static("league-dash")),
        );

        let client = Client::builder()
            .timeout(config.timeout)
            .default_headers(headers)
            .build()?;

        Ok(Self { client, config })
    }

    pub fn standings_url(&self, league_id: u64, page: u32) -> Result<Url, FetchError> {
        let mut url = self
            .config
            .base_url
            .join(&format!("leagues-classic/{league_id}/standings/"))?;
        url.query_pairs_mut()
            .append_pair("page_new_entries", "1")
            .append_pair("page_standings", &page.to_string());
        Ok(url)
    }

    pub fn history_url(&self, entry_id: u64) -> Result<Url, FetchError> {
        Ok(self.config.base_url.join(&format!("entry/{entry_id}/history/"))?)
    }

    pub fn picks_url(&self, entry_id: u64, event: u32) -> Result<Url, FetchError> {
        Ok(self
            .config
            .base_url
            .join(&format!("entry/{entry_id}/event/{event}/picks/"))?)
    }

    pub fn bootstrap_url(&self) -> Result<Url, FetchError> {
        Ok(self.config.base_url.join("bootstrap-static/")?)
    }

    /// GET with retries. Any response that is not transient is returned as-is.
    async fn send(&self, url: &Url) -> Result<Response, FetchError> {
        let policy = &self.config.retry;
        let mut attempt = 0;

        loop {
            if !self.config.request_delay.is_zero() {
                tokio::time::sleep(self.config.request_delay).await;
            }
            debug!("GET {}", url);

            let error = match self.client.get(url.as_str()).send().await {
                Ok(resp) if resp.status() == StatusCode::TOO_MANY_REQUESTS => {
                    let retry_after_secs = resp
                        .headers()
                        .get("retry-after")
                        .and_then(|v| v.to_str().ok())
                        .and_then(|s| s.parse().ok())
                        .unwrap_or(60);
                    FetchError::RateLimited {
                        host: url.host_str().unwrap_or("unknown").to_string(),
                        retry_after_secs,
                    }
                }
                Ok(resp) if resp.status().is_server_error() => FetchError::HttpStatus {
                    status: resp.status().as_u16(),
                    message: resp
                        .status()
                        .canonical_reason()
                        .unwrap_or("Unknown")
                        .to_string(),
                },
                Ok(resp) => return Ok(resp),
                Err(e) => FetchError::Http(e),
            };

            if attempt >= policy.max_retries {
                return Err(error);
            }
            let wait = match &error {
                FetchError::RateLimited {
                    retry_after_secs, ..
                } => Duration::from_secs(*retry_after_secs).max(policy.delay(attempt)),
                _ => policy.delay(attempt),
            };
            warn!(
                "{} (attempt {}/{}), retrying in {:?}",
                error,
                attempt + 1,
                policy.max_retries,
                wait
            );
            tokio::time::sleep(wait).await;
            attempt += 1;
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &Url) -> Result<T, FetchError> {
        let response = self.send(url).await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::HttpStatus {
                status: status.as_u16(),
                message: status.canonical_reason().unwrap_or("Unknown").to_string(),
            });
        }
        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }
}

#[async_trait]
impl FantasyApi for FplClient {
    async fn standings_page(&self, league_id: u64, page: u32) -> Result<Standings, FetchError> {
        let url = self.standings_url(league_id, page)?;
        let response: StandingsResponse = self.get_json(&url).await?;
        info!(
            "League {} standings page {}: {} entries",
            league_id,
            page,
            response.standings.results.len()
        );
        Ok(response.standings)
    }

    async fn entry_history(&self, entry_id: u64) -> Result<EntryHistory, FetchError> {
        self.get_json(&self.history_url(entry_id)?).await
    }

    async fn entry_picks(
        &self,
        entry_id: u64,
        event: u32,
    ) -> Result<Option<EntryPicks>, FetchError> {
        let url = self.picks_url(entry_id, event)?;
        let response = self.send(&url).await?;
        if !response.status().is_success() {
            debug!("No picks for entry {} gameweek {} ({})", entry_id, event, response.status());
            return Ok(None);
        }
        let body = response.text().await?;
        Ok(Some(serde_json::from_str(&body)?))
    }

    async fn bootstrap(&self) -> Result<BootstrapStatic, FetchError> {
        self.get_json(&self.bootstrap_url()?).await
    }
}
