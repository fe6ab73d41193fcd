//! Outbound HTTP capability
//!
//! The geocoder and the aggregator never own an HTTP client directly; they
//! receive an [`HttpFetch`] so tests can substitute a fake without touching
//! process-wide state.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, instrument, warn};

use crate::config::UpstreamConfig;

/// Failure of a single outbound GET
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Request to {url} failed: {message}")]
    Transport { url: String, message: String },

    #[error("Upstream returned HTTP {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Invalid JSON received from upstream: {0}")]
    Decode(String),
}

/// Fetches a URL and returns its JSON body
#[async_trait]
pub trait HttpFetch: Send + Sync {
    async fn get_json(&self, url: &str) -> Result<Value, FetchError>;
}

/// Open-Meteo error body, e.g. `{"error": true, "reason": "..."}`
#[derive(Debug, Deserialize)]
struct UpstreamErrorBody {
    reason: Option<String>,
    message: Option<String>,
}

/// [`HttpFetch`] backed by a shared `reqwest` client
#[derive(Debug, Clone)]
pub struct ReqwestFetcher {
    client: Client,
    timeout: Duration,
}

impl ReqwestFetcher {
    /// Build a client with the configured per-call timeout and user agent
    pub fn new(config: &UpstreamConfig) -> Result<Self, FetchError> {
        let timeout = Duration::from_secs(config.timeout_seconds.into());
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| FetchError::Transport {
                url: String::new(),
                message: format!("failed to create HTTP client: {e}"),
            })?;

        Ok(Self { client, timeout })
    }
}

#[async_trait]
impl HttpFetch for ReqwestFetcher {
    #[instrument(skip(self))]
    async fn get_json(&self, url: &str) -> Result<Value, FetchError> {
        let start = Instant::now();

        let response = self.client.get(url).send().await.map_err(|e| {
            let message = if e.is_timeout() {
                format!("timed out after {}s", self.timeout.as_secs())
            } else {
                e.to_string()
            };
            warn!("Outbound request failed: {}", message);
            FetchError::Transport {
                url: url.to_string(),
                message,
            }
        })?;

        let status = response.status();
        debug!(
            "HTTP response received: {} in {:.3}s",
            status,
            start.elapsed().as_secs_f64()
        );

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<UpstreamErrorBody>(&body)
                .ok()
                .and_then(|b| b.reason.or(b.message))
                .unwrap_or_else(|| status.canonical_reason().unwrap_or("Unknown error").to_string());
            warn!("Upstream returned {}: {}", status, message);
            return Err(FetchError::Status {
                status: status.as_u16(),
                message,
            });
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| FetchError::Decode(e.to_string()))
    }
}
