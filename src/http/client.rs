//! HTTP transport backed by reqwest
//!
//! Handles:
//! - Client-side throttling before every request
//! - Retries with backoff for timeouts and connection failures
//! - Status classification into [`ApiError`] kinds
//! - Decoding the body into a [`ResponseEnvelope`]
//!
//! A 429 is never retried here. It is reported as [`ApiError::RateLimited`]
//! so the pagination cursor can apply its own sleep-and-retry-once policy.

use super::rate_limit::RateLimiter;
use crate::config::{BackoffType, ClientConfig};
use crate::error::ApiError;
use crate::transport::Transport;
use crate::types::{JsonValue, ResponseEnvelope, StringMap};
use async_trait::async_trait;
use reqwest::header::HeaderMap;
use reqwest::{Client, StatusCode};
use std::time::Duration;
use tracing::{debug, error, warn};

/// Twitter-style reset header: epoch seconds when the window reopens
const RATE_LIMIT_RESET_HEADER: &str = "x-rate-limit-reset";

/// HTTP implementation of [`Transport`]
pub struct HttpTransport {
    client: Client,
    config: ClientConfig,
    rate_limiter: Option<RateLimiter>,
}

impl HttpTransport {
    /// Create a transport from client config
    pub fn new(config: ClientConfig) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.http.timeout_seconds))
            .user_agent(&config.http.user_agent)
            .build()?;

        let rate_limiter = RateLimiter::from_config(&config.http.rate_limit);

        Ok(Self {
            client,
            config,
            rate_limiter,
        })
    }

    /// Get the client config
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Check if client-side throttling is enabled
    pub fn has_rate_limiter(&self) -> bool {
        self.rate_limiter.is_some()
    }

    /// Calculate backoff delay for a given attempt
    pub fn calculate_backoff(&self, attempt: u32) -> Duration {
        let backoff = &self.config.http.retry_backoff;
        let initial = Duration::from_millis(backoff.initial_ms);
        let delay = match backoff.backoff_type {
            BackoffType::Constant => initial,
            BackoffType::Linear => initial * (attempt + 1),
            BackoffType::Exponential => initial * 2u32.saturating_pow(attempt),
        };

        std::cmp::min(delay, Duration::from_millis(backoff.max_ms))
    }

    async fn send(&self, url: &str, params: &StringMap) -> Result<reqwest::Response, ApiError> {
        let max_retries = self.config.http.max_retries;
        let mut attempt = 0;

        loop {
            if let Some(ref limiter) = self.rate_limiter {
                limiter.wait().await;
            }

            let mut req = self.client.get(url);
            if !params.is_empty() {
                req = req.query(params);
            }
            if let Some(ref token) = self.config.bearer_token {
                req = req.bearer_auth(token);
            }

            match req.send().await {
                Ok(response) => return Ok(response),
                Err(e) if (e.is_timeout() || e.is_connect()) && attempt < max_retries => {
                    let delay = self.calculate_backoff(attempt);
                    warn!(
                        "Request to {} failed ({}), attempt {}/{}, retrying in {:?}",
                        url,
                        e,
                        attempt + 1,
                        max_retries + 1,
                        delay
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) if e.is_timeout() => {
                    return Err(ApiError::Timeout {
                        timeout_ms: self.config.http.timeout_seconds * 1000,
                    });
                }
                Err(e) => return Err(ApiError::Http(e)),
            }
        }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(&self, slug: &str, params: &StringMap) -> Result<ResponseEnvelope, ApiError> {
        let url = self.config.endpoint_url(slug);
        debug!("GET {} with {} params", url, params.len());

        let response = self.send(&url, params).await?;
        let status = response.status();

        match status {
            StatusCode::OK | StatusCode::NOT_MODIFIED => {
                let body = response.text().await?;
                decode_envelope(&body)
            }
            StatusCode::FORBIDDEN => {
                let body = response.text().await.unwrap_or_default();
                error!("Error 403 from {}: {}", slug, body);
                Err(ApiError::Forbidden { body })
            }
            StatusCode::NOT_FOUND => {
                let body = response.text().await.unwrap_or_default();
                error!("Error 404 from {}: {}", slug, body);
                Err(ApiError::NotFound { body })
            }
            StatusCode::TOO_MANY_REQUESTS => {
                let retry_after = retry_after_seconds(
                    response.headers(),
                    chrono::Utc::now().timestamp(),
                );
                error!("Rate limited on {} (retry after {:?}s)", slug, retry_after);
                Err(ApiError::rate_limited(retry_after))
            }
            _ => {
                let body = response.text().await.unwrap_or_default();
                error!("API error {} from {}: {}", status.as_u16(), slug, body);
                Err(ApiError::general(status.as_u16(), body))
            }
        }
    }
}

impl std::fmt::Debug for HttpTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpTransport")
            .field("base_url", &self.config.base_url)
            .field("has_token", &self.config.bearer_token.is_some())
            .field("has_rate_limiter", &self.rate_limiter.is_some())
            .finish_non_exhaustive()
    }
}

/// Decode a success body into an envelope
pub(crate) fn decode_envelope(body: &str) -> Result<ResponseEnvelope, ApiError> {
    if body.trim().is_empty() {
        return Err(ApiError::malformed("empty response body"));
    }
    let value: JsonValue =
        serde_json::from_str(body).map_err(|e| ApiError::malformed(e.to_string()))?;
    ResponseEnvelope::from_value(value)
        .map_err(|other| ApiError::malformed(format!("unexpected JSON body: {other}")))
}

/// Seconds until a rate limit lifts.
///
/// Prefers the epoch `x-rate-limit-reset` header, falls back to a numeric
/// `retry-after`. `None` when neither is usable.
pub(crate) fn retry_after_seconds(headers: &HeaderMap, now_epoch: i64) -> Option<u64> {
    let header_i64 = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.trim().parse::<i64>().ok())
    };

    if let Some(reset) = header_i64(RATE_LIMIT_RESET_HEADER) {
        return Some(u64::try_from(reset.saturating_sub(now_epoch)).unwrap_or(0));
    }
    header_i64(reqwest::header::RETRY_AFTER.as_str()).map(|secs| u64::try_from(secs).unwrap_or(0))
}
