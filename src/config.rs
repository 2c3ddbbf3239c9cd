//! Client configuration
//!
//! [`ClientConfig`] is loaded from YAML and describes where the API lives,
//! how the HTTP transport behaves, and the default rate-limit policy.
//! [`PaginationPolicy`] is the per-iterator view of that config, resolved
//! against the [`ExecutionContext`] the caller runs in.

use crate::error::{Error, Result, ResultExt};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Environment variable consulted when the config file carries no token
pub const BEARER_TOKEN_ENV: &str = "TIMELINE_PAGER_BEARER_TOKEN";

// ============================================================================
// Top-Level Client Config
// ============================================================================

/// Complete client configuration loaded from YAML
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// API host, without the version segment
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// API version path segment (e.g. "1.1")
    #[serde(default = "default_api_version")]
    pub api_version: String,

    /// Suffix appended to every endpoint slug (e.g. ".json")
    #[serde(default = "default_result_format")]
    pub result_format: String,

    /// Application bearer token
    #[serde(default)]
    pub bearer_token: Option<String>,

    /// Sleep and retry once when rate limited. `None` means "context default".
    #[serde(default)]
    pub sleep_on_rate_limit: Option<bool>,

    /// Log every outgoing request with its parameters
    #[serde(default)]
    pub debug: bool,

    /// HTTP transport configuration
    #[serde(default)]
    pub http: HttpConfig,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_version: default_api_version(),
            result_format: default_result_format(),
            bearer_token: None,
            sleep_on_rate_limit: None,
            debug: false,
            http: HttpConfig::default(),
        }
    }
}

fn default_base_url() -> String {
    "https://api.twitter.com".to_string()
}

fn default_api_version() -> String {
    "1.1".to_string()
}

fn default_result_format() -> String {
    ".json".to_string()
}

impl ClientConfig {
    /// Parse config from a YAML string
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let mut config: Self = serde_yaml::from_str(yaml)?;
        config.apply_env();
        config.validate()?;
        Ok(config)
    }

    /// Load config from a YAML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        Self::from_yaml_str(&content)
    }

    /// Full URL of an endpoint slug
    pub fn endpoint_url(&self, slug: &str) -> String {
        let base = self.base_url.trim_end_matches('/');
        let slug = slug.trim_start_matches('/');
        if self.api_version.is_empty() {
            format!("{base}/{slug}{}", self.result_format)
        } else {
            let version = self.api_version.trim_matches('/');
            format!("{base}/{version}/{slug}{}", self.result_format)
        }
    }

    fn apply_env(&mut self) {
        if self.bearer_token.is_none() {
            self.bearer_token = std::env::var(BEARER_TOKEN_ENV)
                .ok()
                .filter(|token| !token.is_empty());
        }
    }

    fn validate(&self) -> Result<()> {
        url::Url::parse(&self.base_url)?;
        if self.http.rate_limit.requests_per_second == 0 {
            return Err(Error::config("http.rate_limit.requests_per_second must be > 0"));
        }
        Ok(())
    }
}

// ============================================================================
// HTTP Config
// ============================================================================

/// HTTP transport configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,

    /// Retries for timeouts and connection failures
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Retry backoff configuration
    #[serde(default)]
    pub retry_backoff: BackoffConfig,

    /// Client-side throttle
    #[serde(default)]
    pub rate_limit: RateLimitConfig,

    /// User agent string
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: default_timeout(),
            max_retries: default_max_retries(),
            retry_backoff: BackoffConfig::default(),
            rate_limit: RateLimitConfig::default(),
            user_agent: default_user_agent(),
        }
    }
}

fn default_timeout() -> u64 {
    30
}

fn default_max_retries() -> u32 {
    3
}

fn default_user_agent() -> String {
    format!("timeline-pager/{}", env!("CARGO_PKG_VERSION"))
}

/// Type of backoff strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackoffType {
    /// Constant delay between retries
    Constant,
    /// Linear increase in delay
    Linear,
    /// Exponential increase in delay
    #[default]
    Exponential,
}

/// Backoff configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackoffConfig {
    /// Type of backoff
    #[serde(rename = "type", default)]
    pub backoff_type: BackoffType,

    /// Initial delay in milliseconds
    #[serde(default = "default_initial_ms")]
    pub initial_ms: u64,

    /// Maximum delay in milliseconds
    #[serde(default = "default_max_ms")]
    pub max_ms: u64,
}

impl Default for BackoffConfig {
    fn default() -> Self {
        Self {
            backoff_type: BackoffType::Exponential,
            initial_ms: default_initial_ms(),
            max_ms: default_max_ms(),
        }
    }
}

fn default_initial_ms() -> u64 {
    100
}

fn default_max_ms() -> u64 {
    60000
}

/// Client-side rate limiting configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitConfig {
    /// Whether to throttle at all
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Requests per second limit
    #[serde(default = "default_rps")]
    pub requests_per_second: u32,

    /// Burst size (max tokens in bucket)
    #[serde(default = "default_rps")]
    pub burst_size: u32,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            requests_per_second: default_rps(),
            burst_size: default_rps(),
        }
    }
}

fn default_rps() -> u32 {
    10
}

fn default_true() -> bool {
    true
}

// ============================================================================
// Pagination Policy
// ============================================================================

/// Where the iterators are being driven from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExecutionContext {
    /// Command line or background job: blocking on a rate limit is fine
    #[default]
    Batch,
    /// Inside a request handler: never park the task on a rate-limit sleep
    RequestServing,
}

/// Per-iterator policy threaded through construction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaginationPolicy {
    /// Sleep `retry_after + 1` seconds and retry once on a rate limit
    pub sleep_on_rate_limit: bool,
    /// Log each outgoing request with its merged parameters
    pub debug: bool,
}

impl Default for PaginationPolicy {
    fn default() -> Self {
        Self::resolve(&ClientConfig::default(), ExecutionContext::Batch)
    }
}

impl PaginationPolicy {
    /// Resolve the policy for a config in a given context.
    ///
    /// A request-serving context never sleeps, whatever the config says.
    pub fn resolve(config: &ClientConfig, context: ExecutionContext) -> Self {
        let sleep_on_rate_limit = match context {
            ExecutionContext::Batch => config.sleep_on_rate_limit.unwrap_or(true),
            ExecutionContext::RequestServing => {
                if config.sleep_on_rate_limit == Some(true) {
                    tracing::debug!("sleep_on_rate_limit ignored in a request-serving context");
                }
                false
            }
        };
        Self {
            sleep_on_rate_limit,
            debug: config.debug,
        }
    }

    /// Override the sleep policy explicitly
    #[must_use]
    pub fn with_sleep_on_rate_limit(mut self, enabled: bool) -> Self {
        self.sleep_on_rate_limit = enabled;
        self
    }

    /// Override the debug flag
    #[must_use]
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }
}
