//! Error types for timeline-pager
//!
//! Two layers live here. [`ApiError`] is what a [`Transport`](crate::transport::Transport)
//! reports for a single request; iterators absorb it into exhaustion. [`Error`] is the
//! crate-level error returned by constructors, config loading and the CLI.

use thiserror::Error;

/// Failure of a single API request, normalized at the transport boundary
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Rate limited{}", retry_suffix(.retry_after_seconds))]
    RateLimited { retry_after_seconds: Option<u64> },

    #[error("Not found: {body}")]
    NotFound { body: String },

    #[error("Forbidden: {body}")]
    Forbidden { body: String },

    #[error("HTTP {status}: {body}")]
    General { status: u16, body: String },

    #[error("Malformed response envelope: {message}")]
    MalformedEnvelope { message: String },

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Request timeout after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },
}

fn retry_suffix(retry_after_seconds: &Option<u64>) -> String {
    match retry_after_seconds {
        Some(secs) => format!(", retry after {secs}s"),
        None => String::new(),
    }
}

impl ApiError {
    /// Create a rate limit error
    pub fn rate_limited(retry_after_seconds: Option<u64>) -> Self {
        Self::RateLimited {
            retry_after_seconds,
        }
    }

    /// Create a general error for an unexpected status
    pub fn general(status: u16, body: impl Into<String>) -> Self {
        Self::General {
            status,
            body: body.into(),
        }
    }

    /// Create a malformed envelope error
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedEnvelope {
            message: message.into(),
        }
    }

    /// Seconds to wait before the request may be retried.
    ///
    /// Only a rate limit that carries a reset time is retriable; every other
    /// kind returns `None`.
    pub fn retry_after(&self) -> Option<u64> {
        match self {
            Self::RateLimited {
                retry_after_seconds,
            } => *retry_after_seconds,
            _ => None,
        }
    }

    /// Check if this is a rate limit signal (retriable or not)
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, Self::RateLimited { .. })
    }
}

/// The main error type for timeline-pager
#[derive(Error, Debug)]
pub enum Error {
    // ============================================================================
    // Configuration Errors
    // ============================================================================
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    // ============================================================================
    // Request Errors
    // ============================================================================
    #[error("Invalid argument '{name}': {value}")]
    InvalidArgument { name: String, value: String },

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error(transparent)]
    Api(#[from] ApiError),

    // ============================================================================
    // I/O Errors
    // ============================================================================
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // ============================================================================
    // Generic Errors
    // ============================================================================
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create an invalid argument error
    pub fn invalid_argument(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self::InvalidArgument {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Result type alias for timeline-pager
pub type Result<T> = std::result::Result<T, Error>;

/// Extension trait for adding context to errors
pub trait ResultExt<T> {
    /// Add context to an error
    fn context(self, message: impl Into<String>) -> Result<T>;

    /// Add context with a closure (lazy evaluation)
    fn with_context<F: FnOnce() -> String>(self, f: F) -> Result<T>;
}

impl<T, E: Into<Error>> ResultExt<T> for std::result::Result<T, E> {
    fn context(self, message: impl Into<String>) -> Result<T> {
        self.map_err(|e| {
            let inner = e.into();
            Error::Other(format!("{}: {}", message.into(), inner))
        })
    }

    fn with_context<F: FnOnce() -> String>(self, f: F) -> Result<T> {
        self.map_err(|e| {
            let inner = e.into();
            Error::Other(format!("{}: {}", f(), inner))
        })
    }
}
