//! HTTP transport module
//!
//! Provides the production [`Transport`](crate::transport::Transport).
//!
//! # Features
//!
//! - **Throttling**: Token bucket rate limiter using governor
//! - **Retries**: Constant, linear and exponential backoff for network failures
//! - **Status mapping**: 403/404/429/other into [`ApiError`](crate::error::ApiError) kinds

mod client;
mod rate_limit;

pub use client::HttpTransport;
pub use rate_limit::RateLimiter;

#[cfg(test)]
mod tests;
