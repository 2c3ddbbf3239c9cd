// Allow common clippy pedantic lints that aren't critical for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::needless_pass_by_value)]

//! # timeline-pager
//!
//! Client-side pagination for a Twitter-style REST API.
//!
//! ## Features
//!
//! - **Timeline walks**: `since_id` / `max_id` windows with boundary dedup
//! - **Cursor walks**: `next_cursor` / `previous_cursor` ID lists
//! - **Search walks**: continuation through `search_metadata.next_results`
//! - **Rate limits**: optional sleep-and-retry-once on a 429 with a reset time
//! - **Lazy**: no request is sent until a page is asked for
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use timeline_pager::{ApiClient, ClientConfig, ExecutionContext, Result};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let config = ClientConfig::load("pager.yaml")?;
//!     let client = ApiClient::from_config(config, ExecutionContext::Batch)?;
//!
//!     let mut walk = client.timeline("statuses/user_timeline", [("screen_name", "rustlang")])?;
//!     while let Some(page) = walk.next_page().await {
//!         for tweet in page {
//!             println!("{:?}", tweet.id());
//!         }
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                          ApiClient                              │
//! │   timeline() → DescendingIdIterator   search() → SearchResult…  │
//! │   followers() / friends() → CursorIdIterator                    │
//! └─────────────────────────────────────────────────────────────────┘
//!                                │
//! ┌──────────────────────────────┴──────────────────────────────────┐
//! │              Paginator<PageStrategy, Transport>                 │
//! ├────────────────────┬────────────────────┬───────────────────────┤
//! │   DescendingIds    │     CursorIds      │    SearchResults      │
//! ├────────────────────┴────────────────────┴───────────────────────┤
//! │   PaginationCursor: request → 429? sleep + retry once → page    │
//! ├─────────────────────────────────────────────────────────────────┤
//! │   Transport: HttpTransport (reqwest, governor, backoff)         │
//! └─────────────────────────────────────────────────────────────────┘
//! ```

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types
pub mod error;

/// Common types and type aliases
pub mod types;

/// Client configuration and pagination policy
pub mod config;

/// The transport seam between iterators and HTTP
pub mod transport;

/// HTTP transport with retry and rate limiting
pub mod http;

/// Pagination cursor, strategies and iterators
pub mod pagination;

/// Client facade
pub mod client;

/// Command-line interface
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use error::{ApiError, Error, Result};
pub use types::*;

pub use client::ApiClient;
pub use config::{ClientConfig, ExecutionContext, PaginationPolicy};
pub use http::HttpTransport;
pub use pagination::{
    CursorIdIterator, DescendingIdIterator, IterationRequest, Paginator, Position,
    SearchResultIterator,
};
pub use transport::Transport;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
