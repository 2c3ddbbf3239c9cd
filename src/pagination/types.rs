//! Pagination types and traits
//!
//! Defines the request, the position markers, and the [`PageStrategy`]
//! capability that each pagination style implements.

use crate::error::{ApiError, Error, Result};
use crate::types::{Page, ResponseEnvelope, StringMap};

/// Arguments that must be integers when present
const NUMERIC_ARGS: &[&str] = &["user_id", "since_id", "max_id", "cursor"];

/// Largest `count` each endpoint accepts
const MAX_COUNTS: &[(&str, u32)] = &[
    ("statuses/user_timeline", 200),
    ("statuses/home_timeline", 200),
    ("followers/ids", 5000),
    ("friends/ids", 5000),
    ("search/tweets", 100),
    ("users/lookup", 100),
];

// ============================================================================
// Iteration Request
// ============================================================================

/// Immutable base request: endpoint slug plus caller arguments.
///
/// Position markers are merged into a copy per fetch, never into this.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IterationRequest {
    slug: String,
    args: StringMap,
}

impl IterationRequest {
    /// Validate and build a request.
    ///
    /// Fails before anything is sent when the slug is empty or a numeric
    /// argument is not a number. `count` is clamped to the endpoint maximum.
    pub fn new<I, K, V>(slug: impl Into<String>, args: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let slug = slug.into().trim_matches('/').to_string();
        if slug.is_empty() {
            return Err(Error::invalid_argument("slug", "endpoint slug is empty"));
        }

        let mut args: StringMap = args
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();

        for name in NUMERIC_ARGS {
            if let Some(value) = args.get(*name) {
                if value.trim().parse::<i64>().is_err() {
                    return Err(Error::invalid_argument(
                        *name,
                        format!("{value} is not numeric"),
                    ));
                }
            }
        }

        if let Some(value) = args.get("count") {
            let count: u32 = value.trim().parse().map_err(|_| {
                Error::invalid_argument("count", format!("{value} is not a positive integer"))
            })?;
            if let Some(max) = max_count(&slug) {
                if count > max {
                    args.insert("count".to_string(), max.to_string());
                }
            }
        }

        Ok(Self { slug, args })
    }

    /// Endpoint slug (e.g. "statuses/user_timeline")
    pub fn slug(&self) -> &str {
        &self.slug
    }

    /// Caller arguments
    pub fn args(&self) -> &StringMap {
        &self.args
    }

    /// Get one argument
    pub fn arg(&self, name: &str) -> Option<&str> {
        self.args.get(name).map(String::as_str)
    }

    /// Caller-supplied `since_id`, if any
    pub fn since_id(&self) -> Option<i64> {
        self.numeric_arg("since_id")
    }

    /// Caller-supplied `max_id`, if any
    pub fn max_id(&self) -> Option<i64> {
        self.numeric_arg("max_id")
    }

    /// Caller-supplied `cursor`, if any
    pub fn cursor(&self) -> Option<i64> {
        self.numeric_arg("cursor")
    }

    fn numeric_arg(&self, name: &str) -> Option<i64> {
        self.arg(name).and_then(|v| v.trim().parse().ok())
    }
}

fn max_count(slug: &str) -> Option<u32> {
    MAX_COUNTS
        .iter()
        .find(|(endpoint, _)| *endpoint == slug)
        .map(|(_, max)| *max)
}

// ============================================================================
// Position
// ============================================================================

/// Descending ID window.
///
/// `since_id` is the newest ID seen, `max_id` the boundary for the next
/// request. Negative means "unset", zero means "exhausted".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdWindow {
    pub since_id: i64,
    pub max_id: i64,
}

impl IdWindow {
    /// Sentinel for a window that has not fetched anything yet
    pub const UNSET: Self = Self {
        since_id: -1,
        max_id: -1,
    };

    /// The terminal window
    pub const EXHAUSTED: Self = Self {
        since_id: 0,
        max_id: 0,
    };

    /// Write the positive markers into `params`, removing unset ones
    pub fn apply(&self, params: &mut StringMap) {
        set_positive(params, "since_id", self.since_id);
        set_positive(params, "max_id", self.max_id);
    }

    /// Whether the walk is over
    pub fn is_exhausted(&self) -> bool {
        self.max_id == 0
    }
}

impl Default for IdWindow {
    fn default() -> Self {
        Self::UNSET
    }
}

fn set_positive(params: &mut StringMap, key: &str, value: i64) {
    if value > 0 {
        params.insert(key.to_string(), value.to_string());
    } else {
        params.remove(key);
    }
}

/// Forward/backward cursor pair of an ID-list endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CursorPair {
    pub previous: i64,
    pub next: i64,
}

/// Search window: an [`IdWindow`] plus the continuation fragment it came from
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SearchWindow {
    pub window: IdWindow,
    pub next_results: Option<String>,
}

/// Snapshot of an iterator's position, for diagnostics and checkpoints
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Position {
    IdWindow(IdWindow),
    CursorPair(CursorPair),
    SearchWindow(SearchWindow),
}

// ============================================================================
// Page Strategy
// ============================================================================

/// How one pagination style reads its position out of a response.
///
/// The shared fetch/retry machinery lives in
/// [`PaginationCursor`](super::PaginationCursor); a strategy only knows how to
/// shape the outgoing request and how to move its markers.
pub trait PageStrategy: Send {
    /// What a page is made of
    type Item: Clone + Send;

    /// Initial position for a request
    fn start(request: &IterationRequest) -> Self
    where
        Self: Sized;

    /// Write the current position into the outgoing parameters
    fn apply(&self, params: &mut StringMap);

    /// Consume a response, update the position, and return the page.
    ///
    /// An `Err` means the envelope had the wrong shape; the caller exhausts
    /// the walk.
    fn extract(
        &mut self,
        envelope: ResponseEnvelope,
    ) -> std::result::Result<Page<Self::Item>, ApiError>;

    /// Move to the terminal position
    fn exhaust(&mut self);

    /// Whether another page may be fetched
    fn has_next(&self) -> bool;

    /// Carry the captured boundary into the next request
    fn advance(&mut self);

    /// Rewind the outgoing position. Returns false when the style cannot restart.
    fn rewind(&mut self) -> bool;

    /// Current boundary marker
    fn key(&self) -> i64;

    /// Snapshot of the position
    fn position(&self) -> Position;
}
