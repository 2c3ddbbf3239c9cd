//! Lazy page sequence
//!
//! [`Paginator`] pairs a [`PaginationCursor`] with a [`PageStrategy`] and
//! exposes the reset / valid / key / current / advance protocol. A walk is
//! consumed with repeated [`Paginator::next_page`] calls or as a stream.

use super::cursor::{FetchOutcome, PaginationCursor};
use super::strategies::{CursorIds, DescendingIds, SearchResults};
use super::types::{IterationRequest, PageStrategy, Position};
use crate::config::PaginationPolicy;
use crate::transport::Transport;
use crate::types::Page;
use futures::Stream;
use tracing::{debug, error};

/// Timeline iterator, newest to oldest
pub type DescendingIdIterator<T> = Paginator<DescendingIds, T>;

/// ID-list iterator driven by `next_cursor`
pub type CursorIdIterator<T> = Paginator<CursorIds, T>;

/// Search iterator driven by `search_metadata.next_results`
pub type SearchResultIterator<T> = Paginator<SearchResults, T>;

/// A resumable walk over one endpoint
pub struct Paginator<S: PageStrategy, T> {
    cursor: PaginationCursor<T>,
    strategy: S,
    current: Option<Page<S::Item>>,
    pages_fetched: usize,
}

impl<S: PageStrategy, T: Transport> Paginator<S, T> {
    /// Start a walk over `request`
    pub fn new(transport: T, request: IterationRequest, policy: PaginationPolicy) -> Self {
        let strategy = S::start(&request);
        Self {
            cursor: PaginationCursor::new(transport, request, policy),
            strategy,
            current: None,
            pages_fetched: 0,
        }
    }

    /// Rewind to the start position, where the style allows it
    pub fn reset(&mut self) {
        if self.strategy.rewind() {
            self.current = None;
        }
    }

    /// Whether another page can be produced
    pub fn valid(&self) -> bool {
        !self.cursor.is_exhausted() && self.strategy.has_next()
    }

    /// Current boundary marker (`max_id` or `cursor`)
    pub fn key(&self) -> i64 {
        self.strategy.key()
    }

    /// Snapshot of the position markers
    pub fn position(&self) -> Position {
        self.strategy.position()
    }

    /// Pages fetched so far, empty terminal pages included
    pub fn pages_fetched(&self) -> usize {
        self.pages_fetched
    }

    /// The base request
    pub fn request(&self) -> &IterationRequest {
        self.cursor.request()
    }

    /// The strategy, for style-specific accessors
    pub fn strategy(&self) -> &S {
        &self.strategy
    }

    /// Fetch the page at the current position.
    ///
    /// Calling this again before [`advance`](Self::advance) returns the same
    /// page without another request. An exhausted walk yields an empty page.
    pub async fn current_page(&mut self) -> Page<S::Item> {
        if let Some(ref page) = self.current {
            return page.clone();
        }
        if !self.valid() {
            return Vec::new();
        }

        let params = self
            .cursor
            .merged_params(|params| self.strategy.apply(params));

        let page = match self.cursor.fetch(&params).await {
            FetchOutcome::Envelope(envelope) => match self.strategy.extract(envelope) {
                Ok(page) => page,
                Err(err) => {
                    error!("Stopping walk over {}: {}", self.request().slug(), err);
                    self.cursor.exhaust();
                    self.strategy.exhaust();
                    Vec::new()
                }
            },
            FetchOutcome::Exhausted => {
                self.strategy.exhaust();
                Vec::new()
            }
        };

        self.pages_fetched += 1;
        debug!(
            "Page {} of {}: {} items, next key {}",
            self.pages_fetched,
            self.request().slug(),
            page.len(),
            self.strategy.key()
        );
        self.current = Some(page.clone());
        page
    }

    /// Move to the next position
    pub fn advance(&mut self) {
        self.strategy.advance();
        self.current = None;
    }

    /// Fetch the current page and advance; `None` once the walk is over
    pub async fn next_page(&mut self) -> Option<Page<S::Item>> {
        if !self.valid() {
            return None;
        }
        let page = self.current_page().await;
        self.advance();
        Some(page)
    }

    /// Consume the walk as a stream of pages
    pub fn into_stream(self) -> impl Stream<Item = Page<S::Item>> {
        futures::stream::unfold(self, |mut walk| async move {
            let page = walk.next_page().await?;
            Some((page, walk))
        })
    }
}

impl<T: Transport> Paginator<DescendingIds, T> {
    /// Newest ID seen across the walk
    pub fn latest_id(&self) -> Option<i64> {
        self.strategy.latest_id()
    }

    /// Oldest ID seen so far
    pub fn oldest_id(&self) -> Option<i64> {
        self.strategy.oldest_id()
    }
}

impl<S: PageStrategy + std::fmt::Debug, T> std::fmt::Debug for Paginator<S, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Paginator")
            .field("cursor", &self.cursor)
            .field("strategy", &self.strategy)
            .field("pages_fetched", &self.pages_fetched)
            .finish_non_exhaustive()
    }
}
