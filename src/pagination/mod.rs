//! Pagination module
//!
//! Supports: descending ID windows, cursor pairs, search continuation tokens
//!
//! # Overview
//!
//! A [`PaginationCursor`] owns the request/rate-limit/retry cycle shared by
//! every style. A [`PageStrategy`] knows how one style shapes its request and
//! reads the next position out of a response. [`Paginator`] joins the two into
//! a lazy, finite sequence of pages.

mod cursor;
mod iterator;
mod strategies;
mod types;

pub use cursor::{CursorState, FetchOutcome, PaginationCursor};
pub use iterator::{CursorIdIterator, DescendingIdIterator, Paginator, SearchResultIterator};
pub use strategies::{next_max_id, CursorIds, DescendingIds, SearchResults, START_CURSOR};
pub use types::{CursorPair, IdWindow, IterationRequest, PageStrategy, Position, SearchWindow};
