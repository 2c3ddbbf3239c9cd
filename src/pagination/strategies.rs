//! Pagination strategy implementations
//!
//! Each strategy handles one position-marker style.

use super::types::{CursorPair, IdWindow, IterationRequest, PageStrategy, Position, SearchWindow};
use crate::error::ApiError;
use crate::types::{
    json_to_i64, Item, JsonObject, JsonValue, Page, ResponseEnvelope, StringMap,
};
use tracing::debug;

/// Initial `cursor` value meaning "first page"
pub const START_CURSOR: i64 = -1;

fn into_items(values: Vec<JsonValue>) -> Result<Vec<Item>, ApiError> {
    values
        .into_iter()
        .map(|value| {
            Item::try_from(value).map_err(|other| {
                ApiError::malformed(format!("expected an object item, got {other}"))
            })
        })
        .collect()
}

// ============================================================================
// Descending IDs
// ============================================================================

/// Timeline walk from newest to oldest (e.g. `statuses/user_timeline`).
///
/// `max_id` is inclusive on the server side, so every page after the first
/// starts with the item the previous page ended on. That item is dropped.
#[derive(Debug, Clone)]
pub struct DescendingIds {
    seed: IdWindow,
    outgoing: IdWindow,
    window: IdWindow,
    latest_id: Option<i64>,
    oldest_id: Option<i64>,
    started: bool,
}

impl DescendingIds {
    /// Newest ID seen across the whole walk
    pub fn latest_id(&self) -> Option<i64> {
        self.latest_id
    }

    /// Oldest ID seen so far
    pub fn oldest_id(&self) -> Option<i64> {
        self.oldest_id
    }
}

impl PageStrategy for DescendingIds {
    type Item = Item;

    fn start(request: &IterationRequest) -> Self {
        let seed = IdWindow {
            since_id: request.since_id().unwrap_or(IdWindow::UNSET.since_id),
            max_id: request.max_id().unwrap_or(IdWindow::UNSET.max_id),
        };
        Self {
            seed,
            outgoing: seed,
            window: IdWindow::UNSET,
            latest_id: None,
            oldest_id: None,
            started: false,
        }
    }

    fn apply(&self, params: &mut StringMap) {
        self.outgoing.apply(params);
    }

    fn extract(&mut self, envelope: ResponseEnvelope) -> Result<Page<Item>, ApiError> {
        self.started = true;

        let ResponseEnvelope::List(values) = envelope else {
            return Err(ApiError::malformed("timeline response is not an array"));
        };
        let mut items = into_items(values)?;

        if items.is_empty() {
            debug!("Empty timeline page, walk finished");
            self.exhaust();
            return Ok(items);
        }
        let latest = items
            .first()
            .and_then(Item::id)
            .ok_or_else(|| ApiError::malformed("newest item has no id"))?;
        let oldest = items
            .last()
            .and_then(Item::id)
            .ok_or_else(|| ApiError::malformed("oldest item has no id"))?;

        let boundary = (self.window.max_id > 0).then_some(self.window.max_id);
        if let Some(boundary) = boundary {
            items.retain(|item| item.id() != Some(boundary));
        }

        self.window.since_id = latest;
        self.latest_id.get_or_insert(latest);
        self.window.max_id = oldest;
        self.oldest_id = Some(oldest);

        if self.window.since_id == self.window.max_id {
            self.window.max_id = 0;
        } else if boundary.is_some_and(|boundary| oldest >= boundary) {
            debug!("Timeline did not move past {}, walk finished", oldest);
            items.clear();
            self.window.max_id = 0;
        }

        Ok(items)
    }

    fn exhaust(&mut self) {
        self.window = IdWindow::EXHAUSTED;
    }

    fn has_next(&self) -> bool {
        !self.window.is_exhausted()
    }

    fn advance(&mut self) {
        self.outgoing = IdWindow {
            since_id: IdWindow::UNSET.since_id,
            max_id: self.window.max_id,
        };
    }

    fn rewind(&mut self) -> bool {
        if self.started {
            debug!("Timeline walk already started, it cannot be rewound");
            return false;
        }
        self.outgoing = self.seed;
        self.window = IdWindow::UNSET;
        true
    }

    fn key(&self) -> i64 {
        self.window.max_id
    }

    fn position(&self) -> Position {
        Position::IdWindow(self.window)
    }
}

// ============================================================================
// Cursor IDs
// ============================================================================

/// Cursor walk over ID lists (e.g. `followers/ids`).
#[derive(Debug, Clone)]
pub struct CursorIds {
    cursor: i64,
    pair: CursorPair,
}

impl PageStrategy for CursorIds {
    type Item = i64;

    fn start(request: &IterationRequest) -> Self {
        Self {
            cursor: request.cursor().unwrap_or(START_CURSOR),
            pair: CursorPair {
                previous: START_CURSOR,
                next: 0,
            },
        }
    }

    fn apply(&self, params: &mut StringMap) {
        params.insert("cursor".to_string(), self.cursor.to_string());
    }

    fn extract(&mut self, envelope: ResponseEnvelope) -> Result<Page<i64>, ApiError> {
        let ResponseEnvelope::Document(doc) = envelope else {
            return Err(ApiError::malformed("ID list response is not an object"));
        };

        self.pair = CursorPair {
            previous: cursor_field(&doc, "previous_cursor"),
            next: cursor_field(&doc, "next_cursor"),
        };

        match doc.get("ids") {
            None | Some(JsonValue::Null) => Ok(Vec::new()),
            Some(JsonValue::Array(ids)) => ids
                .iter()
                .map(|id| {
                    json_to_i64(id).ok_or_else(|| ApiError::malformed(format!("bad id {id}")))
                })
                .collect(),
            Some(other) => Err(ApiError::malformed(format!("ids is not a list: {other}"))),
        }
    }

    fn exhaust(&mut self) {
        self.cursor = 0;
        self.pair = CursorPair {
            previous: 0,
            next: 0,
        };
    }

    fn has_next(&self) -> bool {
        self.cursor != 0
    }

    fn advance(&mut self) {
        if self.pair.next == self.cursor {
            debug!("Cursor {} points back at itself, walk finished", self.cursor);
            self.cursor = 0;
        } else {
            self.cursor = self.pair.next;
        }
    }

    fn rewind(&mut self) -> bool {
        self.cursor = self.pair.previous;
        true
    }

    fn key(&self) -> i64 {
        self.cursor
    }

    fn position(&self) -> Position {
        Position::CursorPair(self.pair)
    }
}

/// Read a cursor, falling back to its `_str` twin, defaulting to 0
fn cursor_field(doc: &JsonObject, name: &str) -> i64 {
    doc.get(name)
        .and_then(json_to_i64)
        .or_else(|| doc.get(&format!("{name}_str")).and_then(json_to_i64))
        .unwrap_or(0)
}

// ============================================================================
// Search Results
// ============================================================================

/// Search walk driven by `search_metadata.next_results`.
#[derive(Debug, Clone)]
pub struct SearchResults {
    seed: IdWindow,
    outgoing: IdWindow,
    current: SearchWindow,
    started: bool,
}

impl PageStrategy for SearchResults {
    type Item = Item;

    fn start(request: &IterationRequest) -> Self {
        let seed = IdWindow {
            since_id: request.since_id().unwrap_or(IdWindow::UNSET.since_id),
            max_id: request.max_id().unwrap_or(IdWindow::UNSET.max_id),
        };
        Self {
            seed,
            outgoing: seed,
            current: SearchWindow::default(),
            started: false,
        }
    }

    fn apply(&self, params: &mut StringMap) {
        self.outgoing.apply(params);
    }

    fn extract(&mut self, envelope: ResponseEnvelope) -> Result<Page<Item>, ApiError> {
        self.started = true;

        let ResponseEnvelope::Document(mut doc) = envelope else {
            return Err(ApiError::malformed("search response is not an object"));
        };
        let Some(JsonValue::Array(statuses)) = doc.remove("statuses") else {
            return Err(ApiError::malformed("search response has no statuses list"));
        };
        let metadata = match doc.remove("search_metadata") {
            Some(JsonValue::Object(metadata)) if !metadata.is_empty() => metadata,
            _ => return Err(ApiError::malformed("search response has no search_metadata")),
        };

        let items = into_items(statuses)?;
        if items.is_empty() {
            debug!("Empty search page, walk finished");
            self.exhaust();
            return Ok(items);
        }

        let next_results = metadata
            .get("next_results")
            .and_then(JsonValue::as_str)
            .map(str::to_string);
        self.current.window.max_id = next_results
            .as_deref()
            .and_then(next_max_id)
            .filter(|max_id| *max_id > 0)
            .unwrap_or(0);
        self.current.next_results = next_results;

        if let Some(since_id) = metadata.get("max_id_str").and_then(json_to_i64) {
            self.current.window.since_id = since_id;
        }

        let sent = self.outgoing.max_id;
        if sent > 0 && self.current.window.max_id >= sent {
            debug!("Search did not move past {}, walk finished", sent);
            self.current.window.max_id = 0;
        }

        Ok(items)
    }

    fn exhaust(&mut self) {
        self.current = SearchWindow {
            window: IdWindow::EXHAUSTED,
            next_results: None,
        };
    }

    fn has_next(&self) -> bool {
        !self.current.window.is_exhausted()
    }

    fn advance(&mut self) {
        self.outgoing = IdWindow {
            since_id: IdWindow::UNSET.since_id,
            max_id: self.current.window.max_id,
        };
    }

    fn rewind(&mut self) -> bool {
        if self.started {
            debug!("Search walk already started, it cannot be rewound");
            return false;
        }
        self.outgoing = self.seed;
        self.current = SearchWindow::default();
        true
    }

    fn key(&self) -> i64 {
        self.current.window.max_id
    }

    fn position(&self) -> Position {
        Position::SearchWindow(self.current.clone())
    }
}

/// Pull `max_id` out of a `next_results` fragment like `?max_id=42&q=x`
pub fn next_max_id(next_results: &str) -> Option<i64> {
    let query = next_results.strip_prefix('?').unwrap_or(next_results);
    url::form_urlencoded::parse(query.as_bytes())
        .find(|(key, _)| key == "max_id")
        .and_then(|(_, value)| value.trim().parse().ok())
}
