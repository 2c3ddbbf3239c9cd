//! Common types used throughout timeline-pager
//!
//! Responses are decoded exactly once, at the transport boundary, into a
//! [`ResponseEnvelope`]. Everything downstream works on that typed shape.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// ============================================================================
// Type Aliases
// ============================================================================

/// JSON value type (re-exported from serde_json)
pub type JsonValue = serde_json::Value;

/// JSON object type
pub type JsonObject = serde_json::Map<String, JsonValue>;

/// Generic key-value map with string keys and values
pub type StringMap = HashMap<String, String>;

/// One page of results, in the order the API returned them
pub type Page<T> = Vec<T>;

// ============================================================================
// Item
// ============================================================================

/// An opaque API record (a tweet, a user, ...)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Item(JsonObject);

impl Item {
    /// Wrap a JSON object
    pub fn new(fields: JsonObject) -> Self {
        Self(fields)
    }

    /// Numeric ID of the record.
    ///
    /// Reads `id` (number or numeric string), then `id_str`.
    pub fn id(&self) -> Option<i64> {
        self.0
            .get("id")
            .and_then(json_to_i64)
            .or_else(|| self.0.get("id_str").and_then(json_to_i64))
    }

    /// Get a field by name
    pub fn get(&self, key: &str) -> Option<&JsonValue> {
        self.0.get(key)
    }

    /// Borrow the underlying object
    pub fn fields(&self) -> &JsonObject {
        &self.0
    }

    /// Unwrap into the underlying object
    pub fn into_fields(self) -> JsonObject {
        self.0
    }
}

impl From<JsonObject> for Item {
    fn from(fields: JsonObject) -> Self {
        Self(fields)
    }
}

impl TryFrom<JsonValue> for Item {
    type Error = JsonValue;

    fn try_from(value: JsonValue) -> std::result::Result<Self, Self::Error> {
        match value {
            JsonValue::Object(map) => Ok(Self(map)),
            other => Err(other),
        }
    }
}

// ============================================================================
// Response Envelope
// ============================================================================

/// A decoded API response body.
///
/// Timeline endpoints answer with a bare array, search and ID-list endpoints
/// answer with an object envelope. Scalars are not valid responses.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseEnvelope {
    /// Array-shaped body
    List(Vec<JsonValue>),
    /// Object-shaped body
    Document(JsonObject),
}

impl ResponseEnvelope {
    /// Decode a JSON value; scalars are rejected and handed back
    pub fn from_value(value: JsonValue) -> std::result::Result<Self, JsonValue> {
        match value {
            JsonValue::Array(items) => Ok(Self::List(items)),
            JsonValue::Object(map) => Ok(Self::Document(map)),
            other => Err(other),
        }
    }

    /// Borrow the array body, if this is one
    pub fn as_list(&self) -> Option<&[JsonValue]> {
        match self {
            Self::List(items) => Some(items),
            Self::Document(_) => None,
        }
    }

    /// Borrow the object body, if this is one
    pub fn as_document(&self) -> Option<&JsonObject> {
        match self {
            Self::List(_) => None,
            Self::Document(map) => Some(map),
        }
    }

    /// Field of an object body
    pub fn field(&self, key: &str) -> Option<&JsonValue> {
        self.as_document().and_then(|map| map.get(key))
    }
}

impl From<ResponseEnvelope> for JsonValue {
    fn from(envelope: ResponseEnvelope) -> Self {
        match envelope {
            ResponseEnvelope::List(items) => JsonValue::Array(items),
            ResponseEnvelope::Document(map) => JsonValue::Object(map),
        }
    }
}

/// Read an integer from a JSON number or a numeric string
pub fn json_to_i64(value: &JsonValue) -> Option<i64> {
    match value {
        JsonValue::Number(n) => n.as_i64(),
        JsonValue::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
