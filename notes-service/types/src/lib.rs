//! Shared types for the notes service and its HTTP clients.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;

// =====================================================
// Field presence
// =====================================================

/// A JSON object member that may be absent, explicitly `null`, or set.
///
/// A `null` value deserializes to `Null`. Absent keys never reach the
/// deserializer; the request types fill them in as `Missing`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Field<T> {
    #[default]
    Missing,
    Null,
    Present(T),
}

impl<T> Field<T> {
    pub fn is_missing(&self) -> bool {
        matches!(self, Field::Missing)
    }

    pub fn as_field_ref(&self) -> Field<&T> {
        match self {
            Field::Missing => Field::Missing,
            Field::Null => Field::Null,
            Field::Present(v) => Field::Present(v),
        }
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Field<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match Option::<T>::deserialize(deserializer)? {
            Some(value) => Field::Present(value),
            None => Field::Null,
        })
    }
}

impl<T: Serialize> Serialize for Field<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Field::Present(value) => value.serialize(serializer),
            Field::Missing | Field::Null => serializer.serialize_none(),
        }
    }
}

// =====================================================
// Request Types
// =====================================================

type JsonObject = serde_json::Map<String, serde_json::Value>;

/// Remove `key` from a request object, keeping track of whether it was there.
fn take_field(object: &mut JsonObject, key: &str) -> Result<Field<String>, String> {
    match object.remove(key) {
        None => Ok(Field::Missing),
        Some(value) => serde_json::from_value(value).map_err(|e| format!("{}: {}", key, e)),
    }
}

/// Body of `POST /notes/`. Both fields are required.
///
/// Only a JSON object is accepted; unknown members are dropped.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(try_from = "JsonObject")]
pub struct CreateNoteRequest {
    #[serde(skip_serializing_if = "Field::is_missing")]
    pub title: Field<String>,
    #[serde(skip_serializing_if = "Field::is_missing")]
    pub content: Field<String>,
}

impl CreateNoteRequest {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: Field::Present(title.into()),
            content: Field::Present(content.into()),
        }
    }
}

impl TryFrom<JsonObject> for CreateNoteRequest {
    type Error = String;

    fn try_from(mut object: JsonObject) -> Result<Self, Self::Error> {
        Ok(Self {
            title: take_field(&mut object, "title")?,
            content: take_field(&mut object, "content")?,
        })
    }
}

/// Body of `PUT /notes/{id}`. Any subset of fields may be supplied.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(try_from = "JsonObject")]
pub struct UpdateNoteRequest {
    #[serde(skip_serializing_if = "Field::is_missing")]
    pub title: Field<String>,
    #[serde(skip_serializing_if = "Field::is_missing")]
    pub content: Field<String>,
}

impl TryFrom<JsonObject> for UpdateNoteRequest {
    type Error = String;

    fn try_from(mut object: JsonObject) -> Result<Self, Self::Error> {
        Ok(Self {
            title: take_field(&mut object, "title")?,
            content: take_field(&mut object, "content")?,
        })
    }
}

impl UpdateNoteRequest {
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Field::Present(title.into());
        self
    }

    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = Field::Present(content.into());
        self
    }
}

// =====================================================
// Response Types
// =====================================================

/// A stored note as returned by every read or write endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub id: String,
    pub title: String,
    pub content: String,
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "timestamp")]
    pub updated_at: DateTime<Utc>,
}

/// Error body for every non-2xx response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub code: u16,
    pub status: String,
    pub message: String,
    /// Per-field messages, keyed by field name
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub errors: BTreeMap<String, Vec<String>>,
}

/// Service health status
#[derive(Debug, Serialize, Deserialize)]
pub struct ServiceStatus {
    pub running: bool,
    pub version: String,
    pub uptime_secs: u64,
    pub total_notes: usize,
}

/// ISO-8601 timestamps with microsecond precision and a trailing `Z`.
pub mod timestamp {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn format(dt: &DateTime<Utc>) -> String {
        dt.to_rfc3339_opts(SecondsFormat::Micros, true)
    }

    pub fn serialize<S: Serializer>(dt: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format(dt))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&raw)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(serde::de::Error::custom)
    }
}
