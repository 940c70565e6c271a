//! Calendar event model shared by the local store and the remote provider

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::{HomedashError, Result};

/// Where an event record originated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventOrigin {
    Local,
    Remote,
}

impl EventOrigin {
    /// Stable string form used in the database.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Local => "local",
            Self::Remote => "remote",
        }
    }

    /// Parse the database string form.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "local" => Some(Self::Local),
            "remote" => Some(Self::Remote),
            _ => None,
        }
    }
}

/// Calendar event.
///
/// Invariant: at most one of `local_id` / `remote_id` may be `None`. An
/// event synced to the remote carries both ids; an event created offline
/// carries only a local id until the next successful sync.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarEvent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub local_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remote_id: Option<String>,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color_tag: Option<String>,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    #[serde(default)]
    pub attendees: Vec<String>,
    pub origin: EventOrigin,
}

impl CalendarEvent {
    /// Whether both identifiers are recorded (the event has been pushed to
    /// the remote).
    #[must_use]
    pub fn is_synced(&self) -> bool {
        self.local_id.is_some() && self.remote_id.is_some()
    }
}

/// Input payload for event creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventDraft {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub color_tag: Option<String>,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    #[serde(default)]
    pub attendees: Vec<String>,
}

impl EventDraft {
    /// Field-level validation of the draft.
    ///
    /// # Errors
    /// Returns `HomedashError::Validation` naming the offending field.
    pub fn validate(&self) -> Result<()> {
        if self.title.trim().is_empty() {
            return Err(HomedashError::validation("title", "must not be empty"));
        }
        if self.end <= self.start {
            return Err(HomedashError::validation("end", "must be after start"));
        }
        Ok(())
    }
}

/// Half-open query window `[start, end)` for event listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl EventRange {
    /// Whether an event overlaps this window.
    #[must_use]
    pub fn overlaps(&self, event: &CalendarEvent) -> bool {
        event.start < self.end && event.end > self.start
    }
}

/// Single provider color entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColorDefinition {
    pub background: String,
    pub foreground: String,
}

/// Calendar + event color maps forwarded from the provider.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ColorPalette {
    #[serde(default)]
    pub calendar: BTreeMap<String, ColorDefinition>,
    #[serde(default)]
    pub event: BTreeMap<String, ColorDefinition>,
}
