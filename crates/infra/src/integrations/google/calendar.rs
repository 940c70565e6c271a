//! Google Calendar provider implementation

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use homedash_core::RemoteCalendar;
use homedash_domain::{
    CalendarEvent, ColorPalette, EventDraft, EventOrigin, EventRange, HomedashError, Result,
};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::debug;

const PRIMARY_CALENDAR: &str = "primary";

/// Google Calendar v3 client.
pub struct GoogleCalendarClient {
    http: Client,
    base_url: String,
}

impl GoogleCalendarClient {
    /// Create a client against the given API base URL
    /// (`https://www.googleapis.com/calendar/v3` in production).
    pub fn new(base_url: impl Into<String>, http: Client) -> Self {
        Self { http, base_url: base_url.into() }
    }

    fn events_url(&self) -> String {
        format!("{}/calendars/{}/events", self.base_url, PRIMARY_CALENDAR)
    }
}

#[async_trait]
impl RemoteCalendar for GoogleCalendarClient {
    async fn list_events(
        &self,
        access_token: &str,
        range: &EventRange,
    ) -> Result<Vec<CalendarEvent>> {
        let response = self
            .http
            .get(self.events_url())
            .bearer_auth(access_token)
            .query(&[
                ("timeMin", range.start.to_rfc3339()),
                ("timeMax", range.end.to_rfc3339()),
                ("singleEvents", "true".to_string()),
                ("orderBy", "startTime".to_string()),
            ])
            .send()
            .await
            .map_err(|e| HomedashError::RemoteUnavailable(format!("calendar request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(provider_error(response.status(), "events listing"));
        }

        let listing: GoogleEventsResponse = response.json().await.map_err(|e| {
            HomedashError::RemoteUnavailable(format!("failed to parse events response: {e}"))
        })?;

        let events = listing
            .items
            .into_iter()
            .filter_map(|item| match convert_event(item) {
                Ok(event) => Some(event),
                Err(e) => {
                    debug!(error = %e, "skipping unconvertible remote event");
                    None
                }
            })
            .collect();

        Ok(events)
    }

    async fn create_event(&self, access_token: &str, draft: &EventDraft) -> Result<String> {
        let attendees: Vec<_> =
            draft.attendees.iter().map(|email| json!({ "email": email })).collect();

        let mut body = json!({
            "summary": draft.title,
            "start": { "dateTime": draft.start.to_rfc3339() },
            "end": { "dateTime": draft.end.to_rfc3339() },
            "attendees": attendees,
        });
        if let Some(description) = &draft.description {
            body["description"] = json!(description);
        }
        if let Some(location) = &draft.location {
            body["location"] = json!(location);
        }
        if let Some(color) = &draft.color_tag {
            body["colorId"] = json!(color);
        }

        let response = self
            .http
            .post(self.events_url())
            .bearer_auth(access_token)
            .json(&body)
            .send()
            .await
            .map_err(|e| HomedashError::RemoteUnavailable(format!("create request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(provider_error(response.status(), "event creation"));
        }

        let created: CreatedEventResponse = response.json().await.map_err(|e| {
            HomedashError::RemoteUnavailable(format!("failed to parse create response: {e}"))
        })?;

        debug!(remote_id = %created.id, "remote event created");

        Ok(created.id)
    }

    async fn color_palette(&self, access_token: &str) -> Result<ColorPalette> {
        let response = self
            .http
            .get(format!("{}/colors", self.base_url))
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| HomedashError::RemoteUnavailable(format!("colors request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(provider_error(response.status(), "color palette"));
        }

        response.json::<ColorPalette>().await.map_err(|e| {
            HomedashError::RemoteUnavailable(format!("failed to parse colors response: {e}"))
        })
    }
}

fn provider_error(status: StatusCode, operation: &str) -> HomedashError {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => HomedashError::SessionExpired,
        other => HomedashError::RemoteUnavailable(format!("{operation} returned {other}")),
    }
}

fn convert_event(item: GoogleEvent) -> Result<CalendarEvent> {
    let start = parse_event_time(&item.start)?;
    let end = parse_event_time(&item.end)?;

    let attendees = item
        .attendees
        .unwrap_or_default()
        .into_iter()
        .map(|a| a.email)
        .filter(|email| !email.trim().is_empty())
        .collect();

    Ok(CalendarEvent {
        local_id: None,
        remote_id: Some(item.id),
        title: item.summary.filter(|s| !s.trim().is_empty()).unwrap_or_else(|| "Untitled".into()),
        description: item.description,
        location: item.location,
        color_tag: item.color_id,
        start,
        end,
        attendees,
        origin: EventOrigin::Remote,
    })
}

fn parse_event_time(value: &EventDateTime) -> Result<DateTime<Utc>> {
    if let Some(date_time) = &value.date_time {
        return DateTime::parse_from_rfc3339(date_time)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| {
                HomedashError::RemoteUnavailable(format!("invalid timestamp '{date_time}': {e}"))
            });
    }

    // All-day events carry a bare date; pin to midnight UTC
    if let Some(date) = &value.date {
        let parsed = NaiveDate::parse_from_str(date, "%Y-%m-%d").map_err(|e| {
            HomedashError::RemoteUnavailable(format!("invalid all-day date '{date}': {e}"))
        })?;
        let midnight = parsed.and_hms_opt(0, 0, 0).ok_or_else(|| {
            HomedashError::RemoteUnavailable(format!("invalid all-day date '{date}'"))
        })?;
        return Ok(midnight.and_utc());
    }

    Err(HomedashError::RemoteUnavailable("event time missing dateTime and date".into()))
}

#[derive(Debug, Deserialize)]
struct GoogleEventsResponse {
    #[serde(default)]
    items: Vec<GoogleEvent>,
}

#[derive(Debug, Deserialize)]
struct GoogleEvent {
    id: String,
    summary: Option<String>,
    description: Option<String>,
    location: Option<String>,
    #[serde(rename = "colorId")]
    color_id: Option<String>,
    start: EventDateTime,
    end: EventDateTime,
    attendees: Option<Vec<GoogleAttendee>>,
}

#[derive(Debug, Serialize, Deserialize)]
struct EventDateTime {
    #[serde(rename = "dateTime")]
    date_time: Option<String>,
    date: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GoogleAttendee {
    email: String,
}

#[derive(Debug, Deserialize)]
struct CreatedEventResponse {
    id: String,
}
