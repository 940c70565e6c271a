//! SQLite-backed implementation of the EventStore port.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use homedash_core::EventStore;
use homedash_domain::{CalendarEvent, EventOrigin, EventRange, HomedashError, Result};
use rusqlite::{params, Row};
use tokio::task;
use tracing::debug;

use super::manager::DbManager;
use crate::errors::InfraError;

const EVENT_COLUMNS: &str = "local_id, remote_id, title, description, location, color_tag,
                             start_ts, end_ts, attendees, origin, created_at, updated_at";

/// SQLite implementation of the local event store.
pub struct SqliteEventStore {
    db: Arc<DbManager>,
}

impl SqliteEventStore {
    /// Create a new event store over the shared pool.
    pub fn new(db: Arc<DbManager>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl EventStore for SqliteEventStore {
    async fn insert_event(&self, event: &CalendarEvent) -> Result<()> {
        let db = Arc::clone(&self.db);
        let event = event.clone();

        task::spawn_blocking(move || -> Result<()> {
            let conn = db.get_connection()?;
            let now = Utc::now().timestamp_millis();

            let attendees = serde_json::to_string(&event.attendees).map_err(|e| {
                HomedashError::Internal(format!("failed to encode attendees: {e}"))
            })?;

            conn.execute(
                "INSERT INTO calendar_events (
                    local_id, remote_id, title, description, location, color_tag,
                    start_ts, end_ts, attendees, origin, created_at, updated_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?11)",
                params![
                    event.local_id,
                    event.remote_id,
                    event.title,
                    event.description,
                    event.location,
                    event.color_tag,
                    event.start.timestamp_millis(),
                    event.end.timestamp_millis(),
                    attendees,
                    event.origin.as_str(),
                    now,
                ],
            )
            .map_err(InfraError::from)?;

            debug!(local_id = ?event.local_id, title = %event.title, "inserted calendar event");

            Ok(())
        })
        .await
        .map_err(map_join_error)?
    }

    async fn list_events(&self, range: &EventRange) -> Result<Vec<CalendarEvent>> {
        let db = Arc::clone(&self.db);
        let range = *range;

        task::spawn_blocking(move || -> Result<Vec<CalendarEvent>> {
            let conn = db.get_connection()?;

            let mut stmt = conn
                .prepare(&format!(
                    "SELECT {EVENT_COLUMNS}
                     FROM calendar_events
                     WHERE start_ts < ?1 AND end_ts > ?2
                     ORDER BY start_ts ASC"
                ))
                .map_err(InfraError::from)?;

            let rows = stmt
                .query_map(
                    params![range.end.timestamp_millis(), range.start.timestamp_millis()],
                    map_event_row,
                )
                .map_err(InfraError::from)?
                .collect::<std::result::Result<Vec<_>, _>>()
                .map_err(InfraError::from)?;

            debug!(count = rows.len(), "listed calendar events");

            Ok(rows)
        })
        .await
        .map_err(map_join_error)?
    }

    async fn attach_remote_id(&self, local_id: &str, remote_id: &str) -> Result<()> {
        let db = Arc::clone(&self.db);
        let local_id = local_id.to_string();
        let remote_id = remote_id.to_string();

        task::spawn_blocking(move || -> Result<()> {
            let conn = db.get_connection()?;
            let now = Utc::now().timestamp_millis();

            let changed = conn
                .execute(
                    "UPDATE calendar_events
                     SET remote_id = ?2, updated_at = ?3
                     WHERE local_id = ?1",
                    params![local_id, remote_id, now],
                )
                .map_err(InfraError::from)?;

            if changed == 0 {
                return Err(HomedashError::NotFound(format!("event {local_id}")));
            }

            debug!(local_id, remote_id, "attached remote id");

            Ok(())
        })
        .await
        .map_err(map_join_error)?
    }

    async fn list_unsynced(&self) -> Result<Vec<CalendarEvent>> {
        let db = Arc::clone(&self.db);

        task::spawn_blocking(move || -> Result<Vec<CalendarEvent>> {
            let conn = db.get_connection()?;

            let mut stmt = conn
                .prepare(&format!(
                    "SELECT {EVENT_COLUMNS}
                     FROM calendar_events
                     WHERE remote_id IS NULL
                     ORDER BY created_at ASC"
                ))
                .map_err(InfraError::from)?;

            let rows = stmt
                .query_map([], map_event_row)
                .map_err(InfraError::from)?
                .collect::<std::result::Result<Vec<_>, _>>()
                .map_err(InfraError::from)?;

            Ok(rows)
        })
        .await
        .map_err(map_join_error)?
    }
}

fn map_event_row(row: &Row<'_>) -> rusqlite::Result<CalendarEvent> {
    let attendees_json: String = row.get(8)?;
    let attendees: Vec<String> = serde_json::from_str(&attendees_json).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(
            8,
            rusqlite::types::Type::Text,
            format!("invalid attendees payload: {e}").into(),
        )
    })?;

    let origin_str: String = row.get(9)?;
    let origin = EventOrigin::parse(&origin_str).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            9,
            rusqlite::types::Type::Text,
            format!("unknown event origin: {origin_str}").into(),
        )
    })?;

    Ok(CalendarEvent {
        local_id: row.get(0)?,
        remote_id: row.get(1)?,
        title: row.get(2)?,
        description: row.get(3)?,
        location: row.get(4)?,
        color_tag: row.get(5)?,
        start: datetime_from_millis(6, row.get(6)?)?,
        end: datetime_from_millis(7, row.get(7)?)?,
        attendees,
        origin,
    })
}

fn datetime_from_millis(idx: usize, ms: i64) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::<Utc>::from_timestamp_millis(ms).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            idx,
            rusqlite::types::Type::Integer,
            format!("timestamp {ms} out of range").into(),
        )
    })
}

pub(crate) fn map_join_error(err: task::JoinError) -> HomedashError {
    HomedashError::Internal(format!("database task failed: {err}"))
}

#[cfg(test)]
mod tests {
    use chrono::Duration;
    use tempfile::TempDir;
    use uuid::Uuid;

    use super::*;

    fn setup() -> (SqliteEventStore, TempDir) {
        let temp = TempDir::new().unwrap();
        let db = Arc::new(DbManager::new(temp.path().join("events.db"), 2).unwrap());
        db.run_migrations().unwrap();
        (SqliteEventStore::new(db), temp)
    }

    fn local_event(title: &str, start: DateTime<Utc>) -> CalendarEvent {
        CalendarEvent {
            local_id: Some(Uuid::now_v7().to_string()),
            remote_id: None,
            title: title.to_string(),
            description: Some("desc".to_string()),
            location: Some("home office".to_string()),
            color_tag: Some("5".to_string()),
            start,
            end: start + Duration::hours(1),
            attendees: vec!["ada@example.com".to_string()],
            origin: EventOrigin::Local,
        }
    }

    #[tokio::test]
    async fn insert_and_list_round_trips_all_fields() {
        let (store, _temp) = setup();
        let now = Utc::now();
        let event = local_event("Planning", now);

        store.insert_event(&event).await.unwrap();

        let range = EventRange { start: now - Duration::hours(1), end: now + Duration::hours(2) };
        let listed = store.list_events(&range).await.unwrap();

        assert_eq!(listed.len(), 1);
        let got = &listed[0];
        assert_eq!(got.local_id, event.local_id);
        assert_eq!(got.title, "Planning");
        assert_eq!(got.location.as_deref(), Some("home office"));
        assert_eq!(got.attendees, vec!["ada@example.com".to_string()]);
        assert_eq!(got.origin, EventOrigin::Local);
        assert_eq!(got.start.timestamp_millis(), event.start.timestamp_millis());
    }

    #[tokio::test]
    async fn listing_filters_by_overlap_and_orders_by_start() {
        let (store, _temp) = setup();
        let now = Utc::now();

        store.insert_event(&local_event("late", now + Duration::hours(1))).await.unwrap();
        store.insert_event(&local_event("early", now)).await.unwrap();
        store.insert_event(&local_event("outside", now + Duration::days(2))).await.unwrap();

        let range =
            EventRange { start: now - Duration::hours(1), end: now + Duration::hours(3) };
        let listed = store.list_events(&range).await.unwrap();

        let titles: Vec<_> = listed.iter().map(|e| e.title.as_str()).collect();
        assert_eq!(titles, vec!["early", "late"]);
    }

    #[tokio::test]
    async fn attach_remote_id_marks_event_synced() {
        let (store, _temp) = setup();
        let now = Utc::now();
        let event = local_event("to sync", now);
        let local_id = event.local_id.clone().unwrap();

        store.insert_event(&event).await.unwrap();
        assert_eq!(store.list_unsynced().await.unwrap().len(), 1);

        store.attach_remote_id(&local_id, "g-123").await.unwrap();

        assert!(store.list_unsynced().await.unwrap().is_empty());
        let range = EventRange { start: now - Duration::hours(1), end: now + Duration::hours(2) };
        let listed = store.list_events(&range).await.unwrap();
        assert_eq!(listed[0].remote_id.as_deref(), Some("g-123"));
        assert!(listed[0].is_synced());
    }

    #[tokio::test]
    async fn attaching_to_a_missing_event_is_not_found() {
        let (store, _temp) = setup();
        let result = store.attach_remote_id("missing", "g-1").await;
        assert!(matches!(result, Err(HomedashError::NotFound(_))));
    }

    #[tokio::test]
    async fn unsynced_events_come_back_in_creation_order() {
        let (store, _temp) = setup();
        let now = Utc::now();

        // Insert out of chronological order; creation order must win
        store.insert_event(&local_event("first", now + Duration::hours(5))).await.unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        store.insert_event(&local_event("second", now)).await.unwrap();

        let unsynced = store.list_unsynced().await.unwrap();
        let titles: Vec<_> = unsynced.iter().map(|e| e.title.as_str()).collect();
        assert_eq!(titles, vec!["first", "second"]);
    }
}
