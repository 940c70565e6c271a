//! Hybrid event reconciler
//!
//! Decides which source answers a read (local store vs. remote provider)
//! based on connectivity, and propagates writes between them. Writes are
//! local-first: durability never depends on the remote outcome.

use std::sync::Arc;

use homedash_domain::{
    CalendarEvent, ColorPalette, EventDraft, EventOrigin, EventRange, HomedashError, Result,
};
use serde::Serialize;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use super::ports::{ConnectivityProbe, EventStore, RemoteCalendar};

/// Which source answered a listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ListingSource {
    Local,
    Remote,
}

/// Listing result with the degraded-read marker.
#[derive(Debug, Clone, Serialize)]
pub struct EventListing {
    pub events: Vec<CalendarEvent>,
    pub source: ListingSource,
    /// True when the remote was attempted and failed, so local results
    /// stand in for it.
    pub degraded: bool,
}

/// Outcome counts of one sync batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncReport {
    /// Local-only events pushed to the remote in this invocation.
    pub synced_count: usize,
    /// Events that already carried both ids (no-op, last writer wins).
    pub updated_count: usize,
}

/// Reconciler over injected local, remote, and connectivity ports.
pub struct HybridReconciler {
    remote: Arc<dyn RemoteCalendar>,
    store: Arc<dyn EventStore>,
    connectivity: Arc<dyn ConnectivityProbe>,
}

impl HybridReconciler {
    pub fn new(
        remote: Arc<dyn RemoteCalendar>,
        store: Arc<dyn EventStore>,
        connectivity: Arc<dyn ConnectivityProbe>,
    ) -> Self {
        Self { remote, store, connectivity }
    }

    fn online(&self) -> bool {
        self.connectivity.state().is_online()
    }

    /// List events for a range.
    ///
    /// Offline: the local store answers and the remote is never attempted.
    /// Online: the remote answers; on any remote error the local results
    /// are returned with `degraded = true` instead of failing.
    #[instrument(skip(self, access_token))]
    pub async fn list_events(&self, access_token: &str, range: &EventRange) -> Result<EventListing> {
        if !self.online() {
            debug!("offline, answering listing from local store");
            let events = self.store.list_events(range).await?;
            return Ok(EventListing { events, source: ListingSource::Local, degraded: false });
        }

        match self.remote.list_events(access_token, range).await {
            Ok(events) => {
                Ok(EventListing { events, source: ListingSource::Remote, degraded: false })
            }
            Err(e) => {
                warn!(error = %e, "remote listing failed, falling back to local store");
                let events = self.store.list_events(range).await?;
                Ok(EventListing { events, source: ListingSource::Local, degraded: true })
            }
        }
    }

    /// Create an event, local-first.
    ///
    /// The draft is validated and written to the local store before any
    /// remote attempt. Online, a remote creation is attempted once; on
    /// success the remote id is attached, on failure the event stays
    /// local-only until the next explicit sync (at-least-once; duplicate
    /// remote creation on retry is accepted).
    #[instrument(skip(self, access_token, draft), fields(title = %draft.title))]
    pub async fn create_event(
        &self,
        access_token: Option<&str>,
        draft: &EventDraft,
    ) -> Result<CalendarEvent> {
        draft.validate()?;

        let mut event = CalendarEvent {
            local_id: Some(Uuid::now_v7().to_string()),
            remote_id: None,
            title: draft.title.clone(),
            description: draft.description.clone(),
            location: draft.location.clone(),
            color_tag: draft.color_tag.clone(),
            start: draft.start,
            end: draft.end,
            attendees: draft.attendees.clone(),
            origin: EventOrigin::Local,
        };

        // Durability does not depend on connectivity.
        self.store.insert_event(&event).await?;

        if let (true, Some(token)) = (self.online(), access_token) {
            match self.remote.create_event(token, draft).await {
                Ok(remote_id) => {
                    let local_id = event.local_id.as_deref().unwrap_or_default();
                    self.store.attach_remote_id(local_id, &remote_id).await?;
                    event.remote_id = Some(remote_id);
                    info!(local_id, "event pushed to remote");
                }
                Err(e) => {
                    warn!(error = %e, "remote creation failed, event stays local-only");
                }
            }
        }

        Ok(event)
    }

    /// Push a batch of events to the remote, in input order.
    ///
    /// Events that already carry both ids are no-ops counted as updated
    /// (no update-conflict detection; last writer wins silently). A
    /// per-event remote failure is logged and skipped; the event will be
    /// re-attempted on the next invocation.
    ///
    /// # Errors
    /// Returns `RemoteUnavailable` when offline; sync requires the remote.
    #[instrument(skip(self, access_token, events), fields(batch = events.len()))]
    pub async fn sync_batch(
        &self,
        access_token: &str,
        events: &[CalendarEvent],
    ) -> Result<SyncReport> {
        if !self.online() {
            return Err(HomedashError::RemoteUnavailable(
                "cannot sync while offline".to_string(),
            ));
        }

        let mut report = SyncReport::default();

        for event in events {
            if event.is_synced() {
                report.updated_count += 1;
                continue;
            }

            let Some(local_id) = event.local_id.as_deref() else {
                warn!(title = %event.title, "skipping event with no local id");
                continue;
            };

            let draft = EventDraft {
                title: event.title.clone(),
                description: event.description.clone(),
                location: event.location.clone(),
                color_tag: event.color_tag.clone(),
                start: event.start,
                end: event.end,
                attendees: event.attendees.clone(),
            };

            match self.remote.create_event(access_token, &draft).await {
                Ok(remote_id) => {
                    self.store.attach_remote_id(local_id, &remote_id).await?;
                    report.synced_count += 1;
                }
                Err(e) => {
                    // Continue processing the rest of the batch
                    warn!(local_id, error = %e, "failed to push event");
                }
            }
        }

        info!(
            synced = report.synced_count,
            updated = report.updated_count,
            "sync batch completed"
        );

        Ok(report)
    }

    /// Sync every local-only event currently in the store.
    pub async fn sync_pending(&self, access_token: &str) -> Result<SyncReport> {
        let pending = self.store.list_unsynced().await?;
        self.sync_batch(access_token, &pending).await
    }

    /// Provider color palette passthrough. No local fallback exists.
    ///
    /// # Errors
    /// Returns `RemoteUnavailable` when offline or the provider fails.
    pub async fn color_palette(&self, access_token: &str) -> Result<ColorPalette> {
        if !self.online() {
            return Err(HomedashError::RemoteUnavailable(
                "color palette requires connectivity".to_string(),
            ));
        }
        self.remote.color_palette(access_token).await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use async_trait::async_trait;
    use chrono::{Duration, Utc};
    use homedash_domain::ConnectivityState;

    use super::*;

    /// In-memory event store.
    #[derive(Default)]
    struct MemoryStore {
        events: Mutex<Vec<CalendarEvent>>,
    }

    #[async_trait]
    impl EventStore for MemoryStore {
        async fn insert_event(&self, event: &CalendarEvent) -> Result<()> {
            self.events.lock().unwrap().push(event.clone());
            Ok(())
        }

        async fn list_events(&self, range: &EventRange) -> Result<Vec<CalendarEvent>> {
            let mut events: Vec<_> = self
                .events
                .lock()
                .unwrap()
                .iter()
                .filter(|e| range.overlaps(e))
                .cloned()
                .collect();
            events.sort_by_key(|e| e.start);
            Ok(events)
        }

        async fn attach_remote_id(&self, local_id: &str, remote_id: &str) -> Result<()> {
            let mut events = self.events.lock().unwrap();
            let event = events
                .iter_mut()
                .find(|e| e.local_id.as_deref() == Some(local_id))
                .ok_or_else(|| HomedashError::NotFound(format!("event {local_id}")))?;
            event.remote_id = Some(remote_id.to_string());
            Ok(())
        }

        async fn list_unsynced(&self) -> Result<Vec<CalendarEvent>> {
            Ok(self
                .events
                .lock()
                .unwrap()
                .iter()
                .filter(|e| e.remote_id.is_none())
                .cloned()
                .collect())
        }
    }

    /// Remote that can be scripted to fail, counting every call.
    struct FakeRemote {
        fail: bool,
        calls: AtomicUsize,
    }

    impl FakeRemote {
        fn new(fail: bool) -> Arc<Self> {
            Arc::new(Self { fail, calls: AtomicUsize::new(0) })
        }

        fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl RemoteCalendar for FakeRemote {
        async fn list_events(
            &self,
            _access_token: &str,
            _range: &EventRange,
        ) -> Result<Vec<CalendarEvent>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(HomedashError::RemoteUnavailable("timed out".to_string()));
            }
            Ok(vec![remote_event("g-1")])
        }

        async fn create_event(&self, _access_token: &str, draft: &EventDraft) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(HomedashError::RemoteUnavailable("timed out".to_string()));
            }
            Ok(format!("g-{}", draft.title))
        }

        async fn color_palette(&self, _access_token: &str) -> Result<ColorPalette> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(HomedashError::RemoteUnavailable("timed out".to_string()));
            }
            Ok(ColorPalette::default())
        }
    }

    struct StaticProbe(ConnectivityState);

    impl ConnectivityProbe for StaticProbe {
        fn state(&self) -> ConnectivityState {
            self.0
        }
    }

    fn remote_event(id: &str) -> CalendarEvent {
        let now = Utc::now();
        CalendarEvent {
            local_id: None,
            remote_id: Some(id.to_string()),
            title: "remote".to_string(),
            description: None,
            location: None,
            color_tag: None,
            start: now,
            end: now + Duration::hours(1),
            attendees: Vec::new(),
            origin: EventOrigin::Remote,
        }
    }

    fn draft(title: &str) -> EventDraft {
        let now = Utc::now();
        EventDraft {
            title: title.to_string(),
            description: None,
            location: None,
            color_tag: None,
            start: now,
            end: now + Duration::minutes(30),
            attendees: Vec::new(),
        }
    }

    fn range() -> EventRange {
        let now = Utc::now();
        EventRange { start: now - Duration::hours(1), end: now + Duration::hours(2) }
    }

    fn reconciler(
        remote: Arc<FakeRemote>,
        store: Arc<MemoryStore>,
        state: ConnectivityState,
    ) -> HybridReconciler {
        HybridReconciler::new(remote, store, Arc::new(StaticProbe(state)))
    }

    #[tokio::test]
    async fn offline_listing_never_touches_the_remote() {
        let remote = FakeRemote::new(false);
        let store = Arc::new(MemoryStore::default());
        let r = reconciler(remote.clone(), store.clone(), ConnectivityState::Offline);

        r.create_event(None, &draft("offline event")).await.unwrap();

        let listing = r.list_events("tok", &range()).await.unwrap();
        assert_eq!(listing.source, ListingSource::Local);
        assert!(!listing.degraded);
        assert_eq!(listing.events.len(), 1);
        assert_eq!(listing.events[0].title, "offline event");
        // Exactly the local store's filtered contents, zero remote calls
        assert_eq!(remote.call_count(), 0);
    }

    #[tokio::test]
    async fn online_listing_answers_from_remote() {
        let remote = FakeRemote::new(false);
        let store = Arc::new(MemoryStore::default());
        let r = reconciler(remote.clone(), store, ConnectivityState::Online);

        let listing = r.list_events("tok", &range()).await.unwrap();
        assert_eq!(listing.source, ListingSource::Remote);
        assert!(!listing.degraded);
        assert_eq!(listing.events[0].remote_id, Some("g-1".to_string()));
    }

    #[tokio::test]
    async fn remote_failure_degrades_to_local() {
        let remote = FakeRemote::new(true);
        let store = Arc::new(MemoryStore::default());
        store.insert_event(&local_only("cached")).await.unwrap();
        let r = reconciler(remote, store, ConnectivityState::Online);

        let listing = r.list_events("tok", &range()).await.unwrap();
        assert_eq!(listing.source, ListingSource::Local);
        assert!(listing.degraded);
        assert_eq!(listing.events.len(), 1);
    }

    fn local_only(title: &str) -> CalendarEvent {
        let now = Utc::now();
        CalendarEvent {
            local_id: Some(Uuid::now_v7().to_string()),
            remote_id: None,
            title: title.to_string(),
            description: None,
            location: None,
            color_tag: None,
            start: now,
            end: now + Duration::minutes(30),
            attendees: Vec::new(),
            origin: EventOrigin::Local,
        }
    }

    #[tokio::test]
    async fn create_is_durable_locally_even_when_remote_fails() {
        let remote = FakeRemote::new(true);
        let store = Arc::new(MemoryStore::default());
        let r = reconciler(remote, store.clone(), ConnectivityState::Online);

        let event = r.create_event(Some("tok"), &draft("Test")).await.unwrap();
        assert!(event.local_id.is_some());
        assert!(event.remote_id.is_none());

        // Immediate local read returns the created event regardless of
        // the remote outcome
        let stored = store.list_events(&range()).await.unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].title, "Test");
    }

    #[tokio::test]
    async fn create_attaches_remote_id_when_online() {
        let remote = FakeRemote::new(false);
        let store = Arc::new(MemoryStore::default());
        let r = reconciler(remote, store.clone(), ConnectivityState::Online);

        let event = r.create_event(Some("tok"), &draft("Synced")).await.unwrap();
        assert_eq!(event.remote_id, Some("g-Synced".to_string()));

        let stored = store.list_events(&range()).await.unwrap();
        assert!(stored[0].is_synced());
    }

    #[tokio::test]
    async fn offline_create_yields_local_only_event_visible_offline() {
        let remote = FakeRemote::new(false);
        let store = Arc::new(MemoryStore::default());
        let r = reconciler(remote.clone(), store, ConnectivityState::Offline);

        let event = r.create_event(Some("tok"), &draft("Test")).await.unwrap();
        assert!(event.local_id.is_some());
        assert!(event.remote_id.is_none());
        assert_eq!(remote.call_count(), 0);

        let listing = r.list_events("tok", &range()).await.unwrap();
        assert!(listing.events.iter().any(|e| e.local_id == event.local_id));
    }

    #[tokio::test]
    async fn invalid_draft_is_rejected_before_any_write() {
        let remote = FakeRemote::new(false);
        let store = Arc::new(MemoryStore::default());
        let r = reconciler(remote, store.clone(), ConnectivityState::Online);

        let mut bad = draft("");
        bad.title = String::new();
        assert!(matches!(
            r.create_event(Some("tok"), &bad).await,
            Err(HomedashError::Validation { .. })
        ));
        assert!(store.list_events(&range()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn sync_batch_counts_match_for_purely_local_batch() {
        let remote = FakeRemote::new(false);
        let store = Arc::new(MemoryStore::default());
        let r = reconciler(remote, store.clone(), ConnectivityState::Online);

        let events: Vec<_> = (0..3).map(|i| local_only(&format!("e{i}"))).collect();
        for event in &events {
            store.insert_event(event).await.unwrap();
        }

        let report = r.sync_batch("tok", &events).await.unwrap();
        assert_eq!(report.synced_count, 3);
        assert_eq!(report.updated_count, 0);

        // Every event now carries both ids
        assert!(store.list_unsynced().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn already_synced_events_are_noops_counted_as_updated() {
        let remote = FakeRemote::new(false);
        let store = Arc::new(MemoryStore::default());
        let r = reconciler(remote.clone(), store, ConnectivityState::Online);

        let mut event = local_only("done");
        event.remote_id = Some("g-done".to_string());

        let report = r.sync_batch("tok", &[event]).await.unwrap();
        assert_eq!(report.synced_count, 0);
        assert_eq!(report.updated_count, 1);
        assert_eq!(remote.call_count(), 0);
    }

    #[tokio::test]
    async fn sync_batch_refuses_to_run_offline() {
        let remote = FakeRemote::new(false);
        let store = Arc::new(MemoryStore::default());
        let r = reconciler(remote, store, ConnectivityState::Offline);

        let result = r.sync_batch("tok", &[local_only("pending")]).await;
        assert!(matches!(result, Err(HomedashError::RemoteUnavailable(_))));
    }

    #[tokio::test]
    async fn sync_pending_pushes_only_unsynced_events() {
        let remote = FakeRemote::new(false);
        let store = Arc::new(MemoryStore::default());
        let r = reconciler(remote, store.clone(), ConnectivityState::Online);

        store.insert_event(&local_only("a")).await.unwrap();
        let mut synced = local_only("b");
        synced.remote_id = Some("g-b".to_string());
        store.insert_event(&synced).await.unwrap();

        let report = r.sync_pending("tok").await.unwrap();
        assert_eq!(report.synced_count, 1);
        assert_eq!(report.updated_count, 0);
    }

    #[tokio::test]
    async fn color_palette_requires_connectivity() {
        let remote = FakeRemote::new(false);
        let store = Arc::new(MemoryStore::default());
        let r = reconciler(remote, store, ConnectivityState::Offline);

        assert!(matches!(
            r.color_palette("tok").await,
            Err(HomedashError::RemoteUnavailable(_))
        ));
    }
}
