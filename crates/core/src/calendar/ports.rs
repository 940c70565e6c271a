//! Calendar port interfaces
//!
//! These traits define the boundaries between the reconciliation logic
//! and infrastructure implementations.

use async_trait::async_trait;
use homedash_domain::{
    CalendarEvent, ColorPalette, ConnectivityState, EventDraft, EventRange, Result,
};

/// Trait for the remote calendar provider API.
#[async_trait]
pub trait RemoteCalendar: Send + Sync {
    /// Fetch remote events within a time range.
    async fn list_events(&self, access_token: &str, range: &EventRange)
        -> Result<Vec<CalendarEvent>>;

    /// Create an event remotely; returns the provider-assigned id.
    async fn create_event(&self, access_token: &str, draft: &EventDraft) -> Result<String>;

    /// Fetch the provider color palette.
    async fn color_palette(&self, access_token: &str) -> Result<ColorPalette>;
}

/// Trait for the local (embedded) event store.
#[async_trait]
pub trait EventStore: Send + Sync {
    /// Persist an event record.
    async fn insert_event(&self, event: &CalendarEvent) -> Result<()>;

    /// Events overlapping the range, ordered by start time.
    async fn list_events(&self, range: &EventRange) -> Result<Vec<CalendarEvent>>;

    /// Record the remote id on a local record after a successful push.
    async fn attach_remote_id(&self, local_id: &str, remote_id: &str) -> Result<()>;

    /// Local-only events (no remote id), in creation order.
    async fn list_unsynced(&self) -> Result<Vec<CalendarEvent>>;
}

/// Trait for the injected connectivity probe.
///
/// The reconciler consults (never owns) this state before each remote
/// operation.
pub trait ConnectivityProbe: Send + Sync {
    fn state(&self) -> ConnectivityState;
}
