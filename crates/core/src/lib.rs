//! # Homedash Core
//!
//! Pure business logic layer - no infrastructure dependencies.
//!
//! This crate contains:
//! - Port/adapter interfaces (traits)
//! - The session lifecycle and hybrid reconciliation services
//!
//! ## Architecture Principles
//! - Only depends on `homedash-domain`
//! - No database, HTTP, or platform code
//! - All external dependencies via traits

pub mod auth;
pub mod calendar;
pub mod contact;
pub mod favorites;

// Re-export specific items to avoid ambiguity
pub use auth::ports::{IdentityProvider, TokenGrant};
pub use auth::service::{CookieAction, ResolvedSession, SessionManager, SessionOutcome};
pub use calendar::ports::{ConnectivityProbe, EventStore, RemoteCalendar};
pub use calendar::reconciler::{EventListing, HybridReconciler, ListingSource, SyncReport};
pub use contact::ContactNotifier;
pub use favorites::ports::{FavoriteStore, NewFavorite};
pub use favorites::FavoritesService;
