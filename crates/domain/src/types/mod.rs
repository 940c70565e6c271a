//! Domain types and models

pub mod calendar;
pub mod connectivity;
pub mod contact;
pub mod favorite;
pub mod session;

pub use calendar::{
    CalendarEvent, ColorDefinition, ColorPalette, EventDraft, EventOrigin, EventRange,
};
pub use connectivity::ConnectivityState;
pub use contact::ContactMessage;
pub use favorite::{Favorite, FavoriteDraft};
pub use session::{Session, SessionState, UserIdentity};
