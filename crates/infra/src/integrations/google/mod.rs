//! Google OAuth2 and Calendar adapters

mod calendar;
mod oauth;

pub use calendar::GoogleCalendarClient;
pub use oauth::{GoogleIdentityProvider, GoogleIdentitySettings};
