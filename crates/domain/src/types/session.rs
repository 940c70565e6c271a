//! Session record and its cookie wire format
//!
//! The session cookie is the sole persisted auth state between requests.
//! The JSON layout (`user`, `accessToken`, `refreshToken`, `expiresAt` in
//! epoch milliseconds) is fixed for compatibility with existing cookies.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::{HomedashError, Result};

/// Authenticated identity as reported by the provider userinfo endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserIdentity {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
}

/// Server-issued record of an identity-provider login.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub user: UserIdentity,
    pub access_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub expires_at: DateTime<Utc>,
}

/// Classification of a parsed session relative to a point in time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// `now < expires_at`
    Valid,
    /// Expired, but a refresh token is present
    ExpiredRefreshable,
    /// Expired with no refresh token; only a new login can recover
    ExpiredTerminal,
}

impl Session {
    /// Assemble a session from a fresh token grant.
    ///
    /// `expires_in_secs` is the provider-reported access-token lifetime;
    /// the absolute expiry is computed against the current clock.
    #[must_use]
    pub fn new(
        user: UserIdentity,
        access_token: String,
        refresh_token: Option<String>,
        expires_in_secs: i64,
    ) -> Self {
        Self {
            user,
            access_token,
            refresh_token,
            expires_at: Utc::now() + Duration::seconds(expires_in_secs),
        }
    }

    /// Whether the access token has expired as of `now`.
    #[must_use]
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    /// Classify the session at `now`.
    #[must_use]
    pub fn state_at(&self, now: DateTime<Utc>) -> SessionState {
        if now < self.expires_at {
            SessionState::Valid
        } else if self.refresh_token.is_some() {
            SessionState::ExpiredRefreshable
        } else {
            SessionState::ExpiredTerminal
        }
    }

    /// Produce the refreshed session: new access token and expiry, same
    /// user. The provider's refresh token wins when it returns one;
    /// otherwise the existing token is preserved.
    #[must_use]
    pub fn refreshed(
        &self,
        access_token: String,
        refresh_token: Option<String>,
        expires_in_secs: i64,
    ) -> Self {
        Self {
            user: self.user.clone(),
            access_token,
            refresh_token: refresh_token.or_else(|| self.refresh_token.clone()),
            expires_at: Utc::now() + Duration::seconds(expires_in_secs),
        }
    }

    /// Serialize to the cookie wire format.
    ///
    /// # Errors
    /// Returns `HomedashError::Internal` if serialization fails.
    pub fn encode_cookie(&self) -> Result<String> {
        serde_json::to_string(self)
            .map_err(|e| HomedashError::Internal(format!("failed to encode session cookie: {e}")))
    }

    /// Parse a cookie payload. Fails soft: malformed or incomplete JSON
    /// yields `None` (treated as unauthenticated by the caller).
    #[must_use]
    pub fn decode_cookie(raw: &str) -> Option<Self> {
        serde_json::from_str(raw).ok()
    }
}
