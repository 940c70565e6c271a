//! Session manager
//!
//! Owns the session lifecycle over the cookie payload:
//! - Cookie resolution with expiry validation
//! - Single-shot token refresh on expiry (no retry, no single-flight)
//! - Authorization-code exchange and profile assembly
//! - Logout
//!
//! The cookie is the sole persisted auth state; every outcome carries the
//! cookie directive the HTTP layer must apply.

use std::sync::Arc;

use chrono::Utc;
use homedash_domain::{HomedashError, Result, Session, SessionState};
use tracing::{debug, info, warn};

use super::ports::IdentityProvider;

/// What the caller must do to the session cookie after an operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CookieAction {
    /// Leave the cookie untouched.
    Keep,
    /// Overwrite the cookie with this encoded payload.
    Write(String),
    /// Delete the cookie.
    Clear,
}

/// Authentication outcome of a resolution.
#[derive(Debug, Clone)]
pub enum SessionOutcome {
    Authenticated(Session),
    Unauthenticated,
}

/// Resolution result: outcome plus the cookie directive.
#[derive(Debug, Clone)]
pub struct ResolvedSession {
    pub outcome: SessionOutcome,
    pub cookie: CookieAction,
}

impl ResolvedSession {
    fn unauthenticated(cookie: CookieAction) -> Self {
        Self { outcome: SessionOutcome::Unauthenticated, cookie }
    }

    /// The session, if authenticated.
    #[must_use]
    pub fn session(&self) -> Option<&Session> {
        match &self.outcome {
            SessionOutcome::Authenticated(session) => Some(session),
            SessionOutcome::Unauthenticated => None,
        }
    }
}

/// Session manager over an injected identity provider.
///
/// State machine: `NoSession -> (exchange ok) -> Valid -> (time) ->
/// Expired -> (refresh ok) -> Valid | (refresh fail) -> NoSession`.
/// No other transitions exist.
pub struct SessionManager {
    provider: Arc<dyn IdentityProvider>,
}

impl SessionManager {
    pub fn new(provider: Arc<dyn IdentityProvider>) -> Self {
        Self { provider }
    }

    /// Resolve a raw cookie value into a session.
    ///
    /// Absent or malformed payloads fail soft to `Unauthenticated`. An
    /// expired session with a refresh token triggers exactly one refresh
    /// call; on success the caller is told to rewrite the cookie, on any
    /// failure to delete it.
    pub async fn resolve(&self, cookie_value: Option<&str>) -> ResolvedSession {
        let Some(raw) = cookie_value else {
            return ResolvedSession::unauthenticated(CookieAction::Keep);
        };

        let Some(session) = Session::decode_cookie(raw) else {
            debug!("session cookie failed to parse, treating as unauthenticated");
            return ResolvedSession::unauthenticated(CookieAction::Keep);
        };

        match session.state_at(Utc::now()) {
            SessionState::Valid => ResolvedSession {
                outcome: SessionOutcome::Authenticated(session),
                cookie: CookieAction::Keep,
            },
            SessionState::ExpiredRefreshable => self.refresh(session).await,
            SessionState::ExpiredTerminal => {
                debug!(user = %session.user.email, "session expired with no refresh token");
                ResolvedSession::unauthenticated(CookieAction::Clear)
            }
        }
    }

    async fn refresh(&self, session: Session) -> ResolvedSession {
        // Checked by the caller; guarded here so a direct call can't panic
        // the token endpoint with an empty grant.
        let Some(refresh_token) = session.refresh_token.clone() else {
            return ResolvedSession::unauthenticated(CookieAction::Clear);
        };

        match self.provider.refresh_access_token(&refresh_token).await {
            Ok(grant) => {
                let refreshed =
                    session.refreshed(grant.access_token, grant.refresh_token, grant.expires_in);
                match refreshed.encode_cookie() {
                    Ok(encoded) => {
                        info!(user = %refreshed.user.email, "access token refreshed");
                        ResolvedSession {
                            outcome: SessionOutcome::Authenticated(refreshed),
                            cookie: CookieAction::Write(encoded),
                        }
                    }
                    Err(e) => {
                        warn!(error = %e, "failed to encode refreshed session");
                        ResolvedSession::unauthenticated(CookieAction::Clear)
                    }
                }
            }
            Err(e) => {
                warn!(user = %session.user.email, error = %e, "token refresh failed");
                ResolvedSession::unauthenticated(CookieAction::Clear)
            }
        }
    }

    /// One-shot authorization-code exchange followed by a profile fetch.
    ///
    /// # Errors
    /// Returns `HomedashError::AuthExchange` if either endpoint rejects the
    /// handshake.
    pub async fn exchange_code(&self, code: &str) -> Result<Session> {
        let grant = self.provider.exchange_code(code).await.map_err(auth_exchange)?;
        let user = self.provider.fetch_profile(&grant.access_token).await.map_err(auth_exchange)?;

        info!(user = %user.email, "login exchange completed");

        Ok(Session::new(user, grant.access_token, grant.refresh_token, grant.expires_in))
    }

    /// Logout unconditionally signals cookie deletion. No server-side token
    /// revocation is performed.
    #[must_use]
    pub fn logout(&self) -> CookieAction {
        CookieAction::Clear
    }

    /// Authorization URL for the login redirect.
    #[must_use]
    pub fn authorization_url(&self, state: &str) -> String {
        self.provider.authorization_url(state)
    }
}

fn auth_exchange(err: HomedashError) -> HomedashError {
    match err {
        already @ HomedashError::AuthExchange(_) => already,
        other => HomedashError::AuthExchange(other.to_string()),
    }
}
