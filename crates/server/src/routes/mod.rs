//! HTTP routes and error mapping

pub mod auth;
pub mod calendar;
pub mod connectivity;
pub mod contact;
pub mod favorites;
pub mod health;

use std::sync::Arc;

use axum::http::header::SET_COOKIE;
use axum::http::{HeaderMap, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::{Json, Router};
use homedash_core::{CookieAction, SessionOutcome};
use homedash_domain::{HomedashError, Session};

use crate::cookies;
use crate::AppContext;

/// Compose the full application router.
pub fn router(ctx: Arc<AppContext>) -> Router {
    Router::new()
        .merge(auth::router())
        .merge(calendar::router())
        .merge(favorites::router())
        .merge(contact::router())
        .merge(connectivity::router())
        .merge(health::router())
        .with_state(ctx)
}

/// Route-level error: domain error plus an optional cookie directive that
/// must survive the failure (e.g. clearing a dead session cookie on 401).
#[derive(Debug)]
pub struct AppError {
    error: HomedashError,
    set_cookie: Option<String>,
}

impl AppError {
    fn with_cookie(error: HomedashError, set_cookie: Option<String>) -> Self {
        Self { error, set_cookie }
    }
}

impl From<HomedashError> for AppError {
    fn from(error: HomedashError) -> Self {
        Self { error, set_cookie: None }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self.error {
            HomedashError::SessionExpired => StatusCode::UNAUTHORIZED,
            HomedashError::Validation { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            HomedashError::Conflict(_) => StatusCode::CONFLICT,
            HomedashError::NotFound(_) => StatusCode::NOT_FOUND,
            HomedashError::AuthExchange(_) => StatusCode::BAD_GATEWAY,
            HomedashError::RemoteUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            HomedashError::Database(_) | HomedashError::Config(_) | HomedashError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let mut response = (status, Json(&self.error)).into_response();
        apply_cookie(&mut response, self.set_cookie.as_deref());
        response
    }
}

/// Append a `Set-Cookie` header when a directive is present.
pub(crate) fn apply_cookie(response: &mut Response, set_cookie: Option<&str>) {
    if let Some(value) = set_cookie {
        if let Ok(header) = HeaderValue::from_str(value) {
            response.headers_mut().append(SET_COOKIE, header);
        }
    }
}

/// Render a cookie directive into a `Set-Cookie` value.
pub(crate) fn cookie_directive(ctx: &AppContext, action: &CookieAction) -> Option<String> {
    let name = &ctx.config.session.cookie_name;
    match action {
        CookieAction::Keep => None,
        CookieAction::Write(encoded) => Some(cookies::build_cookie(name, encoded)),
        CookieAction::Clear => Some(cookies::clear_cookie(name)),
    }
}

/// An authenticated request: the session plus any cookie rewrite produced
/// by a refresh along the way.
pub(crate) struct Authed {
    pub session: Session,
    pub set_cookie: Option<String>,
}

impl Authed {
    /// Attach this request's cookie directive to a successful response.
    pub fn respond(&self, response: impl IntoResponse) -> Response {
        let mut response = response.into_response();
        apply_cookie(&mut response, self.set_cookie.as_deref());
        response
    }
}

/// Resolve the session cookie or fail with 401 (clearing the cookie when
/// the resolution says so).
pub(crate) async fn require_session(
    ctx: &AppContext,
    headers: &HeaderMap,
) -> Result<Authed, AppError> {
    let raw = cookies::read_cookie(headers, &ctx.config.session.cookie_name);
    let resolved = ctx.sessions.resolve(raw.as_deref()).await;
    let set_cookie = cookie_directive(ctx, &resolved.cookie);

    match resolved.outcome {
        SessionOutcome::Authenticated(session) => Ok(Authed { session, set_cookie }),
        SessionOutcome::Unauthenticated => {
            Err(AppError::with_cookie(HomedashError::SessionExpired, set_cookie))
        }
    }
}
