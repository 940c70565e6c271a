//! Authentication endpoints

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::HeaderMap;
use axum::response::{IntoResponse, Redirect, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use homedash_core::SessionOutcome;
use homedash_domain::UserIdentity;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{apply_cookie, cookie_directive, AppError};
use crate::cookies;
use crate::AppContext;

pub fn router() -> Router<Arc<AppContext>> {
    Router::new()
        .route("/auth/google", get(login))
        .route("/auth/session", get(session))
        .route("/auth/logout", post(logout))
}

#[derive(Debug, Deserialize)]
struct LoginQuery {
    code: Option<String>,
}

/// GET /auth/google - redirect to the provider, or finish the code exchange
async fn login(
    State(ctx): State<Arc<AppContext>>,
    Query(query): Query<LoginQuery>,
) -> Result<Response, AppError> {
    let Some(code) = query.code else {
        let state = Uuid::new_v4().to_string();
        let url = ctx.sessions.authorization_url(&state);
        return Ok(Redirect::temporary(&url).into_response());
    };

    let session = ctx.sessions.exchange_code(&code).await?;
    let encoded = session.encode_cookie()?;

    let mut response = Redirect::to("/").into_response();
    apply_cookie(
        &mut response,
        Some(&cookies::build_cookie(&ctx.config.session.cookie_name, &encoded)),
    );
    Ok(response)
}

/// Session payload returned to the UI. Tokens stay out of the body; the
/// cookie already carries them.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SessionView {
    user: UserIdentity,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    expires_at: DateTime<Utc>,
}

/// GET /auth/session - resolve the cookie, refreshing if necessary
async fn session(
    State(ctx): State<Arc<AppContext>>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    let raw = cookies::read_cookie(&headers, &ctx.config.session.cookie_name);
    let resolved = ctx.sessions.resolve(raw.as_deref()).await;
    let set_cookie = cookie_directive(&ctx, &resolved.cookie);

    match resolved.outcome {
        SessionOutcome::Authenticated(session) => {
            let view = SessionView { user: session.user, expires_at: session.expires_at };
            let mut response = Json(view).into_response();
            apply_cookie(&mut response, set_cookie.as_deref());
            Ok(response)
        }
        SessionOutcome::Unauthenticated => Err(AppError::with_cookie(
            homedash_domain::HomedashError::SessionExpired,
            set_cookie,
        )),
    }
}

/// POST /auth/logout - clear the session cookie
async fn logout(State(ctx): State<Arc<AppContext>>) -> Response {
    let action = ctx.sessions.logout();
    let mut response = axum::http::StatusCode::NO_CONTENT.into_response();
    apply_cookie(&mut response, cookie_directive(&ctx, &action).as_deref());
    response
}
