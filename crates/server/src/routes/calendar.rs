//! Calendar endpoints over the hybrid reconciler

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::Response;
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use homedash_domain::{EventDraft, EventRange};
use serde::Deserialize;

use super::{require_session, AppError};
use crate::AppContext;

pub fn router() -> Router<Arc<AppContext>> {
    Router::new()
        .route("/calendar/events", get(list_events))
        .route("/calendar/google/create", post(create_event))
        .route("/calendar/sync", post(sync))
        .route("/calendar/colors", get(colors))
}

#[derive(Debug, Deserialize)]
struct RangeQuery {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

/// GET /calendar/events?start=..&end=.. - hybrid listing
async fn list_events(
    State(ctx): State<Arc<AppContext>>,
    headers: HeaderMap,
    Query(query): Query<RangeQuery>,
) -> Result<Response, AppError> {
    let authed = require_session(&ctx, &headers).await?;
    let range = EventRange { start: query.start, end: query.end };

    let listing = ctx.reconciler.list_events(&authed.session.access_token, &range).await?;

    Ok(authed.respond(Json(listing)))
}

/// POST /calendar/google/create - local-first event creation
async fn create_event(
    State(ctx): State<Arc<AppContext>>,
    headers: HeaderMap,
    Json(draft): Json<EventDraft>,
) -> Result<Response, AppError> {
    let authed = require_session(&ctx, &headers).await?;

    let event =
        ctx.reconciler.create_event(Some(&authed.session.access_token), &draft).await?;

    Ok(authed.respond((StatusCode::CREATED, Json(event))))
}

/// POST /calendar/sync - push local-only events to the remote
async fn sync(
    State(ctx): State<Arc<AppContext>>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    let authed = require_session(&ctx, &headers).await?;

    let report = ctx.reconciler.sync_pending(&authed.session.access_token).await?;

    Ok(authed.respond(Json(report)))
}

/// GET /calendar/colors - provider palette passthrough
async fn colors(
    State(ctx): State<Arc<AppContext>>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    let authed = require_session(&ctx, &headers).await?;

    let palette = ctx.reconciler.color_palette(&authed.session.access_token).await?;

    Ok(authed.respond(Json(palette)))
}
