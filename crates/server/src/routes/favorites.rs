//! Favorites endpoints

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::Response;
use axum::routing::{delete, get};
use axum::{Json, Router};
use homedash_domain::FavoriteDraft;

use super::{require_session, AppError};
use crate::AppContext;

pub fn router() -> Router<Arc<AppContext>> {
    Router::new()
        .route("/favorites", get(list).post(add))
        .route("/favorites/{id}", delete(remove))
}

/// GET /favorites - the session user's watch list
async fn list(
    State(ctx): State<Arc<AppContext>>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    let authed = require_session(&ctx, &headers).await?;

    let favorites = ctx.favorites.list(&authed.session.user.id).await?;

    Ok(authed.respond(Json(favorites)))
}

/// POST /favorites - add to the watch list (409 on duplicates)
async fn add(
    State(ctx): State<Arc<AppContext>>,
    headers: HeaderMap,
    Json(draft): Json<FavoriteDraft>,
) -> Result<Response, AppError> {
    let authed = require_session(&ctx, &headers).await?;

    let favorite = ctx.favorites.add(&authed.session.user.id, &draft).await?;

    Ok(authed.respond((StatusCode::CREATED, Json(favorite))))
}

/// DELETE /favorites/{id}
async fn remove(
    State(ctx): State<Arc<AppContext>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    let authed = require_session(&ctx, &headers).await?;

    ctx.favorites.remove(&authed.session.user.id, &id).await?;

    Ok(authed.respond(StatusCode::NO_CONTENT))
}
