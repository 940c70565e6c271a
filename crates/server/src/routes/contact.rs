//! Contact endpoint forwarding to the configured webhook

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use homedash_domain::{ContactMessage, HomedashError};
use serde_json::json;

use super::AppError;
use crate::AppContext;

pub fn router() -> Router<Arc<AppContext>> {
    Router::new().route("/contact/discord", post(send))
}

/// POST /contact/discord - validate and forward a contact message
async fn send(
    State(ctx): State<Arc<AppContext>>,
    Json(message): Json<ContactMessage>,
) -> Result<(StatusCode, Json<serde_json::Value>), AppError> {
    message.validate()?;

    let notifier = ctx.notifier.as_ref().ok_or_else(|| {
        HomedashError::Config("contact webhook is not configured".to_string())
    })?;

    notifier.send(&message).await?;

    Ok((StatusCode::ACCEPTED, Json(json!({ "status": "sent" }))))
}
