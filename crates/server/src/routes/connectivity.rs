//! Explicit connectivity transitions
//!
//! The UI reports the browser's online/offline events here; the startup
//! probe sets the initial state.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::put;
use axum::{Json, Router};
use homedash_domain::ConnectivityState;
use serde::Deserialize;

use crate::AppContext;

pub fn router() -> Router<Arc<AppContext>> {
    Router::new().route("/connectivity", put(transition))
}

#[derive(Debug, Deserialize)]
struct TransitionBody {
    state: ConnectivityState,
}

/// PUT /connectivity - record a network event
async fn transition(
    State(ctx): State<Arc<AppContext>>,
    Json(body): Json<TransitionBody>,
) -> StatusCode {
    ctx.connectivity.set_state(body.state);
    StatusCode::NO_CONTENT
}
