//! Health endpoint

use std::sync::Arc;

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use homedash_core::ConnectivityProbe;
use serde::Serialize;
use tracing::warn;

use crate::AppContext;

pub fn router() -> Router<Arc<AppContext>> {
    Router::new().route("/health", get(health))
}

#[derive(Debug, Serialize)]
struct ComponentHealth {
    name: &'static str,
    healthy: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    healthy: bool,
    connectivity: homedash_domain::ConnectivityState,
    components: Vec<ComponentHealth>,
}

/// GET /health - database probe plus connectivity snapshot
async fn health(State(ctx): State<Arc<AppContext>>) -> Json<HealthResponse> {
    let database = check_database(&ctx).await;
    let healthy = database.healthy;

    Json(HealthResponse {
        healthy,
        connectivity: ctx.connectivity.state(),
        components: vec![database],
    })
}

/// Run a trivial query off the async runtime to exercise the pool.
async fn check_database(ctx: &AppContext) -> ComponentHealth {
    let db = Arc::clone(&ctx.db);
    let result = tokio::task::spawn_blocking(move || {
        let conn = db.get_connection()?;
        conn.query_row("SELECT 1", [], |row| row.get::<_, i64>(0))
            .map_err(|e| homedash_domain::HomedashError::Database(e.to_string()))?;
        Ok::<(), homedash_domain::HomedashError>(())
    })
    .await;

    match result {
        Ok(Ok(())) => ComponentHealth { name: "database", healthy: true, message: None },
        Ok(Err(e)) => {
            warn!(error = %e, "database health check failed");
            ComponentHealth { name: "database", healthy: false, message: Some(e.to_string()) }
        }
        Err(e) => ComponentHealth {
            name: "database",
            healthy: false,
            message: Some(format!("task panic: {e}")),
        },
    }
}
