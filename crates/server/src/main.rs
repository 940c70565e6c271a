//! Homedash - personal dashboard backend
//!
//! Main entry point for the HTTP server.

use std::sync::Arc;

use homedash_domain::{HomedashError, Result};
use homedash_server::{routes, AppContext};
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("homedash=info,homedash_server=info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

async fn run() -> Result<()> {
    let config = homedash_infra::config::load()?;
    let ctx = Arc::new(AppContext::new(config).await?);

    let bind_addr = ctx.config.server.bind_addr.clone();
    let app = routes::router(ctx);

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .map_err(|e| HomedashError::Config(format!("failed to bind {bind_addr}: {e}")))?;

    info!(addr = %bind_addr, "homedash listening");

    axum::serve(listener, app)
        .await
        .map_err(|e| HomedashError::Internal(format!("server error: {e}")))
}

#[tokio::main]
async fn main() {
    // Initialize logging FIRST so we can see .env loading
    init_tracing();

    match dotenvy::dotenv() {
        Ok(path) => info!(path = %path.display(), "loaded .env"),
        Err(_) => debug!("no .env file found"),
    }

    if let Err(e) = run().await {
        error!(error = %e, "homedash failed to start");
        std::process::exit(1);
    }
}
