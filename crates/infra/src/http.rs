//! Shared HTTP client construction
//!
//! One bounded-timeout client per process with no in-library retry: a hung
//! remote call is bounded by the client timeout only, and retry is the
//! caller re-invoking the entry point.

use std::time::Duration;

use homedash_domain::{HomedashError, Result};
use reqwest::Client;

/// Default timeout for provider calls.
pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(10);

/// Build the shared reqwest client.
pub fn build_http_client(timeout: Duration) -> Result<Client> {
    Client::builder()
        .timeout(timeout)
        .no_proxy()
        .user_agent(concat!("homedash/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| HomedashError::Internal(format!("failed to build http client: {e}")))
}
