//! Session cookie header helpers
//!
//! The cookie value is the percent-encoded JSON session payload; parsing
//! and building stay in one place so the wire format has a single owner.

use axum::http::header::COOKIE;
use axum::http::HeaderMap;

/// Thirty days, matching the longest refresh-token horizon we care about.
const COOKIE_MAX_AGE_SECS: u64 = 30 * 24 * 60 * 60;

/// Extract and percent-decode a cookie value from request headers.
#[must_use]
pub fn read_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    let header = headers.get(COOKIE)?.to_str().ok()?;

    for pair in header.split(';') {
        if let Some((key, value)) = pair.trim().split_once('=') {
            if key == name {
                return urlencoding::decode(value).ok().map(|c| c.into_owned());
            }
        }
    }

    None
}

/// Build a `Set-Cookie` value carrying the encoded session payload.
#[must_use]
pub fn build_cookie(name: &str, value: &str) -> String {
    format!(
        "{name}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={COOKIE_MAX_AGE_SECS}",
        urlencoding::encode(value)
    )
}

/// Build a `Set-Cookie` value that deletes the cookie.
#[must_use]
pub fn clear_cookie(name: &str) -> String {
    format!("{name}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0")
}
