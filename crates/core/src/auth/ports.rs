//! Identity-provider port interface

use async_trait::async_trait;
use homedash_domain::{Result, UserIdentity};

/// Token material returned by the provider's token endpoint.
#[derive(Debug, Clone)]
pub struct TokenGrant {
    pub access_token: String,
    /// Absent on refresh responses and for providers that don't issue one.
    pub refresh_token: Option<String>,
    /// Access-token lifetime in seconds.
    pub expires_in: i64,
}

/// Trait for the OAuth2 identity provider (token + userinfo endpoints).
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// One-shot authorization-code exchange.
    async fn exchange_code(&self, code: &str) -> Result<TokenGrant>;

    /// Exchange a refresh token for a new access token.
    async fn refresh_access_token(&self, refresh_token: &str) -> Result<TokenGrant>;

    /// Fetch the authenticated user's profile.
    async fn fetch_profile(&self, access_token: &str) -> Result<UserIdentity>;

    /// Authorization URL the browser is redirected to at login start.
    fn authorization_url(&self, state: &str) -> String;
}
