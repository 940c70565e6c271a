//! Google OAuth2 identity provider
//!
//! Implements the token and userinfo legs of the login flow. Endpoints come
//! from settings so tests can point the adapter at a mock server.

use async_trait::async_trait;
use homedash_core::{IdentityProvider, TokenGrant};
use homedash_domain::{GoogleConfig, HomedashError, Result, UserIdentity};
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;
use url::Url;

/// Connection settings for the identity provider.
#[derive(Debug, Clone)]
pub struct GoogleIdentitySettings {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
    pub auth_endpoint: String,
    pub token_endpoint: String,
    pub userinfo_endpoint: String,
    pub scopes: Vec<String>,
}

impl GoogleIdentitySettings {
    /// Build settings from the application configuration.
    #[must_use]
    pub fn from_config(config: &GoogleConfig) -> Self {
        Self {
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
            redirect_uri: config.redirect_uri.clone(),
            auth_endpoint: config.auth_endpoint.clone(),
            token_endpoint: config.token_endpoint.clone(),
            userinfo_endpoint: config.userinfo_endpoint.clone(),
            scopes: config.scopes.clone(),
        }
    }
}

/// Google implementation of the identity-provider port.
pub struct GoogleIdentityProvider {
    http: Client,
    settings: GoogleIdentitySettings,
}

impl GoogleIdentityProvider {
    pub fn new(settings: GoogleIdentitySettings, http: Client) -> Self {
        Self { http, settings }
    }
}

#[async_trait]
impl IdentityProvider for GoogleIdentityProvider {
    async fn exchange_code(&self, code: &str) -> Result<TokenGrant> {
        let response = self
            .http
            .post(&self.settings.token_endpoint)
            .form(&[
                ("code", code),
                ("client_id", self.settings.client_id.as_str()),
                ("client_secret", self.settings.client_secret.as_str()),
                ("redirect_uri", self.settings.redirect_uri.as_str()),
                ("grant_type", "authorization_code"),
            ])
            .send()
            .await
            .map_err(|e| HomedashError::AuthExchange(format!("token request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_else(|_| "unknown error".to_string());
            return Err(HomedashError::AuthExchange(format!(
                "token endpoint returned {status}: {body}"
            )));
        }

        let token: TokenResponse = response.json().await.map_err(|e| {
            HomedashError::AuthExchange(format!("failed to parse token response: {e}"))
        })?;

        debug!("authorization code exchanged");

        Ok(TokenGrant {
            access_token: token.access_token,
            refresh_token: token.refresh_token,
            expires_in: token.expires_in,
        })
    }

    async fn refresh_access_token(&self, refresh_token: &str) -> Result<TokenGrant> {
        let response = self
            .http
            .post(&self.settings.token_endpoint)
            .form(&[
                ("client_id", self.settings.client_id.as_str()),
                ("client_secret", self.settings.client_secret.as_str()),
                ("refresh_token", refresh_token),
                ("grant_type", "refresh_token"),
            ])
            .send()
            .await
            .map_err(|e| HomedashError::AuthExchange(format!("refresh request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_else(|_| "unknown error".to_string());
            return Err(HomedashError::AuthExchange(format!(
                "token refresh failed ({status}): {body}"
            )));
        }

        let token: TokenResponse = response.json().await.map_err(|e| {
            HomedashError::AuthExchange(format!("failed to parse refresh response: {e}"))
        })?;

        Ok(TokenGrant {
            access_token: token.access_token,
            refresh_token: token.refresh_token,
            expires_in: token.expires_in,
        })
    }

    async fn fetch_profile(&self, access_token: &str) -> Result<UserIdentity> {
        let response = self
            .http
            .get(&self.settings.userinfo_endpoint)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| HomedashError::AuthExchange(format!("userinfo request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            return Err(HomedashError::AuthExchange(format!(
                "userinfo endpoint returned {status}"
            )));
        }

        let info: UserInfoResponse = response.json().await.map_err(|e| {
            HomedashError::AuthExchange(format!("failed to parse userinfo response: {e}"))
        })?;

        let email = info
            .email
            .ok_or_else(|| HomedashError::AuthExchange("profile has no email claim".into()))?;

        Ok(UserIdentity {
            id: info.sub,
            name: info.name.unwrap_or_else(|| email.clone()),
            email,
            avatar_url: info.picture,
        })
    }

    fn authorization_url(&self, state: &str) -> String {
        let Ok(mut url) = Url::parse(&self.settings.auth_endpoint) else {
            return self.settings.auth_endpoint.clone();
        };

        url.query_pairs_mut()
            .append_pair("client_id", &self.settings.client_id)
            .append_pair("redirect_uri", &self.settings.redirect_uri)
            .append_pair("response_type", "code")
            .append_pair("scope", &self.settings.scopes.join(" "))
            .append_pair("access_type", "offline")
            .append_pair("prompt", "consent")
            .append_pair("state", state);

        url.to_string()
    }
}

/// Standard OAuth 2.0 token response (RFC 6749).
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    refresh_token: Option<String>,
    expires_in: i64,
}

#[derive(Debug, Deserialize)]
struct UserInfoResponse {
    sub: String,
    name: Option<String>,
    email: Option<String>,
    picture: Option<String>,
}
