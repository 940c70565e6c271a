//! Configuration structures
//!
//! Plain data; loading lives in the infra crate.

use serde::{Deserialize, Serialize};

/// Top-level application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub google: GoogleConfig,
    #[serde(default)]
    pub discord: DiscordConfig,
    #[serde(default)]
    pub connectivity: ConnectivityConfig,
    #[serde(default)]
    pub session: SessionConfig,
}

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { bind_addr: default_bind_addr() }
    }
}

fn default_bind_addr() -> String {
    "127.0.0.1:8787".to_string()
}

/// SQLite settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub path: String,
    #[serde(default = "default_pool_size")]
    pub pool_size: u32,
}

fn default_pool_size() -> u32 {
    8
}

/// Google OAuth + Calendar settings.
///
/// Endpoint fields default to the public Google endpoints and exist so tests
/// can point the adapters at a mock server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoogleConfig {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
    #[serde(default = "default_auth_endpoint")]
    pub auth_endpoint: String,
    #[serde(default = "default_token_endpoint")]
    pub token_endpoint: String,
    #[serde(default = "default_userinfo_endpoint")]
    pub userinfo_endpoint: String,
    #[serde(default = "default_calendar_endpoint")]
    pub calendar_endpoint: String,
    #[serde(default = "default_scopes")]
    pub scopes: Vec<String>,
}

impl GoogleConfig {
    /// Build a config with the public Google endpoints and default scopes.
    #[must_use]
    pub fn with_credentials(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        redirect_uri: impl Into<String>,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            redirect_uri: redirect_uri.into(),
            auth_endpoint: default_auth_endpoint(),
            token_endpoint: default_token_endpoint(),
            userinfo_endpoint: default_userinfo_endpoint(),
            calendar_endpoint: default_calendar_endpoint(),
            scopes: default_scopes(),
        }
    }
}

fn default_auth_endpoint() -> String {
    "https://accounts.google.com/o/oauth2/v2/auth".to_string()
}

fn default_token_endpoint() -> String {
    "https://oauth2.googleapis.com/token".to_string()
}

fn default_userinfo_endpoint() -> String {
    "https://openidconnect.googleapis.com/v1/userinfo".to_string()
}

fn default_calendar_endpoint() -> String {
    "https://www.googleapis.com/calendar/v3".to_string()
}

fn default_scopes() -> Vec<String> {
    vec![
        "https://www.googleapis.com/auth/calendar".to_string(),
        "openid".to_string(),
        "email".to_string(),
        "profile".to_string(),
    ]
}

/// Discord contact-webhook settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DiscordConfig {
    pub webhook_url: Option<String>,
}

/// Reachability probe settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectivityConfig {
    #[serde(default = "default_probe_url")]
    pub probe_url: String,
    #[serde(default = "default_probe_timeout_secs")]
    pub probe_timeout_secs: u64,
}

impl Default for ConnectivityConfig {
    fn default() -> Self {
        Self { probe_url: default_probe_url(), probe_timeout_secs: default_probe_timeout_secs() }
    }
}

fn default_probe_url() -> String {
    "https://clients3.google.com/generate_204".to_string()
}

fn default_probe_timeout_secs() -> u64 {
    3
}

/// Session cookie settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    #[serde(default = "default_cookie_name")]
    pub cookie_name: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self { cookie_name: default_cookie_name() }
    }
}

fn default_cookie_name() -> String {
    "homedash_session".to_string()
}
