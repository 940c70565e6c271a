//! Error types used throughout the application

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type for Homedash
#[derive(Error, Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "message")]
pub enum HomedashError {
    #[error("OAuth exchange failed: {0}")]
    AuthExchange(String),

    #[error("session expired or missing")]
    SessionExpired,

    #[error("remote unavailable: {0}")]
    RemoteUnavailable(String),

    #[error("validation failed for `{field}`: {message}")]
    Validation { field: String, message: String },

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("database error: {0}")]
    Database(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl HomedashError {
    /// Shorthand for a field-level validation failure.
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation { field: field.into(), message: message.into() }
    }
}

/// Result type alias for Homedash operations
pub type Result<T> = std::result::Result<T, HomedashError>;
