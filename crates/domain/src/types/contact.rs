//! Contact-form message forwarded to the notifier webhook

use serde::{Deserialize, Serialize};

use crate::errors::{HomedashError, Result};

/// Longest accepted message body.
pub const MAX_MESSAGE_LEN: usize = 2000;

/// Contact-form payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactMessage {
    pub name: String,
    pub email: String,
    pub message: String,
}

impl ContactMessage {
    /// Field-level validation.
    ///
    /// # Errors
    /// Returns `HomedashError::Validation` naming the offending field.
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(HomedashError::validation("name", "must not be empty"));
        }
        if !self.email.contains('@') {
            return Err(HomedashError::validation("email", "must contain '@'"));
        }
        if self.message.trim().is_empty() {
            return Err(HomedashError::validation("message", "must not be empty"));
        }
        if self.message.len() > MAX_MESSAGE_LEN {
            return Err(HomedashError::validation(
                "message",
                format!("must be at most {MAX_MESSAGE_LEN} characters"),
            ));
        }
        Ok(())
    }
}
