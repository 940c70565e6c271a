//! Favorite (watch-list) records

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::{HomedashError, Result};

/// Longest accepted ticker symbol.
pub const MAX_SYMBOL_LEN: usize = 16;

/// Persisted favorite. Unique per `(symbol, user_id)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Favorite {
    pub id: String,
    pub symbol: String,
    pub name: String,
    pub user_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input payload for adding a favorite.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FavoriteDraft {
    pub symbol: String,
    pub name: String,
}

impl FavoriteDraft {
    /// Field-level validation.
    ///
    /// # Errors
    /// Returns `HomedashError::Validation` naming the offending field.
    pub fn validate(&self) -> Result<()> {
        let symbol = self.symbol.trim();
        if symbol.is_empty() {
            return Err(HomedashError::validation("symbol", "must not be empty"));
        }
        if symbol.len() > MAX_SYMBOL_LEN {
            return Err(HomedashError::validation(
                "symbol",
                format!("must be at most {MAX_SYMBOL_LEN} characters"),
            ));
        }
        if self.name.trim().is_empty() {
            return Err(HomedashError::validation("name", "must not be empty"));
        }
        Ok(())
    }

    /// Canonical symbol form used for storage and uniqueness.
    #[must_use]
    pub fn normalized_symbol(&self) -> String {
        self.symbol.trim().to_uppercase()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn symbol_is_normalized_to_uppercase() {
        let draft = FavoriteDraft { symbol: " btc ".to_string(), name: "Bitcoin".to_string() };
        assert!(draft.validate().is_ok());
        assert_eq!(draft.normalized_symbol(), "BTC");
    }

    #[test]
    fn empty_symbol_is_rejected() {
        let draft = FavoriteDraft { symbol: "  ".to_string(), name: "Bitcoin".to_string() };
        match draft.validate() {
            Err(HomedashError::Validation { field, .. }) => assert_eq!(field, "symbol"),
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn oversized_symbol_is_rejected() {
        let draft = FavoriteDraft {
            symbol: "X".repeat(MAX_SYMBOL_LEN + 1),
            name: "Too long".to_string(),
        };
        assert!(draft.validate().is_err());
    }

    #[test]
    fn empty_name_is_rejected() {
        let draft = FavoriteDraft { symbol: "ETH".to_string(), name: String::new() };
        match draft.validate() {
            Err(HomedashError::Validation { field, .. }) => assert_eq!(field, "name"),
            other => panic!("expected validation error, got {other:?}"),
        }
    }
}
