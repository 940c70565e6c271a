//! Favorite store port interface

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use homedash_domain::{Favorite, Result};

/// Parameters for inserting a favorite.
#[derive(Debug, Clone)]
pub struct NewFavorite {
    pub id: String,
    pub symbol: String,
    pub name: String,
    pub user_id: String,
    pub created_at: DateTime<Utc>,
}

/// Trait for persisting favorites.
#[async_trait]
pub trait FavoriteStore: Send + Sync {
    /// Favorites for a user, newest first.
    async fn list_for_user(&self, user_id: &str) -> Result<Vec<Favorite>>;

    /// Insert a favorite. A `(symbol, user_id)` uniqueness violation
    /// surfaces as `HomedashError::Conflict`.
    async fn insert(&self, favorite: NewFavorite) -> Result<Favorite>;

    /// Delete a user's favorite by id; `Ok(false)` when nothing matched.
    async fn delete(&self, user_id: &str, favorite_id: &str) -> Result<bool>;
}
