//! Favorites service: validation over the store port

use std::sync::Arc;

use chrono::Utc;
use homedash_domain::{Favorite, FavoriteDraft, HomedashError, Result};
use tracing::info;
use uuid::Uuid;

use super::ports::{FavoriteStore, NewFavorite};

/// Validates drafts and delegates persistence to the injected store.
pub struct FavoritesService {
    store: Arc<dyn FavoriteStore>,
}

impl FavoritesService {
    pub fn new(store: Arc<dyn FavoriteStore>) -> Self {
        Self { store }
    }

    /// List a user's favorites.
    pub async fn list(&self, user_id: &str) -> Result<Vec<Favorite>> {
        self.store.list_for_user(user_id).await
    }

    /// Validate and add a favorite for a user.
    ///
    /// # Errors
    /// `Validation` for a bad draft, `Conflict` for a duplicate
    /// `(symbol, user)` pair.
    pub async fn add(&self, user_id: &str, draft: &FavoriteDraft) -> Result<Favorite> {
        draft.validate()?;

        let favorite = self
            .store
            .insert(NewFavorite {
                id: Uuid::now_v7().to_string(),
                symbol: draft.normalized_symbol(),
                name: draft.name.trim().to_string(),
                user_id: user_id.to_string(),
                created_at: Utc::now(),
            })
            .await?;

        info!(user_id, symbol = %favorite.symbol, "favorite added");

        Ok(favorite)
    }

    /// Remove a user's favorite by id.
    ///
    /// # Errors
    /// `NotFound` when the id does not exist or belongs to another user.
    pub async fn remove(&self, user_id: &str, favorite_id: &str) -> Result<()> {
        if self.store.delete(user_id, favorite_id).await? {
            info!(user_id, favorite_id, "favorite removed");
            Ok(())
        } else {
            Err(HomedashError::NotFound(format!("favorite {favorite_id}")))
        }
    }
}
