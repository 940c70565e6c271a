//! SQLite-backed implementation of the FavoriteStore port.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use homedash_core::{FavoriteStore, NewFavorite};
use homedash_domain::{Favorite, HomedashError, Result};
use rusqlite::{params, Row};
use tokio::task;
use tracing::debug;

use super::event_repository::map_join_error;
use super::manager::DbManager;
use crate::errors::InfraError;

/// SQLite implementation of the favorites store.
pub struct SqliteFavoriteStore {
    db: Arc<DbManager>,
}

impl SqliteFavoriteStore {
    /// Create a new favorites store over the shared pool.
    pub fn new(db: Arc<DbManager>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl FavoriteStore for SqliteFavoriteStore {
    async fn list_for_user(&self, user_id: &str) -> Result<Vec<Favorite>> {
        let db = Arc::clone(&self.db);
        let user_id = user_id.to_string();

        task::spawn_blocking(move || -> Result<Vec<Favorite>> {
            let conn = db.get_connection()?;

            let mut stmt = conn
                .prepare(
                    "SELECT id, symbol, name, user_id, created_at, updated_at
                     FROM favorites
                     WHERE user_id = ?1
                     ORDER BY created_at DESC",
                )
                .map_err(InfraError::from)?;

            let rows = stmt
                .query_map(params![user_id], map_favorite_row)
                .map_err(InfraError::from)?
                .collect::<std::result::Result<Vec<_>, _>>()
                .map_err(InfraError::from)?;

            Ok(rows)
        })
        .await
        .map_err(map_join_error)?
    }

    async fn insert(&self, favorite: NewFavorite) -> Result<Favorite> {
        let db = Arc::clone(&self.db);

        task::spawn_blocking(move || -> Result<Favorite> {
            let conn = db.get_connection()?;
            let ts = favorite.created_at.timestamp_millis();

            let inserted = conn.execute(
                "INSERT INTO favorites (id, symbol, name, user_id, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?5)",
                params![favorite.id, favorite.symbol, favorite.name, favorite.user_id, ts],
            );

            match inserted {
                Ok(_) => {
                    debug!(symbol = %favorite.symbol, user_id = %favorite.user_id, "favorite inserted");
                    Ok(Favorite {
                        id: favorite.id,
                        symbol: favorite.symbol,
                        name: favorite.name,
                        user_id: favorite.user_id,
                        created_at: favorite.created_at,
                        updated_at: favorite.created_at,
                    })
                }
                Err(err) => match HomedashError::from(InfraError::from(err)) {
                    HomedashError::Conflict(_) => Err(HomedashError::Conflict(format!(
                        "favorite {} already exists",
                        favorite.symbol
                    ))),
                    other => Err(other),
                },
            }
        })
        .await
        .map_err(map_join_error)?
    }

    async fn delete(&self, user_id: &str, favorite_id: &str) -> Result<bool> {
        let db = Arc::clone(&self.db);
        let user_id = user_id.to_string();
        let favorite_id = favorite_id.to_string();

        task::spawn_blocking(move || -> Result<bool> {
            let conn = db.get_connection()?;

            let deleted = conn
                .execute(
                    "DELETE FROM favorites WHERE id = ?1 AND user_id = ?2",
                    params![favorite_id, user_id],
                )
                .map_err(InfraError::from)?;

            Ok(deleted > 0)
        })
        .await
        .map_err(map_join_error)?
    }
}

fn map_favorite_row(row: &Row<'_>) -> rusqlite::Result<Favorite> {
    Ok(Favorite {
        id: row.get(0)?,
        symbol: row.get(1)?,
        name: row.get(2)?,
        user_id: row.get(3)?,
        created_at: datetime_from_millis(4, row.get(4)?)?,
        updated_at: datetime_from_millis(5, row.get(5)?)?,
    })
}

fn datetime_from_millis(idx: usize, ms: i64) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::<Utc>::from_timestamp_millis(ms).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            idx,
            rusqlite::types::Type::Integer,
            format!("timestamp {ms} out of range").into(),
        )
    })
}
