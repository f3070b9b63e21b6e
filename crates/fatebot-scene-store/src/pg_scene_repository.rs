//! `PostgreSQL` implementation of the `SceneRepository` trait.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::types::Json;
use sqlx::{PgPool, Row};
use tracing::debug;

use fatebot_core::channel::ChannelId;
use fatebot_core::error::DomainError;
use fatebot_core::repository::{SceneRepository, StoredScene};

use crate::schema::CREATE_SCENES_TABLE;

/// PostgreSQL-backed scene repository.
#[derive(Debug, Clone)]
pub struct PgSceneRepository {
    pool: PgPool,
}

impl PgSceneRepository {
    /// Creates a new `PgSceneRepository`.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Creates the `scenes` table and its index if they do not exist.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Infrastructure` if the DDL fails.
    pub async fn ensure_schema(&self) -> Result<(), DomainError> {
        sqlx::raw_sql(CREATE_SCENES_TABLE)
            .execute(&self.pool)
            .await
            .map_err(|e| db_error("scene schema setup", &e))?;
        Ok(())
    }
}

/// Channel ids are snowflakes below 2^63 and are stored as `BIGINT`.
fn to_db_id(channel_id: ChannelId) -> Result<i64, DomainError> {
    i64::try_from(channel_id.0).map_err(|_| {
        DomainError::Infrastructure(format!("channel id {channel_id} does not fit in BIGINT"))
    })
}

fn db_error(operation: &str, err: &sqlx::Error) -> DomainError {
    DomainError::Infrastructure(format!("{operation} failed: {err}"))
}

#[async_trait]
impl SceneRepository for PgSceneRepository {
    async fn find(&self, channel_id: ChannelId) -> Result<StoredScene, DomainError> {
        let row = sqlx::query("SELECT document, updated_at FROM scenes WHERE channel_id = $1")
            .bind(to_db_id(channel_id)?)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| db_error("scene lookup", &e))?
            .ok_or(DomainError::NoCurrentScene(channel_id))?;

        let document: Value = row
            .try_get("document")
            .map_err(|e| db_error("scene document decode", &e))?;
        let updated_at: DateTime<Utc> = row
            .try_get("updated_at")
            .map_err(|e| db_error("scene timestamp decode", &e))?;

        Ok(StoredScene {
            channel_id,
            document,
            updated_at,
        })
    }

    async fn save(&self, scene: &StoredScene) -> Result<(), DomainError> {
        let schema_version = scene
            .document
            .get("schema_version")
            .and_then(Value::as_i64)
            .unwrap_or_default();

        sqlx::query(
            r"
            INSERT INTO scenes (channel_id, schema_version, document, updated_at)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (channel_id) DO UPDATE
            SET schema_version = EXCLUDED.schema_version,
                document = EXCLUDED.document,
                updated_at = EXCLUDED.updated_at
            ",
        )
        .bind(to_db_id(scene.channel_id)?)
        .bind(schema_version)
        .bind(Json(&scene.document))
        .bind(scene.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("scene upsert", &e))?;

        debug!(channel_id = %scene.channel_id, "scene document upserted");
        Ok(())
    }

    async fn remove(&self, channel_id: ChannelId) -> Result<(), DomainError> {
        let result = sqlx::query("DELETE FROM scenes WHERE channel_id = $1")
            .bind(to_db_id(channel_id)?)
            .execute(&self.pool)
            .await
            .map_err(|e| db_error("scene delete", &e))?;

        debug!(%channel_id, rows = result.rows_affected(), "scene document removed");
        Ok(())
    }
}
