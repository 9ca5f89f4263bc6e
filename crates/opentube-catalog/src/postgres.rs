//! Postgres-backed catalog

use crate::writer::CatalogWriter;
use async_trait::async_trait;
use opentube_core::models::{AssetRecord, NewAsset};
use opentube_core::AppError;
use sqlx::{PgPool, Postgres};
use uuid::Uuid;

/// Catalog implementation backed by the `assets` table.
#[derive(Clone)]
pub struct PgCatalog {
    pool: PgPool,
}

impl PgCatalog {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CatalogWriter for PgCatalog {
    #[tracing::instrument(skip(self, asset), fields(db.table = "assets", db.operation = "insert"))]
    async fn create(&self, asset: NewAsset) -> Result<AssetRecord, AppError> {
        let id = Uuid::new_v4();

        let record: AssetRecord = sqlx::query_as::<Postgres, AssetRecord>(
            r#"
            INSERT INTO assets (
                id, title, description, video_url, thumbnail_url,
                owner_id, duration_seconds, visibility, view_count, tags, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, 0, $9, now())
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&asset.title)
        .bind(&asset.description)
        .bind(&asset.video_url)
        .bind(&asset.thumbnail_url)
        .bind(asset.owner_id)
        .bind(asset.duration_seconds)
        .bind(asset.visibility)
        .bind(&asset.tags)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::CatalogWrite(e.to_string()))?;

        Ok(record)
    }

    #[tracing::instrument(skip(self), fields(db.table = "assets", db.operation = "select"))]
    async fn get(&self, id: Uuid) -> Result<Option<AssetRecord>, AppError> {
        let record = sqlx::query_as::<Postgres, AssetRecord>("SELECT * FROM assets WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(record)
    }

    #[tracing::instrument(skip(self), fields(db.table = "assets", db.operation = "select"))]
    async fn list(&self, limit: i64, offset: i64) -> Result<Vec<AssetRecord>, AppError> {
        let records = sqlx::query_as::<Postgres, AssetRecord>(
            "SELECT * FROM assets ORDER BY created_at DESC LIMIT $1 OFFSET $2",
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }

    #[tracing::instrument(skip(self), fields(db.table = "assets", db.operation = "select"))]
    async fn search(&self, query: &str) -> Result<Vec<AssetRecord>, AppError> {
        let pattern = format!("%{}%", query);

        let records = sqlx::query_as::<Postgres, AssetRecord>(
            r#"
            SELECT * FROM assets
            WHERE title ILIKE $1
               OR description ILIKE $1
               OR EXISTS (SELECT 1 FROM unnest(tags) AS tag WHERE tag ILIKE $1)
            ORDER BY created_at DESC
            "#,
        )
        .bind(&pattern)
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }

    #[tracing::instrument(skip(self), fields(db.table = "assets", db.operation = "update"))]
    async fn increment_views(&self, id: Uuid) -> Result<(), AppError> {
        sqlx::query("UPDATE assets SET view_count = view_count + 1 WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    #[tracing::instrument(skip(self), fields(db.table = "assets", db.operation = "delete"))]
    async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM assets WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Asset {} not found", id)));
        }

        Ok(())
    }
}
