//! Catalog abstraction
//!
//! This module defines the CatalogWriter trait the ingestion pipeline and the
//! HTTP surface work against. A record is only ever created after the media it
//! references is durably stored.

use async_trait::async_trait;
use opentube_core::models::{AssetRecord, NewAsset};
use opentube_core::AppError;
use uuid::Uuid;

/// Asset catalog abstraction
#[async_trait]
pub trait CatalogWriter: Send + Sync {
    /// Insert a fully-specified asset in one atomic statement. On failure no
    /// partial record becomes visible.
    async fn create(&self, asset: NewAsset) -> Result<AssetRecord, AppError>;

    async fn get(&self, id: Uuid) -> Result<Option<AssetRecord>, AppError>;

    /// Most recent assets first.
    async fn list(&self, limit: i64, offset: i64) -> Result<Vec<AssetRecord>, AppError>;

    /// Case-insensitive match over title, description and tags.
    async fn search(&self, query: &str) -> Result<Vec<AssetRecord>, AppError>;

    /// Atomically bump the view counter. The update is relative so concurrent
    /// increments never lose counts.
    async fn increment_views(&self, id: Uuid) -> Result<(), AppError>;

    /// Remove the catalog row only. Published objects are the caller's
    /// responsibility. A missing row reports NotFound.
    async fn delete(&self, id: Uuid) -> Result<(), AppError>;
}
