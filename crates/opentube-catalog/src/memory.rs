//! In-memory catalog for tests

use crate::writer::CatalogWriter;
use async_trait::async_trait;
use chrono::Utc;
use opentube_core::models::{AssetRecord, NewAsset};
use opentube_core::AppError;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use uuid::Uuid;

/// Catalog implementation that keeps records in memory.
///
/// Supports injected create failures so pipeline tests can exercise the
/// rollback path without a database.
#[derive(Default)]
pub struct MemoryCatalog {
    assets: Mutex<Vec<AssetRecord>>,
    fail_creates: AtomicBool,
}

impl MemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make subsequent create calls fail (for test assertions).
    pub fn fail_creates(&self, fail: bool) {
        self.fail_creates.store(fail, Ordering::SeqCst);
    }

    pub fn len(&self) -> usize {
        self.assets.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl CatalogWriter for MemoryCatalog {
    async fn create(&self, asset: NewAsset) -> Result<AssetRecord, AppError> {
        if self.fail_creates.load(Ordering::SeqCst) {
            return Err(AppError::CatalogWrite(
                "injected catalog failure".to_string(),
            ));
        }

        let record = AssetRecord {
            id: Uuid::new_v4(),
            title: asset.title,
            description: asset.description,
            video_url: asset.video_url,
            thumbnail_url: asset.thumbnail_url,
            owner_id: asset.owner_id,
            duration_seconds: asset.duration_seconds,
            visibility: asset.visibility,
            view_count: 0,
            tags: asset.tags,
            created_at: Utc::now(),
        };

        self.assets.lock().unwrap().push(record.clone());
        Ok(record)
    }

    async fn get(&self, id: Uuid) -> Result<Option<AssetRecord>, AppError> {
        Ok(self
            .assets
            .lock()
            .unwrap()
            .iter()
            .find(|a| a.id == id)
            .cloned())
    }

    async fn list(&self, limit: i64, offset: i64) -> Result<Vec<AssetRecord>, AppError> {
        let mut records = self.assets.lock().unwrap().clone();
        records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(records
            .into_iter()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .collect())
    }

    async fn search(&self, query: &str) -> Result<Vec<AssetRecord>, AppError> {
        let needle = query.to_lowercase();
        let mut records: Vec<AssetRecord> = self
            .assets
            .lock()
            .unwrap()
            .iter()
            .filter(|a| {
                a.title.to_lowercase().contains(&needle)
                    || a.description.to_lowercase().contains(&needle)
                    || a.tags.iter().any(|t| t.to_lowercase().contains(&needle))
            })
            .cloned()
            .collect();
        records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(records)
    }

    async fn increment_views(&self, id: Uuid) -> Result<(), AppError> {
        if let Some(record) = self.assets.lock().unwrap().iter_mut().find(|a| a.id == id) {
            record.view_count += 1;
        }
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        let mut assets = self.assets.lock().unwrap();
        let before = assets.len();
        assets.retain(|a| a.id != id);

        if assets.len() == before {
            return Err(AppError::NotFound(format!("Asset {} not found", id)));
        }

        Ok(())
    }
}
