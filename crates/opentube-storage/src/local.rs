use crate::publisher::{ObjectPublisher, PublishError, PublishResult, PublishedLocator};
use crate::StorageBackend;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;

/// Local filesystem publication implementation
#[derive(Clone)]
pub struct LocalPublisher {
    base_path: PathBuf,
    base_url: String,
}

impl LocalPublisher {
    /// Create a new LocalPublisher instance
    ///
    /// # Arguments
    /// * `base_path` - Root directory for published files (e.g., "/var/lib/opentube/media")
    /// * `base_url` - Base URL for serving files (e.g., "http://localhost:4000/storage")
    pub async fn new(base_path: impl Into<PathBuf>, base_url: String) -> PublishResult<Self> {
        let base_path = base_path.into();

        fs::create_dir_all(&base_path).await.map_err(|e| {
            PublishError::Config(format!(
                "Failed to create storage directory {}: {}",
                base_path.display(),
                e
            ))
        })?;

        Ok(LocalPublisher {
            base_path,
            base_url,
        })
    }

    /// Convert object key to filesystem path with security validation
    ///
    /// Rejects keys containing path traversal sequences that could escape the
    /// base storage directory.
    fn key_to_path(&self, key: &str) -> PublishResult<PathBuf> {
        if key.contains("..") || key.starts_with('/') {
            return Err(PublishError::InvalidKey(
                "Object key contains invalid characters".to_string(),
            ));
        }

        let path = self.base_path.join(key);

        let base_canonical = self.base_path.canonicalize().map_err(|e| {
            PublishError::Config(format!("Failed to canonicalize base path: {}", e))
        })?;

        if let Ok(canonical) = path.canonicalize() {
            if canonical.strip_prefix(&base_canonical).is_err() {
                return Err(PublishError::InvalidKey(
                    "Object key resolves outside storage directory".to_string(),
                ));
            }
        }

        Ok(path)
    }

    /// Generate public URL for a key
    fn generate_url(&self, key: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), key)
    }

    /// Ensure parent directory exists
    async fn ensure_parent_dir(&self, path: &Path) -> PublishResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        Ok(())
    }
}

#[async_trait]
impl ObjectPublisher for LocalPublisher {
    async fn publish(
        &self,
        local_path: &Path,
        key: &str,
        _content_type: &str,
    ) -> PublishResult<PublishedLocator> {
        let path = self.key_to_path(key)?;

        self.ensure_parent_dir(&path).await?;

        let start = std::time::Instant::now();

        let size = fs::copy(local_path, &path).await.map_err(|e| {
            PublishError::Terminal(format!(
                "Failed to copy {} to {}: {}",
                local_path.display(),
                path.display(),
                e
            ))
        })?;

        let file = fs::File::open(&path).await.map_err(|e| {
            PublishError::Terminal(format!("Failed to open file {}: {}", path.display(), e))
        })?;
        file.sync_all().await.map_err(|e| {
            PublishError::Terminal(format!("Failed to sync file {}: {}", path.display(), e))
        })?;

        let url = self.generate_url(key);

        tracing::info!(
            path = %path.display(),
            key = %key,
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Local publish successful"
        );

        Ok(PublishedLocator {
            key: key.to_string(),
            url,
        })
    }

    async fn unpublish(&self, key: &str) -> PublishResult<()> {
        let path = self.key_to_path(key)?;
        let start = std::time::Instant::now();

        if !fs::try_exists(&path).await.unwrap_or(false) {
            return Ok(());
        }

        fs::remove_file(&path).await.map_err(|e| {
            PublishError::Terminal(format!(
                "Failed to delete file {}: {}",
                path.display(),
                e
            ))
        })?;

        tracing::info!(
            path = %path.display(),
            key = %key,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Local unpublish successful"
        );

        Ok(())
    }

    async fn exists(&self, key: &str) -> PublishResult<bool> {
        let path = self.key_to_path(key)?;
        Ok(fs::try_exists(&path).await.unwrap_or(false))
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Local
    }
}
