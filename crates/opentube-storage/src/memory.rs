//! In-memory publisher for tests
//!
//! Stores published objects in a HashMap and supports failure injection so
//! pipeline tests can exercise retry, rollback and reconciliation paths
//! without a real object store.

use crate::publisher::{ObjectPublisher, PublishError, PublishResult, PublishedLocator};
use crate::StorageBackend;
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex};

/// Failure class to inject on matching keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InjectedFailure {
    Retryable,
    Terminal,
}

struct FailureRule {
    needle: String,
    kind: InjectedFailure,
    /// None fails forever; Some(n) fails the next n attempts then succeeds.
    remaining: Option<u32>,
}

#[derive(Default)]
struct Inner {
    objects: HashMap<String, Vec<u8>>,
    publish_attempts: HashMap<String, u32>,
    publish_failures: Vec<FailureRule>,
    unpublish_failures: Vec<String>,
}

/// In-memory publisher implementation that stores objects in a map.
#[derive(Clone)]
pub struct MemoryPublisher {
    inner: Arc<Mutex<Inner>>,
    base_url: String,
}

impl MemoryPublisher {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner::default())),
            base_url: "https://cdn.test".to_string(),
        }
    }

    /// Check if an object exists (for test assertions)
    pub fn has_object(&self, key: &str) -> bool {
        self.inner.lock().unwrap().objects.contains_key(key)
    }

    /// Get object data (for test assertions)
    pub fn object_data(&self, key: &str) -> Option<Vec<u8>> {
        self.inner.lock().unwrap().objects.get(key).cloned()
    }

    pub fn object_count(&self) -> usize {
        self.inner.lock().unwrap().objects.len()
    }

    /// How many publish attempts were made for a key, retries included.
    pub fn publish_attempts(&self, key: &str) -> u32 {
        self.inner
            .lock()
            .unwrap()
            .publish_attempts
            .get(key)
            .copied()
            .unwrap_or(0)
    }

    /// Publish attempts summed over every key containing `needle`.
    pub fn publish_attempts_matching(&self, needle: &str) -> u32 {
        self.inner
            .lock()
            .unwrap()
            .publish_attempts
            .iter()
            .filter(|(key, _)| key.contains(needle))
            .map(|(_, count)| count)
            .sum()
    }

    /// Fail every publish whose key contains `needle`.
    pub fn fail_publishes_matching(&self, needle: &str, kind: InjectedFailure) {
        self.inner.lock().unwrap().publish_failures.push(FailureRule {
            needle: needle.to_string(),
            kind,
            remaining: None,
        });
    }

    /// Fail the next `times` publishes whose key contains `needle`, then succeed.
    pub fn fail_next_publishes_matching(&self, needle: &str, kind: InjectedFailure, times: u32) {
        self.inner.lock().unwrap().publish_failures.push(FailureRule {
            needle: needle.to_string(),
            kind,
            remaining: Some(times),
        });
    }

    /// Fail every unpublish whose key contains `needle`.
    pub fn fail_unpublishes_matching(&self, needle: &str) {
        self.inner
            .lock()
            .unwrap()
            .unpublish_failures
            .push(needle.to_string());
    }
}

impl Default for MemoryPublisher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ObjectPublisher for MemoryPublisher {
    async fn publish(
        &self,
        local_path: &Path,
        key: &str,
        _content_type: &str,
    ) -> PublishResult<PublishedLocator> {
        let data = tokio::fs::read(local_path).await.map_err(|e| {
            PublishError::Terminal(format!(
                "Failed to read staged file {}: {}",
                local_path.display(),
                e
            ))
        })?;

        let mut inner = self.inner.lock().unwrap();
        *inner
            .publish_attempts
            .entry(key.to_string())
            .or_insert(0) += 1;

        let matched = inner
            .publish_failures
            .iter()
            .position(|rule| key.contains(&rule.needle) && rule.remaining.map_or(true, |n| n > 0));
        if let Some(idx) = matched {
            let kind = inner.publish_failures[idx].kind;
            if let Some(remaining) = inner.publish_failures[idx].remaining.as_mut() {
                *remaining -= 1;
            }
            return Err(match kind {
                InjectedFailure::Retryable => {
                    PublishError::Retryable("injected transient failure".to_string())
                }
                InjectedFailure::Terminal => {
                    PublishError::Terminal("injected terminal failure".to_string())
                }
            });
        }

        inner.objects.insert(key.to_string(), data);

        Ok(PublishedLocator {
            key: key.to_string(),
            url: format!("{}/{}", self.base_url, key),
        })
    }

    async fn unpublish(&self, key: &str) -> PublishResult<()> {
        let mut inner = self.inner.lock().unwrap();

        if inner
            .unpublish_failures
            .iter()
            .any(|needle| key.contains(needle))
        {
            return Err(PublishError::Retryable(
                "injected unpublish failure".to_string(),
            ));
        }

        // Missing objects are not an error.
        inner.objects.remove(key);
        Ok(())
    }

    async fn exists(&self, key: &str) -> PublishResult<bool> {
        Ok(self.inner.lock().unwrap().objects.contains_key(key))
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Local
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    async fn staged_file(dir: &Path, name: &str, data: &[u8]) -> std::path::PathBuf {
        let path = dir.join(name);
        tokio::fs::write(&path, data).await.unwrap();
        path
    }

    #[tokio::test]
    async fn test_publish_and_unpublish() {
        let dir = tempdir().unwrap();
        let publisher = MemoryPublisher::new();
        let source = staged_file(dir.path(), "a.mp4", b"bytes").await;

        let locator = publisher
            .publish(&source, "videos/a.mp4", "video/mp4")
            .await
            .unwrap();
        assert_eq!(locator.url, "https://cdn.test/videos/a.mp4");
        assert!(publisher.has_object("videos/a.mp4"));

        publisher.unpublish("videos/a.mp4").await.unwrap();
        assert!(!publisher.has_object("videos/a.mp4"));
    }

    #[tokio::test]
    async fn test_transient_failures_clear_after_budget() {
        let dir = tempdir().unwrap();
        let publisher = MemoryPublisher::new();
        publisher.fail_next_publishes_matching("videos/", InjectedFailure::Retryable, 2);
        let source = staged_file(dir.path(), "a.mp4", b"bytes").await;

        for _ in 0..2 {
            let err = publisher
                .publish(&source, "videos/a.mp4", "video/mp4")
                .await
                .unwrap_err();
            assert!(err.is_retryable());
        }

        publisher
            .publish(&source, "videos/a.mp4", "video/mp4")
            .await
            .unwrap();
        assert_eq!(publisher.publish_attempts("videos/a.mp4"), 3);
    }

    #[tokio::test]
    async fn test_injected_unpublish_failure() {
        let dir = tempdir().unwrap();
        let publisher = MemoryPublisher::new();
        let source = staged_file(dir.path(), "a.mp4", b"bytes").await;

        publisher
            .publish(&source, "videos/a.mp4", "video/mp4")
            .await
            .unwrap();

        publisher.fail_unpublishes_matching("videos/");
        assert!(publisher.unpublish("videos/a.mp4").await.is_err());
        assert!(publisher.has_object("videos/a.mp4"));
    }
}
