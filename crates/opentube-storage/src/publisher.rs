//! Object publication trait
//!
//! This module defines the ObjectPublisher trait that all publication backends
//! must implement, and the error type that separates transient faults from
//! failures no retry can fix.

use crate::StorageBackend;
use async_trait::async_trait;
use opentube_core::error::{AppError, PublishErrorKind};
use std::path::Path;
use thiserror::Error;

/// Publication errors
#[derive(Debug, Error)]
pub enum PublishError {
    /// Transient fault worth retrying (network timeout, 5xx from the store).
    #[error("Publish failed (transient): {0}")]
    Retryable(String),

    /// Fault a retry cannot fix (auth rejected, bucket missing).
    #[error("Publish failed: {0}")]
    Terminal(String),

    #[error("Invalid object key: {0}")]
    InvalidKey(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl PublishError {
    pub fn is_retryable(&self) -> bool {
        matches!(self, PublishError::Retryable(_))
    }
}

impl From<PublishError> for AppError {
    fn from(err: PublishError) -> Self {
        let kind = if err.is_retryable() {
            PublishErrorKind::Retryable
        } else {
            PublishErrorKind::Terminal
        };
        AppError::Publish {
            kind,
            message: err.to_string(),
        }
    }
}

/// Result type for publication operations
pub type PublishResult<T> = Result<T, PublishError>;

/// Where a published object lives: its backend key and its public URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishedLocator {
    pub key: String,
    pub url: String,
}

/// Object publication abstraction
///
/// All publication backends (S3, local filesystem) must implement this trait.
/// The ingestion pipeline works against it without coupling to a backend.
///
/// **Key format:** `videos/{staged_filename}` and
/// `thumbnails/thumb-{staged_filename}.png`. See the crate root documentation.
#[async_trait]
pub trait ObjectPublisher: Send + Sync {
    /// Copy the staged file at `local_path` into durable storage under `key`
    /// and return where it landed.
    ///
    /// Publishing the same key twice overwrites the same object, so a retried
    /// publish never creates duplicates.
    async fn publish(
        &self,
        local_path: &Path,
        key: &str,
        content_type: &str,
    ) -> PublishResult<PublishedLocator>;

    /// Remove the object under `key`. A missing object is not an error.
    async fn unpublish(&self, key: &str) -> PublishResult<()>;

    /// Check whether an object exists under `key`.
    async fn exists(&self, key: &str) -> PublishResult<bool>;

    /// Get the publication backend type
    fn backend_type(&self) -> StorageBackend;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryability_survives_conversion_to_app_error() {
        use opentube_core::ErrorMetadata;

        let transient: AppError = PublishError::Retryable("503".into()).into();
        assert!(transient.is_recoverable());

        let terminal: AppError = PublishError::Terminal("no such bucket".into()).into();
        assert!(!terminal.is_recoverable());

        let bad_key: AppError = PublishError::InvalidKey("../escape".into()).into();
        assert!(!bad_key.is_recoverable());
    }
}
