//! Video ingestion service
//!
//! This service orchestrates the complete ingestion workflow for an uploaded
//! video: stage → probe → publish → catalog → cleanup. Staged artifacts are
//! removed on every outcome; published objects are rolled back when a later
//! step fails so the catalog and the object store never disagree about which
//! assets exist.

use crate::state::AppState;
use crate::utils::upload::{sanitize_filename, validate_file_size};
use opentube_core::constants::THUMBNAIL_CONTENT_TYPE;
use opentube_core::models::{AssetRecord, NewAsset, Visibility};
use opentube_core::{retry_with_backoff, AppError, RetryPolicy};
use opentube_media::{StagedArtifact, StagingArea};
use opentube_storage::keys;
use opentube_storage::{ObjectPublisher, PublishError, PublishedLocator};
use std::path::Path;
use std::sync::Arc;
use uuid::Uuid;

/// One upload, as handed over by the HTTP layer.
#[derive(Debug)]
pub struct UploadRequest {
    pub data: Vec<u8>,
    pub filename: String,
    pub content_type: String,
    pub title: Option<String>,
    pub description: String,
    pub visibility: Visibility,
    pub tags: Vec<String>,
    pub owner_id: Uuid,
}

/// Video ingestion service
///
/// Owns the ordering of the pipeline steps and the rollback rules between
/// them. Collaborators (inspector, publisher, catalog) come from AppState
/// behind their traits.
pub struct IngestionService {
    state: Arc<AppState>,
}

impl IngestionService {
    pub fn new(state: &Arc<AppState>) -> Self {
        Self {
            state: state.clone(),
        }
    }

    /// Run the full ingestion pipeline for one upload.
    ///
    /// Staged artifacts are removed before this returns, success or failure.
    /// If the future is cancelled mid-flight the staging area's Drop removes
    /// them instead.
    #[tracing::instrument(
        skip(self, request),
        fields(
            filename = %request.filename,
            size_bytes = request.data.len(),
            owner_id = %request.owner_id,
            operation = "ingest"
        )
    )]
    pub async fn ingest(&self, request: UploadRequest) -> Result<AssetRecord, AppError> {
        if request.data.is_empty() {
            return Err(AppError::Validation("File is empty".to_string()));
        }
        validate_file_size(request.data.len(), self.state.config.max_video_size_bytes())?;
        let safe_filename = sanitize_filename(&request.filename)?;

        let staging = StagingArea::create(self.state.config.staging_dir()).await?;

        let result = self.run_pipeline(&staging, &request, &safe_filename).await;

        // Runs on success and on every error path above.
        staging.cleanup().await;

        result
    }

    async fn run_pipeline(
        &self,
        staging: &StagingArea,
        request: &UploadRequest,
        safe_filename: &str,
    ) -> Result<AssetRecord, AppError> {
        // 1. Stage the upload under a collision-resistant name.
        let source = staging.stage_source(safe_filename, &request.data).await?;

        // 2. Probe duration and render the thumbnail into the staging area.
        let probed = self.state.inspector.probe(&source, staging).await?;

        // 3. Publish both objects; either failure rolls back the other's success.
        let video_key = keys::video_key(source.file_name());
        let thumbnail_key = keys::thumbnail_key(source.file_name());
        let (video, thumbnail) = self
            .publish_pair(
                &source,
                &probed.thumbnail,
                &video_key,
                &thumbnail_key,
                &request.content_type,
            )
            .await?;

        // 4. One atomic catalog insert. On failure neither object may stay behind.
        let asset = NewAsset {
            title: request
                .title
                .clone()
                .unwrap_or_else(|| safe_filename.to_string()),
            description: request.description.clone(),
            video_url: video.url,
            thumbnail_url: thumbnail.url,
            owner_id: request.owner_id,
            duration_seconds: probed.duration_seconds.round(),
            visibility: request.visibility,
            tags: request.tags.clone(),
        };

        match self.state.catalog.create(asset).await {
            Ok(record) => {
                tracing::info!(
                    asset_id = %record.id,
                    duration_seconds = record.duration_seconds,
                    "video ingested"
                );
                Ok(record)
            }
            Err(err) => {
                tracing::warn!(
                    error = %err,
                    video_key = %video_key,
                    thumbnail_key = %thumbnail_key,
                    "catalog write failed, rolling back published objects"
                );
                self.rollback_published(&[&video_key, &thumbnail_key]).await;
                Err(err)
            }
        }
    }

    /// Publish the staged video and thumbnail, each with bounded retry.
    ///
    /// The two publishes run concurrently and are joined before the catalog
    /// write. When exactly one succeeds its object is unpublished again; if
    /// that rollback fails the caller gets `ReconciliationNeeded` naming the
    /// orphaned key instead of the publish error.
    async fn publish_pair(
        &self,
        source: &StagedArtifact,
        thumbnail: &StagedArtifact,
        video_key: &str,
        thumbnail_key: &str,
        content_type: &str,
    ) -> Result<(PublishedLocator, PublishedLocator), AppError> {
        let policy = RetryPolicy::new(
            self.state.config.publish_max_retries(),
            self.state.config.publish_base_delay_ms(),
            self.state.config.publish_max_delay_ms(),
        );
        let publisher: &dyn ObjectPublisher = self.state.publisher.as_ref();
        let video_path: &Path = &source.path;
        let thumbnail_path: &Path = &thumbnail.path;

        let video_fut = retry_with_backoff(
            move || publisher.publish(video_path, video_key, content_type),
            &policy,
            PublishError::is_retryable,
        );
        let thumbnail_fut = retry_with_backoff(
            move || publisher.publish(thumbnail_path, thumbnail_key, THUMBNAIL_CONTENT_TYPE),
            &policy,
            PublishError::is_retryable,
        );

        match tokio::join!(video_fut, thumbnail_fut) {
            (Ok(video), Ok(thumbnail)) => Ok((video, thumbnail)),
            (Ok(video), Err(err)) => {
                tracing::warn!(
                    error = %err,
                    sibling_key = %video.key,
                    "thumbnail publish failed, rolling back video object"
                );
                let orphaned = self.rollback_published(&[&video.key]).await;
                if orphaned.is_empty() {
                    Err(err.into())
                } else {
                    Err(AppError::ReconciliationNeeded { keys: orphaned })
                }
            }
            (Err(err), Ok(thumbnail)) => {
                tracing::warn!(
                    error = %err,
                    sibling_key = %thumbnail.key,
                    "video publish failed, rolling back thumbnail object"
                );
                let orphaned = self.rollback_published(&[&thumbnail.key]).await;
                if orphaned.is_empty() {
                    Err(err.into())
                } else {
                    Err(AppError::ReconciliationNeeded { keys: orphaned })
                }
            }
            (Err(video_err), Err(thumbnail_err)) => {
                tracing::debug!(
                    video_error = %video_err,
                    thumbnail_error = %thumbnail_err,
                    "both publishes failed, nothing to roll back"
                );
                Err(video_err.into())
            }
        }
    }

    /// Best-effort removal of already-published objects after a downstream
    /// failure. Keys that could not be removed are logged for manual
    /// reconciliation, never silently dropped. Returns those keys.
    async fn rollback_published(&self, published_keys: &[&str]) -> Vec<String> {
        let mut orphaned = Vec::new();
        for key in published_keys {
            if let Err(err) = self.state.publisher.unpublish(key).await {
                tracing::error!(key = %key, error = %err, "rollback unpublish failed");
                orphaned.push(key.to_string());
            }
        }
        if !orphaned.is_empty() {
            let reconciliation = AppError::ReconciliationNeeded {
                keys: orphaned.clone(),
            };
            tracing::error!(
                error = %reconciliation,
                keys = ?orphaned,
                "objects need manual reconciliation"
            );
        }
        orphaned
    }
}
