//! Media inspection
//!
//! Combines duration probing and thumbnail rendering into a single inspection
//! step working entirely inside the request's staging area.

use crate::probe::{DurationProbe, ProbeError};
use crate::staging::{ArtifactKind, StagedArtifact, StagingArea};
use crate::thumbnail::ThumbnailRenderer;
use async_trait::async_trait;
use opentube_core::constants::THUMBNAIL_OFFSET_FRACTION;
use std::time::Duration;

/// What inspection learned about a staged video.
#[derive(Debug, Clone)]
pub struct MediaProbeResult {
    pub duration_seconds: f64,
    pub thumbnail: StagedArtifact,
}

/// Media inspection abstraction
///
/// Derives intrinsic metadata from a staged video and renders a representative
/// thumbnail into the same staging area. Implementations never write outside
/// the staging area.
#[async_trait]
pub trait Inspector: Send + Sync {
    async fn probe(
        &self,
        source: &StagedArtifact,
        staging: &StagingArea,
    ) -> Result<MediaProbeResult, ProbeError>;
}

/// Inspector backed by the external ffprobe and ffmpeg binaries.
pub struct FfmpegInspector {
    probe: DurationProbe,
    renderer: ThumbnailRenderer,
    budget: Duration,
}

impl FfmpegInspector {
    pub fn new(
        ffprobe_path: String,
        ffmpeg_path: String,
        width: u32,
        height: u32,
        budget: Duration,
    ) -> Result<Self, ProbeError> {
        Ok(Self {
            probe: DurationProbe::new(ffprobe_path)?,
            renderer: ThumbnailRenderer::new(ffmpeg_path, width, height)?,
            budget,
        })
    }
}

#[async_trait]
impl Inspector for FfmpegInspector {
    async fn probe(
        &self,
        source: &StagedArtifact,
        staging: &StagingArea,
    ) -> Result<MediaProbeResult, ProbeError> {
        let duration = self
            .probe
            .duration_seconds(&source.path, self.budget)
            .await?;

        // Seek past any intro fade; fall back to the first frame when the
        // container reports no duration.
        let offset = if duration > 0.0 {
            duration * THUMBNAIL_OFFSET_FRACTION
        } else {
            0.0
        };

        let thumb_name = format!("thumb-{}.png", source.file_name());
        let output = staging.path_for(&thumb_name);
        self.renderer
            .render(&source.path, &output, offset, self.budget)
            .await?;

        let thumbnail = staging
            .register(ArtifactKind::Thumbnail, &thumb_name)
            .await
            .map_err(|e| ProbeError::Tool(format!("Failed to stat rendered thumbnail: {}", e)))?;

        tracing::info!(
            duration_seconds = duration,
            thumbnail = %thumbnail.file_name(),
            thumbnail_bytes = thumbnail.size_bytes,
            "Media inspection completed"
        );

        Ok(MediaProbeResult {
            duration_seconds: duration,
            thumbnail,
        })
    }
}
