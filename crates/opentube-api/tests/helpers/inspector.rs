//! Inspector stub that fabricates probe results without running ffmpeg.

#![allow(dead_code)]

use async_trait::async_trait;
use opentube_media::{
    ArtifactKind, Inspector, MediaProbeResult, ProbeError, StagedArtifact, StagingArea,
};

enum StubMode {
    Ok { duration_seconds: f64 },
    Unsupported,
    Timeout { seconds: u64 },
    /// Sleeps until cancelled, for cancellation-cleanup tests.
    Hang,
}

pub struct StubInspector {
    mode: StubMode,
}

impl StubInspector {
    pub fn ok(duration_seconds: f64) -> Self {
        Self {
            mode: StubMode::Ok { duration_seconds },
        }
    }

    pub fn unsupported() -> Self {
        Self {
            mode: StubMode::Unsupported,
        }
    }

    pub fn timeout(seconds: u64) -> Self {
        Self {
            mode: StubMode::Timeout { seconds },
        }
    }

    pub fn hanging() -> Self {
        Self {
            mode: StubMode::Hang,
        }
    }
}

#[async_trait]
impl Inspector for StubInspector {
    async fn probe(
        &self,
        source: &StagedArtifact,
        staging: &StagingArea,
    ) -> Result<MediaProbeResult, ProbeError> {
        match &self.mode {
            StubMode::Ok { duration_seconds } => {
                let name = format!("thumb-{}.png", source.file_name());
                tokio::fs::write(staging.path_for(&name), b"stub png bytes")
                    .await
                    .map_err(|e| ProbeError::Tool(e.to_string()))?;
                let thumbnail = staging
                    .register(ArtifactKind::Thumbnail, &name)
                    .await
                    .map_err(|e| ProbeError::Tool(e.to_string()))?;
                Ok(MediaProbeResult {
                    duration_seconds: *duration_seconds,
                    thumbnail,
                })
            }
            StubMode::Unsupported => Err(ProbeError::Unsupported(
                "no video stream found".to_string(),
            )),
            StubMode::Timeout { seconds } => Err(ProbeError::Timeout { seconds: *seconds }),
            StubMode::Hang => {
                tokio::time::sleep(std::time::Duration::from_secs(3600)).await;
                Err(ProbeError::Tool("unreachable".to_string()))
            }
        }
    }
}
