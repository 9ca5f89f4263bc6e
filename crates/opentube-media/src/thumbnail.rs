//! Thumbnail rendering via ffmpeg

use crate::probe::{validate_and_canonicalize_path, validate_path, ProbeError};
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;

/// Renders a single representative frame at a fixed resolution.
pub struct ThumbnailRenderer {
    ffmpeg_path: String,
    width: u32,
    height: u32,
}

impl ThumbnailRenderer {
    pub fn new(ffmpeg_path: String, width: u32, height: u32) -> Result<Self, ProbeError> {
        validate_path(&ffmpeg_path)?;

        Ok(Self {
            ffmpeg_path,
            width,
            height,
        })
    }

    /// Extract one frame at `offset_seconds` into `output_path` as PNG,
    /// scaled to the configured resolution. The ffmpeg process is killed if
    /// it exceeds `budget`.
    #[tracing::instrument(skip(self), fields(
        process.executable.path = %self.ffmpeg_path,
        process.command = "ffmpeg",
        media.operation = "thumbnail"
    ))]
    pub async fn render(
        &self,
        input_path: &Path,
        output_path: &Path,
        offset_seconds: f64,
        budget: Duration,
    ) -> Result<(), ProbeError> {
        let start = std::time::Instant::now();

        let validated_input = validate_and_canonicalize_path(input_path)?;

        let args = vec![
            "-ss".to_string(),
            offset_seconds.to_string(),
            "-i".to_string(),
            validated_input.to_string_lossy().to_string(),
            "-vframes".to_string(),
            "1".to_string(),
            "-vf".to_string(),
            format!("scale={}:{}", self.width, self.height),
            "-q:v".to_string(),
            "2".to_string(),
            "-y".to_string(),
            output_path.to_string_lossy().to_string(),
        ];

        let child = Command::new(&self.ffmpeg_path)
            .args(&args)
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| ProbeError::Tool(format!("Failed to execute ffmpeg: {}", e)))?;

        let output = match tokio::time::timeout(budget, child.wait_with_output()).await {
            Ok(result) => result
                .map_err(|e| ProbeError::Tool(format!("ffmpeg did not exit cleanly: {}", e)))?,
            Err(_) => {
                tracing::warn!(
                    budget_secs = budget.as_secs(),
                    path = %validated_input.display(),
                    "ffmpeg exceeded budget, killed"
                );
                return Err(ProbeError::Timeout {
                    seconds: budget.as_secs(),
                });
            }
        };

        if !output.status.success() {
            return Err(ProbeError::Unsupported(format!(
                "FFmpeg thumbnail extraction failed: {}",
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        tracing::info!(
            duration_ms = start.elapsed().as_millis() as u64,
            offset_seconds = offset_seconds,
            width = self.width,
            height = self.height,
            "Thumbnail rendered"
        );

        Ok(())
    }
}
