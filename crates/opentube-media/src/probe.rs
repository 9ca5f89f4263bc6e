//! Duration probing via ffprobe
//!
//! Runs the external ffprobe binary against a staged file with a bounded
//! wall-clock budget. A probe that overruns its budget is killed rather than
//! left running against a pathological input.

use opentube_core::AppError;
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use thiserror::Error;
use tokio::process::Command;

/// Media inspection errors
#[derive(Debug, Error)]
pub enum ProbeError {
    /// The tool ran but could not decode the input as video.
    #[error("Unsupported media: {0}")]
    Unsupported(String),

    /// The tool exceeded its wall-clock budget and was killed.
    #[error("Inspection timed out after {seconds}s")]
    Timeout { seconds: u64 },

    /// The tool could not be executed or produced unusable output.
    #[error("Inspection tool failure: {0}")]
    Tool(String),
}

impl From<ProbeError> for AppError {
    fn from(err: ProbeError) -> Self {
        match err {
            ProbeError::Unsupported(msg) => AppError::UnsupportedMedia(msg),
            ProbeError::Timeout { seconds } => AppError::ProbeTimeout { seconds },
            ProbeError::Tool(msg) => AppError::Internal(msg),
        }
    }
}

/// Validate that a path doesn't contain shell metacharacters or dangerous sequences
pub(crate) fn validate_path(path: &str) -> Result<(), ProbeError> {
    let dangerous_chars = [';', '|', '&', '$', '`', '(', ')', '<', '>', '\n', '\r'];
    if path.chars().any(|c| dangerous_chars.contains(&c)) {
        return Err(ProbeError::Tool(format!(
            "Path contains dangerous characters: {}",
            path
        )));
    }

    if path.contains("..") {
        return Err(ProbeError::Tool(format!(
            "Path contains directory traversal: {}",
            path
        )));
    }

    Ok(())
}

/// Validate and canonicalize a file path to prevent directory traversal
pub(crate) fn validate_and_canonicalize_path(path: &Path) -> Result<PathBuf, ProbeError> {
    let path_str = path.to_string_lossy();
    validate_path(&path_str)?;

    path.canonicalize()
        .map_err(|e| ProbeError::Tool(format!("Failed to canonicalize path: {}", e)))
}

/// Duration probe backed by ffprobe.
pub struct DurationProbe {
    ffprobe_path: String,
}

impl DurationProbe {
    pub fn new(ffprobe_path: String) -> Result<Self, ProbeError> {
        validate_path(&ffprobe_path)?;

        if !ffprobe_path.chars().all(|c| {
            c.is_alphanumeric() || c == '/' || c == '-' || c == '_' || c == '.' || c == '\\'
        }) {
            return Err(ProbeError::Tool(
                "Invalid ffprobe path: contains unsafe characters".to_string(),
            ));
        }

        Ok(Self { ffprobe_path })
    }

    /// Extract the container duration in seconds from `video_path`.
    ///
    /// The ffprobe process is given `budget` of wall-clock time; on overrun it
    /// is killed and the probe reports a timeout.
    #[tracing::instrument(skip(self), fields(
        process.executable.path = %self.ffprobe_path,
        process.command = "ffprobe",
        media.operation = "probe"
    ))]
    pub async fn duration_seconds(
        &self,
        video_path: &Path,
        budget: Duration,
    ) -> Result<f64, ProbeError> {
        let start = std::time::Instant::now();

        let validated_path = validate_and_canonicalize_path(video_path)?;

        let child = Command::new(&self.ffprobe_path)
            .args([
                "-v",
                "quiet",
                "-print_format",
                "json",
                "-show_format",
                "-show_streams",
                "-select_streams",
                "v:0",
            ])
            .arg(&validated_path)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| ProbeError::Tool(format!("Failed to execute ffprobe: {}", e)))?;

        // Dropping the wait future on timeout (or request cancellation) kills
        // the child via kill_on_drop.
        let output = match tokio::time::timeout(budget, child.wait_with_output()).await {
            Ok(result) => result
                .map_err(|e| ProbeError::Tool(format!("ffprobe did not exit cleanly: {}", e)))?,
            Err(_) => {
                tracing::warn!(
                    budget_secs = budget.as_secs(),
                    path = %validated_path.display(),
                    "ffprobe exceeded budget, killed"
                );
                return Err(ProbeError::Timeout {
                    seconds: budget.as_secs(),
                });
            }
        };

        if !output.status.success() {
            return Err(ProbeError::Unsupported(format!(
                "ffprobe could not decode input: {}",
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        let duration = parse_probe_output(&output.stdout)?;

        tracing::info!(
            duration_ms = start.elapsed().as_millis() as u64,
            video_duration = duration,
            "Probe completed"
        );

        Ok(duration)
    }
}

/// Parse ffprobe JSON output into a container duration.
fn parse_probe_output(stdout: &[u8]) -> Result<f64, ProbeError> {
    let probe_data: Value = serde_json::from_slice(stdout)
        .map_err(|e| ProbeError::Tool(format!("Failed to parse ffprobe output: {}", e)))?;

    let has_video_stream = probe_data["streams"]
        .as_array()
        .map(|streams| !streams.is_empty())
        .unwrap_or(false);
    if !has_video_stream {
        return Err(ProbeError::Unsupported("No video stream found".to_string()));
    }

    // Containers without a reported duration (live captures, fragments) probe
    // as zero rather than failing the upload.
    let duration = probe_data["format"]["duration"]
        .as_str()
        .and_then(|d| d.parse::<f64>().ok())
        .unwrap_or(0.0);

    Ok(duration)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_duration_from_probe_json() {
        let json = br#"{
            "streams": [{"index": 0, "codec_name": "h264", "width": 1920, "height": 1080}],
            "format": {"duration": "42.52", "format_name": "mov,mp4"}
        }"#;
        let duration = parse_probe_output(json).unwrap();
        assert!((duration - 42.52).abs() < f64::EPSILON);
    }

    #[test]
    fn test_no_video_stream_is_unsupported() {
        let json = br#"{"streams": [], "format": {"duration": "10.0"}}"#;
        let err = parse_probe_output(json).unwrap_err();
        assert!(matches!(err, ProbeError::Unsupported(_)));
    }

    #[test]
    fn test_missing_duration_probes_as_zero() {
        let json = br#"{
            "streams": [{"index": 0, "codec_name": "h264"}],
            "format": {"format_name": "mov,mp4"}
        }"#;
        assert_eq!(parse_probe_output(json).unwrap(), 0.0);
    }

    #[test]
    fn test_garbage_output_is_tool_failure() {
        let err = parse_probe_output(b"not json at all").unwrap_err();
        assert!(matches!(err, ProbeError::Tool(_)));
    }

    #[test]
    fn test_dangerous_paths_rejected() {
        assert!(validate_path("/tmp/video.mp4").is_ok());
        assert!(validate_path("/tmp/$(whoami).mp4").is_err());
        assert!(validate_path("/tmp/../etc/passwd").is_err());
        assert!(validate_path("file; rm -rf /").is_err());
    }

    #[cfg(unix)]
    mod with_fake_tools {
        use super::*;
        use std::os::unix::fs::PermissionsExt;

        fn fake_tool(dir: &Path, name: &str, script: &str) -> String {
            let path = dir.join(name);
            std::fs::write(&path, script).unwrap();
            let mut perms = std::fs::metadata(&path).unwrap().permissions();
            perms.set_mode(0o755);
            std::fs::set_permissions(&path, perms).unwrap();
            path.to_string_lossy().to_string()
        }

        #[tokio::test]
        async fn test_probe_parses_tool_output() {
            let dir = tempfile::tempdir().unwrap();
            let video = dir.path().join("clip.mp4");
            std::fs::write(&video, b"fake video").unwrap();

            let script = "#!/bin/sh\necho '{\"streams\":[{\"index\":0}],\"format\":{\"duration\":\"20.0\"}}'\n";
            let ffprobe = fake_tool(dir.path(), "ffprobe", script);

            let probe = DurationProbe::new(ffprobe).unwrap();
            let duration = probe
                .duration_seconds(&video, Duration::from_secs(5))
                .await
                .unwrap();
            assert_eq!(duration, 20.0);
        }

        #[tokio::test]
        async fn test_undecodable_input_is_unsupported() {
            let dir = tempfile::tempdir().unwrap();
            let video = dir.path().join("junk.mp4");
            std::fs::write(&video, b"not a video").unwrap();

            let script = "#!/bin/sh\necho 'Invalid data found' >&2\nexit 1\n";
            let ffprobe = fake_tool(dir.path(), "ffprobe", script);

            let probe = DurationProbe::new(ffprobe).unwrap();
            let err = probe
                .duration_seconds(&video, Duration::from_secs(5))
                .await
                .unwrap_err();
            assert!(matches!(err, ProbeError::Unsupported(_)));
        }

        #[tokio::test]
        async fn test_overrunning_probe_is_killed() {
            let dir = tempfile::tempdir().unwrap();
            let video = dir.path().join("slow.mp4");
            std::fs::write(&video, b"fake video").unwrap();

            let script = "#!/bin/sh\nsleep 30\n";
            let ffprobe = fake_tool(dir.path(), "ffprobe", script);

            let probe = DurationProbe::new(ffprobe).unwrap();
            let start = std::time::Instant::now();
            let err = probe
                .duration_seconds(&video, Duration::from_millis(200))
                .await
                .unwrap_err();

            assert!(matches!(err, ProbeError::Timeout { .. }));
            assert!(start.elapsed() < Duration::from_secs(5));
        }
    }
}
