//! Scratch staging for in-flight uploads
//!
//! Each ingestion request gets its own staging directory holding the uploaded
//! video and any derived artifacts. Nothing in it outlives the request: the
//! pipeline removes the directory explicitly, and the TempDir drop guard
//! removes it even when the request future is cancelled mid-flight.

use opentube_core::AppError;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use thiserror::Error;
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

/// Staging operation errors
#[derive(Debug, Error)]
pub enum StagingError {
    #[error("Failed to create staging directory: {0}")]
    Create(String),

    #[error("Failed to write staged file: {0}")]
    Write(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl From<StagingError> for AppError {
    fn from(err: StagingError) -> Self {
        AppError::Staging(err.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    SourceVideo,
    Thumbnail,
}

/// A scratch file inside a staging area. Valid only while the owning
/// `StagingArea` is alive.
#[derive(Debug, Clone)]
pub struct StagedArtifact {
    pub kind: ArtifactKind,
    pub path: PathBuf,
    pub size_bytes: u64,
}

impl StagedArtifact {
    /// The unique staged filename, used to derive object keys.
    pub fn file_name(&self) -> &str {
        self.path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("")
    }
}

/// Per-request scratch directory for staged media.
pub struct StagingArea {
    dir: TempDir,
}

impl StagingArea {
    /// Create a fresh staging directory under `root`, creating `root` itself
    /// if needed.
    pub async fn create(root: &str) -> Result<Self, StagingError> {
        tokio::fs::create_dir_all(root)
            .await
            .map_err(|e| StagingError::Create(format!("{}: {}", root, e)))?;

        let dir = tempfile::Builder::new()
            .prefix("ingest-")
            .tempdir_in(root)
            .map_err(|e| StagingError::Create(e.to_string()))?;

        Ok(Self { dir })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Write upload bytes into scratch under a unique name.
    ///
    /// The staged name is `{uuid}.{ext}` where the extension is taken from the
    /// original filename, so concurrent uploads of the same file never collide.
    pub async fn stage_source(
        &self,
        original_filename: &str,
        data: &[u8],
    ) -> Result<StagedArtifact, StagingError> {
        let ext = sanitize_extension(original_filename);
        let staged_name = format!("{}.{}", Uuid::new_v4(), ext);
        let path = self.dir.path().join(&staged_name);

        let mut file = tokio::fs::File::create(&path)
            .await
            .map_err(|e| StagingError::Write(format!("{}: {}", path.display(), e)))?;
        file.write_all(data)
            .await
            .map_err(|e| StagingError::Write(format!("{}: {}", path.display(), e)))?;
        file.sync_all()
            .await
            .map_err(|e| StagingError::Write(format!("{}: {}", path.display(), e)))?;

        Ok(StagedArtifact {
            kind: ArtifactKind::SourceVideo,
            path,
            size_bytes: data.len() as u64,
        })
    }

    /// Absolute path for a derived artifact named `name` inside this area.
    pub fn path_for(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    /// Record a derived artifact already written under this area (e.g. a
    /// rendered thumbnail), picking up its size from disk.
    pub async fn register(
        &self,
        kind: ArtifactKind,
        name: &str,
    ) -> Result<StagedArtifact, StagingError> {
        let path = self.dir.path().join(name);
        let meta = tokio::fs::metadata(&path).await?;

        Ok(StagedArtifact {
            kind,
            path,
            size_bytes: meta.len(),
        })
    }

    /// Remove the staging directory and everything in it. Failures are logged
    /// and swallowed so cleanup never masks the pipeline result.
    pub async fn cleanup(self) {
        let path = self.dir.path().to_path_buf();
        if let Err(e) = self.dir.close() {
            tracing::warn!(
                path = %path.display(),
                error = %e,
                "Failed to remove staging directory"
            );
        }
    }
}

/// Keep only a safe, short alphanumeric extension from the original filename.
fn sanitize_extension(filename: &str) -> String {
    let ext: String = Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .take(8)
        .collect::<String>()
        .to_lowercase();

    if ext.is_empty() {
        "bin".to_string()
    } else {
        ext
    }
}
