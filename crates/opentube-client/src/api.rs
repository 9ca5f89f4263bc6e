//! Domain methods for the Opentube API client.
//!
//! Response types are re-exported from `opentube_core::models`; the routes
//! match the handlers in opentube-api.

use crate::{ApiClient, ClientError};
use opentube_core::models::AssetRecord;
use uuid::Uuid;

impl ApiClient {
    /// Upload a video from a local file path. When `title` is omitted the
    /// server falls back to the sanitized filename.
    pub async fn upload_video(
        &self,
        file_path: &str,
        title: Option<&str>,
        description: Option<&str>,
        visibility: Option<&str>,
    ) -> Result<AssetRecord, ClientError> {
        use std::io::Read;

        let path = std::path::Path::new(file_path);
        if path
            .components()
            .any(|c| c == std::path::Component::ParentDir)
        {
            return Err(ClientError::InvalidPath(file_path.to_string()));
        }
        let mut file = std::fs::File::open(path).map_err(|source| ClientError::Io {
            path: file_path.to_string(),
            source,
        })?;

        let mut buffer = Vec::new();
        file.read_to_end(&mut buffer)
            .map_err(|source| ClientError::Io {
                path: file_path.to_string(),
                source,
            })?;

        let filename = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("video.mp4");

        let mut form = reqwest::multipart::Form::new().part(
            "file",
            reqwest::multipart::Part::bytes(buffer).file_name(filename.to_string()),
        );
        if let Some(title) = title {
            form = form.text("title", title.to_string());
        }
        if let Some(description) = description {
            form = form.text("description", description.to_string());
        }
        if let Some(visibility) = visibility {
            form = form.text("visibility", visibility.to_string());
        }

        self.post_multipart("/api/videos", form).await
    }

    /// List videos, optionally filtered by a search term.
    pub async fn list_videos(
        &self,
        search: Option<&str>,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> Result<Vec<AssetRecord>, ClientError> {
        let mut query: Vec<(&str, String)> = Vec::new();
        if let Some(s) = search {
            query.push(("search", s.to_string()));
        }
        if let Some(l) = limit {
            query.push(("limit", l.to_string()));
        }
        if let Some(o) = offset {
            query.push(("offset", o.to_string()));
        }

        self.get("/api/videos", &query).await
    }

    /// Get a single video by id.
    pub async fn get_video(&self, id: Uuid) -> Result<AssetRecord, ClientError> {
        self.get(&format!("/api/videos/{}", id), &[]).await
    }

    /// Delete a video by id. Requires an admin token.
    pub async fn delete_video(&self, id: Uuid) -> Result<(), ClientError> {
        self.delete(&format!("/api/videos/{}", id)).await
    }

    /// Liveness probe against /health.
    pub async fn health(&self) -> Result<serde_json::Value, ClientError> {
        self.get("/health", &[]).await
    }
}
