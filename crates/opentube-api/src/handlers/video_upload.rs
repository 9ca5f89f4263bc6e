use crate::auth::models::AuthContext;
use crate::error::HttpAppError;
use crate::services::{IngestionService, UploadRequest};
use crate::state::AppState;
use crate::utils::upload::extract_upload_form;
use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use std::sync::Arc;

/// POST /api/videos
///
/// Multipart body: one `file` field plus optional `title`, `description` and
/// `visibility` fields. Returns 201 with the created asset record.
pub async fn upload_video(
    State(state): State<Arc<AppState>>,
    auth: AuthContext,
    multipart: Multipart,
) -> Result<impl IntoResponse, HttpAppError> {
    let form = extract_upload_form(multipart)
        .await
        .map_err(HttpAppError::from)?;

    let service = IngestionService::new(&state);
    let record = service
        .ingest(UploadRequest {
            data: form.data,
            filename: form.filename,
            content_type: form.content_type,
            title: form.title,
            description: form.description,
            visibility: form.visibility,
            tags: Vec::new(),
            owner_id: auth.user_id,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(record)))
}
