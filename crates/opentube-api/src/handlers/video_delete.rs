use crate::auth::models::{AuthContext, UserRole};
use crate::error::HttpAppError;
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use opentube_core::AppError;
use opentube_storage::keys;
use std::sync::Arc;
use uuid::Uuid;

/// DELETE /api/videos/{id}
///
/// Admin only. Removes both published objects, then the catalog row. An
/// unpublish failure is logged for reconciliation and does not block the row
/// deletion, so a half-deleted asset can always be deleted again.
#[tracing::instrument(
    skip(state),
    fields(
        user_id = %auth.user_id,
        asset_id = %id,
        operation = "delete_video"
    )
)]
pub async fn delete_video(
    auth: AuthContext,
    Path(id): Path<Uuid>,
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpAppError> {
    if auth.role != UserRole::Admin {
        return Err(AppError::Forbidden("Administrator role required".to_string()).into());
    }

    let record = state
        .catalog
        .get(id)
        .await
        .map_err(HttpAppError::from)?
        .ok_or_else(|| AppError::NotFound("Asset not found".to_string()))?;

    // Object keys are reconstructed from the stored video URL.
    match keys::staged_name_from_url(&record.video_url) {
        Some(staged_name) => {
            let video_key = keys::video_key(staged_name);
            let thumbnail_key = keys::thumbnail_key(staged_name);
            for key in [&video_key, &thumbnail_key] {
                if let Err(e) = state.publisher.unpublish(key).await {
                    let reconciliation = AppError::ReconciliationNeeded {
                        keys: vec![key.to_string()],
                    };
                    tracing::error!(
                        asset_id = %id,
                        key = %key,
                        error = %e,
                        reconciliation = %reconciliation,
                        "unpublish failed during deletion"
                    );
                }
            }
        }
        None => {
            tracing::warn!(
                asset_id = %id,
                video_url = %record.video_url,
                "could not derive object keys from stored URL"
            );
        }
    }

    state.catalog.delete(id).await.map_err(HttpAppError::from)?;

    Ok(StatusCode::NO_CONTENT)
}
