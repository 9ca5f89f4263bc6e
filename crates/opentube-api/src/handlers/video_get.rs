use crate::error::HttpAppError;
use crate::state::AppState;
use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    Json,
};
use opentube_core::AppError;
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}

fn default_limit() -> i64 {
    50
}

/// GET /api/videos/{id}
///
/// Returns the asset record and bumps its view counter. The increment is
/// fire-and-forget; a lost increment never fails the read.
#[tracing::instrument(skip(state), fields(asset_id = %id, operation = "get_video"))]
pub async fn get_video(
    Path(id): Path<Uuid>,
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpAppError> {
    let record = state
        .catalog
        .get(id)
        .await
        .map_err(HttpAppError::from)?
        .ok_or_else(|| AppError::NotFound("Asset not found".to_string()))?;

    let catalog = state.catalog.clone();
    tokio::spawn(async move {
        if let Err(e) = catalog.increment_views(id).await {
            tracing::debug!(asset_id = %id, error = %e, "Failed to increment view count");
        }
    });

    Ok(Json(record))
}

/// GET /api/videos
///
/// Lists the most recent assets, or searches title/description/tags when
/// `?search=` is present.
#[tracing::instrument(
    skip(state, params),
    fields(
        limit = params.limit,
        offset = params.offset,
        search = ?params.search,
        operation = "list_videos"
    )
)]
pub async fn list_videos(
    Query(params): Query<ListQuery>,
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpAppError> {
    let records = match params.search.as_deref().map(str::trim) {
        Some(query) if !query.is_empty() => state.catalog.search(query).await,
        _ => {
            let limit = params.limit.clamp(1, 100);
            let offset = params.offset.max(0);
            state.catalog.list(limit, offset).await
        }
    }
    .map_err(|e| {
        tracing::error!(error = %e, "Failed to list videos");
        HttpAppError::from(e)
    })?;

    Ok(Json(records))
}
