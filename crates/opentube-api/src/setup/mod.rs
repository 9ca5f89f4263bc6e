//! Application setup and initialization
//!
//! This module contains all application initialization logic extracted from main.rs
//! for better organization and testability.

pub mod database;
pub mod routes;
pub mod server;

use crate::state::AppState;
use anyhow::{Context, Result};
use opentube_catalog::{CatalogWriter, PgCatalog};
use opentube_core::Config;
use opentube_media::{FfmpegInspector, Inspector};
use opentube_storage::create_publisher;
use std::sync::Arc;
use std::time::Duration;

/// Initialize the entire application
pub async fn initialize_app(config: Config) -> Result<(Arc<AppState>, axum::Router)> {
    // Validate configuration first - fail fast on misconfiguration
    config
        .validate()
        .context("Configuration validation failed")?;

    // Initialize telemetry first
    crate::telemetry::init_telemetry(&config)
        .map_err(|e| anyhow::anyhow!("Failed to initialize telemetry: {}", e))?;

    tracing::info!("Configuration loaded and validated successfully");

    // Setup database
    let pool = database::setup_database(&config).await?;
    let catalog: Arc<dyn CatalogWriter> = Arc::new(PgCatalog::new(pool));

    // Setup object publication backend
    let publisher = create_publisher(&config)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to initialize object publisher: {}", e))?;

    // Setup media inspection
    let inspector: Arc<dyn Inspector> = Arc::new(
        FfmpegInspector::new(
            config.ffprobe_path().to_string(),
            config.ffmpeg_path().to_string(),
            config.thumbnail_width(),
            config.thumbnail_height(),
            Duration::from_secs(config.probe_timeout_seconds()),
        )
        .map_err(|e| anyhow::anyhow!("Failed to initialize media inspector: {}", e))?,
    );

    let state = Arc::new(AppState::new(config.clone(), catalog, publisher, inspector));

    // Setup routes
    let router = routes::setup_routes(&config, state.clone())?;

    Ok((state, router))
}
