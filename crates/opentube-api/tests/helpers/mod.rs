//! Test helpers: build AppState and router for integration tests.
//!
//! Run from workspace root: `cargo test -p opentube-api --test videos_test` or
//! `cargo test -p opentube-api`. All collaborators are in-memory; no database
//! or object store is required.

#![allow(dead_code)]

pub mod auth;
pub mod inspector;

use axum_test::TestServer;
use opentube_api::setup::routes;
use opentube_api::state::AppState;
use opentube_catalog::{CatalogWriter, MemoryCatalog};
use opentube_core::{Config, IngestConfig};
use opentube_media::Inspector;
use opentube_storage::{MemoryPublisher, ObjectPublisher};
use std::sync::Arc;
use tempfile::TempDir;

use inspector::StubInspector;

/// Test application: server plus handles on the in-memory collaborators.
pub struct TestApp {
    pub server: TestServer,
    pub catalog: Arc<MemoryCatalog>,
    pub publisher: MemoryPublisher,
    staging_root: TempDir,
}

impl TestApp {
    pub fn client(&self) -> &TestServer {
        &self.server
    }

    /// Number of entries left under the staging root. Zero once every
    /// pipeline run has cleaned up after itself.
    pub fn staged_entry_count(&self) -> usize {
        std::fs::read_dir(self.staging_root.path())
            .map(|entries| entries.count())
            .unwrap_or(0)
    }
}

/// Configuration for tests: tiny size ceiling, millisecond retry delays.
pub fn test_config(staging_dir: &str) -> Config {
    Config(Box::new(IngestConfig {
        server_port: 0,
        cors_origins: "*".to_string(),
        environment: "test".to_string(),
        jwt_secret: auth::TEST_JWT_SECRET.to_string(),
        database_url: "postgres://unused".to_string(),
        db_max_connections: 1,
        db_timeout_seconds: 5,
        storage_backend: None,
        s3_bucket: None,
        s3_region: None,
        s3_endpoint: None,
        public_base_url: None,
        local_storage_path: "./storage".to_string(),
        local_base_url: "http://localhost:4000/files".to_string(),
        staging_dir: staging_dir.to_string(),
        max_video_size_mb: 1,
        ffmpeg_path: "ffmpeg".to_string(),
        ffprobe_path: "ffprobe".to_string(),
        probe_timeout_seconds: 5,
        thumbnail_width: 1280,
        thumbnail_height: 720,
        publish_max_retries: 3,
        publish_base_delay_ms: 1,
        publish_max_delay_ms: 5,
    }))
}

/// Build an AppState wired to in-memory collaborators. Returns handles so
/// tests can inject failures and assert on stored state.
pub fn build_state(
    staging_dir: &str,
    inspector: Arc<dyn Inspector>,
) -> (Arc<AppState>, Arc<MemoryCatalog>, MemoryPublisher) {
    let catalog = Arc::new(MemoryCatalog::new());
    let publisher = MemoryPublisher::new();

    let state = Arc::new(AppState::new(
        test_config(staging_dir),
        catalog.clone() as Arc<dyn CatalogWriter>,
        Arc::new(publisher.clone()) as Arc<dyn ObjectPublisher>,
        inspector,
    ));

    (state, catalog, publisher)
}

/// Setup a test app whose inspector reports the given duration.
pub fn setup_test_app_with_duration(duration_seconds: f64) -> TestApp {
    setup_test_app_with_inspector(Arc::new(StubInspector::ok(duration_seconds)))
}

/// Setup a test app with the default inspector (20s duration).
pub fn setup_test_app() -> TestApp {
    setup_test_app_with_duration(20.0)
}

/// Setup a test app with a custom inspector.
pub fn setup_test_app_with_inspector(inspector: Arc<dyn Inspector>) -> TestApp {
    let staging_root = TempDir::new().expect("create staging root");
    let staging_dir = staging_root.path().to_str().expect("utf8 path").to_string();

    let (state, catalog, publisher) = build_state(&staging_dir, inspector);

    let router = routes::setup_routes(&state.config, state.clone()).expect("router setup");
    let server = TestServer::new(router).expect("test server");

    TestApp {
        server,
        catalog,
        publisher,
        staging_root,
    }
}
