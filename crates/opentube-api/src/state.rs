//! Application state shared across handlers.

use opentube_catalog::CatalogWriter;
use opentube_core::Config;
use opentube_media::Inspector;
use opentube_storage::ObjectPublisher;
use std::sync::Arc;

/// Main application state: configuration plus the pipeline collaborators
/// behind their traits, so tests can swap in memory implementations.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub catalog: Arc<dyn CatalogWriter>,
    pub publisher: Arc<dyn ObjectPublisher>,
    pub inspector: Arc<dyn Inspector>,
}

impl AppState {
    pub fn new(
        config: Config,
        catalog: Arc<dyn CatalogWriter>,
        publisher: Arc<dyn ObjectPublisher>,
        inspector: Arc<dyn Inspector>,
    ) -> Self {
        Self {
            config,
            catalog,
            publisher,
            inspector,
        }
    }
}

fn _assert_app_state_send_sync() {
    fn assert_send<T: Send>() {}
    fn assert_sync<T: Sync>() {}
    assert_send::<AppState>();
    assert_sync::<AppState>();
}
