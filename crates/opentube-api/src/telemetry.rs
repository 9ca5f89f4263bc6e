//! Tracing subscriber initialization.

use opentube_core::Config;
use tracing_subscriber::{
    fmt::format::Format, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter,
};

/// Initialize tracing. Production gets JSON lines for log shippers; elsewhere
/// a compact console format.
pub fn init_telemetry(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    if config.is_production() {
        tracing_subscriber::registry()
            .with(
                EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| "opentube=info,tower_http=info".into()),
            )
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        let console_fmt = tracing_subscriber::fmt::layer().event_format(
            Format::default()
                .compact()
                .with_target(false)
                .without_time(),
        );
        tracing_subscriber::registry()
            .with(
                EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| "opentube=debug,tower_http=debug".into()),
            )
            .with(console_fmt)
            .init();
    }

    Ok(())
}
