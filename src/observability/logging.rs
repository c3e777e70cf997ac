//! Structured logging setup.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize the tracing subscriber. RUST_LOG wins over the configured
/// level when set.
pub fn init(log_level: &str) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("mockgate={log_level},tower_http=info").into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
