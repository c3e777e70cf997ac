//! mockgate: reverse-proxy gateway with mock endpoints and a full audit
//! trail of every forwarded exchange.
//!
//! # Architecture Overview
//!
//! ```text
//!                    ┌──────────────────────────────────────────────┐
//!                    │                  MOCKGATE                     │
//!   /gateway/* ──────┼─▶ gateway::router ─▶ gateway::dispatch ──────┼──▶ upstream
//!                    │          │                   │               │
//!                    │          │                   ▼               │
//!                    │          │            audit (one record      │
//!                    │          │             per request)          │
//!   /mock/*  ────────┼─▶ mock::canonical ─▶ mock::matcher ─▶ synth  │
//!   /mock2/* ────────┼─▶ mock::matcher (body ignored) ─▶ synth      │
//!                    │                                              │
//!   /admin/* ────────┼─▶ route/mock CRUD + audit views              │
//!                    │                                              │
//!                    │  config · store · observability · lifecycle  │
//!                    └──────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;

use mockgate::audit::MemoryAuditSink;
use mockgate::config::loader;
use mockgate::observability::{logging, metrics};
use mockgate::{AppConfig, ConfigStore, HttpServer, Shutdown};

/// Reverse-proxy gateway with configurable mock endpoints.
#[derive(Parser)]
#[command(name = "mockgate", version, about)]
struct Cli {
    /// Path to the TOML configuration file. Defaults are used when absent.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => loader::load_config(path)?,
        None => AppConfig::default(),
    };

    logging::init(&config.observability.log_level);

    tracing::info!("mockgate v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        routes = config.routes.len(),
        mock_rules = config.mocks.len() + config.basic_mocks.len(),
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    let store = Arc::new(ConfigStore::from_config(
        &config.routes,
        &config.mocks,
        &config.basic_mocks,
    )?);
    let sink = Arc::new(MemoryAuditSink::new());
    let shutdown = Arc::new(Shutdown::new());

    if config.observability.metrics_enabled {
        if let Ok(addr) = config.observability.metrics_address.parse() {
            metrics::init_metrics(addr);
        } else {
            tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            );
        }
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    let local_addr = listener.local_addr()?;
    tracing::info!(address = %local_addr, "Listening for connections");

    let server = HttpServer::new(config, store, sink, shutdown);
    server.run(listener).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
