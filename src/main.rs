//! Catalog edge server.
//!
//! # Architecture Overview
//!
//! ```text
//!                         ┌──────────────────────────────────────────────────┐
//!                         │                  CATALOG EDGE                    │
//!                         │                                                  │
//!     Client Request      │  ┌─────────┐   ┌───────────────────────────┐     │
//!     ────────────────────┼─▶│  http   │──▶│          gate             │     │
//!                         │  │ server  │   │ method → bot → origin →   │     │
//!                         │  └─────────┘   │ rate limit (KvStore)      │     │
//!                         │                └────────────┬──────────────┘     │
//!                         │                             ▼                    │
//!                         │                ┌───────────────────────────┐     │
//!                         │                │ handlers (route checks,   │     │
//!                         │                │ signature on episodes)    │     │
//!                         │                └────────────┬──────────────┘     │
//!                         │                             ▼                    │
//!     Client Response     │                ┌───────────────────────────┐     │
//!     ◀───────────────────┼────────────────│  catalog (SQLite)         │◀────┼── catalog-sync
//!                         │                └───────────────────────────┘     │     (AniList)
//!                         └──────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use catalog_edge::config::load_config;
use catalog_edge::lifecycle::{open_stores, wait_for_signal, Shutdown};
use catalog_edge::observability::{logging, metrics};
use catalog_edge::HttpServer;

#[derive(Parser)]
#[command(name = "catalog-edge")]
#[command(about = "Read-only anime catalog API behind an admission gate", long_about = None)]
struct Cli {
    /// Optional TOML config file; environment variables override it.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;

    logging::init_logging(&config.observability.log_level);
    tracing::info!("catalog-edge v{} starting", env!("CARGO_PKG_VERSION"));

    tracing::info!(
        bind_address = %config.listener.bind_address,
        allowed_origin = %config.gate.allowed_origin,
        rate_limit = config.rate_limit.max_requests,
        window_secs = config.rate_limit.window_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let shutdown = Shutdown::new();
    let stores = open_stores(&config, &shutdown).await?;

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let server = HttpServer::new(config, stores.catalog, stores.kv);
    let server_shutdown = shutdown.subscribe();

    let signal_shutdown = shutdown.clone();
    tokio::spawn(async move {
        wait_for_signal().await;
        signal_shutdown.trigger();
    });

    server.run(listener, server_shutdown).await?;

    shutdown.trigger();
    tracing::info!("Shutdown complete");
    Ok(())
}
