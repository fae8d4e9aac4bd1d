use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use catalog_edge::catalog::SqliteCatalog;
use catalog_edge::config::load_sync_config;
use catalog_edge::lifecycle::wait_for_signal;
use catalog_edge::observability::logging;
use catalog_edge::sync::{run_once, AniListClient};

#[derive(Parser)]
#[command(name = "catalog-sync")]
#[command(about = "Pull recent titles from AniList into the catalog database", long_about = None)]
struct Cli {
    /// Optional TOML config file; environment variables override it.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Number of pages to fetch per run (overrides sync.pages).
    #[arg(long)]
    pages: Option<u32>,

    /// Keep running, syncing every N seconds (overrides sync.interval_secs).
    #[arg(long)]
    interval_secs: Option<u64>,

    /// Run forever on the configured interval instead of once.
    #[arg(long)]
    watch: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let mut config = load_sync_config(cli.config.as_deref())?;
    if let Some(pages) = cli.pages {
        config.sync.pages = pages;
    }
    if let Some(secs) = cli.interval_secs {
        config.sync.interval_secs = secs;
    }

    logging::init_logging(&config.observability.log_level);

    let catalog =
        SqliteCatalog::connect(&config.storage.database_url, config.storage.max_connections)
            .await?;
    let source = AniListClient::new(&config.sync)?;

    if !(cli.watch || cli.interval_secs.is_some()) {
        run_once(&source, &catalog, config.sync.pages).await;
        return Ok(());
    }

    let interval = Duration::from_secs(config.sync.interval_secs.max(1));
    tracing::info!(interval_secs = interval.as_secs(), "Running periodic sync");

    let mut ticker = tokio::time::interval(interval);
    let signal = wait_for_signal();
    tokio::pin!(signal);
    loop {
        tokio::select! {
            _ = ticker.tick() => {
                run_once(&source, &catalog, config.sync.pages).await;
            }
            _ = &mut signal => {
                tracing::info!("Sync stopped");
                break;
            }
        }
    }
    Ok(())
}
