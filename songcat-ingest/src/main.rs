//! songcat-ingest - song catalog batch importer
//!
//! Reads a JSON-lines catalog export and reconciles it, one batch per
//! transaction, into the normalized catalog database.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use songcat_common::config::{default_config_path, ConfigOverrides, IngestConfig};
use songcat_ingest::{ingest_batch, IngestTotals, RecordSupplier};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Command-line arguments for songcat-ingest
#[derive(Parser, Debug)]
#[command(name = "songcat-ingest")]
#[command(about = "Import a song catalog export into the catalog database")]
#[command(version)]
struct Args {
    /// JSON-lines catalog export, one record per line
    input: PathBuf,

    /// TOML bootstrap configuration
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Catalog database file (overrides env and TOML)
    #[arg(short, long)]
    database: Option<PathBuf>,

    /// Records per batch (overrides env and TOML)
    #[arg(short, long)]
    batch_size: Option<usize>,

    /// Log level when RUST_LOG is not set
    #[arg(short, long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config_path = args.config.clone().unwrap_or_else(default_config_path);
    let config = IngestConfig::resolve(
        &config_path,
        ConfigOverrides {
            database_path: args.database.clone(),
            batch_size: args.batch_size,
            log_level: args.log_level.clone(),
        },
    )
    .context("Failed to resolve configuration")?;

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.log_level.clone().into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting songcat-ingest v{}", env!("CARGO_PKG_VERSION"));
    info!("Input: {}", args.input.display());
    info!("Database: {}", config.database_path.display());
    info!("Batch size: {}", config.batch_size);

    let pool = songcat_common::db::init_database(&config.database_path, config.max_connections)
        .await
        .context("Failed to open catalog database")?;

    let mut supplier = RecordSupplier::open(&args.input, config.batch_size)
        .await
        .with_context(|| format!("Failed to open {}", args.input.display()))?;

    let mut totals = IngestTotals::default();
    while let Some(records) = supplier
        .next_batch()
        .await
        .context("Failed to read input")?
    {
        let outcome = ingest_batch(&pool, &records)
            .await
            .with_context(|| format!("Batch {} failed", totals.batches + 1))?;
        totals.add_batch(&outcome.stats);
    }
    totals.skipped_lines = supplier.skipped_lines();

    info!(
        "Ingest complete: {}",
        serde_json::to_string(&totals).context("Failed to render summary")?
    );

    pool.close().await;
    Ok(())
}
