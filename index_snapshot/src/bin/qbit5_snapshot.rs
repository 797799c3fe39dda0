use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use index_snapshot::artifacts::ArtifactStore;
use index_snapshot::config::{SnapshotConfig, load_config_path};
use index_snapshot::snapshot::{SnapshotOutcome, SnapshotRunner};
use market_feed::providers::yahoo_chart::YahooChartProvider;

#[derive(Parser)]
#[command(version, about = "QBIT-5 snapshot runner")]
struct Cli {
    /// Path to the snapshot config (TOML); built-in defaults apply when
    /// omitted.
    #[arg(long, value_name = "FILE")]
    config: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => load_config_path(path)?,
        None => SnapshotConfig::default(),
    };

    let source = YahooChartProvider::new(config.fetch.retry_policy())
        .context("failed to construct price source")?;
    let store = ArtifactStore::new(&config.output.dir);
    let runner = SnapshotRunner::new(config, source, store);

    // Benign no-data runs exit 0 like computed runs; only reference and
    // persistence failures propagate a non-zero exit.
    match runner.run().await? {
        SnapshotOutcome::Computed(stats) => {
            info!(key = %stats.key, pct = stats.pct_intraday, "snapshot done; artifacts written");
        }
        SnapshotOutcome::NoData(reason) => {
            info!(%reason, "nothing to publish");
        }
    }

    Ok(())
}
