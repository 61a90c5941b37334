//! airdrop-process: compute an airdrop reward distribution.
//!
//! Loads a reward-rate table and one or more holder snapshots, aggregates
//! rewards per wallet (optionally across networks), applies an optional
//! per-token cap, and writes the distribution plus analytics artifacts.

use std::path::PathBuf;
use std::process;

use airdrop_core::pipeline::{DEFAULT_ENTRYPOINT, DEFAULT_OUTPUT};
use airdrop_core::{run, DropError, RunConfig, SnapshotSource};
use clap::Parser;
use tracing::{error, info, warn};

/// Compute per-wallet airdrop rewards from NFT holder snapshots.
#[derive(Parser, Debug)]
#[command(
    name = "airdrop-process",
    version,
    about = "Aggregate holder snapshots into an airdrop distribution with analytics"
)]
struct Args {
    /// Drop name written into the distribution file
    #[arg(long)]
    name: String,

    /// Drop description written into the distribution file
    #[arg(long)]
    description: String,

    /// Claim contract address
    #[arg(long)]
    claim_contract: String,

    /// Claim contract entrypoint
    #[arg(long, default_value = DEFAULT_ENTRYPOINT)]
    entrypoint: String,

    /// Snapshot files to process (comma-separated)
    #[arg(long, value_delimiter = ',')]
    snapshots: Vec<PathBuf>,

    /// Folder scanned for `*_{network}.json` snapshot files
    #[arg(long)]
    snapshots_folder: Option<PathBuf>,

    /// Primary network
    #[arg(long)]
    network: Option<String>,

    /// Extra networks merged into the primary one (comma-separated)
    #[arg(long, value_delimiter = ',')]
    aggregate_networks: Vec<String>,

    /// Reward-rate table (JSON)
    #[arg(long)]
    rewards_config: PathBuf,

    /// Per-holder ceiling applied to each reward token
    #[arg(long)]
    token_cap: Option<u64>,

    /// Main output path; analytics and CSV paths are derived from it
    #[arg(long, default_value = DEFAULT_OUTPUT)]
    output: PathBuf,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Log output format ("text" or "json")
    #[arg(long, default_value = "text")]
    log_format: String,
}

impl Args {
    /// Convert CLI args into a RunConfig.
    fn into_config(self) -> Result<RunConfig, DropError> {
        let source = SnapshotSource::resolve(
            self.snapshots,
            self.snapshots_folder,
            self.network,
            self.aggregate_networks,
        )?;

        Ok(RunConfig {
            name: self.name,
            description: self.description,
            claim_contract: self.claim_contract,
            entrypoint: self.entrypoint,
            source,
            rewards_config: self.rewards_config,
            token_cap: self.token_cap,
            output: self.output,
        })
    }
}

fn main() {
    let args = Args::parse();
    init_logging(&args.log_level, &args.log_format);

    let config = match args.into_config() {
        Ok(config) => config,
        Err(e) => {
            error!("invalid arguments: {}", e);
            process::exit(e.exit_code());
        }
    };

    info!("airdrop-process v{}", env!("CARGO_PKG_VERSION"));
    info!("source: {:?}", config.source);
    info!("rewards_config: {:?}", config.rewards_config);
    if let Some(cap) = config.token_cap {
        info!("token_cap: {}", cap);
    }

    let report = match run(&config) {
        Ok(report) => report,
        Err(e) => {
            error!("run failed: {}", e);
            process::exit(e.exit_code());
        }
    };

    let distribution = &report.distribution;
    if !distribution.snapshots_skipped.is_empty() {
        warn!(
            "{} snapshot(s) had no configured reward rate: {:?}",
            distribution.snapshots_skipped.len(),
            distribution.snapshots_skipped
        );
    }
    info!("network: {}", report.network);
    info!(
        "snapshots: {} loaded, {} applied",
        report.snapshots_loaded, distribution.snapshots_applied
    );
    info!("holders: {}", distribution.summary.total_holders);
    info!("totals per reward token: {:?}", report.totals);
    info!(
        "mean {:.2}, median {}, max {}",
        distribution.summary.average_tokens_per_holder,
        distribution.summary.median_tokens_per_holder,
        distribution.summary.max
    );
    info!("distribution written to {}", report.paths.main.display());
    info!("analytics written to {}", report.paths.analytics.display());
}

/// Initialize tracing subscriber with the given log level and output format.
///
/// Pass `format = "json"` for structured JSON output. Any other value
/// defaults to human-readable text. `RUST_LOG` overrides `level_str`.
fn init_logging(level_str: &str, format: &str) {
    use tracing_subscriber::filter::EnvFilter;
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level_str));

    if format == "json" {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(true).with_level(true))
            .init();
    }
}
