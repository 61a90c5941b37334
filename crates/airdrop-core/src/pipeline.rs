//! Batch pipeline: `Load → Validate → Aggregate → Cap → Analyze → Write`.
//!
//! Strictly sequential and fail-fast. Nothing is retried and nothing written
//! by an earlier stage is rolled back.

use std::path::PathBuf;

use tracing::info;

use crate::aggregate::aggregate;
use crate::analytics::AnalyticsSummary;
use crate::cap::{apply_cap, CapReport, TokenCap};
use crate::config::RewardsConfig;
use crate::error::{DropError, InputModeError};
use crate::output::{write_artifacts, OutputPaths};
use crate::snapshot::{load_snapshots, validate_networks, SnapshotSource};
use crate::types::{DropMetadata, HolderRewards, ProcessedOutput, RewardVector, Snapshot};

/// Default main output path.
pub const DEFAULT_OUTPUT: &str = "processed_snapshot.json";

/// Default claim entrypoint written into the distribution document.
pub const DEFAULT_ENTRYPOINT: &str = "claim_from_forwarder";

/// Everything one run needs.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub name: String,
    pub description: String,
    pub claim_contract: String,
    pub entrypoint: String,
    pub source: SnapshotSource,
    pub rewards_config: PathBuf,
    /// Per-token payout ceiling; must be positive when set.
    pub token_cap: Option<u64>,
    /// Main output path; the other artifacts are derived from it.
    pub output: PathBuf,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            name: String::new(),
            description: String::new(),
            claim_contract: String::new(),
            entrypoint: DEFAULT_ENTRYPOINT.to_string(),
            source: SnapshotSource::Files {
                paths: Vec::new(),
                network: None,
            },
            rewards_config: PathBuf::from("rewards.json"),
            token_cap: None,
            output: PathBuf::from(DEFAULT_OUTPUT),
        }
    }
}

/// In-memory result of aggregation, capping, and analysis.
#[derive(Debug, Clone, PartialEq)]
pub struct Distribution {
    pub rewards: HolderRewards,
    pub summary: AnalyticsSummary,
    pub snapshots_applied: usize,
    pub snapshots_skipped: Vec<String>,
    pub zero_holders_dropped: usize,
    pub cap: CapReport,
}

/// Aggregate, cap, and analyze already-loaded snapshots.
pub fn compute(
    snapshots: &[Snapshot],
    config: &RewardsConfig,
    cap: Option<TokenCap>,
) -> Result<Distribution, DropError> {
    let aggregation = aggregate(snapshots, config)?;
    info!(
        stage = "aggregate",
        holders = aggregation.rewards.len(),
        applied = aggregation.snapshots_applied,
        skipped = aggregation.snapshots_skipped.len(),
        zero_dropped = aggregation.zero_holders_dropped,
        "aggregated rewards"
    );
    if aggregation.rewards.is_empty() {
        return Err(DropError::EmptyResult);
    }

    let (rewards, cap_report) = apply_cap(aggregation.rewards, cap);
    if let Some(cap) = cap {
        info!(
            stage = "cap",
            cap = cap.get(),
            holders_capped = cap_report.holders_capped,
            removed = cap_report.amount_removed,
            "applied token cap"
        );
    }

    let summary = AnalyticsSummary::from_rewards(&rewards);
    info!(
        stage = "analyze",
        holders = summary.total_holders,
        total = %summary.total_tokens_distributed,
        "computed analytics"
    );

    Ok(Distribution {
        rewards,
        summary,
        snapshots_applied: aggregation.snapshots_applied,
        snapshots_skipped: aggregation.snapshots_skipped,
        zero_holders_dropped: aggregation.zero_holders_dropped,
        cap: cap_report,
    })
}

/// What a completed run produced.
#[derive(Debug, Clone, PartialEq)]
pub struct RunReport {
    pub network: String,
    pub snapshots_loaded: usize,
    pub distribution: Distribution,
    /// Post-cap totals per reward-token index.
    pub totals: RewardVector,
    pub paths: OutputPaths,
}

/// Run the whole pipeline and write the four artifacts.
pub fn run(config: &RunConfig) -> Result<RunReport, DropError> {
    let cap = config.token_cap.map(TokenCap::new).transpose()?;

    let rewards_config = RewardsConfig::load(&config.rewards_config)?;
    info!(
        stage = "load",
        path = %config.rewards_config.display(),
        contracts = rewards_config.len(),
        reward_tokens = rewards_config.num_reward_tokens(),
        "loaded rewards config"
    );

    let snapshot_paths = config.source.paths()?;
    if snapshot_paths.is_empty() {
        return Err(InputModeError::EmptySnapshotList.into());
    }
    let snapshots = load_snapshots(&snapshot_paths)?;
    info!(stage = "load", snapshots = snapshots.len(), "loaded snapshots");

    let network = if config.source.is_aggregate() {
        info!(stage = "validate", "aggregate mode; skipping network consistency check");
        config.source.network().unwrap_or_default().to_string()
    } else {
        let network = validate_networks(&snapshots, config.source.network())?;
        info!(stage = "validate", network = %network, "snapshots share one network");
        network
    };

    let distribution = compute(&snapshots, &rewards_config, cap)?;

    let metadata = DropMetadata {
        name: config.name.clone(),
        network: network.clone(),
        description: config.description.clone(),
        claim_contract: config.claim_contract.clone(),
        entrypoint: config.entrypoint.clone(),
    };
    let output = ProcessedOutput::new(&metadata, &distribution.rewards);
    let paths = OutputPaths::derive(&config.output);
    write_artifacts(&paths, &output, &distribution.summary, &distribution.rewards)?;

    Ok(RunReport {
        network,
        snapshots_loaded: snapshots.len(),
        totals: distribution.rewards.totals(),
        distribution,
        paths,
    })
}
