//! # airdrop-core: Reward aggregation and distribution analytics.
//!
//! Turns NFT holder snapshots and a per-contract reward-rate table into a
//! per-wallet reward distribution, optionally merged across networks and
//! capped per token type, plus descriptive analytics.
//!
//! # Modules
//!
//! - [`config`]: `RewardsConfig` loading and validation
//! - [`snapshot`]: snapshot discovery, parsing, input-mode resolution
//! - [`aggregate`]: fold snapshots into a holder → reward map
//! - [`cap`]: per-token payout ceiling
//! - [`analytics`]: statistics, percentiles, buckets, top holders, Gini
//! - [`output`]: the four output artifacts
//! - [`pipeline`]: sequences the stages for one batch run
//! - [`error`]: error taxonomy

pub mod aggregate;
pub mod analytics;
pub mod cap;
pub mod config;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod snapshot;
pub mod types;

pub use aggregate::{aggregate, Aggregation};
pub use analytics::{AnalyticsSummary, DistributionBucket, Percentiles, TopHolder};
pub use cap::{apply_cap, CapReport, TokenCap};
pub use config::RewardsConfig;
pub use error::DropError;
pub use output::OutputPaths;
pub use pipeline::{run, RunConfig, RunReport};
pub use snapshot::SnapshotSource;
pub use types::{HolderRewards, ProcessedOutput, RewardVector, Snapshot};
