//! Output artifacts.
//!
//! Four files are derived from one base path `<dir>/<stem>.json`:
//!
//! - `<dir>/<stem>.json`: the distribution document
//! - `<dir>/<stem>_analytics.json`: [`AnalyticsSummary`]
//! - `<dir>/<stem>_distribution.csv`: `address,amount,rank`
//! - `<dir>/<stem>_frequency.csv`: `amount,count,percentage`
//!
//! Files are written in that order. A failure leaves earlier files in place.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::analytics::AnalyticsSummary;
use crate::error::OutputError;
use crate::types::{HolderRewards, ProcessedOutput};

/// Artifact paths for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputPaths {
    pub main: PathBuf,
    pub analytics: PathBuf,
    pub distribution_csv: PathBuf,
    pub frequency_csv: PathBuf,
}

impl OutputPaths {
    /// Derive the companion artifact paths from the main output path.
    pub fn derive(base: impl AsRef<Path>) -> Self {
        let base = base.as_ref();
        let stem = base
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "output".to_string());
        let dir = base.parent().unwrap_or_else(|| Path::new(""));
        let sibling = |suffix: &str| dir.join(format!("{stem}{suffix}"));

        Self {
            main: base.to_path_buf(),
            analytics: sibling("_analytics.json"),
            distribution_csv: sibling("_distribution.csv"),
            frequency_csv: sibling("_frequency.csv"),
        }
    }
}

/// One row of the distribution CSV.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DistributionRow {
    pub address: String,
    pub amount: u64,
    /// 1-based position by amount, descending.
    pub rank: usize,
}

/// One row of the frequency CSV.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrequencyRow {
    pub amount: u64,
    pub count: usize,
    /// `count / total_holders * 100`, two decimals.
    pub percentage: String,
}

/// Holders ranked by first-token amount, descending. Ties keep address order.
pub fn distribution_rows(rewards: &HolderRewards) -> Vec<DistributionRow> {
    let mut amounts = rewards.first_token_amounts();
    amounts.sort_by(|a, b| b.1.cmp(&a.1));
    amounts
        .into_iter()
        .enumerate()
        .map(|(i, (address, amount))| DistributionRow {
            address: address.to_string(),
            amount,
            rank: i + 1,
        })
        .collect()
}

/// Holder counts per exact first-token amount, amount descending.
pub fn frequency_rows(rewards: &HolderRewards) -> Vec<FrequencyRow> {
    let total = rewards.len();
    let mut counts: BTreeMap<u64, usize> = BTreeMap::new();
    for (_, amount) in rewards.first_token_amounts() {
        *counts.entry(amount).or_default() += 1;
    }
    counts
        .into_iter()
        .rev()
        .map(|(amount, count)| FrequencyRow {
            amount,
            count,
            percentage: format!("{:.2}", count as f64 / total as f64 * 100.0),
        })
        .collect()
}

fn write_err(path: &Path, reason: impl ToString) -> OutputError {
    OutputError::Write {
        path: path.display().to_string(),
        reason: reason.to_string(),
    }
}

/// Pretty-print `value` as JSON to `path`.
pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), OutputError> {
    let mut json = serde_json::to_string_pretty(value).map_err(|e| write_err(path, e))?;
    json.push('\n');
    std::fs::write(path, json).map_err(|e| write_err(path, e))
}

fn write_csv<R: Serialize>(path: &Path, header: &[&str], rows: &[R]) -> Result<(), OutputError> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(path)
        .map_err(|e| write_err(path, e))?;
    writer.write_record(header).map_err(|e| write_err(path, e))?;
    for row in rows {
        writer.serialize(row).map_err(|e| write_err(path, e))?;
    }
    writer.flush().map_err(|e| write_err(path, e))
}

pub fn write_distribution_csv(path: &Path, rewards: &HolderRewards) -> Result<(), OutputError> {
    write_csv(path, &["address", "amount", "rank"], &distribution_rows(rewards))
}

pub fn write_frequency_csv(path: &Path, rewards: &HolderRewards) -> Result<(), OutputError> {
    write_csv(path, &["amount", "count", "percentage"], &frequency_rows(rewards))
}

/// Write all four artifacts, creating the output directory if needed.
pub fn write_artifacts(
    paths: &OutputPaths,
    output: &ProcessedOutput,
    summary: &AnalyticsSummary,
    rewards: &HolderRewards,
) -> Result<(), OutputError> {
    if let Some(dir) = paths.main.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir).map_err(|e| OutputError::CreateDir {
            path: dir.display().to_string(),
            reason: e.to_string(),
        })?;
    }

    write_json(&paths.main, output)?;
    info!(path = %paths.main.display(), holders = output.snapshot.len(), "wrote distribution");
    write_json(&paths.analytics, summary)?;
    info!(path = %paths.analytics.display(), "wrote analytics");
    write_distribution_csv(&paths.distribution_csv, rewards)?;
    info!(path = %paths.distribution_csv.display(), "wrote distribution csv");
    write_frequency_csv(&paths.frequency_csv, rewards)?;
    info!(path = %paths.frequency_csv.display(), "wrote frequency csv");
    Ok(())
}

fn read_err(path: &Path, reason: impl ToString) -> OutputError {
    OutputError::Read {
        path: path.display().to_string(),
        reason: reason.to_string(),
    }
}

/// Parse a previously written distribution document.
pub fn read_processed(path: impl AsRef<Path>) -> Result<ProcessedOutput, OutputError> {
    let path = path.as_ref();
    let raw = std::fs::read_to_string(path).map_err(|e| read_err(path, e))?;
    serde_json::from_str(&raw).map_err(|e| read_err(path, e))
}

/// Parse a previously written analytics artifact.
pub fn read_analytics(path: impl AsRef<Path>) -> Result<AnalyticsSummary, OutputError> {
    let path = path.as_ref();
    let raw = std::fs::read_to_string(path).map_err(|e| read_err(path, e))?;
    serde_json::from_str(&raw).map_err(|e| read_err(path, e))
}

/// Parse a previously written distribution CSV.
pub fn read_distribution_csv(path: impl AsRef<Path>) -> Result<Vec<DistributionRow>, OutputError> {
    let path = path.as_ref();
    let mut reader = csv::Reader::from_path(path).map_err(|e| read_err(path, e))?;
    reader
        .deserialize()
        .collect::<Result<Vec<DistributionRow>, csv::Error>>()
        .map_err(|e| read_err(path, e))
}
