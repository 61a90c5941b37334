//! Shared fixtures for the end-to-end tests.

use std::path::{Path, PathBuf};

use airdrop_core::{RunConfig, SnapshotSource};
use serde_json::{json, Map, Value};

/// Write a rewards config with the given `(contract, rates)` entries.
pub fn write_rewards_config(dir: &Path, entries: &[(&str, &[u64])]) -> PathBuf {
    let contracts: Map<String, Value> = entries
        .iter()
        .map(|(address, rates)| (address.to_string(), json!(rates)))
        .collect();
    let path = dir.join("rewards.json");
    write_json(&path, &json!({ "contracts": contracts }));
    path
}

/// Write a snapshot in the `[[address, tokenIds], ...]` shape.
pub fn write_snapshot_pairs(
    dir: &Path,
    file_name: &str,
    network: &str,
    contract: &str,
    holders: &[(&str, &[&str])],
) -> PathBuf {
    let pairs: Vec<Value> = holders
        .iter()
        .map(|(address, ids)| json!([address, ids]))
        .collect();
    let path = dir.join(file_name);
    write_json(
        &path,
        &json!({
            "network": network,
            "contract_address": contract,
            "snapshot": pairs,
        }),
    );
    path
}

/// Write a snapshot in the `{address: tokenIds}` shape.
pub fn write_snapshot_map(
    dir: &Path,
    file_name: &str,
    network: &str,
    contract: &str,
    holders: &[(&str, Value)],
) -> PathBuf {
    let map: Map<String, Value> = holders
        .iter()
        .map(|(address, ids)| (address.to_string(), ids.clone()))
        .collect();
    let path = dir.join(file_name);
    write_json(
        &path,
        &json!({
            "network": network,
            "contract_address": contract,
            "snapshot": map,
        }),
    );
    path
}

/// `count` distinct hex token ids, `"0x1"` upward.
pub fn token_ids(count: usize) -> Vec<String> {
    (1..=count).map(|i| format!("0x{i:x}")).collect()
}

/// A run over an explicit file list, writing into `dir/out/processed.json`.
pub fn files_run(dir: &Path, rewards: PathBuf, paths: Vec<PathBuf>) -> RunConfig {
    RunConfig {
        name: "Test Drop".to_string(),
        description: "integration".to_string(),
        claim_contract: "0xclaim".to_string(),
        source: SnapshotSource::Files {
            paths,
            network: None,
        },
        rewards_config: rewards,
        output: dir.join("out").join("processed.json"),
        ..RunConfig::default()
    }
}

/// A folder-discovery run, optionally aggregating extra networks.
pub fn folder_run(dir: &Path, rewards: PathBuf, network: &str, aggregate: &[&str]) -> RunConfig {
    RunConfig {
        source: SnapshotSource::Folder {
            folder: dir.to_path_buf(),
            network: network.to_string(),
            aggregate_networks: aggregate.iter().map(|n| n.to_string()).collect(),
        },
        ..files_run(dir, rewards, Vec::new())
    }
}

fn write_json(path: &Path, value: &Value) {
    let raw = serde_json::to_string_pretty(value).expect("fixture serializes");
    std::fs::write(path, raw).expect("fixture written");
}
