//! End-to-end tests: rewards config and snapshot files in, four artifacts out.
//!
//! Every test works in its own temp directory and goes through `run`, the
//! same entry point the `airdrop-process` binary uses.

use airdrop_core::error::{InputModeError, SnapshotError};
use airdrop_core::output::{read_analytics, read_distribution_csv, read_processed};
use airdrop_core::{run, DropError, RunConfig};
use airdrop_tests::helpers::*;
use serde_json::json;

fn ids(count: usize) -> Vec<String> {
    token_ids(count)
}

fn as_strs(ids: &[String]) -> Vec<&str> {
    ids.iter().map(String::as_str).collect()
}

/// Config `{"0xA":[10]}`, holders 0x1 (2 tokens) and 0x2 (1 token).
fn scenario_a(dir: &std::path::Path) -> RunConfig {
    let rewards = write_rewards_config(dir, &[("0xA", &[10])]);
    let two = ids(2);
    let one = ids(1);
    let snap = write_snapshot_pairs(
        dir,
        "0xA_ethereum.json",
        "ethereum",
        "0xA",
        &[("0x1", &as_strs(&two)), ("0x2", &as_strs(&one))],
    );
    files_run(dir, rewards, vec![snap])
}

#[test]
fn scenario_a_aggregates_per_token_rewards() {
    let dir = tempfile::tempdir().unwrap();
    let report = run(&scenario_a(dir.path())).unwrap();

    assert_eq!(report.network, "ethereum");
    assert_eq!(report.snapshots_loaded, 1);
    assert_eq!(report.totals, vec![30]);

    let processed = read_processed(&report.paths.main).unwrap();
    assert_eq!(processed.name, "Test Drop");
    assert_eq!(processed.network, "ethereum");
    assert_eq!(processed.entrypoint, "claim_from_forwarder");
    assert_eq!(
        processed.snapshot,
        vec![("0x1".to_string(), vec![20]), ("0x2".to_string(), vec![10])]
    );
}

#[test]
fn scenario_b_cap_then_analytics() {
    let dir = tempfile::tempdir().unwrap();
    let config = RunConfig {
        token_cap: Some(15),
        ..scenario_a(dir.path())
    };
    let report = run(&config).unwrap();

    let processed = read_processed(&report.paths.main).unwrap();
    let rewards = processed.holder_rewards();
    assert_eq!(rewards.get("0x1"), Some(&vec![15]));
    assert_eq!(rewards.get("0x2"), Some(&vec![10]));

    let analytics = read_analytics(&report.paths.analytics).unwrap();
    assert_eq!(analytics.total_holders, 2);
    assert_eq!(analytics.total_tokens_distributed, 25);
    assert_eq!(analytics.average_tokens_per_holder, 12.5);
    assert_eq!(analytics.median_tokens_per_holder, 12.5);
    assert_eq!(analytics.min, 10);
    assert_eq!(analytics.max, 15);
    assert_eq!(analytics.top_holders[0].address, "0x1");
    assert_eq!(report.distribution.cap.holders_capped, 1);
    assert_eq!(report.distribution.cap.amount_removed, 5);
}

#[test]
fn scenario_c_aggregate_networks_sum_across_chains() {
    let dir = tempfile::tempdir().unwrap();
    let rewards = write_rewards_config(dir.path(), &[("0xA", &[10]), ("0xB", &[5])]);
    let one = ids(1);
    write_snapshot_pairs(dir.path(), "0xA_ethereum.json", "ethereum", "0xA", &[("0x1", &as_strs(&one))]);
    write_snapshot_pairs(dir.path(), "0xB_arbitrum.json", "arbitrum", "0xB", &[("0x1", &as_strs(&one))]);

    let report = run(&folder_run(dir.path(), rewards, "ethereum", &["arbitrum"])).unwrap();

    assert_eq!(report.network, "ethereum");
    assert_eq!(report.snapshots_loaded, 2);
    let processed = read_processed(&report.paths.main).unwrap();
    assert_eq!(processed.snapshot, vec![("0x1".to_string(), vec![15])]);
}

#[test]
fn folder_mode_without_aggregation_only_reads_one_network() {
    let dir = tempfile::tempdir().unwrap();
    let rewards = write_rewards_config(dir.path(), &[("0xA", &[10]), ("0xB", &[5])]);
    let one = ids(1);
    write_snapshot_pairs(dir.path(), "0xA_Ethereum.json", "Ethereum", "0xA", &[("0x1", &as_strs(&one))]);
    write_snapshot_pairs(dir.path(), "0xB_arbitrum.json", "arbitrum", "0xB", &[("0x1", &as_strs(&one))]);

    let report = run(&folder_run(dir.path(), rewards, "ethereum", &[])).unwrap();

    assert_eq!(report.snapshots_loaded, 1);
    assert_eq!(report.totals, vec![10]);
}

#[test]
fn scenario_d_unknown_contract_is_skipped() {
    let dir = tempfile::tempdir().unwrap();
    let rewards = write_rewards_config(dir.path(), &[("0xA", &[10])]);
    let one = ids(1);
    let known = write_snapshot_pairs(dir.path(), "a_ethereum.json", "ethereum", "0xa", &[("0x1", &as_strs(&one))]);
    let unknown = write_snapshot_pairs(dir.path(), "z_ethereum.json", "ethereum", "0xZ", &[("0x9", &as_strs(&one))]);

    let report = run(&files_run(dir.path(), rewards, vec![known, unknown.clone()])).unwrap();

    assert_eq!(report.distribution.snapshots_applied, 1);
    assert_eq!(
        report.distribution.snapshots_skipped,
        vec![unknown.display().to_string()]
    );
    let processed = read_processed(&report.paths.main).unwrap();
    assert_eq!(processed.snapshot, vec![("0x1".to_string(), vec![10])]);
}

#[test]
fn multi_token_vectors_survive_to_output() {
    let dir = tempfile::tempdir().unwrap();
    let rewards = write_rewards_config(dir.path(), &[("0xA", &[10, 3]), ("0xB", &[1, 100])]);
    let two = ids(2);
    let one = ids(1);
    let a = write_snapshot_pairs(dir.path(), "a_ethereum.json", "ethereum", "0xA", &[("0x1", &as_strs(&two))]);
    let b = write_snapshot_pairs(dir.path(), "b_ethereum.json", "ethereum", "0xB", &[("0x1", &as_strs(&one)), ("0x2", &as_strs(&one))]);

    let config = RunConfig {
        token_cap: Some(50),
        ..files_run(dir.path(), rewards, vec![a, b])
    };
    let report = run(&config).unwrap();

    let processed = read_processed(&report.paths.main).unwrap();
    assert_eq!(
        processed.snapshot,
        vec![("0x1".to_string(), vec![21, 50]), ("0x2".to_string(), vec![1, 50])]
    );
    // Analytics follow the first reward token only.
    let analytics = read_analytics(&report.paths.analytics).unwrap();
    assert_eq!(analytics.total_tokens_distributed, 22);
}

#[test]
fn all_four_artifacts_are_written() {
    let dir = tempfile::tempdir().unwrap();
    let report = run(&scenario_a(dir.path())).unwrap();

    let out = dir.path().join("out");
    assert_eq!(report.paths.main, out.join("processed.json"));
    assert_eq!(report.paths.analytics, out.join("processed_analytics.json"));
    assert_eq!(report.paths.distribution_csv, out.join("processed_distribution.csv"));
    assert_eq!(report.paths.frequency_csv, out.join("processed_frequency.csv"));

    let rows = read_distribution_csv(&report.paths.distribution_csv).unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!((rows[0].address.as_str(), rows[0].amount, rows[0].rank), ("0x1", 20, 1));
    assert_eq!((rows[1].address.as_str(), rows[1].amount, rows[1].rank), ("0x2", 10, 2));

    let frequency = std::fs::read_to_string(&report.paths.frequency_csv).unwrap();
    assert_eq!(frequency, "amount,count,percentage\n20,1,50.00\n10,1,50.00\n");
}

#[test]
fn analytics_buckets_cover_every_holder() {
    let dir = tempfile::tempdir().unwrap();
    let rewards = write_rewards_config(dir.path(), &[("0xA", &[1])]);
    let sizes = [3usize, 7, 12, 30, 60, 150, 400, 700, 1200];
    let id_sets: Vec<Vec<String>> = sizes.iter().map(|n| ids(*n)).collect();
    let addresses: Vec<String> = (0..sizes.len()).map(|i| format!("0x{i}")).collect();
    let holder_ids: Vec<Vec<&str>> = id_sets.iter().map(|s| as_strs(s)).collect();
    let holders: Vec<(&str, &[&str])> = addresses
        .iter()
        .zip(holder_ids.iter())
        .map(|(a, ids)| (a.as_str(), ids.as_slice()))
        .collect();
    let snap = write_snapshot_pairs(dir.path(), "a_ethereum.json", "ethereum", "0xA", &holders);

    let report = run(&files_run(dir.path(), rewards, vec![snap])).unwrap();
    let analytics = read_analytics(&report.paths.analytics).unwrap();

    let counts: Vec<usize> = analytics.distribution_buckets.iter().map(|b| b.count).collect();
    assert_eq!(counts, vec![1; 9]);
    let covered: usize = counts.iter().sum();
    assert_eq!(covered, analytics.total_holders);
    let last = analytics.distribution_buckets.last().unwrap();
    assert_eq!(last.range, "1001+");
    assert_eq!(last.max, None);
    assert_eq!(analytics.max, 1200);
}

#[test]
fn object_map_shape_counts_non_hex_strings() {
    let dir = tempfile::tempdir().unwrap();
    let rewards = write_rewards_config(dir.path(), &[("0xA", &[10])]);
    let snap = write_snapshot_map(
        dir.path(),
        "a_ethereum.json",
        "ethereum",
        "0xA",
        &[("0x1", json!(["not-hex", 7])), ("0x2", json!(["zz"]))],
    );

    let report = run(&files_run(dir.path(), rewards, vec![snap])).unwrap();
    let processed = read_processed(&report.paths.main).unwrap();
    assert_eq!(
        processed.snapshot,
        vec![("0x1".to_string(), vec![20]), ("0x2".to_string(), vec![10])]
    );
}

#[test]
fn pairs_shape_counts_non_hex_strings() {
    // Pairs-shape string ids go through hex parsing, map-shape ids do not.
    // Either way a malformed id still counts as one token.
    let dir = tempfile::tempdir().unwrap();
    let rewards = write_rewards_config(dir.path(), &[("0xA", &[10])]);
    let snap = write_snapshot_pairs(dir.path(), "a_ethereum.json", "ethereum", "0xA", &[("0x1", &["token-7"])]);

    let report = run(&files_run(dir.path(), rewards, vec![snap])).unwrap();
    let processed = read_processed(&report.paths.main).unwrap();
    assert_eq!(processed.snapshot, vec![("0x1".to_string(), vec![10])]);
}

#[test]
fn missing_network_files_abort() {
    let dir = tempfile::tempdir().unwrap();
    let rewards = write_rewards_config(dir.path(), &[("0xA", &[10])]);
    let one = ids(1);
    write_snapshot_pairs(dir.path(), "a_ethereum.json", "ethereum", "0xA", &[("0x1", &as_strs(&one))]);

    let err = run(&folder_run(dir.path(), rewards, "ethereum", &["base"])).unwrap_err();
    assert_eq!(
        err,
        DropError::Snapshot(SnapshotError::NotFound {
            folder: dir.path().display().to_string(),
            network: "base".into(),
        })
    );
    assert!(!dir.path().join("out").exists());
}

#[test]
fn malformed_snapshot_names_the_file() {
    let dir = tempfile::tempdir().unwrap();
    let rewards = write_rewards_config(dir.path(), &[("0xA", &[10])]);
    let bad = dir.path().join("broken_ethereum.json");
    std::fs::write(&bad, "{ not json").unwrap();

    let err = run(&files_run(dir.path(), rewards, vec![bad.clone()])).unwrap_err();
    match err {
        DropError::Snapshot(SnapshotError::Parse { file, .. }) => {
            assert_eq!(file, bad.display().to_string())
        }
        other => panic!("expected parse error, got {other:?}"),
    }
}

#[test]
fn mixed_networks_rejected_outside_aggregate_mode() {
    let dir = tempfile::tempdir().unwrap();
    let rewards = write_rewards_config(dir.path(), &[("0xA", &[10])]);
    let one = ids(1);
    let eth = write_snapshot_pairs(dir.path(), "a_ethereum.json", "ethereum", "0xA", &[("0x1", &as_strs(&one))]);
    let arb = write_snapshot_pairs(dir.path(), "a_arbitrum.json", "arbitrum", "0xA", &[("0x1", &as_strs(&one))]);

    let err = run(&files_run(dir.path(), rewards, vec![eth, arb.clone()])).unwrap_err();
    assert_eq!(
        err,
        DropError::Snapshot(SnapshotError::NetworkMismatch {
            file: arb.display().to_string(),
            expected: "ethereum".into(),
            got: "arbitrum".into(),
        })
    );
}

#[test]
fn length_mismatch_in_config_aborts_before_snapshots() {
    let dir = tempfile::tempdir().unwrap();
    let rewards = dir.path().join("rewards.json");
    std::fs::write(&rewards, r#"{"contracts":{"0xA":[10,1],"0xB":[5]}}"#).unwrap();
    let missing = dir.path().join("missing_ethereum.json");

    let err = run(&files_run(dir.path(), rewards, vec![missing])).unwrap_err();
    assert!(matches!(err, DropError::ConfigValidation(_)));
}

#[test]
fn only_unknown_contracts_is_empty_result() {
    let dir = tempfile::tempdir().unwrap();
    let rewards = write_rewards_config(dir.path(), &[("0xA", &[10])]);
    let one = ids(1);
    let snap = write_snapshot_pairs(dir.path(), "z_ethereum.json", "ethereum", "0xZ", &[("0x1", &as_strs(&one))]);

    let err = run(&files_run(dir.path(), rewards, vec![snap])).unwrap_err();
    assert_eq!(err, DropError::EmptyResult);
}

#[test]
fn zero_cap_is_usage_error() {
    let dir = tempfile::tempdir().unwrap();
    let config = RunConfig {
        token_cap: Some(0),
        ..scenario_a(dir.path())
    };
    let err = run(&config).unwrap_err();
    assert_eq!(err, DropError::InputMode(InputModeError::InvalidCap));
    assert_eq!(err.exit_code(), 2);
}

mod properties {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(16))]

        #[test]
        fn written_total_matches_analytics(counts in prop::collection::vec(1usize..20, 1..12), rate in 1u64..1_000) {
            let dir = tempfile::tempdir().unwrap();
            let rewards = write_rewards_config(dir.path(), &[("0xA", &[rate])]);
            let id_sets: Vec<Vec<String>> = counts.iter().map(|n| ids(*n)).collect();
            let addresses: Vec<String> = (0..counts.len()).map(|i| format!("0x{i:04}")).collect();
            let holder_ids: Vec<Vec<&str>> = id_sets.iter().map(|s| as_strs(s)).collect();
            let holders: Vec<(&str, &[&str])> = addresses
                .iter()
                .zip(holder_ids.iter())
                .map(|(a, ids)| (a.as_str(), ids.as_slice()))
                .collect();
            let snap = write_snapshot_pairs(dir.path(), "a_ethereum.json", "ethereum", "0xA", &holders);

            let report = run(&files_run(dir.path(), rewards, vec![snap])).unwrap();
            let analytics = read_analytics(&report.paths.analytics).unwrap();
            let expected: u128 = counts.iter().map(|n| *n as u128 * rate as u128).sum();
            prop_assert_eq!(analytics.total_tokens_distributed, expected);
            prop_assert_eq!(analytics.total_holders, counts.len());
            prop_assert_eq!(read_distribution_csv(&report.paths.distribution_csv).unwrap().len(), counts.len());
        }
    }
}
