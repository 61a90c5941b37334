//! Distribution statistics over the final reward map.
//!
//! Only the first reward-token index is summarized. Multi-token drops get
//! statistics for token 0 alone.

use serde::{Deserialize, Serialize};

use crate::types::HolderRewards;

/// Maximum sample addresses kept per bucket.
pub const BUCKET_SAMPLE_SIZE: usize = 10;

/// Number of entries in [`AnalyticsSummary::top_holders`].
pub const TOP_HOLDER_COUNT: usize = 20;

/// Fixed inclusive amount ranges: `(label, min, max)`; `None` is open-ended.
pub const BUCKET_RANGES: [(&str, u64, Option<u64>); 9] = [
    ("1-5", 1, Some(5)),
    ("6-10", 6, Some(10)),
    ("11-20", 11, Some(20)),
    ("21-50", 21, Some(50)),
    ("51-100", 51, Some(100)),
    ("101-200", 101, Some(200)),
    ("201-500", 201, Some(500)),
    ("501-1000", 501, Some(1000)),
    ("1001+", 1001, None),
];

/// Nearest-rank percentiles over the ascending amounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Percentiles {
    pub p10: u64,
    pub p25: u64,
    pub p50: u64,
    pub p75: u64,
    pub p90: u64,
    pub p95: u64,
    pub p99: u64,
}

/// Holders whose amount falls in one fixed range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DistributionBucket {
    pub range: String,
    pub min: u64,
    /// `null` for the open-ended top bucket.
    pub max: Option<u64>,
    pub count: usize,
    pub total_tokens: u128,
    /// Up to [`BUCKET_SAMPLE_SIZE`] members, in address order.
    pub addresses: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopHolder {
    pub address: String,
    pub amount: u64,
}

/// Summary written to the analytics artifact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsSummary {
    pub total_holders: usize,
    pub total_tokens_distributed: u128,
    pub average_tokens_per_holder: f64,
    pub median_tokens_per_holder: f64,
    /// Population standard deviation (divisor = holder count).
    pub standard_deviation: f64,
    pub min: u64,
    pub max: u64,
    pub percentiles: Percentiles,
    pub distribution_buckets: Vec<DistributionBucket>,
    pub top_holders: Vec<TopHolder>,
}

impl AnalyticsSummary {
    /// Summarize the first-token amounts of `rewards`.
    pub fn from_rewards(rewards: &HolderRewards) -> Self {
        analyze(&rewards.first_token_amounts())
    }
}

/// Summarize `(address, amount)` pairs given in encounter order.
///
/// An empty input yields an all-zero summary.
pub fn analyze(holders: &[(&str, u64)]) -> AnalyticsSummary {
    let count = holders.len();
    let mut sorted: Vec<u64> = holders.iter().map(|(_, amount)| *amount).collect();
    sorted.sort_unstable();

    let total: u128 = sorted.iter().map(|a| *a as u128).sum();
    let mean = if count == 0 { 0.0 } else { total as f64 / count as f64 };

    AnalyticsSummary {
        total_holders: count,
        total_tokens_distributed: total,
        average_tokens_per_holder: mean,
        median_tokens_per_holder: median(&sorted),
        standard_deviation: population_std_dev(&sorted, mean),
        min: sorted.first().copied().unwrap_or(0),
        max: sorted.last().copied().unwrap_or(0),
        percentiles: percentiles(&sorted),
        distribution_buckets: buckets(holders),
        top_holders: top_holders(holders, TOP_HOLDER_COUNT),
    }
}

/// Middle value, or the mean of the two middle values for even counts.
pub fn median(sorted: &[u64]) -> f64 {
    let n = sorted.len();
    match n {
        0 => 0.0,
        _ if n % 2 == 0 => (sorted[n / 2 - 1] as f64 + sorted[n / 2] as f64) / 2.0,
        _ => sorted[n / 2] as f64,
    }
}

fn population_std_dev(values: &[u64], mean: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let variance = values
        .iter()
        .map(|v| {
            let d = *v as f64 - mean;
            d * d
        })
        .sum::<f64>()
        / values.len() as f64;
    variance.sqrt()
}

/// Zero-based nearest rank: `sorted[floor(p / 100 * (n - 1))]`.
pub fn percentile(sorted: &[u64], p: u64) -> u64 {
    if sorted.is_empty() {
        return 0;
    }
    let index = (p as usize * (sorted.len() - 1)) / 100;
    sorted[index.min(sorted.len() - 1)]
}

fn percentiles(sorted: &[u64]) -> Percentiles {
    Percentiles {
        p10: percentile(sorted, 10),
        p25: percentile(sorted, 25),
        p50: percentile(sorted, 50),
        p75: percentile(sorted, 75),
        p90: percentile(sorted, 90),
        p95: percentile(sorted, 95),
        p99: percentile(sorted, 99),
    }
}

fn bucket_index(amount: u64) -> Option<usize> {
    BUCKET_RANGES
        .iter()
        .position(|(_, min, max)| amount >= *min && max.is_none_or(|max| amount <= max))
}

/// Non-empty fixed-range buckets, in range order.
pub fn buckets(holders: &[(&str, u64)]) -> Vec<DistributionBucket> {
    let mut all: Vec<DistributionBucket> = BUCKET_RANGES
        .iter()
        .map(|(label, min, max)| DistributionBucket {
            range: (*label).to_string(),
            min: *min,
            max: *max,
            count: 0,
            total_tokens: 0,
            addresses: Vec::new(),
        })
        .collect();

    for (address, amount) in holders {
        let Some(i) = bucket_index(*amount) else {
            continue;
        };
        let bucket = &mut all[i];
        bucket.count += 1;
        bucket.total_tokens += *amount as u128;
        if bucket.addresses.len() < BUCKET_SAMPLE_SIZE {
            bucket.addresses.push((*address).to_string());
        }
    }

    all.retain(|b| b.count > 0);
    all
}

/// The `limit` largest amounts, descending. Ties keep input order.
pub fn top_holders(holders: &[(&str, u64)], limit: usize) -> Vec<TopHolder> {
    let mut ranked: Vec<&(&str, u64)> = holders.iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1));
    ranked
        .into_iter()
        .take(limit)
        .map(|(address, amount)| TopHolder {
            address: (*address).to_string(),
            amount: *amount,
        })
        .collect()
}

/// Gini coefficient from the Lorenz curve of the ascending amounts.
///
/// The curve runs through one point per holder, `(i / n, cumulative share)`
/// in percent, starting at the first holder rather than the origin; its area
/// is summed by trapezoids. With that curve `n` equal holders score `1 / n²`
/// and a single holder scores 1.
pub fn gini_coefficient(amounts: &[u64]) -> f64 {
    let mut sorted = amounts.to_vec();
    sorted.sort_unstable();
    let total: u128 = sorted.iter().map(|a| *a as u128).sum();
    if sorted.is_empty() || total == 0 {
        return 0.0;
    }

    let n = sorted.len() as f64;
    let mut cumulative: u128 = 0;
    let points: Vec<(f64, f64)> = sorted
        .iter()
        .enumerate()
        .map(|(i, amount)| {
            cumulative += *amount as u128;
            (
                (i + 1) as f64 / n * 100.0,
                cumulative as f64 / total as f64 * 100.0,
            )
        })
        .collect();

    let area: f64 = points
        .windows(2)
        .map(|w| (w[1].0 - w[0].0) * (w[0].1 + w[1].1) / 2.0)
        .sum();

    const EQUALITY_AREA: f64 = 5000.0;
    (EQUALITY_AREA - area) / EQUALITY_AREA
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn two_holder_summary() {
        let s = analyze(&[("0x1", 15), ("0x2", 10)]);
        assert_eq!(s.total_holders, 2);
        assert_eq!(s.total_tokens_distributed, 25);
        assert!(approx(s.average_tokens_per_holder, 12.5));
        assert!(approx(s.median_tokens_per_holder, 12.5));
        assert!(approx(s.standard_deviation, 2.5));
        assert_eq!(s.min, 10);
        assert_eq!(s.max, 15);
    }

    #[test]
    fn median_odd_and_even() {
        assert!(approx(median(&[1, 2, 9]), 2.0));
        assert!(approx(median(&[1, 2, 4, 9]), 3.0));
        assert!(approx(median(&[]), 0.0));
    }

    #[test]
    fn std_dev_uses_population_divisor() {
        // Sample std dev would be ~2.138; population is exactly 2.
        let s = analyze(&[
            ("a", 2),
            ("b", 4),
            ("c", 4),
            ("d", 4),
            ("e", 5),
            ("f", 5),
            ("g", 7),
            ("h", 9),
        ]);
        assert!(approx(s.standard_deviation, 2.0));
    }

    #[test]
    fn percentiles_use_floor_index() {
        let sorted: Vec<u64> = (1..=10).collect();
        // floor(0.1 * 9) = 0, floor(0.25 * 9) = 2, floor(0.5 * 9) = 4,
        // floor(0.75 * 9) = 6, floor(0.9 * 9) = 8, floor(0.95 * 9) = 8, floor(0.99 * 9) = 8
        let p = percentiles(&sorted);
        assert_eq!(
            p,
            Percentiles {
                p10: 1,
                p25: 3,
                p50: 5,
                p75: 7,
                p90: 9,
                p95: 9,
                p99: 9,
            }
        );
    }

    #[test]
    fn percentile_single_value() {
        assert_eq!(percentile(&[42], 99), 42);
        assert_eq!(percentile(&[], 50), 0);
    }

    #[test]
    fn bucket_boundaries_are_inclusive() {
        let holders = [
            ("a", 1),
            ("b", 5),
            ("c", 6),
            ("d", 10),
            ("e", 1000),
            ("f", 1001),
            ("g", 50_000),
        ];
        let b = buckets(&holders);
        let summary: Vec<(&str, usize)> = b.iter().map(|b| (b.range.as_str(), b.count)).collect();
        assert_eq!(
            summary,
            vec![("1-5", 2), ("6-10", 2), ("501-1000", 1), ("1001+", 2)]
        );
        assert_eq!(b[3].max, None);
        assert_eq!(b[3].total_tokens, 51_001);
    }

    #[test]
    fn bucket_samples_capped_in_encounter_order() {
        let names: Vec<String> = (0..15).map(|i| format!("0x{i:02}")).collect();
        let holders: Vec<(&str, u64)> = names.iter().map(|n| (n.as_str(), 3)).collect();
        let b = buckets(&holders);
        assert_eq!(b.len(), 1);
        assert_eq!(b[0].count, 15);
        assert_eq!(b[0].addresses.len(), BUCKET_SAMPLE_SIZE);
        assert_eq!(b[0].addresses[0], "0x00");
        assert_eq!(b[0].addresses[9], "0x09");
    }

    #[test]
    fn bucket_json_uses_camel_case_and_null_max() {
        let b = buckets(&[("0x1", 5000)]);
        let v = serde_json::to_value(&b[0]).unwrap();
        assert_eq!(v["range"], "1001+");
        assert_eq!(v["totalTokens"], 5000);
        assert!(v["max"].is_null());
    }

    #[test]
    fn top_holders_descending_with_stable_ties() {
        let holders = [("0x1", 5), ("0x2", 9), ("0x3", 5), ("0x4", 1)];
        let top = top_holders(&holders, 3);
        let got: Vec<(&str, u64)> = top.iter().map(|t| (t.address.as_str(), t.amount)).collect();
        assert_eq!(got, vec![("0x2", 9), ("0x1", 5), ("0x3", 5)]);
    }

    #[test]
    fn top_holders_limited_to_twenty() {
        let names: Vec<String> = (0..30).map(|i| format!("0x{i}")).collect();
        let holders: Vec<(&str, u64)> = names
            .iter()
            .enumerate()
            .map(|(i, n)| (n.as_str(), i as u64 + 1))
            .collect();
        let s = analyze(&holders);
        assert_eq!(s.top_holders.len(), TOP_HOLDER_COUNT);
        assert_eq!(s.top_holders[0].amount, 30);
        assert_eq!(s.top_holders[19].amount, 11);
    }

    #[test]
    fn empty_input_yields_zero_summary() {
        let s = analyze(&[]);
        assert_eq!(s.total_holders, 0);
        assert_eq!(s.total_tokens_distributed, 0);
        assert!(approx(s.average_tokens_per_holder, 0.0));
        assert!(s.distribution_buckets.is_empty());
        assert!(s.top_holders.is_empty());
    }

    #[test]
    fn summary_json_field_names() {
        let s = analyze(&[("0x1", 3)]);
        let v = serde_json::to_value(&s).unwrap();
        for key in [
            "totalHolders",
            "totalTokensDistributed",
            "averageTokensPerHolder",
            "medianTokensPerHolder",
            "standardDeviation",
            "min",
            "max",
            "percentiles",
            "distributionBuckets",
            "topHolders",
        ] {
            assert!(v.get(key).is_some(), "missing {key}");
        }
        assert_eq!(v["percentiles"]["p99"], 3);
    }

    #[test]
    fn from_rewards_reads_first_index() {
        let map: HolderRewards = vec![
            ("0x1".to_string(), vec![4, 1_000]),
            ("0x2".to_string(), vec![6, 1_000]),
        ]
        .into_iter()
        .collect();
        let s = AnalyticsSummary::from_rewards(&map);
        assert_eq!(s.total_tokens_distributed, 10);
        assert_eq!(s.max, 6);
    }

    #[test]
    fn gini_equal_distribution_is_one_over_n_squared() {
        assert!(approx(gini_coefficient(&[5, 5]), 0.25));
        assert!(approx(gini_coefficient(&[5, 5, 5, 5]), 0.0625));
        assert!(approx(gini_coefficient(&[]), 0.0));
        assert!(approx(gini_coefficient(&[0, 0]), 0.0));
    }

    #[test]
    fn gini_two_unequal_holders() {
        // Points (50, 25) and (100, 100): area = 50 * 125 / 2 = 3125.
        assert!(approx(gini_coefficient(&[3, 1]), 0.375));
    }

    #[test]
    fn gini_single_holder_is_one() {
        assert!(approx(gini_coefficient(&[42]), 1.0));
    }

    #[test]
    fn gini_concentrated_distribution() {
        // One of four holders has everything: only the last segment has area,
        // 25 * 100 / 2 = 1250.
        let g = gini_coefficient(&[0, 0, 0, 100]);
        assert!(approx(g, 0.75), "gini = {g}");
    }

    proptest! {
        #[test]
        fn bucket_counts_cover_all_positive_holders(
            amounts in prop::collection::vec(1u64..5_000, 0..200),
        ) {
            let names: Vec<String> = (0..amounts.len()).map(|i| format!("0x{i}")).collect();
            let holders: Vec<(&str, u64)> = names
                .iter()
                .zip(&amounts)
                .map(|(n, a)| (n.as_str(), *a))
                .collect();
            let s = analyze(&holders);
            let covered: usize = s.distribution_buckets.iter().map(|b| b.count).sum();
            prop_assert_eq!(covered, s.total_holders);
            let tokens: u128 = s.distribution_buckets.iter().map(|b| b.total_tokens).sum();
            prop_assert_eq!(tokens, s.total_tokens_distributed);
        }

        #[test]
        fn percentiles_are_monotonic(
            amounts in prop::collection::vec(1u64..1_000_000, 1..200),
        ) {
            let mut sorted = amounts.clone();
            sorted.sort_unstable();
            let p = percentiles(&sorted);
            let ordered = [p.p10, p.p25, p.p50, p.p75, p.p90, p.p95, p.p99];
            prop_assert!(ordered.windows(2).all(|w| w[0] <= w[1]));
            prop_assert!(p.p10 >= sorted[0]);
            prop_assert!(p.p99 <= *sorted.last().unwrap());
        }

        #[test]
        fn gini_in_unit_range(amounts in prop::collection::vec(0u64..10_000, 1..100)) {
            let g = gini_coefficient(&amounts);
            prop_assert!((-1e-9..=1.0).contains(&g), "gini out of range: {}", g);
        }
    }
}
