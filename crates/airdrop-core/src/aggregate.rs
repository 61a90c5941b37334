//! Reward aggregation across snapshots.
//!
//! Each snapshot whose contract has a configured reward vector contributes
//! `token_count * rate[i]` to every holder it lists. Contributions are folded
//! into one map, so a wallet seen under several contracts or networks
//! receives the sum. Holders whose final vector is all zero are dropped.

use tracing::{debug, warn};

use crate::config::RewardsConfig;
use crate::error::DropError;
use crate::types::{HolderRewards, RewardVector, Snapshot};

/// Outcome of folding every snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Aggregation {
    /// Holders with a strictly positive reward vector.
    pub rewards: HolderRewards,
    /// Snapshots whose contract had a reward vector.
    pub snapshots_applied: usize,
    /// Source files of snapshots skipped for lack of a reward vector.
    pub snapshots_skipped: Vec<String>,
    /// Holders removed because their aggregate vector was all zero.
    pub zero_holders_dropped: usize,
}

fn checked_accumulate(
    target: &mut RewardVector,
    address: &str,
    amounts: impl IntoIterator<Item = u64>,
) -> Result<(), DropError> {
    for (index, (slot, amount)) in target.iter_mut().zip(amounts).enumerate() {
        *slot = slot
            .checked_add(amount)
            .ok_or_else(|| DropError::RewardOverflow {
                address: address.to_string(),
                index,
            })?;
    }
    Ok(())
}

/// Rewards one snapshot contributes under the given reward vector.
///
/// Holders with no tokens contribute nothing. An address listed twice in
/// the same snapshot accumulates both entries.
pub fn contribution(snapshot: &Snapshot, rates: &RewardVector) -> Result<HolderRewards, DropError> {
    let mut out = HolderRewards::new(rates.len());
    let entries = out.entries_mut();

    for holding in &snapshot.holders {
        let count = holding.token_count();
        if count == 0 {
            continue;
        }

        let mut amounts = Vec::with_capacity(rates.len());
        for (index, rate) in rates.iter().enumerate() {
            let amount = count
                .checked_mul(*rate)
                .ok_or_else(|| DropError::RewardOverflow {
                    address: holding.address.clone(),
                    index,
                })?;
            amounts.push(amount);
        }

        let slot = entries
            .entry(holding.address.clone())
            .or_insert_with(|| vec![0; rates.len()]);
        checked_accumulate(slot, &holding.address, amounts)?;
    }

    Ok(out)
}

/// Add `other` into `acc`. Both maps must share a vector length.
pub fn merge(mut acc: HolderRewards, other: HolderRewards) -> Result<HolderRewards, DropError> {
    let width = acc.num_reward_tokens();
    let entries = acc.entries_mut();
    for (address, amounts) in other.into_entries() {
        let slot = entries
            .entry(address.clone())
            .or_insert_with(|| vec![0; width]);
        checked_accumulate(slot, &address, amounts)?;
    }
    Ok(acc)
}

/// Fold every snapshot into one holder → reward map.
///
/// Snapshots whose contract is missing from `config` are skipped with a
/// warning rather than failing the run.
pub fn aggregate(snapshots: &[Snapshot], config: &RewardsConfig) -> Result<Aggregation, DropError> {
    let mut rewards = HolderRewards::new(config.num_reward_tokens());
    let mut snapshots_applied = 0;
    let mut snapshots_skipped = Vec::new();

    for snapshot in snapshots {
        let Some(rates) = config.rewards_for(&snapshot.contract_address) else {
            warn!(
                file = %snapshot.source.display(),
                contract = %snapshot.contract_address,
                "no reward rate configured for contract; skipping snapshot"
            );
            snapshots_skipped.push(snapshot.source_name());
            continue;
        };

        let part = contribution(snapshot, rates)?;
        debug!(
            file = %snapshot.source.display(),
            network = %snapshot.network,
            holders = part.len(),
            "applied snapshot"
        );
        rewards = merge(rewards, part)?;
        snapshots_applied += 1;
    }

    let before = rewards.len();
    rewards
        .entries_mut()
        .retain(|_, amounts| amounts.iter().any(|a| *a > 0));
    let zero_holders_dropped = before - rewards.len();

    Ok(Aggregation {
        rewards,
        snapshots_applied,
        snapshots_skipped,
        zero_holders_dropped,
    })
}
