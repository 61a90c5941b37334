//! Shared data model: normalized snapshots, holder reward maps, and the
//! processed distribution document.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Reward quantities for one holder, one entry per reward-token type.
pub type RewardVector = Vec<u64>;

/// A token id after wire-shape normalization.
///
/// Only the number of ids per holder affects rewards; the variant records how
/// the id was read so the loader's hex handling stays observable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenId {
    /// A JSON number, kept in its textual form.
    Number(String),
    /// A string id parsed as base-16: lowercase digits, no `0x`, no leading zeros.
    Hex(String),
    /// A list-of-pairs string id that is not base-16, kept verbatim.
    InvalidHex(String),
    /// A string id taken verbatim (object-map wire shape).
    Raw(String),
}

/// One holder's tokens under one contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Holding {
    pub address: String,
    pub token_ids: Vec<TokenId>,
}

impl Holding {
    /// Number of tokens held, the multiplier for the contract's reward vector.
    pub fn token_count(&self) -> u64 {
        self.token_ids.len() as u64
    }
}

/// A point-in-time ownership record for one contract on one network.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    /// File the snapshot was loaded from.
    pub source: PathBuf,
    /// Network declared by the producer (e.g. `"Ethereum"`).
    pub network: String,
    /// Collection contract the holders were read from.
    pub contract_address: String,
    pub name: Option<String>,
    pub block_height: Option<u64>,
    pub chain_id: Option<String>,
    /// Holders in wire order, normalized to ordered pairs.
    pub holders: Vec<Holding>,
}

impl Snapshot {
    /// Total tokens tracked across all holders.
    pub fn token_total(&self) -> u64 {
        self.holders.iter().map(Holding::token_count).sum()
    }

    /// The source path as a display string.
    pub fn source_name(&self) -> String {
        self.source.display().to_string()
    }
}

/// Holder address → reward vector, ordered by address.
///
/// Every vector has length [`num_reward_tokens`](Self::num_reward_tokens).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct HolderRewards {
    num_reward_tokens: usize,
    entries: BTreeMap<String, RewardVector>,
}

impl HolderRewards {
    /// An empty map for vectors of the given length.
    pub fn new(num_reward_tokens: usize) -> Self {
        Self {
            num_reward_tokens,
            entries: BTreeMap::new(),
        }
    }

    pub fn num_reward_tokens(&self) -> usize {
        self.num_reward_tokens
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, address: &str) -> Option<&RewardVector> {
        self.entries.get(address)
    }

    /// Entries in address order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &RewardVector)> {
        self.entries.iter()
    }

    /// `(address, reward[0])` pairs in address order.
    pub fn first_token_amounts(&self) -> Vec<(&str, u64)> {
        self.entries
            .iter()
            .map(|(address, rewards)| (address.as_str(), rewards.first().copied().unwrap_or(0)))
            .collect()
    }

    /// Sum of every holder's vector, per token index.
    pub fn totals(&self) -> RewardVector {
        let mut totals = vec![0u64; self.num_reward_tokens];
        for rewards in self.entries.values() {
            for (total, amount) in totals.iter_mut().zip(rewards) {
                *total = total.saturating_add(*amount);
            }
        }
        totals
    }

    pub(crate) fn entries_mut(&mut self) -> &mut BTreeMap<String, RewardVector> {
        &mut self.entries
    }

    pub fn into_entries(self) -> BTreeMap<String, RewardVector> {
        self.entries
    }
}

impl FromIterator<(String, RewardVector)> for HolderRewards {
    /// Builds a map whose vector length is taken from the first entry.
    /// Later entries for the same address replace earlier ones.
    fn from_iter<I: IntoIterator<Item = (String, RewardVector)>>(iter: I) -> Self {
        let mut map = HolderRewards::default();
        for (address, rewards) in iter {
            if map.entries.is_empty() {
                map.num_reward_tokens = rewards.len();
            }
            map.entries.insert(address, rewards);
        }
        map
    }
}

/// The canonical distribution document consumed by the merkle-drop tool and
/// the claims importer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessedOutput {
    pub name: String,
    pub network: String,
    pub description: String,
    pub claim_contract: String,
    pub entrypoint: String,
    pub snapshot: Vec<(String, RewardVector)>,
}

/// Descriptive fields copied into [`ProcessedOutput`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DropMetadata {
    pub name: String,
    pub network: String,
    pub description: String,
    pub claim_contract: String,
    pub entrypoint: String,
}

impl ProcessedOutput {
    /// Build the document from metadata and the final reward map.
    pub fn new(meta: &DropMetadata, rewards: &HolderRewards) -> Self {
        Self {
            name: meta.name.clone(),
            network: meta.network.clone(),
            description: meta.description.clone(),
            claim_contract: meta.claim_contract.clone(),
            entrypoint: meta.entrypoint.clone(),
            snapshot: rewards
                .iter()
                .map(|(address, reward)| (address.clone(), reward.clone()))
                .collect(),
        }
    }

    /// The `snapshot` field as a reward map.
    pub fn holder_rewards(&self) -> HolderRewards {
        self.snapshot.iter().cloned().collect()
    }
}
