//! Reward-rate table: contract address → reward per token held.
//!
//! File format:
//!
//! ```json
//! { "contracts": { "0xabc...": [10, 2], "0xdef...": [5, 0] } }
//! ```
//!
//! Contract identity is case-insensitive. Every reward vector must have the
//! same length; the first contract in file order fixes it.

use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::error::{ConfigError, ConfigValidationError, DropError};
use crate::types::RewardVector;

#[derive(Deserialize)]
struct RewardsConfigFile {
    contracts: Map<String, Value>,
}

/// Reward vector configured for one contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractRewards {
    /// Address as written in the config file.
    pub address: String,
    pub rewards: RewardVector,
}

/// Validated reward-rate table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewardsConfig {
    num_reward_tokens: usize,
    /// Keyed by lowercased contract address.
    contracts: BTreeMap<String, ContractRewards>,
}

impl RewardsConfig {
    /// Read and validate a rewards config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, DropError> {
        let path = path.as_ref();
        let origin = path.display().to_string();
        let raw = std::fs::read_to_string(path).map_err(|e| ConfigError::Unreadable {
            path: origin.clone(),
            reason: e.to_string(),
        })?;
        Self::from_json_str(&raw, &origin)
    }

    /// Parse and validate config JSON. `origin` names the source in errors.
    pub fn from_json_str(raw: &str, origin: &str) -> Result<Self, DropError> {
        let malformed = |reason: String| ConfigError::Malformed {
            path: origin.to_string(),
            reason,
        };

        let file: RewardsConfigFile =
            serde_json::from_str(raw).map_err(|e| malformed(e.to_string()))?;

        let mut contracts = Vec::with_capacity(file.contracts.len());
        for (address, value) in file.contracts {
            let rewards: RewardVector = serde_json::from_value(value).map_err(|e| {
                malformed(format!("contract {address}: {e}"))
            })?;
            contracts.push((address, rewards));
        }

        Ok(Self::from_contracts(contracts)?)
    }

    /// Validate an in-memory table given in file order.
    pub fn from_contracts(
        contracts: impl IntoIterator<Item = (String, RewardVector)>,
    ) -> Result<Self, ConfigValidationError> {
        let mut expected: Option<usize> = None;
        let mut table = BTreeMap::new();

        for (address, rewards) in contracts {
            if rewards.is_empty() {
                return Err(ConfigValidationError::EmptyRewardVector { contract: address });
            }
            let expected = *expected.get_or_insert(rewards.len());
            if rewards.len() != expected {
                return Err(ConfigValidationError::LengthMismatch {
                    contract: address,
                    expected,
                    got: rewards.len(),
                });
            }

            let key = address.to_lowercase();
            if table.contains_key(&key) {
                return Err(ConfigValidationError::DuplicateContract { contract: address });
            }
            table.insert(key, ContractRewards { address, rewards });
        }

        let num_reward_tokens = expected.ok_or(ConfigValidationError::NoContracts)?;
        Ok(Self {
            num_reward_tokens,
            contracts: table,
        })
    }

    /// Reward vector for a contract, matched case-insensitively.
    pub fn rewards_for(&self, contract: &str) -> Option<&RewardVector> {
        self.contracts
            .get(&contract.to_lowercase())
            .map(|c| &c.rewards)
    }

    /// Length shared by every reward vector.
    pub fn num_reward_tokens(&self) -> usize {
        self.num_reward_tokens
    }

    pub fn len(&self) -> usize {
        self.contracts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contracts.is_empty()
    }

    /// Configured contracts, ordered by lowercased address.
    pub fn contracts(&self) -> impl Iterator<Item = &ContractRewards> {
        self.contracts.values()
    }
}
