//! Per-holder payout cap.
//!
//! The cap applies to each reward-token index independently, never to the
//! sum of a holder's vector.

use crate::error::InputModeError;
use crate::types::HolderRewards;

/// A strictly positive per-token ceiling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenCap(u64);

impl TokenCap {
    pub fn new(cap: u64) -> Result<Self, InputModeError> {
        if cap == 0 {
            return Err(InputModeError::InvalidCap);
        }
        Ok(Self(cap))
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

/// What the cap changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CapReport {
    /// Holders with at least one clamped index.
    pub holders_capped: usize,
    /// Sum removed across all holders and indices.
    pub amount_removed: u64,
}

/// Clamp every `reward[i]` to `cap`. `None` passes the map through unchanged.
pub fn apply_cap(rewards: HolderRewards, cap: Option<TokenCap>) -> (HolderRewards, CapReport) {
    let Some(cap) = cap else {
        return (rewards, CapReport::default());
    };
    let ceiling = cap.get();

    let mut report = CapReport::default();
    let mut rewards = rewards;
    for amounts in rewards.entries_mut().values_mut() {
        let mut clamped = false;
        for amount in amounts.iter_mut() {
            if *amount > ceiling {
                report.amount_removed = report.amount_removed.saturating_add(*amount - ceiling);
                *amount = ceiling;
                clamped = true;
            }
        }
        if clamped {
            report.holders_capped += 1;
        }
    }
    (rewards, report)
}
