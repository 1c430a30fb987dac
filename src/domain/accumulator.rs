//! Accumulator records: the global value and per-position checkpoints.

use borsh::{BorshDeserialize, BorshSerialize};

use super::{Dec, DecCoins};

/// A named reward accumulator.
///
/// `accum_value` is the cumulative reward per share since creation.  It only
/// grows: every deposit of rewards adds `amount / total_shares` (or whatever
/// per-share value the owner computes) to it.
#[derive(Debug, Clone, Default, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct AccumulatorObject {
    /// Accumulator name, unique within the store.
    pub name: String,
    /// Cumulative reward per share.
    pub accum_value: DecCoins,
    /// Sum of the shares of all live positions.
    pub total_shares: Dec,
}

impl AccumulatorObject {
    /// A fresh accumulator with zero value and no shares.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            accum_value: DecCoins::new(),
            total_shares: Dec::ZERO,
        }
    }
}

/// A position's checkpoint within an accumulator.
///
/// Rewards owed at any time are
/// `unclaimed_rewards_total + (accum_value - accum_value_per_share) × num_shares`.
#[derive(Debug, Clone, Default, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct AccumRecord {
    /// Shares held, never negative.
    pub num_shares: Dec,
    /// Accumulator value at the last settlement.
    pub accum_value_per_share: DecCoins,
    /// Rewards accrued but not yet claimed.
    pub unclaimed_rewards_total: DecCoins,
}
