//! Incentive gauge record.

use borsh::{BorshDeserialize, BorshSerialize};

use super::{Address, DecCoins};

/// A named reward stream shared by its stakers pro rata.
///
/// Rewards are escrowed at [`Gauge::address`] and tracked by the
/// accumulator named [`Gauge::accumulator_name`], with one accumulator
/// position per staker.
#[derive(Debug, Clone, Default, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct Gauge {
    /// Gauge name, unique within the store.
    pub name: String,
    /// Everything distributed so far, at face value.
    pub total_distributed: DecCoins,
}

impl Gauge {
    /// A gauge that has distributed nothing.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            total_distributed: DecCoins::new(),
        }
    }

    /// Escrow account holding undistributed and unclaimed rewards.
    #[must_use]
    pub fn address(&self) -> Address {
        Address::gauge(&self.name)
    }

    /// Name of the accumulator tracking this gauge.
    #[must_use]
    pub fn accumulator_name(&self) -> String {
        gauge_accumulator_name(&self.name)
    }
}

/// Name of the accumulator backing gauge `name`.
#[must_use]
pub fn gauge_accumulator_name(name: &str) -> String {
    format!("incentive/{name}")
}
