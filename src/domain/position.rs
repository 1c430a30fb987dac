//! Concentrated liquidity position.

use borsh::{BorshDeserialize, BorshSerialize};

use super::{Address, Dec, Tick};
use crate::error::AmmError;

/// A liquidity provider's stake over the price range `[lower_tick, upper_tick)`.
///
/// The position is active (its liquidity counts towards the pool's current
/// liquidity) while `lower_tick <= current_tick < upper_tick`.
///
/// # Invariants
///
/// - `lower_tick < upper_tick`.
/// - `liquidity > 0` for every stored position.
///
/// # Examples
///
/// ```
/// use clmm_engine::domain::{Address, Dec, LiquidityPosition, Tick};
///
/// let lower = Tick::new(-100).unwrap_or(Tick::ZERO);
/// let upper = Tick::new(100).unwrap_or(Tick::ZERO);
/// let pos = LiquidityPosition::new(1, 1, Address::new("alice"), lower, upper, Dec::ONE);
/// assert!(pos.is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct LiquidityPosition {
    /// Position identifier.
    pub id: u64,
    /// Pool the liquidity is deposited in.
    pub pool_id: u64,
    /// Account allowed to withdraw and collect.
    pub owner: Address,
    /// Inclusive lower bound.
    pub lower_tick: Tick,
    /// Exclusive upper bound.
    pub upper_tick: Tick,
    /// Liquidity provided over the range.
    pub liquidity: Dec,
}

impl LiquidityPosition {
    /// Creates a position with validated range and liquidity.
    ///
    /// # Errors
    ///
    /// - [`AmmError::InvalidTickRange`] if `lower_tick >= upper_tick`.
    /// - [`AmmError::InvalidQuantity`] if `liquidity` is not positive.
    pub fn new(
        id: u64,
        pool_id: u64,
        owner: Address,
        lower_tick: Tick,
        upper_tick: Tick,
        liquidity: Dec,
    ) -> crate::error::Result<Self> {
        if lower_tick >= upper_tick {
            return Err(AmmError::InvalidTickRange(
                "lower tick must be less than upper tick",
            ));
        }
        if !liquidity.is_positive() {
            return Err(AmmError::InvalidQuantity("liquidity must be positive"));
        }
        Ok(Self {
            id,
            pool_id,
            owner,
            lower_tick,
            upper_tick,
            liquidity,
        })
    }

    /// Returns `true` if `current_tick` lies within `[lower, upper)`.
    #[must_use]
    pub fn is_in_range(&self, current_tick: Tick) -> bool {
        self.lower_tick <= current_tick && current_tick < self.upper_tick
    }

    /// Name of this position inside the pool's fee accumulator.
    #[must_use]
    pub fn accumulator_position_name(&self) -> String {
        position_accumulator_name(self.id)
    }
}

/// Name of liquidity position `id` inside its pool's fee accumulator.
#[must_use]
pub fn position_accumulator_name(id: u64) -> String {
    format!("position/{id}")
}
