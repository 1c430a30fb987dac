//! Persisted concentrated-liquidity pool record.

use borsh::{BorshDeserialize, BorshSerialize};

use super::{Address, Dec, Tick, TickParams};
use crate::error::AmmError;

/// A concentrated-liquidity pool between a base and a quote denomination.
///
/// Prices are quoted as quote per base.  Selling base for quote moves the
/// price down; selling quote for base moves it up.
///
/// # Invariants
///
/// - `current_sqrt_price > 0` and `current_tick` lies on the tick grid's
///   bracket of that price (see [`crate::math::sqrt_price_to_tick`]), or one
///   tick below it right after a downward crossing.
/// - `current_tick_liquidity >= 0`.
#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct Pool {
    /// Pool identifier.
    pub id: u64,
    /// Base denomination.
    pub denom_base: String,
    /// Quote denomination.
    pub denom_quote: String,
    /// Square root of the current spot price.
    pub current_sqrt_price: Dec,
    /// Tick bracketing the current price.
    pub current_tick: Tick,
    /// Liquidity active at the current price.
    pub current_tick_liquidity: Dec,
    /// Fraction of each input charged as fee, in `[0, 1)`.
    pub fee_rate: Dec,
    /// Tick grid geometry.
    pub tick_params: TickParams,
}

impl Pool {
    /// Account holding the pool's reserves.
    #[must_use]
    pub fn address(&self) -> Address {
        Address::pool(self.id)
    }

    /// Account collecting swap fees for liquidity providers.
    #[must_use]
    pub fn fees_address(&self) -> Address {
        Address::pool_fees(self.id)
    }

    /// Name of the pool's fee accumulator.
    #[must_use]
    pub fn fee_accumulator_name(&self) -> String {
        fee_accumulator_name(self.id)
    }

    /// Returns `true` if `denom` is one of the pool's two denominations.
    #[must_use]
    pub fn has_denom(&self, denom: &str) -> bool {
        denom == self.denom_base || denom == self.denom_quote
    }

    /// Applies the outcome of a swap.
    ///
    /// # Errors
    ///
    /// - [`AmmError::InvalidPrice`] if `sqrt_price` is not positive.
    /// - [`AmmError::Underflow`] if `liquidity` is negative.
    pub fn apply_swap(&mut self, liquidity: Dec, tick: Tick, sqrt_price: Dec) -> crate::error::Result<()> {
        if !sqrt_price.is_positive() {
            return Err(AmmError::InvalidPrice("sqrt price must be positive"));
        }
        if liquidity.is_negative() {
            return Err(AmmError::Underflow("pool liquidity cannot be negative"));
        }
        self.current_tick_liquidity = liquidity;
        self.current_tick = tick;
        self.current_sqrt_price = sqrt_price;
        Ok(())
    }
}

/// Name of the fee accumulator owned by pool `pool_id`.
#[must_use]
pub fn fee_accumulator_name(pool_id: u64) -> String {
    format!("fee/{pool_id}")
}
