//! Outcome of a swap computation and the settlement inputs derived from it.

use core::fmt;

use super::{Address, Coin, Dec, Tick};

/// Realized amounts of a swap computation.
///
/// `amount_in` is rounded up and `amount_out` rounded down from the exact
/// decimal results, so rounding always favours the pool.  `fees` is the
/// exact (fractional) fee total; settlement charges it rounded up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SwapResult {
    /// Input charged, fees included.
    pub amount_in: u128,
    /// Output paid out.
    pub amount_out: u128,
    /// Exact fee total, included in `amount_in`.
    pub fees: Dec,
}

impl SwapResult {
    /// Fee charged at settlement: `fees` rounded up.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::Underflow`](crate::error::AmmError::Underflow) if
    /// `fees` is negative.
    pub fn fee_rounded_up(&self) -> crate::error::Result<u128> {
        self.fees.ceil_u128()
    }
}

impl fmt::Display for SwapResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "SwapResult(in={}, out={}, fees={})",
            self.amount_in, self.amount_out, self.fees
        )
    }
}

/// New pool state produced by a swap computation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolUpdates {
    /// Tick after the swap.
    pub new_current_tick: Tick,
    /// Active liquidity after the swap.
    pub new_liquidity: Dec,
    /// Sqrt price after the swap.
    pub new_sqrt_price: Dec,
}

/// Who swaps what for what.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwapDetails {
    /// Trader account.
    pub sender: Address,
    /// Tokens paid by the trader, fees included.
    pub token_in: Coin,
    /// Tokens received by the trader.
    pub token_out: Coin,
}
