//! Transient state of one swap computation.

use crate::domain::{Dec, Pool, Rounding, Tick};
use crate::error::Result;

/// Which side of the swap the caller fixed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SwapKind {
    /// The input amount is fixed; the output is computed.
    ExactIn,
    /// The output amount is fixed; the input is computed.
    ExactOut,
}

/// Running totals of the swap loop.
///
/// `amount_specified_remaining` counts down the fixed side (input including
/// fees for [`SwapKind::ExactIn`], output for [`SwapKind::ExactOut`]);
/// `amount_calculated` accumulates the other side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwapState {
    /// Part of the fixed amount not yet swapped.
    pub amount_specified_remaining: Dec,
    /// Computed amount so far.
    pub amount_calculated: Dec,
    /// Current sqrt price.
    pub sqrt_price: Dec,
    /// Current tick.
    pub tick: Tick,
    /// Liquidity active at the current price.
    pub liquidity: Dec,
    /// Fees charged so far.
    pub fee_total: Dec,
    /// Fees charged so far per unit of the liquidity that earned them.
    pub fee_growth_per_unit_liquidity: Dec,
}

impl SwapState {
    /// Starts at the pool's current price with `specified` left to swap.
    #[must_use]
    pub fn new(specified: Dec, pool: &Pool) -> Self {
        Self {
            amount_specified_remaining: specified,
            amount_calculated: Dec::ZERO,
            sqrt_price: pool.current_sqrt_price,
            tick: pool.current_tick,
            liquidity: pool.current_tick_liquidity,
            fee_total: Dec::ZERO,
            fee_growth_per_unit_liquidity: Dec::ZERO,
        }
    }

    /// Books a bucket's fee.
    ///
    /// The per-liquidity growth is `fee / liquidity` rounded down, so the
    /// liquidity providers can never be credited more than was charged.  A
    /// bucket without liquidity adds to the total only.
    ///
    /// # Errors
    ///
    /// Arithmetic overflow.
    pub fn record_fee(&mut self, fee_charge: Dec) -> Result<()> {
        self.fee_total = self.fee_total.checked_add(&fee_charge)?;
        if self.liquidity.is_zero() {
            return Ok(());
        }
        let growth = fee_charge.checked_div(&self.liquidity, Rounding::Down)?;
        self.fee_growth_per_unit_liquidity = self.fee_growth_per_unit_liquidity.checked_add(&growth)?;
        Ok(())
    }

    /// Books a bucket's amounts against the running totals.
    ///
    /// # Errors
    ///
    /// Arithmetic overflow or underflow.
    pub fn record_amounts(&mut self, kind: SwapKind, amount_in: Dec, amount_out: Dec, fee_charge: Dec) -> Result<()> {
        let paid = amount_in.checked_add(&fee_charge)?;
        let (consumed, produced) = match kind {
            SwapKind::ExactIn => (paid, amount_out),
            SwapKind::ExactOut => (amount_out, paid),
        };
        self.amount_specified_remaining = self.amount_specified_remaining.checked_sub(&consumed)?;
        self.amount_calculated = self.amount_calculated.checked_add(&produced)?;
        Ok(())
    }
}
