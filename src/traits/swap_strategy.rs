//! Direction-polymorphic swap math.
//!
//! A swap either sells base for quote (price moves down, ticks are visited
//! in descending order) or quote for base (price moves up, ticks ascend).
//! [`SwapStrategy`] captures everything that differs between the two so the
//! swap loop in [`crate::swap`] is written once.
//!
//! # Bucket contract
//!
//! Both `compute_swap_within_bucket_*` methods move the price from
//! `current` toward `target` against constant `liquidity` and:
//!
//! - never move past `target`;
//! - stop short of `target` only when the remaining amount is used up;
//! - charge the fee on `amount_in` at the pool fee rate, rounded in the
//!   pool's favour;
//! - round amounts the trader pays up and amounts the trader receives down.

use crate::domain::{Dec, Tick};
use crate::error::AmmError;
use crate::strategy::TickIterator;
use crate::traits::KvStore;

/// Result of swapping within one liquidity bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BucketSwap {
    /// Sqrt price reached.
    pub sqrt_price_next: Dec,
    /// Input consumed, fee excluded.
    pub amount_in: Dec,
    /// Output produced.
    pub amount_out: Dec,
    /// Fee charged on top of `amount_in`.
    pub fee_charge: Dec,
}

impl BucketSwap {
    /// A bucket that consumed nothing and stayed at `sqrt_price`.
    pub const fn idle(sqrt_price: Dec) -> Self {
        Self {
            sqrt_price_next: sqrt_price,
            amount_in: Dec::ZERO,
            amount_out: Dec::ZERO,
            fee_charge: Dec::ZERO,
        }
    }
}

/// Direction-specific behaviour of the swap loop.
pub trait SwapStrategy {
    /// `true` when selling base for quote.
    fn is_base_for_quote(&self) -> bool;

    /// Sqrt price the loop must not cross.
    fn sqrt_price_limit(&self) -> Dec;

    /// The nearer of the next tick's sqrt price and the limit.
    fn sqrt_target_price(&self, next_tick_sqrt_price: Dec) -> Dec;

    /// Exact-input bucket: `amount_remaining_in` includes fees.
    ///
    /// # Errors
    ///
    /// Arithmetic failures.
    fn compute_swap_within_bucket_out_given_in(
        &self,
        current: Dec,
        target: Dec,
        liquidity: Dec,
        amount_remaining_in: Dec,
    ) -> Result<BucketSwap, AmmError>;

    /// Exact-output bucket.
    ///
    /// # Errors
    ///
    /// Arithmetic failures.
    fn compute_swap_within_bucket_in_given_out(
        &self,
        current: Dec,
        target: Dec,
        liquidity: Dec,
        amount_remaining_out: Dec,
    ) -> Result<BucketSwap, AmmError>;

    /// Initialized ticks of `pool_id` beyond `current_tick`, in the
    /// direction of travel.
    ///
    /// # Errors
    ///
    /// Store failures.
    fn next_tick_iterator(
        &self,
        store: &dyn KvStore,
        pool_id: u64,
        current_tick: Tick,
    ) -> Result<TickIterator, AmmError>;

    /// Sign to apply to a tick's `liquidity_net` when crossing it.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::Overflow`] if negation overflows.
    fn set_liquidity_delta_sign(&self, liquidity_net: Dec) -> Result<Dec, AmmError>;

    /// Current tick after crossing `tick`.
    fn next_tick_after_crossing(&self, tick: Tick) -> Tick;

    /// Checks that `sqrt_price_limit` lies in the direction of travel from
    /// `current`.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::InvalidPriceLimit`] otherwise.
    fn validate_sqrt_price(&self, sqrt_price_limit: Dec, current: Dec) -> Result<(), AmmError>;
}
