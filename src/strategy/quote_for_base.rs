//! Selling quote for base: the price moves up.

use super::{amount_less_fee, fee_on_amount_in, finish_exact_in, TickIterator};
use crate::domain::{Dec, Rounding, Tick};
use crate::error::AmmError;
use crate::math::{
    base_amount_delta, next_sqrt_price_from_base_out, next_sqrt_price_from_quote_in,
    quote_amount_delta,
};
use crate::store::keys;
use crate::traits::{BucketSwap, KvStore, Order, StoreIterator, SwapStrategy};

/// Strategy for swaps that pay quote and receive base.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuoteForBase {
    sqrt_price_limit: Dec,
    fee_rate: Dec,
}

impl QuoteForBase {
    /// Strategy bounded above by `sqrt_price_limit`.
    pub const fn new(sqrt_price_limit: Dec, fee_rate: Dec) -> Self {
        Self {
            sqrt_price_limit,
            fee_rate,
        }
    }
}

impl SwapStrategy for QuoteForBase {
    fn is_base_for_quote(&self) -> bool {
        false
    }

    fn sqrt_price_limit(&self) -> Dec {
        self.sqrt_price_limit
    }

    fn sqrt_target_price(&self, next_tick_sqrt_price: Dec) -> Dec {
        next_tick_sqrt_price.min(self.sqrt_price_limit)
    }

    fn compute_swap_within_bucket_out_given_in(
        &self,
        current: Dec,
        target: Dec,
        liquidity: Dec,
        amount_remaining_in: Dec,
    ) -> Result<BucketSwap, AmmError> {
        let target = target.max(current);
        if liquidity.is_zero() {
            return Ok(BucketSwap::idle(target));
        }
        let usable = amount_less_fee(amount_remaining_in, self.fee_rate)?;
        let max_in = quote_amount_delta(current, target, liquidity, Rounding::Up)?;
        let next = if usable >= max_in {
            target
        } else {
            next_sqrt_price_from_quote_in(current, liquidity, usable)?.min(target)
        };
        let reached = next == target;
        let amount_in = if reached {
            max_in
        } else {
            quote_amount_delta(current, next, liquidity, Rounding::Up)?
        };
        let amount_out = base_amount_delta(current, next, liquidity, Rounding::Down)?;
        let (amount_in, fee_charge) = finish_exact_in(
            reached,
            next != current,
            amount_in,
            amount_remaining_in,
            self.fee_rate,
        )?;
        Ok(BucketSwap {
            sqrt_price_next: next,
            amount_in,
            amount_out,
            fee_charge,
        })
    }

    fn compute_swap_within_bucket_in_given_out(
        &self,
        current: Dec,
        target: Dec,
        liquidity: Dec,
        amount_remaining_out: Dec,
    ) -> Result<BucketSwap, AmmError> {
        let target = target.max(current);
        if liquidity.is_zero() {
            return Ok(BucketSwap::idle(target));
        }
        let max_out = base_amount_delta(current, target, liquidity, Rounding::Down)?;
        let next = if amount_remaining_out >= max_out {
            target
        } else {
            let computed = next_sqrt_price_from_base_out(current, liquidity, amount_remaining_out)?;
            // A positive output must move the price by at least one unit.
            let computed = if computed == current && amount_remaining_out.is_positive() {
                current.checked_add(&Dec::ULP)?
            } else {
                computed
            };
            computed.min(target)
        };
        let reached = next == target;
        let amount_out = if reached {
            max_out.min(amount_remaining_out)
        } else {
            amount_remaining_out
        };
        let amount_in = quote_amount_delta(current, next, liquidity, Rounding::Up)?;
        let fee_charge = fee_on_amount_in(amount_in, self.fee_rate)?;
        Ok(BucketSwap {
            sqrt_price_next: next,
            amount_in,
            amount_out,
            fee_charge,
        })
    }

    fn next_tick_iterator(
        &self,
        store: &dyn KvStore,
        pool_id: u64,
        current_tick: Tick,
    ) -> Result<TickIterator, AmmError> {
        let Some(first) = current_tick.checked_add(1) else {
            return Ok(TickIterator::new(StoreIterator::default()));
        };
        let start = keys::tick_key(pool_id, first);
        let end = keys::prefix_end(&keys::tick_prefix(pool_id));
        let inner = store.range(Some(start.as_slice()), end.as_deref(), Order::Ascending)?;
        Ok(TickIterator::new(inner))
    }

    fn set_liquidity_delta_sign(&self, liquidity_net: Dec) -> Result<Dec, AmmError> {
        Ok(liquidity_net)
    }

    fn next_tick_after_crossing(&self, tick: Tick) -> Tick {
        tick
    }

    fn validate_sqrt_price(&self, sqrt_price_limit: Dec, current: Dec) -> Result<(), AmmError> {
        if sqrt_price_limit < current {
            return Err(AmmError::InvalidPriceLimit(
                "selling quote needs a limit at or above the current price",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    fn d(s: &str) -> Dec {
        let Ok(v) = s.parse::<Dec>() else {
            panic!("valid decimal");
        };
        v
    }

    fn strategy(fee: &str) -> QuoteForBase {
        QuoteForBase::new(Dec::MAX, d(fee))
    }

    #[test]
    fn exact_in_reaches_target() {
        // L = 100 from √P 1 to 2: 100 quote in, 50 base out.
        let Ok(r) = strategy("0").compute_swap_within_bucket_out_given_in(d("1"), d("2"), d("100"), d("500")) else {
            panic!("expected Ok");
        };
        assert_eq!(r.sqrt_price_next, d("2"));
        assert_eq!(r.amount_in, d("100"));
        assert_eq!(r.amount_out, d("50"));
    }

    #[test]
    fn exact_in_partial_without_fee() {
        let Ok(r) = strategy("0").compute_swap_within_bucket_out_given_in(d("1"), d("2"), d("100"), d("50")) else {
            panic!("expected Ok");
        };
        // √P = 1 + 50 / 100
        assert_eq!(r.sqrt_price_next, d("1.5"));
        assert_eq!(r.amount_in, d("50"));
        assert_eq!(r.fee_charge, Dec::ZERO);
        // 100 × 0.5 / 1.5
        assert!((r.amount_out.to_f64_lossy() - 100.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn exact_in_reached_pays_proportional_fee() {
        let Ok(r) = strategy("0.5").compute_swap_within_bucket_out_given_in(d("1"), d("2"), d("100"), d("500")) else {
            panic!("expected Ok");
        };
        assert_eq!(r.amount_in, d("100"));
        assert_eq!(r.fee_charge, d("100"));
    }

    #[test]
    fn exact_out_partial() {
        // 25 base out at L = 100, √P 1: √P' = 100 / 75
        let Ok(r) = strategy("0").compute_swap_within_bucket_in_given_out(d("1"), d("2"), d("100"), d("25")) else {
            panic!("expected Ok");
        };
        assert_eq!(r.amount_out, d("25"));
        assert!((r.sqrt_price_next.to_f64_lossy() - 4.0 / 3.0).abs() < 1e-12);
        assert!(r.amount_in >= d("33.3333"));
    }

    #[test]
    fn exact_out_tiny_amount_still_moves_price() {
        let Ok(r) = strategy("0").compute_swap_within_bucket_in_given_out(d("1"), d("2"), d("1000000000"), Dec::ULP) else {
            panic!("expected Ok");
        };
        assert!(r.sqrt_price_next > d("1"));
    }

    #[test]
    fn direction_helpers() {
        let s = strategy("0");
        assert_eq!(s.set_liquidity_delta_sign(d("-5")), Ok(d("-5")));
        assert_eq!(s.next_tick_after_crossing(Tick::ZERO), Tick::ZERO);
        assert!(s.validate_sqrt_price(d("0.5"), d("1")).is_err());
        assert!(s.validate_sqrt_price(Dec::MAX, d("1")).is_ok());
        assert_eq!(QuoteForBase::new(d("1.2"), Dec::ZERO).sqrt_target_price(d("2")), d("1.2"));
    }
}
