//! Selling base for quote: the price moves down.

use super::{amount_less_fee, fee_on_amount_in, finish_exact_in, TickIterator};
use crate::domain::{Dec, Rounding, Tick};
use crate::error::AmmError;
use crate::math::{
    base_amount_delta, next_sqrt_price_from_base_in, next_sqrt_price_from_quote_out,
    quote_amount_delta,
};
use crate::store::keys;
use crate::traits::{BucketSwap, KvStore, Order, SwapStrategy};

/// Strategy for swaps that pay base and receive quote.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BaseForQuote {
    sqrt_price_limit: Dec,
    fee_rate: Dec,
}

impl BaseForQuote {
    /// Strategy bounded below by `sqrt_price_limit`.
    pub const fn new(sqrt_price_limit: Dec, fee_rate: Dec) -> Self {
        Self {
            sqrt_price_limit,
            fee_rate,
        }
    }
}

impl SwapStrategy for BaseForQuote {
    fn is_base_for_quote(&self) -> bool {
        true
    }

    fn sqrt_price_limit(&self) -> Dec {
        self.sqrt_price_limit
    }

    fn sqrt_target_price(&self, next_tick_sqrt_price: Dec) -> Dec {
        next_tick_sqrt_price.max(self.sqrt_price_limit)
    }

    fn compute_swap_within_bucket_out_given_in(
        &self,
        current: Dec,
        target: Dec,
        liquidity: Dec,
        amount_remaining_in: Dec,
    ) -> Result<BucketSwap, AmmError> {
        let target = target.min(current);
        if liquidity.is_zero() {
            return Ok(BucketSwap::idle(target));
        }
        let usable = amount_less_fee(amount_remaining_in, self.fee_rate)?;
        let max_in = base_amount_delta(target, current, liquidity, Rounding::Up)?;
        let next = if usable >= max_in {
            target
        } else {
            next_sqrt_price_from_base_in(current, liquidity, usable)?.max(target)
        };
        let reached = next == target;
        let amount_in = if reached {
            max_in
        } else {
            base_amount_delta(next, current, liquidity, Rounding::Up)?
        };
        let amount_out = quote_amount_delta(next, current, liquidity, Rounding::Down)?;
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
        let target = target.min(current);
        if liquidity.is_zero() {
            return Ok(BucketSwap::idle(target));
        }
        let max_out = quote_amount_delta(target, current, liquidity, Rounding::Down)?;
        let next = if amount_remaining_out >= max_out {
            target
        } else {
            next_sqrt_price_from_quote_out(current, liquidity, amount_remaining_out)?.max(target)
        };
        let reached = next == target;
        let amount_out = if reached {
            max_out.min(amount_remaining_out)
        } else {
            amount_remaining_out
        };
        let amount_in = base_amount_delta(next, current, liquidity, Rounding::Up)?;
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
        let start = keys::tick_prefix(pool_id);
        let end = keys::key_successor(&keys::tick_key(pool_id, current_tick));
        let inner = store.range(Some(start.as_slice()), Some(end.as_slice()), Order::Descending)?;
        Ok(TickIterator::new(inner))
    }

    fn set_liquidity_delta_sign(&self, liquidity_net: Dec) -> Result<Dec, AmmError> {
        liquidity_net.checked_neg()
    }

    fn next_tick_after_crossing(&self, tick: Tick) -> Tick {
        tick.saturating_prev()
    }

    fn validate_sqrt_price(&self, sqrt_price_limit: Dec, current: Dec) -> Result<(), AmmError> {
        if sqrt_price_limit > current {
            return Err(AmmError::InvalidPriceLimit(
                "selling base needs a limit at or below the current price",
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

    fn strategy(fee: &str) -> BaseForQuote {
        BaseForQuote::new(Dec::ZERO, d(fee))
    }

    #[test]
    fn exact_in_reaches_target() {
        // L = 100 from √P 1 to 0.5 needs 100 base and yields 50 quote.
        let Ok(r) = strategy("0").compute_swap_within_bucket_out_given_in(d("1"), d("0.5"), d("100"), d("1000")) else {
            panic!("expected Ok");
        };
        assert_eq!(r.sqrt_price_next, d("0.5"));
        assert_eq!(r.amount_in, d("100"));
        assert_eq!(r.amount_out, d("50"));
        assert_eq!(r.fee_charge, Dec::ZERO);
    }

    #[test]
    fn exact_in_stops_short_and_consumes_everything() {
        let Ok(r) = strategy("0.5").compute_swap_within_bucket_out_given_in(d("1"), d("0.5"), d("100"), d("100")) else {
            panic!("expected Ok");
        };
        // 50 usable base: √P = 100 / 150
        assert!(r.sqrt_price_next > d("0.5") && r.sqrt_price_next < d("1"));
        assert_eq!(r.amount_in.checked_add(&r.fee_charge), Ok(d("100")));
        assert!(r.fee_charge > d("49.99"));
    }

    #[test]
    fn exact_in_never_passes_target() {
        let Ok(r) = strategy("0").compute_swap_within_bucket_out_given_in(d("1"), d("0.9"), d("100"), d("1000000")) else {
            panic!("expected Ok");
        };
        assert_eq!(r.sqrt_price_next, d("0.9"));
    }

    #[test]
    fn exact_out_partial() {
        // 25 quote out of L = 100 at √P 1: √P' = 0.75, base in = 100 × 0.25 / 0.75
        let Ok(r) = strategy("0").compute_swap_within_bucket_in_given_out(d("1"), d("0.5"), d("100"), d("25")) else {
            panic!("expected Ok");
        };
        assert_eq!(r.sqrt_price_next, d("0.75"));
        assert_eq!(r.amount_out, d("25"));
        assert!((r.amount_in.to_f64_lossy() - 100.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn exact_out_capped_at_target() {
        let Ok(r) = strategy("0").compute_swap_within_bucket_in_given_out(d("1"), d("0.5"), d("100"), d("80")) else {
            panic!("expected Ok");
        };
        assert_eq!(r.sqrt_price_next, d("0.5"));
        assert_eq!(r.amount_out, d("50"));
        assert_eq!(r.amount_in, d("100"));
    }

    #[test]
    fn zero_liquidity_jumps_to_target() {
        let Ok(r) = strategy("0.1").compute_swap_within_bucket_out_given_in(d("1"), d("0.5"), Dec::ZERO, d("10")) else {
            panic!("expected Ok");
        };
        assert_eq!(r, BucketSwap::idle(d("0.5")));
    }

    #[test]
    fn direction_helpers() {
        let s = strategy("0");
        assert_eq!(s.set_liquidity_delta_sign(d("5")), Ok(d("-5")));
        let Ok(t) = Tick::new(10) else {
            panic!("valid tick");
        };
        assert_eq!(s.next_tick_after_crossing(t).get(), 9);
        assert!(s.validate_sqrt_price(d("2"), d("1")).is_err());
        assert!(s.validate_sqrt_price(d("0.5"), d("1")).is_ok());
        assert_eq!(BaseForQuote::new(d("0.8"), Dec::ZERO).sqrt_target_price(d("0.5")), d("0.8"));
    }
}
