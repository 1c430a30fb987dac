//! The two [`SwapStrategy`] implementations and their shared helpers.
//!
//! | Strategy | Sells | Price | Ticks visited | Unbounded limit |
//! |----------|-------|-------|---------------|-----------------|
//! | [`BaseForQuote`] | base | down | `<= current`, descending | `0` |
//! | [`QuoteForBase`] | quote | up | `> current`, ascending | [`Dec::MAX`] |
//!
//! After crossing a tick downwards the pool sits one tick below it, so the
//! descending scan includes the current tick itself: a pool created exactly
//! on an initialized tick crosses it in a zero-length first bucket.

mod base_for_quote;
mod quote_for_base;
mod tick_iterator;

pub use base_for_quote::BaseForQuote;
pub use quote_for_base::QuoteForBase;
pub use tick_iterator::TickIterator;

use crate::domain::{Dec, Rounding};
use crate::error::AmmError;
use crate::traits::SwapStrategy;

/// Builds the strategy for a swap direction.
#[must_use]
pub fn new_strategy(base_for_quote: bool, sqrt_price_limit: Dec, fee_rate: Dec) -> Box<dyn SwapStrategy> {
    if base_for_quote {
        Box::new(BaseForQuote::new(sqrt_price_limit, fee_rate))
    } else {
        Box::new(QuoteForBase::new(sqrt_price_limit, fee_rate))
    }
}

/// Converts an optional spot-price limit into a sqrt-price limit.
///
/// `None` and zero mean unbounded: `0` when selling base, [`Dec::MAX`] when
/// selling quote.
///
/// # Errors
///
/// Returns [`AmmError::InvalidPriceLimit`] for a negative limit.
pub fn get_sqrt_price_limit(price_limit: Option<Dec>, base_for_quote: bool) -> Result<Dec, AmmError> {
    match price_limit {
        Some(limit) if limit.is_negative() => {
            Err(AmmError::InvalidPriceLimit("price limit cannot be negative"))
        }
        Some(limit) if limit.is_positive() => limit.checked_sqrt(Rounding::Down),
        _ if base_for_quote => Ok(Dec::ZERO),
        _ => Ok(Dec::MAX),
    }
}

/// Fee owed on `amount_in` so that the fee is `fee_rate` of the total paid:
/// `amount_in × f / (1 − f)`, rounded up.
pub(crate) fn fee_on_amount_in(amount_in: Dec, fee_rate: Dec) -> Result<Dec, AmmError> {
    if fee_rate.is_zero() || amount_in.is_zero() {
        return Ok(Dec::ZERO);
    }
    let keep = Dec::ONE.checked_sub(&fee_rate)?;
    amount_in
        .checked_mul(&fee_rate, Rounding::Up)?
        .checked_div(&keep, Rounding::Up)
}

/// Portion of `remaining` left after the fee, rounded down.
pub(crate) fn amount_less_fee(remaining: Dec, fee_rate: Dec) -> Result<Dec, AmmError> {
    remaining.checked_mul(&Dec::ONE.checked_sub(&fee_rate)?, Rounding::Down)
}

/// Final `(amount_in, fee)` of an exact-input bucket.
///
/// A bucket that reaches its target pays the proportional fee.  One that
/// stops short has used up the input, so the whole remainder is consumed:
/// the part not converted becomes fee, or input when there is no fee.  A
/// remainder too small to move the price at all is absorbed as fee, except
/// in a fee-free pool where it is left unconsumed and the bucket is idle.
/// In every case `amount_in + fee <= remaining`.
pub(crate) fn finish_exact_in(
    reached_target: bool,
    price_moved: bool,
    amount_in: Dec,
    remaining: Dec,
    fee_rate: Dec,
) -> Result<(Dec, Dec), AmmError> {
    let amount_in = amount_in.min(remaining);
    let left = remaining.checked_sub(&amount_in)?;
    if reached_target {
        Ok((amount_in, fee_on_amount_in(amount_in, fee_rate)?.min(left)))
    } else if !price_moved && fee_rate.is_zero() {
        Ok((Dec::ZERO, Dec::ZERO))
    } else if !price_moved {
        Ok((Dec::ZERO, remaining))
    } else if fee_rate.is_zero() {
        Ok((remaining, Dec::ZERO))
    } else {
        Ok((amount_in, left))
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

    #[test]
    fn unbounded_limits() {
        assert_eq!(get_sqrt_price_limit(None, true), Ok(Dec::ZERO));
        assert_eq!(get_sqrt_price_limit(None, false), Ok(Dec::MAX));
        assert_eq!(get_sqrt_price_limit(Some(Dec::ZERO), false), Ok(Dec::MAX));
    }

    #[test]
    fn explicit_limit_is_square_rooted() {
        assert_eq!(get_sqrt_price_limit(Some(d("4")), true), Ok(d("2")));
        assert!(get_sqrt_price_limit(Some(d("-1")), true).is_err());
    }

    #[test]
    fn fee_gross_up() {
        // 30 × 0.25 / 0.75 = 10: the fee is a quarter of the 40 paid
        assert_eq!(fee_on_amount_in(d("30"), d("0.25")), Ok(d("10")));
        assert_eq!(fee_on_amount_in(d("997"), Dec::ZERO), Ok(Dec::ZERO));
    }

    #[test]
    fn stopping_short_consumes_remainder() {
        let Ok((amount_in, fee)) = finish_exact_in(false, true, d("90"), d("100"), d("0.01")) else {
            panic!("expected Ok");
        };
        assert_eq!((amount_in, fee), (d("90"), d("10")));
        let Ok((amount_in, fee)) = finish_exact_in(false, true, d("99.9"), d("100"), Dec::ZERO) else {
            panic!("expected Ok");
        };
        assert_eq!((amount_in, fee), (d("100"), Dec::ZERO));
    }

    #[test]
    fn immovable_remainder_becomes_fee() {
        let Ok((amount_in, fee)) = finish_exact_in(false, false, Dec::ZERO, d("0.5"), d("0.003")) else {
            panic!("expected Ok");
        };
        assert_eq!((amount_in, fee), (Dec::ZERO, d("0.5")));
    }

    #[test]
    fn fee_free_pool_never_charges_immovable_remainder() {
        let Ok((amount_in, fee)) = finish_exact_in(false, false, Dec::ZERO, d("0.5"), Dec::ZERO) else {
            panic!("expected Ok");
        };
        assert_eq!((amount_in, fee), (Dec::ZERO, Dec::ZERO));
    }

    #[test]
    fn fee_never_exceeds_remainder() {
        let Ok((amount_in, fee)) = finish_exact_in(true, true, d("99.9"), d("100"), d("0.5")) else {
            panic!("expected Ok");
        };
        assert_eq!(amount_in, d("99.9"));
        assert!(amount_in.checked_add(&fee).is_ok_and(|t| t <= d("100")));
    }
}
