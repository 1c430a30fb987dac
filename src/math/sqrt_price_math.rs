//! Token amounts between two sqrt prices and the price reached by trading a
//! given amount against constant liquidity.
//!
//! For liquidity `L` between sqrt prices `a < b`:
//!
//! | Quantity | Formula |
//! |----------|---------|
//! | base amount | `L × (b − a) / (a × b)` |
//! | quote amount | `L × (b − a)` |
//!
//! Every function takes or fixes its rounding direction so callers can
//! round amounts paid by the trader up and amounts received down.

use crate::domain::{Dec, Rounding};
use crate::error::AmmError;

fn ordered(a: Dec, b: Dec) -> (Dec, Dec) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

/// Base-denomination amount spanned by moving between two sqrt prices.
///
/// # Errors
///
/// - [`AmmError::InvalidPrice`] if either price is not positive.
/// - [`AmmError::Overflow`] if the amount is not representable.
pub fn base_amount_delta(
    sqrt_price_a: Dec,
    sqrt_price_b: Dec,
    liquidity: Dec,
    rounding: Rounding,
) -> Result<Dec, AmmError> {
    let (lower, upper) = ordered(sqrt_price_a, sqrt_price_b);
    if !lower.is_positive() {
        return Err(AmmError::InvalidPrice("sqrt price must be positive"));
    }
    let diff = upper.checked_sub(&lower)?;
    liquidity
        .checked_mul(&diff, rounding)?
        .checked_div(&upper, rounding)?
        .checked_div(&lower, rounding)
}

/// Quote-denomination amount spanned by moving between two sqrt prices.
///
/// # Errors
///
/// Returns [`AmmError::Overflow`] if the amount is not representable.
pub fn quote_amount_delta(
    sqrt_price_a: Dec,
    sqrt_price_b: Dec,
    liquidity: Dec,
    rounding: Rounding,
) -> Result<Dec, AmmError> {
    let (lower, upper) = ordered(sqrt_price_a, sqrt_price_b);
    liquidity.checked_mul(&upper.checked_sub(&lower)?, rounding)
}

/// Price after adding `amount` of base: `L·√P / (L + amount·√P)`, rounded
/// up so the price falls no further than the input pays for.
///
/// # Errors
///
/// Returns [`AmmError::Overflow`] on intermediate overflow.
pub fn next_sqrt_price_from_base_in(
    sqrt_price: Dec,
    liquidity: Dec,
    amount: Dec,
) -> Result<Dec, AmmError> {
    let numerator = liquidity.checked_mul(&sqrt_price, Rounding::Up)?;
    let product = amount.checked_mul(&sqrt_price, Rounding::Down)?;
    let denominator = liquidity.checked_add(&product)?;
    numerator.checked_div(&denominator, Rounding::Up)
}

/// Price after adding `amount` of quote: `√P + amount / L`, rounded down.
///
/// # Errors
///
/// Returns [`AmmError::DivisionByZero`] for zero liquidity.
pub fn next_sqrt_price_from_quote_in(
    sqrt_price: Dec,
    liquidity: Dec,
    amount: Dec,
) -> Result<Dec, AmmError> {
    sqrt_price.checked_add(&amount.checked_div(&liquidity, Rounding::Down)?)
}

/// Price after removing `amount` of base: `L·√P / (L − amount·√P)`,
/// rounded up.
///
/// Returns [`Dec::MAX`] when the liquidity cannot supply `amount` at any
/// price; callers clamp to their target.
///
/// # Errors
///
/// Returns [`AmmError::Overflow`] on intermediate overflow.
pub fn next_sqrt_price_from_base_out(
    sqrt_price: Dec,
    liquidity: Dec,
    amount: Dec,
) -> Result<Dec, AmmError> {
    let numerator = liquidity.checked_mul(&sqrt_price, Rounding::Up)?;
    let product = amount.checked_mul(&sqrt_price, Rounding::Up)?;
    let denominator = liquidity.checked_sub(&product)?;
    if !denominator.is_positive() {
        return Ok(Dec::MAX);
    }
    match numerator.checked_div(&denominator, Rounding::Up) {
        Err(AmmError::Overflow(_)) => Ok(Dec::MAX),
        other => other,
    }
}

/// Price after removing `amount` of quote: `√P − amount / L`, with the
/// quotient rounded up.
///
/// The result may be zero or negative when the liquidity cannot supply
/// `amount`; callers clamp to their target.
///
/// # Errors
///
/// Returns [`AmmError::DivisionByZero`] for zero liquidity.
pub fn next_sqrt_price_from_quote_out(
    sqrt_price: Dec,
    liquidity: Dec,
    amount: Dec,
) -> Result<Dec, AmmError> {
    sqrt_price.checked_sub(&amount.checked_div(&liquidity, Rounding::Up)?)
}

/// Amounts of base and quote needed to provide `liquidity` over the sqrt
/// price range `[lower, upper]` when the current sqrt price is `current`.
///
/// Below the range the position is all base; above it all quote.
///
/// # Errors
///
/// Propagates [`base_amount_delta`] and [`quote_amount_delta`] failures.
pub fn amounts_for_liquidity(
    current: Dec,
    lower: Dec,
    upper: Dec,
    liquidity: Dec,
    rounding: Rounding,
) -> Result<(Dec, Dec), AmmError> {
    if current <= lower {
        Ok((base_amount_delta(lower, upper, liquidity, rounding)?, Dec::ZERO))
    } else if current >= upper {
        Ok((Dec::ZERO, quote_amount_delta(lower, upper, liquidity, rounding)?))
    } else {
        Ok((
            base_amount_delta(current, upper, liquidity, rounding)?,
            quote_amount_delta(lower, current, liquidity, rounding)?,
        ))
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
    fn base_delta_exact() {
        // 100 × (2 − 1) / (1 × 2) = 50
        assert_eq!(base_amount_delta(d("1"), d("2"), d("100"), Rounding::Down), Ok(d("50")));
        assert_eq!(base_amount_delta(d("2"), d("1"), d("100"), Rounding::Up), Ok(d("50")));
    }

    #[test]
    fn base_delta_rounding_brackets() {
        let (Ok(down), Ok(up)) = (
            base_amount_delta(d("1"), d("3"), d("1"), Rounding::Down),
            base_amount_delta(d("1"), d("3"), d("1"), Rounding::Up),
        ) else {
            panic!("expected Ok");
        };
        assert!(down < up);
        assert!((down.to_f64_lossy() - 2.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn quote_delta_exact() {
        assert_eq!(quote_amount_delta(d("1"), d("1.5"), d("100"), Rounding::Down), Ok(d("50")));
    }

    #[test]
    fn zero_price_rejected() {
        assert!(base_amount_delta(Dec::ZERO, d("1"), d("1"), Rounding::Down).is_err());
    }

    #[test]
    fn base_in_moves_price_down() {
        // L = 100, √P = 1, add 100 base → 100 / 200 = 0.5
        assert_eq!(next_sqrt_price_from_base_in(d("1"), d("100"), d("100")), Ok(d("0.5")));
    }

    #[test]
    fn quote_in_moves_price_up() {
        assert_eq!(next_sqrt_price_from_quote_in(d("1"), d("100"), d("50")), Ok(d("1.5")));
    }

    #[test]
    fn base_out_moves_price_up() {
        // 100 / (100 − 50) = 2
        assert_eq!(next_sqrt_price_from_base_out(d("1"), d("100"), d("50")), Ok(d("2")));
        assert_eq!(next_sqrt_price_from_base_out(d("1"), d("100"), d("100")), Ok(Dec::MAX));
    }

    #[test]
    fn quote_out_moves_price_down() {
        assert_eq!(next_sqrt_price_from_quote_out(d("1"), d("100"), d("50")), Ok(d("0.5")));
    }

    #[test]
    fn amounts_by_range_position() {
        let l = d("100");
        let Ok((b, q)) = amounts_for_liquidity(d("0.5"), d("1"), d("2"), l, Rounding::Up) else {
            panic!("expected Ok");
        };
        assert_eq!((b, q), (d("50"), Dec::ZERO));
        let Ok((b, q)) = amounts_for_liquidity(d("3"), d("1"), d("2"), l, Rounding::Up) else {
            panic!("expected Ok");
        };
        assert_eq!((b, q), (Dec::ZERO, d("100")));
        let Ok((b, q)) = amounts_for_liquidity(d("1.25"), d("1"), d("2"), l, Rounding::Up) else {
            panic!("expected Ok");
        };
        // 100 × 0.75 / 2.5 = 30 ; 100 × 0.25 = 25
        assert_eq!((b, q), (d("30"), d("25")));
    }
}
