//! Tick-to-sqrt-price and sqrt-price-to-tick conversion.
//!
//! A pool's tick grid maps tick `t` to `price = r^t` where `r` is the grid's
//! price ratio, so `sqrt_price = sqrt(r)^t`.
//!
//! # Functions
//!
//! - [`tick_to_sqrt_price`] computes `sqrt(r)^t` by exponentiation by
//!   squaring in fixed point, so the same tick always yields bit-identical
//!   prices.  The swap loop relies on that when it compares a computed price
//!   with a tick's price to decide whether the tick was reached.
//! - [`sqrt_price_to_tick`] returns the greatest tick whose sqrt price is
//!   `<=` the given sqrt price.  An `f64` logarithm provides the first guess
//!   and exact fixed-point comparisons correct it.
//!
//! # Examples
//!
//! ```
//! use clmm_engine::domain::{Tick, TickParams};
//! use clmm_engine::math::{sqrt_price_to_tick, tick_to_sqrt_price};
//!
//! let params = TickParams::standard().expect("valid params");
//! let tick = Tick::new(100).unwrap_or(Tick::ZERO);
//! let sqrt_price = tick_to_sqrt_price(tick, &params).expect("tick in range");
//! let round_trip = sqrt_price_to_tick(sqrt_price, &params).expect("price in range");
//! assert_eq!(round_trip, tick);
//! ```

use crate::domain::{Dec, Rounding, Tick, TickParams};
use crate::error::AmmError;

/// Computes the sqrt price at `tick`.
///
/// # Errors
///
/// - [`AmmError::InvalidTick`] if `tick` is outside the grid's usable range.
/// - [`AmmError::Overflow`] if an intermediate power is not representable
///   (cannot happen for validated [`TickParams`]).
pub fn tick_to_sqrt_price(tick: Tick, params: &TickParams) -> Result<Dec, AmmError> {
    if !params.contains(tick) {
        return Err(AmmError::InvalidTick("tick outside the pool's tick range"));
    }
    let step = params.price_ratio().checked_sqrt(Rounding::Down)?;
    let magnitude = pow(step, tick.get().unsigned_abs())?;
    if tick.get() < 0 {
        Dec::ONE.checked_div(&magnitude, Rounding::Down)
    } else {
        Ok(magnitude)
    }
}

fn pow(base: Dec, mut exp: u32) -> Result<Dec, AmmError> {
    let mut result = Dec::ONE;
    let mut square = base;
    while exp > 0 {
        if exp & 1 == 1 {
            result = result.checked_mul(&square, Rounding::Down)?;
        }
        exp >>= 1;
        if exp > 0 {
            square = square.checked_mul(&square, Rounding::Down)?;
        }
    }
    Ok(result)
}

/// Greatest tick `t` with `tick_to_sqrt_price(t) <= sqrt_price`.
///
/// Prices at or above the grid's highest tick map to that tick.
///
/// # Errors
///
/// - [`AmmError::InvalidPrice`] if `sqrt_price` is not positive or lies
///   below the grid's lowest tick.
pub fn sqrt_price_to_tick(sqrt_price: Dec, params: &TickParams) -> Result<Tick, AmmError> {
    if !sqrt_price.is_positive() {
        return Err(AmmError::InvalidPrice("sqrt price must be positive"));
    }
    let min = params.min_tick();
    let max = params.max_tick();

    let estimate =
        2.0 * sqrt_price.to_f64_lossy().ln() / params.price_ratio().to_f64_lossy().ln();
    let mut tick = if !estimate.is_finite() || estimate >= f64::from(max.get()) {
        max
    } else if estimate <= f64::from(min.get()) {
        min
    } else {
        // Strictly between two i32 bounds, so the cast is exact.
        #[allow(clippy::cast_possible_truncation)]
        Tick::new(estimate.floor() as i32)?
    };

    while tick > min && tick_to_sqrt_price(tick, params)? > sqrt_price {
        tick = tick.saturating_prev();
    }
    while tick < max {
        let Some(up) = tick.checked_add(1) else {
            break;
        };
        if tick_to_sqrt_price(up, params)? > sqrt_price {
            break;
        }
        tick = up;
    }
    if tick_to_sqrt_price(tick, params)? > sqrt_price {
        return Err(AmmError::InvalidPrice("sqrt price below the pool's lowest tick"));
    }
    Ok(tick)
}

/// Tick bracketing a spot `price`, together with the exact square root of
/// that price.
///
/// # Errors
///
/// Returns [`AmmError::InvalidPrice`] for non-positive prices or prices
/// outside the grid.
pub fn price_to_sqrt_price_and_tick(
    price: Dec,
    params: &TickParams,
) -> Result<(Dec, Tick), AmmError> {
    if !price.is_positive() {
        return Err(AmmError::InvalidPrice("price must be positive"));
    }
    let sqrt_price = price.checked_sqrt(Rounding::Down)?;
    let tick = sqrt_price_to_tick(sqrt_price, params)?;
    Ok((sqrt_price, tick))
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    fn params() -> TickParams {
        let Ok(p) = TickParams::standard() else {
            panic!("expected Ok");
        };
        p
    }

    fn t(v: i32) -> Tick {
        let Ok(t) = Tick::new(v) else {
            panic!("valid tick");
        };
        t
    }

    fn sp(v: i32) -> Dec {
        let Ok(s) = tick_to_sqrt_price(t(v), &params()) else {
            panic!("expected Ok");
        };
        s
    }

    // -- tick_to_sqrt_price -------------------------------------------------

    #[test]
    fn tick_zero_is_one() {
        assert_eq!(sp(0), Dec::ONE);
    }

    #[test]
    fn strictly_increasing() {
        let ticks = [-200_000, -1_000, -2, -1, 0, 1, 2, 1_000, 200_000];
        for pair in ticks.windows(2) {
            assert!(sp(pair[0]) < sp(pair[1]), "{} vs {}", pair[0], pair[1]);
        }
    }

    #[test]
    fn matches_float_reference() {
        for v in [-50_000, -10, 10, 50_000, 100_000] {
            let expected = 1.0001f64.powf(f64::from(v) / 2.0);
            let got = sp(v).to_f64_lossy();
            assert!(((got - expected) / expected).abs() < 1e-9, "tick {v}");
        }
    }

    #[test]
    fn out_of_grid_rejected() {
        assert!(tick_to_sqrt_price(Tick::MAX, &params()).is_err());
        assert!(tick_to_sqrt_price(Tick::MIN, &params()).is_err());
    }

    // -- sqrt_price_to_tick -------------------------------------------------

    #[test]
    fn round_trip() {
        for v in [-200_000, -777, -1, 0, 1, 3, 777, 200_000] {
            assert_eq!(sqrt_price_to_tick(sp(v), &params()), Ok(t(v)));
        }
    }

    #[test]
    fn between_ticks_floors() {
        let Ok(mid) = sp(10).checked_add(&Dec::ULP) else {
            panic!("expected Ok");
        };
        assert_eq!(sqrt_price_to_tick(mid, &params()), Ok(t(10)));
        let Ok(below) = sp(10).checked_sub(&Dec::ULP) else {
            panic!("expected Ok");
        };
        assert_eq!(sqrt_price_to_tick(below, &params()), Ok(t(9)));
    }

    #[test]
    fn above_grid_clamps_to_max() {
        let p = params();
        assert_eq!(sqrt_price_to_tick(Dec::MAX, &p), Ok(p.max_tick()));
    }

    #[test]
    fn non_positive_rejected() {
        assert!(sqrt_price_to_tick(Dec::ZERO, &params()).is_err());
        assert!(sqrt_price_to_tick(Dec::ULP, &params()).is_err());
    }

    #[test]
    fn price_conversion() {
        let Ok(four) = Dec::from_int(4) else {
            panic!("expected Ok");
        };
        let Ok((sqrt, tick)) = price_to_sqrt_price_and_tick(four, &params()) else {
            panic!("expected Ok");
        };
        assert_eq!(sqrt, Dec::from_int(2).unwrap_or(Dec::ZERO));
        // 1.0001^13863 ≈ 4.0000
        assert!((tick.get() - 13_863).abs() <= 1);
    }
}
