//! Discrete price points and the per-tick record.

use core::fmt;

use borsh::{BorshDeserialize, BorshSerialize};

use super::{Dec, DecCoins};
use crate::error::AmmError;

/// Minimum tick index accepted by any pool.
const MIN_TICK: i32 = -250_000;

/// Maximum tick index accepted by any pool.
const MAX_TICK: i32 = 250_000;

/// Largest spot price a tick may map to.  Keeps sqrt prices, and their
/// reciprocals, far above the fixed-point resolution.
const MAX_SPOT_PRICE: f64 = 1e10;

/// A discrete price point: `price = price_ratio^tick`.
///
/// Valid indices range from [`MIN`](Self::MIN) (`-250000`) to
/// [`MAX`](Self::MAX) (`250000`); a pool's [`TickParams`] may narrow that
/// range further.
///
/// # Examples
///
/// ```
/// use clmm_engine::domain::Tick;
///
/// let tick = Tick::new(100);
/// assert!(tick.is_ok());
/// assert_eq!(tick.unwrap_or(Tick::ZERO).get(), 100);
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, BorshSerialize, BorshDeserialize,
)]
pub struct Tick(i32);

impl Tick {
    /// Minimum valid tick (`-250000`).
    pub const MIN: Self = Self(MIN_TICK);

    /// Maximum valid tick (`250000`).
    pub const MAX: Self = Self(MAX_TICK);

    /// Tick whose price is exactly one.
    pub const ZERO: Self = Self(0);

    /// Creates a new `Tick` with range validation.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::InvalidTick`] if `value` is outside
    /// `[-250000, 250000]`.
    pub const fn new(value: i32) -> crate::error::Result<Self> {
        if value < MIN_TICK || value > MAX_TICK {
            return Err(AmmError::InvalidTick("tick out of range [-250000, 250000]"));
        }
        Ok(Self(value))
    }

    /// Returns the underlying `i32` index.
    #[must_use]
    pub const fn get(&self) -> i32 {
        self.0
    }

    /// Checked addition.  Returns `None` outside the valid range.
    #[must_use]
    pub const fn checked_add(&self, delta: i32) -> Option<Self> {
        match self.0.checked_add(delta) {
            Some(v) if v >= MIN_TICK && v <= MAX_TICK => Some(Self(v)),
            _ => None,
        }
    }

    /// Checked subtraction.  Returns `None` outside the valid range.
    #[must_use]
    pub const fn checked_sub(&self, delta: i32) -> Option<Self> {
        match self.0.checked_sub(delta) {
            Some(v) if v >= MIN_TICK && v <= MAX_TICK => Some(Self(v)),
            _ => None,
        }
    }

    /// The tick immediately below this one, saturating at [`Tick::MIN`].
    ///
    /// Crossing a tick downwards leaves the pool one tick below it, which
    /// may be one below a pool-specific lower bound.
    #[must_use]
    pub const fn saturating_prev(&self) -> Self {
        match self.checked_sub(1) {
            Some(t) => t,
            None => Self::MIN,
        }
    }

    /// Returns `true` if the index is a multiple of `spacing`.
    #[must_use]
    pub const fn is_aligned(&self, spacing: u32) -> bool {
        spacing != 0 && self.0.rem_euclid(spacing as i32) == 0
    }
}

impl fmt::Display for Tick {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Tick({})", self.0)
    }
}

// -- TickParams --------------------------------------------------------------

/// Geometry of a pool's tick grid.
///
/// `price_ratio` is the multiplicative step between adjacent ticks (for
/// example `1.0001`); positions may only start and end on multiples of
/// `tick_spacing`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, BorshSerialize, BorshDeserialize)]
pub struct TickParams {
    price_ratio: Dec,
    tick_spacing: u32,
}

impl TickParams {
    /// Creates validated tick parameters.
    ///
    /// # Errors
    ///
    /// - [`AmmError::InvalidConfiguration`] if `price_ratio` is not in
    ///   `(1, 2]`.
    /// - [`AmmError::InvalidConfiguration`] if `tick_spacing` is zero.
    pub fn new(price_ratio: Dec, tick_spacing: u32) -> crate::error::Result<Self> {
        let params = Self {
            price_ratio,
            tick_spacing,
        };
        params.validate()?;
        Ok(params)
    }

    /// The `1.0001` ratio with spacing one.
    ///
    /// # Errors
    ///
    /// Never fails in practice; kept fallible for uniformity.
    pub fn standard() -> crate::error::Result<Self> {
        Self::new(Dec::from_ratio(10_001, 10_000)?, 1)
    }

    /// Re-checks the invariants established by [`TickParams::new`].
    ///
    /// # Errors
    ///
    /// Same as [`TickParams::new`].
    pub fn validate(&self) -> crate::error::Result<()> {
        let two = Dec::from_int(2)?;
        if self.price_ratio <= Dec::ONE || self.price_ratio > two {
            return Err(AmmError::InvalidConfiguration("price ratio must be in (1, 2]"));
        }
        if self.tick_spacing == 0 {
            return Err(AmmError::InvalidConfiguration("tick spacing must be positive"));
        }
        Ok(())
    }

    /// Multiplicative price step between adjacent ticks.
    pub const fn price_ratio(&self) -> Dec {
        self.price_ratio
    }

    /// Alignment required of position bounds.
    #[must_use]
    pub const fn tick_spacing(&self) -> u32 {
        self.tick_spacing
    }

    /// Highest usable tick for this grid.
    pub fn max_tick(&self) -> Tick {
        let ln_ratio = self.price_ratio.to_f64_lossy().ln();
        if ln_ratio <= 0.0 {
            return Tick::ZERO;
        }
        let bound = (MAX_SPOT_PRICE.ln() / ln_ratio).floor();
        if bound >= f64::from(MAX_TICK) {
            Tick::MAX
        } else {
            // 0 <= bound < MAX_TICK, so the cast is exact.
            #[allow(clippy::cast_possible_truncation)]
            Tick(bound as i32)
        }
    }

    /// Lowest usable tick for this grid.
    pub fn min_tick(&self) -> Tick {
        Tick(-self.max_tick().get())
    }

    /// Returns `true` if `tick` is within the usable range.
    #[must_use]
    pub fn contains(&self, tick: Tick) -> bool {
        tick >= self.min_tick() && tick <= self.max_tick()
    }
}

// -- TickInfo ----------------------------------------------------------------

/// Stored state of one initialized tick.
///
/// `liquidity_net` is added when the price crosses the tick upwards and
/// subtracted when it crosses downwards.  `fee_growth_outside` is the fee
/// growth per unit of liquidity on the side of the tick away from the
/// current price, flipped on every crossing.
#[derive(Debug, Clone, Default, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct TickInfo {
    /// Total liquidity referencing this tick as a bound.
    pub liquidity_gross: Dec,
    /// Signed liquidity change on upward crossing.
    pub liquidity_net: Dec,
    /// Fee growth per unit of liquidity outside this tick.
    pub fee_growth_outside: DecCoins,
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    // -- Tick ---------------------------------------------------------------

    #[test]
    fn bounds() {
        assert!(Tick::new(250_000).is_ok());
        assert!(Tick::new(-250_000).is_ok());
        assert_eq!(
            Tick::new(250_001),
            Err(AmmError::InvalidTick("tick out of range [-250000, 250000]"))
        );
        assert!(Tick::new(i32::MIN).is_err());
    }

    #[test]
    fn checked_arith() {
        assert_eq!(Tick::ZERO.checked_add(5), Some(Tick(5)));
        assert_eq!(Tick::MAX.checked_add(1), None);
        assert_eq!(Tick::MIN.checked_sub(1), None);
        assert_eq!(Tick::MIN.saturating_prev(), Tick::MIN);
        assert_eq!(Tick(10).saturating_prev(), Tick(9));
    }

    #[test]
    fn alignment() {
        assert!(Tick(-20).is_aligned(10));
        assert!(!Tick(-25).is_aligned(10));
        assert!(!Tick(0).is_aligned(0));
    }

    #[test]
    fn ordering() {
        assert!(Tick(-1) < Tick(0));
        assert_eq!(Tick(42).to_string(), "Tick(42)");
    }

    // -- TickParams ---------------------------------------------------------

    #[test]
    fn standard_params() {
        let Ok(p) = TickParams::standard() else {
            panic!("expected Ok");
        };
        assert_eq!(p.tick_spacing(), 1);
        // ln(1e10) / ln(1.0001) ≈ 230270
        assert!(p.max_tick().get() > 230_000 && p.max_tick().get() < 231_000);
        assert_eq!(p.min_tick().get(), -p.max_tick().get());
        assert!(p.contains(Tick::ZERO));
        assert!(!p.contains(Tick::MAX));
    }

    #[test]
    fn coarse_ratio_narrows_range() {
        let Ok(two) = Dec::from_int(2) else {
            panic!("expected Ok");
        };
        let Ok(p) = TickParams::new(two, 1) else {
            panic!("expected Ok");
        };
        // 2^33 < 1e10 < 2^34
        assert_eq!(p.max_tick().get(), 33);
    }

    #[test]
    fn invalid_params() {
        assert!(TickParams::new(Dec::ONE, 1).is_err());
        let Ok(p) = TickParams::standard() else {
            panic!("expected Ok");
        };
        assert!(TickParams::new(p.price_ratio(), 0).is_err());
        let Ok(three) = Dec::from_int(3) else {
            panic!("expected Ok");
        };
        assert!(TickParams::new(three, 1).is_err());
    }
}
