//! Configuration for a new concentrated-liquidity pool.

use crate::domain::{Dec, Tick, TickParams};
use crate::error::AmmError;
use crate::math::price_to_sqrt_price_and_tick;

/// Immutable parameters of a pool at creation.
///
/// Prices are quote per base.  The pool starts at `initial_price` with no
/// liquidity; its current tick is derived from that price.
///
/// # Validation
///
/// - Both denominations are non-empty and distinct.
/// - `fee_rate` lies in `[0, 1)`.
/// - `tick_params` is valid (see [`TickParams::validate`]).
/// - `initial_price` is positive and representable on the tick grid.
///
/// # Examples
///
/// ```
/// use clmm_engine::config::PoolConfig;
/// use clmm_engine::domain::{Dec, TickParams};
///
/// let params = TickParams::standard().expect("valid params");
/// let fee: Dec = "0.003".parse().expect("valid decimal");
/// let config = PoolConfig::new("uatom", "uusdc", fee, params, Dec::ONE);
/// assert!(config.is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolConfig {
    denom_base: String,
    denom_quote: String,
    fee_rate: Dec,
    tick_params: TickParams,
    initial_price: Dec,
}

impl PoolConfig {
    /// Creates a validated `PoolConfig`.
    ///
    /// # Errors
    ///
    /// - [`AmmError::InvalidConfiguration`] for empty or identical
    ///   denominations, or invalid tick parameters.
    /// - [`AmmError::InvalidFee`] if `fee_rate` is outside `[0, 1)`.
    /// - [`AmmError::InvalidPrice`] if `initial_price` is not positive or
    ///   falls outside the tick grid.
    pub fn new(
        denom_base: impl Into<String>,
        denom_quote: impl Into<String>,
        fee_rate: Dec,
        tick_params: TickParams,
        initial_price: Dec,
    ) -> Result<Self, AmmError> {
        let config = Self {
            denom_base: denom_base.into(),
            denom_quote: denom_quote.into(),
            fee_rate,
            tick_params,
            initial_price,
        };
        config.validate()?;
        Ok(config)
    }

    /// Validates all configuration invariants.
    ///
    /// # Errors
    ///
    /// Same as [`PoolConfig::new`].
    pub fn validate(&self) -> Result<(), AmmError> {
        if self.denom_base.is_empty() || self.denom_quote.is_empty() {
            return Err(AmmError::InvalidConfiguration("denominations must not be empty"));
        }
        if self.denom_base == self.denom_quote {
            return Err(AmmError::InvalidConfiguration(
                "base and quote denominations must differ",
            ));
        }
        if self.fee_rate.is_negative() || self.fee_rate >= Dec::ONE {
            return Err(AmmError::InvalidFee("fee rate must be in [0, 1)"));
        }
        self.tick_params.validate()?;
        let _ = self.initial_sqrt_price_and_tick()?;
        Ok(())
    }

    /// Sqrt price and tick the pool starts at.
    ///
    /// # Errors
    ///
    /// [`AmmError::InvalidPrice`] if the initial price is not on the grid.
    pub fn initial_sqrt_price_and_tick(&self) -> Result<(Dec, Tick), AmmError> {
        price_to_sqrt_price_and_tick(self.initial_price, &self.tick_params)
    }

    /// Returns the base denomination.
    #[must_use]
    pub fn denom_base(&self) -> &str {
        &self.denom_base
    }

    /// Returns the quote denomination.
    #[must_use]
    pub fn denom_quote(&self) -> &str {
        &self.denom_quote
    }

    /// Returns the fee rate.
    #[must_use]
    pub const fn fee_rate(&self) -> Dec {
        self.fee_rate
    }

    /// Returns the tick grid parameters.
    #[must_use]
    pub const fn tick_params(&self) -> TickParams {
        self.tick_params
    }

    /// Returns the initial spot price.
    #[must_use]
    pub const fn initial_price(&self) -> Dec {
        self.initial_price
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    // -- helpers --------------------------------------------------------------

    fn d(s: &str) -> Dec {
        let Ok(v) = s.parse::<Dec>() else {
            panic!("valid decimal");
        };
        v
    }

    fn params() -> TickParams {
        let Ok(p) = TickParams::standard() else {
            panic!("expected Ok");
        };
        p
    }

    // -- valid construction ---------------------------------------------------

    #[test]
    fn valid_config() {
        let Ok(cfg) = PoolConfig::new("base", "quote", d("0.003"), params(), d("4")) else {
            panic!("expected Ok");
        };
        assert_eq!(cfg.denom_base(), "base");
        assert_eq!(cfg.denom_quote(), "quote");
        assert_eq!(cfg.initial_price(), d("4"));
        let Ok((sqrt_price, tick)) = cfg.initial_sqrt_price_and_tick() else {
            panic!("expected Ok");
        };
        assert_eq!(sqrt_price, d("2"));
        // 1.0001^13863 ≈ 4.0000
        assert!((13_860..=13_865).contains(&tick.get()));
    }

    #[test]
    fn zero_fee_is_valid() {
        assert!(PoolConfig::new("base", "quote", Dec::ZERO, params(), Dec::ONE).is_ok());
    }

    // -- invalid construction -------------------------------------------------

    #[test]
    fn rejects_bad_denoms() {
        assert!(matches!(
            PoolConfig::new("", "quote", Dec::ZERO, params(), Dec::ONE),
            Err(AmmError::InvalidConfiguration(_))
        ));
        assert!(matches!(
            PoolConfig::new("same", "same", Dec::ZERO, params(), Dec::ONE),
            Err(AmmError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn rejects_fee_out_of_range() {
        assert!(matches!(
            PoolConfig::new("base", "quote", Dec::ONE, params(), Dec::ONE),
            Err(AmmError::InvalidFee(_))
        ));
        assert!(matches!(
            PoolConfig::new("base", "quote", d("-0.1"), params(), Dec::ONE),
            Err(AmmError::InvalidFee(_))
        ));
    }

    #[test]
    fn rejects_bad_price() {
        assert!(matches!(
            PoolConfig::new("base", "quote", Dec::ZERO, params(), Dec::ZERO),
            Err(AmmError::InvalidPrice(_))
        ));
    }
}
