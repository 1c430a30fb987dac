//! Whole-unit coins and multi-denomination decimal amounts.

use core::fmt;
use std::collections::BTreeMap;

use borsh::{BorshDeserialize, BorshSerialize};

use super::{Dec, Rounding};
use crate::error::AmmError;

/// A whole amount of a single denomination, in its smallest transferable
/// unit.
///
/// # Examples
///
/// ```
/// use clmm_engine::domain::Coin;
///
/// let coin = Coin::new("uusdc", 1_000);
/// assert_eq!(coin.to_string(), "1000uusdc");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, BorshSerialize, BorshDeserialize)]
pub struct Coin {
    /// Denomination.
    pub denom: String,
    /// Amount in smallest units.
    pub amount: u128,
}

impl Coin {
    /// Creates a new coin.
    #[must_use]
    pub fn new(denom: impl Into<String>, amount: u128) -> Self {
        Self {
            denom: denom.into(),
            amount,
        }
    }

    /// Returns `true` if the amount is zero.
    #[must_use]
    pub const fn is_zero(&self) -> bool {
        self.amount == 0
    }
}

impl fmt::Display for Coin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.amount, self.denom)
    }
}

/// A multi-denomination decimal amount.
///
/// Used for accumulator values (reward per share), unclaimed rewards and
/// fee growth.  Entries are kept sorted by denomination and zero entries are
/// never stored, so two equal amounts always compare and encode equal.
/// Individual entries may be negative: fee growth inside a tick range is a
/// difference of checkpoints and only its deltas are meaningful.
///
/// # Examples
///
/// ```
/// use clmm_engine::domain::{Dec, DecCoins};
///
/// let a = DecCoins::from_coin("uatom", Dec::ONE);
/// let b = a.checked_add(&a).expect("no overflow");
/// assert_eq!(b.amount_of("uatom"), Dec::from_int(2).expect("fits"));
/// assert!(b.amount_of("uosmo").is_zero());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, BorshSerialize, BorshDeserialize)]
pub struct DecCoins(BTreeMap<String, Dec>);

impl DecCoins {
    /// Empty amount.
    #[must_use]
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Single-denomination amount.
    #[must_use]
    pub fn from_coin(denom: impl Into<String>, amount: Dec) -> Self {
        let mut coins = Self::new();
        coins.set(denom.into(), amount);
        coins
    }

    /// Converts whole coins.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::Overflow`] if an amount does not fit the
    /// fixed-point range.
    pub fn from_coins(coins: &[Coin]) -> Result<Self, AmmError> {
        let mut out = Self::new();
        for coin in coins {
            let amount = Dec::from_int(coin.amount)?;
            out = out.checked_add(&Self::from_coin(coin.denom.clone(), amount))?;
        }
        Ok(out)
    }

    fn set(&mut self, denom: String, amount: Dec) {
        if amount.is_zero() {
            self.0.remove(&denom);
        } else {
            self.0.insert(denom, amount);
        }
    }

    /// Amount held in `denom`, zero if absent.
    pub fn amount_of(&self, denom: &str) -> Dec {
        self.0.get(denom).copied().unwrap_or(Dec::ZERO)
    }

    /// Returns `true` if no denomination carries a non-zero amount.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns `true` if any entry is negative.
    #[must_use]
    pub fn is_any_negative(&self) -> bool {
        self.0.values().any(Dec::is_negative)
    }

    /// Iterates over `(denom, amount)` pairs in denomination order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, Dec)> {
        self.0.iter().map(|(d, a)| (d.as_str(), *a))
    }

    /// Element-wise addition.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::Overflow`] if any entry overflows.
    pub fn checked_add(&self, other: &Self) -> Result<Self, AmmError> {
        let mut out = self.clone();
        for (denom, amount) in &other.0 {
            let sum = out.amount_of(denom).checked_add(amount)?;
            out.set(denom.clone(), sum);
        }
        Ok(out)
    }

    /// Element-wise subtraction.  Entries may become negative.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::Underflow`] if any entry is out of range.
    pub fn checked_sub(&self, other: &Self) -> Result<Self, AmmError> {
        let mut out = self.clone();
        for (denom, amount) in &other.0 {
            let diff = out.amount_of(denom).checked_sub(amount)?;
            out.set(denom.clone(), diff);
        }
        Ok(out)
    }

    /// Multiplies every entry by `factor`.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::Overflow`] if any product overflows.
    pub fn checked_mul_dec(&self, factor: &Dec, rounding: Rounding) -> Result<Self, AmmError> {
        let mut out = Self::new();
        for (denom, amount) in &self.0 {
            out.set(denom.clone(), amount.checked_mul(factor, rounding)?);
        }
        Ok(out)
    }

    /// Divides every entry by `divisor`.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::DivisionByZero`] for a zero divisor.
    pub fn checked_quo_dec(&self, divisor: &Dec, rounding: Rounding) -> Result<Self, AmmError> {
        let mut out = Self::new();
        for (denom, amount) in &self.0 {
            out.set(denom.clone(), amount.checked_div(divisor, rounding)?);
        }
        Ok(out)
    }

    /// Splits into whole coins and the fractional remainder ("dust").
    ///
    /// Negative entries are not transferable; they are returned unchanged
    /// in the dust part.
    #[must_use]
    pub fn truncate_decimal(&self) -> (Vec<Coin>, Self) {
        let mut whole = Vec::new();
        let mut dust = Self::new();
        for (denom, amount) in &self.0 {
            match amount.floor_u128() {
                Ok(units) => {
                    let fraction = amount.checked_sub(&amount.trunc()).unwrap_or(Dec::ZERO);
                    if units > 0 {
                        whole.push(Coin::new(denom.clone(), units));
                    }
                    dust.set(denom.clone(), fraction);
                }
                Err(_) => dust.set(denom.clone(), *amount),
            }
        }
        (whole, dust)
    }
}

impl fmt::Display for DecCoins {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (denom, amount) in &self.0 {
            if !first {
                write!(f, ",")?;
            }
            write!(f, "{amount}{denom}")?;
            first = false;
        }
        Ok(())
    }
}
