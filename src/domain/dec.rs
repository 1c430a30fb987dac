//! Signed fixed-point decimal used for prices, liquidity and fee growth.
//!
//! [`Dec`] wraps [`I80F48`](fixed::types::I80F48): 80 signed integer bits
//! and 48 fractional bits (resolution `2^-48 ≈ 3.55 × 10⁻¹⁵`).  Addition and
//! subtraction are exact; multiplication, division and square roots go
//! through a 256-bit intermediate and round in the caller's chosen
//! [`Rounding`] direction, so every lossy step is explicit.
//!
//! Whole token amounts are integers in this representation, which makes
//! "truncate to the smallest transferable unit" and "dust" exact.

use core::fmt;
use core::str::FromStr;

use borsh::{BorshDeserialize, BorshSerialize};
use ethnum::U256;
use fixed::types::I80F48;

use super::Rounding;
use crate::error::AmmError;
use crate::math::{isqrt, mul_div};

const FRAC_BITS: u32 = 48;
const ONE_BITS: u128 = 1 << FRAC_BITS;
const FRAC_MASK: u128 = ONE_BITS - 1;

/// Signed fixed-point decimal with checked, explicitly rounded arithmetic.
///
/// # Examples
///
/// ```
/// use clmm_engine::domain::{Dec, Rounding};
///
/// let ten = Dec::from_int(10).expect("fits");
/// let three = Dec::from_int(3).expect("fits");
/// let down = ten.checked_div(&three, Rounding::Down).expect("non-zero divisor");
/// let up = ten.checked_div(&three, Rounding::Up).expect("non-zero divisor");
/// assert!(down < up);
/// assert_eq!(down.floor_u128(), Ok(3));
/// assert_eq!(up.ceil_u128(), Ok(4));
/// ```
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[must_use]
pub struct Dec(I80F48);

impl Dec {
    /// Zero.
    pub const ZERO: Self = Self(I80F48::ZERO);

    /// One.
    pub const ONE: Self = Self(I80F48::ONE);

    /// Smallest positive value (one unit in the last place).
    pub const ULP: Self = Self(I80F48::DELTA);

    /// Largest representable value.
    pub const MAX: Self = Self(I80F48::MAX);

    /// Wraps a raw [`I80F48`].
    pub const fn new(value: I80F48) -> Self {
        Self(value)
    }

    /// Returns the underlying [`I80F48`].
    pub const fn get(&self) -> I80F48 {
        self.0
    }

    /// Builds a value from its raw two's-complement bits.
    pub const fn from_bits(bits: i128) -> Self {
        Self(I80F48::from_bits(bits))
    }

    /// Returns the raw two's-complement bits.
    #[must_use]
    pub const fn to_bits(&self) -> i128 {
        self.0.to_bits()
    }

    /// Converts a whole token amount.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::Overflow`] if `value` needs more than 79 bits.
    pub fn from_int(value: u128) -> Result<Self, AmmError> {
        I80F48::checked_from_num(value)
            .map(Self)
            .ok_or(AmmError::Overflow("integer does not fit fixed-point range"))
    }

    /// Converts a signed whole amount.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::Overflow`] if `value` is out of range.
    pub fn from_i128(value: i128) -> Result<Self, AmmError> {
        I80F48::checked_from_num(value)
            .map(Self)
            .ok_or(AmmError::Overflow("integer does not fit fixed-point range"))
    }

    /// Computes `numerator / denominator` rounded down.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::DivisionByZero`] for a zero denominator and
    /// [`AmmError::Overflow`] if either side is out of range.
    pub fn from_ratio(numerator: u128, denominator: u128) -> Result<Self, AmmError> {
        Self::from_int(numerator)?.checked_div(&Self::from_int(denominator)?, Rounding::Down)
    }

    /// Converts an `f64`, rounding to the nearest representable value.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::InvalidPrice`] for non-finite or out-of-range
    /// input.
    pub fn from_f64(value: f64) -> Result<Self, AmmError> {
        I80F48::checked_from_num(value)
            .map(Self)
            .ok_or(AmmError::InvalidPrice("value is not representable as fixed point"))
    }

    /// Converts to `f64`, losing precision for large magnitudes.
    #[must_use]
    pub fn to_f64_lossy(&self) -> f64 {
        self.0.to_num::<f64>()
    }

    // -- Predicates ---------------------------------------------------------

    /// Returns `true` if the value is exactly zero.
    #[must_use]
    pub const fn is_zero(&self) -> bool {
        self.0.to_bits() == 0
    }

    /// Returns `true` if the value is strictly positive.
    #[must_use]
    pub const fn is_positive(&self) -> bool {
        self.0.to_bits() > 0
    }

    /// Returns `true` if the value is strictly negative.
    #[must_use]
    pub const fn is_negative(&self) -> bool {
        self.0.to_bits() < 0
    }

    /// Returns `true` if the value has no fractional part.
    #[must_use]
    pub const fn is_integer(&self) -> bool {
        self.0.to_bits().unsigned_abs() & FRAC_MASK == 0
    }

    // -- Checked arithmetic -------------------------------------------------

    /// Checked addition.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::Overflow`] if the sum is not representable.
    pub fn checked_add(&self, other: &Self) -> Result<Self, AmmError> {
        self.0
            .checked_add(other.0)
            .map(Self)
            .ok_or(AmmError::Overflow("fixed-point addition overflow"))
    }

    /// Checked subtraction.  The result may be negative.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::Underflow`] if the difference is not
    /// representable.
    pub fn checked_sub(&self, other: &Self) -> Result<Self, AmmError> {
        self.0
            .checked_sub(other.0)
            .map(Self)
            .ok_or(AmmError::Underflow("fixed-point subtraction underflow"))
    }

    /// Checked negation.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::Overflow`] for the most negative value.
    pub fn checked_neg(&self) -> Result<Self, AmmError> {
        self.0
            .checked_neg()
            .map(Self)
            .ok_or(AmmError::Overflow("fixed-point negation overflow"))
    }

    /// Absolute value, saturating at [`Dec::MAX`].
    pub fn abs(&self) -> Self {
        Self(self.0.saturating_abs())
    }

    /// Checked multiplication with explicit rounding.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::Overflow`] if the product is not representable.
    pub fn checked_mul(&self, other: &Self, rounding: Rounding) -> Result<Self, AmmError> {
        let negative = self.is_negative() != other.is_negative();
        let magnitude = mul_div(
            self.0.to_bits().unsigned_abs(),
            other.0.to_bits().unsigned_abs(),
            ONE_BITS,
            rounding.for_magnitude(negative),
        )
        .ok_or(AmmError::Overflow("fixed-point multiplication overflow"))?;
        Self::from_magnitude(magnitude, negative)
            .ok_or(AmmError::Overflow("fixed-point multiplication overflow"))
    }

    /// Checked division with explicit rounding.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::DivisionByZero`] if `other` is zero and
    /// [`AmmError::Overflow`] if the quotient is not representable.
    pub fn checked_div(&self, other: &Self, rounding: Rounding) -> Result<Self, AmmError> {
        if other.is_zero() {
            return Err(AmmError::DivisionByZero);
        }
        let negative = self.is_negative() != other.is_negative();
        let magnitude = mul_div(
            self.0.to_bits().unsigned_abs(),
            ONE_BITS,
            other.0.to_bits().unsigned_abs(),
            rounding.for_magnitude(negative),
        )
        .ok_or(AmmError::Overflow("fixed-point division overflow"))?;
        Self::from_magnitude(magnitude, negative)
            .ok_or(AmmError::Overflow("fixed-point division overflow"))
    }

    /// Square root with explicit rounding.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::InvalidPrice`] for negative input.
    pub fn checked_sqrt(&self, rounding: Rounding) -> Result<Self, AmmError> {
        if self.is_negative() {
            return Err(AmmError::InvalidPrice("square root of a negative value"));
        }
        // sqrt(bits / 2^48) * 2^48 = sqrt(bits * 2^48)
        let radicand = U256::from(self.0.to_bits().unsigned_abs()) << FRAC_BITS;
        let root = isqrt(radicand);
        let root = if rounding.is_up() && root * root != radicand {
            root + U256::ONE
        } else {
            root
        };
        // radicand < 2^176, so the root fits in 88 bits
        Self::from_magnitude(root.as_u128(), false).ok_or(AmmError::Overflow("square root overflow"))
    }

    /// Smaller of two values.
    pub fn min(self, other: Self) -> Self {
        if self <= other { self } else { other }
    }

    /// Larger of two values.
    pub fn max(self, other: Self) -> Self {
        if self >= other { self } else { other }
    }

    // -- Integer conversion -------------------------------------------------

    /// Integer part rounded towards zero, as a non-negative amount.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::Underflow`] for negative values.
    pub fn floor_u128(&self) -> Result<u128, AmmError> {
        if self.is_negative() {
            return Err(AmmError::Underflow("negative value has no token amount"));
        }
        Ok(self.0.to_bits().unsigned_abs() >> FRAC_BITS)
    }

    /// Smallest integer not below this value, as a non-negative amount.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::Underflow`] for negative values.
    pub fn ceil_u128(&self) -> Result<u128, AmmError> {
        let floor = self.floor_u128()?;
        if self.is_integer() {
            Ok(floor)
        } else {
            Ok(floor + 1)
        }
    }

    /// Drops the fractional part, rounding towards zero.
    pub fn trunc(&self) -> Self {
        let bits = self.0.to_bits();
        let magnitude = bits.unsigned_abs() & !FRAC_MASK;
        Self::from_magnitude(magnitude, bits < 0).unwrap_or(*self)
    }

    fn from_magnitude(magnitude: u128, negative: bool) -> Option<Self> {
        let bits = i128::try_from(magnitude).ok()?;
        Some(Self::from_bits(if negative { -bits } else { bits }))
    }
}

impl fmt::Debug for Dec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Dec({})", self.0)
    }
}

impl fmt::Display for Dec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<I80F48> for Dec {
    fn from(value: I80F48) -> Self {
        Self(value)
    }
}

impl FromStr for Dec {
    type Err = AmmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        I80F48::from_str(s)
            .map(Self)
            .map_err(|_| AmmError::InvalidQuantity("malformed decimal string"))
    }
}

impl BorshSerialize for Dec {
    fn serialize<W: std::io::Write>(&self, writer: &mut W) -> std::io::Result<()> {
        self.0.to_bits().serialize(writer)
    }
}

impl BorshDeserialize for Dec {
    fn deserialize_reader<R: std::io::Read>(reader: &mut R) -> std::io::Result<Self> {
        Ok(Self::from_bits(i128::deserialize_reader(reader)?))
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    fn d(v: i128) -> Dec {
        let Ok(x) = Dec::from_i128(v) else {
            panic!("valid integer");
        };
        x
    }

    fn s(v: &str) -> Dec {
        let Ok(x) = v.parse::<Dec>() else {
            panic!("valid decimal string");
        };
        x
    }

    // -- Construction -------------------------------------------------------

    #[test]
    fn constants() {
        assert!(Dec::ZERO.is_zero());
        assert_eq!(Dec::ONE, d(1));
        assert!(Dec::ULP.is_positive());
        assert!(Dec::ULP < s("0.00000000000001"));
    }

    #[test]
    fn from_int_rejects_out_of_range() {
        assert!(Dec::from_int(1u128 << 90).is_err());
        assert!(Dec::from_int(1u128 << 70).is_ok());
    }

    #[test]
    fn from_ratio_rounds_down() {
        let Ok(third) = Dec::from_ratio(1, 3) else {
            panic!("expected Ok");
        };
        let Ok(back) = third.checked_mul(&d(3), Rounding::Down) else {
            panic!("expected Ok");
        };
        assert!(back < Dec::ONE);
    }

    // -- Arithmetic ---------------------------------------------------------

    #[test]
    fn add_sub_exact() {
        assert_eq!(s("1.5").checked_add(&s("2.25")), Ok(s("3.75")));
        assert_eq!(s("1.5").checked_sub(&s("2.25")), Ok(s("-0.75")));
    }

    #[test]
    fn add_overflow() {
        assert!(Dec::MAX.checked_add(&Dec::ONE).is_err());
    }

    #[test]
    fn mul_exact_matches_both_directions() {
        let a = s("2.5");
        let b = s("4");
        assert_eq!(a.checked_mul(&b, Rounding::Down), Ok(d(10)));
        assert_eq!(a.checked_mul(&b, Rounding::Up), Ok(d(10)));
    }

    #[test]
    fn mul_inexact_rounds_apart() {
        let Ok(third) = Dec::from_ratio(1, 3) else {
            panic!("expected Ok");
        };
        let (Ok(down), Ok(up)) = (
            third.checked_mul(&third, Rounding::Down),
            third.checked_mul(&third, Rounding::Up),
        ) else {
            panic!("expected Ok");
        };
        assert_eq!(up.checked_sub(&down), Ok(Dec::ULP));
    }

    #[test]
    fn mul_signed() {
        assert_eq!(d(-3).checked_mul(&d(4), Rounding::Down), Ok(d(-12)));
        assert_eq!(d(-3).checked_mul(&d(-4), Rounding::Down), Ok(d(12)));
    }

    #[test]
    fn negative_division_rounds_toward_positive_infinity_when_up() {
        let (Ok(up), Ok(down)) = (
            d(-10).checked_div(&d(3), Rounding::Up),
            d(-10).checked_div(&d(3), Rounding::Down),
        ) else {
            panic!("expected Ok");
        };
        // Both truncate the magnitude for a negative quotient.
        assert_eq!(up, down);
        assert!(up > d(-4) && up < d(-3));
    }

    #[test]
    fn div_by_zero() {
        assert_eq!(
            Dec::ONE.checked_div(&Dec::ZERO, Rounding::Down),
            Err(AmmError::DivisionByZero)
        );
    }

    #[test]
    fn sqrt_perfect_square_is_exact() {
        assert_eq!(d(16).checked_sqrt(Rounding::Up), Ok(d(4)));
        assert_eq!(s("2.25").checked_sqrt(Rounding::Down), Ok(s("1.5")));
        assert_eq!(d(100_000_000_000_000_000_000).checked_sqrt(Rounding::Up), Ok(d(10_000_000_000)));
    }

    #[test]
    fn sqrt_rounding_brackets_true_root() {
        let (Ok(down), Ok(up)) = (
            d(2).checked_sqrt(Rounding::Down),
            d(2).checked_sqrt(Rounding::Up),
        ) else {
            panic!("expected Ok");
        };
        assert_eq!(up.checked_sub(&down), Ok(Dec::ULP));
        assert!((down.to_f64_lossy() - 2f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn sqrt_negative_rejected() {
        assert!(d(-1).checked_sqrt(Rounding::Down).is_err());
    }

    // -- Integer conversion -------------------------------------------------

    #[test]
    fn floor_and_ceil() {
        assert_eq!(s("7.25").floor_u128(), Ok(7));
        assert_eq!(s("7.25").ceil_u128(), Ok(8));
        assert_eq!(d(7).ceil_u128(), Ok(7));
        assert!(d(-1).floor_u128().is_err());
    }

    #[test]
    fn trunc_keeps_integer_part() {
        assert_eq!(s("7.75").trunc(), d(7));
        assert_eq!(s("-7.75").trunc(), d(-7));
    }

    #[test]
    fn borsh_encoding_is_raw_bits() {
        let value = s("-12.5");
        let Ok(bytes) = borsh::to_vec(&value) else {
            panic!("encodes");
        };
        assert_eq!(bytes.len(), 16);
        assert_eq!(Dec::try_from_slice(&bytes).ok(), Some(value));
    }
}
