//! Wide (256-bit intermediate) integer helpers on [`ethnum::U256`].
//!
//! [`mul_div`] computes `a × b ÷ d` without losing the high half of the
//! product, which is what lets [`Dec`](crate::domain::Dec) multiply and
//! divide 128-bit raw values with an exact, explicitly rounded result.

use ethnum::U256;

use crate::domain::Rounding;

/// Narrows a 256-bit value, or `None` if it exceeds `u128`.
fn narrow(value: U256) -> Option<u128> {
    if value > U256::from(u128::MAX) {
        return None;
    }
    Some(value.as_u128())
}

/// Computes `a × b ÷ divisor` with explicit rounding.
///
/// Returns `None` on division by zero or when the result exceeds `u128`.
///
/// # Examples
///
/// ```
/// use clmm_engine::domain::Rounding;
/// use clmm_engine::math::mul_div;
///
/// assert_eq!(mul_div(10, 20, 5, Rounding::Down), Some(40));
/// assert_eq!(mul_div(5, 1, 3, Rounding::Down), Some(1));
/// assert_eq!(mul_div(5, 1, 3, Rounding::Up), Some(2));
/// ```
#[must_use]
pub fn mul_div(a: u128, b: u128, divisor: u128, rounding: Rounding) -> Option<u128> {
    if divisor == 0 {
        return None;
    }
    let prod = U256::from(a) * U256::from(b);
    let divisor = U256::from(divisor);
    let quo = narrow(prod / divisor)?;
    match rounding {
        Rounding::Up if prod % divisor != U256::ZERO => quo.checked_add(1),
        _ => Some(quo),
    }
}

/// Integer square root: the greatest `r` with `r² ≤ n`.
#[must_use]
pub fn isqrt(n: U256) -> U256 {
    if n < U256::new(2) {
        return n;
    }
    let bits = 256 - n.leading_zeros();
    let mut x = U256::ONE << bits.div_ceil(2);
    loop {
        let y = (x + n / x) >> 1u32;
        if y >= x {
            return x;
        }
        x = y;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mul_div_survives_wide_intermediate() {
        let large = 1u128 << 100;
        assert_eq!(mul_div(large, large, large, Rounding::Down), Some(large));
        assert_eq!(
            mul_div(u128::MAX, u128::MAX, u128::MAX, Rounding::Down),
            Some(u128::MAX)
        );
    }

    #[test]
    fn mul_div_rounding() {
        assert_eq!(mul_div(1, 1, 2, Rounding::Down), Some(0));
        assert_eq!(mul_div(1, 1, 2, Rounding::Up), Some(1));
        assert_eq!(mul_div(4, 1, 2, Rounding::Up), Some(2));
    }

    #[test]
    fn mul_div_rejects_zero_divisor_and_overflow() {
        assert_eq!(mul_div(1, 1, 0, Rounding::Down), None);
        assert_eq!(mul_div(u128::MAX, 2, 1, Rounding::Down), None);
        assert_eq!(mul_div(u128::MAX, u128::MAX, u128::MAX, Rounding::Up), Some(u128::MAX));
    }

    #[test]
    fn isqrt_values() {
        assert_eq!(isqrt(U256::ZERO), U256::ZERO);
        assert_eq!(isqrt(U256::ONE), U256::ONE);
        assert_eq!(isqrt(U256::new(15)), U256::new(3));
        assert_eq!(isqrt(U256::new(16)), U256::new(4));
        assert_eq!(isqrt(U256::from(u128::MAX)), U256::from(u128::from(u64::MAX)));
        assert_eq!(isqrt(U256::MAX), U256::from(u128::MAX));
    }
}
