//! Explicit rounding direction for fixed-point arithmetic.

/// Rounding direction for [`Dec`](super::Dec) multiplication, division and
/// square roots.
///
/// Every lossy operation in the engine names its direction so that each
/// rounding step can be checked against the protocol-favourable convention:
///
/// | Quantity | Direction |
/// |----------|-----------|
/// | amount the user pays | [`Rounding::Up`] |
/// | amount the user receives | [`Rounding::Down`] |
/// | fee charged | [`Rounding::Up`] |
///
/// # Examples
///
/// ```
/// use clmm_engine::domain::Rounding;
///
/// assert!(Rounding::Up.is_up());
/// assert_eq!(Rounding::Up.for_magnitude(true), Rounding::Down);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Rounding {
    /// Round towards positive infinity (ceiling).
    Up,
    /// Round towards zero (truncation).
    Down,
}

impl Rounding {
    /// Returns `true` if this is [`Rounding::Up`].
    #[must_use]
    pub const fn is_up(&self) -> bool {
        matches!(self, Self::Up)
    }

    /// Returns `true` if this is [`Rounding::Down`].
    #[must_use]
    pub const fn is_down(&self) -> bool {
        matches!(self, Self::Down)
    }

    /// Direction to apply to the absolute value of a result with the given
    /// sign so that the signed result honours `self`.
    ///
    /// Rounding a negative number towards `+∞` truncates its magnitude.
    #[must_use]
    pub const fn for_magnitude(&self, negative: bool) -> Self {
        match (self, negative) {
            (Self::Up, false) => Self::Up,
            _ => Self::Down,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn predicates() {
        assert!(Rounding::Up.is_up());
        assert!(!Rounding::Up.is_down());
        assert!(Rounding::Down.is_down());
    }

    #[test]
    fn magnitude_direction() {
        assert_eq!(Rounding::Up.for_magnitude(false), Rounding::Up);
        assert_eq!(Rounding::Up.for_magnitude(true), Rounding::Down);
        assert_eq!(Rounding::Down.for_magnitude(false), Rounding::Down);
        assert_eq!(Rounding::Down.for_magnitude(true), Rounding::Down);
    }
}
