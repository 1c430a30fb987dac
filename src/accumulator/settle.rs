//! Pure settlement arithmetic.

use crate::domain::{AccumRecord, AccumulatorObject, DecCoins, Rounding};
use crate::error::Result;

/// Rewards owed to `position`:
/// `unclaimed + (accum_value − baseline) × num_shares`, rounded down.
///
/// # Errors
///
/// Returns [`AmmError::Overflow`](crate::error::AmmError::Overflow) if the
/// product does not fit.
pub fn total_rewards(accumulator: &AccumulatorObject, position: &AccumRecord) -> Result<DecCoins> {
    let accrued = accrued(accumulator, position)?;
    position.unclaimed_rewards_total.checked_add(&accrued)
}

fn accrued(accumulator: &AccumulatorObject, position: &AccumRecord) -> Result<DecCoins> {
    accumulator
        .accum_value
        .checked_sub(&position.accum_value_per_share)?
        .checked_mul_dec(&position.num_shares, Rounding::Down)
}

/// Brings `position` up to date with `accumulator`.
///
/// Returns the position re-baselined at the current value with every
/// accrued reward moved into `unclaimed_rewards_total`, plus the amount
/// accrued by this settlement alone.  Shares are unchanged.
///
/// # Examples
///
/// ```
/// use clmm_engine::accumulator::settle;
/// use clmm_engine::domain::{AccumRecord, AccumulatorObject, Dec, DecCoins};
///
/// let mut accum = AccumulatorObject::new("rewards");
/// accum.accum_value = DecCoins::from_coin("uatom", Dec::ONE);
/// let position = AccumRecord {
///     num_shares: Dec::from_int(3).unwrap_or(Dec::ZERO),
///     ..AccumRecord::default()
/// };
///
/// let Ok((settled, delta)) = settle(&position, &accum) else { return };
/// assert_eq!(delta.amount_of("uatom"), Dec::from_int(3).unwrap_or(Dec::ZERO));
/// assert_eq!(settled.accum_value_per_share, accum.accum_value);
/// ```
///
/// # Errors
///
/// Same as [`total_rewards`].
pub fn settle(position: &AccumRecord, accumulator: &AccumulatorObject) -> Result<(AccumRecord, DecCoins)> {
    let delta = accrued(accumulator, position)?;
    let updated = AccumRecord {
        num_shares: position.num_shares,
        accum_value_per_share: accumulator.accum_value.clone(),
        unclaimed_rewards_total: position.unclaimed_rewards_total.checked_add(&delta)?,
    };
    Ok((updated, delta))
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::Dec;

    fn d(s: &str) -> Dec {
        let Ok(v) = s.parse::<Dec>() else {
            panic!("valid decimal");
        };
        v
    }

    fn accum(value: &str) -> AccumulatorObject {
        let mut a = AccumulatorObject::new("a");
        a.accum_value = DecCoins::from_coin("x", d(value));
        a
    }

    #[test]
    fn settle_moves_growth_into_unclaimed() {
        let position = AccumRecord {
            num_shares: d("4"),
            accum_value_per_share: DecCoins::from_coin("x", d("1")),
            unclaimed_rewards_total: DecCoins::from_coin("x", d("0.5")),
        };
        let Ok((settled, delta)) = settle(&position, &accum("1.25")) else {
            panic!("expected Ok");
        };
        assert_eq!(delta, DecCoins::from_coin("x", d("1")));
        assert_eq!(settled.unclaimed_rewards_total, DecCoins::from_coin("x", d("1.5")));
        assert_eq!(settled.num_shares, d("4"));
        assert_eq!(total_rewards(&accum("1.25"), &settled), Ok(DecCoins::from_coin("x", d("1.5"))));
    }

    #[test]
    fn settle_is_idempotent() {
        let position = AccumRecord {
            num_shares: d("2"),
            ..AccumRecord::default()
        };
        let a = accum("3");
        let Ok((once, _)) = settle(&position, &a) else {
            panic!("expected Ok");
        };
        let Ok((twice, delta)) = settle(&once, &a) else {
            panic!("expected Ok");
        };
        assert_eq!(once, twice);
        assert!(delta.is_zero());
    }
}
