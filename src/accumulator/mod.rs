//! Named reward accumulators with lazily settled positions.
//!
//! An accumulator tracks a cumulative reward per share (`accum_value`).
//! Each position stores the value it last settled against; the rewards it is
//! owed are the growth since then times its shares, plus anything carried in
//! `unclaimed_rewards_total`.  Depositing rewards is therefore O(1) however
//! many positions exist.
//!
//! | Operation | Effect |
//! |-----------|--------|
//! | [`init_accumulator`] | create with zero value and no shares |
//! | [`add_to_accumulator`] | grow the per-share value |
//! | [`new_position`] | open a position at the current value |
//! | [`add_to_position`] / [`remove_from_position`] | settle, then change shares |
//! | [`claim_rewards`] | settle, pay out whole units, reset |
//! | [`delete_position`] | claim, then remove the record |
//! | [`add_to_unclaimed_rewards`] | credit rewards without touching shares |
//!
//! The `*_interval` variants settle against an explicit baseline instead of
//! the accumulator's own value.  Liquidity positions use them to accrue only
//! the fee growth inside their tick range.
//!
//! All functions take the store explicitly; nothing is cached between calls.

mod settle;

#[cfg(test)]
mod proptest_properties;

pub use settle::{settle, total_rewards};

use tracing::debug;

use crate::domain::{AccumRecord, AccumulatorObject, Coin, Dec, DecCoins};
use crate::error::{AmmError, Result};
use crate::store::{codec, keys};
use crate::traits::KvStore;

// -- Accumulators -------------------------------------------------------------

/// Creates accumulator `name` with zero value and zero shares.
///
/// # Errors
///
/// Returns [`AmmError::AccumulatorExists`] if the name is taken.
pub fn init_accumulator<S: KvStore + ?Sized>(store: &mut S, name: &str) -> Result<()> {
    if store.has(&keys::accumulator_key(name))? {
        return Err(AmmError::AccumulatorExists(name.to_owned()));
    }
    set_accumulator(store, &AccumulatorObject::new(name))?;
    debug!(accumulator = name, "accumulator created");
    Ok(())
}

/// Reads accumulator `name`.
///
/// # Errors
///
/// - [`AmmError::AccumulatorNotFound`] if it does not exist.
/// - [`AmmError::CorruptRecord`] if the stored record does not decode.
pub fn get_accumulator<S: KvStore + ?Sized>(store: &S, name: &str) -> Result<AccumulatorObject> {
    codec::load(store, &keys::accumulator_key(name), "accumulator")?
        .ok_or_else(|| AmmError::AccumulatorNotFound(name.to_owned()))
}

/// Writes `accumulator` under its own name.
///
/// # Errors
///
/// Store failures.
pub fn set_accumulator<S: KvStore + ?Sized>(store: &mut S, accumulator: &AccumulatorObject) -> Result<()> {
    codec::save(store, &keys::accumulator_key(&accumulator.name), accumulator)
}

/// Adds `amount` to the per-share value of `accumulator` and persists it.
///
/// # Errors
///
/// - [`AmmError::NegativeRewardAddition`] if any entry is negative.
/// - [`AmmError::Overflow`] and store failures.
pub fn add_to_accumulator<S: KvStore + ?Sized>(
    store: &mut S,
    accumulator: &mut AccumulatorObject,
    amount: &DecCoins,
) -> Result<()> {
    if amount.is_any_negative() {
        return Err(AmmError::NegativeRewardAddition);
    }
    accumulator.accum_value = accumulator.accum_value.checked_add(amount)?;
    set_accumulator(store, accumulator)
}

// -- Positions ----------------------------------------------------------------

fn not_found(accumulator: &str, position: &str) -> AmmError {
    AmmError::AccumPositionNotFound {
        accumulator: accumulator.to_owned(),
        position: position.to_owned(),
    }
}

/// Reads position `position` of accumulator `accumulator`.
///
/// # Errors
///
/// - [`AmmError::AccumPositionNotFound`] if it does not exist.
/// - [`AmmError::CorruptRecord`] if the stored record does not decode.
pub fn get_position<S: KvStore + ?Sized>(store: &S, accumulator: &str, position: &str) -> Result<AccumRecord> {
    codec::load(store, &keys::accum_position_key(accumulator, position), "accumulator position")?
        .ok_or_else(|| not_found(accumulator, position))
}

fn write_position<S: KvStore + ?Sized>(
    store: &mut S,
    accumulator: &str,
    position: &str,
    record: &AccumRecord,
) -> Result<()> {
    codec::save(store, &keys::accum_position_key(accumulator, position), record)
}

fn remove_position_record<S: KvStore + ?Sized>(store: &mut S, accumulator: &str, position: &str) -> Result<()> {
    store.delete(&keys::accum_position_key(accumulator, position))?;
    Ok(())
}

/// Returns `true` if the position exists.
///
/// # Errors
///
/// Store failures.
pub fn has_position<S: KvStore + ?Sized>(store: &S, accumulator: &str, position: &str) -> Result<bool> {
    Ok(store.has(&keys::accum_position_key(accumulator, position))?)
}

/// Shares held by the position.
///
/// # Errors
///
/// Same as [`get_position`].
pub fn position_size<S: KvStore + ?Sized>(store: &S, accumulator: &str, position: &str) -> Result<Dec> {
    Ok(get_position(store, accumulator, position)?.num_shares)
}

/// Opens a position baselined at the accumulator's current value.
///
/// # Errors
///
/// See [`new_position_interval`].
pub fn new_position<S: KvStore + ?Sized>(
    store: &mut S,
    accumulator: &str,
    position: &str,
    shares: Dec,
) -> Result<()> {
    let baseline = get_accumulator(store, accumulator)?.accum_value;
    new_position_interval(store, accumulator, position, shares, &baseline)
}

/// Opens a position baselined at `baseline`, with nothing unclaimed.
///
/// # Errors
///
/// - [`AmmError::NonPositiveShares`] if `shares <= 0`.
/// - [`AmmError::AccumulatorNotFound`] if the accumulator is missing.
/// - [`AmmError::PositionExists`] if the position is already open.
pub fn new_position_interval<S: KvStore + ?Sized>(
    store: &mut S,
    accumulator: &str,
    position: &str,
    shares: Dec,
    baseline: &DecCoins,
) -> Result<()> {
    if !shares.is_positive() {
        return Err(AmmError::NonPositiveShares("a new position needs positive shares"));
    }
    let mut accum = get_accumulator(store, accumulator)?;
    if has_position(store, accumulator, position)? {
        return Err(AmmError::PositionExists {
            accumulator: accumulator.to_owned(),
            position: position.to_owned(),
        });
    }
    let record = AccumRecord {
        num_shares: shares,
        accum_value_per_share: baseline.clone(),
        unclaimed_rewards_total: DecCoins::new(),
    };
    write_position(store, accumulator, position, &record)?;
    accum.total_shares = accum.total_shares.checked_add(&shares)?;
    set_accumulator(store, &accum)?;
    debug!(accumulator, position, %shares, "accumulator position opened");
    Ok(())
}

/// Adds shares, settling at the accumulator's current value.
///
/// # Errors
///
/// See [`add_to_position_interval`].
pub fn add_to_position<S: KvStore + ?Sized>(
    store: &mut S,
    accumulator: &str,
    position: &str,
    shares: Dec,
) -> Result<()> {
    let baseline = get_accumulator(store, accumulator)?.accum_value;
    add_to_position_interval(store, accumulator, position, shares, &baseline)
}

/// Settles the position, adds `shares`, and re-baselines at `baseline`.
///
/// # Errors
///
/// - [`AmmError::NonPositiveShares`] if `shares <= 0`.
/// - Not-found errors for the accumulator or the position.
pub fn add_to_position_interval<S: KvStore + ?Sized>(
    store: &mut S,
    accumulator: &str,
    position: &str,
    shares: Dec,
    baseline: &DecCoins,
) -> Result<()> {
    if !shares.is_positive() {
        return Err(AmmError::NonPositiveShares("cannot add non-positive shares"));
    }
    let record = get_position(store, accumulator, position)?;
    let mut accum = get_accumulator(store, accumulator)?;
    let (mut settled, _) = settle(&record, &accum)?;
    settled.num_shares = record.num_shares.checked_add(&shares)?;
    settled.accum_value_per_share = baseline.clone();
    write_position(store, accumulator, position, &settled)?;

    accum.total_shares = accum.total_shares.checked_add(&shares)?;
    set_accumulator(store, &accum)
}

/// Removes shares, settling at the accumulator's current value.
///
/// # Errors
///
/// See [`remove_from_position_interval`].
pub fn remove_from_position<S: KvStore + ?Sized>(
    store: &mut S,
    accumulator: &str,
    position: &str,
    shares: Dec,
) -> Result<()> {
    let baseline = get_accumulator(store, accumulator)?.accum_value;
    remove_from_position_interval(store, accumulator, position, shares, &baseline)
}

/// Settles the position, removes `shares`, and re-baselines at `baseline`.
///
/// A position emptied with nothing left to claim is deleted; one that still
/// has unclaimed rewards is kept at zero shares until it is claimed.
///
/// # Errors
///
/// - [`AmmError::NonPositiveShares`] if `shares <= 0`.
/// - [`AmmError::InsufficientShares`] if the position holds fewer shares.
/// - Not-found errors for the accumulator or the position.
pub fn remove_from_position_interval<S: KvStore + ?Sized>(
    store: &mut S,
    accumulator: &str,
    position: &str,
    shares: Dec,
    baseline: &DecCoins,
) -> Result<()> {
    if !shares.is_positive() {
        return Err(AmmError::NonPositiveShares("cannot remove non-positive shares"));
    }
    let record = get_position(store, accumulator, position)?;
    if shares > record.num_shares {
        return Err(AmmError::InsufficientShares {
            requested: shares,
            held: record.num_shares,
        });
    }
    let mut accum = get_accumulator(store, accumulator)?;
    let (mut settled, _) = settle(&record, &accum)?;
    settled.num_shares = record.num_shares.checked_sub(&shares)?;
    settled.accum_value_per_share = baseline.clone();
    if settled.num_shares.is_zero() && settled.unclaimed_rewards_total.is_zero() {
        remove_position_record(store, accumulator, position)?;
        debug!(accumulator, position, "accumulator position emptied and removed");
    } else {
        write_position(store, accumulator, position, &settled)?;
    }

    accum.total_shares = accum.total_shares.checked_sub(&shares)?;
    set_accumulator(store, &accum)
}

/// Applies a signed share delta: positive adds, negative removes.
///
/// # Errors
///
/// - [`AmmError::ZeroShares`] for a zero delta.
/// - Everything [`add_to_position_interval`] and
///   [`remove_from_position_interval`] return.
pub fn update_position_interval<S: KvStore + ?Sized>(
    store: &mut S,
    accumulator: &str,
    position: &str,
    shares_delta: Dec,
    baseline: &DecCoins,
) -> Result<()> {
    if shares_delta.is_zero() {
        return Err(AmmError::ZeroShares);
    }
    if shares_delta.is_negative() {
        return remove_from_position_interval(store, accumulator, position, shares_delta.abs(), baseline);
    }
    add_to_position_interval(store, accumulator, position, shares_delta, baseline)
}

/// Overwrites the position's baseline, keeping shares and unclaimed rewards.
///
/// # Errors
///
/// [`AmmError::AccumPositionNotFound`] and store failures.
pub fn set_position_interval<S: KvStore + ?Sized>(
    store: &mut S,
    accumulator: &str,
    position: &str,
    baseline: &DecCoins,
) -> Result<()> {
    let mut record = get_position(store, accumulator, position)?;
    record.accum_value_per_share = baseline.clone();
    write_position(store, accumulator, position, &record)
}

/// Settles and pays out the position's rewards.
///
/// Returns the whole units per denomination and the fractional dust
/// separately.  The position restarts with nothing unclaimed at the current
/// value; a position with zero shares is deleted.  The dust is dropped from
/// the position unless the caller credits it back with
/// [`add_to_unclaimed_rewards`].
///
/// # Errors
///
/// Not-found errors for the accumulator or the position.
pub fn claim_rewards<S: KvStore + ?Sized>(
    store: &mut S,
    accumulator: &str,
    position: &str,
) -> Result<(Vec<Coin>, DecCoins)> {
    let accum = get_accumulator(store, accumulator)?;
    let record = get_position(store, accumulator, position)?;
    let total = total_rewards(&accum, &record)?;
    let (whole, dust) = total.truncate_decimal();

    if record.num_shares.is_zero() {
        remove_position_record(store, accumulator, position)?;
    } else {
        let reset = AccumRecord {
            num_shares: record.num_shares,
            accum_value_per_share: accum.accum_value,
            unclaimed_rewards_total: DecCoins::new(),
        };
        write_position(store, accumulator, position, &reset)?;
    }
    debug!(accumulator, position, denoms = whole.len(), %dust, "rewards claimed");
    Ok((whole, dust))
}

/// Claims everything, removes the position and its shares.
///
/// Returns the whole rewards and the dust as a single decimal amount.
///
/// # Errors
///
/// Not-found errors for the accumulator or the position.
pub fn delete_position<S: KvStore + ?Sized>(store: &mut S, accumulator: &str, position: &str) -> Result<DecCoins> {
    let record = get_position(store, accumulator, position)?;
    let (whole, dust) = claim_rewards(store, accumulator, position)?;
    // A zero-share record is already gone after the claim.
    if !record.num_shares.is_zero() {
        remove_position_record(store, accumulator, position)?;
    }

    let mut accum = get_accumulator(store, accumulator)?;
    accum.total_shares = accum.total_shares.checked_sub(&record.num_shares)?;
    set_accumulator(store, &accum)?;

    DecCoins::from_coins(&whole)?.checked_add(&dust)
}

/// Credits `rewards` to the position's unclaimed total.
///
/// # Errors
///
/// - [`AmmError::AccumPositionNotFound`] if the position does not exist.
/// - [`AmmError::NegativeRewardAddition`] if any entry is negative.
pub fn add_to_unclaimed_rewards<S: KvStore + ?Sized>(
    store: &mut S,
    accumulator: &str,
    position: &str,
    rewards: &DecCoins,
) -> Result<()> {
    let mut record = get_position(store, accumulator, position)?;
    if rewards.is_any_negative() {
        return Err(AmmError::NegativeRewardAddition);
    }
    record.unclaimed_rewards_total = record.unclaimed_rewards_total.checked_add(rewards)?;
    write_position(store, accumulator, position, &record)
}
