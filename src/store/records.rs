//! Typed access to pool, tick and liquidity position records.

use crate::domain::{LiquidityPosition, Pool, Tick, TickInfo};
use crate::error::{AmmError, Result};
use crate::store::{codec, keys};
use crate::traits::{KvStore, Order};

/// Reads pool `id`.
///
/// # Errors
///
/// - [`AmmError::PoolNotFound`] if it does not exist.
/// - [`AmmError::CorruptRecord`] if the stored record does not decode.
pub fn get_pool<S: KvStore + ?Sized>(store: &S, id: u64) -> Result<Pool> {
    codec::load(store, &keys::pool_key(id), "pool")?.ok_or(AmmError::PoolNotFound(id))
}

/// Writes `pool`.
///
/// # Errors
///
/// Store failures.
pub fn set_pool<S: KvStore + ?Sized>(store: &mut S, pool: &Pool) -> Result<()> {
    codec::save(store, &keys::pool_key(pool.id), pool)
}

/// Reads a tick, returning an empty record for an uninitialized tick.
///
/// # Errors
///
/// Store failures and [`AmmError::CorruptRecord`].
pub fn get_tick_info<S: KvStore + ?Sized>(store: &S, pool_id: u64, tick: Tick) -> Result<TickInfo> {
    Ok(codec::load(store, &keys::tick_key(pool_id, tick), "tick")?.unwrap_or_default())
}

/// Returns `true` if `tick` is initialized.
///
/// # Errors
///
/// Store failures.
pub fn has_tick<S: KvStore + ?Sized>(store: &S, pool_id: u64, tick: Tick) -> Result<bool> {
    Ok(store.has(&keys::tick_key(pool_id, tick))?)
}

/// Writes a tick record.
///
/// # Errors
///
/// Store failures.
pub fn set_tick_info<S: KvStore + ?Sized>(store: &mut S, pool_id: u64, tick: Tick, info: &TickInfo) -> Result<()> {
    codec::save(store, &keys::tick_key(pool_id, tick), info)
}

/// Removes a tick record.
///
/// # Errors
///
/// Store failures.
pub fn delete_tick<S: KvStore + ?Sized>(store: &mut S, pool_id: u64, tick: Tick) -> Result<()> {
    store.delete(&keys::tick_key(pool_id, tick))?;
    Ok(())
}

/// Returns `true` if pool `pool_id` has at least one initialized tick,
/// that is, if any liquidity was ever provided and not fully withdrawn.
///
/// # Errors
///
/// Store failures.
pub fn has_initialized_ticks<S: KvStore + ?Sized>(store: &S, pool_id: u64) -> Result<bool> {
    let prefix = keys::tick_prefix(pool_id);
    let end = keys::prefix_end(&prefix);
    let iter = store.range(Some(prefix.as_slice()), end.as_deref(), Order::Ascending)?;
    let found = iter.valid();
    iter.close();
    Ok(found)
}

/// Reads liquidity position `id`.
///
/// # Errors
///
/// - [`AmmError::PositionNotFound`] if it does not exist.
/// - [`AmmError::CorruptRecord`] if the stored record does not decode.
pub fn get_position<S: KvStore + ?Sized>(store: &S, id: u64) -> Result<LiquidityPosition> {
    codec::load(store, &keys::position_key(id), "liquidity position")?.ok_or(AmmError::PositionNotFound(id))
}

/// Writes `position`.
///
/// # Errors
///
/// Store failures.
pub fn set_position<S: KvStore + ?Sized>(store: &mut S, position: &LiquidityPosition) -> Result<()> {
    codec::save(store, &keys::position_key(position.id), position)
}

/// Removes liquidity position `id`.
///
/// # Errors
///
/// Store failures.
pub fn delete_position<S: KvStore + ?Sized>(store: &mut S, id: u64) -> Result<()> {
    store.delete(&keys::position_key(id))?;
    Ok(())
}
