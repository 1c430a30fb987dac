//! Liquidity positions and swap-fee collection.
//!
//! Each position holds shares equal to its liquidity in the pool's fee
//! accumulator.  The accumulator's value is the pool-wide fee growth per
//! unit of liquidity, but a position only earns the growth that happened
//! while the price was inside its range.  Ticks keep the growth on their
//! far side (`fee_growth_outside`), from which the growth inside any range
//! is derived:
//!
//! ```text
//! inside = global - below(lower) - above(upper)
//! ```
//!
//! Before the accumulator settles a position, its baseline is moved to
//! `inside_last + (global - inside_now)` so that the accumulator's
//! `global - baseline` equals the growth inside since the last touch.
//! Afterwards the baseline is reset to `inside_now`.

use tracing::{debug, trace};

use super::{Keeper, TransferBatch};
use crate::accumulator;
use crate::domain::{Address, Coin, Dec, DecCoins, LiquidityPosition, Pool, Rounding, Tick, TickInfo};
use crate::error::{AmmError, Result};
use crate::math::{amounts_for_liquidity, tick_to_sqrt_price};
use crate::store::keys::NEXT_POSITION_ID;
use crate::store::{codec, records, CacheStore};
use crate::traits::{Bank, KvStore};

/// Fee growth per unit of liquidity accrued while the price was inside
/// `[lower, upper)`.
///
/// # Errors
///
/// Store, decode and arithmetic failures.
pub fn fee_growth_inside<S: KvStore + ?Sized>(
    store: &S,
    pool: &Pool,
    lower: Tick,
    upper: Tick,
    global: &DecCoins,
) -> Result<DecCoins> {
    let lower_info = records::get_tick_info(store, pool.id, lower)?;
    let upper_info = records::get_tick_info(store, pool.id, upper)?;

    let below = if pool.current_tick >= lower {
        lower_info.fee_growth_outside
    } else {
        global.checked_sub(&lower_info.fee_growth_outside)?
    };
    let above = if pool.current_tick < upper {
        upper_info.fee_growth_outside
    } else {
        global.checked_sub(&upper_info.fee_growth_outside)?
    };
    global.checked_sub(&below)?.checked_sub(&above)
}

/// Applies a signed liquidity change to one bound of a range.
///
/// A tick seen for the first time starts with all growth so far counted
/// as below it when it is at or below the current tick.  A tick whose
/// gross liquidity drops to zero is deleted.
fn update_tick<S: KvStore + ?Sized>(
    store: &mut S,
    pool: &Pool,
    tick: Tick,
    liquidity_delta: Dec,
    upper: bool,
    global: &DecCoins,
) -> Result<()> {
    let mut info = if records::has_tick(store, pool.id, tick)? {
        records::get_tick_info(store, pool.id, tick)?
    } else {
        let mut fresh = TickInfo::default();
        if tick <= pool.current_tick {
            fresh.fee_growth_outside = global.clone();
        }
        fresh
    };

    info.liquidity_gross = info.liquidity_gross.checked_add(&liquidity_delta)?;
    if info.liquidity_gross.is_negative() {
        return Err(AmmError::Underflow("tick gross liquidity"));
    }
    info.liquidity_net = if upper {
        info.liquidity_net.checked_sub(&liquidity_delta)?
    } else {
        info.liquidity_net.checked_add(&liquidity_delta)?
    };

    trace!(pool_id = pool.id, tick = tick.get(), gross = %info.liquidity_gross, net = %info.liquidity_net, "tick updated");
    if info.liquidity_gross.is_zero() {
        records::delete_tick(store, pool.id, tick)
    } else {
        records::set_tick_info(store, pool.id, tick, &info)
    }
}

/// Moves the position's baseline so the accumulator settles exactly the
/// growth inside its range since the last touch.  Returns the growth
/// inside now.
fn prepare_fee_accrual<S: KvStore + ?Sized>(
    store: &mut S,
    pool: &Pool,
    position: &LiquidityPosition,
    global: &DecCoins,
) -> Result<DecCoins> {
    let accum_name = pool.fee_accumulator_name();
    let name = position.accumulator_position_name();
    let inside_now = fee_growth_inside(store, pool, position.lower_tick, position.upper_tick, global)?;
    let inside_last = accumulator::get_position(store, &accum_name, &name)?.accum_value_per_share;
    let baseline = inside_last.checked_add(&global.checked_sub(&inside_now)?)?;
    accumulator::set_position_interval(store, &accum_name, &name, &baseline)?;
    Ok(inside_now)
}

/// Claims the position's fees and queues their payout.  The dust is
/// credited back while the position still exists.
fn claim_fees<S: KvStore + ?Sized>(
    store: &mut S,
    pool: &Pool,
    position: &LiquidityPosition,
    transfers: &mut TransferBatch,
) -> Result<Vec<Coin>> {
    let accum_name = pool.fee_accumulator_name();
    let name = position.accumulator_position_name();
    let (whole, dust) = accumulator::claim_rewards(store, &accum_name, &name)?;
    if !dust.is_zero() && accumulator::has_position(store, &accum_name, &name)? {
        accumulator::add_to_unclaimed_rewards(store, &accum_name, &name, &dust)?;
    }
    for coin in &whole {
        transfers.push(&pool.fees_address(), &position.owner, coin.clone());
    }
    Ok(whole)
}

fn range_amounts(pool: &Pool, position: &LiquidityPosition, liquidity: Dec, rounding: Rounding) -> Result<(Dec, Dec)> {
    let lower = tick_to_sqrt_price(position.lower_tick, &pool.tick_params)?;
    let upper = tick_to_sqrt_price(position.upper_tick, &pool.tick_params)?;
    amounts_for_liquidity(pool.current_sqrt_price, lower, upper, liquidity, rounding)
}

fn owned_position<S: KvStore + ?Sized>(store: &S, owner: &Address, position_id: u64) -> Result<LiquidityPosition> {
    let position = records::get_position(store, position_id)?;
    if position.owner != *owner {
        return Err(AmmError::Unauthorized(position_id));
    }
    Ok(position)
}

/// Outcome of a deposit or withdrawal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PositionChange {
    /// Position affected.
    pub position_id: u64,
    /// Base tokens moved.
    pub amount_base: u128,
    /// Quote tokens moved.
    pub amount_quote: u128,
    /// Fees paid out alongside, if any.
    pub fees: Vec<Coin>,
}

impl<S: KvStore, B: Bank> Keeper<S, B> {
    /// Deposits `liquidity` over `[lower, upper)` in pool `pool_id`.
    ///
    /// The owner pays the base and quote amounts the range needs at the
    /// current price, rounded up.
    ///
    /// # Errors
    ///
    /// - [`AmmError::PoolNotFound`] if the pool does not exist.
    /// - [`AmmError::InvalidTickRange`] if the bounds are unordered or not
    ///   multiples of the tick spacing.
    /// - [`AmmError::InvalidTick`] if a bound is outside the tick grid.
    /// - [`AmmError::InvalidQuantity`] if `liquidity` is not positive.
    /// - [`AmmError::Bank`] if the owner cannot pay.
    pub fn create_position(
        &mut self,
        owner: &Address,
        pool_id: u64,
        lower: Tick,
        upper: Tick,
        liquidity: Dec,
    ) -> Result<PositionChange> {
        let mut cache = CacheStore::new(&self.store);
        let mut pool = records::get_pool(&cache, pool_id)?;
        let spacing = pool.tick_params.tick_spacing();
        if !lower.is_aligned(spacing) || !upper.is_aligned(spacing) {
            return Err(AmmError::InvalidTickRange("ticks must be aligned to tick spacing"));
        }
        if !pool.tick_params.contains(lower) || !pool.tick_params.contains(upper) {
            return Err(AmmError::InvalidTick("range bound outside the tick grid"));
        }
        let id = codec::next_id(&mut cache, NEXT_POSITION_ID)?;
        let position = LiquidityPosition::new(id, pool_id, owner.clone(), lower, upper, liquidity)?;

        let accum_name = pool.fee_accumulator_name();
        let global = accumulator::get_accumulator(&cache, &accum_name)?.accum_value;
        update_tick(&mut cache, &pool, lower, liquidity, false, &global)?;
        update_tick(&mut cache, &pool, upper, liquidity, true, &global)?;
        if position.is_in_range(pool.current_tick) {
            pool.current_tick_liquidity = pool.current_tick_liquidity.checked_add(&liquidity)?;
        }

        let inside = fee_growth_inside(&cache, &pool, lower, upper, &global)?;
        accumulator::new_position_interval(
            &mut cache,
            &accum_name,
            &position.accumulator_position_name(),
            liquidity,
            &inside,
        )?;

        let (base, quote) = range_amounts(&pool, &position, liquidity, Rounding::Up)?;
        let (amount_base, amount_quote) = (base.ceil_u128()?, quote.ceil_u128()?);
        let mut transfers = TransferBatch::new();
        transfers.push(owner, &pool.address(), Coin::new(pool.denom_base.clone(), amount_base));
        transfers.push(owner, &pool.address(), Coin::new(pool.denom_quote.clone(), amount_quote));

        records::set_position(&mut cache, &position)?;
        records::set_pool(&mut cache, &pool)?;

        let writes = cache.into_batch();
        self.finish(writes, &transfers)?;
        debug!(
            pool_id,
            position_id = id,
            %owner,
            lower = lower.get(),
            upper = upper.get(),
            %liquidity,
            amount_base,
            amount_quote,
            "position created"
        );
        Ok(PositionChange {
            position_id: id,
            amount_base,
            amount_quote,
            fees: Vec::new(),
        })
    }

    /// Withdraws `liquidity` from position `position_id`.
    ///
    /// The owner receives the range's amounts rounded down.  Withdrawing
    /// everything also pays out the position's fees and deletes it.
    ///
    /// # Errors
    ///
    /// - [`AmmError::PositionNotFound`] if the position does not exist.
    /// - [`AmmError::Unauthorized`] if `owner` does not own it.
    /// - [`AmmError::InvalidQuantity`] if `liquidity` is not positive.
    /// - [`AmmError::InsufficientShares`] if it exceeds the position's.
    pub fn withdraw_position(&mut self, owner: &Address, position_id: u64, liquidity: Dec) -> Result<PositionChange> {
        let mut cache = CacheStore::new(&self.store);
        let mut position = owned_position(&cache, owner, position_id)?;
        if !liquidity.is_positive() {
            return Err(AmmError::InvalidQuantity("withdrawn liquidity must be positive"));
        }
        if liquidity > position.liquidity {
            return Err(AmmError::InsufficientShares {
                requested: liquidity,
                held: position.liquidity,
            });
        }
        let mut pool = records::get_pool(&cache, position.pool_id)?;
        let accum_name = pool.fee_accumulator_name();
        let name = position.accumulator_position_name();
        let global = accumulator::get_accumulator(&cache, &accum_name)?.accum_value;

        let inside = prepare_fee_accrual(&mut cache, &pool, &position, &global)?;
        accumulator::remove_from_position_interval(&mut cache, &accum_name, &name, liquidity, &inside)?;

        let mut transfers = TransferBatch::new();
        let (base, quote) = range_amounts(&pool, &position, liquidity, Rounding::Down)?;
        let (amount_base, amount_quote) = (base.floor_u128()?, quote.floor_u128()?);
        transfers.push(&pool.address(), owner, Coin::new(pool.denom_base.clone(), amount_base));
        transfers.push(&pool.address(), owner, Coin::new(pool.denom_quote.clone(), amount_quote));

        let removed = liquidity.checked_neg()?;
        update_tick(&mut cache, &pool, position.lower_tick, removed, false, &global)?;
        update_tick(&mut cache, &pool, position.upper_tick, removed, true, &global)?;
        if position.is_in_range(pool.current_tick) {
            pool.current_tick_liquidity = pool.current_tick_liquidity.checked_sub(&liquidity)?;
        }

        position.liquidity = position.liquidity.checked_sub(&liquidity)?;
        let fees = if position.liquidity.is_zero() {
            let fees = if accumulator::has_position(&cache, &accum_name, &name)? {
                claim_fees(&mut cache, &pool, &position, &mut transfers)?
            } else {
                Vec::new()
            };
            records::delete_position(&mut cache, position_id)?;
            fees
        } else {
            records::set_position(&mut cache, &position)?;
            Vec::new()
        };
        records::set_pool(&mut cache, &pool)?;

        let writes = cache.into_batch();
        self.finish(writes, &transfers)?;
        debug!(
            position_id,
            %owner,
            %liquidity,
            amount_base,
            amount_quote,
            closed = position.liquidity.is_zero(),
            "liquidity withdrawn"
        );
        Ok(PositionChange {
            position_id,
            amount_base,
            amount_quote,
            fees,
        })
    }

    /// Pays out the whole units of fees earned by position `position_id`.
    /// Fractional remainders stay with the position.
    ///
    /// # Errors
    ///
    /// - [`AmmError::PositionNotFound`] if the position does not exist.
    /// - [`AmmError::Unauthorized`] if `owner` does not own it.
    pub fn collect_fees(&mut self, owner: &Address, position_id: u64) -> Result<Vec<Coin>> {
        let mut cache = CacheStore::new(&self.store);
        let position = owned_position(&cache, owner, position_id)?;
        let pool = records::get_pool(&cache, position.pool_id)?;
        let accum_name = pool.fee_accumulator_name();
        let global = accumulator::get_accumulator(&cache, &accum_name)?.accum_value;

        let inside = prepare_fee_accrual(&mut cache, &pool, &position, &global)?;
        let mut transfers = TransferBatch::new();
        let fees = claim_fees(&mut cache, &pool, &position, &mut transfers)?;
        accumulator::set_position_interval(&mut cache, &accum_name, &position.accumulator_position_name(), &inside)?;

        let writes = cache.into_batch();
        self.finish(writes, &transfers)?;
        debug!(position_id, %owner, denoms = fees.len(), "fees collected");
        Ok(fees)
    }
}
