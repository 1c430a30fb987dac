//! The swap state machine.
//!
//! A swap walks the pool's initialized ticks in the direction of travel,
//! one liquidity bucket at a time:
//!
//! 1. The next initialized tick (or the price limit, if nearer) becomes the
//!    bucket's target.
//! 2. The [`SwapStrategy`] computes how far the price moves toward it and
//!    what is paid, received and charged as fee.
//! 3. The fee is booked as growth per unit of the bucket's liquidity.
//! 4. Reaching the tick's price crosses it: the tick's fee checkpoint is
//!    flipped and its net liquidity applied.  Stopping inside the bucket
//!    recomputes the current tick from the price.
//!
//! The loop ends when the fixed amount is used up or the price limit is
//! reached.  Running out of ticks first is an error, and so is a run of
//! more than [`SWAP_NO_PROGRESS_LIMIT`] buckets that consume nothing.
//!
//! Nothing here moves tokens; the caller settles the returned
//! [`SwapResult`].  With `update_accumulators` set the computation writes
//! tick checkpoints and the pool's fee accumulator into the given store, so
//! quotes run against a throwaway [`CacheStore`](crate::store::CacheStore).

mod state;

pub use state::{SwapKind, SwapState};

use tracing::{debug, error, trace};

use crate::accumulator;
use crate::domain::{Coin, Dec, DecCoins, Pool, PoolUpdates, SwapResult, Tick, TickInfo};
use crate::error::{AmmError, Result};
use crate::math::{sqrt_price_to_tick, tick_to_sqrt_price};
use crate::store::records;
use crate::strategy::{get_sqrt_price_limit, new_strategy, TickIterator};
use crate::traits::{BucketSwap, KvStore, SwapStrategy};

/// Consecutive zero-consumption buckets tolerated before a swap gives up.
pub const SWAP_NO_PROGRESS_LIMIT: u32 = 100;

// -- Setup --------------------------------------------------------------------

/// Checks that both denominations belong to the pool and differ.
///
/// # Errors
///
/// [`AmmError::InvalidOutDenom`], [`AmmError::InvalidInDenom`] and
/// [`AmmError::DenomDuplication`], checked in that order.
pub fn check_denom_validity(denom_in: &str, denom_out: &str, pool: &Pool) -> Result<()> {
    if !pool.has_denom(denom_out) {
        return Err(AmmError::InvalidOutDenom);
    }
    if !pool.has_denom(denom_in) {
        return Err(AmmError::InvalidInDenom);
    }
    if denom_in == denom_out {
        return Err(AmmError::DenomDuplication);
    }
    Ok(())
}

/// Loads a pool that has liquidity to swap against.
///
/// # Errors
///
/// - [`AmmError::PoolNotFound`] if the pool does not exist.
/// - [`AmmError::EmptyLiquidity`] if it has no initialized tick.
pub fn get_pool_for_swap<S: KvStore + ?Sized>(store: &S, pool_id: u64) -> Result<Pool> {
    let pool = records::get_pool(store, pool_id)?;
    if !records::has_initialized_ticks(store, pool_id)? {
        return Err(AmmError::EmptyLiquidity(pool_id));
    }
    Ok(pool)
}

/// Builds the strategy for paying `denom_in` into `pool`.
///
/// # Errors
///
/// [`AmmError::InvalidPriceLimit`] if the limit is negative or lies
/// behind the current price.
pub fn setup_swap_strategy(pool: &Pool, denom_in: &str, price_limit: Option<Dec>) -> Result<Box<dyn SwapStrategy>> {
    let base_for_quote = denom_in == pool.denom_base;
    let sqrt_price_limit = get_sqrt_price_limit(price_limit, base_for_quote)?;
    let strategy = new_strategy(base_for_quote, sqrt_price_limit, pool.fee_rate);
    strategy.validate_sqrt_price(sqrt_price_limit, pool.current_sqrt_price)?;
    Ok(strategy)
}

// -- Entry points ---------------------------------------------------------------

/// Computes the output of paying exactly `token_in` into pool `pool_id`.
///
/// # Errors
///
/// Setup errors (see [`check_denom_validity`], [`get_pool_for_swap`],
/// [`setup_swap_strategy`]) and everything [`compute_swap`] returns.
pub fn compute_out_amt_given_in<S: KvStore>(
    store: &mut S,
    pool_id: u64,
    token_in: &Coin,
    denom_out: &str,
    price_limit: Option<Dec>,
    update_accumulators: bool,
) -> Result<(SwapResult, PoolUpdates)> {
    let pool = get_pool_for_swap(store, pool_id)?;
    check_denom_validity(&token_in.denom, denom_out, &pool)?;
    let strategy = setup_swap_strategy(&pool, &token_in.denom, price_limit)?;
    compute_swap(
        store,
        &pool,
        SwapKind::ExactIn,
        token_in.amount,
        &token_in.denom,
        strategy.as_ref(),
        update_accumulators,
    )
}

/// Computes the input needed to receive exactly `token_out` from pool
/// `pool_id`.
///
/// # Errors
///
/// Same as [`compute_out_amt_given_in`].
pub fn compute_in_amt_given_out<S: KvStore>(
    store: &mut S,
    pool_id: u64,
    token_out: &Coin,
    denom_in: &str,
    price_limit: Option<Dec>,
    update_accumulators: bool,
) -> Result<(SwapResult, PoolUpdates)> {
    let pool = get_pool_for_swap(store, pool_id)?;
    check_denom_validity(denom_in, &token_out.denom, &pool)?;
    let strategy = setup_swap_strategy(&pool, denom_in, price_limit)?;
    compute_swap(
        store,
        &pool,
        SwapKind::ExactOut,
        token_out.amount,
        denom_in,
        strategy.as_ref(),
        update_accumulators,
    )
}

// -- The loop ---------------------------------------------------------------------

/// Runs the swap loop for `pool` with an explicit strategy.
///
/// `specified` is the fixed amount: the input (fees included) for
/// [`SwapKind::ExactIn`], the output for [`SwapKind::ExactOut`].
///
/// # Errors
///
/// - [`AmmError::RanOutOfTicks`] if liquidity runs out before the amount.
/// - [`AmmError::RanOutOfIterations`] after more than
///   [`SWAP_NO_PROGRESS_LIMIT`] buckets that consume nothing.
/// - [`AmmError::NoSqrtPriceMovement`], [`AmmError::InvalidComputedSqrtPrice`]
///   and [`AmmError::OverCharge`] if the strategy breaks its contract.
/// - Store, decode and arithmetic failures.
pub fn compute_swap<S: KvStore>(
    store: &mut S,
    pool: &Pool,
    kind: SwapKind,
    specified: u128,
    denom_in: &str,
    strategy: &dyn SwapStrategy,
    update_accumulators: bool,
) -> Result<(SwapResult, PoolUpdates)> {
    let specified = Dec::from_int(specified)?;
    let mut fee_accumulator = if update_accumulators {
        Some(accumulator::get_accumulator(store, &pool.fee_accumulator_name())?)
    } else {
        None
    };
    let sqrt_price_limit = strategy.sqrt_price_limit();
    let mut state = SwapState::new(specified, pool);
    debug!(
        pool_id = pool.id,
        ?kind,
        %specified,
        denom_in,
        base_for_quote = strategy.is_base_for_quote(),
        "swap started"
    );

    let mut iter = strategy.next_tick_iterator(&*store, pool.id, state.tick)?;
    let mut no_progress = 0u32;
    while state.amount_specified_remaining.is_positive() && state.sqrt_price != sqrt_price_limit {
        let sqrt_price_start = state.sqrt_price;
        let (next_tick, next_tick_sqrt_price, target) = next_target(&iter, pool, strategy)?;

        let bucket = match kind {
            SwapKind::ExactIn => strategy.compute_swap_within_bucket_out_given_in(
                state.sqrt_price,
                target,
                state.liquidity,
                state.amount_specified_remaining,
            )?,
            SwapKind::ExactOut => strategy.compute_swap_within_bucket_in_given_out(
                state.sqrt_price,
                target,
                state.liquidity,
                state.amount_specified_remaining,
            )?,
        };
        trace!(
            tick = next_tick.get(),
            sqrt_price = %bucket.sqrt_price_next,
            amount_in = %bucket.amount_in,
            amount_out = %bucket.amount_out,
            fee = %bucket.fee_charge,
            liquidity = %state.liquidity,
            "bucket computed"
        );
        validate_progress(sqrt_price_start, &bucket)?;

        state.record_fee(bucket.fee_charge)?;
        state.sqrt_price = bucket.sqrt_price_next;
        state.record_amounts(kind, bucket.amount_in, bucket.amount_out, bucket.fee_charge)?;

        if reached_tick(strategy, next_tick_sqrt_price, bucket.sqrt_price_next)? {
            let mut info = iter.tick_info()?;
            if let Some(accum) = fee_accumulator.as_ref() {
                let global = accum
                    .accum_value
                    .checked_add(&DecCoins::from_coin(denom_in, state.fee_growth_per_unit_liquidity))?;
                cross_fee_growth(&mut info, &global)?;
                records::set_tick_info(store, pool.id, next_tick, &info)?;
            }
            cross_tick(&mut state, strategy, next_tick, &info, &mut iter)?;
        } else if bucket.sqrt_price_next != sqrt_price_start {
            state.tick = sqrt_price_to_tick(bucket.sqrt_price_next, &pool.tick_params)?;
        }

        let consumed = match kind {
            SwapKind::ExactIn => bucket.amount_in,
            SwapKind::ExactOut => bucket.amount_out,
        };
        if consumed.is_zero() {
            if no_progress >= SWAP_NO_PROGRESS_LIMIT {
                debug!(pool_id = pool.id, "swap made no progress");
                return Err(AmmError::RanOutOfIterations);
            }
            no_progress += 1;
        }
    }
    iter.close();

    if state.amount_specified_remaining.is_negative() {
        error!(
            pool_id = pool.id,
            remaining = %state.amount_specified_remaining,
            "swap over-charged the specified amount"
        );
        return Err(AmmError::OverCharge(state.amount_specified_remaining.abs()));
    }

    if let Some(accum) = fee_accumulator.as_mut() {
        let growth = DecCoins::from_coin(denom_in, state.fee_growth_per_unit_liquidity);
        accumulator::add_to_accumulator(store, accum, &growth)?;
    }

    let done = specified.checked_sub(&state.amount_specified_remaining)?;
    let (amount_in, amount_out) = match kind {
        SwapKind::ExactIn => (done.ceil_u128()?, state.amount_calculated.floor_u128()?),
        SwapKind::ExactOut => (state.amount_calculated.ceil_u128()?, done.floor_u128()?),
    };
    let result = SwapResult {
        amount_in,
        amount_out,
        fees: state.fee_total,
    };
    let updates = PoolUpdates {
        new_current_tick: state.tick,
        new_liquidity: state.liquidity,
        new_sqrt_price: state.sqrt_price,
    };
    debug!(pool_id = pool.id, %result, tick = state.tick.get(), "swap computed");
    Ok((result, updates))
}

/// Largest input that crosses at most `max_ticks` initialized ticks.
///
/// Runs the exact-output loop against the pool's whole `denom_out` reserve
/// (`reserve_out`) and stops after `max_ticks` buckets, at the last
/// initialized tick, or at a bucket that yields nothing.  Returns the input
/// needed (rounded up) and the output it buys (rounded down).  Reads only.
///
/// # Errors
///
/// - [`AmmError::PoolNotFound`] and [`AmmError::EmptyLiquidity`].
/// - [`AmmError::InvalidInDenom`] if `denom_in` is not in the pool.
/// - [`AmmError::InvalidComputedSqrtPrice`] if the strategy overshoots.
pub fn compute_max_in_amt_given_max_ticks_crossed<S: KvStore>(
    store: &S,
    pool_id: u64,
    denom_in: &str,
    max_ticks: u64,
    reserve_out: u128,
) -> Result<(Coin, Coin)> {
    let pool = get_pool_for_swap(store, pool_id)?;
    if !pool.has_denom(denom_in) {
        return Err(AmmError::InvalidInDenom);
    }
    let denom_out = if denom_in == pool.denom_base {
        &pool.denom_quote
    } else {
        &pool.denom_base
    };
    let strategy = setup_swap_strategy(&pool, denom_in, None)?;
    let mut state = SwapState::new(Dec::from_int(reserve_out)?, &pool);
    let mut total_out = Dec::ZERO;

    let mut iter = strategy.next_tick_iterator(store, pool_id, state.tick)?;
    for _ in 0..max_ticks {
        if !iter.valid() {
            break;
        }
        let sqrt_price_start = state.sqrt_price;
        let (next_tick, next_tick_sqrt_price, target) = next_target(&iter, &pool, strategy.as_ref())?;
        let bucket = strategy.compute_swap_within_bucket_in_given_out(
            state.sqrt_price,
            target,
            state.liquidity,
            state.amount_specified_remaining,
        )?;
        state.sqrt_price = bucket.sqrt_price_next;
        state.record_amounts(SwapKind::ExactOut, bucket.amount_in, bucket.amount_out, bucket.fee_charge)?;
        total_out = total_out.checked_add(&bucket.amount_out)?;

        if reached_tick(strategy.as_ref(), next_tick_sqrt_price, bucket.sqrt_price_next)? {
            let info = iter.tick_info()?;
            cross_tick(&mut state, strategy.as_ref(), next_tick, &info, &mut iter)?;
        } else if bucket.sqrt_price_next != sqrt_price_start {
            state.tick = sqrt_price_to_tick(bucket.sqrt_price_next, &pool.tick_params)?;
        }

        if bucket.amount_out.is_zero() {
            break;
        }
    }
    iter.close();

    let max_in = Coin::new(denom_in, state.amount_calculated.ceil_u128()?);
    let out = Coin::new(denom_out.clone(), total_out.floor_u128()?);
    debug!(pool_id, max_ticks, %max_in, %out, "max input for tick budget computed");
    Ok((max_in, out))
}

// -- Helpers ------------------------------------------------------------------------

fn next_target(iter: &TickIterator, pool: &Pool, strategy: &dyn SwapStrategy) -> Result<(Tick, Dec, Dec)> {
    if !iter.valid() {
        return Err(AmmError::RanOutOfTicks);
    }
    let tick = iter.tick()?;
    let tick_sqrt_price = tick_to_sqrt_price(tick, &pool.tick_params)?;
    Ok((tick, tick_sqrt_price, strategy.sqrt_target_price(tick_sqrt_price)))
}

fn validate_progress(sqrt_price_start: Dec, bucket: &BucketSwap) -> Result<()> {
    if bucket.sqrt_price_next == sqrt_price_start && !(bucket.amount_in.is_zero() && bucket.amount_out.is_zero()) {
        error!(
            sqrt_price = %sqrt_price_start,
            amount_in = %bucket.amount_in,
            amount_out = %bucket.amount_out,
            "amount consumed without price movement"
        );
        return Err(AmmError::NoSqrtPriceMovement);
    }
    Ok(())
}

/// `true` if the bucket ended exactly on the tick's price.
fn reached_tick(strategy: &dyn SwapStrategy, tick_sqrt_price: Dec, computed: Dec) -> Result<bool> {
    if tick_sqrt_price == computed {
        return Ok(true);
    }
    let overshot = if strategy.is_base_for_quote() {
        tick_sqrt_price > computed
    } else {
        tick_sqrt_price < computed
    };
    if overshot {
        error!(tick_sqrt_price = %tick_sqrt_price, computed = %computed, "price moved past the next tick");
        return Err(AmmError::InvalidComputedSqrtPrice);
    }
    Ok(false)
}

/// Flips a tick's fee checkpoint to the other side of the price:
/// `outside = global − outside`.
pub(crate) fn cross_fee_growth(info: &mut TickInfo, global: &DecCoins) -> Result<()> {
    info.fee_growth_outside = global.checked_sub(&info.fee_growth_outside)?;
    Ok(())
}

fn cross_tick(
    state: &mut SwapState,
    strategy: &dyn SwapStrategy,
    tick: Tick,
    info: &TickInfo,
    iter: &mut TickIterator,
) -> Result<()> {
    iter.next();
    let delta = strategy.set_liquidity_delta_sign(info.liquidity_net)?;
    state.liquidity = state.liquidity.checked_add(&delta)?;
    state.tick = strategy.next_tick_after_crossing(tick);
    trace!(tick = tick.get(), liquidity = %state.liquidity, "tick crossed");
    Ok(())
}
