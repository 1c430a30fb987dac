//! Committing swaps, settlement and quotes.

use tracing::debug;

use super::{Keeper, TransferBatch};
use crate::domain::{Address, Coin, Dec, PoolUpdates, SwapDetails, SwapResult};
use crate::error::{AmmError, Result};
use crate::store::{records, CacheStore};
use crate::swap;
use crate::traits::{Bank, KvStore};

/// Persists the pool's post-swap state into `store` and returns the
/// settlement transfers:
///
/// 1. `token_in - fee` from the sender to the pool,
/// 2. the fee, rounded up, from the sender to the pool's fee account,
/// 3. `token_out` from the pool to the sender.
///
/// # Errors
///
/// - [`AmmError::PoolNotFound`] if the pool does not exist.
/// - [`AmmError::Underflow`] if the fee exceeds `token_in`.
/// - [`AmmError::InvalidPrice`] and [`AmmError::Underflow`] from
///   [`Pool::apply_swap`](crate::domain::Pool::apply_swap).
pub fn update_pool_for_swap<S: KvStore + ?Sized>(
    store: &mut S,
    pool_id: u64,
    details: &SwapDetails,
    updates: &PoolUpdates,
    result: &SwapResult,
) -> Result<TransferBatch> {
    let mut pool = records::get_pool(store, pool_id)?;
    let fee = result.fee_rounded_up()?;
    let net_in = details
        .token_in
        .amount
        .checked_sub(fee)
        .ok_or(AmmError::Underflow("swap fee exceeds the input"))?;

    let mut transfers = TransferBatch::new();
    transfers.push(&details.sender, &pool.address(), Coin::new(details.token_in.denom.clone(), net_in));
    transfers.push(&details.sender, &pool.fees_address(), Coin::new(details.token_in.denom.clone(), fee));
    transfers.push(&pool.address(), &details.sender, details.token_out.clone());

    pool.apply_swap(updates.new_liquidity, updates.new_current_tick, updates.new_sqrt_price)?;
    records::set_pool(store, &pool)?;
    Ok(transfers)
}

impl<S: KvStore, B: Bank> Keeper<S, B> {
    /// Pays `token_in` into pool `pool_id` for as much `denom_out` as it
    /// buys, stopping early at `price_limit` if given.
    ///
    /// # Errors
    ///
    /// - [`AmmError::DenomDuplication`], [`AmmError::InvalidInDenom`] and
    ///   [`AmmError::InvalidOutDenom`] for bad denominations.
    /// - [`AmmError::UnexpectedCalcAmount`] if nothing would be paid out.
    /// - Everything [`swap::compute_out_amt_given_in`] returns.
    /// - [`AmmError::Bank`] if a settlement transfer fails; the pool is
    ///   left unchanged.
    pub fn swap_exact_amount_in(
        &mut self,
        sender: &Address,
        pool_id: u64,
        token_in: &Coin,
        denom_out: &str,
        price_limit: Option<Dec>,
    ) -> Result<SwapResult> {
        if token_in.denom == denom_out {
            return Err(AmmError::DenomDuplication);
        }
        let mut cache = CacheStore::new(&self.store);
        let (result, updates) =
            swap::compute_out_amt_given_in(&mut cache, pool_id, token_in, denom_out, price_limit, true)?;
        if result.amount_in == 0 || result.amount_out == 0 {
            return Err(AmmError::UnexpectedCalcAmount);
        }
        let details = SwapDetails {
            sender: sender.clone(),
            token_in: Coin::new(token_in.denom.clone(), result.amount_in),
            token_out: Coin::new(denom_out, result.amount_out),
        };
        let transfers = update_pool_for_swap(&mut cache, pool_id, &details, &updates, &result)?;

        let writes = cache.into_batch();
        self.finish(writes, &transfers)?;
        debug!(pool_id, %sender, token_in = %details.token_in, token_out = %details.token_out, "swapped exact in");
        Ok(result)
    }

    /// Receives exactly `token_out` from pool `pool_id`, paying whatever
    /// `denom_in` it costs.
    ///
    /// # Errors
    ///
    /// Same as [`Keeper::swap_exact_amount_in`].
    pub fn swap_exact_amount_out(
        &mut self,
        sender: &Address,
        pool_id: u64,
        denom_in: &str,
        token_out: &Coin,
        price_limit: Option<Dec>,
    ) -> Result<SwapResult> {
        if token_out.denom == denom_in {
            return Err(AmmError::DenomDuplication);
        }
        let mut cache = CacheStore::new(&self.store);
        let (result, updates) =
            swap::compute_in_amt_given_out(&mut cache, pool_id, token_out, denom_in, price_limit, true)?;
        if result.amount_in == 0 || result.amount_out == 0 {
            return Err(AmmError::UnexpectedCalcAmount);
        }
        let details = SwapDetails {
            sender: sender.clone(),
            token_in: Coin::new(denom_in, result.amount_in),
            token_out: Coin::new(token_out.denom.clone(), result.amount_out),
        };
        let transfers = update_pool_for_swap(&mut cache, pool_id, &details, &updates, &result)?;

        let writes = cache.into_batch();
        self.finish(writes, &transfers)?;
        debug!(pool_id, %sender, token_in = %details.token_in, token_out = %details.token_out, "swapped exact out");
        Ok(result)
    }

    // -- Quotes -------------------------------------------------------------------

    /// Quotes [`Keeper::swap_exact_amount_in`] without a price limit.
    /// Nothing is written.
    ///
    /// # Errors
    ///
    /// Same as [`swap::compute_out_amt_given_in`].
    pub fn calculate_result_exact_amount_in(&self, pool_id: u64, token_in: &Coin, denom_out: &str) -> Result<SwapResult> {
        let mut cache = CacheStore::new(&self.store);
        let (result, _) = swap::compute_out_amt_given_in(&mut cache, pool_id, token_in, denom_out, None, false)?;
        Ok(result)
    }

    /// Quotes [`Keeper::swap_exact_amount_out`] without a price limit.
    /// Nothing is written.
    ///
    /// # Errors
    ///
    /// Same as [`swap::compute_in_amt_given_out`].
    pub fn calculate_result_exact_amount_out(&self, pool_id: u64, denom_in: &str, token_out: &Coin) -> Result<SwapResult> {
        let mut cache = CacheStore::new(&self.store);
        let (result, _) = swap::compute_in_amt_given_out(&mut cache, pool_id, token_out, denom_in, None, false)?;
        Ok(result)
    }

    /// Largest `denom_in` amount that crosses at most `max_ticks`
    /// initialized ticks, and the output it buys.  The pool's reserve of the
    /// other denomination caps the output.
    ///
    /// # Errors
    ///
    /// Same as [`swap::compute_max_in_amt_given_max_ticks_crossed`].
    pub fn compute_max_in_amt_given_max_ticks_crossed(
        &self,
        pool_id: u64,
        denom_in: &str,
        max_ticks: u64,
    ) -> Result<(Coin, Coin)> {
        let pool = records::get_pool(&self.store, pool_id)?;
        let denom_out = if denom_in == pool.denom_base {
            &pool.denom_quote
        } else {
            &pool.denom_base
        };
        let reserve_out = self.bank.balance(&pool.address(), denom_out);
        let cache = CacheStore::new(&self.store);
        swap::compute_max_in_amt_given_max_ticks_crossed(&cache, pool_id, denom_in, max_ticks, reserve_out)
    }
}
