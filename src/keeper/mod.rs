//! Committing entry points over a store and a bank.
//!
//! [`Keeper`] owns the two collaborators and exposes every state-changing
//! operation of the engine:
//!
//! | Area | Operations |
//! |------|------------|
//! | Pools | [`create_pool`](Keeper::create_pool), [`get_pool`](Keeper::get_pool) |
//! | Positions | [`create_position`](Keeper::create_position), [`withdraw_position`](Keeper::withdraw_position), [`collect_fees`](Keeper::collect_fees) |
//! | Swaps | [`swap_exact_amount_in`](Keeper::swap_exact_amount_in), [`swap_exact_amount_out`](Keeper::swap_exact_amount_out) |
//! | Quotes | [`calculate_result_exact_amount_in`](Keeper::calculate_result_exact_amount_in), [`calculate_result_exact_amount_out`](Keeper::calculate_result_exact_amount_out), [`compute_max_in_amt_given_max_ticks_crossed`](Keeper::compute_max_in_amt_given_max_ticks_crossed) |
//! | Gauges | `create_gauge`, `stake`, `unstake`, `distribute`, `collect_incentive_rewards` (feature `incentive`) |
//!
//! Every operation computes against a [`CacheStore`] overlay.  Token
//! transfers run only once all store writes are buffered, and the buffered
//! writes reach the committed store only after every transfer succeeded.
//! Quotes drop the overlay instead.

#[cfg(feature = "incentive")]
mod incentive;
mod position;
#[cfg(test)]
mod proptest_properties;
mod swap;
mod transfer;

pub use position::{fee_growth_inside, PositionChange};
pub use swap::update_pool_for_swap;
pub use transfer::TransferBatch;

use tracing::{debug, error};

use crate::accumulator;
use crate::config::PoolConfig;
use crate::domain::{Dec, LiquidityPosition, Pool};
use crate::error::Result;
use crate::store::keys::NEXT_POOL_ID;
use crate::store::{codec, records, CacheStore};
use crate::traits::{Bank, KvStore, WriteBatch};

/// Engine state: a key-value store for records and a bank for balances.
///
/// # Examples
///
/// ```
/// use clmm_engine::bank::MemBank;
/// use clmm_engine::config::PoolConfig;
/// use clmm_engine::domain::{Dec, TickParams};
/// use clmm_engine::keeper::Keeper;
/// use clmm_engine::store::MemStore;
///
/// let mut keeper = Keeper::new(MemStore::new(), MemBank::new());
/// let params = TickParams::standard().expect("valid params");
/// let config = PoolConfig::new("uatom", "uusdc", Dec::ZERO, params, Dec::ONE).expect("valid");
/// let id = keeper.create_pool(&config).expect("created");
/// assert_eq!(keeper.get_pool(id).expect("stored").denom_base, "uatom");
/// ```
#[derive(Debug, Clone, Default)]
pub struct Keeper<S: KvStore, B: Bank> {
    store: S,
    bank: B,
}

impl<S: KvStore, B: Bank> Keeper<S, B> {
    /// Wraps a store and a bank.
    pub const fn new(store: S, bank: B) -> Self {
        Self { store, bank }
    }

    /// Committed store.
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Token ledger.
    pub const fn bank(&self) -> &B {
        &self.bank
    }

    /// Mutable token ledger, for funding accounts.
    pub fn bank_mut(&mut self) -> &mut B {
        &mut self.bank
    }

    /// Returns the store and the bank.
    pub fn into_parts(self) -> (S, B) {
        (self.store, self.bank)
    }

    // -- Pools ------------------------------------------------------------------

    /// Creates a pool from `config` and its fee accumulator.  Returns the
    /// new pool id.
    ///
    /// # Errors
    ///
    /// Configuration errors from [`PoolConfig::validate`] and store failures.
    pub fn create_pool(&mut self, config: &PoolConfig) -> Result<u64> {
        config.validate()?;
        let (sqrt_price, tick) = config.initial_sqrt_price_and_tick()?;

        let mut cache = CacheStore::new(&self.store);
        let id = codec::next_id(&mut cache, NEXT_POOL_ID)?;
        let pool = Pool {
            id,
            denom_base: config.denom_base().to_owned(),
            denom_quote: config.denom_quote().to_owned(),
            current_sqrt_price: sqrt_price,
            current_tick: tick,
            current_tick_liquidity: Dec::ZERO,
            fee_rate: config.fee_rate(),
            tick_params: config.tick_params(),
        };
        records::set_pool(&mut cache, &pool)?;
        accumulator::init_accumulator(&mut cache, &pool.fee_accumulator_name())?;

        let writes = cache.into_batch();
        self.finish(writes, &TransferBatch::new())?;
        debug!(
            pool_id = id,
            denom_base = %pool.denom_base,
            denom_quote = %pool.denom_quote,
            tick = tick.get(),
            "pool created"
        );
        Ok(id)
    }

    /// Loads pool `pool_id`.
    ///
    /// # Errors
    ///
    /// [`AmmError::PoolNotFound`](crate::error::AmmError::PoolNotFound) and
    /// decode failures.
    pub fn get_pool(&self, pool_id: u64) -> Result<Pool> {
        records::get_pool(&self.store, pool_id)
    }

    /// Loads liquidity position `position_id`.
    ///
    /// # Errors
    ///
    /// [`AmmError::PositionNotFound`](crate::error::AmmError::PositionNotFound)
    /// and decode failures.
    pub fn get_position(&self, position_id: u64) -> Result<LiquidityPosition> {
        records::get_position(&self.store, position_id)
    }

    // -- Commit -------------------------------------------------------------------

    /// Runs `transfers`, then applies `writes`.  A failed commit reverses the
    /// transfers.
    fn finish(&mut self, writes: WriteBatch, transfers: &TransferBatch) -> Result<()> {
        transfers.execute(&mut self.bank)?;
        if let Err(e) = writes.commit(&mut self.store) {
            error!(error = %e, "store commit failed after transfers; reversing transfers");
            transfers.revert(&mut self.bank);
            return Err(e.into());
        }
        Ok(())
    }
}
