//! Incentive gauges: staking and pro-rata reward streams.
//!
//! A gauge escrows distributed rewards at its own address and books them in
//! an accumulator as reward per staked share.  Stakers hold one accumulator
//! position each, named by their address.

use tracing::debug;

use super::{Keeper, TransferBatch};
use crate::accumulator;
use crate::domain::{gauge_accumulator_name, Address, Coin, Dec, DecCoins, Gauge, Rounding};
use crate::error::{AmmError, Result};
use crate::store::keys::gauge_key;
use crate::store::{codec, CacheStore};
use crate::traits::{Bank, KvStore};

fn load_gauge<S: KvStore + ?Sized>(store: &S, name: &str) -> Result<Gauge> {
    codec::load(store, &gauge_key(name), "gauge")?
        .ok_or_else(|| AmmError::AccumulatorNotFound(gauge_accumulator_name(name)))
}

impl<S: KvStore, B: Bank> Keeper<S, B> {
    /// Creates gauge `name`.
    ///
    /// # Errors
    ///
    /// [`AmmError::AccumulatorExists`] if the gauge already exists.
    pub fn create_gauge(&mut self, name: &str) -> Result<()> {
        let gauge = Gauge::new(name);
        let mut cache = CacheStore::new(&self.store);
        accumulator::init_accumulator(&mut cache, &gauge.accumulator_name())?;
        codec::save(&mut cache, &gauge_key(name), &gauge)?;

        let writes = cache.into_batch();
        self.finish(writes, &TransferBatch::new())?;
        debug!(gauge = name, "gauge created");
        Ok(())
    }

    /// Loads gauge `name`.
    ///
    /// # Errors
    ///
    /// [`AmmError::AccumulatorNotFound`] if the gauge does not exist.
    pub fn get_gauge(&self, name: &str) -> Result<Gauge> {
        load_gauge(&self.store, name)
    }

    /// Stakes `shares` in gauge `name` for `owner`, opening or growing the
    /// owner's position.  Rewards earned so far are kept.
    ///
    /// # Errors
    ///
    /// - [`AmmError::AccumulatorNotFound`] if the gauge does not exist.
    /// - [`AmmError::NonPositiveShares`] if `shares <= 0`.
    pub fn stake(&mut self, owner: &Address, name: &str, shares: Dec) -> Result<()> {
        let gauge = load_gauge(&self.store, name)?;
        let accum_name = gauge.accumulator_name();
        let mut cache = CacheStore::new(&self.store);
        if accumulator::has_position(&cache, &accum_name, owner.as_str())? {
            accumulator::add_to_position(&mut cache, &accum_name, owner.as_str(), shares)?;
        } else {
            accumulator::new_position(&mut cache, &accum_name, owner.as_str(), shares)?;
        }

        let writes = cache.into_batch();
        self.finish(writes, &TransferBatch::new())?;
        debug!(gauge = name, %owner, %shares, "staked");
        Ok(())
    }

    /// Unstakes `shares` from `owner`'s position in gauge `name`.  Rewards
    /// earned so far stay claimable.
    ///
    /// # Errors
    ///
    /// - [`AmmError::AccumulatorNotFound`] if the gauge does not exist.
    /// - [`AmmError::AccumPositionNotFound`] if `owner` has no stake.
    /// - [`AmmError::NonPositiveShares`] if `shares <= 0`.
    /// - [`AmmError::InsufficientShares`] if `owner` holds fewer shares.
    pub fn unstake(&mut self, owner: &Address, name: &str, shares: Dec) -> Result<()> {
        let gauge = load_gauge(&self.store, name)?;
        let mut cache = CacheStore::new(&self.store);
        accumulator::remove_from_position(&mut cache, &gauge.accumulator_name(), owner.as_str(), shares)?;

        let writes = cache.into_batch();
        self.finish(writes, &TransferBatch::new())?;
        debug!(gauge = name, %owner, %shares, "unstaked");
        Ok(())
    }

    /// Moves `coins` from `from` into the gauge's escrow and credits every
    /// staked share with its part, rounded down.
    ///
    /// # Errors
    ///
    /// - [`AmmError::AccumulatorNotFound`] if the gauge does not exist.
    /// - [`AmmError::NoStakedShares`] if nothing is staked.
    /// - [`AmmError::Bank`] if `from` cannot pay.
    pub fn distribute(&mut self, from: &Address, name: &str, coins: &[Coin]) -> Result<()> {
        let mut gauge = load_gauge(&self.store, name)?;
        let mut cache = CacheStore::new(&self.store);
        let mut accum = accumulator::get_accumulator(&cache, &gauge.accumulator_name())?;
        if !accum.total_shares.is_positive() {
            return Err(AmmError::NoStakedShares(name.to_owned()));
        }
        let amount = DecCoins::from_coins(coins)?;
        let per_share = amount.checked_quo_dec(&accum.total_shares, Rounding::Down)?;
        accumulator::add_to_accumulator(&mut cache, &mut accum, &per_share)?;
        gauge.total_distributed = gauge.total_distributed.checked_add(&amount)?;
        codec::save(&mut cache, &gauge_key(name), &gauge)?;

        let mut transfers = TransferBatch::new();
        for coin in coins {
            transfers.push(from, &gauge.address(), coin.clone());
        }
        let writes = cache.into_batch();
        self.finish(writes, &transfers)?;
        debug!(gauge = name, %from, %amount, %per_share, "rewards distributed");
        Ok(())
    }

    /// Pays out the whole units of `owner`'s rewards from gauge `name`.
    /// Fractional remainders stay with the position while it has shares.
    ///
    /// # Errors
    ///
    /// - [`AmmError::AccumulatorNotFound`] if the gauge does not exist.
    /// - [`AmmError::AccumPositionNotFound`] if `owner` has no position.
    pub fn collect_incentive_rewards(&mut self, owner: &Address, name: &str) -> Result<Vec<Coin>> {
        let gauge = load_gauge(&self.store, name)?;
        let accum_name = gauge.accumulator_name();
        let mut cache = CacheStore::new(&self.store);
        let (whole, dust) = accumulator::claim_rewards(&mut cache, &accum_name, owner.as_str())?;
        if !dust.is_zero() && accumulator::has_position(&cache, &accum_name, owner.as_str())? {
            accumulator::add_to_unclaimed_rewards(&mut cache, &accum_name, owner.as_str(), &dust)?;
        }

        let mut transfers = TransferBatch::new();
        for coin in &whole {
            transfers.push(&gauge.address(), owner, coin.clone());
        }
        let writes = cache.into_batch();
        self.finish(writes, &transfers)?;
        debug!(gauge = name, %owner, denoms = whole.len(), "incentive rewards collected");
        Ok(whole)
    }
}
