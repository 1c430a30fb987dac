//! # CLMM Engine
//!
//! Concentrated-liquidity swap engine with a generic fee and reward
//! accumulator.
//!
//! Liquidity providers deposit over tick ranges; traders swap exact inputs
//! or exact outputs through the pool's initialized ticks; swap fees are
//! booked as growth per unit of liquidity and paid out through a
//! share-based accumulator that also backs incentive gauges.
//!
//! The engine keeps no state of its own.  Records live in a caller-supplied
//! [`KvStore`](traits::KvStore) and balances in a caller-supplied
//! [`Bank`](traits::Bank); [`store::MemStore`] and [`bank::MemBank`] are
//! in-memory implementations of both.
//!
//! # Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `incentive` | yes | Incentive gauges on top of the reward accumulator |
//!
//! # Quick Start
//!
//! ```rust
//! use clmm_engine::bank::MemBank;
//! use clmm_engine::config::PoolConfig;
//! use clmm_engine::domain::{Address, Coin, Dec, Tick, TickParams};
//! use clmm_engine::keeper::Keeper;
//! use clmm_engine::store::MemStore;
//!
//! let mut keeper = Keeper::new(MemStore::new(), MemBank::new());
//! let (lp, trader) = (Address::new("lp"), Address::new("trader"));
//! keeper.bank_mut().mint(&lp, &Coin::new("uatom", 1_000_000)).expect("mint");
//! keeper.bank_mut().mint(&lp, &Coin::new("uusdc", 1_000_000)).expect("mint");
//! keeper.bank_mut().mint(&trader, &Coin::new("uatom", 1_000)).expect("mint");
//!
//! // 1. A pool at price 1 charging 0.3%
//! let params = TickParams::standard().expect("valid params");
//! let fee: Dec = "0.003".parse().expect("valid decimal");
//! let config = PoolConfig::new("uatom", "uusdc", fee, params, Dec::ONE).expect("valid config");
//! let pool_id = keeper.create_pool(&config).expect("pool created");
//!
//! // 2. Liquidity around the current price
//! let lower = Tick::new(-1_000).expect("valid tick");
//! let upper = Tick::new(1_000).expect("valid tick");
//! let liquidity = Dec::from_int(1_000_000).expect("fits");
//! keeper
//!     .create_position(&lp, pool_id, lower, upper, liquidity)
//!     .expect("position created");
//!
//! // 3. Quote, then swap
//! let token_in = Coin::new("uatom", 1_000);
//! let quote = keeper
//!     .calculate_result_exact_amount_in(pool_id, &token_in, "uusdc")
//!     .expect("quoted");
//! let result = keeper
//!     .swap_exact_amount_in(&trader, pool_id, &token_in, "uusdc", None)
//!     .expect("swapped");
//! assert_eq!(quote, result);
//! assert!(result.amount_out > 0 && result.amount_out < 1_000);
//! ```
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐
//! │   Keeper     │  commits: pools, positions, swaps, gauges
//! └──────┬──────┘
//!        │ CacheStore overlay + TransferBatch
//!        ▼
//! ┌─────────────┐     ┌──────────────┐
//! │    Swap      │────▶│  Accumulator  │  fee growth, reward shares
//! └──────┬──────┘     └──────────────┘
//!        │ SwapStrategy (base→quote / quote→base)
//!        ▼
//! ┌─────────────┐
//! │    Math      │  tick ↔ sqrt price, amount deltas
//! └──────┬──────┘
//!        ▼
//! ┌─────────────┐
//! │   Domain     │  Dec, Tick, Coin, Pool, TickInfo, …
//! └─────────────┘
//! ```
//!
//! # Module Guide
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`domain`] | Value types ([`Dec`](domain::Dec), [`Tick`](domain::Tick), [`Coin`](domain::Coin)) and persisted records |
//! | [`math`] | Wide multiplication, tick math, sqrt-price amount math |
//! | [`traits`] | Collaborator seams: [`KvStore`](traits::KvStore), [`Bank`](traits::Bank), [`SwapStrategy`](traits::SwapStrategy) |
//! | [`store`] | Key layout, Borsh records, [`MemStore`](store::MemStore), [`CacheStore`](store::CacheStore) |
//! | [`strategy`] | The two swap directions and the tick iterator |
//! | [`accumulator`] | Share-based reward accumulator |
//! | [`swap`] | The swap state machine |
//! | [`keeper`] | Committing operations over a store and a bank |
//! | [`config`] | [`PoolConfig`](config::PoolConfig) |
//! | [`bank`] | [`MemBank`](bank::MemBank) |
//! | [`error`] | [`AmmError`](error::AmmError) unified error enum |
//! | [`prelude`] | Convenience re-exports |

pub mod accumulator;
pub mod bank;
pub mod config;
pub mod domain;
pub mod error;
pub mod keeper;
pub mod math;
pub mod prelude;
pub mod store;
pub mod strategy;
pub mod swap;
pub mod traits;
