//! Fundamental domain value types and persisted records.
//!
//! Value types ([`Dec`], [`Tick`], [`Coin`], [`DecCoins`], [`Address`]) use
//! newtypes with validated constructors; persisted records ([`Pool`],
//! [`TickInfo`], [`AccumulatorObject`], [`AccumRecord`],
//! [`LiquidityPosition`]) derive Borsh encoding.

mod accumulator;
mod address;
mod coin;
mod dec;
#[cfg(feature = "incentive")]
mod gauge;
mod pool;
mod position;
mod rounding;
mod swap_result;
mod tick;

pub use accumulator::{AccumRecord, AccumulatorObject};
pub use address::Address;
pub use coin::{Coin, DecCoins};
pub use dec::Dec;
#[cfg(feature = "incentive")]
pub use gauge::{gauge_accumulator_name, Gauge};
pub use pool::{fee_accumulator_name, Pool};
pub use position::{position_accumulator_name, LiquidityPosition};
pub use rounding::Rounding;
pub use swap_result::{PoolUpdates, SwapDetails, SwapResult};
pub use tick::{Tick, TickInfo, TickParams};
