//! Convenience re-exports for common types and traits.
//!
//! ```rust
//! use clmm_engine::prelude::*;
//! ```

pub use crate::domain::{
    AccumRecord, AccumulatorObject, Address, Coin, Dec, DecCoins, LiquidityPosition, Pool, Rounding,
    SwapResult, Tick, TickInfo, TickParams,
};

pub use crate::traits::{Bank, KvStore, SwapStrategy};

pub use crate::config::PoolConfig;

pub use crate::error::{AmmError, ErrorKind, Result};

pub use crate::keeper::{Keeper, PositionChange};

pub use crate::bank::MemBank;
pub use crate::store::{CacheStore, MemStore};
