//! Pool configuration.
//!
//! [`PoolConfig`] is the declarative blueprint handed to
//! [`Keeper::create_pool`](crate::keeper::Keeper::create_pool): the two
//! denominations, the fee rate, the tick grid and the starting price.

mod pool;

pub use pool::PoolConfig;
