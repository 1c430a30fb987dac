//! Seams between the engine and its collaborators.
//!
//! | Trait | Role |
//! |-------|------|
//! | [`KvStore`] | transactional byte-oriented persistence |
//! | [`Bank`] | atomic token transfers and balances |
//! | [`SwapStrategy`] | direction-specific bucket math and tick ordering |

mod bank;
mod kv_store;
mod swap_strategy;

pub use bank::Bank;
pub use kv_store::{KvStore, OpenHandle, OpenIterators, Order, StoreIterator, WriteBatch};
pub use swap_strategy::{BucketSwap, SwapStrategy};
