//! In-memory store backends, key layout and record encoding.

mod cache;
pub mod codec;
pub mod keys;
mod memory;
pub mod records;

pub use cache::CacheStore;
pub use memory::MemStore;
