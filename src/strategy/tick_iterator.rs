//! Forward-only cursor over a pool's initialized ticks.

use crate::domain::{Tick, TickInfo};
use crate::error::AmmError;
use crate::store::{codec, keys};
use crate::traits::StoreIterator;

/// Initialized ticks of one pool in the direction of travel.
///
/// Wraps a [`StoreIterator`] snapshot, so the swap loop may write tick
/// records while iterating.  The underlying store iterator is released
/// when this value is closed or dropped.
#[derive(Debug, Default)]
pub struct TickIterator {
    inner: StoreIterator,
}

impl TickIterator {
    /// Wraps a range scan over tick keys.
    #[must_use]
    pub fn new(inner: StoreIterator) -> Self {
        Self { inner }
    }

    /// Returns `true` while the cursor points at a tick.
    #[must_use]
    pub fn valid(&self) -> bool {
        self.inner.valid()
    }

    /// Index of the tick under the cursor.
    ///
    /// # Errors
    ///
    /// - [`AmmError::RanOutOfTicks`] past the end.
    /// - [`AmmError::CorruptRecord`] for a malformed key.
    pub fn tick(&self) -> Result<Tick, AmmError> {
        let key = self.inner.key().ok_or(AmmError::RanOutOfTicks)?;
        keys::tick_from_key(key)
    }

    /// Record of the tick under the cursor.
    ///
    /// # Errors
    ///
    /// - [`AmmError::RanOutOfTicks`] past the end.
    /// - [`AmmError::CorruptRecord`] for a malformed record.
    pub fn tick_info(&self) -> Result<TickInfo, AmmError> {
        let value = self.inner.value().ok_or(AmmError::RanOutOfTicks)?;
        codec::decode("tick", value)
    }

    /// Advances to the next initialized tick.
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) {
        self.inner.next();
    }

    /// Releases the underlying store iterator.
    pub fn close(self) {
        self.inner.close();
    }
}
