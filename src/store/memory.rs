//! Ordered in-memory store.

use std::collections::BTreeMap;
use std::ops::Bound;

use crate::error::StoreError;
use crate::traits::{KvStore, OpenIterators, Order, StoreIterator};

/// In-memory [`KvStore`] backed by a [`BTreeMap`].
///
/// Counts iterators it has handed out and not yet seen released, so tests
/// can assert that every code path closes its iterators.
///
/// # Examples
///
/// ```
/// use clmm_engine::store::MemStore;
/// use clmm_engine::traits::{KvStore, Order};
///
/// let mut store = MemStore::new();
/// store.set(b"a", vec![1]).expect("in-memory write");
/// let it = store.range(None, None, Order::Ascending).expect("in-memory scan");
/// assert_eq!(store.open_iterators(), 1);
/// it.close();
/// assert_eq!(store.open_iterators(), 0);
/// ```
#[derive(Debug, Default)]
pub struct MemStore {
    data: BTreeMap<Vec<u8>, Vec<u8>>,
    open: OpenIterators,
}

impl MemStore {
    /// Empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of iterators not yet released.
    #[must_use]
    pub fn open_iterators(&self) -> usize {
        self.open.count()
    }

    /// Number of stored entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns `true` if nothing is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// Converts optional `[start, end)` bounds for [`BTreeMap::range`].
pub(crate) fn bounds(start: Option<&[u8]>, end: Option<&[u8]>) -> (Bound<Vec<u8>>, Bound<Vec<u8>>) {
    (
        start.map_or(Bound::Unbounded, |s| Bound::Included(s.to_vec())),
        end.map_or(Bound::Unbounded, |e| Bound::Excluded(e.to_vec())),
    )
}

impl KvStore for MemStore {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(self.data.get(key).cloned())
    }

    fn set(&mut self, key: &[u8], value: Vec<u8>) -> Result<(), StoreError> {
        if key.is_empty() {
            return Err(StoreError::InvalidKey("empty key".into()));
        }
        self.data.insert(key.to_vec(), value);
        Ok(())
    }

    fn delete(&mut self, key: &[u8]) -> Result<(), StoreError> {
        self.data.remove(key);
        Ok(())
    }

    fn range(
        &self,
        start: Option<&[u8]>,
        end: Option<&[u8]>,
        order: Order,
    ) -> Result<StoreIterator, StoreError> {
        if let (Some(s), Some(e)) = (start, end) {
            if s > e {
                return Ok(StoreIterator::new(Vec::new(), Some(self.open.acquire())));
            }
        }
        let range = self.data.range(bounds(start, end));
        let entries: Vec<_> = match order {
            Order::Ascending => range.map(|(k, v)| (k.clone(), v.clone())).collect(),
            Order::Descending => range.rev().map(|(k, v)| (k.clone(), v.clone())).collect(),
        };
        Ok(StoreIterator::new(entries, Some(self.open.acquire())))
    }
}
