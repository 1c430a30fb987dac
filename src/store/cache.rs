//! Write-buffering overlay over another store.

use std::collections::BTreeMap;

use super::memory::bounds;
use crate::error::StoreError;
use crate::traits::{KvStore, Order, StoreIterator, WriteBatch};

/// A [`KvStore`] that reads through to `parent` and buffers every write.
///
/// Dropping the cache discards the writes, which is how quotes stay free of
/// side effects; [`CacheStore::into_batch`] hands them over for an atomic
/// commit once every fallible step of an operation has succeeded.
#[derive(Debug)]
pub struct CacheStore<'a, P: KvStore + ?Sized> {
    parent: &'a P,
    writes: BTreeMap<Vec<u8>, Option<Vec<u8>>>,
}

impl<'a, P: KvStore + ?Sized> CacheStore<'a, P> {
    /// Overlay over `parent` with no buffered writes.
    pub fn new(parent: &'a P) -> Self {
        Self {
            parent,
            writes: BTreeMap::new(),
        }
    }

    /// Number of buffered writes and deletes.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.writes.len()
    }

    /// Buffered writes in key order.
    #[must_use]
    pub fn into_batch(self) -> WriteBatch {
        let mut batch = WriteBatch::default();
        for (key, value) in self.writes {
            batch.push(key, value);
        }
        batch
    }
}

impl<P: KvStore + ?Sized> KvStore for CacheStore<'_, P> {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StoreError> {
        match self.writes.get(key) {
            Some(buffered) => Ok(buffered.clone()),
            None => self.parent.get(key),
        }
    }

    fn set(&mut self, key: &[u8], value: Vec<u8>) -> Result<(), StoreError> {
        if key.is_empty() {
            return Err(StoreError::InvalidKey("empty key".into()));
        }
        self.writes.insert(key.to_vec(), Some(value));
        Ok(())
    }

    fn delete(&mut self, key: &[u8]) -> Result<(), StoreError> {
        self.writes.insert(key.to_vec(), None);
        Ok(())
    }

    fn range(
        &self,
        start: Option<&[u8]>,
        end: Option<&[u8]>,
        order: Order,
    ) -> Result<StoreIterator, StoreError> {
        let (parent_entries, handles) = self.parent.range(start, end, Order::Ascending)?.into_parts();
        let mut merged: BTreeMap<Vec<u8>, Vec<u8>> = parent_entries.into_iter().collect();
        if !matches!((start, end), (Some(s), Some(e)) if s > e) {
            for (key, value) in self.writes.range(bounds(start, end)) {
                match value {
                    Some(v) => merged.insert(key.clone(), v.clone()),
                    None => merged.remove(key),
                };
            }
        }
        let entries: Vec<_> = match order {
            Order::Ascending => merged.into_iter().collect(),
            Order::Descending => merged.into_iter().rev().collect(),
        };
        Ok(StoreIterator::from_parts(entries, handles))
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::store::MemStore;

    fn parent() -> MemStore {
        let mut s = MemStore::new();
        for k in [1u8, 3, 5] {
            let Ok(()) = s.set(&[k], vec![k]) else {
                panic!("expected Ok");
            };
        }
        s
    }

    #[test]
    fn reads_through_and_shadows() {
        let p = parent();
        let mut c = CacheStore::new(&p);
        assert_eq!(c.get(&[1]), Ok(Some(vec![1])));
        let Ok(()) = c.set(&[1], vec![9]) else {
            panic!("expected Ok");
        };
        let Ok(()) = c.delete(&[3]) else {
            panic!("expected Ok");
        };
        assert_eq!(c.get(&[1]), Ok(Some(vec![9])));
        assert_eq!(c.get(&[3]), Ok(None));
        assert_eq!(p.get(&[1]), Ok(Some(vec![1])));
    }

    #[test]
    fn range_merges_overlay() {
        let p = parent();
        let mut c = CacheStore::new(&p);
        let Ok(()) = c.set(&[4], vec![4]) else {
            panic!("expected Ok");
        };
        let Ok(()) = c.delete(&[5]) else {
            panic!("expected Ok");
        };
        let Ok(mut it) = c.range(Some(&[2]), None, Order::Descending) else {
            panic!("expected Ok");
        };
        let mut seen = Vec::new();
        while let Some(k) = it.key() {
            seen.push(k[0]);
            it.next();
        }
        assert_eq!(seen, vec![4, 3]);
        assert_eq!(p.open_iterators(), 1);
        it.close();
        assert_eq!(p.open_iterators(), 0);
    }

    #[test]
    fn batch_commits_to_another_store() {
        let mut p = parent();
        let batch = {
            let mut c = CacheStore::new(&p);
            let Ok(()) = c.set(&[7], vec![7]) else {
                panic!("expected Ok");
            };
            let Ok(()) = c.delete(&[1]) else {
                panic!("expected Ok");
            };
            assert_eq!(c.pending(), 2);
            c.into_batch()
        };
        let Ok(()) = batch.commit(&mut p) else {
            panic!("expected Ok");
        };
        assert_eq!(p.get(&[7]), Ok(Some(vec![7])));
        assert_eq!(p.get(&[1]), Ok(None));
    }

    #[test]
    fn nested_overlays() {
        let p = parent();
        let mut outer = CacheStore::new(&p);
        let Ok(()) = outer.set(&[2], vec![2]) else {
            panic!("expected Ok");
        };
        let inner = CacheStore::new(&outer);
        assert_eq!(inner.get(&[2]), Ok(Some(vec![2])));
    }
}
