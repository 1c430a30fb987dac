//! Byte-oriented transactional key-value store abstraction.
//!
//! [`KvStore`] is the only persistence seam of the engine.  Implementations
//! provide point reads and writes plus an ordered range scan; the engine
//! encodes records and keys itself (see [`crate::store`]).
//!
//! # Iterators
//!
//! [`KvStore::range`] returns a [`StoreIterator`]: a forward-only cursor
//! over a snapshot of the matching entries.  An iterator may hold an
//! [`OpenHandle`] that its backend uses to track open iterators; the handle
//! is released when the iterator is closed or dropped, so every exit path
//! of a caller releases it.

use core::cell::Cell;
use std::rc::Rc;

use crate::error::StoreError;

/// Iteration order of [`KvStore::range`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Order {
    /// Ascending byte order.
    Ascending,
    /// Descending byte order.
    Descending,
}

/// Transactional byte-oriented map.
///
/// Errors are returned as [`StoreError`] and propagated unchanged by the
/// engine.
pub trait KvStore {
    /// Reads the value stored at `key`.
    ///
    /// # Errors
    ///
    /// Backend failure.
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StoreError>;

    /// Writes `value` at `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Backend failure.
    fn set(&mut self, key: &[u8], value: Vec<u8>) -> Result<(), StoreError>;

    /// Removes `key`.  Removing an absent key is not an error.
    ///
    /// # Errors
    ///
    /// Backend failure.
    fn delete(&mut self, key: &[u8]) -> Result<(), StoreError>;

    /// Returns `true` if `key` holds a value.
    ///
    /// # Errors
    ///
    /// Backend failure.
    fn has(&self, key: &[u8]) -> Result<bool, StoreError> {
        Ok(self.get(key)?.is_some())
    }

    /// Entries with `start <= key < end` in the requested order.  `None`
    /// leaves that side unbounded.
    ///
    /// # Errors
    ///
    /// Backend failure.
    fn range(
        &self,
        start: Option<&[u8]>,
        end: Option<&[u8]>,
        order: Order,
    ) -> Result<StoreIterator, StoreError>;
}

// -- Open-iterator tracking ---------------------------------------------------

/// Shared counter of iterators a backend has handed out and not yet seen
/// released.
#[derive(Debug, Clone, Default)]
pub struct OpenIterators(Rc<Cell<usize>>);

impl OpenIterators {
    /// Number of iterators currently open.
    #[must_use]
    pub fn count(&self) -> usize {
        self.0.get()
    }

    /// Registers a new open iterator.
    #[must_use]
    pub fn acquire(&self) -> OpenHandle {
        self.0.set(self.0.get() + 1);
        OpenHandle(Rc::clone(&self.0))
    }
}

/// Registration of one open iterator; released on drop.
#[derive(Debug)]
pub struct OpenHandle(Rc<Cell<usize>>);

impl Drop for OpenHandle {
    fn drop(&mut self) {
        self.0.set(self.0.get().saturating_sub(1));
    }
}

// -- StoreIterator -----------------------------------------------------------

/// Forward-only cursor over a snapshot of store entries.
#[derive(Debug, Default)]
pub struct StoreIterator {
    entries: Vec<(Vec<u8>, Vec<u8>)>,
    position: usize,
    handles: Vec<OpenHandle>,
}

impl StoreIterator {
    /// Wraps already ordered entries.
    #[must_use]
    pub fn new(entries: Vec<(Vec<u8>, Vec<u8>)>, handle: Option<OpenHandle>) -> Self {
        Self {
            entries,
            position: 0,
            handles: handle.into_iter().collect(),
        }
    }

    /// Returns `true` while the cursor points at an entry.
    #[must_use]
    pub fn valid(&self) -> bool {
        self.position < self.entries.len()
    }

    /// Key under the cursor.
    #[must_use]
    pub fn key(&self) -> Option<&[u8]> {
        self.entries.get(self.position).map(|(k, _)| k.as_slice())
    }

    /// Value under the cursor.
    #[must_use]
    pub fn value(&self) -> Option<&[u8]> {
        self.entries.get(self.position).map(|(_, v)| v.as_slice())
    }

    /// Advances the cursor.  Advancing past the end is a no-op.
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) {
        if self.valid() {
            self.position += 1;
        }
    }

    /// Releases the iterator.  Equivalent to dropping it.
    pub fn close(self) {}

    /// Splits into the remaining entries and the open handles, so an
    /// overlay can merge entries while keeping its parent iterator
    /// registered.
    #[must_use]
    pub fn into_parts(self) -> (Vec<(Vec<u8>, Vec<u8>)>, Vec<OpenHandle>) {
        let Self {
            mut entries,
            position,
            handles,
        } = self;
        entries.drain(..position.min(entries.len()));
        (entries, handles)
    }

    /// Rebuilds an iterator from merged entries and inherited handles.
    #[must_use]
    pub fn from_parts(entries: Vec<(Vec<u8>, Vec<u8>)>, handles: Vec<OpenHandle>) -> Self {
        Self {
            entries,
            position: 0,
            handles,
        }
    }
}

// -- WriteBatch --------------------------------------------------------------

/// Buffered writes, applied to a store in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WriteBatch {
    ops: Vec<(Vec<u8>, Option<Vec<u8>>)>,
}

impl WriteBatch {
    /// Records a write (`Some`) or a delete (`None`).
    pub fn push(&mut self, key: Vec<u8>, value: Option<Vec<u8>>) {
        self.ops.push((key, value));
    }

    /// Number of buffered operations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.ops.len()
    }

    /// Returns `true` if nothing is buffered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Applies every operation to `store`.
    ///
    /// # Errors
    ///
    /// Stops at and returns the first backend failure.
    pub fn commit<S: KvStore + ?Sized>(self, store: &mut S) -> Result<(), StoreError> {
        for (key, value) in self.ops {
            match value {
                Some(v) => store.set(&key, v)?,
                None => store.delete(&key)?,
            }
        }
        Ok(())
    }
}
