//! Borsh record encoding and typed store access.

use borsh::{BorshDeserialize, BorshSerialize};

use crate::error::{AmmError, StoreError};
use crate::traits::KvStore;

/// Encodes a record.
///
/// # Errors
///
/// Returns [`AmmError::Store`] if the encoder fails (it only fails on I/O
/// errors, which an in-memory buffer does not produce).
pub fn encode<T: BorshSerialize>(value: &T) -> Result<Vec<u8>, AmmError> {
    borsh::to_vec(value).map_err(|e| StoreError::Backend(format!("encode failed: {e}")).into())
}

/// Decodes a record, naming it in the error on failure.
///
/// # Errors
///
/// Returns [`AmmError::CorruptRecord`] if `bytes` is not a valid encoding.
pub fn decode<T: BorshDeserialize>(record: &'static str, bytes: &[u8]) -> Result<T, AmmError> {
    T::try_from_slice(bytes).map_err(|e| AmmError::CorruptRecord {
        record,
        reason: e.to_string(),
    })
}

/// Reads and decodes the record at `key`.
///
/// # Errors
///
/// Store failures and [`AmmError::CorruptRecord`].
pub fn load<T: BorshDeserialize, S: KvStore + ?Sized>(
    store: &S,
    key: &[u8],
    record: &'static str,
) -> Result<Option<T>, AmmError> {
    match store.get(key)? {
        Some(bytes) => decode(record, &bytes).map(Some),
        None => Ok(None),
    }
}

/// Encodes and writes `value` at `key`.
///
/// # Errors
///
/// Store failures.
pub fn save<T: BorshSerialize, S: KvStore + ?Sized>(
    store: &mut S,
    key: &[u8],
    value: &T,
) -> Result<(), AmmError> {
    store.set(key, encode(value)?)?;
    Ok(())
}

/// Returns the counter at `key` and stores its successor.  Counters start
/// at one.
///
/// # Errors
///
/// Store failures, [`AmmError::CorruptRecord`] and [`AmmError::Overflow`].
pub fn next_id<S: KvStore + ?Sized>(store: &mut S, key: &[u8]) -> Result<u64, AmmError> {
    let id = load::<u64, S>(store, key, "id counter")?.unwrap_or(1);
    let next = id.checked_add(1).ok_or(AmmError::Overflow("id counter exhausted"))?;
    save(store, key, &next)?;
    Ok(id)
}
