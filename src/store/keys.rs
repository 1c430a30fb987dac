//! Key layout.
//!
//! | Record | Key |
//! |--------|-----|
//! | pool | `pool/` ‖ id (u64 BE) |
//! | tick | `tick/` ‖ pool id (u64 BE) ‖ tick (i32, sign bit flipped, BE) |
//! | accumulator | `accum/` ‖ name |
//! | accumulator position | `accum_pos/` ‖ accumulator ‖ `0x00` ‖ position |
//! | liquidity position | `position/` ‖ id (u64 BE) |
//! | gauge | `gauge/` ‖ name |
//! | id counters | `next_pool_id`, `next_position_id` |
//!
//! Flipping the sign bit of a tick index makes byte order equal numeric
//! order, so a range scan over a pool's tick prefix walks ticks in price
//! order.

use crate::domain::Tick;
use crate::error::AmmError;

const POOL_PREFIX: &[u8] = b"pool/";
const TICK_PREFIX: &[u8] = b"tick/";
const ACCUM_PREFIX: &[u8] = b"accum/";
const ACCUM_POSITION_PREFIX: &[u8] = b"accum_pos/";
const POSITION_PREFIX: &[u8] = b"position/";
const GAUGE_PREFIX: &[u8] = b"gauge/";

/// Counter holding the next pool id.
pub const NEXT_POOL_ID: &[u8] = b"next_pool_id";

/// Counter holding the next liquidity position id.
pub const NEXT_POSITION_ID: &[u8] = b"next_position_id";

const SEPARATOR: u8 = 0x00;

fn join(prefix: &[u8], rest: &[u8]) -> Vec<u8> {
    let mut key = Vec::with_capacity(prefix.len() + rest.len());
    key.extend_from_slice(prefix);
    key.extend_from_slice(rest);
    key
}

/// Key of pool `id`.
#[must_use]
pub fn pool_key(id: u64) -> Vec<u8> {
    join(POOL_PREFIX, &id.to_be_bytes())
}

/// Prefix shared by all ticks of pool `pool_id`.
#[must_use]
pub fn tick_prefix(pool_id: u64) -> Vec<u8> {
    join(TICK_PREFIX, &pool_id.to_be_bytes())
}

/// Key of `tick` in pool `pool_id`.
#[must_use]
pub fn tick_key(pool_id: u64, tick: Tick) -> Vec<u8> {
    let mut key = tick_prefix(pool_id);
    key.extend_from_slice(&encode_tick(tick));
    key
}

fn encode_tick(tick: Tick) -> [u8; 4] {
    // Two's complement with the sign bit flipped orders like the integer.
    #[allow(clippy::cast_sign_loss)]
    let biased = (tick.get() as u32) ^ 0x8000_0000;
    biased.to_be_bytes()
}

/// Decodes the tick index from a full tick key.
///
/// # Errors
///
/// Returns [`AmmError::CorruptRecord`] if the key is not a tick key or the
/// index is out of range.
pub fn tick_from_key(key: &[u8]) -> Result<Tick, AmmError> {
    let corrupt = |reason: &str| AmmError::CorruptRecord {
        record: "tick key",
        reason: reason.to_owned(),
    };
    let expected = TICK_PREFIX.len() + 8 + 4;
    if key.len() != expected || !key.starts_with(TICK_PREFIX) {
        return Err(corrupt("unexpected key length or prefix"));
    }
    let mut raw = [0u8; 4];
    raw.copy_from_slice(&key[expected - 4..]);
    #[allow(clippy::cast_possible_wrap)]
    let index = (u32::from_be_bytes(raw) ^ 0x8000_0000) as i32;
    Tick::new(index).map_err(|_| corrupt("tick index out of range"))
}

/// Key of accumulator `name`.
#[must_use]
pub fn accumulator_key(name: &str) -> Vec<u8> {
    join(ACCUM_PREFIX, name.as_bytes())
}

/// Key of position `position` in accumulator `accumulator`.
#[must_use]
pub fn accum_position_key(accumulator: &str, position: &str) -> Vec<u8> {
    let mut key = join(ACCUM_POSITION_PREFIX, accumulator.as_bytes());
    key.push(SEPARATOR);
    key.extend_from_slice(position.as_bytes());
    key
}

/// Key of liquidity position `id`.
#[must_use]
pub fn position_key(id: u64) -> Vec<u8> {
    join(POSITION_PREFIX, &id.to_be_bytes())
}

/// Key of incentive gauge `name`.
#[must_use]
pub fn gauge_key(name: &str) -> Vec<u8> {
    join(GAUGE_PREFIX, name.as_bytes())
}

/// Smallest key greater than every key starting with `prefix`, or `None`
/// if no such key exists (the prefix is all `0xff`).
#[must_use]
pub fn prefix_end(prefix: &[u8]) -> Option<Vec<u8>> {
    let mut end = prefix.to_vec();
    while let Some(last) = end.pop() {
        if last < u8::MAX {
            end.push(last + 1);
            return Some(end);
        }
    }
    None
}

/// Smallest key strictly greater than `key`.
#[must_use]
pub fn key_successor(key: &[u8]) -> Vec<u8> {
    let mut next = key.to_vec();
    next.push(0);
    next
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    fn t(v: i32) -> Tick {
        let Ok(t) = Tick::new(v) else {
            panic!("valid tick");
        };
        t
    }

    #[test]
    fn tick_keys_sort_numerically() {
        let ticks = [-250_000, -5, -1, 0, 1, 5, 250_000];
        let keys: Vec<_> = ticks.iter().map(|v| tick_key(1, t(*v))).collect();
        let mut sorted = keys.clone();
        sorted.sort();
        assert_eq!(keys, sorted);
    }

    #[test]
    fn tick_key_round_trip() {
        for v in [-250_000, -1, 0, 42] {
            assert_eq!(tick_from_key(&tick_key(9, t(v))), Ok(t(v)));
        }
        assert!(tick_from_key(b"tick/short").is_err());
    }

    #[test]
    fn pools_do_not_share_tick_ranges() {
        let end = prefix_end(&tick_prefix(1));
        assert!(end.is_some_and(|e| tick_key(1, Tick::MAX) < e && e <= tick_key(2, Tick::MIN)));
    }

    #[test]
    fn prefix_end_carries() {
        assert_eq!(prefix_end(&[1, 0xff]), Some(vec![2]));
        assert_eq!(prefix_end(&[0xff, 0xff]), None);
    }

    #[test]
    fn successor_is_tight() {
        let k = tick_key(1, t(3));
        let s = key_successor(&k);
        assert!(k < s && s < tick_key(1, t(4)));
    }

    #[test]
    fn accum_position_keys_are_unambiguous() {
        assert_ne!(accum_position_key("a", "bc"), accum_position_key("ab", "c"));
    }
}
