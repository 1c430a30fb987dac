//! Property-based tests for accumulator bookkeeping.
//!
//! 1. **Share conservation**: `total_shares` equals the sum of live shares.
//! 2. **Monotonic value**: non-negative deposits never decrease `accum_value`.
//! 3. **Claim idempotence**: a second claim without growth pays nothing.

#![allow(clippy::panic)]

use proptest::prelude::*;

use super::*;
use crate::store::MemStore;

// ---------------------------------------------------------------------------
// Shared helpers
// ---------------------------------------------------------------------------

const ACCUM: &str = "rewards";
const HOLDERS: [&str; 3] = ["alice", "bob", "carol"];

fn fresh() -> MemStore {
    let mut store = MemStore::new();
    let Ok(()) = init_accumulator(&mut store, ACCUM) else {
        panic!("expected Ok");
    };
    store
}

fn shares(units: u32) -> Dec {
    let Ok(v) = Dec::from_int(u128::from(units)) else {
        panic!("fits");
    };
    v
}

fn deposit(store: &mut MemStore, thousandths: u32) -> DecCoins {
    let Ok(per_share) = Dec::from_ratio(u128::from(thousandths), 1_000) else {
        panic!("fits");
    };
    let amount = DecCoins::from_coin("uatom", per_share);
    let Ok(mut accum) = get_accumulator(store, ACCUM) else {
        panic!("exists");
    };
    let Ok(()) = add_to_accumulator(store, &mut accum, &amount) else {
        panic!("expected Ok");
    };
    accum.accum_value
}

fn live_shares(store: &MemStore) -> Dec {
    HOLDERS
        .iter()
        .filter_map(|h| position_size(store, ACCUM, h).ok())
        .fold(Dec::ZERO, |acc, s| acc.checked_add(&s).unwrap_or(acc))
}

/// One step of a random position workload.
#[derive(Debug, Clone)]
enum Op {
    Open(usize, u32),
    Add(usize, u32),
    Remove(usize, u32),
    Claim(usize),
    Delete(usize),
    Deposit(u32),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0..HOLDERS.len(), 1u32..1_000).prop_map(|(h, s)| Op::Open(h, s)),
        (0..HOLDERS.len(), 1u32..1_000).prop_map(|(h, s)| Op::Add(h, s)),
        (0..HOLDERS.len(), 1u32..1_000).prop_map(|(h, s)| Op::Remove(h, s)),
        (0..HOLDERS.len()).prop_map(Op::Claim),
        (0..HOLDERS.len()).prop_map(Op::Delete),
        (0u32..5_000).prop_map(Op::Deposit),
    ]
}

fn apply(store: &mut MemStore, op: &Op) {
    // Rejected operations must leave the store untouched, so errors are
    // simply ignored here.
    let _ = match *op {
        Op::Open(h, s) => new_position(store, ACCUM, HOLDERS[h], shares(s)),
        Op::Add(h, s) => add_to_position(store, ACCUM, HOLDERS[h], shares(s)),
        Op::Remove(h, s) => remove_from_position(store, ACCUM, HOLDERS[h], shares(s)),
        Op::Claim(h) => claim_rewards(store, ACCUM, HOLDERS[h]).map(|_| ()),
        Op::Delete(h) => delete_position(store, ACCUM, HOLDERS[h]).map(|_| ()),
        Op::Deposit(t) => {
            deposit(store, t);
            Ok(())
        }
    };
}

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_total_shares_equal_live_shares(ops in prop::collection::vec(op_strategy(), 1..40)) {
        let mut store = fresh();
        for op in &ops {
            apply(&mut store, op);
            let Ok(accum) = get_accumulator(&store, ACCUM) else {
                panic!("exists");
            };
            prop_assert_eq!(accum.total_shares, live_shares(&store));
        }
    }

    #[test]
    fn prop_accum_value_never_decreases(deposits in prop::collection::vec(0u32..5_000, 1..20)) {
        let mut store = fresh();
        let mut last = Dec::ZERO;
        for t in deposits {
            let value = deposit(&mut store, t).amount_of("uatom");
            prop_assert!(value >= last);
            last = value;
        }
    }

    #[test]
    fn prop_second_claim_pays_nothing(
        held in 1u32..10_000,
        growth in 0u32..50_000,
    ) {
        let mut store = fresh();
        let Ok(()) = new_position(&mut store, ACCUM, "alice", shares(held)) else {
            panic!("expected Ok");
        };
        deposit(&mut store, growth);
        let Ok(_) = claim_rewards(&mut store, ACCUM, "alice") else {
            panic!("expected Ok");
        };
        let Ok((whole, dust)) = claim_rewards(&mut store, ACCUM, "alice") else {
            panic!("expected Ok");
        };
        prop_assert!(whole.is_empty());
        prop_assert!(dust.is_zero());
    }
}
