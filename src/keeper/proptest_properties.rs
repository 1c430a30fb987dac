//! Property-based tests for committed swaps.
//!
//! 1. **Settlement conservation**: a successful swap moves exactly
//!    `amount_in - ceil(fee)` into the pool, `ceil(fee)` into the fee account
//!    and `amount_out` out of the pool.
//! 2. **Atomic failure**: a rejected swap leaves balances and pool untouched.
//! 3. **Quote fidelity**: a quote equals the swap that follows it.

#![allow(clippy::panic)]

use proptest::prelude::*;

use super::*;
use crate::bank::MemBank;
use crate::domain::{Address, Coin, Tick, TickParams};
use crate::store::MemStore;

// ---------------------------------------------------------------------------
// Shared helpers
// ---------------------------------------------------------------------------

const BASE: &str = "uatom";
const QUOTE: &str = "uusdc";

type TestKeeper = Keeper<MemStore, MemBank>;

fn trader() -> Address {
    Address::new("trader")
}

fn tick(v: i32) -> Tick {
    let Ok(t) = Tick::new(v) else {
        panic!("valid tick");
    };
    t
}

/// Pool at price 1 with one position over `[-1000, 1000)` and a trader
/// holding `funds` of each denomination.
fn setup(funds: u128) -> (TestKeeper, u64) {
    let mut keeper = Keeper::new(MemStore::new(), MemBank::new());
    let lp = Address::new("lp");
    let holders = [(lp.clone(), 10_000_000), (trader(), funds)];
    for (who, amount) in &holders {
        for denom in [BASE, QUOTE] {
            let Ok(()) = keeper.bank_mut().mint(who, &Coin::new(denom, *amount)) else {
                panic!("mint");
            };
        }
    }
    let Ok(params) = TickParams::standard() else {
        panic!("valid params");
    };
    let Ok(fee) = "0.003".parse::<Dec>() else {
        panic!("valid decimal");
    };
    let Ok(config) = PoolConfig::new(BASE, QUOTE, fee, params, Dec::ONE) else {
        panic!("valid config");
    };
    let Ok(pool_id) = keeper.create_pool(&config) else {
        panic!("pool created");
    };
    let Ok(liquidity) = Dec::from_int(1_000_000) else {
        panic!("fits");
    };
    let Ok(_) = keeper.create_position(&lp, pool_id, tick(-1_000), tick(1_000), liquidity) else {
        panic!("position created");
    };
    (keeper, pool_id)
}

#[derive(Debug, PartialEq, Eq)]
struct Snapshot {
    trader: [u128; 2],
    pool: [u128; 2],
    fees: [u128; 2],
}

fn snapshot(keeper: &TestKeeper, pool_id: u64) -> Snapshot {
    let Ok(pool) = keeper.get_pool(pool_id) else {
        panic!("pool exists");
    };
    let of = |who: &Address| [keeper.bank().balance(who, BASE), keeper.bank().balance(who, QUOTE)];
    Snapshot {
        trader: of(&trader()),
        pool: of(&pool.address()),
        fees: of(&pool.fees_address()),
    }
}

/// Index of `denom` in a [`Snapshot`] pair.
fn slot(denom: &str) -> usize {
    usize::from(denom != BASE)
}

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn swap_settlement_conserves_balances(
        swaps in prop::collection::vec((any::<bool>(), 1u128..8_000), 1..6)
    ) {
        let (mut keeper, pool_id) = setup(100_000);
        for (base_in, amount) in swaps {
            let (denom_in, denom_out) = if base_in { (BASE, QUOTE) } else { (QUOTE, BASE) };
            let before = snapshot(&keeper, pool_id);
            let Ok(pool_before) = keeper.get_pool(pool_id) else {
                panic!("pool exists");
            };

            match keeper.swap_exact_amount_in(&trader(), pool_id, &Coin::new(denom_in, amount), denom_out, None) {
                Ok(result) => {
                    let Ok(fee) = result.fee_rounded_up() else {
                        panic!("fee fits");
                    };
                    let after = snapshot(&keeper, pool_id);
                    let (i, o) = (slot(denom_in), slot(denom_out));
                    prop_assert_eq!(before.trader[i] - after.trader[i], result.amount_in);
                    prop_assert_eq!(after.trader[o] - before.trader[o], result.amount_out);
                    prop_assert_eq!(after.pool[i] - before.pool[i], result.amount_in - fee);
                    prop_assert_eq!(after.fees[i] - before.fees[i], fee);
                    prop_assert_eq!(before.pool[o] - after.pool[o], result.amount_out);
                }
                Err(_) => {
                    prop_assert_eq!(snapshot(&keeper, pool_id), before);
                    let Ok(pool_after) = keeper.get_pool(pool_id) else {
                        panic!("pool exists");
                    };
                    prop_assert_eq!(pool_after, pool_before);
                }
            }
        }
    }

    #[test]
    fn quote_matches_following_swap(base_in in any::<bool>(), amount in 10u128..20_000) {
        let (mut keeper, pool_id) = setup(100_000);
        let (denom_in, denom_out) = if base_in { (BASE, QUOTE) } else { (QUOTE, BASE) };
        let token_in = Coin::new(denom_in, amount);
        let quote = keeper.calculate_result_exact_amount_in(pool_id, &token_in, denom_out);
        let swapped = keeper.swap_exact_amount_in(&trader(), pool_id, &token_in, denom_out, None);
        if let (Ok(quote), Ok(swapped)) = (quote, swapped) {
            prop_assert_eq!(quote, swapped);
        }
    }

    #[test]
    fn unfunded_swap_changes_nothing(amount in 1_001u128..40_000) {
        let (mut keeper, pool_id) = setup(1_000);
        let before = snapshot(&keeper, pool_id);
        let res = keeper.swap_exact_amount_in(&trader(), pool_id, &Coin::new(BASE, amount), QUOTE, None);
        prop_assert!(res.is_err());
        prop_assert_eq!(snapshot(&keeper, pool_id), before);
    }
}
