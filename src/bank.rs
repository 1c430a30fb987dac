//! In-memory token ledger.

use std::collections::BTreeMap;

use tracing::trace;

use crate::domain::{Address, Coin};
use crate::error::BankError;
use crate::traits::Bank;

/// [`Bank`] backed by a map of `(address, denom)` balances.
///
/// A multi-coin send is checked in full before any balance changes, so a
/// failing send leaves every balance untouched.
///
/// # Examples
///
/// ```
/// use clmm_engine::bank::MemBank;
/// use clmm_engine::domain::{Address, Coin};
/// use clmm_engine::traits::Bank;
///
/// let (alice, bob) = (Address::new("alice"), Address::new("bob"));
/// let mut bank = MemBank::new();
/// bank.mint(&alice, &Coin::new("uatom", 10)).expect("no overflow");
/// bank.send_coins(&alice, &bob, &[Coin::new("uatom", 4)]).expect("funded");
/// assert_eq!(bank.balance(&bob, "uatom"), 4);
/// assert!(bank.send_coins(&alice, &bob, &[Coin::new("uatom", 7)]).is_err());
/// assert_eq!(bank.balance(&alice, "uatom"), 6);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemBank {
    balances: BTreeMap<(Address, String), u128>,
}

impl MemBank {
    /// Empty ledger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates `coin` out of thin air in `to`'s account.
    ///
    /// # Errors
    ///
    /// Returns [`BankError::BalanceOverflow`] if the balance would overflow.
    pub fn mint(&mut self, to: &Address, coin: &Coin) -> Result<(), BankError> {
        let balance = self.balances.entry((to.clone(), coin.denom.clone())).or_insert(0);
        *balance = balance.checked_add(coin.amount).ok_or_else(|| BankError::BalanceOverflow {
            address: to.to_string(),
            denom: coin.denom.clone(),
        })?;
        Ok(())
    }

    /// Sum of all balances in `denom`.
    #[must_use]
    pub fn supply(&self, denom: &str) -> u128 {
        self.balances
            .iter()
            .filter(|((_, d), _)| d == denom)
            .fold(0u128, |acc, (_, amount)| acc.saturating_add(*amount))
    }

    fn outgoing_totals(coins: &[Coin]) -> Result<BTreeMap<&str, u128>, BankError> {
        let mut totals: BTreeMap<&str, u128> = BTreeMap::new();
        for coin in coins {
            let total = totals.entry(coin.denom.as_str()).or_insert(0);
            *total = total
                .checked_add(coin.amount)
                .ok_or_else(|| BankError::Rejected(format!("transfer total overflows in {}", coin.denom)))?;
        }
        Ok(totals)
    }
}

impl Bank for MemBank {
    fn send_coins(&mut self, from: &Address, to: &Address, coins: &[Coin]) -> Result<(), BankError> {
        let totals = Self::outgoing_totals(coins)?;
        for (denom, required) in &totals {
            let available = self.balance(from, denom);
            if available < *required {
                return Err(BankError::InsufficientFunds {
                    address: from.to_string(),
                    denom: (*denom).to_owned(),
                    available,
                    required: *required,
                });
            }
            if from != to && self.balance(to, denom).checked_add(*required).is_none() {
                return Err(BankError::BalanceOverflow {
                    address: to.to_string(),
                    denom: (*denom).to_owned(),
                });
            }
        }
        if from == to {
            return Ok(());
        }
        for (denom, amount) in totals {
            if amount == 0 {
                continue;
            }
            let sender = self.balances.entry((from.clone(), denom.to_owned())).or_insert(0);
            *sender -= amount;
            let receiver = self.balances.entry((to.clone(), denom.to_owned())).or_insert(0);
            *receiver += amount;
            trace!(%from, %to, denom, amount, "coins sent");
        }
        Ok(())
    }

    fn balance(&self, address: &Address, denom: &str) -> u128 {
        self.balances
            .get(&(address.clone(), denom.to_owned()))
            .copied()
            .unwrap_or(0)
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    fn funded() -> (MemBank, Address, Address) {
        let (a, b) = (Address::new("a"), Address::new("b"));
        let mut bank = MemBank::new();
        let Ok(()) = bank.mint(&a, &Coin::new("x", 100)) else {
            panic!("expected Ok");
        };
        let Ok(()) = bank.mint(&a, &Coin::new("y", 5)) else {
            panic!("expected Ok");
        };
        (bank, a, b)
    }

    #[test]
    fn multi_coin_send_is_all_or_nothing() {
        let (mut bank, a, b) = funded();
        let err = bank.send_coins(&a, &b, &[Coin::new("x", 50), Coin::new("y", 6)]);
        assert!(matches!(err, Err(BankError::InsufficientFunds { required: 6, .. })));
        assert_eq!(bank.balance(&a, "x"), 100);
        assert_eq!(bank.balance(&b, "x"), 0);

        let Ok(()) = bank.send_coins(&a, &b, &[Coin::new("x", 50), Coin::new("y", 5)]) else {
            panic!("expected Ok");
        };
        assert_eq!(bank.balance(&b, "x"), 50);
        assert_eq!(bank.balance(&a, "y"), 0);
    }

    #[test]
    fn repeated_denoms_are_checked_together() {
        let (mut bank, a, b) = funded();
        let err = bank.send_coins(&a, &b, &[Coin::new("x", 60), Coin::new("x", 60)]);
        assert!(matches!(err, Err(BankError::InsufficientFunds { required: 120, .. })));
        assert_eq!(bank.supply("x"), 100);
    }

    #[test]
    fn mint_overflow() {
        let (mut bank, a, _) = funded();
        assert!(bank.mint(&a, &Coin::new("x", u128::MAX)).is_err());
        assert_eq!(bank.balance(&a, "x"), 100);
    }
}
