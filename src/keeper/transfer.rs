//! Ordered group of token transfers that succeeds or fails as a whole.

use std::collections::BTreeMap;

use tracing::error;

use crate::domain::{Address, Coin};
use crate::error::{AmmError, BankError, Result};
use crate::traits::Bank;

/// Transfers executed in order, all or nothing.
///
/// Every sender's outgoing totals are checked against its balance before
/// anything moves.  If a send still fails, the sends already made are
/// reversed in the opposite order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransferBatch {
    transfers: Vec<(Address, Address, Coin)>,
}

impl TransferBatch {
    /// Empty batch.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a transfer; zero amounts are skipped.
    pub fn push(&mut self, from: &Address, to: &Address, coin: Coin) {
        if !coin.is_zero() {
            self.transfers.push((from.clone(), to.clone(), coin));
        }
    }

    /// Returns `true` if nothing is queued.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.transfers.is_empty()
    }

    /// Queued transfers as `(from, to, coin)`, in execution order.
    pub fn iter(&self) -> impl Iterator<Item = &(Address, Address, Coin)> {
        self.transfers.iter()
    }

    fn check_funds<B: Bank + ?Sized>(&self, bank: &B) -> Result<()> {
        let mut outgoing: BTreeMap<(&Address, &str), u128> = BTreeMap::new();
        for (from, _, coin) in &self.transfers {
            let total = outgoing.entry((from, coin.denom.as_str())).or_insert(0);
            *total = total
                .checked_add(coin.amount)
                .ok_or(AmmError::Overflow("transfer total"))?;
        }
        for ((address, denom), required) in outgoing {
            let available = bank.balance(address, denom);
            if available < required {
                return Err(BankError::InsufficientFunds {
                    address: address.to_string(),
                    denom: denom.to_owned(),
                    available,
                    required,
                }
                .into());
            }
        }
        Ok(())
    }

    /// Executes every transfer.
    ///
    /// # Errors
    ///
    /// - [`BankError::InsufficientFunds`] from the up-front check; nothing
    ///   has moved.
    /// - The first failing send's error; completed sends are reversed
    ///   first.
    pub fn execute<B: Bank + ?Sized>(&self, bank: &mut B) -> Result<()> {
        self.check_funds(bank)?;
        for (done, (from, to, coin)) in self.transfers.iter().enumerate() {
            if let Err(e) = bank.send_coins(from, to, std::slice::from_ref(coin)) {
                self.revert_first(bank, done);
                return Err(e.into());
            }
        }
        Ok(())
    }

    /// Reverses every transfer, for use when a later step of the same
    /// operation fails.
    pub fn revert<B: Bank + ?Sized>(&self, bank: &mut B) {
        self.revert_first(bank, self.transfers.len());
    }

    fn revert_first<B: Bank + ?Sized>(&self, bank: &mut B, count: usize) {
        for (from, to, coin) in self.transfers.iter().take(count).rev() {
            if let Err(e) = bank.send_coins(to, from, std::slice::from_ref(coin)) {
                error!(%from, %to, %coin, error = %e, "failed to reverse transfer");
            }
        }
    }
}
