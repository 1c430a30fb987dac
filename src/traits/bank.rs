//! Token custody abstraction.

use crate::domain::{Address, Coin};
use crate::error::BankError;

/// External token ledger.
///
/// The engine never holds balances itself: every token movement goes
/// through [`Bank::send_coins`].  One call must be atomic: either every
/// coin in `coins` moves or none does.
pub trait Bank {
    /// Moves `coins` from `from` to `to`.
    ///
    /// # Errors
    ///
    /// Any [`BankError`]; on error no coin has moved.
    fn send_coins(&mut self, from: &Address, to: &Address, coins: &[Coin]) -> Result<(), BankError>;

    /// Balance of `address` in `denom`.
    fn balance(&self, address: &Address, denom: &str) -> u128;
}
