//! Opaque account address.

use core::fmt;

use borsh::{BorshDeserialize, BorshSerialize};

/// An opaque account address understood by the [`Bank`](crate::traits::Bank).
///
/// The engine never validates addresses; it only derives the module-owned
/// accounts it needs (pool reserves, pool fee collector, gauge escrow) from
/// their identifiers, so that the same record always maps to the same
/// account.
///
/// # Examples
///
/// ```
/// use clmm_engine::domain::Address;
///
/// let pool = Address::pool(7);
/// assert_eq!(pool.as_str(), "pool/7");
/// assert_ne!(pool, Address::pool_fees(7));
/// ```
#[derive(
    Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, BorshSerialize, BorshDeserialize,
)]
pub struct Address(String);

impl Address {
    /// Wraps an arbitrary address string.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Reserve account of pool `pool_id`.
    #[must_use]
    pub fn pool(pool_id: u64) -> Self {
        Self(format!("pool/{pool_id}"))
    }

    /// Fee-collection account of pool `pool_id`.
    #[must_use]
    pub fn pool_fees(pool_id: u64) -> Self {
        Self(format!("pool/{pool_id}/fees"))
    }

    /// Escrow account of the incentive gauge `name`.
    #[must_use]
    pub fn gauge(name: &str) -> Self {
        Self(format!("gauge/{name}"))
    }

    /// Returns the address string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Address {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn module_accounts_are_distinct() {
        assert_ne!(Address::pool(1), Address::pool(2));
        assert_ne!(Address::pool(1), Address::pool_fees(1));
        assert_eq!(Address::gauge("lp").to_string(), "gauge/lp");
    }

    #[test]
    fn from_str_wraps() {
        assert_eq!(Address::from("alice"), Address::new("alice"));
    }
}
