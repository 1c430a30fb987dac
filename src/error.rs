//! Unified error types for the CLMM engine.
//!
//! All fallible operations across the crate return [`AmmError`].  Failures
//! reported by the external collaborators (key-value store, bank) are
//! wrapped unchanged so callers can still match on them.
//!
//! Variants fall into five groups, queryable through [`AmmError::kind`]:
//!
//! | Kind | Meaning | Retry? |
//! |------|---------|--------|
//! | [`ErrorKind::InvalidInput`] | caller supplied bad arguments | no, fix input |
//! | [`ErrorKind::Exhausted`] | ran out of ticks or iterations | with new params |
//! | [`ErrorKind::Invariant`] | bug in a numeric kernel | never |
//! | [`ErrorKind::NotFound`] | missing record | create or abort |
//! | [`ErrorKind::External`] | store / bank / corrupt record | caller policy |

use crate::domain::Dec;

/// Convenience alias used throughout the crate.
pub type Result<T> = core::result::Result<T, AmmError>;

/// Failure reported by a [`KvStore`](crate::traits::KvStore) implementation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// The backend rejected the operation.
    #[error("store backend failure: {0}")]
    Backend(String),
    /// The key is malformed for this backend.
    #[error("invalid store key: {0}")]
    InvalidKey(String),
}

/// Failure reported by a [`Bank`](crate::traits::Bank) implementation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BankError {
    /// The sender cannot cover the transfer.
    #[error("insufficient funds: {address} holds {available}{denom}, needs {required}{denom}")]
    InsufficientFunds {
        /// Account that was debited.
        address: String,
        /// Denomination that ran short.
        denom: String,
        /// Balance held.
        available: u128,
        /// Amount requested.
        required: u128,
    },
    /// The receiving balance would overflow.
    #[error("balance overflow for {address} in {denom}")]
    BalanceOverflow {
        /// Account that was credited.
        address: String,
        /// Denomination that overflowed.
        denom: String,
    },
    /// The backend rejected the transfer.
    #[error("transfer rejected: {0}")]
    Rejected(String),
}

/// Coarse classification of an [`AmmError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Bad caller input; nothing was mutated.
    InvalidInput,
    /// The engine ran out of ticks or iterations.
    Exhausted,
    /// A numeric kernel broke one of its own guarantees.
    Invariant,
    /// A record does not exist.
    NotFound,
    /// A collaborator failed or a stored record could not be decoded.
    External,
}

/// Unified error enum for all engine operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AmmError {
    // -- Input validation ---------------------------------------------------
    /// Input and output denominations are the same.
    #[error("input and output denominations are identical")]
    DenomDuplication,

    /// The input denomination is not traded by the pool.
    #[error("input denomination is not part of the pool")]
    InvalidInDenom,

    /// The output denomination is not traded by the pool.
    #[error("output denomination is not part of the pool")]
    InvalidOutDenom,

    /// A share delta was zero or negative where a positive value is needed.
    #[error("invalid share amount: {0}")]
    NonPositiveShares(&'static str),

    /// A signed share delta of exactly zero.
    #[error("share delta must be non-zero")]
    ZeroShares,

    /// Removing more shares than the position holds.
    #[error("removing more shares ({requested}) than the position holds ({held})")]
    InsufficientShares {
        /// Shares the caller tried to remove.
        requested: Dec,
        /// Shares the position holds.
        held: Dec,
    },

    /// A reward addition contained a negative amount.
    #[error("reward additions must be non-negative")]
    NegativeRewardAddition,

    /// The requested price limit cannot be reached in the swap direction.
    #[error("invalid price limit: {0}")]
    InvalidPriceLimit(&'static str),

    /// A configuration value is out of range.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(&'static str),

    /// A fee rate is out of range.
    #[error("invalid fee: {0}")]
    InvalidFee(&'static str),

    /// A tick index is out of range or misaligned.
    #[error("invalid tick: {0}")]
    InvalidTick(&'static str),

    /// A tick range is empty or misaligned.
    #[error("invalid tick range: {0}")]
    InvalidTickRange(&'static str),

    /// A price is zero, negative or not representable.
    #[error("invalid price: {0}")]
    InvalidPrice(&'static str),

    /// A quantity is zero or otherwise unusable.
    #[error("invalid quantity: {0}")]
    InvalidQuantity(&'static str),

    /// An accumulator with this name already exists.
    #[error("accumulator `{0}` already exists")]
    AccumulatorExists(String),

    /// An accumulator position with this name already exists.
    #[error("position `{position}` already exists in accumulator `{accumulator}`")]
    PositionExists {
        /// Accumulator name.
        accumulator: String,
        /// Position name.
        position: String,
    },

    /// The caller does not own the liquidity position.
    #[error("sender does not own liquidity position {0}")]
    Unauthorized(u64),

    /// The pool has no liquidity to swap against.
    #[error("pool {0} has no liquidity")]
    EmptyLiquidity(u64),

    /// Rewards cannot be distributed because nothing is staked.
    #[error("gauge `{0}` has no staked shares")]
    NoStakedShares(String),

    // -- Resource exhaustion ------------------------------------------------
    /// No further initialized tick exists in the swap direction.
    #[error("ran out of initialized ticks")]
    RanOutOfTicks,

    /// Too many consecutive buckets consumed nothing.
    #[error("swap made no progress for too many iterations")]
    RanOutOfIterations,

    // -- Invariant violations -----------------------------------------------
    /// The bucket kernel consumed an amount without moving the price.
    #[error("sqrt price did not move although an amount was consumed")]
    NoSqrtPriceMovement,

    /// The bucket kernel moved the price past the next initialized tick.
    #[error("computed sqrt price overshot the next initialized tick")]
    InvalidComputedSqrtPrice,

    /// The swap consumed more input than was specified.
    #[error("swap over-charged the input amount by {0}")]
    OverCharge(Dec),

    /// A realized swap amount came out non-positive.
    #[error("unexpected non-positive calculated amount")]
    UnexpectedCalcAmount,

    // -- Not found ----------------------------------------------------------
    /// No accumulator with this name.
    #[error("accumulator `{0}` does not exist")]
    AccumulatorNotFound(String),

    /// No accumulator position with this name.
    #[error("no position `{position}` in accumulator `{accumulator}`")]
    AccumPositionNotFound {
        /// Accumulator name.
        accumulator: String,
        /// Position name.
        position: String,
    },

    /// No pool with this id.
    #[error("pool {0} not found")]
    PoolNotFound(u64),

    /// No liquidity position with this id.
    #[error("liquidity position {0} not found")]
    PositionNotFound(u64),

    // -- Arithmetic ---------------------------------------------------------
    /// Arithmetic overflow.
    #[error("arithmetic overflow: {0}")]
    Overflow(&'static str),

    /// Arithmetic underflow.
    #[error("arithmetic underflow: {0}")]
    Underflow(&'static str),

    /// Division by zero.
    #[error("division by zero")]
    DivisionByZero,

    // -- Collaborators ------------------------------------------------------
    /// The key-value store failed.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// A token transfer failed.
    #[error(transparent)]
    Bank(#[from] BankError),

    /// A stored record could not be decoded.
    #[error("corrupt {record} record: {reason}")]
    CorruptRecord {
        /// Record type that failed to decode.
        record: &'static str,
        /// Decoder message.
        reason: String,
    },
}

impl AmmError {
    /// Classifies this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::RanOutOfTicks | Self::RanOutOfIterations => ErrorKind::Exhausted,
            Self::NoSqrtPriceMovement
            | Self::InvalidComputedSqrtPrice
            | Self::OverCharge(_)
            | Self::UnexpectedCalcAmount => ErrorKind::Invariant,
            Self::AccumulatorNotFound(_)
            | Self::AccumPositionNotFound { .. }
            | Self::PoolNotFound(_)
            | Self::PositionNotFound(_) => ErrorKind::NotFound,
            Self::Store(_) | Self::Bank(_) | Self::CorruptRecord { .. } => ErrorKind::External,
            _ => ErrorKind::InvalidInput,
        }
    }

    /// Returns `true` for errors that indicate a bug rather than bad input.
    #[must_use]
    pub const fn is_invariant_violation(&self) -> bool {
        matches!(self.kind(), ErrorKind::Invariant)
    }

    /// Returns `true` when a record was missing.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self.kind(), ErrorKind::NotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exhaustion_kinds() {
        assert_eq!(AmmError::RanOutOfTicks.kind(), ErrorKind::Exhausted);
        assert_eq!(AmmError::RanOutOfIterations.kind(), ErrorKind::Exhausted);
    }

    #[test]
    fn invariant_kinds() {
        assert!(AmmError::NoSqrtPriceMovement.is_invariant_violation());
        assert!(AmmError::OverCharge(Dec::ONE).is_invariant_violation());
        assert!(!AmmError::DenomDuplication.is_invariant_violation());
    }

    #[test]
    fn not_found_is_distinct_from_corrupt_record() {
        let missing = AmmError::AccumulatorNotFound("fee/1".into());
        let corrupt = AmmError::CorruptRecord {
            record: "accumulator",
            reason: "unexpected end of input".into(),
        };
        assert!(missing.is_not_found());
        assert!(!corrupt.is_not_found());
        assert_eq!(corrupt.kind(), ErrorKind::External);
    }

    #[test]
    fn store_error_converts_unchanged() {
        let err: AmmError = StoreError::Backend("disk full".into()).into();
        assert_eq!(err, AmmError::Store(StoreError::Backend("disk full".into())));
        assert_eq!(err.to_string(), "store backend failure: disk full");
    }
}
