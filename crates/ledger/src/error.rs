//! Ledger errors

use fantrade_core::UserId;
use fantrade_events::EventError;
use rust_decimal::Decimal;
use thiserror::Error;

/// Errors that can occur in ledger operations
#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("Account not found: {0}")]
    AccountNotFound(UserId),

    #[error("Account already exists: {0}")]
    AccountExists(UserId),

    #[error("Invalid user id: {0:?}")]
    InvalidUserId(String),

    #[error("Insufficient funds for {user_id}: required {required}, available {available}")]
    InsufficientFunds {
        user_id: UserId,
        required: Decimal,
        available: Decimal,
    },

    #[error("Insufficient shares of {symbol} for {user_id}: required {required}, held {held}")]
    InsufficientShares {
        user_id: UserId,
        symbol: String,
        required: u64,
        held: u64,
    },

    #[error("Arithmetic overflow")]
    Overflow,

    #[error("Journal error: {0}")]
    Journal(#[from] EventError),
}
