//! Oracle error types

use fantrade_core::SymbolError;
use fantrade_events::EventError;
use thiserror::Error;

/// Oracle-related errors
#[derive(Debug, Error)]
pub enum OracleError {
    /// Tick rejected before it reached the book
    #[error("Invalid tick for {symbol}: {reason}")]
    InvalidTick { symbol: String, reason: String },

    /// Simulator configuration cannot be used
    #[error("Invalid simulator config: {0}")]
    InvalidConfig(String),

    #[error("Symbol error: {0}")]
    Symbol(#[from] SymbolError),

    /// Journaling the tick failed; the book is unchanged
    #[error("Journal error: {0}")]
    Journal(#[from] EventError),
}
