//! Matching engine errors

use fantrade_events::EventError;
use fantrade_ledger::LedgerError;
use fantrade_orders::OrderError;
use thiserror::Error;

/// Why a fill attempt did not commit
#[derive(Debug, Error)]
pub enum FillError {
    #[error("Order error: {0}")]
    Order(#[from] OrderError),

    #[error("Ledger error: {0}")]
    Ledger(#[from] LedgerError),

    /// Appending the fill failed; nothing was applied
    #[error("Journal error: {0}")]
    Journal(#[from] EventError),
}
