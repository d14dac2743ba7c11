//! Application errors

use fantrade_core::AmountError;
use fantrade_events::EventError;
use fantrade_ledger::LedgerError;
use fantrade_oracle::OracleError;
use fantrade_orders::OrderError;
use fantrade_projection::ProjectionError;
use thiserror::Error;

use crate::config::ConfigError;

/// Errors surfaced by `AppContext` operations
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Order(#[from] OrderError),

    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error(transparent)]
    Oracle(#[from] OracleError),

    #[error("Journal error: {0}")]
    Event(#[from] EventError),

    #[error("Projection error: {0}")]
    Projection(#[from] ProjectionError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("Invalid amount: {0}")]
    Amount(#[from] AmountError),
}
