//! FanTrade Projection - Event to SQLite views
//!
//! Projections are DISPOSABLE - they can be rebuilt from the journal at any time.

pub mod engine;
pub mod error;
pub mod trade;

pub use engine::ProjectionEngine;
pub use error::ProjectionError;
pub use trade::{TradeProjection, TradeRow};
