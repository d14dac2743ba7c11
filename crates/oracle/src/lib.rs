//! FanTrade Price Oracle
//!
//! Provides the latest observed price per symbol to the matching engine.
//! `TickBook` is the in-memory feed; `MarketSimulator` generates ticks for it.

mod error;
mod simulator;
mod tickbook;
mod types;

pub use error::OracleError;
pub use simulator::{MarketSimulator, SimulatorConfig, SymbolSeed};
pub use tickbook::TickBook;
pub use types::PriceOracle;
