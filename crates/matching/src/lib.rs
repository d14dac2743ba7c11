//! FanTrade Matching Engine
//!
//! Polls the order book in FIFO order and fills each eligible order in full
//! against the simulated market maker at the oracle's latest price. No partial
//! fills and no peer-to-peer matching.

mod engine;
mod error;
mod outcome;

pub use engine::MatchingEngine;
pub use error::FillError;
pub use outcome::{CycleReport, Fill, FillOutcome, OrderOutcome, SkipReason};
