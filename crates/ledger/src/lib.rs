//! FanTrade Ledger - cash and share positions per player
//!
//! Every fill-triggered cash or position change goes through this crate.
//!
//! # Key Types
//! - `Account`: one player's cash and positions, guarded by its own `Mutex`
//! - `FillPlan`: the validated outcome of a fill, computed before anything mutates
//! - `Ledger`: registry of accounts
//! - `Portfolio`: read-only view returned to callers

pub mod account;
pub mod error;
pub mod ledger;
pub mod portfolio;

pub use account::{Account, FillPlan, Position};
pub use error::LedgerError;
pub use ledger::{Ledger, Registration};
pub use portfolio::{Portfolio, PositionView};
