//! FanTrade Core - Domain types
//!
//! This crate contains the fundamental types used across FanTrade:
//! - `Amount`: Non-negative decimal wrapper for cash
//! - `Symbol`: Validated ticker symbol
//! - `Order`, `OrderSide`, `OrderType`, `OrderStatus`: order model
//! - `Tick`, `TradeRecord`: market data and executed trades

pub mod amount;
pub mod market;
pub mod order;
pub mod symbol;

pub use amount::{Amount, AmountError};
pub use market::{Tick, TradeRecord};
pub use order::{Order, OrderId, OrderSide, OrderStatus, OrderType, UserId};
pub use symbol::{Symbol, SymbolError};
