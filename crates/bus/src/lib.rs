//! FanTrade Event Bus - In-process push channel
//!
//! The pull API (`get_portfolio`, `get_open_orders`) is always available; the
//! bus is the optional push side. Subscribers get every committed
//! `MarketEvent` without the core depending on any transport.

pub mod channel;
pub mod error;
pub mod subscriber;

pub use channel::EventBus;
pub use error::BusError;
pub use subscriber::{spawn_subscriber, EventSubscriber};
