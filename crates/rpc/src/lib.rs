//! FanTrade RPC - application wiring
//!
//! `AppContext` owns every store and exposes the logical API; the binary
//! adds a CLI and a daemon mode on top.

pub mod commands;
pub mod config;
pub mod context;
pub mod daemon;
pub mod error;

pub use config::{AppConfig, ConfigError};
pub use context::AppContext;
pub use error::AppError;
