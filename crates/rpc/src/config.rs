//! Application configuration
//!
//! Every field has a default, so a partial JSON file (or none at all) is
//! valid. A few operational knobs can be overridden from the environment.

use fantrade_core::Amount;
use fantrade_oracle::SimulatorConfig;
use fantrade_progression::ProgressionConfig;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

pub const ENV_STARTING_CASH: &str = "FANTRADE_STARTING_CASH";
pub const ENV_MATCH_INTERVAL_MS: &str = "FANTRADE_MATCH_INTERVAL_MS";
pub const ENV_TICK_INTERVAL_MS: &str = "FANTRADE_TICK_INTERVAL_MS";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Cannot read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Cannot parse config file: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid value for {key}: {value:?}")]
    InvalidValue { key: String, value: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Cash credited to every new account
    #[serde(default = "default_starting_cash")]
    pub starting_cash: Decimal,

    /// Matching cycle period
    #[serde(default = "default_match_interval_ms")]
    pub match_interval_ms: u64,

    /// Simulator step period
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,

    // === Progression ===
    #[serde(default = "default_quest_goal_pnl")]
    pub quest_goal_pnl: Decimal,

    #[serde(default = "default_active_trader_trades")]
    pub active_trader_trades: u32,

    #[serde(default = "default_closer_profitable_sells")]
    pub closer_profitable_sells: u32,

    /// Events buffered per bus subscriber
    #[serde(default = "default_bus_capacity")]
    pub bus_capacity: usize,

    #[serde(default)]
    pub simulator: SimulatorConfig,
}

fn default_starting_cash() -> Decimal {
    Decimal::new(10_000, 0)
}

fn default_match_interval_ms() -> u64 {
    1000
}

fn default_tick_interval_ms() -> u64 {
    1000
}

fn default_quest_goal_pnl() -> Decimal {
    ProgressionConfig::default().quest_goal_pnl
}

fn default_active_trader_trades() -> u32 {
    ProgressionConfig::default().active_trader_trades
}

fn default_closer_profitable_sells() -> u32 {
    ProgressionConfig::default().closer_profitable_sells
}

fn default_bus_capacity() -> usize {
    1024
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            starting_cash: default_starting_cash(),
            match_interval_ms: default_match_interval_ms(),
            tick_interval_ms: default_tick_interval_ms(),
            quest_goal_pnl: default_quest_goal_pnl(),
            active_trader_trades: default_active_trader_trades(),
            closer_profitable_sells: default_closer_profitable_sells(),
            bus_capacity: default_bus_capacity(),
            simulator: SimulatorConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from JSON file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// File (if any), then environment overrides
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Apply overrides looked up by environment variable name
    pub fn apply_overrides(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        if let Some(value) = lookup(ENV_STARTING_CASH) {
            self.starting_cash = parse_override(ENV_STARTING_CASH, &value)?;
        }
        if let Some(value) = lookup(ENV_MATCH_INTERVAL_MS) {
            self.match_interval_ms = parse_override(ENV_MATCH_INTERVAL_MS, &value)?;
        }
        if let Some(value) = lookup(ENV_TICK_INTERVAL_MS) {
            self.tick_interval_ms = parse_override(ENV_TICK_INTERVAL_MS, &value)?;
        }
        Ok(())
    }

    pub fn starting_cash(&self) -> Result<Amount, ConfigError> {
        Amount::new(self.starting_cash).map_err(|_| ConfigError::InvalidValue {
            key: "starting_cash".to_string(),
            value: self.starting_cash.to_string(),
        })
    }

    pub fn match_interval(&self) -> Duration {
        Duration::from_millis(self.match_interval_ms.max(1))
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms.max(1))
    }

    pub fn progression(&self) -> ProgressionConfig {
        ProgressionConfig {
            quest_goal_pnl: self.quest_goal_pnl,
            active_trader_trades: self.active_trader_trades,
            closer_profitable_sells: self.closer_profitable_sells,
        }
    }
}

fn parse_override<T: FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
    })
}
