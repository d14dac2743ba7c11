//! Progression thresholds

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressionConfig {
    /// Realized profit needed to complete the daily quest
    #[serde(default = "default_quest_goal_pnl")]
    pub quest_goal_pnl: Decimal,

    /// Fills in one day that earn "Active Trader"
    #[serde(default = "default_active_trader_trades")]
    pub active_trader_trades: u32,

    /// Profitable sells in one day that earn "Closer"
    #[serde(default = "default_closer_profitable_sells")]
    pub closer_profitable_sells: u32,
}

fn default_quest_goal_pnl() -> Decimal {
    Decimal::from(10)
}

fn default_active_trader_trades() -> u32 {
    10
}

fn default_closer_profitable_sells() -> u32 {
    3
}

impl Default for ProgressionConfig {
    fn default() -> Self {
        Self {
            quest_goal_pnl: default_quest_goal_pnl(),
            active_trader_trades: default_active_trader_trades(),
            closer_profitable_sells: default_closer_profitable_sells(),
        }
    }
}
