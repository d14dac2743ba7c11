//! Profile stats, quests and titles

use chrono::NaiveDate;
use fantrade_core::UserId;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use strum_macros::{Display, EnumString};

use crate::config::ProgressionConfig;

/// Titles are permanent once earned
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    EnumString,
    Display,
)]
#[serde(rename_all = "snake_case")]
pub enum Title {
    #[strum(serialize = "Active Trader")]
    ActiveTrader,
    #[strum(serialize = "Closer")]
    Closer,
}

/// Daily realized-profit quest
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quest {
    /// UTC day the quest belongs to
    pub day: NaiveDate,
    pub goal_pnl: Decimal,
    /// Sum of positive realized PnL today; never decreases
    pub progress_pnl: Decimal,
    pub done: bool,
}

impl Quest {
    pub fn new(day: NaiveDate, goal_pnl: Decimal) -> Self {
        Self {
            day,
            goal_pnl,
            progress_pnl: Decimal::ZERO,
            done: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileStats {
    pub user_id: UserId,
    /// Lifetime total
    pub xp: u64,
    pub trades_today: u32,
    pub profitable_sells_today: u32,
    pub quest: Quest,
    pub titles: BTreeSet<Title>,
}

impl ProfileStats {
    pub fn new(user_id: impl Into<UserId>, day: NaiveDate, config: &ProgressionConfig) -> Self {
        Self {
            user_id: user_id.into(),
            xp: 0,
            trades_today: 0,
            profitable_sells_today: 0,
            quest: Quest::new(day, config.quest_goal_pnl),
            titles: BTreeSet::new(),
        }
    }

    /// Start a fresh day if `day` differs from the quest's day.
    ///
    /// Resets the quest and both daily counters; XP and titles carry over.
    pub fn roll_to(&mut self, day: NaiveDate, config: &ProgressionConfig) {
        if self.quest.day != day {
            self.quest = Quest::new(day, config.quest_goal_pnl);
            self.trades_today = 0;
            self.profitable_sells_today = 0;
        }
    }

    pub fn has_title(&self, title: Title) -> bool {
        self.titles.contains(&title)
    }
}

/// What one fill changed
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressUpdate {
    pub xp_gained: u64,
    /// True only on the fill that completed the quest
    pub quest_completed: bool,
    pub titles_earned: Vec<Title>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_title_display() {
        assert_eq!(Title::ActiveTrader.to_string(), "Active Trader");
        assert_eq!(Title::Closer.to_string(), "Closer");
        assert_eq!("Active Trader".parse::<Title>().unwrap(), Title::ActiveTrader);
    }

    #[test]
    fn test_roll_to_resets_daily_state_only() {
        let config = ProgressionConfig::default();
        let monday = NaiveDate::from_ymd_opt(2024, 3, 4).unwrap();
        let tuesday = NaiveDate::from_ymd_opt(2024, 3, 5).unwrap();

        let mut stats = ProfileStats::new("alice", monday, &config);
        stats.xp = 40;
        stats.trades_today = 7;
        stats.profitable_sells_today = 2;
        stats.quest.progress_pnl = Decimal::from(12);
        stats.quest.done = true;
        stats.titles.insert(Title::Closer);

        stats.roll_to(monday, &config);
        assert_eq!(stats.trades_today, 7);

        stats.roll_to(tuesday, &config);
        assert_eq!(stats.xp, 40);
        assert_eq!(stats.trades_today, 0);
        assert_eq!(stats.profitable_sells_today, 0);
        assert_eq!(stats.quest, Quest::new(tuesday, config.quest_goal_pnl));
        assert!(stats.has_title(Title::Closer));
    }
}
