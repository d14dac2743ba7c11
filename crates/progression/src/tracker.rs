//! Progression tracker - per-user stats updated on every fill

use chrono::{DateTime, Utc};
use fantrade_core::{OrderSide, UserId};
use fantrade_events::MarketEvent;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use crate::config::ProgressionConfig;
use crate::stats::{ProfileStats, ProgressUpdate, Title};

const SELL_BASE_XP: u64 = 5;
const BUY_BASE_XP: u64 = 2;

pub struct ProgressionTracker {
    config: ProgressionConfig,
    profiles: Mutex<HashMap<UserId, ProfileStats>>,
}

impl ProgressionTracker {
    pub fn new(config: ProgressionConfig) -> Self {
        Self {
            config,
            profiles: Mutex::new(HashMap::new()),
        }
    }

    pub fn config(&self) -> &ProgressionConfig {
        &self.config
    }

    /// Fold one fill into the user's stats.
    ///
    /// The day is the UTC date of `executed_at`.
    pub fn record(
        &self,
        user_id: &str,
        side: OrderSide,
        realized_pnl: Decimal,
        executed_at: DateTime<Utc>,
    ) -> ProgressUpdate {
        let day = executed_at.date_naive();
        let mut profiles = self.profiles.lock().unwrap_or_else(PoisonError::into_inner);
        let stats = profiles
            .entry(user_id.to_string())
            .or_insert_with(|| ProfileStats::new(user_id, day, &self.config));

        stats.roll_to(day, &self.config);

        let profitable = realized_pnl > Decimal::ZERO;
        stats.trades_today += 1;
        if side == OrderSide::Sell && profitable {
            stats.profitable_sells_today += 1;
        }

        let xp_gained = xp_for(side, realized_pnl);
        stats.xp = stats.xp.saturating_add(xp_gained);

        let mut update = ProgressUpdate {
            xp_gained,
            ..ProgressUpdate::default()
        };

        if profitable && !stats.quest.done {
            stats.quest.progress_pnl += realized_pnl;
            if stats.quest.progress_pnl >= stats.quest.goal_pnl {
                stats.quest.done = true;
                update.quest_completed = true;
            }
        }

        if stats.trades_today >= self.config.active_trader_trades
            && stats.titles.insert(Title::ActiveTrader)
        {
            update.titles_earned.push(Title::ActiveTrader);
        }
        if stats.profitable_sells_today >= self.config.closer_profitable_sells
            && stats.titles.insert(Title::Closer)
        {
            update.titles_earned.push(Title::Closer);
        }

        if update.quest_completed || !update.titles_earned.is_empty() {
            tracing::info!(
                user_id,
                xp = stats.xp,
                quest_completed = update.quest_completed,
                titles = ?update.titles_earned,
                "progression milestone"
            );
        }

        update
    }

    /// Stats as of `now`; a user without fills gets a fresh profile
    pub fn stats_at(&self, user_id: &str, now: DateTime<Utc>) -> ProfileStats {
        let day = now.date_naive();
        let profiles = self.profiles.lock().unwrap_or_else(PoisonError::into_inner);
        let mut stats = profiles
            .get(user_id)
            .cloned()
            .unwrap_or_else(|| ProfileStats::new(user_id, day, &self.config));
        stats.roll_to(day, &self.config);
        stats
    }

    pub fn stats(&self, user_id: &str) -> ProfileStats {
        self.stats_at(user_id, Utc::now())
    }

    /// Apply a journaled fill
    pub fn replay(&self, event: &MarketEvent) {
        if let MarketEvent::OrderFilled { trade, realized_pnl } = event {
            if let Some(user_id) = trade.user_id() {
                self.record(user_id, trade.side(), *realized_pnl, trade.executed_at);
            }
        }
    }
}

impl Default for ProgressionTracker {
    fn default() -> Self {
        Self::new(ProgressionConfig::default())
    }
}

/// `base + max(0, floor(realized_pnl / 2))`
fn xp_for(side: OrderSide, realized_pnl: Decimal) -> u64 {
    let base = match side {
        OrderSide::Sell => SELL_BASE_XP,
        OrderSide::Buy => BUY_BASE_XP,
    };
    let bonus = if realized_pnl > Decimal::ZERO {
        (realized_pnl / Decimal::TWO)
            .floor()
            .to_u64()
            .unwrap_or(u64::MAX)
    } else {
        0
    };
    base.saturating_add(bonus)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use rust_decimal_macros::dec;

    fn noon() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 4, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_xp_formula() {
        assert_eq!(xp_for(OrderSide::Buy, Decimal::ZERO), 2);
        assert_eq!(xp_for(OrderSide::Sell, dec!(-8)), 5);
        assert_eq!(xp_for(OrderSide::Sell, dec!(7)), 8);
        assert_eq!(xp_for(OrderSide::Sell, dec!(1.99)), 5);
    }

    #[test]
    fn test_quest_completes_across_sells() {
        let tracker = ProgressionTracker::default();

        let first = tracker.record("alice", OrderSide::Sell, dec!(6), noon());
        assert!(!first.quest_completed);

        let second = tracker.record("alice", OrderSide::Sell, dec!(5), noon());
        assert!(second.quest_completed);

        let stats = tracker.stats_at("alice", noon());
        assert_eq!(stats.quest.progress_pnl, dec!(11));
        assert!(stats.quest.done);

        // Completion is reported once
        let third = tracker.record("alice", OrderSide::Sell, dec!(5), noon());
        assert!(!third.quest_completed);
        assert_eq!(tracker.stats_at("alice", noon()).quest.progress_pnl, dec!(11));
    }

    #[test]
    fn test_losses_never_reduce_progress() {
        let tracker = ProgressionTracker::default();
        tracker.record("bob", OrderSide::Sell, dec!(4), noon());
        tracker.record("bob", OrderSide::Sell, dec!(-20), noon());

        let stats = tracker.stats_at("bob", noon());
        assert_eq!(stats.quest.progress_pnl, dec!(4));
        assert_eq!(stats.profitable_sells_today, 1);
        assert_eq!(stats.trades_today, 2);
    }

    #[test]
    fn test_active_trader_title() {
        let tracker = ProgressionTracker::default();
        for i in 0..9 {
            let update = tracker.record("carol", OrderSide::Buy, Decimal::ZERO, noon());
            assert!(update.titles_earned.is_empty(), "fill {}", i);
        }

        let tenth = tracker.record("carol", OrderSide::Buy, Decimal::ZERO, noon());
        assert_eq!(tenth.titles_earned, vec![Title::ActiveTrader]);

        let eleventh = tracker.record("carol", OrderSide::Buy, Decimal::ZERO, noon());
        assert!(eleventh.titles_earned.is_empty());
        assert_eq!(tracker.stats_at("carol", noon()).xp, 22);
    }

    #[test]
    fn test_closer_title_is_permanent() {
        let tracker = ProgressionTracker::default();
        tracker.record("dave", OrderSide::Sell, dec!(1), noon());
        tracker.record("dave", OrderSide::Sell, dec!(1), noon());
        let third = tracker.record("dave", OrderSide::Sell, dec!(1), noon());
        assert!(third.titles_earned.contains(&Title::Closer));

        let tomorrow = noon() + Duration::days(1);
        let stats = tracker.stats_at("dave", tomorrow);
        assert_eq!(stats.profitable_sells_today, 0);
        assert!(stats.has_title(Title::Closer));
    }

    #[test]
    fn test_new_day_resets_quest() {
        let tracker = ProgressionTracker::default();
        tracker.record("erin", OrderSide::Sell, dec!(12), noon());
        assert!(tracker.stats_at("erin", noon()).quest.done);

        let tomorrow = noon() + Duration::days(1);
        let update = tracker.record("erin", OrderSide::Sell, dec!(3), tomorrow);
        assert!(!update.quest_completed);

        let stats = tracker.stats_at("erin", tomorrow);
        assert_eq!(stats.quest.day, tomorrow.date_naive());
        assert_eq!(stats.quest.progress_pnl, dec!(3));
        assert_eq!(stats.trades_today, 1);
        assert_eq!(stats.xp, 5 + 6 + 5 + 1);
    }

    #[test]
    fn test_unknown_user_has_fresh_stats() {
        let tracker = ProgressionTracker::default();
        let stats = tracker.stats_at("nobody", noon());
        assert_eq!(stats.xp, 0);
        assert!(stats.titles.is_empty());
        assert_eq!(stats.quest.goal_pnl, dec!(10));
    }
}
