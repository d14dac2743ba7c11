//! Ledger - registry of player accounts

use fantrade_core::{Amount, UserId};
use fantrade_events::{Journal, JournalRecord, MarketEvent, MemoryJournal};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use crate::account::Account;
use crate::error::LedgerError;
use crate::portfolio::Portfolio;

/// A new account and the journal record that created it
#[derive(Debug, Clone)]
pub struct Registration {
    pub portfolio: Portfolio,
    pub record: JournalRecord,
}

/// All player accounts.
///
/// Each account sits behind its own `Mutex` so fills for different users never
/// contend. The map lock is only held to look an account up or register one.
pub struct Ledger {
    accounts: RwLock<HashMap<UserId, Arc<Mutex<Account>>>>,
    journal: Arc<dyn Journal>,
}

impl Ledger {
    pub fn new(journal: Arc<dyn Journal>) -> Self {
        Self {
            accounts: RwLock::new(HashMap::new()),
            journal,
        }
    }

    /// Ledger backed by a throwaway in-memory journal
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryJournal::new()))
    }

    /// Open a new account with `starting_cash`
    pub fn register(
        &self,
        user_id: &str,
        starting_cash: Amount,
    ) -> Result<Registration, LedgerError> {
        let user_id = user_id.trim();
        if user_id.is_empty() {
            return Err(LedgerError::InvalidUserId(user_id.to_string()));
        }

        let mut accounts = self.accounts.write().unwrap_or_else(PoisonError::into_inner);
        if accounts.contains_key(user_id) {
            return Err(LedgerError::AccountExists(user_id.to_string()));
        }

        let record = self
            .journal
            .append(&MarketEvent::user_registered(user_id, starting_cash))?;

        let account = Account::new(user_id, starting_cash);
        let portfolio = account.portfolio();
        accounts.insert(user_id.to_string(), Arc::new(Mutex::new(account)));

        tracing::info!(user_id, starting_cash = %starting_cash, "account registered");
        Ok(Registration { portfolio, record })
    }

    /// Shared handle to one account; lock it for the duration of a fill
    pub fn account(&self, user_id: &str) -> Result<Arc<Mutex<Account>>, LedgerError> {
        self.accounts
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(user_id)
            .cloned()
            .ok_or_else(|| LedgerError::AccountNotFound(user_id.to_string()))
    }

    pub fn contains(&self, user_id: &str) -> bool {
        self.accounts
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(user_id)
    }

    pub fn portfolio(&self, user_id: &str) -> Result<Portfolio, LedgerError> {
        let account = self.account(user_id)?;
        let account = account.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(account.portfolio())
    }

    /// Registered users, sorted
    pub fn users(&self) -> Vec<UserId> {
        let mut users: Vec<UserId> = self
            .accounts
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect();
        users.sort();
        users
    }

    /// Apply a journaled event without re-journaling it
    pub fn replay(&self, event: &MarketEvent) {
        match event {
            MarketEvent::UserRegistered {
                user_id,
                starting_cash,
                ..
            } => {
                let mut accounts = self.accounts.write().unwrap_or_else(PoisonError::into_inner);
                accounts.entry(user_id.clone()).or_insert_with(|| {
                    Arc::new(Mutex::new(Account::new(user_id.clone(), *starting_cash)))
                });
            }
            MarketEvent::OrderFilled { trade, .. } => {
                let Some(user_id) = trade.user_id() else {
                    return;
                };
                let account = match self.account(user_id) {
                    Ok(account) => account,
                    Err(e) => {
                        tracing::error!(
                            order_id = %trade.order_id,
                            error = %e,
                            "replayed fill for unknown account"
                        );
                        return;
                    }
                };
                let mut account = account.lock().unwrap_or_else(PoisonError::into_inner);
                let plan =
                    account.plan_fill(trade.side(), &trade.symbol, trade.quantity, trade.price);
                match plan {
                    Ok(plan) => account.apply(&plan),
                    Err(e) => {
                        tracing::error!(
                            order_id = %trade.order_id,
                            error = %e,
                            "replayed fill no longer applies"
                        );
                    }
                }
            }
            _ => {}
        }
    }
}

impl Default for Ledger {
    fn default() -> Self {
        Self::in_memory()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use fantrade_core::{Order, OrderSide, OrderStatus, OrderType, TradeRecord};
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn cash(value: Decimal) -> Amount {
        Amount::new(value).unwrap()
    }

    #[test]
    fn test_register_and_portfolio() -> anyhow::Result<()> {
        let journal = Arc::new(MemoryJournal::new());
        let ledger = Ledger::new(journal.clone());

        let registration = ledger.register("alice", cash(dec!(10000)))?;
        let portfolio = registration.portfolio;
        assert_eq!(portfolio.cash, dec!(10000));
        assert!(portfolio.positions.is_empty());

        assert!(ledger.contains("alice"));
        assert_eq!(ledger.portfolio("alice")?, portfolio);
        assert_eq!(journal.records(), vec![registration.record]);
        Ok(())
    }

    #[test]
    fn test_register_twice_fails() -> anyhow::Result<()> {
        let ledger = Ledger::in_memory();
        ledger.register("alice", cash(dec!(1)))?;

        assert!(matches!(
            ledger.register("alice", cash(dec!(2))),
            Err(LedgerError::AccountExists(_))
        ));
        assert_eq!(ledger.portfolio("alice")?.cash, dec!(1));
        Ok(())
    }

    #[test]
    fn test_blank_user_rejected() {
        let ledger = Ledger::in_memory();
        assert!(matches!(
            ledger.register("  ", cash(dec!(1))),
            Err(LedgerError::InvalidUserId(_))
        ));
    }

    #[test]
    fn test_unknown_account() {
        let ledger = Ledger::in_memory();
        assert!(matches!(
            ledger.portfolio("ghost"),
            Err(LedgerError::AccountNotFound(_))
        ));
    }

    #[test]
    fn test_replay_rebuilds_positions() -> anyhow::Result<()> {
        let ledger = Ledger::in_memory();
        let now = Utc::now();
        let order = Order {
            id: "o-1".to_string(),
            seq: 1,
            user_id: "alice".to_string(),
            symbol: "ACME".parse()?,
            side: OrderSide::Buy,
            order_type: OrderType::Market,
            quantity: 10,
            limit_price: None,
            status: OrderStatus::Open,
            created_at: now,
            updated_at: now,
        };

        ledger.replay(&MarketEvent::user_registered("alice", cash(dec!(500))));
        ledger.replay(&MarketEvent::OrderFilled {
            trade: TradeRecord::for_order(&order, dec!(20), now),
            realized_pnl: Decimal::ZERO,
        });

        let portfolio = ledger.portfolio("alice")?;
        assert_eq!(portfolio.cash, dec!(300));
        assert_eq!(portfolio.positions[0].shares, 10);
        assert_eq!(portfolio.positions[0].avg_cost, dec!(20));
        Ok(())
    }
}
