//! Application context - wires everything together
//!
//! All shared state is built here once and owned for the life of the process.
//! On open, the journal is replayed to rebuild every in-memory store.

use fantrade_bus::EventBus;
use fantrade_core::{Amount, Order, Tick};
use fantrade_events::{
    verify_chain, EventReader, Journal, JsonlJournal, MarketEvent, MemoryJournal,
};
use fantrade_ledger::{Ledger, LedgerError, Portfolio};
use fantrade_matching::{CycleReport, MatchingEngine};
use fantrade_oracle::TickBook;
use fantrade_orders::{OrderBook, OrderError, OrderRequest};
use fantrade_progression::{ProfileStats, ProgressionTracker};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::broadcast;

use crate::config::AppConfig;
use crate::error::AppError;

/// Application context - wires together all components
pub struct AppContext {
    config: AppConfig,
    starting_cash: Amount,
    ledger: Arc<Ledger>,
    book: Arc<OrderBook>,
    ticks: Arc<TickBook>,
    progression: Arc<ProgressionTracker>,
    engine: Arc<MatchingEngine>,
    bus: EventBus,
    journal_path: Option<PathBuf>,
    projection_path: Option<PathBuf>,
    replayed: usize,
}

impl AppContext {
    /// Open the data directory, replaying its journal
    ///
    /// Only one process may have a data directory open at a time.
    pub async fn new(data_path: impl AsRef<Path>, config: AppConfig) -> Result<Self, AppError> {
        let data_path = data_path.as_ref();
        let journal_path = data_path.join("journal");
        let projection_path = data_path.join("projection.db");

        std::fs::create_dir_all(&journal_path).map_err(fantrade_events::EventError::from)?;

        let records = EventReader::from_directory(&journal_path)?.read_all()?;
        verify_chain(&records)?;

        let journal: Arc<dyn Journal> = Arc::new(JsonlJournal::open(&journal_path)?);
        let mut ctx = Self::build(config, journal)?;

        for record in &records {
            ctx.replay(&record.event);
        }
        ctx.replayed = records.len();
        ctx.journal_path = Some(journal_path);
        ctx.projection_path = Some(projection_path);

        tracing::info!(
            data = %data_path.display(),
            events = ctx.replayed,
            users = ctx.ledger.users().len(),
            open_orders = ctx.book.open_count(),
            "state rebuilt from journal"
        );

        Ok(ctx)
    }

    /// Context without a data directory; nothing survives the process
    pub fn in_memory(config: AppConfig) -> Result<Self, AppError> {
        Self::build(config, Arc::new(MemoryJournal::new()))
    }

    fn build(config: AppConfig, journal: Arc<dyn Journal>) -> Result<Self, AppError> {
        let starting_cash = config.starting_cash()?;
        let bus = EventBus::new(config.bus_capacity);

        let ledger = Arc::new(Ledger::new(journal.clone()));
        let book = Arc::new(OrderBook::new(journal.clone()));
        let ticks = Arc::new(TickBook::new(journal.clone()));
        let progression = Arc::new(ProgressionTracker::new(config.progression()));

        let engine = Arc::new(
            MatchingEngine::new(
                book.clone(),
                ledger.clone(),
                ticks.clone(),
                progression.clone(),
                journal,
            )
            .with_bus(bus.clone()),
        );

        Ok(Self {
            config,
            starting_cash,
            ledger,
            book,
            ticks,
            progression,
            engine,
            bus,
            journal_path: None,
            projection_path: None,
            replayed: 0,
        })
    }

    fn replay(&self, event: &MarketEvent) {
        self.ledger.replay(event);
        self.book.replay(event);
        self.ticks.replay(event);
        self.progression.replay(event);
    }

    /// Open an account with the configured starting cash
    pub fn register_user(&self, user_id: &str) -> Result<Portfolio, AppError> {
        let registration = self.ledger.register(user_id, self.starting_cash)?;
        self.bus.publish(registration.record.event);
        Ok(registration.portfolio)
    }

    /// Submit an order from raw fields
    pub fn submit_order(
        &self,
        user_id: &str,
        symbol: &str,
        side: &str,
        order_type: &str,
        quantity: i64,
        limit_price: Option<&str>,
    ) -> Result<Order, AppError> {
        let request =
            OrderRequest::parse(user_id, symbol, side, order_type, quantity, limit_price)?;
        self.submit(request)
    }

    /// Submit a typed order request. Unknown users are invalid orders.
    pub fn submit(&self, request: OrderRequest) -> Result<Order, AppError> {
        if !self.ledger.contains(request.user_id.trim()) {
            let reason = format!("unknown user '{}'", request.user_id);
            return Err(OrderError::InvalidOrder(reason).into());
        }

        let order = self.book.submit(request)?;
        self.bus.publish(MarketEvent::OrderSubmitted {
            order: order.clone(),
        });
        Ok(order)
    }

    pub fn cancel_order(&self, order_id: &str) -> Result<Order, AppError> {
        let order = self.book.cancel(order_id)?;
        self.bus.publish(MarketEvent::order_cancelled(&order));
        Ok(order)
    }

    pub fn get_portfolio(&self, user_id: &str) -> Result<Portfolio, AppError> {
        Ok(self.ledger.portfolio(user_id)?)
    }

    /// OPEN orders in FIFO order, optionally for one user
    pub fn get_open_orders(&self, user_id: Option<&str>) -> Vec<Order> {
        match user_id {
            Some(user_id) => self.book.list_open_for(user_id),
            None => self.book.list_open(),
        }
    }

    pub fn get_order(&self, order_id: &str) -> Result<Order, AppError> {
        self.book
            .get(order_id)
            .ok_or_else(|| OrderError::OrderNotFound(order_id.to_string()).into())
    }

    /// Every order of a user, terminal ones included
    pub fn get_order_history(&self, user_id: &str) -> Vec<Order> {
        self.book.history_for(user_id)
    }

    pub fn get_stats(&self, user_id: &str) -> Result<ProfileStats, AppError> {
        if !self.ledger.contains(user_id) {
            return Err(LedgerError::AccountNotFound(user_id.to_string()).into());
        }
        Ok(self.progression.stats(user_id))
    }

    /// Price ingestion entry point. Returns false for an out-of-order tick.
    pub fn record_tick(&self, tick: Tick) -> Result<bool, AppError> {
        let accepted = self.ticks.ingest(tick.clone())?;
        if accepted {
            self.bus.publish(MarketEvent::TickRecorded { tick });
        }
        Ok(accepted)
    }

    /// Latest tick per symbol
    pub fn latest_ticks(&self) -> Vec<Tick> {
        self.ticks.snapshot()
    }

    /// Run one matching cycle now
    pub async fn run_matching_cycle(&self) -> CycleReport {
        self.engine.run_cycle().await
    }

    /// Push channel of committed events
    pub fn subscribe(&self) -> broadcast::Receiver<MarketEvent> {
        self.bus.subscribe()
    }

    pub fn bus(&self) -> &EventBus {
        &self.bus
    }

    pub fn engine(&self) -> Arc<MatchingEngine> {
        self.engine.clone()
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Journal directory, if backed by disk
    pub fn journal_path(&self) -> Option<&Path> {
        self.journal_path.as_deref()
    }

    pub fn projection_path(&self) -> Option<&Path> {
        self.projection_path.as_deref()
    }

    /// Number of journal events replayed at startup
    pub fn replayed_events(&self) -> usize {
        self.replayed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fantrade_core::OrderStatus;
    use rust_decimal::Decimal;

    fn ctx() -> AppContext {
        AppContext::in_memory(AppConfig::default()).unwrap()
    }

    #[test]
    fn test_register_uses_starting_cash() {
        let ctx = ctx();
        let portfolio = ctx.register_user("alice").unwrap();
        assert_eq!(portfolio.cash, Decimal::new(10_000, 0));

        assert!(matches!(
            ctx.register_user("alice"),
            Err(AppError::Ledger(LedgerError::AccountExists(_)))
        ));
    }

    #[test]
    fn test_unknown_user_is_invalid_order() {
        let ctx = ctx();
        let result = ctx.submit_order("ghost", "ACME", "buy", "market", 1, None);
        assert!(matches!(result, Err(AppError::Order(OrderError::InvalidOrder(_)))));
        assert!(ctx.get_open_orders(None).is_empty());
    }

    #[test]
    fn test_submit_and_cancel() {
        let ctx = ctx();
        ctx.register_user("alice").unwrap();

        let order = ctx
            .submit_order("alice", "acme", "buy", "limit", 3, Some("9.5"))
            .unwrap();
        assert_eq!(ctx.get_open_orders(Some("alice")).len(), 1);

        let cancelled = ctx.cancel_order(&order.id).unwrap();
        assert_eq!(cancelled.status, OrderStatus::Cancelled);
        assert_eq!(ctx.get_order(&order.id).unwrap().status, OrderStatus::Cancelled);
        assert!(ctx.get_open_orders(None).is_empty());
    }

    #[test]
    fn test_stats_require_account() {
        let ctx = ctx();
        assert!(matches!(
            ctx.get_stats("ghost"),
            Err(AppError::Ledger(LedgerError::AccountNotFound(_)))
        ));

        ctx.register_user("alice").unwrap();
        assert_eq!(ctx.get_stats("alice").unwrap().xp, 0);
    }

    #[tokio::test]
    async fn test_events_are_pushed() {
        let ctx = ctx();
        let mut rx = ctx.subscribe();

        ctx.register_user("alice").unwrap();
        ctx.record_tick(Tick::new("ACME".parse().unwrap(), Decimal::new(10, 0), 1))
            .unwrap();
        ctx.submit_order("alice", "ACME", "buy", "market", 1, None).unwrap();
        ctx.run_matching_cycle().await;

        let mut kinds = Vec::new();
        while let Ok(event) = rx.try_recv() {
            kinds.push(event.kind());
        }
        assert_eq!(
            kinds,
            vec!["user_registered", "tick_recorded", "order_submitted", "order_filled"]
        );
    }
}
