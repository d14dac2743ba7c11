//! Order book - every order by id plus a FIFO index of the open ones

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, PoisonError};

use chrono::{DateTime, Utc};
use fantrade_core::{Order, OrderId, OrderStatus};
use fantrade_events::{Journal, MarketEvent, MemoryJournal};
use uuid::Uuid;

use crate::error::OrderError;
use crate::request::OrderRequest;

#[derive(Debug, Default)]
struct BookState {
    /// All orders ever submitted, terminal ones included
    orders: HashMap<OrderId, Order>,
    /// Open orders keyed by sequence. `created_at` is monotonic in `seq`,
    /// so this is FIFO by (`created_at`, `seq`).
    open: BTreeMap<u64, OrderId>,
    last_seq: u64,
    last_created_at: Option<DateTime<Utc>>,
}

impl BookState {
    fn next_timestamp(&mut self) -> DateTime<Utc> {
        let now = Utc::now();
        let ts = match self.last_created_at {
            Some(last) if last > now => last,
            _ => now,
        };
        self.last_created_at = Some(ts);
        ts
    }

    fn insert(&mut self, order: Order) {
        self.last_seq = self.last_seq.max(order.seq);
        self.last_created_at = self.last_created_at.max(Some(order.created_at));
        if order.is_open() {
            self.open.insert(order.seq, order.id.clone());
        }
        self.orders.insert(order.id.clone(), order);
    }

    fn close(&mut self, order_id: &str, status: OrderStatus, at: DateTime<Utc>) {
        if let Some(order) = self.orders.get_mut(order_id) {
            order.status = status;
            order.updated_at = at;
            self.open.remove(&order.seq);
        }
    }

    fn open_orders(&self) -> impl Iterator<Item = &Order> {
        self.open.values().filter_map(|id| self.orders.get(id))
    }
}

/// The order book.
///
/// Submissions and cancellations are journaled while the book lock is held,
/// so the journal order equals the order in which state changed here.
pub struct OrderBook {
    state: Mutex<BookState>,
    journal: Arc<dyn Journal>,
}

impl OrderBook {
    pub fn new(journal: Arc<dyn Journal>) -> Self {
        Self {
            state: Mutex::new(BookState::default()),
            journal,
        }
    }

    /// Order book backed by a throwaway in-memory journal
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryJournal::new()))
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, BookState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Validate and accept a new order as OPEN
    pub fn submit(&self, request: OrderRequest) -> Result<Order, OrderError> {
        let valid = request.validate()?;

        let mut state = self.lock();
        let created_at = state.next_timestamp();
        let order = Order {
            id: Uuid::new_v4().to_string(),
            seq: state.last_seq + 1,
            user_id: valid.user_id,
            symbol: valid.symbol,
            side: request.side,
            order_type: request.order_type,
            quantity: valid.quantity,
            limit_price: request.limit_price,
            status: OrderStatus::Open,
            created_at,
            updated_at: created_at,
        };

        self.journal.append(&MarketEvent::OrderSubmitted {
            order: order.clone(),
        })?;
        state.insert(order.clone());

        tracing::info!(
            order_id = %order.id,
            user_id = %order.user_id,
            symbol = %order.symbol,
            side = %order.side,
            order_type = %order.order_type,
            quantity = order.quantity,
            "order submitted"
        );

        Ok(order)
    }

    /// Cancel an OPEN order
    pub fn cancel(&self, order_id: &str) -> Result<Order, OrderError> {
        let mut state = self.lock();

        let order = state
            .orders
            .get(order_id)
            .ok_or_else(|| OrderError::OrderNotFound(order_id.to_string()))?;

        if !order.is_open() {
            return Err(OrderError::NotCancellable {
                order_id: order.id.clone(),
                status: order.status,
            });
        }

        let mut cancelled = order.clone();
        cancelled.status = OrderStatus::Cancelled;
        cancelled.updated_at = Utc::now().max(order.created_at);

        self.journal.append(&MarketEvent::order_cancelled(&cancelled))?;
        state.close(order_id, OrderStatus::Cancelled, cancelled.updated_at);

        tracing::info!(order_id = %cancelled.id, user_id = %cancelled.user_id, "order cancelled");
        Ok(cancelled)
    }

    /// Claim an OPEN order for filling.
    ///
    /// Under the book lock: checks the order is still OPEN, runs `fill`, and
    /// marks the order FILLED at `filled_at` only if `fill` returns `Ok`. An
    /// error from `fill` leaves the order OPEN. A concurrent cancel therefore
    /// either happens entirely before (fill sees `NotOpen`) or entirely after
    /// (cancel sees `NotCancellable`).
    pub fn fill_with<T, E, F>(
        &self,
        order_id: &str,
        filled_at: DateTime<Utc>,
        fill: F,
    ) -> Result<T, E>
    where
        E: From<OrderError>,
        F: FnOnce(&Order) -> Result<T, E>,
    {
        let mut state = self.lock();

        let order = state
            .orders
            .get(order_id)
            .ok_or_else(|| OrderError::OrderNotFound(order_id.to_string()))?;

        if !order.is_open() {
            return Err(OrderError::NotOpen {
                order_id: order.id.clone(),
                status: order.status,
            }
            .into());
        }

        let result = fill(order)?;
        state.close(order_id, OrderStatus::Filled, filled_at);
        Ok(result)
    }

    /// Apply a journaled event without re-journaling it
    pub fn replay(&self, event: &MarketEvent) {
        let mut state = self.lock();
        match event {
            MarketEvent::OrderSubmitted { order } => state.insert(order.clone()),
            MarketEvent::OrderCancelled { order_id, at, .. } => {
                state.close(order_id, OrderStatus::Cancelled, *at)
            }
            MarketEvent::OrderFilled { trade, .. } => {
                state.close(&trade.order_id, OrderStatus::Filled, trade.executed_at)
            }
            _ => {}
        }
    }

    pub fn get(&self, order_id: &str) -> Option<Order> {
        self.lock().orders.get(order_id).cloned()
    }

    /// All OPEN orders, FIFO by (`created_at`, `seq`)
    pub fn list_open(&self) -> Vec<Order> {
        self.lock().open_orders().cloned().collect()
    }

    /// OPEN orders of one user, FIFO
    pub fn list_open_for(&self, user_id: &str) -> Vec<Order> {
        self.lock()
            .open_orders()
            .filter(|order| order.user_id == user_id)
            .cloned()
            .collect()
    }

    /// Every order of one user in submission order, terminal ones included
    pub fn history_for(&self, user_id: &str) -> Vec<Order> {
        let state = self.lock();
        let mut orders: Vec<Order> = state
            .orders
            .values()
            .filter(|order| order.user_id == user_id)
            .cloned()
            .collect();
        orders.sort_by_key(|order| order.seq);
        orders
    }

    pub fn open_count(&self) -> usize {
        self.lock().open.len()
    }

    pub fn len(&self) -> usize {
        self.lock().orders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for OrderBook {
    fn default() -> Self {
        Self::in_memory()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fantrade_core::OrderSide;
    use rust_decimal_macros::dec;

    fn market_buy(user: &str, qty: i64) -> OrderRequest {
        OrderRequest::builder()
            .user(user)
            .symbol("ACME")
            .buy()
            .market()
            .quantity(qty)
            .build()
            .unwrap()
    }

    #[test]
    fn test_submit_assigns_id_and_seq() -> anyhow::Result<()> {
        let journal = Arc::new(MemoryJournal::new());
        let book = OrderBook::new(journal.clone());

        let first = book.submit(market_buy("alice", 1))?;
        let second = book.submit(market_buy("bob", 2))?;

        assert_eq!(first.status, OrderStatus::Open);
        assert_ne!(first.id, second.id);
        assert!(second.seq > first.seq);
        assert!(second.created_at >= first.created_at);
        assert_eq!(journal.events().len(), 2);
        Ok(())
    }

    #[test]
    fn test_invalid_order_never_enters_book() {
        let journal = Arc::new(MemoryJournal::new());
        let book = OrderBook::new(journal.clone());

        let request = OrderRequest::parse("alice", "ACME", "buy", "market", 0, None).unwrap();
        assert!(matches!(book.submit(request), Err(OrderError::InvalidOrder(_))));

        assert!(book.is_empty());
        assert!(journal.events().is_empty());
    }

    #[test]
    fn test_list_open_is_fifo() -> anyhow::Result<()> {
        let book = OrderBook::in_memory();
        let a = book.submit(market_buy("alice", 1))?;
        let b = book.submit(market_buy("bob", 1))?;
        let c = book.submit(market_buy("alice", 1))?;

        let ids: Vec<_> = book.list_open().into_iter().map(|o| o.id).collect();
        assert_eq!(ids, vec![a.id.clone(), b.id, c.id.clone()]);

        let alice: Vec<_> = book.list_open_for("alice").into_iter().map(|o| o.id).collect();
        assert_eq!(alice, vec![a.id, c.id]);
        Ok(())
    }

    #[test]
    fn test_cancel_open_order() -> anyhow::Result<()> {
        let book = OrderBook::in_memory();
        let order = book.submit(market_buy("alice", 1))?;

        let cancelled = book.cancel(&order.id)?;
        assert_eq!(cancelled.status, OrderStatus::Cancelled);
        assert!(book.list_open().is_empty());

        let again = book.cancel(&order.id);
        assert!(matches!(
            again,
            Err(OrderError::NotCancellable {
                status: OrderStatus::Cancelled,
                ..
            })
        ));
        Ok(())
    }

    #[test]
    fn test_cancel_unknown_order() {
        let book = OrderBook::in_memory();
        assert!(matches!(book.cancel("nope"), Err(OrderError::OrderNotFound(_))));
    }

    #[test]
    fn test_fill_with_marks_filled_on_success() -> anyhow::Result<()> {
        let book = OrderBook::in_memory();
        let order = book.submit(market_buy("alice", 4))?;

        let qty = book.fill_with(&order.id, Utc::now(), |o| Ok::<_, OrderError>(o.quantity))?;
        assert_eq!(qty, 4);

        let filled = book.get(&order.id).unwrap();
        assert_eq!(filled.status, OrderStatus::Filled);
        assert!(book.list_open().is_empty());

        // A filled order cannot be cancelled
        assert!(matches!(
            book.cancel(&order.id),
            Err(OrderError::NotCancellable {
                status: OrderStatus::Filled,
                ..
            })
        ));
        Ok(())
    }

    #[test]
    fn test_fill_with_failure_leaves_order_open() -> anyhow::Result<()> {
        let book = OrderBook::in_memory();
        let order = book.submit(market_buy("alice", 1))?;

        let result: Result<(), OrderError> = book.fill_with(&order.id, Utc::now(), |_| {
            Err(OrderError::InvalidOrder("refused".to_string()))
        });
        assert!(result.is_err());
        assert_eq!(book.get(&order.id).unwrap().status, OrderStatus::Open);
        assert_eq!(book.open_count(), 1);
        Ok(())
    }

    #[test]
    fn test_cancelled_order_is_never_filled() -> anyhow::Result<()> {
        let book = OrderBook::in_memory();
        let order = book.submit(market_buy("alice", 1))?;
        book.cancel(&order.id)?;

        let mut ran = false;
        let result = book.fill_with(&order.id, Utc::now(), |_| {
            ran = true;
            Ok::<_, OrderError>(())
        });

        assert!(matches!(result, Err(OrderError::NotOpen { .. })));
        assert!(!ran);
        Ok(())
    }

    #[test]
    fn test_replay_rebuilds_book() -> anyhow::Result<()> {
        let journal = Arc::new(MemoryJournal::new());
        let book = OrderBook::new(journal.clone());

        let kept = book.submit(market_buy("alice", 1))?;
        let gone = book.submit(
            OrderRequest::builder()
                .user("bob")
                .symbol("ACME")
                .sell()
                .limit(dec!(12.5))
                .quantity(2)
                .build()?,
        )?;
        book.cancel(&gone.id)?;

        let rebuilt = OrderBook::in_memory();
        for event in journal.events() {
            rebuilt.replay(&event);
        }

        assert_eq!(rebuilt.list_open(), book.list_open());
        assert_eq!(rebuilt.get(&gone.id), book.get(&gone.id));
        assert_eq!(rebuilt.get(&kept.id).map(|o| o.side), Some(OrderSide::Buy));

        // Sequence continues after replay
        let next = rebuilt.submit(market_buy("carol", 1))?;
        assert!(next.seq > gone.seq);
        Ok(())
    }

    #[test]
    fn test_history_for_user() -> anyhow::Result<()> {
        let book = OrderBook::in_memory();
        let first = book.submit(market_buy("alice", 1))?;
        book.submit(market_buy("bob", 1))?;
        let second = book.submit(market_buy("alice", 2))?;
        book.cancel(&first.id)?;

        let history: Vec<_> = book.history_for("alice").into_iter().map(|o| o.id).collect();
        assert_eq!(history, vec![first.id, second.id]);
        Ok(())
    }
}
