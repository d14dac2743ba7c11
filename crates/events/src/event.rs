//! Market events - everything that changes durable state

use chrono::{DateTime, Utc};
use fantrade_core::{Amount, Order, OrderId, Tick, TradeRecord, UserId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A state change recorded in the journal and published on the bus.
///
/// Replaying these in journal order rebuilds every in-memory store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MarketEvent {
    /// A player account was opened with its starting cash
    UserRegistered {
        user_id: UserId,
        starting_cash: Amount,
        at: DateTime<Utc>,
    },

    /// An order entered the book as OPEN
    OrderSubmitted { order: Order },

    /// An OPEN order was cancelled
    OrderCancelled {
        order_id: OrderId,
        user_id: UserId,
        at: DateTime<Utc>,
    },

    /// An OPEN order was filled in full against the market maker
    OrderFilled {
        trade: TradeRecord,
        /// `(price - avg_cost) × qty` for sells, zero for buys
        realized_pnl: Decimal,
    },

    /// A price sample was ingested
    TickRecorded { tick: Tick },
}

impl MarketEvent {
    pub fn user_registered(user_id: impl Into<UserId>, starting_cash: Amount) -> Self {
        Self::UserRegistered {
            user_id: user_id.into(),
            starting_cash,
            at: Utc::now(),
        }
    }

    pub fn order_cancelled(order: &Order) -> Self {
        Self::OrderCancelled {
            order_id: order.id.clone(),
            user_id: order.user_id.clone(),
            at: order.updated_at,
        }
    }

    /// Short name used in logs
    pub fn kind(&self) -> &'static str {
        match self {
            MarketEvent::UserRegistered { .. } => "user_registered",
            MarketEvent::OrderSubmitted { .. } => "order_submitted",
            MarketEvent::OrderCancelled { .. } => "order_cancelled",
            MarketEvent::OrderFilled { .. } => "order_filled",
            MarketEvent::TickRecorded { .. } => "tick_recorded",
        }
    }

    /// The player this event belongs to, if any
    pub fn user_id(&self) -> Option<&str> {
        match self {
            MarketEvent::UserRegistered { user_id, .. } => Some(user_id),
            MarketEvent::OrderSubmitted { order } => Some(&order.user_id),
            MarketEvent::OrderCancelled { user_id, .. } => Some(user_id),
            MarketEvent::OrderFilled { trade, .. } => trade.user_id(),
            MarketEvent::TickRecorded { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_tagged_json() {
        let tick = Tick::new("ACME".parse().unwrap(), dec!(101.25), 500);
        let event = MarketEvent::TickRecorded { tick };

        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"type\":\"tick_recorded\""));

        let parsed: MarketEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, event);
    }

    #[test]
    fn test_user_id() {
        let event = MarketEvent::user_registered("alice", Amount::ZERO);
        assert_eq!(event.user_id(), Some("alice"));
        assert_eq!(event.kind(), "user_registered");
    }
}
