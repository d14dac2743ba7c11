//! Price ticks and executed trades

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::order::{Order, OrderId, OrderSide, UserId};
use crate::Symbol;

/// One observed price sample for a symbol
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tick {
    pub symbol: Symbol,
    pub price: Decimal,
    pub volume: u64,
    pub timestamp: DateTime<Utc>,
}

impl Tick {
    pub fn new(symbol: Symbol, price: Decimal, volume: u64) -> Self {
        Self {
            symbol,
            price,
            volume,
            timestamp: Utc::now(),
        }
    }

    pub fn at(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }
}

/// Immutable record of one fill.
///
/// The counterparty is always the simulated market maker, so exactly one of
/// `buyer_id` / `seller_id` is set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradeRecord {
    pub order_id: OrderId,
    pub symbol: Symbol,
    pub price: Decimal,
    pub quantity: u64,
    pub buyer_id: Option<UserId>,
    pub seller_id: Option<UserId>,
    pub executed_at: DateTime<Utc>,
}

impl TradeRecord {
    /// Trade for a full fill of `order` at `price`
    pub fn for_order(order: &Order, price: Decimal, executed_at: DateTime<Utc>) -> Self {
        let (buyer_id, seller_id) = match order.side {
            OrderSide::Buy => (Some(order.user_id.clone()), None),
            OrderSide::Sell => (None, Some(order.user_id.clone())),
        };
        Self {
            order_id: order.id.clone(),
            symbol: order.symbol.clone(),
            price,
            quantity: order.quantity,
            buyer_id,
            seller_id,
            executed_at,
        }
    }

    /// The player side of the trade
    pub fn user_id(&self) -> Option<&str> {
        self.buyer_id.as_deref().or(self.seller_id.as_deref())
    }

    pub fn side(&self) -> OrderSide {
        if self.buyer_id.is_some() {
            OrderSide::Buy
        } else {
            OrderSide::Sell
        }
    }
}
