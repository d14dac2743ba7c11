//! Order types shared by the order book, the matcher and the journal

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

use crate::Symbol;

/// Unique order identifier (UUID v4)
pub type OrderId = String;

/// Player identifier
pub type UserId = String;

/// Order side (buy or sell)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumString, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum OrderSide {
    Buy,
    Sell,
}

/// Order type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumString, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum OrderType {
    /// Fills at whatever the current quote is
    Market,
    /// Fills only when the quote is at or better than `limit_price`
    Limit,
}

/// Order status
///
/// `Filled` and `Cancelled` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumString, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum OrderStatus {
    Open,
    Filled,
    Cancelled,
}

impl OrderStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, OrderStatus::Open)
    }
}

/// An order against the simulated market maker
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    /// Unique order ID
    pub id: OrderId,
    /// Submission sequence, FIFO tie-break for equal `created_at`
    pub seq: u64,
    /// Player who placed the order
    pub user_id: UserId,
    pub symbol: Symbol,
    pub side: OrderSide,
    pub order_type: OrderType,
    /// Whole shares, always > 0
    pub quantity: u64,
    /// Present iff `order_type == Limit`
    pub limit_price: Option<Decimal>,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    pub fn is_open(&self) -> bool {
        self.status == OrderStatus::Open
    }

    /// Whether a quote at `price` satisfies this order's price condition.
    ///
    /// - market: always
    /// - limit buy: `price <= limit_price`
    /// - limit sell: `price >= limit_price`
    pub fn is_eligible_at(&self, price: Decimal) -> bool {
        match (self.order_type, self.limit_price) {
            (OrderType::Market, _) => true,
            (OrderType::Limit, Some(limit)) => match self.side {
                OrderSide::Buy => price <= limit,
                OrderSide::Sell => price >= limit,
            },
            // Rejected at submission; never eligible if it slips through.
            (OrderType::Limit, None) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn order(side: OrderSide, order_type: OrderType, limit: Option<Decimal>) -> Order {
        let now = Utc::now();
        Order {
            id: "o-1".to_string(),
            seq: 1,
            user_id: "alice".to_string(),
            symbol: "ACME".parse().unwrap(),
            side,
            order_type,
            quantity: 10,
            limit_price: limit,
            status: OrderStatus::Open,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_market_always_eligible() {
        let o = order(OrderSide::Buy, OrderType::Market, None);
        assert!(o.is_eligible_at(dec!(0.01)));
        assert!(o.is_eligible_at(dec!(1000000)));
    }

    #[test]
    fn test_limit_buy_boundary_inclusive() {
        let o = order(OrderSide::Buy, OrderType::Limit, Some(dec!(100.00)));
        assert!(o.is_eligible_at(dec!(100.00)));
        assert!(o.is_eligible_at(dec!(99.99)));
        assert!(!o.is_eligible_at(dec!(100.01)));
    }

    #[test]
    fn test_limit_sell_boundary_inclusive() {
        let o = order(OrderSide::Sell, OrderType::Limit, Some(dec!(100.00)));
        assert!(o.is_eligible_at(dec!(100.00)));
        assert!(o.is_eligible_at(dec!(150)));
        assert!(!o.is_eligible_at(dec!(99.99)));
    }

    #[test]
    fn test_parse_side_and_type() {
        assert_eq!("BUY".parse::<OrderSide>().unwrap(), OrderSide::Buy);
        assert_eq!("sell".parse::<OrderSide>().unwrap(), OrderSide::Sell);
        assert_eq!("Limit".parse::<OrderType>().unwrap(), OrderType::Limit);
        assert!("short".parse::<OrderSide>().is_err());
        assert!("stop".parse::<OrderType>().is_err());
    }

    #[test]
    fn test_status_display() {
        assert_eq!(OrderStatus::Cancelled.to_string(), "cancelled");
        assert!(OrderStatus::Filled.is_terminal());
        assert!(!OrderStatus::Open.is_terminal());
    }
}
