//! Order book errors

use fantrade_core::{OrderId, OrderStatus};
use fantrade_events::EventError;
use thiserror::Error;

/// Order book errors
#[derive(Debug, Error)]
pub enum OrderError {
    /// Rejected at submission; never entered the book
    #[error("Invalid order: {0}")]
    InvalidOrder(String),

    #[error("Order not found: {0}")]
    OrderNotFound(OrderId),

    /// Cancel attempted on a FILLED or CANCELLED order
    #[error("Order {order_id} cannot be cancelled: status is {status}")]
    NotCancellable {
        order_id: OrderId,
        status: OrderStatus,
    },

    /// Fill attempted on an order that is no longer OPEN
    #[error("Order {order_id} is no longer open: status is {status}")]
    NotOpen {
        order_id: OrderId,
        status: OrderStatus,
    },

    #[error("Journal error: {0}")]
    Journal(#[from] EventError),
}
