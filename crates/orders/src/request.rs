//! Order requests and their validation

use fantrade_core::{OrderSide, OrderType, Symbol, UserId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::OrderError;

/// An order as submitted, before the book assigns an id and sequence.
///
/// `quantity` is signed so that non-positive input can be rejected with a
/// clear reason instead of failing to parse.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderRequest {
    pub user_id: UserId,
    pub symbol: String,
    pub side: OrderSide,
    pub order_type: OrderType,
    pub quantity: i64,
    pub limit_price: Option<Decimal>,
}

/// Fields of a request that passed validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ValidatedRequest {
    pub user_id: UserId,
    pub symbol: Symbol,
    pub quantity: u64,
}

impl OrderRequest {
    pub fn builder() -> OrderRequestBuilder {
        OrderRequestBuilder::new()
    }

    /// Build a request from raw text fields (CLI and transport edge)
    pub fn parse(
        user_id: &str,
        symbol: &str,
        side: &str,
        order_type: &str,
        quantity: i64,
        limit_price: Option<&str>,
    ) -> Result<Self, OrderError> {
        let side = OrderSide::from_str(side.trim())
            .map_err(|_| OrderError::InvalidOrder(format!("unknown side '{}'", side)))?;
        let order_type = OrderType::from_str(order_type.trim())
            .map_err(|_| OrderError::InvalidOrder(format!("unknown order type '{}'", order_type)))?;
        let limit_price = limit_price
            .map(|raw| {
                Decimal::from_str(raw.trim()).map_err(|_| {
                    OrderError::InvalidOrder(format!("limit price '{}' is not a number", raw))
                })
            })
            .transpose()?;

        Ok(Self {
            user_id: user_id.to_string(),
            symbol: symbol.to_string(),
            side,
            order_type,
            quantity,
            limit_price,
        })
    }

    pub(crate) fn validate(&self) -> Result<ValidatedRequest, OrderError> {
        let user_id = self.user_id.trim();
        if user_id.is_empty() {
            return Err(OrderError::InvalidOrder("user id is empty".to_string()));
        }

        if self.quantity <= 0 {
            return Err(OrderError::InvalidOrder(format!(
                "quantity must be positive, got {}",
                self.quantity
            )));
        }

        let symbol = Symbol::from_str(&self.symbol)
            .map_err(|e| OrderError::InvalidOrder(e.to_string()))?;

        match (self.order_type, self.limit_price) {
            (OrderType::Limit, None) => {
                return Err(OrderError::InvalidOrder(
                    "limit order requires a limit price".to_string(),
                ));
            }
            (OrderType::Limit, Some(price)) if price <= Decimal::ZERO => {
                return Err(OrderError::InvalidOrder(format!(
                    "limit price must be positive, got {}",
                    price
                )));
            }
            (OrderType::Market, Some(_)) => {
                return Err(OrderError::InvalidOrder(
                    "market order must not carry a limit price".to_string(),
                ));
            }
            _ => {}
        }

        Ok(ValidatedRequest {
            user_id: user_id.to_string(),
            symbol,
            quantity: self.quantity as u64,
        })
    }
}

/// Builder for order requests with validation
#[derive(Debug, Default)]
pub struct OrderRequestBuilder {
    user_id: Option<UserId>,
    symbol: Option<String>,
    side: Option<OrderSide>,
    order_type: Option<OrderType>,
    quantity: Option<i64>,
    limit_price: Option<Decimal>,
}

impl OrderRequestBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn user(mut self, user_id: impl Into<UserId>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    pub fn symbol(mut self, symbol: impl Into<String>) -> Self {
        self.symbol = Some(symbol.into());
        self
    }

    pub fn side(mut self, side: OrderSide) -> Self {
        self.side = Some(side);
        self
    }

    pub fn buy(self) -> Self {
        self.side(OrderSide::Buy)
    }

    pub fn sell(self) -> Self {
        self.side(OrderSide::Sell)
    }

    pub fn market(mut self) -> Self {
        self.order_type = Some(OrderType::Market);
        self.limit_price = None;
        self
    }

    pub fn limit(mut self, price: Decimal) -> Self {
        self.order_type = Some(OrderType::Limit);
        self.limit_price = Some(price);
        self
    }

    pub fn quantity(mut self, quantity: i64) -> Self {
        self.quantity = Some(quantity);
        self
    }

    pub fn build(self) -> Result<OrderRequest, OrderError> {
        let missing = |field: &str| OrderError::InvalidOrder(format!("{} is required", field));

        let request = OrderRequest {
            user_id: self.user_id.ok_or_else(|| missing("user"))?,
            symbol: self.symbol.ok_or_else(|| missing("symbol"))?,
            side: self.side.ok_or_else(|| missing("side"))?,
            order_type: self.order_type.ok_or_else(|| missing("order type"))?,
            quantity: self.quantity.ok_or_else(|| missing("quantity"))?,
            limit_price: self.limit_price,
        };

        request.validate()?;
        Ok(request)
    }
}
