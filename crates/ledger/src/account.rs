//! Account - one player's cash and share positions
//!
//! Fills are two-phase: `plan_fill` validates and computes the new values
//! without touching the account, and `apply` installs them. The caller
//! journals the fill between the two, so a failed append leaves the account
//! exactly as it was.

use fantrade_core::{Amount, OrderSide, Symbol, UserId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::LedgerError;
use crate::portfolio::{Portfolio, PositionView};

/// Shares held in one symbol. Never stored with zero shares.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    pub shares: u64,
    /// Weighted average purchase price
    pub avg_cost: Decimal,
}

/// Validated result of filling one order against an account
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FillPlan {
    pub user_id: UserId,
    pub symbol: Symbol,
    pub side: OrderSide,
    pub quantity: u64,
    pub price: Decimal,
    pub cash_after: Amount,
    /// `None` when the position is closed out
    pub position_after: Option<Position>,
    /// `(price - avg_cost) × qty` for sells, zero for buys
    pub realized_pnl: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    user_id: UserId,
    cash: Amount,
    positions: BTreeMap<Symbol, Position>,
}

impl Account {
    pub fn new(user_id: impl Into<UserId>, cash: Amount) -> Self {
        Self {
            user_id: user_id.into(),
            cash,
            positions: BTreeMap::new(),
        }
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn cash(&self) -> Amount {
        self.cash
    }

    pub fn position(&self, symbol: &Symbol) -> Option<&Position> {
        self.positions.get(symbol)
    }

    pub fn shares(&self, symbol: &Symbol) -> u64 {
        self.position(symbol).map_or(0, |p| p.shares)
    }

    /// Validate a fill and compute the account's values after it
    pub fn plan_fill(
        &self,
        side: OrderSide,
        symbol: &Symbol,
        quantity: u64,
        price: Decimal,
    ) -> Result<FillPlan, LedgerError> {
        let notional = Amount::notional(quantity, price).map_err(|_| LedgerError::Overflow)?;
        let current = self.positions.get(symbol).copied();

        let (cash_after, position_after, realized_pnl) = match side {
            OrderSide::Buy => {
                let cash_after = self.cash.checked_sub(&notional).ok_or_else(|| {
                    LedgerError::InsufficientFunds {
                        user_id: self.user_id.clone(),
                        required: notional.value(),
                        available: self.cash.value(),
                    }
                })?;
                let position = buy_into(current, quantity, price)?;
                (cash_after, Some(position), Decimal::ZERO)
            }
            OrderSide::Sell => {
                let held = current.map_or(0, |p| p.shares);
                let position = match current {
                    Some(position) if position.shares >= quantity => position,
                    _ => {
                        return Err(LedgerError::InsufficientShares {
                            user_id: self.user_id.clone(),
                            symbol: symbol.to_string(),
                            required: quantity,
                            held,
                        })
                    }
                };

                let cash_after = self
                    .cash
                    .checked_add(&notional)
                    .ok_or(LedgerError::Overflow)?;
                let realized_pnl = (price - position.avg_cost)
                    .checked_mul(Decimal::from(quantity))
                    .ok_or(LedgerError::Overflow)?;

                let remaining = position.shares - quantity;
                let position_after = (remaining > 0).then_some(Position {
                    shares: remaining,
                    avg_cost: position.avg_cost,
                });
                (cash_after, position_after, realized_pnl)
            }
        };

        Ok(FillPlan {
            user_id: self.user_id.clone(),
            symbol: symbol.clone(),
            side,
            quantity,
            price,
            cash_after,
            position_after,
            realized_pnl,
        })
    }

    /// Install a plan produced by `plan_fill` on this account
    pub fn apply(&mut self, plan: &FillPlan) {
        self.cash = plan.cash_after;
        match plan.position_after {
            Some(position) => {
                self.positions.insert(plan.symbol.clone(), position);
            }
            None => {
                self.positions.remove(&plan.symbol);
            }
        }
    }

    pub fn portfolio(&self) -> Portfolio {
        Portfolio {
            user_id: self.user_id.clone(),
            cash: self.cash.value(),
            positions: self
                .positions
                .iter()
                .map(|(symbol, position)| PositionView {
                    symbol: symbol.clone(),
                    shares: position.shares,
                    avg_cost: position.avg_cost,
                })
                .collect(),
        }
    }
}

/// `new_avg = (old_shares × old_avg + qty × price) / new_shares`
fn buy_into(
    current: Option<Position>,
    quantity: u64,
    price: Decimal,
) -> Result<Position, LedgerError> {
    let (old_shares, old_avg) = current.map_or((0, Decimal::ZERO), |p| (p.shares, p.avg_cost));
    let new_shares = old_shares.checked_add(quantity).ok_or(LedgerError::Overflow)?;

    let old_cost = Decimal::from(old_shares)
        .checked_mul(old_avg)
        .ok_or(LedgerError::Overflow)?;
    let added_cost = Decimal::from(quantity)
        .checked_mul(price)
        .ok_or(LedgerError::Overflow)?;
    let total_cost = old_cost.checked_add(added_cost).ok_or(LedgerError::Overflow)?;

    let avg_cost = total_cost
        .checked_div(Decimal::from(new_shares))
        .ok_or(LedgerError::Overflow)?;

    Ok(Position {
        shares: new_shares,
        avg_cost,
    })
}
