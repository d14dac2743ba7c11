//! Per-order outcomes and cycle reports

use fantrade_core::{Amount, OrderId, Symbol, TradeRecord, UserId};
use fantrade_progression::ProgressUpdate;
use rust_decimal::Decimal;
use std::fmt;

use crate::error::FillError;

/// A committed fill
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fill {
    pub trade: TradeRecord,
    pub realized_pnl: Decimal,
    pub cash_after: Amount,
    pub progress: ProgressUpdate,
}

/// Why an order was left OPEN this cycle. All of these are retried next cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The oracle has no tick for the symbol
    PriceUnavailable,
    /// Limit condition not met at `price`
    PriceNotEligible { price: Decimal },
    InsufficientFunds,
    InsufficientShares,
    /// Cancelled (or filled) between listing and claiming
    NoLongerOpen,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::PriceUnavailable => write!(f, "price unavailable"),
            SkipReason::PriceNotEligible { price } => write!(f, "price {} not eligible", price),
            SkipReason::InsufficientFunds => write!(f, "insufficient funds"),
            SkipReason::InsufficientShares => write!(f, "insufficient shares"),
            SkipReason::NoLongerOpen => write!(f, "no longer open"),
        }
    }
}

#[derive(Debug)]
pub enum FillOutcome {
    Filled(Fill),
    Skipped(SkipReason),
    Failed(FillError),
}

impl FillOutcome {
    pub fn is_filled(&self) -> bool {
        matches!(self, FillOutcome::Filled(_))
    }
}

/// Outcome of evaluating one order
#[derive(Debug)]
pub struct OrderOutcome {
    pub order_id: OrderId,
    pub user_id: UserId,
    pub symbol: Symbol,
    pub outcome: FillOutcome,
}

/// Result of one matching cycle, in evaluation (FIFO) order
#[derive(Debug, Default)]
pub struct CycleReport {
    pub outcomes: Vec<OrderOutcome>,
}

impl CycleReport {
    pub fn evaluated(&self) -> usize {
        self.outcomes.len()
    }

    pub fn filled(&self) -> usize {
        self.count(|o| matches!(o, FillOutcome::Filled(_)))
    }

    pub fn skipped(&self) -> usize {
        self.count(|o| matches!(o, FillOutcome::Skipped(_)))
    }

    pub fn failed(&self) -> usize {
        self.count(|o| matches!(o, FillOutcome::Failed(_)))
    }

    pub fn fills(&self) -> impl Iterator<Item = &Fill> {
        self.outcomes.iter().filter_map(|o| match &o.outcome {
            FillOutcome::Filled(fill) => Some(fill),
            _ => None,
        })
    }

    pub fn outcome_for(&self, order_id: &str) -> Option<&FillOutcome> {
        self.outcomes
            .iter()
            .find(|o| o.order_id == order_id)
            .map(|o| &o.outcome)
    }

    fn count(&self, pred: impl Fn(&FillOutcome) -> bool) -> usize {
        self.outcomes.iter().filter(|o| pred(&o.outcome)).count()
    }
}

impl fmt::Display for CycleReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "evaluated {} orders: {} filled, {} skipped, {} failed",
            self.evaluated(),
            self.filled(),
            self.skipped(),
            self.failed()
        )
    }
}
