//! Matching engine - one polling cycle over the open orders

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use chrono::{DateTime, Utc};
use fantrade_bus::EventBus;
use fantrade_core::{Order, TradeRecord};
use fantrade_events::{Journal, MarketEvent};
use fantrade_ledger::{Account, Ledger, LedgerError};
use fantrade_oracle::PriceOracle;
use fantrade_orders::{OrderBook, OrderError};
use fantrade_progression::ProgressionTracker;
use rust_decimal::Decimal;
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;

use crate::error::FillError;
use crate::outcome::{CycleReport, Fill, FillOutcome, OrderOutcome, SkipReason};

/// Fills OPEN orders against the simulated market maker.
///
/// The engine is the only writer of fill-triggered cash and position changes.
/// Lock order inside a fill: order book, then the user's account, then
/// progression, then the journal.
pub struct MatchingEngine {
    book: Arc<OrderBook>,
    ledger: Arc<Ledger>,
    oracle: Arc<dyn PriceOracle>,
    progression: Arc<ProgressionTracker>,
    journal: Arc<dyn Journal>,
    bus: Option<EventBus>,
}

impl MatchingEngine {
    pub fn new(
        book: Arc<OrderBook>,
        ledger: Arc<Ledger>,
        oracle: Arc<dyn PriceOracle>,
        progression: Arc<ProgressionTracker>,
        journal: Arc<dyn Journal>,
    ) -> Self {
        Self {
            book,
            ledger,
            oracle,
            progression,
            journal,
            bus: None,
        }
    }

    /// Publish committed fills on `bus`
    pub fn with_bus(mut self, bus: EventBus) -> Self {
        self.bus = Some(bus);
        self
    }

    /// Evaluate every OPEN order once, oldest first.
    ///
    /// Safe to call at any time and repeatedly: terminal orders are never
    /// listed, so a second call does not re-fill anything. No outcome aborts
    /// the cycle.
    pub async fn run_cycle(&self) -> CycleReport {
        let open = self.book.list_open();
        let mut report = CycleReport::default();

        for order in open {
            let outcome = self.evaluate(&order).await;
            log_outcome(&order, &outcome);
            report.outcomes.push(OrderOutcome {
                order_id: order.id,
                user_id: order.user_id,
                symbol: order.symbol,
                outcome,
            });
        }

        if report.evaluated() > 0 {
            tracing::debug!(
                evaluated = report.evaluated(),
                filled = report.filled(),
                skipped = report.skipped(),
                failed = report.failed(),
                "matching cycle complete"
            );
        }

        report
    }

    /// Run a cycle every `interval` until `shutdown` flips to true or its
    /// sender is dropped. A cycle in flight always completes.
    pub async fn run(&self, interval: Duration, mut shutdown: watch::Receiver<bool>) {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        tracing::info!(interval_ms = interval.as_millis() as u64, "matching engine started");

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.run_cycle().await;
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }

        tracing::info!("matching engine stopped");
    }

    async fn evaluate(&self, order: &Order) -> FillOutcome {
        let Some(price) = self.oracle.latest_price(&order.symbol).await else {
            return FillOutcome::Skipped(SkipReason::PriceUnavailable);
        };

        if !order.is_eligible_at(price) {
            return FillOutcome::Skipped(SkipReason::PriceNotEligible { price });
        }

        let account = match self.ledger.account(&order.user_id) {
            Ok(account) => account,
            Err(e) => return FillOutcome::Failed(e.into()),
        };

        let executed_at = Utc::now();
        let result = self.book.fill_with(&order.id, executed_at, |current| {
            self.fill(current, &account, price, executed_at)
        });

        match result {
            Ok(fill) => {
                if let Some(bus) = &self.bus {
                    bus.publish(MarketEvent::OrderFilled {
                        trade: fill.trade.clone(),
                        realized_pnl: fill.realized_pnl,
                    });
                }
                FillOutcome::Filled(fill)
            }
            Err(FillError::Order(OrderError::NotOpen { .. })) => {
                FillOutcome::Skipped(SkipReason::NoLongerOpen)
            }
            Err(FillError::Ledger(LedgerError::InsufficientFunds { .. })) => {
                FillOutcome::Skipped(SkipReason::InsufficientFunds)
            }
            Err(FillError::Ledger(LedgerError::InsufficientShares { .. })) => {
                FillOutcome::Skipped(SkipReason::InsufficientShares)
            }
            Err(e) => FillOutcome::Failed(e),
        }
    }

    /// Runs under the book lock with the order confirmed OPEN. Nothing is
    /// mutated unless the journal append succeeds.
    fn fill(
        &self,
        order: &Order,
        account: &Mutex<Account>,
        price: Decimal,
        executed_at: DateTime<Utc>,
    ) -> Result<Fill, FillError> {
        let mut account = account.lock().unwrap_or_else(PoisonError::into_inner);

        let plan = account.plan_fill(order.side, &order.symbol, order.quantity, price)?;
        let trade = TradeRecord::for_order(order, price, executed_at);

        self.journal.append(&MarketEvent::OrderFilled {
            trade: trade.clone(),
            realized_pnl: plan.realized_pnl,
        })?;

        account.apply(&plan);
        let progress = self
            .progression
            .record(&order.user_id, order.side, plan.realized_pnl, executed_at);

        Ok(Fill {
            trade,
            realized_pnl: plan.realized_pnl,
            cash_after: plan.cash_after,
            progress,
        })
    }
}

fn log_outcome(order: &Order, outcome: &FillOutcome) {
    match outcome {
        FillOutcome::Filled(fill) => tracing::info!(
            order_id = %order.id,
            user_id = %order.user_id,
            symbol = %order.symbol,
            side = %order.side,
            quantity = order.quantity,
            price = %fill.trade.price,
            realized_pnl = %fill.realized_pnl,
            xp_gained = fill.progress.xp_gained,
            "order filled"
        ),
        FillOutcome::Skipped(reason) => tracing::debug!(
            order_id = %order.id,
            symbol = %order.symbol,
            %reason,
            "order skipped"
        ),
        FillOutcome::Failed(e @ FillError::Journal(_)) => tracing::error!(
            order_id = %order.id,
            error = %e,
            "fill not committed"
        ),
        FillOutcome::Failed(e) => tracing::warn!(
            order_id = %order.id,
            error = %e,
            "fill failed"
        ),
    }
}
