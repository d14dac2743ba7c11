//! TickBook - in-memory latest tick per symbol

use async_trait::async_trait;
use fantrade_core::{Symbol, Tick};
use fantrade_events::{Journal, MarketEvent, MemoryJournal};
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use crate::error::OracleError;
use crate::types::PriceOracle;

/// Latest tick per symbol, fed by the simulator or the CLI.
///
/// Accepted ticks are journaled while the write lock is held so the journal
/// order matches the order prices were observed.
pub struct TickBook {
    ticks: RwLock<HashMap<Symbol, Tick>>,
    journal: Arc<dyn Journal>,
}

impl TickBook {
    pub fn new(journal: Arc<dyn Journal>) -> Self {
        Self {
            ticks: RwLock::new(HashMap::new()),
            journal,
        }
    }

    /// Tick book backed by a throwaway in-memory journal
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryJournal::new()))
    }

    /// Record a new price sample.
    ///
    /// Returns `Ok(false)` when a newer tick for the symbol is already held;
    /// the older sample is ignored and not journaled.
    pub fn ingest(&self, tick: Tick) -> Result<bool, OracleError> {
        validate(&tick)?;

        let mut ticks = self.ticks.write().unwrap_or_else(PoisonError::into_inner);
        if is_stale(ticks.get(&tick.symbol), &tick) {
            tracing::debug!(symbol = %tick.symbol, "ignoring out-of-order tick");
            return Ok(false);
        }

        self.journal.append(&MarketEvent::TickRecorded { tick: tick.clone() })?;

        tracing::trace!(symbol = %tick.symbol, price = %tick.price, "tick ingested");
        ticks.insert(tick.symbol.clone(), tick);
        Ok(true)
    }

    /// Apply a journaled event without re-journaling it
    pub fn replay(&self, event: &MarketEvent) {
        let MarketEvent::TickRecorded { tick } = event else {
            return;
        };

        let mut ticks = self.ticks.write().unwrap_or_else(PoisonError::into_inner);
        if !is_stale(ticks.get(&tick.symbol), tick) {
            ticks.insert(tick.symbol.clone(), tick.clone());
        }
    }

    /// Snapshot of every latest tick, ordered by symbol
    pub fn snapshot(&self) -> Vec<Tick> {
        let ticks = self.ticks.read().unwrap_or_else(PoisonError::into_inner);
        let mut all: Vec<Tick> = ticks.values().cloned().collect();
        all.sort_by(|a, b| a.symbol.cmp(&b.symbol));
        all
    }

    pub fn len(&self) -> usize {
        self.ticks.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn get(&self, symbol: &Symbol) -> Option<Tick> {
        self.ticks
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(symbol)
            .cloned()
    }
}

impl Default for TickBook {
    fn default() -> Self {
        Self::in_memory()
    }
}

fn validate(tick: &Tick) -> Result<(), OracleError> {
    if tick.price <= Decimal::ZERO {
        return Err(OracleError::InvalidTick {
            symbol: tick.symbol.to_string(),
            reason: format!("price must be positive, got {}", tick.price),
        });
    }
    Ok(())
}

fn is_stale(current: Option<&Tick>, incoming: &Tick) -> bool {
    current.is_some_and(|held| held.timestamp > incoming.timestamp)
}

#[async_trait]
impl PriceOracle for TickBook {
    async fn latest_tick(&self, symbol: &Symbol) -> Option<Tick> {
        self.get(symbol)
    }

    async fn symbols(&self) -> Vec<Symbol> {
        self.snapshot().into_iter().map(|tick| tick.symbol).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use rust_decimal_macros::dec;

    fn acme() -> Symbol {
        "ACME".parse().unwrap()
    }

    #[tokio::test]
    async fn test_no_tick_means_unavailable() {
        let book = TickBook::in_memory();
        assert_eq!(book.latest_price(&acme()).await, None);
        assert!(book.latest_tick(&acme()).await.is_none());
    }

    #[tokio::test]
    async fn test_ingest_and_query() -> anyhow::Result<()> {
        let journal = Arc::new(MemoryJournal::new());
        let book = TickBook::new(journal.clone());

        assert!(book.ingest(Tick::new(acme(), dec!(101.25), 10))?);

        assert_eq!(book.latest_price(&acme()).await, Some(dec!(101.25)));
        assert_eq!(book.symbols().await, vec![acme()]);
        assert_eq!(journal.events().len(), 1);
        Ok(())
    }

    #[test]
    fn test_older_tick_is_ignored() -> anyhow::Result<()> {
        let journal = Arc::new(MemoryJournal::new());
        let book = TickBook::new(journal.clone());
        let now = Utc::now();

        assert!(book.ingest(Tick::new(acme(), dec!(100), 1).at(now))?);
        assert!(!book.ingest(Tick::new(acme(), dec!(90), 1).at(now - Duration::seconds(5)))?);

        assert_eq!(book.get(&acme()).map(|t| t.price), Some(dec!(100)));
        assert_eq!(journal.events().len(), 1);
        Ok(())
    }

    #[test]
    fn test_non_positive_price_rejected() {
        let book = TickBook::in_memory();

        let zero = book.ingest(Tick::new(acme(), Decimal::ZERO, 1));
        assert!(matches!(zero, Err(OracleError::InvalidTick { .. })));

        let negative = book.ingest(Tick::new(acme(), dec!(-1), 1));
        assert!(matches!(negative, Err(OracleError::InvalidTick { .. })));

        assert!(book.is_empty());
    }

    #[test]
    fn test_replay_restores_latest() {
        let book = TickBook::in_memory();
        let now = Utc::now();

        book.replay(&MarketEvent::TickRecorded {
            tick: Tick::new(acme(), dec!(12), 1).at(now),
        });
        book.replay(&MarketEvent::TickRecorded {
            tick: Tick::new(acme(), dec!(13), 1).at(now + Duration::seconds(1)),
        });

        assert_eq!(book.get(&acme()).map(|t| t.price), Some(dec!(13)));
    }
}
