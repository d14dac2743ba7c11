//! Projection engine - coordinates replay and live updates

use crate::error::ProjectionError;
use crate::trade::TradeProjection;
use async_trait::async_trait;
use fantrade_bus::{BusError, EventSubscriber};
use fantrade_events::{EventReader, MarketEvent};
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;
use std::path::Path;

/// Projection engine - coordinates replay and updates
pub struct ProjectionEngine {
    pub trades: TradeProjection,
}

impl ProjectionEngine {
    /// Open (or create) the projection database at `db_path`
    pub async fn new(db_path: impl AsRef<Path>) -> Result<Self, ProjectionError> {
        let db_url = format!("sqlite:{}?mode=rwc", db_path.as_ref().display());
        let pool = SqlitePool::connect(&db_url).await?;
        Self::with_pool(pool).await
    }

    /// Projection in a private in-memory database
    pub async fn in_memory() -> Result<Self, ProjectionError> {
        // Every connection to :memory: is a separate database
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await?;
        Self::with_pool(pool).await
    }

    async fn with_pool(pool: SqlitePool) -> Result<Self, ProjectionError> {
        let trades = TradeProjection::new(pool);
        trades.init().await?;
        Ok(Self { trades })
    }

    /// Apply a single event
    pub async fn apply(&self, event: &MarketEvent) -> Result<(), ProjectionError> {
        if let MarketEvent::OrderFilled { trade, realized_pnl } = event {
            self.trades.apply(trade, *realized_pnl).await?;
        }
        Ok(())
    }

    /// Rebuild from scratch out of `events`; returns how many were read
    pub async fn replay<'a>(
        &self,
        events: impl IntoIterator<Item = &'a MarketEvent>,
    ) -> Result<usize, ProjectionError> {
        self.trades.clear().await?;

        let mut count = 0;
        for event in events {
            self.apply(event).await?;
            count += 1;
        }

        tracing::info!(events = count, "projection rebuilt");
        Ok(count)
    }

    /// Rebuild from the journal directory
    pub async fn replay_journal(
        &self,
        journal_path: impl AsRef<Path>,
    ) -> Result<usize, ProjectionError> {
        let records = EventReader::from_directory(journal_path)?.read_all()?;
        let events: Vec<&MarketEvent> = records.iter().map(|r| &r.event).collect();
        self.replay(events).await
    }

    /// Get the trade projection
    pub fn trades(&self) -> &TradeProjection {
        &self.trades
    }
}

#[async_trait]
impl EventSubscriber for ProjectionEngine {
    fn name(&self) -> &str {
        "trade-projection"
    }

    async fn handle(&self, event: &MarketEvent) -> Result<(), BusError> {
        self.apply(event).await.map_err(|e| BusError::SubscriberFailed {
            name: self.name().to_string(),
            reason: e.to_string(),
        })
    }
}
