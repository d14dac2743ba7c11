//! Core oracle types

use async_trait::async_trait;
use fantrade_core::{Symbol, Tick};
use rust_decimal::Decimal;

/// Price Oracle trait - read side of the price feed
///
/// Implementations answer with the most recent tick they have seen. `None`
/// means the price is unavailable; callers skip the symbol for now and never
/// synthesize a price. Queries have no side effects.
#[async_trait]
pub trait PriceOracle: Send + Sync {
    /// Most recent tick for a symbol
    async fn latest_tick(&self, symbol: &Symbol) -> Option<Tick>;

    /// Most recent price for a symbol
    async fn latest_price(&self, symbol: &Symbol) -> Option<Decimal> {
        self.latest_tick(symbol).await.map(|tick| tick.price)
    }

    /// Every symbol with at least one tick
    async fn symbols(&self) -> Vec<Symbol>;
}
