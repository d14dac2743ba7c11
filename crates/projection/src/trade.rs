//! Trade projection - trade history from fill events

use chrono::{DateTime, Utc};
use fantrade_core::{OrderSide, TradeRecord};
use rust_decimal::Decimal;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

/// One projected fill
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TradeRow {
    pub order_id: String,
    pub user_id: String,
    pub side: OrderSide,
    pub symbol: String,
    pub price: Decimal,
    pub quantity: u64,
    pub realized_pnl: Decimal,
    pub executed_at: DateTime<Utc>,
}

impl TradeRow {
    fn from_row(row: &SqliteRow) -> Self {
        let side = match row.get::<String, _>("side").as_str() {
            "sell" => OrderSide::Sell,
            _ => OrderSide::Buy,
        };
        Self {
            order_id: row.get("order_id"),
            user_id: row.get("user_id"),
            side,
            symbol: row.get("symbol"),
            price: row
                .get::<String, _>("price")
                .parse()
                .unwrap_or(Decimal::ZERO),
            quantity: row.get::<i64, _>("quantity") as u64,
            realized_pnl: row
                .get::<String, _>("realized_pnl")
                .parse()
                .unwrap_or(Decimal::ZERO),
            executed_at: row.get("executed_at"),
        }
    }
}

const SELECT_COLUMNS: &str = "SELECT order_id, user_id, side, symbol, price, quantity, \
     realized_pnl, executed_at FROM trades";

/// Trade projection - one row per filled order, newest first
pub struct TradeProjection {
    pool: SqlitePool,
}

impl TradeProjection {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Initialize the schema
    pub async fn init(&self) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS trades (
                order_id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL,
                side TEXT NOT NULL,
                symbol TEXT NOT NULL,
                price TEXT NOT NULL,
                quantity INTEGER NOT NULL,
                realized_pnl TEXT NOT NULL,
                executed_at TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE INDEX IF NOT EXISTS idx_trades_user
            ON trades(user_id)
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE INDEX IF NOT EXISTS idx_trades_symbol
            ON trades(symbol)
            "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Record a fill. Re-applying the same fill is a no-op.
    pub async fn apply(
        &self,
        trade: &TradeRecord,
        realized_pnl: Decimal,
    ) -> Result<(), sqlx::Error> {
        let Some(user_id) = trade.user_id() else {
            return Ok(());
        };

        sqlx::query(
            r#"
            INSERT OR IGNORE INTO trades
            (order_id, user_id, side, symbol, price, quantity, realized_pnl, executed_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&trade.order_id)
        .bind(user_id)
        .bind(trade.side().to_string())
        .bind(trade.symbol.as_str())
        .bind(trade.price.to_string())
        .bind(trade.quantity as i64)
        .bind(realized_pnl.to_string())
        .bind(trade.executed_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Trades of one user, newest first
    pub async fn user_trades(
        &self,
        user_id: &str,
        limit: u32,
    ) -> Result<Vec<TradeRow>, sqlx::Error> {
        let rows = sqlx::query(&format!(
            "{} WHERE user_id = ? ORDER BY rowid DESC LIMIT ?",
            SELECT_COLUMNS
        ))
        .bind(user_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(TradeRow::from_row).collect())
    }

    /// Trades in one symbol, newest first
    pub async fn symbol_trades(
        &self,
        symbol: &str,
        limit: u32,
    ) -> Result<Vec<TradeRow>, sqlx::Error> {
        let rows = sqlx::query(&format!(
            "{} WHERE symbol = ? ORDER BY rowid DESC LIMIT ?",
            SELECT_COLUMNS
        ))
        .bind(symbol.to_uppercase())
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(TradeRow::from_row).collect())
    }

    /// Get recent trades (all users)
    pub async fn recent_trades(&self, limit: u32) -> Result<Vec<TradeRow>, sqlx::Error> {
        let rows = sqlx::query(&format!("{} ORDER BY rowid DESC LIMIT ?", SELECT_COLUMNS))
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.iter().map(TradeRow::from_row).collect())
    }

    /// Get trade count
    pub async fn count(&self) -> Result<u64, sqlx::Error> {
        let row = sqlx::query("SELECT COUNT(*) as count FROM trades")
            .fetch_one(&self.pool)
            .await?;

        Ok(row.get::<i64, _>("count") as u64)
    }

    /// Clear all trades (for replay)
    pub async fn clear(&self) -> Result<(), sqlx::Error> {
        sqlx::query("DELETE FROM trades")
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
