//! CLI commands

use chrono::Utc;
use fantrade_core::{Order, Symbol, Tick};
use fantrade_events::{verify_chain, EventReader};
use fantrade_matching::FillOutcome;
use rust_decimal::Decimal;
use std::collections::HashMap;

use crate::context::AppContext;
use crate::daemon;

/// Open an account
pub async fn register(ctx: &AppContext, user_id: &str) -> Result<(), anyhow::Error> {
    let portfolio = ctx.register_user(user_id)?;
    println!("✅ Registered {} with {} cash", portfolio.user_id, portfolio.cash);
    Ok(())
}

/// Submit an order
pub async fn submit(
    ctx: &AppContext,
    user_id: &str,
    symbol: &str,
    side: &str,
    order_type: &str,
    quantity: i64,
    limit_price: Option<&str>,
) -> Result<(), anyhow::Error> {
    let order = ctx.submit_order(user_id, symbol, side, order_type, quantity, limit_price)?;
    println!("✅ Order {} accepted", order.id);
    print_orders(std::slice::from_ref(&order));
    Ok(())
}

/// Cancel an OPEN order
pub async fn cancel(ctx: &AppContext, order_id: &str) -> Result<(), anyhow::Error> {
    let order = ctx.cancel_order(order_id)?;
    println!("✅ Order {} cancelled", order.id);
    Ok(())
}

/// List OPEN orders, or a user's full history with `all`
pub async fn orders(
    ctx: &AppContext,
    user_id: Option<&str>,
    all: bool,
) -> Result<(), anyhow::Error> {
    let orders = match (user_id, all) {
        (Some(user_id), true) => ctx.get_order_history(user_id),
        (None, true) => anyhow::bail!("--all lists one user's history and needs --user"),
        (user_id, false) => ctx.get_open_orders(user_id),
    };

    if orders.is_empty() {
        println!("No orders found");
        return Ok(());
    }

    println!("Orders ({}):", orders.len());
    print_orders(&orders);
    Ok(())
}

/// Show cash, positions and equity at the latest prices
pub async fn portfolio(ctx: &AppContext, user_id: &str) -> Result<(), anyhow::Error> {
    let portfolio = ctx.get_portfolio(user_id)?;
    let prices: HashMap<Symbol, Decimal> = ctx
        .latest_ticks()
        .into_iter()
        .map(|tick| (tick.symbol, tick.price))
        .collect();

    println!("Portfolio for {}:", portfolio.user_id);
    println!("  Cash: {}", portfolio.cash);

    if portfolio.positions.is_empty() {
        println!("  (no positions)");
    } else {
        println!("{:-<60}", "");
        println!(
            "{:>10} | {:>8} | {:>12} | {:>12}",
            "Symbol", "Shares", "Avg cost", "Last"
        );
        println!("{:-<60}", "");
        for position in &portfolio.positions {
            let last = prices
                .get(&position.symbol)
                .map(|p| p.to_string())
                .unwrap_or_else(|| "-".to_string());
            println!(
                "{:>10} | {:>8} | {:>12} | {:>12}",
                position.symbol, position.shares, position.avg_cost, last
            );
        }
        println!("{:-<60}", "");
    }

    match portfolio.equity(|symbol| prices.get(symbol).copied()) {
        Some(equity) => println!("  Equity: {}", equity),
        None => println!("  Equity: overflow"),
    }
    Ok(())
}

/// Show XP, quest and titles
pub async fn stats(ctx: &AppContext, user_id: &str) -> Result<(), anyhow::Error> {
    let stats = ctx.get_stats(user_id)?;

    println!("Stats for {}:", stats.user_id);
    println!("  XP: {}", stats.xp);
    println!(
        "  Quest ({}): {} / {}{}",
        stats.quest.day,
        stats.quest.progress_pnl,
        stats.quest.goal_pnl,
        if stats.quest.done { " ✅" } else { "" }
    );
    println!("  Trades today: {}", stats.trades_today);

    if stats.titles.is_empty() {
        println!("  Titles: none");
    } else {
        let titles: Vec<String> = stats.titles.iter().map(|t| t.to_string()).collect();
        println!("  Titles: {}", titles.join(", "));
    }
    Ok(())
}

/// Record a price by hand
pub async fn tick(
    ctx: &AppContext,
    symbol: &str,
    price: Decimal,
    volume: u64,
) -> Result<(), anyhow::Error> {
    let symbol: Symbol = symbol.parse()?;
    let tick = Tick::new(symbol, price, volume).at(Utc::now());

    if ctx.record_tick(tick.clone())? {
        println!("✅ {} @ {}", tick.symbol, tick.price);
    } else {
        println!(
            "⚠️  Ignored {} @ {} (older than the latest tick)",
            tick.symbol, tick.price
        );
    }
    Ok(())
}

/// Run one matching cycle
pub async fn run_match(ctx: &AppContext) -> Result<(), anyhow::Error> {
    let report = ctx.run_matching_cycle().await;
    println!("✅ {}", report);

    for outcome in &report.outcomes {
        match &outcome.outcome {
            FillOutcome::Filled(fill) => println!(
                "   FILLED  {} {} {} x{} @ {}",
                outcome.order_id,
                fill.trade.side(),
                fill.trade.symbol,
                fill.trade.quantity,
                fill.trade.price
            ),
            FillOutcome::Skipped(reason) => {
                println!("   SKIPPED {} ({})", outcome.order_id, reason)
            }
            FillOutcome::Failed(e) => println!("   ❌ FAILED {} ({})", outcome.order_id, e),
        }
    }
    Ok(())
}

/// List trade history from the projection
pub async fn trades(
    ctx: &AppContext,
    user: Option<&str>,
    symbol: Option<&str>,
    limit: u32,
) -> Result<(), anyhow::Error> {
    let projection = daemon::open_projection(ctx).await?;

    let trades = if let Some(user_id) = user {
        projection.trades().user_trades(user_id, limit).await?
    } else if let Some(symbol) = symbol {
        projection.trades().symbol_trades(symbol, limit).await?
    } else {
        projection.trades().recent_trades(limit).await?
    };

    if trades.is_empty() {
        println!("No trades found");
        return Ok(());
    }

    println!("Trade History ({} trades):", trades.len());
    println!("{:-<90}", "");
    println!(
        "{:>20} | {:>8} | {:>4} | {:>8} | {:>6} | {:>10} | {:>10}",
        "Executed", "User", "Side", "Symbol", "Qty", "Price", "PnL"
    );
    println!("{:-<90}", "");

    for trade in &trades {
        println!(
            "{:>20} | {:>8} | {:>4} | {:>8} | {:>6} | {:>10} | {:>10}",
            trade.executed_at.format("%Y-%m-%d %H:%M:%S"),
            trade.user_id,
            trade.side,
            trade.symbol,
            trade.quantity,
            trade.price,
            trade.realized_pnl,
        );
    }

    Ok(())
}

/// Verify the journal hash chain
pub async fn audit(ctx: &AppContext) -> Result<(), anyhow::Error> {
    let Some(journal_path) = ctx.journal_path() else {
        anyhow::bail!("No journal to audit");
    };

    let records = EventReader::from_directory(journal_path)?.read_all()?;
    match verify_chain(&records) {
        Ok(()) => println!("✅ Hash chain verified ({} records)", records.len()),
        Err(e) => println!("❌ Hash chain broken: {}", e),
    }
    Ok(())
}

fn print_orders(orders: &[Order]) {
    println!("{:-<100}", "");
    println!(
        "{:>36} | {:>8} | {:>8} | {:>4} | {:>6} | {:>6} | {:>10} | {:>9}",
        "ID", "User", "Symbol", "Side", "Type", "Qty", "Limit", "Status"
    );
    println!("{:-<100}", "");
    for order in orders {
        let limit = order
            .limit_price
            .map(|p| p.to_string())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{:>36} | {:>8} | {:>8} | {:>4} | {:>6} | {:>6} | {:>10} | {:>9}",
            order.id,
            order.user_id,
            order.symbol,
            order.side,
            order.order_type,
            order.quantity,
            limit,
            order.status,
        );
    }
}
