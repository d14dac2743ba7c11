//! FanTrade CLI - Main entry point

use clap::{Parser, Subcommand};
use fantrade_rpc::{commands, daemon, AppConfig, AppContext};
use rust_decimal::Decimal;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::watch;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "fantrade")]
#[command(about = "FanTrade - fantasy trading matching and portfolio core", long_about = None)]
struct Cli {
    /// Data directory path
    #[arg(short, long, default_value = "./data")]
    data: PathBuf,

    /// JSON config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Register a player with the starting cash
    Register {
        /// User ID
        user: String,
    },

    /// Submit an order
    Submit {
        /// User ID
        user: String,
        /// Symbol (case-insensitive)
        symbol: String,
        /// buy or sell
        side: String,
        /// Number of shares
        quantity: i64,
        /// Limit price; omit for a market order
        #[arg(long)]
        limit: Option<String>,
    },

    /// Cancel an open order
    Cancel {
        /// Order ID
        order_id: String,
    },

    /// List open orders
    Orders {
        /// Only this user's orders
        #[arg(long)]
        user: Option<String>,
        /// Include filled and cancelled orders
        #[arg(long, requires = "user")]
        all: bool,
    },

    /// Show a player's portfolio
    Portfolio {
        /// User ID
        user: String,
    },

    /// Show XP, daily quest and titles
    Stats {
        /// User ID
        user: String,
    },

    /// Record a price tick
    Tick {
        /// Symbol
        symbol: String,
        /// Price
        price: Decimal,
        /// Volume
        #[arg(long, default_value = "0")]
        volume: u64,
    },

    /// Run one matching cycle
    Match,

    /// List trade history
    Trades {
        /// Filter by user ID
        #[arg(long)]
        user: Option<String>,
        /// Filter by symbol
        #[arg(long)]
        symbol: Option<String>,
        /// Maximum number of trades to show
        #[arg(long, default_value = "20")]
        limit: u32,
    },

    /// Audit the journal (verify hash chain)
    Audit,

    /// Run the simulator and matching loop until Ctrl-C
    Run,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let config = AppConfig::load(cli.config.as_deref())?;
    let ctx = AppContext::new(&cli.data, config).await?;

    match cli.command {
        Commands::Register { user } => {
            commands::register(&ctx, &user).await?;
        }

        Commands::Submit {
            user,
            symbol,
            side,
            quantity,
            limit,
        } => {
            let order_type = if limit.is_some() { "limit" } else { "market" };
            commands::submit(&ctx, &user, &symbol, &side, order_type, quantity, limit.as_deref())
                .await?;
        }

        Commands::Cancel { order_id } => {
            commands::cancel(&ctx, &order_id).await?;
        }

        Commands::Orders { user, all } => {
            commands::orders(&ctx, user.as_deref(), all).await?;
        }

        Commands::Portfolio { user } => {
            commands::portfolio(&ctx, &user).await?;
        }

        Commands::Stats { user } => {
            commands::stats(&ctx, &user).await?;
        }

        Commands::Tick {
            symbol,
            price,
            volume,
        } => {
            commands::tick(&ctx, &symbol, price, volume).await?;
        }

        Commands::Match => {
            commands::run_match(&ctx).await?;
        }

        Commands::Trades {
            user,
            symbol,
            limit,
        } => {
            commands::trades(&ctx, user.as_deref(), symbol.as_deref(), limit).await?;
        }

        Commands::Audit => {
            commands::audit(&ctx).await?;
        }

        Commands::Run => {
            let (tx, rx) = watch::channel(false);
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    tracing::info!("shutdown requested");
                }
                let _ = tx.send(true);
            });

            daemon::run(Arc::new(ctx), rx).await?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_orders_all_requires_user() {
        assert!(Cli::try_parse_from(["fantrade", "orders", "--all"]).is_err());
        assert!(Cli::try_parse_from(["fantrade", "orders", "--all", "--user", "alice"]).is_ok());
        assert!(Cli::try_parse_from(["fantrade", "orders"]).is_ok());
    }
}
