//! Long-running mode: price simulator, matching loop and trade projection

use fantrade_bus::spawn_subscriber;
use fantrade_oracle::MarketSimulator;
use fantrade_projection::ProjectionEngine;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::context::AppContext;
use crate::error::AppError;

/// Run until `shutdown` flips to true (or its sender is dropped).
///
/// The projection is rebuilt from the journal before anything else starts,
/// then kept current from the bus.
pub async fn run(ctx: Arc<AppContext>, shutdown: watch::Receiver<bool>) -> Result<(), AppError> {
    let projection = Arc::new(open_projection(&ctx).await?);
    let projector = spawn_subscriber(ctx.bus(), projection);

    let simulator = spawn_simulator(ctx.clone(), shutdown.clone())?;

    let engine = ctx.engine();
    engine.run(ctx.config().match_interval(), shutdown).await;

    if let Err(e) = simulator.await {
        tracing::error!(error = %e, "simulator task panicked");
    }
    projector.abort();

    tracing::info!("daemon stopped");
    Ok(())
}

/// Projection database rebuilt from the journal
pub async fn open_projection(ctx: &AppContext) -> Result<ProjectionEngine, AppError> {
    let projection = match ctx.projection_path() {
        Some(path) => ProjectionEngine::new(path).await?,
        None => ProjectionEngine::in_memory().await?,
    };

    if let Some(journal_path) = ctx.journal_path() {
        projection.replay_journal(journal_path).await?;
    }

    Ok(projection)
}

fn spawn_simulator(
    ctx: Arc<AppContext>,
    mut shutdown: watch::Receiver<bool>,
) -> Result<JoinHandle<()>, AppError> {
    let mut simulator = MarketSimulator::from_config(&ctx.config().simulator)?;
    for tick in ctx.latest_ticks() {
        simulator.resume_from(&tick);
    }

    let period = ctx.config().tick_interval();

    Ok(tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        tracing::info!(interval_ms = period.as_millis() as u64, "price simulator started");

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    for tick in simulator.step() {
                        let symbol = tick.symbol.clone();
                        if let Err(e) = ctx.record_tick(tick) {
                            tracing::error!(symbol = %symbol, error = %e, "failed to record tick");
                        }
                    }
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }

        tracing::info!("price simulator stopped");
    }))
}
