//! FocusFlow - focus session backend
//!
//! Main entry point for the HTTP server.

use std::sync::Arc;
use std::time::Duration;

use focusflow_api::commands::admin::DEFAULT_RECONCILE_LIMIT;
use focusflow_api::utils::logging::init_tracing;
use focusflow_api::{router, AppContext};
use tracing::{debug, info, warn};

/// How often completed sessions with pending stats are swept.
const RECONCILE_INTERVAL: Duration = Duration::from_secs(300);

/// How often groups are checked for a new UTC day. Each group rolls over at
/// most once per day, so this only bounds how late after midnight it happens.
const HEALTH_SWEEP_INTERVAL: Duration = Duration::from_secs(3_600);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env before the subscriber reads RUST_LOG.
    let dotenv = dotenvy::dotenv();
    init_tracing()?;

    match dotenv {
        Ok(path) => info!(path = %path.display(), "loaded .env"),
        Err(e) => debug!(error = %e, "no .env file loaded"),
    }

    let config = focusflow_infra::config::load()?;
    let bind_address = config.server.bind_address.clone();

    info!("FocusFlow starting...");
    let ctx = Arc::new(AppContext::new(config)?);
    spawn_reconciler(Arc::clone(&ctx));
    spawn_health_sweep(Arc::clone(&ctx));

    let listener = tokio::net::TcpListener::bind(&bind_address).await?;
    info!(address = %bind_address, "FocusFlow listening");

    axum::serve(listener, router(ctx)).with_graceful_shutdown(shutdown_signal()).await?;

    info!("FocusFlow stopped");
    Ok(())
}

/// Periodically retry stats rollups that failed at stop time.
fn spawn_reconciler(ctx: Arc<AppContext>) {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(RECONCILE_INTERVAL);
        loop {
            ticker.tick().await;
            if let Err(e) = ctx.sessions.reconcile_pending(DEFAULT_RECONCILE_LIMIT).await {
                warn!(error = %e, "scheduled reconciliation failed");
            }
        }
    });
}

/// Close each group's day so members who lapsed pull its tree down even when
/// nobody contributes.
fn spawn_health_sweep(ctx: Arc<AppContext>) {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(HEALTH_SWEEP_INTERVAL);
        loop {
            ticker.tick().await;
            if let Err(e) = ctx.aggregation.refresh_all_group_health().await {
                warn!(error = %e, "scheduled group health sweep failed");
            }
        }
    });
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}
