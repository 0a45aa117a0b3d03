//! Stockwatch server
//!
//! Fetches quotes for the tracked symbols at startup, keeps them refreshed in
//! the background and serves the dashboard and JSON API.

use dotenvy::dotenv;
use stockwatch::config::AppConfig;
use stockwatch::core::http::{start_server, AppState, HealthStatus};
use stockwatch::core::runtime::{RefreshService, RefreshTrigger};
use stockwatch::core::scheduler::RefreshScheduler;
use stockwatch::core::snapshot::SnapshotStore;
use stockwatch::logging;
use stockwatch::metrics::Metrics;
use stockwatch::services::{QuoteFetcher, YahooQuoteProvider};
use stockwatch::telemetry::{InstrumentedProvider, InstrumentedSource};
use std::sync::Arc;
use std::time::Instant;
use tokio::signal;
use tokio::sync::RwLock;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    // Load environment variables from .env if present
    dotenv().ok();

    logging::init_logging();

    let config = match AppConfig::from_env().and_then(|c| c.validate().map(|_| c)) {
        Ok(config) => {
            info!("Configuration validated successfully");
            config
        }
        Err(e) => {
            error!(error = %e, "Configuration error");
            logging::shutdown();
            return Err(e.into());
        }
    };

    let env = stockwatch::config::get_environment();
    info!("Starting Stockwatch");
    info!(environment = %env, "Environment");
    info!(
        symbols = ?config.symbol_list(),
        refresh_interval = config.refresh_interval_seconds,
        "Tracking {} symbols, refreshing every {}s",
        config.symbols.len(),
        config.refresh_interval_seconds
    );

    let metrics = Arc::new(Metrics::new()?);

    let provider = InstrumentedProvider::new(YahooQuoteProvider::new(&config)?, metrics.clone());
    let fetcher = QuoteFetcher::new(Arc::new(provider), &config.symbols)
        .with_timeout(config.fetch_timeout());
    let source = InstrumentedSource::new(fetcher, metrics.clone());

    let store = Arc::new(SnapshotStore::new());
    let refresh = Arc::new(
        RefreshService::new(Arc::new(source), store, config.symbol_list())
            .with_metrics(metrics.clone()),
    );

    // Initial fetch before serving
    let initial = refresh.refresh(RefreshTrigger::Startup).await;
    if initial.success {
        info!("Initial data fetch successful");
    } else {
        warn!(
            error = initial.error.as_deref().unwrap_or("unknown"),
            "Initial data fetch failed"
        );
    }

    let scheduler = Arc::new(RefreshScheduler::new(
        refresh.clone(),
        config.refresh_interval(),
        config.cycle_retry_delay(),
    )?);
    scheduler.start().await?;

    let state = AppState {
        health: Arc::new(RwLock::new(HealthStatus::default())),
        metrics,
        start_time: Arc::new(Instant::now()),
        config: Arc::new(config),
        refresh,
        scheduler: Some(scheduler.clone()),
    };

    let server_handle = tokio::spawn(async move {
        if let Err(e) = start_server(state).await {
            error!(error = %e, "HTTP server error");
        }
    });

    // Graceful shutdown
    info!("Stockwatch started, waiting for shutdown signal...");
    tokio::select! {
        _ = signal::ctrl_c() => {
            info!("Shutting down...");
        }
        _ = server_handle => {
            error!("HTTP server stopped");
        }
    }

    scheduler.stop().await;
    logging::shutdown();
    info!("Stockwatch stopped");

    Ok(())
}
