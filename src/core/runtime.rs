//! One refresh cycle: fetch every symbol, then replace the snapshot

use crate::core::snapshot::SnapshotStore;
use crate::metrics::Metrics;
use crate::models::{RefreshOutcome, Snapshot};
use crate::services::fetcher::QuoteSource;
use crate::telemetry::record_cycle;
use chrono::Utc;
use std::fmt;
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info, instrument, warn};

/// What started a refresh cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshTrigger {
    Startup,
    Scheduled,
    Manual,
}

impl fmt::Display for RefreshTrigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RefreshTrigger::Startup => "startup",
            RefreshTrigger::Scheduled => "scheduled",
            RefreshTrigger::Manual => "manual",
        };
        f.write_str(name)
    }
}

/// Runs refresh cycles against a quote source and a snapshot store.
///
/// Shared by the background scheduler and manual refresh requests; overlapping
/// cycles are allowed and the last one to finish wins.
pub struct RefreshService {
    source: Arc<dyn QuoteSource>,
    store: Arc<SnapshotStore>,
    symbols: Vec<String>,
    metrics: Option<Arc<Metrics>>,
}

impl RefreshService {
    pub fn new(source: Arc<dyn QuoteSource>, store: Arc<SnapshotStore>, symbols: Vec<String>) -> Self {
        Self {
            source,
            store,
            symbols,
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, metrics: Arc<Metrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn store(&self) -> &Arc<SnapshotStore> {
        &self.store
    }

    pub fn symbols(&self) -> &[String] {
        &self.symbols
    }

    pub fn metrics(&self) -> Option<&Arc<Metrics>> {
        self.metrics.as_ref()
    }

    /// Run one cycle; never fails, errors are reported in the outcome
    #[instrument(name = "refresh_cycle", skip(self), fields(trigger = %trigger))]
    pub async fn refresh(&self, trigger: RefreshTrigger) -> RefreshOutcome {
        let start = Instant::now();
        info!(symbol_count = self.symbols.len(), "Fetching stock data...");

        let outcome = match self.source.fetch_all(&self.symbols).await {
            Ok(report) if report.quotes.len() == self.symbols.len() && !report.quotes.is_empty() => {
                let succeeded = report.succeeded();
                let failed = report.failed();
                let snapshot = self
                    .store
                    .replace(Snapshot::new(report.quotes, Utc::now()))
                    .await;
                info!(
                    succeeded = succeeded,
                    total = snapshot.len(),
                    "Refresh completed: {}/{} stocks fetched",
                    succeeded,
                    snapshot.len()
                );
                RefreshOutcome::completed(snapshot, succeeded, failed, start.elapsed())
            }
            Ok(report) => {
                let message = format!(
                    "fetch returned {} quotes for {} symbols",
                    report.quotes.len(),
                    self.symbols.len()
                );
                warn!(error = %message, "Refresh produced no usable snapshot");
                RefreshOutcome::failed(message, start.elapsed())
            }
            Err(e) => {
                error!(error = %e, "Error fetching stock data: {}", e);
                RefreshOutcome::failed(format!("An error occurred in data fetching: {}", e), start.elapsed())
            }
        };

        if let Some(ref metrics) = self.metrics {
            record_cycle(metrics, &outcome);
        }

        outcome
    }
}
