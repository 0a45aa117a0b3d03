//! Decorators that observe providers and quote sources without changing their results

use crate::errors::{BoxError, ProviderError};
use crate::metrics::Metrics;
use crate::models::RefreshOutcome;
use crate::services::fetcher::{FetchReport, QuoteSource};
use crate::services::market_data::{MarketDataProvider, ProviderQuote};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, error, field, info, instrument, warn, Span};

/// Traces and times every provider call
pub struct InstrumentedProvider<P> {
    inner: P,
    metrics: Arc<Metrics>,
}

impl<P> InstrumentedProvider<P> {
    pub fn new(inner: P, metrics: Arc<Metrics>) -> Self {
        Self { inner, metrics }
    }
}

#[async_trait]
impl<P: MarketDataProvider> MarketDataProvider for InstrumentedProvider<P> {
    #[instrument(
        name = "provider_request",
        skip(self),
        fields(price = field::Empty, duration_ms = field::Empty, success = field::Empty)
    )]
    async fn fetch_quote(&self, symbol: &str) -> Result<ProviderQuote, ProviderError> {
        let start = Instant::now();
        let result = self.inner.fetch_quote(symbol).await;
        let elapsed = start.elapsed();

        self.metrics
            .provider_request_duration_seconds
            .with_label_values(&[symbol])
            .observe(elapsed.as_secs_f64());

        let span = Span::current();
        span.record("duration_ms", elapsed.as_millis() as u64);
        match &result {
            Ok(raw) => {
                if let Some(price) = raw.closes.last() {
                    span.record("price", *price);
                }
                span.record("success", true);
            }
            Err(e) => {
                span.record("success", false);
                debug!(symbol = %symbol, error = %e, "Provider call failed for {}", symbol);
            }
        }

        result
    }
}

/// Records counters, histograms and log events for every fetch of all symbols
pub struct InstrumentedSource<S> {
    inner: S,
    metrics: Arc<Metrics>,
}

impl<S> InstrumentedSource<S> {
    pub fn new(inner: S, metrics: Arc<Metrics>) -> Self {
        Self { inner, metrics }
    }

    fn record_report(&self, report: &FetchReport, elapsed: Duration) {
        for (quote, outcome) in report.quotes.iter().zip(&report.outcomes) {
            match &outcome.result {
                Ok(()) => {
                    self.metrics
                        .stock_fetches_total
                        .with_label_values(&["success"])
                        .inc();
                    self.metrics
                        .stock_data_success_total
                        .with_label_values(&[quote.symbol.as_str()])
                        .inc();
                    self.metrics
                        .stock_price_current_usd
                        .with_label_values(&[quote.symbol.as_str(), quote.company_name.as_str()])
                        .set(quote.price);
                    self.metrics
                        .stock_change_percent
                        .observe(quote.change_percent);
                    self.metrics.stock_volume.observe(quote.volume as f64);
                    info!(
                        symbol = %quote.symbol,
                        price = quote.price,
                        change_percent = quote.change_percent,
                        duration_ms = outcome.elapsed.as_millis() as u64,
                        "Successfully fetched data for {}: ${:.2} ({:+.2}%)",
                        quote.symbol,
                        quote.price,
                        quote.change_percent
                    );
                }
                Err(e) => {
                    self.metrics
                        .stock_fetches_total
                        .with_label_values(&["failure"])
                        .inc();
                    self.metrics
                        .stock_data_failure_total
                        .with_label_values(&[outcome.symbol.as_str()])
                        .inc();
                    self.metrics.errors_total.with_label_values(&[e.kind()]).inc();
                    warn!(
                        symbol = %outcome.symbol,
                        error = %e,
                        duration_ms = outcome.elapsed.as_millis() as u64,
                        "{}",
                        e.user_message(&outcome.symbol)
                    );
                }
            }
        }

        let span = Span::current();
        span.record("successful_fetches", report.succeeded() as u64);
        span.record("failed_fetches", report.failed() as u64);
        span.record("total_duration_seconds", elapsed.as_secs_f64());

        info!(
            succeeded = report.succeeded(),
            total = report.quotes.len(),
            duration_ms = elapsed.as_millis() as u64,
            "Fetched {}/{} stocks successfully",
            report.succeeded(),
            report.quotes.len()
        );
    }
}

#[async_trait]
impl<S: QuoteSource> QuoteSource for InstrumentedSource<S> {
    #[instrument(
        name = "fetch_all_stocks",
        skip_all,
        fields(
            symbols_count = symbols.len(),
            successful_fetches = field::Empty,
            failed_fetches = field::Empty,
            total_duration_seconds = field::Empty
        )
    )]
    async fn fetch_all(&self, symbols: &[String]) -> Result<FetchReport, BoxError> {
        let start = Instant::now();
        let result = self.inner.fetch_all(symbols).await;
        let elapsed = start.elapsed();

        self.metrics
            .stock_fetch_duration_seconds
            .observe(elapsed.as_secs_f64());

        match &result {
            Ok(report) => self.record_report(report, elapsed),
            Err(e) => {
                self.metrics.errors_total.with_label_values(&["fetch_all"]).inc();
                error!(error = %e, "Fetching all stocks failed: {}", e);
            }
        }

        result
    }
}

/// Cycle-level metrics, shared by scheduled and manual refreshes
pub fn record_cycle(metrics: &Metrics, outcome: &RefreshOutcome) {
    if outcome.success {
        metrics
            .refresh_cycles_total
            .with_label_values(&["success"])
            .inc();
        if let Some(at) = outcome.snapshot.as_ref().and_then(|s| s.last_update) {
            metrics
                .last_refresh_timestamp_seconds
                .set(at.timestamp_millis() as f64 / 1000.0);
        }
    } else {
        metrics
            .refresh_cycles_total
            .with_label_values(&["failure"])
            .inc();
        metrics.errors_total.with_label_values(&["refresh_cycle"]).inc();
    }
}
