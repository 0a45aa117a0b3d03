//! Stub providers and sources shared by the unit tests

#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use stockwatch::errors::{BoxError, ProviderError};
use stockwatch::models::Quote;
use stockwatch::services::{FetchReport, MarketDataProvider, ProviderQuote, QuoteSource, SymbolOutcome};

/// Provider answering from a fixed table; unknown symbols are "not found"
#[derive(Default)]
pub struct StubProvider {
    responses: HashMap<String, Result<ProviderQuote, ProviderError>>,
    delay: Option<Duration>,
    calls: AtomicUsize,
}

impl StubProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_quote(mut self, symbol: &str, closes: Vec<f64>, volume: u64) -> Self {
        let volumes = closes.iter().map(|_| volume).collect();
        self.responses.insert(
            symbol.to_string(),
            Ok(ProviderQuote {
                closes,
                volumes,
                ..ProviderQuote::default()
            }),
        );
        self
    }

    pub fn with_raw(mut self, symbol: &str, raw: ProviderQuote) -> Self {
        self.responses.insert(symbol.to_string(), Ok(raw));
        self
    }

    pub fn with_error(mut self, symbol: &str, error: ProviderError) -> Self {
        self.responses.insert(symbol.to_string(), Err(error));
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MarketDataProvider for StubProvider {
    async fn fetch_quote(&self, symbol: &str) -> Result<ProviderQuote, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.responses
            .get(symbol)
            .cloned()
            .unwrap_or_else(|| Err(ProviderError::NotFound(symbol.to_string())))
    }
}

/// Source that fails its first `failures` invocations, then succeeds.
///
/// Successful reports price every symbol at `100 + call number`.
pub struct FlakySource {
    failures_remaining: AtomicUsize,
    calls: AtomicUsize,
}

impl FlakySource {
    pub fn failing(failures: usize) -> Self {
        Self {
            failures_remaining: AtomicUsize::new(failures),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl QuoteSource for FlakySource {
    async fn fetch_all(&self, symbols: &[String]) -> Result<FetchReport, BoxError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        let remaining = self.failures_remaining.load(Ordering::SeqCst);
        if remaining > 0 {
            self.failures_remaining.store(remaining - 1, Ordering::SeqCst);
            return Err("provider client unavailable".into());
        }

        let quotes = symbols
            .iter()
            .map(|s| Quote::new(s.as_str(), s.as_str(), 100.0 + call as f64, 100.0, 1_000, None))
            .collect();
        let outcomes = symbols
            .iter()
            .map(|s| SymbolOutcome {
                symbol: s.clone(),
                result: Ok(()),
                elapsed: Duration::ZERO,
            })
            .collect();
        Ok(FetchReport { quotes, outcomes })
    }
}

pub fn symbols(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}
