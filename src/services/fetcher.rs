//! Concurrent fan-out fetch of every tracked symbol

use crate::config::TrackedSymbol;
use crate::errors::{BoxError, ProviderError};
use crate::models::Quote;
use crate::services::market_data::MarketDataProvider;
use async_trait::async_trait;
use futures_util::future::join_all;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// How a single symbol's fetch ended
#[derive(Debug, Clone)]
pub struct SymbolOutcome {
    pub symbol: String,
    pub result: Result<(), ProviderError>,
    pub elapsed: Duration,
}

/// Quotes for every requested symbol plus how each one was obtained
#[derive(Debug, Clone, Default)]
pub struct FetchReport {
    /// Same order as the requested symbols
    pub quotes: Vec<Quote>,
    pub outcomes: Vec<SymbolOutcome>,
}

impl FetchReport {
    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.result.is_ok()).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.succeeded()
    }
}

/// Produces a complete set of quotes for a list of symbols.
///
/// An `Err` means the whole operation could not run; individual symbol
/// failures are reported inside the `FetchReport`.
#[async_trait]
pub trait QuoteSource: Send + Sync {
    async fn fetch_all(&self, symbols: &[String]) -> Result<FetchReport, BoxError>;
}

#[async_trait]
impl<S: QuoteSource + ?Sized> QuoteSource for Arc<S> {
    async fn fetch_all(&self, symbols: &[String]) -> Result<FetchReport, BoxError> {
        (**self).fetch_all(symbols).await
    }
}

pub struct QuoteFetcher {
    provider: Arc<dyn MarketDataProvider>,
    company_names: HashMap<String, String>,
    timeout: Duration,
}

impl QuoteFetcher {
    pub fn new(provider: Arc<dyn MarketDataProvider>, symbols: &[TrackedSymbol]) -> Self {
        Self {
            provider,
            company_names: symbols
                .iter()
                .map(|s| (s.symbol.clone(), s.company_name.clone()))
                .collect(),
            timeout: Duration::from_secs(45),
        }
    }

    /// Deadline for one symbol, retries included
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Fetch one symbol; failures become a sentinel quote
    pub async fn fetch_symbol(&self, symbol: &str) -> (Quote, SymbolOutcome) {
        let start = Instant::now();
        let company_name = self.company_names.get(symbol).map(String::as_str);

        let result = match tokio::time::timeout(self.timeout, self.provider.fetch_quote(symbol)).await {
            Ok(Ok(raw)) => raw.into_quote(symbol, company_name),
            Ok(Err(e)) => Err(e),
            Err(_) => Err(ProviderError::Timeout(self.timeout)),
        };

        let (quote, result) = match result {
            Ok(quote) => (quote, Ok(())),
            Err(e) => (
                Quote::sentinel(symbol, company_name.unwrap_or(symbol)),
                Err(e),
            ),
        };

        let outcome = SymbolOutcome {
            symbol: symbol.to_string(),
            result,
            elapsed: start.elapsed(),
        };
        (quote, outcome)
    }
}

#[async_trait]
impl QuoteSource for QuoteFetcher {
    async fn fetch_all(&self, symbols: &[String]) -> Result<FetchReport, BoxError> {
        let results = join_all(symbols.iter().map(|symbol| self.fetch_symbol(symbol))).await;

        let (quotes, outcomes) = results.into_iter().unzip();
        Ok(FetchReport { quotes, outcomes })
    }
}
