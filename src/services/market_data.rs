//! Market data provider interface and the raw data it returns.

use crate::errors::ProviderError;
use crate::models::Quote;
use async_trait::async_trait;
use std::sync::Arc;

/// Raw per-symbol data as reported by a provider
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProviderQuote {
    /// Daily closes, oldest first
    pub closes: Vec<f64>,
    /// Daily volumes aligned with `closes`
    pub volumes: Vec<u64>,
    /// Separately reported previous close, used when only one close is known
    pub previous_close: Option<f64>,
    pub regular_market_volume: Option<u64>,
    pub long_name: Option<String>,
    pub market_cap: Option<f64>,
}

impl ProviderQuote {
    /// Turn provider data into a quote.
    ///
    /// The two most recent closes give price and previous close; with a single
    /// close the provider's previous close is used instead, and no close at all
    /// is a failure.
    pub fn into_quote(self, symbol: &str, company_name: Option<&str>) -> Result<Quote, ProviderError> {
        let price = *self
            .closes
            .last()
            .ok_or_else(|| ProviderError::NoHistory(symbol.to_string()))?;

        let previous_close = if self.closes.len() >= 2 {
            self.closes[self.closes.len() - 2]
        } else {
            self.previous_close.unwrap_or(price)
        };

        if !price.is_finite() || price < 0.0 || !previous_close.is_finite() {
            return Err(ProviderError::Malformed(format!(
                "invalid price data for {}: price={} previous_close={}",
                symbol, price, previous_close
            )));
        }

        let volume = self
            .volumes
            .last()
            .copied()
            .or(self.regular_market_volume)
            .unwrap_or(0);

        let company_name = company_name
            .map(str::to_string)
            .or(self.long_name)
            .unwrap_or_else(|| symbol.to_string());

        let market_cap = self.market_cap.filter(|cap| cap.is_finite() && *cap >= 0.0);

        Ok(Quote::new(
            symbol,
            company_name,
            price,
            previous_close,
            volume,
            market_cap,
        ))
    }
}

#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// Fetch current price, recent history and metadata for one symbol
    async fn fetch_quote(&self, symbol: &str) -> Result<ProviderQuote, ProviderError>;
}

#[async_trait]
impl<P: MarketDataProvider + ?Sized> MarketDataProvider for Arc<P> {
    async fn fetch_quote(&self, symbol: &str) -> Result<ProviderQuote, ProviderError> {
        (**self).fetch_quote(symbol).await
    }
}
