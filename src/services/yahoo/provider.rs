//! Yahoo Finance market data provider

use crate::config::AppConfig;
use crate::errors::ProviderError;
use crate::services::market_data::{MarketDataProvider, ProviderQuote};
use crate::services::retry::RetryPolicy;
use async_trait::async_trait;
use reqwest::StatusCode;
use std::time::Duration;
use tracing::debug;

use super::messages::{ChartResponse, ChartResult, QuoteSummaryResponse, QuoteSummaryResult};

const USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 stockwatch/0.1";

pub struct YahooQuoteProvider {
    client: reqwest::Client,
    base_url: String,
    timeout: Duration,
    retry: RetryPolicy,
}

impl YahooQuoteProvider {
    pub fn new(config: &AppConfig) -> Result<Self, ProviderError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| ProviderError::Network(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self::with_client(
            config.yahoo_base_url.clone(),
            client,
            config.request_timeout(),
            RetryPolicy::new(config.max_retries, config.retry_delay()),
        ))
    }

    pub fn with_client(
        base_url: impl Into<String>,
        client: reqwest::Client,
        timeout: Duration,
        retry: RetryPolicy,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout,
            retry,
        }
    }

    fn chart_url(&self, symbol: &str) -> String {
        format!("{}/v8/finance/chart/{}", self.base_url, symbol)
    }

    async fn fetch_chart(&self, symbol: &str) -> Result<ProviderQuote, ProviderError> {
        let response = self
            .client
            .get(self.chart_url(symbol))
            .query(&[("range", "5d"), ("interval", "1d")])
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        match response.status() {
            StatusCode::NOT_FOUND => return Err(ProviderError::NotFound(symbol.to_string())),
            StatusCode::TOO_MANY_REQUESTS => return Err(ProviderError::RateLimited),
            status if !status.is_success() => {
                return Err(ProviderError::Http {
                    status: status.as_u16(),
                })
            }
            _ => {}
        }

        let body: ChartResponse = response.json().await.map_err(|e| self.classify(e))?;

        if let Some(err) = body.chart.error {
            return Err(if err.code.eq_ignore_ascii_case("not found") {
                ProviderError::NotFound(symbol.to_string())
            } else {
                ProviderError::Malformed(format!("{}: {}", err.code, err.description))
            });
        }

        let result = body
            .chart
            .result
            .and_then(|results| results.into_iter().next())
            .ok_or_else(|| ProviderError::NotFound(symbol.to_string()))?;

        let quote = chart_to_provider_quote(result);
        debug!(
            symbol = %symbol,
            closes = quote.closes.len(),
            "Yahoo chart fetched for {}",
            symbol
        );
        Ok(quote)
    }

    fn summary_url(&self, symbol: &str) -> String {
        format!("{}/v10/finance/quoteSummary/{}", self.base_url, symbol)
    }

    async fn fetch_summary(&self, symbol: &str) -> Result<CompanySummary, ProviderError> {
        let response = self
            .client
            .get(self.summary_url(symbol))
            .query(&[("modules", "price,summaryDetail")])
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        match response.status() {
            StatusCode::NOT_FOUND => return Err(ProviderError::NotFound(symbol.to_string())),
            status if !status.is_success() => {
                return Err(ProviderError::Http {
                    status: status.as_u16(),
                })
            }
            _ => {}
        }

        let body: QuoteSummaryResponse = response.json().await.map_err(|e| self.classify(e))?;
        if let Some(err) = body.quote_summary.error {
            return Err(ProviderError::Malformed(format!("{}: {}", err.code, err.description)));
        }

        body.quote_summary
            .result
            .and_then(|results| results.into_iter().next())
            .map(summary_to_company)
            .ok_or_else(|| ProviderError::NotFound(symbol.to_string()))
    }

    fn classify(&self, err: reqwest::Error) -> ProviderError {
        if err.is_timeout() {
            ProviderError::Timeout(self.timeout)
        } else {
            err.into()
        }
    }
}

/// Keep only days with a reported close; volume gaps count as zero
pub(crate) fn chart_to_provider_quote(result: ChartResult) -> ProviderQuote {
    let series = result.indicators.quote.into_iter().next().unwrap_or_default();

    let mut closes = Vec::with_capacity(series.close.len());
    let mut volumes = Vec::with_capacity(series.close.len());
    for (i, close) in series.close.iter().enumerate() {
        if let Some(close) = close {
            closes.push(*close);
            let volume = series.volume.get(i).copied().flatten().unwrap_or(0.0);
            volumes.push(volume.max(0.0) as u64);
        }
    }

    let meta = result.meta;
    ProviderQuote {
        closes,
        volumes,
        previous_close: meta.previous_close.or(meta.chart_previous_close),
        regular_market_volume: meta.regular_market_volume.map(|v| v.max(0.0) as u64),
        long_name: meta.long_name.or(meta.short_name),
        market_cap: None,
    }
}

/// Company metadata the chart endpoint does not carry
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct CompanySummary {
    pub long_name: Option<String>,
    pub market_cap: Option<f64>,
}

pub(crate) fn summary_to_company(result: QuoteSummaryResult) -> CompanySummary {
    let price = result.price.unwrap_or_default();
    let detail_cap = result
        .summary_detail
        .and_then(|d| d.market_cap)
        .and_then(|v| v.raw);

    CompanySummary {
        long_name: price.long_name.or(price.short_name),
        market_cap: detail_cap.or_else(|| price.market_cap.and_then(|v| v.raw)),
    }
}

#[async_trait]
impl MarketDataProvider for YahooQuoteProvider {
    /// Price history decides success; company metadata is best effort
    async fn fetch_quote(&self, symbol: &str) -> Result<ProviderQuote, ProviderError> {
        let (chart, summary) = tokio::join!(
            self.retry.run("yahoo_chart", move || self.fetch_chart(symbol)),
            self.fetch_summary(symbol),
        );

        let mut quote = chart?;
        match summary {
            Ok(summary) => {
                quote.market_cap = summary.market_cap;
                if summary.long_name.is_some() {
                    quote.long_name = summary.long_name;
                }
            }
            Err(e) => {
                debug!(
                    symbol = %symbol,
                    error = %e,
                    "Company summary unavailable for {}, market cap omitted",
                    symbol
                );
            }
        }
        Ok(quote)
    }
}
