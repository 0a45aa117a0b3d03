//! External data services: provider clients and the fan-out fetcher

pub mod fetcher;
pub mod market_data;
pub mod retry;
pub mod yahoo;

pub use fetcher::{FetchReport, QuoteFetcher, QuoteSource, SymbolOutcome};
pub use market_data::{MarketDataProvider, ProviderQuote};
pub use retry::RetryPolicy;
pub use yahoo::YahooQuoteProvider;
