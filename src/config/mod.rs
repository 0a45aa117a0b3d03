//! Application configuration
//!
//! Defaults describe the tracked technology stocks; every value can be
//! overridden from the environment (a `.env` file is loaded by the binary).

use crate::errors::ConfigError;
use std::env;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_YAHOO_BASE_URL: &str = "https://query1.finance.yahoo.com";

const DEFAULT_SYMBOLS: &[(&str, &str)] = &[
    ("GOOGL", "Alphabet"),
    ("AMZN", "Amazon"),
    ("AAPL", "Apple"),
    ("META", "Meta Platforms"),
    ("MSFT", "Microsoft"),
    ("NVDA", "Nvidia"),
    ("TSLA", "Tesla"),
    ("ORCL", "Oracle"),
    ("AVGO", "Broadcom"),
];

/// A symbol the dashboard tracks, with the name shown to users
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackedSymbol {
    pub symbol: String,
    pub company_name: String,
}

impl TrackedSymbol {
    pub fn new(symbol: impl Into<String>, company_name: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            company_name: company_name.into(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub symbols: Vec<TrackedSymbol>,
    pub refresh_interval_seconds: u64,
    /// Delay before retrying after a cycle-level failure
    pub cycle_retry_delay_seconds: u64,
    pub request_timeout_seconds: u64,
    /// Upper bound for one symbol's fetch, retries included
    pub fetch_timeout_seconds: u64,
    pub max_retries: usize,
    pub retry_delay_seconds: u64,
    pub price_precision: usize,
    pub volume_precision: usize,
    pub port: u16,
    pub yahoo_base_url: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            symbols: DEFAULT_SYMBOLS
                .iter()
                .map(|(symbol, name)| TrackedSymbol::new(*symbol, *name))
                .collect(),
            refresh_interval_seconds: 60,
            cycle_retry_delay_seconds: 30,
            request_timeout_seconds: 10,
            fetch_timeout_seconds: 45,
            max_retries: 3,
            retry_delay_seconds: 2,
            price_precision: 2,
            volume_precision: 1,
            port: 8080,
            yahoo_base_url: DEFAULT_YAHOO_BASE_URL.to_string(),
        }
    }
}

impl AppConfig {
    /// Build the configuration from defaults plus environment overrides
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Ok(raw) = env::var("SYMBOLS") {
            config.symbols = parse_symbols(&raw);
        }
        override_from_env(&mut config.refresh_interval_seconds, "REFRESH_INTERVAL_SECONDS")?;
        override_from_env(&mut config.cycle_retry_delay_seconds, "CYCLE_RETRY_DELAY_SECONDS")?;
        override_from_env(&mut config.request_timeout_seconds, "REQUEST_TIMEOUT_SECONDS")?;
        override_from_env(&mut config.fetch_timeout_seconds, "FETCH_TIMEOUT_SECONDS")?;
        override_from_env(&mut config.max_retries, "MAX_RETRIES")?;
        override_from_env(&mut config.retry_delay_seconds, "RETRY_DELAY_SECONDS")?;
        override_from_env(&mut config.price_precision, "PRICE_PRECISION")?;
        override_from_env(&mut config.volume_precision, "VOLUME_PRECISION")?;
        override_from_env(&mut config.port, "PORT")?;
        if let Ok(url) = env::var("YAHOO_BASE_URL") {
            config.yahoo_base_url = url.trim_end_matches('/').to_string();
        }

        Ok(config)
    }

    /// Reject configurations the service cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.symbols.is_empty() {
            return Err(ConfigError::NoSymbols);
        }
        if self.refresh_interval_seconds == 0 {
            return Err(ConfigError::NotPositive("REFRESH_INTERVAL_SECONDS"));
        }
        if self.cycle_retry_delay_seconds == 0 {
            return Err(ConfigError::NotPositive("CYCLE_RETRY_DELAY_SECONDS"));
        }
        if self.request_timeout_seconds == 0 {
            return Err(ConfigError::NotPositive("REQUEST_TIMEOUT_SECONDS"));
        }
        if self.fetch_timeout_seconds == 0 {
            return Err(ConfigError::NotPositive("FETCH_TIMEOUT_SECONDS"));
        }
        Ok(())
    }

    pub fn symbol_list(&self) -> Vec<String> {
        self.symbols.iter().map(|s| s.symbol.clone()).collect()
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_seconds)
    }

    pub fn cycle_retry_delay(&self) -> Duration {
        Duration::from_secs(self.cycle_retry_delay_seconds)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_seconds)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_secs(self.retry_delay_seconds)
    }
}

/// Parse `SYM[:Name],SYM[:Name]`; a missing name falls back to the symbol
pub fn parse_symbols(raw: &str) -> Vec<TrackedSymbol> {
    raw.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| match entry.split_once(':') {
            Some((symbol, name)) if !name.trim().is_empty() => {
                TrackedSymbol::new(symbol.trim().to_uppercase(), name.trim())
            }
            Some((symbol, _)) => {
                let symbol = symbol.trim().to_uppercase();
                TrackedSymbol::new(symbol.clone(), symbol)
            }
            None => TrackedSymbol::new(entry.to_uppercase(), entry.to_uppercase()),
        })
        .collect()
}

fn override_from_env<T: FromStr>(target: &mut T, name: &'static str) -> Result<(), ConfigError> {
    if let Ok(value) = env::var(name) {
        *target = value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value })?;
    }
    Ok(())
}

/// Get the current environment (production, sandbox, ...)
pub fn get_environment() -> String {
    env::var("APP_ENV").unwrap_or_else(|_| "sandbox".to_string())
}

pub fn get_otlp_endpoint() -> Option<String> {
    env::var("OTEL_EXPORTER_OTLP_ENDPOINT")
        .ok()
        .filter(|v| !v.trim().is_empty())
}

pub fn get_otlp_bearer_token() -> Option<String> {
    env::var("OTEL_EXPORTER_OTLP_BEARER_TOKEN")
        .ok()
        .filter(|v| !v.trim().is_empty())
}

pub fn get_service_name() -> String {
    env::var("OTEL_SERVICE_NAME").unwrap_or_else(|_| "stockwatch".to_string())
}
