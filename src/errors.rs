//! Error types shared across the provider, configuration and refresh layers

use thiserror::Error;

/// Boxed error used at the cycle boundary (scheduler / manual refresh)
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Failure of a single provider call for one symbol.
///
/// These never escape the fetcher: each one is absorbed into a sentinel quote.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProviderError {
    #[error("network error: {0}")]
    Network(String),

    #[error("request timed out after {0:?}")]
    Timeout(std::time::Duration),

    #[error("provider returned HTTP {status}")]
    Http { status: u16 },

    #[error("rate limited by provider")]
    RateLimited,

    #[error("symbol not found: {0}")]
    NotFound(String),

    #[error("no historical data available for {0}")]
    NoHistory(String),

    #[error("malformed provider response: {0}")]
    Malformed(String),
}

impl ProviderError {
    /// Transient failures worth another attempt
    pub fn is_retryable(&self) -> bool {
        match self {
            ProviderError::Network(_) | ProviderError::Timeout(_) | ProviderError::RateLimited => {
                true
            }
            ProviderError::Http { status } => *status >= 500,
            ProviderError::NotFound(_)
            | ProviderError::NoHistory(_)
            | ProviderError::Malformed(_) => false,
        }
    }

    /// Short label used for the `errors_total{kind}` metric
    pub fn kind(&self) -> &'static str {
        match self {
            ProviderError::Network(_) => "network",
            ProviderError::Timeout(_) => "timeout",
            ProviderError::Http { .. } => "http",
            ProviderError::RateLimited => "rate_limited",
            ProviderError::NotFound(_) => "not_found",
            ProviderError::NoHistory(_) => "no_history",
            ProviderError::Malformed(_) => "malformed",
        }
    }

    /// Operator-facing description of what went wrong for `symbol`
    pub fn user_message(&self, symbol: &str) -> String {
        match self {
            ProviderError::Timeout(_) => {
                format!("Timeout fetching {} - will retry on next refresh", symbol)
            }
            ProviderError::Network(_) | ProviderError::RateLimited => {
                format!("Network error fetching {} - check internet connection", symbol)
            }
            ProviderError::NotFound(_) | ProviderError::Malformed(_) => {
                format!("Invalid symbol {} - check configuration", symbol)
            }
            ProviderError::Http { .. } | ProviderError::NoHistory(_) => {
                format!("Error fetching {} - will retry on next refresh", symbol)
            }
        }
    }
}

/// Timeouts are not mapped here: only the caller knows the configured deadline
impl From<reqwest::Error> for ProviderError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ProviderError::Malformed(err.to_string())
        } else if let Some(status) = err.status() {
            ProviderError::Http {
                status: status.as_u16(),
            }
        } else {
            ProviderError::Network(err.to_string())
        }
    }
}

/// Startup configuration problems; the process must not start serving
#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("symbol list must not be empty")]
    NoSymbols,

    #[error("{0} must be a positive integer")]
    NotPositive(&'static str),

    #[error("invalid value for {name}: {value:?}")]
    Invalid { name: &'static str, value: String },
}
