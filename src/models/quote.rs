use serde::{Deserialize, Serialize};

/// Last known state of one symbol, built fresh every refresh cycle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    pub symbol: String,
    pub company_name: String,
    pub price: f64,
    pub change: f64,
    pub change_percent: f64,
    pub volume: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub market_cap: Option<f64>,
    pub previous_close: f64,
}

impl Quote {
    /// Derive change and change percent from the current price and the previous close
    pub fn new(
        symbol: impl Into<String>,
        company_name: impl Into<String>,
        price: f64,
        previous_close: f64,
        volume: u64,
        market_cap: Option<f64>,
    ) -> Self {
        let change = price - previous_close;
        let change_percent = if previous_close != 0.0 {
            change / previous_close * 100.0
        } else {
            0.0
        };

        Self {
            symbol: symbol.into(),
            company_name: company_name.into(),
            price,
            change,
            change_percent,
            volume,
            market_cap,
            previous_close,
        }
    }

    /// Zero-valued placeholder for a symbol whose fetch failed
    pub fn sentinel(symbol: impl Into<String>, company_name: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            company_name: company_name.into(),
            price: 0.0,
            change: 0.0,
            change_percent: 0.0,
            volume: 0,
            market_cap: None,
            previous_close: 0.0,
        }
    }
}
