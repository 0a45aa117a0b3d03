use serde::{Deserialize, Serialize};

use super::quote::Quote;

/// Display record derived from a quote
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockView {
    pub symbol: String,
    pub company_name: String,
    pub price: f64,
    pub change: f64,
    pub change_percent: f64,
    pub volume: u64,
    pub volume_millions: f64,
    pub is_positive: bool,
    pub is_negative: bool,
    pub market_cap: Option<f64>,
}

impl From<&Quote> for StockView {
    fn from(quote: &Quote) -> Self {
        Self {
            symbol: quote.symbol.clone(),
            company_name: quote.company_name.clone(),
            price: quote.price,
            change: quote.change,
            change_percent: quote.change_percent,
            volume: quote.volume,
            volume_millions: quote.volume as f64 / 1_000_000.0,
            is_positive: quote.change > 0.0,
            is_negative: quote.change < 0.0,
            market_cap: quote.market_cap,
        }
    }
}
