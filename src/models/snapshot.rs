use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;

use super::quote::Quote;

/// Complete set of quotes produced by one refresh cycle
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    /// One quote per configured symbol, in configured order
    pub quotes: Vec<Quote>,
    pub last_update: Option<DateTime<Utc>>,
}

impl Snapshot {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn new(quotes: Vec<Quote>, last_update: DateTime<Utc>) -> Self {
        Self {
            quotes,
            last_update: Some(last_update),
        }
    }

    pub fn len(&self) -> usize {
        self.quotes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.quotes.is_empty()
    }

    pub fn get(&self, symbol: &str) -> Option<&Quote> {
        self.quotes.iter().find(|q| q.symbol == symbol)
    }
}

/// Result of one refresh cycle, scheduled or manual
#[derive(Debug, Clone)]
pub struct RefreshOutcome {
    pub success: bool,
    /// The snapshot stored by this cycle, absent when the cycle failed
    pub snapshot: Option<Arc<Snapshot>>,
    pub succeeded: usize,
    pub failed: usize,
    pub error: Option<String>,
    pub duration: Duration,
}

impl RefreshOutcome {
    pub fn completed(snapshot: Arc<Snapshot>, succeeded: usize, failed: usize, duration: Duration) -> Self {
        Self {
            success: true,
            snapshot: Some(snapshot),
            succeeded,
            failed,
            error: None,
            duration,
        }
    }

    pub fn failed(error: impl Into<String>, duration: Duration) -> Self {
        Self {
            success: false,
            snapshot: None,
            succeeded: 0,
            failed: 0,
            error: Some(error.into()),
            duration,
        }
    }
}
