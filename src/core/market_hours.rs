//! Rough market-open check: Monday to Friday, 09:00 to 16:00 local time.
//!
//! No holiday calendar and no exchange timezone; the host's local clock is used as is.

use chrono::{Datelike, Local, Timelike};

pub fn is_market_open_at<T: Datelike + Timelike>(now: &T) -> bool {
    now.weekday().num_days_from_monday() < 5 && (9..16).contains(&now.hour())
}

pub fn is_market_open() -> bool {
    is_market_open_at(&Local::now())
}
