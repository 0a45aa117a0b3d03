//! Sorted display views over the current snapshot

use crate::models::{Snapshot, StockView};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    /// Ascending company name
    #[default]
    Name,
    /// Descending price
    Price,
    /// Descending change percent
    Change,
    /// Snapshot order
    Natural,
}

impl From<&str> for SortKey {
    fn from(value: &str) -> Self {
        match value {
            "name" => SortKey::Name,
            "price" => SortKey::Price,
            "change" => SortKey::Change,
            _ => SortKey::Natural,
        }
    }
}

/// Build view records from `snapshot`, sorted by `key`
pub fn view(snapshot: &Snapshot, key: SortKey) -> Vec<StockView> {
    let mut views: Vec<StockView> = snapshot.quotes.iter().map(StockView::from).collect();

    match key {
        SortKey::Name => views.sort_by(|a, b| a.company_name.cmp(&b.company_name)),
        SortKey::Price => views.sort_by(|a, b| b.price.total_cmp(&a.price)),
        SortKey::Change => views.sort_by(|a, b| b.change_percent.total_cmp(&a.change_percent)),
        SortKey::Natural => {}
    }

    views
}
