//! Unit tests for sorted views

use chrono::Utc;
use stockwatch::core::presenter::{view, SortKey};
use stockwatch::models::{Quote, Snapshot};

fn sample() -> Snapshot {
    Snapshot::new(
        vec![
            Quote::new("NVDA", "Nvidia", 900.0, 880.0, 40_000_000, None),
            Quote::new("AAPL", "Apple", 180.0, 185.0, 50_000_000, None),
            Quote::new("MSFT", "Microsoft", 410.0, 400.0, 20_000_000, None),
            Quote::sentinel("ORCL", "Oracle"),
            Quote::new("AMZN", "Amazon", 175.0, 170.0, 30_000_000, None),
        ],
        Utc::now(),
    )
}

#[test]
fn sort_key_parsing() {
    assert_eq!(SortKey::from("name"), SortKey::Name);
    assert_eq!(SortKey::from("price"), SortKey::Price);
    assert_eq!(SortKey::from("change"), SortKey::Change);
    assert_eq!(SortKey::from("volume"), SortKey::Natural);
    assert_eq!(SortKey::default(), SortKey::Name);
}

#[test]
fn name_sort_is_non_decreasing() {
    let views = view(&sample(), SortKey::Name);
    assert!(views.windows(2).all(|w| w[0].company_name <= w[1].company_name));
    assert_eq!(views[0].company_name, "Amazon");
}

#[test]
fn price_sort_is_non_increasing() {
    let views = view(&sample(), SortKey::Price);
    assert!(views.windows(2).all(|w| w[0].price >= w[1].price));
    assert_eq!(views[0].symbol, "NVDA");
    assert_eq!(views.last().unwrap().symbol, "ORCL");
}

#[test]
fn change_sort_is_non_increasing() {
    let views = view(&sample(), SortKey::Change);
    assert!(views
        .windows(2)
        .all(|w| w[0].change_percent >= w[1].change_percent));
    assert_eq!(views.last().unwrap().symbol, "AAPL");
}

#[test]
fn unknown_key_keeps_snapshot_order() {
    let snapshot = sample();
    let views = view(&snapshot, SortKey::from("bogus"));
    let order: Vec<_> = views.iter().map(|v| v.symbol.as_str()).collect();
    let expected: Vec<_> = snapshot.quotes.iter().map(|q| q.symbol.as_str()).collect();
    assert_eq!(order, expected);
}

#[test]
fn empty_snapshot_gives_empty_view() {
    assert!(view(&Snapshot::empty(), SortKey::Price).is_empty());
}
