//! Unit tests for turning provider data into quotes

use stockwatch::errors::ProviderError;
use stockwatch::services::ProviderQuote;

#[test]
fn uses_two_most_recent_closes() {
    let raw = ProviderQuote {
        closes: vec![140.0, 148.0, 150.0],
        volumes: vec![10, 20, 1_000_000],
        previous_close: Some(1.0),
        ..ProviderQuote::default()
    };

    let quote = raw.into_quote("AAA", Some("Alpha")).unwrap();
    assert_eq!(quote.price, 150.0);
    assert_eq!(quote.previous_close, 148.0);
    assert!((quote.change - 2.0).abs() < 1e-9);
    assert_eq!(quote.volume, 1_000_000);
    assert_eq!(quote.company_name, "Alpha");
}

#[test]
fn single_close_falls_back_to_reported_previous_close() {
    let raw = ProviderQuote {
        closes: vec![50.0],
        previous_close: Some(40.0),
        regular_market_volume: Some(777),
        long_name: Some("Provider Name Inc.".to_string()),
        ..ProviderQuote::default()
    };

    let quote = raw.into_quote("XYZ", None).unwrap();
    assert_eq!(quote.previous_close, 40.0);
    assert!((quote.change_percent - 25.0).abs() < 1e-9);
    assert_eq!(quote.volume, 777);
    assert_eq!(quote.company_name, "Provider Name Inc.");
}

#[test]
fn single_close_without_previous_close_is_unchanged() {
    let raw = ProviderQuote {
        closes: vec![50.0],
        ..ProviderQuote::default()
    };

    let quote = raw.into_quote("XYZ", None).unwrap();
    assert_eq!(quote.change, 0.0);
    assert_eq!(quote.company_name, "XYZ");
}

#[test]
fn no_history_is_a_failure() {
    let err = ProviderQuote::default().into_quote("AAA", None).unwrap_err();
    assert_eq!(err, ProviderError::NoHistory("AAA".to_string()));
}

#[test]
fn negative_price_is_malformed() {
    let raw = ProviderQuote {
        closes: vec![10.0, -1.0],
        ..ProviderQuote::default()
    };
    assert!(matches!(
        raw.into_quote("AAA", None),
        Err(ProviderError::Malformed(_))
    ));
}
