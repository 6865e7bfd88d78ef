//! Price endpoint tests against a running server.

use pricing_client::Error;
use pricing_tests::{create_test_client, is_served_price};
use std::collections::HashSet;

#[tokio::test]
#[ignore = "requires a running pricing-service"]
async fn test_get_all_prices() {
    let client = create_test_client().expect("Failed to create client");

    let prices = client.get_all_prices().await.expect("Failed to get prices");

    assert!(!prices.is_empty());
    for price in &prices {
        assert!(is_served_price(price.open), "{}", price.open);
        assert_eq!(price.open, price.close);
        assert_eq!(price.open, price.high);
        assert_eq!(price.open, price.low);
    }
}

#[tokio::test]
#[ignore = "requires a running pricing-service"]
async fn test_get_price_for_listed_ticker() {
    let client = create_test_client().expect("Failed to create client");

    let prices = client.get_all_prices().await.expect("Failed to get prices");
    let ticker = &prices[0].ticker;

    let price = client.get_price(ticker).await.expect("Failed to get price");
    assert_eq!(&price.ticker, ticker);
    assert!(is_served_price(price.close));
}

#[tokio::test]
#[ignore = "requires a running pricing-service"]
async fn test_get_price_unknown_ticker() {
    let client = create_test_client().expect("Failed to create client");

    let result = client.get_price("ZZZZ-UNKNOWN").await;
    assert!(matches!(result, Err(Error::NotFound(_))));
}

#[tokio::test]
#[ignore = "requires a running pricing-service"]
async fn test_repeated_requests_are_resampled() {
    let client = create_test_client().expect("Failed to create client");

    let prices = client.get_all_prices().await.expect("Failed to get prices");
    let ticker = prices[0].ticker.clone();

    let mut seen = HashSet::new();
    for _ in 0..50 {
        let price = client.get_price(&ticker).await.expect("Failed to get price");
        seen.insert(price.open);
    }

    assert!(seen.len() > 1, "no variation across 50 samples of {ticker}");
}

#[tokio::test]
#[ignore = "requires a running pricing-service"]
async fn test_requests_are_recorded_in_metrics() {
    let client = create_test_client().expect("Failed to create client");

    let before = client.get_metrics().await.expect("Failed to get metrics");
    let _ = client.get_price("ZZZZ-UNKNOWN").await;
    let after = client.get_metrics().await.expect("Failed to get metrics");

    let path = "/api/v1/price/{ticker}";
    assert!(after.count_for_path(path) > before.count_for_path(path));
}
