//! Integration tests for the Pricing Service API.
//!
//! These tests require the API server to be running and are ignored by
//! default; run them with `cargo test -p pricing-tests -- --ignored`.
//! Configure the server URL via the `API_BASE_URL` environment variable
//! (default: `http://localhost:8080`).

use pricing_client::{ClientConfig, PricingClient};
use rust_decimal::Decimal;
use std::time::Duration;

/// Gets the API base URL from environment or uses default.
#[must_use]
pub fn get_api_url() -> String {
    std::env::var("API_BASE_URL").unwrap_or_else(|_| "http://localhost:8080".to_string())
}

/// Creates a test client configured for the API.
///
/// # Errors
/// Returns error if client creation fails.
pub fn create_test_client() -> Result<PricingClient, pricing_client::Error> {
    PricingClient::new(ClientConfig {
        base_url: get_api_url(),
        timeout: Duration::from_secs(10),
    })
}

/// Returns true if `price` is a valid served price: at least one cent with
/// exactly two decimal places.
#[must_use]
pub fn is_served_price(price: Decimal) -> bool {
    price >= Decimal::new(1, 2) && price.scale() == 2
}
