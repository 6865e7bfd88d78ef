//! HTTP client library for the Pricing Service API.
//!
//! This crate provides a typed HTTP client for the pricing service REST
//! endpoints.
//!
//! # Example
//!
//! ```no_run
//! use pricing_client::{ClientConfig, PricingClient};
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), pricing_client::Error> {
//!     let client = PricingClient::new(ClientConfig {
//!         base_url: "http://localhost:8080".into(),
//!         timeout: Duration::from_secs(30),
//!     })?;
//!
//!     let price = client.get_price("AAPL").await?;
//!     println!("{} closed at {}", price.ticker, price.close);
//!
//!     Ok(())
//! }
//! ```

mod client;
mod error;
mod types;

pub use client::{ClientConfig, PricingClient};
pub use error::Error;
pub use types::*;
