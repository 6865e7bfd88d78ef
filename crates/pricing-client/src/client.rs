//! HTTP client for the pricing API.

use crate::error::Error;
use crate::types::*;
use reqwest::Client;
use std::time::Duration;
use url::Url;


/// Client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the API (e.g., "http://localhost:8080").
    pub base_url: String,
    /// Request timeout.
    pub timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".to_string(),
            timeout: Duration::from_secs(30),
        }
    }
}

/// HTTP client for the Pricing Service API.
#[derive(Debug, Clone)]
pub struct PricingClient {
    client: Client,
    base_url: Url,
}

impl PricingClient {
    /// Creates a new client with the given configuration.
    ///
    /// # Errors
    /// Returns error if the base URL is invalid or the HTTP client cannot be built.
    pub fn new(config: ClientConfig) -> Result<Self, Error> {
        let base_url = Url::parse(&config.base_url)?;
        if base_url.cannot_be_a_base() {
            return Err(Error::InvalidUrl(
                url::ParseError::RelativeUrlWithCannotBeABaseBase,
            ));
        }

        let client = Client::builder().timeout(config.timeout).build()?;

        Ok(Self { client, base_url })
    }

    /// Creates a new client with default configuration.
    ///
    /// # Errors
    /// Returns error if the base URL is invalid or the HTTP client cannot be built.
    pub fn with_base_url(base_url: &str) -> Result<Self, Error> {
        Self::new(ClientConfig {
            base_url: base_url.to_string(),
            ..Default::default()
        })
    }

    // ========================================================================
    // Health
    // ========================================================================

    /// Performs a health check.
    ///
    /// # Errors
    /// Returns error if the request fails.
    pub async fn health_check(&self) -> Result<HealthResponse, Error> {
        let resp = self.client.get(self.endpoint(&["health"])).send().await?;
        self.handle_response(resp).await
    }

    /// Performs a readiness check.
    ///
    /// # Errors
    /// Returns error if the request fails or the service is not ready.
    pub async fn readiness_check(&self) -> Result<ReadinessResponse, Error> {
        let resp = self
            .client
            .get(self.endpoint(&["health", "ready"]))
            .send()
            .await?;
        self.handle_response(resp).await
    }

    // ========================================================================
    // Prices
    // ========================================================================

    /// Gets sampled prices for every stored ticker.
    ///
    /// # Errors
    /// Returns error if the request fails.
    pub async fn get_all_prices(&self) -> Result<Vec<PriceDto>, Error> {
        let resp = self
            .client
            .get(self.endpoint(&["api", "v1", "prices"]))
            .send()
            .await?;
        self.handle_response(resp).await
    }

    /// Gets a sampled price for `ticker`.
    ///
    /// # Errors
    /// Returns [`Error::NotFound`] if the ticker is unknown, or another error
    /// if the request fails.
    pub async fn get_price(&self, ticker: &str) -> Result<PriceDto, Error> {
        let resp = self
            .client
            .get(self.endpoint(&["api", "v1", "price", ticker]))
            .send()
            .await?;
        self.handle_response(resp).await
    }

    // ========================================================================
    // Metrics
    // ========================================================================

    /// Gets the service's request metrics.
    ///
    /// # Errors
    /// Returns error if the request fails.
    pub async fn get_metrics(&self) -> Result<MetricsSnapshot, Error> {
        let resp = self
            .client
            .get(self.endpoint(&["api", "v1", "metrics"]))
            .send()
            .await?;
        self.handle_response(resp).await
    }

    // ========================================================================
    // Helpers
    // ========================================================================

    /// Appends percent-encoded `segments` to the base URL path.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    async fn handle_response<T: serde::de::DeserializeOwned>(
        &self,
        resp: reqwest::Response,
    ) -> Result<T, Error> {
        let status = resp.status();

        if status.is_success() {
            return Ok(resp.json().await?);
        }

        let text = resp.text().await.unwrap_or_default();
        let message = error_message(&text);

        if status.as_u16() == 404 {
            Err(Error::NotFound(message))
        } else {
            Err(Error::Api {
                status: status.as_u16(),
                message,
            })
        }
    }
}

/// Extracts the message from an [`ErrorResponse`] body, or returns the raw text.
fn error_message(body: &str) -> String {
    serde_json::from_str::<ErrorResponse>(body)
        .map(|error| error.error)
        .unwrap_or_else(|_| body.to_string())
}
