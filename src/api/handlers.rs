//! API request handlers.

use crate::error::{ApiError, ErrorResponse};
use crate::metrics::MetricsSnapshot;
use crate::models::{HealthResponse, PriceDto, ReadinessResponse};
use crate::state::AppState;
use axum::Json;
use axum::extract::{Path, State};
use std::sync::Arc;
use tracing::warn;


// ============================================================================
// Health Check
// ============================================================================

/// Health check endpoint.
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse)
    ),
    tag = "Health"
)]
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Readiness endpoint; checks that the price repository answers.
#[utoipa::path(
    get,
    path = "/health/ready",
    responses(
        (status = 200, description = "Service is ready", body = ReadinessResponse),
        (status = 503, description = "Repository unavailable", body = ErrorResponse)
    ),
    tag = "Health"
)]
pub async fn readiness_check(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ReadinessResponse>, ApiError> {
    let repository = state.prices.repository();

    repository.ping().await.map_err(|e| {
        warn!(repository = repository.name(), error = %e, "Readiness check failed");
        ApiError::ServiceUnavailable(e.to_string())
    })?;

    Ok(Json(ReadinessResponse {
        status: "ready".to_string(),
        repository: repository.name().to_string(),
    }))
}

// ============================================================================
// Prices
// ============================================================================

/// Get sampled prices for all tickers.
#[utoipa::path(
    get,
    path = "/api/v1/prices",
    responses(
        (status = 200, description = "Sampled prices in repository order", body = Vec<PriceDto>),
        (status = 500, description = "Repository failure", body = ErrorResponse)
    ),
    tag = "Prices"
)]
pub async fn get_all_prices(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<PriceDto>>, ApiError> {
    let prices = state.prices.get_all_prices().await?;
    Ok(Json(prices))
}

/// Get a sampled price for one ticker.
#[utoipa::path(
    get,
    path = "/api/v1/price/{ticker}",
    params(
        ("ticker" = String, Path, description = "Ticker symbol")
    ),
    responses(
        (status = 200, description = "Sampled price", body = PriceDto),
        (status = 404, description = "Ticker not found", body = ErrorResponse),
        (status = 500, description = "Repository failure", body = ErrorResponse)
    ),
    tag = "Prices"
)]
pub async fn get_price_by_ticker(
    State(state): State<Arc<AppState>>,
    Path(ticker): Path<String>,
) -> Result<Json<PriceDto>, ApiError> {
    let price = state.prices.get_price_by_ticker(&ticker).await?;
    Ok(Json(price))
}

// ============================================================================
// Metrics
// ============================================================================

/// Get recorded request metrics.
#[utoipa::path(
    get,
    path = "/api/v1/metrics",
    responses(
        (status = 200, description = "Request metrics snapshot", body = MetricsSnapshot)
    ),
    tag = "Metrics"
)]
pub async fn get_metrics(State(state): State<Arc<AppState>>) -> Json<MetricsSnapshot> {
    Json(state.metrics.snapshot())
}
