//! Route configuration.

use crate::api::{handlers, middleware};
use crate::state::AppState;
use axum::Router;
use axum::routing::get;
use std::sync::Arc;


/// Creates the API router.
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        .route("/health/ready", get(handlers::readiness_check))
        // Prices
        .route("/api/v1/prices", get(handlers::get_all_prices))
        .route("/api/v1/price/{ticker}", get(handlers::get_price_by_ticker))
        // Metrics
        .route("/api/v1/metrics", get(handlers::get_metrics))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::metrics_middleware,
        ))
        .with_state(state)
}
