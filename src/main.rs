//! Pricing Service Server
//!
//! REST API server returning sampled synthetic security prices.

use pricing_service::api::create_router;
use pricing_service::config::{CONFIG_PATH_ENV, Config, DEFAULT_CONFIG_PATH};
use pricing_service::db::{DatabasePool, seed};
use pricing_service::repository::{PgPriceRepository, PriceRepository};
use pricing_service::state::AppState;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use pricing_service::error::ErrorResponse;
use pricing_service::metrics::{BucketSnapshot, MetricsSnapshot, SeriesSnapshot};
use pricing_service::models::{HealthResponse, PriceDto, ReadinessResponse};

/// OpenAPI documentation.
#[derive(OpenApi)]
#[openapi(
    paths(
        pricing_service::api::handlers::health_check,
        pricing_service::api::handlers::readiness_check,
        pricing_service::api::handlers::get_all_prices,
        pricing_service::api::handlers::get_price_by_ticker,
        pricing_service::api::handlers::get_metrics,
    ),
    components(
        schemas(
            PriceDto,
            HealthResponse,
            ReadinessResponse,
            ErrorResponse,
            MetricsSnapshot,
            SeriesSnapshot,
            BucketSnapshot,
        )
    ),
    tags(
        (name = "Health", description = "Health check endpoints"),
        (name = "Prices", description = "Sampled security prices"),
        (name = "Metrics", description = "Request metrics"),
    ),
    info(
        title = "Pricing Service API",
        version = "0.1.0",
        description = "REST API serving sampled synthetic security prices",
        license(name = "MIT")
    )
)]
struct ApiDoc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config_path =
        std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    let mut config = Config::load_or_default(&config_path)?;
    config.apply_overrides(|key| std::env::var(key).ok())?;
    info!(path = %config_path, "Configuration loaded");

    let repository = connect_repository(&config).await?;
    let state = Arc::new(AppState::with_cache(repository, config.cache.ttl()));

    let host = &config.server.host;
    let port = config.server.port;

    info!("Starting Pricing Service on {}:{}", host, port);
    info!(
        "Swagger UI available at http://{}:{}/swagger-ui/",
        host, port
    );

    // Configure CORS
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Build the router
    let app = create_router(state)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    // Start the server
    let addr = format!("{}:{}", host, port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

/// Builds the price repository: PostgreSQL when a database URL is configured,
/// otherwise an in-memory repository seeded from CSV.
async fn connect_repository(config: &Config) -> anyhow::Result<Arc<dyn PriceRepository>> {
    let Some(url) = config.database.url.as_deref() else {
        let repository = seed::load_in_memory(&config.seed)?;
        info!(rows = repository.len(), "Using in-memory price repository");
        return Ok(Arc::new(repository));
    };

    let db = DatabasePool::connect(url, &config.database).await?;
    db.run_migrations().await?;

    if config.seed.enabled {
        let inserted = seed::seed_if_empty(&db, &config.seed).await?;
        info!(inserted, "Price table seed check complete");
    }

    Ok(Arc::new(PgPriceRepository::new(db)))
}
