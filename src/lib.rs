//! # Pricing Service - REST API Server
//!
//! A REST API serving synthetic security prices. Each stored row carries a
//! mean price and a standard deviation; every request draws a fresh value from
//! the normal distribution they describe, so repeated reads of the same ticker
//! return different, plausible prices.
//!
//! Built with [Axum](https://crates.io/crates/axum) for async HTTP handling and
//! provides OpenAPI/Swagger documentation via [utoipa](https://crates.io/crates/utoipa).
//!
//! ## Key Features
//!
//! - **Request-time sampling**: Prices are drawn per request, never cached.
//!   Values are rounded half-up to cents and floored at `0.01`.
//!
//! - **Pluggable storage**: PostgreSQL via `sqlx`, or an in-memory repository
//!   seeded from CSV when no database is configured.
//!
//! - **Short-lived record cache**: Repository reads are cached for a
//!   configurable TTL (one second by default).
//!
//! - **Request metrics**: Per-route counters and duration histograms exposed
//!   as JSON.
//!
//! - **OpenAPI Documentation**: Swagger UI at `/swagger-ui/`.
//!
//! ## Module Structure
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`api`] | Route handlers, middleware and router configuration |
//! | [`cache`] | TTL cache and caching repository decorator |
//! | [`config`] | TOML configuration with environment overrides |
//! | [`db`] | Connection pool, row types and CSV seeding |
//! | [`error`] | API error types with `IntoResponse` implementation |
//! | [`metrics`] | HTTP request metrics registry |
//! | [`models`] | Response DTOs with OpenAPI schemas |
//! | [`repository`] | Price repository trait and implementations |
//! | [`sampler`] | Normal-distribution price sampler |
//! | [`service`] | Price lookups combining repository and sampler |
//! | [`state`] | Application state management |
//!
//! ## API Endpoints
//!
//! | Method | Endpoint | Description |
//! |--------|----------|-------------|
//! | GET | `/health` | Liveness check |
//! | GET | `/health/ready` | Readiness check (pings the repository) |
//! | GET | `/api/v1/prices` | Sampled prices for every stored row |
//! | GET | `/api/v1/price/{ticker}` | Sampled price for one ticker |
//! | GET | `/api/v1/metrics` | Request metrics snapshot |
//!
//! ## Example Usage
//!
//! ```bash
//! # In-memory repository seeded from data/prices.csv
//! cargo run
//!
//! # PostgreSQL backed
//! DATABASE_URL=postgres://localhost/pricing cargo run
//!
//! # Sample a price
//! curl http://localhost:8080/api/v1/price/AAPL
//! ```

pub mod api;
pub mod cache;
pub mod config;
pub mod db;
pub mod error;
pub mod metrics;
pub mod models;
pub mod repository;
pub mod sampler;
pub mod service;
pub mod state;
