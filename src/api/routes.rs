//! API Route Configuration

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower::limit::ConcurrencyLimitLayer;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use super::handlers::{self, AppState};
use super::middleware::{logging_middleware, rate_limit_middleware};
use crate::models::config::ServerConfig;

/// Create the API router with all routes and middleware
pub fn create_router(state: Arc<AppState>, server: &ServerConfig) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_v1 = Router::new()
        // Health & Status
        .route("/health", get(handlers::health_check))
        .route("/stats", get(handlers::get_stats))
        // Chain snapshots
        .route(
            "/chain/health",
            get(handlers::chain_health_query).post(handlers::chain_health_body),
        )
        // Alert delivery
        .route("/alerts/telegram", post(handlers::send_telegram_alert));

    Router::new()
        .nest("/v1", api_v1)
        .route("/health", get(handlers::health_check))
        .with_state(state)
        // Middleware (order matters - bottom runs first)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(server.request_timeout))
        .layer(cors)
        .layer(middleware::from_fn(rate_limit_middleware))
        .layer(middleware::from_fn(logging_middleware))
        .layer(ConcurrencyLimitLayer::new(server.max_concurrency))
}
