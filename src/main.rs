mod analysis;
mod config;
mod errors;
mod handlers;
mod highlights;
mod models;
mod openai_client;
mod services;

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_governor::{
    governor::GovernorConfigBuilder, key_extractor::SmartIpKeyExtractor, GovernorLayer,
};
use tower_http::{cors::CorsLayer, limit::RequestBodyLimitLayer, trace::TraceLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;

/// Main entry point for the application.
///
/// This function initializes the application, including:
/// - Logging and tracing.
/// - Configuration loading.
/// - HTTP routes and middleware (CORS, Rate Limiting).
///
/// It then starts the Axum server.
///
/// # Returns
///
/// * `anyhow::Result<()>` - Ok if the server runs successfully, or an error if initialization fails.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "neighbor_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration; a missing provider credential fails here, not per
    // request
    let config = Config::from_env()?;
    tracing::info!("Configuration loaded successfully");

    // Build application state. No database, no caches: each request is
    // handled in isolation.
    let app_state = Arc::new(handlers::AppState {
        config: config.clone(),
    });

    // Configure rate limiter: 10 requests/second per IP, burst of 20
    let governor_conf = Arc::new(
        GovernorConfigBuilder::default()
            .per_second(10)
            .burst_size(20)
            .key_extractor(SmartIpKeyExtractor)
            .finish()
            .unwrap(),
    );

    // Build protected routes with security layers
    let protected_routes = Router::new()
        .route("/api/analyze-building", post(handlers::analyze_building))
        .route("/api/fetch-osm-data", post(handlers::fetch_osm_data))
        .layer(
            ServiceBuilder::new()
                // Request size limit: 20MB max payload (image references may
                // be data URLs)
                .layer(RequestBodyLimitLayer::new(20 * 1024 * 1024))
                // Rate limiting: 10 req/sec per IP, burst of 20
                .layer(GovernorLayer {
                    config: governor_conf,
                }),
        );

    // Build final app with health check (bypasses rate limiting)
    let app = Router::new()
        .route("/health", get(handlers::health))
        .merge(protected_routes)
        .with_state(app_state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
