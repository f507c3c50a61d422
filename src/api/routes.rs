//! API Routes
//!
//! Configures the Axum router with the control endpoints and the proxy fallback.

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    events_handler, health_handler, proxy_handler, stats_handler, sync_handler, AppState,
};

/// Path prefix reserved for control endpoints; never forwarded to the origin.
pub const CONTROL_PREFIX: &str = "/__offline";

/// Creates the main router with all endpoints configured.
///
/// # Endpoints
/// - `GET /__offline/health` - Health check endpoint
/// - `GET /__offline/stats` - Get cache statistics
/// - `POST /__offline/sync` - Reconnect signal for a sync tag
/// - `GET /__offline/events` - Page client message stream
/// - fallback - Offline cache routing
///
/// # Middleware
/// - CORS: Allows any origin (configurable for production)
/// - Tracing: Logs all requests for debugging
pub fn create_router(state: AppState) -> Router {
    // Configure CORS middleware
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route(&format!("{}/health", CONTROL_PREFIX), get(health_handler))
        .route(&format!("{}/stats", CONTROL_PREFIX), get(stats_handler))
        .route(&format!("{}/sync", CONTROL_PREFIX), post(sync_handler))
        .route(&format!("{}/events", CONTROL_PREFIX), get(events_handler))
        .fallback(proxy_handler)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
