//! API Routes
//!
//! Configures the Axum router with all cache endpoints.

use axum::{
    routing::{get, put},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    get_handler, has_handler, health_handler, insert_handler, list_handler, remove_handler,
    stats_handler, update_handler, AppState,
};

/// Creates the main router with all endpoints configured.
///
/// # Endpoints
/// - `PUT /enemy` - Insert a record unless its address is cached
/// - `POST /enemy` - Replace a record by address
/// - `GET /enemy/:address` - Fetch one record
/// - `DELETE /enemy/:address` - Remove a record
/// - `GET /enemies` - List the collection in order
/// - `GET /has/:address` - Membership check
/// - `GET /stats` - Persistence statistics
/// - `GET /health` - Health check endpoint
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
        .route("/enemy", put(insert_handler).post(update_handler))
        .route("/enemy/:address", get(get_handler).delete(remove_handler))
        .route("/enemies", get(list_handler))
        .route("/has/:address", get(has_handler))
        .route("/stats", get(stats_handler))
        .route("/health", get(health_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
