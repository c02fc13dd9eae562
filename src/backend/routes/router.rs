/**
 * Router Configuration
 *
 * This module provides the main router creation function that combines
 * all route configurations into a single Axum router.
 *
 * # Route Order
 *
 * 1. Public routes (`/health`, `/ws`)
 * 2. API routes (bearer-authenticated)
 * 3. Fallback handler (404)
 *
 * The WebSocket endpoint authenticates on its own (upgrade credential or
 * `connect` frame), so it sits outside the API middleware.
 */

use axum::{http::StatusCode, routing::get, Json, Router};
use tower_http::trace::TraceLayer;

use crate::backend::realtime::ws_handler;
use crate::backend::routes::api_routes::configure_api_routes;
use crate::backend::server::state::AppState;

/// Liveness probe (GET /health)
async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn not_found() -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::NOT_FOUND,
        Json(serde_json::json!({ "error": "not found", "kind": "not_found", "status": 404 })),
    )
}

/// Create the Axum router with all routes configured
///
/// # Route Details
///
/// ## Public
///
/// - `GET /health` - Liveness probe
/// - `GET /ws` - WebSocket upgrade for real-time messaging
///
/// ## API
///
/// See `configure_api_routes`.
pub fn create_router(app_state: AppState) -> Router<()> {
    let router = Router::new()
        .route("/health", get(health))
        .route("/ws", get(ws_handler));

    let router = configure_api_routes(router, app_state.clone());

    router
        .fallback(not_found)
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}
