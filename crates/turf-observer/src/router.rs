//! Axum router construction for the Observer API.
//!
//! Assembles all routes (REST + `WebSocket`) into a single [`Router`]
//! with CORS middleware enabled for cross-origin dashboard access.

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::state::AppState;
use crate::{handlers, ops, ws};

/// Build the complete Axum router for the Observer server.
///
/// The router includes:
/// - `GET /` -- minimal HTML status page
/// - `GET /ws/sweeps` -- `WebSocket`: district snapshot, then sweep frames
/// - `GET /api/regions` -- all regions with current state
/// - `GET /api/regions/:id` -- single region detail
/// - `GET /api/regions/:id/effects` -- live effects
/// - `GET /api/regions/:id/modifiers` -- combined modifiers
/// - `GET /api/regions/:id/history` -- recent events
/// - `POST /api/regions/:id/events` -- record a territorial event
/// - `POST /api/ops/{aggregate,decay,trigger}` -- run a sweep now
///
/// CORS is configured to allow any origin for development. In
/// production this should be restricted.
pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Status page
        .route("/", get(handlers::index))
        // WebSocket
        .route("/ws/sweeps", get(ws::ws_sweeps))
        // REST API
        .route("/api/regions", get(handlers::list_regions))
        .route("/api/regions/{id}", get(handlers::get_region))
        .route("/api/regions/{id}/effects", get(handlers::get_effects))
        .route("/api/regions/{id}/modifiers", get(handlers::get_modifiers))
        .route("/api/regions/{id}/history", get(handlers::get_history))
        .route("/api/regions/{id}/events", post(handlers::record_event))
        // Operator endpoints
        .route("/api/ops/aggregate", post(ops::run_aggregate))
        .route("/api/ops/decay", post(ops::run_decay))
        .route("/api/ops/trigger", post(ops::run_trigger))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
