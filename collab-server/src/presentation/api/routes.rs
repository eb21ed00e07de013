use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::presentation::api::handlers;
use crate::presentation::api::middleware::request_id_middleware;
use crate::presentation::ws::ws_handler;
use crate::state::AppState;

/// Builds the full router: the WebSocket upgrade route, the side-band
/// workflow-deletion notification, and the diagnostics surface (4.12),
/// grounded on the teacher's `Router::new().merge(...).layer(...)` shape.
pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::list(
            state
                .settings
                .server
                .cors_allowed_origins
                .iter()
                .filter_map(|origin| origin.parse().ok()),
        ))
        .allow_methods(tower_http::cors::Any)
        .allow_headers(tower_http::cors::Any);

    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/ws", get(ws_handler))
        .route("/api/workflow-deleted", post(handlers::workflow_deleted))
        .route("/api/workflows/{workflow_id}/consistency", get(handlers::get_consistency))
        .route("/api/workflows/{workflow_id}/rooms", get(handlers::get_room_summary))
        .layer(axum::middleware::from_fn(request_id_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
