//! Axum router setup for the mindmap server

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::cors::CorsLayer;

use crate::{
    ServerState,
    handlers::{export_diagram, get_diagram, get_summary, health_check, import_diagram, post_event},
    websocket::ws_handler,
};

/// Create the axum router with all routes
pub fn create_router(state: Arc<ServerState>) -> Router {
    Router::new()
        // WebSocket endpoint for the renderer
        .route("/ws", get(ws_handler))
        // REST API endpoints
        .route("/api/diagram", get(get_diagram))
        .route("/api/export", get(export_diagram))
        .route("/api/import", post(import_diagram))
        .route("/api/summary", get(get_summary))
        .route("/api/events", post(post_event))
        .route("/api/health", get(health_check))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
