//! REST API handlers for the mindmap server

use std::sync::Arc;

use axum::{
    extract::State,
    http::{StatusCode, header},
    response::{IntoResponse, Json, Response},
};
use mindmap_core::{DEFAULT_FILE_NAME, DiagramSummary, EditorEvent, summarize};
use serde::Serialize;
use tracing::error;

use crate::ServerState;

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Error body returned for rejected requests
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

fn editor_attached() -> Response {
    (
        StatusCode::CONFLICT,
        Json(ErrorResponse {
            error: "a WebSocket editor is attached to this session".to_string(),
        }),
    )
        .into_response()
}

/// Get the current diagram as JSON
pub async fn get_diagram(State(state): State<Arc<ServerState>>) -> impl IntoResponse {
    let store = state.store.read().await;
    Json(store.export_diagram())
}

/// Download the diagram as `mindmap.json`
pub async fn export_diagram(State(state): State<Arc<ServerState>>) -> Response {
    let document = state.store.read().await.export_document();
    match document {
        Ok(body) => (
            [
                (header::CONTENT_TYPE, "application/json; charset=utf-8".to_string()),
                (
                    header::CONTENT_DISPOSITION,
                    format!("attachment; filename=\"{}\"", DEFAULT_FILE_NAME),
                ),
            ],
            body,
        )
            .into_response(),
        Err(e) => {
            error!("Export failed: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: e.to_string(),
                }),
            )
                .into_response()
        }
    }
}

/// Replace the diagram with an uploaded document
pub async fn import_diagram(State(state): State<Arc<ServerState>>, body: String) -> Response {
    if state.has_editor().await {
        return editor_attached();
    }
    match state.import_document(&body).await {
        Ok(diagram) => Json(summarize(&diagram)).into_response(),
        Err(e) => (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: e.to_string(),
            }),
        )
            .into_response(),
    }
}

/// Structural summary of the current diagram
pub async fn get_summary(State(state): State<Arc<ServerState>>) -> Json<DiagramSummary> {
    let store = state.store.read().await;
    Json(summarize(&store.export_diagram()))
}

/// Apply a renderer event and return the resulting diff
pub async fn post_event(
    State(state): State<Arc<ServerState>>,
    Json(event): Json<EditorEvent>,
) -> Response {
    if state.has_editor().await {
        return editor_attached();
    }
    Json(state.apply_event(event).await).into_response()
}

/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    let health = HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    };
    Json(health)
}
