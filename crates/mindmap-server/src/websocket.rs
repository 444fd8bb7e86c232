//! WebSocket handling for the renderer event protocol

use std::sync::Arc;

use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
};
use futures_util::{SinkExt, StreamExt};
use mindmap_core::{Diagram, EditorEvent, GraphDiff, NodeId};
use serde::{Deserialize, Serialize};
use tokio::sync::{broadcast, mpsc};
use tracing::{debug, info, warn};

use crate::{ConnectionId, ServerState};

/// Capacity of each connection's direct-reply queue.
const REPLY_CAPACITY: usize = 32;

/// WebSocket message types for client-server communication
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum WsMessage {
    /// Client requests the full diagram
    #[serde(rename = "request_full_diagram")]
    RequestFullDiagram,
    /// Server sends the full diagram
    #[serde(rename = "full_diagram")]
    FullDiagram {
        diagram: Diagram,
        selected: Option<NodeId>,
        sequence: u64,
    },
    /// Client reports a renderer interaction or toolbar command
    #[serde(rename = "event")]
    Event { event: EditorEvent },
    /// Server broadcasts a graph diff
    #[serde(rename = "graph_diff")]
    GraphDiff { diff: GraphDiff },
    /// Client uploads a document to replace the diagram
    #[serde(rename = "import")]
    Import { document: String },
    /// Ping/pong for keepalive
    #[serde(rename = "ping")]
    Ping,
    #[serde(rename = "pong")]
    Pong,
    /// Error message, sent only to the client that caused it
    #[serde(rename = "error")]
    Error { message: String },
}

/// Handle WebSocket upgrade requests
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<ServerState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Handle an individual WebSocket connection
///
/// The first connection takes the editor role; later ones only receive
/// broadcasts until the editor disconnects.
async fn handle_socket(socket: WebSocket, state: Arc<ServerState>) {
    let connection = state.next_connection_id();
    if state.claim_editor(connection).await {
        info!("WebSocket connection {} established as editor", connection);
    } else {
        info!("WebSocket connection {} established read-only", connection);
    }

    let (mut sender, mut receiver) = socket.split();
    let mut rx = state.diff_tx.subscribe();
    let (reply_tx, mut reply_rx) = mpsc::channel::<WsMessage>(REPLY_CAPACITY);

    // Send full diagram immediately after connection
    let full = state.full_diagram().await;
    match serde_json::to_string(&full) {
        Ok(json_msg) => {
            if sender.send(Message::Text(json_msg)).await.is_err() {
                warn!("Failed to send initial diagram to WebSocket client");
                state.release_editor(connection).await;
                return;
            }
            debug!("Sent full diagram to WebSocket client");
        }
        Err(e) => warn!("Failed to serialize full diagram message: {}", e),
    }

    // Incoming messages from the client
    let state_clone = Arc::clone(&state);
    let mut recv_task = tokio::spawn(async move {
        while let Some(Ok(msg)) = receiver.next().await {
            match msg {
                Message::Text(text) => {
                    debug!("Received WebSocket message: {}", text);
                    let reply = match serde_json::from_str::<WsMessage>(&text) {
                        Ok(ws_msg) => {
                            handle_client_message(ws_msg, connection, &state_clone).await
                        }
                        Err(e) => {
                            warn!("Failed to parse WebSocket message: {}", e);
                            Some(WsMessage::Error {
                                message: format!("invalid message: {}", e),
                            })
                        }
                    };
                    if let Some(reply) = reply {
                        if reply_tx.send(reply).await.is_err() {
                            break;
                        }
                    }
                }
                Message::Close(_) => {
                    debug!("WebSocket client disconnected");
                    break;
                }
                _ => {}
            }
        }
    });

    // Broadcasts and direct replies to the client
    let mut send_task = tokio::spawn(async move {
        loop {
            let outgoing = tokio::select! {
                broadcast_msg = rx.recv() => match broadcast_msg {
                    Ok(msg) => msg,
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        warn!("WebSocket client lagged behind by {} messages", skipped);
                        continue;
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                },
                reply = reply_rx.recv() => match reply {
                    Some(reply) => match serde_json::to_string(&reply) {
                        Ok(json) => json,
                        Err(e) => {
                            warn!("Failed to serialize reply: {}", e);
                            continue;
                        }
                    },
                    None => break,
                },
            };
            if sender.send(Message::Text(outgoing)).await.is_err() {
                debug!("Failed to send message to WebSocket client");
                break;
            }
        }
    });

    tokio::select! {
        _ = (&mut send_task) => {
            recv_task.abort();
        }
        _ = (&mut recv_task) => {
            send_task.abort();
        }
    }

    state.release_editor(connection).await;
    info!("WebSocket connection {} closed", connection);
}

fn read_only_error() -> WsMessage {
    WsMessage::Error {
        message: "another connection is editing this session; this one is read-only".to_string(),
    }
}

/// Handle one client message; the return value goes back to that client only.
///
/// Edits from a connection that cannot claim the editor role are refused.
async fn handle_client_message(
    msg: WsMessage,
    connection: ConnectionId,
    state: &ServerState,
) -> Option<WsMessage> {
    match msg {
        WsMessage::Event { event } => {
            if !state.claim_editor(connection).await {
                debug!("Refused event from read-only connection {}", connection);
                return Some(read_only_error());
            }
            // The resulting diff reaches this client through the broadcast.
            state.apply_event(event).await;
            None
        }
        WsMessage::RequestFullDiagram => {
            debug!("Client requested full diagram");
            Some(state.full_diagram().await)
        }
        WsMessage::Import { document } => {
            if !state.claim_editor(connection).await {
                debug!("Refused import from read-only connection {}", connection);
                return Some(read_only_error());
            }
            match state.import_document(&document).await {
                Ok(_) => None,
                Err(e) => Some(WsMessage::Error {
                    message: e.to_string(),
                }),
            }
        }
        WsMessage::Ping => Some(WsMessage::Pong),
        other => {
            debug!("Ignoring server-side message from client: {:?}", other);
            None
        }
    }
}
