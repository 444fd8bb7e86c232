//! HTTP + WebSocket server hosting one mind-map editing session

pub mod router;
pub mod handlers;
pub mod websocket;

use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use mindmap_core::{Diagram, DiagramError, EditorEvent, GraphDiff, GraphStore};
use tokio::net::TcpListener;
use tokio::sync::{Mutex, RwLock, broadcast};
use tracing::{debug, info, warn};

use crate::websocket::WsMessage;

/// Capacity of the broadcast channel feeding WebSocket clients.
const BROADCAST_CAPACITY: usize = 256;

/// Where the server listens.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 7890,
        }
    }
}

impl ServerConfig {
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Identifies one WebSocket connection for the lifetime of the server.
pub type ConnectionId = u64;

/// State shared by every handler: the session's store, the broadcast
/// channel for serialized `WsMessage`s, and the connection holding the
/// editor role.
///
/// The session has at most one editor. Other WebSocket connections are
/// read-only viewers of the editor's diffs until the editor disconnects.
pub struct ServerState {
    pub store: RwLock<GraphStore>,
    pub diff_tx: broadcast::Sender<String>,
    editor: Mutex<Option<ConnectionId>>,
    next_connection: AtomicU64,
}

impl ServerState {
    pub fn new(store: GraphStore) -> Self {
        let (diff_tx, _) = broadcast::channel(BROADCAST_CAPACITY);
        ServerState {
            store: RwLock::new(store),
            diff_tx,
            editor: Mutex::new(None),
            next_connection: AtomicU64::new(1),
        }
    }

    /// Allocate an id for a new WebSocket connection.
    pub fn next_connection_id(&self) -> ConnectionId {
        self.next_connection.fetch_add(1, Ordering::Relaxed)
    }

    /// Take the editor role for `connection` if it is free.
    ///
    /// Returns whether `connection` holds the role afterwards.
    pub async fn claim_editor(&self, connection: ConnectionId) -> bool {
        let mut editor = self.editor.lock().await;
        match *editor {
            Some(current) => current == connection,
            None => {
                *editor = Some(connection);
                info!("Connection {} is now the editor", connection);
                true
            }
        }
    }

    /// Give up the editor role if `connection` holds it.
    pub async fn release_editor(&self, connection: ConnectionId) {
        let mut editor = self.editor.lock().await;
        if *editor == Some(connection) {
            *editor = None;
            info!("Connection {} released the editor role", connection);
        }
    }

    /// Whether a WebSocket connection currently holds the editor role.
    pub async fn has_editor(&self) -> bool {
        self.editor.lock().await.is_some()
    }

    /// Send a raw message to every connected client.
    ///
    /// Returns the number of receivers; zero clients is not an error.
    pub fn broadcast(&self, msg: String) -> usize {
        self.diff_tx.send(msg).unwrap_or(0)
    }

    /// Serialize and broadcast a protocol message.
    pub fn broadcast_message(&self, msg: &WsMessage) {
        match serde_json::to_string(msg) {
            Ok(json) => {
                let receivers = self.broadcast(json);
                debug!("Broadcast to {} receivers", receivers);
            }
            Err(e) => warn!("Failed to serialize broadcast message: {}", e),
        }
    }

    /// Apply an event under the write lock and broadcast a non-empty diff.
    pub async fn apply_event(&self, event: EditorEvent) -> GraphDiff {
        let diff = self.store.write().await.apply(event);
        if !diff.is_empty() {
            self.broadcast_message(&WsMessage::GraphDiff { diff: diff.clone() });
        }
        diff
    }

    /// Replace the diagram from a document and broadcast the new state.
    ///
    /// On a parse error the store is untouched and nothing is broadcast.
    pub async fn import_document(&self, document: &str) -> Result<Diagram, DiagramError> {
        let (diagram, message) = {
            let mut store = self.store.write().await;
            if let Err(e) = store.import_diagram(document) {
                warn!("Import rejected: {}", e);
                return Err(e);
            }
            (store.export_diagram(), full_diagram_message(&store))
        };

        let summary = mindmap_core::summarize(&diagram);
        if !summary.is_consistent() {
            warn!(
                "Imported diagram has {} dangling edges, {} duplicate node ids, {} duplicate edge ids",
                summary.dangling_edges.len(),
                summary.duplicate_node_ids.len(),
                summary.duplicate_edge_ids.len()
            );
        }
        info!(
            "Imported diagram: {} nodes, {} edges",
            diagram.nodes.len(),
            diagram.edges.len()
        );
        self.broadcast_message(&message);
        Ok(diagram)
    }

    /// Snapshot of the session as a `full_diagram` message.
    pub async fn full_diagram(&self) -> WsMessage {
        let store = self.store.read().await;
        full_diagram_message(&store)
    }
}

fn full_diagram_message(store: &GraphStore) -> WsMessage {
    WsMessage::FullDiagram {
        diagram: store.export_diagram(),
        selected: store.selected().cloned(),
        sequence: store.sequence(),
    }
}

/// The editor server: one store, one router.
pub struct MindmapServer {
    state: Arc<ServerState>,
    config: ServerConfig,
}

impl MindmapServer {
    pub fn new(store: GraphStore, config: ServerConfig) -> Self {
        MindmapServer {
            state: Arc::new(ServerState::new(store)),
            config,
        }
    }

    pub fn state(&self) -> Arc<ServerState> {
        Arc::clone(&self.state)
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Bind to the configured address and serve until the process exits.
    pub async fn start(self) -> anyhow::Result<()> {
        let listener = TcpListener::bind(self.config.address()).await?;
        self.serve(listener).await
    }

    /// Serve on an already bound listener.
    pub async fn serve(self, listener: TcpListener) -> anyhow::Result<()> {
        let addr: SocketAddr = listener.local_addr()?;
        info!("Mindmap server listening on http://{}", addr);

        let app = router::create_router(self.state);
        axum::serve(listener, app).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mindmap_core::{EditorConfig, NodeId};

    fn state() -> ServerState {
        let mut config = EditorConfig::default();
        config.root.id = "root".to_string();
        ServerState::new(GraphStore::seeded(config, 0))
    }

    #[tokio::test]
    async fn test_broadcast_without_clients() {
        let state = state();
        assert_eq!(state.broadcast("test message".to_string()), 0);
    }

    #[tokio::test]
    async fn test_broadcast_counts_receivers() {
        let state = state();
        let _first = state.diff_tx.subscribe();
        let _second = state.diff_tx.subscribe();
        assert_eq!(state.broadcast("hello".to_string()), 2);
    }

    #[tokio::test]
    async fn test_single_editor_role() {
        let state = state();
        let first = state.next_connection_id();
        let second = state.next_connection_id();
        assert_ne!(first, second);
        assert!(!state.has_editor().await);

        assert!(state.claim_editor(first).await);
        assert!(state.claim_editor(first).await);
        assert!(!state.claim_editor(second).await);
        assert!(state.has_editor().await);

        // Only the holder can release the role.
        state.release_editor(second).await;
        assert!(!state.claim_editor(second).await);

        state.release_editor(first).await;
        assert!(!state.has_editor().await);
        assert!(state.claim_editor(second).await);
    }

    #[tokio::test]
    async fn test_apply_event_broadcasts_diff() {
        let state = state();
        let mut rx = state.diff_tx.subscribe();

        let diff = state
            .apply_event(EditorEvent::Selected { id: NodeId::new("root") })
            .await;
        assert!(diff.selection_changed);

        let msg: WsMessage = serde_json::from_str(&rx.recv().await.unwrap()).unwrap();
        match msg {
            WsMessage::GraphDiff { diff } => assert_eq!(diff.selected, Some(NodeId::new("root"))),
            other => panic!("unexpected message: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_ignored_event_is_not_broadcast() {
        let state = state();
        let mut rx = state.diff_tx.subscribe();

        let diff = state.apply_event(EditorEvent::AddChild).await;
        assert!(diff.is_empty());
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_failed_import_keeps_store() {
        let state = state();
        let err = state.import_document("{not json").await.unwrap_err();
        assert!(err.is_parse());
        assert_eq!(state.store.read().await.node_count(), 1);
    }

    #[tokio::test]
    async fn test_import_broadcasts_full_diagram() {
        let state = state();
        let mut rx = state.diff_tx.subscribe();

        let diagram = state
            .import_document(r#"{"nodes": [], "edges": []}"#)
            .await
            .unwrap();
        assert!(diagram.is_empty());

        let msg: WsMessage = serde_json::from_str(&rx.recv().await.unwrap()).unwrap();
        assert!(matches!(msg, WsMessage::FullDiagram { .. }));
    }
}
