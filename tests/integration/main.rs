//! Integration tests for the mindmap editor
//!
//! These tests drive the CLI binary and a live server end to end.

use std::process::Command;

use futures_util::{SinkExt, StreamExt};
use mindmap_core::{EditorConfig, GraphStore, NodeId, load_diagram};
use mindmap_server::{MindmapServer, ServerConfig};
use serde_json::{Value, json};
use tempfile::TempDir;
use tokio::net::TcpListener;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async, tungstenite::Message};

type Socket = WebSocketStream<MaybeTlsStream<tokio::net::TcpStream>>;

fn mindmap() -> Command {
    Command::new(env!("CARGO_BIN_EXE_mindmap"))
}

/// Test that the CLI can be invoked
#[test]
fn test_cli_invocation() {
    let output = mindmap().arg("--help").output().expect("Failed to execute command");

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(output.status.success());
    assert!(stdout.contains("Interactive mind-map editor backend"));
}

/// `new` writes a seed document and refuses to clobber it
#[test]
fn test_new_then_inspect() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("mindmap.json");

    let status = mindmap().arg("new").arg("--output").arg(&path).status().unwrap();
    assert!(status.success());

    let diagram = load_diagram(&path).unwrap();
    assert_eq!(diagram.nodes.len(), 1);
    assert!(diagram.edges.is_empty());
    assert_eq!(diagram.nodes[0].id, NodeId::new("1"));

    let status = mindmap().arg("new").arg("--output").arg(&path).status().unwrap();
    assert!(!status.success());

    let output = mindmap().arg("inspect").arg(&path).output().unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("nodes:            1"));
    assert!(stdout.contains("edges:            0"));
}

/// `new` honors the editor config file
#[test]
fn test_new_with_config() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("mindmap.toml");
    std::fs::write(&config, "[root]\nid = \"center\"\nlabel = \"Center\"\n").unwrap();
    let path = dir.path().join("out.json");

    let status = mindmap()
        .arg("--config")
        .arg(&config)
        .arg("new")
        .arg("--output")
        .arg(&path)
        .status()
        .unwrap();
    assert!(status.success());

    let diagram = load_diagram(&path).unwrap();
    assert_eq!(diagram.nodes[0].id, NodeId::new("center"));
    assert_eq!(diagram.nodes[0].label(), "Center");
}

/// `inspect` fails on a malformed document
#[test]
fn test_inspect_rejects_malformed_document() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("broken.json");
    std::fs::write(&path, r#"{"nodes": "oops"}"#).unwrap();

    let output = mindmap().arg("inspect").arg(&path).output().unwrap();
    assert!(!output.status.success());
}

async fn start_server() -> std::net::SocketAddr {
    let mut config = EditorConfig::default();
    config.root.id = "root".to_string();
    let store = GraphStore::seeded(config, 17);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let server = MindmapServer::new(
        store,
        ServerConfig {
            host: addr.ip().to_string(),
            port: addr.port(),
        },
    );
    tokio::spawn(server.serve(listener));
    addr
}

async fn next_json(ws: &mut Socket) -> Value {
    loop {
        match ws.next().await {
            Some(Ok(Message::Text(text))) => return serde_json::from_str(&text).unwrap(),
            Some(Ok(_)) => continue,
            other => panic!("WebSocket closed unexpectedly: {:?}", other),
        }
    }
}

async fn send_json(ws: &mut Socket, value: Value) {
    ws.send(Message::Text(value.to_string())).await.unwrap();
}

/// Test the WebSocket protocol against a running server
#[tokio::test]
async fn test_websocket_protocol() {
    let addr = start_server().await;
    let (mut ws, _) = connect_async(format!("ws://{}/ws", addr)).await.unwrap();

    let full = next_json(&mut ws).await;
    assert_eq!(full["type"], "full_diagram");
    assert_eq!(full["diagram"]["nodes"][0]["id"], "root");

    send_json(&mut ws, json!({"type": "event", "event": {"type": "selected", "id": "root"}})).await;
    let diff = next_json(&mut ws).await;
    assert_eq!(diff["type"], "graph_diff");
    assert_eq!(diff["diff"]["selected"], "root");

    send_json(&mut ws, json!({"type": "event", "event": {"type": "add_child"}})).await;
    let diff = next_json(&mut ws).await;
    let added = &diff["diff"]["added_nodes"][0];
    assert_eq!(added["data"]["label"], "");
    assert_eq!(added["position"]["x"], 500.0);
    assert_eq!(diff["diff"]["added_edges"][0]["source"], "root");
    assert_eq!(diff["diff"]["added_edges"][0]["target"], added["id"]);

    send_json(&mut ws, json!({"type": "import", "document": "{not json"})).await;
    let error = next_json(&mut ws).await;
    assert_eq!(error["type"], "error");

    send_json(&mut ws, json!({"type": "ping"})).await;
    assert_eq!(next_json(&mut ws).await["type"], "pong");

    send_json(&mut ws, json!({"type": "request_full_diagram"})).await;
    let full = next_json(&mut ws).await;
    assert_eq!(full["diagram"]["nodes"].as_array().unwrap().len(), 2);
    assert_eq!(full["diagram"]["edges"].as_array().unwrap().len(), 1);
}

/// Only the first connection edits; later ones watch its diffs
#[tokio::test]
async fn test_second_connection_is_read_only() {
    let addr = start_server().await;
    let url = format!("ws://{}/ws", addr);
    let (mut editor, _) = connect_async(url.as_str()).await.unwrap();
    next_json(&mut editor).await;
    let (mut viewer, _) = connect_async(url.as_str()).await.unwrap();
    next_json(&mut viewer).await;

    send_json(
        &mut viewer,
        json!({"type": "event", "event": {"type": "label_committed", "id": "root", "text": "Hijack"}}),
    )
    .await;
    let refused = next_json(&mut viewer).await;
    assert_eq!(refused["type"], "error");

    send_json(
        &mut editor,
        json!({"type": "event", "event": {"type": "label_committed", "id": "root", "text": "Plan"}}),
    )
    .await;
    for ws in [&mut editor, &mut viewer] {
        let diff = next_json(ws).await;
        assert_eq!(diff["type"], "graph_diff");
        assert_eq!(diff["diff"]["modified_nodes"][0]["data"]["label"], "Plan");
    }

    // Once the editor leaves, the viewer's edits go through.
    editor.close(None).await.unwrap();
    drop(editor);
    let mut label = None;
    for _ in 0..50 {
        send_json(
            &mut viewer,
            json!({"type": "event", "event": {"type": "label_committed", "id": "root", "text": "Mine"}}),
        )
        .await;
        let reply = next_json(&mut viewer).await;
        if reply["type"] == "graph_diff" {
            label = Some(reply["diff"]["modified_nodes"][0]["data"]["label"].clone());
            break;
        }
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
    }
    assert_eq!(label, Some(json!("Mine")));
}
