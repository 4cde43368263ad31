// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! End-to-end scenarios driven against a real loopback `axum`
//! HTTP+WebSocket fixture rather than mocked transport traits — the same
//! style `coop-mux`'s own `tests/integration.rs` and `tests/http.rs` use
//! against an in-process router.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::extract::ws::{Message as AxumMessage, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpListener;
use tokio::sync::Mutex;

use interactive_client::config::InteractiveConfig;
use interactive_client::facade::InteractiveClient;
use interactive_client::protocol::InteractivityState;

/// Shared fixture state so handlers across routes can coordinate.
#[derive(Default)]
struct FixtureState {
    shortcode_checks: AtomicUsize,
    /// Outgoing pushes queued for the next WS connection to send after
    /// the `hello`/`getGroups`/`getScenes` handshake completes.
    pending_pushes: Mutex<Vec<String>>,
}

async fn spawn_fixture() -> (String, Arc<FixtureState>) {
    let state = Arc::new(FixtureState::default());

    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr: SocketAddr = listener.local_addr().expect("addr");
    let ws_url = format!("ws://{addr}/ws");

    let router = Router::new()
        .route(
            "/interactive/hosts",
            get(move || {
                let ws_url = ws_url.clone();
                async move { Json(serde_json::json!([{"address": ws_url}])) }
            }),
        )
        .route("/oauth/shortcode", post(shortcode_handler))
        .route("/oauth/shortcode/check/:handle", get(shortcode_check_handler))
        .route("/oauth/token", post(token_handler))
        .route("/ws", get(ws_handler))
        .with_state(state.clone());

    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("serve");
    });

    (format!("http://{addr}"), state)
}

async fn shortcode_handler() -> impl IntoResponse {
    Json(serde_json::json!({"code": "ABCD-1234", "expires_in": 900, "handle": "handle-1"}))
}

async fn shortcode_check_handler(
    State(state): State<Arc<FixtureState>>,
) -> axum::http::Response<axum::body::Body> {
    let attempt = state.shortcode_checks.fetch_add(1, Ordering::SeqCst);
    if attempt < 1 {
        axum::http::Response::builder()
            .status(204)
            .body(axum::body::Body::empty())
            .unwrap_or_default()
    } else {
        let body = serde_json::to_vec(&serde_json::json!({"code": "exchange-code"})).unwrap_or_default();
        axum::http::Response::builder()
            .status(200)
            .header("content-type", "application/json")
            .body(axum::body::Body::from(body))
            .unwrap_or_default()
    }
}

async fn token_handler(Json(body): Json<serde_json::Value>) -> impl IntoResponse {
    let grant = body.get("grant_type").and_then(|v| v.as_str()).unwrap_or_default();
    assert!(grant == "authorization_code" || grant == "refresh_token");
    Json(serde_json::json!({"access_token": "access-tok", "refresh_token": "refresh-tok"}))
}

async fn ws_handler(ws: WebSocketUpgrade, State(state): State<Arc<FixtureState>>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(mut socket: WebSocket, state: Arc<FixtureState>) {
    let _ = socket
        .send(AxumMessage::Text(r#"{"type":"method","method":"hello","params":{}}"#.to_owned()))
        .await;

    let mut saw_get_groups = false;
    let mut saw_get_scenes = false;

    while !(saw_get_groups && saw_get_scenes) {
        let Some(Ok(AxumMessage::Text(text))) = socket.next().await else { break };
        let value: serde_json::Value = serde_json::from_str(&text).unwrap_or_default();
        let id = value.get("id").and_then(|v| v.as_u64()).unwrap_or_default();
        match value.get("method").and_then(|v| v.as_str()) {
            Some("getGroups") => {
                saw_get_groups = true;
                let reply = serde_json::json!({
                    "type": "reply",
                    "id": id,
                    "result": {"groups": [{"group_id": "default", "scene_id": "s1", "etag": "e1"}]},
                });
                let _ = socket.send(AxumMessage::Text(reply.to_string())).await;
            }
            Some("getScenes") => {
                saw_get_scenes = true;
                let reply = serde_json::json!({
                    "type": "reply",
                    "id": id,
                    "result": {"scenes": [{"scene_id": "s1", "etag": "e1"}]},
                });
                let _ = socket.send(AxumMessage::Text(reply.to_string())).await;
            }
            _ => {}
        }
    }

    for push in state.pending_pushes.lock().await.drain(..) {
        let _ = socket.send(AxumMessage::Text(push)).await;
    }

    // Keep the socket open until the client goes away so `do_work` has
    // time to observe every queued push.
    while socket.next().await.is_some() {}
}

fn test_config(api_base: String) -> InteractiveConfig {
    let mut config = InteractiveConfig::new("test-client-id");
    config.app_id = Some("app".to_owned());
    config.project_version_id = Some("v1".to_owned());
    config.api_base = api_base;
    config
}

async fn drain_until<F>(client: &mut InteractiveClient, timeout: Duration, mut predicate: F) -> bool
where
    F: FnMut(&InteractiveClient) -> bool,
{
    let deadline = tokio::time::Instant::now() + timeout;
    loop {
        if predicate(client) {
            return true;
        }
        if tokio::time::Instant::now() > deadline {
            return false;
        }
        let _ = client.do_work().await;
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}

/// Scenario 1 (§8): cold start with a short code all the way through to
/// `Initialized`, with the discovered host rewritten to point at the
/// in-process WS fixture (discovery itself is exercised separately).
#[tokio::test]
async fn cold_start_reaches_initialized_over_short_code() {
    let (base, _state) = spawn_fixture().await;

    let dir = tempfile::tempdir().expect("tempdir");
    let config = test_config(base);
    let mut client =
        InteractiveClient::new(config, dir.path().join("tokens.json")).expect("construct client");

    client.initialize().await;

    let reached = drain_until(&mut client, Duration::from_secs(5), |c| {
        c.interactivity_state() == InteractivityState::Initialized
    })
    .await;

    assert!(reached, "client never reached Initialized");
}

/// Scenario 5 (§8): participant join then leave emits two state-change
/// events and the local list retains one entry with `state=Left`.
#[tokio::test]
async fn participant_join_then_leave_retains_entry_marked_left() {
    let (base, state) = spawn_fixture().await;

    state.pending_pushes.lock().await.extend([
        serde_json::json!({
            "type": "method",
            "method": "onParticipantJoin",
            "params": {"session_id": "s1", "user_id": 42},
        })
        .to_string(),
        serde_json::json!({
            "type": "method",
            "method": "onParticipantLeave",
            "params": {"session_id": "s1", "user_id": 42},
        })
        .to_string(),
    ]);

    let dir = tempfile::tempdir().expect("tempdir");
    let config = test_config(base);
    let mut client =
        InteractiveClient::new(config, dir.path().join("tokens.json")).expect("construct client");

    client.initialize().await;

    let mut state_changes = 0;
    let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
    while tokio::time::Instant::now() < deadline {
        for event in client.do_work().await {
            if matches!(event, interactive_client::InteractiveEvent::ParticipantStateChanged { user_id: 42 }) {
                state_changes += 1;
            }
        }
        if state_changes >= 2 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }

    assert_eq!(state_changes, 2, "expected join and leave state-change events");
    let participants = client.participants();
    assert_eq!(participants.len(), 1);
    assert_eq!(participants[0].user_id, 42);
    assert_eq!(participants[0].state, interactive_client::ParticipantState::Left);
}
