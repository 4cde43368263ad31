// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use axum::routing::{get, post};
use axum::{Json, Router};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::net::TcpListener;

async fn spawn_fixture(router: Router) -> anyhow::Result<String> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr: SocketAddr = listener.local_addr()?;
    tokio::spawn(async move {
        let _ = axum::serve(listener, router).await;
    });
    Ok(format!("http://{addr}"))
}

#[tokio::test]
async fn bootstrap_uses_stored_tokens_when_present() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let store = TokenStore::new(dir.path().join("tokens.json"));
    store.save("app", "v1", "Bearer cached", "refresh-cached");

    let http = HttpClient::new();
    let config = CredentialConfig {
        app_id: "app".into(),
        project_version_id: "v1".into(),
        client_id: "client".into(),
        api_base: "http://unused.invalid".into(),
    };
    let mut controller = AuthController::new(http, store, config);
    let (tx, _rx) = tokio::sync::mpsc::unbounded_channel();
    let mut timers = TimerService::new(tx);

    controller.bootstrap(&mut timers).await;
    assert_eq!(*controller.state(), AuthState::Verifying);
    assert_eq!(controller.auth_header(), Some("Bearer cached"));
    Ok(())
}

#[tokio::test]
async fn bootstrap_requests_short_code_when_store_empty() -> anyhow::Result<()> {
    let calls = Arc::new(AtomicUsize::new(0));
    let calls_clone = calls.clone();
    let router = Router::new().route(
        "/oauth/shortcode",
        post(move || {
            let calls = calls_clone.clone();
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Json(serde_json::json!({"code": "ABCD", "expires_in": 900, "handle": "h1"}))
            }
        }),
    );
    let base = spawn_fixture(router).await?;

    let dir = tempfile::tempdir()?;
    let store = TokenStore::new(dir.path().join("tokens.json"));
    let http = HttpClient::new();
    let config = CredentialConfig {
        app_id: "app".into(),
        project_version_id: "v1".into(),
        client_id: "client".into(),
        api_base: base,
    };
    let mut controller = AuthController::new(http, store, config);
    let (tx, _rx) = tokio::sync::mpsc::unbounded_channel();
    let mut timers = TimerService::new(tx);

    controller.bootstrap(&mut timers).await;
    assert_eq!(*controller.state(), AuthState::ShortCodeOutstanding);
    assert_eq!(controller.short_code(), Some("ABCD"));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert!(timers.is_running(timer::CHECK_AUTH_STATUS));
    assert!(timers.is_running(timer::REFRESH_SHORT_CODE));
    Ok(())
}

#[tokio::test]
async fn verify_token_success_reaches_have_tokens() -> anyhow::Result<()> {
    // The fixture listens over plain HTTP, so the probe URL is passed
    // through as-is (not prefixed `wss://`) rather than exercising the
    // scheme substitution, which needs TLS to round-trip for real.
    let router = Router::new().route("/", get(|| async { axum::http::StatusCode::OK }));
    let base = spawn_fixture(router).await?;

    let dir = tempfile::tempdir()?;
    let store = TokenStore::new(dir.path().join("tokens.json"));
    store.save("app", "v1", "Bearer tok", "refresh-tok");
    let http = HttpClient::new();
    let config = CredentialConfig {
        app_id: "app".into(),
        project_version_id: "v1".into(),
        client_id: "client".into(),
        api_base: "http://unused.invalid".into(),
    };
    let mut controller = AuthController::new(http, store, config);
    let (tx, _rx) = tokio::sync::mpsc::unbounded_channel();
    let mut timers = TimerService::new(tx);
    controller.bootstrap(&mut timers).await;

    let outcome = controller.verify_token(&base, &mut timers).await;
    assert!(matches!(outcome, AuthOutcome::Ready));
    assert_eq!(*controller.state(), AuthState::HaveTokens);
    Ok(())
}
