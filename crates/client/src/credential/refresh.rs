// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Token exchange and refresh (§4.F.3,5), adapted from
//! `coop_mux::credential::refresh`.

use crate::credential::oauth::TokenResponse;
use crate::transport::http::HttpClient;

/// `POST /oauth/token` with `grant_type:"authorization_code"` (§4.F.3).
pub async fn exchange_code(
    http: &HttpClient,
    api_base: &str,
    client_id: &str,
    code: &str,
) -> anyhow::Result<TokenResponse> {
    let body = serde_json::json!({
        "client_id": client_id,
        "code": code,
        "grant_type": "authorization_code",
    });
    post_token(http, api_base, body).await
}

/// `POST /oauth/token` with `grant_type:"refresh_token"` (§4.F.5). A
/// single attempt: on failure the auth controller falls back to the
/// short-code flow rather than retrying here (§4.F.5).
pub async fn refresh_token(
    http: &HttpClient,
    api_base: &str,
    client_id: &str,
    refresh_token: &str,
) -> anyhow::Result<TokenResponse> {
    let body = serde_json::json!({
        "client_id": client_id,
        "refresh_token": refresh_token,
        "grant_type": "refresh_token",
    });
    post_token(http, api_base, body).await
}

async fn post_token(
    http: &HttpClient,
    api_base: &str,
    body: serde_json::Value,
) -> anyhow::Result<TokenResponse> {
    let resp = http.post_json(0, &format!("{api_base}/oauth/token"), &[], body).await?;
    if !resp.is_success() {
        anyhow::bail!("token request failed ({}): {}", resp.status, resp.body);
    }
    Ok(resp.json()?)
}
