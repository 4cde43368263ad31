// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Short-code OAuth flow (§4.F.1-2), adapted from
//! `coop_mux::credential::device_code`. Unlike the device-code poller
//! there, which owns its own sleep loop, polling here is a single
//! request driven by the shared `check_auth_status` timer tick — the
//! auth controller decides when to call [`check_short_code`], not this
//! module.

use crate::credential::oauth::{ShortCodeCheckResponse, ShortCodeResponse};
use crate::transport::http::HttpClient;

/// Outcome of a single `check_short_code` poll.
pub enum ShortCodePoll {
    /// `200` with an exchange code — the short code was redeemed.
    Redeemed(String),
    /// `204` or `404` — keep polling.
    Pending,
}

/// `POST /oauth/shortcode` — request a new short code (§4.F.1).
pub async fn request_short_code(
    http: &HttpClient,
    api_base: &str,
    client_id: &str,
) -> anyhow::Result<ShortCodeResponse> {
    let body = serde_json::json!({
        "client_id": client_id,
        "scope": "interactive:robot:self",
    });
    let resp = http.post_json(0, &format!("{api_base}/oauth/shortcode"), &[], body).await?;
    if !resp.is_success() {
        anyhow::bail!("short code request failed ({}): {}", resp.status, resp.body);
    }
    Ok(resp.json()?)
}

/// `GET /oauth/shortcode/check/<handle>` — poll once for redemption (§4.F.2).
pub async fn check_short_code(
    http: &HttpClient,
    api_base: &str,
    handle: &str,
) -> anyhow::Result<ShortCodePoll> {
    let resp = http.get(0, &format!("{api_base}/oauth/shortcode/check/{handle}"), &[]).await?;
    match resp.status {
        200 => {
            let parsed: ShortCodeCheckResponse = resp.json()?;
            Ok(ShortCodePoll::Redeemed(parsed.code))
        }
        204 | 404 => Ok(ShortCodePoll::Pending),
        other => anyhow::bail!("short code check failed ({other}): {}", resp.body),
    }
}
