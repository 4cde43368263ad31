// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! OAuth wire types (§6), adapted from `coop_mux::credential::oauth`.

use serde::{Deserialize, Serialize};

/// Response from `POST /oauth/shortcode`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShortCodeResponse {
    pub code: String,
    #[serde(default)]
    pub expires_in: u64,
    pub handle: String,
}

/// Response from `GET /oauth/shortcode/check/<handle>` on `200`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShortCodeCheckResponse {
    pub code: String,
}

/// Standard OAuth2 token response, returned by `POST /oauth/token`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub expires_in: u64,
}
