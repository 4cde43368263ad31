// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! One-shot HTTP client (§4.B). Non-2xx statuses do not raise — callers
//! inspect `status` themselves, the same way
//! `coop_mux::upstream::client::UpstreamClient` leaves status handling to
//! its callers rather than baking policy into the transport.

use std::sync::Once;
use std::time::Duration;

use reqwest::Method;

static INSTALL_CRYPTO_PROVIDER: Once = Once::new();

/// `reqwest`'s `rustls-no-provider` feature leaves the process-level
/// `rustls::CryptoProvider` unset; without this the first TLS handshake
/// (from either `reqwest` or the `tokio-tungstenite` WS transport) would
/// panic.
fn ensure_crypto_provider() {
    INSTALL_CRYPTO_PROVIDER.call_once(|| {
        let _ = rustls::crypto::ring::default_provider().install_default();
    });
}

/// Response from a one-shot HTTP request.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn json<T: serde::de::DeserializeOwned>(&self) -> anyhow::Result<T> {
        Ok(serde_json::from_str(&self.body)?)
    }
}

/// Thin wrapper around a shared [`reqwest::Client`].
///
/// One instance is shared across discovery, OAuth, and verify calls —
/// matching the single shared `reqwest::Client` each
/// `coop_mux::credential::broker::CredentialBroker` keeps for the
/// lifetime of the process.
#[derive(Clone)]
pub struct HttpClient {
    client: reqwest::Client,
}

impl HttpClient {
    pub fn new() -> Self {
        ensure_crypto_provider();
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .unwrap_or_default();
        Self { client }
    }

    /// Issue a request, keyed by an opaque `request_id` chosen by the
    /// caller purely for log correlation (§4.B) — multiple in-flight
    /// requests from the auth/connection controllers can be told apart in
    /// traces without the transport itself needing to multiplex an event
    /// stream, since this implementation is already native async/await.
    pub async fn request(
        &self,
        request_id: u64,
        method: Method,
        url: &str,
        headers: &[(&str, &str)],
        body: Option<serde_json::Value>,
    ) -> anyhow::Result<HttpResponse> {
        let mut builder = self.client.request(method.clone(), url);
        for (key, value) in headers {
            builder = builder.header(*key, *value);
        }
        if let Some(ref json) = body {
            builder = builder.json(json);
        }

        tracing::debug!(request_id, %method, url, "http request");
        let resp = builder.send().await?;
        let status = resp.status().as_u16();
        let body = resp.text().await.unwrap_or_default();
        tracing::debug!(request_id, status, "http response");
        Ok(HttpResponse { status, body })
    }

    pub async fn get(
        &self,
        request_id: u64,
        url: &str,
        headers: &[(&str, &str)],
    ) -> anyhow::Result<HttpResponse> {
        self.request(request_id, Method::GET, url, headers, None).await
    }

    pub async fn post_json(
        &self,
        request_id: u64,
        url: &str,
        headers: &[(&str, &str)],
        body: serde_json::Value,
    ) -> anyhow::Result<HttpResponse> {
        self.request(request_id, Method::POST, url, headers, Some(body)).await
    }
}

impl Default for HttpClient {
    fn default() -> Self {
        Self::new()
    }
}
