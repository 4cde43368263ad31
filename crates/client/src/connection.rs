// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Connection controller (§4.G): discovery, transport lifecycle, and
//! close-code handling. Grounded in
//! `coop_mux::upstream::bridge::run_loop`'s connect/reconnect shape, but
//! a fixed 500 ms reconnect timer replaces that function's exponential
//! backoff — the facade arms
//! [`crate::timer::TimerService`]'s `"reconnect"` timer on
//! [`ConnectionEvent::BackoffStarted`] and calls `verify_token()` when it
//! fires (§4.G.5), rather than this module owning its own retry loop.

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::error::InteractiveError;
use crate::transport::http::HttpClient;
use crate::transport::ws::{TransportEvent, WsTransport};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Idle,
    Discovering,
    Authenticating,
    Connecting,
    Open,
    Closing,
    Backoff,
}

/// Outcome handed back to the facade from [`ConnectionController::do_work`].
#[derive(Debug)]
pub enum ConnectionEvent {
    Opened,
    Message(String),
    /// Non-fatal transport error; the connection remains whatever state
    /// it was already in.
    TransportError(InteractiveError),
    /// Closed with a fatal code (§4.G.5): `4019`/`4020`/`4021`. No
    /// reconnect should be attempted.
    FatalClose(InteractiveError),
    /// Closed with any other code; the caller should arm the `reconnect`
    /// timer and call `verify_token()` when it fires.
    BackoffStarted,
}

pub struct ConnectionController {
    state: ConnectionState,
    http: HttpClient,
    api_base: String,
    discovered_url: Option<String>,
    transport: Option<WsTransport>,
    transport_rx: Option<mpsc::UnboundedReceiver<TransportEvent>>,
    pending_connect: bool,
    connected: bool,
    /// Cancelled on [`Self::close`] so the transport's background task
    /// tears down promptly on dispose rather than waiting for a close
    /// frame the remote may never send back (§5).
    shutdown: CancellationToken,
}

impl ConnectionController {
    pub fn new(http: HttpClient, api_base: impl Into<String>) -> Self {
        Self {
            state: ConnectionState::Idle,
            http,
            api_base: api_base.into(),
            discovered_url: None,
            transport: None,
            transport_rx: None,
            pending_connect: false,
            connected: false,
            shutdown: CancellationToken::new(),
        }
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }

    pub fn discovered_url(&self) -> Option<&str> {
        self.discovered_url.as_deref()
    }

    /// Step 1: Discovery (§4.G.1). A failure logs and returns the error
    /// but does not clear a previously cached URL — a later reconnect may
    /// still succeed against it.
    pub async fn discover(&mut self) -> Option<InteractiveError> {
        self.state = ConnectionState::Discovering;
        let url = format!("{}/interactive/hosts", self.api_base);
        match self.http.get(0, &url, &[]).await {
            Ok(resp) if resp.is_success() => match resp.json::<Vec<serde_json::Value>>() {
                Ok(hosts) => {
                    let address =
                        hosts.first().and_then(|h| h.get("address")).and_then(|v| v.as_str());
                    match address {
                        Some(address) => {
                            self.discovered_url = Some(address.to_owned());
                            None
                        }
                        None => {
                            tracing::warn!("discovery returned no host address");
                            Some(InteractiveError::discovery("no interactive hosts available"))
                        }
                    }
                }
                Err(e) => {
                    tracing::warn!(err = %e, "discovery response malformed");
                    Some(InteractiveError::discovery(e.to_string()))
                }
            },
            Ok(resp) => {
                tracing::warn!(status = resp.status, "discovery request failed");
                Some(InteractiveError::discovery(format!("discovery returned status {}", resp.status)))
            }
            Err(e) => {
                tracing::warn!(err = %e, "discovery request failed");
                Some(InteractiveError::discovery(e.to_string()))
            }
        }
    }

    /// Step 3/4: Connect with reentrancy guards (§4.G.3-4). No-op if a
    /// connect is already pending or already open.
    pub fn connect(
        &mut self,
        auth: &str,
        project_version_id: &str,
        share_code: Option<&str>,
    ) -> Result<(), InteractiveError> {
        if self.pending_connect || self.connected {
            return Ok(());
        }
        let url = self
            .discovered_url
            .clone()
            .ok_or_else(|| InteractiveError::discovery("no discovered host to connect to"))?;

        let mut headers = vec![
            ("Authorization".to_owned(), auth.to_owned()),
            ("X-Interactive-Version".to_owned(), project_version_id.to_owned()),
            ("X-Protocol-Version".to_owned(), "2.0".to_owned()),
        ];
        if let Some(code) = share_code {
            headers.push(("X-Interactive-Sharecode".to_owned(), code.to_owned()));
        }

        self.pending_connect = true;
        self.state = ConnectionState::Connecting;
        let (transport, rx) = WsTransport::open(url, headers, self.shutdown.child_token());
        self.transport = Some(transport);
        self.transport_rx = Some(rx);
        Ok(())
    }

    /// Send a text frame on the current connection. No-op if not open.
    pub fn send(&self, text: String) {
        if let Some(transport) = &self.transport {
            transport.send(text);
        }
    }

    /// Close the current connection, if any, with a descriptive reason
    /// (§5: `Dispose()` closes the socket rather than abandoning it).
    pub fn close(&mut self, code: u16, reason: String) {
        if let Some(transport) = self.transport.take() {
            transport.close(code, reason);
        }
        // Tear the background task down even if the remote never answers
        // the close frame, then replace the token so a later reconnect
        // (e.g. after StartInteractive -> StopInteractive -> reconnect)
        // isn't born pre-cancelled.
        self.shutdown.cancel();
        self.shutdown = CancellationToken::new();
        self.transport_rx = None;
        self.connected = false;
        self.pending_connect = false;
        self.state = ConnectionState::Closing;
    }

    /// Step 6: drain pending transport events (§4.G.6). Must be polled
    /// regularly by the facade's tick.
    pub fn do_work(&mut self) -> Vec<ConnectionEvent> {
        let mut out = Vec::new();
        let Some(rx) = self.transport_rx.as_mut() else {
            return out;
        };

        while let Ok(event) = rx.try_recv() {
            match event {
                TransportEvent::Open => {
                    self.pending_connect = false;
                    self.connected = true;
                    self.state = ConnectionState::Open;
                    out.push(ConnectionEvent::Opened);
                }
                TransportEvent::Message(text) => out.push(ConnectionEvent::Message(text)),
                TransportEvent::Error(message) => {
                    tracing::warn!(err = %message, "transport error");
                    out.push(ConnectionEvent::TransportError(InteractiveError::transport_broken(message)));
                }
                TransportEvent::Close { code, reason } => {
                    self.pending_connect = false;
                    self.connected = false;
                    self.transport = None;
                    self.transport_rx = None;
                    out.push(self.handle_close(code, reason));
                    break;
                }
            }
        }
        out
    }

    fn handle_close(&mut self, code: u16, reason: String) -> ConnectionEvent {
        match code {
            4019 => {
                self.state = ConnectionState::Idle;
                ConnectionEvent::FatalClose(InteractiveError::project_inaccessible(code, reason))
            }
            4020 => {
                self.state = ConnectionState::Idle;
                ConnectionEvent::FatalClose(InteractiveError::project_inaccessible(
                    code,
                    format!("interactive version not found: {reason}"),
                ))
            }
            4021 => {
                self.state = ConnectionState::Idle;
                ConnectionEvent::FatalClose(InteractiveError::duplicate_session(code, reason))
            }
            _ => {
                self.state = ConnectionState::Backoff;
                ConnectionEvent::BackoffStarted
            }
        }
    }
}

#[cfg(test)]
#[path = "connection_tests.rs"]
mod tests;
