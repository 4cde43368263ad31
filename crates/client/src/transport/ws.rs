// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! TLS WebSocket transport (§4.A). Text frames only; binary frames are
//! dropped silently. Grounded on the upstream connection half of
//! `coop_mux::upstream::bridge::run_loop` — here split into a reusable
//! `open`/`send`/`close` capability with no built-in reconnect (the
//! connection controller, §4.G, owns backoff/retry policy).

use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message as WsMessage;
use tokio_util::sync::CancellationToken;

/// Events emitted by a live transport connection.
#[derive(Debug, Clone)]
pub enum TransportEvent {
    Open,
    Message(String),
    Error(String),
    Close { code: u16, reason: String },
}

/// Handle to a live (or attempted) transport connection.
///
/// `send` silently drops the frame if the write half has already gone
/// away — callers that need to know a send was dropped should track
/// `connected` state themselves, per §4.A's contract that the caller
/// (not the transport) decides whether to buffer or drop.
pub struct WsTransport {
    write_tx: mpsc::UnboundedSender<WsMessage>,
}

impl WsTransport {
    /// Open a WebSocket connection with the given handshake headers.
    /// Returns immediately; connection outcome and all subsequent frames
    /// arrive as [`TransportEvent`]s on the returned receiver. `cancel`
    /// lets the owner (the connection controller) tear the background
    /// task down promptly on dispose rather than waiting on a close frame
    /// the remote may never send back.
    pub fn open(
        url: String,
        headers: Vec<(String, String)>,
        cancel: CancellationToken,
    ) -> (Self, mpsc::UnboundedReceiver<TransportEvent>) {
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let (write_tx, write_rx) = mpsc::unbounded_channel();

        tokio::spawn(run(url, headers, event_tx, write_rx, cancel));

        (Self { write_tx }, event_rx)
    }

    /// Send a text frame. No-op if the transport is not open.
    pub fn send(&self, text: String) {
        if self.write_tx.send(WsMessage::Text(text.into())).is_err() {
            tracing::debug!("ws send dropped: transport not open");
        }
    }

    /// Close the connection with a status code and reason.
    pub fn close(&self, code: u16, reason: String) {
        let frame = tokio_tungstenite::tungstenite::protocol::CloseFrame {
            code: tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode::from(code),
            reason: reason.into(),
        };
        let _ = self.write_tx.send(WsMessage::Close(Some(frame)));
    }
}

async fn run(
    url: String,
    headers: Vec<(String, String)>,
    event_tx: mpsc::UnboundedSender<TransportEvent>,
    mut write_rx: mpsc::UnboundedReceiver<WsMessage>,
    cancel: CancellationToken,
) {
    let request = match build_request(&url, &headers) {
        Ok(req) => req,
        Err(e) => {
            let _ = event_tx.send(TransportEvent::Error(e.to_string()));
            return;
        }
    };

    let stream = match tokio_tungstenite::connect_async(request).await {
        Ok((stream, _response)) => stream,
        Err(e) => {
            let _ = event_tx.send(TransportEvent::Error(e.to_string()));
            return;
        }
    };

    let _ = event_tx.send(TransportEvent::Open);
    let (mut write, mut read) = stream.split();

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                let _ = write.send(WsMessage::Close(None)).await;
                break;
            }
            outgoing = write_rx.recv() => {
                match outgoing {
                    Some(msg @ WsMessage::Close(_)) => {
                        let _ = write.send(msg).await;
                        break;
                    }
                    Some(msg) => {
                        if write.send(msg).await.is_err() {
                            break;
                        }
                    }
                    None => break,
                }
            }
            incoming = read.next() => {
                match incoming {
                    Some(Ok(WsMessage::Text(text))) => {
                        let _ = event_tx.send(TransportEvent::Message(text.to_string()));
                    }
                    Some(Ok(WsMessage::Close(frame))) => {
                        let (code, reason) = frame
                            .map(|f| (u16::from(f.code), f.reason.to_string()))
                            .unwrap_or((1005, String::new()));
                        let _ = event_tx.send(TransportEvent::Close { code, reason });
                        return;
                    }
                    Some(Ok(_binary_or_ping_or_pong)) => {
                        // Binary frames are discarded silently per §4.A.
                    }
                    Some(Err(e)) => {
                        let _ = event_tx.send(TransportEvent::Error(e.to_string()));
                    }
                    None => {
                        let _ = event_tx.send(TransportEvent::Close { code: 1006, reason: String::new() });
                        return;
                    }
                }
            }
        }
    }
}

fn build_request(
    url: &str,
    headers: &[(String, String)],
) -> anyhow::Result<tokio_tungstenite::tungstenite::handshake::client::Request> {
    use tokio_tungstenite::tungstenite::client::IntoClientRequest;

    let mut request = url.into_client_request()?;
    let header_map = request.headers_mut();
    for (key, value) in headers {
        header_map.insert(http::HeaderName::from_bytes(key.as_bytes())?, http::HeaderValue::from_str(value)?);
    }
    Ok(request)
}

#[cfg(test)]
#[path = "ws_tests.rs"]
mod tests;
