// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Wire envelopes (§4.E). `ClientFrame`'s `Serialize` impl hand-writes the
//! `"type":"method"` / `"method":"<name>"` key pair verbatim — the wire
//! anomaly where the method name rides under the literal key `method`,
//! matching the tag value, rather than under `name` (§9). The server
//! frame reader is tolerant: unknown keys and unsupported methods never
//! fail deserialization, mirroring
//! `coop_mux::upstream::bridge::RouteInfo`'s use of `#[serde(default)]`
//! borrowed fields for cheap, forward-compatible peeking.

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

/// An outgoing client-to-server RPC frame.
#[derive(Debug, Clone)]
pub struct ClientFrame {
    pub id: u32,
    pub method: String,
    pub params: serde_json::Value,
}

impl ClientFrame {
    pub fn new(id: u32, method: impl Into<String>, params: serde_json::Value) -> Self {
        Self { id, method: method.into(), params }
    }

    pub fn to_json(&self) -> anyhow::Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

impl Serialize for ClientFrame {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(4))?;
        map.serialize_entry("type", "method")?;
        map.serialize_entry("id", &self.id)?;
        map.serialize_entry("method", &self.method)?;
        map.serialize_entry("params", &self.params)?;
        map.end()
    }
}

/// A server reply's error object (§4.H): `{code, message, path?}`.
#[derive(Debug, Clone, Deserialize)]
pub struct ReplyError {
    pub code: i32,
    pub message: String,
    #[serde(default)]
    pub path: Option<String>,
}

/// Loosely-typed view over any incoming frame, tolerant of unknown or
/// missing keys in any order.
#[derive(Debug, Clone, Default, Deserialize)]
struct RawServerFrame {
    #[serde(rename = "type", default)]
    frame_type: String,
    #[serde(default)]
    id: Option<u32>,
    #[serde(default)]
    method: Option<String>,
    #[serde(default)]
    params: serde_json::Value,
    #[serde(default)]
    result: serde_json::Value,
    #[serde(default)]
    error: Option<ReplyError>,
}

/// A parsed incoming frame: a server push (`type:method`) or a correlated
/// reply (`type:reply`).
#[derive(Debug, Clone)]
pub enum ServerFrame {
    Push { method: String, params: serde_json::Value },
    Reply { id: u32, result: serde_json::Value, error: Option<ReplyError> },
    /// Recognized envelope shape but an unrecognized `type` value.
    Unknown,
}

/// Parse one text frame. Malformed JSON is the only rejected case; a
/// structurally-valid-but-unrecognized envelope yields
/// [`ServerFrame::Unknown`] rather than an error (§4.E forward-compat).
pub fn parse_server_frame(text: &str) -> anyhow::Result<ServerFrame> {
    let raw: RawServerFrame = serde_json::from_str(text)?;
    match raw.frame_type.as_str() {
        "method" => {
            let method = raw
                .method
                .ok_or_else(|| anyhow::anyhow!("method frame missing `method` field"))?;
            Ok(ServerFrame::Push { method, params: raw.params })
        }
        "reply" => {
            let id = raw.id.ok_or_else(|| anyhow::anyhow!("reply frame missing `id` field"))?;
            Ok(ServerFrame::Reply { id, result: raw.result, error: raw.error })
        }
        _ => Ok(ServerFrame::Unknown),
    }
}

#[cfg(test)]
#[path = "codec_tests.rs"]
mod tests;
