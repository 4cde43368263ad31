// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Typed error surface handed to the host via [`crate::events::InteractiveEvent::Error`].
//!
//! Internal plumbing (HTTP calls, OAuth exchanges, WS connects) uses
//! `anyhow::Result` throughout; values are narrowed to [`InteractiveError`]
//! only at the point they become host-visible.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Broad category of a surfaced error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorKind {
    DiscoveryFailure,
    AuthFailure,
    TokenInvalid,
    ProtocolError,
    ProjectInaccessible,
    DuplicateSession,
    TransportBroken,
    ReplyError,
    MisuseError,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DiscoveryFailure => "DISCOVERY_FAILURE",
            Self::AuthFailure => "AUTH_FAILURE",
            Self::TokenInvalid => "TOKEN_INVALID",
            Self::ProtocolError => "PROTOCOL_ERROR",
            Self::ProjectInaccessible => "PROJECT_INACCESSIBLE",
            Self::DuplicateSession => "DUPLICATE_SESSION",
            Self::TransportBroken => "TRANSPORT_BROKEN",
            Self::ReplyError => "REPLY_ERROR",
            Self::MisuseError => "MISUSE_ERROR",
        }
    }
}

/// Default numeric error code per §7, used whenever no more specific code
/// (a close code, or a server-supplied reply code) applies.
pub const DEFAULT_ERROR_CODE: i32 = 83;

/// A single error event surfaced to the host.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InteractiveError {
    pub kind: ErrorKind,
    pub code: i32,
    pub message: String,
}

impl InteractiveError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self { kind, code: DEFAULT_ERROR_CODE, message: message.into() }
    }

    pub fn with_code(kind: ErrorKind, code: i32, message: impl Into<String>) -> Self {
        Self { kind, code, message: message.into() }
    }

    pub fn discovery(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::DiscoveryFailure, message)
    }

    pub fn auth(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::AuthFailure, message)
    }

    pub fn token_invalid(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::TokenInvalid, message)
    }

    pub fn protocol(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ProtocolError, message)
    }

    pub fn project_inaccessible(close_code: u16, message: impl Into<String>) -> Self {
        Self::with_code(ErrorKind::ProjectInaccessible, close_code as i32, message)
    }

    pub fn duplicate_session(close_code: u16, message: impl Into<String>) -> Self {
        Self::with_code(ErrorKind::DuplicateSession, close_code as i32, message)
    }

    pub fn transport_broken(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::TransportBroken, message)
    }

    pub fn reply(code: i32, message: impl Into<String>) -> Self {
        Self::with_code(ErrorKind::ReplyError, code, message)
    }

    pub fn misuse(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::MisuseError, message)
    }
}

impl fmt::Display for InteractiveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}): {}", self.kind.as_str(), self.code, self.message)
    }
}

impl std::error::Error for InteractiveError {}
