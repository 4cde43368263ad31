// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Participant entity (§3, §4.I). Keyed by `user_id` in the mirror;
//! leave events set `state = Left` but never remove the entry (§9).

use std::time::Instant;

use serde::Deserialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParticipantState {
    Joined,
    Left,
    InputDisabled,
}

#[derive(Debug, Clone)]
pub struct Participant {
    pub session_id: String,
    pub user_id: u32,
    pub username: String,
    pub level: u32,
    pub group_id: String,
    pub connected_at: Instant,
    pub last_input_at: Instant,
    pub input_disabled: bool,
    pub state: ParticipantState,
    pub etag: String,
}

impl Participant {
    pub fn from_wire(wire: WireParticipant) -> Self {
        let now = Instant::now();
        Self {
            session_id: wire.session_id,
            user_id: wire.user_id,
            username: wire.username,
            level: wire.level,
            group_id: if wire.group_id.is_empty() {
                crate::model::group::DEFAULT_GROUP_ID.to_owned()
            } else {
                wire.group_id
            },
            connected_at: now,
            last_input_at: now,
            input_disabled: wire.input_disabled,
            state: ParticipantState::Joined,
            etag: wire.etag,
        }
    }

    /// Copy server-supplied fields over an existing entry in place (§4.I),
    /// preserving `connected_at` and `state` which are locally owned.
    pub fn apply_update(&mut self, wire: WireParticipant) {
        self.session_id = wire.session_id;
        self.username = wire.username;
        self.level = wire.level;
        if !wire.group_id.is_empty() {
            self.group_id = wire.group_id;
        }
        self.input_disabled = wire.input_disabled;
        self.etag = wire.etag;
    }
}

/// Wire shape of a participant in `onParticipantJoin`/`Update`/`giveInput`
/// routing and bulk `getAllParticipants` replies.
#[derive(Debug, Clone, Deserialize)]
pub struct WireParticipant {
    pub session_id: String,
    pub user_id: u32,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub level: u32,
    #[serde(default)]
    pub group_id: String,
    #[serde(default)]
    pub input_disabled: bool,
    #[serde(default)]
    pub etag: String,
}
