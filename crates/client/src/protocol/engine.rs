// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Protocol engine (§4.H): server push dispatch, reply correlation, and
//! interactivity state gating. `outstanding_messages` is written before a
//! frame leaves the transport and cleared exactly once on the matching
//! reply (I4/P1), the same correlation-table shape as
//! `coop_mux::upstream::bridge::run_loop`'s `pending` map.

use std::collections::HashMap;

use crate::error::InteractiveError;
use crate::input::{ButtonInputEvent, InputAggregator, JoystickInputEvent};
use crate::model::control::WireControl;
use crate::model::group::WireGroup;
use crate::model::participant::WireParticipant;
use crate::model::scene::WireScene;
use crate::model::ModelMirror;
use crate::protocol::codec::{parse_server_frame, ClientFrame, ReplyError, ServerFrame};

/// Lifecycle phase of the facade (§4.H).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InteractivityState {
    NotInitialized,
    Initializing,
    ShortCodeRequired,
    Initialized,
    InteractivityPending,
    InteractivityEnabled,
    InteractivityDisabled,
}

/// Output of dispatching one incoming frame, or of building an outgoing
/// one.
#[derive(Debug)]
pub enum EngineEvent {
    Send(ClientFrame),
    StateChanged(InteractivityState),
    ParticipantStateChanged(u32),
    Button(ButtonInputEvent),
    Joystick(JoystickInputEvent),
    /// A server push whose method isn't one of the recognized set (§4.H):
    /// surfaced to the host as a generic message rather than only logged,
    /// so a host built against a newer protocol revision can still react
    /// to it (`OnInteractiveMessageEvent`, §4.K).
    Message { method: String, params: serde_json::Value },
    Error(InteractiveError),
}

pub struct ProtocolEngine {
    state: InteractivityState,
    current_message_id: u32,
    outstanding_messages: HashMap<u32, String>,
    initialized_groups: bool,
    initialized_scenes: bool,
    should_start_interactive: bool,
}

impl ProtocolEngine {
    pub fn new() -> Self {
        Self {
            state: InteractivityState::NotInitialized,
            current_message_id: 0,
            outstanding_messages: HashMap::new(),
            initialized_groups: false,
            initialized_scenes: false,
            should_start_interactive: false,
        }
    }

    pub fn state(&self) -> InteractivityState {
        self.state
    }

    pub fn set_should_start_interactive(&mut self, value: bool) {
        self.should_start_interactive = value;
    }

    pub fn note_short_code_required(&mut self) -> Option<EngineEvent> {
        self.transition(InteractivityState::ShortCodeRequired)
    }

    pub fn note_interactivity_disabled(&mut self) -> Option<EngineEvent> {
        self.transition(InteractivityState::InteractivityDisabled)
    }

    fn transition(&mut self, new_state: InteractivityState) -> Option<EngineEvent> {
        if self.state == new_state {
            return None;
        }
        self.state = new_state;
        Some(EngineEvent::StateChanged(new_state))
    }

    /// Build an outgoing RPC frame, recording the id→method correlation
    /// before the frame can leave the transport (I4/P1).
    pub fn build_rpc(&mut self, method: impl Into<String>, params: serde_json::Value) -> ClientFrame {
        self.current_message_id += 1;
        let id = self.current_message_id;
        let method = method.into();
        self.outstanding_messages.insert(id, method.clone());
        ClientFrame::new(id, method, params)
    }

    pub fn outstanding_message_count(&self) -> usize {
        self.outstanding_messages.len()
    }

    /// Parse and dispatch one incoming text frame (§4.H).
    pub fn handle_incoming(
        &mut self,
        text: &str,
        mirror: &mut ModelMirror,
        input: &mut InputAggregator,
    ) -> Vec<EngineEvent> {
        let frame = match parse_server_frame(text) {
            Ok(frame) => frame,
            Err(e) => {
                tracing::warn!(err = %e, "malformed server frame");
                return vec![EngineEvent::Error(InteractiveError::protocol(e.to_string()))];
            }
        };

        match frame {
            ServerFrame::Push { method, params } => self.handle_push(&method, params, mirror, input),
            ServerFrame::Reply { id, result, error } => self.handle_reply(id, result, error, mirror),
            ServerFrame::Unknown => Vec::new(),
        }
    }

    fn handle_push(
        &mut self,
        method: &str,
        params: serde_json::Value,
        mirror: &mut ModelMirror,
        input: &mut InputAggregator,
    ) -> Vec<EngineEvent> {
        let mut out = Vec::new();
        match method {
            "hello" => {
                out.push(EngineEvent::Send(self.build_rpc("getGroups", serde_json::json!({}))));
                out.push(EngineEvent::Send(self.build_rpc("getScenes", serde_json::json!({}))));
                if let Some(event) = self.transition(InteractivityState::Initializing) {
                    out.push(event);
                }
            }
            "onParticipantJoin" => {
                if let Ok(wire) = serde_json::from_value::<WireParticipant>(params) {
                    let user_id = mirror.participant_join(wire);
                    out.push(EngineEvent::ParticipantStateChanged(user_id));
                }
            }
            "onParticipantLeave" => {
                if let Ok(wire) = serde_json::from_value::<WireParticipant>(params) {
                    if mirror.participant_leave(wire.user_id) {
                        out.push(EngineEvent::ParticipantStateChanged(wire.user_id));
                    }
                }
            }
            "onParticipantUpdate" => {
                if let Ok(wire) = serde_json::from_value::<WireParticipant>(params) {
                    let user_id = mirror.participant_update(wire);
                    out.push(EngineEvent::ParticipantStateChanged(user_id));
                }
            }
            "onGroupCreate" | "onGroupUpdate" => {
                if let Ok(wire) = serde_json::from_value::<WireGroup>(params) {
                    mirror.reconcile_group(wire);
                }
            }
            "onSceneCreate" => {
                if let Ok(wire) = serde_json::from_value::<WireScene>(params) {
                    mirror.scene_create(wire);
                }
            }
            "onControlUpdate" => {
                if let Some(event) = self.handle_control_update(params, mirror) {
                    out.push(event);
                }
            }
            "onReady" => {
                let is_ready = params.get("isReady").and_then(|v| v.as_bool()).unwrap_or(false);
                if is_ready {
                    if let Some(event) = self.transition(InteractivityState::InteractivityEnabled) {
                        out.push(event);
                    }
                }
            }
            "giveInput" => out.extend(self.handle_give_input(params, mirror, input)),
            other => {
                tracing::debug!(method = other, "unrecognized server push, surfacing as message");
                out.push(EngineEvent::Message { method: other.to_owned(), params });
            }
        }
        out
    }

    fn handle_control_update(
        &mut self,
        params: serde_json::Value,
        mirror: &mut ModelMirror,
    ) -> Option<EngineEvent> {
        #[derive(serde::Deserialize)]
        struct ControlUpdateParams {
            scene_id: String,
            #[serde(default)]
            controls: Vec<WireControl>,
        }
        match serde_json::from_value::<ControlUpdateParams>(params) {
            Ok(parsed) => {
                mirror.replace_controls_for_scene(&parsed.scene_id, parsed.controls);
                None
            }
            Err(e) => Some(EngineEvent::Error(InteractiveError::protocol(e.to_string()))),
        }
    }

    fn handle_give_input(
        &mut self,
        params: serde_json::Value,
        mirror: &ModelMirror,
        input: &mut InputAggregator,
    ) -> Vec<EngineEvent> {
        #[derive(serde::Deserialize)]
        struct GiveInputParams {
            #[serde(rename = "participantID")]
            participant_id: String,
            control_id: String,
            event: String,
            #[serde(default)]
            x: f64,
            #[serde(default)]
            y: f64,
        }
        let parsed: GiveInputParams = match serde_json::from_value(params) {
            Ok(p) => p,
            Err(e) => return vec![EngineEvent::Error(InteractiveError::protocol(e.to_string()))],
        };

        let Some(participant) = mirror.find_participant_by_session(&parsed.participant_id) else {
            tracing::debug!(session = %parsed.participant_id, "giveInput for unknown participant session");
            return Vec::new();
        };
        let user_id = participant.user_id;

        if let Some(control) = mirror.find_control(&parsed.control_id) {
            if control.is_joystick() {
                let event = input.handle_joystick_input(&parsed.control_id, user_id, parsed.x, parsed.y);
                return vec![EngineEvent::Joystick(event)];
            }
        }

        let is_pressed_now = matches!(parsed.event.as_str(), "mousedown" | "buttondown");
        let event = input.handle_button_input(&parsed.control_id, user_id, is_pressed_now);
        vec![EngineEvent::Button(event)]
    }

    fn handle_reply(
        &mut self,
        id: u32,
        result: serde_json::Value,
        error: Option<ReplyError>,
        mirror: &mut ModelMirror,
    ) -> Vec<EngineEvent> {
        let Some(method) = self.outstanding_messages.remove(&id) else {
            tracing::debug!(id, "reply for unknown outstanding message");
            return Vec::new();
        };

        if let Some(error) = error {
            return vec![EngineEvent::Error(InteractiveError::reply(error.code, error.message))];
        }

        match method.as_str() {
            "getGroups" => {
                let Some(groups) = result.get("groups").cloned() else { return Vec::new() };
                let Ok(wires) = serde_json::from_value::<Vec<WireGroup>>(groups) else {
                    return Vec::new();
                };
                mirror.bulk_groups(wires);
                self.initialized_groups = true;
                self.maybe_complete_initialization()
            }
            "getScenes" => {
                let Some(scenes) = result.get("scenes").cloned() else { return Vec::new() };
                let Ok(wires) = serde_json::from_value::<Vec<WireScene>>(scenes) else {
                    return Vec::new();
                };
                mirror.bulk_scenes(wires);
                self.initialized_scenes = true;
                self.maybe_complete_initialization()
            }
            "getAllParticipants" => {
                if let Some(participants) = result.get("participants").cloned() {
                    if let Ok(wires) = serde_json::from_value::<Vec<WireParticipant>>(participants) {
                        mirror.bulk_participants(wires);
                    }
                }
                Vec::new()
            }
            // setCurrentScene/updateGroups/updateScenes/updateControls/
            // updateParticipants/ready/capture/createGroups/setCompression/
            // setJoystickCoordinates/setButtonControlProperties: absence of
            // an error object means there is nothing further to do (§4.H).
            _ => Vec::new(),
        }
    }

    fn maybe_complete_initialization(&mut self) -> Vec<EngineEvent> {
        if !(self.initialized_groups && self.initialized_scenes) {
            return Vec::new();
        }
        let mut out = Vec::new();
        if let Some(event) = self.transition(InteractivityState::Initialized) {
            out.push(event);
        }
        if self.should_start_interactive {
            out.push(EngineEvent::Send(self.build_rpc("ready", serde_json::json!({"isReady": true}))));
        }
        out
    }
}

impl Default for ProtocolEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "engine_tests.rs"]
mod tests;
