// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Model mirror (§4.I): reconciles the server's authoritative
//! scenes/groups/controls/participants into in-process caches. Every
//! reconcile unconditionally replaces the local copy — I1, no partial
//! field diffing.

use indexmap::IndexMap;

use crate::model::control::{Control, WireControl};
use crate::model::group::{Group, WireGroup, DEFAULT_GROUP_ID};
use crate::model::participant::{Participant, ParticipantState, WireParticipant};
use crate::model::scene::{Scene, WireScene, DEFAULT_SCENE_ID};

#[derive(Default)]
pub struct ModelMirror {
    scenes: Vec<Scene>,
    groups: Vec<Group>,
    controls: Vec<Control>,
    participants: IndexMap<u32, Participant>,
}

impl ModelMirror {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn scenes(&self) -> Vec<Scene> {
        self.scenes.clone()
    }

    pub fn groups(&self) -> Vec<Group> {
        self.groups.clone()
    }

    pub fn controls(&self) -> Vec<Control> {
        self.controls.clone()
    }

    pub fn buttons(&self) -> Vec<Control> {
        self.controls.iter().filter(|c| c.is_button()).cloned().collect()
    }

    pub fn joysticks(&self) -> Vec<Control> {
        self.controls.iter().filter(|c| c.is_joystick()).cloned().collect()
    }

    pub fn participants(&self) -> Vec<Participant> {
        self.participants.values().cloned().collect()
    }

    pub fn find_control(&self, control_id: &str) -> Option<&Control> {
        self.controls.iter().find(|c| c.control_id() == control_id)
    }

    pub fn find_control_mut(&mut self, control_id: &str) -> Option<&mut Control> {
        self.controls.iter_mut().find(|c| c.control_id() == control_id)
    }

    pub fn find_participant_by_session(&self, session_id: &str) -> Option<&Participant> {
        self.participants.values().find(|p| p.session_id == session_id)
    }

    /// `get_current_scene()` (§6): synthesises an empty default group/scene
    /// rather than failing when the server hasn't acknowledged them yet.
    pub fn current_scene_for_group(&self, group_id: &str) -> Scene {
        let scene_id = self
            .groups
            .iter()
            .find(|g| g.group_id == group_id)
            .map(|g| g.scene_id.clone())
            .unwrap_or_else(|| DEFAULT_SCENE_ID.to_owned());
        self.scenes
            .iter()
            .find(|s| s.scene_id == scene_id)
            .cloned()
            .unwrap_or_else(|| Scene::new(scene_id))
    }

    pub fn default_group(&self) -> Group {
        self.groups
            .iter()
            .find(|g| g.group_id == DEFAULT_GROUP_ID)
            .cloned()
            .unwrap_or_else(Group::default_group)
    }

    // -- Participants (§4.I) --

    /// `onParticipantJoin`: update in place or append (I2), set `Joined`.
    pub fn participant_join(&mut self, wire: WireParticipant) -> u32 {
        let user_id = wire.user_id;
        match self.participants.get_mut(&user_id) {
            Some(existing) => {
                existing.apply_update(wire);
                existing.state = ParticipantState::Joined;
            }
            None => {
                self.participants.insert(user_id, Participant::from_wire(wire));
            }
        }
        user_id
    }

    /// `onParticipantUpdate`: copy fields over, state unchanged.
    pub fn participant_update(&mut self, wire: WireParticipant) -> u32 {
        let user_id = wire.user_id;
        match self.participants.get_mut(&user_id) {
            Some(existing) => existing.apply_update(wire),
            None => {
                self.participants.insert(user_id, Participant::from_wire(wire));
            }
        }
        user_id
    }

    /// `onParticipantLeave`: mark `Left`, never remove (§9).
    pub fn participant_leave(&mut self, user_id: u32) -> bool {
        if let Some(existing) = self.participants.get_mut(&user_id) {
            existing.state = ParticipantState::Left;
            true
        } else {
            false
        }
    }

    pub fn bulk_participants(&mut self, wires: Vec<WireParticipant>) {
        for wire in wires {
            self.participant_update(wire);
        }
    }

    // -- Groups (§4.I) --

    pub fn reconcile_group(&mut self, wire: WireGroup) {
        if let Some(existing) = self.groups.iter_mut().find(|g| g.group_id == wire.group_id) {
            existing.etag = wire.etag;
            existing.scene_id = wire.scene_id;
        } else {
            self.groups.push(wire.into());
        }
    }

    pub fn bulk_groups(&mut self, wires: Vec<WireGroup>) {
        self.groups = wires.into_iter().map(Into::into).collect();
    }

    // -- Scenes (§4.I) --

    pub fn scene_create(&mut self, wire: WireScene) {
        self.scenes.push(wire.into());
    }

    pub fn bulk_scenes(&mut self, wires: Vec<WireScene>) {
        self.scenes = wires.into_iter().map(Into::into).collect();
    }

    // -- Controls (§4.I) --

    /// `onControlUpdate`: replace every control under `scene_id` (I3: the
    /// scene's `controls` id list and the master list always agree).
    pub fn replace_controls_for_scene(&mut self, scene_id: &str, wires: Vec<WireControl>) {
        self.controls.retain(|c| c.scene_id() != scene_id);
        let new_controls: Vec<Control> = wires.into_iter().map(Control::from).collect();
        let ids: Vec<String> = new_controls.iter().map(|c| c.control_id().to_owned()).collect();
        self.controls.extend(new_controls);

        if let Some(scene) = self.scenes.iter_mut().find(|s| s.scene_id == scene_id) {
            scene.controls = ids;
        } else {
            let mut scene = Scene::new(scene_id.to_owned());
            scene.controls = ids;
            self.scenes.push(scene);
        }
    }

    /// `trigger_cooldown` (§4.I): returns the new expiration if `control_id`
    /// names a button control.
    pub fn trigger_cooldown(&mut self, control_id: &str, ms: i64, now_epoch_ms: i64) -> Option<i64> {
        let control = self.find_control_mut(control_id)?;
        if let Control::Button { cooldown_expiration_ms, .. } = control {
            *cooldown_expiration_ms = now_epoch_ms + ms;
            Some(*cooldown_expiration_ms)
        } else {
            None
        }
    }

    pub fn set_control_disabled(&mut self, control_id: &str, disabled: bool) -> bool {
        match self.find_control_mut(control_id) {
            Some(control) => {
                control.meta_mut().disabled = disabled;
                true
            }
            None => false,
        }
    }

    pub fn set_control_help_text(&mut self, control_id: &str, help_text: &str) -> bool {
        match self.find_control_mut(control_id) {
            Some(control) => {
                control.meta_mut().help_text = help_text.to_owned();
                true
            }
            None => false,
        }
    }

    /// `cost` only applies to button controls.
    pub fn set_control_cost(&mut self, control_id: &str, cost: u32) -> bool {
        match self.find_control_mut(control_id) {
            Some(Control::Button { cost: current, .. }) => {
                *current = cost;
                true
            }
            _ => false,
        }
    }

    pub fn set_control_progress(&mut self, control_id: &str, progress: f64) -> bool {
        match self.find_control_mut(control_id) {
            Some(control) => {
                control.meta_mut().progress = progress.clamp(0.0, 1.0);
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
#[path = "mirror_tests.rs"]
mod tests;
