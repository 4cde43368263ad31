// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Control entity (§3, §9). A tagged-variant (sum type) representation
//! rather than the inheritance graph described in the design notes: one
//! vector of [`Control`] is the source of truth, and [`super::mirror::ModelMirror::buttons`]/
//! [`super::mirror::ModelMirror::joysticks`] are derived projections, not
//! separately-maintained lists.

use serde::{Deserialize, Serialize};

/// Fields shared by every control kind.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ControlMeta {
    pub control_id: String,
    pub scene_id: String,
    #[serde(default)]
    pub disabled: bool,
    #[serde(default)]
    pub help_text: String,
    #[serde(default)]
    pub etag: String,
    /// Client-side progress override (purpose statement, §9 mutators:
    /// "joystick/progress overrides"), `0.0..=1.0`. Not part of the
    /// server's reconciled fields — set locally via
    /// [`crate::facade::InteractiveClient::set_control_progress`] and
    /// pushed back out through `setButtonControlProperties`.
    #[serde(default, skip_deserializing)]
    pub progress: f64,
}

#[derive(Debug, Clone)]
pub enum Control {
    Button { meta: ControlMeta, cost: u32, cooldown_expiration_ms: i64 },
    Joystick { meta: ControlMeta },
    Generic { meta: ControlMeta },
}

impl Control {
    pub fn meta(&self) -> &ControlMeta {
        match self {
            Control::Button { meta, .. } => meta,
            Control::Joystick { meta } => meta,
            Control::Generic { meta } => meta,
        }
    }

    pub fn meta_mut(&mut self) -> &mut ControlMeta {
        match self {
            Control::Button { meta, .. } => meta,
            Control::Joystick { meta } => meta,
            Control::Generic { meta } => meta,
        }
    }

    pub fn control_id(&self) -> &str {
        &self.meta().control_id
    }

    pub fn scene_id(&self) -> &str {
        &self.meta().scene_id
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Control::Button { .. } => "button",
            Control::Joystick { .. } => "joystick",
            Control::Generic { .. } => "generic",
        }
    }

    pub fn as_button(&self) -> Option<(&ControlMeta, u32, i64)> {
        match self {
            Control::Button { meta, cost, cooldown_expiration_ms } => {
                Some((meta, *cost, *cooldown_expiration_ms))
            }
            _ => None,
        }
    }

    pub fn is_button(&self) -> bool {
        matches!(self, Control::Button { .. })
    }

    pub fn is_joystick(&self) -> bool {
        matches!(self, Control::Joystick { .. })
    }
}

/// Wire shape of a control as it appears in `onControlUpdate` (§4.H).
#[derive(Debug, Clone, Deserialize)]
pub struct WireControl {
    #[serde(flatten)]
    pub meta: ControlMeta,
    pub kind: String,
    #[serde(default)]
    pub cost: u32,
    #[serde(default)]
    pub cooldown_expiration_ms: i64,
}

impl From<WireControl> for Control {
    fn from(wire: WireControl) -> Self {
        match wire.kind.as_str() {
            "button" => Control::Button {
                meta: wire.meta,
                cost: wire.cost,
                cooldown_expiration_ms: wire.cooldown_expiration_ms,
            },
            "joystick" => Control::Joystick { meta: wire.meta },
            _ => Control::Generic { meta: wire.meta },
        }
    }
}
