// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Scene entity (§3). `controls` holds control ids belonging to the
//! scene; the controls themselves live in the mirror's master list (I3).

use serde::Deserialize;

#[derive(Debug, Clone)]
pub struct Scene {
    pub scene_id: String,
    pub etag: String,
    pub controls: Vec<String>,
}

impl Scene {
    pub fn new(scene_id: impl Into<String>) -> Self {
        Self { scene_id: scene_id.into(), etag: String::new(), controls: Vec::new() }
    }
}

/// Well-known scene id that must always resolve, synthesised if absent
/// (§6).
pub const DEFAULT_SCENE_ID: &str = "default";

#[derive(Debug, Clone, Deserialize)]
pub struct WireScene {
    pub scene_id: String,
    #[serde(default)]
    pub etag: String,
}

impl From<WireScene> for Scene {
    fn from(wire: WireScene) -> Self {
        Self { scene_id: wire.scene_id, etag: wire.etag, controls: Vec::new() }
    }
}
