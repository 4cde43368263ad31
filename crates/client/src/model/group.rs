// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Group entity (§3, §4.I). The `default` group is synthesised on demand
//! by [`super::mirror::ModelMirror::current_scene_for_group`] rather than
//! treated as a lookup failure (§6).

use serde::Deserialize;

#[derive(Debug, Clone)]
pub struct Group {
    pub group_id: String,
    pub scene_id: String,
    pub etag: String,
}

impl Group {
    pub fn default_group() -> Self {
        Self { group_id: DEFAULT_GROUP_ID.to_owned(), scene_id: crate::model::scene::DEFAULT_SCENE_ID.to_owned(), etag: String::new() }
    }
}

pub const DEFAULT_GROUP_ID: &str = "default";

#[derive(Debug, Clone, Deserialize)]
pub struct WireGroup {
    pub group_id: String,
    #[serde(default)]
    pub scene_id: String,
    #[serde(default)]
    pub etag: String,
}

impl From<WireGroup> for Group {
    fn from(wire: WireGroup) -> Self {
        Self { group_id: wire.group_id, scene_id: wire.scene_id, etag: wire.etag }
    }
}
