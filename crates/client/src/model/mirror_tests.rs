// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

fn wire_participant(user_id: u32, session_id: &str) -> WireParticipant {
    WireParticipant {
        session_id: session_id.to_owned(),
        user_id,
        username: "viewer".to_owned(),
        level: 1,
        group_id: String::new(),
        input_disabled: false,
        etag: "e1".to_owned(),
    }
}

#[test]
fn join_then_leave_keeps_one_entry_marked_left() -> anyhow::Result<()> {
    let mut mirror = ModelMirror::new();
    mirror.participant_join(wire_participant(42, "s1"));
    assert!(mirror.participant_leave(42));

    let participants = mirror.participants();
    assert_eq!(participants.len(), 1);
    assert_eq!(participants[0].state, ParticipantState::Left);
    Ok(())
}

#[test]
fn rejoin_updates_in_place_rather_than_duplicating() -> anyhow::Result<()> {
    let mut mirror = ModelMirror::new();
    mirror.participant_join(wire_participant(42, "s1"));
    mirror.participant_leave(42);
    mirror.participant_join(wire_participant(42, "s2"));

    let participants = mirror.participants();
    assert_eq!(participants.len(), 1);
    assert_eq!(participants[0].state, ParticipantState::Joined);
    assert_eq!(participants[0].session_id, "s2");
    Ok(())
}

#[test]
fn current_scene_for_unknown_group_synthesises_default() -> anyhow::Result<()> {
    let mirror = ModelMirror::new();
    let scene = mirror.current_scene_for_group("default");
    assert_eq!(scene.scene_id, DEFAULT_SCENE_ID);
    assert!(scene.controls.is_empty());
    Ok(())
}

#[test]
fn replace_controls_for_scene_keeps_scene_and_master_list_in_sync() -> anyhow::Result<()> {
    let mut mirror = ModelMirror::new();
    mirror.scene_create(WireScene { scene_id: "s1".to_owned(), etag: "e1".to_owned() });
    mirror.replace_controls_for_scene(
        "s1",
        vec![WireControl {
            meta: crate::model::control::ControlMeta {
                control_id: "b1".to_owned(),
                scene_id: "s1".to_owned(),
                disabled: false,
                help_text: String::new(),
                etag: "e1".to_owned(),
                progress: 0.0,
            },
            kind: "button".to_owned(),
            cost: 10,
            cooldown_expiration_ms: 0,
        }],
    );

    assert_eq!(mirror.controls().len(), 1);
    assert_eq!(mirror.buttons().len(), 1);
    assert_eq!(mirror.joysticks().len(), 0);
    let scene = mirror
        .scenes()
        .into_iter()
        .find(|s| s.scene_id == "s1")
        .ok_or_else(|| anyhow::anyhow!("scene s1 not found"))?;
    assert_eq!(scene.controls, vec!["b1".to_owned()]);
    Ok(())
}

#[test]
fn trigger_cooldown_sets_expiration_on_button_only() -> anyhow::Result<()> {
    let mut mirror = ModelMirror::new();
    mirror.replace_controls_for_scene(
        "s1",
        vec![WireControl {
            meta: crate::model::control::ControlMeta {
                control_id: "b1".to_owned(),
                scene_id: "s1".to_owned(),
                disabled: false,
                help_text: String::new(),
                etag: String::new(),
                progress: 0.0,
            },
            kind: "button".to_owned(),
            cost: 0,
            cooldown_expiration_ms: 0,
        }],
    );

    let result = mirror.trigger_cooldown("b1", 5000, 1_000_000);
    assert_eq!(result, Some(1_005_000));
    assert!(mirror.trigger_cooldown("missing", 5000, 1_000_000).is_none());
    Ok(())
}
