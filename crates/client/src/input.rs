// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Input aggregator (§4.J): per-tick button edge counters and joystick
//! smoothing. The `(previous, current, next)` triple buffer shifts only
//! at a `do_work()` boundary (I5), and only while interactivity is
//! enabled.

use std::collections::HashMap;

#[derive(Debug, Default, Clone, Copy)]
struct Counters {
    previous: u32,
    current: u32,
    next: u32,
}

impl Counters {
    fn shift(&mut self) {
        self.previous = self.current;
        self.current = self.next;
        self.next = 0;
    }
}

#[derive(Debug, Default, Clone, Copy)]
struct ButtonEdges {
    down: Counters,
    pressed: Counters,
    up: Counters,
}

#[derive(Debug, Default, Clone, Copy)]
struct JoystickState {
    x: f64,
    y: f64,
    count: u32,
}

/// Emitted by [`InputAggregator::handle_button_input`] for every
/// `giveInput` of a button control, regardless of edge direction.
#[derive(Debug, Clone)]
pub struct ButtonInputEvent {
    pub control_id: String,
    pub user_id: u32,
    pub is_down: bool,
    pub is_pressed: bool,
    pub is_up: bool,
}

/// Emitted by [`InputAggregator::handle_joystick_input`] after the
/// cumulative mean is updated.
#[derive(Debug, Clone)]
pub struct JoystickInputEvent {
    pub control_id: String,
    pub user_id: u32,
    pub x: f64,
    pub y: f64,
}

#[derive(Default)]
pub struct InputAggregator {
    per_participant: HashMap<(u32, String), ButtonEdges>,
    /// Global per-control counters, aggregated across participants (§4.J:
    /// "copy the per-participant counter into the global per-control
    /// counter").
    control_totals: HashMap<String, ButtonEdges>,
    joysticks: HashMap<(u32, String), JoystickState>,
}

impl InputAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// `giveInput` for a button control: `is_pressed_now` reflects the
    /// server-reported press state for this tick (e.g. `mousedown` vs
    /// `mouseup`).
    pub fn handle_button_input(
        &mut self,
        control_id: &str,
        user_id: u32,
        is_pressed_now: bool,
    ) -> ButtonInputEvent {
        let key = (user_id, control_id.to_owned());
        let edges = self.per_participant.entry(key).or_default();
        let was_previously_pressed = edges.pressed.next > 0;

        let (is_down, is_pressed, is_up) = if is_pressed_now && !was_previously_pressed {
            (true, true, false)
        } else if is_pressed_now && was_previously_pressed {
            (false, true, false)
        } else {
            (false, false, true)
        };

        if is_down {
            edges.down.next += 1;
        }
        if is_pressed {
            edges.pressed.next += 1;
        }
        if is_up {
            edges.up.next += 1;
        }

        let totals = self.control_totals.entry(control_id.to_owned()).or_default();
        *totals = *edges;

        ButtonInputEvent { control_id: control_id.to_owned(), user_id, is_down, is_pressed, is_up }
    }

    /// `giveInput` for a joystick control: cumulative mean, float domain
    /// (§9 — never integer division).
    pub fn handle_joystick_input(
        &mut self,
        control_id: &str,
        user_id: u32,
        new_x: f64,
        new_y: f64,
    ) -> JoystickInputEvent {
        let key = (user_id, control_id.to_owned());
        let state = self.joysticks.entry(key).or_default();
        state.count += 1;
        let n = state.count as f64;
        state.x = state.x * (n - 1.0) / n + new_x / n;
        state.y = state.y * (n - 1.0) / n + new_y / n;

        JoystickInputEvent { control_id: control_id.to_owned(), user_id, x: state.x, y: state.y }
    }

    /// Tick boundary (I5): shift every triple buffer, but only while
    /// interactivity is enabled.
    pub fn do_work(&mut self, interactivity_enabled: bool) {
        if !interactivity_enabled {
            return;
        }
        for edges in self.per_participant.values_mut() {
            edges.down.shift();
            edges.pressed.shift();
            edges.up.shift();
        }
        for totals in self.control_totals.values_mut() {
            totals.down.shift();
            totals.pressed.shift();
            totals.up.shift();
        }
    }

    pub fn get_button_down(&self, control_id: &str, user_id: u32) -> bool {
        self.edges_for(control_id, user_id).map(|e| e.down.current > 0).unwrap_or(false)
    }

    pub fn get_button_pressed(&self, control_id: &str, user_id: u32) -> bool {
        self.edges_for(control_id, user_id).map(|e| e.pressed.current > 0).unwrap_or(false)
    }

    pub fn get_button_up(&self, control_id: &str, user_id: u32) -> bool {
        self.edges_for(control_id, user_id).map(|e| e.up.current > 0).unwrap_or(false)
    }

    pub fn get_count_of_button_downs(&self, control_id: &str, user_id: u32) -> u32 {
        self.edges_for(control_id, user_id).map(|e| e.down.current).unwrap_or(0)
    }

    pub fn get_count_of_button_presses(&self, control_id: &str, user_id: u32) -> u32 {
        self.edges_for(control_id, user_id).map(|e| e.pressed.current).unwrap_or(0)
    }

    pub fn get_count_of_button_ups(&self, control_id: &str, user_id: u32) -> u32 {
        self.edges_for(control_id, user_id).map(|e| e.up.current).unwrap_or(0)
    }

    pub fn get_joystick_x(&self, control_id: &str, user_id: u32) -> f64 {
        self.joysticks.get(&(user_id, control_id.to_owned())).map(|s| s.x).unwrap_or(0.0)
    }

    pub fn get_joystick_y(&self, control_id: &str, user_id: u32) -> f64 {
        self.joysticks.get(&(user_id, control_id.to_owned())).map(|s| s.y).unwrap_or(0.0)
    }

    fn edges_for(&self, control_id: &str, user_id: u32) -> Option<&ButtonEdges> {
        self.per_participant.get(&(user_id, control_id.to_owned()))
    }
}

#[cfg(test)]
#[path = "input_tests.rs"]
mod tests;
