// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn mousedown_then_do_work_yields_down_and_pressed_for_one_tick() -> anyhow::Result<()> {
    let mut input = InputAggregator::new();
    input.handle_button_input("b", 7, true);
    input.do_work(true);

    assert!(input.get_button_down("b", 7));
    assert!(input.get_button_pressed("b", 7));
    assert!(!input.get_button_up("b", 7));

    input.do_work(true);
    assert!(!input.get_button_down("b", 7));
    assert!(!input.get_button_pressed("b", 7));
    assert_eq!(input.get_count_of_button_presses("b", 7), 0);
    Ok(())
}

#[test]
fn held_button_is_pressed_but_not_down_on_second_tick() -> anyhow::Result<()> {
    let mut input = InputAggregator::new();
    input.handle_button_input("b", 7, true);
    input.do_work(true);
    input.handle_button_input("b", 7, true);
    input.do_work(true);

    assert!(!input.get_button_down("b", 7));
    assert!(input.get_button_pressed("b", 7));
    Ok(())
}

#[test]
fn do_work_is_a_no_op_when_interactivity_disabled() -> anyhow::Result<()> {
    let mut input = InputAggregator::new();
    input.handle_button_input("b", 7, true);
    input.do_work(false);

    // The next-buffer shift never happened, so current is still zero.
    assert!(!input.get_button_down("b", 7));
    Ok(())
}

#[test]
fn joystick_averaging_uses_float_domain_not_integer_division() -> anyhow::Result<()> {
    let mut input = InputAggregator::new();
    input.handle_joystick_input("j", 1, 1.0, 0.0);
    input.handle_joystick_input("j", 1, 0.0, 1.0);
    input.handle_joystick_input("j", 1, 0.0, 0.0);

    // Mean of (1,0,0) and (0,1,0) over three samples: (1/3, 1/3).
    assert!((input.get_joystick_x("j", 1) - (1.0 / 3.0)).abs() < 1e-9);
    assert!((input.get_joystick_y("j", 1) - (1.0 / 3.0)).abs() < 1e-9);
    Ok(())
}

#[test]
fn unset_joystick_reads_as_zero() -> anyhow::Result<()> {
    let input = InputAggregator::new();
    assert_eq!(input.get_joystick_x("missing", 1), 0.0);
    assert_eq!(input.get_joystick_y("missing", 1), 0.0);
    Ok(())
}
