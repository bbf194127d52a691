/*
 * Input Module
 *
 * This module handles keyboard and raw window events for the viewer.
 *
 * Key bindings (each press moves a parameter one step):
 * - W / S: cohesion factor up / down
 * - A / D: alignment factor up / down
 * - Q / E: separation factor up / down
 * - Z / X: neighborhood range up / down
 * - R / F: max speed up / down
 * - Space: pause, G: debug overlay, N: respawn
 */

use nannou::prelude::*;
use tracing::warn;

use crate::app::{respawn, Model};
use crate::params::{Nudge, Tunable};

/// Parameter nudge bound to `key`, if any.
pub fn binding(key: Key) -> Option<(Tunable, Nudge)> {
    let binding = match key {
        Key::W => (Tunable::Cohesion, Nudge::Up),
        Key::S => (Tunable::Cohesion, Nudge::Down),
        Key::A => (Tunable::Alignment, Nudge::Up),
        Key::D => (Tunable::Alignment, Nudge::Down),
        Key::Q => (Tunable::Separation, Nudge::Up),
        Key::E => (Tunable::Separation, Nudge::Down),
        Key::Z => (Tunable::NeighborhoodRange, Nudge::Up),
        Key::X => (Tunable::NeighborhoodRange, Nudge::Down),
        Key::R => (Tunable::MaxSpeed, Nudge::Up),
        Key::F => (Tunable::MaxSpeed, Nudge::Down),
        _ => return None,
    };
    Some(binding)
}

// Key pressed event handler
pub fn key_pressed(_app: &App, model: &mut Model, key: Key) {
    // Keys typed into the panel belong to the panel
    if model.egui.ctx().wants_keyboard_input() {
        return;
    }

    if let Some((tunable, direction)) = binding(key) {
        match model.sim.nudge(tunable, direction) {
            Ok(_) => model.pending_params = model.sim.params().clone(),
            Err(err) => warn!(%err, "ignored {} change", tunable.label()),
        }
        return;
    }

    match key {
        Key::Space => model.view.paused = !model.view.paused,
        Key::G => model.view.show_debug = !model.view.show_debug,
        Key::N => respawn(model),
        _ => {}
    }
}

// Handle raw window events for egui
pub fn raw_window_event(_app: &App, model: &mut Model, event: &nannou::winit::event::WindowEvent) {
    model.egui.handle_raw_event(event);
}
