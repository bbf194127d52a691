/*
 * UI Module
 *
 * This module contains the egui control panel. Sliders edit a copy of the
 * simulation parameters; the caller applies the copy through
 * `Simulation::configure` when it changed, so every edit is validated.
 */

use nannou_egui::{egui, Egui};

use crate::app::ViewState;
use crate::debug::DebugInfo;
use crate::params::{BoundaryPolicy, SeparationMagnitude, SimulationParams};

/// What the panel asked for this frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct UiActions {
    pub params_changed: bool,
    pub respawn: bool,
}

pub fn update_ui(
    egui: &mut Egui,
    params: &mut SimulationParams,
    view: &mut ViewState,
    debug_info: &DebugInfo,
) -> UiActions {
    let before = params.clone();
    let mut respawn = false;

    let ctx = egui.begin_frame();

    egui::Window::new("Simulation Controls")
        .default_pos([10.0, 10.0])
        .show(&ctx, |ui| {
            ui.collapsing("Boids", |ui| {
                ui.add(
                    egui::Slider::new(&mut view.boid_count, 1..=20000).text("Number of Boids"),
                );
                if ui.button("Respawn").clicked() {
                    respawn = true;
                }
                ui.add(
                    egui::Slider::new(
                        &mut params.max_speed,
                        SimulationParams::get_max_speed_range(),
                    )
                    .text("Max Speed"),
                );
                ui.add(
                    egui::Slider::new(
                        &mut params.max_force,
                        SimulationParams::get_max_force_range(),
                    )
                    .text("Max Force"),
                );
            });

            ui.collapsing("Flocking Behavior", |ui| {
                ui.add(
                    egui::Slider::new(
                        &mut params.cohesion_factor,
                        SimulationParams::get_weight_range(),
                    )
                    .text("Cohesion Factor"),
                );
                ui.add(
                    egui::Slider::new(
                        &mut params.alignment_factor,
                        SimulationParams::get_weight_range(),
                    )
                    .text("Alignment Factor"),
                );
                ui.add(
                    egui::Slider::new(
                        &mut params.separation_factor,
                        SimulationParams::get_weight_range(),
                    )
                    .text("Separation Factor"),
                );
                ui.add(
                    egui::Slider::new(
                        &mut params.neighborhood_range,
                        SimulationParams::get_range_range(),
                    )
                    .text("Neighborhood Range"),
                );
                ui.label("Separation size");
                ui.radio_value(
                    &mut params.separation_magnitude,
                    SeparationMagnitude::Exact,
                    "Always max force",
                );
                ui.radio_value(
                    &mut params.separation_magnitude,
                    SeparationMagnitude::Clamp,
                    "Clamp to max force",
                );
            });

            ui.collapsing("World Edges", |ui| {
                ui.radio_value(&mut params.boundary_policy, BoundaryPolicy::Wrap, "Wrap");
                ui.radio_value(&mut params.boundary_policy, BoundaryPolicy::Bounce, "Bounce");
                if params.boundary_policy == BoundaryPolicy::Bounce {
                    ui.add(
                        egui::Slider::new(
                            &mut params.boundary_margin,
                            SimulationParams::get_boundary_margin_range(),
                        )
                        .text("Margin"),
                    );
                    ui.add(
                        egui::Slider::new(
                            &mut params.boundary_force,
                            SimulationParams::get_boundary_force_range(),
                        )
                        .text("Push"),
                    );
                }
            });

            ui.collapsing("Performance", |ui| {
                ui.checkbox(&mut params.enable_parallel, "Enable Parallel Processing");
                ui.separator();
                for line in debug_info.lines() {
                    ui.label(line);
                }
            });

            ui.label("Keys: W/S cohesion, A/D alignment, Q/E separation, Z/X range, R/F speed");
            ui.checkbox(&mut view.show_debug, "Show Debug Info");
            ui.checkbox(&mut view.paused, "Pause Simulation");
        });

    UiActions {
        params_changed: *params != before,
        respawn,
    }
}
