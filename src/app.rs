/*
 * Application Module
 *
 * This module defines the viewer model and its update loop. The viewer is
 * the frame driver for the simulation: it runs `Simulation::tick` on a fixed
 * timestep so the simulation rate stays independent of the render rate, and
 * forwards parameter edits from the control panel and the keyboard to
 * `Simulation::configure` / `Simulation::nudge` between ticks.
 */

use nannou::prelude::*;
use nannou_egui::Egui;
use std::time::{Duration, Instant};
use tracing::{error, warn};

use crate::config::RunConfig;
use crate::debug::DebugInfo;
use crate::input::{key_pressed, raw_window_event};
use crate::params::SimulationParams;
use crate::renderer::view;
use crate::simulation::Simulation;
use crate::ui;

/// Viewer-only toggles that never reach the simulation.
#[derive(Clone, Debug)]
pub struct ViewState {
    pub boid_count: usize,
    pub paused: bool,
    pub show_debug: bool,
}

// Main model for the application
pub struct Model {
    pub sim: Simulation,
    pub config: RunConfig,
    /// Parameters as edited in the control panel; applied when they change.
    pub pending_params: SimulationParams,
    pub view: ViewState,
    pub egui: Egui,
    pub debug_info: DebugInfo,
    // Fixed timestep simulation variables
    pub physics_accumulator: Duration,
    pub physics_step_size: Duration,
    pub last_update_time: Instant,
}

// Initialize the model
pub fn model(app: &App, config: RunConfig) -> Model {
    let params = config.params.clone();

    // Window matches the world, shrunk to fit the monitor if needed
    let (mut window_width, mut window_height) = (params.world_width, params.world_height);
    if let Some(monitor) = app.primary_monitor() {
        let size = monitor.size();
        let fit = f32::min(
            size.width as f32 * 0.8 / window_width,
            size.height as f32 * 0.8 / window_height,
        );
        if fit < 1.0 {
            window_width *= fit;
            window_height *= fit;
        }
    }

    let window_id = app
        .new_window()
        .title("Boids Simulation")
        .size(window_width as u32, window_height as u32)
        .view(view)
        .key_pressed(key_pressed)
        .raw_event(raw_window_event)
        .build()
        .expect("failed to build the simulation window");

    let window = app
        .window(window_id)
        .expect("window disappeared right after creation");
    let egui = Egui::from_window(&window);

    // Parameters were validated when the config was loaded
    let mut sim = match Simulation::new(params.clone()) {
        Ok(sim) => sim,
        Err(err) => {
            error!(%err, "invalid simulation parameters, falling back to defaults");
            Simulation::new(SimulationParams::default())
                .expect("default simulation parameters are valid")
        }
    };
    sim.spawn(config.boid_count, config.seed_or_random());

    Model {
        pending_params: sim.params().clone(),
        sim,
        view: ViewState {
            boid_count: config.boid_count,
            paused: false,
            show_debug: false,
        },
        physics_step_size: Duration::from_secs_f32(1.0 / config.ticks_per_second),
        config,
        egui,
        debug_info: DebugInfo::default(),
        physics_accumulator: Duration::ZERO,
        last_update_time: Instant::now(),
    }
}

// Update the model
pub fn update(app: &App, model: &mut Model, update: Update) {
    // Update debug info
    model.debug_info.fps = app.fps();
    model.debug_info.frame_time = update.since_last;
    model.egui.set_elapsed_time(update.since_start);

    let actions = ui::update_ui(
        &mut model.egui,
        &mut model.pending_params,
        &mut model.view,
        &model.debug_info,
    );

    if actions.params_changed {
        apply_pending_params(model);
    }

    if actions.respawn {
        respawn(model);
    }

    // Time since last update
    let now = Instant::now();
    let frame_time = now.duration_since(model.last_update_time);
    model.last_update_time = now;

    if model.view.paused {
        model.physics_accumulator = Duration::ZERO;
        model.debug_info.ticks_per_frame = 0;
        return;
    }

    model.physics_accumulator += frame_time;

    // Run fixed timestep updates
    let mut ticks_this_frame = 0;
    while model.physics_accumulator >= model.physics_step_size
        && ticks_this_frame < model.config.max_ticks_per_frame
    {
        match model.sim.tick() {
            Ok(stats) => model.debug_info.record_tick(stats),
            Err(err) => {
                error!(%err, "simulation invariant violated, shutting down");
                app.quit();
                return;
            }
        }
        model.physics_accumulator -= model.physics_step_size;
        ticks_this_frame += 1;
    }

    // Too far behind: drop the backlog instead of spiralling
    if model.physics_accumulator >= model.physics_step_size {
        model.physics_accumulator = Duration::ZERO;
    }

    model.debug_info.ticks_per_frame = ticks_this_frame;
}

/// Push the panel's parameters into the simulation, or roll the panel back
/// if they are rejected.
pub fn apply_pending_params(model: &mut Model) {
    if let Err(err) = model.sim.configure(model.pending_params.clone()) {
        warn!(%err, "rejected parameter change");
        model.pending_params = model.sim.params().clone();
    }
}

pub fn respawn(model: &mut Model) {
    model
        .sim
        .spawn(model.view.boid_count, model.config.seed_or_random());
    model.physics_accumulator = Duration::ZERO;
}
