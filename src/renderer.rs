/*
 * Renderer Module
 *
 * This module draws the flock from a simulation snapshot. The world uses
 * screen-style coordinates (origin top-left, y down) while nannou puts the
 * origin in the window center with y up, so positions and headings are
 * flipped on the way out and scaled to fit the window.
 */

use nannou::prelude::*;
use tracing::error;

use crate::app::Model;
use crate::boid::BoidState;
use crate::params::SimulationParams;
use crate::vector::Vec2;
use crate::BOID_SIZE;

/// Maps world coordinates into the window.
#[derive(Clone, Copy, Debug)]
pub struct WorldView {
    scale: f32,
    half_width: f32,
    half_height: f32,
}

impl WorldView {
    pub fn new(params: &SimulationParams, window_rect: Rect) -> Self {
        let scale = f32::min(
            window_rect.w() / params.world_width,
            window_rect.h() / params.world_height,
        );
        Self {
            scale,
            half_width: params.world_width / 2.0,
            half_height: params.world_height / 2.0,
        }
    }

    pub fn to_screen(&self, world: Vec2) -> Point2 {
        pt2(
            (world.x - self.half_width) * self.scale,
            (self.half_height - world.y) * self.scale,
        )
    }

    /// On-screen rotation for a boid moving with `velocity`.
    pub fn heading(&self, velocity: Vec2) -> f32 {
        (-velocity.y).atan2(velocity.x)
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }
}

// Render the model
pub fn view(app: &App, model: &Model, frame: Frame) {
    let draw = app.draw();
    draw.background().color(BLACK);

    let window_rect = app.window_rect();
    let params = model.sim.params();
    let world = WorldView::new(params, window_rect);

    // World boundary
    draw.rect()
        .xy(world.to_screen(Vec2::new(params.world_width, params.world_height) / 2.0))
        .w_h(params.world_width * world.scale(), params.world_height * world.scale())
        .no_fill()
        .stroke_weight(1.0)
        .stroke(rgba(0.3, 0.3, 0.3, 1.0));

    let snapshot = model.sim.snapshot();
    for boid in snapshot.iter() {
        draw_boid(&draw, &world, &boid);
    }

    if model.view.show_debug {
        if let Some(first) = snapshot.get(0) {
            draw_neighborhood(&draw, &world, &first, params.neighborhood_range);
        }
        draw_debug_info(&draw, model, window_rect);
    }

    if let Err(err) = draw.to_frame(app, &frame) {
        error!(?err, "failed to draw frame");
    }
    if let Err(err) = model.egui.draw_to_frame(&frame) {
        error!(?err, "failed to draw control panel");
    }
}

/// An isosceles triangle pointing along the boid's velocity.
fn draw_boid(draw: &Draw, world: &WorldView, boid: &BoidState) {
    let length = BOID_SIZE * world.scale();
    let points = [
        pt2(length, 0.0),
        pt2(-length, length / 2.0),
        pt2(-length, -length / 2.0),
    ];

    draw.polygon()
        .color(rgb(255u8, 0, 0))
        .points(points)
        .xy(world.to_screen(boid.position))
        .rotate(world.heading(boid.velocity));
}

/// The square window the first boid searches for neighbors, plus its velocity.
fn draw_neighborhood(draw: &Draw, world: &WorldView, boid: &BoidState, range: f32) {
    let center = world.to_screen(boid.position);
    let side = 2.0 * range * world.scale();

    draw.rect()
        .xy(center)
        .w_h(side, side)
        .no_fill()
        .stroke(GREEN)
        .stroke_weight(1.0);

    let tip = world.to_screen(boid.position + boid.velocity * 5.0);
    draw.arrow()
        .start(center)
        .end(tip)
        .color(YELLOW)
        .stroke_weight(2.0);
}

// Draw debug information on the screen
fn draw_debug_info(draw: &Draw, model: &Model, window_rect: Rect) {
    let margin = 20.0;
    let line_height = 20.0;
    let panel_width = 240.0;
    let lines = model.debug_info.lines();
    let panel_height = line_height * lines.len() as f32 + margin;

    draw.rect()
        .x_y(
            window_rect.right() - panel_width / 2.0,
            window_rect.top() - panel_height / 2.0,
        )
        .w_h(panel_width, panel_height)
        .color(rgba(0.0, 0.0, 0.0, 0.7));

    let text_x = window_rect.right() - panel_width / 2.0;
    let text_y = window_rect.top() - margin;
    for (i, line) in lines.iter().enumerate() {
        draw.text(line)
            .x_y(text_x, text_y - i as f32 * line_height)
            .w(panel_width - margin)
            .left_justify()
            .color(WHITE)
            .font_size(14);
    }
}
