/*
 * Physics Module
 *
 * The integration stage of a tick: acceleration into velocity, velocity into
 * position, speed clamp, then the world-boundary topology. Runs strictly
 * after steering has finished for every boid. Each boid only touches its own
 * slots, so the stage is split across the rayon pool the same way steering is.
 */

use rayon::prelude::*;

use crate::boid::Flock;
use crate::params::{BoundaryPolicy, SimulationParams};
use crate::vector::{SteerExt, Vec2};

/// Inward velocity nudge for a boid within `boundary_margin` of an edge.
pub fn boundary_push(position: Vec2, params: &SimulationParams) -> Vec2 {
    let mut push = Vec2::ZERO;
    let margin = params.boundary_margin;
    let force = params.boundary_force;

    if position.x < margin {
        push.x += force;
    }
    if position.x > params.world_width - margin {
        push.x -= force;
    }
    if position.y < margin {
        push.y += force;
    }
    if position.y > params.world_height - margin {
        push.y -= force;
    }

    push
}

/// Toroidal wrap: leaving past one edge puts the boid on the opposite edge.
pub fn wrap_position(mut position: Vec2, width: f32, height: f32) -> Vec2 {
    if position.x < 0.0 {
        position.x = width;
    } else if position.x > width {
        position.x = 0.0;
    }

    if position.y < 0.0 {
        position.y = height;
    } else if position.y > height {
        position.y = 0.0;
    }

    position
}

/// Advance one boid by a tick and clear its acceleration.
#[inline]
pub fn integrate_boid(
    position: &mut Vec2,
    velocity: &mut Vec2,
    acceleration: &mut Vec2,
    last_acceleration: &mut Vec2,
    params: &SimulationParams,
) {
    if params.boundary_policy == BoundaryPolicy::Bounce {
        *velocity += boundary_push(*position, params);
    }

    *position += *velocity;
    *velocity = (*velocity + *acceleration).limit(params.max_speed);

    *last_acceleration = *acceleration;
    *acceleration = Vec2::ZERO;

    *position = match params.boundary_policy {
        BoundaryPolicy::Wrap => wrap_position(*position, params.world_width, params.world_height),
        // The push only steers; clamp so the next build still sees every boid
        BoundaryPolicy::Bounce => Vec2::new(
            position.x.clamp(0.0, params.world_width),
            position.y.clamp(0.0, params.world_height),
        ),
    };
}

pub fn integrate(flock: &mut Flock, params: &SimulationParams) {
    let Flock {
        positions,
        velocities,
        accelerations,
        last_accelerations,
    } = flock;

    if params.enable_parallel {
        positions
            .par_iter_mut()
            .zip(velocities.par_iter_mut())
            .zip(accelerations.par_iter_mut())
            .zip(last_accelerations.par_iter_mut())
            .for_each(|(((p, v), a), last)| integrate_boid(p, v, a, last, params));
    } else {
        positions
            .iter_mut()
            .zip(velocities.iter_mut())
            .zip(accelerations.iter_mut())
            .zip(last_accelerations.iter_mut())
            .for_each(|(((p, v), a), last)| integrate_boid(p, v, a, last, params));
    }
}
