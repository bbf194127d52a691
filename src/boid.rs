/*
 * Boid Module
 *
 * This module defines the flock: the single owner of every boid's position,
 * velocity and acceleration. State is stored as parallel columns indexed by
 * boid id so the steering stage can hand each worker its own acceleration
 * slot while everyone reads the shared position and velocity columns.
 *
 * Each boid follows three main rules (see the flocking module):
 * 1. Separation: Avoid crowding neighbors
 * 2. Alignment: Steer towards the average heading of neighbors
 * 3. Cohesion: Steer towards the average position of neighbors
 */

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::f32::consts::TAU;

use crate::params::SimulationParams;
use crate::quadtree::PositionSource;
use crate::vector::{self, Vec2};

/// One boid as seen by a renderer or a test fixture.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct BoidState {
    pub id: usize,
    pub position: Vec2,
    pub velocity: Vec2,
}

impl BoidState {
    pub fn new(id: usize, position: Vec2, velocity: Vec2) -> Self {
        Self {
            id,
            position,
            velocity,
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct Flock {
    pub(crate) positions: Vec<Vec2>,
    pub(crate) velocities: Vec<Vec2>,
    pub(crate) accelerations: Vec<Vec2>,
    // Acceleration consumed by the integrator on the last tick
    pub(crate) last_accelerations: Vec<Vec2>,
}

impl Flock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Scatter `count` boids uniformly over the world with a random heading and
    /// a speed drawn from the configured spawn range. Same seed, same flock.
    pub fn spawn(count: usize, seed: u64, params: &SimulationParams) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut flock = Self::with_capacity(count);

        for _ in 0..count {
            let x = rng.gen_range(0.0..=params.world_width);
            let y = rng.gen_range(0.0..=params.world_height);

            let angle = rng.gen_range(0.0..TAU);
            let speed = if params.spawn_speed_max > params.spawn_speed_min {
                rng.gen_range(params.spawn_speed_min..params.spawn_speed_max)
            } else {
                params.spawn_speed_min
            };

            flock.push(Vec2::new(x, y), vector::from_angle(angle) * speed);
        }

        flock
    }

    /// Build a flock from explicit states. Ids are reassigned by position in
    /// the iterator so they stay dense.
    pub fn from_states<I>(states: I) -> Self
    where
        I: IntoIterator<Item = BoidState>,
    {
        let mut flock = Self::new();
        for state in states {
            flock.push(state.position, state.velocity);
        }
        flock
    }

    fn with_capacity(count: usize) -> Self {
        Self {
            positions: Vec::with_capacity(count),
            velocities: Vec::with_capacity(count),
            accelerations: Vec::with_capacity(count),
            last_accelerations: Vec::with_capacity(count),
        }
    }

    fn push(&mut self, position: Vec2, velocity: Vec2) {
        self.positions.push(position);
        self.velocities.push(velocity);
        self.accelerations.push(Vec2::ZERO);
        self.last_accelerations.push(Vec2::ZERO);
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn positions(&self) -> &[Vec2] {
        &self.positions
    }

    pub fn velocities(&self) -> &[Vec2] {
        &self.velocities
    }

    pub fn accelerations(&self) -> &[Vec2] {
        &self.accelerations
    }

    pub fn last_accelerations(&self) -> &[Vec2] {
        &self.last_accelerations
    }

    pub fn state(&self, id: usize) -> Option<BoidState> {
        let position = *self.positions.get(id)?;
        let velocity = *self.velocities.get(id)?;
        Some(BoidState::new(id, position, velocity))
    }

    // Apply a force to a boid
    pub fn apply_force(&mut self, id: usize, force: Vec2) {
        if let Some(acceleration) = self.accelerations.get_mut(id) {
            *acceleration += force;
        }
    }

    pub fn iter(&self) -> impl ExactSizeIterator<Item = BoidState> + '_ {
        self.positions
            .iter()
            .zip(&self.velocities)
            .enumerate()
            .map(|(id, (&position, &velocity))| BoidState::new(id, position, velocity))
    }

    /// Pull every position back inside `[0, width] x [0, height]`.
    pub fn confine(&mut self, width: f32, height: f32) {
        for position in &mut self.positions {
            position.x = position.x.clamp(0.0, width);
            position.y = position.y.clamp(0.0, height);
        }
    }
}

impl PositionSource for Flock {
    #[inline]
    fn position_of(&self, id: usize) -> Vec2 {
        self.positions[id]
    }
}
