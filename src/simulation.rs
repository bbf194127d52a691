/*
 * Simulation Module
 *
 * The driver that owns all simulation state and runs the per-tick pipeline:
 *
 *   build index -> steer -> integrate -> reset index
 *
 * Each stage finishes for every boid before the next one starts. Parameters
 * can be replaced or nudged between ticks; renderers read a `Snapshot`.
 */

use std::time::{Duration, Instant};
use tracing::{debug, error, info};

use crate::boid::{BoidState, Flock};
use crate::error::SimulationError;
use crate::flocking;
use crate::params::{Nudge, SimulationParams, Tunable};
use crate::physics;
use crate::quadtree::{QuadTree, Rect};
use crate::vector::Vec2;

/// Counters for one completed tick.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct TickStats {
    pub tick: u64,
    pub boids: usize,
    pub neighbor_pairs: usize,
    pub index_nodes: usize,
    pub index_depth: usize,
    pub duration: Duration,
}

pub struct Simulation {
    params: SimulationParams,
    flock: Flock,
    index: QuadTree,
    tick: u64,
}

impl Simulation {
    pub fn new(params: SimulationParams) -> Result<Self, SimulationError> {
        params.validate()?;
        Ok(Self {
            params,
            flock: Flock::new(),
            index: QuadTree::new(),
            tick: 0,
        })
    }

    /// A simulation over explicitly placed boids. Positions outside the world
    /// are rejected up front rather than on the first tick.
    pub fn from_states<I>(params: SimulationParams, states: I) -> Result<Self, SimulationError>
    where
        I: IntoIterator<Item = BoidState>,
    {
        let mut sim = Self::new(params)?;
        sim.flock = Flock::from_states(states);
        sim.check_bounds()?;
        Ok(sim)
    }

    /// Use a quadtree whose nodes split after `capacity` entries.
    pub fn with_node_capacity(mut self, capacity: usize) -> Self {
        self.index = QuadTree::with_capacity(capacity);
        self
    }

    /// Replace the parameters. Invalid sets are rejected and leave the
    /// current ones in place. If the world shrank, boids are pulled inside.
    pub fn configure(&mut self, params: SimulationParams) -> Result<(), SimulationError> {
        params.validate()?;

        let resized = params.world_width != self.params.world_width
            || params.world_height != self.params.world_height;
        if resized {
            self.flock.confine(params.world_width, params.world_height);
        }

        info!(
            cohesion = params.cohesion_factor,
            alignment = params.alignment_factor,
            separation = params.separation_factor,
            range = params.neighborhood_range,
            max_speed = params.max_speed,
            max_force = params.max_force,
            policy = ?params.boundary_policy,
            "configured simulation"
        );
        self.params = params;
        Ok(())
    }

    /// Move one tunable parameter a single step. Returns the new value.
    pub fn nudge(&mut self, tunable: Tunable, direction: Nudge) -> Result<f32, SimulationError> {
        let next = self.params.nudged(tunable, direction);
        next.validate()?;

        let value = next.get(tunable);
        info!("{}: {:.3}", tunable.label(), value);
        self.params = next;
        Ok(value)
    }

    /// Replace the flock with `count` freshly scattered boids.
    pub fn spawn(&mut self, count: usize, seed: u64) {
        self.flock = Flock::spawn(count, seed, &self.params);
        self.index.reset();
        self.tick = 0;
        info!(count, seed, "spawned flock");
    }

    /// Advance one step. An out-of-bounds boid at build time aborts the tick
    /// before any state changes.
    pub fn tick(&mut self) -> Result<TickStats, SimulationError> {
        let started = Instant::now();

        // (a) build
        if let Err(err) = self.build_index() {
            self.index.reset();
            error!(%err, tick = self.tick, "index build failed");
            return Err(err);
        }
        let index_nodes = self.index.node_count();
        let index_depth = self.index.depth();

        // (b) steer, (c) integrate
        let neighbor_pairs = flocking::steer(&mut self.flock, &self.index, &self.params);
        physics::integrate(&mut self.flock, &self.params);

        // (d) reset
        self.index.reset();

        self.tick += 1;
        let stats = TickStats {
            tick: self.tick,
            boids: self.flock.len(),
            neighbor_pairs,
            index_nodes,
            index_depth,
            duration: started.elapsed(),
        };
        debug!(
            tick = stats.tick,
            boids = stats.boids,
            neighbor_pairs = stats.neighbor_pairs,
            index_nodes = stats.index_nodes,
            index_depth = stats.index_depth,
            micros = stats.duration.as_micros() as u64,
            "tick"
        );
        Ok(stats)
    }

    fn build_index(&mut self) -> Result<(), SimulationError> {
        self.index
            .build(Rect::world(self.params.world_width, self.params.world_height));

        for (id, &position) in self.flock.positions().iter().enumerate() {
            if !self.index.insert(position, id) {
                return Err(out_of_bounds(id, position));
            }
        }
        Ok(())
    }

    fn check_bounds(&self) -> Result<(), SimulationError> {
        let world = Rect::world(self.params.world_width, self.params.world_height);
        match self
            .flock
            .positions()
            .iter()
            .position(|&p| !world.contains(p))
        {
            Some(id) => Err(out_of_bounds(id, self.flock.positions()[id])),
            None => Ok(()),
        }
    }

    pub fn snapshot(&self) -> Snapshot<'_> {
        Snapshot { flock: &self.flock }
    }

    pub fn params(&self) -> &SimulationParams {
        &self.params
    }

    pub fn len(&self) -> usize {
        self.flock.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flock.is_empty()
    }

    pub fn tick_count(&self) -> u64 {
        self.tick
    }

    /// Acceleration boid `id` received on the last tick, before the
    /// integrator cleared it.
    pub fn last_acceleration(&self, id: usize) -> Option<Vec2> {
        self.flock.last_accelerations().get(id).copied()
    }

    /// Acceleration currently accumulated for boid `id`.
    pub fn acceleration(&self, id: usize) -> Option<Vec2> {
        self.flock.accelerations().get(id).copied()
    }

    pub fn index(&self) -> &QuadTree {
        &self.index
    }
}

fn out_of_bounds(id: usize, position: Vec2) -> SimulationError {
    SimulationError::OutOfBounds {
        id,
        x: position.x,
        y: position.y,
    }
}

/// Read-only view of the flock, ordered by boid id.
#[derive(Clone, Copy)]
pub struct Snapshot<'a> {
    flock: &'a Flock,
}

impl<'a> Snapshot<'a> {
    pub fn len(&self) -> usize {
        self.flock.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flock.is_empty()
    }

    pub fn get(&self, id: usize) -> Option<BoidState> {
        self.flock.state(id)
    }

    pub fn iter(&self) -> impl ExactSizeIterator<Item = BoidState> + 'a {
        let flock: &'a Flock = self.flock;
        flock.iter()
    }

    pub fn positions(&self) -> &'a [Vec2] {
        let flock: &'a Flock = self.flock;
        flock.positions()
    }

    pub fn velocities(&self) -> &'a [Vec2] {
        let flock: &'a Flock = self.flock;
        flock.velocities()
    }

    pub fn to_vec(&self) -> Vec<BoidState> {
        self.iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ConfigError;
    use crate::params::BoundaryPolicy;

    #[test]
    fn new_rejects_invalid_params() {
        let params = SimulationParams {
            max_speed: 0.0,
            ..SimulationParams::default()
        };
        assert!(matches!(
            Simulation::new(params),
            Err(SimulationError::Config(ConfigError::NonPositive { name: "max_speed", .. }))
        ));
    }

    #[test]
    fn configure_keeps_old_params_on_error() {
        let mut sim = Simulation::new(SimulationParams::default()).unwrap();
        let bad = SimulationParams {
            neighborhood_range: -1.0,
            ..SimulationParams::default()
        };
        assert!(sim.configure(bad).is_err());
        assert_eq!(sim.params(), &SimulationParams::default());
    }

    #[test]
    fn shrinking_the_world_confines_boids() {
        let mut sim = Simulation::new(SimulationParams::default()).unwrap();
        sim.spawn(200, 3);
        sim.configure(SimulationParams {
            world_width: 100.0,
            world_height: 80.0,
            ..SimulationParams::default()
        })
        .unwrap();

        for state in sim.snapshot().iter() {
            assert!(state.position.x <= 100.0 && state.position.y <= 80.0);
        }
        sim.tick().unwrap();
    }

    #[test]
    fn nudge_rejects_steps_into_invalid_values() {
        let params = SimulationParams {
            neighborhood_range: 1.0,
            ..SimulationParams::default()
        };
        let mut sim = Simulation::new(params).unwrap();

        assert!(sim.nudge(Tunable::NeighborhoodRange, Nudge::Down).is_err());
        assert_eq!(sim.params().neighborhood_range, 1.0);

        let value = sim.nudge(Tunable::NeighborhoodRange, Nudge::Up).unwrap();
        assert_eq!(value, 2.0);
    }

    #[test]
    fn from_states_rejects_boids_outside_the_world() {
        let result = Simulation::from_states(
            SimulationParams::default(),
            [BoidState::new(0, Vec2::new(-10.0, 5.0), Vec2::ZERO)],
        );
        assert!(matches!(result, Err(SimulationError::OutOfBounds { id: 0, .. })));
    }

    #[test]
    fn failed_build_leaves_state_untouched() {
        let mut sim = Simulation::new(SimulationParams::default()).unwrap();
        sim.spawn(50, 4);
        sim.tick().unwrap();

        sim.flock.positions[7] = Vec2::new(-3.0, 10.0);
        let before = sim.snapshot().to_vec();
        let accelerations = sim.flock.accelerations().to_vec();

        let err = sim.tick().unwrap_err();
        assert!(matches!(err, SimulationError::OutOfBounds { id: 7, .. }));
        assert!(sim.index().is_empty());
        assert_eq!(sim.index().node_count(), 1);
        assert_eq!(sim.tick_count(), 1);
        assert_eq!(sim.snapshot().to_vec(), before);
        assert_eq!(sim.flock.accelerations(), accelerations.as_slice());
    }

    #[test]
    fn tick_leaves_index_empty_and_counts() {
        let mut sim = Simulation::new(SimulationParams::default()).unwrap();
        sim.spawn(300, 9);

        let stats = sim.tick().unwrap();
        assert_eq!(stats.tick, 1);
        assert_eq!(stats.boids, 300);
        assert!(stats.index_nodes >= 1);
        assert!(stats.index_depth >= 1);
        assert!(sim.index().is_empty());
        assert_eq!(sim.index().node_count(), 1);
        assert!(sim.snapshot().iter().all(|s| s.position.is_finite()));
        assert_eq!(sim.tick_count(), 1);
    }

    #[test]
    fn bounce_policy_keeps_boids_inside_over_many_ticks() {
        let mut sim = Simulation::new(SimulationParams {
            boundary_policy: BoundaryPolicy::Bounce,
            world_width: 300.0,
            world_height: 200.0,
            ..SimulationParams::default()
        })
        .unwrap();
        sim.spawn(120, 17);

        for _ in 0..200 {
            sim.tick().unwrap();
        }
        for state in sim.snapshot().iter() {
            assert!((0.0..=300.0).contains(&state.position.x));
            assert!((0.0..=200.0).contains(&state.position.y));
        }
    }

    #[test]
    fn snapshot_is_ordered_by_id() {
        let mut sim = Simulation::new(SimulationParams::default()).unwrap();
        sim.spawn(25, 1);
        let snapshot = sim.snapshot();
        let ids: Vec<usize> = snapshot.iter().map(|s| s.id).collect();
        assert_eq!(ids, (0..25).collect::<Vec<_>>());
        assert_eq!(snapshot.positions().len(), 25);
        assert_eq!(snapshot.get(3).map(|s| s.position), Some(snapshot.positions()[3]));
    }
}
