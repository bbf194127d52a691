/*
 * Flocking Module
 *
 * The steering stage of a tick. Each boid queries the quadtree for the boids
 * in a square window around it and accumulates three Reynolds steering
 * forces from them:
 * 1. Alignment: match the average neighbor velocity
 * 2. Cohesion: head for the neighbor centroid
 * 3. Separation: move away from neighbors, weighted by inverse distance
 *
 * The stage reads every boid's position and velocity and writes only the
 * boid's own acceleration slot, so it runs across the rayon pool without
 * locks. The tree must be fully built before this runs and is not touched
 * until it finishes.
 */

use rayon::prelude::*;

use crate::boid::Flock;
use crate::params::{SeparationMagnitude, SimulationParams};
use crate::quadtree::{QuadTree, Rect};
use crate::vector::{SteerExt, Vec2};

/// Running sums over a boid's neighbors.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct NeighborSums {
    pub velocity: Vec2,
    pub position: Vec2,
    pub separation: Vec2,
    pub count: usize,
}

impl NeighborSums {
    /// Fold in one neighbor. A neighbor sitting exactly on top of `position`
    /// still counts for alignment and cohesion but adds nothing to separation.
    #[inline]
    pub fn add(&mut self, position: Vec2, other_position: Vec2, other_velocity: Vec2) {
        self.velocity += other_velocity;
        self.position += other_position;

        let d = position.distance(other_position);
        if d > 0.0 {
            self.separation += (position - other_position) / d;
        }

        self.count += 1;
    }
}

/// Steering computed for one boid.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Steering {
    pub force: Vec2,
    pub neighbors: usize,
}

/// Combine the neighbor sums into the acceleration contribution for a boid at
/// `position` moving with `velocity`. No neighbors, no force.
pub fn rule_forces(
    position: Vec2,
    velocity: Vec2,
    sums: &NeighborSums,
    params: &SimulationParams,
) -> Vec2 {
    if sums.count == 0 {
        return Vec2::ZERO;
    }
    let count = sums.count as f32;

    let alignment = ((sums.velocity / count).set_magnitude(params.max_speed) - velocity)
        .limit(params.max_force);

    let cohesion = ((sums.position / count - position).set_magnitude(params.max_speed) - velocity)
        .limit(params.max_force);

    let separation_steer = (sums.separation / count).set_magnitude(params.max_speed) - velocity;
    let separation = match params.separation_magnitude {
        SeparationMagnitude::Exact => separation_steer.set_magnitude(params.max_force),
        SeparationMagnitude::Clamp => separation_steer.limit(params.max_force),
    };

    let combined = alignment * params.alignment_factor
        + cohesion * params.cohesion_factor
        + separation * params.separation_factor;

    combined / params.rule_divisor
}

/// Steering for boid `id`. `scratch` is reused for the neighbor list.
pub fn steer_boid(
    id: usize,
    positions: &[Vec2],
    velocities: &[Vec2],
    tree: &QuadTree,
    params: &SimulationParams,
    scratch: &mut Vec<usize>,
) -> Steering {
    let position = positions[id];
    let velocity = velocities[id];

    scratch.clear();
    tree.query_into(
        &Rect::around(position, params.neighborhood_range),
        positions,
        scratch,
    );

    let mut sums = NeighborSums::default();
    for &other in scratch.iter() {
        if other == id {
            continue;
        }
        sums.add(position, positions[other], velocities[other]);
    }

    Steering {
        force: rule_forces(position, velocity, &sums, params),
        neighbors: sums.count,
    }
}

/// Run the steering stage over the whole flock, adding each boid's steering
/// force into its acceleration. Returns the number of (boid, neighbor) pairs
/// seen.
pub fn steer(flock: &mut Flock, tree: &QuadTree, params: &SimulationParams) -> usize {
    let Flock {
        positions,
        velocities,
        accelerations,
        ..
    } = flock;
    let positions: &[Vec2] = positions;
    let velocities: &[Vec2] = velocities;

    if params.enable_parallel {
        accelerations
            .par_iter_mut()
            .enumerate()
            .map_init(Vec::new, |scratch, (id, acceleration)| {
                let steering = steer_boid(id, positions, velocities, tree, params, scratch);
                *acceleration += steering.force;
                steering.neighbors
            })
            .sum()
    } else {
        let mut scratch = Vec::new();
        accelerations
            .iter_mut()
            .enumerate()
            .map(|(id, acceleration)| {
                let steering = steer_boid(id, positions, velocities, tree, params, &mut scratch);
                *acceleration += steering.force;
                steering.neighbors
            })
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::boid::BoidState;

    fn tree_for(flock: &Flock, params: &SimulationParams) -> QuadTree {
        let mut tree = QuadTree::new();
        tree.build(Rect::world(params.world_width, params.world_height));
        for (id, &p) in flock.positions().iter().enumerate() {
            assert!(tree.insert(p, id));
        }
        tree
    }

    fn flock_of(states: &[(Vec2, Vec2)]) -> Flock {
        Flock::from_states(
            states
                .iter()
                .enumerate()
                .map(|(id, &(p, v))| BoidState::new(id, p, v)),
        )
    }

    #[test]
    fn isolated_boid_gets_no_force() {
        let params = SimulationParams::default();
        let mut flock = flock_of(&[
            (Vec2::new(100.0, 100.0), Vec2::new(1.0, 0.0)),
            (Vec2::new(1000.0, 800.0), Vec2::new(0.0, 1.0)),
        ]);
        let tree = tree_for(&flock, &params);

        let pairs = steer(&mut flock, &tree, &params);

        assert_eq!(pairs, 0);
        assert!(flock.accelerations().iter().all(|a| *a == Vec2::ZERO));
    }

    #[test]
    fn coincident_boids_stay_finite() {
        let params = SimulationParams::default();
        let mut flock = flock_of(&[
            (Vec2::new(300.0, 300.0), Vec2::new(0.5, 0.5)),
            (Vec2::new(300.0, 300.0), Vec2::new(-0.5, 0.25)),
        ]);
        let tree = tree_for(&flock, &params);

        let pairs = steer(&mut flock, &tree, &params);

        assert_eq!(pairs, 2);
        for a in flock.accelerations() {
            assert!(a.is_finite(), "{a:?}");
        }
    }

    #[test]
    fn separation_alone_pushes_boids_apart() {
        let params = SimulationParams {
            cohesion_factor: 0.0,
            alignment_factor: 0.0,
            ..SimulationParams::default()
        };
        let mut flock = flock_of(&[
            (Vec2::new(200.0, 200.0), Vec2::ZERO),
            (Vec2::new(205.0, 200.0), Vec2::ZERO),
        ]);
        let tree = tree_for(&flock, &params);
        steer(&mut flock, &tree, &params);

        let a = flock.accelerations();
        assert!(a[0].x < 0.0);
        assert!(a[1].x > 0.0);
        // Forced to max_force, weighted, then divided by the rule divisor
        let expected = params.max_force * params.separation_factor / params.rule_divisor;
        assert!((a[0].length() - expected).abs() < 1e-5);
    }

    #[test]
    fn exact_separation_differs_from_clamped() {
        let position = Vec2::new(10.0, 10.0);
        let mut sums = NeighborSums::default();
        sums.add(position, Vec2::new(12.0, 10.0), Vec2::ZERO);

        // Steer is shorter than max_force, so only Exact stretches it
        let exact = SimulationParams {
            cohesion_factor: 0.0,
            alignment_factor: 0.0,
            separation_factor: 1.0,
            max_speed: 0.1,
            max_force: 1.0,
            rule_divisor: 1.0,
            ..SimulationParams::default()
        };
        let clamped = SimulationParams {
            separation_magnitude: SeparationMagnitude::Clamp,
            ..exact.clone()
        };

        let exact_force = rule_forces(position, Vec2::ZERO, &sums, &exact);
        let clamped_force = rule_forces(position, Vec2::ZERO, &sums, &clamped);
        assert!((exact_force.length() - 1.0).abs() < 1e-5);
        assert!((clamped_force.length() - 0.1).abs() < 1e-5);
    }

    #[test]
    fn steering_adds_to_existing_acceleration() {
        let params = SimulationParams::default();
        let mut flock = flock_of(&[
            (Vec2::new(200.0, 200.0), Vec2::ZERO),
            (Vec2::new(210.0, 200.0), Vec2::ZERO),
        ]);
        let tree = tree_for(&flock, &params);
        let once = {
            let mut f = flock.clone();
            steer(&mut f, &tree, &params);
            f.accelerations()[0]
        };

        flock.apply_force(0, Vec2::new(0.0, 3.0));
        steer(&mut flock, &tree, &params);
        assert_eq!(flock.accelerations()[0], once + Vec2::new(0.0, 3.0));
    }

    #[test]
    fn neighbors_outside_the_window_are_ignored() {
        let params = SimulationParams {
            neighborhood_range: 10.0,
            ..SimulationParams::default()
        };
        let mut flock = flock_of(&[
            (Vec2::new(100.0, 100.0), Vec2::ZERO),
            (Vec2::new(111.0, 100.0), Vec2::ZERO),
            (Vec2::new(108.0, 108.0), Vec2::ZERO),
        ]);
        let tree = tree_for(&flock, &params);
        let mut scratch = Vec::new();
        let s = steer_boid(0, flock.positions(), flock.velocities(), &tree, &params, &mut scratch);
        assert_eq!(s.neighbors, 1);

        let pairs = steer(&mut flock, &tree, &params);
        // 0<->2, 1<->2
        assert_eq!(pairs, 4);
    }

    #[test]
    fn parallel_and_sequential_agree() {
        let params = SimulationParams::default();
        let sequential_params = SimulationParams {
            enable_parallel: false,
            ..params.clone()
        };
        let flock = Flock::spawn(400, 21, &params);
        let tree = tree_for(&flock, &params);

        let mut parallel = flock.clone();
        let mut sequential = flock;
        let p = steer(&mut parallel, &tree, &params);
        let s = steer(&mut sequential, &tree, &sequential_params);

        assert_eq!(p, s);
        assert_eq!(parallel.accelerations(), sequential.accelerations());
    }
}
