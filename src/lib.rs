/*
 * Boid Flocking Simulation - Module Definitions
 *
 * This file defines the module structure for the boid simulation. The core
 * (vector math, flock store, quadtree, steering, integration and the
 * simulation driver) has no graphics dependencies; the nannou viewer
 * modules are compiled only with the `viewer` feature.
 */

// Re-export key components for easier access
pub use boid::{BoidState, Flock};
pub use config::RunConfig;
pub use error::{ConfigError, SimulationError};
pub use params::{BoundaryPolicy, Nudge, SeparationMagnitude, SimulationParams, Tunable};
pub use quadtree::{
    NodePool, PositionSource, QuadTree, Quadrant, Rect, DEFAULT_NODE_CAPACITY, MAX_DEPTH,
};
pub use simulation::{Simulation, Snapshot, TickStats};
pub use vector::{SteerExt, Vec2};

// Define modules
pub mod boid;
pub mod config;
pub mod error;
pub mod flocking;
pub mod params;
pub mod physics;
pub mod quadtree;
pub mod simulation;
pub mod vector;

#[cfg(feature = "viewer")]
pub mod app;
#[cfg(feature = "viewer")]
pub mod debug;
#[cfg(feature = "viewer")]
pub mod input;
#[cfg(feature = "viewer")]
pub mod renderer;
#[cfg(feature = "viewer")]
pub mod ui;

#[cfg(feature = "viewer")]
pub use app::Model;

// Constants
pub const BOID_SIZE: f32 = 10.0;
