/*
 * Error Module
 *
 * Errors surfaced by parameter validation, configuration loading and the
 * per-tick pipeline.
 */

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{name} must be greater than zero (got {value})")]
    NonPositive { name: &'static str, value: f32 },

    #[error("{name} must be finite (got {value})")]
    NonFinite { name: &'static str, value: f32 },

    #[error("{name} must not be negative (got {value})")]
    Negative { name: &'static str, value: f32 },

    #[error("spawn speed range is empty: min {min} > max {max}")]
    SpawnSpeedRange { min: f32, max: f32 },

    #[error("{name} must be at least 1")]
    ZeroCount { name: &'static str },

    #[error("failed to read config file {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config")]
    Parse(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum SimulationError {
    /// An agent sat outside the world when the index was built. The boundary
    /// step is required to keep every position inside the world, so this is
    /// an invariant failure rather than a dropped agent.
    #[error("boid {id} at ({x}, {y}) is outside the world bounds")]
    OutOfBounds { id: usize, x: f32, y: f32 },

    #[error(transparent)]
    Config(#[from] ConfigError),
}
