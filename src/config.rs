/*
 * Run Configuration Module
 *
 * Settings for one run of the viewer: how many boids to spawn, the seed,
 * the fixed simulation rate, and the starting simulation parameters. Loaded
 * from a JSON file; every field is optional and falls back to its default.
 */

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::ConfigError;
use crate::params::SimulationParams;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    pub boid_count: usize,
    /// Fixed seed for a reproducible run; a random one is drawn when absent.
    pub seed: Option<u64>,
    /// Simulation ticks per second, independent of the render rate.
    pub ticks_per_second: f32,
    /// Upper bound on catch-up ticks in a single frame.
    pub max_ticks_per_frame: usize,
    pub params: SimulationParams,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            boid_count: 200,
            seed: None,
            ticks_per_second: 60.0,
            max_ticks_per_frame: 4,
            params: SimulationParams::default(),
        }
    }
}

impl RunConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: RunConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.ticks_per_second.is_finite() && self.ticks_per_second > 0.0) {
            return Err(ConfigError::NonPositive {
                name: "ticks_per_second",
                value: self.ticks_per_second,
            });
        }
        if self.max_ticks_per_frame == 0 {
            return Err(ConfigError::ZeroCount {
                name: "max_ticks_per_frame",
            });
        }
        self.params.validate()
    }

    /// The configured seed, or a fresh random one.
    pub fn seed_or_random(&self) -> u64 {
        self.seed.unwrap_or_else(rand::random)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::BoundaryPolicy;

    #[test]
    fn empty_object_gives_defaults() {
        let config = RunConfig::from_json_str("{}").unwrap();
        assert_eq!(config, RunConfig::default());
    }

    #[test]
    fn partial_params_keep_other_defaults() {
        let json = r#"{
            "boid_count": 1000,
            "seed": 42,
            "params": { "neighborhood_range": 40.0, "boundary_policy": "bounce" }
        }"#;
        let config = RunConfig::from_json_str(json).unwrap();

        assert_eq!(config.boid_count, 1000);
        assert_eq!(config.seed_or_random(), 42);
        assert_eq!(config.params.neighborhood_range, 40.0);
        assert_eq!(config.params.boundary_policy, BoundaryPolicy::Bounce);
        assert_eq!(config.params.max_force, SimulationParams::default().max_force);
    }

    #[test]
    fn invalid_values_are_rejected() {
        let bad_rate = r#"{ "ticks_per_second": 0 }"#;
        assert!(matches!(
            RunConfig::from_json_str(bad_rate),
            Err(ConfigError::NonPositive { name: "ticks_per_second", .. })
        ));

        let bad_params = r#"{ "params": { "max_speed": -2.0 } }"#;
        assert!(matches!(
            RunConfig::from_json_str(bad_params),
            Err(ConfigError::NonPositive { name: "max_speed", .. })
        ));

        assert!(matches!(
            RunConfig::from_json_str("not json"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn missing_file_reports_path() {
        let err = RunConfig::load("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
        assert!(err.to_string().contains("not/here.json"));
    }
}
