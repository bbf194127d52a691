/*
 * Simulation Parameters Module
 *
 * This module defines the SimulationParams struct that contains all the
 * adjustable parameters for the boid simulation. These parameters can be
 * replaced wholesale through `Simulation::configure` or nudged one step at a
 * time through `Tunable`, and every change goes through `validate` first.
 */

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// What happens when a boid reaches the edge of the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoundaryPolicy {
    /// Toroidal world: leaving one edge re-enters at the opposite edge.
    Wrap,
    /// Boids near an edge are pushed back inward by `boundary_force`.
    Bounce,
}

/// How the separation steering vector is sized after subtracting the
/// current velocity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeparationMagnitude {
    /// Always exactly `max_force`, even when the raw steer is shorter.
    Exact,
    /// Scaled down to `max_force` only when longer, like the other two rules.
    Clamp,
}

/// Divisor applied to the weighted sum of the three rule forces.
pub const DEFAULT_RULE_DIVISOR: f32 = 3.0;

// Parameters for the simulation that can be adjusted via UI
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationParams {
    pub cohesion_factor: f32,
    pub alignment_factor: f32,
    pub separation_factor: f32,
    /// Half extent of the square neighbor window around each boid.
    pub neighborhood_range: f32,
    pub max_force: f32,
    pub max_speed: f32,
    pub world_width: f32,
    pub world_height: f32,
    pub boundary_policy: BoundaryPolicy,
    // Bounce-only settings
    pub boundary_margin: f32,
    pub boundary_force: f32,
    pub rule_divisor: f32,
    pub separation_magnitude: SeparationMagnitude,
    // Initial velocity distribution for spawn
    pub spawn_speed_min: f32,
    pub spawn_speed_max: f32,
    // Performance settings
    pub enable_parallel: bool,
}

impl Default for SimulationParams {
    fn default() -> Self {
        Self {
            cohesion_factor: 0.9,
            alignment_factor: 1.0,
            separation_factor: 1.2,
            neighborhood_range: 75.0,
            max_force: 1.0,
            max_speed: 4.0,
            world_width: 1440.0,
            world_height: 900.0,
            boundary_policy: BoundaryPolicy::Wrap,
            boundary_margin: 50.0,
            boundary_force: 0.2,
            rule_divisor: DEFAULT_RULE_DIVISOR,
            separation_magnitude: SeparationMagnitude::Exact,
            spawn_speed_min: 0.0,
            spawn_speed_max: 1.0,
            enable_parallel: true,
        }
    }
}

impl SimulationParams {
    /// Reject values that would leave steering direction or world bounds
    /// undefined.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [
            ("cohesion_factor", self.cohesion_factor),
            ("alignment_factor", self.alignment_factor),
            ("separation_factor", self.separation_factor),
            ("boundary_force", self.boundary_force),
        ] {
            finite(name, value)?;
        }

        for (name, value) in [
            ("neighborhood_range", self.neighborhood_range),
            ("max_force", self.max_force),
            ("max_speed", self.max_speed),
            ("world_width", self.world_width),
            ("world_height", self.world_height),
            ("rule_divisor", self.rule_divisor),
        ] {
            positive(name, value)?;
        }

        for (name, value) in [
            ("boundary_margin", self.boundary_margin),
            ("spawn_speed_min", self.spawn_speed_min),
            ("spawn_speed_max", self.spawn_speed_max),
        ] {
            finite(name, value)?;
            if value < 0.0 {
                return Err(ConfigError::Negative { name, value });
            }
        }

        if self.spawn_speed_min > self.spawn_speed_max {
            return Err(ConfigError::SpawnSpeedRange {
                min: self.spawn_speed_min,
                max: self.spawn_speed_max,
            });
        }

        Ok(())
    }

    /// Return a copy with `tunable` moved one step in `direction`.
    pub fn nudged(&self, tunable: Tunable, direction: Nudge) -> Self {
        let mut next = self.clone();
        let delta = tunable.step() * direction.sign();
        *next.field_mut(tunable) += delta;
        next
    }

    pub fn get(&self, tunable: Tunable) -> f32 {
        match tunable {
            Tunable::Cohesion => self.cohesion_factor,
            Tunable::Alignment => self.alignment_factor,
            Tunable::Separation => self.separation_factor,
            Tunable::NeighborhoodRange => self.neighborhood_range,
            Tunable::MaxSpeed => self.max_speed,
        }
    }

    fn field_mut(&mut self, tunable: Tunable) -> &mut f32 {
        match tunable {
            Tunable::Cohesion => &mut self.cohesion_factor,
            Tunable::Alignment => &mut self.alignment_factor,
            Tunable::Separation => &mut self.separation_factor,
            Tunable::NeighborhoodRange => &mut self.neighborhood_range,
            Tunable::MaxSpeed => &mut self.max_speed,
        }
    }

    // Get parameter ranges for UI sliders
    pub fn get_weight_range() -> std::ops::RangeInclusive<f32> {
        -1.0..=3.0
    }

    pub fn get_range_range() -> std::ops::RangeInclusive<f32> {
        5.0..=300.0
    }

    pub fn get_max_speed_range() -> std::ops::RangeInclusive<f32> {
        0.1..=20.0
    }

    pub fn get_max_force_range() -> std::ops::RangeInclusive<f32> {
        0.01..=5.0
    }

    pub fn get_boundary_margin_range() -> std::ops::RangeInclusive<f32> {
        0.0..=200.0
    }

    pub fn get_boundary_force_range() -> std::ops::RangeInclusive<f32> {
        0.0..=2.0
    }
}

/// Parameters the input layer can nudge up or down between ticks.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Tunable {
    Cohesion,
    Alignment,
    Separation,
    NeighborhoodRange,
    MaxSpeed,
}

impl Tunable {
    pub const ALL: [Tunable; 5] = [
        Tunable::Cohesion,
        Tunable::Alignment,
        Tunable::Separation,
        Tunable::NeighborhoodRange,
        Tunable::MaxSpeed,
    ];

    /// Size of one nudge.
    pub fn step(self) -> f32 {
        match self {
            Tunable::NeighborhoodRange => 1.0,
            _ => 0.1,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Tunable::Cohesion => "Cohesion Factor",
            Tunable::Alignment => "Alignment Factor",
            Tunable::Separation => "Separation Factor",
            Tunable::NeighborhoodRange => "Neighborhood Range",
            Tunable::MaxSpeed => "Max Speed",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Nudge {
    Up,
    Down,
}

impl Nudge {
    fn sign(self) -> f32 {
        match self {
            Nudge::Up => 1.0,
            Nudge::Down => -1.0,
        }
    }
}

fn finite(name: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::NonFinite { name, value })
    }
}

fn positive(name: &'static str, value: f32) -> Result<(), ConfigError> {
    finite(name, value)?;
    if value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NonPositive { name, value })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        SimulationParams::default().validate().unwrap();
    }

    #[test]
    fn rejects_non_positive_bounds_and_limits() {
        let cases: [(&str, fn(&mut SimulationParams)); 5] = [
            ("max_speed", |p| p.max_speed = 0.0),
            ("max_force", |p| p.max_force = -1.0),
            ("neighborhood_range", |p| p.neighborhood_range = 0.0),
            ("world_width", |p| p.world_width = 0.0),
            ("world_height", |p| p.world_height = -10.0),
        ];

        for (field, mutate) in cases {
            let mut params = SimulationParams::default();
            mutate(&mut params);
            match params.validate() {
                Err(ConfigError::NonPositive { name, .. }) => assert_eq!(name, field),
                other => panic!("{field}: expected NonPositive, got {other:?}"),
            }
        }
    }

    #[test]
    fn negative_weights_are_allowed_but_nan_is_not() {
        let mut params = SimulationParams {
            cohesion_factor: -0.5,
            ..SimulationParams::default()
        };
        params.validate().unwrap();

        params.alignment_factor = f32::NAN;
        assert!(matches!(
            params.validate(),
            Err(ConfigError::NonFinite { name: "alignment_factor", .. })
        ));
    }

    #[test]
    fn rejects_inverted_spawn_speed_range() {
        let params = SimulationParams {
            spawn_speed_min: 2.0,
            spawn_speed_max: 1.0,
            ..SimulationParams::default()
        };
        assert!(matches!(
            params.validate(),
            Err(ConfigError::SpawnSpeedRange { .. })
        ));
    }

    #[test]
    fn nudge_moves_one_step() {
        let params = SimulationParams::default();
        let up = params.nudged(Tunable::NeighborhoodRange, Nudge::Up);
        assert_eq!(up.neighborhood_range, 76.0);

        let down = params.nudged(Tunable::Cohesion, Nudge::Down);
        assert!((down.cohesion_factor - 0.8).abs() < 1e-6);
        assert_eq!(down.get(Tunable::Alignment), params.alignment_factor);
    }

    #[test]
    fn policy_names_round_trip_through_json() {
        let json = r#"{"boundary_policy": "bounce", "separation_magnitude": "clamp"}"#;
        let params: SimulationParams = serde_json::from_str(json).unwrap();
        assert_eq!(params.boundary_policy, BoundaryPolicy::Bounce);
        assert_eq!(params.separation_magnitude, SeparationMagnitude::Clamp);
        assert_eq!(params.max_speed, 4.0);
    }
}
