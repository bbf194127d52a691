/*
 * Vector Module
 *
 * Boid positions, velocities and steering forces are `glam::Vec2`, the same
 * type nannou re-exports for drawing. `SteerExt` adds the helpers the
 * steering rules lean on: `set_magnitude` (rescale to an exact length),
 * `limit` (scale down only when too long) and a `divide` that never
 * produces infinities.
 */

pub use glam::Vec2;

pub trait SteerExt {
    /// Normalize then scale to `m`. The zero vector has no direction and
    /// stays zero.
    fn set_magnitude(self, m: f32) -> Self;

    /// Scale down to `max` if longer, otherwise unchanged.
    fn limit(self, max: f32) -> Self;

    /// Component-wise division; dividing by zero yields the zero vector.
    fn divide(self, k: f32) -> Self;
}

impl SteerExt for Vec2 {
    #[inline]
    fn set_magnitude(self, m: f32) -> Self {
        self.normalize_or_zero() * m
    }

    #[inline]
    fn limit(self, max: f32) -> Self {
        self.clamp_length_max(max)
    }

    #[inline]
    fn divide(self, k: f32) -> Self {
        if k == 0.0 {
            return Vec2::ZERO;
        }
        self / k
    }
}

/// Unit vector pointing at `angle` radians.
pub fn from_angle(angle: f32) -> Vec2 {
    let (sin, cos) = angle.sin_cos();
    Vec2::new(cos, sin)
}
