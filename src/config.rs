//! Configuration types for the physics environment.

use crate::error::{PhysicsError, PhysicsResult};
use crate::vector::Vector;

/// Configuration for an [`Environment`](crate::Environment).
///
/// # Builder Pattern
/// ```
/// use girder::config::EnvironmentConfig;
///
/// let config = EnvironmentConfig::new()
///     .with_gravity(5.0)
///     .with_pixels_per_meter(50.0)
///     .with_origin(0.0, 500.0)
///     .with_resolve_iterations(8);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct EnvironmentConfig {
    /// Gravitational acceleration in m/s², pulling toward -y. Default: 9.8.
    pub gravity: f64,
    /// Screen scale. Default: 50.
    pub pixels_per_meter: f64,
    /// World origin in screen pixels. Default: (0, 0).
    pub origin: Vector,
    /// Collision + relaxation passes per tick. Default: 5.
    pub resolve_iterations: usize,
    /// Collision half-thickness of collidable constraints, in meters. Default: 0.05.
    pub beam_half_width: f64,
    /// Mass of nodes created by the build factory. Default: 10.
    pub node_mass: f64,
    /// Mass of dropped weights. Default: 100.
    pub weight_mass: f64,
    /// Radius of dropped weights, in meters. Default: 0.3.
    pub weight_radius: f64,
    /// Share of a weight–beam overlap taken by the weight. Default: 0.5.
    pub collision_softness: f64,
    /// Break ratio of constraints created by the build factory. Default: 0.05.
    pub break_ratio: f64,
    /// Longest Beam or Bed the build factory accepts, in meters. Default: 3.
    pub max_beam_length: f64,
    /// Click tolerance for picking, in pixels. Default: 10.
    pub pick_radius_px: f64,
}

impl EnvironmentConfig {
    /// Create a new config with default values.
    pub fn new() -> Self {
        EnvironmentConfig {
            gravity: 9.8,
            pixels_per_meter: 50.0,
            origin: Vector::zero(),
            resolve_iterations: 5,
            beam_half_width: 0.05,
            node_mass: 10.0,
            weight_mass: 100.0,
            weight_radius: 0.3,
            collision_softness: 0.5,
            break_ratio: 0.05,
            max_beam_length: 3.0,
            pick_radius_px: 10.0,
        }
    }

    pub fn with_gravity(mut self, gravity: f64) -> Self {
        self.gravity = gravity;
        self
    }

    pub fn with_pixels_per_meter(mut self, pixels_per_meter: f64) -> Self {
        self.pixels_per_meter = pixels_per_meter;
        self
    }

    pub fn with_origin(mut self, x: f64, y: f64) -> Self {
        self.origin = Vector::new(x, y);
        self
    }

    pub fn with_resolve_iterations(mut self, iterations: usize) -> Self {
        self.resolve_iterations = iterations;
        self
    }

    pub fn with_beam_half_width(mut self, half_width: f64) -> Self {
        self.beam_half_width = half_width;
        self
    }

    pub fn with_node_mass(mut self, mass: f64) -> Self {
        self.node_mass = mass;
        self
    }

    /// Set the mass and radius of dropped weights.
    pub fn with_weight(mut self, mass: f64, radius: f64) -> Self {
        self.weight_mass = mass;
        self.weight_radius = radius;
        self
    }

    pub fn with_collision_softness(mut self, softness: f64) -> Self {
        self.collision_softness = softness;
        self
    }

    pub fn with_break_ratio(mut self, break_ratio: f64) -> Self {
        self.break_ratio = break_ratio;
        self
    }

    pub fn with_max_beam_length(mut self, length: f64) -> Self {
        self.max_beam_length = length;
        self
    }

    pub fn with_pick_radius(mut self, pixels: f64) -> Self {
        self.pick_radius_px = pixels;
        self
    }

    /// Check every field the simulation divides by or depends on.
    pub fn validate(&self) -> PhysicsResult<()> {
        if !(self.pixels_per_meter.is_finite() && self.pixels_per_meter > 0.0) {
            return Err(PhysicsError::InvalidScale(self.pixels_per_meter));
        }
        if self.resolve_iterations == 0 {
            return Err(PhysicsError::InvalidIterations);
        }
        if !is_positive(self.node_mass) {
            return Err(PhysicsError::InvalidMass(self.node_mass));
        }
        if !is_positive(self.weight_mass) {
            return Err(PhysicsError::InvalidMass(self.weight_mass));
        }
        if !is_positive(self.weight_radius) {
            return Err(PhysicsError::InvalidRadius(self.weight_radius));
        }
        if !(0.0..=1.0).contains(&self.collision_softness) {
            return Err(PhysicsError::InvalidSoftness(self.collision_softness));
        }
        if !is_positive(self.break_ratio) {
            return Err(PhysicsError::InvalidBreakRatio(self.break_ratio));
        }
        if !(self.beam_half_width.is_finite() && self.beam_half_width >= 0.0) {
            return Err(PhysicsError::InvalidRadius(self.beam_half_width));
        }
        Ok(())
    }
}

impl Default for EnvironmentConfig {
    fn default() -> Self {
        Self::new()
    }
}

pub(crate) fn is_positive(value: f64) -> bool {
    value.is_finite() && value > 0.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert_eq!(EnvironmentConfig::default().validate(), Ok(()));
        assert_eq!(EnvironmentConfig::new().resolve_iterations, 5);
    }

    #[test]
    fn rejects_bad_fields() {
        let zero_iterations = EnvironmentConfig::new().with_resolve_iterations(0);
        assert_eq!(zero_iterations.validate(), Err(PhysicsError::InvalidIterations));

        let soft = EnvironmentConfig::new().with_collision_softness(1.5);
        assert_eq!(soft.validate(), Err(PhysicsError::InvalidSoftness(1.5)));

        let flat = EnvironmentConfig::new().with_pixels_per_meter(-2.0);
        assert_eq!(flat.validate(), Err(PhysicsError::InvalidScale(-2.0)));
    }
}
