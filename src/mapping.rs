//! Screen ↔ world coordinate mapping.
//!
//! Screen space is pixels with y growing downward from the top-left of the
//! view. World space is meters with y growing upward from `origin`.

use crate::error::{PhysicsError, PhysicsResult};
use crate::vector::Vector;

/// Affine mapping between screen pixels and world meters.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ScreenMapping {
    pixels_per_meter: f64,
    origin: Vector,
}

impl ScreenMapping {
    pub fn new(pixels_per_meter: f64, origin: Vector) -> PhysicsResult<Self> {
        if !(pixels_per_meter.is_finite() && pixels_per_meter > 0.0) {
            return Err(PhysicsError::InvalidScale(pixels_per_meter));
        }
        Ok(ScreenMapping { pixels_per_meter, origin })
    }

    pub fn pixels_per_meter(&self) -> f64 {
        self.pixels_per_meter
    }

    /// World origin in screen pixels.
    pub fn origin(&self) -> Vector {
        self.origin
    }

    /// `world = (screen - origin) / pixels_per_meter`, with y flipped.
    pub fn screen_to_world(&self, px: f64, py: f64) -> Vector {
        let shifted = Vector::new(px, py) - self.origin;
        let scaled = shifted.scale(1.0 / self.pixels_per_meter);
        Vector::new(scaled.x, -scaled.y)
    }

    pub fn world_to_screen(&self, position: Vector) -> (f64, f64) {
        let scaled = position.scale(self.pixels_per_meter);
        let flipped = Vector::new(scaled.x, -scaled.y);
        (flipped + self.origin).to_tuple()
    }

    /// Convert a pixel length to meters.
    pub fn to_world_length(&self, pixels: f64) -> f64 {
        pixels / self.pixels_per_meter
    }

    /// The world-space rectangle covered by a `width` × `height` pixel view.
    pub fn viewport(&self, width: f64, height: f64) -> Viewport {
        let top_left = self.screen_to_world(0.0, 0.0);
        let bottom_right = self.screen_to_world(width, height);
        Viewport {
            min: Vector::new(top_left.x, bottom_right.y),
            max: Vector::new(bottom_right.x, top_left.y),
        }
    }
}

/// Axis-aligned world-space rectangle.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Viewport {
    pub min: Vector,
    pub max: Vector,
}

impl Viewport {
    pub fn left(&self) -> f64 { self.min.x }
    pub fn right(&self) -> f64 { self.max.x }
    pub fn bottom(&self) -> f64 { self.min.y }
    pub fn top(&self) -> f64 { self.max.y }

    /// True when a circle lies entirely outside the rectangle.
    pub fn excludes_circle(&self, center: Vector, radius: f64) -> bool {
        center.x + radius < self.left()
            || center.x - radius > self.right()
            || center.y + radius < self.bottom()
            || center.y - radius > self.top()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mapping() -> ScreenMapping {
        ScreenMapping::new(100.0, Vector::new(0.0, 250.0)).unwrap()
    }

    #[test]
    fn world_to_screen_flips_y() {
        assert_eq!(mapping().world_to_screen(Vector::new(1.0, 1.5)), (100.0, 100.0));
    }

    #[test]
    fn screen_to_world_flips_y() {
        assert_eq!(mapping().screen_to_world(150.0, 175.0), Vector::new(1.5, 0.75));
    }

    #[test]
    fn rejects_non_positive_scale() {
        assert_eq!(
            ScreenMapping::new(0.0, Vector::zero()),
            Err(PhysicsError::InvalidScale(0.0))
        );
    }

    #[test]
    fn viewport_bounds() {
        let view = mapping().viewport(500.0, 250.0);
        assert_eq!(view.min, Vector::new(0.0, 0.0));
        assert_eq!(view.max, Vector::new(5.0, 2.5));
        assert_eq!((view.left(), view.right()), (0.0, 5.0));
        assert_eq!((view.bottom(), view.top()), (0.0, 2.5));
        assert!(view.excludes_circle(Vector::new(2.0, -0.5), 0.3));
        assert!(!view.excludes_circle(Vector::new(2.0, -0.2), 0.3));
    }
}
