//! 2D vector value type for planar physics.

use core::ops::{Add, AddAssign, Mul, Neg, Sub, SubAssign};

use crate::error::{PhysicsError, PhysicsResult};

/// Per-component tolerance used by `Vector` equality.
pub const EPSILON: f64 = 1e-10;

/// Returns true when `a` and `b` differ by less than [`EPSILON`].
pub fn almost_equal(a: f64, b: f64) -> bool {
    libm::fabs(b - a) < EPSILON
}

/// 2D vector in world units (meters).
///
/// A plain value: every operation returns a new `Vector`. Equality is
/// epsilon-tolerant per component, so points produced by float arithmetic
/// compare equal when they land on the same spot.
#[derive(Copy, Clone, Debug, Default)]
pub struct Vector {
    pub x: f64,
    pub y: f64,
}

impl Vector {
    /// Create a new vector.
    pub const fn new(x: f64, y: f64) -> Self {
        Vector { x, y }
    }

    /// Additive identity.
    pub const fn zero() -> Self {
        Vector { x: 0.0, y: 0.0 }
    }

    /// Dot product. Also available as `a * b`.
    pub fn dot(self, other: Self) -> f64 {
        self.x * other.x + self.y * other.y
    }

    /// Squared length (avoids sqrt).
    pub fn magnitude_sq(self) -> f64 {
        self.dot(self)
    }

    /// Length.
    pub fn magnitude(self) -> f64 {
        libm::sqrt(self.magnitude_sq())
    }

    /// Scale both components by `s`.
    pub fn scale(self, s: f64) -> Self {
        Vector { x: self.x * s, y: self.y * s }
    }

    /// Divide both components by `divisor`, failing on an exact zero.
    pub fn checked_div(self, divisor: f64) -> PhysicsResult<Self> {
        if divisor == 0.0 {
            return Err(PhysicsError::DivisionByZero);
        }
        Ok(Vector { x: self.x / divisor, y: self.y / divisor })
    }

    /// Distance between two points.
    pub fn distance(self, other: Self) -> f64 {
        (self - other).magnitude()
    }

    /// Projection of `self` onto `onto`: `(self·u / u·u) * u`.
    ///
    /// Projecting onto the zero vector yields the zero vector.
    pub fn proj_onto(self, onto: Self) -> Self {
        let denom = onto.magnitude_sq();
        if denom == 0.0 {
            return Vector::zero();
        }
        onto.scale(self.dot(onto) / denom)
    }

    /// Cosine of the angle between `self` and `other`. Zero when either is the zero vector.
    pub fn cos_angle(self, other: Self) -> f64 {
        let denom = self.magnitude() * other.magnitude();
        if denom == 0.0 {
            return 0.0;
        }
        self.dot(other) / denom
    }

    /// Unit vector in the same direction, or zero if the length is near zero.
    pub fn normalize(self) -> Self {
        let len = self.magnitude();
        if len < EPSILON {
            Vector::zero()
        } else {
            self.scale(1.0 / len)
        }
    }

    /// Perpendicular vector (rotated 90 degrees counter-clockwise).
    pub fn perp(self) -> Self {
        Vector { x: -self.y, y: self.x }
    }

    /// 2D cross product (returns scalar).
    pub fn cross(self, other: Self) -> f64 {
        self.x * other.y - self.y * other.x
    }

    /// True when both components are finite.
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    /// Components as a tuple.
    pub fn to_tuple(self) -> (f64, f64) {
        (self.x, self.y)
    }
}

impl PartialEq for Vector {
    fn eq(&self, other: &Self) -> bool {
        almost_equal(self.x, other.x) && almost_equal(self.y, other.y)
    }
}

impl From<(f64, f64)> for Vector {
    fn from((x, y): (f64, f64)) -> Self {
        Vector { x, y }
    }
}

impl Add for Vector {
    type Output = Self;
    fn add(self, rhs: Self) -> Self { Vector { x: self.x + rhs.x, y: self.y + rhs.y } }
}

impl Sub for Vector {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self { Vector { x: self.x - rhs.x, y: self.y - rhs.y } }
}

impl Neg for Vector {
    type Output = Self;
    fn neg(self) -> Self { Vector { x: -self.x, y: -self.y } }
}

impl AddAssign for Vector {
    fn add_assign(&mut self, rhs: Self) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl SubAssign for Vector {
    fn sub_assign(&mut self, rhs: Self) {
        self.x -= rhs.x;
        self.y -= rhs.y;
    }
}

impl Mul<f64> for Vector {
    type Output = Self;
    fn mul(self, rhs: f64) -> Self { self.scale(rhs) }
}

impl Mul<Vector> for f64 {
    type Output = Vector;
    fn mul(self, rhs: Vector) -> Vector { rhs.scale(self) }
}

/// `a * b` between two vectors is the dot product.
impl Mul for Vector {
    type Output = f64;
    fn mul(self, rhs: Self) -> f64 { self.dot(rhs) }
}
