// Math utilities: the engine's 2D vector type and scalar helpers

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Mul, Neg, Sub, SubAssign};

/// Lengths below this are treated as zero by `normalize`
const NORMALIZE_EPSILON: f32 = 1e-6;

/// Clamp a value between min and max
pub fn clamp<T: PartialOrd>(value: T, min: T, max: T) -> T {
    if value < min {
        min
    } else if value > max {
        max
    } else {
        value
    }
}

/// Check if two f32 values are approximately equal
pub fn approx_equal(a: f32, b: f32, epsilon: f32) -> bool {
    (a - b).abs() < epsilon
}

/// 2D float vector used for positions, sizes, velocities and forces.
///
/// Positions are in pixels with y pointing down, matching screen space.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vector2 {
    pub x: f32,
    pub y: f32,
}

impl Vector2 {
    pub const ZERO: Vector2 = Vector2 { x: 0.0, y: 0.0 };
    pub const ONE: Vector2 = Vector2 { x: 1.0, y: 1.0 };
    /// Screen-space up (negative y)
    pub const UP: Vector2 = Vector2 { x: 0.0, y: -1.0 };
    pub const LEFT: Vector2 = Vector2 { x: -1.0, y: 0.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Length of the vector
    pub fn magnitude(&self) -> f32 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    /// Unit vector pointing the same way.
    ///
    /// The zero vector (and anything whose length is not a finite, non-zero
    /// number) normalizes to `Vector2::ZERO`. Use [`Vector2::try_normalize`]
    /// to tell the two cases apart.
    pub fn normalize(&self) -> Vector2 {
        self.try_normalize().unwrap_or(Vector2::ZERO)
    }

    /// Unit vector pointing the same way, or `None` for a zero-length vector
    pub fn try_normalize(&self) -> Option<Vector2> {
        let len = self.magnitude();
        if !len.is_finite() || len < NORMALIZE_EPSILON {
            return None;
        }
        Some(Vector2::new(self.x / len, self.y / len))
    }

    pub fn dot(&self, other: Vector2) -> f32 {
        self.x * other.x + self.y * other.y
    }

    /// Distance between two points
    pub fn distance(a: Vector2, b: Vector2) -> f32 {
        (a - b).magnitude()
    }

    /// Angle between two vectors in degrees, in the range 0..=180.
    /// Returns 0 when either vector has zero length.
    pub fn angle(a: Vector2, b: Vector2) -> f32 {
        let denom = a.magnitude() * b.magnitude();
        if denom < NORMALIZE_EPSILON {
            return 0.0;
        }
        let cos = clamp(a.dot(b) / denom, -1.0, 1.0);
        cos.acos().to_degrees()
    }

    /// Component-wise product
    pub fn scaled(&self, other: Vector2) -> Vector2 {
        Vector2::new(self.x * other.x, self.y * other.y)
    }

    pub fn approx_eq(&self, other: Vector2, epsilon: f32) -> bool {
        approx_equal(self.x, other.x, epsilon) && approx_equal(self.y, other.y, epsilon)
    }
}

impl Add for Vector2 {
    type Output = Vector2;

    fn add(self, rhs: Vector2) -> Vector2 {
        Vector2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign for Vector2 {
    fn add_assign(&mut self, rhs: Vector2) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl Sub for Vector2 {
    type Output = Vector2;

    fn sub(self, rhs: Vector2) -> Vector2 {
        Vector2::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl SubAssign for Vector2 {
    fn sub_assign(&mut self, rhs: Vector2) {
        self.x -= rhs.x;
        self.y -= rhs.y;
    }
}

impl Neg for Vector2 {
    type Output = Vector2;

    fn neg(self) -> Vector2 {
        Vector2::new(-self.x, -self.y)
    }
}

impl Mul<f32> for Vector2 {
    type Output = Vector2;

    fn mul(self, rhs: f32) -> Vector2 {
        Vector2::new(self.x * rhs, self.y * rhs)
    }
}

impl fmt::Display for Vector2 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})", self.x, self.y)
    }
}

impl From<glam::Vec2> for Vector2 {
    fn from(v: glam::Vec2) -> Self {
        Vector2::new(v.x, v.y)
    }
}

impl From<Vector2> for glam::Vec2 {
    fn from(v: Vector2) -> Self {
        glam::Vec2::new(v.x, v.y)
    }
}

impl From<(f32, f32)> for Vector2 {
    fn from((x, y): (f32, f32)) -> Self {
        Vector2::new(x, y)
    }
}
