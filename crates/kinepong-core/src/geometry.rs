//! 2D geometry primitives
//!
//! Camera space is normalized (nominally [0,1] on both axes, y increasing
//! downward). World space is the game's pixel-like coordinate system.

use std::fmt;
use std::ops::{Add, Mul, Sub};

/// 2D point (normalized camera space or world space)
#[derive(Clone, Copy, PartialEq, Default)]
pub struct Point2 {
    pub x: f32,
    pub y: f32,
}

/// A point in game-world coordinates
pub type WorldPoint = Point2;

impl Point2 {
    pub const ZERO: Point2 = Point2 { x: 0.0, y: 0.0 };

    #[inline]
    pub fn new(x: f32, y: f32) -> Self {
        Point2 { x, y }
    }

    /// Clamp each axis independently
    #[inline]
    pub fn clamp(self, min: Point2, max: Point2) -> Point2 {
        Point2 {
            x: self.x.clamp(min.x, max.x),
            y: self.y.clamp(min.y, max.y),
        }
    }

    /// Clamp both axes to [0, 1]
    #[inline]
    pub fn clamp_unit(self) -> Point2 {
        self.clamp(Point2::ZERO, Point2::new(1.0, 1.0))
    }

    /// Linear interpolation toward `other`
    #[inline]
    pub fn lerp(self, other: Point2, t: f32) -> Point2 {
        Point2 {
            x: self.x + (other.x - self.x) * t,
            y: self.y + (other.y - self.y) * t,
        }
    }

    pub fn length(self) -> f32 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    /// Unit vector in the same direction; zero stays zero
    pub fn normalized(self) -> Point2 {
        let len = self.length();
        if len < f32::EPSILON {
            return Point2::ZERO;
        }
        Point2::new(self.x / len, self.y / len)
    }

    /// Rotate counter-clockwise by `angle` radians
    pub fn rotated(self, angle: f32) -> Point2 {
        let (sin, cos) = angle.sin_cos();
        Point2::new(self.x * cos - self.y * sin, self.x * sin + self.y * cos)
    }
}

impl Add for Point2 {
    type Output = Point2;

    #[inline]
    fn add(self, rhs: Point2) -> Point2 {
        Point2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Point2 {
    type Output = Point2;

    #[inline]
    fn sub(self, rhs: Point2) -> Point2 {
        Point2::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f32> for Point2 {
    type Output = Point2;

    #[inline]
    fn mul(self, rhs: f32) -> Point2 {
        Point2::new(self.x * rhs, self.y * rhs)
    }
}

impl fmt::Debug for Point2 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.2}, {:.2})", self.x, self.y)
    }
}

impl fmt::Display for Point2 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.1}, {:.1})", self.x, self.y)
    }
}

/// Axis-aligned rectangle given by its top-left corner and size
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rect2 {
    pub origin: Point2,
    pub size: Point2,
}

impl Rect2 {
    pub fn new(origin: Point2, size: Point2) -> Self {
        Rect2 { origin, size }
    }

    /// Rectangle centred on `center` with the given half extents
    pub fn centered(center: Point2, half_extents: Point2) -> Self {
        Rect2 {
            origin: center - half_extents,
            size: half_extents * 2.0,
        }
    }

    /// Strict overlap test; touching edges do not intersect
    pub fn intersects(&self, other: &Rect2) -> bool {
        self.origin.x < other.origin.x + other.size.x
            && other.origin.x < self.origin.x + self.size.x
            && self.origin.y < other.origin.y + other.size.y
            && other.origin.y < self.origin.y + self.size.y
    }
}
