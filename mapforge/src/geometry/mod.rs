//! Planar geometry kernel
//!
//! Provides the point algebra, convex hull, and minimum-area bounding
//! rectangle used to fit a map frame to arbitrary point data. All
//! coordinates are plain `f64` pairs in whatever space the caller works in
//! (geographic degrees or projected metres); the kernel never reprojects.

mod calipers;
mod hull;

pub use calipers::{minimum_bounding_box, OrientedRect};
pub use hull::convex_hull;

/// A point (or free vector) in 2D space.
///
/// Immutable value type; all operations return new points.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn add(self, other: Point) -> Point {
        Point::new(self.x + other.x, self.y + other.y)
    }

    pub fn sub(self, other: Point) -> Point {
        Point::new(self.x - other.x, self.y - other.y)
    }

    pub fn scale(self, factor: f64) -> Point {
        Point::new(self.x * factor, self.y * factor)
    }

    pub fn dot(self, other: Point) -> f64 {
        self.x * other.x + self.y * other.y
    }

    /// Z component of the cross product, treating both points as vectors.
    ///
    /// Positive when `other` lies counter-clockwise of `self`.
    pub fn cross(self, other: Point) -> f64 {
        self.x * other.y - self.y * other.x
    }

    pub fn norm(self) -> f64 {
        self.dot(self).sqrt()
    }

    /// Scalar projection onto the direction of `other`.
    pub fn project(self, other: Point) -> f64 {
        self.dot(other) / other.norm()
    }

    /// Rotate counter-clockwise by `angle` radians about the origin.
    pub fn rotate(self, angle: f64) -> Point {
        let (sin, cos) = angle.sin_cos();
        Point::new(self.x * cos - self.y * sin, self.x * sin + self.y * cos)
    }
}

impl From<(f64, f64)> for Point {
    fn from((x, y): (f64, f64)) -> Self {
        Point::new(x, y)
    }
}

/// An axis-aligned envelope, `min` at the south-west corner.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GeoBounds {
    pub min: Point,
    pub max: Point,
}

impl GeoBounds {
    pub fn new(min: Point, max: Point) -> Self {
        Self { min, max }
    }

    /// The smallest envelope containing every given point.
    ///
    /// Returns `None` for an empty slice.
    pub fn around(points: &[Point]) -> Option<Self> {
        let first = *points.first()?;
        let mut bounds = Self::new(first, first);
        for p in &points[1..] {
            bounds.min = Point::new(bounds.min.x.min(p.x), bounds.min.y.min(p.y));
            bounds.max = Point::new(bounds.max.x.max(p.x), bounds.max.y.max(p.y));
        }
        Some(bounds)
    }

    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> f64 {
        self.max.y - self.min.y
    }

    pub fn centre(&self) -> Point {
        self.min.add(self.max).scale(0.5)
    }

    /// Corners in product order: (min,min), (min,max), (max,min), (max,max).
    pub fn corners(&self) -> [Point; 4] {
        [
            Point::new(self.min.x, self.min.y),
            Point::new(self.min.x, self.max.y),
            Point::new(self.max.x, self.min.y),
            Point::new(self.max.x, self.max.y),
        ]
    }

    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }

    pub fn intersects(&self, other: &GeoBounds) -> bool {
        self.min.x < other.max.x
            && self.max.x > other.min.x
            && self.min.y < other.max.y
            && self.max.y > other.min.y
    }

    /// Union of two envelopes.
    pub fn merge(&self, other: &GeoBounds) -> GeoBounds {
        GeoBounds::new(
            Point::new(self.min.x.min(other.min.x), self.min.y.min(other.min.y)),
            Point::new(self.max.x.max(other.max.x), self.max.y.max(other.max.y)),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn test_vector_algebra() {
        let a = Point::new(3.0, 4.0);
        let b = Point::new(1.0, -2.0);

        assert_eq!(a.add(b), Point::new(4.0, 2.0));
        assert_eq!(a.sub(b), Point::new(2.0, 6.0));
        assert_relative_eq!(a.dot(b), -5.0);
        assert_relative_eq!(a.norm(), 5.0);
        assert_relative_eq!(a.cross(b), -10.0);
    }

    #[test]
    fn test_rotate_quarter_turn() {
        let p = Point::new(1.0, 0.0).rotate(FRAC_PI_2);
        assert_relative_eq!(p.x, 0.0, epsilon = 1e-12);
        assert_relative_eq!(p.y, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_rotate_roundtrip() {
        let p = Point::new(2.5, -7.1);
        let q = p.rotate(0.3).rotate(-0.3);
        assert_relative_eq!(q.x, p.x, epsilon = 1e-12);
        assert_relative_eq!(q.y, p.y, epsilon = 1e-12);
    }

    #[test]
    fn test_projection_onto_axis() {
        let p = Point::new(3.0, 4.0);
        assert_relative_eq!(p.project(Point::new(10.0, 0.0)), 3.0);
        assert_relative_eq!(p.project(Point::new(0.0, 2.0)), 4.0);
    }
}
