//! Geometry types shared between the generator and the assembler.
//!
//! These are the canonical representations used in generated maps.

use bytemuck::{Pod, Zeroable};
use serde::{Deserialize, Serialize};

/// 2D point in map space.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable, Serialize, Deserialize)]
pub struct Point {
    /// X component
    pub x: f64,
    /// Y component
    pub y: f64,
}

impl Point {
    /// Creates a new point
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Origin
    pub const ZERO: Self = Self::new(0.0, 0.0);

    /// Converts to array
    #[must_use]
    pub const fn to_array(self) -> [f64; 2] {
        [self.x, self.y]
    }

    /// Dot product
    #[must_use]
    pub fn dot(self, other: Self) -> f64 {
        self.x * other.x + self.y * other.y
    }

    /// Length squared (avoids sqrt)
    #[must_use]
    pub fn length_squared(self) -> f64 {
        self.dot(self)
    }

    /// Length
    #[must_use]
    pub fn length(self) -> f64 {
        self.length_squared().sqrt()
    }

    /// Distance to another point
    #[must_use]
    pub fn distance(self, other: Self) -> f64 {
        (self - other).length()
    }

    /// Distance squared (avoids sqrt)
    #[must_use]
    pub fn distance_squared(self, other: Self) -> f64 {
        (self - other).length_squared()
    }

    /// Midpoint between two points
    #[must_use]
    pub fn midpoint(self, other: Self) -> Self {
        Self::new((self.x + other.x) * 0.5, (self.y + other.y) * 0.5)
    }

    /// Unit vector in the same direction, or zero for the zero vector.
    #[must_use]
    pub fn normalized(self) -> Self {
        let len = self.length();
        if len > f64::EPSILON {
            self * (1.0 / len)
        } else {
            Self::ZERO
        }
    }

    /// Counter-clockwise perpendicular `(-y, x)`.
    #[must_use]
    pub const fn perpendicular(self) -> Self {
        Self::new(-self.y, self.x)
    }

    /// Returns true when both components are finite.
    #[must_use]
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl std::ops::Add for Point {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl std::ops::Sub for Point {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl std::ops::Mul<f64> for Point {
    type Output = Self;
    fn mul(self, rhs: f64) -> Self {
        Self::new(self.x * rhs, self.y * rhs)
    }
}

/// Width/height pair.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Size {
    /// Width
    pub width: f64,
    /// Height
    pub height: f64,
}

impl Size {
    /// Creates a new size
    #[must_use]
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// Axis-aligned rectangle, origin at the top-left corner.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    /// Left edge
    pub x: f64,
    /// Top edge
    pub y: f64,
    /// Width
    pub width: f64,
    /// Height
    pub height: f64,
}

impl Rect {
    /// Creates a new rectangle
    #[must_use]
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Axis-aligned bounding box of a point set. Empty input gives a
    /// zero-sized rectangle at the origin.
    #[must_use]
    pub fn bounding(points: &[Point]) -> Self {
        let Some(first) = points.first() else {
            return Self::default();
        };
        let (mut min_x, mut min_y, mut max_x, mut max_y) = (first.x, first.y, first.x, first.y);
        for p in &points[1..] {
            min_x = min_x.min(p.x);
            min_y = min_y.min(p.y);
            max_x = max_x.max(p.x);
            max_y = max_y.max(p.y);
        }
        Self::new(min_x, min_y, max_x - min_x, max_y - min_y)
    }

    /// Right edge
    #[must_use]
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    /// Bottom edge
    #[must_use]
    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// Area
    #[must_use]
    pub fn area(&self) -> f64 {
        self.width * self.height
    }

    /// Center point
    #[must_use]
    pub fn center(&self) -> Point {
        Point::new(self.x + self.width * 0.5, self.y + self.height * 0.5)
    }

    /// Size of the rectangle
    #[must_use]
    pub const fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    /// Returns true if the point lies inside (edges inclusive).
    #[must_use]
    pub fn contains_point(&self, p: Point) -> bool {
        p.x >= self.x && p.x <= self.right() && p.y >= self.y && p.y <= self.bottom()
    }

    /// Returns true if `other` lies entirely inside this rectangle.
    ///
    /// A tolerance of `1e-9` absorbs floating point drift from splitting.
    #[must_use]
    pub fn contains_rect(&self, other: &Self) -> bool {
        const EPS: f64 = 1e-9;
        other.x >= self.x - EPS
            && other.y >= self.y - EPS
            && other.right() <= self.right() + EPS
            && other.bottom() <= self.bottom() + EPS
    }

    /// Returns true if the interiors intersect. Shared edges do not count.
    #[must_use]
    pub fn overlaps(&self, other: &Self) -> bool {
        self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }

    /// Shrinks every side by `amount`, never below zero size.
    #[must_use]
    pub fn inset(&self, amount: f64) -> Self {
        let width = (self.width - amount * 2.0).max(0.0);
        let height = (self.height - amount * 2.0).max(0.0);
        Self::new(self.x + amount, self.y + amount, width, height)
    }

    /// Clamps a point into the rectangle.
    #[must_use]
    pub fn clamp_point(&self, p: Point) -> Point {
        Point::new(p.x.clamp(self.x, self.right()), p.y.clamp(self.y, self.bottom()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point_operations() {
        let a = Point::new(1.0, 2.0);
        let b = Point::new(4.0, 6.0);

        let sum = a + b;
        assert_eq!(sum.x, 5.0);
        assert_eq!(sum.y, 8.0);

        assert_eq!(a.distance(b), 5.0);
        assert_eq!(a.midpoint(b), Point::new(2.5, 4.0));
        assert_eq!(Point::new(1.0, 0.0).perpendicular(), Point::new(0.0, 1.0));
    }

    #[test]
    fn test_normalized_zero_vector() {
        assert_eq!(Point::ZERO.normalized(), Point::ZERO);
        let n = Point::new(3.0, 4.0).normalized();
        assert!((n.length() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_bounding_box() {
        let points = [
            Point::new(3.0, 1.0),
            Point::new(-2.0, 5.0),
            Point::new(4.0, -1.0),
        ];
        let bounds = Rect::bounding(&points);
        assert_eq!(bounds, Rect::new(-2.0, -1.0, 6.0, 6.0));
        assert_eq!(Rect::bounding(&[]), Rect::default());
    }

    #[test]
    fn test_rect_overlap_ignores_shared_edges() {
        let left = Rect::new(0.0, 0.0, 100.0, 50.0);
        let right = Rect::new(100.0, 0.0, 100.0, 50.0);
        let crossing = Rect::new(90.0, 10.0, 20.0, 20.0);

        assert!(!left.overlaps(&right));
        assert!(left.overlaps(&crossing));
        assert!(right.overlaps(&crossing));
    }

    #[test]
    fn test_rect_containment_and_inset() {
        let outer = Rect::new(0.0, 0.0, 400.0, 300.0);
        let inner = outer.inset(10.0);
        assert!(outer.contains_rect(&inner));
        assert!(!inner.contains_rect(&outer));
        assert_eq!(Rect::new(0.0, 0.0, 10.0, 10.0).inset(20.0).area(), 0.0);
    }

    #[test]
    fn test_flat_view_of_points() {
        let points = [Point::new(1.0, 2.0), Point::new(3.0, 4.0)];
        let flat: &[f64] = bytemuck::cast_slice(&points);
        assert_eq!(flat, &[1.0, 2.0, 3.0, 4.0]);
    }
}
