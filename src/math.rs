//! Small 2D math helpers shared by the rest of the crate: points, bounding
//! boxes and rotation in scene coordinates.

use std::ops::{Add, Mul, Neg, Sub};

/// A 2D point or offset in scene coordinates.
///
/// # Examples
///
/// ```
/// use tinta::Vec2;
///
/// let a = Vec2::new(3.0, 4.0);
/// assert_eq!(a.length(), 5.0);
/// assert_eq!(a + Vec2::new(1.0, 1.0), Vec2::new(4.0, 5.0));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    /// The origin.
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };

    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Euclidean length of the vector.
    pub fn length(self) -> f32 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    pub fn dot(self, other: Self) -> f32 {
        self.x * other.x + self.y * other.y
    }
}

impl Add for Vec2 {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Vec2 {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Neg for Vec2 {
    type Output = Self;
    fn neg(self) -> Self {
        Self::new(-self.x, -self.y)
    }
}

impl Mul<f32> for Vec2 {
    type Output = Self;
    fn mul(self, rhs: f32) -> Self {
        Self::new(self.x * rhs, self.y * rhs)
    }
}

/// Rotates `point` around `pivot` by `degrees`. With the scene's y-down
/// axis this reads as clockwise on screen.
#[inline]
pub fn rotate(point: Vec2, pivot: Vec2, degrees: f32) -> Vec2 {
    let radians = degrees.to_radians();
    let (sin, cos) = radians.sin_cos();
    let p = point - pivot;
    pivot + Vec2::new(p.x * cos - p.y * sin, p.x * sin + p.y * cos)
}

/// An axis-aligned bounding box in world coordinates.
///
/// # Examples
///
/// ```
/// use tinta::{BoundingBox, Vec2};
///
/// let bounds = BoundingBox::new(Vec2::new(0.0, 0.0), Vec2::new(20.0, 10.0));
/// assert_eq!(bounds.width(), 20.0);
/// assert_eq!(bounds.height(), 10.0);
/// assert_eq!(bounds.center(), Vec2::new(10.0, 5.0));
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min: Vec2,
    pub max: Vec2,
}

impl BoundingBox {
    pub fn new(min: Vec2, max: Vec2) -> Self {
        Self { min, max }
    }

    /// Smallest box containing every point in `points`.
    pub fn from_points(points: impl IntoIterator<Item = Vec2>) -> Option<Self> {
        let mut points = points.into_iter();
        let first = points.next()?;
        let mut bounds = Self::new(first, first);
        for p in points {
            bounds.min.x = bounds.min.x.min(p.x);
            bounds.min.y = bounds.min.y.min(p.y);
            bounds.max.x = bounds.max.x.max(p.x);
            bounds.max.y = bounds.max.y.max(p.y);
        }
        Some(bounds)
    }

    pub fn width(&self) -> f32 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> f32 {
        self.max.y - self.min.y
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(
            (self.min.x + self.max.x) / 2.0,
            (self.min.y + self.max.y) / 2.0,
        )
    }

    /// Smallest box containing both boxes.
    pub fn union(&self, other: &Self) -> Self {
        Self {
            min: Vec2::new(self.min.x.min(other.min.x), self.min.y.min(other.min.y)),
            max: Vec2::new(self.max.x.max(other.max.x), self.max.y.max(other.max.y)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rotate_quarter_turn() {
        let rotated = rotate(Vec2::new(0.0, 10.0), Vec2::ZERO, 90.0);
        assert!((rotated.x - -10.0).abs() < 1e-4);
        assert!(rotated.y.abs() < 1e-4);
    }

    #[test]
    fn rotate_about_pivot() {
        let rotated = rotate(Vec2::new(2.0, 1.0), Vec2::new(1.0, 1.0), 180.0);
        assert!((rotated.x - 0.0).abs() < 1e-4);
        assert!((rotated.y - 1.0).abs() < 1e-4);
    }

    #[test]
    fn union_covers_both() {
        let a = BoundingBox::new(Vec2::new(0.0, 0.0), Vec2::new(1.0, 1.0));
        let b = BoundingBox::new(Vec2::new(-2.0, 0.5), Vec2::new(0.5, 3.0));
        let u = a.union(&b);
        assert_eq!(u.min, Vec2::new(-2.0, 0.0));
        assert_eq!(u.max, Vec2::new(1.0, 3.0));
    }
}
