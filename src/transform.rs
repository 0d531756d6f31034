//! 2D affine transforms between an item's local space and world space.
//!
//! An item's world transform is composed translation × rotation × scale, the
//! same order the host scene applies them. The inverse transform maps pointer
//! positions back into the item's local space, which is where gradient
//! control-point offsets live.

use crate::math::Vec2;

/// A row-major 2×3 affine transform.
///
/// Maps a point `p` to `(m11·x + m12·y + m13, m21·x + m22·y + m23)`.
///
/// # Examples
///
/// ```
/// use tinta::{Transform, Vec2};
///
/// let transform = Transform::from_parts(Vec2::new(10.0, 0.0), 90.0, Vec2::new(1.0, 1.0));
/// let world = transform.apply(Vec2::new(1.0, 0.0));
/// assert!((world.x - 10.0).abs() < 1e-4);
/// assert!((world.y - 1.0).abs() < 1e-4);
///
/// let inverse = transform.inverse().unwrap();
/// let local = inverse.apply(world);
/// assert!((local.x - 1.0).abs() < 1e-4);
/// assert!(local.y.abs() < 1e-4);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub m11: f32,
    pub m12: f32,
    pub m13: f32,
    pub m21: f32,
    pub m22: f32,
    pub m23: f32,
}

impl Transform {
    pub const IDENTITY: Self = Self {
        m11: 1.0,
        m12: 0.0,
        m13: 0.0,
        m21: 0.0,
        m22: 1.0,
        m23: 0.0,
    };

    pub fn translation(x: f32, y: f32) -> Self {
        Self {
            m13: x,
            m23: y,
            ..Self::IDENTITY
        }
    }

    pub fn rotation(degrees: f32) -> Self {
        let (sin, cos) = degrees.to_radians().sin_cos();
        Self {
            m11: cos,
            m12: -sin,
            m13: 0.0,
            m21: sin,
            m22: cos,
            m23: 0.0,
        }
    }

    pub fn scale(x: f32, y: f32) -> Self {
        Self {
            m11: x,
            m22: y,
            ..Self::IDENTITY
        }
    }

    /// Composes an item transform from its position, rotation (degrees) and
    /// scale. Scale applies first, then rotation, then translation.
    pub fn from_parts(position: Vec2, rotation_degrees: f32, scale: Vec2) -> Self {
        Self::scale(scale.x, scale.y)
            .then(&Self::rotation(rotation_degrees))
            .then(&Self::translation(position.x, position.y))
    }

    /// Returns the transform that applies `self` first, then `next`.
    pub fn then(&self, next: &Self) -> Self {
        Self {
            m11: next.m11 * self.m11 + next.m12 * self.m21,
            m12: next.m11 * self.m12 + next.m12 * self.m22,
            m13: next.m11 * self.m13 + next.m12 * self.m23 + next.m13,
            m21: next.m21 * self.m11 + next.m22 * self.m21,
            m22: next.m21 * self.m12 + next.m22 * self.m22,
            m23: next.m21 * self.m13 + next.m22 * self.m23 + next.m23,
        }
    }

    pub fn determinant(&self) -> f32 {
        self.m11 * self.m22 - self.m12 * self.m21
    }

    /// Inverse transform, or `None` when the linear part is singular (an item
    /// scaled to zero has no usable local space).
    pub fn inverse(&self) -> Option<Self> {
        let det = self.determinant();
        if det == 0.0 {
            return None;
        }
        let m11 = self.m22 / det;
        let m12 = -self.m12 / det;
        let m21 = -self.m21 / det;
        let m22 = self.m11 / det;
        Some(Self {
            m11,
            m12,
            m13: -(m11 * self.m13 + m12 * self.m23),
            m21,
            m22,
            m23: -(m21 * self.m13 + m22 * self.m23),
        })
    }

    pub fn apply(&self, p: Vec2) -> Vec2 {
        Vec2::new(
            self.m11 * p.x + self.m12 * p.y + self.m13,
            self.m21 * p.x + self.m22 * p.y + self.m23,
        )
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(a: Vec2, b: Vec2) {
        assert!((a.x - b.x).abs() < 1e-4 && (a.y - b.y).abs() < 1e-4, "{a:?} != {b:?}");
    }

    #[test]
    fn identity_is_noop() {
        let p = Vec2::new(3.0, -7.0);
        assert_close(Transform::IDENTITY.apply(p), p);
    }

    #[test]
    fn scale_applies_before_translation() {
        let transform = Transform::from_parts(Vec2::new(5.0, 5.0), 0.0, Vec2::new(2.0, 2.0));
        assert_close(transform.apply(Vec2::new(1.0, 1.0)), Vec2::new(7.0, 7.0));
    }

    #[test]
    fn inverse_round_trips() {
        let transform = Transform::from_parts(Vec2::new(12.0, -3.0), 37.0, Vec2::new(2.0, 0.5));
        let inverse = transform.inverse().unwrap();
        let p = Vec2::new(4.0, 9.0);
        assert_close(inverse.apply(transform.apply(p)), p);
    }

    #[test]
    fn singular_transform_has_no_inverse() {
        let transform = Transform::from_parts(Vec2::ZERO, 0.0, Vec2::new(0.0, 1.0));
        assert!(transform.inverse().is_none());
    }
}
