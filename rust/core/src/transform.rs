// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! 2D affine transforms
//!
//! A [`Transform2D`] wraps a homogeneous 3x3 matrix. Arcs survive a
//! transform only when it is a similarity (uniform scale, rotation,
//! translation, optional mirroring); callers segment arcs otherwise.

use crate::error::{Error, Result};
use crate::tolerance::EPS;
use nalgebra::{Matrix2, Matrix3, Point2, Vector2};

/// Homogeneous 2D affine transform
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform2D {
    matrix: Matrix3<f64>,
}

impl Default for Transform2D {
    fn default() -> Self {
        Self::identity()
    }
}

impl Transform2D {
    pub fn identity() -> Self {
        Self {
            matrix: Matrix3::identity(),
        }
    }

    /// Wrap an affine matrix; the last row must be `[0, 0, 1]`
    pub fn from_matrix(matrix: Matrix3<f64>) -> Result<Self> {
        if matrix[(2, 0)].abs() > EPS || matrix[(2, 1)].abs() > EPS || (matrix[(2, 2)] - 1.0).abs() > EPS {
            return Err(Error::InvalidParameter(
                "Transform matrix is not affine".to_string(),
            ));
        }
        Ok(Self { matrix })
    }

    pub fn translation(offset: Vector2<f64>) -> Self {
        Self {
            matrix: Matrix3::new_translation(&offset),
        }
    }

    /// Counter-clockwise rotation about the origin
    pub fn rotation(angle: f64) -> Self {
        Self {
            matrix: Matrix3::new_rotation(angle),
        }
    }

    pub fn rotation_about(center: Point2<f64>, angle: f64) -> Self {
        Self::translation(-center.coords)
            .then(&Self::rotation(angle))
            .then(&Self::translation(center.coords))
    }

    pub fn scaling(sx: f64, sy: f64) -> Self {
        Self {
            matrix: Matrix3::new_nonuniform_scaling(&Vector2::new(sx, sy)),
        }
    }

    pub fn uniform_scaling(s: f64) -> Self {
        Self::scaling(s, s)
    }

    /// Reflection across the line through `a` and `b`
    pub fn mirror(a: Point2<f64>, b: Point2<f64>) -> Result<Self> {
        let dir = b - a;
        let len = dir.norm();
        if len <= EPS {
            return Err(Error::InvalidParameter(
                "Mirror axis needs two distinct points".to_string(),
            ));
        }
        let d = dir / len;
        let reflect = d * d.transpose() * 2.0 - Matrix2::identity();
        let mut linear = Matrix3::identity();
        linear.fixed_view_mut::<2, 2>(0, 0).copy_from(&reflect);
        let local = Self { matrix: linear };
        Ok(Self::translation(-a.coords)
            .then(&local)
            .then(&Self::translation(a.coords)))
    }

    /// Compose: apply `self` first, then `next`
    pub fn then(&self, next: &Transform2D) -> Transform2D {
        Transform2D {
            matrix: next.matrix * self.matrix,
        }
    }

    pub fn inverse(&self) -> Result<Transform2D> {
        self.matrix
            .try_inverse()
            .map(|matrix| Transform2D { matrix })
            .ok_or(Error::SingularTransform)
    }

    #[inline]
    pub fn matrix(&self) -> &Matrix3<f64> {
        &self.matrix
    }

    #[inline]
    pub fn apply_point(&self, p: &Point2<f64>) -> Point2<f64> {
        self.matrix.transform_point(p)
    }

    #[inline]
    pub fn apply_vector(&self, v: &Vector2<f64>) -> Vector2<f64> {
        self.matrix.transform_vector(v)
    }

    /// Determinant of the linear part
    pub fn determinant(&self) -> f64 {
        self.matrix.fixed_view::<2, 2>(0, 0).clone_owned().determinant()
    }

    /// Whether orientation flips (contours need reversing to stay positive)
    pub fn is_mirroring(&self) -> bool {
        self.determinant() < 0.0
    }

    /// Whether circles map to circles
    pub fn preserves_arcs(&self) -> bool {
        let m = self.matrix.fixed_view::<2, 2>(0, 0).clone_owned();
        let c0 = m.column(0);
        let c1 = m.column(1);
        let l0 = c0.norm_squared();
        let l1 = c1.norm_squared();
        let scale = l0.max(l1).max(EPS);
        (l0 - l1).abs() <= 1e-9 * scale && c0.dot(&c1).abs() <= 1e-9 * scale && l0 > EPS
    }

    /// Uniform scale factor of a similarity transform
    pub fn scale_factor(&self) -> f64 {
        self.determinant().abs().sqrt()
    }

    pub fn is_identity(&self) -> bool {
        (self.matrix - Matrix3::identity()).abs().max() <= EPS
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::PI;

    #[test]
    fn test_rotation_about() {
        let t = Transform2D::rotation_about(Point2::new(1.0, 1.0), PI / 2.0);
        let p = t.apply_point(&Point2::new(2.0, 1.0));
        assert_relative_eq!(p.x, 1.0, epsilon = 1e-12);
        assert_relative_eq!(p.y, 2.0, epsilon = 1e-12);
        assert!(t.preserves_arcs());
        assert!(!t.is_mirroring());
    }

    #[test]
    fn test_mirror() {
        let t = Transform2D::mirror(Point2::new(0.0, 1.0), Point2::new(1.0, 1.0)).unwrap();
        let p = t.apply_point(&Point2::new(3.0, 0.0));
        assert_relative_eq!(p.x, 3.0, epsilon = 1e-12);
        assert_relative_eq!(p.y, 2.0, epsilon = 1e-12);
        assert!(t.is_mirroring());
        assert!(t.preserves_arcs());
    }

    #[test]
    fn test_nonuniform_scaling_breaks_arcs() {
        assert!(!Transform2D::scaling(2.0, 1.0).preserves_arcs());
        assert!(Transform2D::uniform_scaling(3.0).preserves_arcs());
        assert_relative_eq!(Transform2D::uniform_scaling(3.0).scale_factor(), 3.0, epsilon = 1e-12);
    }

    #[test]
    fn test_inverse() {
        let t = Transform2D::translation(Vector2::new(2.0, -1.0)).then(&Transform2D::rotation(0.3));
        let inv = t.inverse().unwrap();
        let p = Point2::new(4.0, 5.0);
        let back = inv.apply_point(&t.apply_point(&p));
        assert_relative_eq!(back.x, p.x, epsilon = 1e-12);
        assert!(Transform2D::scaling(0.0, 1.0).inverse().is_err());
    }
}
