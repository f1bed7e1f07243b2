// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Small 2D vector helpers.

use crate::tolerance::EPS;
use nalgebra::{Point2, Vector2};
use std::f64::consts::{PI, TAU};

/// Position of a point relative to a directed curve
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Side {
    Left,
    On,
    Right,
}

/// 2D cross product (z component of the 3D cross product)
#[inline]
pub fn cross(a: &Vector2<f64>, b: &Vector2<f64>) -> f64 {
    a.x * b.y - a.y * b.x
}

/// Counter-clockwise perpendicular
#[inline]
pub fn left_normal(v: &Vector2<f64>) -> Vector2<f64> {
    Vector2::new(-v.y, v.x)
}

/// Clockwise perpendicular
#[inline]
pub fn right_normal(v: &Vector2<f64>) -> Vector2<f64> {
    Vector2::new(v.y, -v.x)
}

/// Twice the signed area of triangle `a b c`; positive for a left turn
#[inline]
pub fn orientation(a: &Point2<f64>, b: &Point2<f64>, c: &Point2<f64>) -> f64 {
    cross(&(b - a), &(c - a))
}

/// Classify `p` against the directed line `a -> b`
pub fn side_of(a: &Point2<f64>, b: &Point2<f64>, p: &Point2<f64>, eps: f64) -> Side {
    let dir = b - a;
    let len = dir.norm();
    if len <= EPS {
        return Side::On;
    }
    let dist = cross(&dir, &(p - a)) / len;
    if dist > eps {
        Side::Left
    } else if dist < -eps {
        Side::Right
    } else {
        Side::On
    }
}

/// Normalize an angle into `(-PI, PI]`
pub fn normalize_angle(angle: f64) -> f64 {
    let mut a = angle % TAU;
    if a <= -PI {
        a += TAU;
    } else if a > PI {
        a -= TAU;
    }
    a
}

/// Normalize an angle into `[0, TAU)`
pub fn normalize_angle_positive(angle: f64) -> f64 {
    let a = angle % TAU;
    if a < 0.0 {
        a + TAU
    } else {
        a
    }
}

/// Signed angle turning `a` into `b`, in `(-PI, PI]`
#[inline]
pub fn signed_angle(a: &Vector2<f64>, b: &Vector2<f64>) -> f64 {
    cross(a, b).atan2(a.dot(b))
}

/// Angle of a vector measured from the positive x axis
#[inline]
pub fn direction_angle(v: &Vector2<f64>) -> f64 {
    v.y.atan2(v.x)
}

/// Unit vector pointing at `angle`
#[inline]
pub fn unit_at(angle: f64) -> Vector2<f64> {
    Vector2::new(angle.cos(), angle.sin())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_side_of() {
        let a = Point2::new(0.0, 0.0);
        let b = Point2::new(1.0, 0.0);
        assert_eq!(side_of(&a, &b, &Point2::new(0.5, 1.0), 1e-9), Side::Left);
        assert_eq!(side_of(&a, &b, &Point2::new(0.5, -1.0), 1e-9), Side::Right);
        assert_eq!(side_of(&a, &b, &Point2::new(3.0, 0.0), 1e-9), Side::On);
    }

    #[test]
    fn test_normals() {
        let v = Vector2::new(1.0, 0.0);
        assert_eq!(left_normal(&v), Vector2::new(0.0, 1.0));
        assert_eq!(right_normal(&v), Vector2::new(0.0, -1.0));
    }

    #[test]
    fn test_normalize_angle() {
        assert_relative_eq!(normalize_angle(3.0 * PI), PI, epsilon = 1e-12);
        assert_relative_eq!(normalize_angle(-PI / 2.0 - TAU), -PI / 2.0, epsilon = 1e-12);
        assert_relative_eq!(normalize_angle_positive(-PI / 2.0), 1.5 * PI, epsilon = 1e-12);
    }

    #[test]
    fn test_signed_angle() {
        let a = Vector2::new(1.0, 0.0);
        let b = Vector2::new(0.0, 1.0);
        assert_relative_eq!(signed_angle(&a, &b), PI / 2.0, epsilon = 1e-12);
        assert_relative_eq!(signed_angle(&b, &a), -PI / 2.0, epsilon = 1e-12);
    }
}
