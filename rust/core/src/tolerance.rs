// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Numeric tolerances shared by every geometric predicate.

use nalgebra::Point2;

/// General purpose floating point epsilon
pub const EPS: f64 = 1e-10;

/// Distance below which two points are considered coincident
pub const POINT_EPS: f64 = 1e-7;

/// Sweep angle below which an arc is treated as a straight edge
pub const ANGLE_EPS: f64 = 1e-9;

/// Area below which a contour is considered degenerate
pub const AREA_EPS: f64 = 1e-9;

#[inline]
pub fn is_zero(value: f64, eps: f64) -> bool {
    value.abs() <= eps
}

#[inline]
pub fn is_near(a: f64, b: f64, eps: f64) -> bool {
    (a - b).abs() <= eps
}

/// Check whether two points coincide within [`POINT_EPS`]
#[inline]
pub fn points_coincide(a: &Point2<f64>, b: &Point2<f64>) -> bool {
    (a - b).norm_squared() <= POINT_EPS * POINT_EPS
}
