// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Circular arc edges
//!
//! Arcs are stored on polygons as a signed sweep angle attached to an
//! edge (see [`PolyArcRec`]); [`Arc2D`] reconstructs the circle from the
//! chord end points and that angle. A positive sweep turns counter-clockwise
//! while walking from the start to the end point.

use crate::bounds::Box2D;
use crate::tolerance::{ANGLE_EPS, EPS};
use crate::vector::{cross, direction_angle, left_normal, normalize_angle_positive, signed_angle, unit_at};
use nalgebra::{Point2, Vector2};
use smallvec::SmallVec;
use std::f64::consts::{FRAC_PI_2, TAU};

/// Curved edge descriptor attached to a flat vertex array
///
/// `end_index` is `beg_index + 1`, or the first vertex of the contour for
/// the closing edge.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PolyArcRec {
    pub beg_index: usize,
    pub end_index: usize,
    pub arc_angle: f64,
}

impl PolyArcRec {
    pub fn new(beg_index: usize, end_index: usize, arc_angle: f64) -> Self {
        Self {
            beg_index,
            end_index,
            arc_angle,
        }
    }
}

/// Chord tolerance used when an arc has to be replaced by straight segments
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ArcDivParams {
    /// Maximum distance between the arc and its chords
    pub max_difference: f64,
    /// Upper bound on the number of chords per arc
    pub max_segments: usize,
}

impl Default for ArcDivParams {
    fn default() -> Self {
        Self {
            max_difference: 1e-3,
            max_segments: 256,
        }
    }
}

/// A circular arc given by its circle and angular range
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Arc2D {
    pub center: Point2<f64>,
    pub radius: f64,
    /// Angle of the start point around the center
    pub start_angle: f64,
    /// Signed sweep, positive counter-clockwise
    pub sweep: f64,
}

impl Arc2D {
    /// Reconstruct the arc running from `start` to `end` with the given sweep
    ///
    /// Returns `None` for a zero-length chord or a sweep that is effectively
    /// straight or a full turn.
    pub fn from_chord(start: &Point2<f64>, end: &Point2<f64>, sweep: f64) -> Option<Self> {
        let chord = end - start;
        let len = chord.norm();
        if len <= EPS || sweep.abs() <= ANGLE_EPS || sweep.abs() >= TAU - ANGLE_EPS {
            return None;
        }
        let half = sweep * 0.5;
        let mid = Point2::from((start.coords + end.coords) * 0.5);
        let center = mid + left_normal(&chord) / len * ((len * 0.5) / half.tan());
        let radius = len / (2.0 * half.sin().abs());
        Some(Self {
            center,
            radius,
            start_angle: direction_angle(&(start - center)),
            sweep,
        })
    }

    /// Sweep of the arc that leaves `start` along `tangent` and ends at `end`
    pub fn sweep_from_tangent(start: &Point2<f64>, tangent: &Vector2<f64>, end: &Point2<f64>) -> f64 {
        2.0 * signed_angle(tangent, &(end - start))
    }

    #[inline]
    pub fn end_angle(&self) -> f64 {
        self.start_angle + self.sweep
    }

    #[inline]
    pub fn angle_at(&self, t: f64) -> f64 {
        self.start_angle + t * self.sweep
    }

    #[inline]
    pub fn point_at(&self, t: f64) -> Point2<f64> {
        self.center + unit_at(self.angle_at(t)) * self.radius
    }

    /// Unit tangent in the direction of travel
    #[inline]
    pub fn tangent_at(&self, t: f64) -> Vector2<f64> {
        let a = self.angle_at(t);
        Vector2::new(-a.sin(), a.cos()) * self.sweep.signum()
    }

    #[inline]
    pub fn length(&self) -> f64 {
        self.radius * self.sweep.abs()
    }

    /// Maximum distance between the arc and its chord
    #[inline]
    pub fn sagitta(&self) -> f64 {
        self.radius * (1.0 - (self.sweep * 0.5).cos())
    }

    /// Parameter of the direction `angle` if it lies within the swept range
    pub fn contains_angle(&self, angle: f64, eps: f64) -> Option<f64> {
        let span = self.sweep.abs();
        let mut delta = if self.sweep > 0.0 {
            normalize_angle_positive(angle - self.start_angle)
        } else {
            normalize_angle_positive(self.start_angle - angle)
        };
        if delta > TAU - eps {
            delta -= TAU;
        }
        if delta >= -eps && delta <= span + eps {
            Some((delta / span).clamp(0.0, 1.0))
        } else {
            None
        }
    }

    /// Parameter of the arc point nearest to `p`
    pub fn param_of(&self, p: &Point2<f64>) -> f64 {
        let offset = p - self.center;
        if offset.norm() <= EPS {
            return 0.0;
        }
        let angle = direction_angle(&offset);
        match self.contains_angle(angle, ANGLE_EPS) {
            Some(t) => t,
            None => {
                let d0 = (self.point_at(0.0) - p).norm();
                let d1 = (self.point_at(1.0) - p).norm();
                if d0 <= d1 {
                    0.0
                } else {
                    1.0
                }
            }
        }
    }

    pub fn bounding_box(&self) -> Box2D {
        let mut bbox = Box2D::from_point(self.point_at(0.0));
        bbox.extend(&self.point_at(1.0));
        for k in 0..4 {
            let axis = k as f64 * FRAC_PI_2;
            if self.contains_angle(axis, 0.0).is_some() {
                bbox.extend(&(self.center + unit_at(axis) * self.radius));
            }
        }
        bbox
    }

    /// Signed area between the chord and the arc
    ///
    /// Positive when the arc bulges to the right of its chord, which is the
    /// case for a positive sweep.
    pub fn segment_area(&self) -> f64 {
        0.5 * self.radius * self.radius * (self.sweep - self.sweep.sin())
    }

    /// Number of chords needed to stay within `params`
    pub fn segment_count(&self, params: &ArcDivParams) -> usize {
        let span = self.sweep.abs();
        let quarters = (span / FRAC_PI_2 - EPS).ceil().max(1.0) as usize;
        let by_tolerance = if params.max_difference > 0.0 && params.max_difference < self.radius {
            let step = 2.0 * (1.0 - params.max_difference / self.radius).acos();
            if step > EPS {
                (span / step).ceil() as usize
            } else {
                params.max_segments
            }
        } else {
            1
        };
        quarters.max(by_tolerance).min(params.max_segments.max(1)).max(1)
    }

    /// Interior chord points, excluding both end points
    pub fn interior_points(&self, params: &ArcDivParams) -> Vec<Point2<f64>> {
        let n = self.segment_count(params);
        (1..n).map(|i| self.point_at(i as f64 / n as f64)).collect()
    }

    pub fn reversed(&self) -> Self {
        Self {
            center: self.center,
            radius: self.radius,
            start_angle: self.end_angle(),
            sweep: -self.sweep,
        }
    }

    /// Distance from `p` to the arc
    pub fn distance_to(&self, p: &Point2<f64>) -> f64 {
        let t = self.param_of(p);
        (self.point_at(t) - p).norm()
    }
}

/// Parameters `s` along `origin + s * dir` where the line meets the circle
pub fn circle_line_params(
    center: &Point2<f64>,
    radius: f64,
    origin: &Point2<f64>,
    dir: &Vector2<f64>,
) -> SmallVec<[f64; 2]> {
    let mut out = SmallVec::new();
    let a = dir.norm_squared();
    if a <= EPS * EPS {
        return out;
    }
    let f = origin - center;
    let b = 2.0 * f.dot(dir);
    let c = f.norm_squared() - radius * radius;
    let disc = b * b - 4.0 * a * c;
    let tangent_eps = 1e-12 * (b * b + (4.0 * a * c).abs()).max(1.0);
    if disc < -tangent_eps {
        return out;
    }
    if disc.abs() <= tangent_eps {
        out.push(-b / (2.0 * a));
        return out;
    }
    let sq = disc.sqrt();
    out.push((-b - sq) / (2.0 * a));
    out.push((-b + sq) / (2.0 * a));
    out
}

/// Intersection points of two circles
pub fn circle_circle_points(
    c0: &Point2<f64>,
    r0: f64,
    c1: &Point2<f64>,
    r1: f64,
) -> SmallVec<[Point2<f64>; 2]> {
    let mut out = SmallVec::new();
    let d_vec = c1 - c0;
    let d = d_vec.norm();
    if d <= EPS || d > r0 + r1 + 1e-9 || d < (r0 - r1).abs() - 1e-9 {
        return out;
    }
    let a = (r0 * r0 - r1 * r1 + d * d) / (2.0 * d);
    let h2 = r0 * r0 - a * a;
    let base = c0 + d_vec * (a / d);
    if h2 <= 1e-18 {
        out.push(base);
        return out;
    }
    let h = h2.sqrt();
    let perp = left_normal(&d_vec) / d;
    out.push(base + perp * h);
    out.push(base - perp * h);
    out
}

/// Whether `p` lies in the lens bounded by the arc and its chord
pub fn in_segment_region(arc: &Arc2D, start: &Point2<f64>, end: &Point2<f64>, p: &Point2<f64>) -> bool {
    if (p - arc.center).norm() > arc.radius + EPS {
        return false;
    }
    // the bulge lies right of the chord for a positive sweep
    let side = cross(&(end - start), &(p - start));
    if arc.sweep > 0.0 {
        side < 0.0
    } else {
        side > 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::PI;

    #[test]
    fn test_from_chord_quarter() {
        let arc = Arc2D::from_chord(&Point2::new(1.0, 0.0), &Point2::new(0.0, 1.0), PI / 2.0).unwrap();
        assert_relative_eq!(arc.center.x, 0.0, epsilon = 1e-12);
        assert_relative_eq!(arc.center.y, 0.0, epsilon = 1e-12);
        assert_relative_eq!(arc.radius, 1.0, epsilon = 1e-12);
        assert_relative_eq!(arc.length(), PI / 2.0, epsilon = 1e-12);
        let mid = arc.point_at(0.5);
        assert_relative_eq!(mid.x, (0.5f64).sqrt(), epsilon = 1e-12);
    }

    #[test]
    fn test_clockwise_arc_center() {
        let arc = Arc2D::from_chord(&Point2::new(0.0, 1.0), &Point2::new(1.0, 0.0), -PI / 2.0).unwrap();
        assert_relative_eq!(arc.center.x, 0.0, epsilon = 1e-12);
        assert_relative_eq!(arc.center.y, 0.0, epsilon = 1e-12);
        let tangent = arc.tangent_at(0.0);
        assert_relative_eq!(tangent.x, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_half_circle_segment_area() {
        let arc = Arc2D::from_chord(&Point2::new(-1.0, 0.0), &Point2::new(1.0, 0.0), PI).unwrap();
        assert_relative_eq!(arc.segment_area(), PI / 2.0, epsilon = 1e-12);
        // the bulge of a positive sweep from -x to +x is below the chord
        assert!(arc.point_at(0.5).y < 0.0);
    }

    #[test]
    fn test_bounding_box_includes_extreme() {
        let arc = Arc2D::from_chord(&Point2::new(1.0, 0.0), &Point2::new(-1.0, 0.0), PI).unwrap();
        let bbox = arc.bounding_box();
        assert_relative_eq!(bbox.max.y, 1.0, epsilon = 1e-12);
        assert_relative_eq!(bbox.min.y, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_segment_count() {
        let arc = Arc2D::from_chord(&Point2::new(1.0, 0.0), &Point2::new(-1.0, 0.0), PI).unwrap();
        let coarse = ArcDivParams {
            max_difference: 10.0,
            max_segments: 64,
        };
        assert_eq!(arc.segment_count(&coarse), 2);
        let fine = ArcDivParams::default();
        let n = arc.segment_count(&fine);
        assert!(n > 20 && n <= 64);
        assert_eq!(arc.interior_points(&fine).len(), n - 1);
    }

    #[test]
    fn test_param_of() {
        let arc = Arc2D::from_chord(&Point2::new(1.0, 0.0), &Point2::new(0.0, 1.0), PI / 2.0).unwrap();
        let t = arc.param_of(&Point2::new(2.0, 2.0));
        assert_relative_eq!(t, 0.5, epsilon = 1e-12);
        assert_relative_eq!(arc.param_of(&Point2::new(0.0, -3.0)), 0.0);
    }

    #[test]
    fn test_circle_line_params() {
        let hits = circle_line_params(
            &Point2::new(0.0, 0.0),
            1.0,
            &Point2::new(-2.0, 0.0),
            &Vector2::new(1.0, 0.0),
        );
        assert_eq!(hits.len(), 2);
        assert_relative_eq!(hits[0], 1.0, epsilon = 1e-12);
        assert_relative_eq!(hits[1], 3.0, epsilon = 1e-12);
    }

    #[test]
    fn test_circle_circle_points() {
        let pts = circle_circle_points(&Point2::new(0.0, 0.0), 1.0, &Point2::new(1.0, 0.0), 1.0);
        assert_eq!(pts.len(), 2);
        assert_relative_eq!(pts[0].x, 0.5, epsilon = 1e-12);
    }
}
