// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Straight and circular edges
//!
//! An edge is parameterized over `t ∈ [0, 1]` from its start to its end
//! point. For arcs the parameter is proportional to the swept angle.

use crate::arc::{circle_circle_points, circle_line_params, in_segment_region, Arc2D};
use crate::bounds::Box2D;
use crate::tolerance::{ANGLE_EPS, EPS, POINT_EPS};
use crate::vector::{cross, direction_angle, signed_angle};
use nalgebra::{Point2, Vector2};
use smallvec::SmallVec;
use std::f64::consts::TAU;

/// Intersection between two edges
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgeHit {
    /// Parameter on the edge the query was made on
    pub t_self: f64,
    /// Parameter on the other edge
    pub t_other: f64,
    pub point: Point2<f64>,
}

/// A single polygon or polyline edge
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Edge2D {
    Line { start: Point2<f64>, end: Point2<f64> },
    Arc { start: Point2<f64>, end: Point2<f64>, arc: Arc2D },
}

impl Edge2D {
    /// Build an edge from its end points and signed sweep angle
    ///
    /// Sweeps below [`ANGLE_EPS`] and zero-length chords produce a straight edge.
    pub fn new(start: Point2<f64>, end: Point2<f64>, arc_angle: f64) -> Self {
        if arc_angle.abs() < ANGLE_EPS {
            return Edge2D::Line { start, end };
        }
        match Arc2D::from_chord(&start, &end, arc_angle) {
            Some(arc) => Edge2D::Arc { start, end, arc },
            None => Edge2D::Line { start, end },
        }
    }

    #[inline]
    pub fn start(&self) -> Point2<f64> {
        match self {
            Edge2D::Line { start, .. } | Edge2D::Arc { start, .. } => *start,
        }
    }

    #[inline]
    pub fn end(&self) -> Point2<f64> {
        match self {
            Edge2D::Line { end, .. } | Edge2D::Arc { end, .. } => *end,
        }
    }

    /// Signed sweep angle, zero for straight edges
    #[inline]
    pub fn sweep(&self) -> f64 {
        match self {
            Edge2D::Line { .. } => 0.0,
            Edge2D::Arc { arc, .. } => arc.sweep,
        }
    }

    #[inline]
    pub fn arc(&self) -> Option<&Arc2D> {
        match self {
            Edge2D::Line { .. } => None,
            Edge2D::Arc { arc, .. } => Some(arc),
        }
    }

    #[inline]
    pub fn is_arc(&self) -> bool {
        matches!(self, Edge2D::Arc { .. })
    }

    pub fn chord(&self) -> Vector2<f64> {
        self.end() - self.start()
    }

    pub fn length(&self) -> f64 {
        match self {
            Edge2D::Line { start, end } => (end - start).norm(),
            Edge2D::Arc { arc, .. } => arc.length(),
        }
    }

    pub fn point_at(&self, t: f64) -> Point2<f64> {
        if t <= 0.0 {
            return self.start();
        }
        if t >= 1.0 {
            return self.end();
        }
        match self {
            Edge2D::Line { start, end } => start + (end - start) * t,
            Edge2D::Arc { arc, .. } => arc.point_at(t),
        }
    }

    /// Unit tangent in the direction of travel
    pub fn tangent_at(&self, t: f64) -> Vector2<f64> {
        match self {
            Edge2D::Line { start, end } => {
                let d = end - start;
                let len = d.norm();
                if len <= EPS {
                    Vector2::zeros()
                } else {
                    d / len
                }
            }
            Edge2D::Arc { arc, .. } => arc.tangent_at(t),
        }
    }

    /// Parameter of the point on the edge closest to `p`
    pub fn nearest_param(&self, p: &Point2<f64>) -> f64 {
        match self {
            Edge2D::Line { start, end } => {
                let d = end - start;
                let len2 = d.norm_squared();
                if len2 <= EPS * EPS {
                    0.0
                } else {
                    ((p - start).dot(&d) / len2).clamp(0.0, 1.0)
                }
            }
            Edge2D::Arc { arc, .. } => arc.param_of(p),
        }
    }

    pub fn distance_to(&self, p: &Point2<f64>) -> f64 {
        (self.point_at(self.nearest_param(p)) - p).norm()
    }

    /// Sub-edge between two parameters
    pub fn sub_edge(&self, t0: f64, t1: f64) -> Edge2D {
        Edge2D::new(self.point_at(t0), self.point_at(t1), self.sweep() * (t1 - t0))
    }

    pub fn split(&self, t: f64) -> (Edge2D, Edge2D) {
        (self.sub_edge(0.0, t), self.sub_edge(t, 1.0))
    }

    pub fn reversed(&self) -> Edge2D {
        match self {
            Edge2D::Line { start, end } => Edge2D::Line {
                start: *end,
                end: *start,
            },
            Edge2D::Arc { start, end, arc } => Edge2D::Arc {
                start: *end,
                end: *start,
                arc: arc.reversed(),
            },
        }
    }

    pub fn bounding_box(&self) -> Box2D {
        match self {
            Edge2D::Line { start, end } => Box2D::new(*start, *end),
            Edge2D::Arc { arc, .. } => arc.bounding_box(),
        }
    }

    /// Contribution of this edge to the signed area of a closed contour
    pub fn area_contribution(&self) -> f64 {
        let s = self.start();
        let e = self.end();
        let chord = 0.5 * (s.x * e.y - e.x * s.y);
        match self {
            Edge2D::Line { .. } => chord,
            Edge2D::Arc { arc, .. } => chord + arc.segment_area(),
        }
    }

    /// Contribution to the first moments `(∫x dA, ∫y dA)` of a closed contour
    ///
    /// Arcs are integrated over their chords' polyline with
    /// `segments` pieces.
    pub fn moment_contribution(&self, segments: usize) -> (f64, f64) {
        let n = if self.is_arc() { segments.max(1) } else { 1 };
        let mut mx = 0.0;
        let mut my = 0.0;
        let mut prev = self.start();
        for i in 1..=n {
            let cur = self.point_at(i as f64 / n as f64);
            let c = prev.x * cur.y - cur.x * prev.y;
            mx += (prev.x + cur.x) * c;
            my += (prev.y + cur.y) * c;
            prev = cur;
        }
        (mx / 6.0, my / 6.0)
    }

    /// Angle subtended by the edge as seen from `p`
    ///
    /// Summed over a closed contour this gives `TAU` times the winding
    /// number of `p`; `p` must not lie on the edge.
    pub fn winding_angle(&self, p: &Point2<f64>) -> f64 {
        let s = self.start();
        let e = self.end();
        let base = signed_angle(&(s - p), &(e - p));
        match self {
            Edge2D::Line { .. } => base,
            Edge2D::Arc { arc, .. } => {
                if in_segment_region(arc, &s, &e, p) {
                    base + TAU * arc.sweep.signum()
                } else {
                    base
                }
            }
        }
    }

    /// Edge parameters where the edge meets the infinite line `origin + s * dir`
    pub fn line_params(&self, origin: &Point2<f64>, dir: &Vector2<f64>) -> SmallVec<[f64; 2]> {
        let mut out = SmallVec::new();
        match self {
            Edge2D::Line { start, end } => {
                let d = end - start;
                let denom = cross(&d, dir);
                if denom.abs() <= EPS * d.norm() * dir.norm() {
                    return out;
                }
                let t = cross(&(origin - start), dir) / denom;
                let tol = POINT_EPS / d.norm().max(EPS);
                if t >= -tol && t <= 1.0 + tol {
                    out.push(t.clamp(0.0, 1.0));
                }
            }
            Edge2D::Arc { arc, .. } => {
                let angle_eps = POINT_EPS / arc.radius.max(EPS);
                for s in circle_line_params(&arc.center, arc.radius, origin, dir) {
                    let q = origin + dir * s;
                    if let Some(t) = arc.contains_angle(direction_angle(&(q - arc.center)), angle_eps) {
                        out.push(t);
                    }
                }
                out.sort_by(|a, b| a.total_cmp(b));
            }
        }
        out
    }

    /// All points where this edge meets `other`
    ///
    /// Overlapping collinear or co-circular edges report the end points of
    /// the shared piece.
    pub fn intersections(&self, other: &Edge2D) -> SmallVec<[EdgeHit; 2]> {
        let mut hits: SmallVec<[EdgeHit; 2]> = SmallVec::new();
        if !self.bounding_box().overlaps(&other.bounding_box(), POINT_EPS) {
            return hits;
        }
        match (self, other) {
            (Edge2D::Line { start: s1, end: e1 }, Edge2D::Line { start: s2, end: e2 }) => {
                let d1 = e1 - s1;
                let d2 = e2 - s2;
                let l1 = d1.norm();
                let l2 = d2.norm();
                if l1 <= EPS || l2 <= EPS {
                    return self.overlap_hits(other);
                }
                let denom = cross(&d1, &d2);
                if denom.abs() <= 1e-12 * l1 * l2 {
                    return self.overlap_hits(other);
                }
                let w = s2 - s1;
                let t = cross(&w, &d2) / denom;
                let u = cross(&w, &d1) / denom;
                let tt = POINT_EPS / l1;
                let tu = POINT_EPS / l2;
                if t >= -tt && t <= 1.0 + tt && u >= -tu && u <= 1.0 + tu {
                    let t = t.clamp(0.0, 1.0);
                    push_hit(&mut hits, t, u.clamp(0.0, 1.0), self.point_at(t));
                }
            }
            (Edge2D::Line { start, end }, Edge2D::Arc { arc, .. }) => {
                let d = end - start;
                let l = d.norm();
                if l <= EPS {
                    return self.overlap_hits(other);
                }
                let tt = POINT_EPS / l;
                let angle_eps = POINT_EPS / arc.radius.max(EPS);
                for t in circle_line_params(&arc.center, arc.radius, start, &d) {
                    if t < -tt || t > 1.0 + tt {
                        continue;
                    }
                    let t = t.clamp(0.0, 1.0);
                    let q = start + d * t;
                    if let Some(u) = arc.contains_angle(direction_angle(&(q - arc.center)), angle_eps) {
                        push_hit(&mut hits, t, u, q);
                    }
                }
            }
            (Edge2D::Arc { .. }, Edge2D::Line { .. }) => {
                for h in other.intersections(self) {
                    push_hit(&mut hits, h.t_other, h.t_self, h.point);
                }
            }
            (Edge2D::Arc { arc: a1, .. }, Edge2D::Arc { arc: a2, .. }) => {
                let same_circle = (a1.center - a2.center).norm() <= POINT_EPS
                    && (a1.radius - a2.radius).abs() <= POINT_EPS;
                if same_circle {
                    return self.overlap_hits(other);
                }
                let eps1 = POINT_EPS / a1.radius.max(EPS);
                let eps2 = POINT_EPS / a2.radius.max(EPS);
                for q in circle_circle_points(&a1.center, a1.radius, &a2.center, a2.radius) {
                    let t = a1.contains_angle(direction_angle(&(q - a1.center)), eps1);
                    let u = a2.contains_angle(direction_angle(&(q - a2.center)), eps2);
                    if let (Some(t), Some(u)) = (t, u) {
                        push_hit(&mut hits, t, u, q);
                    }
                }
            }
        }
        hits.sort_by(|a, b| a.t_self.total_cmp(&b.t_self));
        hits
    }

    /// End points of either edge lying on the other one
    fn overlap_hits(&self, other: &Edge2D) -> SmallVec<[EdgeHit; 2]> {
        let mut hits: SmallVec<[EdgeHit; 2]> = SmallVec::new();
        for (t_other, p) in [(0.0, other.start()), (1.0, other.end())] {
            let t = self.nearest_param(&p);
            if (self.point_at(t) - p).norm() <= POINT_EPS {
                push_hit(&mut hits, t, t_other, p);
            }
        }
        for (t_self, p) in [(0.0, self.start()), (1.0, self.end())] {
            let u = other.nearest_param(&p);
            if (other.point_at(u) - p).norm() <= POINT_EPS {
                push_hit(&mut hits, t_self, u, p);
            }
        }
        hits.sort_by(|a, b| a.t_self.total_cmp(&b.t_self));
        hits
    }
}

fn push_hit(hits: &mut SmallVec<[EdgeHit; 2]>, t_self: f64, t_other: f64, point: Point2<f64>) {
    if hits.iter().any(|h| (h.point - point).norm() <= POINT_EPS) {
        return;
    }
    hits.push(EdgeHit {
        t_self,
        t_other,
        point,
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::PI;

    fn line(ax: f64, ay: f64, bx: f64, by: f64) -> Edge2D {
        Edge2D::new(Point2::new(ax, ay), Point2::new(bx, by), 0.0)
    }

    #[test]
    fn test_line_line_crossing() {
        let a = line(0.0, 0.0, 2.0, 2.0);
        let b = line(0.0, 2.0, 2.0, 0.0);
        let hits = a.intersections(&b);
        assert_eq!(hits.len(), 1);
        assert_relative_eq!(hits[0].t_self, 0.5, epsilon = 1e-12);
        assert_relative_eq!(hits[0].point.x, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_collinear_overlap() {
        let a = line(0.0, 0.0, 4.0, 0.0);
        let b = line(2.0, 0.0, 6.0, 0.0);
        let hits = a.intersections(&b);
        assert_eq!(hits.len(), 2);
        assert_relative_eq!(hits[0].t_self, 0.5, epsilon = 1e-12);
        assert_relative_eq!(hits[1].t_self, 1.0, epsilon = 1e-12);
        assert_relative_eq!(hits[1].t_other, 0.5, epsilon = 1e-12);
    }

    #[test]
    fn test_parallel_disjoint() {
        let a = line(0.0, 0.0, 4.0, 0.0);
        let b = line(0.0, 1.0, 4.0, 1.0);
        assert!(a.intersections(&b).is_empty());
    }

    #[test]
    fn test_line_arc_intersection() {
        // upper half of the unit circle, walked clockwise from (-1,0) to (1,0)
        let arc = Edge2D::new(Point2::new(-1.0, 0.0), Point2::new(1.0, 0.0), -PI);
        let l = line(0.0, -2.0, 0.0, 2.0);
        let hits = l.intersections(&arc);
        assert_eq!(hits.len(), 1);
        assert_relative_eq!(hits[0].point.y, 1.0, epsilon = 1e-9);
        assert_relative_eq!(hits[0].t_other, 0.5, epsilon = 1e-9);
        let back = arc.intersections(&l);
        assert_relative_eq!(back[0].t_self, 0.5, epsilon = 1e-9);
    }

    #[test]
    fn test_area_contribution_of_circle() {
        let a = Edge2D::new(Point2::new(1.0, 0.0), Point2::new(-1.0, 0.0), PI);
        let b = Edge2D::new(Point2::new(-1.0, 0.0), Point2::new(1.0, 0.0), PI);
        assert_relative_eq!(a.area_contribution() + b.area_contribution(), PI, epsilon = 1e-9);
    }

    #[test]
    fn test_winding_angle_arc() {
        let a = Edge2D::new(Point2::new(1.0, 0.0), Point2::new(-1.0, 0.0), PI);
        let b = Edge2D::new(Point2::new(-1.0, 0.0), Point2::new(1.0, 0.0), PI);
        let inside = Point2::new(0.2, 0.5);
        let total = a.winding_angle(&inside) + b.winding_angle(&inside);
        assert_relative_eq!(total, TAU, epsilon = 1e-9);
        let outside = Point2::new(0.0, 1.5);
        let total = a.winding_angle(&outside) + b.winding_angle(&outside);
        assert_relative_eq!(total, 0.0, epsilon = 1e-9);
    }

    #[test]
    fn test_split_arc() {
        let a = Edge2D::new(Point2::new(1.0, 0.0), Point2::new(-1.0, 0.0), PI);
        let (first, second) = a.split(0.5);
        assert_relative_eq!(first.sweep(), PI / 2.0, epsilon = 1e-12);
        assert_relative_eq!(first.end().y, 1.0, epsilon = 1e-9);
        assert_relative_eq!(first.length() + second.length(), PI, epsilon = 1e-9);
    }

    #[test]
    fn test_line_params() {
        let a = Edge2D::new(Point2::new(1.0, 0.0), Point2::new(-1.0, 0.0), PI);
        let ts = a.line_params(&Point2::new(0.0, 0.5), &Vector2::new(1.0, 0.0));
        assert_eq!(ts.len(), 2);
        assert!(ts[0] < ts[1]);
    }
}
