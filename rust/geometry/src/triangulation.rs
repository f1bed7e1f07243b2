// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Polygon triangulation utilities
//!
//! Wrapper around earcutr for regularized polygons. Arcs are replaced by
//! chords before triangulating.

use crate::error::{Error, Result};
use crate::kernel::store::{segment_ring, PolygonStore};
use crate::user_data::UserData;
use polyform_core::{ArcDivParams, Point2};

/// Triangles over a flat point list
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Triangulation {
    /// Outer contour points followed by the points of every hole
    pub points: Vec<Point2<f64>>,
    /// Three indices into `points` per triangle, counter-clockwise
    pub indices: Vec<usize>,
}

impl Triangulation {
    #[inline]
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Sum of the triangle areas
    pub fn area(&self) -> f64 {
        self.indices
            .chunks_exact(3)
            .map(|t| {
                let (a, b, c) = (self.points[t[0]], self.points[t[1]], self.points[t[2]]);
                0.5 * ((b - a).x * (c - a).y - (b - a).y * (c - a).x)
            })
            .sum()
    }
}

/// Check if a ring is convex (all turns have the same sign)
#[inline]
fn is_convex(points: &[Point2<f64>]) -> bool {
    if points.len() < 3 {
        return false;
    }
    let n = points.len();
    let mut sign = 0i8;
    for i in 0..n {
        let p0 = &points[i];
        let p1 = &points[(i + 1) % n];
        let p2 = &points[(i + 2) % n];
        let cross = (p1.x - p0.x) * (p2.y - p1.y) - (p1.y - p0.y) * (p2.x - p1.x);
        if cross.abs() > 1e-10 {
            let current = if cross > 0.0 { 1i8 } else { -1i8 };
            if sign == 0 {
                sign = current;
            } else if sign != current {
                return false;
            }
        }
    }
    true
}

#[inline]
fn fan_triangulate(n: usize) -> Vec<usize> {
    let mut indices = Vec::with_capacity((n - 2) * 3);
    for i in 1..n - 1 {
        indices.push(0);
        indices.push(i);
        indices.push(i + 1);
    }
    indices
}

/// Triangulate an outer ring with holes
pub(crate) fn triangulate_rings(outer: &[Point2<f64>], holes: &[Vec<Point2<f64>>]) -> Result<Vec<usize>> {
    if outer.len() < 3 {
        return Err(Error::TriangulationError(
            "Need at least 3 points in outer boundary".to_string(),
        ));
    }
    let holes: Vec<&Vec<Point2<f64>>> = holes.iter().filter(|h| h.len() >= 3).collect();
    if holes.is_empty() {
        if outer.len() == 3 {
            return Ok(vec![0, 1, 2]);
        }
        // FAST PATH: convex outline
        if is_convex(outer) {
            return Ok(fan_triangulate(outer.len()));
        }
    }

    let total = outer.len() + holes.iter().map(|h| h.len()).sum::<usize>();
    let mut vertices = Vec::with_capacity(total * 2);
    let mut hole_indices = Vec::with_capacity(holes.len());
    for p in outer {
        vertices.push(p.x);
        vertices.push(p.y);
    }
    for hole in &holes {
        hole_indices.push(vertices.len() / 2);
        for p in hole.iter() {
            vertices.push(p.x);
            vertices.push(p.y);
        }
    }
    earcutr::earcut(&vertices, &hole_indices, 2).map_err(|e| Error::TriangulationError(format!("{:?}", e)))
}

/// Triangulate a regularized polygon (one outer contour, holes after it)
pub(crate) fn triangulate_store<V, E, C, P>(
    store: &PolygonStore<V, E, C, P>,
    arc_div: &ArcDivParams,
) -> Result<Triangulation>
where
    V: UserData,
    E: UserData,
    C: UserData,
    P: UserData,
{
    if store.is_empty() {
        return Ok(Triangulation::default());
    }
    let mut rings: Vec<Vec<Point2<f64>>> = store
        .rings()
        .map(|ring| {
            let (nodes, _) = segment_ring(ring, true, arc_div);
            nodes.into_iter().map(|n| n.point).collect()
        })
        .collect();
    let holes = rings.split_off(1);
    let outer = rings.pop().unwrap_or_default();
    let indices = triangulate_rings(&outer, &holes)?;
    let mut points = outer;
    for hole in holes.into_iter().filter(|h| h.len() >= 3) {
        points.extend(hole);
    }
    Ok(Triangulation { points, indices })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn rect(x0: f64, y0: f64, x1: f64, y1: f64) -> Vec<Point2<f64>> {
        vec![
            Point2::new(x0, y0),
            Point2::new(x1, y0),
            Point2::new(x1, y1),
            Point2::new(x0, y1),
        ]
    }

    #[test]
    fn test_convex_fast_path() {
        let indices = triangulate_rings(&rect(0.0, 0.0, 1.0, 1.0), &[]).unwrap();
        assert_eq!(indices, vec![0, 1, 2, 0, 2, 3]);
    }

    #[test]
    fn test_square_with_hole() {
        let outer = rect(0.0, 0.0, 10.0, 10.0);
        let mut hole = rect(3.0, 3.0, 7.0, 7.0);
        hole.reverse();
        let indices = triangulate_rings(&outer, &[hole.clone()]).unwrap();
        let mut points = outer;
        points.extend(hole);
        let tri = Triangulation { points, indices };
        assert_relative_eq!(tri.area().abs(), 84.0, epsilon = 1e-9);
        assert_eq!(tri.triangle_count(), 8);
    }

    #[test]
    fn test_too_few_points() {
        assert!(triangulate_rings(&[Point2::new(0.0, 0.0)], &[]).is_err());
    }
}
