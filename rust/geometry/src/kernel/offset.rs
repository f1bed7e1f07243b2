// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Edge offsetting
//!
//! A positive distance moves an edge to the right of its direction of
//! travel. For a regular polygon that is outward for the counter-clockwise
//! outer contour and the clockwise holes alike, so positive offsets grow
//! the solid. Arcs keep their center and change radius.

use super::store::{ring_edge, ring_edge_count, Node, PolygonStore};
use crate::error::{Error, Result};
use crate::user_data::UserData;
use polyform_core::arc::{circle_circle_points, circle_line_params};
use polyform_core::tolerance::{ANGLE_EPS, AREA_EPS, EPS, POINT_EPS};
use polyform_core::vector::{cross, direction_angle, normalize_angle, right_normal, unit_at};
use polyform_core::{Point2, Vector2};
use std::f64::consts::{PI, TAU};

const MAX_FIX_AREA_ITERATIONS: usize = 50;

#[derive(Debug, Clone, Copy)]
enum Carrier {
    Line { origin: Point2<f64>, dir: Vector2<f64> },
    Circle { center: Point2<f64>, radius: f64 },
}

#[derive(Debug, Clone, Copy)]
struct Shifted {
    carrier: Carrier,
    start: Point2<f64>,
    end: Point2<f64>,
    in_tangent: Vector2<f64>,
    out_tangent: Vector2<f64>,
    sweep: f64,
    chord: Vector2<f64>,
}

#[derive(Debug, Clone, Copy)]
enum Join {
    Point(Point2<f64>),
    /// Parallel edges with different offsets are bridged by a straight edge
    Gap(Point2<f64>, Point2<f64>),
}

fn shift_edge<V, E>(ring: &[Node<V, E>], i: usize, d: f64) -> Result<Shifted> {
    let edge = ring_edge(ring, i);
    let chord = edge.chord();
    let in_tangent = edge.tangent_at(0.0);
    let out_tangent = edge.tangent_at(1.0);
    match edge.arc() {
        None => {
            let len = chord.norm();
            if len <= EPS {
                return Err(Error::DegenerateInput(format!("edge {} has zero length", i)));
            }
            let dir = chord / len;
            let shift = right_normal(&dir) * d;
            Ok(Shifted {
                carrier: Carrier::Line {
                    origin: edge.start() + shift,
                    dir,
                },
                start: edge.start() + shift,
                end: edge.end() + shift,
                in_tangent,
                out_tangent,
                sweep: 0.0,
                chord,
            })
        }
        Some(arc) => {
            let radius = arc.radius + d * arc.sweep.signum();
            if radius <= POINT_EPS {
                return Err(Error::DegenerateInput(format!(
                    "offset {} collapses arc edge {} of radius {}",
                    d, i, arc.radius
                )));
            }
            Ok(Shifted {
                carrier: Carrier::Circle {
                    center: arc.center,
                    radius,
                },
                start: arc.center + unit_at(arc.start_angle) * radius,
                end: arc.center + unit_at(arc.end_angle()) * radius,
                in_tangent,
                out_tangent,
                sweep: arc.sweep,
                chord,
            })
        }
    }
}

fn carrier_crossings(a: &Carrier, b: &Carrier) -> Vec<Point2<f64>> {
    match (a, b) {
        (Carrier::Line { origin: p, dir: u }, Carrier::Line { origin: q, dir: v }) => {
            let denom = cross(u, v);
            if denom.abs() <= EPS {
                return Vec::new();
            }
            let s = cross(&(q - p), v) / denom;
            vec![p + u * s]
        }
        (Carrier::Line { origin, dir }, Carrier::Circle { center, radius })
        | (Carrier::Circle { center, radius }, Carrier::Line { origin, dir }) => {
            circle_line_params(center, *radius, origin, dir)
                .into_iter()
                .map(|s| origin + dir * s)
                .collect()
        }
        (
            Carrier::Circle {
                center: c0,
                radius: r0,
            },
            Carrier::Circle {
                center: c1,
                radius: r1,
            },
        ) => circle_circle_points(c0, *r0, c1, *r1).into_iter().collect(),
    }
}

fn join(prev: &Shifted, next: &Shifted) -> Join {
    let reference = Point2::from((prev.end.coords + next.start.coords) * 0.5);
    let ta = prev.out_tangent;
    let tb = next.in_tangent;
    let tangential = cross(&ta, &tb).abs() <= ANGLE_EPS * 10.0 && ta.dot(&tb) > 0.0;
    if tangential {
        if (prev.end - next.start).norm() <= POINT_EPS {
            return Join::Point(reference);
        }
        return Join::Gap(prev.end, next.start);
    }
    carrier_crossings(&prev.carrier, &next.carrier)
        .into_iter()
        .min_by(|a, b| (a - reference).norm().total_cmp(&(b - reference).norm()))
        .map_or(Join::Gap(prev.end, next.start), Join::Point)
}

/// Sweep of the offset arc between its new end points, on the same side
/// of zero as the original
fn rebuilt_sweep(center: &Point2<f64>, start: &Point2<f64>, end: &Point2<f64>, original: f64) -> Option<f64> {
    let raw = normalize_angle(direction_angle(&(end - center)) - direction_angle(&(start - center)));
    let sweep = raw + TAU * ((original - raw) / TAU).round();
    if sweep * original <= 0.0 || (sweep - original).abs() > PI {
        return None;
    }
    Some(sweep)
}

/// Offset every edge of a ring by its own distance
///
/// `dists` has one entry per edge. Open rings keep their end points on the
/// shifted first and last edge.
pub(crate) fn offset_ring<V, E>(ring: &[Node<V, E>], closed: bool, dists: &[f64]) -> Result<Vec<Node<V, E>>>
where
    V: UserData,
    E: UserData,
{
    let n = ring.len();
    let m = ring_edge_count(ring, closed);
    if m == 0 {
        return Ok(ring.to_vec());
    }
    if dists.len() != m {
        return Err(Error::IndexOutOfRange {
            index: dists.len(),
            len: m,
        });
    }
    let shifted = (0..m)
        .map(|i| shift_edge(ring, i, dists[i]))
        .collect::<Result<Vec<_>>>()?;

    let mut out: Vec<Node<V, E>> = Vec::with_capacity(n + 2);
    let mut edge_start = vec![0usize; m];
    for j in 0..n {
        let joined = if !closed && j == 0 {
            Join::Point(shifted[0].start)
        } else if !closed && j == n - 1 {
            Join::Point(shifted[m - 1].end)
        } else {
            join(&shifted[(j + m - 1) % m], &shifted[j % m])
        };
        let node = &ring[j];
        match joined {
            Join::Point(p) => {
                if j < m {
                    edge_start[j] = out.len();
                }
                out.push(Node::new(p, node.data.clone(), node.arc_angle, node.edge_data.clone()));
            }
            Join::Gap(a, b) => {
                out.push(Node::new(a, node.data.clone(), 0.0, E::default()));
                if j < m {
                    edge_start[j] = out.len();
                }
                out.push(Node::new(b, V::default(), node.arc_angle, node.edge_data.clone()));
            }
        }
    }
    if !closed {
        if let Some(last) = out.last_mut() {
            last.arc_angle = 0.0;
        }
    }

    let len = out.len();
    for (i, s) in shifted.iter().enumerate() {
        let k = edge_start[i];
        let start = out[k].point;
        let end = out[(k + 1) % len].point;
        match s.carrier {
            Carrier::Line { .. } => {
                if (end - start).dot(&s.chord) <= 0.0 {
                    return Err(Error::DegenerateInput(format!(
                        "edge {} vanishes under offset {}",
                        i, dists[i]
                    )));
                }
            }
            Carrier::Circle { center, .. } => match rebuilt_sweep(&center, &start, &end, s.sweep) {
                Some(sweep) => out[k].arc_angle = sweep,
                None => {
                    return Err(Error::DegenerateInput(format!(
                        "arc edge {} inverts under offset {}",
                        i, dists[i]
                    )))
                }
            },
        }
    }
    Ok(out)
}

/// Offset the edges of a polygon; `dist(contour, edge)` uses contour-local
/// edge indices
pub(crate) fn offset_store<V, E, C, P>(
    store: &PolygonStore<V, E, C, P>,
    mut dist: impl FnMut(usize, usize) -> f64,
) -> Result<PolygonStore<V, E, C, P>>
where
    V: UserData,
    E: UserData,
    C: UserData,
    P: UserData,
{
    let mut out = PolygonStore::empty(store.flags);
    out.data = store.data.clone();
    for c in 0..store.contour_count() {
        let ring = store.ring(c);
        let dists: Vec<f64> = (0..ring.len()).map(|e| dist(c, e)).collect();
        let ring = if dists.iter().all(|d| *d == 0.0) {
            ring.to_vec()
        } else {
            offset_ring(ring, true, &dists)?
        };
        out.push_ring(ring, store.contours[c].data.clone());
    }
    Ok(out)
}

/// Move one edge parallel to itself until the polygon has `target` area
///
/// Secant iteration starting from the straight-edge estimate
/// `(target - area) / length`.
pub(crate) fn offset_edge_fix_area<V, E, C, P>(
    store: &PolygonStore<V, E, C, P>,
    contour: usize,
    edge: usize,
    target: f64,
) -> Result<PolygonStore<V, E, C, P>>
where
    V: UserData,
    E: UserData,
    C: UserData,
    P: UserData,
{
    let ring = store.ring(contour);
    let length = ring_edge(ring, edge).length();
    if length <= EPS {
        return Err(Error::DegenerateInput(format!("edge {} has zero length", edge)));
    }
    let attempt = |d: f64| -> Result<(PolygonStore<V, E, C, P>, f64)> {
        let moved = offset_store(store, |c, e| if c == contour && e == edge { d } else { 0.0 })?;
        let residual = moved.signed_area() - target;
        Ok((moved, residual))
    };

    let tol = AREA_EPS * target.abs().max(1.0);
    let mut d0 = 0.0;
    let mut f0 = store.signed_area() - target;
    if f0.abs() <= tol {
        return Ok(store.clone());
    }
    let mut d1 = -f0 / length;
    let (mut best, mut f1) = attempt(d1)?;
    for _ in 0..MAX_FIX_AREA_ITERATIONS {
        if f1.abs() <= tol {
            return Ok(best);
        }
        let slope = (f1 - f0) / (d1 - d0);
        if slope.abs() <= EPS {
            break;
        }
        let d2 = d1 - f1 / slope;
        d0 = d1;
        f0 = f1;
        d1 = d2;
        let (moved, f) = attempt(d1)?;
        best = moved;
        f1 = f;
    }
    tracing::warn!(edge, target, residual = f1, "edge offset did not reach the requested area");
    Err(Error::DegenerateInput(format!(
        "edge {} cannot be moved to reach area {}",
        edge, target
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flags::PolyFlags;
    use crate::kernel::store::ring_signed_area;
    use approx::assert_relative_eq;

    fn square(s: f64) -> Vec<Node<u8, u8>> {
        vec![
            Node::new(Point2::new(0.0, 0.0), 1, 0.0, 10),
            Node::new(Point2::new(s, 0.0), 2, 0.0, 20),
            Node::new(Point2::new(s, s), 3, 0.0, 30),
            Node::new(Point2::new(0.0, s), 4, 0.0, 40),
        ]
    }

    #[test]
    fn test_offset_square_both_ways() {
        let grown = offset_ring(&square(10.0), true, &[1.0; 4]).unwrap();
        assert_eq!(grown.len(), 4);
        assert_relative_eq!(ring_signed_area(&grown), 144.0, epsilon = 1e-9);
        assert_relative_eq!(grown[0].point.x, -1.0, epsilon = 1e-12);
        assert_eq!(grown[2].data, 3);
        assert_eq!(grown[2].edge_data, 30);

        let shrunk = offset_ring(&square(10.0), true, &[-1.0; 4]).unwrap();
        assert_relative_eq!(ring_signed_area(&shrunk), 64.0, epsilon = 1e-9);
    }

    #[test]
    fn test_offset_disk() {
        let disk: Vec<Node<(), ()>> = vec![
            Node::new(Point2::new(1.0, 0.0), (), PI, ()),
            Node::new(Point2::new(-1.0, 0.0), (), PI, ()),
        ];
        let grown = offset_ring(&disk, true, &[1.0, 1.0]).unwrap();
        assert_relative_eq!(ring_signed_area(&grown), 4.0 * PI, epsilon = 1e-9);
        assert!(offset_ring(&disk, true, &[-1.0, -1.0]).is_err());
    }

    #[test]
    fn test_offset_too_far_inverts() {
        assert!(matches!(
            offset_ring(&square(2.0), true, &[-1.5; 4]),
            Err(Error::DegenerateInput(_))
        ));
    }

    #[test]
    fn test_parallel_edges_get_connector() {
        // straight run split at a collinear vertex
        let ring: Vec<Node<(), ()>> = vec![
            Node::plain(Point2::new(0.0, 0.0)),
            Node::plain(Point2::new(5.0, 0.0)),
            Node::plain(Point2::new(10.0, 0.0)),
            Node::plain(Point2::new(10.0, 10.0)),
            Node::plain(Point2::new(0.0, 10.0)),
        ];
        let out = offset_ring(&ring, true, &[1.0, 0.0, 0.0, 0.0, 0.0]).unwrap();
        assert_eq!(out.len(), 6);
        assert_relative_eq!(ring_signed_area(&out), 105.0, epsilon = 1e-9);
    }

    #[test]
    fn test_fix_area() {
        let mut store: PolygonStore<u8, u8, (), ()> = PolygonStore::empty(PolyFlags::default());
        store.push_ring(square(10.0), ());
        let fixed = offset_edge_fix_area(&store, 0, 0, 120.0).unwrap();
        assert_relative_eq!(fixed.signed_area(), 120.0, epsilon = 1e-6);
        assert_relative_eq!(fixed.nodes[0].point.y, -2.0, epsilon = 1e-9);
    }
}
