// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Polygonal hull by angular sweep
//!
//! The hull is not convex in general. Vertices are swept by angle around
//! the area centroid of the input; a vertex survives when no input edge
//! lies farther out along its ray. Consecutive survivors are joined by
//! the input edge between them when there is one (arcs included) and by a
//! straight edge otherwise. Reflex notches are then removed and the
//! result is merged with the input silhouettes, so the hull always
//! encloses every input polygon.

use crate::config::Options;
use crate::flags::HoleHandling;
use crate::kernel::boolean::unify_all;
use crate::kernel::regularize::regularize;
use crate::kernel::store::{ring_edge, Node, PolygonStore};
use crate::multi::MultiPolygon2D;
use crate::polygon::{create_result, Polygon2D};
use crate::user_data::UserData;
use polyform_core::tolerance::{ANGLE_EPS, POINT_EPS};
use polyform_core::vector::{cross, direction_angle, normalize_angle_positive, Side};
use polyform_core::{ArcDivParams, Edge2D, Point2, Vector2};
use std::cmp::Ordering;
use std::f64::consts::FRAC_PI_2;

/// Orders points by angle around an origin and classifies points against
/// edges as seen from that origin
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DirectionComparator {
    origin: Point2<f64>,
    forward: f64,
}

impl DirectionComparator {
    /// `None` when `forward` has no direction
    pub fn new(origin: Point2<f64>, forward: Vector2<f64>) -> Option<Self> {
        if forward.norm() <= POINT_EPS {
            return None;
        }
        Some(Self {
            origin,
            forward: direction_angle(&forward),
        })
    }

    #[inline]
    pub fn origin(&self) -> Point2<f64> {
        self.origin
    }

    /// Counter-clockwise angle from the forward direction, in `[0, 2π)`
    pub fn angle_of(&self, p: &Point2<f64>) -> f64 {
        let a = normalize_angle_positive(direction_angle(&(p - self.origin)) - self.forward);
        if a >= std::f64::consts::TAU - ANGLE_EPS {
            0.0
        } else {
            a
        }
    }

    /// Angular order; points on the same ray are ordered nearest first
    pub fn compare(&self, a: &Point2<f64>, b: &Point2<f64>) -> Ordering {
        let (aa, ab) = (self.angle_of(a), self.angle_of(b));
        if (aa - ab).abs() > ANGLE_EPS {
            return aa.total_cmp(&ab);
        }
        (a - self.origin).norm().total_cmp(&(b - self.origin).norm())
    }

    /// Where `p` lies relative to `edge` along the ray from the origin
    /// through `p`
    ///
    /// `Left` means the edge crosses the ray beyond `p`, `Right` that it
    /// crosses before `p`. Curved edges are solved for the ray/arc crossing
    /// farthest out. `None` when the ray misses the edge.
    pub fn classify(&self, edge: &Edge2D, p: &Point2<f64>) -> Option<Side> {
        let ray = p - self.origin;
        let dist = ray.norm();
        if dist <= POINT_EPS {
            return None;
        }
        let dir = ray / dist;
        let crossing = edge
            .line_params(&self.origin, &dir)
            .into_iter()
            .map(|t| (edge.point_at(t) - self.origin).dot(&dir))
            .filter(|s| *s > POINT_EPS)
            .fold(None, |best: Option<f64>, s| Some(best.map_or(s, |b| b.max(s))))?;
        Some(if (crossing - dist).abs() <= POINT_EPS {
            Side::On
        } else if dist < crossing {
            Side::Left
        } else {
            Side::Right
        })
    }
}

#[derive(Debug, Clone, Copy)]
struct Corner {
    piece: usize,
    node: usize,
}

/// Collects polygons and builds one hull around all of them
#[derive(Debug, Clone)]
pub struct PolygonalHullCreator<V = (), E = (), C = (), P = ()> {
    inputs: Vec<Polygon2D<V, E, C, P>>,
    arc_div: ArcDivParams,
}

impl<V, E, C, P> Default for PolygonalHullCreator<V, E, C, P> {
    fn default() -> Self {
        Self {
            inputs: Vec::new(),
            arc_div: Options::global().arc_div,
        }
    }
}

impl<V, E, C, P> PolygonalHullCreator<V, E, C, P>
where
    V: UserData,
    E: UserData,
    C: UserData,
    P: UserData,
{
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_arc_div(arc_div: ArcDivParams) -> Self {
        Self {
            inputs: Vec::new(),
            arc_div,
        }
    }

    pub fn add(&mut self, polygon: &Polygon2D<V, E, C, P>) {
        if !polygon.is_empty() {
            self.inputs.push(polygon.clone());
        }
    }

    pub fn add_multi(&mut self, polygons: &MultiPolygon2D<V, E, C, P>) {
        for p in polygons.iter() {
            self.add(p);
        }
    }

    /// The hull; empty when nothing was added
    pub fn create(&self) -> Polygon2D<V, E, C, P> {
        let stores: Vec<_> = self.inputs.iter().map(|p| p.store()).collect();
        let silhouettes = unify_all(&stores, HoleHandling::WithoutHoles, &self.arc_div);
        let Some(first) = silhouettes.first() else {
            return Polygon2D::default();
        };
        if silhouettes.len() == 1 && !first.has_arcs() && is_convex(first.ring(0)) {
            return Polygon2D::from_store(first.clone());
        }

        let Some(comparator) = comparator_for(&silhouettes) else {
            return Polygon2D::from_store(first.clone());
        };
        let mut ring = sweep(&silhouettes, &comparator);
        remove_reflex(&mut ring);
        tracing::debug!(inputs = self.inputs.len(), vertices = ring.len(), "hull swept");

        let mut hull = PolygonStore::empty(first.flags);
        hull.data = first.data.clone();
        if ring.len() >= 3 {
            hull.push_ring(ring, C::default());
        }
        let (result, _) = regularize(&hull, &self.arc_div);
        let this = [Polygon2D::from_store(hull)];
        let swept = create_result(result, &this, &[]);

        let mut parts: Vec<&PolygonStore<V, E, C, P>> = swept.iter().map(|p| p.store()).collect();
        parts.extend(silhouettes.iter());
        let mut merged: MultiPolygon2D<V, E, C, P> = unify_all(&parts, HoleHandling::WithoutHoles, &self.arc_div)
            .into_iter()
            .map(Polygon2D::from_store)
            .collect();
        if merged.len() > 1 {
            tracing::warn!(pieces = merged.len(), "hull did not connect every input, keeping the largest piece");
        }
        merged.pop_largest().unwrap_or_default()
    }
}

fn is_convex<V, E>(ring: &[Node<V, E>]) -> bool {
    let n = ring.len();
    (0..n).all(|i| {
        let a = ring[i].point;
        let b = ring[(i + 1) % n].point;
        let c = ring[(i + 2) % n].point;
        cross(&(b - a), &(c - b)) >= -POINT_EPS
    })
}

/// Area centroid of the silhouettes, looking at the farthest vertex
fn comparator_for<V, E, C, P>(silhouettes: &[PolygonStore<V, E, C, P>]) -> Option<DirectionComparator>
where
    V: UserData,
    E: UserData,
    C: UserData,
    P: UserData,
{
    let mut weight = 0.0;
    let mut sum = Vector2::zeros();
    for s in silhouettes {
        let shape = crate::shape::PolygonShape::from_store(s.clone());
        if let Some(c) = shape.centroid() {
            let a = shape.area();
            sum += c.coords * a;
            weight += a;
        }
    }
    if weight <= POINT_EPS {
        return None;
    }
    let origin = Point2::from(sum / weight);
    let far = silhouettes
        .iter()
        .flat_map(|s| s.nodes.iter())
        .map(|n| n.point)
        .max_by(|a, b| (a - origin).norm().total_cmp(&(b - origin).norm()))?;
    DirectionComparator::new(origin, far - origin)
}

/// Swept ring through the outermost vertices of every outer contour
fn sweep<V, E, C, P>(silhouettes: &[PolygonStore<V, E, C, P>], cmp: &DirectionComparator) -> Vec<Node<V, E>>
where
    V: UserData,
    E: UserData,
    C: UserData,
    P: UserData,
{
    let edges: Vec<(usize, usize, Edge2D)> = silhouettes
        .iter()
        .enumerate()
        .flat_map(|(piece, s)| {
            let ring = s.ring(0);
            (0..ring.len()).map(move |i| (piece, i, ring_edge(ring, i)))
        })
        .collect();

    let mut corners: Vec<Corner> = Vec::new();
    for (piece, s) in silhouettes.iter().enumerate() {
        let n = s.ring(0).len();
        for node in 0..n {
            let p = s.ring(0)[node].point;
            if (p - cmp.origin()).norm() <= POINT_EPS {
                continue;
            }
            let prev = (node + n - 1) % n;
            let hidden = edges.iter().any(|(ep, ei, edge)| {
                let incident = *ep == piece && (*ei == node || *ei == prev);
                !incident && cmp.classify(edge, &p) == Some(Side::Left)
            });
            if !hidden {
                corners.push(Corner { piece, node });
            }
        }
    }
    let point = |c: &Corner| silhouettes[c.piece].ring(0)[c.node].point;
    corners.sort_by(|a, b| cmp.compare(&point(a), &point(b)));

    let count = corners.len();
    (0..count)
        .map(|k| {
            let cur = corners[k];
            let next = corners[(k + 1) % count];
            let ring = silhouettes[cur.piece].ring(0);
            let source = &ring[cur.node];
            let follows_input = next.piece == cur.piece && next.node == (cur.node + 1) % ring.len();
            if follows_input {
                source.clone()
            } else {
                Node::new(source.point, source.data.clone(), 0.0, E::default())
            }
        })
        .collect()
}

/// Drop vertices whose interior angle exceeds 270 degrees, joining their
/// neighbours by a straight edge
fn remove_reflex<V, E: Default>(ring: &mut Vec<Node<V, E>>) {
    let mut i = 0;
    let mut stable = 0;
    while ring.len() > 3 && stable < ring.len() {
        let n = ring.len();
        let prev = (i + n - 1) % n;
        let incoming = ring_edge(ring, prev).tangent_at(1.0);
        let outgoing = ring_edge(ring, i).tangent_at(0.0);
        let turn = cross(&incoming, &outgoing).atan2(incoming.dot(&outgoing));
        if turn < -FRAC_PI_2 - ANGLE_EPS {
            ring.remove(i);
            let prev = if i == 0 { ring.len() - 1 } else { i - 1 };
            ring[prev].arc_angle = 0.0;
            ring[prev].edge_data = E::default();
            i = prev;
            stable = 0;
        } else {
            i = (i + 1) % n;
            stable += 1;
        }
    }
}
