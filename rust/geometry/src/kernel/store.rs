// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Flat vertex/edge/contour storage
//!
//! A polygon is a list of [`Node`]s partitioned into contours by exclusive
//! end indices. Node `i` owns its vertex and the edge leaving it, so edge `i`
//! runs from vertex `i` to the next vertex of the same contour.

use crate::flags::PolyFlags;
use crate::user_data::UserData;
use polyform_core::tolerance::{points_coincide, ANGLE_EPS, AREA_EPS, EPS};
use polyform_core::vector::cross;
use polyform_core::{ArcDivParams, Box2D, Edge2D, Point2, Transform2D};
use std::ops::Range;

/// One vertex together with the edge that leaves it
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Node<V, E> {
    pub point: Point2<f64>,
    pub data: V,
    pub arc_angle: f64,
    pub edge_data: E,
}

impl<V, E> Node<V, E> {
    pub fn new(point: Point2<f64>, data: V, arc_angle: f64, edge_data: E) -> Self {
        Self {
            point,
            data,
            arc_angle,
            edge_data,
        }
    }
}

impl<V: Default, E: Default> Node<V, E> {
    pub fn plain(point: Point2<f64>) -> Self {
        Self::new(point, V::default(), 0.0, E::default())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ContourRec<C> {
    /// Exclusive end index into the node list
    pub end: usize,
    pub data: C,
}

/// Storage shared by irregular and regularized polygons
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct PolygonStore<V, E, C, P> {
    pub nodes: Vec<Node<V, E>>,
    pub contours: Vec<ContourRec<C>>,
    pub data: P,
    pub flags: PolyFlags,
}

/// Storage of a single open or closed curve
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct PolylineStore<V, E, P> {
    pub nodes: Vec<Node<V, E>>,
    pub closed: bool,
    pub data: P,
    pub flags: PolyFlags,
}

// ============================================================================
// Ring helpers
// ============================================================================

/// Edge `i` of a ring; the closing edge wraps to node 0
pub(crate) fn ring_edge<V, E>(ring: &[Node<V, E>], i: usize) -> Edge2D {
    let n = ring.len();
    let next = if i + 1 == n { 0 } else { i + 1 };
    Edge2D::new(ring[i].point, ring[next].point, ring[i].arc_angle)
}

pub(crate) fn ring_edge_count<V, E>(ring: &[Node<V, E>], closed: bool) -> usize {
    match (ring.len(), closed) {
        (0, _) | (1, _) => 0,
        (n, true) => n,
        (n, false) => n - 1,
    }
}

/// Signed area of a closed ring, positive for counter-clockwise
pub(crate) fn ring_signed_area<V, E>(ring: &[Node<V, E>]) -> f64 {
    if ring.len() < 2 {
        return 0.0;
    }
    (0..ring.len()).map(|i| ring_edge(ring, i).area_contribution()).sum()
}

/// Whether a closed ring encloses nothing at all
///
/// Net signed area is not enough: the lobes of a self-crossing ring may
/// cancel while each still covers ground.
pub(crate) fn ring_is_flat<V, E>(ring: &[Node<V, E>]) -> bool {
    let Some(origin) = ring.first().map(|n| n.point) else {
        return true;
    };
    let mut spread = 0.0;
    for i in 0..ring.len() {
        let edge = ring_edge(ring, i);
        spread += 0.5 * cross(&(edge.start() - origin), &(edge.end() - origin)).abs();
        if let Some(arc) = edge.arc() {
            spread += arc.segment_area().abs();
        }
    }
    spread <= AREA_EPS
}

pub(crate) fn ring_length<V, E>(ring: &[Node<V, E>], closed: bool) -> f64 {
    (0..ring_edge_count(ring, closed))
        .map(|i| ring_edge(ring, i).length())
        .sum()
}

pub(crate) fn ring_bbox<V, E>(ring: &[Node<V, E>], closed: bool) -> Option<Box2D> {
    let mut bbox = Box2D::from_points(ring.iter().map(|n| &n.point))?;
    for i in 0..ring_edge_count(ring, closed) {
        if ring[i].arc_angle != 0.0 {
            bbox = bbox.union(&ring_edge(ring, i).bounding_box());
        }
    }
    Some(bbox)
}

/// Winding number of `p` around a closed ring; `p` must be off the boundary
pub(crate) fn ring_winding<V, E>(ring: &[Node<V, E>], p: &Point2<f64>) -> i32 {
    let total: f64 = (0..ring.len()).map(|i| ring_edge(ring, i).winding_angle(p)).sum();
    (total / std::f64::consts::TAU).round() as i32
}

pub(crate) fn ring_distance<V, E>(ring: &[Node<V, E>], closed: bool, p: &Point2<f64>) -> f64 {
    (0..ring_edge_count(ring, closed))
        .map(|i| ring_edge(ring, i).distance_to(p))
        .fold(f64::INFINITY, f64::min)
}

/// Remove zero-length edges
///
/// When edge `k` collapses, node `k` keeps its vertex data and takes over
/// the edge leaving node `k + 1`. A collapsed closing edge drops the last
/// node.
pub(crate) fn dedup_ring<V, E>(ring: &mut Vec<Node<V, E>>, closed: bool) -> bool {
    let mut changed = false;
    let mut k = 0;
    while ring.len() > 1 && k + 1 < ring.len() {
        if points_coincide(&ring[k].point, &ring[k + 1].point) {
            let next = ring.remove(k + 1);
            ring[k].arc_angle = next.arc_angle;
            ring[k].edge_data = next.edge_data;
            changed = true;
        } else {
            k += 1;
        }
    }
    if closed && ring.len() > 1 {
        let last = ring.len() - 1;
        if points_coincide(&ring[last].point, &ring[0].point) {
            ring.pop();
            changed = true;
        }
    }
    changed
}

/// Reverse the direction of travel, keeping edge data on the same edges
pub(crate) fn reverse_ring<V, E: Default>(ring: &mut Vec<Node<V, E>>, closed: bool) {
    let n = ring.len();
    if n < 2 {
        return;
    }
    let mut edges: Vec<(f64, E)> = ring
        .iter_mut()
        .map(|node| (node.arc_angle, std::mem::take(&mut node.edge_data)))
        .collect();
    ring.reverse();
    let edge_count = if closed { n } else { n - 1 };
    for k in 0..n {
        if k < edge_count {
            // new edge k is old edge n-2-k walked backwards
            let old = (n + n - 2 - k) % n;
            let (angle, data) = std::mem::replace(&mut edges[old], (0.0, E::default()));
            ring[k].arc_angle = -angle;
            ring[k].edge_data = data;
        } else {
            ring[k].arc_angle = 0.0;
            ring[k].edge_data = E::default();
        }
    }
}

fn same_direction(a: &Edge2D, b: &Edge2D) -> bool {
    if a.is_arc() || b.is_arc() {
        return false;
    }
    let da = a.chord();
    let db = b.chord();
    let la = da.norm();
    let lb = db.norm();
    if la <= EPS || lb <= EPS {
        return false;
    }
    (cross(&da, &db) / (la * lb)).abs() <= ANGLE_EPS * 10.0 && da.dot(&db) > 0.0
}

/// Indices of vertices between two straight edges pointing the same way
pub(crate) fn same_dir_vertices<V, E>(ring: &[Node<V, E>], closed: bool) -> Vec<usize> {
    let n = ring.len();
    let min = if closed { 3 } else { 2 };
    if n <= min {
        return Vec::new();
    }
    let range = if closed { 0..n } else { 1..n - 1 };
    range
        .filter(|&i| {
            let prev = (i + n - 1) % n;
            same_direction(&ring_edge(ring, prev), &ring_edge(ring, i))
        })
        .collect()
}

/// Merge consecutive straight edges pointing the same way
pub(crate) fn merge_same_dir<V, E>(ring: &mut Vec<Node<V, E>>, closed: bool) -> bool {
    let mut changed = false;
    loop {
        let min = if closed { 3 } else { 2 };
        if ring.len() <= min {
            return changed;
        }
        match same_dir_vertices(ring, closed).first() {
            Some(&i) => {
                // the previous node keeps its edge, now reaching further
                ring.remove(i);
                changed = true;
            }
            None => return changed,
        }
    }
}

/// Replace every arc by chords; chord vertices get default data and the
/// chords copy the arc's edge data
pub(crate) fn segment_ring<V: UserData, E: UserData>(
    ring: &[Node<V, E>],
    closed: bool,
    params: &ArcDivParams,
) -> (Vec<Node<V, E>>, bool) {
    let edge_count = ring_edge_count(ring, closed);
    let mut out = Vec::with_capacity(ring.len());
    let mut changed = false;
    for (i, node) in ring.iter().enumerate() {
        let edge = if i < edge_count { Some(ring_edge(ring, i)) } else { None };
        match edge.as_ref().and_then(|e| e.arc()) {
            Some(arc) => {
                out.push(Node::new(node.point, node.data.clone(), 0.0, node.edge_data.clone()));
                for p in arc.interior_points(params) {
                    out.push(Node::new(p, V::default(), 0.0, node.edge_data.clone()));
                }
                changed = true;
            }
            None => {
                let mut n = node.clone();
                if n.arc_angle != 0.0 {
                    n.arc_angle = 0.0;
                    changed = true;
                }
                out.push(n);
            }
        }
    }
    (out, changed)
}

/// Apply an arc-preserving transform; mirroring negates sweep angles
pub(crate) fn transform_ring<V, E>(ring: &mut [Node<V, E>], tran: &Transform2D) {
    let mirror = tran.is_mirroring();
    for node in ring.iter_mut() {
        node.point = tran.apply_point(&node.point);
        if mirror {
            node.arc_angle = -node.arc_angle;
        }
    }
}

// ============================================================================
// Polygon storage
// ============================================================================

impl<V, E, C, P> PolygonStore<V, E, C, P>
where
    V: UserData,
    E: UserData,
    C: UserData,
    P: UserData,
{
    pub fn empty(flags: PolyFlags) -> Self {
        Self {
            nodes: Vec::new(),
            contours: Vec::new(),
            data: P::default(),
            flags,
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
        self.contours.clear();
        self.data = P::default();
    }

    #[inline]
    pub fn contour_count(&self) -> usize {
        self.contours.len()
    }

    pub fn contour_range(&self, c: usize) -> Range<usize> {
        let start = if c == 0 { 0 } else { self.contours[c - 1].end };
        start..self.contours[c].end
    }

    #[inline]
    pub fn ring(&self, c: usize) -> &[Node<V, E>] {
        &self.nodes[self.contour_range(c)]
    }

    /// Contour containing a flat vertex index
    pub fn contour_of(&self, v: usize) -> usize {
        self.contours.partition_point(|rec| rec.end <= v)
    }

    pub fn next_vertex(&self, v: usize) -> usize {
        let range = self.contour_range(self.contour_of(v));
        if v + 1 == range.end {
            range.start
        } else {
            v + 1
        }
    }

    pub fn prev_vertex(&self, v: usize) -> usize {
        let range = self.contour_range(self.contour_of(v));
        if v == range.start {
            range.end - 1
        } else {
            v - 1
        }
    }

    pub fn edge(&self, i: usize) -> Edge2D {
        let next = self.next_vertex(i);
        Edge2D::new(self.nodes[i].point, self.nodes[next].point, self.nodes[i].arc_angle)
    }

    pub fn rings(&self) -> impl Iterator<Item = &[Node<V, E>]> + '_ {
        (0..self.contours.len()).map(move |c| self.ring(c))
    }

    pub fn ring_owned(&self, c: usize) -> Vec<Node<V, E>> {
        self.ring(c).to_vec()
    }

    /// Replace the nodes of contour `c`, shifting later contours
    pub fn replace_ring(&mut self, c: usize, ring: Vec<Node<V, E>>) {
        let range = self.contour_range(c);
        let old_len = range.len();
        let new_len = ring.len();
        self.nodes.splice(range, ring);
        for rec in self.contours[c..].iter_mut() {
            rec.end = rec.end + new_len - old_len;
        }
    }

    pub fn push_ring(&mut self, ring: Vec<Node<V, E>>, data: C) {
        self.nodes.extend(ring);
        self.contours.push(ContourRec {
            end: self.nodes.len(),
            data,
        });
    }

    pub fn remove_ring(&mut self, c: usize) {
        let range = self.contour_range(c);
        let len = range.len();
        self.nodes.drain(range);
        self.contours.remove(c);
        for rec in self.contours[c..].iter_mut() {
            rec.end -= len;
        }
    }

    pub fn contour_signed_area(&self, c: usize) -> f64 {
        ring_signed_area(self.ring(c))
    }

    pub fn signed_area(&self) -> f64 {
        self.rings().map(ring_signed_area).sum()
    }

    pub fn perimeter(&self) -> f64 {
        self.rings().map(|r| ring_length(r, true)).sum()
    }

    pub fn bbox(&self) -> Option<Box2D> {
        self.rings()
            .filter_map(|r| ring_bbox(r, true))
            .reduce(|a, b| a.union(&b))
    }

    pub fn edges(&self) -> impl Iterator<Item = (usize, Edge2D)> + '_ {
        (0..self.nodes.len()).map(move |i| (i, self.edge(i)))
    }

    pub fn has_arcs(&self) -> bool {
        self.nodes.iter().any(|n| n.arc_angle != 0.0)
    }

    pub fn reverse_contour(&mut self, c: usize) {
        let mut ring = self.ring_owned(c);
        reverse_ring(&mut ring, true);
        self.replace_ring(c, ring);
    }

    pub fn segment_arcs(&mut self, params: &ArcDivParams) -> bool {
        let mut changed = false;
        for c in 0..self.contours.len() {
            let (ring, ring_changed) = segment_ring(self.ring(c), true, params);
            if ring_changed {
                self.replace_ring(c, ring);
                changed = true;
            }
        }
        changed
    }

    /// Transform in place; arcs must already be segmented unless the
    /// transform is a similarity. Mirroring reverses contours so that the
    /// orientation convention is kept.
    pub fn apply_transform(&mut self, tran: &Transform2D) {
        transform_ring(&mut self.nodes, tran);
        if tran.is_mirroring() {
            for c in 0..self.contours.len() {
                self.reverse_contour(c);
            }
        }
    }

    pub fn dedup(&mut self) -> bool {
        let mut changed = false;
        for c in 0..self.contours.len() {
            let mut ring = self.ring_owned(c);
            if dedup_ring(&mut ring, true) {
                self.replace_ring(c, ring);
                changed = true;
            }
        }
        changed
    }

    /// Contours of every part in one store; data and flags come from the
    /// first part
    pub fn concat(parts: &[&Self]) -> Self {
        let mut out = match parts.first() {
            Some(first) => {
                let mut s = Self::empty(first.flags);
                s.data = first.data.clone();
                s
            }
            None => Self::empty(PolyFlags::default()),
        };
        for part in parts {
            for c in 0..part.contour_count() {
                out.push_ring(part.ring_owned(c), part.contours[c].data.clone());
            }
        }
        out
    }

    pub fn merge_same_dir_edges(&mut self) -> bool {
        let mut changed = false;
        for c in 0..self.contours.len() {
            let mut ring = self.ring_owned(c);
            if merge_same_dir(&mut ring, true) {
                self.replace_ring(c, ring);
                changed = true;
            }
        }
        changed
    }
}

// ============================================================================
// Polyline storage
// ============================================================================

impl<V, E, P> PolylineStore<V, E, P>
where
    V: UserData,
    E: UserData,
    P: UserData,
{
    pub fn empty(flags: PolyFlags) -> Self {
        Self {
            nodes: Vec::new(),
            closed: false,
            data: P::default(),
            flags,
        }
    }

    #[inline]
    pub fn edge_count(&self) -> usize {
        ring_edge_count(&self.nodes, self.closed)
    }

    #[inline]
    pub fn edge(&self, i: usize) -> Edge2D {
        ring_edge(&self.nodes, i)
    }

    pub fn length(&self) -> f64 {
        ring_length(&self.nodes, self.closed)
    }

    pub fn bbox(&self) -> Option<Box2D> {
        ring_bbox(&self.nodes, self.closed)
    }
}
