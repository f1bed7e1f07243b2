// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Open or closed curves made of straight and arc edges

use crate::config::Options;
use crate::error::{Error, Result};
use crate::flags::{PolyCreateFlags, PolyFlags};
use crate::handle::{ContourHandle, EdgeHandle, Stamp, VertexHandle};
use crate::kernel::check::{self, CheckFlags, CheckReport, DefectKind, RepairOutcome};
use crate::kernel::cut::{cut_polyline, CutStatus};
use crate::kernel::edit;
use crate::kernel::fillet::{max_fillet, round_all, round_vertex, CornerKind};
use crate::kernel::flat::rings_from_flat;
use crate::kernel::offset::offset_ring;
use crate::kernel::store::{reverse_ring, segment_ring, transform_ring, Node, PolylineStore};
use crate::multi::MultiPolyline2D;
use crate::shape::{EdgeRef, PolygonShape, VertexRef};
use crate::user_data::UserData;
use polyform_core::tolerance::{points_coincide, POINT_EPS};
use polyform_core::vector::{cross, Side};
use polyform_core::{ArcDivParams, Box2D, Edge2D, HalfPlane2D, Point2, PolyArcRec, Transform2D, Vector2};
use std::sync::Arc;

/// Position on a polyline: an edge index and a parameter along it
///
/// Conversions to and from points and distances round-trip within
/// tolerance only.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CutParam {
    edge: usize,
    t: f64,
}

impl CutParam {
    #[inline]
    pub fn edge(&self) -> usize {
        self.edge
    }

    #[inline]
    pub fn t(&self) -> f64 {
        self.t
    }

    fn key(&self) -> f64 {
        self.edge as f64 + self.t
    }
}

/// Pieces of a polyline kept by a cut
#[derive(Debug, Clone)]
pub struct PolylineCutResult<V = (), E = (), P = ()> {
    pub pieces: MultiPolyline2D<V, E, P>,
    /// The whole polyline was inside and `pieces` holds it unchanged
    pub full_in: bool,
    pub status: CutStatus,
}

/// A single open or closed curve
#[derive(Debug)]
pub struct Polyline2D<V = (), E = (), P = ()> {
    stamp: Stamp,
    store: Arc<PolylineStore<V, E, P>>,
}

impl<V, E, P> Clone for Polyline2D<V, E, P> {
    fn clone(&self) -> Self {
        Self {
            stamp: Stamp::fresh(),
            store: Arc::clone(&self.store),
        }
    }
}

impl<V: UserData, E: UserData, P: UserData> PartialEq for Polyline2D<V, E, P> {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.store, &other.store) || *self.store == *other.store
    }
}

impl<V: UserData, E: UserData, P: UserData> Default for Polyline2D<V, E, P> {
    fn default() -> Self {
        Self::from_store(PolylineStore::empty(PolyFlags::default()))
    }
}

impl<V, E, P> Polyline2D<V, E, P>
where
    V: UserData,
    E: UserData,
    P: UserData,
{
    pub(crate) fn from_store(store: PolylineStore<V, E, P>) -> Self {
        Self {
            stamp: Stamp::fresh(),
            store: Arc::new(store),
        }
    }

    #[inline]
    pub(crate) fn store(&self) -> &PolylineStore<V, E, P> {
        &self.store
    }

    fn store_mut(&mut self) -> &mut PolylineStore<V, E, P> {
        Arc::make_mut(&mut self.store)
    }

    fn structure_mut(&mut self) -> &mut PolylineStore<V, E, P> {
        self.stamp.bump();
        Arc::make_mut(&mut self.store)
    }

    /// Build from flat arrays
    ///
    /// No coordinates give an empty polyline; a single vertex is an error.
    pub fn create(coords: &[Point2<f64>], arcs: &[PolyArcRec], closed: bool, flags: PolyCreateFlags) -> Result<Self> {
        let mut rings = rings_from_flat::<V, E>(coords, arcs, &[], flags, closed)?;
        let mut nodes = rings.pop().unwrap_or_default();
        let mut store = PolylineStore::empty(PolyFlags::from_create_flags(flags));
        if nodes.is_empty() {
            return Ok(Self::from_store(store));
        }
        if nodes.len() < 2 {
            return Err(Error::DegenerateInput("a polyline needs at least 2 vertices".into()));
        }
        if !closed {
            if let Some(end) = nodes.last_mut() {
                end.arc_angle = 0.0;
            }
        }
        store.nodes = nodes;
        store.closed = closed;
        Ok(Self::from_store(store))
    }

    pub fn from_points(points: &[Point2<f64>], closed: bool) -> Result<Self> {
        Self::create(points, &[], closed, PolyCreateFlags::IDX_REF_IN_ARC_FROM_ZERO)
    }

    /// Closed polyline following one contour of a polygon
    pub fn from_contour<C: UserData>(shape: &PolygonShape<V, E, C, P>, contour: ContourHandle) -> Result<Self> {
        shape.contour_polyline(contour)
    }

    // ------------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------------

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.store.nodes.is_empty()
    }

    #[inline]
    pub fn is_closed(&self) -> bool {
        self.store.closed
    }

    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.store.nodes.len()
    }

    #[inline]
    pub fn edge_count(&self) -> usize {
        self.store.edge_count()
    }

    #[inline]
    pub fn flags(&self) -> PolyFlags {
        self.store.flags
    }

    pub fn length(&self) -> f64 {
        self.store.length()
    }

    pub fn bounding_box(&self) -> Option<Box2D> {
        self.store.bbox()
    }

    pub fn polyline_data(&self) -> &P {
        &self.store.data
    }

    pub fn shares_storage_with(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.store, &other.store)
    }

    pub fn vertices(&self) -> impl Iterator<Item = VertexHandle> + '_ {
        (0..self.store.nodes.len()).map(move |i| VertexHandle::new(self.stamp, i))
    }

    pub fn edges(&self) -> impl Iterator<Item = EdgeHandle> + '_ {
        (0..self.store.edge_count()).map(move |i| EdgeHandle::new(self.stamp, i))
    }

    fn vertex_index(&self, h: VertexHandle) -> Result<usize> {
        h.resolve(self.stamp, self.store.nodes.len())
    }

    fn edge_index(&self, h: EdgeHandle) -> Result<usize> {
        h.resolve(self.stamp, self.store.edge_count())
    }

    pub fn vertex(&self, h: VertexHandle) -> Result<VertexRef<'_, V>> {
        let i = self.vertex_index(h)?;
        let node = &self.store.nodes[i];
        Ok(VertexRef {
            handle: h,
            point: node.point,
            data: &node.data,
            contour: ContourHandle::new(self.stamp, 0),
        })
    }

    pub fn edge(&self, h: EdgeHandle) -> Result<EdgeRef<'_, E>> {
        let i = self.edge_index(h)?;
        let next = (i + 1) % self.store.nodes.len();
        Ok(EdgeRef {
            handle: h,
            geometry: self.store.edge(i),
            data: &self.store.nodes[i].edge_data,
            begin: VertexHandle::new(self.stamp, i),
            end: VertexHandle::new(self.stamp, next),
        })
    }

    /// Side of `p` relative to the direction of travel
    ///
    /// Near a vertex the side is decided by both adjacent edges: on the
    /// outside of a turn a point must be on that side of both.
    pub fn point_position(&self, p: &Point2<f64>) -> Side {
        let (q, cp) = match self.nearest_point(p) {
            Some(found) => found,
            None => return Side::On,
        };
        if (p - q).norm() <= POINT_EPS {
            return Side::On;
        }
        let m = self.store.edge_count();
        let edge = self.store.edge(cp.edge);
        let at_start = cp.t <= 1e-9 && (self.store.closed || cp.edge > 0);
        let at_end = cp.t >= 1.0 - 1e-9 && (self.store.closed || cp.edge + 1 < m);
        let (t_in, t_out, v) = if at_start {
            let prev = self.store.edge((cp.edge + m - 1) % m);
            (prev.tangent_at(1.0), edge.tangent_at(0.0), edge.start())
        } else if at_end {
            let next = self.store.edge((cp.edge + 1) % m);
            (edge.tangent_at(1.0), next.tangent_at(0.0), edge.end())
        } else {
            let s = cross(&edge.tangent_at(cp.t), &(p - q));
            return if s > 0.0 { Side::Left } else { Side::Right };
        };
        let d = p - v;
        let s_in = cross(&t_in, &d);
        let s_out = cross(&t_out, &d);
        if cross(&t_in, &t_out) >= 0.0 {
            if s_in > 0.0 && s_out > 0.0 {
                Side::Left
            } else {
                Side::Right
            }
        } else if s_in < 0.0 && s_out < 0.0 {
            Side::Right
        } else {
            Side::Left
        }
    }

    /// Closest point of the curve to `p`
    pub fn nearest_point(&self, p: &Point2<f64>) -> Option<(Point2<f64>, CutParam)> {
        (0..self.store.edge_count())
            .map(|i| {
                let e = self.store.edge(i);
                let t = e.nearest_param(p);
                let q = e.point_at(t);
                ((p - q).norm(), q, CutParam { edge: i, t })
            })
            .min_by(|a, b| a.0.total_cmp(&b.0))
            .map(|(_, q, cp)| (q, cp))
    }

    // ------------------------------------------------------------------------
    // Curve positions
    // ------------------------------------------------------------------------

    fn check_param(&self, cp: &CutParam) -> Result<Edge2D> {
        let len = self.store.edge_count();
        if cp.edge >= len || !(0.0..=1.0).contains(&cp.t) {
            return Err(Error::IndexOutOfRange { index: cp.edge, len });
        }
        Ok(self.store.edge(cp.edge))
    }

    pub fn cut_point_to_cut_param(&self, p: &Point2<f64>) -> Option<CutParam> {
        self.nearest_point(p).map(|(_, cp)| cp)
    }

    pub fn cut_param_to_cut_point(&self, cp: &CutParam) -> Result<Point2<f64>> {
        Ok(self.check_param(cp)?.point_at(cp.t))
    }

    /// Position at arc length `distance` from the start, clamped to the ends
    pub fn distance_to_cut_param(&self, distance: f64) -> Option<CutParam> {
        let m = self.store.edge_count();
        if m == 0 {
            return None;
        }
        let mut left = distance.max(0.0);
        for i in 0..m {
            let len = self.store.edge(i).length();
            if left <= len || i + 1 == m {
                let t = if len > 0.0 { (left / len).min(1.0) } else { 0.0 };
                return Some(CutParam { edge: i, t });
            }
            left -= len;
        }
        None
    }

    pub fn cut_param_to_distance(&self, cp: &CutParam) -> Result<f64> {
        let edge = self.check_param(cp)?;
        let before: f64 = (0..cp.edge).map(|i| self.store.edge(i).length()).sum();
        Ok(before + edge.sub_edge(0.0, cp.t).length())
    }

    /// The part of the curve from `from` to `to`
    ///
    /// On a closed polyline the piece wraps past the closing vertex when
    /// `to` comes before `from`.
    pub fn cut_piece(&self, from: &CutParam, to: &CutParam) -> Result<Self> {
        self.check_param(from)?;
        self.check_param(to)?;
        let m = self.store.edge_count();
        let wraps = to.key() < from.key();
        if wraps && !self.store.closed {
            return Err(Error::DegenerateInput("piece runs backwards on an open polyline".into()));
        }
        let mut spans: Vec<(usize, f64, f64)> = Vec::new();
        let mut edge = from.edge;
        let mut t0 = from.t;
        let mut steps = 0;
        loop {
            let last = edge == to.edge && (steps > 0 || !wraps) && to.t >= t0;
            let t1 = if last { to.t } else { 1.0 };
            if (self.store.edge(edge).point_at(t1) - self.store.edge(edge).point_at(t0)).norm() > POINT_EPS {
                spans.push((edge, t0, t1));
            }
            if last {
                break;
            }
            edge = (edge + 1) % m;
            t0 = 0.0;
            steps += 1;
            if steps > m + 1 {
                break;
            }
        }
        if spans.is_empty() {
            return Err(Error::DegenerateInput("piece has zero length".into()));
        }
        let n = self.store.nodes.len();
        let mut nodes = Vec::with_capacity(spans.len() + 1);
        for &(i, t0, t1) in &spans {
            let sub = self.store.edge(i).sub_edge(t0, t1);
            let data = if t0 <= 0.0 {
                self.store.nodes[i].data.clone()
            } else {
                V::default()
            };
            nodes.push(Node::new(sub.start(), data, sub.sweep(), self.store.nodes[i].edge_data.clone()));
        }
        let &(i, _, t1) = &spans[spans.len() - 1];
        let data = if t1 >= 1.0 {
            self.store.nodes[(i + 1) % n].data.clone()
        } else {
            V::default()
        };
        nodes.push(Node::new(self.store.edge(i).point_at(t1), data, 0.0, E::default()));
        Ok(Self::from_store(PolylineStore {
            nodes,
            closed: false,
            data: self.store.data.clone(),
            flags: self.store.flags,
        }))
    }

    /// One open polyline per edge
    pub fn cut_at_vertices(&self) -> MultiPolyline2D<V, E, P> {
        let n = self.store.nodes.len();
        (0..self.store.edge_count())
            .map(|i| {
                let a = &self.store.nodes[i];
                let b = &self.store.nodes[(i + 1) % n];
                Self::from_store(PolylineStore {
                    nodes: vec![a.clone(), Node::new(b.point, b.data.clone(), 0.0, E::default())],
                    closed: false,
                    data: self.store.data.clone(),
                    flags: self.store.flags,
                })
            })
            .collect()
    }

    fn cut_by(&self, planes: &[HalfPlane2D]) -> PolylineCutResult<V, E, P> {
        let result = cut_polyline(&self.store, planes);
        let pieces = if result.full_in {
            std::iter::once(self.clone()).collect()
        } else {
            result.pieces.into_iter().map(Self::from_store).collect()
        };
        PolylineCutResult {
            pieces,
            full_in: result.full_in,
            status: result.status,
        }
    }

    /// Keep the parts inside the half-plane; pieces are never merged
    pub fn cut(&self, plane: &HalfPlane2D) -> PolylineCutResult<V, E, P> {
        self.cut_by(std::slice::from_ref(plane))
    }

    pub fn strip(&self, a: &HalfPlane2D, b: &HalfPlane2D) -> PolylineCutResult<V, E, P> {
        self.cut_by(&[*a, *b])
    }

    pub fn clip(&self, bbox: &Box2D) -> PolylineCutResult<V, E, P> {
        self.cut_by(&HalfPlane2D::from_box(bbox))
    }

    // ------------------------------------------------------------------------
    // Editing
    // ------------------------------------------------------------------------

    pub fn set_vertex_data(&mut self, h: VertexHandle, data: V) -> Result<()> {
        let i = self.vertex_index(h)?;
        self.store_mut().nodes[i].data = data;
        Ok(())
    }

    pub fn set_edge_data(&mut self, h: EdgeHandle, data: E) -> Result<()> {
        let i = self.edge_index(h)?;
        self.store_mut().nodes[i].edge_data = data;
        Ok(())
    }

    pub fn set_polyline_data(&mut self, data: P) {
        self.store_mut().data = data;
    }

    pub fn insert_vertex(&mut self, h: EdgeHandle, point: Point2<f64>) -> Result<VertexHandle> {
        let i = self.edge_index(h)?;
        let closed = self.store.closed;
        let at = edit::insert_vertex(&mut self.structure_mut().nodes, closed, i, point)?;
        Ok(VertexHandle::new(self.stamp, at))
    }

    pub fn delete_vertex(&mut self, h: VertexHandle) -> Result<()> {
        let i = self.vertex_index(h)?;
        let closed = self.store.closed;
        edit::delete_vertex(&mut self.structure_mut().nodes, closed, i)
    }

    pub fn move_vertex(&mut self, h: VertexHandle, point: Point2<f64>) -> Result<()> {
        let i = self.vertex_index(h)?;
        edit::move_vertex(&mut self.store_mut().nodes, i, point)
    }

    pub fn set_edge_angle(&mut self, h: EdgeHandle, angle: f64) -> Result<()> {
        let i = self.edge_index(h)?;
        let closed = self.store.closed;
        edit::set_edge_angle(&mut self.store_mut().nodes, closed, i, angle)
    }

    pub fn calc_max_vertex_fillet(&self, h: VertexHandle) -> Result<f64> {
        max_fillet(&self.store.nodes, self.store.closed, self.vertex_index(h)?)
    }

    pub fn fillet_vertex(&mut self, h: VertexHandle, radius: f64) -> Result<()> {
        self.round(h, CornerKind::Fillet, radius)
    }

    pub fn chamfer_vertex(&mut self, h: VertexHandle, distance: f64) -> Result<()> {
        self.round(h, CornerKind::Chamfer, distance)
    }

    fn round(&mut self, h: VertexHandle, kind: CornerKind, size: f64) -> Result<()> {
        let i = self.vertex_index(h)?;
        let closed = self.store.closed;
        let mut nodes = self.store.nodes.clone();
        round_vertex(&mut nodes, closed, i, kind, size)?;
        self.structure_mut().nodes = nodes;
        Ok(())
    }

    /// Fillet every corner between two straight edges; returns how many
    pub fn fillet_all_vertices(&mut self, radius: f64) -> Result<usize> {
        self.round_every(CornerKind::Fillet, radius)
    }

    pub fn chamfer_all_vertices(&mut self, distance: f64) -> Result<usize> {
        self.round_every(CornerKind::Chamfer, distance)
    }

    fn round_every(&mut self, kind: CornerKind, size: f64) -> Result<usize> {
        let closed = self.store.closed;
        let mut nodes = self.store.nodes.clone();
        let count = round_all(&mut nodes, closed, kind, size)?;
        if count > 0 {
            self.structure_mut().nodes = nodes;
        }
        Ok(count)
    }

    /// Offset every edge by `distance` to the right of travel
    pub fn offset_all_edges(&mut self, distance: f64) -> Result<()> {
        let closed = self.store.closed;
        let dists = vec![distance; self.store.edge_count()];
        let nodes = offset_ring(&self.store.nodes, closed, &dists)?;
        self.structure_mut().nodes = nodes;
        Ok(())
    }

    pub fn reverse(&mut self) {
        let closed = self.store.closed;
        reverse_ring(&mut self.structure_mut().nodes, closed);
    }

    /// Continue an open polyline with another that starts where it ends
    pub fn append(&mut self, other: &Self) -> Result<()> {
        if other.is_empty() {
            return Ok(());
        }
        if self.is_empty() {
            *self = Self::from_store((*other.store).clone());
            return Ok(());
        }
        if self.store.closed || other.store.closed {
            return Err(Error::DegenerateInput("closed polylines cannot be appended".into()));
        }
        let end = self.store.nodes[self.store.nodes.len() - 1].point;
        if !points_coincide(&end, &other.store.nodes[0].point) {
            return Err(Error::DegenerateInput("polylines do not meet".into()));
        }
        let store = self.structure_mut();
        store.nodes.pop();
        store.nodes.extend(other.store.nodes.iter().cloned());
        Ok(())
    }

    pub fn translate(&mut self, offset: &Vector2<f64>) {
        if self.is_empty() {
            return;
        }
        for node in self.store_mut().nodes.iter_mut() {
            node.point += offset;
        }
    }

    /// Apply `tran`; arcs become chords when the transform does not keep
    /// circles circular
    pub fn transform(&mut self, arc_div: &ArcDivParams, tran: &Transform2D) {
        if self.is_empty() || tran.is_identity() {
            return;
        }
        if !tran.preserves_arcs() {
            self.segment_up(arc_div);
        }
        transform_ring(&mut self.store_mut().nodes, tran);
    }

    /// Replace arcs by chords
    pub fn segment_up(&mut self, arc_div: &ArcDivParams) {
        let (nodes, changed) = segment_ring(&self.store.nodes, self.store.closed, arc_div);
        if changed {
            self.structure_mut().nodes = nodes;
        }
    }

    pub fn clear(&mut self) {
        let flags = self.store.flags;
        self.stamp.bump();
        self.store = Arc::new(PolylineStore::empty(flags));
    }

    pub fn check(&self, flags: CheckFlags, coord_upper_range: f64) -> CheckReport {
        check::check_polyline(&self.store, flags, coord_upper_range)
    }

    pub fn repair(&mut self, kind: DefectKind) -> Result<bool> {
        let mut store = (*self.store).clone();
        let changed = check::repair_polyline(&mut store, kind)?;
        if changed {
            *self.structure_mut() = store;
        }
        Ok(changed)
    }

    pub fn check_and_repair(&mut self, flags: CheckFlags, options: &Options) -> Result<RepairOutcome> {
        let range = options.coord_upper_range;
        let mut store = (*self.store).clone();
        let outcome = check::check_and_repair_loop(
            options.max_repair_iterations,
            &mut store,
            |s| check::check_polyline(s, flags, range),
            check::repair_polyline,
        )?;
        if outcome.modified {
            *self.structure_mut() = store;
        }
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::PI;

    fn zigzag() -> Polyline2D<u8, u8, ()> {
        Polyline2D::from_points(
            &[
                Point2::new(0.0, 0.0),
                Point2::new(4.0, 0.0),
                Point2::new(4.0, 3.0),
            ],
            false,
        )
        .unwrap()
    }

    #[test]
    fn test_create() {
        let line = zigzag();
        assert_eq!(line.vertex_count(), 3);
        assert_eq!(line.edge_count(), 2);
        assert_relative_eq!(line.length(), 7.0, epsilon = 1e-12);
        assert!(Polyline2D::<(), (), ()>::from_points(&[Point2::new(1.0, 1.0)], false).is_err());
        assert!(Polyline2D::<(), (), ()>::from_points(&[], false).unwrap().is_empty());
    }

    #[test]
    fn test_closed_arc_polyline() {
        let coords = [Point2::new(1.0, 0.0), Point2::new(-1.0, 0.0)];
        let arcs = [PolyArcRec::new(0, 1, PI), PolyArcRec::new(1, 0, PI)];
        let circle: Polyline2D = Polyline2D::create(&coords, &arcs, true, PolyCreateFlags::IDX_REF_IN_ARC_FROM_ZERO).unwrap();
        assert_relative_eq!(circle.length(), 2.0 * PI, epsilon = 1e-9);
    }

    #[test]
    fn test_point_position() {
        let line = zigzag();
        assert_eq!(line.point_position(&Point2::new(2.0, 1.0)), Side::Left);
        assert_eq!(line.point_position(&Point2::new(2.0, -1.0)), Side::Right);
        assert_eq!(line.point_position(&Point2::new(2.0, 0.0)), Side::On);
        // outside the corner at (4, 0)
        assert_eq!(line.point_position(&Point2::new(5.0, -1.0)), Side::Right);
        assert_eq!(line.point_position(&Point2::new(3.0, 1.0)), Side::Left);
    }

    #[test]
    fn test_cut_params() {
        let line = zigzag();
        let cp = line.distance_to_cut_param(5.0).unwrap();
        assert_eq!(cp.edge(), 1);
        assert_relative_eq!(cp.t(), 1.0 / 3.0, epsilon = 1e-12);
        let p = line.cut_param_to_cut_point(&cp).unwrap();
        assert_relative_eq!(p.y, 1.0, epsilon = 1e-12);
        let back = line.cut_point_to_cut_param(&p).unwrap();
        assert_relative_eq!(line.cut_param_to_distance(&back).unwrap(), 5.0, epsilon = 1e-9);
    }

    #[test]
    fn test_cut_piece() {
        let line = zigzag();
        let a = line.distance_to_cut_param(2.0).unwrap();
        let b = line.distance_to_cut_param(6.0).unwrap();
        let piece = line.cut_piece(&a, &b).unwrap();
        assert_eq!(piece.vertex_count(), 3);
        assert_relative_eq!(piece.length(), 4.0, epsilon = 1e-9);
        assert!(line.cut_piece(&b, &a).is_err());
    }

    #[test]
    fn test_cut_half_plane() {
        let line = zigzag();
        let keep_left = HalfPlane2D::new(Vector2::new(1.0, 0.0), 2.0).unwrap();
        let result = line.cut(&keep_left);
        assert!(!result.full_in);
        assert_eq!(result.pieces.len(), 1);
        assert_relative_eq!(result.pieces[0].length(), 2.0, epsilon = 1e-9);

        let everything = HalfPlane2D::new(Vector2::new(1.0, 0.0), 10.0).unwrap();
        let result = line.cut(&everything);
        assert!(result.full_in);
        assert!(result.pieces[0].shares_storage_with(&line));
    }

    #[test]
    fn test_fillet_and_handles() {
        let mut line = zigzag();
        let corner = line.vertices().nth(1).unwrap();
        assert_relative_eq!(line.calc_max_vertex_fillet(corner).unwrap(), 1.5, epsilon = 1e-12);
        line.fillet_vertex(corner, 1.0).unwrap();
        assert_eq!(line.vertex_count(), 4);
        assert!(matches!(line.vertex(corner), Err(Error::InvalidHandle)));
        assert_relative_eq!(line.length(), 7.0 - 2.0 + PI / 2.0, epsilon = 1e-9);
    }

    #[test]
    fn test_append_and_reverse() {
        let mut line = zigzag();
        let tail = Polyline2D::from_points(&[Point2::new(4.0, 3.0), Point2::new(0.0, 3.0)], false).unwrap();
        line.append(&tail).unwrap();
        assert_eq!(line.vertex_count(), 4);
        assert_relative_eq!(line.length(), 11.0, epsilon = 1e-12);
        line.reverse();
        let first = line.vertices().next().unwrap();
        assert_relative_eq!(line.vertex(first).unwrap().point.x, 0.0, epsilon = 1e-12);
        assert_relative_eq!(line.vertex(first).unwrap().point.y, 3.0, epsilon = 1e-12);
    }

    #[test]
    fn test_offset_open_polyline() {
        let mut line = zigzag();
        line.offset_all_edges(1.0).unwrap();
        let first = line.vertices().next().unwrap();
        assert_relative_eq!(line.vertex(first).unwrap().point.y, -1.0, epsilon = 1e-12);
        assert_relative_eq!(line.length(), 5.0 + 4.0, epsilon = 1e-9);
    }

    #[test]
    fn test_check_and_repair() {
        let mut line: Polyline2D = Polyline2D::from_points(
            &[
                Point2::new(0.0, 0.0),
                Point2::new(1.0, 0.0),
                Point2::new(1.0, 0.0),
                Point2::new(2.0, 0.0),
            ],
            false,
        )
        .unwrap();
        let outcome = line.check_and_repair(CheckFlags::ALL, &Options::default()).unwrap();
        assert!(outcome.succeeded);
        assert!(outcome.modified);
        assert_eq!(line.vertex_count(), 2);
    }
}
