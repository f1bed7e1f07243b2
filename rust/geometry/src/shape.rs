// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Shared polygon storage handle with copy-on-write and the queries common
//! to irregular and regularized polygons

use crate::error::Result;
use crate::flags::PolyFlags;
use crate::handle::{ContourHandle, EdgeHandle, Stamp, VertexHandle};
use crate::kernel::store::{ring_length, ring_winding, PolygonStore, PolylineStore};
use crate::polyline::Polyline2D;
use crate::user_data::UserData;
use polyform_core::tolerance::POINT_EPS;
use polyform_core::{Box2D, Edge2D, Point2, Vector2};
use std::sync::Arc;

/// Chords per arc when integrating moments
const MOMENT_SEGMENTS: usize = 64;

/// Where a point lies relative to a polygon
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointPosition {
    Inside,
    OnBoundary,
    Outside,
}

/// Read-only view of a vertex
#[derive(Debug, Clone, Copy)]
pub struct VertexRef<'a, V> {
    pub handle: VertexHandle,
    pub point: Point2<f64>,
    pub data: &'a V,
    pub contour: ContourHandle,
}

/// Read-only view of an edge
#[derive(Debug, Clone, Copy)]
pub struct EdgeRef<'a, E> {
    pub handle: EdgeHandle,
    pub geometry: Edge2D,
    pub data: &'a E,
    pub begin: VertexHandle,
    pub end: VertexHandle,
}

impl<E> EdgeRef<'_, E> {
    #[inline]
    pub fn arc_angle(&self) -> f64 {
        self.geometry.sweep()
    }
}

/// Read-only view of a contour
#[derive(Debug, Clone, Copy)]
pub struct ContourRef<'a, C> {
    pub handle: ContourHandle,
    pub data: &'a C,
    pub vertex_count: usize,
    pub is_hole: bool,
}

/// Polygon storage behind an `Arc`, shared until mutated
///
/// Clones share storage and get a new owner id, so handles issued by one
/// clone are rejected by the other.
#[derive(Debug)]
pub struct PolygonShape<V = (), E = (), C = (), P = ()> {
    stamp: Stamp,
    store: Arc<PolygonStore<V, E, C, P>>,
}

impl<V, E, C, P> Clone for PolygonShape<V, E, C, P> {
    fn clone(&self) -> Self {
        Self {
            stamp: Stamp::fresh(),
            store: Arc::clone(&self.store),
        }
    }
}

impl<V, E, C, P> PartialEq for PolygonShape<V, E, C, P>
where
    V: UserData,
    E: UserData,
    C: UserData,
    P: UserData,
{
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.store, &other.store) || *self.store == *other.store
    }
}

impl<V, E, C, P> PolygonShape<V, E, C, P>
where
    V: UserData,
    E: UserData,
    C: UserData,
    P: UserData,
{
    pub(crate) fn from_store(store: PolygonStore<V, E, C, P>) -> Self {
        Self::from_arc(Arc::new(store))
    }

    pub(crate) fn from_arc(store: Arc<PolygonStore<V, E, C, P>>) -> Self {
        Self {
            stamp: Stamp::fresh(),
            store,
        }
    }

    #[inline]
    pub(crate) fn store(&self) -> &PolygonStore<V, E, C, P> {
        &self.store
    }

    #[inline]
    pub(crate) fn shared(&self) -> &Arc<PolygonStore<V, E, C, P>> {
        &self.store
    }

    #[inline]
    pub(crate) fn stamp(&self) -> Stamp {
        self.stamp
    }

    /// Mutable storage for edits that keep every handle valid
    pub(crate) fn store_mut(&mut self) -> &mut PolygonStore<V, E, C, P> {
        Arc::make_mut(&mut self.store)
    }

    /// Mutable storage for edits that renumber vertices, edges or contours
    pub(crate) fn structure_mut(&mut self) -> &mut PolygonStore<V, E, C, P> {
        self.stamp.bump();
        Arc::make_mut(&mut self.store)
    }

    pub(crate) fn replace_store(&mut self, store: PolygonStore<V, E, C, P>) {
        self.stamp.bump();
        self.store = Arc::new(store);
    }

    /// Detach from storage shared with clones
    pub fn copy_on_write(&mut self) {
        Arc::make_mut(&mut self.store);
    }

    /// Whether both objects still point at the same storage
    pub fn shares_storage_with(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.store, &other.store)
    }

    // ------------------------------------------------------------------------
    // Handles
    // ------------------------------------------------------------------------

    pub(crate) fn vertex_index(&self, h: VertexHandle) -> Result<usize> {
        h.resolve(self.stamp, self.store.nodes.len())
    }

    pub(crate) fn edge_index(&self, h: EdgeHandle) -> Result<usize> {
        h.resolve(self.stamp, self.store.nodes.len())
    }

    pub(crate) fn contour_index(&self, h: ContourHandle) -> Result<usize> {
        h.resolve(self.stamp, self.store.contours.len())
    }

    /// Contour and contour-local index of a vertex or edge
    pub(crate) fn locate(&self, index: usize) -> (usize, usize) {
        let c = self.store.contour_of(index);
        (c, index - self.store.contour_range(c).start)
    }

    pub fn vertices(&self) -> impl Iterator<Item = VertexHandle> + '_ {
        (0..self.store.nodes.len()).map(move |i| VertexHandle::new(self.stamp, i))
    }

    pub fn edges(&self) -> impl Iterator<Item = EdgeHandle> + '_ {
        (0..self.store.nodes.len()).map(move |i| EdgeHandle::new(self.stamp, i))
    }

    pub fn contours(&self) -> impl Iterator<Item = ContourHandle> + '_ {
        (0..self.store.contours.len()).map(move |c| ContourHandle::new(self.stamp, c))
    }

    pub fn contour_vertices(&self, h: ContourHandle) -> Result<Vec<VertexHandle>> {
        let c = self.contour_index(h)?;
        Ok(self
            .store
            .contour_range(c)
            .map(|i| VertexHandle::new(self.stamp, i))
            .collect())
    }

    pub fn vertex(&self, h: VertexHandle) -> Result<VertexRef<'_, V>> {
        let i = self.vertex_index(h)?;
        let node = &self.store.nodes[i];
        Ok(VertexRef {
            handle: h,
            point: node.point,
            data: &node.data,
            contour: ContourHandle::new(self.stamp, self.store.contour_of(i)),
        })
    }

    pub fn edge(&self, h: EdgeHandle) -> Result<EdgeRef<'_, E>> {
        let i = self.edge_index(h)?;
        Ok(EdgeRef {
            handle: h,
            geometry: self.store.edge(i),
            data: &self.store.nodes[i].edge_data,
            begin: VertexHandle::new(self.stamp, i),
            end: VertexHandle::new(self.stamp, self.store.next_vertex(i)),
        })
    }

    pub fn contour(&self, h: ContourHandle) -> Result<ContourRef<'_, C>> {
        let c = self.contour_index(h)?;
        Ok(ContourRef {
            handle: h,
            data: &self.store.contours[c].data,
            vertex_count: self.store.contour_range(c).len(),
            is_hole: c > 0,
        })
    }

    pub fn next_vertex(&self, h: VertexHandle) -> Result<VertexHandle> {
        let i = self.vertex_index(h)?;
        Ok(VertexHandle::new(self.stamp, self.store.next_vertex(i)))
    }

    pub fn prev_vertex(&self, h: VertexHandle) -> Result<VertexHandle> {
        let i = self.vertex_index(h)?;
        Ok(VertexHandle::new(self.stamp, self.store.prev_vertex(i)))
    }

    /// Edge leaving the vertex
    pub fn edge_from(&self, h: VertexHandle) -> Result<EdgeHandle> {
        Ok(EdgeHandle::new(self.stamp, self.vertex_index(h)?))
    }

    // ------------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------------

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.store.nodes.len()
    }

    #[inline]
    pub fn edge_count(&self) -> usize {
        self.store.nodes.len()
    }

    #[inline]
    pub fn contour_count(&self) -> usize {
        self.store.contour_count()
    }

    pub fn hole_count(&self) -> usize {
        self.store.contour_count().saturating_sub(1)
    }

    pub fn has_arcs(&self) -> bool {
        self.store.has_arcs()
    }

    #[inline]
    pub fn flags(&self) -> PolyFlags {
        self.store.flags
    }

    #[inline]
    pub fn polygon_data(&self) -> &P {
        &self.store.data
    }

    pub fn signed_area(&self) -> f64 {
        self.store.signed_area()
    }

    pub fn area(&self) -> f64 {
        self.store.signed_area().abs()
    }

    pub fn perimeter(&self) -> f64 {
        self.store.perimeter()
    }

    pub fn contour_area(&self, h: ContourHandle) -> Result<f64> {
        Ok(self.store.contour_signed_area(self.contour_index(h)?))
    }

    pub fn contour_perimeter(&self, h: ContourHandle) -> Result<f64> {
        Ok(ring_length(self.store.ring(self.contour_index(h)?), true))
    }

    pub fn bounding_box(&self) -> Option<Box2D> {
        self.store.bbox()
    }

    /// Area centroid; arcs are integrated over fine chords
    pub fn centroid(&self) -> Option<Point2<f64>> {
        let mut area = 0.0;
        let mut mx = 0.0;
        let mut my = 0.0;
        for (_, edge) in self.store.edges() {
            let n = if edge.is_arc() { MOMENT_SEGMENTS } else { 1 };
            let mut prev = edge.start();
            for k in 1..=n {
                let cur = edge.point_at(k as f64 / n as f64);
                let c = prev.x * cur.y - cur.x * prev.y;
                area += 0.5 * c;
                mx += (prev.x + cur.x) * c;
                my += (prev.y + cur.y) * c;
                prev = cur;
            }
        }
        if area.abs() <= polyform_core::tolerance::AREA_EPS {
            return None;
        }
        Some(Point2::new(mx / (6.0 * area), my / (6.0 * area)))
    }

    pub fn point_position(&self, p: &Point2<f64>) -> PointPosition {
        if self.distance_to_point(p) <= POINT_EPS {
            return PointPosition::OnBoundary;
        }
        match self.store.bbox() {
            Some(bbox) if bbox.contains(p, POINT_EPS) => {}
            _ => return PointPosition::Outside,
        }
        let winding: i32 = self.store.rings().map(|ring| ring_winding(ring, p)).sum();
        if winding > 0 {
            PointPosition::Inside
        } else {
            PointPosition::Outside
        }
    }

    /// Unsigned distance from `p` to the nearest edge
    pub fn distance_to_point(&self, p: &Point2<f64>) -> f64 {
        self.store
            .edges()
            .map(|(_, e)| e.distance_to(p))
            .fold(f64::INFINITY, f64::min)
    }

    /// Points where the segment `a -> b` meets the boundary, ordered from `a`
    pub fn segment_intersections(&self, a: &Point2<f64>, b: &Point2<f64>) -> Vec<Point2<f64>> {
        let seg = Edge2D::new(*a, *b, 0.0);
        let bbox = seg.bounding_box();
        let mut hits: Vec<(f64, Point2<f64>)> = self
            .store
            .edges()
            .filter(|(_, e)| e.bounding_box().overlaps(&bbox, POINT_EPS))
            .flat_map(|(_, e)| seg.intersections(&e).into_iter().map(|h| (h.t_self, h.point)))
            .collect();
        hits.sort_by(|x, y| x.0.total_cmp(&y.0));
        hits.dedup_by(|x, y| (x.1 - y.1).norm() <= POINT_EPS);
        hits.into_iter().map(|(_, p)| p).collect()
    }

    /// Contour as a closed polyline with the same vertex and edge order
    pub fn contour_polyline(&self, h: ContourHandle) -> Result<Polyline2D<V, E, P>> {
        let c = self.contour_index(h)?;
        Ok(Polyline2D::from_store(PolylineStore {
            nodes: self.store.ring_owned(c),
            closed: true,
            data: self.store.data.clone(),
            flags: self.store.flags,
        }))
    }

    // ------------------------------------------------------------------------
    // User data
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

    pub fn set_contour_data(&mut self, h: ContourHandle, data: C) -> Result<()> {
        let c = self.contour_index(h)?;
        self.store_mut().contours[c].data = data;
        Ok(())
    }

    pub fn set_polygon_data(&mut self, data: P) {
        self.store_mut().data = data;
    }

    /// Move every vertex; handles stay valid
    pub fn translate(&mut self, offset: &Vector2<f64>) {
        if self.store.is_empty() {
            return;
        }
        for node in self.store_mut().nodes.iter_mut() {
            node.point += offset;
        }
    }
}
