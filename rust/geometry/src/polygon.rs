// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Regularized polygons
//!
//! A [`Polygon2D`] has one counter-clockwise outer contour followed by
//! clockwise holes nested inside it, and no contour touches itself or
//! another. Operations that could break this return a
//! [`MultiPolygon2D`] built by regularizing the edited storage.

use crate::config::Options;
use crate::error::{Error, Result};
use crate::flags::{Boundary, PolyFlags};
use crate::handle::{ContourHandle, EdgeHandle, VertexHandle};
use crate::irregular::IrregularPolygon2D;
use crate::kernel::boolean::{self, BoolOp, BooleanResult, DetailedRelation};
use crate::kernel::check::{check_polygon, CheckFlags, CheckReport};
use crate::kernel::cut::{cut_polygon, CutStatus};
use crate::kernel::edit;
use crate::kernel::fillet::{max_fillet, round_all, round_vertex, CornerKind};
use crate::kernel::offset::{offset_edge_fix_area, offset_store};
use crate::kernel::regularize::regularize;
use crate::kernel::sections;
use crate::kernel::store::{Node, PolygonStore};
use crate::multi::MultiPolygon2D;
use crate::shape::PolygonShape;
use crate::triangulation::{triangulate_store, Triangulation};
use crate::user_data::UserData;
use polyform_core::{ArcDivParams, Box2D, HalfPlane2D, Point2, Transform2D};
use std::ops::{Deref, DerefMut};

type Store<V, E, C, P> = PolygonStore<V, E, C, P>;

/// Pieces of a polygon kept by a half-plane cut
#[derive(Debug, Clone)]
pub struct CutResult<V = (), E = (), C = (), P = ()> {
    pub pieces: MultiPolygon2D<V, E, C, P>,
    /// The polygon was entirely inside and `pieces` shares its storage
    pub full_in: bool,
    pub status: CutStatus,
}

/// Materialize a kernel result, aliasing operand storage where the result
/// is an operand
pub(crate) fn create_result<V, E, C, P>(
    result: BooleanResult<Store<V, E, C, P>>,
    this: &[Polygon2D<V, E, C, P>],
    param: &[Polygon2D<V, E, C, P>],
) -> MultiPolygon2D<V, E, C, P>
where
    V: UserData,
    E: UserData,
    C: UserData,
    P: UserData,
{
    match result {
        BooleanResult::NewPolygons(stores) => stores.into_iter().map(Polygon2D::from_store).collect(),
        BooleanResult::ResultSameAsThis => this.iter().cloned().collect(),
        BooleanResult::ResultSameAsFirstParameter => param.iter().cloned().collect(),
        BooleanResult::ResultThisAndParameter => this.iter().chain(param.iter()).cloned().collect(),
        BooleanResult::EmptyPolygon => MultiPolygon2D::new(),
    }
}

/// Regularize edited storage into a collection
pub(crate) fn regularized<V, E, C, P>(store: Store<V, E, C, P>, arc_div: &ArcDivParams) -> MultiPolygon2D<V, E, C, P>
where
    V: UserData,
    E: UserData,
    C: UserData,
    P: UserData,
{
    let (result, _) = regularize(&store, arc_div);
    let this = [Polygon2D::from_store(store)];
    create_result(result, &this, &[])
}

/// A regularized polygon with one outer contour and optional holes
#[derive(Debug, Clone)]
pub struct Polygon2D<V = (), E = (), C = (), P = ()> {
    shape: PolygonShape<V, E, C, P>,
}

impl<V, E, C, P> PartialEq for Polygon2D<V, E, C, P>
where
    V: UserData,
    E: UserData,
    C: UserData,
    P: UserData,
{
    fn eq(&self, other: &Self) -> bool {
        self.shape == other.shape
    }
}

impl<V, E, C, P> Deref for Polygon2D<V, E, C, P> {
    type Target = PolygonShape<V, E, C, P>;

    fn deref(&self) -> &Self::Target {
        &self.shape
    }
}

impl<V, E, C, P> DerefMut for Polygon2D<V, E, C, P> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.shape
    }
}

impl<V, E, C, P> Default for Polygon2D<V, E, C, P>
where
    V: UserData,
    E: UserData,
    C: UserData,
    P: UserData,
{
    fn default() -> Self {
        Self::from_store(PolygonStore::empty(PolyFlags::default()))
    }
}

impl<V, E, C, P> Polygon2D<V, E, C, P>
where
    V: UserData,
    E: UserData,
    C: UserData,
    P: UserData,
{
    /// Wrap storage that already satisfies the regularity invariant
    pub(crate) fn from_store(store: Store<V, E, C, P>) -> Self {
        Self {
            shape: PolygonShape::from_store(store),
        }
    }

    pub(crate) fn from_shape(shape: PolygonShape<V, E, C, P>) -> Self {
        Self { shape }
    }

    /// Axis-aligned rectangle; empty for a degenerate box
    pub fn from_box(bbox: &Box2D, flags: PolyFlags) -> Self {
        let mut store = PolygonStore::empty(flags);
        if !bbox.is_degenerate(polyform_core::tolerance::POINT_EPS) {
            store.push_ring(bbox.corners().iter().copied().map(Node::plain).collect(), C::default());
        }
        Self::from_store(store)
    }

    /// Shares storage with the returned irregular polygon
    pub fn to_irregular(&self) -> IrregularPolygon2D<V, E, C, P> {
        IrregularPolygon2D::from_shape(self.shape.clone())
    }

    /// Already regular: one element sharing this polygon's storage
    pub fn regularize(&self) -> MultiPolygon2D<V, E, C, P> {
        if self.is_empty() {
            return MultiPolygon2D::new();
        }
        std::iter::once(self.clone()).collect()
    }

    pub fn clear(&mut self) {
        let flags = self.flags();
        self.shape.replace_store(PolygonStore::empty(flags));
    }

    // ------------------------------------------------------------------------
    // Booleans
    // ------------------------------------------------------------------------

    pub fn relation(&self, other: &Self) -> DetailedRelation {
        boolean::relation(self.store(), other.store(), &Options::global().arc_div)
    }

    fn boolean(&self, other: &Self, op: BoolOp, boundary: Boundary) -> (MultiPolygon2D<V, E, C, P>, DetailedRelation) {
        let (result, relation) = boolean::boolean(self.store(), other.store(), op, boundary, &Options::global().arc_div);
        let out = create_result(
            result,
            std::slice::from_ref(self),
            std::slice::from_ref(other),
        );
        (out, relation)
    }

    /// Union; with `Boundary::Open` polygons that only touch stay apart
    pub fn unify(&self, other: &Self, boundary: Boundary) -> MultiPolygon2D<V, E, C, P> {
        self.boolean(other, BoolOp::Union, boundary).0
    }

    pub fn unify_detailed(&self, other: &Self, boundary: Boundary) -> (MultiPolygon2D<V, E, C, P>, DetailedRelation) {
        self.boolean(other, BoolOp::Union, boundary)
    }

    pub fn intersect(&self, other: &Self, boundary: Boundary) -> MultiPolygon2D<V, E, C, P> {
        self.boolean(other, BoolOp::Intersection, boundary).0
    }

    pub fn intersect_detailed(
        &self,
        other: &Self,
        boundary: Boundary,
    ) -> (MultiPolygon2D<V, E, C, P>, DetailedRelation) {
        self.boolean(other, BoolOp::Intersection, boundary)
    }

    /// Difference `self - other`
    pub fn substract(&self, other: &Self, boundary: Boundary) -> MultiPolygon2D<V, E, C, P> {
        self.boolean(other, BoolOp::Difference, boundary).0
    }

    pub fn substract_detailed(
        &self,
        other: &Self,
        boundary: Boundary,
    ) -> (MultiPolygon2D<V, E, C, P>, DetailedRelation) {
        self.boolean(other, BoolOp::Difference, boundary)
    }

    // ------------------------------------------------------------------------
    // Cuts
    // ------------------------------------------------------------------------

    fn cut_by(&self, planes: &[HalfPlane2D]) -> CutResult<V, E, C, P> {
        let (result, status) = cut_polygon(self.store(), planes, &Options::global().arc_div);
        let full_in = matches!(result, BooleanResult::ResultSameAsThis);
        CutResult {
            pieces: create_result(result, std::slice::from_ref(self), &[]),
            full_in,
            status,
        }
    }

    /// Keep the part inside `plane`
    pub fn cut(&self, plane: &HalfPlane2D) -> CutResult<V, E, C, P> {
        self.cut_by(std::slice::from_ref(plane))
    }

    /// Keep the part between two half-planes
    pub fn strip(&self, a: &HalfPlane2D, b: &HalfPlane2D) -> CutResult<V, E, C, P> {
        self.cut_by(&[*a, *b])
    }

    pub fn clip(&self, bbox: &Box2D) -> CutResult<V, E, C, P> {
        self.cut_by(&HalfPlane2D::from_box(bbox))
    }

    // ------------------------------------------------------------------------
    // Offsets, fillets and edits
    // ------------------------------------------------------------------------

    fn edited(&self, edit: impl FnOnce(&mut Store<V, E, C, P>) -> Result<()>) -> Result<MultiPolygon2D<V, E, C, P>> {
        let mut store = self.store().clone();
        edit(&mut store)?;
        Ok(regularized(store, &Options::global().arc_div))
    }

    fn contour_edit(
        &self,
        c: usize,
        edit: impl FnOnce(&mut Vec<Node<V, E>>) -> Result<()>,
    ) -> Result<MultiPolygon2D<V, E, C, P>> {
        self.edited(|store| {
            let mut ring = store.ring_owned(c);
            edit(&mut ring)?;
            store.replace_ring(c, ring);
            Ok(())
        })
    }

    pub fn offset_edge(&self, edge: EdgeHandle, distance: f64) -> Result<MultiPolygon2D<V, E, C, P>> {
        let (c, e) = self.locate(self.edge_index(edge)?);
        let store = offset_store(self.store(), |cc, ee| if cc == c && ee == e { distance } else { 0.0 })?;
        Ok(regularized(store, &Options::global().arc_div))
    }

    pub fn offset_contour(&self, contour: ContourHandle, distance: f64) -> Result<MultiPolygon2D<V, E, C, P>> {
        let c = self.contour_index(contour)?;
        let store = offset_store(self.store(), |cc, _| if cc == c { distance } else { 0.0 })?;
        Ok(regularized(store, &Options::global().arc_div))
    }

    /// Positive distances grow the polygon
    pub fn offset_all_edges(&self, distance: f64) -> Result<MultiPolygon2D<V, E, C, P>> {
        let store = offset_store(self.store(), |_, _| distance)?;
        Ok(regularized(store, &Options::global().arc_div))
    }

    pub fn offset_multiple_edges(&self, offsets: &[(EdgeHandle, f64)]) -> Result<MultiPolygon2D<V, E, C, P>> {
        let mut dists = vec![0.0; self.edge_count()];
        for (h, d) in offsets {
            dists[self.edge_index(*h)?] = *d;
        }
        let store = self.store();
        let out = offset_store(store, |c, e| dists[store.contour_range(c).start + e])?;
        Ok(regularized(out, &Options::global().arc_div))
    }

    /// Move one edge parallel to itself until the polygon has `area`
    pub fn offset_edge_fix_area(&self, edge: EdgeHandle, area: f64) -> Result<MultiPolygon2D<V, E, C, P>> {
        let (c, e) = self.locate(self.edge_index(edge)?);
        let store = offset_edge_fix_area(self.store(), c, e, area)?;
        Ok(regularized(store, &Options::global().arc_div))
    }

    pub fn calc_max_vertex_fillet(&self, vertex: VertexHandle) -> Result<f64> {
        let (c, j) = self.locate(self.vertex_index(vertex)?);
        max_fillet(self.store().ring(c), true, j)
    }

    fn round_vertex(&self, vertex: VertexHandle, kind: CornerKind, size: f64) -> Result<MultiPolygon2D<V, E, C, P>> {
        let (c, j) = self.locate(self.vertex_index(vertex)?);
        self.contour_edit(c, |ring| round_vertex(ring, true, j, kind, size))
    }

    fn round_contours(&self, only: Option<usize>, kind: CornerKind, size: f64) -> Result<MultiPolygon2D<V, E, C, P>> {
        self.edited(|store| {
            for c in 0..store.contour_count() {
                if only.map_or(true, |o| o == c) {
                    let mut ring = store.ring_owned(c);
                    if round_all(&mut ring, true, kind, size)? > 0 {
                        store.replace_ring(c, ring);
                    }
                }
            }
            Ok(())
        })
    }

    pub fn fillet_vertex(&self, vertex: VertexHandle, radius: f64) -> Result<MultiPolygon2D<V, E, C, P>> {
        self.round_vertex(vertex, CornerKind::Fillet, radius)
    }

    pub fn chamfer_vertex(&self, vertex: VertexHandle, distance: f64) -> Result<MultiPolygon2D<V, E, C, P>> {
        self.round_vertex(vertex, CornerKind::Chamfer, distance)
    }

    pub fn fillet_all_vertices(&self, radius: f64) -> Result<MultiPolygon2D<V, E, C, P>> {
        self.round_contours(None, CornerKind::Fillet, radius)
    }

    pub fn chamfer_all_vertices(&self, distance: f64) -> Result<MultiPolygon2D<V, E, C, P>> {
        self.round_contours(None, CornerKind::Chamfer, distance)
    }

    pub fn fillet_contour_vertices(&self, contour: ContourHandle, radius: f64) -> Result<MultiPolygon2D<V, E, C, P>> {
        let c = self.contour_index(contour)?;
        self.round_contours(Some(c), CornerKind::Fillet, radius)
    }

    pub fn chamfer_contour_vertices(
        &self,
        contour: ContourHandle,
        distance: f64,
    ) -> Result<MultiPolygon2D<V, E, C, P>> {
        let c = self.contour_index(contour)?;
        self.round_contours(Some(c), CornerKind::Chamfer, distance)
    }

    pub fn insert_vertex(&self, edge: EdgeHandle, point: Point2<f64>) -> Result<MultiPolygon2D<V, E, C, P>> {
        let (c, e) = self.locate(self.edge_index(edge)?);
        self.contour_edit(c, |ring| edit::insert_vertex(ring, true, e, point).map(|_| ()))
    }

    pub fn delete_vertex(&self, vertex: VertexHandle) -> Result<MultiPolygon2D<V, E, C, P>> {
        let (c, j) = self.locate(self.vertex_index(vertex)?);
        self.contour_edit(c, |ring| edit::delete_vertex(ring, true, j))
    }

    pub fn move_vertex(&self, vertex: VertexHandle, point: Point2<f64>) -> Result<MultiPolygon2D<V, E, C, P>> {
        let (c, j) = self.locate(self.vertex_index(vertex)?);
        self.contour_edit(c, |ring| edit::move_vertex(ring, j, point))
    }

    pub fn set_edge_angle(&self, edge: EdgeHandle, angle: f64) -> Result<MultiPolygon2D<V, E, C, P>> {
        let (c, e) = self.locate(self.edge_index(edge)?);
        self.contour_edit(c, |ring| edit::set_edge_angle(ring, true, e, angle))
    }

    /// Remove a hole in place; the outer contour cannot be removed
    pub fn delete_hole(&mut self, contour: ContourHandle) -> Result<()> {
        let c = self.contour_index(contour)?;
        if c == 0 {
            return Err(Error::DegenerateInput("contour 0 is the outer boundary".into()));
        }
        self.shape.structure_mut().remove_ring(c);
        Ok(())
    }

    /// Insert vertices into both polygons where their edges cross or
    /// overlap; returns whether either changed
    pub fn create_common_edge_sections(&mut self, other: &mut Self) -> bool {
        let mut a = self.store().clone();
        let mut b = other.store().clone();
        if !sections::create_common_edge_sections(&mut a, &mut b) {
            return false;
        }
        self.shape.replace_store(a);
        other.shape.replace_store(b);
        true
    }

    /// Apply `tran`; arcs become chords unless the transform is a similarity
    pub fn transform(&self, arc_div: &ArcDivParams, tran: &Transform2D) -> MultiPolygon2D<V, E, C, P> {
        if self.is_empty() {
            return MultiPolygon2D::new();
        }
        if tran.is_identity() {
            return self.regularize();
        }
        let mut store = self.store().clone();
        if !tran.preserves_arcs() {
            store.segment_arcs(arc_div);
        }
        store.apply_transform(tran);
        regularized(store, arc_div)
    }

    pub fn check(&self, flags: CheckFlags, coord_upper_range: f64) -> CheckReport {
        check_polygon(self.store(), flags, coord_upper_range)
    }

    pub fn triangulate(&self, arc_div: &ArcDivParams) -> Result<Triangulation> {
        triangulate_store(self.store(), arc_div)
    }
}
