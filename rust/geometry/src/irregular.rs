// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Irregular polygons
//!
//! An [`IrregularPolygon2D`] holds contours exactly as supplied: they may
//! cross, touch, run in either direction or hold arcs and repeated
//! vertices. Every edit happens in place. Booleans and cuts regularize
//! the operands first and always return regularized pieces.

use crate::config::Options;
use crate::error::{Error, Result};
use crate::flags::{Boundary, PolyCreateFlags, PolyFlags, RegularizeChanges};
use crate::handle::{ContourHandle, EdgeHandle, VertexHandle};
use crate::kernel::boolean::{self, BoolOp, DetailedRelation};
use crate::kernel::check::{self, CheckFlags, CheckReport, DefectKind, RepairOutcome};
use crate::kernel::cut::cut_polygon;
use crate::kernel::edit;
use crate::kernel::fillet::{max_fillet, round_all, round_vertex, CornerKind};
use crate::kernel::flat::rings_from_flat;
use crate::kernel::offset::{offset_edge_fix_area, offset_store};
use crate::kernel::regularize::regularize;
use crate::kernel::sections;
use crate::kernel::store::{Node, PolygonStore};
use crate::multi::MultiPolygon2D;
use crate::polygon::{create_result, CutResult, Polygon2D};
use crate::polyline::Polyline2D;
use crate::shape::PolygonShape;
use crate::user_data::UserData;
use polyform_core::{ArcDivParams, Box2D, HalfPlane2D, Point2, PolyArcRec, Transform2D};
use std::ops::{Deref, DerefMut};

type Store<V, E, C, P> = PolygonStore<V, E, C, P>;

/// One contour given as points with the sweep of the edge leaving each
///
/// An empty `arcs` list means every edge is straight.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContourDescription {
    pub points: Vec<Point2<f64>>,
    pub arcs: Vec<f64>,
}

impl ContourDescription {
    pub fn new(points: Vec<Point2<f64>>) -> Self {
        Self {
            points,
            arcs: Vec::new(),
        }
    }

    pub fn with_arcs(points: Vec<Point2<f64>>, arcs: Vec<f64>) -> Self {
        Self { points, arcs }
    }

    fn to_ring<V: UserData, E: UserData>(&self) -> Result<Vec<Node<V, E>>> {
        if !self.arcs.is_empty() && self.arcs.len() != self.points.len() {
            return Err(Error::DegenerateInput(format!(
                "{} arc angles for {} points",
                self.arcs.len(),
                self.points.len()
            )));
        }
        let ring: Vec<Node<V, E>> = self
            .points
            .iter()
            .enumerate()
            .map(|(i, p)| Node::new(*p, V::default(), self.arcs.get(i).copied().unwrap_or(0.0), E::default()))
            .collect();
        validate_ring(&ring)?;
        Ok(ring)
    }
}

fn validate_ring<V, E>(ring: &[Node<V, E>]) -> Result<()> {
    let has_arc = ring.iter().any(|n| n.arc_angle != 0.0);
    if ring.len() < 2 || (ring.len() < 3 && !has_arc) {
        return Err(Error::DegenerateInput(format!(
            "contour with {} vertices cannot enclose an area",
            ring.len()
        )));
    }
    if ring.iter().any(|n| n.arc_angle.abs() >= std::f64::consts::TAU) {
        return Err(Error::DegenerateInput("arc sweep must stay below a full turn".into()));
    }
    Ok(())
}

/// A multi-contour polygon with no regularity guarantees
#[derive(Debug, Clone)]
pub struct IrregularPolygon2D<V = (), E = (), C = (), P = ()> {
    shape: PolygonShape<V, E, C, P>,
}

impl<V, E, C, P> PartialEq for IrregularPolygon2D<V, E, C, P>
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

impl<V, E, C, P> Deref for IrregularPolygon2D<V, E, C, P> {
    type Target = PolygonShape<V, E, C, P>;

    fn deref(&self) -> &Self::Target {
        &self.shape
    }
}

impl<V, E, C, P> DerefMut for IrregularPolygon2D<V, E, C, P> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.shape
    }
}

impl<V, E, C, P> Default for IrregularPolygon2D<V, E, C, P>
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

impl<V, E, C, P> IrregularPolygon2D<V, E, C, P>
where
    V: UserData,
    E: UserData,
    C: UserData,
    P: UserData,
{
    pub(crate) fn from_store(store: Store<V, E, C, P>) -> Self {
        Self {
            shape: PolygonShape::from_store(store),
        }
    }

    pub(crate) fn from_shape(shape: PolygonShape<V, E, C, P>) -> Self {
        Self { shape }
    }

    // ------------------------------------------------------------------------
    // Construction
    // ------------------------------------------------------------------------

    /// Build from flat arrays
    ///
    /// `contour_ends` holds exclusive end indices into `coords`; an empty
    /// list makes a single contour. The first contour is the outer one.
    pub fn create(
        coords: &[Point2<f64>],
        arcs: &[PolyArcRec],
        contour_ends: &[usize],
        flags: PolyCreateFlags,
    ) -> Result<Self> {
        let rings = rings_from_flat::<V, E>(coords, arcs, contour_ends, flags, true)?;
        let mut store = PolygonStore::empty(PolyFlags::from_create_flags(flags));
        for ring in rings {
            validate_ring(&ring)?;
            store.push_ring(ring, C::default());
        }
        tracing::trace!(contours = store.contour_count(), vertices = store.nodes.len(), "irregular polygon created");
        Ok(Self::from_store(store))
    }

    pub fn from_contours(contours: &[ContourDescription], flags: PolyCreateFlags) -> Result<Self> {
        let mut store = PolygonStore::empty(PolyFlags::from_create_flags(flags));
        for contour in contours {
            store.push_ring(contour.to_ring()?, C::default());
        }
        Ok(Self::from_store(store))
    }

    /// One contour following `polyline`; an open polyline is closed by a
    /// straight edge
    pub fn from_polyline(polyline: &Polyline2D<V, E, P>) -> Result<Self> {
        let source = polyline.store();
        let mut store = PolygonStore::empty(source.flags);
        store.data = source.data.clone();
        if source.nodes.is_empty() {
            return Ok(Self::from_store(store));
        }
        let mut ring = source.nodes.clone();
        if !source.closed {
            if let Some(last) = ring.last_mut() {
                last.arc_angle = 0.0;
                last.edge_data = E::default();
            }
        }
        validate_ring(&ring)?;
        store.push_ring(ring, C::default());
        Ok(Self::from_store(store))
    }

    pub fn from_box(bbox: &Box2D, flags: PolyFlags) -> Self {
        Polygon2D::from_box(bbox, flags).to_irregular()
    }

    /// Attach user data to every channel
    ///
    /// Each slice is either empty, leaving that channel untouched, or holds
    /// exactly one value per vertex, edge or contour.
    pub fn with_user_data(mut self, vertex_data: &[V], edge_data: &[E], contour_data: &[C], polygon_data: P) -> Result<Self> {
        let nodes = self.store().nodes.len();
        let contours = self.store().contour_count();
        for (len, expected) in [(vertex_data.len(), nodes), (edge_data.len(), nodes), (contour_data.len(), contours)] {
            if len != 0 && len != expected {
                return Err(Error::IndexOutOfRange { index: len, len: expected });
            }
        }
        let store = self.shape.store_mut();
        for (node, data) in store.nodes.iter_mut().zip(vertex_data) {
            node.data = data.clone();
        }
        for (node, data) in store.nodes.iter_mut().zip(edge_data) {
            node.edge_data = data.clone();
        }
        for (contour, data) in store.contours.iter_mut().zip(contour_data) {
            contour.data = data.clone();
        }
        store.data = polygon_data;
        Ok(self)
    }

    pub fn clear(&mut self) {
        let flags = self.flags();
        self.shape.replace_store(PolygonStore::empty(flags));
    }

    // ------------------------------------------------------------------------
    // Regularization, booleans and cuts
    // ------------------------------------------------------------------------

    /// Regularized pieces; an already regular polygon shares its storage
    pub fn regularize(&self) -> MultiPolygon2D<V, E, C, P> {
        self.regularize_with(&Options::global().arc_div)
    }

    /// Regularize with an explicit chord tolerance for arcs the overlay
    /// has to flatten
    pub fn regularize_with(&self, arc_div: &ArcDivParams) -> MultiPolygon2D<V, E, C, P> {
        self.regularize_report_with(arc_div).0
    }

    pub fn regularize_with_report(&self) -> (MultiPolygon2D<V, E, C, P>, RegularizeChanges) {
        self.regularize_report_with(&Options::global().arc_div)
    }

    fn regularize_report_with(&self, arc_div: &ArcDivParams) -> (MultiPolygon2D<V, E, C, P>, RegularizeChanges) {
        let (result, changes) = regularize(self.store(), arc_div);
        let this = [Polygon2D::from_shape(PolygonShape::from_arc(self.shared().clone()))];
        (create_result(result, &this, &[]), changes)
    }

    /// Regularized pieces and their storage merged into one operand
    fn operand(&self) -> (MultiPolygon2D<V, E, C, P>, Store<V, E, C, P>) {
        let pieces = self.regularize();
        let merged = if pieces.is_empty() {
            PolygonStore::empty(self.flags())
        } else {
            let parts: Vec<_> = pieces.iter().map(|p| p.store()).collect();
            PolygonStore::concat(&parts)
        };
        (pieces, merged)
    }

    fn boolean(&self, other: &Self, op: BoolOp, boundary: Boundary) -> (MultiPolygon2D<V, E, C, P>, DetailedRelation) {
        let (pieces_a, a) = self.operand();
        let (pieces_b, b) = other.operand();
        let (result, relation) = boolean::boolean(&a, &b, op, boundary, &Options::global().arc_div);
        (create_result(result, &pieces_a, &pieces_b), relation)
    }

    pub fn relation(&self, other: &Self) -> DetailedRelation {
        let (_, a) = self.operand();
        let (_, b) = other.operand();
        boolean::relation(&a, &b, &Options::global().arc_div)
    }

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

    fn cut_by(&self, planes: &[HalfPlane2D]) -> CutResult<V, E, C, P> {
        let (pieces, merged) = self.operand();
        let (result, status) = cut_polygon(&merged, planes, &Options::global().arc_div);
        let full_in = matches!(result, boolean::BooleanResult::ResultSameAsThis);
        CutResult {
            pieces: create_result(result, &pieces, &[]),
            full_in,
            status,
        }
    }

    pub fn cut(&self, plane: &HalfPlane2D) -> CutResult<V, E, C, P> {
        self.cut_by(std::slice::from_ref(plane))
    }

    pub fn strip(&self, a: &HalfPlane2D, b: &HalfPlane2D) -> CutResult<V, E, C, P> {
        self.cut_by(&[*a, *b])
    }

    pub fn clip(&self, bbox: &Box2D) -> CutResult<V, E, C, P> {
        self.cut_by(&HalfPlane2D::from_box(bbox))
    }

    // ------------------------------------------------------------------------
    // Editing in place
    // ------------------------------------------------------------------------

    /// Run `edit` on one contour; handles are invalidated on success
    fn edit_contour<T>(&mut self, c: usize, edit: impl FnOnce(&mut Vec<Node<V, E>>) -> Result<T>) -> Result<T> {
        let mut ring = self.store().ring_owned(c);
        let out = edit(&mut ring)?;
        self.shape.structure_mut().replace_ring(c, ring);
        Ok(out)
    }

    /// Split an edge at the point nearest to `point`
    pub fn insert_vertex(&mut self, edge: EdgeHandle, point: Point2<f64>) -> Result<VertexHandle> {
        let (c, e) = self.locate(self.edge_index(edge)?);
        let local = self.edit_contour(c, |ring| edit::insert_vertex(ring, true, e, point))?;
        let start = self.store().contour_range(c).start;
        Ok(VertexHandle::new(self.stamp(), start + local))
    }

    pub fn delete_vertex(&mut self, vertex: VertexHandle) -> Result<()> {
        let (c, j) = self.locate(self.vertex_index(vertex)?);
        self.edit_contour(c, |ring| edit::delete_vertex(ring, true, j))
    }

    /// Handles stay valid
    pub fn move_vertex(&mut self, vertex: VertexHandle, point: Point2<f64>) -> Result<()> {
        let i = self.vertex_index(vertex)?;
        self.shape.store_mut().nodes[i].point = point;
        Ok(())
    }

    /// Handles stay valid
    pub fn set_edge_angle(&mut self, edge: EdgeHandle, angle: f64) -> Result<()> {
        let (c, e) = self.locate(self.edge_index(edge)?);
        let range = self.store().contour_range(c);
        edit::set_edge_angle(&mut self.shape.store_mut().nodes[range], true, e, angle)
    }

    /// Append a hole contour; returns its handle
    pub fn add_hole(&mut self, contour: &ContourDescription) -> Result<ContourHandle> {
        let ring = contour.to_ring()?;
        if self.is_empty() {
            return Err(Error::DegenerateInput("a hole needs an outer contour".into()));
        }
        self.shape.structure_mut().push_ring(ring, C::default());
        Ok(ContourHandle::new(self.stamp(), self.contour_count() - 1))
    }

    pub fn delete_hole(&mut self, contour: ContourHandle) -> Result<()> {
        let c = self.contour_index(contour)?;
        if c == 0 {
            return Err(Error::DegenerateInput("contour 0 is the outer boundary".into()));
        }
        self.shape.structure_mut().remove_ring(c);
        Ok(())
    }

    pub fn reverse_contour(&mut self, contour: ContourHandle) -> Result<()> {
        let c = self.contour_index(contour)?;
        self.shape.structure_mut().reverse_contour(c);
        Ok(())
    }

    fn apply_offset(&mut self, dist: impl FnMut(usize, usize) -> f64) -> Result<()> {
        let store = offset_store(self.store(), dist)?;
        self.shape.replace_store(store);
        Ok(())
    }

    /// Positive distances move an edge to the right of its direction
    pub fn offset_edge(&mut self, edge: EdgeHandle, distance: f64) -> Result<()> {
        let (c, e) = self.locate(self.edge_index(edge)?);
        self.apply_offset(|cc, ee| if cc == c && ee == e { distance } else { 0.0 })
    }

    pub fn offset_contour(&mut self, contour: ContourHandle, distance: f64) -> Result<()> {
        let c = self.contour_index(contour)?;
        self.apply_offset(|cc, _| if cc == c { distance } else { 0.0 })
    }

    pub fn offset_all_edges(&mut self, distance: f64) -> Result<()> {
        self.apply_offset(|_, _| distance)
    }

    pub fn offset_multiple_edges(&mut self, offsets: &[(EdgeHandle, f64)]) -> Result<()> {
        let mut dists = vec![0.0; self.edge_count()];
        for (h, d) in offsets {
            dists[self.edge_index(*h)?] = *d;
        }
        let starts: Vec<usize> = (0..self.contour_count())
            .map(|c| self.store().contour_range(c).start)
            .collect();
        self.apply_offset(|c, e| dists[starts[c] + e])
    }

    pub fn offset_edge_fix_area(&mut self, edge: EdgeHandle, area: f64) -> Result<()> {
        let (c, e) = self.locate(self.edge_index(edge)?);
        let store = offset_edge_fix_area(self.store(), c, e, area)?;
        self.shape.replace_store(store);
        Ok(())
    }

    pub fn calc_max_vertex_fillet(&self, vertex: VertexHandle) -> Result<f64> {
        let (c, j) = self.locate(self.vertex_index(vertex)?);
        max_fillet(self.store().ring(c), true, j)
    }

    fn round(&mut self, vertex: VertexHandle, kind: CornerKind, size: f64) -> Result<()> {
        let (c, j) = self.locate(self.vertex_index(vertex)?);
        self.edit_contour(c, |ring| round_vertex(ring, true, j, kind, size))
    }

    fn round_contours(&mut self, only: Option<usize>, kind: CornerKind, size: f64) -> Result<usize> {
        let mut store = self.store().clone();
        let mut total = 0;
        for c in 0..store.contour_count() {
            if only.map_or(true, |o| o == c) {
                let mut ring = store.ring_owned(c);
                let n = round_all(&mut ring, true, kind, size)?;
                if n > 0 {
                    store.replace_ring(c, ring);
                    total += n;
                }
            }
        }
        if total > 0 {
            self.shape.replace_store(store);
        }
        Ok(total)
    }

    pub fn fillet_vertex(&mut self, vertex: VertexHandle, radius: f64) -> Result<()> {
        self.round(vertex, CornerKind::Fillet, radius)
    }

    pub fn chamfer_vertex(&mut self, vertex: VertexHandle, distance: f64) -> Result<()> {
        self.round(vertex, CornerKind::Chamfer, distance)
    }

    /// Returns the number of corners replaced
    pub fn fillet_all_vertices(&mut self, radius: f64) -> Result<usize> {
        self.round_contours(None, CornerKind::Fillet, radius)
    }

    pub fn chamfer_all_vertices(&mut self, distance: f64) -> Result<usize> {
        self.round_contours(None, CornerKind::Chamfer, distance)
    }

    pub fn fillet_contour_vertices(&mut self, contour: ContourHandle, radius: f64) -> Result<usize> {
        let c = self.contour_index(contour)?;
        self.round_contours(Some(c), CornerKind::Fillet, radius)
    }

    pub fn chamfer_contour_vertices(&mut self, contour: ContourHandle, distance: f64) -> Result<usize> {
        let c = self.contour_index(contour)?;
        self.round_contours(Some(c), CornerKind::Chamfer, distance)
    }

    /// Arcs become chords unless `tran` is a similarity; handles stay valid
    /// only when no arc was segmented
    pub fn transform(&mut self, arc_div: &ArcDivParams, tran: &Transform2D) {
        if self.is_empty() || tran.is_identity() {
            return;
        }
        if !tran.preserves_arcs() && self.has_arcs() {
            self.shape.structure_mut().segment_arcs(arc_div);
        }
        self.shape.store_mut().apply_transform(tran);
    }

    /// Replace every arc by chords
    pub fn segment_up(&mut self, arc_div: &ArcDivParams) {
        if self.has_arcs() {
            self.shape.structure_mut().segment_arcs(arc_div);
        }
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

    // ------------------------------------------------------------------------
    // Check and repair
    // ------------------------------------------------------------------------

    pub fn check(&self, flags: CheckFlags, coord_upper_range: f64) -> CheckReport {
        check::check_polygon(self.store(), flags, coord_upper_range)
    }

    /// Repair one kind of defect; returns whether anything changed
    pub fn repair(&mut self, kind: DefectKind) -> Result<bool> {
        let mut store = self.store().clone();
        let changed = check::repair_polygon(&mut store, kind)?;
        if changed {
            self.shape.replace_store(store);
        }
        Ok(changed)
    }

    /// Alternate check and repair until clean or stuck
    pub fn check_and_repair(&mut self, flags: CheckFlags, options: &Options) -> Result<RepairOutcome> {
        let range = options.coord_upper_range;
        let mut store = self.store().clone();
        let outcome = check::check_and_repair_loop(
            options.max_repair_iterations,
            &mut store,
            |s| check::check_polygon(s, flags, range),
            check::repair_polygon,
        )?;
        if outcome.modified {
            self.shape.replace_store(store);
        }
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shape::PointPosition;
    use approx::assert_relative_eq;
    use polyform_core::Vector2;

    fn pts(coords: &[(f64, f64)]) -> Vec<Point2<f64>> {
        coords.iter().map(|&(x, y)| Point2::new(x, y)).collect()
    }

    fn square_with_hole() -> IrregularPolygon2D {
        IrregularPolygon2D::create(
            &pts(&[(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0), (3.0, 3.0), (7.0, 3.0), (7.0, 7.0), (3.0, 7.0)]),
            &[],
            &[4, 8],
            PolyCreateFlags::IDX_REF_IN_ARC_FROM_ZERO,
        )
        .unwrap()
    }

    #[test]
    fn test_create_and_regularize_hole() {
        let poly = square_with_hole();
        assert_eq!(poly.contour_count(), 2);
        let (regular, changes) = poly.regularize_with_report();
        assert_eq!(regular.len(), 1);
        assert_eq!(regular[0].contour_count(), 2);
        assert!(changes.reversed_contours);
        assert_relative_eq!(regular[0].signed_area(), 84.0, epsilon = 1e-9);
        let hole = regular[0].contours().nth(1).unwrap();
        assert!(regular[0].contour_area(hole).unwrap() < 0.0);
    }

    #[test]
    fn test_create_rejects_degenerate_contour() {
        let result = IrregularPolygon2D::<(), (), (), ()>::create(
            &pts(&[(0.0, 0.0), (1.0, 0.0)]),
            &[],
            &[],
            PolyCreateFlags::NONE,
        );
        assert!(matches!(result, Err(Error::DegenerateInput(_))));
        let empty = IrregularPolygon2D::<(), (), (), ()>::create(&[], &[], &[], PolyCreateFlags::NONE).unwrap();
        assert!(empty.is_empty());
        assert!(empty.regularize().is_empty());
    }

    #[test]
    fn test_regular_input_shares_storage() {
        let poly = IrregularPolygon2D::<(), (), (), ()>::from_box(
            &Box2D::new(Point2::new(0.0, 0.0), Point2::new(2.0, 2.0)),
            PolyFlags::default(),
        );
        let regular = poly.regularize();
        assert_eq!(regular.len(), 1);
        assert!(regular[0].shares_storage_with(&poly));
    }

    #[test]
    fn test_bow_tie_keeps_dominant_lobe() {
        // lobes of area 4/3 (ccw) and 16/3 (cw) meeting at (4/3, 4/3)
        let poly: IrregularPolygon2D = IrregularPolygon2D::from_contours(
            &[ContourDescription::new(pts(&[(0.0, 0.0), (4.0, 4.0), (4.0, 0.0), (0.0, 2.0)]))],
            PolyCreateFlags::NONE,
        )
        .unwrap();
        assert_relative_eq!(poly.signed_area(), -4.0, epsilon = 1e-9);
        let regular = poly.regularize();
        assert_eq!(regular.len(), 1);
        assert_relative_eq!(regular[0].signed_area(), 16.0 / 3.0, epsilon = 1e-9);
        let bbox = regular[0].bounding_box().unwrap();
        assert_relative_eq!(bbox.min.x, 4.0 / 3.0, epsilon = 1e-9);
        assert_relative_eq!(bbox.max.x, 4.0, epsilon = 1e-9);
    }

    #[test]
    fn test_balanced_bow_tie_keeps_one_lobe() {
        let poly: IrregularPolygon2D = IrregularPolygon2D::from_contours(
            &[ContourDescription::new(pts(&[(0.0, 0.0), (2.0, 2.0), (2.0, 0.0), (0.0, 2.0)]))],
            PolyCreateFlags::NONE,
        )
        .unwrap();
        assert_relative_eq!(poly.signed_area(), 0.0, epsilon = 1e-12);
        let regular = poly.regularize();
        assert_eq!(regular.len(), 1);
        assert_relative_eq!(regular[0].signed_area(), 1.0, epsilon = 1e-9);
    }

    #[test]
    fn test_boolean_on_irregular() {
        let a: IrregularPolygon2D = IrregularPolygon2D::from_box(
            &Box2D::new(Point2::new(0.0, 0.0), Point2::new(4.0, 4.0)),
            PolyFlags::default(),
        );
        let mut b = a.clone();
        b.translate(&Vector2::new(2.0, 0.0));
        let union = a.unify(&b, Boundary::Closed);
        let inter = a.intersect(&b, Boundary::Closed);
        assert_relative_eq!(union.area() + inter.area(), a.area() + b.area(), epsilon = 1e-9);
        let (diff, relation) = a.substract_detailed(&b, Boundary::Closed);
        assert_eq!(relation, DetailedRelation::Overlapping);
        assert_relative_eq!(diff.area(), 8.0, epsilon = 1e-9);
    }

    #[test]
    fn test_in_place_edits() {
        let mut poly: IrregularPolygon2D = IrregularPolygon2D::from_box(
            &Box2D::new(Point2::new(0.0, 0.0), Point2::new(10.0, 10.0)),
            PolyFlags::default(),
        );
        let stale = poly.vertices().next().unwrap();
        let edge = poly.edges().next().unwrap();
        let v = poly.insert_vertex(edge, Point2::new(5.0, 0.0)).unwrap();
        assert_eq!(poly.vertex_count(), 5);
        assert_relative_eq!(poly.vertex(v).unwrap().point.x, 5.0, epsilon = 1e-12);
        assert!(matches!(poly.delete_vertex(stale), Err(Error::InvalidHandle)));
        poly.move_vertex(v, Point2::new(5.0, -2.0)).unwrap();
        assert_relative_eq!(poly.area(), 110.0, epsilon = 1e-9);
        poly.delete_vertex(v).unwrap();
        assert_relative_eq!(poly.area(), 100.0, epsilon = 1e-9);

        let hole = poly
            .add_hole(&ContourDescription::new(pts(&[(2.0, 2.0), (2.0, 4.0), (4.0, 4.0), (4.0, 2.0)])))
            .unwrap();
        assert_eq!(poly.hole_count(), 1);
        assert_eq!(poly.point_position(&Point2::new(3.0, 3.0)), PointPosition::Outside);
        poly.delete_hole(hole).unwrap();
        assert_eq!(poly.contour_count(), 1);
    }

    #[test]
    fn test_offset_and_fillet_in_place() {
        let mut poly: IrregularPolygon2D = IrregularPolygon2D::from_box(
            &Box2D::new(Point2::new(0.0, 0.0), Point2::new(10.0, 10.0)),
            PolyFlags::default(),
        );
        poly.offset_all_edges(1.0).unwrap();
        assert_relative_eq!(poly.area(), 144.0, epsilon = 1e-9);
        let replaced = poly.fillet_all_vertices(1.0).unwrap();
        assert_eq!(replaced, 4);
        assert_relative_eq!(poly.area(), 144.0 - (4.0 - std::f64::consts::PI), epsilon = 1e-9);
    }

    #[test]
    fn test_with_user_data() {
        let poly: IrregularPolygon2D<u32, u32, u32, u32> = IrregularPolygon2D::from_box(
            &Box2D::new(Point2::new(0.0, 0.0), Point2::new(1.0, 1.0)),
            PolyFlags::default(),
        )
        .with_user_data(&[1, 2, 3, 4], &[], &[9], 7)
        .unwrap();
        let v = poly.vertices().nth(2).unwrap();
        assert_eq!(*poly.vertex(v).unwrap().data, 3);
        assert_eq!(*poly.polygon_data(), 7);
        assert!(poly.clone().with_user_data(&[1], &[], &[], 0).is_err());
    }

    #[test]
    fn test_check_and_repair_duplicates() {
        let mut poly: IrregularPolygon2D = IrregularPolygon2D::from_contours(
            &[ContourDescription::new(pts(&[(0.0, 0.0), (4.0, 0.0), (4.0, 0.0), (4.0, 4.0), (0.0, 4.0)]))],
            PolyCreateFlags::NONE,
        )
        .unwrap();
        let report = poly.check(CheckFlags::ALL, 1e9);
        assert!(report.contains(DefectKind::CoincidentVertices));
        let outcome = poly.check_and_repair(CheckFlags::ALL, &Options::default()).unwrap();
        assert!(outcome.succeeded);
        assert!(outcome.modified);
        assert_eq!(poly.vertex_count(), 4);
    }
}
