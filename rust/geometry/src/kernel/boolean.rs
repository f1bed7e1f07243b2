// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Boolean operations between regularized polygons
//!
//! Every operation first classifies how the operands relate. Trivial
//! relations short-circuit into a [`BooleanResult`] that refers back to an
//! operand instead of producing new geometry.

use super::overlay::{path_area, shapes_area, OverlayJob, Orientation, Shapes};
use super::store::PolygonStore;
use crate::flags::{Boundary, HoleHandling};
use crate::user_data::UserData;
use i_overlay::core::overlay_rule::OverlayRule;
use polyform_core::tolerance::{AREA_EPS, POINT_EPS};
use polyform_core::ArcDivParams;

/// Outcome of a kernel operation
///
/// Only `NewPolygons` carries geometry; the other variants alias an
/// operand.
#[derive(Debug, Clone, PartialEq)]
pub enum BooleanResult<S> {
    NewPolygons(Vec<S>),
    ResultSameAsThis,
    ResultSameAsFirstParameter,
    ResultThisAndParameter,
    EmptyPolygon,
}

impl<S> BooleanResult<S> {
    pub fn map<T>(self, f: impl FnMut(S) -> T) -> BooleanResult<T> {
        match self {
            BooleanResult::NewPolygons(v) => BooleanResult::NewPolygons(v.into_iter().map(f).collect()),
            BooleanResult::ResultSameAsThis => BooleanResult::ResultSameAsThis,
            BooleanResult::ResultSameAsFirstParameter => BooleanResult::ResultSameAsFirstParameter,
            BooleanResult::ResultThisAndParameter => BooleanResult::ResultThisAndParameter,
            BooleanResult::EmptyPolygon => BooleanResult::EmptyPolygon,
        }
    }
}

/// Spatial relation of two polygons before a boolean operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DetailedRelation {
    Disjoint,
    /// Boundaries meet but interiors do not
    Touching,
    FirstContainsSecond,
    SecondContainsFirst,
    Equal,
    Overlapping,
}

/// Coarse form of [`DetailedRelation`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RelativePosition {
    Disjoint,
    Touching,
    Overlapping,
}

impl DetailedRelation {
    pub fn relative_position(self) -> RelativePosition {
        match self {
            DetailedRelation::Disjoint => RelativePosition::Disjoint,
            DetailedRelation::Touching => RelativePosition::Touching,
            _ => RelativePosition::Overlapping,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum BoolOp {
    Union,
    Intersection,
    Difference,
}

impl BoolOp {
    fn rule(self) -> OverlayRule {
        match self {
            BoolOp::Union => OverlayRule::Union,
            BoolOp::Intersection => OverlayRule::Intersect,
            BoolOp::Difference => OverlayRule::Difference,
        }
    }
}

/// Whether any edge of `a` meets any edge of `b`
pub(crate) fn boundaries_touch<V, E, C, P>(a: &PolygonStore<V, E, C, P>, b: &PolygonStore<V, E, C, P>) -> bool
where
    V: UserData,
    E: UserData,
    C: UserData,
    P: UserData,
{
    let b_edges: Vec<_> = b.edges().map(|(_, e)| (e, e.bounding_box())).collect();
    a.edges().any(|(_, ea)| {
        let ba = ea.bounding_box();
        b_edges
            .iter()
            .any(|(eb, bb)| ba.overlaps(bb, POINT_EPS) && !ea.intersections(eb).is_empty())
    })
}

fn classify<V, E, C, P>(job: &OverlayJob<'_, V, E, C, P>) -> (DetailedRelation, Option<Shapes>)
where
    V: UserData,
    E: UserData,
    C: UserData,
    P: UserData,
{
    let (a, b) = (job.operand(0), job.operand(1));
    match (a.bbox(), b.bbox()) {
        (Some(ba), Some(bb)) if ba.overlaps(&bb, POINT_EPS) => {}
        _ => return (DetailedRelation::Disjoint, None),
    }
    let pa = job.paths(0, Orientation::AsIs, false);
    let pb = job.paths(1, Orientation::AsIs, false);
    let area_a: f64 = pa.iter().map(|p| path_area(p)).sum::<f64>().abs();
    let area_b: f64 = pb.iter().map(|p| path_area(p)).sum::<f64>().abs();
    let inter = job.run(&pa, &pb, OverlayRule::Intersect);
    let area_i = shapes_area(&inter);
    let tol = 1e-7 * area_a.max(area_b) + AREA_EPS;

    if area_i <= tol {
        let relation = if boundaries_touch(a, b) {
            DetailedRelation::Touching
        } else {
            DetailedRelation::Disjoint
        };
        return (relation, None);
    }
    let covers_a = (area_i - area_a).abs() <= tol;
    let covers_b = (area_i - area_b).abs() <= tol;
    let relation = match (covers_a, covers_b) {
        (true, true) => DetailedRelation::Equal,
        (false, true) => DetailedRelation::FirstContainsSecond,
        (true, false) => DetailedRelation::SecondContainsFirst,
        (false, false) => DetailedRelation::Overlapping,
    };
    (relation, Some(inter))
}

/// Classify the relation of two regularized polygons
pub(crate) fn relation<V, E, C, P>(
    a: &PolygonStore<V, E, C, P>,
    b: &PolygonStore<V, E, C, P>,
    arc_div: &ArcDivParams,
) -> DetailedRelation
where
    V: UserData,
    E: UserData,
    C: UserData,
    P: UserData,
{
    if a.is_empty() || b.is_empty() {
        return DetailedRelation::Disjoint;
    }
    classify(&OverlayJob::new(vec![a, b], arc_div)).0
}

/// Run a boolean operation on two regularized polygons
pub(crate) fn boolean<V, E, C, P>(
    a: &PolygonStore<V, E, C, P>,
    b: &PolygonStore<V, E, C, P>,
    op: BoolOp,
    boundary: Boundary,
    arc_div: &ArcDivParams,
) -> (BooleanResult<PolygonStore<V, E, C, P>>, DetailedRelation)
where
    V: UserData,
    E: UserData,
    C: UserData,
    P: UserData,
{
    use BooleanResult::*;
    use DetailedRelation::*;

    if a.is_empty() || b.is_empty() {
        let result = match (op, a.is_empty(), b.is_empty()) {
            (BoolOp::Union, true, false) => ResultSameAsFirstParameter,
            (BoolOp::Union, false, true) | (BoolOp::Difference, false, true) => ResultSameAsThis,
            _ => EmptyPolygon,
        };
        return (result, Disjoint);
    }

    let job = OverlayJob::new(vec![a, b], arc_div);
    let (relation, inter) = classify(&job);
    let shortcut = match (op, relation) {
        (BoolOp::Union, Disjoint) => Some(ResultThisAndParameter),
        (BoolOp::Union, Touching) if boundary == Boundary::Open => Some(ResultThisAndParameter),
        (BoolOp::Union, FirstContainsSecond) | (BoolOp::Union, Equal) => Some(ResultSameAsThis),
        (BoolOp::Union, SecondContainsFirst) => Some(ResultSameAsFirstParameter),
        (BoolOp::Intersection, Disjoint) | (BoolOp::Intersection, Touching) => Some(EmptyPolygon),
        (BoolOp::Intersection, FirstContainsSecond) => Some(ResultSameAsFirstParameter),
        (BoolOp::Intersection, SecondContainsFirst) | (BoolOp::Intersection, Equal) => Some(ResultSameAsThis),
        (BoolOp::Difference, Disjoint) | (BoolOp::Difference, Touching) => Some(ResultSameAsThis),
        (BoolOp::Difference, Equal) | (BoolOp::Difference, SecondContainsFirst) => Some(EmptyPolygon),
        _ => None,
    };
    if let Some(result) = shortcut {
        tracing::debug!(?op, ?relation, "boolean short-circuit");
        return (result, relation);
    }

    let shapes = match (op, inter) {
        (BoolOp::Intersection, Some(inter)) => inter,
        _ => {
            let pa = job.paths(0, Orientation::AsIs, false);
            let pb = job.paths(1, Orientation::AsIs, false);
            job.run(&pa, &pb, op.rule())
        }
    };
    let (stores, _) = job.collect(&shapes, true);
    tracing::debug!(?op, ?relation, pieces = stores.len(), "boolean evaluated");
    if stores.is_empty() {
        (EmptyPolygon, relation)
    } else {
        (NewPolygons(stores), relation)
    }
}

/// Union of many regularized polygons in one overlay pass
pub(crate) fn unify_all<V, E, C, P>(
    stores: &[&PolygonStore<V, E, C, P>],
    holes: HoleHandling,
    arc_div: &ArcDivParams,
) -> Vec<PolygonStore<V, E, C, P>>
where
    V: UserData,
    E: UserData,
    C: UserData,
    P: UserData,
{
    let stores: Vec<&PolygonStore<V, E, C, P>> = stores.iter().copied().filter(|s| !s.is_empty()).collect();
    if stores.is_empty() {
        return Vec::new();
    }
    let outer_only = holes == HoleHandling::WithoutHoles;
    let job = OverlayJob::new(stores.clone(), arc_div);
    let subject: Vec<_> = (0..stores.len())
        .flat_map(|op| job.paths(op, Orientation::AsIs, outer_only))
        .collect();
    let shapes = job.run(&subject, &[], OverlayRule::Subject);
    let (out, _) = job.collect(&shapes, !outer_only);
    tracing::debug!(inputs = stores.len(), pieces = out.len(), "unified polygons");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flags::PolyFlags;
    use crate::kernel::store::Node;
    use approx::assert_relative_eq;
    use polyform_core::Point2;

    type Store = PolygonStore<(), (), (), ()>;

    fn rect(x0: f64, y0: f64, x1: f64, y1: f64) -> Store {
        let mut s = Store::empty(PolyFlags::default());
        s.push_ring(
            vec![
                Node::plain(Point2::new(x0, y0)),
                Node::plain(Point2::new(x1, y0)),
                Node::plain(Point2::new(x1, y1)),
                Node::plain(Point2::new(x0, y1)),
            ],
            (),
        );
        s
    }

    fn run(a: &Store, b: &Store, op: BoolOp) -> (BooleanResult<Store>, DetailedRelation) {
        boolean(a, b, op, Boundary::Closed, &ArcDivParams::default())
    }

    #[test]
    fn test_disjoint_union() {
        let (result, relation) = run(&rect(0.0, 0.0, 1.0, 1.0), &rect(3.0, 0.0, 4.0, 1.0), BoolOp::Union);
        assert_eq!(relation, DetailedRelation::Disjoint);
        assert_eq!(result, BooleanResult::ResultThisAndParameter);
    }

    #[test]
    fn test_contained_shortcuts() {
        let big = rect(0.0, 0.0, 10.0, 10.0);
        let small = rect(2.0, 2.0, 3.0, 3.0);
        let (result, relation) = run(&big, &small, BoolOp::Union);
        assert_eq!(relation, DetailedRelation::FirstContainsSecond);
        assert_eq!(result, BooleanResult::ResultSameAsThis);
        let (result, _) = run(&big, &small, BoolOp::Intersection);
        assert_eq!(result, BooleanResult::ResultSameAsFirstParameter);
        let (result, relation) = run(&small, &big, BoolOp::Difference);
        assert_eq!(relation, DetailedRelation::SecondContainsFirst);
        assert_eq!(result, BooleanResult::EmptyPolygon);
    }

    #[test]
    fn test_difference_makes_hole() {
        let big = rect(0.0, 0.0, 10.0, 10.0);
        let small = rect(2.0, 2.0, 3.0, 3.0);
        match run(&big, &small, BoolOp::Difference).0 {
            BooleanResult::NewPolygons(v) => {
                assert_eq!(v.len(), 1);
                assert_eq!(v[0].contour_count(), 2);
                assert_relative_eq!(v[0].signed_area(), 99.0, epsilon = 1e-9);
                assert!(v[0].contour_signed_area(1) < 0.0);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_touching_union_open_and_closed() {
        let a = rect(0.0, 0.0, 1.0, 1.0);
        let b = rect(1.0, 0.0, 2.0, 1.0);
        let (open, relation) = boolean(&a, &b, BoolOp::Union, Boundary::Open, &ArcDivParams::default());
        assert_eq!(relation, DetailedRelation::Touching);
        assert_eq!(open, BooleanResult::ResultThisAndParameter);
        match run(&a, &b, BoolOp::Union).0 {
            BooleanResult::NewPolygons(v) => {
                assert_eq!(v.len(), 1);
                assert_relative_eq!(v[0].signed_area(), 2.0, epsilon = 1e-9);
                assert_eq!(v[0].nodes.len(), 4);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_empty_operands() {
        let a = rect(0.0, 0.0, 1.0, 1.0);
        let empty = Store::empty(PolyFlags::default());
        assert_eq!(run(&empty, &a, BoolOp::Union).0, BooleanResult::ResultSameAsFirstParameter);
        assert_eq!(run(&a, &empty, BoolOp::Difference).0, BooleanResult::ResultSameAsThis);
        assert_eq!(run(&a, &empty, BoolOp::Intersection).0, BooleanResult::EmptyPolygon);
    }

    #[test]
    fn test_unify_all_without_holes() {
        let mut ring = rect(0.0, 0.0, 10.0, 10.0);
        let mut hole = rect(3.0, 3.0, 7.0, 7.0).nodes;
        hole.reverse();
        ring.push_ring(hole, ());
        let other = rect(20.0, 0.0, 21.0, 1.0);
        let out = unify_all(&[&ring, &other], HoleHandling::WithoutHoles, &ArcDivParams::default());
        assert_eq!(out.len(), 2);
        let total: f64 = out.iter().map(|s| s.signed_area()).sum();
        assert_relative_eq!(total, 101.0, epsilon = 1e-9);
    }
}
