// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Consistency checks and repairs

use super::regularize::edge_crossings;
use super::store::{
    dedup_ring, merge_same_dir, ring_edge, ring_edge_count, ring_is_flat, ring_length, same_dir_vertices, Node,
    PolygonStore, PolylineStore,
};
use crate::error::{Error, Result};
use crate::user_data::UserData;
use polyform_core::tolerance::{points_coincide, POINT_EPS};

/// Kinds of defects `check` looks for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DefectKind {
    /// Two consecutive vertices at the same position
    CoincidentVertices,
    /// Arc whose sweep or bulge is too small to be meaningful
    NearZeroArc,
    /// Consecutive straight edges pointing the same way
    SameDirectionEdges,
    /// Contour without enough extent to bound anything
    DegenerateContour,
    CoordinateOutOfRange,
    SelfIntersection,
}

impl DefectKind {
    pub const ALL: [DefectKind; 6] = [
        DefectKind::CoincidentVertices,
        DefectKind::NearZeroArc,
        DefectKind::SameDirectionEdges,
        DefectKind::DegenerateContour,
        DefectKind::CoordinateOutOfRange,
        DefectKind::SelfIntersection,
    ];

    /// Whether `repair` can fix this kind
    pub fn is_repairable(self) -> bool {
        !matches!(self, DefectKind::CoordinateOutOfRange | DefectKind::SelfIntersection)
    }

    fn bit(self) -> u32 {
        match self {
            DefectKind::CoincidentVertices => 1,
            DefectKind::NearZeroArc => 1 << 1,
            DefectKind::SameDirectionEdges => 1 << 2,
            DefectKind::DegenerateContour => 1 << 3,
            DefectKind::CoordinateOutOfRange => 1 << 4,
            DefectKind::SelfIntersection => 1 << 5,
        }
    }
}

/// Selection of defect kinds to look for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CheckFlags(pub u32);

impl CheckFlags {
    pub const NONE: Self = Self(0);
    pub const ALL: Self = Self(0x3f);

    pub fn only(kind: DefectKind) -> Self {
        Self(kind.bit())
    }

    #[inline]
    pub fn contains(self, kind: DefectKind) -> bool {
        self.0 & kind.bit() != 0
    }

    pub fn with(self, kind: DefectKind) -> Self {
        Self(self.0 | kind.bit())
    }
}

impl Default for CheckFlags {
    fn default() -> Self {
        Self::ALL
    }
}

/// One finding of `check`; `vertex` is an object-wide vertex index
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Defect {
    pub kind: DefectKind,
    pub contour: usize,
    pub vertex: usize,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CheckReport {
    pub defects: Vec<Defect>,
}

impl CheckReport {
    pub fn is_clean(&self) -> bool {
        self.defects.is_empty()
    }

    pub fn contains(&self, kind: DefectKind) -> bool {
        self.defects.iter().any(|d| d.kind == kind)
    }

    /// First defect kind `repair` can fix, in reporting order
    pub fn first_repairable(&self) -> Option<DefectKind> {
        self.defects.iter().map(|d| d.kind).find(|k| k.is_repairable())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RepairOutcome {
    /// No defect remains
    pub succeeded: bool,
    /// At least one repair changed the object
    pub modified: bool,
}

struct RingCheck<'a> {
    flags: CheckFlags,
    range: f64,
    same_dir_legal: bool,
    out: &'a mut Vec<Defect>,
}

impl RingCheck<'_> {
    fn push(&mut self, kind: DefectKind, contour: usize, vertex: usize) {
        self.out.push(Defect { kind, contour, vertex });
    }

    fn ring<V, E>(&mut self, ring: &[Node<V, E>], closed: bool, contour: usize, base: usize) {
        let flags = self.flags;
        if flags.contains(DefectKind::CoordinateOutOfRange) {
            if let Some(i) = ring.iter().position(|n| {
                !n.point.x.is_finite()
                    || !n.point.y.is_finite()
                    || n.point.x.abs() > self.range
                    || n.point.y.abs() > self.range
            }) {
                self.push(DefectKind::CoordinateOutOfRange, contour, base + i);
            }
        }
        let n = ring.len();
        let edges = ring_edge_count(ring, closed);
        if flags.contains(DefectKind::CoincidentVertices) {
            for i in 0..edges {
                if points_coincide(&ring[i].point, &ring[(i + 1) % n].point) {
                    self.push(DefectKind::CoincidentVertices, contour, base + i);
                }
            }
        }
        if flags.contains(DefectKind::NearZeroArc) {
            for i in 0..edges {
                if ring[i].arc_angle != 0.0 {
                    let edge = ring_edge(ring, i);
                    if edge.arc().map_or(true, |a| a.sagitta() <= POINT_EPS) {
                        self.push(DefectKind::NearZeroArc, contour, base + i);
                    }
                }
            }
        }
        if flags.contains(DefectKind::SameDirectionEdges) && !self.same_dir_legal {
            for i in same_dir_vertices(ring, closed) {
                self.push(DefectKind::SameDirectionEdges, contour, base + i);
            }
        }
        if flags.contains(DefectKind::DegenerateContour) {
            let degenerate = if closed {
                let has_arc = ring.iter().any(|node| node.arc_angle != 0.0);
                n < 2 || (n == 2 && !has_arc) || ring_is_flat(ring)
            } else {
                n < 2 || ring_length(ring, false) <= POINT_EPS
            };
            if degenerate {
                self.push(DefectKind::DegenerateContour, contour, base);
            }
        }
    }
}

pub(crate) fn check_polygon<V, E, C, P>(store: &PolygonStore<V, E, C, P>, flags: CheckFlags, range: f64) -> CheckReport
where
    V: UserData,
    E: UserData,
    C: UserData,
    P: UserData,
{
    let mut defects = Vec::new();
    let mut rc = RingCheck {
        flags,
        range,
        same_dir_legal: store.flags.same_dir_edge_legal,
        out: &mut defects,
    };
    for c in 0..store.contour_count() {
        rc.ring(store.ring(c), true, c, store.contour_range(c).start);
    }
    if flags.contains(DefectKind::SelfIntersection) {
        if let Some(&(a, _)) = edge_crossings(store, true).first() {
            defects.push(Defect {
                kind: DefectKind::SelfIntersection,
                contour: store.contour_of(a),
                vertex: a,
            });
        }
    }
    CheckReport { defects }
}

/// First edge of a polyline that meets a non-adjacent edge or folds back
fn polyline_crossing<V, E>(ring: &[Node<V, E>], closed: bool) -> Option<usize> {
    let m = ring_edge_count(ring, closed);
    for i in 0..m {
        let ei = ring_edge(ring, i);
        for j in i + 1..m {
            let ej = ring_edge(ring, j);
            if !ei.bounding_box().overlaps(&ej.bounding_box(), POINT_EPS) {
                continue;
            }
            let forward = j == i + 1;
            let wrap = closed && i == 0 && j == m - 1;
            let hit = ei.intersections(&ej).iter().any(|h| {
                let shared_forward = forward && (h.point - ei.end()).norm() <= POINT_EPS;
                let shared_wrap = wrap && (h.point - ei.start()).norm() <= POINT_EPS;
                !(shared_forward || shared_wrap)
            });
            let folded = (forward || wrap)
                && (ei.distance_to(&ej.point_at(0.5)) <= POINT_EPS || ej.distance_to(&ei.point_at(0.5)) <= POINT_EPS);
            if hit || folded {
                return Some(i);
            }
        }
    }
    None
}

pub(crate) fn check_polyline<V, E, P>(store: &PolylineStore<V, E, P>, flags: CheckFlags, range: f64) -> CheckReport
where
    V: UserData,
    E: UserData,
    P: UserData,
{
    let mut defects = Vec::new();
    if store.nodes.is_empty() {
        return CheckReport { defects };
    }
    let mut rc = RingCheck {
        flags,
        range,
        same_dir_legal: store.flags.same_dir_edge_legal,
        out: &mut defects,
    };
    rc.ring(&store.nodes, store.closed, 0, 0);
    if flags.contains(DefectKind::SelfIntersection) {
        if let Some(i) = polyline_crossing(&store.nodes, store.closed) {
            defects.push(Defect {
                kind: DefectKind::SelfIntersection,
                contour: 0,
                vertex: i,
            });
        }
    }
    CheckReport { defects }
}

fn straighten_tiny_arcs<V, E>(ring: &mut [Node<V, E>], closed: bool) -> bool {
    let mut changed = false;
    for i in 0..ring_edge_count(ring, closed) {
        if ring[i].arc_angle != 0.0 && ring_edge(ring, i).arc().map_or(true, |a| a.sagitta() <= POINT_EPS) {
            ring[i].arc_angle = 0.0;
            changed = true;
        }
    }
    changed
}

/// Fix every defect of `kind`; `Ok(false)` when nothing changed
pub(crate) fn repair_polygon<V, E, C, P>(store: &mut PolygonStore<V, E, C, P>, kind: DefectKind) -> Result<bool>
where
    V: UserData,
    E: UserData,
    C: UserData,
    P: UserData,
{
    match kind {
        DefectKind::CoincidentVertices => Ok(store.dedup()),
        DefectKind::NearZeroArc => {
            let mut changed = false;
            for c in 0..store.contour_count() {
                let range = store.contour_range(c);
                changed |= straighten_tiny_arcs(&mut store.nodes[range], true);
            }
            Ok(changed)
        }
        DefectKind::SameDirectionEdges => Ok(store.merge_same_dir_edges()),
        DefectKind::DegenerateContour => {
            let report = check_polygon(store, CheckFlags::only(kind), f64::INFINITY);
            let mut contours: Vec<usize> = report.defects.iter().map(|d| d.contour).collect();
            if contours.first() == Some(&0) {
                store.clear();
                return Ok(true);
            }
            contours.sort_unstable();
            for &c in contours.iter().rev() {
                store.remove_ring(c);
            }
            Ok(!contours.is_empty())
        }
        DefectKind::CoordinateOutOfRange | DefectKind::SelfIntersection => Err(Error::Unrepairable(kind)),
    }
}

pub(crate) fn repair_polyline<V, E, P>(store: &mut PolylineStore<V, E, P>, kind: DefectKind) -> Result<bool>
where
    V: UserData,
    E: UserData,
    P: UserData,
{
    let closed = store.closed;
    match kind {
        DefectKind::CoincidentVertices => Ok(dedup_ring(&mut store.nodes, closed)),
        DefectKind::NearZeroArc => Ok(straighten_tiny_arcs(&mut store.nodes, closed)),
        DefectKind::SameDirectionEdges => Ok(merge_same_dir(&mut store.nodes, closed)),
        DefectKind::DegenerateContour => {
            let report = check_polyline(store, CheckFlags::only(kind), f64::INFINITY);
            if report.is_clean() {
                return Ok(false);
            }
            store.nodes.clear();
            store.closed = false;
            Ok(true)
        }
        DefectKind::CoordinateOutOfRange | DefectKind::SelfIntersection => Err(Error::Unrepairable(kind)),
    }
}

/// Alternate checks and repairs until clean, stuck, or out of rounds
///
/// A round that cannot change anything, or running out of rounds with
/// repairable defects left, is `RepairDidNotConverge`.
pub(crate) fn check_and_repair_loop<T>(
    max_iterations: usize,
    target: &mut T,
    check: impl Fn(&T) -> CheckReport,
    repair: impl Fn(&mut T, DefectKind) -> Result<bool>,
) -> Result<RepairOutcome> {
    let mut modified = false;
    for round in 0..max_iterations {
        let report = check(target);
        let kind = match report.first_repairable() {
            Some(kind) => kind,
            None => {
                return Ok(RepairOutcome {
                    succeeded: report.is_clean(),
                    modified,
                })
            }
        };
        if !repair(target, kind)? {
            tracing::warn!(?kind, round, "repair made no progress");
            return Err(Error::RepairDidNotConverge { iterations: round + 1 });
        }
        modified = true;
    }
    let report = check(target);
    match report.first_repairable() {
        None => Ok(RepairOutcome {
            succeeded: report.is_clean(),
            modified,
        }),
        Some(kind) => {
            tracing::warn!(?kind, max_iterations, "repair loop hit its iteration cap");
            Err(Error::RepairDidNotConverge {
                iterations: max_iterations,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flags::PolyFlags;
    use polyform_core::Point2;

    type Store = PolygonStore<(), (), (), ()>;

    fn store(points: &[(f64, f64)]) -> Store {
        let mut s = Store::empty(PolyFlags::default());
        s.push_ring(points.iter().map(|&(x, y)| Node::plain(Point2::new(x, y))).collect(), ());
        s
    }

    #[test]
    fn test_clean_square() {
        let s = store(&[(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)]);
        assert!(check_polygon(&s, CheckFlags::ALL, 1e9).is_clean());
    }

    #[test]
    fn test_finds_and_repairs_defects() {
        let mut s = store(&[(0.0, 0.0), (1.0, 0.0), (2.0, 0.0), (2.0, 0.0), (2.0, 2.0), (0.0, 2.0)]);
        let report = check_polygon(&s, CheckFlags::ALL, 1e9);
        assert!(report.contains(DefectKind::CoincidentVertices));
        assert!(report.contains(DefectKind::SameDirectionEdges));
        let outcome = check_and_repair_loop(
            8,
            &mut s.clone(),
            |s| check_polygon(s, CheckFlags::ALL, 1e9),
            |_, _| Ok(false),
        );
        assert!(matches!(outcome, Err(Error::RepairDidNotConverge { iterations: 1 })));

        let mut rounds = 0;
        while let Some(kind) = check_polygon(&s, CheckFlags::ALL, 1e9).first_repairable() {
            assert!(repair_polygon(&mut s, kind).unwrap());
            rounds += 1;
        }
        assert_eq!(rounds, 2);
        assert_eq!(s.nodes.len(), 4);
    }

    #[test]
    fn test_unrepairable_defects() {
        let mut s = store(&[(0.0, 0.0), (2.0, 2.0), (2.0, 0.0), (0.0, 2.0)]);
        let report = check_polygon(&s, CheckFlags::ALL, 1e9);
        assert!(report.contains(DefectKind::SelfIntersection));
        assert_eq!(report.first_repairable(), None);
        assert!(matches!(
            repair_polygon(&mut s, DefectKind::SelfIntersection),
            Err(Error::Unrepairable(DefectKind::SelfIntersection))
        ));

        let far = store(&[(0.0, 0.0), (1e10, 0.0), (0.0, 1.0)]);
        assert!(check_polygon(&far, CheckFlags::ALL, 1e9).contains(DefectKind::CoordinateOutOfRange));
    }

    #[test]
    fn test_degenerate_hole_removed() {
        let mut s = store(&[(0.0, 0.0), (4.0, 0.0), (4.0, 4.0), (0.0, 4.0)]);
        s.push_ring(
            vec![Node::plain(Point2::new(1.0, 1.0)), Node::plain(Point2::new(2.0, 1.0))],
            (),
        );
        assert!(repair_polygon(&mut s, DefectKind::DegenerateContour).unwrap());
        assert_eq!(s.contour_count(), 1);
    }

    #[test]
    fn test_balanced_bow_tie_is_not_degenerate() {
        let s = store(&[(0.0, 0.0), (2.0, 2.0), (2.0, 0.0), (0.0, 2.0)]);
        let report = check_polygon(&s, CheckFlags::ALL, 1e9);
        assert!(!report.contains(DefectKind::DegenerateContour));
        assert!(report.contains(DefectKind::SelfIntersection));
    }

    #[test]
    fn test_polyline_fold_back() {
        let line: PolylineStore<(), (), ()> = PolylineStore {
            nodes: vec![
                Node::plain(Point2::new(0.0, 0.0)),
                Node::plain(Point2::new(2.0, 0.0)),
                Node::plain(Point2::new(1.0, 0.0)),
            ],
            closed: false,
            data: (),
            flags: PolyFlags::default(),
        };
        assert!(check_polyline(&line, CheckFlags::ALL, 1e9).contains(DefectKind::SelfIntersection));
    }
}
