// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Regularization of irregular polygons
//!
//! Input that is already simple only gets cleaned in place (duplicate
//! vertices, degenerate contours, orientation). Anything else is rebuilt by
//! the overlay with contour 0 oriented counter-clockwise, every other contour
//! clockwise, and positive winding kept as solid, so where loops of one
//! contour cancel, the orientation with the larger absolute area wins.

use super::boolean::BooleanResult;
use super::overlay::{OverlayJob, Orientation};
use super::store::{ring_is_flat, ring_winding, PolygonStore};
use crate::flags::RegularizeChanges;
use crate::user_data::UserData;
use i_overlay::core::overlay_rule::OverlayRule;
use polyform_core::tolerance::POINT_EPS;
use polyform_core::{ArcDivParams, Box2D, Edge2D};

/// Pairs of edges that meet anywhere other than a shared end vertex
pub(crate) fn edge_crossings<V, E, C, P>(store: &PolygonStore<V, E, C, P>, first_only: bool) -> Vec<(usize, usize)>
where
    V: UserData,
    E: UserData,
    C: UserData,
    P: UserData,
{
    let mut edges: Vec<(usize, Edge2D, Box2D)> = store
        .edges()
        .map(|(i, e)| {
            let bbox = e.bounding_box();
            (i, e, bbox)
        })
        .collect();
    edges.sort_by(|a, b| a.2.min.x.total_cmp(&b.2.min.x));

    let mut out = Vec::new();
    for (k, (i, ei, bi)) in edges.iter().enumerate() {
        for (j, ej, bj) in edges[k + 1..].iter() {
            if bj.min.x > bi.max.x + POINT_EPS {
                break;
            }
            if !bi.overlaps(bj, POINT_EPS) {
                continue;
            }
            let (a, b) = if i < j { (*i, *j) } else { (*j, *i) };
            let (ea, eb) = if i < j { (ei, ej) } else { (ej, ei) };
            let a_then_b = store.next_vertex(a) == b;
            let b_then_a = store.next_vertex(b) == a;
            let crossing = ea.intersections(eb).iter().any(|h| {
                let at_a_end = h.t_self >= 1.0 - 1e-9 || (ea.end() - h.point).norm() <= POINT_EPS;
                let at_a_start = h.t_self <= 1e-9 || (ea.start() - h.point).norm() <= POINT_EPS;
                let shared_forward = a_then_b && at_a_end && (eb.start() - h.point).norm() <= POINT_EPS;
                let shared_backward = b_then_a && at_a_start && (eb.end() - h.point).norm() <= POINT_EPS;
                !(shared_forward || shared_backward)
            });
            if crossing || overlapping_adjacent(ea, eb, a_then_b, b_then_a) {
                out.push((a, b));
                if first_only {
                    return out;
                }
            }
        }
    }
    out
}

/// Adjacent edges folding back onto each other share more than a vertex
fn overlapping_adjacent(ea: &Edge2D, eb: &Edge2D, a_then_b: bool, b_then_a: bool) -> bool {
    if !(a_then_b || b_then_a) {
        return false;
    }
    ea.distance_to(&eb.point_at(0.5)) <= POINT_EPS || eb.distance_to(&ea.point_at(0.5)) <= POINT_EPS
}

/// Whether contours are simple, disjoint, and holes nest in contour 0
pub(crate) fn is_simple_arrangement<V, E, C, P>(store: &PolygonStore<V, E, C, P>) -> bool
where
    V: UserData,
    E: UserData,
    C: UserData,
    P: UserData,
{
    for c in 0..store.contour_count() {
        let ring = store.ring(c);
        let has_arc = ring.iter().any(|n| n.arc_angle != 0.0);
        if ring.len() < 2 || (ring.len() == 2 && !has_arc) {
            return false;
        }
    }
    if !edge_crossings(store, true).is_empty() {
        return false;
    }
    let outer = store.ring(0);
    let probes: Vec<_> = (1..store.contour_count())
        .map(|c| store.edge(store.contour_range(c).start).point_at(0.5))
        .collect();
    for (h, probe) in probes.iter().enumerate() {
        if ring_winding(outer, probe) == 0 {
            return false;
        }
        for other in 1..store.contour_count() {
            if other != h + 1 && ring_winding(store.ring(other), probe) != 0 {
                return false;
            }
        }
    }
    true
}

/// Regularize `store`
///
/// `ResultSameAsThis` means the input already satisfies every invariant.
pub(crate) fn regularize<V, E, C, P>(
    store: &PolygonStore<V, E, C, P>,
    arc_div: &ArcDivParams,
) -> (BooleanResult<PolygonStore<V, E, C, P>>, RegularizeChanges)
where
    V: UserData,
    E: UserData,
    C: UserData,
    P: UserData,
{
    let mut changes = RegularizeChanges::default();
    if store.is_empty() {
        return (BooleanResult::EmptyPolygon, changes);
    }

    let mut work = store.clone();
    let before = work.nodes.len();
    if work.dedup() {
        changes.removed_vertices = true;
        changes.removed_edges = true;
    }
    let mut c = 0;
    while c < work.contour_count() {
        let ring = work.ring(c);
        let has_arc = ring.iter().any(|n| n.arc_angle != 0.0);
        let degenerate = ring.len() < 2 || (ring.len() == 2 && !has_arc) || ring_is_flat(ring);
        if degenerate {
            if c == 0 {
                tracing::debug!("outer contour is degenerate, polygon regularizes to empty");
                changes.removed_contours = true;
                return (BooleanResult::EmptyPolygon, changes);
            }
            work.remove_ring(c);
            changes.removed_contours = true;
        } else {
            c += 1;
        }
    }
    if !work.flags.same_dir_edge_legal && work.merge_same_dir_edges() {
        changes.removed_vertices = true;
        changes.removed_edges = true;
    }

    if is_simple_arrangement(&work) {
        for c in 0..work.contour_count() {
            let area = work.contour_signed_area(c);
            if (c == 0 && area < 0.0) || (c > 0 && area > 0.0) {
                work.reverse_contour(c);
                changes.reversed_contours = true;
            }
        }
        if !changes.any() {
            tracing::debug!(vertices = before, "polygon already regular");
            return (BooleanResult::ResultSameAsThis, changes);
        }
        tracing::debug!(vertices = before, ?changes, "polygon regularized in place");
        return (BooleanResult::NewPolygons(vec![work]), changes);
    }

    let job = OverlayJob::new(vec![store], arc_div);
    let paths = job.paths(0, Orientation::Normalized, false);
    let shapes = job.run(&paths, &[], OverlayRule::Subject);
    let (stores, changes) = job.collect(&shapes, true);
    tracing::debug!(vertices = before, pieces = stores.len(), "polygon regularized by overlay");
    if stores.is_empty() {
        (BooleanResult::EmptyPolygon, changes)
    } else {
        (BooleanResult::NewPolygons(stores), changes)
    }
}
