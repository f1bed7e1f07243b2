// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Common edge sections between two polygons

use super::edit::split_ring_edges;
use super::store::PolygonStore;
use crate::user_data::UserData;
use polyform_core::tolerance::POINT_EPS;
use polyform_core::Edge2D;

fn interior(edge: &Edge2D, t: f64) -> bool {
    let p = edge.point_at(t);
    (p - edge.start()).norm() > POINT_EPS && (p - edge.end()).norm() > POINT_EPS
}

fn apply_splits<V, E, C, P>(store: &mut PolygonStore<V, E, C, P>, splits: &[Vec<f64>]) -> bool
where
    V: UserData,
    E: UserData,
    C: UserData,
    P: UserData,
{
    if splits.iter().all(Vec::is_empty) {
        return false;
    }
    for c in (0..store.contour_count()).rev() {
        let range = store.contour_range(c);
        let ring = split_ring_edges(store.ring(c), true, &splits[range]);
        store.replace_ring(c, ring);
    }
    true
}

/// Insert a vertex into either polygon wherever one of its edges meets an
/// edge of the other away from existing vertices
pub(crate) fn create_common_edge_sections<V, E, C, P>(
    a: &mut PolygonStore<V, E, C, P>,
    b: &mut PolygonStore<V, E, C, P>,
) -> bool
where
    V: UserData,
    E: UserData,
    C: UserData,
    P: UserData,
{
    let edges_b: Vec<(Edge2D, _)> = b
        .edges()
        .map(|(_, e)| {
            let bbox = e.bounding_box();
            (e, bbox)
        })
        .collect();
    let mut splits_a = vec![Vec::new(); a.nodes.len()];
    let mut splits_b = vec![Vec::new(); b.nodes.len()];
    for (i, ea) in a.edges() {
        let bbox = ea.bounding_box();
        for (j, (eb, bbox_b)) in edges_b.iter().enumerate() {
            if !bbox.overlaps(bbox_b, POINT_EPS) {
                continue;
            }
            for hit in ea.intersections(eb) {
                if interior(&ea, hit.t_self) {
                    splits_a[i].push(hit.t_self);
                }
                if interior(eb, hit.t_other) {
                    splits_b[j].push(hit.t_other);
                }
            }
        }
    }
    let changed_a = apply_splits(a, &splits_a);
    let changed_b = apply_splits(b, &splits_b);
    tracing::debug!(changed_a, changed_b, "common edge sections");
    changed_a || changed_b
}
