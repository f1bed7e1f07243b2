// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Cutting polygons and polylines with half-planes
//!
//! A cut keeps the part inside every half-plane: one plane for `cut`, two
//! for `strip`, four for `clip`.

use super::boolean::BooleanResult;
use super::overlay::{OverlayJob, Orientation};
use super::store::{Node, PolygonStore, PolylineStore};
use crate::user_data::UserData;
use i_overlay::core::overlay_rule::OverlayRule;
use polyform_core::tolerance::POINT_EPS;
use polyform_core::vector::direction_angle;
use polyform_core::{ArcDivParams, Edge2D, HalfPlane2D};

/// Numerical classification of a cut
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CutStatus {
    #[default]
    Regular,
    /// A vertex lies on a cutting line
    VertexOnBoundary,
    /// A straight edge lies along a cutting line
    EdgeOnBoundary,
}

pub(crate) struct CutClass {
    pub full_in: bool,
    pub full_out: bool,
    pub status: CutStatus,
}

/// Extreme signed distances of an edge to a half-plane boundary
fn edge_extremes(edge: &Edge2D, plane: &HalfPlane2D) -> (f64, f64) {
    let mut lo = plane.signed_distance(&edge.start()).min(plane.signed_distance(&edge.end()));
    let mut hi = plane.signed_distance(&edge.start()).max(plane.signed_distance(&edge.end()));
    if let Some(arc) = edge.arc() {
        for dir in [plane.normal, -plane.normal] {
            if arc.contains_angle(direction_angle(&dir), 0.0).is_some() {
                let d = plane.signed_distance(&(arc.center + dir * arc.radius));
                lo = lo.min(d);
                hi = hi.max(d);
            }
        }
    }
    (lo, hi)
}

pub(crate) fn classify_edges(edges: &[Edge2D], planes: &[HalfPlane2D]) -> CutClass {
    let mut full_in = true;
    let mut full_out = false;
    let mut status = CutStatus::Regular;
    for plane in planes {
        let mut lo = f64::INFINITY;
        let mut hi = f64::NEG_INFINITY;
        for edge in edges {
            let (l, h) = edge_extremes(edge, plane);
            lo = lo.min(l);
            hi = hi.max(h);
            let ds = plane.signed_distance(&edge.start()).abs();
            let de = plane.signed_distance(&edge.end()).abs();
            if ds <= POINT_EPS && de <= POINT_EPS && !edge.is_arc() {
                status = CutStatus::EdgeOnBoundary;
            } else if (ds <= POINT_EPS || de <= POINT_EPS) && status == CutStatus::Regular {
                status = CutStatus::VertexOnBoundary;
            }
        }
        if hi > POINT_EPS {
            full_in = false;
        }
        if lo >= -POINT_EPS {
            full_out = true;
        }
    }
    CutClass {
        full_in,
        full_out,
        status,
    }
}

/// Keep the part of a regularized polygon inside all `planes`
pub(crate) fn cut_polygon<V, E, C, P>(
    store: &PolygonStore<V, E, C, P>,
    planes: &[HalfPlane2D],
    arc_div: &ArcDivParams,
) -> (BooleanResult<PolygonStore<V, E, C, P>>, CutStatus)
where
    V: UserData,
    E: UserData,
    C: UserData,
    P: UserData,
{
    let bbox = match store.bbox() {
        Some(b) => b,
        None => return (BooleanResult::EmptyPolygon, CutStatus::Regular),
    };
    let edges: Vec<Edge2D> = store.edges().map(|(_, e)| e).collect();
    let class = classify_edges(&edges, planes);
    if class.full_in {
        return (BooleanResult::ResultSameAsThis, class.status);
    }
    if class.full_out {
        return (BooleanResult::EmptyPolygon, class.status);
    }

    let mut region = bbox.inflated(bbox.extent() + 1.0).corners().to_vec();
    for plane in planes {
        region = plane.clip_ring(&region);
        if region.len() < 3 {
            return (BooleanResult::EmptyPolygon, class.status);
        }
    }
    let mut window = PolygonStore::empty(store.flags);
    window.push_ring(region.into_iter().map(Node::plain).collect(), C::default());

    let job = OverlayJob::new(vec![store, &window], arc_div);
    let subject = job.paths(0, Orientation::AsIs, false);
    let clip = job.paths(1, Orientation::Normalized, false);
    let shapes = job.run(&subject, &clip, OverlayRule::Intersect);
    let (stores, _) = job.collect(&shapes, true);
    tracing::debug!(planes = planes.len(), pieces = stores.len(), status = ?class.status, "polygon cut");
    if stores.is_empty() {
        (BooleanResult::EmptyPolygon, class.status)
    } else {
        (BooleanResult::NewPolygons(stores), class.status)
    }
}

/// Result of cutting a polyline
pub(crate) struct PolylineCut<V, E, P> {
    pub pieces: Vec<PolylineStore<V, E, P>>,
    pub full_in: bool,
    pub status: CutStatus,
}

#[derive(Debug, Clone, Copy)]
struct Piece {
    edge: usize,
    t0: f64,
    t1: f64,
}

/// Keep the parts of a polyline inside all `planes`; pieces never merge
/// except across the closing vertex of a closed polyline
pub(crate) fn cut_polyline<V, E, P>(store: &PolylineStore<V, E, P>, planes: &[HalfPlane2D]) -> PolylineCut<V, E, P>
where
    V: UserData,
    E: UserData,
    P: UserData,
{
    let edge_count = store.edge_count();
    let edges: Vec<Edge2D> = (0..edge_count).map(|i| store.edge(i)).collect();
    let class = classify_edges(&edges, planes);
    if class.full_in {
        return PolylineCut {
            pieces: vec![store.clone()],
            full_in: true,
            status: class.status,
        };
    }
    if class.full_out || edges.is_empty() {
        return PolylineCut {
            pieces: Vec::new(),
            full_in: false,
            status: class.status,
        };
    }

    let mut pieces: Vec<Piece> = Vec::new();
    for (i, edge) in edges.iter().enumerate() {
        let mut ts = vec![0.0, 1.0];
        for plane in planes {
            ts.extend(edge.line_params(&plane.boundary_point(), &plane.direction()));
        }
        ts.sort_by(|a, b| a.total_cmp(b));
        ts.dedup_by(|a, b| (*a - *b).abs() <= 1e-12);
        for w in ts.windows(2) {
            let (t0, t1) = (w[0], w[1]);
            if (edge.point_at(t1) - edge.point_at(t0)).norm() <= POINT_EPS {
                continue;
            }
            let mid = edge.point_at(0.5 * (t0 + t1));
            if planes.iter().all(|h| h.contains(&mid)) {
                pieces.push(Piece { edge: i, t0, t1 });
            }
        }
    }

    let mut chains: Vec<Vec<Piece>> = Vec::new();
    for piece in pieces {
        let (same_edge, next_edge) = chains.last().and_then(|c| c.last()).map_or((false, false), |last| {
            (
                last.edge == piece.edge && (last.t1 - piece.t0).abs() <= 1e-12,
                last.edge + 1 == piece.edge && last.t1 >= 1.0 && piece.t0 <= 0.0,
            )
        });
        match chains.last_mut() {
            // touching a boundary splits an edge without leaving the region
            Some(chain) if same_edge => {
                if let Some(last) = chain.last_mut() {
                    last.t1 = piece.t1;
                }
            }
            Some(chain) if next_edge => chain.push(piece),
            _ => chains.push(vec![piece]),
        }
    }
    if store.closed && chains.len() > 1 {
        let first_starts = chains[0][0].edge == 0 && chains[0][0].t0 <= 0.0;
        let last_piece = chains[chains.len() - 1][chains[chains.len() - 1].len() - 1];
        if first_starts && last_piece.edge + 1 == edge_count && last_piece.t1 >= 1.0 {
            let first = chains.remove(0);
            if let Some(last) = chains.last_mut() {
                last.extend(first);
            }
        }
    }

    let pieces = chains
        .iter()
        .map(|chain| build_piece(store, &edges, chain))
        .collect();
    PolylineCut {
        pieces,
        full_in: false,
        status: class.status,
    }
}

fn build_piece<V, E, P>(store: &PolylineStore<V, E, P>, edges: &[Edge2D], chain: &[Piece]) -> PolylineStore<V, E, P>
where
    V: UserData,
    E: UserData,
    P: UserData,
{
    let n = store.nodes.len();
    let mut nodes = Vec::with_capacity(chain.len() + 1);
    for piece in chain {
        let sub = edges[piece.edge].sub_edge(piece.t0, piece.t1);
        let data = if piece.t0 <= 0.0 {
            store.nodes[piece.edge].data.clone()
        } else {
            V::default()
        };
        nodes.push(Node::new(sub.start(), data, sub.sweep(), store.nodes[piece.edge].edge_data.clone()));
    }
    if let Some(last) = chain.last() {
        let end = edges[last.edge].point_at(last.t1);
        let data = if last.t1 >= 1.0 {
            store.nodes[(last.edge + 1) % n].data.clone()
        } else {
            V::default()
        };
        nodes.push(Node::new(end, data, 0.0, E::default()));
    }
    PolylineStore {
        nodes,
        closed: false,
        data: store.data.clone(),
        flags: store.flags,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flags::PolyFlags;
    use approx::assert_relative_eq;
    use polyform_core::{Point2, Vector2};

    fn square() -> PolygonStore<(), u8, (), ()> {
        let mut s = PolygonStore::empty(PolyFlags::default());
        s.push_ring(
            vec![
                Node::new(Point2::new(0.0, 0.0), (), 0.0, 1),
                Node::new(Point2::new(4.0, 0.0), (), 0.0, 2),
                Node::new(Point2::new(4.0, 4.0), (), 0.0, 3),
                Node::new(Point2::new(0.0, 4.0), (), 0.0, 4),
            ],
            (),
        );
        s
    }

    #[test]
    fn test_cut_square_in_half() {
        let plane = HalfPlane2D::new(Vector2::new(1.0, 0.0), 2.0).unwrap();
        let (result, status) = cut_polygon(&square(), &[plane], &ArcDivParams::default());
        assert_eq!(status, CutStatus::Regular);
        match result {
            BooleanResult::NewPolygons(v) => {
                assert_eq!(v.len(), 1);
                assert_relative_eq!(v[0].signed_area(), 8.0, epsilon = 1e-9);
                // the bottom edge keeps its data, the cut edge gets the default
                assert!(v[0].nodes.iter().any(|n| n.edge_data == 1));
                assert!(v[0].nodes.iter().any(|n| n.edge_data == 0));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_cut_full_in_and_out() {
        let keep = HalfPlane2D::new(Vector2::new(1.0, 0.0), 10.0).unwrap();
        assert_eq!(
            cut_polygon(&square(), &[keep], &ArcDivParams::default()).0,
            BooleanResult::ResultSameAsThis
        );
        let drop = HalfPlane2D::new(Vector2::new(1.0, 0.0), -1.0).unwrap();
        assert_eq!(
            cut_polygon(&square(), &[drop], &ArcDivParams::default()).0,
            BooleanResult::EmptyPolygon
        );
    }

    #[test]
    fn test_edge_on_boundary_status() {
        let plane = HalfPlane2D::new(Vector2::new(1.0, 0.0), 4.0).unwrap();
        let (result, status) = cut_polygon(&square(), &[plane], &ArcDivParams::default());
        assert_eq!(result, BooleanResult::ResultSameAsThis);
        assert_eq!(status, CutStatus::EdgeOnBoundary);
    }

    #[test]
    fn test_polyline_cut_into_pieces() {
        // zig-zag crossing y = 1 three times
        let store: PolylineStore<u8, (), ()> = PolylineStore {
            nodes: vec![
                Node::new(Point2::new(0.0, 0.0), 1, 0.0, ()),
                Node::new(Point2::new(1.0, 2.0), 2, 0.0, ()),
                Node::new(Point2::new(2.0, 0.0), 3, 0.0, ()),
                Node::new(Point2::new(3.0, 2.0), 4, 0.0, ()),
            ],
            closed: false,
            data: (),
            flags: PolyFlags::default(),
        };
        let below = HalfPlane2D::new(Vector2::new(0.0, 1.0), 1.0).unwrap();
        let cut = cut_polyline(&store, &[below]);
        assert!(!cut.full_in);
        assert_eq!(cut.pieces.len(), 2);
        assert_eq!(cut.pieces[0].nodes.len(), 2);
        assert_eq!(cut.pieces[0].nodes[0].data, 1);
        assert_eq!(cut.pieces[1].nodes.len(), 3);
        assert_eq!(cut.pieces[1].nodes[1].data, 3);
        assert_relative_eq!(cut.pieces[1].nodes[0].point.x, 1.5, epsilon = 1e-12);
    }

    #[test]
    fn test_touching_boundary_keeps_edge_whole() {
        // half circle over the top reaching y = 1, then a straight run
        // that the second plane shortens
        let store: PolylineStore<u8, u8, ()> = PolylineStore {
            nodes: vec![
                Node::new(Point2::new(-1.0, 0.0), 1, -std::f64::consts::PI, 7),
                Node::new(Point2::new(1.0, 0.0), 2, 0.0, 8),
                Node::new(Point2::new(3.0, 0.0), 3, 0.0, 0),
            ],
            closed: false,
            data: (),
            flags: PolyFlags::default(),
        };
        let below = HalfPlane2D::new(Vector2::new(0.0, 1.0), 1.0).unwrap();
        let left = HalfPlane2D::new(Vector2::new(1.0, 0.0), 2.0).unwrap();
        let cut = cut_polyline(&store, &[below, left]);
        assert!(!cut.full_in);
        assert_eq!(cut.pieces.len(), 1);
        let piece = &cut.pieces[0];
        assert_eq!(piece.nodes.len(), 3);
        assert_eq!(piece.nodes[0].edge_data, 7);
        assert_relative_eq!(piece.nodes[0].arc_angle, -std::f64::consts::PI, epsilon = 1e-9);
        assert_eq!(piece.nodes[1].data, 2);
        assert_relative_eq!(piece.nodes[2].point.x, 2.0, epsilon = 1e-12);
    }
}
