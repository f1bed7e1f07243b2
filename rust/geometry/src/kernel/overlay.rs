// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! i_overlay bridge
//!
//! Polygons are flattened into i_overlay paths (arcs become chords), run
//! through a single float overlay, and the resulting shapes are mapped back
//! onto the source geometry:
//!
//! - output vertices snap to coincident source vertices and inherit their data
//! - output segments lying on a source edge inherit that edge's data, and runs
//!   of chords of one source arc are merged back into a single arc edge
//! - contour data is taken from the source contour most output edges came from
//! - polygon data and flags come from the first operand

use super::store::{dedup_ring, merge_same_dir, ring_signed_area, Node, PolygonStore};
use crate::flags::RegularizeChanges;
use crate::user_data::{majority, UserData};
use i_overlay::core::fill_rule::FillRule;
use i_overlay::core::overlay_rule::OverlayRule;
use i_overlay::float::single::SingleFloatOverlay;
use polyform_core::tolerance::{ANGLE_EPS, AREA_EPS, POINT_EPS};
use polyform_core::vector::{direction_angle, normalize_angle_positive};
use polyform_core::{ArcDivParams, Box2D, Edge2D, Point2};
use rustc_hash::{FxHashMap, FxHashSet};
use std::sync::OnceLock;

pub(crate) type Path = Vec<[f64; 2]>;
pub(crate) type Shapes = Vec<Vec<Path>>;

/// How contours are oriented before they enter the overlay
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Orientation {
    /// Keep the stored direction (regularized input)
    AsIs,
    /// Contour 0 counter-clockwise, all other contours clockwise
    Normalized,
}

/// Fill rule that treats counter-clockwise contours as positive winding
fn ccw_positive_rule() -> FillRule {
    static CCW_IS_POSITIVE: OnceLock<bool> = OnceLock::new();
    let positive = *CCW_IS_POSITIVE.get_or_init(|| {
        let square: Vec<Path> = vec![vec![[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]]];
        let empty: Vec<Path> = Vec::new();
        !square
            .overlay(&empty, OverlayRule::Subject, FillRule::Positive)
            .is_empty()
    });
    if positive {
        FillRule::Positive
    } else {
        FillRule::Negative
    }
}

/// Signed area of a chord path
pub(crate) fn path_area(path: &[[f64; 2]]) -> f64 {
    let n = path.len();
    if n < 3 {
        return 0.0;
    }
    let mut area = 0.0;
    for i in 0..n {
        let j = (i + 1) % n;
        area += path[i][0] * path[j][1] - path[j][0] * path[i][1];
    }
    area * 0.5
}

pub(crate) fn shapes_area(shapes: &Shapes) -> f64 {
    shapes
        .iter()
        .flat_map(|shape| shape.iter())
        .map(|path| path_area(path))
        .sum::<f64>()
        .abs()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct EdgeKey {
    operand: usize,
    node: usize,
}

#[derive(Debug, Clone, Copy)]
struct SourceSeg {
    a: Point2<f64>,
    b: Point2<f64>,
    key: EdgeKey,
}

fn segment_distance(p: &Point2<f64>, a: &Point2<f64>, b: &Point2<f64>) -> f64 {
    let d = b - a;
    let len2 = d.norm_squared();
    if len2 <= f64::EPSILON {
        return (p - a).norm();
    }
    let t = ((p - a).dot(&d) / len2).clamp(0.0, 1.0);
    (a + d * t - p).norm()
}

/// Uniform grid over source segments
struct SegmentGrid {
    cell: f64,
    cells: FxHashMap<(i64, i64), Vec<usize>>,
}

impl SegmentGrid {
    fn new(cell: f64) -> Self {
        Self {
            cell,
            cells: FxHashMap::default(),
        }
    }

    #[inline]
    fn key(&self, p: &Point2<f64>) -> (i64, i64) {
        ((p.x / self.cell).floor() as i64, (p.y / self.cell).floor() as i64)
    }

    fn insert(&mut self, idx: usize, a: &Point2<f64>, b: &Point2<f64>) {
        let steps = ((b - a).norm() / (self.cell * 0.5)).ceil().max(1.0) as usize;
        let mut seen: FxHashSet<(i64, i64)> = FxHashSet::default();
        for s in 0..=steps {
            let p = a + (b - a) * (s as f64 / steps as f64);
            let (cx, cy) = self.key(&p);
            for dx in -1..=1 {
                for dy in -1..=1 {
                    if seen.insert((cx + dx, cy + dy)) {
                        self.cells.entry((cx + dx, cy + dy)).or_default().push(idx);
                    }
                }
            }
        }
    }

    fn query(&self, p: &Point2<f64>) -> &[usize] {
        self.cells.get(&self.key(p)).map(|v| v.as_slice()).unwrap_or(&[])
    }
}

/// Hash of source vertex positions
struct VertexHash {
    cell: f64,
    cells: FxHashMap<(i64, i64), Vec<EdgeKey>>,
}

impl VertexHash {
    fn new(cell: f64) -> Self {
        Self {
            cell,
            cells: FxHashMap::default(),
        }
    }

    #[inline]
    fn key(&self, p: &Point2<f64>) -> (i64, i64) {
        ((p.x / self.cell).floor() as i64, (p.y / self.cell).floor() as i64)
    }

    fn insert(&mut self, p: &Point2<f64>, key: EdgeKey) {
        let k = self.key(p);
        self.cells.entry(k).or_default().push(key);
    }
}

/// Provenance of one output edge
#[derive(Debug, Clone, Copy)]
struct SegMatch {
    key: EdgeKey,
    reversed: bool,
}

/// One overlay evaluation over a fixed set of operands
pub(crate) struct OverlayJob<'a, V, E, C, P> {
    operands: Vec<&'a PolygonStore<V, E, C, P>>,
    /// Per operand, per node: chord points of the edge, end point excluded
    chords: Vec<Vec<Vec<Point2<f64>>>>,
    segs: Vec<SourceSeg>,
    grid: SegmentGrid,
    vertices: VertexHash,
    tol: f64,
    arc_div: ArcDivParams,
}

impl<'a, V, E, C, P> OverlayJob<'a, V, E, C, P>
where
    V: UserData,
    E: UserData,
    C: UserData,
    P: UserData,
{
    pub fn new(operands: Vec<&'a PolygonStore<V, E, C, P>>, arc_div: &ArcDivParams) -> Self {
        let bbox = operands
            .iter()
            .filter_map(|s| s.bbox())
            .reduce(|a, b| a.union(&b))
            .unwrap_or_else(|| Box2D::from_point(Point2::origin()));
        let extent = bbox.extent().max(bbox.min.coords.abs().max()).max(bbox.max.coords.abs().max());
        let tol = POINT_EPS.max(extent * 1e-8);

        let mut chords = Vec::with_capacity(operands.len());
        let mut segs = Vec::new();
        let mut total_len = 0.0;
        for (op, store) in operands.iter().enumerate() {
            let mut op_chords = Vec::with_capacity(store.nodes.len());
            for (node, edge) in store.edges() {
                let mut pts = vec![edge.start()];
                if let Some(arc) = edge.arc() {
                    pts.extend(arc.interior_points(arc_div));
                }
                let key = EdgeKey { operand: op, node };
                for i in 0..pts.len() {
                    let a = pts[i];
                    let b = if i + 1 < pts.len() { pts[i + 1] } else { edge.end() };
                    total_len += (b - a).norm();
                    segs.push(SourceSeg { a, b, key });
                }
                op_chords.push(pts);
            }
            chords.push(op_chords);
        }

        let avg = if segs.is_empty() { 1.0 } else { total_len / segs.len() as f64 };
        let mut grid = SegmentGrid::new(avg.max(extent / 256.0).max(tol * 8.0));
        for (i, seg) in segs.iter().enumerate() {
            grid.insert(i, &seg.a, &seg.b);
        }
        let mut vertices = VertexHash::new(tol * 4.0);
        for (op, store) in operands.iter().enumerate() {
            for (node, n) in store.nodes.iter().enumerate() {
                vertices.insert(&n.point, EdgeKey { operand: op, node });
            }
        }

        Self {
            operands,
            chords,
            segs,
            grid,
            vertices,
            tol,
            arc_div: *arc_div,
        }
    }

    pub fn operand(&self, op: usize) -> &PolygonStore<V, E, C, P> {
        self.operands[op]
    }

    /// i_overlay paths of one operand
    pub fn paths(&self, op: usize, orientation: Orientation, outer_only: bool) -> Vec<Path> {
        let store = self.operands[op];
        let mut paths = Vec::with_capacity(store.contour_count());
        for c in 0..store.contour_count() {
            if outer_only && c > 0 {
                break;
            }
            let mut path: Path = store
                .contour_range(c)
                .flat_map(|i| self.chords[op][i].iter())
                .map(|p| [p.x, p.y])
                .collect();
            if path.len() < 3 {
                continue;
            }
            if orientation == Orientation::Normalized {
                let area = path_area(&path);
                if (c == 0 && area < 0.0) || (c > 0 && area > 0.0) {
                    path.reverse();
                }
            }
            paths.push(path);
        }
        paths
    }

    pub fn run(&self, subject: &[Path], clip: &[Path], rule: OverlayRule) -> Shapes {
        let subject = subject.to_vec();
        let clip = clip.to_vec();
        subject.overlay(&clip, rule, ccw_positive_rule())
    }

    fn snap_vertex(&self, p: &Point2<f64>) -> Option<EdgeKey> {
        let (cx, cy) = self.vertices.key(p);
        let mut best: Option<(f64, EdgeKey)> = None;
        for dx in -1..=1 {
            for dy in -1..=1 {
                if let Some(keys) = self.vertices.cells.get(&(cx + dx, cy + dy)) {
                    for key in keys {
                        let q = self.operands[key.operand].nodes[key.node].point;
                        let d = (q - p).norm();
                        if d <= self.tol && best.map_or(true, |(bd, _)| d < bd) {
                            best = Some((d, *key));
                        }
                    }
                }
            }
        }
        best.map(|(_, k)| k)
    }

    fn match_segment(&self, a: &Point2<f64>, b: &Point2<f64>) -> Option<SegMatch> {
        let mid = Point2::from((a.coords + b.coords) * 0.5);
        let dir = b - a;
        let mut best: Option<(f64, SegMatch)> = None;
        for &idx in self.grid.query(&mid) {
            let seg = &self.segs[idx];
            let da = segment_distance(a, &seg.a, &seg.b);
            let db = segment_distance(b, &seg.a, &seg.b);
            if da > self.tol || db > self.tol {
                continue;
            }
            let score = da + db;
            if best.map_or(true, |(s, _)| score < s) {
                let reversed = dir.dot(&(seg.b - seg.a)) < 0.0;
                best = Some((score, SegMatch { key: seg.key, reversed }));
            }
        }
        best.map(|(_, m)| m)
    }

    /// Turn overlay output into polygon stores
    pub fn collect(&self, shapes: &Shapes, keep_holes: bool) -> (Vec<PolygonStore<V, E, C, P>>, RegularizeChanges) {
        let first = self.operands[0];
        let mut stats = Stats::default();
        let mut out = Vec::with_capacity(shapes.len());
        for shape in shapes {
            let mut store = PolygonStore::empty(first.flags);
            store.data = first.data.clone();
            for (ci, path) in shape.iter().enumerate() {
                if ci > 0 && !keep_holes {
                    break;
                }
                match self.build_ring(path, ci == 0, &mut stats) {
                    Some((ring, data)) => store.push_ring(ring, data),
                    // a shape whose outer contour degenerates is dropped whole
                    None if ci == 0 => {
                        tracing::warn!(points = path.len(), "dropping degenerate overlay shape");
                        break;
                    }
                    None => {}
                }
            }
            if !store.is_empty() {
                out.push(store);
            }
        }
        let changes = stats.finish(self);
        (out, changes)
    }

    /// Largest distance between an edge and the chords it was flattened into
    fn chord_gap(&self, edge: &Edge2D) -> f64 {
        match edge.arc() {
            Some(arc) => {
                let segments = arc.segment_count(&self.arc_div).max(1) as f64;
                arc.radius * (1.0 - (arc.sweep.abs() / segments * 0.5).cos())
            }
            None => 0.0,
        }
    }

    /// Exact position of an overlay vertex between two output edges
    ///
    /// Overlay crossings on arcs are computed against chords and may sit up
    /// to the chord tolerance off the circle. The crossing of the two source
    /// edges is used when one lies close by, otherwise the point is pulled
    /// radially onto whichever source edge is an arc.
    fn refine_crossing(&self, p: &Point2<f64>, before: Option<SegMatch>, after: Option<SegMatch>) -> Point2<f64> {
        let edge_of = |m: SegMatch| self.operands[m.key.operand].edge(m.key.node);
        if let (Some(a), Some(b)) = (before, after) {
            if a.key != b.key {
                let (ea, eb) = (edge_of(a), edge_of(b));
                if ea.is_arc() || eb.is_arc() {
                    let reach = self.tol + 8.0 * self.chord_gap(&ea).max(self.chord_gap(&eb));
                    let nearest = ea
                        .intersections(&eb)
                        .into_iter()
                        .map(|hit| hit.point)
                        .filter(|q| (q - p).norm() <= reach)
                        .min_by(|q, r| (q - p).norm().total_cmp(&(r - p).norm()));
                    if let Some(q) = nearest {
                        return q;
                    }
                }
            }
        }
        for m in [after, before].into_iter().flatten() {
            let edge = edge_of(m);
            if let Some(arc) = edge.arc() {
                let radial = p - arc.center;
                let dist = radial.norm();
                if dist > f64::EPSILON && (dist - arc.radius).abs() <= self.tol + 2.0 * self.chord_gap(&edge) {
                    return arc.center + radial * (arc.radius / dist);
                }
            }
        }
        *p
    }

    fn build_ring(&self, path: &[[f64; 2]], outer: bool, stats: &mut Stats) -> Option<(Vec<Node<V, E>>, C)> {
        let mut pts: Vec<Point2<f64>> = Vec::with_capacity(path.len());
        for p in path {
            let q = Point2::new(p[0], p[1]);
            if pts.last().map_or(true, |last: &Point2<f64>| (last - q).norm() > self.tol) {
                pts.push(q);
            }
        }
        while pts.len() > 1 && (pts[0] - pts[pts.len() - 1]).norm() <= self.tol {
            pts.pop();
        }
        if pts.len() < 3 {
            return None;
        }
        let raw: Path = pts.iter().map(|p| [p.x, p.y]).collect();
        let area = path_area(&raw);
        if area.abs() <= AREA_EPS {
            return None;
        }
        if (outer && area < 0.0) || (!outer && area > 0.0) {
            pts.reverse();
        }

        let n = pts.len();
        let snapped: Vec<Option<EdgeKey>> = pts.iter().map(|p| self.snap_vertex(p)).collect();
        for (p, s) in pts.iter_mut().zip(&snapped) {
            match s {
                Some(key) => {
                    *p = self.operands[key.operand].nodes[key.node].point;
                    stats.used_vertices.insert(*key);
                }
                None => stats.new_vertices = true,
            }
        }
        let matches: Vec<Option<SegMatch>> = (0..n).map(|i| self.match_segment(&pts[i], &pts[(i + 1) % n])).collect();

        let joins = |i: usize| -> bool {
            // does segment i continue segment i-1 into the same output edge
            let prev = (i + n - 1) % n;
            match (matches[prev], matches[i]) {
                (Some(a), Some(b)) => a.key == b.key && a.reversed == b.reversed && snapped[i].is_none(),
                _ => false,
            }
        };
        let start = (0..n).find(|&i| !joins(i)).unwrap_or(0);

        let mut runs: Vec<(usize, usize)> = Vec::new();
        let mut i = start;
        let mut walked = 0;
        while walked < n {
            let mut len = 1;
            while walked + len < n && joins((i + len) % n) {
                len += 1;
            }
            runs.push((i, len));
            walked += len;
            i = (i + len) % n;
        }

        // crossings found on chords are moved onto the true edges
        for (r, &(run_start, _)) in runs.iter().enumerate() {
            if snapped[run_start].is_some() {
                continue;
            }
            let prev_start = runs[(r + runs.len() - 1) % runs.len()].0;
            pts[run_start] = self.refine_crossing(&pts[run_start], matches[prev_start], matches[run_start]);
        }

        let mut ring = Vec::with_capacity(runs.len());
        let mut sources = Vec::new();
        for &(run_start, len) in &runs {
            let run_end = (run_start + len) % n;
            let p0 = pts[run_start];
            let p1 = pts[run_end];
            let data = match snapped[run_start] {
                Some(key) => self.operands[key.operand].nodes[key.node].data.clone(),
                None => V::default(),
            };
            match matches[run_start] {
                Some(m) => {
                    let source = self.operands[m.key.operand];
                    let src_node = &source.nodes[m.key.node];
                    let src_edge = source.edge(m.key.node);
                    let angle = run_sweep(&src_edge, m.reversed, &p0, &p1);
                    stats.note_edge(m.key, &src_edge, &p0, &p1, m.reversed);
                    sources.push((m.key.operand, source.contour_of(m.key.node)));
                    ring.push(Node::new(p0, data, angle, src_node.edge_data.clone()));
                }
                None => {
                    stats.new_edges = true;
                    ring.push(Node::new(p0, data, 0.0, E::default()));
                }
            }
        }

        dedup_ring(&mut ring, true);
        if !self.operands[0].flags.same_dir_edge_legal {
            merge_same_dir(&mut ring, true);
        }
        let has_arc = ring.iter().any(|n| n.arc_angle != 0.0);
        if ring.len() < 3 && !(ring.len() == 2 && has_arc) {
            return None;
        }
        if ring_signed_area(&ring).abs() <= AREA_EPS {
            return None;
        }
        let data = match majority(&sources) {
            Some((op, c)) => {
                stats.note_contour(op, c);
                self.operands[op].contours[c].data.clone()
            }
            None => {
                stats.new_contours = true;
                C::default()
            }
        };
        Some((ring, data))
    }
}

/// Sweep of the output edge covering `p0 -> p1` on a source edge
fn run_sweep(src: &Edge2D, reversed: bool, p0: &Point2<f64>, p1: &Point2<f64>) -> f64 {
    let arc = match src.arc() {
        Some(arc) => arc,
        None => return 0.0,
    };
    let dir = if reversed { -arc.sweep.signum() } else { arc.sweep.signum() };
    let a0 = direction_angle(&(p0 - arc.center));
    let a1 = direction_angle(&(p1 - arc.center));
    let mag = normalize_angle_positive((a1 - a0) * dir);
    if mag <= ANGLE_EPS {
        0.0
    } else {
        dir * mag.min(arc.sweep.abs())
    }
}

#[derive(Default)]
struct Stats {
    used_vertices: FxHashSet<EdgeKey>,
    used_edges: FxHashSet<EdgeKey>,
    contour_hits: FxHashMap<(usize, usize), usize>,
    new_vertices: bool,
    new_edges: bool,
    new_contours: bool,
    reversed: bool,
}

impl Stats {
    fn note_edge(&mut self, key: EdgeKey, src: &Edge2D, p0: &Point2<f64>, p1: &Point2<f64>, reversed: bool) {
        self.used_edges.insert(key);
        let (s, e) = if reversed { (src.end(), src.start()) } else { (src.start(), src.end()) };
        if (s - p0).norm() > POINT_EPS || (e - p1).norm() > POINT_EPS {
            self.new_edges = true;
        }
        if reversed {
            self.reversed = true;
        }
    }

    fn note_contour(&mut self, op: usize, c: usize) {
        let hits = self.contour_hits.entry((op, c)).or_insert(0);
        *hits += 1;
        if *hits > 1 {
            self.new_contours = true;
        }
    }

    fn finish<V, E, C, P>(self, job: &OverlayJob<'_, V, E, C, P>) -> RegularizeChanges
    where
        V: UserData,
        E: UserData,
        C: UserData,
        P: UserData,
    {
        let mut removed_vertices = false;
        let mut removed_edges = false;
        let mut removed_contours = false;
        for (op, store) in job.operands.iter().enumerate() {
            for node in 0..store.nodes.len() {
                let key = EdgeKey { operand: op, node };
                removed_vertices |= !self.used_vertices.contains(&key);
                removed_edges |= !self.used_edges.contains(&key);
            }
            for c in 0..store.contour_count() {
                removed_contours |= !self.contour_hits.contains_key(&(op, c));
            }
        }
        RegularizeChanges {
            new_vertices: self.new_vertices,
            removed_vertices,
            new_edges: self.new_edges,
            removed_edges,
            new_contours: self.new_contours,
            removed_contours,
            reversed_contours: self.reversed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flags::PolyFlags;
    use approx::assert_relative_eq;
    use std::f64::consts::PI;

    type Store = PolygonStore<u32, u32, u32, u32>;

    fn rect(x0: f64, y0: f64, x1: f64, y1: f64, tag: u32) -> Store {
        let mut store = Store::empty(PolyFlags::default());
        store.data = tag;
        store.push_ring(
            vec![
                Node::new(Point2::new(x0, y0), tag * 10 + 1, 0.0, tag * 10 + 1),
                Node::new(Point2::new(x1, y0), tag * 10 + 2, 0.0, tag * 10 + 2),
                Node::new(Point2::new(x1, y1), tag * 10 + 3, 0.0, tag * 10 + 3),
                Node::new(Point2::new(x0, y1), tag * 10 + 4, 0.0, tag * 10 + 4),
            ],
            tag,
        );
        store
    }

    #[test]
    fn test_ccw_positive_rule_keeps_ccw_square() {
        let a = rect(0.0, 0.0, 1.0, 1.0, 1);
        let job = OverlayJob::new(vec![&a], &ArcDivParams::default());
        let paths = job.paths(0, Orientation::AsIs, false);
        let shapes = job.run(&paths, &[], OverlayRule::Subject);
        assert_eq!(shapes.len(), 1);
        assert_relative_eq!(shapes_area(&shapes), 1.0, epsilon = 1e-9);
    }

    #[test]
    fn test_union_inherits_user_data() {
        let a = rect(0.0, 0.0, 2.0, 2.0, 1);
        let b = rect(1.0, 1.0, 3.0, 3.0, 2);
        let job = OverlayJob::new(vec![&a, &b], &ArcDivParams::default());
        let sa = job.paths(0, Orientation::AsIs, false);
        let sb = job.paths(1, Orientation::AsIs, false);
        let shapes = job.run(&sa, &sb, OverlayRule::Union);
        let (stores, changes) = job.collect(&shapes, true);
        assert_eq!(stores.len(), 1);
        let store = &stores[0];
        assert_relative_eq!(store.signed_area(), 7.0, epsilon = 1e-9);
        assert_eq!(store.data, 1);
        assert_eq!(store.nodes.len(), 8);
        let origin = store.nodes.iter().find(|n| n.point == Point2::new(0.0, 0.0)).unwrap();
        assert_eq!(origin.data, 11);
        assert_eq!(origin.edge_data, 11);
        let far = store.nodes.iter().find(|n| n.point == Point2::new(3.0, 3.0)).unwrap();
        assert_eq!(far.data, 23);
        assert!(changes.new_vertices);
        assert!(changes.removed_vertices);
    }

    #[test]
    fn test_arc_edges_are_rebuilt() {
        // half disc: diameter on the x axis, arc bulging upwards
        let mut disc = Store::empty(PolyFlags::default());
        disc.push_ring(
            vec![
                Node::new(Point2::new(-1.0, 0.0), 1, 0.0, 1),
                Node::new(Point2::new(1.0, 0.0), 2, PI, 2),
            ],
            0,
        );
        let job = OverlayJob::new(vec![&disc], &ArcDivParams::default());
        let paths = job.paths(0, Orientation::Normalized, false);
        let shapes = job.run(&paths, &[], OverlayRule::Subject);
        let (stores, _) = job.collect(&shapes, true);
        assert_eq!(stores.len(), 1);
        let store = &stores[0];
        assert_eq!(store.nodes.len(), 2);
        let arc = store.nodes.iter().find(|n| n.arc_angle != 0.0).unwrap();
        assert_relative_eq!(arc.arc_angle, PI, epsilon = 1e-9);
        assert_eq!(arc.edge_data, 2);
        assert_relative_eq!(store.signed_area(), PI / 2.0, epsilon = 1e-9);
    }

    #[test]
    fn test_arc_crossings_land_on_the_circle() {
        // full disc of radius 5 at the origin; the square corner cuts a
        // quarter whose arc crossing at (0, 5) falls inside a chord
        let mut disc = Store::empty(PolyFlags::default());
        disc.push_ring(
            vec![
                Node::new(Point2::new(5.0, 0.0), 1, PI, 1),
                Node::new(Point2::new(-5.0, 0.0), 2, PI, 2),
            ],
            0,
        );
        let square = rect(0.0, 0.0, 10.0, 10.0, 1);
        let job = OverlayJob::new(vec![&disc, &square], &ArcDivParams::default());
        let sa = job.paths(0, Orientation::AsIs, false);
        let sb = job.paths(1, Orientation::AsIs, false);
        let (stores, _) = job.collect(&job.run(&sa, &sb, OverlayRule::Intersect), true);
        assert_eq!(stores.len(), 1);
        let store = &stores[0];
        assert_eq!(store.nodes.len(), 3);
        assert!(store.nodes.iter().any(|n| (n.point - Point2::new(0.0, 5.0)).norm() < 1e-9));
        let arc = store.nodes.iter().find(|n| n.arc_angle != 0.0).unwrap();
        assert_relative_eq!(arc.arc_angle, PI / 2.0, epsilon = 1e-9);
        assert_relative_eq!(store.signed_area(), 25.0 * PI / 4.0, epsilon = 1e-9);
    }
}
