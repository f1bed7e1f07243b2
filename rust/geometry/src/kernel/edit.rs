// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Vertex and edge edits on a single ring

use super::store::{ring_edge, ring_edge_count, Node};
use crate::error::{Error, Result};
use crate::user_data::UserData;
use polyform_core::tolerance::POINT_EPS;
use polyform_core::Point2;
use std::f64::consts::TAU;

fn check_edge<V, E>(ring: &[Node<V, E>], closed: bool, edge: usize) -> Result<()> {
    let len = ring_edge_count(ring, closed);
    if edge >= len {
        return Err(Error::IndexOutOfRange { index: edge, len });
    }
    Ok(())
}

/// Split edge `edge` at `point`
///
/// A straight edge becomes two straight edges through `point`. An arc is
/// split where it passes closest to `point`. The new vertex gets default
/// data and both halves keep the edge data.
pub(crate) fn insert_vertex<V: UserData, E: UserData>(
    ring: &mut Vec<Node<V, E>>,
    closed: bool,
    edge: usize,
    point: Point2<f64>,
) -> Result<usize> {
    check_edge(ring, closed, edge)?;
    let e = ring_edge(ring, edge);
    let (point, first, second) = match e.arc() {
        Some(_) => {
            let t = e.nearest_param(&point);
            let (a, b) = e.split(t);
            (a.end(), a.sweep(), b.sweep())
        }
        None => (point, 0.0, 0.0),
    };
    if (point - e.start()).norm() <= POINT_EPS || (point - e.end()).norm() <= POINT_EPS {
        return Err(Error::DegenerateInput("new vertex coincides with an edge end".into()));
    }
    ring[edge].arc_angle = first;
    let node = Node::new(point, V::default(), second, ring[edge].edge_data.clone());
    ring.insert(edge + 1, node);
    Ok(edge + 1)
}

/// Remove vertex `j`; the edge arriving at it now reaches the next vertex
/// as a straight edge
pub(crate) fn delete_vertex<V, E: Default>(ring: &mut Vec<Node<V, E>>, closed: bool, j: usize) -> Result<()> {
    let n = ring.len();
    if j >= n {
        return Err(Error::IndexOutOfRange { index: j, len: n });
    }
    let min = if closed { 3 } else { 2 };
    if n <= min {
        return Err(Error::DegenerateInput(format!("cannot drop below {} vertices", min)));
    }
    ring.remove(j);
    let n = ring.len();
    if closed || j > 0 {
        let prev = (j + n - 1) % n;
        ring[prev].arc_angle = 0.0;
    }
    if !closed {
        if let Some(last) = ring.last_mut() {
            last.arc_angle = 0.0;
            last.edge_data = E::default();
        }
    }
    Ok(())
}

pub(crate) fn move_vertex<V, E>(ring: &mut [Node<V, E>], j: usize, point: Point2<f64>) -> Result<()> {
    let len = ring.len();
    let node = ring.get_mut(j).ok_or(Error::IndexOutOfRange { index: j, len })?;
    node.point = point;
    Ok(())
}

/// Turn edge `edge` into an arc of the given sweep, or straight for zero
pub(crate) fn set_edge_angle<V, E>(ring: &mut [Node<V, E>], closed: bool, edge: usize, angle: f64) -> Result<()> {
    check_edge(ring, closed, edge)?;
    if !angle.is_finite() || angle.abs() >= TAU {
        return Err(Error::DegenerateInput(format!("arc angle {} out of range", angle)));
    }
    ring[edge].arc_angle = angle;
    Ok(())
}

/// Split edges at the given parameters; `splits[i]` lists parameters of
/// edge `i` strictly between its ends
pub(crate) fn split_ring_edges<V: UserData, E: UserData>(
    ring: &[Node<V, E>],
    closed: bool,
    splits: &[Vec<f64>],
) -> Vec<Node<V, E>> {
    let edges = ring_edge_count(ring, closed);
    let mut out = Vec::with_capacity(ring.len() + splits.iter().map(Vec::len).sum::<usize>());
    for (i, node) in ring.iter().enumerate() {
        let mut ts: Vec<f64> = splits.get(i).cloned().unwrap_or_default();
        if i >= edges || ts.is_empty() {
            out.push(node.clone());
            continue;
        }
        ts.sort_by(|a, b| a.total_cmp(b));
        ts.dedup_by(|a, b| (*a - *b).abs() <= 1e-12);
        let edge = ring_edge(ring, i);
        let mut prev = 0.0;
        out.push(Node::new(node.point, node.data.clone(), 0.0, node.edge_data.clone()));
        for &t in &ts {
            let piece = edge.sub_edge(prev, t);
            if let Some(last) = out.last_mut() {
                last.arc_angle = piece.sweep();
            }
            out.push(Node::new(edge.point_at(t), V::default(), 0.0, node.edge_data.clone()));
            prev = t;
        }
        if let Some(last) = out.last_mut() {
            last.arc_angle = edge.sub_edge(prev, 1.0).sweep();
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernel::store::{ring_length, ring_signed_area};
    use approx::assert_relative_eq;
    use std::f64::consts::PI;

    fn square() -> Vec<Node<u8, u8>> {
        vec![
            Node::new(Point2::new(0.0, 0.0), 1, 0.0, 10),
            Node::new(Point2::new(2.0, 0.0), 2, 0.0, 20),
            Node::new(Point2::new(2.0, 2.0), 3, 0.0, 30),
            Node::new(Point2::new(0.0, 2.0), 4, 0.0, 40),
        ]
    }

    #[test]
    fn test_insert_and_delete() {
        let mut ring = square();
        let at = insert_vertex(&mut ring, true, 1, Point2::new(3.0, 1.0)).unwrap();
        assert_eq!(at, 2);
        assert_eq!(ring.len(), 5);
        assert_eq!(ring[2].data, 0);
        assert_eq!(ring[2].edge_data, 20);
        assert_relative_eq!(ring_signed_area(&ring), 5.0, epsilon = 1e-12);

        delete_vertex(&mut ring, true, 2).unwrap();
        assert_relative_eq!(ring_signed_area(&ring), 4.0, epsilon = 1e-12);
        delete_vertex(&mut ring, true, 0).unwrap();
        assert!(delete_vertex(&mut ring, true, 0).is_err());
    }

    #[test]
    fn test_insert_on_arc_keeps_curve() {
        let mut ring = square();
        set_edge_angle(&mut ring, true, 1, PI).unwrap();
        let before = ring_length(&ring, true);
        insert_vertex(&mut ring, true, 1, Point2::new(5.0, 1.0)).unwrap();
        assert_relative_eq!(ring[2].point.x, 3.0, epsilon = 1e-9);
        assert_relative_eq!(ring[1].arc_angle, PI / 2.0, epsilon = 1e-9);
        assert_relative_eq!(ring_length(&ring, true), before, epsilon = 1e-9);
    }

    #[test]
    fn test_split_ring_edges() {
        let ring = square();
        let out = split_ring_edges(&ring, true, &[vec![0.75, 0.25], vec![], vec![], vec![]]);
        assert_eq!(out.len(), 6);
        assert_relative_eq!(out[1].point.x, 0.5, epsilon = 1e-12);
        assert_eq!(out[2].edge_data, 10);
        assert_eq!(out[3].data, 2);
    }

    #[test]
    fn test_edge_angle_range() {
        let mut ring = square();
        assert!(set_edge_angle(&mut ring, true, 0, 7.0).is_err());
        assert!(matches!(
            set_edge_angle(&mut ring, false, 3, 1.0),
            Err(Error::IndexOutOfRange { index: 3, len: 3 })
        ));
    }
}
