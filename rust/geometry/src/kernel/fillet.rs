// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Fillets and chamfers at vertices between two straight edges

use super::store::{ring_edge, ring_edge_count, Node};
use crate::error::{Error, Result};
use crate::user_data::UserData;
use polyform_core::tolerance::{ANGLE_EPS, EPS};
use polyform_core::vector::cross;
use polyform_core::{Point2, Vector2};
use std::f64::consts::PI;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CornerKind {
    Fillet,
    Chamfer,
}

/// Geometry of a vertex with straight edges on both sides
#[derive(Debug, Clone, Copy)]
struct Corner {
    vertex: Point2<f64>,
    /// Unit vectors from the vertex towards its neighbours
    back: Vector2<f64>,
    ahead: Vector2<f64>,
    /// Interior angle between the two edges
    angle: f64,
    /// Positive for a left turn
    turn: f64,
    max_setback: f64,
}

impl Corner {
    fn at<V, E>(ring: &[Node<V, E>], closed: bool, j: usize) -> Result<Corner> {
        let n = ring.len();
        if n < 3 || (!closed && (j == 0 || j + 1 >= n)) {
            return Err(Error::DegenerateInput(format!("vertex {} has no edge on both sides", j)));
        }
        let prev = ring_edge(ring, (j + n - 1) % n);
        let next = ring_edge(ring, j);
        if prev.is_arc() || next.is_arc() {
            return Err(Error::DegenerateInput(format!(
                "vertex {} touches an arc edge",
                j
            )));
        }
        let to_prev = prev.start() - prev.end();
        let to_next = next.end() - next.start();
        let (lp, ln) = (to_prev.norm(), to_next.norm());
        if lp <= EPS || ln <= EPS {
            return Err(Error::DegenerateInput(format!("vertex {} has a zero-length edge", j)));
        }
        let back = to_prev / lp;
        let ahead = to_next / ln;
        let angle = back.dot(&ahead).clamp(-1.0, 1.0).acos();
        if angle <= ANGLE_EPS || angle >= PI - ANGLE_EPS {
            return Err(Error::DegenerateInput(format!("vertex {} is not a corner", j)));
        }
        Ok(Corner {
            vertex: ring[j].point,
            back,
            ahead,
            angle,
            turn: cross(&(-back), &ahead),
            max_setback: lp.min(ln) * 0.5,
        })
    }

    fn setback(&self, kind: CornerKind, size: f64) -> f64 {
        match kind {
            CornerKind::Fillet => size / (self.angle * 0.5).tan(),
            CornerKind::Chamfer => size,
        }
    }

    fn max_size(&self, kind: CornerKind) -> f64 {
        match kind {
            CornerKind::Fillet => self.max_setback * (self.angle * 0.5).tan(),
            CornerKind::Chamfer => self.max_setback,
        }
    }

    fn sweep(&self, kind: CornerKind) -> f64 {
        match kind {
            CornerKind::Fillet => self.turn.signum() * (PI - self.angle),
            CornerKind::Chamfer => 0.0,
        }
    }
}

/// Largest fillet radius the vertex accepts
///
/// The tangent points may reach the middle of either adjacent edge.
pub(crate) fn max_fillet<V, E>(ring: &[Node<V, E>], closed: bool, j: usize) -> Result<f64> {
    Ok(Corner::at(ring, closed, j)?.max_size(CornerKind::Fillet))
}

fn cut_corner<V: UserData, E: UserData>(
    ring: &[Node<V, E>],
    j: usize,
    corner: &Corner,
    kind: CornerKind,
    size: f64,
) -> Result<[Node<V, E>; 2]> {
    if size <= 0.0 {
        return Err(Error::DegenerateInput(format!("corner size {} must be positive", size)));
    }
    let max = corner.max_size(kind);
    if size > max * (1.0 + 1e-9) + EPS {
        return Err(Error::FilletTooLarge {
            requested: size,
            max,
        });
    }
    let t = corner.setback(kind, size).min(corner.max_setback);
    let n = ring.len();
    let incoming = ring[(j + n - 1) % n].edge_data.clone();
    Ok([
        Node::new(corner.vertex + corner.back * t, ring[j].data.clone(), corner.sweep(kind), incoming),
        Node::new(corner.vertex + corner.ahead * t, ring[j].data.clone(), 0.0, ring[j].edge_data.clone()),
    ])
}

/// Replace vertex `j` by a fillet arc or chamfer edge
///
/// Both new vertices copy the data of `j`; the new edge copies the data of
/// the edge arriving at `j`.
pub(crate) fn round_vertex<V: UserData, E: UserData>(
    ring: &mut Vec<Node<V, E>>,
    closed: bool,
    j: usize,
    kind: CornerKind,
    size: f64,
) -> Result<()> {
    let corner = Corner::at(ring, closed, j)?;
    let [a, b] = cut_corner(ring, j, &corner, kind, size)?;
    ring.splice(j..j + 1, [a, b]);
    Ok(())
}

/// Round every eligible vertex of a ring, measured on the original geometry
///
/// Vertices touching an arc and collinear vertices are skipped. Returns the
/// number of corners replaced.
pub(crate) fn round_all<V: UserData, E: UserData>(
    ring: &mut Vec<Node<V, E>>,
    closed: bool,
    kind: CornerKind,
    size: f64,
) -> Result<usize> {
    let n = ring.len();
    if ring_edge_count(ring, closed) < 2 {
        return Ok(0);
    }
    let mut replaced: Vec<Option<[Node<V, E>; 2]>> = Vec::with_capacity(n);
    for j in 0..n {
        match Corner::at(ring, closed, j) {
            Ok(corner) => replaced.push(Some(cut_corner(ring, j, &corner, kind, size)?)),
            Err(Error::DegenerateInput(_)) => replaced.push(None),
            Err(err) => return Err(err),
        }
    }
    let count = replaced.iter().filter(|r| r.is_some()).count();
    let old = std::mem::take(ring);
    for (node, new) in old.into_iter().zip(replaced) {
        match new {
            Some([a, b]) => {
                ring.push(a);
                ring.push(b);
            }
            None => ring.push(node),
        }
    }
    Ok(count)
}
