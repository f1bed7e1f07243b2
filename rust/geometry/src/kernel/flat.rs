// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Construction from flat coordinate, arc and contour-end arrays
//!
//! Arc records refer to vertices 1-based unless
//! `IDX_REF_IN_ARC_FROM_ZERO` is set. Contour ends are exclusive end
//! indices into the vertex list once any dummy slot is skipped. For closed
//! contours a closing vertex that repeats the first vertex is dropped.

use super::store::Node;
use crate::error::{Error, Result};
use crate::flags::PolyCreateFlags;
use polyform_core::tolerance::points_coincide;
use polyform_core::{Point2, PolyArcRec};
use std::f64::consts::TAU;

fn skip_dummy<T>(items: &[T], flags: PolyCreateFlags, dummy: PolyCreateFlags) -> &[T] {
    if flags.contains(dummy) && !items.is_empty() {
        &items[1..]
    } else {
        items
    }
}

/// Split flat input into contours of plain nodes
pub(crate) fn rings_from_flat<V: Default, E: Default>(
    coords: &[Point2<f64>],
    arcs: &[PolyArcRec],
    contour_ends: &[usize],
    flags: PolyCreateFlags,
    closed: bool,
) -> Result<Vec<Vec<Node<V, E>>>> {
    let coords = skip_dummy(coords, flags, PolyCreateFlags::DUMMY_COORD_AT_IDX_ZERO);
    let arcs = skip_dummy(arcs, flags, PolyCreateFlags::DUMMY_ARC_AT_IDX_ZERO);
    let ends = skip_dummy(contour_ends, flags, PolyCreateFlags::DUMMY_CONTOUR_END_AT_IDX_ZERO);
    if coords.is_empty() {
        return Ok(Vec::new());
    }
    let base = if flags.contains(PolyCreateFlags::IDX_REF_IN_ARC_FROM_ZERO) {
        0
    } else {
        1
    };

    let default_end = [coords.len()];
    let ends = if ends.is_empty() { &default_end[..] } else { ends };
    let mut angles = vec![0.0; coords.len()];
    for rec in arcs {
        let (beg, end) = match (rec.beg_index.checked_sub(base), rec.end_index.checked_sub(base)) {
            (Some(b), Some(e)) if b < coords.len() && e < coords.len() => (b, e),
            _ => {
                return Err(Error::DegenerateInput(format!(
                    "arc record {}..{} outside the vertex list",
                    rec.beg_index, rec.end_index
                )))
            }
        };
        let contour_start = ends.iter().rev().find(|&&e| e <= beg).copied().unwrap_or(0);
        let contour_end = ends.iter().find(|&&e| e > beg).copied().unwrap_or(coords.len());
        let closing = beg + 1 == contour_end && end == contour_start;
        if end != beg + 1 && !closing {
            return Err(Error::DegenerateInput(format!(
                "arc record {}..{} does not describe a single edge",
                rec.beg_index, rec.end_index
            )));
        }
        if !rec.arc_angle.is_finite() || rec.arc_angle.abs() >= TAU {
            return Err(Error::DegenerateInput(format!("arc angle {} out of range", rec.arc_angle)));
        }
        angles[beg] = rec.arc_angle;
    }

    let mut rings = Vec::with_capacity(ends.len());
    let mut start = 0;
    for &end in ends {
        if end <= start || end > coords.len() {
            return Err(Error::DegenerateInput(format!("contour end {} is out of order", end)));
        }
        let mut ring: Vec<Node<V, E>> = (start..end)
            .map(|i| Node::new(coords[i], V::default(), angles[i], E::default()))
            .collect();
        if closed && ring.len() > 1 && points_coincide(&ring[0].point, &ring[ring.len() - 1].point) {
            ring.pop();
        }
        rings.push(ring);
        start = end;
    }
    if start != coords.len() {
        return Err(Error::DegenerateInput(format!(
            "{} vertices after the last contour end",
            coords.len() - start
        )));
    }
    Ok(rings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    fn pts(xy: &[(f64, f64)]) -> Vec<Point2<f64>> {
        xy.iter().map(|&(x, y)| Point2::new(x, y)).collect()
    }

    #[test]
    fn test_dummy_slots() {
        let coords = pts(&[(9.0, 9.0), (0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 0.0)]);
        let arcs = [PolyArcRec::new(0, 0, 0.0), PolyArcRec::new(2, 3, PI / 2.0)];
        let ends = [0, 4];
        let flags = PolyCreateFlags::DUMMY_COORD_AT_IDX_ZERO
            | PolyCreateFlags::DUMMY_ARC_AT_IDX_ZERO
            | PolyCreateFlags::DUMMY_CONTOUR_END_AT_IDX_ZERO;
        let rings: Vec<Vec<Node<(), ()>>> = rings_from_flat(&coords, &arcs, &ends, flags, true).unwrap();
        assert_eq!(rings.len(), 1);
        // closing duplicate dropped
        assert_eq!(rings[0].len(), 3);
        assert_eq!(rings[0][1].arc_angle, PI / 2.0);
    }

    #[test]
    fn test_zero_based_closing_arc() {
        let coords = pts(&[(0.0, 0.0), (2.0, 0.0), (2.0, 2.0), (5.0, 5.0), (6.0, 5.0), (6.0, 6.0)]);
        let arcs = [PolyArcRec::new(2, 0, 1.0)];
        let rings: Vec<Vec<Node<(), ()>>> =
            rings_from_flat(&coords, &arcs, &[3, 6], PolyCreateFlags::IDX_REF_IN_ARC_FROM_ZERO, true).unwrap();
        assert_eq!(rings.len(), 2);
        assert_eq!(rings[0][2].arc_angle, 1.0);
    }

    #[test]
    fn test_malformed_input() {
        let coords = pts(&[(0.0, 0.0), (2.0, 0.0), (2.0, 2.0)]);
        let bad_arc = [PolyArcRec::new(1, 3, 1.0)];
        assert!(rings_from_flat::<(), ()>(&coords, &bad_arc, &[], PolyCreateFlags::NONE, true).is_err());
        assert!(rings_from_flat::<(), ()>(&coords, &[], &[2], PolyCreateFlags::NONE, true).is_err());
        assert!(rings_from_flat::<(), ()>(&[], &[], &[], PolyCreateFlags::NONE, true)
            .unwrap()
            .is_empty());
    }
}
