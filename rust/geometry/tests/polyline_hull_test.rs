// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use approx::assert_relative_eq;
use polyform_geometry::{
    Box2D, IrregularPolygon2D, MultiPolyline2D, Point2, PointPosition, PolyArcRec, PolyCreateFlags, PolyFlags,
    Polygon2D, PolygonalHullCreator, Polyline2D, Side,
};
use std::f64::consts::PI;
use std::io::Cursor;

fn pts(coords: &[(f64, f64)]) -> Vec<Point2<f64>> {
    coords.iter().map(|&(x, y)| Point2::new(x, y)).collect()
}

fn rect(x0: f64, y0: f64, w: f64, h: f64) -> Polygon2D {
    Polygon2D::from_box(
        &Box2D::new(Point2::new(x0, y0), Point2::new(x0 + w, y0 + h)),
        PolyFlags::default(),
    )
}

#[test]
fn test_polyline_round_trip_with_arc() {
    // straight run followed by a half circle
    let line: Polyline2D<u8, String, ()> = Polyline2D::create(
        &pts(&[(0.0, 0.0), (4.0, 0.0), (4.0, 2.0)]),
        &[PolyArcRec::new(1, 2, PI)],
        false,
        PolyCreateFlags::IDX_REF_IN_ARC_FROM_ZERO,
    )
    .unwrap();
    assert_relative_eq!(line.length(), 4.0 + PI, epsilon = 1e-9);

    let mut bytes = Vec::new();
    line.write_binary(&mut bytes).unwrap();
    assert_eq!(Polyline2D::read_binary(&mut Cursor::new(bytes)).unwrap(), line);

    let mut text = Vec::new();
    line.write_xml(&mut text).unwrap();
    let back = Polyline2D::<u8, String, ()>::read_xml(text.as_slice()).unwrap();
    assert_eq!(back, line);
    assert!(!back.is_closed());
}

#[test]
fn test_contour_as_polyline() {
    let square = rect(0.0, 0.0, 3.0, 3.0);
    let outer = square.contours().next().unwrap();
    let line = square.contour_polyline(outer).unwrap();
    assert!(line.is_closed());
    assert_relative_eq!(line.length(), square.perimeter(), epsilon = 1e-12);

    // the solid lies to the left of a counter-clockwise boundary
    assert_eq!(line.point_position(&Point2::new(1.5, 1.5)), Side::Left);
    assert_eq!(line.point_position(&Point2::new(-1.0, 1.5)), Side::Right);

    let back = IrregularPolygon2D::<(), (), (), ()>::from_polyline(&line).unwrap().regularize();
    assert_eq!(back.len(), 1);
    assert_relative_eq!(back[0].area(), 9.0, epsilon = 1e-12);
}

#[test]
fn test_distances_and_pieces() {
    let line: Polyline2D = Polyline2D::from_points(&pts(&[(0.0, 0.0), (2.0, 0.0), (2.0, 2.0), (4.0, 2.0)]), false).unwrap();
    let from = line.distance_to_cut_param(1.0).unwrap();
    let to = line.distance_to_cut_param(5.0).unwrap();
    assert_relative_eq!(line.cut_param_to_distance(&to).unwrap(), 5.0, epsilon = 1e-12);
    let p = line.cut_param_to_cut_point(&to).unwrap();
    assert_relative_eq!(p.x, 3.0, epsilon = 1e-12);
    assert_relative_eq!(p.y, 2.0, epsilon = 1e-12);

    let piece = line.cut_piece(&from, &to).unwrap();
    assert_relative_eq!(piece.length(), 4.0, epsilon = 1e-12);
    assert_eq!(piece.vertex_count(), 4);
    assert!(line.cut_piece(&to, &from).is_err());

    let edges = line.cut_at_vertices();
    assert_eq!(edges.len(), 3);
    assert_relative_eq!(edges.length(), line.length(), epsilon = 1e-12);
}

#[test]
fn test_multi_polyline_clip() {
    let lines: MultiPolyline2D = vec![
        Polyline2D::from_points(&pts(&[(-5.0, 1.0), (5.0, 1.0)]), false).unwrap(),
        Polyline2D::from_points(&pts(&[(0.5, 0.5), (1.5, 1.5)]), false).unwrap(),
        Polyline2D::from_points(&pts(&[(10.0, 10.0), (12.0, 10.0)]), false).unwrap(),
    ]
    .into();
    let clipped = lines.clip(&Box2D::new(Point2::new(0.0, 0.0), Point2::new(2.0, 2.0)));
    assert!(!clipped.full_in);
    assert_eq!(clipped.pieces.len(), 2);
    assert_relative_eq!(clipped.pieces.length(), 2.0 + 2.0_f64.sqrt(), epsilon = 1e-9);
}

#[test]
fn test_hull_spans_row_of_squares() {
    let mut creator = PolygonalHullCreator::new();
    let squares = [rect(0.0, 0.0, 1.0, 1.0), rect(3.0, 0.0, 1.0, 1.0), rect(6.0, 0.0, 1.0, 1.0)];
    for s in &squares {
        creator.add(s);
    }
    let hull = creator.create();
    assert_eq!(hull.contour_count(), 1);
    assert_relative_eq!(hull.area(), 7.0, epsilon = 1e-9);
    for s in &squares {
        for v in s.vertices() {
            let p = s.vertex(v).unwrap().point;
            assert_ne!(hull.point_position(&p), PointPosition::Outside);
        }
    }
}
