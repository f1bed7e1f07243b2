// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # Polyform Geometry
//!
//! Regularization and boolean algebra for 2D polygons and polylines whose
//! edges may be circular arcs, with four user-data channels (vertex, edge,
//! contour, polygon) carried through every operation.
//!
//! - [`IrregularPolygon2D`]: contours as supplied, edited in place
//! - [`Polygon2D`]: regularized, one outer contour and nested holes
//! - [`Polyline2D`]: an open or closed curve
//! - [`MultiPolygon2D`] and friends: ordered results of operations
//! - [`PolygonalHullCreator`]: an enclosing hull that follows the input
//!   boundary where it can
//!
//! Clones share storage until one of them is modified. Handles returned by
//! an object stay valid until its next structural edit.
//!
//! ## Quick Start
//!
//! ```rust
//! use polyform_geometry::{Boundary, Box2D, Point2, PolyFlags, Polygon2D};
//!
//! let square: Polygon2D = Polygon2D::from_box(
//!     &Box2D::new(Point2::new(0.0, 0.0), Point2::new(10.0, 10.0)),
//!     PolyFlags::default(),
//! );
//! let hole: Polygon2D = Polygon2D::from_box(
//!     &Box2D::new(Point2::new(3.0, 3.0), Point2::new(7.0, 7.0)),
//!     PolyFlags::default(),
//! );
//! let result = square.substract(&hole, Boundary::Closed);
//! assert_eq!(result.len(), 1);
//! assert!((result[0].signed_area() - 84.0).abs() < 1e-9);
//! ```

pub mod config;
pub mod error;
pub mod flags;
pub mod handle;
pub mod hull;
pub mod io;
pub mod irregular;
pub mod kernel;
pub mod multi;
pub mod polygon;
pub mod polyline;
pub mod shape;
pub mod triangulation;
pub mod user_data;

pub use config::Options;
pub use error::{Error, Result};
pub use flags::{Boundary, HoleHandling, PolyCreateFlags, PolyFlags, RegularizeChanges};
pub use handle::{ContourHandle, EdgeHandle, VertexHandle};
pub use hull::{DirectionComparator, PolygonalHullCreator};
pub use irregular::{ContourDescription, IrregularPolygon2D};
pub use kernel::{
    BooleanResult, CheckFlags, CheckReport, CutStatus, Defect, DefectKind, DetailedRelation, RelativePosition,
    RepairOutcome,
};
pub use multi::{MultiIrregularPolygon2D, MultiPolygon2D, MultiPolyline2D};
pub use polygon::{CutResult, Polygon2D};
pub use polyline::{CutParam, Polyline2D, PolylineCutResult};
pub use shape::{ContourRef, EdgeRef, PointPosition, PolygonShape, VertexRef};
pub use triangulation::Triangulation;
pub use user_data::UserData;

pub use polyform_core::{ArcDivParams, Box2D, Edge2D, HalfPlane2D, PolyArcRec, Side, Transform2D};

// Re-export nalgebra types for convenience
pub use nalgebra::{Point2, Vector2};
