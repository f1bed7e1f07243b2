// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # Polyform Core
//!
//! Numeric primitives underneath the polyform polygon engine.
//!
//! - **Tolerances**: shared epsilons for point, angle and area comparisons
//! - **Edges**: straight and circular edges with intersection, winding and
//!   area queries
//! - **Transforms**: homogeneous 2D affine transforms with similarity checks
//! - **Half-planes**: the cutting primitive behind cut, strip and clip
//!
//! ## Quick Start
//!
//! ```rust
//! use polyform_core::{Edge2D, Point2};
//! use std::f64::consts::PI;
//!
//! // Upper half of the unit circle, walked counter-clockwise
//! let edge = Edge2D::new(Point2::new(1.0, 0.0), Point2::new(-1.0, 0.0), PI);
//! assert!((edge.length() - PI).abs() < 1e-9);
//! ```

pub mod arc;
pub mod bounds;
pub mod edge;
pub mod error;
pub mod half_plane;
pub mod tolerance;
pub mod transform;
pub mod vector;

pub use arc::{Arc2D, ArcDivParams, PolyArcRec};
pub use bounds::Box2D;
pub use edge::{Edge2D, EdgeHit};
pub use error::{Error, Result};
pub use half_plane::HalfPlane2D;
pub use transform::Transform2D;
pub use vector::Side;

// Re-export nalgebra types for convenience
pub use nalgebra::{Matrix3, Point2, Vector2};
