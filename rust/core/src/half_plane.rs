// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Half-planes used by cut, strip and clip.
//!
//! A half-plane keeps the points with `normal · p <= offset`.

use crate::bounds::Box2D;
use crate::error::{Error, Result};
use crate::tolerance::{EPS, POINT_EPS};
use crate::vector::{left_normal, right_normal};
use nalgebra::{Point2, Vector2};

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HalfPlane2D {
    /// Unit outward normal
    pub normal: Vector2<f64>,
    pub offset: f64,
}

impl HalfPlane2D {
    /// Half-plane `normal · p <= offset`; the normal is normalized
    pub fn new(normal: Vector2<f64>, offset: f64) -> Result<Self> {
        let len = normal.norm();
        if len <= EPS {
            return Err(Error::InvalidParameter(
                "Half-plane normal has zero length".to_string(),
            ));
        }
        Ok(Self {
            normal: normal / len,
            offset: offset / len,
        })
    }

    /// Keep the left side of the directed line `a -> b`
    pub fn left_of(a: Point2<f64>, b: Point2<f64>) -> Result<Self> {
        let dir = b - a;
        let len = dir.norm();
        if len <= EPS {
            return Err(Error::InvalidParameter(
                "Half-plane line needs two distinct points".to_string(),
            ));
        }
        let normal = right_normal(&dir) / len;
        Ok(Self {
            normal,
            offset: normal.dot(&a.coords),
        })
    }

    /// Positive outside, negative inside
    #[inline]
    pub fn signed_distance(&self, p: &Point2<f64>) -> f64 {
        self.normal.dot(&p.coords) - self.offset
    }

    #[inline]
    pub fn contains(&self, p: &Point2<f64>) -> bool {
        self.signed_distance(p) <= POINT_EPS
    }

    #[inline]
    pub fn strictly_contains(&self, p: &Point2<f64>) -> bool {
        self.signed_distance(p) < -POINT_EPS
    }

    /// A point on the boundary line
    pub fn boundary_point(&self) -> Point2<f64> {
        Point2::from(self.normal * self.offset)
    }

    /// Direction of the boundary line, with the kept side on its left
    pub fn direction(&self) -> Vector2<f64> {
        left_normal(&self.normal)
    }

    /// The complementary half-plane
    pub fn flipped(&self) -> Self {
        Self {
            normal: -self.normal,
            offset: -self.offset,
        }
    }

    /// Intersection point of the boundary with the segment `a -> b`
    pub fn segment_crossing(&self, a: &Point2<f64>, b: &Point2<f64>) -> Option<Point2<f64>> {
        let da = self.signed_distance(a);
        let db = self.signed_distance(b);
        let denom = da - db;
        if denom.abs() <= EPS {
            return None;
        }
        let t = da / denom;
        Some(a + (b - a) * t)
    }

    /// The four half-planes whose intersection is `bbox`
    pub fn from_box(bbox: &Box2D) -> [HalfPlane2D; 4] {
        [
            HalfPlane2D {
                normal: Vector2::new(1.0, 0.0),
                offset: bbox.max.x,
            },
            HalfPlane2D {
                normal: Vector2::new(-1.0, 0.0),
                offset: -bbox.min.x,
            },
            HalfPlane2D {
                normal: Vector2::new(0.0, 1.0),
                offset: bbox.max.y,
            },
            HalfPlane2D {
                normal: Vector2::new(0.0, -1.0),
                offset: -bbox.min.y,
            },
        ]
    }

    /// Clip a closed point ring to this half-plane
    pub fn clip_ring(&self, ring: &[Point2<f64>]) -> Vec<Point2<f64>> {
        let n = ring.len();
        let mut out = Vec::with_capacity(n + 2);
        for i in 0..n {
            let cur = ring[i];
            let next = ring[(i + 1) % n];
            let cur_in = self.signed_distance(&cur) <= 0.0;
            let next_in = self.signed_distance(&next) <= 0.0;
            if cur_in {
                out.push(cur);
            }
            if cur_in != next_in {
                if let Some(p) = self.segment_crossing(&cur, &next) {
                    out.push(p);
                }
            }
        }
        out
    }
}
