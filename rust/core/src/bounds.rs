// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Axis-aligned bounding boxes

use nalgebra::Point2;

/// Axis-aligned box in f64 precision
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Box2D {
    pub min: Point2<f64>,
    pub max: Point2<f64>,
}

impl Box2D {
    /// Build from two corners in any order
    pub fn new(a: Point2<f64>, b: Point2<f64>) -> Self {
        Self {
            min: Point2::new(a.x.min(b.x), a.y.min(b.y)),
            max: Point2::new(a.x.max(b.x), a.y.max(b.y)),
        }
    }

    #[inline]
    pub fn from_point(p: Point2<f64>) -> Self {
        Self { min: p, max: p }
    }

    /// Bounds of a point set, `None` when empty
    pub fn from_points<'a, I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = &'a Point2<f64>>,
    {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        let mut bbox = Self::from_point(*first);
        for p in iter {
            bbox.extend(p);
        }
        Some(bbox)
    }

    /// Expand to include a point
    #[inline]
    pub fn extend(&mut self, p: &Point2<f64>) {
        self.min.x = self.min.x.min(p.x);
        self.min.y = self.min.y.min(p.y);
        self.max.x = self.max.x.max(p.x);
        self.max.y = self.max.y.max(p.y);
    }

    pub fn union(&self, other: &Box2D) -> Box2D {
        Box2D {
            min: Point2::new(self.min.x.min(other.min.x), self.min.y.min(other.min.y)),
            max: Point2::new(self.max.x.max(other.max.x), self.max.y.max(other.max.y)),
        }
    }

    /// Check if two boxes overlap, touching counts when `eps >= 0`
    #[inline]
    pub fn overlaps(&self, other: &Box2D, eps: f64) -> bool {
        self.min.x <= other.max.x + eps
            && self.max.x >= other.min.x - eps
            && self.min.y <= other.max.y + eps
            && self.max.y >= other.min.y - eps
    }

    #[inline]
    pub fn contains(&self, p: &Point2<f64>, eps: f64) -> bool {
        p.x >= self.min.x - eps && p.x <= self.max.x + eps && p.y >= self.min.y - eps && p.y <= self.max.y + eps
    }

    pub fn contains_box(&self, other: &Box2D, eps: f64) -> bool {
        self.contains(&other.min, eps) && self.contains(&other.max, eps)
    }

    pub fn inflated(&self, margin: f64) -> Box2D {
        Box2D {
            min: Point2::new(self.min.x - margin, self.min.y - margin),
            max: Point2::new(self.max.x + margin, self.max.y + margin),
        }
    }

    #[inline]
    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }

    #[inline]
    pub fn height(&self) -> f64 {
        self.max.y - self.min.y
    }

    #[inline]
    pub fn center(&self) -> Point2<f64> {
        Point2::new((self.min.x + self.max.x) * 0.5, (self.min.y + self.max.y) * 0.5)
    }

    /// Length of the diagonal
    #[inline]
    pub fn extent(&self) -> f64 {
        (self.max - self.min).norm()
    }

    /// Corners in counter-clockwise order starting at `min`
    pub fn corners(&self) -> [Point2<f64>; 4] {
        [
            self.min,
            Point2::new(self.max.x, self.min.y),
            self.max,
            Point2::new(self.min.x, self.max.y),
        ]
    }

    pub fn is_degenerate(&self, eps: f64) -> bool {
        self.width() <= eps || self.height() <= eps
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_points() {
        let pts = [Point2::new(1.0, 5.0), Point2::new(-2.0, 3.0), Point2::new(4.0, -1.0)];
        let bbox = Box2D::from_points(&pts).unwrap();
        assert_eq!(bbox.min, Point2::new(-2.0, -1.0));
        assert_eq!(bbox.max, Point2::new(4.0, 5.0));
        assert!(Box2D::from_points(&Vec::<Point2<f64>>::new()).is_none());
    }

    #[test]
    fn test_overlaps_touching() {
        let a = Box2D::new(Point2::new(0.0, 0.0), Point2::new(1.0, 1.0));
        let b = Box2D::new(Point2::new(1.0, 0.0), Point2::new(2.0, 1.0));
        assert!(a.overlaps(&b, 0.0));
        assert!(!a.overlaps(&b, -1e-9));
        assert!(a.union(&b).contains(&Point2::new(1.5, 0.5), 0.0));
    }

    #[test]
    fn test_corners_ccw() {
        let bbox = Box2D::new(Point2::new(2.0, 2.0), Point2::new(0.0, 0.0));
        let c = bbox.corners();
        assert_eq!(c[1], Point2::new(2.0, 0.0));
        assert_eq!(c[3], Point2::new(0.0, 2.0));
    }
}
