// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Ordered collections of polygons and polylines

use crate::config::Options;
use crate::flags::{Boundary, HoleHandling};
use crate::irregular::IrregularPolygon2D;
use crate::kernel::boolean::unify_all;
use crate::kernel::cut::CutStatus;
use crate::polygon::Polygon2D;
use crate::polyline::{Polyline2D, PolylineCutResult};
use crate::user_data::UserData;
use polyform_core::{ArcDivParams, Box2D, HalfPlane2D, Transform2D, Vector2};
use std::ops::{Deref, DerefMut};

macro_rules! collection {
    ($(#[$meta:meta])* $name:ident, $item:ident, <$($g:ident),+>) => {
        $(#[$meta])*
        #[derive(Debug, Clone)]
        pub struct $name<$($g = ()),+> {
            items: Vec<$item<$($g),+>>,
        }

        impl<$($g),+> $name<$($g),+> {
            pub fn new() -> Self {
                Self { items: Vec::new() }
            }

            pub fn push(&mut self, item: $item<$($g),+>) {
                self.items.push(item);
            }

            pub fn into_vec(self) -> Vec<$item<$($g),+>> {
                self.items
            }
        }

        impl<$($g),+> Default for $name<$($g),+> {
            fn default() -> Self {
                Self::new()
            }
        }

        impl<$($g),+> Deref for $name<$($g),+> {
            type Target = [$item<$($g),+>];

            fn deref(&self) -> &Self::Target {
                &self.items
            }
        }

        impl<$($g),+> DerefMut for $name<$($g),+> {
            fn deref_mut(&mut self) -> &mut Self::Target {
                &mut self.items
            }
        }

        impl<$($g),+> FromIterator<$item<$($g),+>> for $name<$($g),+> {
            fn from_iter<I: IntoIterator<Item = $item<$($g),+>>>(iter: I) -> Self {
                Self { items: iter.into_iter().collect() }
            }
        }

        impl<$($g),+> From<Vec<$item<$($g),+>>> for $name<$($g),+> {
            fn from(items: Vec<$item<$($g),+>>) -> Self {
                Self { items }
            }
        }

        impl<$($g),+> IntoIterator for $name<$($g),+> {
            type Item = $item<$($g),+>;
            type IntoIter = std::vec::IntoIter<$item<$($g),+>>;

            fn into_iter(self) -> Self::IntoIter {
                self.items.into_iter()
            }
        }

        impl<'a, $($g),+> IntoIterator for &'a $name<$($g),+> {
            type Item = &'a $item<$($g),+>;
            type IntoIter = std::slice::Iter<'a, $item<$($g),+>>;

            fn into_iter(self) -> Self::IntoIter {
                self.items.iter()
            }
        }
    };
}

collection!(
    /// Regularized polygons in a stable order
    MultiPolygon2D, Polygon2D, <V, E, C, P>
);
collection!(
    /// Irregular polygons in a stable order
    MultiIrregularPolygon2D, IrregularPolygon2D, <V, E, C, P>
);
collection!(
    /// Polylines in a stable order
    MultiPolyline2D, Polyline2D, <V, E, P>
);

/// Index of the first maximum of `key`
fn first_max<T>(items: &[T], key: impl Fn(&T) -> f64) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (i, item) in items.iter().enumerate() {
        let k = key(item);
        if best.map_or(true, |(_, b)| k > b) {
            best = Some((i, k));
        }
    }
    best.map(|(i, _)| i)
}

impl<V, E, C, P> MultiPolygon2D<V, E, C, P>
where
    V: UserData,
    E: UserData,
    C: UserData,
    P: UserData,
{
    pub fn area(&self) -> f64 {
        self.items.iter().map(|p| p.area()).sum()
    }

    pub fn bounding_box(&self) -> Option<Box2D> {
        self.items
            .iter()
            .filter_map(|p| p.bounding_box())
            .reduce(|a, b| a.union(&b))
    }

    /// Largest absolute net area; the first one wins ties
    pub fn get_largest_idx(&self) -> Option<usize> {
        first_max(&self.items, |p| p.signed_area().abs())
    }

    pub fn pop_largest(&mut self) -> Option<Polygon2D<V, E, C, P>> {
        self.get_largest_idx().map(|i| self.items.remove(i))
    }

    /// Merge overlapping and touching members in place
    pub fn unify(&mut self, holes: HoleHandling) {
        if self.items.len() < 2 && holes == HoleHandling::ReturnHoles {
            return;
        }
        let stores: Vec<_> = self.items.iter().map(|p| p.store()).collect();
        let merged = unify_all(&stores, holes, &Options::global().arc_div);
        self.items = merged.into_iter().map(Polygon2D::from_store).collect();
    }

    /// Every member of `a` minus every member of `b`; also reports whether
    /// anything changed
    pub fn substract(a: &Self, b: &Self) -> (Self, bool) {
        let mut current: Vec<Polygon2D<V, E, C, P>> = a.items.clone();
        for pb in &b.items {
            current = current
                .iter()
                .flat_map(|pa| pa.substract(pb, Boundary::Closed).into_iter())
                .collect();
        }
        let changed = current.len() != a.items.len()
            || current.iter().zip(&a.items).any(|(x, y)| !x.shares_storage_with(y));
        (Self { items: current }, changed)
    }

    /// Pairwise intersections of `a` and `b`
    pub fn intersect(a: &Self, b: &Self) -> Self {
        a.items
            .iter()
            .flat_map(|pa| b.items.iter().map(move |pb| pa.intersect(pb, Boundary::Closed)))
            .flatten()
            .collect()
    }

    pub fn transform(&mut self, arc_div: &ArcDivParams, tran: &Transform2D) {
        let items = std::mem::take(&mut self.items);
        self.items = items
            .iter()
            .flat_map(|p| p.transform(arc_div, tran).into_iter())
            .collect();
    }

    pub fn translate(&mut self, offset: &Vector2<f64>) {
        for p in &mut self.items {
            p.translate(offset);
        }
    }
}

impl<V, E, C, P> MultiIrregularPolygon2D<V, E, C, P>
where
    V: UserData,
    E: UserData,
    C: UserData,
    P: UserData,
{
    /// Regularize every member and concatenate the pieces
    pub fn regularize(&self) -> MultiPolygon2D<V, E, C, P> {
        self.items.iter().flat_map(|p| p.regularize().into_iter()).collect()
    }

    pub fn transform(&mut self, arc_div: &ArcDivParams, tran: &Transform2D) {
        for p in &mut self.items {
            p.transform(arc_div, tran);
        }
    }

    pub fn translate(&mut self, offset: &Vector2<f64>) {
        for p in &mut self.items {
            p.translate(offset);
        }
    }
}

impl<V, E, P> MultiPolyline2D<V, E, P>
where
    V: UserData,
    E: UserData,
    P: UserData,
{
    pub fn length(&self) -> f64 {
        self.items.iter().map(|p| p.length()).sum()
    }

    /// Longest member; the first one wins ties
    pub fn get_longest_idx(&self) -> Option<usize> {
        first_max(&self.items, |p| p.length())
    }

    pub fn pop_longest(&mut self) -> Option<Polyline2D<V, E, P>> {
        self.get_longest_idx().map(|i| self.items.remove(i))
    }

    pub fn transform(&mut self, arc_div: &ArcDivParams, tran: &Transform2D) {
        for p in &mut self.items {
            p.transform(arc_div, tran);
        }
    }

    pub fn translate(&mut self, offset: &Vector2<f64>) {
        for p in &mut self.items {
            p.translate(offset);
        }
    }

    fn cut_each(&self, cut: impl Fn(&Polyline2D<V, E, P>) -> PolylineCutResult<V, E, P>) -> PolylineCutResult<V, E, P> {
        let mut pieces = Vec::new();
        let mut full_in = true;
        let mut status = CutStatus::Regular;
        for p in &self.items {
            let result = cut(p);
            full_in &= result.full_in;
            if result.status != CutStatus::Regular {
                status = result.status;
            }
            pieces.extend(result.pieces);
        }
        PolylineCutResult {
            pieces: pieces.into(),
            full_in,
            status,
        }
    }

    pub fn cut(&self, plane: &HalfPlane2D) -> PolylineCutResult<V, E, P> {
        self.cut_each(|p| p.cut(plane))
    }

    pub fn strip(&self, a: &HalfPlane2D, b: &HalfPlane2D) -> PolylineCutResult<V, E, P> {
        self.cut_each(|p| p.strip(a, b))
    }

    pub fn clip(&self, bbox: &Box2D) -> PolylineCutResult<V, E, P> {
        self.cut_each(|p| p.clip(bbox))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flags::PolyFlags;
    use approx::assert_relative_eq;
    use polyform_core::Point2;

    fn rect(x0: f64, y0: f64, w: f64, h: f64) -> Polygon2D {
        Polygon2D::from_box(
            &Box2D::new(Point2::new(x0, y0), Point2::new(x0 + w, y0 + h)),
            PolyFlags::default(),
        )
    }

    #[test]
    fn test_largest() {
        let mut multi: MultiPolygon2D = vec![rect(0.0, 0.0, 1.0, 1.0), rect(5.0, 0.0, 3.0, 3.0), rect(10.0, 0.0, 3.0, 3.0)].into();
        assert_eq!(multi.get_largest_idx(), Some(1));
        let largest = multi.pop_largest().unwrap();
        assert_relative_eq!(largest.area(), 9.0, epsilon = 1e-12);
        assert_eq!(multi.len(), 2);
        assert_relative_eq!(multi.area(), 10.0, epsilon = 1e-12);
    }

    #[test]
    fn test_unify_merges_overlaps() {
        let mut multi: MultiPolygon2D = vec![rect(0.0, 0.0, 2.0, 2.0), rect(1.0, 0.0, 2.0, 2.0), rect(10.0, 0.0, 1.0, 1.0)].into();
        multi.unify(HoleHandling::ReturnHoles);
        assert_eq!(multi.len(), 2);
        assert_relative_eq!(multi.area(), 7.0, epsilon = 1e-9);
    }

    #[test]
    fn test_substract_reports_change() {
        let a: MultiPolygon2D = vec![rect(0.0, 0.0, 4.0, 4.0)].into();
        let far: MultiPolygon2D = vec![rect(10.0, 10.0, 1.0, 1.0)].into();
        let (same, changed) = MultiPolygon2D::substract(&a, &far);
        assert!(!changed);
        assert!(same[0].shares_storage_with(&a[0]));

        let near: MultiPolygon2D = vec![rect(2.0, 0.0, 4.0, 4.0)].into();
        let (cut, changed) = MultiPolygon2D::substract(&a, &near);
        assert!(changed);
        assert_relative_eq!(cut.area(), 8.0, epsilon = 1e-9);
    }

    #[test]
    fn test_intersect_pairs() {
        let a: MultiPolygon2D = vec![rect(0.0, 0.0, 2.0, 2.0), rect(4.0, 0.0, 2.0, 2.0)].into();
        let b: MultiPolygon2D = vec![rect(1.0, 1.0, 4.0, 4.0)].into();
        let out = MultiPolygon2D::intersect(&a, &b);
        assert_eq!(out.len(), 2);
        assert_relative_eq!(out.area(), 2.0, epsilon = 1e-9);
    }

    #[test]
    fn test_bounding_box_and_translate() {
        let mut multi: MultiPolygon2D = vec![rect(0.0, 0.0, 1.0, 1.0), rect(5.0, 2.0, 1.0, 1.0)].into();
        multi.translate(&Vector2::new(1.0, 0.0));
        let bbox = multi.bounding_box().unwrap();
        assert_relative_eq!(bbox.min.x, 1.0, epsilon = 1e-12);
        assert_relative_eq!(bbox.max.x, 7.0, epsilon = 1e-12);
        assert_relative_eq!(bbox.max.y, 3.0, epsilon = 1e-12);
    }

    #[test]
    fn test_polylines_longest_and_clip() {
        let short: Polyline2D = Polyline2D::from_points(&[Point2::new(0.0, 0.0), Point2::new(1.0, 0.0)], false).unwrap();
        let long: Polyline2D = Polyline2D::from_points(&[Point2::new(0.0, 1.0), Point2::new(5.0, 1.0)], false).unwrap();
        let multi: MultiPolyline2D = vec![short, long].into();
        assert_eq!(multi.get_longest_idx(), Some(1));
        assert_relative_eq!(multi.length(), 6.0, epsilon = 1e-12);

        let clipped = multi.clip(&Box2D::new(Point2::new(0.5, -1.0), Point2::new(2.0, 2.0)));
        assert!(!clipped.full_in);
        assert_eq!(clipped.pieces.len(), 2);
        assert_relative_eq!(clipped.pieces.length(), 2.0, epsilon = 1e-9);
    }
}
