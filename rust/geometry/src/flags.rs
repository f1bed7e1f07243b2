// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Construction flags and small option enums

use serde::{Deserialize, Serialize};

/// Bit flags for flat-array construction
///
/// The dummy-slot flags mark index 0 of the coordinate, arc or contour-end
/// array as unused, so real data starts at index 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct PolyCreateFlags(pub u32);

impl PolyCreateFlags {
    pub const NONE: Self = Self(0);
    pub const DUMMY_COORD_AT_IDX_ZERO: Self = Self(1);
    pub const DUMMY_ARC_AT_IDX_ZERO: Self = Self(1 << 1);
    pub const DUMMY_CONTOUR_END_AT_IDX_ZERO: Self = Self(1 << 2);
    /// Vertex indices inside arc records count from the first real coordinate
    pub const IDX_REF_IN_ARC_FROM_ZERO: Self = Self(1 << 3);
    pub const SAME_DIR_EDGE_LEGAL_AND_KEEP: Self = Self(1 << 4);
    pub const FORCE_64BIT_PRECISION: Self = Self(1 << 5);

    #[inline]
    pub fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }
}

impl std::ops::BitOr for PolyCreateFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

/// Per-object flags stored with the geometry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct PolyFlags {
    /// Keep consecutive straight edges pointing the same way
    pub same_dir_edge_legal: bool,
    pub force_64bit_precision: bool,
}

impl PolyFlags {
    pub fn from_create_flags(flags: PolyCreateFlags) -> Self {
        Self {
            same_dir_edge_legal: flags.contains(PolyCreateFlags::SAME_DIR_EDGE_LEGAL_AND_KEEP),
            force_64bit_precision: flags.contains(PolyCreateFlags::FORCE_64BIT_PRECISION),
        }
    }

    pub(crate) fn to_bits(self) -> u8 {
        (self.same_dir_edge_legal as u8) | ((self.force_64bit_precision as u8) << 1)
    }

    pub(crate) fn from_bits(bits: u8) -> Self {
        Self {
            same_dir_edge_legal: bits & 1 != 0,
            force_64bit_precision: bits & 2 != 0,
        }
    }
}

/// What `unify` does with holes of the merged result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HoleHandling {
    #[default]
    ReturnHoles,
    /// Only outer silhouettes survive
    WithoutHoles,
}

/// Whether touching-only configurations count as overlapping
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Boundary {
    #[default]
    Closed,
    Open,
}

/// Categories of simple edits reported by regularization
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RegularizeChanges {
    pub new_vertices: bool,
    pub removed_vertices: bool,
    pub new_edges: bool,
    pub removed_edges: bool,
    pub new_contours: bool,
    pub removed_contours: bool,
    /// Contour orientation was flipped
    pub reversed_contours: bool,
}

impl RegularizeChanges {
    pub fn any(&self) -> bool {
        self.new_vertices
            || self.removed_vertices
            || self.new_edges
            || self.removed_edges
            || self.new_contours
            || self.removed_contours
            || self.reversed_contours
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_flags() {
        let flags = PolyCreateFlags::DUMMY_COORD_AT_IDX_ZERO | PolyCreateFlags::SAME_DIR_EDGE_LEGAL_AND_KEEP;
        assert!(flags.contains(PolyCreateFlags::DUMMY_COORD_AT_IDX_ZERO));
        assert!(!flags.contains(PolyCreateFlags::DUMMY_ARC_AT_IDX_ZERO));
        let poly = PolyFlags::from_create_flags(flags);
        assert!(poly.same_dir_edge_legal);
        assert_eq!(PolyFlags::from_bits(poly.to_bits()), poly);
    }
}
