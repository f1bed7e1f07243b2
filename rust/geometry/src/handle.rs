// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Vertex, edge and contour handles
//!
//! A handle is an index stamped with the identity of the object that issued
//! it and that object's edit generation. Every clone gets a fresh owner id
//! and every structural edit bumps the generation, so a handle used on the
//! wrong object or after an insert/delete is rejected with
//! [`Error::InvalidHandle`](crate::Error::InvalidHandle).

use crate::error::{Error, Result};
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_OWNER: AtomicU64 = AtomicU64::new(1);

/// Identity and edit generation of a handle-issuing object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct Stamp {
    owner: u64,
    generation: u64,
}

impl Stamp {
    pub(crate) fn fresh() -> Self {
        Self {
            owner: NEXT_OWNER.fetch_add(1, Ordering::Relaxed),
            generation: 0,
        }
    }

    /// Invalidate every handle issued so far
    pub(crate) fn bump(&mut self) {
        self.generation += 1;
    }
}

macro_rules! define_handle {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub struct $name {
            stamp: Stamp,
            index: usize,
        }

        impl $name {
            pub(crate) fn new(stamp: Stamp, index: usize) -> Self {
                Self { stamp, index }
            }

            /// Flat index inside the issuing object
            #[inline]
            pub fn index(&self) -> usize {
                self.index
            }

            /// Resolve against the current stamp of the owner
            pub(crate) fn resolve(&self, stamp: Stamp, len: usize) -> Result<usize> {
                if self.stamp != stamp {
                    return Err(Error::InvalidHandle);
                }
                if self.index >= len {
                    return Err(Error::IndexOutOfRange {
                        index: self.index,
                        len,
                    });
                }
                Ok(self.index)
            }
        }
    };
}

define_handle!(
    /// Handle to a vertex
    VertexHandle
);
define_handle!(
    /// Handle to an edge; edge `i` leaves vertex `i`
    EdgeHandle
);
define_handle!(
    /// Handle to a contour; contour 0 is the outer boundary
    ContourHandle
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stale_handle_rejected() {
        let mut stamp = Stamp::fresh();
        let h = VertexHandle::new(stamp, 2);
        assert_eq!(h.resolve(stamp, 4).unwrap(), 2);
        stamp.bump();
        assert!(matches!(h.resolve(stamp, 4), Err(Error::InvalidHandle)));
    }

    #[test]
    fn test_foreign_handle_rejected() {
        let a = Stamp::fresh();
        let b = Stamp::fresh();
        let h = EdgeHandle::new(a, 0);
        assert!(matches!(h.resolve(b, 4), Err(Error::InvalidHandle)));
        assert!(matches!(
            h.resolve(a, 0),
            Err(Error::IndexOutOfRange { index: 0, len: 0 })
        ));
    }
}
