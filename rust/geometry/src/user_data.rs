// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Caller payloads carried on vertices, edges, contours and polygons.
//!
//! Every polygon type is generic over four payload types. Use `()` for a
//! channel that carries nothing.

use rustc_hash::FxHashMap;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt::Debug;
use std::hash::Hash;

/// Bound shared by every user-data channel
pub trait UserData: Clone + Default + PartialEq + Debug + Serialize + DeserializeOwned {}

impl<T> UserData for T where T: Clone + Default + PartialEq + Debug + Serialize + DeserializeOwned {}

/// Pick the value that occurs most often, first one on ties
pub(crate) fn majority<T: Hash + Eq + Clone>(values: &[T]) -> Option<T> {
    let mut counts: FxHashMap<&T, usize> = FxHashMap::default();
    for v in values {
        *counts.entry(v).or_insert(0) += 1;
    }
    let max = counts.values().copied().max()?;
    values.iter().find(|v| counts.get(v) == Some(&max)).cloned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_majority() {
        assert_eq!(majority(&[1, 2, 2, 3]), Some(2));
        assert_eq!(majority(&[4, 5]), Some(4));
        assert_eq!(majority::<u8>(&[]), None);
    }
}
