// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Binary and XML persistence
//!
//! Every polygon and polyline type gets `write_binary` / `read_binary` and
//! `write_xml` / `read_xml`. Writing then reading yields a structurally
//! equal object: flags, contour order, arcs and all four user-data
//! channels survive. Reading a [`Polygon2D`](crate::Polygon2D) verifies
//! that the stored geometry is still regular.

mod binary;
mod xml;

use crate::config::Options;
use crate::error::{Error, Result};
use crate::kernel::boolean::BooleanResult;
use crate::kernel::regularize::regularize;
use crate::kernel::store::PolygonStore;
use crate::user_data::UserData;

/// Version written by this crate; readers accept it and anything older
pub const FORMAT_VERSION: u16 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ObjectKind {
    Irregular = 1,
    Polygon = 2,
    Polyline = 3,
}

impl ObjectKind {
    fn from_tag(tag: u8) -> Result<Self> {
        match tag {
            1 => Ok(ObjectKind::Irregular),
            2 => Ok(ObjectKind::Polygon),
            3 => Ok(ObjectKind::Polyline),
            other => Err(Error::Serialization(format!("unknown object kind {}", other))),
        }
    }

    fn element(self) -> &'static str {
        match self {
            ObjectKind::Irregular => "IrregularPolygon2D",
            ObjectKind::Polygon => "Polygon2D",
            ObjectKind::Polyline => "Polyline2D",
        }
    }
}

fn check_version(version: u16) -> Result<()> {
    if version == 0 || version > FORMAT_VERSION {
        return Err(Error::Serialization(format!(
            "unsupported format version {} (this build reads up to {})",
            version, FORMAT_VERSION
        )));
    }
    Ok(())
}

/// Stored polygons must come back regular
///
/// Collinear vertices are accepted: shared edge sections put them there on
/// purpose.
fn ensure_regular<V, E, C, P>(store: &PolygonStore<V, E, C, P>) -> Result<()>
where
    V: UserData,
    E: UserData,
    C: UserData,
    P: UserData,
{
    if store.is_empty() {
        return Ok(());
    }
    let mut relaxed = store.clone();
    relaxed.flags.same_dir_edge_legal = true;
    match regularize(&relaxed, &Options::global().arc_div).0 {
        BooleanResult::ResultSameAsThis => Ok(()),
        _ => Err(Error::RegularizationFailed("stored polygon is not regular".into())),
    }
}
