// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use crate::kernel::check::DefectKind;
use thiserror::Error;

/// Result type for polygon operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while building or editing polygons and polylines
#[derive(Error, Debug)]
pub enum Error {
    /// Handle was issued by another object or before a structural edit
    #[error("Handle does not belong to this object or is stale")]
    InvalidHandle,

    #[error("Index {index} out of range (len {len})")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("Degenerate input: {0}")]
    DegenerateInput(String),

    #[error("Self-intersecting input is not supported by this operation")]
    UnsupportedSelfIntersection,

    #[error("Regularization failed: {0}")]
    RegularizationFailed(String),

    /// Fillet or chamfer size exceeds what the adjacent edges allow
    #[error("Fillet size {requested} exceeds the maximum {max}")]
    FilletTooLarge { requested: f64, max: f64 },

    #[error("Defect cannot be repaired: {0:?}")]
    Unrepairable(DefectKind),

    /// Check and repair hit its iteration cap or stopped making progress
    #[error("Repair did not converge after {iterations} iterations")]
    RepairDidNotConverge { iterations: usize },

    #[error("Triangulation failed: {0}")]
    TriangulationError(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("Core geometry error: {0}")]
    Core(#[from] polyform_core::Error),
}

impl From<quick_xml::events::attributes::AttrError> for Error {
    fn from(err: quick_xml::events::attributes::AttrError) -> Self {
        Error::Xml(err.into())
    }
}
