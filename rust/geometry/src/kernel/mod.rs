// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Storage kernel shared by every polygon and polyline type

pub(crate) mod boolean;
pub(crate) mod check;
pub(crate) mod cut;
pub(crate) mod edit;
pub(crate) mod fillet;
pub(crate) mod flat;
pub(crate) mod offset;
pub(crate) mod overlay;
pub(crate) mod regularize;
pub(crate) mod sections;
pub(crate) mod store;

pub use boolean::{BooleanResult, DetailedRelation, RelativePosition};
pub use check::{CheckFlags, CheckReport, Defect, DefectKind, RepairOutcome};
pub use cut::CutStatus;
