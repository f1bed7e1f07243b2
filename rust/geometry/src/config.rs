// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Engine-wide tunables

use polyform_core::ArcDivParams;
use std::sync::OnceLock;

static GLOBAL: OnceLock<Options> = OnceLock::new();

/// Tunables shared by regularization, repair and transforms
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Options {
    /// Chord tolerance when arcs must become straight segments
    pub arc_div: ArcDivParams,
    /// Upper bound on check/repair rounds
    pub max_repair_iterations: usize,
    /// Largest absolute coordinate accepted by `check`
    pub coord_upper_range: f64,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            arc_div: ArcDivParams::default(),
            max_repair_iterations: 32,
            coord_upper_range: 1e9,
        }
    }
}

impl Options {
    /// Load options from environment variables, keeping defaults for
    /// anything missing or unparsable
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            arc_div: ArcDivParams {
                max_difference: parsed_or(lookup("POLYFORM_ARC_MAX_DIFFERENCE"), defaults.arc_div.max_difference),
                max_segments: parsed_or(lookup("POLYFORM_ARC_MAX_SEGMENTS"), defaults.arc_div.max_segments),
            },
            max_repair_iterations: parsed_or(
                lookup("POLYFORM_MAX_REPAIR_ITERATIONS"),
                defaults.max_repair_iterations,
            ),
            coord_upper_range: parsed_or(lookup("POLYFORM_COORD_UPPER_RANGE"), defaults.coord_upper_range),
        }
    }

    /// Options used by every operation that takes no explicit parameters
    ///
    /// Initialized from the environment on first use unless [`Options::install`]
    /// ran before.
    pub fn global() -> &'static Options {
        GLOBAL.get_or_init(Self::from_env)
    }

    /// Make these options the global ones; fails once they are in use
    pub fn install(self) -> Result<(), Options> {
        GLOBAL.set(self)
    }
}

fn parsed_or<T: std::str::FromStr>(value: Option<String>, default: T) -> T {
    value.and_then(|v| v.trim().parse().ok()).unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let opts = Options::default();
        assert_eq!(opts.max_repair_iterations, 32);
        assert_eq!(opts.arc_div.max_segments, 256);
    }

    #[test]
    fn test_lookup_ignores_garbage() {
        let opts = Options::from_lookup(|key| match key {
            "POLYFORM_MAX_REPAIR_ITERATIONS" => Some("not-a-number".into()),
            "POLYFORM_ARC_MAX_SEGMENTS" => Some(" 12".into()),
            "POLYFORM_ARC_MAX_DIFFERENCE" => Some("0.25".into()),
            _ => None,
        });
        assert_eq!(opts.max_repair_iterations, 32);
        assert_eq!(opts.arc_div.max_segments, 12);
        assert_eq!(opts.arc_div.max_difference, 0.25);
        assert_eq!(opts.coord_upper_range, 1e9);
    }
}
