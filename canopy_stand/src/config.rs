// Copyright 2026 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Stand-wide settings.

use canopy_cohort::DEFAULT_MAX_TREE_COUNT;
use canopy_patch::PatchConfig;
use serde::{Deserialize, Serialize};

/// Settings of a [`PatchManager`](crate::PatchManager).
///
/// Every field has a default, so partial documents deserialize.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StandConfig {
    /// Geometry and placement parameters shared by all patches.
    pub patch: PatchConfig,
    /// Number of tree instances each cohort can show.
    pub max_tree_count: usize,
    /// Spacing factor between neighbouring patches in the scene.
    pub patch_margin: f64,
    /// Seed of the placement random source.
    pub seed: u64,
}

impl Default for StandConfig {
    fn default() -> Self {
        Self {
            patch: PatchConfig::default(),
            max_tree_count: DEFAULT_MAX_TREE_COUNT,
            patch_margin: 1.05,
            seed: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let config: StandConfig =
            serde_json::from_str(r#"{ "seed": 7, "patch": { "cell_side": 0.5 } }"#).unwrap();
        assert_eq!(config.seed, 7);
        assert_eq!(config.patch.cell_side, 0.5);
        assert_eq!(config.patch.area, 1000.0);
        assert_eq!(config.max_tree_count, 1000);
        assert_eq!(config.patch_margin, 1.05);
    }
}
