// Copyright 2026 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Patch geometry and placement tuning.

use serde::{Deserialize, Serialize};

/// Geometry and placement parameters shared by every patch of a stand.
///
/// Missing fields deserialize to their defaults, so a host can override one knob:
///
/// ```
/// # use canopy_patch::PatchConfig;
/// let config = PatchConfig { cell_side: 0.5, ..PatchConfig::default() };
/// assert_eq!(config.area, 1000.0);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PatchConfig {
    /// Patch area in m². Patches are square.
    pub area: f64,
    /// Spacing of the candidate cell grid. Smaller values give finer placement at
    /// quadratic memory and time cost.
    pub cell_side: f64,
    /// Fraction of a crown radius around a placed tree that is closed to later trees.
    ///
    /// At `0.5`, two crowns may overlap by half their radius before the space counts as
    /// taken.
    pub allowed_overlap: f64,
}

impl Default for PatchConfig {
    fn default() -> Self {
        Self {
            area: 1000.0,
            cell_side: 0.3,
            allowed_overlap: 0.5,
        }
    }
}

impl PatchConfig {
    /// Side length of the square patch footprint.
    pub fn side_length(&self) -> f64 {
        if self.area > 0.0 {
            self.area.sqrt()
        } else {
            0.0
        }
    }
}
