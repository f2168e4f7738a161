// Copyright 2026 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=canopy_patch --heading-base-level=0

//! Canopy Patch: tree placement on a patch cell grid, resolved incrementally per year.
//!
//! A [`Patch`] holds the cohorts of one square patch of a stand. Cohorts report
//! aggregate statistics (crown area, density), so individual tree positions are
//! invented: each tree draws a free cell at random and closes every cell within half
//! its crown radius to later trees. Larger crowns go first.
//!
//! - [`CellGrid`] is the candidate grid of one year. Radius queries visit only the
//!   index rectangle under the circle, and the set of open cells supports O(1) draws
//!   and removals.
//! - [`place_tree`] places one tree and falls back to overlapping placement when no
//!   cell is open. Placement never fails.
//! - [`Patch::update_year`] resolves a year from the most recent earlier resolved
//!   year: trees that survive keep their positions, surplus instances are removed and
//!   new ones placed. The returned [`YearUpdate`] reports the changes.
//!
//! Resolution is idempotent. Randomness is injected, so a seeded generator reproduces
//! a layout exactly.
//!
//! # Example
//!
//! ```rust
//! use canopy_cohort::{CohortId, CohortRecord};
//! use canopy_patch::{Patch, PatchConfig};
//! use rand::SeedableRng;
//! use rand::rngs::StdRng;
//!
//! let header = ["Year", "SID", "PID", "IID", "PFT", "Height", "Boleht", "Diam", "CrownA", "DensI"];
//! let mut patch = Patch::new(0, PatchConfig::default());
//! for (year, density) in [(1901.0, 0.004), (1902.0, 0.002)] {
//!     let row = [year, 1.0, 0.0, 7.0, 3.0, 18.0, 7.0, 0.35, 12.57, density];
//!     patch.add_record(CohortRecord::from_columns(&header, &row).unwrap(), 1000).unwrap();
//! }
//!
//! let mut rng = StdRng::seed_from_u64(42);
//! let first = patch.update_year(1901, &mut rng);
//! assert_eq!(first.added, 4);
//!
//! let second = patch.update_year(1902, &mut rng);
//! assert_eq!(second.carried_from, Some(1901));
//! assert_eq!(second.removed, 2);
//!
//! let cohort = patch.cohort(CohortId::new(1, 0, 7)).unwrap();
//! assert_eq!(
//!     cohort.timestep(1902).unwrap().position(0),
//!     cohort.timestep(1901).unwrap().position(0),
//! );
//! ```

pub mod cells;
pub mod config;
pub mod patch;
pub mod placement;
pub mod update;

pub use cells::{CellGrid, Occupant, PatchCell};
pub use config::PatchConfig;
pub use patch::Patch;
pub use placement::{Placement, place_tree};
pub use update::YearUpdate;
