// Copyright 2026 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=canopy_stand --heading-base-level=0

//! Canopy Stand: the patch registry behind a forest-stand viewer.
//!
//! [`PatchManager`] groups simulation rows into patches and cohorts, tracks the years
//! with data and drives year changes. Showing a year resolves the tree layout of every
//! patch (see `canopy_patch`) and returns a [`Frame`]: plain data listing, per patch
//! and cohort, one bole and one crown transform per instance slot. A renderer uploads
//! those as instance buffers; this crate draws nothing.
//!
//! - [`load_dataset`] reads whitespace-delimited output files.
//! - [`PatchManager::next_year`] and [`PatchManager::prev_year`] step through the
//!   years with data and clamp at both ends.
//! - [`PatchManager::select_cohort`] marks one cohort for highlighting and
//!   [`PatchManager::selected_cohort_info`] returns its inspector data.
//! - [`export_csv`] writes every placed tree with its row.
//! - [`play`] steps through the remaining years until the last or until a stop flag is
//!   raised.
//!
//! # Example
//!
//! ```rust
//! use canopy_stand::{PatchManager, StandConfig, load_cohorts};
//!
//! let text = "\
//! Year SID PID IID PFT Height Boleht Diam CrownA DensI Px Py
//! 1901   1   0   7   3   18.0    7.0 0.35  12.57 0.004  0  0
//! 1902   1   0   7   3   18.5    7.1 0.36  12.90 0.002  0  0
//! ";
//! let mut stand = PatchManager::new(StandConfig { seed: 42, ..StandConfig::default() });
//! load_cohorts(&mut stand, text).unwrap();
//!
//! let frame = stand.next_year().unwrap();
//! assert_eq!(frame.year, 1901);
//! assert_eq!(frame.update.added, 4);
//!
//! let frame = stand.next_year().unwrap();
//! assert_eq!(frame.update.removed, 2);
//! assert!(stand.is_last_year());
//! ```

pub mod config;
pub mod error;
pub mod export;
pub mod loader;
pub mod manager;
pub mod playback;
pub mod render;

pub use config::StandConfig;
pub use error::LoadError;
pub use export::export_csv;
pub use loader::{COHORT_FILE_MARKER, Table, load_cohorts, load_dataset, load_year_data};
pub use manager::{CohortInfo, PatchManager, TreePosition};
pub use playback::{PlaybackEnd, play};
pub use render::{
    CohortFlags, CohortInstances, CrownShape, Frame, InstanceTransform, PatchFrame, patch_origin,
};
