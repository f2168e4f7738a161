// Copyright 2026 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=canopy_cohort --heading-base-level=0

//! Canopy Cohort: the year-indexed store behind a forest-stand visualization.
//!
//! A forest simulation reports, for every simulated year, one row per cohort: a group
//! of identical trees inside a patch of the stand. This crate turns those rows into
//! long-lived [`Cohort`]s keyed by [`CohortId`], each holding an ordered map of
//! [`CohortTimestep`]s.
//!
//! - [`CohortRecord`] is the fixed-field form of a row. Columns the store does not
//!   interpret are kept by name in [`CohortRecord::extra`].
//! - [`Cohort::add_step`] appends a year and refuses a second row for the same year
//!   with [`DataError::DuplicateTimestep`].
//! - [`CohortTimestep::positions`] holds where each tree instance stands that year.
//!   It is empty until a placement engine such as `canopy_patch` resolves the year.
//!
//! # Example
//!
//! ```rust
//! use canopy_cohort::{Cohort, CohortRecord, DEFAULT_MAX_TREE_COUNT};
//!
//! let header = ["Year", "SID", "PID", "IID", "PFT", "Height", "Boleht", "Diam", "CrownA", "DensI"];
//! let row = [1901.0, 1.0, 0.0, 7.0, 3.0, 18.0, 7.0, 0.35, 12.57, 0.002];
//! let record = CohortRecord::from_columns(&header, &row).unwrap();
//!
//! let mut cohort = Cohort::new(&record, DEFAULT_MAX_TREE_COUNT);
//! cohort.add_step(record.clone()).unwrap();
//! assert!(cohort.add_step(record).is_err());
//!
//! assert_eq!(cohort.tree_count(1901), Some(2));
//! assert_eq!(cohort.year_of_birth(), Some(1901));
//! ```

pub mod cohort;
pub mod error;
pub mod id;
pub mod record;

pub use cohort::{Cohort, CohortTimestep, DEFAULT_MAX_TREE_COUNT};
pub use error::{DataError, ParseCohortIdError, RecordError};
pub use id::{CohortId, PatchId, Year};
pub use record::{CohortRecord, columns};
