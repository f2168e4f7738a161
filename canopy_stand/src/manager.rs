// Copyright 2026 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The patch registry: loading, year navigation and selection.

use core::fmt::Debug;
use core::ops::Bound;
use std::collections::{BTreeMap, BTreeSet};

use canopy_cohort::{Cohort, CohortId, CohortRecord, DataError, PatchId, Year, columns};
use canopy_patch::{Patch, YearUpdate};
use glam::DVec3;
use kurbo::Point;
use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::config::StandConfig;
use crate::render::{Frame, PatchFrame, patch_origin};

/// One placed tree.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct TreePosition {
    /// Cohort of the tree; its `patch` names the patch.
    pub cohort: CohortId,
    /// Year of the layout.
    pub year: Year,
    /// Instance index within the cohort.
    pub instance: usize,
    /// Position in the patch frame.
    pub position: Point,
}

/// Inspector payload for the selected cohort.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct CohortInfo<'a> {
    /// Cohort identity.
    pub id: CohortId,
    /// Row of the current year, if the cohort has one.
    pub record: Option<&'a CohortRecord>,
    /// First year with data.
    pub year_of_birth: Option<Year>,
    /// Last year with data.
    pub year_of_death: Option<Year>,
}

impl CohortInfo<'_> {
    /// Name and value of every field to show, record columns first.
    pub fn fields(&self) -> Vec<(&str, f64)> {
        let mut fields: Vec<(&str, f64)> = self
            .record
            .map(|r| r.fields().collect())
            .unwrap_or_default();
        fields.extend(self.year_of_birth.map(|y| ("yearOfBirth", f64::from(y))));
        fields.extend(self.year_of_death.map(|y| ("yearOfDeath", f64::from(y))));
        fields
    }
}

/// Owns every patch of a stand and drives year changes across them.
///
/// Rows are added with [`add_data`](Self::add_data); the first row of a patch fixes
/// its stand grid position. Showing a year resolves its layout on every patch and
/// returns a [`Frame`].
pub struct PatchManager {
    config: StandConfig,
    patches: BTreeMap<PatchId, Patch>,
    years: BTreeSet<Year>,
    year_data: BTreeMap<Year, BTreeMap<String, f64>>,
    current_year: Option<Year>,
    selected: Option<CohortId>,
    dataset_name: Option<String>,
    rng: StdRng,
}

impl PatchManager {
    /// Create an empty registry.
    pub fn new(config: StandConfig) -> Self {
        Self {
            config,
            patches: BTreeMap::new(),
            years: BTreeSet::new(),
            year_data: BTreeMap::new(),
            current_year: None,
            selected: None,
            dataset_name: None,
            rng: StdRng::seed_from_u64(config.seed),
        }
    }

    /// Settings.
    pub fn config(&self) -> &StandConfig {
        &self.config
    }

    /// Add one cohort row.
    ///
    /// A second row for the same cohort and year is rejected and nothing changes.
    pub fn add_data(&mut self, record: CohortRecord) -> Result<(), DataError> {
        let year = record.year;
        let patch_config = self.config.patch;
        let patch = self
            .patches
            .entry(record.id.patch)
            .or_insert_with(|| Patch::from_record(&record, patch_config));
        patch.add_record(record, self.config.max_tree_count)?;
        self.years.insert(year);
        Ok(())
    }

    /// Merge stand-level values for `year`. Later values replace earlier ones of the
    /// same name.
    pub fn add_year_data(&mut self, year: Year, values: impl IntoIterator<Item = (String, f64)>) {
        let entry = self.year_data.entry(year).or_default();
        for (name, value) in values {
            if name != columns::YEAR {
                entry.insert(name, value);
            }
        }
    }

    /// Stand-level values of `year`.
    pub fn year_data(&self, year: Year) -> Option<&BTreeMap<String, f64>> {
        self.year_data.get(&year)
    }

    /// Every year with cohort data, ascending.
    pub fn years(&self) -> impl DoubleEndedIterator<Item = Year> + '_ {
        self.years.iter().copied()
    }

    /// Patches by identifier.
    pub fn patches(&self) -> impl ExactSizeIterator<Item = &Patch> + '_ {
        self.patches.values()
    }

    /// Patch by identifier.
    pub fn patch(&self, id: PatchId) -> Option<&Patch> {
        self.patches.get(&id)
    }

    /// Name of the loaded dataset.
    pub fn dataset_name(&self) -> Option<&str> {
        self.dataset_name.as_deref()
    }

    /// Set the name used for exports.
    pub fn set_dataset_name(&mut self, name: impl Into<String>) {
        self.dataset_name = Some(name.into());
    }

    /// Year currently shown.
    pub fn current_year(&self) -> Option<Year> {
        self.current_year
    }

    /// Resolve `year` on every patch and build its frame.
    pub fn set_year(&mut self, year: Year) -> Frame {
        let mut update = YearUpdate {
            year,
            already_resolved: true,
            ..YearUpdate::default()
        };
        for patch in self.patches.values_mut() {
            update.merge(&patch.update_year(year, &mut self.rng));
        }
        tracing::info!(
            year,
            added = update.added,
            removed = update.removed,
            "showing year"
        );
        self.current_year = Some(year);
        self.frame(year, update)
    }

    /// Frame of the current year without resolving anything, if a year is shown.
    pub fn current_frame(&self) -> Option<Frame> {
        let year = self.current_year?;
        let update = YearUpdate {
            year,
            already_resolved: true,
            ..YearUpdate::default()
        };
        Some(self.frame(year, update))
    }

    /// Show the next year with data, staying on the last one.
    ///
    /// Starts at the first year when none is shown. Returns `None` only when there is
    /// no data.
    pub fn next_year(&mut self) -> Option<Frame> {
        let year = match self.current_year {
            None => self.years.first().copied(),
            Some(current) => self
                .years
                .range((Bound::Excluded(current), Bound::Unbounded))
                .next()
                .or_else(|| self.years.last())
                .copied(),
        }?;
        Some(self.set_year(year))
    }

    /// Show the previous year with data, staying on the first one.
    ///
    /// Starts at the last year when none is shown. Returns `None` only when there is
    /// no data.
    pub fn prev_year(&mut self) -> Option<Frame> {
        let year = match self.current_year {
            None => self.years.last().copied(),
            Some(current) => self
                .years
                .range(..current)
                .next_back()
                .or_else(|| self.years.first())
                .copied(),
        }?;
        Some(self.set_year(year))
    }

    /// Whether the current year is at or past the last year with data.
    pub fn is_last_year(&self) -> bool {
        match (self.current_year, self.years.last()) {
            (Some(current), Some(&last)) => current >= last,
            _ => false,
        }
    }

    /// Cohort by identity.
    pub fn get_cohort_by_id(&self, id: CohortId) -> Option<&Cohort> {
        self.patches.get(&id.patch).and_then(|p| p.cohort(id))
    }

    /// Change the selection. Returns whether it changed.
    ///
    /// `None` clears it, and so does an id that matches no cohort.
    pub fn select_cohort(&mut self, id: Option<CohortId>) -> bool {
        let id = id.filter(|&id| {
            let known = self.get_cohort_by_id(id).is_some();
            if !known {
                tracing::warn!(cohort = %id, "unknown cohort, selection cleared");
            }
            known
        });
        if id == self.selected {
            return false;
        }
        tracing::debug!(selected = ?id, "selection changed");
        self.selected = id;
        true
    }

    /// Selected cohort.
    pub fn selected(&self) -> Option<CohortId> {
        self.selected
    }

    /// Inspector data of the selected cohort for the current year.
    pub fn selected_cohort_info(&self) -> Option<CohortInfo<'_>> {
        let id = self.selected?;
        let cohort = self.get_cohort_by_id(id)?;
        Some(CohortInfo {
            id,
            record: self
                .current_year
                .and_then(|y| cohort.timestep(y))
                .map(|t| t.record()),
            year_of_birth: cohort.year_of_birth(),
            year_of_death: cohort.year_of_death(),
        })
    }

    /// Centroid of the patch origins weighted by footprint area.
    ///
    /// Returns `None` without patches or when every footprint is empty.
    pub fn calc_patches_centre(&self) -> Option<DVec3> {
        let mut sum = DVec3::ZERO;
        let mut weight = 0.0;
        for patch in self.patches.values() {
            let area = patch.footprint().area();
            sum += patch_origin(patch, self.config.patch_margin) * area;
            weight += area;
        }
        (weight > 0.0).then(|| sum / weight)
    }

    /// Every placed tree of every resolved year.
    pub fn tree_positions(&self) -> impl Iterator<Item = TreePosition> + '_ {
        self.patches.values().flat_map(|patch| {
            patch.positioned_years().flat_map(move |year| {
                patch.placed_trees(year).map(move |(cohort, instance, position)| {
                    TreePosition {
                        cohort: cohort.id(),
                        year,
                        instance,
                        position,
                    }
                })
            })
        })
    }

    fn frame(&self, year: Year, update: YearUpdate) -> Frame {
        Frame {
            year,
            update,
            patches: self
                .patches
                .values()
                .map(|p| PatchFrame::build(p, year, self.config.patch_margin, self.selected))
                .collect(),
        }
    }
}

impl Default for PatchManager {
    fn default() -> Self {
        Self::new(StandConfig::default())
    }
}

impl Debug for PatchManager {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("PatchManager")
            .field("patches", &self.patches.len())
            .field("years", &self.years.len())
            .field("current_year", &self.current_year)
            .field("selected", &self.selected)
            .field("dataset_name", &self.dataset_name)
            .finish_non_exhaustive()
    }
}
