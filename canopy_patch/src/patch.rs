// Copyright 2026 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Patches: the cohorts of one spatial cell and their per-year tree layouts.

use core::fmt::Debug;
use std::collections::{BTreeMap, BTreeSet};

use canopy_cohort::{Cohort, CohortId, CohortRecord, DataError, PatchId, Year};
use kurbo::{Point, Rect};
use rand::Rng;

use crate::cells::{CellGrid, Occupant};
use crate::config::PatchConfig;
use crate::placement::{Placement, place_tree};
use crate::update::YearUpdate;

/// One square patch of a stand.
///
/// A patch owns its cohorts in insertion order and, for every resolved year, a
/// [`CellGrid`] recording which tree covers which cell. Resolving a year writes the
/// tree positions into the cohorts' timesteps for that year.
///
/// Resolution is monotonic: once a year is positioned, later calls for it change
/// nothing.
#[derive(Clone)]
pub struct Patch {
    id: PatchId,
    grid_position: Point,
    base_height: f64,
    config: PatchConfig,
    cohorts: Vec<Cohort>,
    lookup: BTreeMap<CohortId, usize>,
    layers: BTreeMap<Year, CellGrid>,
    positioned_years: BTreeSet<Year>,
}

impl Patch {
    /// Create an empty patch at stand grid position zero.
    pub fn new(id: PatchId, config: PatchConfig) -> Self {
        Self {
            id,
            grid_position: Point::ZERO,
            base_height: 0.0,
            config,
            cohorts: Vec::new(),
            lookup: BTreeMap::new(),
            layers: BTreeMap::new(),
            positioned_years: BTreeSet::new(),
        }
    }

    /// Create an empty patch located by the `Px`, `Py` and `Pheight` of its first row.
    pub fn from_record(record: &CohortRecord, config: PatchConfig) -> Self {
        let mut patch = Self::new(record.id.patch, config);
        patch.grid_position = Point::new(record.patch_x, record.patch_y);
        patch.base_height = record.patch_height;
        patch
    }

    /// Patch identifier.
    pub fn id(&self) -> PatchId {
        self.id
    }

    /// Column and row of the patch in the stand grid.
    pub fn grid_position(&self) -> Point {
        self.grid_position
    }

    /// Base elevation.
    pub fn base_height(&self) -> f64 {
        self.base_height
    }

    /// Geometry and placement parameters.
    pub fn config(&self) -> &PatchConfig {
        &self.config
    }

    /// Side length of the square footprint.
    pub fn side_length(&self) -> f64 {
        self.config.side_length()
    }

    /// Footprint in the patch frame.
    pub fn footprint(&self) -> Rect {
        let side = self.side_length();
        Rect::new(0.0, 0.0, side, side)
    }

    /// Append one row, creating its cohort on first sight.
    ///
    /// A second row for the same cohort and year is rejected and nothing is changed.
    pub fn add_record(
        &mut self,
        record: CohortRecord,
        max_tree_count: usize,
    ) -> Result<(), DataError> {
        if let Some(&i) = self.lookup.get(&record.id) {
            return self.cohorts[i].add_step(record);
        }
        let id = record.id;
        let mut cohort = Cohort::new(&record, max_tree_count);
        cohort.add_step(record)?;
        self.lookup.insert(id, self.cohorts.len());
        self.cohorts.push(cohort);
        Ok(())
    }

    /// Cohorts in insertion order.
    pub fn cohorts(&self) -> impl ExactSizeIterator<Item = &Cohort> + '_ {
        self.cohorts.iter()
    }

    /// Cohort by identity.
    pub fn cohort(&self, id: CohortId) -> Option<&Cohort> {
        self.lookup.get(&id).map(|&i| &self.cohorts[i])
    }

    /// Whether ground cover is present in `year`.
    pub fn is_grassy(&self, year: Year) -> bool {
        self.cohorts.iter().any(|c| c.is_grass() && c.has_year(year))
    }

    /// Cell layer of `year`, if one was built.
    pub fn cells(&self, year: Year) -> Option<&CellGrid> {
        self.layers.get(&year)
    }

    /// Whether `year` has been resolved.
    pub fn is_positioned(&self, year: Year) -> bool {
        self.positioned_years.contains(&year)
    }

    /// Resolved years in ascending order.
    pub fn positioned_years(&self) -> impl DoubleEndedIterator<Item = Year> + '_ {
        self.positioned_years.iter().copied()
    }

    /// Every placed tree of `year` as `(cohort, instance, position)`.
    ///
    /// Yields nothing for an unresolved year.
    pub fn placed_trees(&self, year: Year) -> impl Iterator<Item = (&Cohort, usize, Point)> + '_ {
        self.cohorts.iter().flat_map(move |c| {
            c.timestep(year)
                .into_iter()
                .flat_map(move |t| t.positions().iter().map(move |(&i, &p)| (c, i, p)))
        })
    }

    /// Build an unoccupied cell layer for `year`.
    ///
    /// Does nothing for a resolved year.
    pub fn init_cells(&mut self, year: Year) {
        if self.is_positioned(year) {
            return;
        }
        let grid = CellGrid::new(self.side_length(), self.config.cell_side);
        self.layers.insert(year, grid);
    }

    /// Lay out every tree of `year` on a fresh grid, ignoring earlier years.
    ///
    /// Does nothing for a resolved year.
    pub fn place_all<R: Rng + ?Sized>(&mut self, year: Year, rng: &mut R) -> YearUpdate {
        if self.is_positioned(year) {
            return Self::resolved(year);
        }
        self.resolve(year, None, rng)
    }

    /// Resolve `year`, reusing the layout of the most recent earlier resolved year.
    ///
    /// Trees of cohorts absent this year are dropped, surplus instances removed and
    /// missing instances placed. Without an earlier resolved year the layout is built
    /// from scratch. Does nothing for a resolved year.
    pub fn update_year<R: Rng + ?Sized>(&mut self, year: Year, rng: &mut R) -> YearUpdate {
        if self.is_positioned(year) {
            return Self::resolved(year);
        }
        let previous = self
            .positioned_years
            .range(..year)
            .next_back()
            .copied()
            .filter(|y| self.layers.contains_key(y));
        self.resolve(year, previous, rng)
    }

    fn resolved(year: Year) -> YearUpdate {
        YearUpdate {
            year,
            already_resolved: true,
            ..YearUpdate::default()
        }
    }

    fn resolve<R: Rng + ?Sized>(
        &mut self,
        year: Year,
        previous: Option<Year>,
        rng: &mut R,
    ) -> YearUpdate {
        let mut update = YearUpdate {
            year,
            carried_from: previous,
            ..YearUpdate::default()
        };

        let mut grid = match previous.and_then(|last| self.carry_forward(last, year, &mut update))
        {
            Some(grid) => grid,
            None => {
                for cohort in &mut self.cohorts {
                    if let Some(step) = cohort.timestep_mut(year) {
                        step.positions_mut().clear();
                    }
                }
                CellGrid::new(self.side_length(), self.config.cell_side)
            }
        };

        let order = self.active_cohorts(year);
        self.shrink(year, &order, &mut grid, &mut update);
        self.grow(year, &order, &mut grid, rng, &mut update);

        debug_assert!(grid.is_partitioned(), "available cells out of sync");
        self.layers.insert(year, grid);
        self.positioned_years.insert(year);
        update
    }

    // Copy the layout of `last` into `year`; cells held by cohorts absent in `year` are
    // left out of the copy.
    fn carry_forward(
        &mut self,
        last: Year,
        year: Year,
        update: &mut YearUpdate,
    ) -> Option<CellGrid> {
        let source = self.layers.get(&last)?;
        let present: BTreeSet<CohortId> = self
            .cohorts
            .iter()
            .filter(|c| c.has_year(year))
            .map(Cohort::id)
            .collect();
        let grid = source.carry_forward(|o| present.contains(&o.cohort));

        for cohort in &mut self.cohorts {
            let Some(carried) = cohort.timestep(last).map(|t| t.positions().clone()) else {
                continue;
            };
            match cohort.timestep_mut(year) {
                Some(step) => *step.positions_mut() = carried,
                None if !carried.is_empty() => {
                    tracing::debug!(
                        patch = self.id,
                        cohort = %cohort.id(),
                        year,
                        removed = carried.len(),
                        "cohort absent, trees dropped"
                    );
                    update.removed += carried.len();
                }
                None => {}
            }
        }
        Some(grid)
    }

    fn shrink(&mut self, year: Year, order: &[usize], grid: &mut CellGrid, update: &mut YearUpdate) {
        let mut limits = BTreeMap::new();
        for &i in order {
            let cohort = &mut self.cohorts[i];
            let id = cohort.id();
            let n = cohort.tree_count(year).unwrap_or(0);
            let Some(step) = cohort.timestep_mut(year) else {
                continue;
            };
            let dropped = step.positions_mut().split_off(&n);
            if !dropped.is_empty() {
                tracing::debug!(
                    patch = self.id,
                    cohort = %id,
                    year,
                    removed = dropped.len(),
                    "cohort shrank"
                );
                update.removed += dropped.len();
                limits.insert(id, n);
            }
        }
        if !limits.is_empty() {
            grid.release(|o| limits.get(&o.cohort).is_some_and(|&n| o.instance >= n));
        }
    }

    fn grow<R: Rng + ?Sized>(
        &mut self,
        year: Year,
        order: &[usize],
        grid: &mut CellGrid,
        rng: &mut R,
        update: &mut YearUpdate,
    ) {
        let allowed_overlap = self.config.allowed_overlap;
        for &i in order {
            let cohort = &mut self.cohorts[i];
            let id = cohort.id();
            let n = cohort.tree_count(year).unwrap_or(0);
            let Some(step) = cohort.timestep_mut(year) else {
                continue;
            };
            let radius = step.record().crown_radius() * allowed_overlap;
            let mut added = 0;
            let mut overlapping = 0;
            while step.positions().len() < n {
                let instance = step.positions().len();
                let occupant = Occupant {
                    cohort: id,
                    instance,
                };
                let (position, placement) = place_tree(grid, radius, occupant, rng);
                if placement != Placement::Free {
                    overlapping += 1;
                }
                step.positions_mut().insert(instance, position);
                added += 1;
            }
            if added > 0 {
                tracing::debug!(patch = self.id, cohort = %id, year, added, "cohort grew");
            }
            if overlapping > 0 {
                tracing::warn!(
                    patch = self.id,
                    cohort = %id,
                    year,
                    overlapping,
                    "no free cells left, trees placed with overlap"
                );
            }
            update.added += added;
            update.overlapping += overlapping;
        }
    }

    // Non-grass cohorts present in `year`, largest crown first; ties keep insertion order.
    fn active_cohorts(&self, year: Year) -> Vec<usize> {
        let mut order: Vec<usize> = (0..self.cohorts.len())
            .filter(|&i| !self.cohorts[i].is_grass() && self.cohorts[i].has_year(year))
            .collect();
        order.sort_by(|&a, &b| {
            let area = |i: usize| self.cohorts[i].crown_area(year).unwrap_or(0.0);
            area(b).total_cmp(&area(a))
        });
        order
    }
}

impl Debug for Patch {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Patch")
            .field("id", &self.id)
            .field("grid_position", &self.grid_position)
            .field("cohorts", &self.cohorts.len())
            .field("positioned_years", &self.positioned_years)
            .finish_non_exhaustive()
    }
}
