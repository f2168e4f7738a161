// Copyright 2026 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Cohorts and their per-year timesteps.

use std::collections::BTreeMap;

use kurbo::Point;

use crate::error::DataError;
use crate::id::{CohortId, Year};
use crate::record::CohortRecord;

/// Default number of tree instances a cohort can represent.
pub const DEFAULT_MAX_TREE_COUNT: usize = 1000;

/// One year of a cohort: the simulated attributes plus the placed trees.
///
/// The record never changes after loading. `positions` maps instance index to the
/// tree's position in the patch frame; placement fills it the first time the year is
/// resolved and keeps it afterwards.
#[derive(Clone, Debug, PartialEq)]
pub struct CohortTimestep {
    record: CohortRecord,
    positions: BTreeMap<usize, Point>,
}

impl CohortTimestep {
    /// Wrap a record with no placed trees.
    pub fn new(record: CohortRecord) -> Self {
        Self {
            record,
            positions: BTreeMap::new(),
        }
    }

    /// Simulated attributes of this year.
    pub fn record(&self) -> &CohortRecord {
        &self.record
    }

    /// Placed trees by instance index.
    pub fn positions(&self) -> &BTreeMap<usize, Point> {
        &self.positions
    }

    /// Mutable access to the placed trees, for the placement engine.
    pub fn positions_mut(&mut self) -> &mut BTreeMap<usize, Point> {
        &mut self.positions
    }

    /// Position of one instance, if placed.
    pub fn position(&self, instance: usize) -> Option<Point> {
        self.positions.get(&instance).copied()
    }
}

/// A group of identical trees tracked across years.
#[derive(Clone, Debug)]
pub struct Cohort {
    id: CohortId,
    is_grass: bool,
    max_tree_count: usize,
    time_steps: BTreeMap<Year, CohortTimestep>,
}

impl Cohort {
    /// Create an empty cohort classified from its first row.
    ///
    /// The row itself is not stored; append it with [`add_step`](Self::add_step).
    pub fn new(first: &CohortRecord, max_tree_count: usize) -> Self {
        let is_grass = first.is_grass();
        if is_grass {
            tracing::debug!(cohort = %first.id, "cohort classified as grass");
        }
        Self {
            id: first.id,
            is_grass,
            max_tree_count,
            time_steps: BTreeMap::new(),
        }
    }

    /// Append one year of data.
    ///
    /// Each cohort reports at most once per year; a second row for the same year is
    /// rejected and the stored timestep is left untouched.
    pub fn add_step(&mut self, record: CohortRecord) -> Result<(), DataError> {
        if record.id != self.id {
            return Err(DataError::ForeignRow {
                expected: self.id,
                found: record.id,
            });
        }
        if self.time_steps.contains_key(&record.year) {
            return Err(DataError::DuplicateTimestep {
                id: self.id,
                year: record.year,
            });
        }
        self.time_steps
            .insert(record.year, CohortTimestep::new(record));
        Ok(())
    }

    /// Cohort identity.
    pub fn id(&self) -> CohortId {
        self.id
    }

    /// Whether the cohort is ground cover, which is never placed as trees.
    pub fn is_grass(&self) -> bool {
        self.is_grass
    }

    /// Capacity of tree instances.
    pub fn max_tree_count(&self) -> usize {
        self.max_tree_count
    }

    /// First year with data.
    pub fn year_of_birth(&self) -> Option<Year> {
        self.time_steps.keys().next().copied()
    }

    /// Last year with data.
    pub fn year_of_death(&self) -> Option<Year> {
        self.time_steps.keys().next_back().copied()
    }

    /// Whether the cohort reported data for `year`.
    pub fn has_year(&self, year: Year) -> bool {
        self.time_steps.contains_key(&year)
    }

    /// Timestep for `year`.
    pub fn timestep(&self, year: Year) -> Option<&CohortTimestep> {
        self.time_steps.get(&year)
    }

    /// Mutable timestep for `year`.
    pub fn timestep_mut(&mut self, year: Year) -> Option<&mut CohortTimestep> {
        self.time_steps.get_mut(&year)
    }

    /// All timesteps in year order.
    pub fn time_steps(&self) -> impl DoubleEndedIterator<Item = (Year, &CohortTimestep)> + '_ {
        self.time_steps.iter().map(|(y, t)| (*y, t))
    }

    /// Live tree count in `year`, or `None` if the cohort has no data that year.
    pub fn tree_count(&self, year: Year) -> Option<usize> {
        self.timestep(year)
            .map(|t| t.record().tree_count(self.max_tree_count))
    }

    /// Crown area in `year`, used to order cohorts for placement.
    pub fn crown_area(&self, year: Year) -> Option<f64> {
        self.timestep(year).map(|t| t.record().crown_area)
    }
}
