// Copyright 2026 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Summary of one year update.

use canopy_cohort::Year;

/// What resolving one year changed on a patch.
///
/// Counts are in tree instances summed over all cohorts. A summary with
/// `already_resolved` set reports no changes; the year's layout was reused as is.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct YearUpdate {
    /// Year that was resolved.
    pub year: Year,
    /// Earlier year whose layout was carried forward, if any.
    pub carried_from: Option<Year>,
    /// Trees placed this pass.
    pub added: usize,
    /// Trees removed this pass, including trees of cohorts absent this year.
    pub removed: usize,
    /// Placed trees that had to overlap another crown.
    pub overlapping: usize,
    /// The year was resolved before this call.
    pub already_resolved: bool,
}

impl YearUpdate {
    /// Returns `true` if no tree was added or removed.
    pub fn is_empty(&self) -> bool {
        self.added == 0 && self.removed == 0
    }

    /// Fold another patch's summary for the same year into this one.
    pub fn merge(&mut self, other: &Self) {
        self.added += other.added;
        self.removed += other.removed;
        self.overlapping += other.overlapping;
        self.already_resolved &= other.already_resolved;
        if self.carried_from.is_none() {
            self.carried_from = other.carried_from;
        }
    }
}
