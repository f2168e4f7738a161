// Copyright 2026 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Fixed-field cohort rows.

use std::collections::BTreeMap;
use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

use crate::error::RecordError;
use crate::id::{CohortId, Year};

/// Column names of the simulation output.
pub mod columns {
    /// Stand identifier.
    pub const STAND: &str = "SID";
    /// Patch identifier.
    pub const PATCH: &str = "PID";
    /// Cohort identifier.
    pub const COHORT: &str = "IID";
    /// Simulated year.
    pub const YEAR: &str = "Year";
    /// Plant functional type id.
    pub const PFT: &str = "PFT";
    /// Tree height (m).
    pub const HEIGHT: &str = "Height";
    /// Bole (stem) height (m).
    pub const BOLE_HEIGHT: &str = "Boleht";
    /// Stem diameter (m).
    pub const DIAMETER: &str = "Diam";
    /// Crown area (m²).
    pub const CROWN_AREA: &str = "CrownA";
    /// Tree density (trees m⁻²).
    pub const DENSITY: &str = "DensI";
    /// Patch grid column.
    pub const PATCH_X: &str = "Px";
    /// Patch grid row.
    pub const PATCH_Y: &str = "Py";
    /// Patch base elevation.
    pub const PATCH_HEIGHT: &str = "Pheight";

    /// Every column with a dedicated [`CohortRecord`](super::CohortRecord) field, in export order.
    pub const KNOWN: [&str; 13] = [
        YEAR,
        STAND,
        PATCH,
        COHORT,
        PFT,
        HEIGHT,
        BOLE_HEIGHT,
        DIAMETER,
        CROWN_AREA,
        DENSITY,
        PATCH_X,
        PATCH_Y,
        PATCH_HEIGHT,
    ];
}

/// One cohort's attributes for one simulated year.
///
/// Fields used by placement and rendering are named; every other column of the
/// simulation output (LAI, GPP, carbon mass, ...) is carried in [`extra`](Self::extra)
/// without interpretation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CohortRecord {
    /// Cohort identity.
    pub id: CohortId,
    /// Simulated year.
    pub year: Year,
    /// Plant functional type id.
    pub pft: u32,
    /// Tree height.
    pub height: f64,
    /// Bole height.
    pub bole_height: f64,
    /// Stem diameter.
    pub diameter: f64,
    /// Crown area of a single tree.
    pub crown_area: f64,
    /// Trees per unit area.
    pub density: f64,
    /// Column of the patch in the stand grid.
    pub patch_x: f64,
    /// Row of the patch in the stand grid.
    pub patch_y: f64,
    /// Base elevation of the patch.
    pub patch_height: f64,
    /// Opaque simulation outputs keyed by column name.
    #[serde(default)]
    pub extra: BTreeMap<String, f64>,
}

impl CohortRecord {
    /// Build a record from a header and the matching row of values.
    ///
    /// `Px`, `Py` and `Pheight` default to zero when absent. Unknown columns land in
    /// [`extra`](Self::extra).
    pub fn from_columns<S: AsRef<str>>(header: &[S], values: &[f64]) -> Result<Self, RecordError> {
        if header.len() != values.len() {
            return Err(RecordError::ColumnCount {
                expected: header.len(),
                found: values.len(),
            });
        }
        let lookup = |name: &str| {
            header
                .iter()
                .position(|h| h.as_ref() == name)
                .map(|i| values[i])
        };
        let required =
            |name: &'static str| lookup(name).ok_or(RecordError::MissingColumn(name));

        let id = CohortId::new(
            to_u32(columns::STAND, required(columns::STAND)?)?,
            to_u32(columns::PATCH, required(columns::PATCH)?)?,
            to_u32(columns::COHORT, required(columns::COHORT)?)?,
        );
        let mut extra = BTreeMap::new();
        for (h, v) in header.iter().zip(values) {
            let name: &str = h.as_ref();
            if !columns::KNOWN.contains(&name) {
                extra.insert(name.to_owned(), *v);
            }
        }

        Ok(Self {
            id,
            year: to_year(required(columns::YEAR)?)?,
            pft: to_u32(columns::PFT, required(columns::PFT)?)?,
            height: required(columns::HEIGHT)?,
            bole_height: required(columns::BOLE_HEIGHT)?,
            diameter: required(columns::DIAMETER)?,
            crown_area: required(columns::CROWN_AREA)?,
            density: required(columns::DENSITY)?,
            patch_x: lookup(columns::PATCH_X).unwrap_or(0.0),
            patch_y: lookup(columns::PATCH_Y).unwrap_or(0.0),
            patch_height: lookup(columns::PATCH_HEIGHT).unwrap_or(0.0),
            extra,
        })
    }

    /// Whether the row describes ground cover rather than trees.
    ///
    /// Grass reports no height, bole or stem, and a crown area and density of exactly one.
    pub fn is_grass(&self) -> bool {
        self.height == 0.0
            && self.bole_height == 0.0
            && self.diameter == 0.0
            && self.crown_area == 1.0
            && self.density == 1.0
    }

    /// Radius of a circular crown with this record's crown area.
    ///
    /// Non-positive or non-finite areas give a radius of zero.
    pub fn crown_radius(&self) -> f64 {
        if self.crown_area > 0.0 && self.crown_area.is_finite() {
            (self.crown_area / PI).sqrt()
        } else {
            0.0
        }
    }

    /// Number of live trees for a cohort holding at most `capacity` instances.
    ///
    /// This is `density × capacity` rounded to the nearest integer and clamped to
    /// `0..=capacity`.
    pub fn tree_count(&self, capacity: usize) -> usize {
        let n = (self.density * capacity as f64).round();
        if n.is_nan() || n <= 0.0 {
            return 0;
        }
        #[allow(
            clippy::cast_possible_truncation,
            reason = "n is positive and rounded; the cast saturates and is clamped below."
        )]
        let n = n as usize;
        n.min(capacity)
    }

    /// Every column of the row as `(name, value)`, known columns first.
    pub fn fields(&self) -> impl Iterator<Item = (&str, f64)> + '_ {
        let known = [
            f64::from(self.year),
            f64::from(self.id.stand),
            f64::from(self.id.patch),
            f64::from(self.id.cohort),
            f64::from(self.pft),
            self.height,
            self.bole_height,
            self.diameter,
            self.crown_area,
            self.density,
            self.patch_x,
            self.patch_y,
            self.patch_height,
        ];
        columns::KNOWN
            .into_iter()
            .zip(known)
            .chain(self.extra.iter().map(|(k, v)| (k.as_str(), *v)))
    }
}

fn to_u32(column: &'static str, value: f64) -> Result<u32, RecordError> {
    if value.fract() == 0.0 && (0.0..=f64::from(u32::MAX)).contains(&value) {
        #[allow(
            clippy::cast_possible_truncation,
            reason = "Range and integrality are checked above."
        )]
        let value = value as u32;
        Ok(value)
    } else {
        Err(RecordError::NotAnInteger { column, value })
    }
}

fn to_year(value: f64) -> Result<Year, RecordError> {
    if value.fract() == 0.0 && (f64::from(Year::MIN)..=f64::from(Year::MAX)).contains(&value) {
        #[allow(
            clippy::cast_possible_truncation,
            reason = "Range and integrality are checked above."
        )]
        let year = value as Year;
        Ok(year)
    } else {
        Err(RecordError::NotAnInteger {
            column: columns::YEAR,
            value,
        })
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// A tree row with the given year, crown area and density.
    pub(crate) fn tree(id: CohortId, year: Year, crown_area: f64, density: f64) -> CohortRecord {
        CohortRecord {
            id,
            year,
            pft: 4,
            height: 20.0,
            bole_height: 8.0,
            diameter: 0.4,
            crown_area,
            density,
            patch_x: 0.0,
            patch_y: 0.0,
            patch_height: 0.0,
            extra: BTreeMap::new(),
        }
    }

    #[test]
    fn from_columns_reads_known_and_extra_columns() {
        let header = [
            "Lon", "Year", "SID", "PID", "IID", "PFT", "Height", "Boleht", "Diam", "CrownA",
            "DensI", "GPP",
        ];
        let values = [
            12.5, 1901.0, 1.0, 2.0, 3.0, 5.0, 17.0, 6.0, 0.3, 12.0, 0.004, 0.8,
        ];
        let r = CohortRecord::from_columns(&header, &values).unwrap();
        assert_eq!(r.id, CohortId::new(1, 2, 3));
        assert_eq!(r.year, 1901);
        assert_eq!(r.pft, 5);
        assert_eq!(r.crown_area, 12.0);
        assert_eq!(r.patch_x, 0.0);
        assert_eq!(r.extra.len(), 2);
        assert_eq!(r.extra["GPP"], 0.8);
        assert_eq!(r.extra["Lon"], 12.5);
    }

    #[test]
    fn from_columns_reports_missing_and_fractional_columns() {
        let header = ["Year", "SID", "PID"];
        let err = CohortRecord::from_columns(&header, &[1.0, 1.0, 1.0]).unwrap_err();
        assert_eq!(err, RecordError::MissingColumn(columns::COHORT));

        let header = [
            "Year", "SID", "PID", "IID", "PFT", "Height", "Boleht", "Diam", "CrownA", "DensI",
        ];
        let values = [1900.0, 1.0, 1.5, 3.0, 5.0, 17.0, 6.0, 0.3, 12.0, 0.004];
        let err = CohortRecord::from_columns(&header, &values).unwrap_err();
        assert!(matches!(err, RecordError::NotAnInteger { column: "PID", .. }));

        let err = CohortRecord::from_columns(&header, &values[..4]).unwrap_err();
        assert_eq!(
            err,
            RecordError::ColumnCount {
                expected: 10,
                found: 4
            }
        );
    }

    #[test]
    fn grass_is_full_cover_without_structure() {
        let mut r = tree(CohortId::new(1, 1, 1), 1900, 1.0, 1.0);
        assert!(!r.is_grass());
        r.height = 0.0;
        r.bole_height = 0.0;
        r.diameter = 0.0;
        assert!(r.is_grass());
        r.density = 0.5;
        assert!(!r.is_grass());
    }

    #[test]
    fn tree_count_rounds_and_clamps() {
        let id = CohortId::new(1, 1, 1);
        assert_eq!(tree(id, 0, 1.0, 0.002).tree_count(1000), 2);
        assert_eq!(tree(id, 0, 1.0, 0.0016).tree_count(1000), 2);
        assert_eq!(tree(id, 0, 1.0, 0.0004).tree_count(1000), 0);
        assert_eq!(tree(id, 0, 1.0, 3.0).tree_count(1000), 1000);
        assert_eq!(tree(id, 0, 1.0, -1.0).tree_count(1000), 0);
        assert_eq!(tree(id, 0, 1.0, f64::NAN).tree_count(1000), 0);
    }

    #[test]
    fn crown_radius_inverts_circle_area() {
        let r = tree(CohortId::new(1, 1, 1), 0, 4.0 * PI, 0.01);
        assert!((r.crown_radius() - 2.0).abs() < 1e-12);
        let r = tree(CohortId::new(1, 1, 1), 0, -3.0, 0.01);
        assert_eq!(r.crown_radius(), 0.0);
    }

    #[test]
    fn fields_lists_known_columns_then_extra() {
        let mut r = tree(CohortId::new(7, 8, 9), 1950, 3.0, 0.01);
        r.extra.insert("LAI".into(), 2.5);
        let fields: Vec<_> = r.fields().collect();
        assert_eq!(fields.len(), columns::KNOWN.len() + 1);
        assert_eq!(fields[0], ("Year", 1950.0));
        assert_eq!(fields[3], ("IID", 9.0));
        assert_eq!(fields.last(), Some(&("LAI", 2.5)));
    }
}
