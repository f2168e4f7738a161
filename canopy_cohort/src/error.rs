// Copyright 2026 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Errors raised while building the cohort store.

use core::fmt;

use crate::id::{CohortId, Year};

/// A row violated the store's data contract.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DataError {
    /// The cohort already reported a timestep for this year.
    DuplicateTimestep {
        /// Offending cohort.
        id: CohortId,
        /// Year reported twice.
        year: Year,
    },
    /// A row was appended to a cohort with a different identity.
    ForeignRow {
        /// Cohort receiving the row.
        expected: CohortId,
        /// Identity carried by the row.
        found: CohortId,
    },
}

impl fmt::Display for DataError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DuplicateTimestep { id, year } => {
                write!(f, "cohort {id} already has data for year {year}")
            }
            Self::ForeignRow { expected, found } => {
                write!(f, "row for cohort {found} appended to cohort {expected}")
            }
        }
    }
}

impl core::error::Error for DataError {}

/// A row could not be converted into a [`CohortRecord`](crate::CohortRecord).
#[derive(Clone, Debug, PartialEq)]
pub enum RecordError {
    /// A required column is absent from the header.
    MissingColumn(&'static str),
    /// The header and value slices differ in length.
    ColumnCount {
        /// Number of header columns.
        expected: usize,
        /// Number of values in the row.
        found: usize,
    },
    /// An identifier or year column does not hold a non-negative integer.
    NotAnInteger {
        /// Column name.
        column: &'static str,
        /// Value found in the row.
        value: f64,
    },
}

impl fmt::Display for RecordError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingColumn(column) => write!(f, "missing required column `{column}`"),
            Self::ColumnCount { expected, found } => {
                write!(f, "expected {expected} values, found {found}")
            }
            Self::NotAnInteger { column, value } => {
                write!(f, "column `{column}` must hold an integer, found {value}")
            }
        }
    }
}

impl core::error::Error for RecordError {}

/// A string is not a `stand:patch:cohort` key.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParseCohortIdError {
    input: String,
}

impl ParseCohortIdError {
    pub(crate) fn new(input: &str) -> Self {
        Self {
            input: input.into(),
        }
    }
}

impl fmt::Display for ParseCohortIdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "`{}` is not a `stand:patch:cohort` key", self.input)
    }
}

impl core::error::Error for ParseCohortIdError {}
