// Copyright 2026 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Cohort identity.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ParseCohortIdError;

/// Simulated year.
pub type Year = i32;

/// Identifier of a patch within a stand.
pub type PatchId = u32;

/// Composite key of a cohort: stand, patch and cohort number.
///
/// Two cohorts with the same triple are the same entity across their whole
/// lifetime. The ordering is lexicographic over `(stand, patch, cohort)`.
///
/// The textual form is `stand:patch:cohort`:
///
/// ```
/// use canopy_cohort::CohortId;
///
/// let id = CohortId::new(1, 4, 12);
/// assert_eq!(id.to_string(), "1:4:12");
/// assert_eq!("1:4:12".parse::<CohortId>().unwrap(), id);
/// ```
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CohortId {
    /// Stand identifier (`SID`).
    pub stand: u32,
    /// Patch identifier (`PID`).
    pub patch: PatchId,
    /// Cohort identifier within the patch (`IID`).
    pub cohort: u32,
}

impl CohortId {
    /// Create an identity from its three parts.
    pub const fn new(stand: u32, patch: PatchId, cohort: u32) -> Self {
        Self {
            stand,
            patch,
            cohort,
        }
    }
}

impl fmt::Display for CohortId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.stand, self.patch, self.cohort)
    }
}

impl FromStr for CohortId {
    type Err = ParseCohortIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.trim().split(':');
        let mut next = || -> Result<u32, ParseCohortIdError> {
            let part = parts
                .next()
                .ok_or_else(|| ParseCohortIdError::new(s))?;
            part.trim()
                .parse()
                .map_err(|_| ParseCohortIdError::new(s))
        };
        let id = Self::new(next()?, next()?, next()?);
        if parts.next().is_some() {
            return Err(ParseCohortIdError::new(s));
        }
        Ok(id)
    }
}
