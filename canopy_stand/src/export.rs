// Copyright 2026 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Delimited-text export of placed trees.

use std::collections::{BTreeMap, BTreeSet};
use std::io;

use canopy_cohort::columns;

use crate::manager::PatchManager;

/// Write one row per placed tree of every resolved year.
///
/// Columns are `x` and `y` (three decimals), the record columns, the opaque
/// simulation columns and the stand-level values of the row's year. Cells with no
/// value are left empty. Returns the number of tree rows written.
pub fn export_csv<W: io::Write>(
    manager: &PatchManager,
    writer: W,
    delimiter: u8,
) -> Result<usize, csv::Error> {
    let header = header(manager);
    let mut out = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .from_writer(writer);
    out.write_record(&header)?;

    let mut rows = 0;
    let mut line = Vec::with_capacity(header.len());
    for patch in manager.patches() {
        for cohort in patch.cohorts() {
            for (year, step) in cohort.time_steps() {
                if step.positions().is_empty() {
                    continue;
                }
                let mut values: BTreeMap<&str, f64> = step.record().fields().collect();
                if let Some(data) = manager.year_data(year) {
                    values.extend(data.iter().map(|(k, v)| (k.as_str(), *v)));
                }
                for p in step.positions().values() {
                    line.clear();
                    line.push(format!("{:.3}", p.x));
                    line.push(format!("{:.3}", p.y));
                    line.extend(
                        header[2..]
                            .iter()
                            .map(|name| values.get(name.as_str()).map(f64::to_string).unwrap_or_default()),
                    );
                    out.write_record(&line)?;
                    rows += 1;
                }
            }
        }
    }
    out.flush()?;
    tracing::debug!(rows, "exported tree positions");
    Ok(rows)
}

fn header(manager: &PatchManager) -> Vec<String> {
    let mut extra = BTreeSet::new();
    for patch in manager.patches() {
        for cohort in patch.cohorts() {
            for (_, step) in cohort.time_steps() {
                extra.extend(step.record().extra.keys().map(String::as_str));
            }
        }
    }
    let mut stand = BTreeSet::new();
    for year in manager.years() {
        if let Some(data) = manager.year_data(year) {
            stand.extend(data.keys().map(String::as_str));
        }
    }

    let mut header: Vec<String> = ["x", "y"]
        .into_iter()
        .chain(columns::KNOWN)
        .map(str::to_owned)
        .collect();
    for name in extra.into_iter().chain(stand) {
        if !header.iter().any(|h| h == name) {
            header.push(name.to_owned());
        }
    }
    header
}
