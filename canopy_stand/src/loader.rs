// Copyright 2026 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Whitespace-delimited simulation output.
//!
//! Every file starts with a header line of column names followed by one line of
//! numbers per row. Columns are separated by runs of spaces or tabs; blank lines are
//! skipped.

use std::path::Path;

use canopy_cohort::{CohortRecord, RecordError, Year, columns};

use crate::config::StandConfig;
use crate::error::LoadError;
use crate::manager::PatchManager;

/// Marker in the name of the file holding cohort rows.
pub const COHORT_FILE_MARKER: &str = "veg_struct";

/// Parsed table: column names and numbered rows.
#[derive(Clone, Debug, PartialEq)]
pub struct Table {
    /// Column names in file order.
    pub header: Vec<String>,
    /// Line number and values of each row.
    pub rows: Vec<(usize, Vec<f64>)>,
}

impl Table {
    /// Parse a whole file.
    pub fn parse(text: &str) -> Result<Self, LoadError> {
        let mut lines = text
            .lines()
            .enumerate()
            .map(|(i, l)| (i + 1, l))
            .filter(|(_, l)| !l.trim().is_empty());
        let (_, first) = lines.next().ok_or(LoadError::MissingHeader)?;
        let header: Vec<String> = first.split_whitespace().map(str::to_owned).collect();

        let mut rows = Vec::new();
        for (line, text) in lines {
            let fields: Vec<&str> = text.split_whitespace().collect();
            if fields.len() != header.len() {
                return Err(LoadError::ColumnCount {
                    line,
                    expected: header.len(),
                    found: fields.len(),
                });
            }
            let values = fields
                .iter()
                .zip(&header)
                .map(|(field, column)| {
                    field.parse::<f64>().map_err(|_| LoadError::Value {
                        line,
                        column: column.clone(),
                        text: (*field).to_owned(),
                    })
                })
                .collect::<Result<Vec<f64>, _>>()?;
            rows.push((line, values));
        }
        Ok(Self { header, rows })
    }
}

/// Add every cohort row of `text` to `manager`. Returns the number of rows added.
pub fn load_cohorts(manager: &mut PatchManager, text: &str) -> Result<usize, LoadError> {
    let table = Table::parse(text)?;
    for (line, values) in &table.rows {
        let record = CohortRecord::from_columns(&table.header, values)
            .map_err(|source| LoadError::Record { line: *line, source })?;
        manager
            .add_data(record)
            .map_err(|source| LoadError::Data { line: *line, source })?;
    }
    Ok(table.rows.len())
}

/// Add every stand-level row of `text` to `manager`. Returns the number of rows added.
pub fn load_year_data(manager: &mut PatchManager, text: &str) -> Result<usize, LoadError> {
    let table = Table::parse(text)?;
    let year_column = table
        .header
        .iter()
        .position(|h| h == columns::YEAR)
        .ok_or(LoadError::Record {
            line: 1,
            source: RecordError::MissingColumn(columns::YEAR),
        })?;
    for (line, values) in &table.rows {
        let year = to_year(values[year_column]).ok_or(LoadError::Record {
            line: *line,
            source: RecordError::NotAnInteger {
                column: columns::YEAR,
                value: values[year_column],
            },
        })?;
        let named = table.header.iter().cloned().zip(values.iter().copied());
        manager.add_year_data(year, named);
    }
    Ok(table.rows.len())
}

/// Load a dataset from a set of files into a new registry.
///
/// With a single file, that file holds the cohort rows. Otherwise the first file whose
/// name contains [`COHORT_FILE_MARKER`] does, and every other file holds stand-level
/// rows. The dataset is named after the cohort file without its extension.
pub fn load_dataset<P: AsRef<Path>>(
    paths: &[P],
    config: StandConfig,
) -> Result<PatchManager, LoadError> {
    let cohort_file = match paths {
        [_] => 0,
        _ => paths
            .iter()
            .position(|p| {
                p.as_ref()
                    .file_name()
                    .is_some_and(|n| n.to_string_lossy().contains(COHORT_FILE_MARKER))
            })
            .ok_or(LoadError::NoCohortFile)?,
    };

    let mut manager = PatchManager::new(config);
    let path = paths[cohort_file].as_ref();
    if let Some(stem) = path.file_stem() {
        manager.set_dataset_name(stem.to_string_lossy());
    }
    let rows = load_cohorts(&mut manager, &read(path)?)?;
    tracing::info!(path = %path.display(), rows, "loaded cohort rows");

    for (i, p) in paths.iter().enumerate() {
        if i == cohort_file {
            continue;
        }
        let path = p.as_ref();
        let rows = load_year_data(&mut manager, &read(path)?)?;
        tracing::info!(path = %path.display(), rows, "loaded stand rows");
    }
    Ok(manager)
}

fn read(path: &Path) -> Result<String, LoadError> {
    std::fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_owned(),
        source,
    })
}

fn to_year(value: f64) -> Option<Year> {
    if value.fract() != 0.0 || !(f64::from(Year::MIN)..=f64::from(Year::MAX)).contains(&value) {
        return None;
    }
    #[allow(
        clippy::cast_possible_truncation,
        reason = "Range and integrality are checked above."
    )]
    let year = value as Year;
    Some(year)
}

#[cfg(test)]
mod tests {
    use super::*;
    use canopy_cohort::{CohortId, DataError};

    const COHORTS: &str = "\
Lon   Lat  Year SID PID IID PFT Height Boleht Diam CrownA DensI Px Py Pheight  LAI
12.5 55.7  1901   1   0   7   3   18.0    7.0 0.35  12.57 0.002  0  1     3.0  1.2

12.5 55.7  1902   1   0   7   3   18.5    7.1 0.36  12.90 0.002  0  1     3.0  1.3
12.5 55.7  1901   1   1   2   0    0.0    0.0 0.00   1.00 1.000  1  1     2.0  0.1
";

    #[test]
    fn parse_skips_blank_lines_and_keeps_line_numbers() {
        let table = Table::parse(COHORTS).unwrap();
        assert_eq!(table.header.len(), 16);
        assert_eq!(table.rows.len(), 3);
        assert_eq!(table.rows[1].0, 4);
        assert_eq!(table.rows[0].1[15], 1.2);
    }

    #[test]
    fn cohorts_load_into_patches() {
        let mut m = PatchManager::default();
        assert_eq!(load_cohorts(&mut m, COHORTS).unwrap(), 3);
        assert_eq!(m.patches().len(), 2);
        assert_eq!(m.years().collect::<Vec<_>>(), [1901, 1902]);
        let c = m.get_cohort_by_id(CohortId::new(1, 0, 7)).unwrap();
        assert_eq!(c.timestep(1902).unwrap().record().extra["LAI"], 1.3);
        assert!(m.get_cohort_by_id(CohortId::new(1, 1, 2)).unwrap().is_grass());
        assert_eq!(m.patch(1).unwrap().base_height(), 2.0);
    }

    #[test]
    fn errors_name_line_and_column() {
        let mut m = PatchManager::default();
        let err = load_cohorts(&mut m, "Year SID PID\n1901 1 x\n").unwrap_err();
        assert!(matches!(
            err,
            LoadError::Value { line: 2, ref column, ref text } if column == "PID" && text == "x"
        ));

        let err = load_cohorts(&mut m, "Year SID PID\n1901 1\n").unwrap_err();
        assert!(matches!(
            err,
            LoadError::ColumnCount {
                line: 2,
                expected: 3,
                found: 2
            }
        ));

        let err = load_cohorts(&mut m, "Year SID PID\n1901 1 2\n").unwrap_err();
        assert!(matches!(
            err,
            LoadError::Record {
                line: 2,
                source: RecordError::MissingColumn("IID")
            }
        ));

        let err = load_cohorts(&mut m, "").unwrap_err();
        assert!(matches!(err, LoadError::MissingHeader));
    }

    #[test]
    fn duplicate_rows_report_their_line() {
        let mut m = PatchManager::default();
        let text = format!("{COHORTS}12.5 55.7 1901 1 0 7 3 1 1 1 1 1 0 1 3 1\n");
        let err = load_cohorts(&mut m, &text).unwrap_err();
        assert!(matches!(
            err,
            LoadError::Data {
                line: 6,
                source: DataError::DuplicateTimestep { year: 1901, .. }
            }
        ));
    }

    #[test]
    fn year_data_requires_integral_years() {
        let mut m = PatchManager::default();
        let rows = load_year_data(&mut m, "Year Temp\n1901 3.5\n1902 4.0\n").unwrap();
        assert_eq!(rows, 2);
        assert_eq!(m.year_data(1902).unwrap()["Temp"], 4.0);

        let err = load_year_data(&mut m, "Year Temp\n1901.5 3.5\n").unwrap_err();
        assert!(matches!(err, LoadError::Record { line: 2, .. }));
        let err = load_year_data(&mut m, "Temp\n3.5\n").unwrap_err();
        assert!(matches!(err, LoadError::Record { line: 1, .. }));
    }

    #[test]
    fn dataset_picks_cohort_file_by_name() {
        let dir = std::env::temp_dir().join(format!("canopy_loader_{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let cohorts = dir.join("run1_veg_struct.out");
        let climate = dir.join("climate.out");
        std::fs::write(&cohorts, COHORTS).unwrap();
        std::fs::write(&climate, "Year Temp\n1901 3.5\n").unwrap();

        let m = load_dataset(&[&climate, &cohorts], StandConfig::default()).unwrap();
        assert_eq!(m.dataset_name(), Some("run1_veg_struct"));
        assert_eq!(m.year_data(1901).unwrap()["Temp"], 3.5);
        assert_eq!(m.patches().len(), 2);

        let single = load_dataset(&[&cohorts], StandConfig::default()).unwrap();
        assert_eq!(single.patches().len(), 2);

        let err = load_dataset(&[&climate, &climate], StandConfig::default()).unwrap_err();
        assert!(matches!(err, LoadError::NoCohortFile));
        std::fs::remove_dir_all(&dir).unwrap();
    }
}
