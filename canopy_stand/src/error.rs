// Copyright 2026 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Loading errors.

use core::fmt;
use std::path::PathBuf;

use canopy_cohort::{DataError, RecordError};

/// Failure to load simulation output.
///
/// Line numbers are 1-based and count the header line.
#[derive(Debug)]
pub enum LoadError {
    /// The input has no header line.
    MissingHeader,
    /// A value does not parse as a number.
    Value {
        /// Line of the value.
        line: usize,
        /// Column the value belongs to.
        column: String,
        /// Offending text.
        text: String,
    },
    /// A row has a different number of values than the header.
    ColumnCount {
        /// Line of the row.
        line: usize,
        /// Number of header columns.
        expected: usize,
        /// Number of values found.
        found: usize,
    },
    /// A row is missing a required column or holds a non-integral identifier.
    Record {
        /// Line of the row.
        line: usize,
        /// Underlying problem.
        source: RecordError,
    },
    /// A row conflicts with data loaded before it.
    Data {
        /// Line of the row.
        line: usize,
        /// Underlying problem.
        source: DataError,
    },
    /// Several files were given and none holds cohort rows.
    NoCohortFile,
    /// A file could not be read.
    Io {
        /// File being read.
        path: PathBuf,
        /// Underlying problem.
        source: std::io::Error,
    },
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingHeader => f.write_str("input has no header line"),
            Self::Value { line, column, text } => {
                write!(f, "line {line}, column {column}: `{text}` is not a number")
            }
            Self::ColumnCount {
                line,
                expected,
                found,
            } => write!(f, "line {line}: expected {expected} values, found {found}"),
            Self::Record { line, source } => write!(f, "line {line}: {source}"),
            Self::Data { line, source } => write!(f, "line {line}: {source}"),
            Self::NoCohortFile => f.write_str("no file name contains `veg_struct`"),
            Self::Io { path, source } => write!(f, "{}: {source}", path.display()),
        }
    }
}

impl core::error::Error for LoadError {
    fn source(&self) -> Option<&(dyn core::error::Error + 'static)> {
        match self {
            Self::Record { source, .. } => Some(source),
            Self::Data { source, .. } => Some(source),
            Self::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}
