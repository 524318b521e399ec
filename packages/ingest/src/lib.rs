#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Loads taxi trips and neighborhoods from CSV into a [`Catalog`].
//!
//! Trip files are comma separated and every field is required: a row with
//! an unparseable timestamp or number aborts the whole load and leaves the
//! catalog untouched. Neighborhood files are semicolon separated with
//! decimal-comma coordinates; rows whose coordinates do not parse are
//! skipped and counted.
//!
//! [`Catalog`]: taxi_query_catalog::Catalog

pub mod neighborhoods;
pub mod progress;
pub mod trips;

use std::fs::File;
use std::path::Path;
use std::time::Instant;

pub use neighborhoods::{load_neighborhoods, load_neighborhoods_file};
pub use trips::{load_trips, load_trips_file};

/// Errors that abort a load.
#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    /// The source file does not exist.
    #[error("File not found: {0}")]
    NotFound(String),

    /// The source file exists but could not be read.
    #[error("I/O error reading {path}: {source}")]
    Io {
        /// Path of the file being read.
        path: String,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// The CSV structure is malformed (bad quoting, missing columns, ...).
    #[error("CSV error: {source}")]
    Csv {
        /// Underlying error.
        #[from]
        source: csv::Error,
    },

    /// A required numeric field did not parse.
    #[error("Line {line}: invalid {field} value {value:?}")]
    InvalidField {
        /// 1-based line number in the source, header included.
        line: u64,
        /// Column name.
        field: &'static str,
        /// Raw field text.
        value: String,
    },

    /// A pickup or dropoff timestamp did not match `YYYY-MM-DD HH:MM:SS`.
    #[error("Line {line}: invalid {field} timestamp {value:?}")]
    InvalidTimestamp {
        /// 1-based line number in the source, header included.
        line: u64,
        /// Column name.
        field: &'static str,
        /// Raw field text.
        value: String,
    },
}

/// Opens `path`, mapping a missing file to [`IngestError::NotFound`].
fn open_source(path: &Path) -> Result<File, IngestError> {
    if !path.exists() {
        return Err(IngestError::NotFound(path.display().to_string()));
    }

    File::open(path).map_err(|e| IngestError::Io {
        path: path.display().to_string(),
        source: e,
    })
}

fn elapsed_ms(start: Instant) -> f64 {
    start.elapsed().as_secs_f64() * 1000.0
}
