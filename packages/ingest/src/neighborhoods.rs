//! Neighborhood file loading.
//!
//! The file is `;`-separated with the columns
//! `borough;neighborhood;latitude;longitude`. Coordinates may use either a
//! decimal comma (`40,7188`) or a decimal point.

use std::io::Read;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use csv::StringRecord;
use taxi_query_analytics_models::{LOAD_PREVIEW_SIZE, NeighborhoodLoadSummary};
use taxi_query_catalog::Catalog;
use taxi_query_trip_models::NeighborhoodRecord;

use crate::progress::{ProgressCallback, null_progress};
use crate::{IngestError, elapsed_ms, open_source};

/// Field separator of neighborhood files.
pub const NEIGHBORHOOD_DELIMITER: u8 = b';';

/// Positions of the known columns in a neighborhood file header.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct Columns {
    borough: Option<usize>,
    neighborhood: Option<usize>,
    latitude: Option<usize>,
    longitude: Option<usize>,
}

impl Columns {
    fn from_headers(headers: &StringRecord) -> Self {
        let position = |name: &str| headers.iter().position(|header| header.trim() == name);

        Self {
            borough: position("borough"),
            neighborhood: position("neighborhood"),
            latitude: position("latitude"),
            longitude: position("longitude"),
        }
    }
}

/// A raw row from a neighborhood file. Fields absent from the row (short
/// rows, unknown columns) are empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawNeighborhoodRecord {
    pub borough: String,
    pub neighborhood: String,
    pub latitude: String,
    pub longitude: String,
}

impl RawNeighborhoodRecord {
    fn from_record(record: &StringRecord, columns: Columns) -> Self {
        let field = |column: Option<usize>| {
            column
                .and_then(|i| record.get(i))
                .unwrap_or_default()
                .to_string()
        };

        Self {
            borough: field(columns.borough),
            neighborhood: field(columns.neighborhood),
            latitude: field(columns.latitude),
            longitude: field(columns.longitude),
        }
    }

    /// Converts this raw row into a neighborhood.
    ///
    /// Returns `None` if either coordinate is not a finite number.
    #[must_use]
    pub fn to_neighborhood(&self) -> Option<NeighborhoodRecord> {
        Some(NeighborhoodRecord {
            borough: self.borough.trim().to_string(),
            neighborhood: self.neighborhood.trim().to_string(),
            latitude: parse_coordinate(&self.latitude)?,
            longitude: parse_coordinate(&self.longitude)?,
        })
    }
}

/// Parses a coordinate written with a decimal comma or a decimal point.
#[must_use]
pub fn parse_coordinate(raw: &str) -> Option<f64> {
    raw.trim()
        .replace(',', ".")
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
}

/// Loads every neighborhood from `reader` into `catalog`.
///
/// # Errors
///
/// See [`load_neighborhoods_with_progress`].
pub fn load_neighborhoods(
    catalog: &mut Catalog,
    reader: impl Read,
) -> Result<NeighborhoodLoadSummary, IngestError> {
    load_neighborhoods_with_progress(catalog, reader, &null_progress())
}

/// Loads every neighborhood from `reader` into `catalog`.
///
/// Rows whose coordinates are missing or do not parse are skipped and
/// counted, never reported individually.
///
/// # Errors
///
/// Returns [`IngestError::Csv`] if the file itself is malformed.
pub fn load_neighborhoods_with_progress(
    catalog: &mut Catalog,
    reader: impl Read,
    progress: &Arc<dyn ProgressCallback>,
) -> Result<NeighborhoodLoadSummary, IngestError> {
    let start = Instant::now();

    let (staged, skipped) =
        read_neighborhoods(reader, progress).inspect_err(|_| progress.finish_and_clear())?;

    let loaded = staged.len();
    let first = staged.iter().take(LOAD_PREVIEW_SIZE).cloned().collect();
    catalog.extend_neighborhoods(staged);

    let elapsed_ms = elapsed_ms(start);
    if loaded == 0 {
        log::warn!(
            "No neighborhoods loaded; expected ';'-separated columns \
             borough;neighborhood;latitude;longitude"
        );
    } else {
        log::info!("Loaded {loaded} neighborhoods ({skipped} skipped) in {elapsed_ms:.3} ms");
    }
    progress.finish(format!("Loaded {loaded} neighborhoods"));

    Ok(NeighborhoodLoadSummary {
        loaded,
        skipped,
        elapsed_ms,
        first,
    })
}

/// Loads the neighborhood file at `path` into `catalog`.
///
/// # Errors
///
/// * [`IngestError::NotFound`] / [`IngestError::Io`] if the file cannot be
///   opened
/// * [`IngestError::Csv`] if the file is malformed
pub fn load_neighborhoods_file(
    catalog: &mut Catalog,
    path: &Path,
    progress: &Arc<dyn ProgressCallback>,
) -> Result<NeighborhoodLoadSummary, IngestError> {
    log::info!("Loading neighborhoods from {}", path.display());
    let file = open_source(path)?;
    load_neighborhoods_with_progress(catalog, file, progress)
}

fn read_neighborhoods(
    reader: impl Read,
    progress: &Arc<dyn ProgressCallback>,
) -> Result<(Vec<NeighborhoodRecord>, usize), IngestError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .delimiter(NEIGHBORHOOD_DELIMITER)
        .flexible(true)
        .from_reader(reader);
    let columns = Columns::from_headers(csv_reader.headers()?);

    let mut neighborhoods = Vec::new();
    let mut skipped = 0;

    for result in csv_reader.records() {
        let record = result?;
        let raw = RawNeighborhoodRecord::from_record(&record, columns);

        if let Some(neighborhood) = raw.to_neighborhood() {
            neighborhoods.push(neighborhood);
        } else {
            skipped += 1;
            log::debug!(
                "Skipping neighborhood row {}: unparseable coordinates ({:?}, {:?})",
                record.position().map_or(0, csv::Position::line),
                raw.latitude,
                raw.longitude
            );
        }
        progress.inc(1);
    }

    Ok((neighborhoods, skipped))
}
