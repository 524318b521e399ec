//! Trip file loading.

use std::io::Read;
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Instant;

use serde::Deserialize;
use taxi_query_analytics_models::{LOAD_PREVIEW_SIZE, TripLoadSummary, TripSummaryRow};
use taxi_query_catalog::Catalog;
use taxi_query_trip_models::{TripRecord, normalize_payment_type, parse_timestamp};

use crate::progress::{ProgressCallback, null_progress};
use crate::{IngestError, elapsed_ms, open_source};

/// A raw row from a trip CSV file.
///
/// Every column is read as text so a parse failure can name the field and
/// line it came from. Columns not listed here are ignored.
#[derive(Debug, Deserialize)]
pub struct RawTripRecord {
    pub pickup_datetime: String,
    pub dropoff_datetime: String,
    pub passenger_count: String,
    pub payment_type: String,
    pub trip_distance: String,
    pub fare_amount: String,
    pub tip_amount: String,
    pub tolls_amount: String,
    pub total_amount: String,
    pub pickup_longitude: String,
    pub pickup_latitude: String,
    pub dropoff_longitude: String,
    pub dropoff_latitude: String,
}

impl RawTripRecord {
    /// Converts this raw row into a [`TripRecord`].
    ///
    /// # Errors
    ///
    /// * [`IngestError::InvalidTimestamp`] if either timestamp does not parse
    /// * [`IngestError::InvalidField`] if a numeric column does not parse
    pub fn to_trip(&self, line: u64) -> Result<TripRecord, IngestError> {
        let base = TripRecord::new(&self.pickup_datetime, &self.dropoff_datetime)
            .ok_or_else(|| self.timestamp_error(line))?;

        Ok(TripRecord {
            passenger_count: parse_field(&self.passenger_count, "passenger_count", line)?,
            payment_type: normalize_payment_type(&self.payment_type),
            trip_distance: parse_field(&self.trip_distance, "trip_distance", line)?,
            fare_amount: parse_field(&self.fare_amount, "fare_amount", line)?,
            tip_amount: parse_field(&self.tip_amount, "tip_amount", line)?,
            tolls_amount: parse_field(&self.tolls_amount, "tolls_amount", line)?,
            total_amount: parse_field(&self.total_amount, "total_amount", line)?,
            pickup_longitude: parse_field(&self.pickup_longitude, "pickup_longitude", line)?,
            pickup_latitude: parse_field(&self.pickup_latitude, "pickup_latitude", line)?,
            dropoff_longitude: parse_field(&self.dropoff_longitude, "dropoff_longitude", line)?,
            dropoff_latitude: parse_field(&self.dropoff_latitude, "dropoff_latitude", line)?,
            ..base
        })
    }

    fn timestamp_error(&self, line: u64) -> IngestError {
        let (field, value) = if parse_timestamp(&self.pickup_datetime).is_none() {
            ("pickup_datetime", &self.pickup_datetime)
        } else {
            ("dropoff_datetime", &self.dropoff_datetime)
        };

        IngestError::InvalidTimestamp {
            line,
            field,
            value: value.clone(),
        }
    }
}

fn parse_field<T: FromStr>(raw: &str, field: &'static str, line: u64) -> Result<T, IngestError> {
    raw.trim().parse().map_err(|_| IngestError::InvalidField {
        line,
        field,
        value: raw.to_string(),
    })
}

/// Loads every trip from `reader` into `catalog`.
///
/// # Errors
///
/// See [`load_trips_with_progress`].
pub fn load_trips(catalog: &mut Catalog, reader: impl Read) -> Result<TripLoadSummary, IngestError> {
    load_trips_with_progress(catalog, reader, &null_progress())
}

/// Loads every trip from `reader` into `catalog`, reporting one unit of
/// progress per row.
///
/// Rows are staged and only appended once the whole source has parsed, so
/// on error the catalog is left exactly as it was.
///
/// # Errors
///
/// * [`IngestError::Csv`] if the CSV is malformed or a column is missing
/// * [`IngestError::InvalidTimestamp`] / [`IngestError::InvalidField`] if
///   any row has an unparseable value
pub fn load_trips_with_progress(
    catalog: &mut Catalog,
    reader: impl Read,
    progress: &Arc<dyn ProgressCallback>,
) -> Result<TripLoadSummary, IngestError> {
    let start = Instant::now();

    let staged = read_trips(reader, progress).inspect_err(|_| progress.finish_and_clear())?;

    let loaded = staged.len();
    let (shortest, longest) = distance_extremes(&staged);
    let shortest = shortest.map(TripSummaryRow::from);
    let longest = longest.map(TripSummaryRow::from);
    let first = staged
        .iter()
        .take(LOAD_PREVIEW_SIZE)
        .map(TripSummaryRow::from)
        .collect();
    let last = staged[loaded.saturating_sub(LOAD_PREVIEW_SIZE)..]
        .iter()
        .map(TripSummaryRow::from)
        .collect();

    catalog.extend_trips(staged);

    let elapsed_ms = elapsed_ms(start);
    log::info!("Loaded {loaded} trips in {elapsed_ms:.3} ms");
    progress.finish(format!("Loaded {loaded} trips"));

    Ok(TripLoadSummary {
        loaded,
        elapsed_ms,
        shortest,
        longest,
        first,
        last,
    })
}

/// Loads the trip CSV at `path` into `catalog`.
///
/// # Errors
///
/// * [`IngestError::NotFound`] / [`IngestError::Io`] if the file cannot be
///   opened
/// * anything [`load_trips_with_progress`] returns
pub fn load_trips_file(
    catalog: &mut Catalog,
    path: &Path,
    progress: &Arc<dyn ProgressCallback>,
) -> Result<TripLoadSummary, IngestError> {
    log::info!("Loading trips from {}", path.display());
    let file = open_source(path)?;
    load_trips_with_progress(catalog, file, progress)
}

fn read_trips(
    reader: impl Read,
    progress: &Arc<dyn ProgressCallback>,
) -> Result<Vec<TripRecord>, IngestError> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    let headers = csv_reader.headers()?.clone();
    let mut trips = Vec::new();

    for result in csv_reader.records() {
        let record = result?;
        let line = record.position().map_or(0, csv::Position::line);
        let raw: RawTripRecord = record.deserialize(Some(&headers))?;
        trips.push(raw.to_trip(line)?);
        progress.inc(1);
    }

    Ok(trips)
}

/// Shortest trip with a positive distance and longest trip. Ties keep the
/// earliest row.
fn distance_extremes(trips: &[TripRecord]) -> (Option<&TripRecord>, Option<&TripRecord>) {
    let mut shortest: Option<&TripRecord> = None;
    let mut longest: Option<&TripRecord> = None;

    for trip in trips {
        let distance = trip.trip_distance;
        if distance > 0.0 && shortest.is_none_or(|s| distance < s.trip_distance) {
            shortest = Some(trip);
        }
        if longest.is_none_or(|l| distance > l.trip_distance) {
            longest = Some(trip);
        }
    }

    (shortest, longest)
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    /// Records every progress call.
    #[derive(Default)]
    struct RecordingProgress {
        rows: Mutex<u64>,
        finished: Mutex<Option<String>>,
        cleared: Mutex<bool>,
    }

    impl ProgressCallback for RecordingProgress {
        fn inc(&self, delta: u64) {
            *self.rows.lock().unwrap() += delta;
        }

        fn finish(&self, msg: String) {
            *self.finished.lock().unwrap() = Some(msg);
        }

        fn finish_and_clear(&self) {
            *self.cleared.lock().unwrap() = true;
        }
    }

    const HEADER: &str = "pickup_datetime,dropoff_datetime,passenger_count,trip_distance,\
        pickup_longitude,pickup_latitude,rate_code,store_and_fwd_flag,dropoff_longitude,\
        dropoff_latitude,payment_type,fare_amount,extra,mta_tax,tip_amount,tolls_amount,\
        improvement_surcharge,total_amount";

    fn row(pickup: &str, dropoff: &str, distance: &str, total: &str) -> String {
        format!(
            "{pickup},{dropoff},1,{distance},-73.993896,40.750111,1,N,-73.974785,40.750618,\
             credit_card,12,1,0.5,3.25,0,0.3,{total}"
        )
    }

    fn csv_of(rows: &[String]) -> String {
        let mut csv = String::from(HEADER);
        for row in rows {
            csv.push('\n');
            csv.push_str(row);
        }
        csv.push('\n');
        csv
    }

    #[test]
    fn loads_all_fields() {
        let csv = csv_of(&[row("2015-01-15 19:05:39", "2015-01-15 19:23:42", "1.59", "17.05")]);
        let mut catalog = Catalog::new();

        let summary = load_trips(&mut catalog, csv.as_bytes()).unwrap();
        assert_eq!(summary.loaded, 1);
        assert_eq!(catalog.trips().size(), 1);

        let trip = catalog.trip(0).unwrap();
        assert_eq!(trip.pickup_datetime, "2015-01-15 19:05:39");
        assert_eq!(trip.pickup_hour, 19);
        assert_eq!(trip.passenger_count, 1);
        assert_eq!(trip.payment_type, "CREDIT_CARD");
        assert!((trip.trip_distance - 1.59).abs() < 1e-9);
        assert!((trip.tip_amount - 3.25).abs() < 1e-9);
        assert!((trip.total_amount - 17.05).abs() < 1e-9);
        assert!((trip.pickup_latitude - 40.750_111).abs() < 1e-9);
        assert!((trip.dropoff_longitude - -73.974_785).abs() < 1e-9);
        assert!((trip.duration_min - 18.05).abs() < 1e-9);
    }

    #[test]
    fn summary_previews_and_extremes() {
        let rows: Vec<String> = (0..7)
            .map(|i| {
                let distance = match i {
                    2 => "0".to_string(),
                    4 => "9.5".to_string(),
                    _ => format!("{}.25", i + 1),
                };
                row(
                    &format!("2016-01-0{} 10:00:00", i + 1),
                    &format!("2016-01-0{} 10:30:00", i + 1),
                    &distance,
                    "10",
                )
            })
            .collect();
        let mut catalog = Catalog::new();

        let summary = load_trips(&mut catalog, csv_of(&rows).as_bytes()).unwrap();
        assert_eq!(summary.loaded, 7);
        assert_eq!(catalog.trips().size(), 7);
        assert_eq!(summary.first.len(), 5);
        assert_eq!(summary.last.len(), 5);
        assert_eq!(summary.first[0].pickup_datetime, "2016-01-01 10:00:00");
        assert_eq!(summary.last[4].pickup_datetime, "2016-01-07 10:00:00");
        assert!((summary.first[0].duration_min - 30.0).abs() < 1e-9);

        let shortest = summary.shortest.unwrap();
        assert_eq!(shortest.pickup_datetime, "2016-01-01 10:00:00");
        let longest = summary.longest.unwrap();
        assert!((longest.trip_distance - 9.5).abs() < 1e-9);
    }

    #[test]
    fn empty_source_loads_nothing() {
        let mut catalog = Catalog::new();
        let summary = load_trips(&mut catalog, csv_of(&[]).as_bytes()).unwrap();
        assert_eq!(summary.loaded, 0);
        assert!(summary.shortest.is_none());
        assert!(summary.longest.is_none());
        assert!(summary.first.is_empty());
    }

    #[test]
    fn bad_number_aborts_and_leaves_catalog_unchanged() {
        let csv = csv_of(&[
            row("2015-01-15 19:05:39", "2015-01-15 19:23:42", "1.59", "17.05"),
            row("2015-01-15 19:10:00", "2015-01-15 19:20:00", "abc", "8.00"),
        ]);
        let mut catalog = Catalog::new();

        let err = load_trips(&mut catalog, csv.as_bytes()).unwrap_err();
        match err {
            IngestError::InvalidField { line, field, value } => {
                assert_eq!(line, 3);
                assert_eq!(field, "trip_distance");
                assert_eq!(value, "abc");
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(catalog.trips().is_empty());
    }

    #[test]
    fn bad_timestamp_names_field() {
        let csv = csv_of(&[row("2015-01-15 19:05:39", "15/01/2015 19:23", "1.59", "17.05")]);
        let mut catalog = Catalog::new();

        let err = load_trips(&mut catalog, csv.as_bytes()).unwrap_err();
        assert!(matches!(
            err,
            IngestError::InvalidTimestamp {
                line: 2,
                field: "dropoff_datetime",
                ..
            }
        ));
    }

    #[test]
    fn missing_column_is_csv_error() {
        let csv = "pickup_datetime,dropoff_datetime\n2015-01-15 19:05:39,2015-01-15 19:23:42\n";
        let mut catalog = Catalog::new();

        let err = load_trips(&mut catalog, csv.as_bytes()).unwrap_err();
        assert!(matches!(err, IngestError::Csv { .. }));
    }

    #[test]
    fn loads_from_file() {
        let path = std::env::temp_dir().join("taxi_query_ingest_trips_test.csv");
        let csv = csv_of(&[
            row("2016-01-01 07:40:00", "2016-01-01 08:15:02", "3.1", "14.3"),
            row("2016-01-01 07:50:00", "2016-01-01 08:05:00", "1.2", "7.8"),
        ]);
        std::fs::write(&path, csv).unwrap();

        let mut catalog = Catalog::new();
        let summary = load_trips_file(&mut catalog, &path, &null_progress()).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(summary.loaded, 2);
        assert_eq!(catalog.trips().size(), 2);
    }

    #[test]
    fn progress_counts_rows_and_finishes() {
        let csv = csv_of(&[
            row("2016-01-01 07:40:00", "2016-01-01 08:15:02", "3.1", "14.3"),
            row("2016-01-01 07:50:00", "2016-01-01 08:05:00", "1.2", "7.8"),
            row("2016-01-01 08:10:00", "2016-01-01 08:25:00", "2.2", "9.1"),
        ]);
        let recorder = Arc::new(RecordingProgress::default());
        let progress: Arc<dyn ProgressCallback> = recorder.clone();

        load_trips_with_progress(&mut Catalog::new(), csv.as_bytes(), &progress).unwrap();

        assert_eq!(*recorder.rows.lock().unwrap(), 3);
        assert_eq!(
            recorder.finished.lock().unwrap().as_deref(),
            Some("Loaded 3 trips")
        );
        assert!(!*recorder.cleared.lock().unwrap());
    }

    #[test]
    fn progress_is_cleared_on_failure() {
        let csv = csv_of(&[row("2016-01-01 07:40:00", "not a time", "3.1", "14.3")]);
        let recorder = Arc::new(RecordingProgress::default());
        let progress: Arc<dyn ProgressCallback> = recorder.clone();

        load_trips_with_progress(&mut Catalog::new(), csv.as_bytes(), &progress).unwrap_err();

        assert!(*recorder.cleared.lock().unwrap());
        assert!(recorder.finished.lock().unwrap().is_none());
    }
}
