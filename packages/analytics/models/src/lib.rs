#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Parameter and result types for the trip query engine.
//!
//! Query results never expose [`TripRecord`] directly. Matches are projected
//! into [`TripRow`] values with coordinates, distances, and amounts rounded
//! for display.

use std::convert::Infallible;
use std::str::FromStr;

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};
use taxi_query_trip_models::{NeighborhoodRecord, TripRecord, round_to};

/// Number of records shown in load previews.
pub const LOAD_PREVIEW_SIZE: usize = 5;

/// Decimal places kept for projected coordinates.
pub const COORDINATE_PLACES: i32 = 6;
/// Decimal places kept for projected distances.
pub const DISTANCE_PLACES: i32 = 3;
/// Decimal places kept for projected amounts and durations.
pub const AMOUNT_PLACES: i32 = 2;

/// Requested size of the "first" and "last" result windows.
///
/// Always positive. Missing, non-numeric, zero, and negative inputs all
/// coerce to [`SampleSize::DEFAULT`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "i64", into = "usize")]
pub struct SampleSize(usize);

impl SampleSize {
    pub const DEFAULT: Self = Self(5);

    #[must_use]
    pub const fn new(n: usize) -> Self {
        if n == 0 { Self::DEFAULT } else { Self(n) }
    }

    /// Coerces a signed count, replacing non-positive values with the
    /// default.
    #[must_use]
    pub fn from_count(n: i64) -> Self {
        usize::try_from(n).map_or(Self::DEFAULT, Self::new)
    }

    /// Coerces optional user input.
    #[must_use]
    pub fn parse(input: Option<&str>) -> Self {
        input
            .and_then(|s| s.trim().parse::<i64>().ok())
            .map_or(Self::DEFAULT, Self::from_count)
    }

    #[must_use]
    pub const fn get(self) -> usize {
        self.0
    }

    /// Rows in both windows together (`2N`), saturating at `usize::MAX`.
    #[must_use]
    pub const fn both_ends(self) -> usize {
        self.0.saturating_mul(2)
    }
}

impl Default for SampleSize {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl std::fmt::Display for SampleSize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for SampleSize {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(Some(s)))
    }
}

impl From<i64> for SampleSize {
    fn from(n: i64) -> Self {
        Self::from_count(n)
    }
}

impl From<SampleSize> for usize {
    fn from(size: SampleSize) -> Self {
        size.0
    }
}

/// Which side of the reference time a dropoff must fall on.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(ascii_case_insensitive)]
pub enum TimeMode {
    /// Strictly earlier than the reference time.
    #[strum(to_string = "BEFORE", serialize = "ANTES")]
    Before,
    /// Strictly later than the reference time.
    #[strum(to_string = "AFTER", serialize = "DESPUES")]
    After,
}

impl TimeMode {
    pub const ALL: &[Self] = &[Self::Before, Self::After];

    /// Whether `time` is on this side of `reference`. Times equal to the
    /// reference are on neither side.
    #[must_use]
    pub fn keeps(self, time: NaiveTime, reference: NaiveTime) -> bool {
        match self {
            Self::Before => time < reference,
            Self::After => time > reference,
        }
    }
}

/// Inclusive range of hours of the day.
///
/// When `start > end` the range wraps through midnight, so `22..=3` holds
/// 22, 23, 0, 1, 2 and 3.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HourRange {
    pub start: u32,
    pub end: u32,
}

impl HourRange {
    #[must_use]
    pub const fn new(start: u32, end: u32) -> Self {
        Self { start, end }
    }

    #[must_use]
    pub const fn wraps(self) -> bool {
        self.start > self.end
    }

    #[must_use]
    pub const fn contains(self, hour: u32) -> bool {
        if self.wraps() {
            hour >= self.start || hour <= self.end
        } else {
            self.start <= hour && hour <= self.end
        }
    }
}

/// Display projection of a matching trip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TripRow {
    pub pickup_datetime: String,
    /// `[latitude, longitude]` of the pickup.
    pub pickup_coordinates: [f64; 2],
    pub dropoff_datetime: String,
    /// `[latitude, longitude]` of the dropoff.
    pub dropoff_coordinates: [f64; 2],
    /// Miles.
    pub trip_distance: f64,
    /// USD.
    pub total_amount: f64,
}

impl From<&TripRecord> for TripRow {
    fn from(trip: &TripRecord) -> Self {
        Self {
            pickup_datetime: trip.pickup_datetime.clone(),
            pickup_coordinates: [
                round_to(trip.pickup_latitude, COORDINATE_PLACES),
                round_to(trip.pickup_longitude, COORDINATE_PLACES),
            ],
            dropoff_datetime: trip.dropoff_datetime.clone(),
            dropoff_coordinates: [
                round_to(trip.dropoff_latitude, COORDINATE_PLACES),
                round_to(trip.dropoff_longitude, COORDINATE_PLACES),
            ],
            trip_distance: round_to(trip.trip_distance, DISTANCE_PLACES),
            total_amount: round_to(trip.total_amount, AMOUNT_PLACES),
        }
    }
}

/// Outcome of one query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryResult {
    /// Wall time spent in the query, in milliseconds.
    pub elapsed_ms: f64,
    /// Number of trips matching the query.
    pub total: usize,
    pub sample_size: SampleSize,
    /// Leading matches in query order.
    pub first: Vec<TripRow>,
    /// Trailing matches in query order. Identical to `first` when
    /// [`QueryResult::shows_all`] holds.
    pub last: Vec<TripRow>,
}

impl QueryResult {
    /// Whether every match fits in `first` (`total <= 2N`), in which case
    /// `last` repeats it and should not be shown twice.
    #[must_use]
    pub const fn shows_all(&self) -> bool {
        self.total <= self.sample_size.both_ends()
    }
}

/// Compact projection of a trip used in load summaries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TripSummaryRow {
    pub pickup_datetime: String,
    pub dropoff_datetime: String,
    /// Minutes.
    pub duration_min: f64,
    /// Miles.
    pub trip_distance: f64,
    /// USD.
    pub total_amount: f64,
}

impl From<&TripRecord> for TripSummaryRow {
    fn from(trip: &TripRecord) -> Self {
        Self {
            pickup_datetime: trip.pickup_datetime.clone(),
            dropoff_datetime: trip.dropoff_datetime.clone(),
            duration_min: round_to(trip.duration_min, AMOUNT_PLACES),
            trip_distance: round_to(trip.trip_distance, DISTANCE_PLACES),
            total_amount: round_to(trip.total_amount, AMOUNT_PLACES),
        }
    }
}

/// Result of loading the trip file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TripLoadSummary {
    pub loaded: usize,
    pub elapsed_ms: f64,
    /// Shortest trip with a positive distance.
    pub shortest: Option<TripSummaryRow>,
    /// Longest trip by distance.
    pub longest: Option<TripSummaryRow>,
    /// First [`LOAD_PREVIEW_SIZE`] trips in load order.
    pub first: Vec<TripSummaryRow>,
    /// Last [`LOAD_PREVIEW_SIZE`] trips in load order.
    pub last: Vec<TripSummaryRow>,
}

/// Result of loading the neighborhood file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NeighborhoodLoadSummary {
    pub loaded: usize,
    /// Rows dropped because a coordinate did not parse.
    pub skipped: usize,
    pub elapsed_ms: f64,
    /// First [`LOAD_PREVIEW_SIZE`] neighborhoods in load order.
    pub first: Vec<NeighborhoodRecord>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_size_coercion() {
        assert_eq!(SampleSize::parse(None).get(), 5);
        assert_eq!(SampleSize::parse(Some("abc")).get(), 5);
        assert_eq!(SampleSize::parse(Some("0")).get(), 5);
        assert_eq!(SampleSize::parse(Some("-3")).get(), 5);
        assert_eq!(SampleSize::parse(Some(" 7 ")).get(), 7);
        assert_eq!(SampleSize::from_count(-1), SampleSize::DEFAULT);
        assert_eq!("12".parse::<SampleSize>(), Ok(SampleSize::new(12)));
    }

    #[test]
    fn time_mode_parsing() {
        assert_eq!("BEFORE".parse::<TimeMode>(), Ok(TimeMode::Before));
        assert_eq!("after".parse::<TimeMode>(), Ok(TimeMode::After));
        assert_eq!("Antes".parse::<TimeMode>(), Ok(TimeMode::Before));
        assert_eq!("DESPUES".parse::<TimeMode>(), Ok(TimeMode::After));
        assert!("DURING".parse::<TimeMode>().is_err());
        assert_eq!(TimeMode::Before.to_string(), "BEFORE");
    }

    #[test]
    fn time_mode_excludes_reference() {
        let reference = NaiveTime::from_hms_opt(12, 0, 0).unwrap();
        let earlier = NaiveTime::from_hms_opt(11, 59, 59).unwrap();
        let later = NaiveTime::from_hms_opt(12, 0, 1).unwrap();

        assert!(TimeMode::Before.keeps(earlier, reference));
        assert!(!TimeMode::Before.keeps(reference, reference));
        assert!(TimeMode::After.keeps(later, reference));
        assert!(!TimeMode::After.keeps(reference, reference));
    }

    #[test]
    fn hour_range_plain_and_wrapping() {
        let day = HourRange::new(8, 17);
        assert!(day.contains(8));
        assert!(day.contains(17));
        assert!(!day.contains(18));

        let night = HourRange::new(22, 3);
        let hours: Vec<u32> = (0..24).filter(|h| night.contains(*h)).collect();
        assert_eq!(hours, vec![0, 1, 2, 3, 22, 23]);
    }

    #[test]
    fn trip_row_rounds_for_display() {
        let mut trip = TripRecord::new("2016-01-01 07:40:00", "2016-01-01 08:15:02").unwrap();
        trip.pickup_latitude = 40.718_812_345;
        trip.pickup_longitude = -74.009_012_9;
        trip.trip_distance = 2.345_67;
        trip.total_amount = 17.456;

        let row = TripRow::from(&trip);
        assert!((row.pickup_coordinates[0] - 40.718_812).abs() < 1e-9);
        assert!((row.pickup_coordinates[1] - -74.009_013).abs() < 1e-9);
        assert!((row.trip_distance - 2.346).abs() < 1e-9);
        assert!((row.total_amount - 17.46).abs() < 1e-9);
        assert_eq!(row.pickup_datetime, "2016-01-01 07:40:00");
    }

    #[test]
    fn shows_all_threshold() {
        let result = QueryResult {
            elapsed_ms: 0.0,
            total: 6,
            sample_size: SampleSize::new(3),
            first: Vec::new(),
            last: Vec::new(),
        };
        assert!(result.shows_all());
        assert!(!QueryResult { total: 7, ..result }.shows_all());
    }

    #[test]
    fn huge_sample_size_does_not_overflow() {
        let huge = SampleSize::new(usize::MAX / 2 + 1);
        assert_eq!(huge.both_ends(), usize::MAX);

        let result = QueryResult {
            elapsed_ms: 0.0,
            total: 3,
            sample_size: huge,
            first: Vec::new(),
            last: Vec::new(),
        };
        assert!(result.shows_all());
    }
}
