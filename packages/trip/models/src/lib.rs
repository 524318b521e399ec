#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Taxi trip and neighborhood record types.
//!
//! Records are immutable once loaded. A [`TripRecord`] keeps both the
//! original timestamp strings (used to derive index keys) and the parsed
//! instants (used for filtering and ordering).

use chrono::{NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Format of every pickup/dropoff timestamp in the source data.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Parses a `YYYY-MM-DD HH:MM:SS` timestamp.
#[must_use]
pub fn parse_timestamp(s: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(s.trim(), TIMESTAMP_FORMAT).ok()
}

/// Rounds `value` to `places` decimal places, for display projections.
#[must_use]
pub fn round_to(value: f64, places: i32) -> f64 {
    let scale = 10_f64.powi(places);
    (value * scale).round() / scale
}

/// Normalizes a raw payment type code (trimmed, uppercased).
#[must_use]
pub fn normalize_payment_type(raw: &str) -> String {
    raw.trim().to_uppercase()
}

/// A single taxi trip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TripRecord {
    /// Pickup timestamp as it appeared in the source (`YYYY-MM-DD HH:MM:SS`).
    pub pickup_datetime: String,
    /// Dropoff timestamp as it appeared in the source.
    pub dropoff_datetime: String,
    /// Parsed pickup instant.
    pub pickup_at: NaiveDateTime,
    /// Parsed dropoff instant.
    pub dropoff_at: NaiveDateTime,
    /// Hour of day (0-23) of the pickup.
    pub pickup_hour: u32,
    pub passenger_count: u32,
    /// Normalized payment type code (e.g. `"CREDIT_CARD"`).
    pub payment_type: String,
    /// Trip distance in miles.
    pub trip_distance: f64,
    pub fare_amount: f64,
    pub tip_amount: f64,
    pub tolls_amount: f64,
    pub total_amount: f64,
    /// Dropoff minus pickup, in minutes.
    pub duration_min: f64,
    pub pickup_latitude: f64,
    pub pickup_longitude: f64,
    pub dropoff_latitude: f64,
    pub dropoff_longitude: f64,
}

impl TripRecord {
    /// Creates a trip from its two timestamps, deriving the pickup hour and
    /// duration. All other fields start at zero/empty.
    ///
    /// Returns `None` if either timestamp does not parse.
    #[must_use]
    pub fn new(pickup_datetime: &str, dropoff_datetime: &str) -> Option<Self> {
        let pickup_at = parse_timestamp(pickup_datetime)?;
        let dropoff_at = parse_timestamp(dropoff_datetime)?;

        #[allow(clippy::cast_precision_loss)]
        let duration_min = (dropoff_at - pickup_at).num_seconds() as f64 / 60.0;

        Some(Self {
            pickup_datetime: pickup_datetime.trim().to_string(),
            dropoff_datetime: dropoff_datetime.trim().to_string(),
            pickup_at,
            dropoff_at,
            pickup_hour: pickup_at.hour(),
            passenger_count: 0,
            payment_type: String::new(),
            trip_distance: 0.0,
            fare_amount: 0.0,
            tip_amount: 0.0,
            tolls_amount: 0.0,
            total_amount: 0.0,
            duration_min,
            pickup_latitude: 0.0,
            pickup_longitude: 0.0,
            dropoff_latitude: 0.0,
            dropoff_longitude: 0.0,
        })
    }

    /// Key of this trip in the given dropoff index.
    #[must_use]
    pub fn dropoff_key(&self, key: DropoffKey) -> &str {
        key.derive(&self.dropoff_datetime)
    }

    /// Whether the pickup coordinate is usable for neighborhood assignment.
    ///
    /// A coordinate of exactly `0.0` means "not recorded" in the source
    /// data. The trip is only skipped when *both* pickup coordinates are
    /// missing; a trip with a single missing coordinate is still assigned.
    #[must_use]
    #[allow(clippy::float_cmp)]
    pub fn has_pickup_coordinates(&self) -> bool {
        !(self.pickup_latitude == 0.0 && self.pickup_longitude == 0.0)
    }
}

/// Substring of the dropoff timestamp used as a hash index key.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum DropoffKey {
    /// `YYYY-MM-DD` (first 10 characters).
    Date,
    /// `YYYY-MM-DD HH` (first 13 characters).
    DateHour,
}

impl DropoffKey {
    /// Number of leading timestamp characters that make up the key.
    #[must_use]
    pub const fn width(self) -> usize {
        match self {
            Self::Date => 10,
            Self::DateHour => 13,
        }
    }

    /// Derives the key from a `YYYY-MM-DD HH:MM:SS` timestamp string.
    ///
    /// Strings shorter than the key width are returned whole.
    #[must_use]
    pub fn derive(self, timestamp: &str) -> &str {
        timestamp.get(..self.width()).unwrap_or(timestamp)
    }
}

/// A named neighborhood with its reference coordinate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NeighborhoodRecord {
    pub borough: String,
    pub neighborhood: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl NeighborhoodRecord {
    /// Key used to look this neighborhood up by name.
    #[must_use]
    pub fn name_key(&self) -> String {
        neighborhood_key(&self.neighborhood)
    }
}

/// Normalizes a neighborhood name for lookups (trimmed, lowercased).
#[must_use]
pub fn neighborhood_key(name: &str) -> String {
    name.trim().to_lowercase()
}
