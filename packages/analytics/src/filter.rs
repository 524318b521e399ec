//! Trip predicates used by the queries.

use chrono::{NaiveDateTime, NaiveTime};
use taxi_query_analytics_models::{HourRange, TimeMode};
use taxi_query_trip_models::TripRecord;

/// A predicate over a single trip. All ranges are inclusive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TripFilter {
    PickupWindow {
        start: NaiveDateTime,
        end: NaiveDateTime,
    },
    PickupLatitude {
        min: f64,
        max: f64,
    },
    Distance {
        min: f64,
        max: f64,
    },
    /// Dropoff time of day strictly before or after `reference`.
    DropoffTime {
        mode: TimeMode,
        reference: NaiveTime,
    },
    /// Pickup hour of day within the (possibly wrapping) range.
    PickupHours(HourRange),
}

impl TripFilter {
    #[must_use]
    pub fn matches(&self, trip: &TripRecord) -> bool {
        match *self {
            Self::PickupWindow { start, end } => start <= trip.pickup_at && trip.pickup_at <= end,
            Self::PickupLatitude { min, max } => {
                min <= trip.pickup_latitude && trip.pickup_latitude <= max
            }
            Self::Distance { min, max } => min <= trip.trip_distance && trip.trip_distance <= max,
            Self::DropoffTime { mode, reference } => mode.keeps(trip.dropoff_at.time(), reference),
            Self::PickupHours(hours) => hours.contains(trip.pickup_hour),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use taxi_query_trip_models::parse_timestamp;

    fn trip(pickup: &str, dropoff: &str) -> TripRecord {
        TripRecord::new(pickup, dropoff).unwrap()
    }

    #[test]
    fn pickup_window_is_inclusive() {
        let filter = TripFilter::PickupWindow {
            start: parse_timestamp("2016-01-01 07:00:00").unwrap(),
            end: parse_timestamp("2016-01-01 08:00:00").unwrap(),
        };

        assert!(filter.matches(&trip("2016-01-01 07:00:00", "2016-01-01 07:30:00")));
        assert!(filter.matches(&trip("2016-01-01 08:00:00", "2016-01-01 08:30:00")));
        assert!(!filter.matches(&trip("2016-01-01 08:00:01", "2016-01-01 08:30:00")));
        assert!(!filter.matches(&trip("2016-01-01 06:59:59", "2016-01-01 07:30:00")));
    }

    #[test]
    fn numeric_ranges_are_inclusive() {
        let mut t = trip("2016-01-01 07:00:00", "2016-01-01 07:30:00");
        t.pickup_latitude = 40.75;
        t.trip_distance = 3.0;

        assert!(TripFilter::PickupLatitude { min: 40.75, max: 40.80 }.matches(&t));
        assert!(!TripFilter::PickupLatitude { min: 40.76, max: 40.80 }.matches(&t));
        assert!(TripFilter::Distance { min: 1.0, max: 3.0 }.matches(&t));
        assert!(!TripFilter::Distance { min: 3.5, max: 9.0 }.matches(&t));
    }

    #[test]
    fn dropoff_time_is_strict() {
        let reference = NaiveTime::from_hms_opt(12, 0, 0).unwrap();
        let before = TripFilter::DropoffTime {
            mode: TimeMode::Before,
            reference,
        };
        let after = TripFilter::DropoffTime {
            mode: TimeMode::After,
            reference,
        };
        let at_noon = trip("2016-01-01 11:30:00", "2016-01-01 12:00:00");
        let morning = trip("2016-01-01 10:30:00", "2016-01-01 11:00:00");

        assert!(!before.matches(&at_noon));
        assert!(!after.matches(&at_noon));
        assert!(before.matches(&morning));
        assert!(!after.matches(&morning));
    }

    #[test]
    fn pickup_hours_wrap() {
        let filter = TripFilter::PickupHours(HourRange::new(22, 3));
        assert!(filter.matches(&trip("2016-01-01 01:10:00", "2016-01-01 01:30:00")));
        assert!(filter.matches(&trip("2016-01-01 23:10:00", "2016-01-01 23:30:00")));
        assert!(!filter.matches(&trip("2016-01-01 10:10:00", "2016-01-01 10:30:00")));
    }
}
