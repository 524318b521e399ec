//! Sort orders used by the queries.
//!
//! Each ordering is a strict "must precede" predicate: equal trips never
//! precede each other, so the stable merge sort keeps them in load order.

use std::cmp::Ordering;

use strum_macros::{AsRefStr, Display};
use taxi_query_trip_models::TripRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum TripOrdering {
    /// Earliest pickup first.
    PickupAscending,
    /// Northernmost pickup first, then easternmost.
    PickupLatitudeDescending,
    /// Longest trip first, then most expensive.
    DistanceDescending,
    /// Latest dropoff first.
    DropoffDescending,
}

impl TripOrdering {
    /// Whether `a` must come before `b`.
    #[must_use]
    pub fn precedes(self, a: &TripRecord, b: &TripRecord) -> bool {
        match self {
            Self::PickupAscending => a.pickup_at < b.pickup_at,
            Self::PickupLatitudeDescending => descending_then_descending(
                (a.pickup_latitude, a.pickup_longitude),
                (b.pickup_latitude, b.pickup_longitude),
            ),
            Self::DistanceDescending => descending_then_descending(
                (a.trip_distance, a.total_amount),
                (b.trip_distance, b.total_amount),
            ),
            Self::DropoffDescending => a.dropoff_at > b.dropoff_at,
        }
    }
}

/// `(primary, secondary)` keys compared larger-first on both.
fn descending_then_descending(a: (f64, f64), b: (f64, f64)) -> bool {
    match a.0.partial_cmp(&b.0) {
        Some(Ordering::Greater) => true,
        Some(Ordering::Equal) => a.1 > b.1,
        _ => false,
    }
}
