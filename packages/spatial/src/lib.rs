#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Neighborhood attribution for trip pickups.
//!
//! Provides the haversine great-circle distance and the
//! [`NeighborhoodAssigner`] trait that maps a coordinate to the nearest
//! loaded neighborhood. [`ExhaustiveAssigner`] is the reference
//! implementation: a linear scan over every neighborhood. Other strategies
//! (grids, trees) can implement the same trait without changing callers.

use taxi_query_collections::OrderedList;
use taxi_query_trip_models::NeighborhoodRecord;

/// Mean Earth radius in kilometers.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Great-circle distance in kilometers between two lat/lon points (degrees).
#[must_use]
pub fn haversine_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let (phi1, phi2) = (lat1.to_radians(), lat2.to_radians());
    let d_phi = (lat2 - lat1).to_radians();
    let d_lambda = (lon2 - lon1).to_radians();

    let sin_dphi = (d_phi * 0.5).sin();
    let sin_dlambda = (d_lambda * 0.5).sin();
    let h = sin_dphi.mul_add(sin_dphi, phi1.cos() * phi2.cos() * sin_dlambda * sin_dlambda);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());

    EARTH_RADIUS_KM * c
}

/// Maps a coordinate to a neighborhood.
pub trait NeighborhoodAssigner {
    /// Returns the position (in the neighborhood list the assigner was built
    /// over) of the neighborhood closest to `(lat, lon)`, or `None` when
    /// there are no neighborhoods.
    fn assign_nearest(&self, lat: f64, lon: f64) -> Option<usize>;
}

/// Brute-force nearest neighborhood by haversine distance.
///
/// Every call scans all neighborhoods. On equal distances the neighborhood
/// seen first in list order wins.
pub struct ExhaustiveAssigner<'a> {
    neighborhoods: &'a OrderedList<NeighborhoodRecord>,
}

impl<'a> ExhaustiveAssigner<'a> {
    #[must_use]
    pub const fn new(neighborhoods: &'a OrderedList<NeighborhoodRecord>) -> Self {
        Self { neighborhoods }
    }
}

impl NeighborhoodAssigner for ExhaustiveAssigner<'_> {
    fn assign_nearest(&self, lat: f64, lon: f64) -> Option<usize> {
        let mut best: Option<(usize, f64)> = None;

        for (position, neighborhood) in self.neighborhoods.iter().enumerate() {
            let distance = haversine_km(lat, lon, neighborhood.latitude, neighborhood.longitude);
            match best {
                Some((_, min)) if distance >= min => {}
                _ => best = Some((position, distance)),
            }
        }

        best.map(|(position, _)| position)
    }
}
