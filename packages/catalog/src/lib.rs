#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! In-memory catalog of taxi trips and neighborhoods.
//!
//! The [`Catalog`] owns both collections and any hash index built over the
//! trips. Index buckets hold trip handles (positions in the trip list) so an
//! index can be cached on the catalog without borrowing it.
//!
//! # Index caching
//!
//! | Index | Key | Policy |
//! |---|---|---|
//! | [`Catalog::build_dropoff_index`] with [`DropoffKey::Date`] | `YYYY-MM-DD` | rebuilt on every call |
//! | [`Catalog::dropoff_hour_index`] | `YYYY-MM-DD HH` | built once, cached |
//! | [`Catalog::build_neighborhood_index`] | neighborhood name | rebuilt on every call |
//!
//! The cached index is never invalidated: trips appended after it was
//! built are not visible through it.

use strum_macros::{AsRefStr, Display};
use taxi_query_collections::{CollectionError, HashIndex, OrderedList};
use taxi_query_spatial::NeighborhoodAssigner;
use taxi_query_trip_models::{DropoffKey, NeighborhoodRecord, TripRecord};

/// Handles (positions in [`Catalog::trips`]) of the trips stored under one
/// index key.
pub type TripBucket = OrderedList<usize>;

/// Hash index from a derived key to the trips sharing it.
pub type TripIndex = HashIndex<TripBucket>;

/// Load state of a catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum CatalogState {
    /// No trips have been loaded.
    Empty,
    /// At least one trip is present.
    Loaded,
}

/// Owns the trip and neighborhood collections plus the cached hour index.
#[derive(Debug, Default)]
pub struct Catalog {
    trips: OrderedList<TripRecord>,
    neighborhoods: OrderedList<NeighborhoodRecord>,
    hour_index: Option<TripIndex>,
}

impl Catalog {
    /// Creates an empty catalog with no index.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn trips(&self) -> &OrderedList<TripRecord> {
        &self.trips
    }

    #[must_use]
    pub const fn neighborhoods(&self) -> &OrderedList<NeighborhoodRecord> {
        &self.neighborhoods
    }

    /// Returns the trip at `index` (0-based, load order).
    ///
    /// # Errors
    ///
    /// Returns [`CollectionError::OutOfRange`] if `index` is not in
    /// `[0, trip count)`.
    pub fn trip(&self, index: usize) -> Result<&TripRecord, CollectionError> {
        self.trips.get(index)
    }

    #[must_use]
    pub fn state(&self) -> CatalogState {
        if self.trips.is_empty() {
            CatalogState::Empty
        } else {
            CatalogState::Loaded
        }
    }

    /// Appends trips in order. Does not touch an already cached index.
    pub fn extend_trips(&mut self, trips: impl IntoIterator<Item = TripRecord>) {
        self.trips.extend(trips);
    }

    /// Appends neighborhoods in order.
    pub fn extend_neighborhoods(
        &mut self,
        neighborhoods: impl IntoIterator<Item = NeighborhoodRecord>,
    ) {
        self.neighborhoods.extend(neighborhoods);
    }

    /// Whether the dropoff date-hour index has been built and cached.
    #[must_use]
    pub const fn has_hour_index(&self) -> bool {
        self.hour_index.is_some()
    }

    /// Builds a fresh index grouping trips by a dropoff timestamp prefix.
    #[must_use]
    pub fn build_dropoff_index(&self, key: DropoffKey) -> TripIndex {
        index_by_dropoff(&self.trips, key)
    }

    /// Returns the dropoff date-hour index, building and caching it on the
    /// first call.
    pub fn dropoff_hour_index(&mut self) -> &TripIndex {
        let trips = &self.trips;
        self.hour_index.get_or_insert_with(|| {
            let index = index_by_dropoff(trips, DropoffKey::DateHour);
            log::info!("Cached dropoff hour index with {} keys", index.size());
            index
        })
    }

    /// Builds a fresh index grouping trips by the name of the neighborhood
    /// their pickup is assigned to.
    ///
    /// Every trip is assigned again on each call. Trips whose pickup has no
    /// coordinates are left out. Keys are the lowercased neighborhood name
    /// without the borough, so same-named neighborhoods share a bucket.
    #[must_use]
    pub fn build_neighborhood_index(&self, assigner: &impl NeighborhoodAssigner) -> TripIndex {
        let mut index = HashIndex::with_expected_count(self.neighborhoods.size());
        let mut skipped = 0usize;

        for (handle, trip) in self.trips.iter().enumerate() {
            if !trip.has_pickup_coordinates() {
                skipped += 1;
                continue;
            }

            let Some(position) = assigner.assign_nearest(trip.pickup_latitude, trip.pickup_longitude)
            else {
                continue;
            };
            let Ok(neighborhood) = self.neighborhoods.get(position) else {
                continue;
            };

            index
                .get_or_insert_with(&neighborhood.name_key(), OrderedList::new)
                .append(handle);
        }

        log::debug!(
            "Built neighborhood index: {} neighborhoods hit, {skipped} trips without pickup coordinates",
            index.size()
        );

        index
    }

    /// Resolves a bucket of handles to the trips they point at, in bucket
    /// order. Handles past the end of the trip list are ignored.
    #[must_use]
    pub fn resolve(&self, bucket: &TripBucket) -> OrderedList<&TripRecord> {
        bucket
            .iter()
            .filter_map(|&handle| self.trips.get(handle).ok())
            .collect()
    }
}

fn index_by_dropoff(trips: &OrderedList<TripRecord>, key: DropoffKey) -> TripIndex {
    let mut index = HashIndex::with_expected_count(trips.size());

    for (handle, trip) in trips.iter().enumerate() {
        index
            .get_or_insert_with(trip.dropoff_key(key), OrderedList::new)
            .append(handle);
    }

    log::debug!(
        "Built {key} index: {} keys over {} trips",
        index.size(),
        trips.size()
    );

    index
}

#[cfg(test)]
mod tests {
    use taxi_query_spatial::ExhaustiveAssigner;

    use super::*;

    fn trip(pickup: &str, dropoff: &str, lat: f64, lon: f64) -> TripRecord {
        let mut trip = TripRecord::new(pickup, dropoff).unwrap();
        trip.pickup_latitude = lat;
        trip.pickup_longitude = lon;
        trip
    }

    fn sample_catalog() -> Catalog {
        let mut catalog = Catalog::new();
        catalog.extend_trips(vec![
            trip("2016-01-01 07:10:00", "2016-01-01 08:05:00", 40.7190, -74.0085),
            trip("2016-01-01 07:30:00", "2016-01-01 08:45:00", 40.7550, -73.9845),
            trip("2016-01-01 09:00:00", "2016-01-01 09:20:00", 40.7189, -74.0091),
            trip("2016-01-02 22:00:00", "2016-01-02 23:10:00", 0.0, 0.0),
        ]);
        catalog.extend_neighborhoods(vec![
            NeighborhoodRecord {
                borough: "Manhattan".to_string(),
                neighborhood: "Tribeca".to_string(),
                latitude: 40.7188,
                longitude: -74.0090,
            },
            NeighborhoodRecord {
                borough: "Manhattan".to_string(),
                neighborhood: "Midtown".to_string(),
                latitude: 40.7549,
                longitude: -73.9840,
            },
        ]);
        catalog
    }

    fn bucket_total(index: &TripIndex) -> usize {
        index.values().map(OrderedList::size).sum()
    }

    #[test]
    fn starts_empty() {
        let catalog = Catalog::new();
        assert_eq!(catalog.state(), CatalogState::Empty);
        assert!(!catalog.has_hour_index());
        assert!(catalog.trip(0).is_err());
    }

    #[test]
    fn trip_by_index() {
        let catalog = sample_catalog();
        assert_eq!(catalog.state(), CatalogState::Loaded);
        assert_eq!(
            catalog.trip(2).unwrap().pickup_datetime,
            "2016-01-01 09:00:00"
        );
        assert!(matches!(
            catalog.trip(4),
            Err(CollectionError::OutOfRange { index: 4, size: 4 })
        ));
    }

    #[test]
    fn date_index_is_complete() {
        let catalog = sample_catalog();
        let index = catalog.build_dropoff_index(DropoffKey::Date);

        assert_eq!(bucket_total(&index), catalog.trips().size());
        assert_eq!(index.get("2016-01-01").map(OrderedList::size), Some(3));
        assert_eq!(index.get("2016-01-02").map(OrderedList::size), Some(1));
        assert!(!catalog.has_hour_index());
    }

    #[test]
    fn every_trip_is_retrievable_under_its_key() {
        let catalog = sample_catalog();
        let index = catalog.build_dropoff_index(DropoffKey::DateHour);

        for (handle, trip) in catalog.trips().iter().enumerate() {
            let key = trip.dropoff_key(DropoffKey::DateHour);
            let bucket = index.get(key).unwrap();
            assert_eq!(bucket.iter().filter(|&&h| h == handle).count(), 1);
        }
        assert_eq!(bucket_total(&index), catalog.trips().size());
    }

    #[test]
    fn hour_index_is_cached_and_never_invalidated() {
        let mut catalog = sample_catalog();
        let before = catalog.dropoff_hour_index().get("2016-01-01 08").map(OrderedList::size);
        assert_eq!(before, Some(2));
        assert!(catalog.has_hour_index());

        catalog.extend_trips(vec![trip(
            "2016-01-01 07:55:00",
            "2016-01-01 08:30:00",
            40.7,
            -74.0,
        )]);

        // Still the index built before the new trip arrived.
        let after = catalog.dropoff_hour_index().get("2016-01-01 08").map(OrderedList::size);
        assert_eq!(after, Some(2));
    }

    #[test]
    fn date_index_is_rebuilt_per_call() {
        let mut catalog = sample_catalog();
        let before = catalog.build_dropoff_index(DropoffKey::Date);
        assert_eq!(before.get("2016-01-01").map(OrderedList::size), Some(3));

        catalog.extend_trips(vec![trip(
            "2016-01-01 07:55:00",
            "2016-01-01 08:30:00",
            40.7,
            -74.0,
        )]);

        let after = catalog.build_dropoff_index(DropoffKey::Date);
        assert_eq!(after.get("2016-01-01").map(OrderedList::size), Some(4));
        assert!(!catalog.has_hour_index());
    }

    #[test]
    fn neighborhood_index_assigns_by_nearest() {
        let catalog = sample_catalog();
        let assigner = ExhaustiveAssigner::new(catalog.neighborhoods());
        let index = catalog.build_neighborhood_index(&assigner);

        let tribeca = index.get("tribeca").unwrap();
        assert_eq!(tribeca.as_slice(), &[0, 2]);
        let midtown = index.get("midtown").unwrap();
        assert_eq!(midtown.as_slice(), &[1]);

        // Trip 3 has no pickup coordinates.
        assert_eq!(bucket_total(&index), 3);
    }

    #[test]
    fn resolve_keeps_bucket_order() {
        let catalog = sample_catalog();
        let bucket: TripBucket = vec![2, 0, 99].into();
        let trips = catalog.resolve(&bucket);

        assert_eq!(trips.size(), 2);
        assert_eq!(trips.get(0).unwrap().pickup_datetime, "2016-01-01 09:00:00");
        assert_eq!(trips.get(1).unwrap().pickup_datetime, "2016-01-01 07:10:00");
    }
}
