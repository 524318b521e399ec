//! The six trip queries.
//!
//! [`QueryEngine`] runs each query against a [`Catalog`] and times it with
//! its [`Clock`]. The free functions run the same queries on an engine
//! backed by the system clock.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use taxi_query_analytics_models::{HourRange, QueryResult, SampleSize, TimeMode, TripRow};
use taxi_query_catalog::Catalog;
use taxi_query_collections::OrderedList;
use taxi_query_spatial::{ExhaustiveAssigner, NeighborhoodAssigner};
use taxi_query_trip_models::{DropoffKey, TripRecord, neighborhood_key};

use crate::clock::{Clock, SystemClock};
use crate::filter::TripFilter;
use crate::ordering::TripOrdering;
use crate::window::{Window, window};

const DATE_KEY_FORMAT: &str = "%Y-%m-%d";

/// Runs queries against a catalog, timing them with `C`.
#[derive(Debug, Clone, Default)]
pub struct QueryEngine<C: Clock = SystemClock> {
    clock: C,
}

impl QueryEngine<SystemClock> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl<C: Clock> QueryEngine<C> {
    #[must_use]
    pub const fn with_clock(clock: C) -> Self {
        Self { clock }
    }

    /// Trips picked up within `[start, end]`, earliest pickup first.
    #[must_use]
    pub fn query_by_pickup_window(
        &self,
        catalog: &Catalog,
        start: NaiveDateTime,
        end: NaiveDateTime,
        sample_size: SampleSize,
    ) -> QueryResult {
        let started = self.clock.now_ms();
        let matches = scan(catalog, TripFilter::PickupWindow { start, end });
        self.finish(
            "pickup_window",
            started,
            &matches,
            TripOrdering::PickupAscending,
            sample_size,
        )
    }

    /// Trips whose pickup latitude lies within `[lat_min, lat_max]`,
    /// northernmost first, then easternmost.
    #[must_use]
    pub fn query_by_pickup_latitude_range(
        &self,
        catalog: &Catalog,
        lat_min: f64,
        lat_max: f64,
        sample_size: SampleSize,
    ) -> QueryResult {
        let started = self.clock.now_ms();
        let filter = TripFilter::PickupLatitude {
            min: lat_min,
            max: lat_max,
        };
        let matches = scan(catalog, filter);
        self.finish(
            "pickup_latitude_range",
            started,
            &matches,
            TripOrdering::PickupLatitudeDescending,
            sample_size,
        )
    }

    /// Trips whose distance lies within `[dist_min, dist_max]` miles,
    /// longest first, then most expensive.
    #[must_use]
    pub fn query_by_distance_range(
        &self,
        catalog: &Catalog,
        dist_min: f64,
        dist_max: f64,
        sample_size: SampleSize,
    ) -> QueryResult {
        let started = self.clock.now_ms();
        let filter = TripFilter::Distance {
            min: dist_min,
            max: dist_max,
        };
        let matches = scan(catalog, filter);
        self.finish(
            "distance_range",
            started,
            &matches,
            TripOrdering::DistanceDescending,
            sample_size,
        )
    }

    /// Trips dropped off on `date` strictly before or after `reference`,
    /// latest dropoff first.
    ///
    /// Builds a fresh dropoff date index on every call.
    #[must_use]
    pub fn query_by_dropoff_date_relative_time(
        &self,
        catalog: &Catalog,
        date: NaiveDate,
        mode: TimeMode,
        reference: NaiveTime,
        sample_size: SampleSize,
    ) -> QueryResult {
        let started = self.clock.now_ms();

        let index = catalog.build_dropoff_index(DropoffKey::Date);
        let key = date.format(DATE_KEY_FORMAT).to_string();
        let filter = TripFilter::DropoffTime { mode, reference };

        let matches: OrderedList<&TripRecord> = index
            .get(&key)
            .map(|bucket| catalog.resolve(bucket))
            .unwrap_or_default()
            .into_iter()
            .filter(|trip| filter.matches(trip))
            .collect();

        self.finish(
            "dropoff_date_relative_time",
            started,
            &matches,
            TripOrdering::DropoffDescending,
            sample_size,
        )
    }

    /// Trips dropped off in the hour `date_hour_key` (`YYYY-MM-DD HH`),
    /// latest dropoff first.
    ///
    /// Builds the dropoff date-hour index on first use and caches it on the
    /// catalog; later calls reuse it even if trips were added since.
    #[must_use]
    pub fn query_by_dropoff_date_hour(
        &self,
        catalog: &mut Catalog,
        date_hour_key: &str,
        sample_size: SampleSize,
    ) -> QueryResult {
        let started = self.clock.now_ms();

        let bucket = catalog
            .dropoff_hour_index()
            .get(date_hour_key.trim())
            .cloned()
            .unwrap_or_default();
        let matches = catalog.resolve(&bucket);

        self.finish(
            "dropoff_date_hour",
            started,
            &matches,
            TripOrdering::DropoffDescending,
            sample_size,
        )
    }

    /// Trips picked up nearest to the neighborhood `neighborhood_name`
    /// during the hours `[hour_start, hour_end]`, earliest pickup first.
    ///
    /// The hour range wraps through midnight when `hour_start > hour_end`.
    /// Pickups are assigned with an exhaustive haversine scan on every call.
    ///
    /// Neighborhoods are matched by name alone: same-named neighborhoods in
    /// different boroughs (Chelsea in Manhattan and Staten Island) share one
    /// result.
    #[must_use]
    pub fn query_by_neighborhood_and_hour_range(
        &self,
        catalog: &Catalog,
        neighborhood_name: &str,
        hour_start: u32,
        hour_end: u32,
        sample_size: SampleSize,
    ) -> QueryResult {
        let assigner = ExhaustiveAssigner::new(catalog.neighborhoods());
        self.query_by_neighborhood_and_hour_range_with(
            catalog,
            &assigner,
            neighborhood_name,
            HourRange::new(hour_start, hour_end),
            sample_size,
        )
    }

    /// Same as [`QueryEngine::query_by_neighborhood_and_hour_range`] with a
    /// caller-chosen [`NeighborhoodAssigner`].
    ///
    /// `assigner` must return positions in `catalog.neighborhoods()`.
    #[must_use]
    pub fn query_by_neighborhood_and_hour_range_with(
        &self,
        catalog: &Catalog,
        assigner: &impl NeighborhoodAssigner,
        neighborhood_name: &str,
        hours: HourRange,
        sample_size: SampleSize,
    ) -> QueryResult {
        let started = self.clock.now_ms();

        let key = neighborhood_key(neighborhood_name);
        if !catalog
            .neighborhoods()
            .iter()
            .any(|neighborhood| neighborhood.name_key() == key)
        {
            log::warn!("Unknown neighborhood {neighborhood_name:?}");
        }

        let index = catalog.build_neighborhood_index(assigner);
        let filter = TripFilter::PickupHours(hours);

        let matches: OrderedList<&TripRecord> = index
            .get(&key)
            .map(|bucket| catalog.resolve(bucket))
            .unwrap_or_default()
            .into_iter()
            .filter(|trip| filter.matches(trip))
            .collect();

        self.finish(
            "neighborhood_and_hour_range",
            started,
            &matches,
            TripOrdering::PickupAscending,
            sample_size,
        )
    }

    fn finish(
        &self,
        query: &str,
        started: f64,
        matches: &OrderedList<&TripRecord>,
        ordering: TripOrdering,
        sample_size: SampleSize,
    ) -> QueryResult {
        let sorted = matches.sort(|a, b| ordering.precedes(a, b));
        let Window { first, last } = window(&sorted, sample_size);

        let first = first.into_iter().map(TripRow::from).collect();
        let last = last.into_iter().map(TripRow::from).collect();
        let total = sorted.size();

        let elapsed_ms = self.clock.now_ms() - started;
        log::debug!("{query}: {total} matches ({ordering}) in {elapsed_ms:.3} ms");

        QueryResult {
            elapsed_ms,
            total,
            sample_size,
            first,
            last,
        }
    }
}

/// Full scan of the catalog's trips, in load order.
fn scan(catalog: &Catalog, filter: TripFilter) -> OrderedList<&TripRecord> {
    catalog
        .trips()
        .iter()
        .filter(|trip| filter.matches(trip))
        .collect()
}

/// See [`QueryEngine::query_by_pickup_window`].
#[must_use]
pub fn query_by_pickup_window(
    catalog: &Catalog,
    start: NaiveDateTime,
    end: NaiveDateTime,
    sample_size: SampleSize,
) -> QueryResult {
    QueryEngine::new().query_by_pickup_window(catalog, start, end, sample_size)
}

/// See [`QueryEngine::query_by_pickup_latitude_range`].
#[must_use]
pub fn query_by_pickup_latitude_range(
    catalog: &Catalog,
    lat_min: f64,
    lat_max: f64,
    sample_size: SampleSize,
) -> QueryResult {
    QueryEngine::new().query_by_pickup_latitude_range(catalog, lat_min, lat_max, sample_size)
}

/// See [`QueryEngine::query_by_distance_range`].
#[must_use]
pub fn query_by_distance_range(
    catalog: &Catalog,
    dist_min: f64,
    dist_max: f64,
    sample_size: SampleSize,
) -> QueryResult {
    QueryEngine::new().query_by_distance_range(catalog, dist_min, dist_max, sample_size)
}

/// See [`QueryEngine::query_by_dropoff_date_relative_time`].
#[must_use]
pub fn query_by_dropoff_date_relative_time(
    catalog: &Catalog,
    date: NaiveDate,
    mode: TimeMode,
    reference: NaiveTime,
    sample_size: SampleSize,
) -> QueryResult {
    QueryEngine::new().query_by_dropoff_date_relative_time(
        catalog,
        date,
        mode,
        reference,
        sample_size,
    )
}

/// See [`QueryEngine::query_by_dropoff_date_hour`].
#[must_use]
pub fn query_by_dropoff_date_hour(
    catalog: &mut Catalog,
    date_hour_key: &str,
    sample_size: SampleSize,
) -> QueryResult {
    QueryEngine::new().query_by_dropoff_date_hour(catalog, date_hour_key, sample_size)
}

/// See [`QueryEngine::query_by_neighborhood_and_hour_range`].
#[must_use]
pub fn query_by_neighborhood_and_hour_range(
    catalog: &Catalog,
    neighborhood_name: &str,
    hour_start: u32,
    hour_end: u32,
    sample_size: SampleSize,
) -> QueryResult {
    QueryEngine::new().query_by_neighborhood_and_hour_range(
        catalog,
        neighborhood_name,
        hour_start,
        hour_end,
        sample_size,
    )
}
