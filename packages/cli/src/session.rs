//! A loaded catalog plus the settings it was loaded from.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::Serialize;
use taxi_query_analytics::QueryEngine;
use taxi_query_analytics_models::{
    HourRange, NeighborhoodLoadSummary, QueryResult, SampleSize, TimeMode, TripLoadSummary,
};
use taxi_query_catalog::{Catalog, CatalogState};
use taxi_query_cli_utils::{IndicatifProgress, MultiProgress};
use taxi_query_ingest::{IngestError, load_neighborhoods_file, load_trips_file};

use crate::config::Settings;

/// One of the six queries with its parameters.
#[derive(Debug, Clone, PartialEq)]
pub enum Query {
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
    DropoffTime {
        date: NaiveDate,
        mode: TimeMode,
        reference: NaiveTime,
    },
    DropoffHour {
        key: String,
    },
    Neighborhood {
        name: String,
        hours: HourRange,
    },
}

impl Query {
    #[must_use]
    pub fn title(&self) -> String {
        match self {
            Self::PickupWindow { start, end } => {
                format!("Trips picked up between {start} and {end}")
            }
            Self::PickupLatitude { min, max } => {
                format!("Trips with pickup latitude in [{min}, {max}]")
            }
            Self::Distance { min, max } => format!("Trips of {min} to {max} miles"),
            Self::DropoffTime {
                date,
                mode,
                reference,
            } => format!("Trips dropped off on {date} {mode} {reference}"),
            Self::DropoffHour { key } => format!("Trips dropped off during {key}h"),
            Self::Neighborhood { name, hours } => format!(
                "Trips picked up in {name} between {}h and {}h",
                hours.start, hours.end
            ),
        }
    }
}

/// Summaries of both loads.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadReport {
    pub trips: TripLoadSummary,
    pub neighborhoods: NeighborhoodLoadSummary,
}

pub struct Session {
    settings: Settings,
    catalog: Catalog,
    engine: QueryEngine,
}

impl Session {
    #[must_use]
    pub fn new(settings: Settings) -> Self {
        Self {
            settings,
            catalog: Catalog::new(),
            engine: QueryEngine::new(),
        }
    }

    #[must_use]
    pub const fn settings(&self) -> &Settings {
        &self.settings
    }

    #[must_use]
    pub fn is_loaded(&self) -> bool {
        self.catalog.state() == CatalogState::Loaded
    }

    /// Loads both files into a fresh catalog, replacing the current one
    /// only if both loads succeed.
    ///
    /// # Errors
    ///
    /// Returns the first [`IngestError`] from either load.
    pub fn load(&mut self, multi: &MultiProgress) -> Result<LoadReport, IngestError> {
        let mut catalog = Catalog::new();

        let progress = IndicatifProgress::rows_bar(multi, "Loading trips");
        let trips = load_trips_file(&mut catalog, &self.settings.trips_path, &progress)?;

        let progress = IndicatifProgress::rows_bar(multi, "Loading neighborhoods");
        let neighborhoods =
            load_neighborhoods_file(&mut catalog, &self.settings.neighborhoods_path, &progress)?;

        self.catalog = catalog;

        Ok(LoadReport {
            trips,
            neighborhoods,
        })
    }

    pub fn run(&mut self, query: &Query, sample_size: SampleSize) -> QueryResult {
        let engine = &self.engine;
        let catalog = &mut self.catalog;

        match query {
            Query::PickupWindow { start, end } => {
                engine.query_by_pickup_window(catalog, *start, *end, sample_size)
            }
            Query::PickupLatitude { min, max } => {
                engine.query_by_pickup_latitude_range(catalog, *min, *max, sample_size)
            }
            Query::Distance { min, max } => {
                engine.query_by_distance_range(catalog, *min, *max, sample_size)
            }
            Query::DropoffTime {
                date,
                mode,
                reference,
            } => engine.query_by_dropoff_date_relative_time(
                catalog,
                *date,
                *mode,
                *reference,
                sample_size,
            ),
            Query::DropoffHour { key } => {
                engine.query_by_dropoff_date_hour(catalog, key, sample_size)
            }
            Query::Neighborhood { name, hours } => engine.query_by_neighborhood_and_hour_range(
                catalog,
                name,
                hours.start,
                hours.end,
                sample_size,
            ),
        }
    }
}
