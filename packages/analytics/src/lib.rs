#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Query engine over an in-memory trip [`Catalog`].
//!
//! Every query follows the same shape: select candidate trips (a full scan
//! or a hash index lookup), keep those matching a [`TripFilter`], sort them
//! with a [`TripOrdering`], and cut the sorted matches into "first N" and
//! "last N" [`window`]s. Results are projected into display rows and timed
//! with an injected [`Clock`].
//!
//! Index use differs per query:
//!
//! * dropoff date queries build a date index on every call
//! * dropoff date-hour queries reuse the index cached on the catalog
//! * neighborhood queries assign every pickup to its nearest neighborhood
//!   on every call
//!
//! [`Catalog`]: taxi_query_catalog::Catalog

pub mod clock;
pub mod filter;
pub mod ordering;
pub mod queries;
pub mod window;

pub use clock::{Clock, SystemClock};
pub use filter::TripFilter;
pub use ordering::TripOrdering;
pub use queries::{
    QueryEngine, query_by_distance_range, query_by_dropoff_date_hour,
    query_by_dropoff_date_relative_time, query_by_neighborhood_and_hour_range,
    query_by_pickup_latitude_range, query_by_pickup_window,
};
pub use window::{Window, window};
