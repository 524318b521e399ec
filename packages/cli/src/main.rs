#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Command line tool for querying NYC taxi trips.
//!
//! ```text
//! taxi_query load
//! taxi_query pickup-window --start "2016-01-01 08:00:00" --end "2016-01-01 09:00:00"
//! taxi_query latitude --min 40.70 --max 40.75 -n 3
//! taxi_query distance --min 1.5 --max 2.0
//! taxi_query dropoff-time --date 2016-01-01 --mode before --time 12:00:00
//! taxi_query dropoff-hour "2016-01-01 08"
//! taxi_query neighborhood Midtown --from 22 --to 3
//! ```
//!
//! Running `taxi_query` with no subcommand enters interactive mode. Every
//! subcommand loads the data files first; `--json` prints results as JSON
//! instead of tables.

mod config;
mod input;
mod interactive;
mod render;
mod session;

use std::path::PathBuf;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use clap::{Args, Parser, Subcommand};
use taxi_query_analytics_models::{HourRange, SampleSize, TimeMode};

use crate::config::{ConfigFile, Overrides, Settings, env_data_dir};
use crate::input::{
    parse_coordinate, parse_date, parse_date_hour, parse_datetime, parse_hour, parse_sample_size,
    parse_time, parse_time_mode,
};
use crate::render::{render_neighborhood_load, render_query, render_trip_load};
use crate::session::{Query, Session};

#[derive(Parser)]
#[command(name = "taxi_query", about = "Load NYC taxi trips from CSV and query them")]
struct Cli {
    /// Directory holding the trip and neighborhood files
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Trip CSV file (overrides the data directory)
    #[arg(long, global = true)]
    trips: Option<PathBuf>,

    /// Neighborhood CSV file (overrides the data directory)
    #[arg(long, global = true)]
    neighborhoods: Option<PathBuf>,

    /// TOML config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Args)]
struct SampleArg {
    /// Trips to show from each end of the result (default from config, else 5)
    #[arg(short = 'n', long = "sample", value_parser = parse_sample_size)]
    sample: Option<SampleSize>,
}

#[derive(Subcommand)]
enum Commands {
    /// Load both files and print the load summaries
    Load,
    /// Trips picked up within a time window
    PickupWindow {
        /// Window start (YYYY-MM-DD HH:MM:SS)
        #[arg(long, value_parser = parse_datetime)]
        start: NaiveDateTime,
        /// Window end (YYYY-MM-DD HH:MM:SS)
        #[arg(long, value_parser = parse_datetime)]
        end: NaiveDateTime,
        #[command(flatten)]
        sample: SampleArg,
    },
    /// Trips whose pickup latitude lies in a range
    #[command(allow_negative_numbers = true)]
    Latitude {
        #[arg(long, value_parser = parse_coordinate)]
        min: f64,
        #[arg(long, value_parser = parse_coordinate)]
        max: f64,
        #[command(flatten)]
        sample: SampleArg,
    },
    /// Trips whose distance in miles lies in a range
    Distance {
        #[arg(long, value_parser = parse_coordinate)]
        min: f64,
        #[arg(long, value_parser = parse_coordinate)]
        max: f64,
        #[command(flatten)]
        sample: SampleArg,
    },
    /// Trips dropped off on a date strictly before or after a time
    DropoffTime {
        /// Dropoff date (YYYY-MM-DD)
        #[arg(long, value_parser = parse_date)]
        date: NaiveDate,
        /// BEFORE or AFTER
        #[arg(long, value_parser = parse_time_mode)]
        mode: TimeMode,
        /// Reference time (HH:MM:SS)
        #[arg(long, value_parser = parse_time)]
        time: NaiveTime,
        #[command(flatten)]
        sample: SampleArg,
    },
    /// Trips dropped off during one hour of one date
    DropoffHour {
        /// Date and hour (YYYY-MM-DD HH)
        #[arg(value_parser = parse_date_hour)]
        key: String,
        #[command(flatten)]
        sample: SampleArg,
    },
    /// Trips picked up nearest a neighborhood within an hour range
    Neighborhood {
        /// Neighborhood name (case-insensitive)
        name: String,
        /// First hour (0-23)
        #[arg(long, value_parser = parse_hour)]
        from: u32,
        /// Last hour (0-23); wraps past midnight when less than --from
        #[arg(long, value_parser = parse_hour)]
        to: u32,
        #[command(flatten)]
        sample: SampleArg,
    },
}

impl Commands {
    /// Splits a query subcommand into its query and requested sample size.
    fn into_query(self) -> Option<(Query, Option<SampleSize>)> {
        Some(match self {
            Self::Load => return None,
            Self::PickupWindow { start, end, sample } => {
                (Query::PickupWindow { start, end }, sample.sample)
            }
            Self::Latitude { min, max, sample } => {
                (Query::PickupLatitude { min, max }, sample.sample)
            }
            Self::Distance { min, max, sample } => (Query::Distance { min, max }, sample.sample),
            Self::DropoffTime {
                date,
                mode,
                time,
                sample,
            } => (
                Query::DropoffTime {
                    date,
                    mode,
                    reference: time,
                },
                sample.sample,
            ),
            Self::DropoffHour { key, sample } => (Query::DropoffHour { key }, sample.sample),
            Self::Neighborhood {
                name,
                from,
                to,
                sample,
            } => (
                Query::Neighborhood {
                    name,
                    hours: HourRange::new(from, to),
                },
                sample.sample,
            ),
        })
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let multi = taxi_query_cli_utils::init_logger();
    let cli = Cli::parse();

    let file = match &cli.config {
        Some(path) => ConfigFile::load(path)?,
        None => ConfigFile::default(),
    };
    let overrides = Overrides {
        data_dir: cli.data_dir,
        trips: cli.trips,
        neighborhoods: cli.neighborhoods,
    };
    let settings = Settings::resolve(&file, &overrides, env_data_dir());
    log::debug!(
        "Trips: {}, neighborhoods: {}",
        settings.trips_path.display(),
        settings.neighborhoods_path.display()
    );

    let mut session = Session::new(settings);

    let Some(command) = cli.command else {
        return interactive::run(&mut session, &multi);
    };

    let report = session.load(&multi)?;

    let Some((query, sample)) = command.into_query() else {
        if cli.json {
            println!("{}", serde_json::to_string_pretty(&report)?);
        } else {
            let settings = session.settings();
            print!("{}", render_trip_load(&settings.trips_path, &report.trips));
            print!(
                "{}",
                render_neighborhood_load(&settings.neighborhoods_path, &report.neighborhoods)
            );
        }
        return Ok(());
    };

    let sample_size = sample.unwrap_or(session.settings().sample_size);
    let result = session.run(&query, sample_size);

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print!("{}", render_query(&query.title(), &result));
    }

    Ok(())
}
