//! Interactive menu: load the data files, then run any of the six queries.

use console::style;
use dialoguer::{Input, Select};
use taxi_query_analytics_models::{HourRange, SampleSize, TimeMode};
use taxi_query_cli_utils::MultiProgress;

use crate::input::{
    parse_coordinate, parse_date, parse_date_hour, parse_datetime, parse_hour, parse_time,
};
use crate::render::{render_neighborhood_load, render_query, render_trip_load};
use crate::session::{Query, Session};

/// Top-level menu entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MenuAction {
    Load,
    PickupWindow,
    Latitude,
    Distance,
    DropoffTime,
    DropoffHour,
    Neighborhood,
    Exit,
}

impl MenuAction {
    const ALL: &[Self] = &[
        Self::Load,
        Self::PickupWindow,
        Self::Latitude,
        Self::Distance,
        Self::DropoffTime,
        Self::DropoffHour,
        Self::Neighborhood,
        Self::Exit,
    ];

    #[must_use]
    const fn label(self) -> &'static str {
        match self {
            Self::Load => "Load trips and neighborhoods",
            Self::PickupWindow => "Trips within a pickup time window",
            Self::Latitude => "Trips within a pickup latitude range",
            Self::Distance => "Trips within a distance range",
            Self::DropoffTime => "Trips dropped off before/after a time on a date",
            Self::DropoffHour => "Trips dropped off during a date and hour",
            Self::Neighborhood => "Trips from a neighborhood within an hour range",
            Self::Exit => "Exit",
        }
    }
}

/// Runs the menu until the user picks [`MenuAction::Exit`].
///
/// # Errors
///
/// Returns an error if a prompt fails to read from the terminal. Load
/// failures are reported and the menu continues.
pub fn run(session: &mut Session, multi: &MultiProgress) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", style("NYC Taxi Trip Queries").bold());

    let labels: Vec<&str> = MenuAction::ALL.iter().map(|action| action.label()).collect();

    loop {
        println!();
        let idx = Select::new()
            .with_prompt("What would you like to do?")
            .items(&labels)
            .default(0)
            .interact()?;

        let action = MenuAction::ALL[idx];
        match action {
            MenuAction::Exit => return Ok(()),
            MenuAction::Load => {
                let report = match session.load(multi) {
                    Ok(report) => report,
                    Err(e) => {
                        println!("{}", style(format!("Load failed: {e}")).red());
                        continue;
                    }
                };
                print!(
                    "{}",
                    render_trip_load(&session.settings().trips_path, &report.trips)
                );
                print!(
                    "{}",
                    render_neighborhood_load(
                        &session.settings().neighborhoods_path,
                        &report.neighborhoods
                    )
                );
            }
            _ if !session.is_loaded() => {
                println!(
                    "{}",
                    style("No trips loaded yet. Choose \"Load trips and neighborhoods\" first.")
                        .yellow()
                );
            }
            _ => {
                let Some(query) = prompt_query(action)? else {
                    continue;
                };
                let sample_size = prompt_sample_size(session.settings().sample_size)?;
                let result = session.run(&query, sample_size);
                print!("{}", render_query(&query.title(), &result));
            }
        }
    }
}

/// Prompts for the parameters of the query behind `action`.
fn prompt_query(action: MenuAction) -> dialoguer::Result<Option<Query>> {
    let query = match action {
        MenuAction::PickupWindow => Query::PickupWindow {
            start: prompt("Start (YYYY-MM-DD HH:MM:SS)", parse_datetime)?,
            end: prompt("End (YYYY-MM-DD HH:MM:SS)", parse_datetime)?,
        },
        MenuAction::Latitude => Query::PickupLatitude {
            min: prompt("Minimum latitude", parse_coordinate)?,
            max: prompt("Maximum latitude", parse_coordinate)?,
        },
        MenuAction::Distance => Query::Distance {
            min: prompt("Minimum distance (mi)", parse_coordinate)?,
            max: prompt("Maximum distance (mi)", parse_coordinate)?,
        },
        MenuAction::DropoffTime => Query::DropoffTime {
            date: prompt("Dropoff date (YYYY-MM-DD)", parse_date)?,
            mode: prompt_time_mode()?,
            reference: prompt("Reference time (HH:MM:SS)", parse_time)?,
        },
        MenuAction::DropoffHour => Query::DropoffHour {
            key: prompt("Dropoff date and hour (YYYY-MM-DD HH)", parse_date_hour)?,
        },
        MenuAction::Neighborhood => Query::Neighborhood {
            name: Input::<String>::new()
                .with_prompt("Neighborhood")
                .interact_text()?,
            hours: HourRange::new(
                prompt("Start hour (0-23)", parse_hour)?,
                prompt("End hour (0-23)", parse_hour)?,
            ),
        },
        MenuAction::Load | MenuAction::Exit => return Ok(None),
    };

    Ok(Some(query))
}

/// Asks until `parse` accepts the answer, printing its message otherwise.
fn prompt<T>(label: &str, parse: fn(&str) -> Result<T, String>) -> dialoguer::Result<T> {
    loop {
        let answer: String = Input::new().with_prompt(label).interact_text()?;
        match parse(&answer) {
            Ok(value) => return Ok(value),
            Err(message) => println!("{}", style(message).red()),
        }
    }
}

fn prompt_time_mode() -> dialoguer::Result<TimeMode> {
    let labels: Vec<String> = TimeMode::ALL.iter().map(ToString::to_string).collect();
    let idx = Select::new()
        .with_prompt("Before or after the reference time?")
        .items(&labels)
        .default(0)
        .interact()?;

    Ok(TimeMode::ALL[idx])
}

fn prompt_sample_size(default: SampleSize) -> dialoguer::Result<SampleSize> {
    let answer: String = Input::new()
        .with_prompt("Trips to show from each end")
        .default(default.to_string())
        .interact_text()?;

    Ok(SampleSize::parse(Some(&answer)))
}
