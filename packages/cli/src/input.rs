//! Parsing of user-supplied query parameters.
//!
//! Shared by the `clap` value parsers and the interactive prompts. Errors
//! are plain messages suitable for showing to the user.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use taxi_query_analytics_models::{SampleSize, TimeMode};
use taxi_query_trip_models::parse_timestamp;

pub fn parse_datetime(s: &str) -> Result<NaiveDateTime, String> {
    parse_timestamp(s).ok_or_else(|| format!("expected YYYY-MM-DD HH:MM:SS, got {s:?}"))
}

pub fn parse_date(s: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .map_err(|_| format!("expected YYYY-MM-DD, got {s:?}"))
}

/// Accepts `HH:MM:SS` or `HH:MM`.
pub fn parse_time(s: &str) -> Result<NaiveTime, String> {
    let s = s.trim();
    NaiveTime::parse_from_str(s, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M"))
        .map_err(|_| format!("expected HH:MM:SS, got {s:?}"))
}

/// Validates a `YYYY-MM-DD HH` key and returns it trimmed.
pub fn parse_date_hour(s: &str) -> Result<String, String> {
    let key = s.trim();
    NaiveDateTime::parse_from_str(&format!("{key}:00:00"), "%Y-%m-%d %H:%M:%S")
        .map(|_| key.to_string())
        .map_err(|_| format!("expected YYYY-MM-DD HH, got {s:?}"))
}

pub fn parse_hour(s: &str) -> Result<u32, String> {
    s.trim()
        .parse::<u32>()
        .ok()
        .filter(|hour| *hour < 24)
        .ok_or_else(|| format!("expected an hour between 0 and 23, got {s:?}"))
}

pub fn parse_coordinate(s: &str) -> Result<f64, String> {
    s.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| format!("expected a number, got {s:?}"))
}

pub fn parse_time_mode(s: &str) -> Result<TimeMode, String> {
    s.trim()
        .parse()
        .map_err(|_| format!("expected BEFORE or AFTER, got {s:?}"))
}

/// Never fails: invalid input falls back to the default sample size.
#[allow(clippy::unnecessary_wraps)]
pub fn parse_sample_size(s: &str) -> Result<SampleSize, String> {
    Ok(SampleSize::parse(Some(s)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn datetimes_and_dates() {
        assert!(parse_datetime("2016-01-01 08:15:00").is_ok());
        assert!(parse_datetime("2016-01-01").is_err());
        assert_eq!(
            parse_date(" 2016-01-31 "),
            Ok(NaiveDate::from_ymd_opt(2016, 1, 31).unwrap())
        );
        assert!(parse_date("31/01/2016").is_err());
    }

    #[test]
    fn times_with_or_without_seconds() {
        let noon = NaiveTime::from_hms_opt(12, 0, 0).unwrap();
        assert_eq!(parse_time("12:00:00"), Ok(noon));
        assert_eq!(parse_time("12:00"), Ok(noon));
        assert!(parse_time("noon").is_err());
    }

    #[test]
    fn date_hour_keys() {
        assert_eq!(parse_date_hour(" 2016-01-01 08 "), Ok("2016-01-01 08".to_string()));
        assert!(parse_date_hour("2016-01-01 24").is_err());
        assert!(parse_date_hour("2016-01-01").is_err());
    }

    #[test]
    fn hours_and_modes() {
        assert_eq!(parse_hour("23"), Ok(23));
        assert!(parse_hour("24").is_err());
        assert!(parse_hour("-1").is_err());
        assert_eq!(parse_time_mode("antes"), Ok(TimeMode::Before));
        assert!(parse_time_mode("later").is_err());
    }

    #[test]
    fn coordinates_and_sample_sizes() {
        assert_eq!(parse_coordinate("-74.5"), Ok(-74.5));
        assert!(parse_coordinate("inf").is_err());
        assert_eq!(parse_sample_size("x"), Ok(SampleSize::DEFAULT));
        assert_eq!(parse_sample_size("8"), Ok(SampleSize::new(8)));
    }
}
