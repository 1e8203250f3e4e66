//! Date and time fixtures shared by the cells' test suites.

use chrono::{Datelike, Duration, NaiveDate, NaiveTime, Weekday};

use shared_models::time::parse_time_of_day;

/// A fixed Monday (2024-01-01) so weekday-sensitive tests never depend on the clock.
pub fn reference_monday() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 1).unwrap_or_default()
}

/// The first date on or after `from` that falls on `weekday`.
pub fn next_weekday(from: NaiveDate, weekday: Weekday) -> NaiveDate {
    let offset = (7 + weekday.num_days_from_monday() as i64
        - from.weekday().num_days_from_monday() as i64)
        % 7;
    from + Duration::days(offset)
}

/// Parse `HH:MM`; panics on malformed input, which is what a fixture should do.
pub fn time(value: &str) -> NaiveTime {
    match parse_time_of_day(value) {
        Ok(parsed) => parsed,
        Err(err) => panic!("bad fixture time {}: {}", value, err),
    }
}

pub fn times(values: &[&str]) -> Vec<NaiveTime> {
    values.iter().map(|v| time(v)).collect()
}

pub fn weekdays(names: &[&str]) -> Vec<Weekday> {
    names
        .iter()
        .map(|name| match shared_models::time::parse_weekday(name) {
            Ok(day) => day,
            Err(err) => panic!("bad fixture weekday {}: {}", name, err),
        })
        .collect()
}
