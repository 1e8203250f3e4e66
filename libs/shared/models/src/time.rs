use chrono::{NaiveTime, Weekday};

use crate::error::AppError;

/// Parse a clock time such as `09:30`, `9:30` or `09:30:00`.
///
/// Times are compared as `NaiveTime`, never as strings, so `9:00` sorts
/// before `10:00`.
pub fn parse_time_of_day(value: &str) -> Result<NaiveTime, AppError> {
    let trimmed = value.trim();

    NaiveTime::parse_from_str(trimmed, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(trimmed, "%H:%M:%S"))
        .map_err(|_| AppError::ValidationError(format!("Invalid time of day: '{}'", value)))
}

/// Parse a weekday name (`monday`, `Mon`, `FRIDAY`).
pub fn parse_weekday(value: &str) -> Result<Weekday, AppError> {
    value
        .trim()
        .to_lowercase()
        .parse::<Weekday>()
        .map_err(|_| AppError::ValidationError(format!("Invalid weekday: '{}'", value)))
}

pub fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "monday",
        Weekday::Tue => "tuesday",
        Weekday::Wed => "wednesday",
        Weekday::Thu => "thursday",
        Weekday::Fri => "friday",
        Weekday::Sat => "saturday",
        Weekday::Sun => "sunday",
    }
}

/// Format a time of day the way the slot grid displays it (`HH:MM`).
pub fn format_time_of_day(time: NaiveTime) -> String {
    time.format("%H:%M").to_string()
}
