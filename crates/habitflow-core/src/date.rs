//! Local calendar-day helpers.
//!
//! Every streak, rollover and chart boundary in the system keys off the
//! device's local calendar day formatted as `YYYY-MM-DD`. Crossing a
//! timezone can therefore spuriously break or extend a streak; that matches
//! the shipped behavior and is kept as-is.

use chrono::{Datelike, Duration, Local, NaiveDate};

use crate::error::ValidationError;

pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Today's local calendar date.
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

pub fn parse_date(raw: &str) -> Result<NaiveDate, ValidationError> {
    NaiveDate::parse_from_str(raw, DATE_FORMAT)
        .map_err(|e| ValidationError::invalid("date", format!("'{raw}': {e}")))
}

/// Weekday index with Sunday = 0, matching the `target_days` encoding.
pub fn weekday_index(date: NaiveDate) -> u8 {
    date.weekday().num_days_from_sunday() as u8
}

/// The 7 dates of the week containing `date`, starting Sunday.
pub fn week_dates(date: NaiveDate) -> [NaiveDate; 7] {
    let start = date - Duration::days(weekday_index(date) as i64);
    std::array::from_fn(|i| start + Duration::days(i as i64))
}

/// The last `n` days ending at `end`, oldest first.
pub fn last_n_days(end: NaiveDate, n: usize) -> Vec<NaiveDate> {
    (0..n).rev().map(|i| end - Duration::days(i as i64)).collect()
}
